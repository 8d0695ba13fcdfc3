use anyhow::Result;

/// Delivers text to a chat user. The chat network itself lives outside the
/// core; the CLI prints to the terminal.
pub trait Notifier {
    fn send(&mut self, user_id: i64, text: &str) -> Result<()>;
}
