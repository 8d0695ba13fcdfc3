use anyhow::Result;
use covidstat_core::Notifier;

/// Prints what would be pushed to each chat user.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn send(&mut self, user_id: i64, text: &str) -> Result<()> {
        println!("\x1b[2m--> user {}\x1b[0m\n{}", user_id, text.trim_end());
        Ok(())
    }
}
