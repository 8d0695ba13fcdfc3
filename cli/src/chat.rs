use std::io::{self, BufRead, Write};

use anyhow::Result;
use covidstat_core::{ChatUser, Dispatcher, FileSeriesRepository, FileSubscriberRepository, Subscriptions, Tracker};
use tracing::error;

use crate::graph;
use crate::notify::ConsoleNotifier;

/// Terminal stand-in for the chat bot: every stdin line is one message
/// from `user`.
pub fn run(
    tracker: &mut Tracker<FileSeriesRepository>,
    subscriptions: &mut Subscriptions<FileSubscriberRepository>,
    admin_id: Option<i64>,
    user: ChatUser,
) -> Result<()> {
    let mut dispatcher = Dispatcher::new(tracker, subscriptions, admin_id);
    let mut notifier = ConsoleNotifier;
    let stdin = io::stdin();

    println!("Chatting as user {} (Ctrl-D to quit). Try /start.", user.id);
    prompt()?;
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            prompt()?;
            continue;
        }

        match dispatcher.handle(&user, &line, &mut notifier) {
            Ok(reply) => {
                if !reply.text.is_empty() {
                    println!("{}", reply.text.trim_end());
                }
                if !reply.charts.is_empty() {
                    graph::run(reply.charts)?;
                }
            }
            Err(e) => {
                error!(error = %e, "command failed");
                println!("Error: {}", e);
            }
        }
        prompt()?;
    }
    println!();
    Ok(())
}

fn prompt() -> Result<()> {
    print!("> ");
    io::stdout().flush()?;
    Ok(())
}
