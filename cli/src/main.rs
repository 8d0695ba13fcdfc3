mod chat;
mod graph;
mod history;
mod notify;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::Local;
use clap::Parser;
use covidstat_core::service::chart::{build_chart, graph_set, parse_selectors};
use covidstat_core::service::report::{format_update, LEGEND};
use covidstat_core::{
    AppConfig, ChatUser, CovidStat, FileSeriesRepository, FileSubscriberRepository, LocaleOutcome, Poller,
    SourceRegistry, Subscriptions, Tracker,
};
use tracing_subscriber::EnvFilter;

use crate::notify::ConsoleNotifier;

#[derive(Parser)]
#[command(name = "covidstat")]
#[command(about = "Tracks daily COVID-19 statistics per country", long_about = None)]
struct Cli {
    /// Config file (default: ~/.covidstat/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the series and subscriber files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run one polling cycle over every locale
    Poll,
    /// Poll forever (or N times) at the configured interval
    Watch {
        /// Stop after this many cycles
        #[arg(long)]
        cycles: Option<usize>,
    },
    /// Show what changed since the last merge without recording it
    Delta {
        /// Locale code (all locales when omitted)
        locale: Option<String>,
    },
    /// Print the recorded daily increments as a table
    History { locale: String },
    /// Chart a locale's history in the terminal
    Graph {
        locale: String,
        /// Comma separated selectors, e.g. "positive,average:positive"
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,
        /// Chart title
        #[arg(long)]
        title: Option<String>,
    },
    /// Talk to the bot from the terminal, one command per line
    Chat {
        /// Chat user id to act as
        #[arg(long, default_value_t = 0)]
        user: i64,
        #[arg(long)]
        username: Option<String>,
    },
    /// List available locales
    Locales,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    let registry = SourceRegistry::with_defaults();

    match cli.command {
        Commands::Locales => {
            for entry in registry.entries() {
                println!("{} {:<4} {}", entry.flag, entry.name, entry.default_url);
            }
        }
        Commands::Poll => {
            let (mut tracker, subscriptions, poller) = open_tracking(&config, &registry)?;
            let report = poller.run_cycle(&mut tracker, &subscriptions, &mut ConsoleNotifier, Local::now().naive_local());
            for (locale, outcome) in &report.outcomes {
                match outcome {
                    LocaleOutcome::Unchanged => println!("{}: no changes", locale),
                    LocaleOutcome::Merged(delta) => println!("{}: merged {}", locale, delta),
                    LocaleOutcome::Failed(e) => println!("{}: failed ({})", locale, e),
                }
            }
            if !report.outcomes.is_empty() && report.failed() == report.outcomes.len() {
                return Err(anyhow!("Every locale failed"));
            }
        }
        Commands::Watch { cycles } => {
            let (mut tracker, subscriptions, poller) = open_tracking(&config, &registry)?;
            poller.watch(&mut tracker, &subscriptions, &mut ConsoleNotifier, cycles);
        }
        Commands::Delta { locale } => {
            let mut tracker = Tracker::from_config(&config, &registry)?;
            for (icon, meaning) in LEGEND {
                println!("{} - {}", icon, meaning);
            }
            match locale {
                Some(name) => print_delta(locale_mut(&mut tracker, &name)?)?,
                None => {
                    for stat in tracker.iter_mut() {
                        print_delta(stat)?;
                    }
                }
            }
        }
        Commands::History { locale } => {
            let tracker = Tracker::from_config(&config, &registry)?;
            let stat = locale_ref(&tracker, &locale)?;
            history::show_history(stat.flag(), stat.name(), stat.series());
        }
        Commands::Graph { locale, fields, title } => {
            let tracker = Tracker::from_config(&config, &registry)?;
            let stat = locale_ref(&tracker, &locale)?;
            let charts = match fields {
                Some(fields) => {
                    let fields: Vec<&str> = fields.iter().map(|s| s.trim()).collect();
                    let selectors = parse_selectors(&fields)?;
                    vec![build_chart(stat.name(), stat.series(), &selectors, title.as_deref())]
                }
                None => graph_set(stat.name(), stat.series()),
            };
            graph::run(charts)?;
        }
        Commands::Chat { user, username } => {
            let (mut tracker, mut subscriptions, _) = open_tracking(&config, &registry)?;
            chat::run(&mut tracker, &mut subscriptions, config.admin_id, ChatUser { id: user, username })?;
        }
    }

    Ok(())
}

fn open_tracking(
    config: &AppConfig,
    registry: &SourceRegistry,
) -> Result<(Tracker, Subscriptions<FileSubscriberRepository>, Poller)> {
    let tracker = Tracker::from_config(config, registry)?;
    let subscriptions = Subscriptions::load(FileSubscriberRepository::new(&config.data_dir()?)?)?;
    let poller = Poller::new(config.cutoff_time()?, config.poll_interval()?);
    Ok((tracker, subscriptions, poller))
}

fn locale_ref<'a>(tracker: &'a Tracker, locale: &str) -> Result<&'a CovidStat<FileSeriesRepository>> {
    tracker
        .get(&locale.to_lowercase())
        .ok_or_else(|| anyhow!("Unknown location {}, choose one of: {}", locale, tracker.names().join(", ")))
}

fn locale_mut<'a>(tracker: &'a mut Tracker, locale: &str) -> Result<&'a mut CovidStat<FileSeriesRepository>> {
    let known = tracker.names().join(", ");
    tracker
        .get_mut(&locale.to_lowercase())
        .ok_or_else(|| anyhow!("Unknown location {}, choose one of: {}", locale, known))
}

fn print_delta(stat: &mut CovidStat<FileSeriesRepository>) -> Result<()> {
    stat.refresh()?;
    let delta = stat.compute_delta()?;
    if delta.is_empty() {
        println!("{}{}: no changes", stat.flag(), stat.name());
    } else {
        println!("{}", format_update(stat.flag(), stat.name(), &stat.totals(), &delta));
    }
    Ok(())
}
