use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use networthdb::analytics::{format_currency, format_percentage};
use networthdb::{CycleInput, RecordDate, Tracker, TrackerConfig};
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "networthdb")]
#[command(about = "Daily net worth history with trend and goal projection")]
struct Cli {
    /// Directory holding the record store (default: $NETWORTHDB_DATA_DIR or ./networthdb_data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Prepare the data directory and record store
    Init,
    /// Save today's (or the given day's) net worth
    Record {
        #[arg(long, allow_negative_numbers = true)]
        net_worth: i32,
        /// MM-DD-YYYY, defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Show the most recent record
    Latest,
    /// List recent records, oldest first
    History {
        #[arg(long, default_value_t = 30)]
        days: usize,
    },
    /// Percentage change against N days ago
    Change {
        #[arg(long, default_value_t = 1)]
        days: usize,
    },
    /// Estimate time until net worth reaches a goal
    Project {
        #[arg(long, allow_negative_numbers = true)]
        goal: Option<i32>,
    },
    /// Run one wake cycle and print the resulting dashboard
    Cycle {
        /// Fetched net worth; omit to simulate a failed fetch
        #[arg(long, allow_negative_numbers = true)]
        net_worth: Option<i32>,
        #[arg(long)]
        gold: Option<String>,
        #[arg(long)]
        bitcoin: Option<String>,
        /// MM-DD-YYYY, defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Show store file statistics
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let tracker = Tracker::open(config);

    match cli.command {
        Command::Init => {
            if !tracker.is_mounted() {
                return Err(anyhow!(
                    "could not prepare record store at '{}'",
                    tracker.store().path().display()
                ));
            }
            println!("Record store ready at {}", tracker.store().path().display());
            Ok(())
        }
        Command::Record { net_worth, date } => {
            let date = resolve_date(date.as_deref())?;
            if !tracker.upsert(&date, net_worth) {
                return Err(anyhow!("failed to save net worth for {}", date));
            }
            println!("{}: {}", date, format_currency(net_worth));
            Ok(())
        }
        Command::Latest => {
            match tracker.latest() {
                Some(record) => println!("{}: {}", record.date, format_currency(record.net_worth)),
                None => println!("No records"),
            }
            Ok(())
        }
        Command::History { days } => {
            for record in tracker.history_window(days) {
                println!("{}  {:>16}", record.date, format_currency(record.net_worth));
            }
            Ok(())
        }
        Command::Change { days } => {
            match tracker.analytics().try_percentage_change(days) {
                Some(change) => println!(
                    "{} {}",
                    if change >= 0.0 { "▲" } else { "▼" },
                    format_percentage(change)
                ),
                None => println!("Not enough history"),
            }
            Ok(())
        }
        Command::Project { goal } => {
            let goal = goal
                .or(tracker.config().goal)
                .context("no goal given and none configured")?;
            let projection = tracker.goal_projection(goal);
            if projection.is_empty() {
                println!("No projection available");
            } else {
                println!("{}", projection);
            }
            Ok(())
        }
        Command::Cycle {
            net_worth,
            gold,
            bitcoin,
            date,
        } => {
            let date = resolve_date(date.as_deref())?;
            let state_file = tracker.state_file();
            let mut state = state_file.load_or_default();
            let input = CycleInput {
                fetched_net_worth: net_worth,
                gold_price: gold,
                bitcoin_price: bitcoin,
            };
            let dashboard = tracker.run_cycle(&mut state, &date, &input);
            state_file
                .save(&state)
                .with_context(|| format!("Failed to save state to '{}'", state_file.path().display()))?;

            println!("{}", dashboard.title);
            println!("{}{}", dashboard.net_worth, if dashboard.stale { " (cached)" } else { "" });
            println!(
                "{} {}",
                if dashboard.change.rising { "▲" } else { "▼" },
                dashboard.change.label
            );
            if !dashboard.projection.is_empty() {
                println!("{}", dashboard.projection);
            }
            if let Some(points) = &dashboard.sparkline {
                println!("Trend: {} days", points.len());
            }
            println!("Gold: {}", dashboard.gold_price);
            println!("Bitcoin: {}", dashboard.bitcoin_price);
            Ok(())
        }
        Command::Stats => {
            let stats = tracker
                .store()
                .try_stats()
                .context("Failed to read record store")?;
            println!("Path: {}", tracker.store().path().display());
            println!("Records: {}", stats.record_count);
            println!("Bytes: {}", stats.file_bytes);
            if stats.trailing_bytes > 0 {
                println!("Stray trailing bytes: {}", stats.trailing_bytes);
            }
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<TrackerConfig> {
    let mut config = match &cli.config {
        Some(path) => TrackerConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => TrackerConfig::new(default_data_dir()?),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

fn default_data_dir() -> Result<PathBuf> {
    match env::var("NETWORTHDB_DATA_DIR") {
        Ok(path) => Ok(PathBuf::from(path)),
        Err(_) => Ok(env::current_dir()
            .context("resolve current directory for default data dir")?
            .join("networthdb_data")),
    }
}

fn resolve_date(raw: Option<&str>) -> Result<RecordDate> {
    match raw {
        Some(raw) => RecordDate::parse(raw).with_context(|| format!("invalid --date '{}'", raw)),
        None => Ok(RecordDate::today()),
    }
}
