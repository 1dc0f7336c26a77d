use std::{thread, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, error, info};
use step_progress::{ProgressConfig, TermSink, Tokens, drive_parallel, drive_sequence, prompt};

/// Simulates a batch of work and reports it on a single redrawn line.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of simulated work items
    #[arg(short, long, default_value_t = 20)]
    steps: u64,

    /// Worker threads; 1 runs the items sequentially
    #[arg(short, long, default_value_t = 1)]
    workers: usize,

    /// Title shown in front of the bar
    #[arg(short, long, env("STEP_PROGRESS_TITLE"), default_value = "Progress")]
    title: String,

    /// Bar width in cells
    #[arg(long, default_value_t = 25)]
    width: usize,

    /// Simulated time per item
    #[arg(long, default_value_t = 100)]
    delay_ms: u64,

    /// Erase the bar at the end instead of printing a completion message
    #[arg(long)]
    no_complete_message: bool,

    /// Ask for a password before starting
    #[arg(long)]
    ask_password: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new().filter_level(level).init();

    if let Err(e) = run(&cli) {
        error!("Run failed, err:{e:?}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    if cli.ask_password {
        let secret = prompt::password("Password: ").context("read password")?;
        info!("Read a {}-character password", secret.chars().count());
    }

    let mut config = ProgressConfig::new()
        .with_title(cli.title.as_str())
        .with_bar_width(cli.width)
        .with_format(
            ":title |:progress_bar| :percent_complete% (:step/:total_steps, :time_remaining left) :item",
        );
    if cli.no_complete_message {
        config = config.without_complete_message();
    } else {
        config = config.with_complete_message(":title complete in :time_elapsed");
    }

    let delay = Duration::from_millis(cli.delay_ms);
    let work = move |n: u64| {
        thread::sleep(delay);
        Tokens::new().with("item", format_args!("item-{n}"))
    };

    let items: Vec<u64> = (1..=cli.steps).collect();
    if cli.workers > 1 {
        drive_parallel(items, cli.workers, config, TermSink::stdout(), work)
            .context("parallel run")?;
    } else {
        drive_sequence(items, config, work).context("sequential run")?;
    }

    Ok(())
}
