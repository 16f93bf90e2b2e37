use std::time::Duration;

use failfast::{Config, DeliveryMode};
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

#[derive(StructOpt, Debug)]
#[structopt(name = "failfast", about = "Fan out tasks and stop at the first failure")]
struct Cli {
    /// Number of tasks to run
    #[structopt(long, default_value = "10")]
    tasks: usize,

    /// Index of the task that fails (out of range: none fails)
    #[structopt(long = "error-index", default_value = "0", allow_hyphen_values = true)]
    error_index: i64,

    /// Be silent
    #[structopt(long)]
    silent: bool,

    /// Upper bound on each task's simulated work, in milliseconds
    #[structopt(long = "max-sleep-ms", default_value = "10")]
    max_sleep_ms: u64,

    /// Let cancellation interrupt deliveries that are already in progress
    #[structopt(long = "race-cancel")]
    race_cancel: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            tasks: self.tasks,
            fail_index: self.error_index,
            verbose: !self.silent,
            max_sleep: Duration::from_millis(self.max_sleep_ms),
            delivery: if self.race_cancel {
                DeliveryMode::RaceCancel
            } else {
                DeliveryMode::CheckThenSend
            },
        }
    }
}

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::from_args();
    let cfg = cli.config();
    set_up_logging(cfg.verbose)?;

    println!(
        "context test\n  number: {}\n  error:  {}\n  silent: {}\n",
        cfg.tasks, cfg.fail_index, cli.silent
    );

    let report = failfast::run(&cfg).await?;

    if let Some(err) = &report.error {
        println!("error: {err}");
    }
    if cfg.verbose {
        println!("result: {:?}", report.values);
    }
    println!("got {} results", report.count());

    // Let the abandoned tasks wind down before exiting.
    report.launched.join().await?;
    Ok(())
}

fn set_up_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let default = if verbose { "failfast=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
}
