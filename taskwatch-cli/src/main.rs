//! Taskwatch CLI
//!
//! Submits uploads to a prediction backend and polls the resulting tasks
//! until they complete or fail, rendering each task's status and result.

mod board;
mod commands;
mod config;
mod scheduler;
mod types;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use scheduler::RetryPolicy;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "taskwatch")]
#[command(about = "Submit uploads for prediction and watch their tasks", long_about = None)]
struct Cli {
    /// Prediction backend URL
    #[arg(long, env = "TASKWATCH_SERVER_URL", default_value = "http://localhost:5000")]
    server_url: String,

    /// Delay between two status queries of a task, in milliseconds
    #[arg(long, env = "TASKWATCH_POLL_INTERVAL_MS", default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Retries of a failed status or result request before giving up
    #[arg(long, env = "TASKWATCH_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Stop watching after this many seconds
    #[arg(long, env = "TASKWATCH_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Timeout of a single HTTP request, in seconds
    #[arg(long, env = "TASKWATCH_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    request_timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            server_url: self.server_url.clone(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            retry: RetryPolicy::new(self.max_retries),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            deadline: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the task board
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskwatch=info,taskwatch_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = cli.config();
    config.validate()?;
    debug!("Loaded configuration: {:?}", config);

    handle_command(cli.command, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["taskwatch", "status", "abc"]).unwrap();
        let config = cli.config();

        assert_eq!(config.server_url, "http://localhost:5000");
        assert_eq!(config.poll_interval, Duration::from_millis(1000));
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.deadline.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_submit_with_fields() {
        let cli = Cli::try_parse_from([
            "taskwatch",
            "--poll-interval-ms",
            "250",
            "--timeout-secs",
            "60",
            "submit",
            "a.csv",
            "b.csv",
            "-F",
            "model=v2",
            "--detach",
        ])
        .unwrap();

        let config = cli.config();
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.deadline, Some(Duration::from_secs(60)));

        match cli.command {
            Commands::Submit {
                files,
                fields,
                detach,
            } => {
                assert_eq!(files.len(), 2);
                assert_eq!(fields[0].name, "model");
                assert!(detach);
            }
            _ => panic!("expected submit"),
        }
    }

    #[test]
    fn test_cli_requires_files_and_valid_fields() {
        assert!(Cli::try_parse_from(["taskwatch", "submit"]).is_err());
        assert!(Cli::try_parse_from(["taskwatch", "submit", "a.csv", "-F", "oops"]).is_err());
        assert!(Cli::try_parse_from(["taskwatch", "watch"]).is_err());
    }
}
