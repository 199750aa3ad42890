use clap::{Args, Parser, Subcommand};
use datalogger::cli::run::RunOptions;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "datalogger")]
#[command(about = "Compressed daily-file logger for JSON telemetry batches", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    run: RunArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Accepted both bare (`datalogger -p 7000 /data`) and after `run`.
#[derive(Args, Debug, Default, PartialEq)]
struct RunArgs {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory the daily log files are written to
    save_dir: Option<PathBuf>,
}

impl RunArgs {
    /// Values given here win over the ones in `fallback`.
    fn or(self, fallback: RunArgs) -> RunArgs {
        RunArgs {
            port: self.port.or(fallback.port),
            save_dir: self.save_dir.or(fallback.save_dir),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    Run(RunArgs),
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Init {
        #[arg(long)]
        stdout: bool,
    },
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "datalogger=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run(args)) => run(cli.config, args.or(cli.run)).await?,
        None => run(cli.config, cli.run).await?,
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { stdout } => {
                datalogger::cli::config::init(stdout)?;
            }
            ConfigAction::Validate => {
                let path = datalogger::config::resolve_config_path(cli.config.as_deref());
                datalogger::cli::config::validate(path)?;
            }
        },
    }

    Ok(())
}

async fn run(
    config_path: Option<PathBuf>,
    args: RunArgs,
) -> Result<(), datalogger::cli::run::RunError> {
    datalogger::cli::run::run(RunOptions {
        config_path,
        save_dir: args.save_dir,
        port: args.port,
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(argv: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Some(Commands::Run(args)) => args.or(cli.run),
            None => cli.run,
            Some(Commands::Config { .. }) => panic!("expected run"),
        }
    }

    #[test]
    fn test_bare_invocation_takes_port_and_dir() {
        let args = run_args(&["datalogger", "-p", "7000", "/data"]);
        assert_eq!(args.port, Some(7000));
        assert_eq!(args.save_dir, Some(PathBuf::from("/data")));
    }

    #[test]
    fn test_run_subcommand_takes_port_and_dir() {
        let args = run_args(&["datalogger", "run", "-p", "7000", "/data"]);
        assert_eq!(args.port, Some(7000));
        assert_eq!(args.save_dir, Some(PathBuf::from("/data")));
    }

    #[test]
    fn test_run_subcommand_values_win() {
        let args = run_args(&["datalogger", "--port", "6100", "run", "--port", "7000"]);
        assert_eq!(args.port, Some(7000));
        assert_eq!(args.save_dir, None);
    }

    #[test]
    fn test_config_flag_is_global() {
        let cli = Cli::try_parse_from(["datalogger", "run", "--config", "/etc/d.yml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/d.yml")));
    }
}
