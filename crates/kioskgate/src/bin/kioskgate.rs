//! kioskgate: RFID-gated kiosk display.
//!
//! Without a hardware driver the kiosk runs on a simulated reader fed from
//! stdin, one command per line:
//!
//! ```text
//! +023af76c    card enters the field
//! -023af76c    card leaves the field
//! 023af76c     card is tapped (enters, then leaves)
//! ```

use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use kioskgate::prelude::*;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kioskgate")]
#[command(about = "RFID-gated kiosk display")]
struct Args {
    /// Path to the INI configuration file
    #[arg(short, long, default_value = "kioskgate.ini")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (development)
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "kioskgate stopped");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run(args: Args) -> Result<(), KioskError> {
    tracing::info!(config = %args.config.display(), "starting kioskgate");
    let config = KioskConfig::load(&args.config)?;
    let directory = HttpDirectory::new(&config.network.server_fqdn, &config.software.license_key)?;
    let reader = SimulatedReader::new();

    let handle = KioskBuilder::new()
        .config(&config)
        .build(reader.clone(), directory, TracingDisplay)
        .start()
        .await?;

    let (stdin_closed, stdin_done) = oneshot::channel();
    let feeder = reader.clone();
    std::thread::spawn(move || {
        feed_stdin(&feeder);
        let _ = stdin_closed.send(());
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted");
        }
        _ = stdin_done => {
            tracing::info!("stdin closed, finishing queued cards");
            handle.settle(reader.delivered()).await;
        }
    }

    handle.shutdown().await;
    Ok(())
}

/// One line of simulated reader input.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Present(&'a str),
    Remove(&'a str),
    Tap(&'a str),
}

fn parse_command(line: &str) -> Option<Command<'_>> {
    let line = line.trim();
    if let Some(tag) = line.strip_prefix('+') {
        non_empty(tag).map(Command::Present)
    } else if let Some(tag) = line.strip_prefix('-') {
        non_empty(tag).map(Command::Remove)
    } else {
        non_empty(line).map(Command::Tap)
    }
}

fn non_empty(tag: &str) -> Option<&str> {
    let tag = tag.trim();
    (!tag.is_empty()).then_some(tag)
}

/// Blocks reading stdin until EOF, driving the simulated reader.
fn feed_stdin(reader: &SimulatedReader) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines().map_while(Result::ok) {
        match parse_command(&line) {
            Some(Command::Present(tag)) => {
                reader.present(tag);
            }
            Some(Command::Remove(tag)) => {
                reader.remove(tag);
            }
            Some(Command::Tap(tag)) => {
                reader.present(tag);
                reader.remove(tag);
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_prefixes() {
        assert_eq!(parse_command("+023af76c"), Some(Command::Present("023af76c")));
        assert_eq!(parse_command("-023af76c"), Some(Command::Remove("023af76c")));
        assert_eq!(parse_command("  023af76c \n"), Some(Command::Tap("023af76c")));
    }

    #[test]
    fn test_parse_command_blank_is_ignored() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("+"), None);
        assert_eq!(parse_command("   "), None);
    }

    #[test]
    fn test_args_default_config_path() {
        let args = Args::parse_from(["kioskgate"]);

        assert_eq!(args.config, PathBuf::from("kioskgate.ini"));
    }
}
