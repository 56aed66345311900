//! Logging setup.
//!
//! Output goes to stdout, stderr, or a file chosen on the command line.
//! `RUST_LOG` overrides the level picked by `--verbose`.

use anyhow::Result;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Off,
    Stdout,
    Stderr,
    /// Appended, without ANSI colors.
    File(PathBuf),
}

impl FromStr for LogTarget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "0" | "off" => Ok(LogTarget::Off),
            "1" | "stdout" => Ok(LogTarget::Stdout),
            "2" | "stderr" => Ok(LogTarget::Stderr),
            "" => anyhow::bail!("Empty log target"),
            path => Ok(LogTarget::File(PathBuf::from(path))),
        }
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber. Does nothing for [`LogTarget::Off`].
pub fn init_logging(target: &LogTarget, verbose: bool) -> Result<()> {
    match target {
        LogTarget::Off => {}
        LogTarget::Stdout => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(env_filter(verbose))
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::Stderr => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(env_filter(verbose))
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(env_filter(verbose))
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_and_named_targets() {
        assert_eq!("0".parse::<LogTarget>().unwrap(), LogTarget::Off);
        assert_eq!("off".parse::<LogTarget>().unwrap(), LogTarget::Off);
        assert_eq!("1".parse::<LogTarget>().unwrap(), LogTarget::Stdout);
        assert_eq!("stderr".parse::<LogTarget>().unwrap(), LogTarget::Stderr);
    }

    #[test]
    fn anything_else_is_a_file() {
        assert_eq!(
            "logs/devboard.log".parse::<LogTarget>().unwrap(),
            LogTarget::File(PathBuf::from("logs/devboard.log"))
        );
        assert!("".parse::<LogTarget>().is_err());
    }

    #[test]
    fn off_installs_nothing() {
        init_logging(&LogTarget::Off, true).unwrap();
    }
}
