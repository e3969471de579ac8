//! Command line for the display and its helpers.
//!
//! With no subcommand `heatboard` runs the display. `--sheet-id` and
//! `--meet-name` override the persisted settings for this run only; use
//! `heatboard config` to store them.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::poller::DEFAULT_POLL_INTERVAL;

fn parse_hour(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(h) if h < 24 => Ok(h),
        _ => Err(format!("`{}` is not an hour between 0 and 23", s)),
    }
}

#[derive(Parser, Debug)]
#[command(name = "heatboard", version, about = "Shared-screen event/heat display for swim meets")]
pub struct Cli {
    /// Settings file (default: <config dir>/heatboard/settings.json)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send an event/heat update to the sheet's write endpoint
    Push(PushArgs),
    /// Show or change the persisted settings
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Sheet id or full sheet URL
    #[arg(long)]
    pub sheet_id: Option<String>,

    /// Name shown in the header
    #[arg(long)]
    pub meet_name: Option<String>,

    /// Show built-in demo data instead of reading a sheet
    #[arg(long)]
    pub offline: bool,

    /// Show the diagnostic overlay
    #[arg(long)]
    pub debug: bool,

    /// Seconds between polls
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs(), value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Stop polling while the terminal does not have focus
    #[arg(long)]
    pub pause_on_blur: bool,

    /// Page URL used to build the share link in the diagnostic overlay
    #[arg(long)]
    pub share_base: Option<Url>,

    /// Log file while the display owns the terminal
    #[arg(long, default_value = "heatboard.log")]
    pub log_file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct PushArgs {
    /// Write endpoint URL
    #[arg(long)]
    pub endpoint: Url,

    #[arg(long)]
    pub event: String,

    #[arg(long)]
    pub heat: String,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Sheet id or full sheet URL
    #[arg(long)]
    pub sheet_id: Option<String>,

    #[arg(long)]
    pub meet_name: Option<String>,

    /// Follow the dark-hours window automatically
    #[arg(long)]
    pub auto_dark: Option<bool>,

    /// Theme to show while automatic theming is off
    #[arg(long)]
    pub dark_mode: Option<bool>,

    /// First dark hour (inclusive)
    #[arg(long, value_parser = parse_hour)]
    pub dark_start: Option<u32>,

    /// First light hour (exclusive end of the dark window)
    #[arg(long, value_parser = parse_hour)]
    pub dark_end: Option<u32>,

    /// Page URL to print a share link for
    #[arg(long)]
    pub share_base: Option<Url>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_runs_display() {
        let cli = Cli::parse_from(["heatboard", "--sheet-id", "abc", "--offline"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.run.sheet_id.as_deref(), Some("abc"));
        assert!(cli.run.offline);
        assert_eq!(cli.run.interval, 10);
    }

    #[test]
    fn push_and_config_subcommands() {
        let cli = Cli::parse_from([
            "heatboard",
            "push",
            "--endpoint",
            "https://script.example/exec",
            "--event",
            "Event 4",
            "--heat",
            "2",
        ]);
        match cli.command {
            Some(Command::Push(args)) => assert_eq!(args.event, "Event 4"),
            other => panic!("expected push, got {:?}", other),
        }

        let cli = Cli::parse_from([
            "heatboard",
            "config",
            "--dark-start",
            "18",
            "--auto-dark",
            "false",
            "--dark-mode",
            "true",
        ]);
        match cli.command {
            Some(Command::Config(args)) => {
                assert_eq!(args.dark_start, Some(18));
                assert_eq!(args.auto_dark, Some(false));
                assert_eq!(args.dark_mode, Some(true));
            }
            other => panic!("expected config, got {:?}", other),
        }
    }

    #[test]
    fn out_of_range_hour_is_rejected() {
        assert!(Cli::try_parse_from(["heatboard", "config", "--dark-end", "24"]).is_err());
    }
}
