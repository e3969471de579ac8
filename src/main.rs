use anyhow::{Context, Result};
use clap::Parser;
use heatboard::{
    board::Board,
    cli::{Cli, Command, ConfigArgs, PushArgs, RunArgs},
    poller,
    push::{push_status, StatusUpdate},
    settings::{Settings, SettingsStore},
    source::{OfflineSource, SheetSource, Source},
    terminal::{self, DisplayOptions, Persist, Session},
};
use reqwest::Client;
use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

// The display owns stdout, so its logs go to a file.
fn init_file_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    fmt::Subscriber::builder()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn init_stderr_logging() {
    fmt::Subscriber::builder()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn settings_store(path: Option<PathBuf>) -> Result<SettingsStore> {
    let path = match path {
        Some(path) => path,
        None => SettingsStore::default_path()?,
    };
    Ok(SettingsStore::new(path))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Push(args)) => {
            init_stderr_logging();
            push(args).await
        }
        Some(Command::Config(args)) => {
            init_stderr_logging();
            configure(&settings_store(cli.settings)?, args)
        }
        None => {
            let store = settings_store(cli.settings)?;
            init_file_logging(&cli.run.log_file)?;
            run_display(&store, cli.run).await
        }
    }
}

async fn push(args: PushArgs) -> Result<()> {
    let update = StatusUpdate {
        event: args.event,
        heat: args.heat,
    };
    let message = push_status(&Client::new(), &args.endpoint, &update).await?;
    println!("{}", message);
    Ok(())
}

fn configure(store: &SettingsStore, args: ConfigArgs) -> Result<()> {
    let mut settings = store
        .load()
        .with_overrides(args.sheet_id.as_deref(), args.meet_name.as_deref());
    if let Some(auto) = args.auto_dark {
        settings.auto_dark = auto;
    }
    if let Some(dark) = args.dark_mode {
        settings.dark_mode = dark;
    }
    if let Some(start) = args.dark_start {
        settings.dark_window.start = start;
    }
    if let Some(end) = args.dark_end {
        settings.dark_window.end = end;
    }

    let changed = args.sheet_id.is_some()
        || args.meet_name.is_some()
        || args.auto_dark.is_some()
        || args.dark_mode.is_some()
        || args.dark_start.is_some()
        || args.dark_end.is_some();
    if changed {
        store.save(&settings)?;
        info!(path = %store.path().display(), "settings saved");
    }

    println!("settings: {}", store.path().display());
    for (key, value) in settings.to_map() {
        println!("  {} = {}", key, value);
    }
    if let Some(base) = &args.share_base {
        println!("share: {}", settings.share_url(base));
    }
    Ok(())
}

async fn run_display(store: &SettingsStore, args: RunArgs) -> Result<()> {
    // command-line overrides apply to this run only; runtime changes persist
    // on top of what was stored
    let stored = store.load();
    let settings: Settings = stored
        .clone()
        .with_overrides(args.sheet_id.as_deref(), args.meet_name.as_deref());
    info!(?settings, offline = args.offline, "starting display");

    let theme = settings.theme();
    let period = Duration::from_secs(args.interval);

    let (meet_name, source) = if args.offline {
        ("Offline Demo".to_string(), Source::Offline(OfflineSource::default()))
    } else if let Some(id) = &settings.sheet_id {
        let client = Client::builder()
            .build()
            .context("building HTTP client")?;
        (
            settings.meet_name_or_default().to_string(),
            Source::Sheet(SheetSource::new(client, id.clone())),
        )
    } else {
        warn!("no sheet configured; showing demo values");
        let demo = "Event,Heat,Last Updated\n1,1,Demo Mode\n";
        (
            "Demo Mode: run `heatboard config --sheet-id <id>`".to_string(),
            Source::Offline(OfflineSource::new(demo)),
        )
    };

    let board = Board::new(meet_name, theme);

    let options = DisplayOptions {
        poll_interval: period,
        diagnostics: args.debug,
        pause_on_blur: args.pause_on_blur,
        source_label: source.describe(),
        share_link: args.share_base.as_ref().map(|base| settings.share_url(base)),
    };
    let (handle, outcomes) = poller::spawn(source, period);
    let persist = Persist {
        store: store.clone(),
        settings: stored,
    };
    let session = Session::new(board, handle, options, Some(persist));
    terminal::run(session, outcomes).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_settings_path_needs_no_config_dir() -> Result<()> {
        let store = settings_store(Some(PathBuf::from("board/settings.json")))?;
        assert_eq!(store.path(), Path::new("board/settings.json"));
        Ok(())
    }
}
