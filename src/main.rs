mod affirmations;
mod ambience;
mod app;
mod config;
mod error;
mod focus;
mod format;
mod paths;
mod playback;
mod poems;
mod project;
mod theme;
mod ticker;
mod timer;
mod ui;

use std::{
    io::{self, stdout, Stdout},
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::ambience::{Ambience, AmbienceSink};
use crate::app::{App, Services};
use crate::config::Config;
use crate::focus::FocusEngine;
use crate::playback::catalog::{spawn_catalog, CatalogMessage};
use crate::playback::lookup::{OEmbedLookup, VideoLookup};
use crate::playback::mpv::{MpvAmbience, MpvFactory};
use crate::playback::widget::WidgetEvent;
use crate::playback::PlaybackEngine;
use crate::project::ProjectFile;

// ── Constants ──────────────────────────────────────────────────────

const TICK_RATE: Duration = Duration::from_millis(100);

/// A small box of gifts for your terminal: focus timer, playlist, poems.
#[derive(Parser, Debug)]
#[command(name = "giftbox", version, about)]
struct Args {
    /// Config file (defaults to config.toml in the config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ── Setup ──────────────────────────────────────────────────────────

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging() -> anyhow::Result<WorkerGuard> {
    let dir = paths::logs_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("could not create log directory {}", dir.display()))?;
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, "giftbox.log"));
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("GIFTBOX_LOG").unwrap_or_else(|_| EnvFilter::new("giftbox=info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

fn open_ambience(config: &Config) -> Option<Box<dyn AmbienceSink>> {
    let track = config.ambience_track.as_ref()?;
    match MpvAmbience::spawn(&config.player_command, track) {
        Ok(sink) => Some(Box::new(sink)),
        Err(e) => {
            tracing::warn!(track = %track.display(), error = %e, "ambience unavailable");
            None
        }
    }
}

// ── Main ───────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging()?;

    let config_path = args.config.unwrap_or_else(paths::config_file);
    let config = Config::load(&config_path);
    tracing::info!(config = %config_path.display(), "starting giftbox");

    let (widget_tx, mut widget_rx) = unbounded_channel();
    let (catalog_tx, mut catalog_rx) = unbounded_channel();

    let focus = FocusEngine::open(ProjectFile::new(paths::projects_file()));
    let mut playback = PlaybackEngine::new(
        Box::new(MpvFactory::new(config.player_command.clone())),
        widget_tx,
    );
    let ambience = Ambience::new(open_ambience(&config));
    let lookup: Arc<dyn VideoLookup> = Arc::new(OEmbedLookup::new());
    let poems = poems::load_poems(&config.poems_dir()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not read poems");
        Vec::new()
    });

    playback.begin_loading();
    spawn_catalog(lookup.clone(), config.catalog.clone(), catalog_tx.clone());

    let services = Services {
        focus,
        playback,
        ambience,
        lookup,
        catalog_tx,
    };
    let mut app = App::new(config, config_path, services, poems);

    // Panic hook: restore terminal on crash so it doesn't stay in raw mode
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        default_hook(info);
    }));

    enable_raw_mode().context("could not enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run(&mut terminal, &mut app, &mut widget_rx, &mut catalog_rx);

    app.shutdown();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    tracing::info!("giftbox closed");

    result.context("terminal error")
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    widget_rx: &mut UnboundedReceiver<WidgetEvent>,
    catalog_rx: &mut UnboundedReceiver<CatalogMessage>,
) -> io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        let now = Instant::now();
        while let Ok(msg) = catalog_rx.try_recv() {
            app.on_catalog(msg);
        }
        while let Ok(event) = widget_rx.try_recv() {
            app.on_widget_event(event, now);
        }
        app.tick(now);

        terminal.draw(|f| ui::draw(f, app))?;

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app::handle_key(app, key, Instant::now());
                    if app.should_quit {
                        break;
                    }
                }
                Event::Mouse(mouse) => app::handle_mouse(app, mouse),
                _ => {}
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            last_tick = Instant::now();
        }
    }

    Ok(())
}
