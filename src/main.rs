//! feedwatch, subscribe to RSS feeds by URL and read them in the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐ WorkerMsg  ┌──────────┐ apply()  ┌──────────┐ dispatch ┌──────────┐
//! │  poll.rs │ ─────────► │  app.rs  │ ───────► │ state.rs │ ───────► │ view.rs  │
//! │ (tokio)  │ (channel)  │ (control)│          │ (store)  │          │ (models) │
//! └──────────┘            └──────────┘          └──────────┘          └──────────┘
//!      ▲ subscribe()           ▲                                            │
//!      └───────────────────────┤ handle_key_event()                   draw()│
//!                         ┌──────────┐                                ┌──────────┐
//!                         │ input.rs │                                │  ui.rs   │
//!                         └──────────┘                                └──────────┘
//! ```
//!
//! * **`source/`**: the `FeedSource` trait, the proxy fetcher and the RSS
//!   parser.
//! * **`validate`**: checks a submitted URL before anything is fetched.
//! * **`poll`**: background fetching on the tokio runtime and the
//!   de-duplicating merge of polled posts.
//! * **`state`**: the application state and its single update entry point.
//! * **`view`**: binds state paths to render routines that rebuild the
//!   per-region models.
//! * **`app`**: submission, reading and navigation logic.
//! * **`ui`**: pure rendering of the region models.
//! * **`input`**: maps key events to `App` actions.
//! * **`main`**: loads the config, sets up logging, the runtime and the
//!   terminal, then runs the event loop.

mod app;
mod config;
mod error;
mod i18n;
mod input;
mod logging;
mod model;
mod poll;
mod source;
mod state;
mod ui;
mod validate;
mod view;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{error, info};

use app::App;
use config::Config;
use i18n::I18n;
use poll::WorkerMsg;
use source::ProxySource;
use view::Views;

// ---------------------------------------------------------------------------
// RAII terminal guard: idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the panic message is printed.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

/// Apply one message from the background workers.
fn handle_worker_msg(app: &mut App, msg: WorkerMsg) -> Result<()> {
    match msg {
        WorkerMsg::Subscribed { url, result } => app.complete_subscription(url, result),
        WorkerMsg::Polled(batch) => {
            app.merge_polled(batch);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // -- configuration & logging ---------------------------------------------
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::discover(config_path.as_deref()).context("failed to load configuration")?;
    logging::init(&config.logging).context("failed to open log file")?;

    let i18n = I18n::load(&config.ui.locale)?;
    let proxy = config.proxy.base_url()?;
    info!(proxy = %proxy, locale = i18n.locale(), "starting");

    // -- background work -----------------------------------------------------
    let runtime = tokio::runtime::Runtime::new()?;
    let source = Arc::new(ProxySource::new(proxy, config.proxy.timeout())?);
    let (worker, mut rx) = poll::spawn(runtime.handle().clone(), source, config.poll.interval());

    // -- terminal setup (RAII: Drop restores on exit or panic) --------------
    install_panic_hook();
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(Views::new(i18n));

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Apply any results from the background workers.
    //   2. Render the UI.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    //   4. Start fetches for newly submitted URLs.
    let tick_rate = Duration::from_millis(100);

    loop {
        // 1. Process worker messages
        while let Ok(msg) = rx.try_recv() {
            let subscribed = matches!(msg, WorkerMsg::Subscribed { .. });
            if let Err(e) = handle_worker_msg(&mut app, msg) {
                error!(error = %e, "unhandled error");
            }
            if subscribed {
                worker.publish_feeds(app.feed_urls());
            }
        }

        // 2. Render
        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        // 3. Handle input
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = input::handle_key_event(&mut app, key) {
                    error!(error = %e, "unhandled error");
                }
            }
        }

        // 4. Kick off fetches
        for url in app.take_pending() {
            worker.subscribe(url);
        }

        if app.quit {
            break;
        }
    }

    info!("shutting down");
    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
