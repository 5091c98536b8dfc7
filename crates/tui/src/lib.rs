//! Live terminal dashboard for `powermon`.
//!
//! A single control loop owns the [`Dashboard`] and multiplexes three
//! sources of [`Message`]s:
//! - terminal input (crossterm event stream)
//! - the acquisition ticker
//! - completed reads, each running in its own Tokio task

pub mod app;
pub mod input;
pub mod ui;

pub use app::{Dashboard, Effect};

use crossterm::{
    event::EventStream,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use powermon_config::PowermonConfig;
use powermon_core::{Message, PowerError, Result};
use powermon_system::Monitor;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::future::Future;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::info;

type Term = Terminal<CrosstermBackend<Stdout>>;

// ── Entry point ───────────────────────────────────────────────────────────────

/// Run the dashboard until the user quits.  The terminal is restored on
/// every exit path, including panics.
pub async fn run(monitor: Arc<dyn Monitor>, config: &PowermonConfig) -> Result<()> {
    let mut terminal = enter()?;
    let result = restoring_on_panic(event_loop(&mut terminal, monitor, config)).await;
    leave(&mut terminal)?;
    result
}

/// Drive `fut` with a panic hook that restores the terminal before the
/// previous hook runs.  The previous hook is reinstalled afterwards.
async fn restoring_on_panic<F: Future>(fut: F) -> F::Output {
    let previous = Arc::new(std::panic::take_hook());
    let chained = Arc::clone(&previous);
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
        (*chained)(info);
    }));

    let output = fut.await;

    // Dropping our hook releases `chained`.
    let _ = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| (*previous)(info)));
    output
}

fn enter() -> Result<Term> {
    let setup = |e: io::Error| PowerError::Terminal(e.to_string());

    enable_raw_mode().map_err(setup)?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(setup(e));
    }
    Terminal::new(CrosstermBackend::new(stdout)).map_err(setup)
}

fn leave(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    Ok(())
}

// ── Control loop ──────────────────────────────────────────────────────────────

async fn event_loop(
    terminal: &mut Term,
    monitor: Arc<dyn Monitor>,
    config: &PowermonConfig,
) -> Result<()> {
    let mut dashboard = Dashboard::new(monitor.as_ref(), config);
    let deadline = config.monitor.read_timeout();

    let size = terminal.size()?;
    dashboard.update(Message::Resize(size.width, size.height));

    let (tx, mut completions) = mpsc::channel::<Message>(16);
    let mut events = EventStream::new();
    let mut ticker = time::interval(config.monitor.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(monitor = monitor.name(), "dashboard started");

    loop {
        terminal.draw(|f| ui::draw(f, &dashboard))?;

        let message = tokio::select! {
            _ = ticker.tick() => Message::Tick,
            Some(done) = completions.recv() => done,
            event = events.next() => match event {
                Some(Ok(event)) => match input::translate(event) {
                    Some(message) => message,
                    None => continue,
                },
                Some(Err(e)) => return Err(e.into()),
                None => Message::Quit,
            },
        };

        match dashboard.update(message) {
            Effect::None => {}
            Effect::Read { generation } => {
                spawn_read(Arc::clone(&monitor), deadline, generation, tx.clone());
            }
            Effect::Quit => break,
        }
    }

    info!("dashboard stopped");
    Ok(())
}

/// Read off the control loop and post the outcome back as a message.
/// A read that outlives the loop has nowhere to report and is dropped.
fn spawn_read(
    monitor: Arc<dyn Monitor>,
    deadline: Duration,
    generation: u64,
    tx: mpsc::Sender<Message>,
) {
    tokio::spawn(async move {
        let result = monitor.read(deadline).await;
        let _ = tx.send(Message::ReadCompleted { generation, result }).await;
    });
}
