mod input;
mod messages;
mod update;
mod view;

pub use messages::Message;

use anyhow::Result;
use interlinear_core::config::AppConfig;
use interlinear_core::{ReaderPhase, ReaderSession, ReaderSnapshot, SessionCommand};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const TICK_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

/// What a rendered frame showed; a tick only redraws when this changes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FrameKey {
    page: usize,
    total_pages: usize,
    phase: ReaderPhase,
    pairs_on_page: usize,
    overlay_visible: bool,
    processed: usize,
    feed_failed: bool,
    no_content: bool,
}

impl FrameKey {
    fn of(snapshot: &ReaderSnapshot) -> Self {
        Self {
            page: snapshot.current_page,
            total_pages: snapshot.total_pages,
            phase: snapshot.phase,
            pairs_on_page: snapshot.pairs.len(),
            overlay_visible: snapshot.overlay_visible,
            processed: snapshot.progress.processed,
            feed_failed: snapshot.feed_error.is_some(),
            no_content: snapshot.no_content,
        }
    }
}

pub struct App {
    session: ReaderSession,
    config: AppConfig,
    document_path: PathBuf,
    output: OutputMode,
    last_frame: Option<FrameKey>,
    running: bool,
}

impl App {
    fn new(
        session: ReaderSession,
        config: AppConfig,
        document_path: PathBuf,
        output: OutputMode,
    ) -> Self {
        Self {
            session,
            config,
            document_path,
            output,
            last_frame: None,
            running: true,
        }
    }
}

/// Drive the session from stdin until the reader quits.
pub fn run_app(
    session: ReaderSession,
    config: AppConfig,
    document_path: PathBuf,
    output: OutputMode,
    tx: Sender<Message>,
    rx: Receiver<Message>,
) -> Result<()> {
    let mut app = App::new(session, config, document_path, output);
    spawn_input_reader(tx);
    app.update(Message::Command(SessionCommand::GetSnapshot))?;

    let mut next_tick = Instant::now() + TICK_INTERVAL;
    while app.running {
        let wait = next_tick.saturating_duration_since(Instant::now());
        let message = match rx.recv_timeout(wait) {
            Ok(message) => message,
            Err(RecvTimeoutError::Timeout) => {
                next_tick = Instant::now() + TICK_INTERVAL;
                Message::Tick(Instant::now())
            }
            Err(RecvTimeoutError::Disconnected) => Message::InputClosed,
        };
        app.update(message)?;
    }
    info!("Reader closed");
    Ok(())
}

fn spawn_input_reader(tx: Sender<Message>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!("Failed to read input: {err}");
                    break;
                }
            };
            let Some(message) = input::parse_line(&line) else {
                continue;
            };
            debug!(?message, "Parsed input line");
            if tx.send(message).is_err() {
                return;
            }
        }
        let _ = tx.send(Message::InputClosed);
    });
}
