use interlinear_core::SessionCommand;
use std::time::Instant;

/// Messages fed into the host loop.
#[derive(Debug, Clone)]
pub enum Message {
    Command(SessionCommand),
    Tick(Instant),
    Help,
    Quit,
    /// Ctrl-C.
    Interrupted,
    /// Stdin reached end of file.
    InputClosed,
    Invalid { line: String, reason: String },
}
