//! Event types for the TUI event loop.

use crate::fetch::FetchOutcome;
use crossterm::event::KeyEvent;

#[derive(Debug)]
pub enum TuiEvent {
    Input(KeyEvent),
    Tick,
    Resize { width: u16, height: u16 },
    /// `epoch` identifies the view mount the fetch was started for.
    Fetched { epoch: u64, outcome: FetchOutcome },
}
