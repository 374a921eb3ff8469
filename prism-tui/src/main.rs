//! PRISM TUI entry point.

use prism_tui::api_client::RestClient;
use prism_tui::config::TuiConfig;
use prism_tui::error::TuiError;
use prism_tui::events::TuiEvent;
use prism_tui::fetch::{spawn_fetch, FetchKind};
use prism_tui::keys::{map_key, Action};
use prism_tui::logging::init_logging;
use prism_tui::nav::View;
use prism_tui::notifications::NotificationLevel;
use prism_tui::persistence;
use prism_tui::source::RecordSource;
use prism_tui::state::{App, Modal, MIN_STRENGTH_STEP};
use prism_tui::views::render_view;
use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    init_logging(&config.error_log_path)?;

    let source: Arc<dyn RecordSource> = Arc::new(RestClient::new(&config)?);
    tracing::info!(base_url = %config.api_base_url, "starting PRISM TUI");
    let mut app = App::new(config, source);

    match persistence::load(&app.config.persistence_path) {
        Ok(Some(state)) => app.restore(state),
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable persisted state");
            app.notify(NotificationLevel::Warning, format!("Saved state ignored: {}", err));
        }
    }

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard {};

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);

    spawn_input_reader(event_tx.clone());
    let initial = app.mount(app.active_view);
    spawn_all(&app, initial, &event_tx);

    let tick_rate = Duration::from_millis(app.config.refresh_interval_ms);
    let mut ticker = tokio::time::interval(tick_rate);

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => {
                if handle_event(&mut app, TuiEvent::Tick, &event_tx) {
                    break;
                }
            }
            Some(event) = event_rx.recv() => {
                if handle_event(&mut app, event, &event_tx) {
                    break;
                }
            }
        }
    }

    if let Err(err) = persistence::save(&app.config.persistence_path, &app.persisted()) {
        tracing::warn!(error = %err, "failed to persist UI state");
    }
    tracing::info!("PRISM TUI exiting");

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                let sent = match evt {
                    CrosstermEvent::Key(key) => sender.blocking_send(TuiEvent::Input(key)),
                    CrosstermEvent::Resize(width, height) => {
                        sender.blocking_send(TuiEvent::Resize { width, height })
                    }
                    _ => Ok(()),
                };
                if sent.is_err() {
                    break;
                }
            }
        }
    });
}

fn spawn_all(app: &App, kinds: Vec<FetchKind>, sender: &mpsc::Sender<TuiEvent>) {
    for kind in kinds {
        spawn_fetch(
            kind,
            app.epoch_for(kind.view()),
            Arc::clone(&app.source),
            app.config.fetch.clone(),
            sender.clone(),
        );
    }
}

/// Returns `true` when the app should exit.
fn handle_event(app: &mut App, event: TuiEvent, sender: &mpsc::Sender<TuiEvent>) -> bool {
    match event {
        TuiEvent::Input(key) => {
            if let Some(action) = map_key(key) {
                return handle_action(app, action, sender);
            }
        }
        TuiEvent::Fetched { epoch, outcome } => {
            app.accept_fetch(epoch, outcome);
        }
        TuiEvent::Tick => {
            app.tick = app.tick.wrapping_add(1);
            app.prune_notifications(chrono::Utc::now());
        }
        TuiEvent::Resize { .. } => {}
    }
    false
}

fn handle_action(app: &mut App, action: Action, sender: &mpsc::Sender<TuiEvent>) -> bool {
    if app.modal.is_some() {
        match action {
            Action::Quit => return true,
            Action::Cancel | Action::Confirm | Action::OpenHelp => app.modal = None,
            _ => {}
        }
        return false;
    }

    match action {
        Action::Quit => return true,
        Action::NextView => {
            let view = app.active_view.next();
            switch_to(app, view, sender);
        }
        Action::PrevView => {
            let view = app.active_view.previous();
            switch_to(app, view, sender);
        }
        Action::SwitchView(index) => {
            if let Some(view) = View::from_index(index) {
                switch_to(app, view, sender);
            }
        }
        Action::MoveDown => app.select_next(),
        Action::MoveUp => app.select_previous(),
        Action::Refresh => {
            let kinds = app.refresh();
            spawn_all(app, kinds, sender);
        }
        Action::CycleTypeFilter => app.cycle_type_filter(),
        Action::RaiseMinStrength => app.adjust_min_strength(MIN_STRENGTH_STEP),
        Action::LowerMinStrength => app.adjust_min_strength(-MIN_STRENGTH_STEP),
        Action::OpenHelp => {
            app.modal = Some(Modal {
                title: "Keybindings".to_string(),
                message: "PRISM correlation and entity dashboard.".to_string(),
            })
        }
        Action::Confirm | Action::Cancel => {}
    }
    false
}

fn switch_to(app: &mut App, view: View, sender: &mpsc::Sender<TuiEvent>) {
    let kinds = app.switch_view(view);
    spawn_all(app, kinds, sender);
}
