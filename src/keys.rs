use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Standings),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Breakdown),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Standings navigation
        (MenuItem::Standings, Char('j') | KeyCode::Down, _) => guard.standings_down(),
        (MenuItem::Standings, Char('k') | KeyCode::Up, _) => guard.standings_up(),
        (MenuItem::Standings, KeyCode::Enter, _) => {
            guard.open_breakdown();
        }

        // Breakdown navigation
        (MenuItem::Breakdown, Char('l') | KeyCode::Right, _) => guard.breakdown_next_round(),
        (MenuItem::Breakdown, Char('h') | KeyCode::Left, _) => guard.breakdown_prev_round(),
        (MenuItem::Breakdown, Char('j') | KeyCode::Down, _) => guard.breakdown_scroll_down(),
        (MenuItem::Breakdown, Char('k') | KeyCode::Up, _) => guard.breakdown_scroll_up(),
        (MenuItem::Breakdown, KeyCode::Esc, _) => guard.update_tab(MenuItem::Standings),

        // Global
        (_, Char('R'), _) => {
            drop(guard);
            let _ = network_requests.send(NetworkRequest::LoadScores).await;
        }
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }
}
