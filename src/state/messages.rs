use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use pool_api::client::ScoresOutcome;

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadScores,
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    ScoresLoaded { outcome: ScoresOutcome },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
