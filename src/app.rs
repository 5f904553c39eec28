use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use pool_api::client::ScoresOutcome;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Standings,
    Breakdown,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    pub server_url: String,
}

impl App {
    pub fn new(server_url: impl Into<String>) -> Self {
        let settings = AppSettings::load();

        let app = Self {
            state: AppState::new(),
            settings,
            server_url: server_url.into(),
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_scores_loaded(&mut self, outcome: ScoresOutcome) {
        self.state.last_error = None;
        self.state.standings.load(outcome);
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        if next == MenuItem::Breakdown {
            self.state.breakdown.scroll_offset = 0;
        }
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Standings navigation
    // -----------------------------------------------------------------------

    pub fn standings_down(&mut self) {
        self.state.standings.select_down();
    }

    pub fn standings_up(&mut self) {
        self.state.standings.select_up();
    }

    /// Open the breakdown for the highlighted user. Returns false when nothing is selected.
    pub fn open_breakdown(&mut self) -> bool {
        if self.state.standings.selected_score().is_none() {
            return false;
        }
        self.update_tab(MenuItem::Breakdown);
        true
    }

    // -----------------------------------------------------------------------
    // Breakdown navigation
    // -----------------------------------------------------------------------

    pub fn breakdown_next_round(&mut self) {
        self.state.breakdown.navigate_round_next();
    }

    pub fn breakdown_prev_round(&mut self) {
        self.state.breakdown.navigate_round_prev();
    }

    pub fn breakdown_scroll_down(&mut self) {
        self.state.breakdown.scroll_offset = self.state.breakdown.scroll_offset.saturating_add(1);
    }

    pub fn breakdown_scroll_up(&mut self) {
        self.state.breakdown.scroll_offset = self.state.breakdown.scroll_offset.saturating_sub(1);
    }
}
