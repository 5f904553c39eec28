use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Row, Table, TableState, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::state::app_state::{ScoresStatus, rank_positions};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use pool_api::scoring::{ScoreBreakdownEntry, ScoredPrediction};
use pool_api::{FinalsPick, MatchupPick, Round, SeriesLength};

static TABS: &[&str; 2] = &["Standings", "Breakdown"];

const HELP_TEXT: &str = "\
Standings
  j/k or ↑/↓   move selection
  Enter        open breakdown for the selected user

Breakdown
  h/l or ←/→   previous / next round
  j/k or ↑/↓   scroll
  Esc          back to standings

Global
  1 / 2        switch tab
  R            refresh now (standings also refresh every minute)
  f            toggle full screen
  \"            toggle log pane
  ?            help (Esc to close)
  q            quit
";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let drawn = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Standings => draw_standings(f, layout.main, app),
            MenuItem::Breakdown => draw_breakdown(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(e) = drawn {
        log::error!("failed to draw frame: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Standings => 0,
        MenuItem::Breakdown => 1,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

/// Centered grey message used while there is nothing to tabulate.
fn draw_notice(f: &mut Frame, area: Rect, msg: &str) {
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

fn status_message(app: &App) -> Option<String> {
    let standings = &app.state.standings;
    match (&standings.status, app.state.last_error.as_deref()) {
        (ScoresStatus::Loading, Some(err)) => Some(format!("Could not reach {}:\n{err}", app.server_url)),
        (ScoresStatus::Loading, None) => Some(format!("Loading standings from {}...", app.server_url)),
        (ScoresStatus::NotPosted, _) => Some("Results not yet posted".to_string()),
        (ScoresStatus::Posted(s), _) if s.is_empty() => Some("No brackets submitted yet".to_string()),
        (ScoresStatus::Posted(_), _) => None,
    }
}

fn draw_standings(f: &mut Frame, area: Rect, app: &App) {
    let title = match &app.state.standings.last_loaded_at {
        Some(at) => format!(" Standings (updated {at}) "),
        None => " Standings ".to_string(),
    };
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if let Some(msg) = status_message(app) {
        draw_notice(f, inner, &msg);
        return;
    }

    let [table_area, footer] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);

    let ranked: Vec<&ScoredPrediction> = app.state.standings.ranked_scores().collect();
    let points: Vec<u32> = ranked.iter().map(|s| s.total_score).collect();
    let positions = rank_positions(&points);

    let header = Row::new(["#", "Name", "R1", "Semis", "Conf", "Finals", "Total"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows = ranked.iter().zip(positions).map(|(score, position)| {
        let mut cells = vec![position.to_string(), score.user.clone()];
        cells.extend(Round::ALL.iter().map(|r| score.details.round_points(*r).to_string()));
        cells.push(score.total_score.to_string());
        Row::new(cells)
    });

    let widths = [
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(7),
        Constraint::Length(6),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut table_state = TableState::default().with_selected(Some(app.state.standings.selected));
    f.render_stateful_widget(table, table_area, &mut table_state);

    let mut legend = "j/k=move  Enter=breakdown  R=refresh  ?=help  q=quit".to_string();
    if let Some(err) = app.state.last_error.as_deref() {
        legend = format!("refresh failed: {err}");
    }
    f.render_widget(
        Paragraph::new(legend).style(Style::default().fg(Color::DarkGray)),
        footer,
    );
}

fn draw_breakdown(f: &mut Frame, area: Rect, app: &App) {
    let round = app.state.breakdown.round;
    let selected = app.state.standings.selected_score();

    let title = match selected {
        Some(score) => format!(" {} | {} ", score.user, round.label()),
        None => " Breakdown ".to_string(),
    };
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if let Some(msg) = status_message(app) {
        draw_notice(f, inner, &msg);
        return;
    }
    let Some(score) = selected else {
        draw_notice(f, inner, "Select a user on the Standings tab and press Enter");
        return;
    };

    let [header, content] = Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(inner);

    let round_tabs: Vec<Span> = Round::ALL
        .iter()
        .map(|r| {
            let label = format!(" {} ({}) ", r.label(), score.details.round_points(*r));
            if *r == round {
                Span::styled(label, Style::default().add_modifier(Modifier::REVERSED))
            } else {
                Span::styled(label, Style::default().fg(Color::DarkGray))
            }
        })
        .collect();
    f.render_widget(
        Paragraph::new(vec![
            Line::from(round_tabs),
            Line::from(format!("Total: {} pts   h/l=round  j/k=scroll", score.total_score)),
        ]),
        header,
    );

    let lines = match round {
        Round::Finals => score.details.finals.iter().flat_map(finals_lines).collect::<Vec<_>>(),
        _ => score.details.series(round).iter().map(series_line).collect(),
    };
    if lines.is_empty() {
        draw_notice(f, content, "No picks in this round");
        return;
    }

    f.render_widget(
        Paragraph::new(lines).scroll((app.state.breakdown.scroll_offset, 0)),
        content,
    );
}

fn mark(matched: bool) -> Span<'static> {
    if matched {
        Span::styled("✓", Style::default().fg(Color::Green))
    } else {
        Span::styled("✗", Style::default().fg(Color::Red))
    }
}

fn team_or_dash(team: &str) -> &str {
    if team.is_empty() { "-" } else { team }
}

fn games_label(games: Option<SeriesLength>) -> String {
    games.map(|g| g.to_string()).unwrap_or_else(|| "-".to_string())
}

fn series_line(entry: &ScoreBreakdownEntry<MatchupPick>) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("{:<14}", entry.key)),
        Span::raw(format!(
            "{:<16} in {:<4} vs {:<16} in {:<4} ",
            team_or_dash(&entry.prediction.winner),
            games_label(entry.prediction.games),
            team_or_dash(&entry.result.winner),
            games_label(entry.result.games),
        )),
        mark(entry.winner_match),
        Span::raw(" "),
        mark(entry.games_match),
        Span::styled(format!("  +{}", entry.points), Style::default().fg(Color::Yellow)),
    ])
}

fn finals_lines(entry: &ScoreBreakdownEntry<FinalsPick>) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::raw(format!(
                "Champion     {:<16} in {:<4} vs {:<16} in {:<4} ",
                team_or_dash(&entry.prediction.winner),
                games_label(entry.prediction.games),
                team_or_dash(&entry.result.winner),
                games_label(entry.result.games),
            )),
            mark(entry.winner_match),
            Span::raw(" "),
            mark(entry.games_match),
        ]),
        Line::from(vec![
            Span::raw(format!(
                "Finals MVP   {:<16}         vs {:<16}         ",
                team_or_dash(&entry.prediction.mvp),
                team_or_dash(&entry.result.mvp),
            )),
            mark(entry.mvp_match.unwrap_or(false)),
        ]),
    ];
    if let Some(tiebreak) = entry.prediction.tiebreak_score {
        lines.push(Line::styled(
            format!("Tiebreak     {}-{} (not scored)", tiebreak.team1, tiebreak.team2),
            Style::default().fg(Color::DarkGray),
        ));
    }
    lines.push(Line::styled(format!("Points       +{}", entry.points), Style::default().fg(Color::Yellow)));
    lines
}

fn scoring_lines() -> Vec<Line<'static>> {
    let mut lines = vec![Line::styled("Scoring", Style::default().add_modifier(Modifier::BOLD))];
    for round in Round::ALL {
        let points = round.points();
        let mut row = format!("  {:<24} winner {}, series length {}", round.label(), points.winner, points.games);
        if points.mvp > 0 {
            row.push_str(&format!(", MVP {}", points.mvp));
        }
        lines.push(Line::from(row));
    }
    lines.push(Line::from("  Tiebreak scores are shown but never scored."));
    lines
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines: Vec<Line> = HELP_TEXT.lines().map(Line::from).collect();
    lines.extend(scoring_lines());
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logger = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(logger, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pool_api::TiebreakScore;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn series_line_shows_both_sides() {
        let entry = ScoreBreakdownEntry {
            key: "east-0".to_string(),
            prediction: MatchupPick::new("Celtics", SeriesLength::new(5)),
            result: MatchupPick::new("Celtics", SeriesLength::new(6)),
            winner_match: true,
            games_match: false,
            mvp_match: None,
            points: 1,
        };
        let rendered = text(&series_line(&entry));
        assert!(rendered.starts_with("east-0"));
        assert!(rendered.contains("4-1"));
        assert!(rendered.contains("4-2"));
        assert!(rendered.contains("✓ ✗"));
        assert!(rendered.ends_with("+1"));
    }

    #[test]
    fn finals_lines_show_unscored_tiebreak() {
        let entry = ScoreBreakdownEntry {
            key: "finals".to_string(),
            prediction: FinalsPick {
                winner: "Celtics".into(),
                games: None,
                mvp: "J. Tatum".into(),
                tiebreak_score: Some(TiebreakScore { team1: 101, team2: 99 }),
                ..Default::default()
            },
            result: FinalsPick::EMPTY,
            winner_match: false,
            games_match: false,
            mvp_match: Some(false),
            points: 0,
        };
        let lines: Vec<String> = finals_lines(&entry).iter().map(text).collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("J. Tatum"));
        assert!(lines[2].contains("101-99 (not scored)"));
        assert!(lines[0].contains(" - "));
    }

    #[test]
    fn scoring_help_lists_every_round() {
        let lines: Vec<String> = scoring_lines().iter().map(text).collect();
        assert_eq!(lines.len(), Round::ALL.len() + 2);
        assert!(lines[4].contains("MVP 1"));
        assert!(!lines[1].contains("MVP"));
    }
}
