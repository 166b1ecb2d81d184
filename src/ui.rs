use std::time::Duration;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use webbrowser::Browser;

use crate::game::RoundState;
use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Grid width in cells; the nine digit keys lay out like a numpad row-major.
const GRID_COLUMNS: usize = 3;

/// How long a whacked cell keeps its hit highlight.
const HIT_FLASH: Duration = Duration::from_millis(150);

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let game = &self.game;

        match (game.state(), game.game_over_visible()) {
            (RoundState::Running, _) => {
                let grid_rows = grid_row_count(game.field().target_count());

                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .vertical_margin(VERTICAL_MARGIN)
                    .constraints([
                        Constraint::Length(1), // header
                        Constraint::Length(1), // padding
                        Constraint::Length(grid_rows as u16 * 2), // mole grid
                        Constraint::Min(0),
                    ])
                    .split(area);

                let header = Paragraph::new(Line::from(vec![
                    Span::styled(game.state().to_string(), dim_bold_style),
                    Span::raw("   "),
                    Span::styled(format!("score {}", game.score()), bold_style),
                    Span::raw("   "),
                    Span::styled(
                        format!("{:.1}s", game.remaining().as_secs_f64()),
                        dim_bold_style,
                    ),
                ]))
                .alignment(Alignment::Center);

                header.render(chunks[0], buf);

                render_grid(self, chunks[2], buf);
            }
            (RoundState::Idle, true) => {
                let stats = game.stats();

                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .vertical_margin(VERTICAL_MARGIN)
                    .constraints([
                        Constraint::Length(1), // banner
                        Constraint::Length(1), // padding
                        Constraint::Length(1), // score
                        Constraint::Length(1), // totals
                        Constraint::Min(1),    // padding
                        Constraint::Length(1), // legend
                    ])
                    .split(area);

                let banner = Paragraph::new(Span::styled(
                    "GAME OVER",
                    Style::default()
                        .fg(Color::Red)
                        .add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Center);
                banner.render(chunks[0], buf);

                let score = Paragraph::new(Span::styled(
                    format!("{} whacked", game.score()),
                    bold_style,
                ))
                .alignment(Alignment::Center);
                score.render(chunks[2], buf);

                let totals = Paragraph::new(Span::styled(
                    format!(
                        "{}/{} swings   {:.0}% acc   {} best streak   {:.0} w/min",
                        stats.hits,
                        stats.swings,
                        stats.accuracy(),
                        stats.best_streak,
                        game.whacks_per_minute()
                    ),
                    dim_bold_style,
                ))
                .alignment(Alignment::Center);
                totals.render(chunks[3], buf);

                let legend = Paragraph::new(Span::styled(
                    String::from(if Browser::is_available() {
                        "(space) again / (t)weet / (esc)ape"
                    } else {
                        "(space) again / (esc)ape"
                    }),
                    italic_style,
                ));
                legend.render(chunks[5], buf);
            }
            (RoundState::Idle, false) => {
                let config = game.config();

                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .vertical_margin(VERTICAL_MARGIN)
                    .constraints([
                        Constraint::Length(1), // title
                        Constraint::Length(1), // padding
                        Constraint::Length(1), // settings
                        Constraint::Min(1),    // padding
                        Constraint::Length(1), // legend
                    ])
                    .split(area);

                let title = Paragraph::new(Span::styled(
                    "whak — whack the moles before the clock runs out",
                    bold_style,
                ))
                .alignment(Alignment::Center);
                title.render(chunks[0], buf);

                let settings = Paragraph::new(Span::styled(
                    format!(
                        "{}s round   {} slots   {} moles up   new set every {}ms",
                        config.duration.as_secs(),
                        config.target_count,
                        config.concurrency,
                        config.rotation_interval.as_millis()
                    ),
                    dim_bold_style,
                ))
                .alignment(Alignment::Center);
                settings.render(chunks[2], buf);

                let legend = Paragraph::new(Span::styled(
                    "(space) start / (↑↓) round time / (←→) moles / (esc)ape",
                    italic_style,
                ));
                legend.render(chunks[4], buf);
            }
        }
    }
}

fn grid_row_count(target_count: usize) -> usize {
    target_count.div_ceil(GRID_COLUMNS)
}

/// One cell per slot, digit-key labelled, three to a row. Active cells are
/// raised moles; a just-whacked cell flashes briefly.
fn render_grid(app: &App, area: Rect, buf: &mut Buffer) {
    let game = &app.game;
    let field = game.field();

    let active_style = Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD | Modifier::REVERSED);
    let hit_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD | Modifier::REVERSED);
    let empty_style = Style::default().add_modifier(Modifier::DIM);

    let slot_rows = (1..=field.target_count()).chunks(GRID_COLUMNS);
    let rows: Vec<Line> = slot_rows
        .into_iter()
        .map(|row| {
            let mut spans = Vec::new();
            for slot in row {
                let flashing = matches!(
                    game.last_hit(),
                    Some((hit, at)) if hit == slot && at.elapsed() < HIT_FLASH
                );
                let span = if flashing {
                    Span::styled(format!(" *{slot}* "), hit_style)
                } else if field.is_active(slot) {
                    Span::styled(format!(" ({slot}) "), active_style)
                } else {
                    Span::styled(format!("  {slot}  "), empty_style)
                };
                spans.push(span);
                spans.push(Span::raw(" "));
            }
            Line::from(spans)
        })
        .collect();

    let row_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(2); rows.len()])
        .split(area);

    for (line, chunk) in rows.into_iter().zip(row_chunks.iter()) {
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(*chunk, buf);
    }
}
