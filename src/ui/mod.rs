mod alert;
mod dashboard;
mod entry;
mod quiz;
mod result;
mod scoreboard;
mod share;

use ratatui::{prelude::*, widgets::Block};

use crate::app::{Alert, View};

pub fn render(frame: &mut Frame, view: &View, alert: Option<&Alert>) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match view {
        View::Create {
            name,
            focus,
            recent,
            cursor,
        } => entry::render_create(frame, area, name, *focus, recent, *cursor),
        View::Take { quiz_id, name } => entry::render_take(frame, area, quiz_id, name),
        View::Quiz {
            session,
            heading,
            cursor,
        } => quiz::render(frame, area, session, heading, *cursor),
        View::Share {
            link,
            scoreboard_link,
            total,
            scores,
            ..
        } => share::render(frame, area, link, scoreboard_link, *total, scores.as_deref()),
        View::Scoreboard {
            heading,
            total,
            scores,
            ..
        } => scoreboard::render(frame, area, heading, *total, scores),
        View::Result {
            result,
            scoreboard_link,
        } => result::render(frame, area, result, scoreboard_link),
        View::Dashboard { entries, cursor } => dashboard::render(frame, area, entries, *cursor),
    }

    if let Some(alert) = alert {
        alert::render(frame, area, alert);
    }
}

/// Percentage for a `score / total` line.
fn percentage(score: usize, total: usize) -> f64 {
    if total > 0 {
        (score as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

fn grade_color(percentage: f64) -> Color {
    match percentage as u32 {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}

fn render_controls(frame: &mut Frame, area: Rect, text: &str) {
    let widget = ratatui::widgets::Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
