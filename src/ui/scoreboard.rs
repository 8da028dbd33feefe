//! Full ranked scoreboard of one quiz.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::models::ScoreRecord;

use super::{grade_color, percentage, render_controls};

pub fn render(frame: &mut Frame, area: Rect, heading: &str, total: usize, scores: &[ScoreRecord]) {
    let chunks = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(8),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            heading.to_string(),
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Total Questions: {}", total),
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(header, chunks[0]);

    let lines: Vec<Line> = if scores.is_empty() {
        vec![Line::from(Span::styled(
            "No scores yet. Share your link to get the first taker!",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        scores
            .iter()
            .enumerate()
            .map(|(rank, entry)| {
                let color = grade_color(percentage(entry.score, total));
                Line::from(vec![
                    Span::styled(
                        format!("{:>3}. ", rank + 1),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(
                        format!("{:<24}", entry.display_name()),
                        Style::default().fg(Color::White),
                    ),
                    Span::styled(
                        format!("{} / {}", entry.score, total),
                        Style::default().fg(color).bold(),
                    ),
                ])
            })
            .collect()
    };

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Scores ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, chunks[1]);

    render_controls(frame, chunks[2], "h home  ·  q quit");
}
