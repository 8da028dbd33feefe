//! A taker's final score.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::storage::FinalResult;

use super::{grade_color, percentage, render_controls};

pub fn render(frame: &mut Frame, area: Rect, result: &FinalResult, scoreboard_link: &str) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(11),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    let percentage = percentage(result.score, result.total_questions);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "YOUR SCORE",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} / {}  ({:.0}%)",
                result.score, result.total_questions, percentage
            ),
            Style::default().fg(grade_color(percentage)).bold(),
        )),
        Line::from(""),
        Line::from(format!(
            "Thanks for playing, {}! This was {}'s quiz.",
            result.friend_name, result.creator_name
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Scoreboard: ", Style::default().fg(Color::DarkGray)),
            Span::styled(scoreboard_link, Style::default().fg(Color::Gray)),
        ]),
    ];

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Color::DarkGray),
        );
    frame.render_widget(widget, chunks[1]);

    render_controls(frame, chunks[3], "v scoreboard  ·  q quit");
}
