//! Quizzes created on this machine, with live taker counts.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::app::DashboardEntry;

use super::render_controls;

pub fn render(frame: &mut Frame, area: Rect, entries: &[DashboardEntry], cursor: usize) {
    let chunks = Layout::vertical([Constraint::Min(6), Constraint::Length(1)])
        .margin(1)
        .split(area);

    let lines: Vec<Line> = if entries.is_empty() {
        vec![Line::from(Span::styled(
            "You have not created a quiz yet.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let highlighted = i == cursor;
                let style = if highlighted {
                    Style::default().fg(Color::Yellow).bold()
                } else {
                    Style::default().fg(Color::White)
                };

                Line::from(vec![
                    Span::styled(if highlighted { "> " } else { "  " }, style),
                    Span::styled(format!("{}'s Quiz", entry.quiz.creator_name), style),
                    Span::styled(
                        format!(" ({})  ", entry.quiz.quiz_id),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(takers_label(entry.takers), Style::default().fg(Color::Cyan)),
                ])
            })
            .collect()
    };

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" My Quizzes ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, chunks[0]);

    render_controls(
        frame,
        chunks[1],
        "j/k move  ·  enter results  ·  n new quiz  ·  q quit",
    );
}

fn takers_label(takers: Option<usize>) -> String {
    match takers {
        None => "Loading takers...".to_string(),
        Some(1) => "1 Taker".to_string(),
        Some(n) => format!("{} Takers", n),
    }
}
