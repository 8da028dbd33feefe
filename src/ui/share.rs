//! Share screen shown to a creator after publishing.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

use crate::models::ScoreRecord;

use super::render_controls;

const TOP_SCORES: usize = 5;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    link: &str,
    scoreboard_link: &str,
    total: usize,
    scores: Option<&[ScoreRecord]>,
) {
    let chunks = Layout::vertical([
        Constraint::Length(9),
        Constraint::Min(8),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "YOUR QUIZ IS READY",
            Style::default().fg(Color::Green).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Share this link with your friends:",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(link, Style::default().fg(Color::Yellow).bold())),
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
    frame.render_widget(widget, chunks[0]);

    render_live_scores(frame, chunks[1], total, scores);
    render_controls(
        frame,
        chunks[2],
        "c copy link  ·  v scoreboard  ·  d my quizzes  ·  q quit",
    );
}

fn render_live_scores(frame: &mut Frame, area: Rect, total: usize, scores: Option<&[ScoreRecord]>) {
    let lines: Vec<Line> = match scores {
        None => vec![Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::DarkGray),
        ))],
        Some([]) => vec![Line::from(Span::styled(
            "No scores yet.",
            Style::default().fg(Color::DarkGray),
        ))],
        Some(scores) => scores
            .iter()
            .take(TOP_SCORES)
            .enumerate()
            .map(|(i, entry)| {
                Line::from(vec![
                    Span::styled(format!("{}. ", i + 1), Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        entry.display_name().to_string(),
                        Style::default().fg(Color::White).bold(),
                    ),
                    Span::styled(
                        format!(" - {}/{}", entry.score, total),
                        Style::default().fg(Color::Gray),
                    ),
                ])
            })
            .collect(),
    };

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Live Scoreboard ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}
