//! Name entry screens for creators and takers.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::Focus;
use crate::storage::{group_recent, RecentResult};

use super::render_controls;

pub fn render_create(
    frame: &mut Frame,
    area: Rect,
    name: &str,
    focus: Focus,
    recent: &[RecentResult],
    cursor: usize,
) {
    let chunks = Layout::vertical([
        Constraint::Length(10),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    let prompt = name_prompt(
        "BUDDY QUIZ",
        "Answer 15 questions about yourself, then share the link.",
        "Your name: ",
        name,
        focus == Focus::Name,
    );
    frame.render_widget(prompt, chunks[0]);

    if !recent.is_empty() {
        render_recent(frame, chunks[1], recent, cursor, focus == Focus::Menu);
    }

    let controls = match focus {
        Focus::Name => "enter start  ·  tab menu  ·  esc quit",
        Focus::Menu => "j/k move  ·  enter scoreboard  ·  d dashboard  ·  tab name  ·  q quit",
    };
    render_controls(frame, chunks[2], controls);
}

pub fn render_take(frame: &mut Frame, area: Rect, quiz_id: &str, name: &str) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(10),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    let subtitle = format!("How well do you know your friend? (quiz {})", quiz_id);
    let prompt = name_prompt("BUDDY QUIZ", &subtitle, "Your name: ", name, true);
    frame.render_widget(prompt, chunks[1]);
    render_controls(frame, chunks[3], "enter start  ·  esc quit");
}

fn name_prompt<'a>(
    title: &'a str,
    subtitle: &str,
    label: &'a str,
    input: &'a str,
    active: bool,
) -> Paragraph<'a> {
    let input_style = if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let cursor = if active { "_" } else { "" };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(title, Style::default().fg(Color::Cyan).bold())),
        Line::from(""),
        Line::from(Span::styled(
            subtitle.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(label, Style::default().fg(Color::White)),
            Span::styled(input, input_style),
            Span::styled(cursor, input_style),
        ]),
    ];

    Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    )
}

fn render_recent(
    frame: &mut Frame,
    area: Rect,
    recent: &[RecentResult],
    cursor: usize,
    active: bool,
) {
    let today = chrono::Utc::now().date_naive();
    let mut lines: Vec<Line> = Vec::new();
    let mut position = 0;

    for (group, results) in group_recent(recent, today) {
        lines.push(Line::from(Span::styled(
            group.title(),
            Style::default().fg(Color::Cyan).bold(),
        )));

        for result in results {
            let highlighted = active && position == cursor;
            let marker = if highlighted { " > " } else { "   " };
            let style = if highlighted {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::Gray)
            };

            lines.push(Line::from(vec![
                Span::styled(marker, style),
                Span::styled(result.friend_name.clone(), style.bold()),
                Span::styled(" scored ", style),
                Span::styled(
                    format!("{} / {}", result.score, result.total_questions),
                    style.bold(),
                ),
                Span::styled(" on ", style),
                Span::styled(format!("{}'s", result.creator_name), style.bold()),
                Span::styled(" quiz.", style),
            ]));
            position += 1;
        }
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Recent Quizzes ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}
