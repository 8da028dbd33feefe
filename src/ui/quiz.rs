//! Question screen shared by creators and takers.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

use crate::session::QuizSession;

use super::render_controls;

pub fn render(frame: &mut Frame, area: Rect, session: &QuizSession, heading: &str, cursor: usize) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Heading and progress
        Constraint::Length(7), // Question text
        Constraint::Min(8),    // Options
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_progress(frame, chunks[0], heading, session.index(), session.total());
    render_question_text(frame, chunks[1], &session.current_question().text);
    render_options(
        frame,
        chunks[2],
        &session.current_question().options,
        session.selected(),
        cursor,
    );
    render_controls(frame, chunks[3], &controls_line(session));
}

fn render_progress(frame: &mut Frame, area: Rect, heading: &str, current: usize, total: usize) {
    let content = vec![
        Line::from(Span::styled(
            heading.to_string(),
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(Span::styled(
            format!("Question {} of {}", current + 1, total),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .padding(Padding::horizontal(1)),
        );

    frame.render_widget(widget, area);
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    options: &[String],
    selected: Option<usize>,
    cursor: usize,
) {
    let lines: Vec<Line> = options
        .iter()
        .enumerate()
        .map(|(i, opt)| {
            let prefix = if i == cursor { "> " } else { "  " };
            let mark = if selected == Some(i) { "(*) " } else { "( ) " };
            let label = char::from(b'A' + (i % 26) as u8);

            let style = if selected == Some(i) {
                Style::default().fg(Color::Green).bold()
            } else if i == cursor {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(mark, style),
                Span::styled(format!("{}) ", label), style),
                Span::styled(opt.clone(), style),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Options ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(widget, area);
}

/// Only the controls the session currently offers are listed.
fn controls_line(session: &QuizSession) -> String {
    let controls = session.controls();
    let mut parts = vec!["j/k move", "space select"];
    if controls.previous {
        parts.push("p previous");
    }
    if controls.next {
        parts.push("n next");
    }
    if controls.submit {
        parts.push("s submit");
    }
    parts.push("esc quit");
    parts.join("  ·  ")
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::models::Question;
    use crate::session::{Action, Transition};

    fn bank() -> Vec<Question> {
        (0..3)
            .map(|i| Question::new(&format!("q{}", i), &["a", "b"]))
            .collect()
    }

    #[test]
    fn test_controls_line_tracks_session() {
        let mut rng = StdRng::seed_from_u64(1);
        let session = QuizSession::for_creator("Ann", &bank(), &mut rng).unwrap();
        let line = controls_line(&session);
        assert!(line.contains("n next"));
        assert!(!line.contains("p previous"));
        assert!(!line.contains("s submit"));

        let Transition::Answering(session) = session.apply(Action::Select(0)) else {
            panic!("selection rejected");
        };
        let Transition::Answering(session) = session.apply(Action::Next) else {
            panic!("next rejected");
        };
        assert!(controls_line(&session).contains("p previous"));
    }
}
