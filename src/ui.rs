use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::game::{Phase, TimerTier};
use crate::scenario::{Scenario, ScenarioContent};
use crate::scoring::Choice;
use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.game.phase {
            Phase::Intro => render_intro(self, area, buf),
            Phase::Active | Phase::Feedback => render_round(self, area, buf),
            Phase::GameOver => render_game_over(self, area, buf),
        }
    }
}

fn render_intro(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // top padding
            Constraint::Length(1), // title
            Constraint::Length(1),
            Constraint::Length(2), // blurb
            Constraint::Length(1),
            Constraint::Length(1), // name entry
            Constraint::Length(1), // validation
            Constraint::Length(1),
            Constraint::Length(1), // legend
            Constraint::Min(1),    // bottom padding
        ])
        .split(area);

    let title = Paragraph::new(Span::styled(
        "Credential Guardian Challenge",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    title.render(chunks[1], buf);

    let blurb = Paragraph::new(
        "You'll be shown scenarios about passwords, MFA, and phishing.\n\
         Call each one safe or unsafe practice before the timer runs out.",
    )
    .style(Style::default().fg(Color::Gray))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    blurb.render(chunks[3], buf);

    let entry = Line::from(vec![
        Span::styled("Name: ", Style::default().add_modifier(Modifier::DIM)),
        Span::styled(
            app.game.name_entry.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " ",
            Style::default().add_modifier(Modifier::UNDERLINED | Modifier::DIM),
        ),
    ]);
    Paragraph::new(entry)
        .alignment(Alignment::Center)
        .render(chunks[5], buf);

    if let Some(message) = &app.game.intro_error {
        let error = Paragraph::new(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        error.render(chunks[6], buf);
    }

    let legend = Paragraph::new(Span::styled(
        "(enter) start / (esc) quit",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    legend.render(chunks[8], buf);
}

fn render_round(app: &App, area: Rect, buf: &mut Buffer) {
    let in_feedback = app.game.phase == Phase::Feedback;

    // Reserve enough rows for the wrapped explanation text.
    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let feedback_lines = app
        .game
        .session
        .as_ref()
        .and_then(|s| s.feedback.as_ref())
        .map(|f| {
            ((f.explanation.width() as f64 / max_chars_per_line as f64).ceil() + 2.0) as u16
        })
        .unwrap_or(2);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // status line
            Constraint::Length(1), // question timer
            Constraint::Length(1),
            Constraint::Min(6),               // scenario card
            Constraint::Length(feedback_lines), // verdict / explanation
            Constraint::Length(1),            // legend
        ])
        .split(area);

    render_status_line(app, chunks[0], buf);
    render_question_gauge(app, chunks[1], buf);

    let scenario = if in_feedback {
        app.game.resolved_scenario()
    } else {
        app.game.current_scenario()
    };
    if let Some(scenario) = scenario {
        render_scenario_card(scenario, chunks[3], buf);
    }

    if in_feedback {
        render_feedback(app, chunks[4], buf);
    } else {
        let prompt = Paragraph::new(Span::styled(
            "Is this safe or unsafe practice?",
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        prompt.render(chunks[4], buf);
    }

    let legend_text = if in_feedback {
        "next scenario shortly..."
    } else {
        "(s) safe practice / (u) unsafe practice / (esc) quit"
    };
    let legend = Paragraph::new(Span::styled(
        legend_text,
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    legend.render(chunks[5], buf);
}

fn render_status_line(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(session) = app.game.session.as_ref() else {
        return;
    };

    let line = Line::from(vec![
        Span::styled(
            session.player_name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled(
            format!("score {}", session.score),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled(
            format!("streak {}x", session.streak),
            Style::default().fg(Color::Magenta),
        ),
        Span::raw("   "),
        Span::styled(
            format!("{}s left", app.game.session_units_remaining()),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    Paragraph::new(line)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_question_gauge(app: &App, area: Rect, buf: &mut Buffer) {
    let color = match app.game.timer_tier() {
        TimerTier::Fresh => Color::Cyan,
        TimerTier::Waning => Color::Yellow,
        TimerTier::Critical => Color::Red,
    };

    let gauge = Gauge::default()
        .ratio(app.game.question_fraction().clamp(0.0, 1.0))
        .gauge_style(Style::default().fg(color))
        .label(format!("{}s", app.game.question_units_remaining()));
    gauge.render(area, buf);
}

fn render_scenario_card(scenario: &Scenario, area: Rect, buf: &mut Buffer) {
    let (card_title, lines) = match &scenario.content {
        ScenarioContent::Email {
            from,
            to,
            subject,
            body,
        } => (
            "Email",
            vec![
                field_line("From: ", from),
                field_line("To: ", to),
                field_line("Subject: ", subject),
                Line::raw(""),
                Line::raw(body.clone()),
            ],
        ),
        ScenarioContent::Sms { sender, body } => (
            "Text Message",
            vec![
                Line::from(Span::styled(
                    sender.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::raw(""),
                Line::raw(body.clone()),
            ],
        ),
        ScenarioContent::Browser { title, body } => ("Browser Dialog", titled_lines(title, body)),
        ScenarioContent::Website { title, body } => ("Website", titled_lines(title, body)),
        ScenarioContent::LoginPrompt { title, body } => ("Login Prompt", titled_lines(title, body)),
        ScenarioContent::StickyNote { title, body } => ("Sticky Note", titled_lines(title, body)),
    };

    let card = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(card_title))
        .wrap(Wrap { trim: true });
    card.render(area, buf);
}

fn field_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            label.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(value.to_string()),
    ])
}

fn titled_lines(title: &str, body: &str) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            title.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::raw(body.to_string()),
    ]
}

fn render_feedback(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(feedback) = app
        .game
        .session
        .as_ref()
        .and_then(|s| s.feedback.as_ref())
    else {
        return;
    };

    let verdict = match (feedback.choice, feedback.correct) {
        (Choice::NoAnswer, _) => Span::styled(
            "Time's Up!",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        (_, true) => Span::styled(
            format!("Correct! (+{})", feedback.points_awarded),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        (_, false) => Span::styled(
            "Incorrect!",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    };

    let mut lines = vec![Line::from(verdict)];
    lines.push(Line::raw(feedback.explanation.clone()));

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    widget.render(area, buf);
}

fn render_game_over(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // title
            Constraint::Length(1),
            Constraint::Length(1), // final score
            Constraint::Length(1),
            Constraint::Length(2), // sign-off
            Constraint::Length(1),
            Constraint::Length(1), // legend
            Constraint::Min(1),
        ])
        .split(area);

    let title = Paragraph::new(Span::styled(
        "Challenge Over!",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    title.render(chunks[1], buf);

    let player = app
        .game
        .session
        .as_ref()
        .map(|s| s.player_name.clone())
        .unwrap_or_default();
    let score = Paragraph::new(Line::from(vec![
        Span::raw(format!("{player}   final score ")),
        Span::styled(
            app.game.final_score().to_string(),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center);
    score.render(chunks[3], buf);

    let sign_off = Paragraph::new(
        "Your score has been submitted. The more you practice, the safer you'll be online.",
    )
    .style(Style::default().fg(Color::Gray))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    sign_off.render(chunks[5], buf);

    let legend = Paragraph::new(Span::styled(
        "(r) play again / (esc) quit",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    legend.render(chunks[7], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Choice;
    use crate::{App, Cli};
    use clap::Parser;
    use ratatui::{backend::TestBackend, Terminal};

    fn render_to_string(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| f.render_widget(app, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn test_app() -> App {
        let settings = crate::config::Config {
            report: false,
            ..crate::config::Config::default()
        };
        App::from_settings(Cli::parse_from(["credguard"]), settings)
    }

    #[test]
    fn test_intro_renders_title_and_legend() {
        let app = test_app();
        let content = render_to_string(&app);

        assert!(content.contains("Credential Guardian Challenge"));
        assert!(content.contains("Name:"));
        assert!(content.contains("(enter) start"));
    }

    #[test]
    fn test_intro_renders_validation_error() {
        let mut app = test_app();
        app.game.submit_name("   ");
        let content = render_to_string(&app);

        assert!(content.contains("Please enter your name to start!"));
    }

    #[test]
    fn test_active_round_renders_card_and_status() {
        let mut app = test_app();
        app.game.submit_name("ada");
        let content = render_to_string(&app);

        assert!(content.contains("ada"));
        assert!(content.contains("score 0"));
        assert!(content.contains("streak 0x"));
        assert!(content.contains("safe practice"));
        assert!(content.contains("15s"));
    }

    #[test]
    fn test_feedback_renders_explanation() {
        let mut app = test_app();
        app.game.submit_name("ada");
        let scenario_is_unsafe = app.game.current_scenario().unwrap().is_unsafe;
        app.game.submit_choice(if scenario_is_unsafe {
            Choice::Unsafe
        } else {
            Choice::Safe
        });

        let content = render_to_string(&app);
        assert!(content.contains("Correct! (+260)"));
        assert!(content.contains("next scenario shortly"));
    }

    #[test]
    fn test_timeout_feedback_renders_times_up() {
        let mut app = test_app();
        app.game.submit_name("ada");
        for _ in 0..150 {
            app.game.on_tick();
        }

        let content = render_to_string(&app);
        assert!(content.contains("Time's Up!"));
    }

    #[test]
    fn test_game_over_renders_final_score() {
        let mut app = test_app();
        app.game.submit_name("ada");
        // Run out the whole session clock.
        for _ in 0..900 {
            app.game.on_tick();
        }

        let content = render_to_string(&app);
        assert!(content.contains("Challenge Over!"));
        assert!(content.contains("final score"));
        assert!(content.contains("(r) play again"));
    }

    #[test]
    fn test_every_scenario_kind_renders() {
        let mut app = test_app();
        app.game.submit_name("ada");

        // Walk the full deck; each card must render without panicking.
        for _ in 0..app.game.catalog.len() {
            let _ = render_to_string(&app);
            app.game.submit_choice(Choice::Safe);
            let _ = render_to_string(&app);
            for _ in 0..45 {
                app.game.on_tick();
            }
        }
    }
}
