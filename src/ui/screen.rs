use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::session::Phase;
use crate::ui::flashcard::{Flashcard, CARD_HEIGHT};
use crate::ui::summary::render_summary;
use crate::ui::{centered, key_hint, HORIZONTAL_MARGIN, VERTICAL_MARGIN};
use crate::util::progress_ratio;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// A UI Screen boundary: one per session phase
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

pub struct LoadingScreen;

impl Screen for LoadingScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let spinner = SPINNER[app.spinner_frame % SPINNER.len()];
        let text = vec![
            Line::from(Span::styled(
                spinner,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from(Span::styled(
                "Consulting AI German Expert...",
                Style::default().add_modifier(Modifier::ITALIC),
            )),
        ];
        let area = centered(f.area(), f.area().width, text.len() as u16);
        f.render_widget(Paragraph::new(text).alignment(Alignment::Center), area);
    }
}

pub struct ReadyScreen;

impl Screen for ReadyScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let text = vec![
            Line::from(Span::styled(
                "German Verb Mastery",
                bold.fg(Color::Cyan),
            )),
            Line::from(Span::styled(
                "Partizip II & Hilfsverben (ist/hat)",
                Style::default().fg(Color::Gray),
            )),
            Line::default(),
            Line::from(key_hint("o", "start ordered", true)),
            Line::from(key_hint("s", "start shuffled", true)),
            Line::default(),
            Line::from(Span::styled(
                format!("Total Verbs: {}", app.session.verb_pool().len()),
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(
                "(esc)ape",
                Style::default().add_modifier(Modifier::ITALIC),
            )),
        ];
        let area = centered(f.area(), f.area().width, text.len() as u16);
        f.render_widget(Paragraph::new(text).alignment(Alignment::Center), area);
    }
}

pub struct ReviewScreen;

impl Screen for ReviewScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let session = &app.session;
        let Some(verb) = session.current() else {
            return;
        };
        let total = session.queue().len();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // Title + position
                Constraint::Length(1), // Progress
                Constraint::Min(CARD_HEIGHT),
                Constraint::Length(1), // Answer keys
                Constraint::Length(1), // padding
                Constraint::Length(1), // Legend
            ])
            .split(f.area());

        let header = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(12)])
            .split(chunks[0]);
        f.render_widget(
            Paragraph::new(Span::styled(
                "Training",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            header[0],
        );
        f.render_widget(
            Paragraph::new(format!("{} / {}", session.cursor() + 1, total))
                .alignment(Alignment::Right),
            header[1],
        );

        let progress = Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
            .ratio(progress_ratio(session.cursor(), total))
            .label("");
        f.render_widget(progress, chunks[1]);

        let card = Flashcard::new(verb)
            .flipped(session.is_flipped())
            .dimmed(session.is_revealing());
        let card_area = centered(chunks[2], card.width(), CARD_HEIGHT);
        f.render_widget(card, card_area);

        let flipped = session.is_flipped();
        let mut keys = key_hint("n", "forgotten", flipped);
        keys.push(Span::raw("    "));
        keys.extend(key_hint(
            "space",
            if flipped { "flip back" } else { "flip card" },
            true,
        ));
        keys.push(Span::raw("    "));
        keys.extend(key_hint("y", "i know it", flipped));
        f.render_widget(
            Paragraph::new(Line::from(keys)).alignment(Alignment::Center),
            chunks[3],
        );

        let legend = Paragraph::new(Span::styled(
            "(x) end session / (esc)ape",
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        f.render_widget(legend, chunks[5]);
    }
}

pub struct SummaryScreen;

impl Screen for SummaryScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_summary(app, f);
    }
}

pub struct ErrorScreen;

impl Screen for ErrorScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let message = app
            .session
            .error_message()
            .unwrap_or("Something went wrong.");
        let text = vec![
            Line::from(Span::styled(
                "Error",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from(message.to_string()),
            Line::default(),
            Line::from(Span::styled(
                "Restart the application to try again. (esc)ape",
                Style::default().add_modifier(Modifier::ITALIC),
            )),
        ];
        let area = centered(f.area(), f.area().width, text.len() as u16 + 2);
        f.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            area,
        );
    }
}

/// Helper to construct the appropriate screen for the current phase
pub fn current_screen(phase: Phase) -> Box<dyn Screen> {
    match phase {
        Phase::Loading => Box::new(LoadingScreen),
        Phase::Ready => Box::new(ReadyScreen),
        Phase::Reviewing => Box::new(ReviewScreen),
        Phase::Summary => Box::new(SummaryScreen),
        Phase::Error => Box::new(ErrorScreen),
    }
}
