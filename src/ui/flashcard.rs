use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::ui::auxiliary_style;
use crate::verb::VerbRecord;

const MIN_CARD_WIDTH: u16 = 36;
const CARD_PADDING: u16 = 12;
pub const CARD_HEIGHT: u16 = 11;

/// A single verb card, front (infinitive) or back (auxiliary + Partizip II)
pub struct Flashcard<'a> {
    verb: &'a VerbRecord,
    flipped: bool,
    dimmed: bool,
}

impl<'a> Flashcard<'a> {
    pub fn new(verb: &'a VerbRecord) -> Self {
        Self {
            verb,
            flipped: false,
            dimmed: false,
        }
    }

    pub fn flipped(mut self, flipped: bool) -> Self {
        self.flipped = flipped;
        self
    }

    /// Drawn faded while the card is still being revealed
    pub fn dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }

    /// Width that fits the longest text on either side of the card
    pub fn width(&self) -> u16 {
        let longest = [
            self.verb.infinitive.width(),
            self.verb.perfect_form().width(),
            self.verb.translation.width(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0);
        (longest as u16)
            .saturating_add(CARD_PADDING)
            .max(MIN_CARD_WIDTH)
    }

    fn front(&self) -> Vec<Line<'a>> {
        let label = Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD);
        vec![
            Line::from(Span::styled("INFINITIVE", label)),
            Line::default(),
            Line::from(Span::styled(
                self.verb.infinitive.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from(Span::styled(
                "space to flip",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )),
        ]
    }

    fn back(&self) -> Vec<Line<'a>> {
        let label = Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD);
        vec![
            Line::from(Span::styled("PARTIZIP II", label)),
            Line::default(),
            Line::from(Span::styled(
                self.verb.auxiliary.to_string(),
                auxiliary_style(self.verb.auxiliary),
            )),
            Line::from(Span::styled(
                self.verb.participle.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                self.verb.translation.as_str(),
                Style::default().fg(Color::Gray),
            )),
            Line::default(),
            Line::from(vec![
                Span::styled("[N] ", Style::default().fg(Color::Red)),
                Span::raw("forgot    "),
                Span::styled("[Y] ", Style::default().fg(Color::Green)),
                Span::raw("know"),
            ]),
        ]
    }
}

impl Widget for Flashcard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.flipped {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border);
        let inner = block.inner(area);
        block.render(area, buf);

        let lines = if self.flipped {
            self.back()
        } else {
            self.front()
        };

        let top_padding = inner.height.saturating_sub(lines.len() as u16) / 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(top_padding), Constraint::Min(0)])
            .split(inner);

        let mut body = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        if self.dimmed {
            body = body.style(Style::default().add_modifier(Modifier::DIM));
        }
        body.render(chunks[1], buf);
    }
}
