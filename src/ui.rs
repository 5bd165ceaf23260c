pub mod flashcard;
pub mod screen;
pub mod summary;

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    Frame,
};

use crate::app::App;
use crate::verb::Auxiliary;

pub const HORIZONTAL_MARGIN: u16 = 5;
pub const VERTICAL_MARGIN: u16 = 2;

pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(app.session.phase()).render(app, f);
}

/// Rect of at most `width` x `height`, centered inside `area`
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// "ist" in blue, "hat" in green
pub fn auxiliary_style(auxiliary: Auxiliary) -> Style {
    let color = match auxiliary {
        Auxiliary::Ist => Color::Blue,
        Auxiliary::Hat => Color::Green,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// "[key] label", dimmed when the key does nothing right now
pub fn key_hint(key: &str, label: &str, enabled: bool) -> Vec<Span<'static>> {
    let (key_style, label_style) = if enabled {
        (
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            Style::default(),
        )
    } else {
        (
            Style::default().add_modifier(Modifier::DIM),
            Style::default().add_modifier(Modifier::DIM),
        )
    };
    vec![
        Span::styled(format!("[{}] ", key), key_style),
        Span::styled(label.to_string(), label_style),
    ]
}
