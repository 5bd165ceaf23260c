use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::ui::{auxiliary_style, HORIZONTAL_MARGIN, VERTICAL_MARGIN};
use crate::verb::VerbRecord;

/// Pure presenter for one row of the mistakes table
pub fn present_row(verb: &VerbRecord) -> Row<'static> {
    Row::new(vec![
        Cell::from(verb.infinitive.clone())
            .style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(verb.translation.clone()).style(Style::default().fg(Color::Gray)),
        Cell::from(verb.auxiliary.to_string()).style(auxiliary_style(verb.auxiliary)),
        Cell::from(verb.participle.clone()),
    ])
}

pub fn render_summary(app: &App, f: &mut Frame) {
    let summary = app.session.summary();
    let has_mistakes = !summary.mistakes.is_empty();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(3), // Counts
            Constraint::Length(2), // Actions
            Constraint::Min(0),    // Mistakes book
        ])
        .split(f.area());

    let title = Paragraph::new(Span::styled(
        "Session Complete!",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let counts = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                format!("{} known", summary.known),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled(
                format!("{} to review", summary.mistakes.len()),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            format!("score {}%", summary.score),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(counts, chunks[1]);

    let actions = if has_mistakes {
        format!(
            "(r)estart all / review (m)istakes ({}) / (esc)ape",
            summary.mistakes.len()
        )
    } else {
        "(r)estart all / (esc)ape".to_string()
    };
    let actions = Paragraph::new(Span::styled(
        actions,
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    f.render_widget(actions, chunks[2]);

    if !has_mistakes {
        return;
    }

    let table_height = chunks[3].height.saturating_sub(3) as usize; // borders and header
    let total_rows = summary.mistakes.len();
    app.summary_state.visible_rows.set(table_height);
    let offset = app
        .summary_state
        .scroll_offset
        .min(total_rows.saturating_sub(table_height));

    let header = Row::new(vec![
        Cell::from("Infinitive"),
        Cell::from("Meaning"),
        Cell::from("Auxiliary"),
        Cell::from("Partizip II"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = summary
        .mistakes
        .iter()
        .skip(offset)
        .take(table_height)
        .map(present_row)
        .collect();

    let scroll_info = if total_rows > table_height {
        format!(
            " ({}/{} rows)",
            offset + rows.len().min(table_height),
            total_rows
        )
    } else {
        String::new()
    };

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Length(10),
            Constraint::Min(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Mistakes Book{}", scroll_info)),
    );
    f.render_widget(table, chunks[3]);
}

