//! Modal dialogs: the text prompt used while saving, and the error box.

use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::input::calculate_scroll_offset;

/// Renders a prompt with a message, an editable value and key hints.
///
/// Returns the screen position of the text cursor.
pub fn render_prompt(
    frame: &mut Frame,
    title: &str,
    message: &str,
    value: &str,
    cursor: usize,
) -> (u16, u16) {
    let area = frame.area();
    let dialog_width = (area.width as f32 * 0.6).clamp(30.0, 80.0) as u16;
    let content_width = dialog_width.saturating_sub(4) as usize;
    let message_lines = wrap_text(message, content_width);

    // Message + blank + value + blank + hints + borders
    let dialog_height = (message_lines.len() + 4 + 2).min(12) as u16;
    let dialog_area = center_rect(dialog_width.min(area.width), dialog_height, area);

    frame.render_widget(Clear, dialog_area);

    let offset = calculate_scroll_offset(cursor, content_width.saturating_sub(2));
    let visible: String = value
        .chars()
        .skip(offset)
        .take(content_width.saturating_sub(2))
        .collect();

    let mut lines: Vec<Line> = message_lines.into_iter().map(Line::from).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::styled(visible, Style::default().fg(Color::White)),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(
            "[Enter]",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" OK  "),
        Span::styled(
            "[Esc]",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Cancel"),
    ]));

    let value_row = lines.len() as u16 - 3;

    let block = Block::default()
        .title(format!(" {title} "))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().bg(Color::Black));

    frame.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Left),
        dialog_area,
    );

    let x = dialog_area.x + 1 + 2 + (cursor - offset) as u16;
    let y = dialog_area.y + 1 + value_row;
    (x.min(dialog_area.right().saturating_sub(2)), y)
}

/// Renders an error box with its category as the title.
pub fn render_error(frame: &mut Frame, title: &str, message: &str) {
    let area = frame.area();
    let dialog_width = (area.width as f32 * 0.6).clamp(30.0, 80.0) as u16;
    let content_width = dialog_width.saturating_sub(4) as usize;
    let message_lines = wrap_text(message, content_width);

    let dialog_height = (message_lines.len() + 2 + 2).min(15) as u16;
    let dialog_area = center_rect(dialog_width.min(area.width), dialog_height, area);

    frame.render_widget(Clear, dialog_area);

    let mut lines: Vec<Line> = message_lines
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::White))))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(
            "[Enter/Esc]",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Dismiss"),
    ]));

    let block = Block::default()
        .title(format!(" {title} "))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .style(Style::default().bg(Color::Black));

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        dialog_area,
    );
}

/// Wraps text at word boundaries to fit within the given width.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for line in text.trim().lines() {
        if line.chars().count() <= max_width {
            lines.push(line.to_string());
            continue;
        }

        let mut current = String::new();
        for word in line.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.chars().count() + 1 + word.chars().count() <= max_width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current));
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Centers a rectangle of the given size within the parent area.
pub fn center_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center);
    let vertical = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center);

    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}
