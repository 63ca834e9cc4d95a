//! Toast notification widget for the TUI.
//!
//! Shows a short status message in the bottom-right corner.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Toast notification widget.
pub struct Toast<'a> {
    message: &'a str,
}

impl<'a> Toast<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message }
    }

    /// Area for the toast: bottom-right corner, sized to the message.
    pub fn area(screen: Rect, message: &str) -> Rect {
        // Message plus the two border columns
        let wanted = message.chars().count() as u16 + 2;
        let width = wanted.clamp(12, 60).min(screen.width.saturating_sub(4));
        let height = 3;
        let x = screen.width.saturating_sub(width + 2);
        let y = screen.height.saturating_sub(height + 1);
        Rect::new(x, y, width, height)
    }
}

impl Widget for Toast<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Clear the area
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .style(Style::default().bg(Color::Black));

        let inner = block.inner(area);
        block.render(area, buf);

        // Truncate message if needed, on char boundaries
        let max_len = inner.width as usize;
        let display_msg = if self.message.chars().count() > max_len {
            let head: String = self.message.chars().take(max_len.saturating_sub(1)).collect();
            format!("{head}…")
        } else {
            self.message.to_string()
        };

        let line = Line::from(Span::styled(
            display_msg,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));

        Paragraph::new(line).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_area() {
        let screen = Rect::new(0, 0, 80, 24);
        let area = Toast::area(screen, "Data saved to Excel successfully!");
        assert!(area.x > 0);
        assert!(area.y > 0);
        assert_eq!(area.height, 3);
        assert_eq!(area.width, 35);
    }

    #[test]
    fn test_toast_truncates_on_char_boundary() {
        let area = Rect::new(0, 0, 8, 3);
        let mut buf = Buffer::empty(area);
        Toast::new("Données enregistrées").render(area, &mut buf);

        let line: String = (1..7).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert_eq!(line, "Donné…");
    }

    #[test]
    fn test_toast_area_narrow_screen() {
        let screen = Rect::new(0, 0, 20, 10);
        let area = Toast::area(screen, "Data retrieved from the database successfully!");
        assert!(area.right() <= screen.width);
    }
}
