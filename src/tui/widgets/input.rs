//! Text entry widgets: single-line fields and the multi-line query editor.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Calculates the scroll offset needed to keep the cursor visible.
///
/// Returns the number of characters to skip from the start of the text.
pub fn calculate_scroll_offset(cursor: usize, available_width: usize) -> usize {
    if cursor <= available_width {
        0
    } else {
        cursor.saturating_sub(available_width)
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// Single-line labelled field; the password field renders masked.
pub struct InputField<'a> {
    title: &'a str,
    text: &'a str,
    cursor: usize,
    focused: bool,
    masked: bool,
}

impl<'a> InputField<'a> {
    pub fn new(title: &'a str, text: &'a str, cursor: usize, focused: bool) -> Self {
        Self {
            title,
            text,
            cursor,
            focused,
            masked: false,
        }
    }

    /// Renders every character as `*`.
    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    /// Screen position of the cursor when rendered into `area`.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        let available = area.width.saturating_sub(3) as usize;
        let offset = calculate_scroll_offset(self.cursor, available);
        let x = area.x + 1 + (self.cursor - offset) as u16;
        (x.min(area.right().saturating_sub(2)), area.y + 1)
    }

    fn visible_text(&self, available: usize) -> String {
        let offset = calculate_scroll_offset(self.cursor, available);
        let chars = self.text.chars().skip(offset).take(available);
        if self.masked {
            chars.map(|_| '*').collect()
        } else {
            chars.collect()
        }
    }
}

impl Widget for InputField<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(self.focused))
            .title(format!(" {} ", self.title));

        // Borders (2) + cursor space (1)
        let available = area.width.saturating_sub(3) as usize;
        let line = Line::from(Span::raw(self.visible_text(available)));

        Paragraph::new(line).block(block).render(area, buf);
    }
}

/// Multi-line editor for the query text.
pub struct QueryEditor<'a> {
    text: &'a str,
    cursor_line: usize,
    focused: bool,
}

impl<'a> QueryEditor<'a> {
    pub fn new(text: &'a str, cursor_line: usize, focused: bool) -> Self {
        Self {
            text,
            cursor_line,
            focused,
        }
    }

    /// First visible line so that the cursor line stays on screen.
    pub fn scroll_offset(cursor_line: usize, area: Rect) -> usize {
        let visible = area.height.saturating_sub(2).max(1) as usize;
        cursor_line.saturating_sub(visible - 1)
    }
}

impl Widget for QueryEditor<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(self.focused))
            .title(" Query ")
            .title_bottom(Line::from(Span::styled(
                " F5 execute ",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));

        let lines: Vec<Line> = self.text.split('\n').map(Line::from).collect();
        let offset = Self::scroll_offset(self.cursor_line, area) as u16;

        Paragraph::new(lines)
            .block(block)
            .scroll((offset, 0))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_offset_cursor_within_width() {
        assert_eq!(calculate_scroll_offset(5, 20), 0);
        assert_eq!(calculate_scroll_offset(20, 20), 0);
    }

    #[test]
    fn test_scroll_offset_cursor_beyond_width() {
        assert_eq!(calculate_scroll_offset(25, 20), 5);
        assert_eq!(calculate_scroll_offset(50, 20), 30);
    }

    #[test]
    fn test_masked_field_hides_text() {
        let field = InputField::new("Password", "hunter2", 7, true).masked();
        assert_eq!(field.visible_text(20), "*******");
    }

    #[test]
    fn test_field_scrolls_to_cursor() {
        let field = InputField::new("URL", "abcdefghij", 10, true);
        assert_eq!(field.visible_text(4), "ghij");
    }

    #[test]
    fn test_cursor_position() {
        let field = InputField::new("User", "root", 4, true);
        assert_eq!(field.cursor_position(Rect::new(10, 2, 20, 3)), (15, 3));
    }

    #[test]
    fn test_editor_scroll_offset() {
        let area = Rect::new(0, 0, 40, 6);
        assert_eq!(QueryEditor::scroll_offset(0, area), 0);
        assert_eq!(QueryEditor::scroll_offset(3, area), 0);
        assert_eq!(QueryEditor::scroll_offset(6, area), 3);
    }
}
