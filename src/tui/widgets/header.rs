//! Header bar: application name, connection target and activity.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::Widget,
};

/// Header bar widget.
pub struct Header<'a> {
    connection_info: Option<&'a str>,
    activity: Option<&'a str>,
}

impl<'a> Header<'a> {
    pub fn new(connection_info: Option<&'a str>, activity: Option<&'a str>) -> Self {
        Self {
            connection_info,
            activity,
        }
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        for x in area.left()..area.right() {
            buf[(x, area.y)].set_style(style);
        }

        let left_text = format!(" db-sheet v{}", env!("CARGO_PKG_VERSION"));
        buf.set_span(area.x, area.y, &Span::styled(left_text, style), area.width);

        if let Some(activity) = self.activity {
            let activity_style = style.fg(Color::Yellow);
            let width = activity.chars().count() as u16;
            let x = area.x + area.width.saturating_sub(width) / 2;
            buf.set_string(x, area.y, activity, activity_style);
        }

        if let Some(info) = self.connection_info {
            let right_text = format!(" [db: {info}] ");
            let right_width = right_text.chars().count() as u16;
            if right_width < area.width {
                let right_x = area.right().saturating_sub(right_width);
                buf.set_string(right_x, area.y, &right_text, style);
            }
        }
    }
}
