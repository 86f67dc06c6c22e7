use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

use spark_chat::session::SessionController;

use crate::theme::ThemeColors;

/// Render the right-edge action bar: scroll arrows top and bottom, the
/// dictate button in the middle.
pub fn render(f: &mut Frame, area: Rect, session: &SessionController, theme: &ThemeColors) {
    f.render_widget(Block::default().style(Style::default().bg(theme.text_dim)), area);
    if area.height == 0 {
        return;
    }

    let bar = session.action_bar();
    let icon_style = Style::default().fg(theme.text).bg(theme.text_dim);
    let mut icon = |y: u16, glyph: &'static str| {
        let row = Rect { y, height: 1, ..area };
        let line = Line::from(Span::styled(glyph, icon_style));
        f.render_widget(Paragraph::new(line).alignment(Alignment::Center), row);
    };

    if bar.scroll {
        icon(area.y, "▲");
        icon(area.y + area.height - 1, "▼");
    }
    if bar.dictate {
        icon(area.y + area.height / 2, "●");
    }
}
