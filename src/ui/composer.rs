use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::state::Composer;
use crate::theme::ThemeColors;

/// Render the dictation box with horizontal scrolling for long input.
pub fn render(f: &mut Frame, area: Rect, composer: &Composer, theme: &ThemeColors) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.primary))
        .title(Span::styled(" dictate ", Style::default().fg(theme.primary)))
        .style(Style::default().bg(theme.surface));

    // Inner width available for text (2 borders + 1 char left padding)
    let inner_width = usize::from(area.width.saturating_sub(3)).max(1);

    if composer.input.is_empty() {
        let placeholder = Line::from(Span::styled(
            " say something… (enter to send, esc to cancel)",
            Style::default().fg(theme.text_muted).add_modifier(Modifier::ITALIC),
        ));
        f.render_widget(Paragraph::new(placeholder).block(block), area);
        return;
    }

    // Keep the cursor visible within inner_width
    let cursor = composer.cursor_pos;
    let chars: Vec<char> = composer.input.chars().collect();
    let scroll_offset = if cursor < inner_width {
        0
    } else {
        cursor - inner_width + 1
    };

    let visible_end = (scroll_offset + inner_width).min(chars.len());
    let visible: String = chars[scroll_offset..visible_end].iter().collect();

    let cursor_in_view = cursor - scroll_offset;
    let before: String = visible.chars().take(cursor_in_view).collect();
    let cursor_char = visible.chars().nth(cursor_in_view).unwrap_or(' ');
    let after: String = visible.chars().skip(cursor_in_view + 1).collect();

    let left_indicator = if scroll_offset > 0 { "…" } else { " " };

    let display_text = Line::from(vec![
        Span::styled(left_indicator, Style::default().fg(theme.text_dim)),
        Span::styled(before, Style::default().fg(theme.text)),
        Span::styled(
            cursor_char.to_string(),
            Style::default().fg(theme.surface).bg(theme.text),
        ),
        Span::styled(after, Style::default().fg(theme.text)),
    ]);

    f.render_widget(Paragraph::new(display_text).block(block), area);
}
