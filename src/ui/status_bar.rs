use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use spark_chat::store::HISTORY_CAPACITY;

use crate::state::{AppState, ConnectionState};
use crate::theme::ThemeColors;

/// Render the status bar (bottom row).
pub fn render(f: &mut Frame, area: Rect, state: &AppState, theme: &ThemeColors) {
    let (dot, dot_color) = match state.connection {
        ConnectionState::Connected => ("●", theme.accent),
        ConnectionState::Connecting => ("◌", theme.warning),
        ConnectionState::Disconnected => ("○", theme.error),
    };

    let conn_label = match state.connection {
        ConnectionState::Connected => "connected",
        ConnectionState::Connecting => "connecting",
        ConnectionState::Disconnected => "offline",
    };

    let caps = state.session.capabilities();
    let mode = if caps.auto_start_dictation { "quick" } else { "browse" };

    let activity = if state.composer.is_some() {
        " │ listening"
    } else if state.session.is_awaiting() {
        " │ thinking"
    } else {
        ""
    };

    let turns = format!("{}/{}", state.session.store().len(), HISTORY_CAPACITY);

    let status_line = Line::from(vec![
        Span::styled(" ", Style::default().fg(theme.text_dim)),
        Span::styled(dot, Style::default().fg(dot_color)),
        Span::styled(format!(" {} ", conn_label), Style::default().fg(theme.text_muted)),
        Span::styled("│ ", Style::default().fg(theme.text_dim)),
        Span::styled(mode, Style::default().fg(theme.primary)),
        Span::styled(" │ ", Style::default().fg(theme.text_dim)),
        Span::styled(turns, Style::default().fg(theme.text_muted)),
        Span::styled(activity, Style::default().fg(theme.warning)),
    ]);

    f.render_widget(Paragraph::new(status_line), area);
}
