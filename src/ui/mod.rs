pub mod action_bar;
pub mod chat;
pub mod composer;
pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Clear};
use ratatui::Frame;

use crate::state::AppState;
use crate::theme::ThemeColors;

/// Columns taken by the action bar on the right edge.
const ACTION_BAR_WIDTH: u16 = 3;

/// Rows taken by the open composer at the bottom of the chat area.
const COMPOSER_HEIGHT: u16 = 3;

struct Areas {
    chat: Rect,
    action_bar: Rect,
    status: Rect,
}

fn split(size: Rect) -> Areas {
    // Layout: chat + action bar fill space, status bar is 1 row
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(size);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(ACTION_BAR_WIDTH)])
        .split(rows[0]);
    Areas {
        chat: cols[0],
        action_bar: cols[1],
        status: rows[1],
    }
}

/// The conversation viewport inside a terminal of `size`.
pub fn chat_area(size: Rect) -> Rect {
    split(size).chat
}

/// Render the full UI layout.
pub fn render(f: &mut Frame, state: &AppState, theme: &ThemeColors) {
    let size = f.area();
    let areas = split(size);

    f.render_widget(Block::default().style(Style::default().bg(theme.surface)), size);

    if state.ready {
        chat::render(f, areas.chat, &state.session, theme);
        action_bar::render(f, areas.action_bar, &state.session, theme);
    } else {
        chat::render_setup(f, areas.chat, theme);
    }

    if let Some(composer) = &state.composer {
        let height = COMPOSER_HEIGHT.min(areas.chat.height);
        let area = Rect {
            y: areas.chat.y + areas.chat.height - height,
            height,
            ..areas.chat
        };
        f.render_widget(Clear, area);
        composer::render(f, area, composer, theme);
    }

    status_bar::render(f, areas.status, state, theme);
}
