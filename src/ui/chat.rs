use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use spark_chat::animation::SpriteAnimator;
use spark_chat::layout::{Bubble, FlowLayout, Footer, Layout};
use spark_chat::session::{SessionController, EMPTY_STATE_PROMPT};
use spark_chat::store::Role;

use crate::theme::ThemeColors;

const SETUP_TEXT: &str = "Configure the bridge\nin settings";

/// Render the conversation region.
pub fn render(f: &mut Frame, area: Rect, session: &SessionController, theme: &ThemeColors) {
    match session.layout() {
        Layout::Empty => render_empty_state(f, area, session.empty_spark(), theme),
        Layout::Flow(flow) => render_flow(f, area, session, flow, theme),
    }
}

/// Shown while the bridge reports the assistant as unconfigured.
pub fn render_setup(f: &mut Frame, area: Rect, theme: &ThemeColors) {
    let lines: Vec<Line> = SETUP_TEXT
        .lines()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(theme.text).add_modifier(Modifier::BOLD))))
        .collect();
    render_centered(f, area, lines);
}

fn render_empty_state(f: &mut Frame, area: Rect, spark: &SpriteAnimator, theme: &ThemeColors) {
    let spark_style = Style::default().fg(theme.primary);
    let mut lines: Vec<Line> = spark
        .current_frame()
        .glyph
        .iter()
        .map(|row| Line::from(Span::styled(row.as_str(), spark_style)))
        .collect();
    lines.push(Line::from(""));
    lines.extend(
        EMPTY_STATE_PROMPT
            .lines()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(theme.text).add_modifier(Modifier::BOLD)))),
    );
    render_centered(f, area, lines);
}

fn render_centered(f: &mut Frame, area: Rect, lines: Vec<Line>) {
    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).min(area.height);
    let centered = Rect {
        y: area.y + (area.height - height) / 2,
        height,
        ..area
    };
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), centered);
}

/// Draw the laid-out content onto a virtual canvas one row per px, then show
/// the slice selected by the scroll offset.
fn render_flow(f: &mut Frame, area: Rect, session: &SessionController, flow: &FlowLayout, theme: &ThemeColors) {
    let width = usize::from(area.width);
    let padding = cells(session.metrics().bubble_padding);
    let mut lines: Vec<Line> = Vec::with_capacity(cells(flow.content_height));

    for bubble in &flow.bubbles {
        pad_rows(&mut lines, cells(bubble.y));
        bubble_rows(&mut lines, bubble, padding, width, theme);
    }

    pad_rows(&mut lines, cells(flow.footer_y));
    footer_rows(&mut lines, session.footer(), theme);

    let scroll = u16::try_from(-session.scroll().offset()).unwrap_or(0);
    f.render_widget(Paragraph::new(lines).scroll((scroll, 0)), area);
}

fn bubble_rows(lines: &mut Vec<Line>, bubble: &Bubble, padding: usize, width: usize, theme: &ThemeColors) {
    let style = match bubble.role {
        Role::User => Style::default().fg(theme.text).bg(theme.bubble),
        Role::Assistant => Style::default().fg(theme.text),
    };
    let indent = " ".repeat(padding);

    for row in 0..cells(bubble.height) {
        let text = row
            .checked_sub(padding)
            .and_then(|i| bubble.text.lines.get(i))
            .map(String::as_str)
            .unwrap_or("");
        let content = fill(&format!("{indent}{text}"), width);
        lines.push(Line::from(Span::styled(content, style)));
    }
}

fn footer_rows(lines: &mut Vec<Line>, footer: &Footer, theme: &ThemeColors) {
    let (spark_x, spark_y, _) = footer.spark_rect();
    let (text_x, text_y) = footer.text_origin();
    let glyph = &footer.spark().current_frame().glyph;
    let spark_style = Style::default().fg(theme.primary);
    let text_style = Style::default().fg(theme.text_muted);

    for row in 0..footer.height() {
        let mut spans = vec![Span::raw(" ".repeat(cells(spark_x)))];
        let mut col = cells(spark_x);

        if let Some(g) = usize::try_from(row - spark_y).ok().and_then(|i| glyph.get(i)) {
            spans.push(Span::styled(g.clone(), spark_style));
            col += g.width();
        }
        if let Some(t) = usize::try_from(row - text_y).ok().and_then(|i| footer.text().lines.get(i)) {
            spans.push(Span::raw(" ".repeat(cells(text_x).saturating_sub(col))));
            spans.push(Span::styled(t.clone(), text_style));
        }
        lines.push(Line::from(spans));
    }
}

/// Push blank rows until `lines` is `row` long.
fn pad_rows(lines: &mut Vec<Line>, row: usize) {
    while lines.len() < row {
        lines.push(Line::from(""));
    }
}

/// Right-pad `text` with spaces to `width` display columns.
fn fill(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(pad))
}

/// Layout px to terminal cells.
fn cells(px: i32) -> usize {
    usize::try_from(px).unwrap_or(0)
}
