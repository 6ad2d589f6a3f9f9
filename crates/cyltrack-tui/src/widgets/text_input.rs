//! Single-line text field backed by `tui_input::Input`.
//!
//! Key events are translated to [`InputRequest`]s here rather than through
//! the crate's backend adapter, so the field works with whatever crossterm
//! version the app links.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::Style,
    text::Span,
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tui_input::{Input, InputRequest};

use crate::theme;

/// Map a key press to an edit request. `None` for keys the field ignores.
pub fn request_for(key: KeyEvent) -> Option<InputRequest> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let req = match key.code {
        KeyCode::Char('u') if ctrl => InputRequest::DeleteLine,
        KeyCode::Char('w') if ctrl => InputRequest::DeletePrevWord,
        KeyCode::Char('a') if ctrl => InputRequest::GoToStart,
        KeyCode::Char('e') if ctrl => InputRequest::GoToEnd,
        KeyCode::Char(_) if ctrl => return None,
        KeyCode::Char(c) => InputRequest::InsertChar(c),
        KeyCode::Backspace => InputRequest::DeletePrevChar,
        KeyCode::Delete => InputRequest::DeleteNextChar,
        KeyCode::Left => InputRequest::GoToPrevChar,
        KeyCode::Right => InputRequest::GoToNextChar,
        KeyCode::Home => InputRequest::GoToStart,
        KeyCode::End => InputRequest::GoToEnd,
        _ => return None,
    };
    Some(req)
}

/// Apply a key press to `input`. Returns whether the key was consumed.
pub fn handle_key(input: &mut Input, key: KeyEvent) -> bool {
    match request_for(key) {
        Some(req) => {
            input.handle(req);
            true
        }
        None => false,
    }
}

/// Render a bordered field with `label` as its title. When `active`, the
/// terminal cursor is placed at the edit position.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    input: &Input,
    placeholder: &str,
    active: bool,
) {
    let border = if active {
        theme::border_focused()
    } else {
        theme::border_default()
    };
    let block = Block::default()
        .title(Span::styled(format!(" {label} "), theme::title_style()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = usize::from(inner.width.max(1).saturating_sub(1));
    let scroll = input.visual_scroll(width);

    let text = if input.value().is_empty() && !active {
        Span::styled(placeholder, theme::muted())
    } else {
        Span::styled(input.value(), Style::default().fg(theme::TEXT))
    };
    let scroll_x = u16::try_from(scroll).unwrap_or(u16::MAX);
    frame.render_widget(Paragraph::new(text).scroll((0, scroll_x)), inner);

    if active {
        let cursor = input.visual_cursor().saturating_sub(scroll);
        let x = inner.x + u16::try_from(cursor).unwrap_or(u16::MAX).min(inner.width.saturating_sub(1));
        frame.set_cursor_position(Position::new(x, inner.y));
    }
}
