//! Yes/no dialog guarding destructive commands.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::action::{Action, PendingDelete};
use crate::component::Component;
use crate::theme;
use crate::widgets::centered;

pub struct ConfirmModal {
    pending: PendingDelete,
}

impl ConfirmModal {
    pub fn new(pending: PendingDelete) -> Self {
        Self { pending }
    }

    fn title(&self) -> String {
        match &self.pending {
            PendingDelete::Type { name, .. } => format!(" Delete {name}? "),
            PendingDelete::Cylinder { id } => format!(" Delete cylinder {id}? "),
        }
    }
}

impl Component for ConfirmModal {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match key.code {
            KeyCode::Char('y' | 'Y') => Some(Action::Execute(self.pending.clone().into_command())),
            KeyCode::Char('n' | 'N' | 'q') | KeyCode::Esc => Some(Action::CloseModal),
            _ => None,
        })
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let dialog = centered(area, 56, 8);
        frame.render_widget(Clear, dialog);

        let block = Block::default()
            .title(self.title())
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::AMBER))
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        let text = vec![
            Line::from(Span::styled(self.pending.to_string(), theme::row())),
            Line::from(""),
            Line::from(vec![
                Span::styled("y ", theme::key_hint_key()),
                Span::styled("delete    ", theme::key_hint()),
                Span::styled("n ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
    }
}
