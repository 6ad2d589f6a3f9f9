//! Add-type modal: a name field and a unit toggle.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tui_input::Input;

use cyltrack_core::ops::validate_type_name;
use cyltrack_core::{Command, MeasurementUnit};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::{centered, text_input};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Unit,
}

pub struct AddTypeModal {
    name: Input,
    unit: MeasurementUnit,
    field: Field,
    error: Option<String>,
}

impl AddTypeModal {
    pub fn new() -> Self {
        Self {
            name: Input::default(),
            unit: MeasurementUnit::Mass,
            field: Field::Name,
            error: None,
        }
    }

    fn submit(&mut self) -> Option<Action> {
        match validate_type_name(self.name.value()) {
            Ok(name) => Some(Action::Execute(Command::AddType {
                name,
                unit: self.unit,
            })),
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }

    fn switch_field(&mut self) {
        self.field = match self.field {
            Field::Name => Field::Unit,
            Field::Unit => Field::Name,
        };
    }
}

impl Component for AddTypeModal {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        self.error = None;
        match key.code {
            KeyCode::Esc => return Ok(Some(Action::CloseModal)),
            KeyCode::Enter => return Ok(self.submit()),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => self.switch_field(),
            _ => match self.field {
                Field::Name => {
                    text_input::handle_key(&mut self.name, key);
                }
                Field::Unit => {
                    if matches!(
                        key.code,
                        KeyCode::Char(' ' | 'h' | 'l') | KeyCode::Left | KeyCode::Right
                    ) {
                        self.unit = self.unit.toggled();
                    }
                }
            },
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let dialog = centered(area, 50, 11);
        frame.render_widget(Clear, dialog);

        let block = Block::default()
            .title(" Add Cylinder Type ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        let rows = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

        text_input::render(
            frame,
            rows[0],
            "Type Name",
            &self.name,
            "e.g. Oxygen",
            self.field == Field::Name,
        );

        let unit_focused = self.field == Field::Unit;
        let option = |unit: MeasurementUnit, label: &'static str| {
            let marker = if self.unit == unit { "(•)" } else { "( )" };
            let style = if self.unit == unit {
                theme::row_selected()
            } else {
                theme::row()
            };
            Span::styled(format!(" {marker} {label} "), style)
        };
        let label_style = if unit_focused {
            Style::default().fg(theme::SKY)
        } else {
            theme::muted()
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" Unit  ", label_style),
                option(MeasurementUnit::Mass, "Mass (kg)"),
                Span::raw(" "),
                option(MeasurementUnit::Pressure, "Pressure (PSI)"),
            ])),
            rows[2],
        );

        if let Some(error) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(format!(" {error}"), Style::default().fg(theme::ERROR_RED))),
                rows[3],
            );
        }

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" Tab ", theme::key_hint_key()),
                Span::styled("field  ", theme::key_hint()),
                Span::styled("Space ", theme::key_hint_key()),
                Span::styled("unit  ", theme::key_hint()),
                Span::styled("Enter ", theme::key_hint_key()),
                Span::styled("add  ", theme::key_hint()),
                Span::styled("Esc ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ])),
            rows[4],
        );
    }

    fn captures_input(&self) -> bool {
        true
    }
}
