//! Edit-cylinder modal: new readings, the QR link, and a delete shortcut.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tui_input::Input;

use cyltrack_core::{Command, Cylinder, CylinderUpdate, MeasurementUnit};

use crate::action::{Action, PendingDelete};
use crate::component::Component;
use crate::theme;
use crate::widgets::{centered, text_input};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Value,
    Tare,
}

pub struct EditCylinderModal {
    id: String,
    type_name: String,
    unit: MeasurementUnit,
    qr_url: String,
    value: Input,
    tare: Input,
    field: Field,
    invalid: bool,
}

impl EditCylinderModal {
    pub fn new(cylinder: &Cylinder, type_name: &str, unit: MeasurementUnit, qr_url: String) -> Self {
        Self {
            id: cylinder.id.clone(),
            type_name: type_name.to_owned(),
            unit,
            qr_url,
            value: Input::new(cylinder.value.to_string()),
            tare: Input::new(cylinder.tare_weight.unwrap_or(0.0).to_string()),
            field: Field::Value,
            invalid: false,
        }
    }

    pub fn cylinder_id(&self) -> &str {
        &self.id
    }

    fn save(&mut self) -> Option<Action> {
        let Some(update) = parse_update(self.unit, self.value.value(), self.tare.value()) else {
            self.invalid = true;
            return None;
        };
        Some(Action::Execute(Command::UpdateCylinder {
            id: self.id.clone(),
            update,
        }))
    }

    fn switch_field(&mut self) {
        if self.unit.is_mass() {
            self.field = match self.field {
                Field::Value => Field::Tare,
                Field::Tare => Field::Value,
            };
        }
    }

    fn active_input(&mut self) -> &mut Input {
        match self.field {
            Field::Value => &mut self.value,
            Field::Tare => &mut self.tare,
        }
    }
}

/// Parse the form into an update. Mass needs both readings, pressure only
/// the gauge value. Any unparsable or non-finite reading rejects the save.
pub fn parse_update(unit: MeasurementUnit, value: &str, tare: &str) -> Option<CylinderUpdate> {
    let value = parse_reading(value)?;
    if unit.is_mass() {
        Some(CylinderUpdate::with_tare(value, parse_reading(tare)?))
    } else {
        Some(CylinderUpdate::value(value))
    }
}

fn parse_reading(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

impl Component for EditCylinderModal {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        self.invalid = false;
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => Ok(Some(Action::CloseModal)),
            (_, KeyCode::Enter) => Ok(self.save()),
            (KeyModifiers::CONTROL, KeyCode::Char('d')) => {
                Ok(Some(Action::ShowConfirm(PendingDelete::Cylinder {
                    id: self.id.clone(),
                })))
            }
            (_, KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down) => {
                self.switch_field();
                Ok(None)
            }
            _ => {
                text_input::handle_key(self.active_input(), key);
                Ok(None)
            }
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let is_mass = self.unit.is_mass();
        let dialog = centered(area, 60, if is_mass { 15 } else { 12 });
        frame.render_widget(Clear, dialog);

        let block = Block::default()
            .title(format!(" Edit Cylinder {} ", self.id))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(if is_mass { 3 } else { 0 }),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" Cylinder ID: ", theme::muted()),
                Span::styled(&self.id, theme::row_selected()),
                Span::styled(format!("  {}", self.type_name), theme::section_header()),
            ])),
            rows[0],
        );
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" QR: ", theme::muted()),
                Span::styled(&self.qr_url, theme::link()),
            ])),
            rows[1],
        );

        let label = self.unit.label();
        let value_label = if is_mass {
            format!("Total Weight ({label})")
        } else {
            format!("Pressure ({label})")
        };
        text_input::render(
            frame,
            rows[3],
            &value_label,
            &self.value,
            "0",
            self.field == Field::Value,
        );
        if is_mass {
            text_input::render(
                frame,
                rows[4],
                &format!("Tare Weight ({label})"),
                &self.tare,
                "0",
                self.field == Field::Tare,
            );
        }

        if self.invalid {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    " Enter a number in every field.",
                    Style::default().fg(theme::ERROR_RED),
                )),
                rows[5],
            );
        }

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" Enter ", theme::key_hint_key()),
                Span::styled("save  ", theme::key_hint()),
                Span::styled("Ctrl+d ", theme::key_hint_key()),
                Span::styled("delete  ", theme::key_hint()),
                Span::styled("Tab ", theme::key_hint_key()),
                Span::styled("field  ", theme::key_hint()),
                Span::styled("Esc ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ])),
            rows[6],
        );
    }

    fn captures_input(&self) -> bool {
        true
    }
}
