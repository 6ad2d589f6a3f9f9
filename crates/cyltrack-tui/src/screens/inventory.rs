//! Inventory screen: scanner input on top, one section per cylinder type
//! below, each listing its cylinders as compact cards.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tui_input::Input;

use cyltrack_core::{Command, Cylinder, MeasurementUnit, Snapshot, StockLevel};

use crate::action::{Action, PendingDelete};
use crate::component::Component;
use crate::theme;
use crate::widgets::text_input;

/// A selectable row: a type heading or one of its cylinders.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Type { type_id: String },
    Cylinder { type_id: String, id: String },
}

impl Item {
    fn type_id(&self) -> &str {
        match self {
            Self::Type { type_id } | Self::Cylinder { type_id, .. } => type_id,
        }
    }
}

pub struct InventoryScreen {
    snapshot: Arc<Snapshot>,
    items: Vec<Item>,
    selected: usize,
    scan_input: Input,
    input_focused: bool,
}

impl InventoryScreen {
    pub fn new() -> Self {
        Self {
            snapshot: Arc::new(Snapshot::default()),
            items: Vec::new(),
            selected: 0,
            scan_input: Input::default(),
            input_focused: false,
        }
    }

    /// Install a new snapshot, keeping the selection on the same row when
    /// it still exists.
    fn set_snapshot(&mut self, snapshot: Arc<Snapshot>) {
        let previous = self.items.get(self.selected).cloned();
        self.items = selectable_items(&snapshot);
        self.snapshot = snapshot;

        self.selected = previous
            .and_then(|prev| {
                self.items.iter().position(|i| *i == prev).or_else(|| {
                    // Deleted cylinder: fall back to its type heading
                    self.items
                        .iter()
                        .position(|i| matches!(i, Item::Type { type_id } if type_id == prev.type_id()))
                })
            })
            .unwrap_or(self.selected)
            .min(self.items.len().saturating_sub(1));
    }

    fn selected_item(&self) -> Option<&Item> {
        self.items.get(self.selected)
    }

    fn select_next(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn handle_input_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.input_focused = false;
                None
            }
            KeyCode::Enter => {
                let raw = self.scan_input.value().to_owned();
                self.scan_input.reset();
                self.input_focused = false;
                Some(Action::ResolveScan(raw))
            }
            _ => {
                text_input::handle_key(&mut self.scan_input, key);
                None
            }
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }
        match key.code {
            KeyCode::Char('/') => {
                self.input_focused = true;
                None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.select_next();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.select_prev();
                None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.selected = 0;
                None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.selected = self.items.len().saturating_sub(1);
                None
            }
            KeyCode::Enter => match self.selected_item() {
                Some(Item::Cylinder { id, .. }) => Some(Action::OpenEditCylinder(id.clone())),
                _ => None,
            },
            KeyCode::Char('a') => Some(Action::OpenAddType),
            KeyCode::Char('c') => Some(Action::OpenScan),
            KeyCode::Char('n') => self.selected_item().map(|item| {
                Action::Execute(Command::AddCylinder {
                    type_id: item.type_id().to_owned(),
                })
            }),
            KeyCode::Char('D') => {
                let type_id = self.selected_item()?.type_id();
                let ty = self.snapshot.type_by_id(type_id)?;
                Some(Action::ShowConfirm(PendingDelete::Type {
                    id: ty.id.clone(),
                    name: ty.name.clone(),
                }))
            }
            _ => None,
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let hints: &[(&str, &str)] = if self.input_focused {
            &[("Enter", "look up"), ("Esc", "back")]
        } else {
            &[
                ("/", "scan id"),
                ("c", "camera"),
                ("a", "add type"),
                ("n", "add cylinder"),
                ("D", "delete type"),
                ("?", "help"),
                ("q", "quit"),
            ]
        };

        let mut spans = vec![Span::styled(" Gas Cylinder Tracker ", theme::title_style())];
        for (key, label) in hints {
            spans.push(Span::styled(format!(" {key} "), theme::key_hint_key()));
            spans.push(Span::styled(*label, theme::key_hint()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_sections(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Inventory ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.input_focused {
                theme::border_default()
            } else {
                theme::border_focused()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.snapshot.types.is_empty() {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No cylinder types found. Press a to add one.",
                    theme::muted(),
                )),
            ])
            .alignment(Alignment::Center);
            frame.render_widget(empty, inner);
            return;
        }

        let selected = self.selected_item();
        let mut lines = Vec::new();
        let mut selected_line = 0usize;

        for ty in &self.snapshot.types {
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }

            let heading = Item::Type {
                type_id: ty.id.clone(),
            };
            let is_selected = selected == Some(&heading);
            if is_selected {
                selected_line = lines.len();
            }
            let count = self.snapshot.cylinders_of(&ty.id).count();
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{} {}", if is_selected { "▸" } else { "▌" }, ty.name),
                    if is_selected {
                        theme::row_selected()
                    } else {
                        theme::section_header()
                    },
                ),
                Span::styled(
                    format!("  {} · {} · {count} cylinders", ty.unit, ty.unit.label()),
                    theme::muted(),
                ),
            ]));

            if count == 0 {
                lines.push(Line::from(Span::styled(
                    "    No cylinders of this type yet.",
                    theme::muted(),
                )));
                continue;
            }

            for cylinder in self.snapshot.cylinders_of(&ty.id) {
                let is_selected = matches!(
                    selected,
                    Some(Item::Cylinder { id, .. }) if *id == cylinder.id
                );
                if is_selected {
                    selected_line = lines.len();
                }
                lines.push(card_line(cylinder, ty.unit, is_selected));
            }
        }

        let height = usize::from(inner.height.max(1));
        let offset = (selected_line + 1).saturating_sub(height);
        let offset = u16::try_from(offset).unwrap_or(u16::MAX);
        frame.render_widget(Paragraph::new(lines).scroll((offset, 0)), inner);
    }
}

/// Initial selectable rows for a snapshot, in display order.
fn selectable_items(snapshot: &Snapshot) -> Vec<Item> {
    let mut items = Vec::with_capacity(snapshot.types.len() + snapshot.cylinders.len());
    for ty in &snapshot.types {
        items.push(Item::Type {
            type_id: ty.id.clone(),
        });
        items.extend(snapshot.cylinders_of(&ty.id).map(|c| Item::Cylinder {
            type_id: ty.id.clone(),
            id: c.id.clone(),
        }));
    }
    items
}

/// One cylinder rendered as a single card row.
fn card_line(cylinder: &Cylinder, unit: MeasurementUnit, selected: bool) -> Line<'static> {
    let label = unit.label();
    let base = if selected { theme::row_selected() } else { theme::row() };
    let marker = if selected { "  ▸ " } else { "    " };

    let mut spans = vec![Span::styled(format!("{marker}{}", cylinder.id), base)];
    match cylinder.net_contents(unit) {
        Some(net) => {
            spans.push(Span::styled(format!("   net {net:.1} {label}"), base));
            spans.push(Span::styled(
                format!(
                    "   total {:.1} {label}   tare {:.1} {label}",
                    cylinder.value,
                    cylinder.tare_weight.unwrap_or(0.0)
                ),
                theme::muted(),
            ));
        }
        None => spans.push(Span::styled(format!("   {} {label}", cylinder.value), base)),
    }
    if StockLevel::of(cylinder, unit).is_low() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(" LOW ", theme::low_badge()));
    }
    Line::from(spans)
}

impl Component for InventoryScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.input_focused {
            return Ok(self.handle_input_key(key));
        }
        Ok(self.handle_list_key(key))
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::SnapshotUpdated(snapshot) = action {
            self.set_snapshot(Arc::clone(snapshot));
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(area);

        self.render_header(frame, layout[0]);
        text_input::render(
            frame,
            layout[1],
            "Cylinder ID",
            &self.scan_input,
            "Press / and type a 6-digit ID",
            self.input_focused,
        );
        self.render_sections(frame, layout[2]);
    }

    fn captures_input(&self) -> bool {
        self.input_focused
    }
}
