//! Application core: event loop, modal management, action dispatch.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, Utc};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use cyltrack_core::{Command, CommandResult, Inventory, QrLink, ScanError, ScanSource, Snapshot};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::data_bridge::spawn_data_bridge;
use crate::event::{Event, EventReader};
use crate::modals::{AddTypeModal, ConfirmModal, EditCylinderModal, Modal, ScanModal};
use crate::screens::InventoryScreen;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::centered;

/// How long a toast stays on screen.
const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Top-level application state and event loop.
pub struct App {
    inventory: Inventory,
    scanner: Arc<dyn ScanSource>,
    qr: QrLink,
    screen: InventoryScreen,
    /// Open dialog, if any. Closing a scan modal drops its session.
    modal: Option<Modal>,
    snapshot: Arc<Snapshot>,
    last_saved: Option<DateTime<Utc>>,
    notification: Option<(Notification, Instant)>,
    help_visible: bool,
    running: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(inventory: Inventory, scanner: Arc<dyn ScanSource>, qr: QrLink) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let snapshot = inventory.snapshot();
        Self {
            inventory,
            scanner,
            qr,
            screen: InventoryScreen::new(),
            modal: None,
            snapshot,
            last_saved: None,
            notification: None,
            help_visible: false,
            running: true,
            action_tx,
            action_rx,
        }
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::enter()?;
        if let Ok(size) = tui.size() {
            debug!(width = size.width, height = size.height, "terminal ready");
        }

        self.screen.init(self.action_tx.clone())?;

        let cancel = CancellationToken::new();
        let bridge = tokio::spawn(spawn_data_bridge(
            self.inventory.clone(),
            self.action_tx.clone(),
            cancel.clone(),
        ));

        let mut events = EventReader::spawn();

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Resize | Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                } else {
                    self.process_action(action)?;
                }
                if !self.running {
                    break;
                }
            }
        }

        // Stop any running scan before the terminal is restored
        self.modal = None;
        drop(events);
        cancel.cancel();
        let _ = bridge.await;
        drop(tui);
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Modals and the help overlay take
    /// keys first; global shortcuts are suspended while text is being typed.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?' | 'q') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        if let Some(modal) = self.modal.as_mut() {
            return modal.component_mut().handle_key_event(key);
        }

        if !self.screen.captures_input() {
            match key.code {
                KeyCode::Char('q') => return Ok(Some(Action::Quit)),
                KeyCode::Char('?') => return Ok(Some(Action::ToggleHelp)),
                KeyCode::Esc if self.notification.is_some() => {
                    return Ok(Some(Action::DismissNotification));
                }
                _ => {}
            }
        }

        self.screen.handle_key_event(key)
    }

    /// Process a single action: update app state and propagate to the screen.
    fn process_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Tick => {
                let expired = self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, created)| created.elapsed() >= NOTIFICATION_TTL);
                if expired {
                    self.notification = None;
                }
            }

            Action::Render => {}

            Action::SnapshotUpdated(snapshot) => {
                self.snapshot = Arc::clone(&snapshot);
                // An open editor for a cylinder that no longer exists is stale
                if let Some(Modal::EditCylinder(editor)) = &self.modal {
                    if self.snapshot.cylinder_by_id(editor.cylinder_id()).is_none() {
                        self.modal = None;
                    }
                }
                self.screen.update(&Action::SnapshotUpdated(snapshot))?;
            }

            Action::Saved(at) => self.last_saved = Some(at),

            Action::Execute(command) => {
                self.modal = None;
                self.execute(command);
            }

            Action::ResolveScan(raw) => self.resolve_scan(&raw)?,

            Action::ScanDecoded(text) => {
                if self.modal.as_ref().is_some_and(Modal::is_scan) {
                    info!(payload = %text, "scan decoded");
                    self.modal = None;
                    self.resolve_scan(&text)?;
                } else {
                    debug!(payload = %text, "ignoring decode after scan modal closed");
                }
            }

            Action::ScanFailed(message) => {
                if self.modal.as_ref().is_some_and(Modal::is_scan) {
                    warn!(error = %message, "scanner failed");
                    self.modal = None;
                    self.notify(Notification::error(format!("Scanner stopped: {message}")));
                }
            }

            Action::OpenAddType => self.open_modal(Modal::AddType(AddTypeModal::new()))?,

            Action::OpenEditCylinder(id) => self.open_editor(&id)?,

            Action::OpenScan => {
                self.open_modal(Modal::Scan(ScanModal::new(Arc::clone(&self.scanner))))?;
            }

            Action::ShowConfirm(pending) => {
                self.open_modal(Modal::Confirm(ConfirmModal::new(pending)))?;
            }

            Action::CloseModal => self.modal = None,

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::Notify(notification) => self.notify(notification),

            Action::DismissNotification => self.notification = None,
        }
        Ok(())
    }

    fn open_modal(&mut self, mut modal: Modal) -> Result<()> {
        // Replacing a scan modal drops and stops its session first
        self.modal = None;
        modal.component_mut().init(self.action_tx.clone())?;
        self.modal = Some(modal);
        Ok(())
    }

    fn open_editor(&mut self, id: &str) -> Result<()> {
        let Some(cylinder) = self.snapshot.cylinder_by_id(id) else {
            self.notify(Notification::error(format!("Cylinder with ID {id} not found.")));
            return Ok(());
        };
        let Some(ty) = self.snapshot.type_by_id(&cylinder.type_id) else {
            self.notify(Notification::error(format!(
                "Cylinder {id} belongs to an unknown type."
            )));
            return Ok(());
        };
        let qr_url = self.qr.image_url(cylinder).to_string();
        let editor = EditCylinderModal::new(cylinder, &ty.name, ty.unit, qr_url);
        self.open_modal(Modal::EditCylinder(editor))
    }

    fn resolve_scan(&mut self, raw: &str) -> Result<()> {
        match self.inventory.scan(raw) {
            Ok(cylinder) => self.open_editor(&cylinder.id),
            Err(ScanError::InvalidFormat { .. }) => {
                self.notify(Notification::error("Please enter a valid 6-digit cylinder ID."));
                Ok(())
            }
            Err(ScanError::NotFound { id }) => {
                self.notify(Notification::error(format!("Cylinder with ID {id} not found.")));
                Ok(())
            }
        }
    }

    /// Run a command against the inventory and report the outcome.
    fn execute(&mut self, command: Command) {
        let name = command.name();
        let saved_before = self.inventory.last_saved();
        let result = self.inventory.execute(command);
        debug!(command = name, ?result, "command executed");

        let notification = match &result {
            CommandResult::TypeAdded(ty) => Notification::success(format!("Added type {}", ty.name)),
            CommandResult::TypeDeleted {
                cylinders_removed, ..
            } => Notification::success(format!(
                "Deleted type and {cylinders_removed} cylinder(s)"
            )),
            CommandResult::CylinderAdded(c) => Notification::success(format!("Added cylinder {}", c.id)),
            CommandResult::CylinderUpdated(c) => {
                Notification::success(format!("Updated cylinder {}", c.id))
            }
            CommandResult::CylinderDeleted { id } => {
                Notification::success(format!("Deleted cylinder {id}"))
            }
            CommandResult::Unchanged => Notification::info("Nothing changed."),
        };

        if !result.is_unchanged() && self.inventory.last_saved() == saved_before {
            self.notify(Notification::warning(
                "Changes could not be written to disk; see the log file.",
            ));
        } else {
            self.notify(notification);
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.notification = Some((notification, Instant::now()));
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);

        self.screen.render(frame, layout[0]);
        self.render_status_bar(frame, layout[1]);

        if let Some(modal) = &self.modal {
            modal.component().render(frame, area);
        }
        if self.help_visible {
            render_help_overlay(frame, area);
        }
        if let Some((notification, _)) = &self.notification {
            render_notification(frame, area, notification);
        }
    }

    /// Bottom status bar: counts, low stock, and the last save time.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let low = self.snapshot.low_stock().len();
        let low_style = if low > 0 {
            Style::default().fg(theme::AMBER)
        } else {
            theme::muted()
        };
        let saved = self.last_saved.map_or_else(
            || "not saved yet".to_owned(),
            |at| format!("saved {}", at.with_timezone(&Local).format("%H:%M:%S")),
        );

        let line = Line::from(vec![
            Span::styled(
                format!(
                    " {} types · {} cylinders · ",
                    self.snapshot.types.len(),
                    self.snapshot.cylinders.len()
                ),
                theme::muted(),
            ),
            Span::styled(format!("{low} low"), low_style),
            Span::styled(format!(" │ {saved}"), theme::muted()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = centered(area, 52, 18);
    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let entry = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
            Span::styled(desc, theme::key_hint()),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled("  Inventory", theme::section_header())),
        entry("j/k ↑/↓", "Move selection"),
        entry("g/G", "Top / bottom"),
        entry("Enter", "Edit selected cylinder"),
        entry("a", "Add cylinder type"),
        entry("n", "Add cylinder to selected type"),
        entry("D", "Delete selected type"),
        Line::from(""),
        Line::from(Span::styled("  Scanning", theme::section_header())),
        entry("/", "Type a cylinder ID"),
        entry("c", "Scan with the configured device"),
        Line::from(""),
        Line::from(Span::styled("  Global", theme::section_header())),
        entry("?", "This help"),
        entry("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled("  Esc or ? to close", theme::key_hint())),
    ];
    frame.render_widget(Paragraph::new(help_text), inner);
}

/// Toast in the bottom-right corner, above the status bar.
fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
    let msg_len = u16::try_from(notification.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len
        .saturating_add(6)
        .clamp(20, 72)
        .min(area.width.saturating_sub(2));
    let height = 3u16;

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 1);
    let toast_area = Rect::new(area.x + x, area.y + y, width, height.min(area.height));

    let (color, icon) = match notification.level {
        NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
        NotificationLevel::Error => (theme::ERROR_RED, "✗"),
        NotificationLevel::Warning => (theme::AMBER, "!"),
        NotificationLevel::Info => (theme::SKY, "·"),
    };

    frame.render_widget(Clear, toast_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(color)),
        Span::styled(notification.message.as_str(), theme::row()),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cyltrack_core::{MemoryStore, MeasurementUnit};
    use pretty_assertions::assert_eq;

    /// Scanner stand-in that never starts.
    struct NoScanner;

    impl ScanSource for NoScanner {
        fn start(
            &self,
            target: cyltrack_core::ScanTarget,
            _on_decode: cyltrack_core::scanner::DecodeCallback,
            _on_error: cyltrack_core::scanner::ErrorCallback,
        ) -> std::result::Result<(), cyltrack_core::ScannerError> {
            Err(cyltrack_core::ScannerError::NotConfigured(target))
        }

        fn stop(&self) {}

        fn is_scanning(&self) -> bool {
            false
        }
    }

    fn app() -> App {
        App::new(
            Inventory::open(MemoryStore::new()),
            Arc::new(NoScanner),
            QrLink::default(),
        )
    }

    fn drain(app: &mut App) {
        while let Ok(action) = app.action_rx.try_recv() {
            app.process_action(action).unwrap();
        }
    }

    fn first_seed_cylinder(app: &App) -> String {
        app.snapshot.cylinders.first().unwrap().id.clone()
    }

    #[test]
    fn invalid_scan_notifies_without_modal() {
        let mut app = app();
        app.process_action(Action::ResolveScan("12ab".into())).unwrap();
        assert!(app.modal.is_none());
        let (n, _) = app.notification.as_ref().unwrap();
        assert_eq!(n.message, "Please enter a valid 6-digit cylinder ID.");
    }

    #[test]
    fn unknown_scan_reports_not_found() {
        let mut app = app();
        app.process_action(Action::ResolveScan("999999".into())).unwrap();
        let (n, _) = app.notification.as_ref().unwrap();
        assert_eq!(n.level, NotificationLevel::Error);
        assert_eq!(n.message, "Cylinder with ID 999999 not found.");
    }

    #[test]
    fn known_scan_opens_editor() {
        let mut app = app();
        let id = first_seed_cylinder(&app);
        app.process_action(Action::ResolveScan(format!(" {id} "))).unwrap();
        assert!(matches!(
            &app.modal,
            Some(Modal::EditCylinder(editor)) if editor.cylinder_id() == id
        ));
    }

    #[test]
    fn scan_start_failure_closes_modal() {
        let mut app = app();
        app.process_action(Action::OpenScan).unwrap();
        drain(&mut app);
        assert!(app.modal.is_none());
        let (n, _) = app.notification.as_ref().unwrap();
        assert_eq!(n.level, NotificationLevel::Error);
    }

    #[test]
    fn decode_without_scan_modal_is_ignored() {
        let mut app = app();
        let id = first_seed_cylinder(&app);
        app.process_action(Action::ScanDecoded(id)).unwrap();
        assert!(app.modal.is_none());
        assert!(app.notification.is_none());
    }

    #[test]
    fn execute_closes_modal_and_reports() {
        let mut app = app();
        app.process_action(Action::OpenAddType).unwrap();
        app.process_action(Action::Execute(Command::AddType {
            name: "Helium".into(),
            unit: MeasurementUnit::Pressure,
        }))
        .unwrap();

        assert!(app.modal.is_none());
        let (n, _) = app.notification.as_ref().unwrap();
        assert_eq!(n.message, "Added type Helium");
        assert!(app.inventory.snapshot().types.iter().any(|t| t.name == "Helium"));
    }

    #[test]
    fn failed_write_is_reported_as_warning() {
        let store = MemoryStore::new();
        store.set_read_only(true);
        let mut app = App::new(Inventory::open(store), Arc::new(NoScanner), QrLink::default());

        app.process_action(Action::Execute(Command::AddType {
            name: "Helium".into(),
            unit: MeasurementUnit::Mass,
        }))
        .unwrap();
        let (n, _) = app.notification.as_ref().unwrap();
        assert_eq!(n.level, NotificationLevel::Warning);
    }

    #[test]
    fn stale_editor_closes_when_cylinder_disappears() {
        let mut app = app();
        let id = first_seed_cylinder(&app);
        app.process_action(Action::OpenEditCylinder(id.clone())).unwrap();
        assert!(app.modal.is_some());

        app.inventory.execute(Command::DeleteCylinder { id });
        let snapshot = app.inventory.snapshot();
        app.process_action(Action::SnapshotUpdated(snapshot)).unwrap();
        assert!(app.modal.is_none());
    }

    #[test]
    fn help_captures_keys_until_closed() {
        let mut app = app();
        app.process_action(Action::ToggleHelp).unwrap();
        let action = app
            .handle_key_event(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE))
            .unwrap();
        assert!(action.is_none());
        let action = app
            .handle_key_event(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))
            .unwrap();
        assert!(matches!(action, Some(Action::ToggleHelp)));
    }
}
