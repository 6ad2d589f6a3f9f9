//! Scan modal: owns a running [`ScanSession`] for as long as it is open.
//!
//! Decodes and device errors are posted to the action loop as
//! [`Action::ScanDecoded`] / [`Action::ScanFailed`]. Dropping the modal
//! drops the session, which stops the source before returning.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc::UnboundedSender;

use cyltrack_core::{ScanSession, ScanSource, ScannerError};

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::theme;
use crate::widgets::centered;

pub struct ScanModal {
    source: Arc<dyn ScanSource>,
    session: Option<ScanSession>,
}

impl ScanModal {
    pub fn new(source: Arc<dyn ScanSource>) -> Self {
        Self {
            source,
            session: None,
        }
    }
}

impl Component for ScanModal {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        let decode_tx = action_tx.clone();
        let error_tx = action_tx.clone();
        let started = ScanSession::start(
            Arc::clone(&self.source),
            Arc::new(move |text: String| {
                let _ = decode_tx.send(Action::ScanDecoded(text));
            }),
            Arc::new(move |err: ScannerError| {
                let _ = error_tx.send(Action::ScanFailed(err.to_string()));
            }),
        );

        match started {
            Ok(session) => self.session = Some(session),
            Err(e) => {
                action_tx.send(Action::Notify(Notification::error(format!(
                    "Could not start scanner: {e}"
                ))))?;
                action_tx.send(Action::CloseModal)?;
            }
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match key.code {
            KeyCode::Esc | KeyCode::Char('q' | 'c') => Some(Action::CloseModal),
            _ => None,
        })
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let dialog = centered(area, 52, 7);
        frame.render_widget(Clear, dialog);

        let block = Block::default()
            .title(" Scan QR Code ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        let status = match &self.session {
            Some(session) if session.is_scanning() => Line::from(vec![
                Span::styled("● ", Style::default().fg(theme::SUCCESS_GREEN)),
                Span::styled(format!("Listening on the {} device", session.target()), theme::row()),
            ]),
            _ => Line::from(Span::styled("○ Starting scanner...", theme::muted())),
        };

        let text = vec![
            status,
            Line::from(""),
            Line::from(Span::styled(
                "Point the scanner at a cylinder's QR code.",
                theme::muted(),
            )),
            Line::from(vec![
                Span::styled("Esc ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(text), inner);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use cyltrack_core::ScanTarget;
    use cyltrack_core::scanner::{DecodeCallback, ErrorCallback};
    use tokio::sync::mpsc;

    /// Source that records start/stop and hands decodes to the test.
    #[derive(Default)]
    struct FakeSource {
        fail: bool,
        decode: Mutex<Option<DecodeCallback>>,
        stops: Mutex<usize>,
    }

    impl ScanSource for FakeSource {
        fn start(
            &self,
            target: ScanTarget,
            on_decode: DecodeCallback,
            _on_error: ErrorCallback,
        ) -> Result<(), ScannerError> {
            if self.fail {
                return Err(ScannerError::NotConfigured(target));
            }
            *self.decode.lock().unwrap() = Some(on_decode);
            Ok(())
        }

        fn stop(&self) {
            *self.stops.lock().unwrap() += 1;
            self.decode.lock().unwrap().take();
        }

        fn is_scanning(&self) -> bool {
            self.decode.lock().unwrap().is_some()
        }
    }

    #[test]
    fn decode_is_posted_and_drop_stops_the_source() {
        let source = Arc::new(FakeSource::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut modal = ScanModal::new(source.clone());
        modal.init(tx).unwrap();
        assert!(source.is_scanning());

        let decode = source.decode.lock().unwrap().clone().unwrap();
        decode("123456".into());
        assert!(matches!(rx.try_recv(), Ok(Action::ScanDecoded(ref s)) if s == "123456"));

        drop(modal);
        assert!(!source.is_scanning());
        assert!(*source.stops.lock().unwrap() >= 1);
    }

    #[test]
    fn start_failure_notifies_and_closes() {
        let source = Arc::new(FakeSource {
            fail: true,
            ..FakeSource::default()
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut modal = ScanModal::new(source);
        modal.init(tx).unwrap();

        assert!(matches!(rx.try_recv(), Ok(Action::Notify(_))));
        assert!(matches!(rx.try_recv(), Ok(Action::CloseModal)));
        assert!(modal.session.is_none());
    }
}
