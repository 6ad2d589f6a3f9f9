//! Data bridge: connects the [`Inventory`] streams to TUI actions.
//!
//! Runs as a background task: forwards every installed snapshot and every
//! successful save through the TUI's action channel.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use cyltrack_core::Inventory;

use crate::action::Action;

/// Forward [`Inventory`] changes to the action loop until cancelled or the
/// receiver goes away.
pub async fn spawn_data_bridge(
    inventory: Inventory,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut snapshots = inventory.subscribe();
    let mut saved = inventory.subscribe_last_saved();

    // Initial state so the screen has data immediately
    let _ = action_tx.send(Action::SnapshotUpdated(snapshots.latest()));
    if let Some(at) = *saved.borrow_and_update() {
        let _ = action_tx.send(Action::Saved(at));
    }

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            changed = snapshots.changed() => {
                let Some(snapshot) = changed else { break };
                debug!(
                    types = snapshot.types.len(),
                    cylinders = snapshot.cylinders.len(),
                    "dispatching SnapshotUpdated"
                );
                if action_tx.send(Action::SnapshotUpdated(snapshot)).is_err() {
                    break;
                }
            }

            Ok(()) = saved.changed() => {
                let at = *saved.borrow_and_update();
                if let Some(at) = at {
                    let _ = action_tx.send(Action::Saved(at));
                }
            }
        }
    }

    debug!("data bridge shut down");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cyltrack_core::{Command, MemoryStore, MeasurementUnit};

    #[tokio::test]
    async fn forwards_initial_and_changed_snapshots() {
        let inventory = Inventory::open(MemoryStore::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(spawn_data_bridge(inventory.clone(), tx, cancel.clone()));

        let Some(Action::SnapshotUpdated(initial)) = rx.recv().await else {
            panic!("expected initial snapshot");
        };
        let before = initial.types.len();

        inventory.execute(Command::AddType {
            name: "Argon".into(),
            unit: MeasurementUnit::Pressure,
        });

        let mut saw_snapshot = false;
        let mut saw_save = false;
        while !(saw_snapshot && saw_save) {
            match rx.recv().await.unwrap() {
                Action::SnapshotUpdated(s) => {
                    assert_eq!(s.types.len(), before + 1);
                    saw_snapshot = true;
                }
                Action::Saved(_) => saw_save = true,
                other => panic!("unexpected action {other:?}"),
            }
        }

        cancel.cancel();
        task.await.unwrap();
    }
}
