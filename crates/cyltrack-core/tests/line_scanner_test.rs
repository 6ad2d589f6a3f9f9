// Integration tests for `LineScanSource` reading decoded payloads from files.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use cyltrack_core::scanner::{DecodeCallback, ErrorCallback};
use cyltrack_core::{
    Inventory, LineScanSource, MemoryStore, ScanDevice, ScanSession, ScanSource, ScanTarget,
    ScannerError,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn channel_callbacks() -> (DecodeCallback, ErrorCallback, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let on_decode: DecodeCallback = Arc::new(move |payload| {
        let _ = tx.send(payload);
    });
    let on_error: ErrorCallback = Arc::new(|_| {});
    (on_decode, on_error, rx)
}

async fn recv(rx: &mut mpsc::UnboundedReceiver<String>) -> Option<String> {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .ok()
        .flatten()
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn reads_trimmed_payloads_from_preferred_device() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reader");
    std::fs::write(&path, "100001\r\n\n  200002 \n").unwrap();

    let source = Arc::new(LineScanSource::new(
        Some(ScanDevice::Path(path)),
        None,
    ));
    let (on_decode, on_error, mut rx) = channel_callbacks();
    let session = ScanSession::start(source, on_decode, on_error).unwrap();
    assert_eq!(session.target(), ScanTarget::Preferred);

    assert_eq!(recv(&mut rx).await.as_deref(), Some("100001"));
    assert_eq!(recv(&mut rx).await.as_deref(), Some("200002"));
}

#[tokio::test]
async fn falls_back_to_default_device() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = dir.path().join("fallback");
    std::fs::write(&fallback, "300001\n").unwrap();

    let source = Arc::new(LineScanSource::new(
        Some(ScanDevice::Path(dir.path().join("missing"))),
        Some(ScanDevice::Path(fallback)),
    ));
    let (on_decode, on_error, mut rx) = channel_callbacks();
    let session = ScanSession::start(source, on_decode, on_error).unwrap();
    assert_eq!(session.target(), ScanTarget::Default);

    let payload = recv(&mut rx).await.unwrap();
    let inventory = Inventory::open(MemoryStore::new());
    assert_eq!(inventory.scan(&payload).unwrap().type_id, "ct3");
}

#[tokio::test]
async fn both_devices_missing_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(LineScanSource::new(
        Some(ScanDevice::Path(dir.path().join("a"))),
        Some(ScanDevice::Path(dir.path().join("b"))),
    ));
    let (on_decode, on_error, _rx) = channel_callbacks();
    let err = ScanSession::start(source, on_decode, on_error).err().unwrap();
    assert!(err.to_string().starts_with("no scan device available"));
}

#[tokio::test]
async fn restart_after_stop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reader");
    std::fs::write(&path, "").unwrap();

    let source = LineScanSource::new(Some(ScanDevice::Path(path)), None);
    let (on_decode, on_error, _rx) = channel_callbacks();
    source
        .start(ScanTarget::Preferred, on_decode.clone(), on_error.clone())
        .unwrap();
    source.stop();
    assert!(!source.is_scanning());

    source
        .start(ScanTarget::Preferred, on_decode, on_error)
        .unwrap();
    source.stop();
    assert!(!source.is_scanning());
}

// ── FIFO devices ────────────────────────────────────────────────────

#[cfg(unix)]
fn make_fifo(dir: &tempfile::TempDir) -> std::path::PathBuf {
    use nix::sys::stat::Mode;
    let path = dir.path().join("reader.fifo");
    nix::unistd::mkfifo(&path, Mode::S_IRUSR | Mode::S_IWUSR).unwrap();
    path
}

/// Open the write end on a helper thread (it waits for a reader) and send
/// `payload`, keeping the writer open until `hold` elapses.
#[cfg(unix)]
fn write_fifo_later(
    path: std::path::PathBuf,
    payload: &'static str,
    hold: Duration,
) -> std::thread::JoinHandle<()> {
    use std::io::Write;
    std::thread::spawn(move || {
        let mut writer = std::fs::OpenOptions::new().write(true).open(path).unwrap();
        writer.write_all(payload.as_bytes()).unwrap();
        writer.flush().unwrap();
        std::thread::sleep(hold);
    })
}

#[cfg(unix)]
#[tokio::test]
async fn start_on_fifo_without_writer_returns_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let fifo = make_fifo(&dir);

    let source = Arc::new(LineScanSource::new(Some(ScanDevice::Path(fifo.clone())), None));
    let (on_decode, on_error, mut rx) = channel_callbacks();

    let started = std::time::Instant::now();
    let session = ScanSession::start(source, on_decode, on_error).unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(session.target(), ScanTarget::Preferred);

    let writer = write_fifo_later(fifo, "100001\n", Duration::ZERO);
    assert_eq!(recv(&mut rx).await.as_deref(), Some("100001"));
    writer.join().unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn restarted_session_receives_the_next_line() {
    let dir = tempfile::tempdir().unwrap();
    let fifo = make_fifo(&dir);
    let source: Arc<dyn ScanSource> =
        Arc::new(LineScanSource::new(Some(ScanDevice::Path(fifo.clone())), None));

    let (first_decode, first_error, mut first_rx) = channel_callbacks();
    let mut first = ScanSession::start(Arc::clone(&source), first_decode, first_error).unwrap();
    first.stop();

    let (on_decode, on_error, mut rx) = channel_callbacks();
    let _second = ScanSession::start(source, on_decode, on_error).unwrap();

    let writer = write_fifo_later(fifo, "100001\n", Duration::from_millis(500));
    assert_eq!(recv(&mut rx).await.as_deref(), Some("100001"));
    assert!(first_rx.try_recv().is_err());
    writer.join().unwrap();
}

#[cfg(unix)]
#[test]
fn stop_closes_the_device() {
    use std::io::{ErrorKind, Write};
    use std::sync::mpsc as std_mpsc;

    let dir = tempfile::tempdir().unwrap();
    let fifo = make_fifo(&dir);
    let source = LineScanSource::new(Some(ScanDevice::Path(fifo.clone())), None);
    let on_decode: DecodeCallback = Arc::new(|_: String| {});
    let on_error: ErrorCallback = Arc::new(|_: ScannerError| {});
    source
        .start(ScanTarget::Preferred, on_decode, on_error)
        .unwrap();

    let (opened_tx, opened_rx) = std_mpsc::channel();
    let (stopped_tx, stopped_rx) = std_mpsc::channel::<()>();
    let writer = std::thread::spawn(move || {
        let mut writer = std::fs::OpenOptions::new().write(true).open(fifo).unwrap();
        opened_tx.send(()).unwrap();
        stopped_rx.recv().unwrap();
        // Once the reader has closed its end, writes fail with a broken pipe.
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while std::time::Instant::now() < deadline {
            match writer.write_all(b"x") {
                Err(e) if e.kind() == ErrorKind::BrokenPipe => return true,
                _ => std::thread::sleep(Duration::from_millis(20)),
            }
        }
        false
    });

    opened_rx.recv_timeout(Duration::from_secs(2)).unwrap();
    source.stop();
    stopped_tx.send(()).unwrap();
    assert!(writer.join().unwrap(), "reader still held the device after stop");
}
