// ── Scanner collaborator ──
//
// Capture devices that decode QR/barcode payloads. The inventory never
// talks to hardware directly: a surface starts a `ScanSession` over some
// `ScanSource`, and decoded payloads arrive through callbacks that feed
// `Inventory::scan`.

use std::fmt;
use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Invoked with each decoded payload (already trimmed, never empty).
pub type DecodeCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Invoked when a running source fails after a successful start.
pub type ErrorCallback = Arc<dyn Fn(ScannerError) + Send + Sync>;

#[derive(Debug, Error)]
pub enum ScannerError {
    #[error("no {0} scan device configured")]
    NotConfigured(ScanTarget),

    #[error("cannot open scan device {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("scan device read failed: {0}")]
    Read(#[source] io::Error),

    #[error("scanner is already running")]
    AlreadyRunning,

    #[error("cannot start scan reader: {0}")]
    Spawn(#[source] io::Error),

    #[error("no scan device available (preferred: {preferred}; default: {default})")]
    Unavailable { preferred: String, default: String },
}

/// Which capture device to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTarget {
    /// The dedicated reader, when one is configured.
    Preferred,
    /// Whatever the system offers otherwise.
    Default,
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preferred => f.write_str("preferred"),
            Self::Default => f.write_str("default"),
        }
    }
}

/// A capture device. Implementations deliver callbacks from their own task
/// and must not deliver any after `stop` returns.
///
/// Callbacks must not call back into `stop`; forward the payload over a
/// channel instead.
pub trait ScanSource: Send + Sync {
    fn start(
        &self,
        target: ScanTarget,
        on_decode: DecodeCallback,
        on_error: ErrorCallback,
    ) -> Result<(), ScannerError>;

    fn stop(&self);

    fn is_scanning(&self) -> bool;
}

// ── ScanSession ─────────────────────────────────────────────────────

/// A started scan: preferred device first, one fallback to the default.
/// Dropping the session stops the source.
pub struct ScanSession {
    source: Arc<dyn ScanSource>,
    target: ScanTarget,
    stopped: bool,
}

impl ScanSession {
    pub fn start(
        source: Arc<dyn ScanSource>,
        on_decode: DecodeCallback,
        on_error: ErrorCallback,
    ) -> Result<Self, ScannerError> {
        let preferred =
            match source.start(ScanTarget::Preferred, on_decode.clone(), on_error.clone()) {
                Ok(()) => return Ok(Self::running(source, ScanTarget::Preferred)),
                Err(e) => e,
            };
        warn!(error = %preferred, "preferred scan device unavailable, trying default");

        match source.start(ScanTarget::Default, on_decode, on_error) {
            Ok(()) => Ok(Self::running(source, ScanTarget::Default)),
            Err(default) => Err(ScannerError::Unavailable {
                preferred: preferred.to_string(),
                default: default.to_string(),
            }),
        }
    }

    fn running(source: Arc<dyn ScanSource>, target: ScanTarget) -> Self {
        info!(scan_target = %target, "scan session started");
        Self {
            source,
            target,
            stopped: false,
        }
    }

    pub fn target(&self) -> ScanTarget {
        self.target
    }

    pub fn is_scanning(&self) -> bool {
        !self.stopped && self.source.is_scanning()
    }

    /// Stop the source. Idempotent.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.source.stop();
        debug!(scan_target = %self.target, "scan session stopped");
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── LineScanSource ──────────────────────────────────────────────────

/// How long a reader waits for input before re-checking for `stop`.
#[cfg(unix)]
const POLL_INTERVAL_MS: u16 = 100;

/// Where a line-oriented reader gets its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanDevice {
    Stdin,
    /// Serial port, FIFO, or plain file.
    Path(PathBuf),
}

impl ScanDevice {
    /// `-` and `stdin` mean standard input; anything else is a path.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "-" | "stdin" => Self::Stdin,
            other => Self::Path(PathBuf::from(other)),
        }
    }
}

impl fmt::Display for ScanDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("stdin"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Hardware readers in keyboard-wedge or serial mode emit one decoded
/// payload per line. The preferred target is the configured device; the
/// default target is the fallback device.
///
/// Each start spawns a dedicated reader thread that opens the device and
/// polls it, so a FIFO without a writer never blocks the caller. After
/// `stop` the thread consumes nothing more and closes the device within
/// one poll interval.
pub struct LineScanSource {
    preferred: Option<ScanDevice>,
    fallback: Option<ScanDevice>,
    running: Mutex<Option<Running>>,
}

struct Running {
    token: CancellationToken,
    gate: Arc<Mutex<bool>>,
    handle: JoinHandle<()>,
}

impl LineScanSource {
    pub fn new(preferred: Option<ScanDevice>, fallback: Option<ScanDevice>) -> Self {
        Self {
            preferred,
            fallback,
            running: Mutex::new(None),
        }
    }

    /// Standard input only, with no dedicated reader.
    pub fn stdin() -> Self {
        Self::new(None, Some(ScanDevice::Stdin))
    }

    fn device_for(&self, target: ScanTarget) -> Result<&ScanDevice, ScannerError> {
        let device = match target {
            ScanTarget::Preferred => self.preferred.as_ref(),
            ScanTarget::Default => self.fallback.as_ref(),
        };
        device.ok_or(ScannerError::NotConfigured(target))
    }
}

/// Fail fast on a missing path so the session can fall back. `stat` does
/// not wait for a FIFO writer the way `open` does.
fn check_device(device: &ScanDevice) -> Result<(), ScannerError> {
    match device {
        ScanDevice::Stdin => Ok(()),
        ScanDevice::Path(path) => std::fs::metadata(path)
            .map(|_| ())
            .map_err(|source| ScannerError::Open {
                path: path.clone(),
                source,
            }),
    }
}

fn open_device(device: &ScanDevice) -> Result<File, ScannerError> {
    match device {
        ScanDevice::Stdin => stdin_file().map_err(|source| ScannerError::Open {
            path: PathBuf::from("stdin"),
            source,
        }),
        ScanDevice::Path(path) => File::open(path).map_err(|source| ScannerError::Open {
            path: path.clone(),
            source,
        }),
    }
}

/// A private handle on standard input; closing it leaves stdin open.
#[cfg(unix)]
fn stdin_file() -> io::Result<File> {
    use std::os::fd::AsFd;
    Ok(File::from(io::stdin().as_fd().try_clone_to_owned()?))
}

#[cfg(windows)]
fn stdin_file() -> io::Result<File> {
    use std::os::windows::io::AsHandle;
    Ok(File::from(io::stdin().as_handle().try_clone_to_owned()?))
}

/// `Ok(false)` when the interval passed without input.
#[cfg(unix)]
fn wait_readable(file: &File) -> io::Result<bool> {
    use nix::errno::Errno;
    use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
    use std::os::fd::AsFd;

    let mut fds = [PollFd::new(file.as_fd(), PollFlags::POLLIN)];
    match poll(&mut fds, PollTimeout::from(POLL_INTERVAL_MS)) {
        Ok(0) | Err(Errno::EINTR) => Ok(false),
        Ok(_) => Ok(true),
        Err(errno) => Err(errno.into()),
    }
}

#[cfg(not(unix))]
fn wait_readable(_file: &File) -> io::Result<bool> {
    Ok(true)
}

impl ScanSource for LineScanSource {
    fn start(
        &self,
        target: ScanTarget,
        on_decode: DecodeCallback,
        on_error: ErrorCallback,
    ) -> Result<(), ScannerError> {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            return Err(ScannerError::AlreadyRunning);
        }

        let device = self.device_for(target)?.clone();
        check_device(&device)?;

        let token = CancellationToken::new();
        let gate = Arc::new(Mutex::new(true));
        let reader = LineReader {
            device,
            token: token.clone(),
            gate: Arc::clone(&gate),
            on_decode,
            on_error,
        };
        let handle = thread::Builder::new()
            .name(format!("cyltrack-scan-{target}"))
            .spawn(move || reader.run())
            .map_err(ScannerError::Spawn)?;

        *running = Some(Running {
            token,
            gate,
            handle,
        });
        Ok(())
    }

    fn stop(&self) {
        let running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(running) = running {
            *running.gate.lock().unwrap_or_else(PoisonError::into_inner) = false;
            running.token.cancel();
        }
    }

    fn is_scanning(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }
}

impl Drop for LineScanSource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Body of one reader thread.
struct LineReader {
    device: ScanDevice,
    token: CancellationToken,
    gate: Arc<Mutex<bool>>,
    on_decode: DecodeCallback,
    on_error: ErrorCallback,
}

impl LineReader {
    fn run(self) {
        let file = match open_device(&self.device) {
            Ok(file) => file,
            Err(e) => {
                self.fail(e);
                return;
            }
        };
        if self.token.is_cancelled() {
            return;
        }
        debug!(device = %self.device, "scan device opened");

        let mut pending = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            match wait_readable(&file) {
                _ if self.token.is_cancelled() => break,
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    self.fail(ScannerError::Read(e));
                    break;
                }
            }
            match (&file).read(&mut buf) {
                Ok(0) => {
                    self.emit(&pending);
                    debug!(device = %self.device, "scan device reached end of input");
                    break;
                }
                Ok(n) => {
                    pending.extend_from_slice(&buf[..n]);
                    while let Some(end) = pending.iter().position(|&b| b == b'\n') {
                        let line: Vec<u8> = pending.drain(..=end).collect();
                        self.emit(&line);
                    }
                }
                Err(e) if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => {}
                Err(e) => {
                    self.fail(ScannerError::Read(e));
                    break;
                }
            }
        }
    }

    /// Deliver one trimmed, non-empty payload.
    fn emit(&self, line: &[u8]) {
        let line = String::from_utf8_lossy(line);
        let payload = line.trim();
        if !payload.is_empty() {
            let payload = payload.to_owned();
            deliver(&self.gate, || (self.on_decode)(payload));
        }
    }

    fn fail(&self, err: ScannerError) {
        deliver(&self.gate, || (self.on_error)(err));
    }
}

/// Deliver while the gate is open. `stop` closes it under the same lock.
fn deliver(gate: &Mutex<bool>, f: impl FnOnce()) {
    let open = gate.lock().unwrap_or_else(PoisonError::into_inner);
    if *open {
        f();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Records start attempts; fails the targets listed in `failing`.
    #[derive(Default)]
    struct FakeSource {
        failing: Vec<ScanTarget>,
        starts: Mutex<Vec<ScanTarget>>,
        scanning: AtomicBool,
        stops: AtomicUsize,
    }

    impl ScanSource for FakeSource {
        fn start(
            &self,
            target: ScanTarget,
            _on_decode: DecodeCallback,
            _on_error: ErrorCallback,
        ) -> Result<(), ScannerError> {
            self.starts.lock().unwrap().push(target);
            if self.failing.contains(&target) {
                return Err(ScannerError::NotConfigured(target));
            }
            self.scanning.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
            self.scanning.store(false, Ordering::SeqCst);
        }

        fn is_scanning(&self) -> bool {
            self.scanning.load(Ordering::SeqCst)
        }
    }

    fn noop_callbacks() -> (DecodeCallback, ErrorCallback) {
        (Arc::new(|_| {}), Arc::new(|_| {}))
    }

    #[test]
    fn session_prefers_preferred_target() {
        let source = Arc::new(FakeSource::default());
        let (decode, error) = noop_callbacks();
        let session = ScanSession::start(source.clone(), decode, error).unwrap();
        assert_eq!(session.target(), ScanTarget::Preferred);
        assert_eq!(*source.starts.lock().unwrap(), vec![ScanTarget::Preferred]);
    }

    #[test]
    fn session_falls_back_once() {
        let source = Arc::new(FakeSource {
            failing: vec![ScanTarget::Preferred],
            ..FakeSource::default()
        });
        let (decode, error) = noop_callbacks();
        let session = ScanSession::start(source.clone(), decode, error).unwrap();
        assert_eq!(session.target(), ScanTarget::Default);
        assert!(session.is_scanning());
    }

    #[test]
    fn session_reports_unavailable_when_both_fail() {
        let source = Arc::new(FakeSource {
            failing: vec![ScanTarget::Preferred, ScanTarget::Default],
            ..FakeSource::default()
        });
        let (decode, error) = noop_callbacks();
        let err = ScanSession::start(source.clone(), decode, error)
            .err()
            .unwrap();
        assert!(matches!(err, ScannerError::Unavailable { .. }));
        assert_eq!(source.starts.lock().unwrap().len(), 2);
    }

    #[test]
    fn stop_is_idempotent_and_runs_on_drop() {
        let source = Arc::new(FakeSource::default());
        let (decode, error) = noop_callbacks();
        let mut session = ScanSession::start(source.clone(), decode, error).unwrap();
        session.stop();
        session.stop();
        assert!(!session.is_scanning());
        drop(session);
        assert_eq!(source.stops.load(Ordering::SeqCst), 1);

        let (decode, error) = noop_callbacks();
        let session = ScanSession::start(source.clone(), decode, error).unwrap();
        drop(session);
        assert_eq!(source.stops.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn scan_device_parse() {
        assert_eq!(ScanDevice::parse("-"), ScanDevice::Stdin);
        assert_eq!(ScanDevice::parse("stdin"), ScanDevice::Stdin);
        assert_eq!(
            ScanDevice::parse("/dev/ttyACM0"),
            ScanDevice::Path("/dev/ttyACM0".into())
        );
    }

    #[test]
    fn line_source_reads_without_async_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scans.txt");
        std::fs::write(&path, "100001\n200002").unwrap();
        let source = LineScanSource::new(Some(ScanDevice::Path(path)), None);

        let (tx, rx) = std::sync::mpsc::channel();
        let decode: DecodeCallback = Arc::new(move |payload: String| {
            let _ = tx.send(payload);
        });
        let (_, error) = noop_callbacks();
        source.start(ScanTarget::Preferred, decode, error).unwrap();

        let timeout = std::time::Duration::from_secs(2);
        assert_eq!(rx.recv_timeout(timeout).unwrap(), "100001");
        assert_eq!(rx.recv_timeout(timeout).unwrap(), "200002");
    }

    #[test]
    fn line_source_preferred_unconfigured() {
        let source = LineScanSource::stdin();
        let (decode, error) = noop_callbacks();
        assert!(matches!(
            source.start(ScanTarget::Preferred, decode, error),
            Err(ScannerError::NotConfigured(ScanTarget::Preferred))
        ));
    }
}
