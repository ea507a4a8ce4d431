//! Background serial reader.
//!
//! One dedicated thread per reader. The thread opens its [`LineSource`],
//! then reads lines into a [`LatestSlot`] until the run flag is cleared or
//! the stream ends. Shutdown never blocks the caller for longer than the
//! configured join timeout.

use crate::error::{HardwareError, HardwareResult};
use crate::slot::LatestSlot;
use std::io::{self, BufRead, BufReader};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Pause after a non-timeout read error before trying again.
const ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Serial link parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SerialSettings {
    pub port: String,
    pub baud: u32,
    pub read_timeout: Duration,
    /// Longest a shutdown waits for the worker before detaching it.
    pub join_timeout: Duration,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: String::from("/dev/ttyACM0"),
            baud: 115_200,
            read_timeout: Duration::from_millis(50),
            join_timeout: Duration::from_millis(100),
        }
    }
}

/// A device that yields newline-delimited records.
pub trait LineSource: Send + 'static {
    /// Human-readable device name for logs.
    fn name(&self) -> &str;

    /// Open the device. Called once, on the worker thread.
    fn open(&mut self) -> HardwareResult<()> {
        Ok(())
    }

    /// Read one line.
    ///
    /// `Ok(None)` means end of stream. Timeouts are reported as
    /// `ErrorKind::TimedOut` or `ErrorKind::WouldBlock` and are not failures.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

/// [`LineSource`] over a real serial port.
pub struct SerialPortSource {
    settings: SerialSettings,
    port: Option<BufReader<Box<dyn serialport::SerialPort>>>,
    pending: Vec<u8>,
}

impl SerialPortSource {
    pub fn new(settings: SerialSettings) -> Self {
        Self {
            settings,
            port: None,
            pending: Vec::with_capacity(64),
        }
    }

    /// Names of the serial ports present on this machine.
    pub fn list_ports() -> Vec<String> {
        serialport::available_ports()
            .map(|ports| ports.into_iter().map(|p| p.port_name).collect())
            .unwrap_or_default()
    }
}

impl LineSource for SerialPortSource {
    fn name(&self) -> &str {
        &self.settings.port
    }

    fn open(&mut self) -> HardwareResult<()> {
        let port = serialport::new(&self.settings.port, self.settings.baud)
            .timeout(self.settings.read_timeout)
            .open()
            .map_err(|source| HardwareError::Open {
                port: self.settings.port.clone(),
                source,
            })?;
        self.port = Some(BufReader::new(port));
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let Some(port) = self.port.as_mut() else {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "port not open"));
        };
        // a timeout can interrupt a line; keep the partial bytes for the next call
        let n = port.read_until(b'\n', &mut self.pending)?;
        if n == 0 && self.pending.is_empty() {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Ok(Some(line))
    }
}

/// Handle to a running reader thread.
pub struct SerialReader {
    name: String,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    done: Receiver<()>,
    join_timeout: Duration,
}

impl SerialReader {
    /// Start a worker reading `source` into `slot`.
    ///
    /// # Errors
    ///
    /// Returns error only if the OS refuses to create the thread. Failing to
    /// open the device is logged by the worker, which then exits.
    pub fn spawn<S: LineSource>(
        source: S,
        slot: Arc<LatestSlot<String>>,
        join_timeout: Duration,
    ) -> HardwareResult<Self> {
        let name = source.name().to_string();
        let running = Arc::new(AtomicBool::new(true));
        let (done_tx, done) = mpsc::channel();

        let handle = thread::Builder::new()
            .name(format!("gl-serial-{name}"))
            .spawn({
                let running = Arc::clone(&running);
                move || run_worker(source, slot, running, done_tx)
            })?;
        tracing::info!(device = %name, "serial reader started");

        Ok(Self {
            name,
            running,
            handle: Some(handle),
            done,
            join_timeout,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True while the worker has not been asked to stop and has not exited.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the worker. Returns true when it finished within the join
    /// timeout; otherwise it is detached and left to exit on its own.
    pub fn shutdown(&mut self) -> bool {
        self.running.store(false, Ordering::Release);
        let Some(handle) = self.handle.take() else {
            return true;
        };
        match self.done.recv_timeout(self.join_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if handle.join().is_err() {
                    tracing::error!(device = %self.name, "serial reader panicked");
                }
                tracing::info!(device = %self.name, "serial reader stopped");
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    device = %self.name,
                    timeout_ms = self.join_timeout.as_millis() as u64,
                    "serial reader did not stop in time; detaching"
                );
                false
            }
        }
    }
}

impl Drop for SerialReader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for SerialReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialReader")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Signals completion when dropped, so a panicking worker still reports.
struct Completion(Sender<()>);

impl Drop for Completion {
    fn drop(&mut self) {
        let _ = self.0.send(());
    }
}

fn run_worker<S: LineSource>(
    mut source: S,
    slot: Arc<LatestSlot<String>>,
    running: Arc<AtomicBool>,
    done: Sender<()>,
) {
    let _completion = Completion(done);

    if let Err(err) = source.open() {
        tracing::error!(device = source.name(), error = %err, "failed to open device");
        running.store(false, Ordering::Release);
        return;
    }
    tracing::info!(device = source.name(), "device open");

    while running.load(Ordering::Acquire) {
        match source.read_line() {
            Ok(Some(line)) => {
                slot.put(line);
            }
            Ok(None) => {
                tracing::info!(device = source.name(), "device stream ended");
                break;
            }
            Err(err) if is_timeout(&err) => {}
            Err(err) => {
                if running.load(Ordering::Acquire) {
                    tracing::error!(device = source.name(), error = %err, "serial read error");
                }
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }
    running.store(false, Ordering::Release);
}
