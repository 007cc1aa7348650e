use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::config::SimulatorConfig;
use crate::error::{ValidationError, ValidationResult};
use crate::source::{ControlMessage, SimulatorControl, SnapshotSource};
use crate::world::World;

/// Marker the simulator prints once it is ready to stream snapshots.
const READY_MARKER: &str = "simulator ready";

/// Origin stream for captured log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

/// A stdout line that looked like a snapshot, decoded or not.
type SnapshotLine = Result<World, serde_json::Error>;

/// Single captured log line with its source.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub stream: LogStream,
    pub line: String,
}

/// A simulator child process streaming JSON-lines snapshots on stdout and
/// accepting JSON-lines control messages on stdin.
pub struct SimulatorProcess {
    child: Child,
    stdin: Option<ChildStdin>,
    snapshots: mpsc::Receiver<SnapshotLine>,
    log_buffer: Arc<Mutex<Vec<LogLine>>>,
    log_collector: Option<thread::JoinHandle<()>>,
}

impl SimulatorProcess {
    /// Spawn the simulator and wait for it to announce readiness.
    pub fn spawn(config: SimulatorConfig) -> ValidationResult<Self> {
        let mut cmd = Command::new(&config.binary_path);
        cmd.args(&config.extra_args);
        if let Some(dir) = &config.working_directory {
            cmd.current_dir(dir);
        }
        cmd.envs(&config.env);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|err| ValidationError::simulator_start(err.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ValidationError::simulator_start("failed to capture stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ValidationError::simulator_start("failed to capture stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ValidationError::simulator_start("failed to capture stderr"))?;

        let (log_tx, log_rx) = mpsc::channel();
        let (snapshot_tx, snapshot_rx) = mpsc::channel();
        spawn_snapshot_reader(stdout, snapshot_tx, log_tx.clone());
        spawn_log_reader(stderr, LogStream::Stderr, log_tx);

        let log_buffer = Arc::new(Mutex::new(Vec::new()));
        wait_for_ready(&mut child, &log_rx, &log_buffer, config.startup_timeout)?;
        let log_collector = spawn_log_collector(log_rx, log_buffer.clone());

        Ok(Self {
            child,
            stdin: Some(stdin),
            snapshots: snapshot_rx,
            log_buffer,
            log_collector: Some(log_collector),
        })
    }

    /// Return all captured non-snapshot output.
    pub fn logs(&self) -> Vec<LogLine> {
        self.log_buffer
            .lock()
            .map(|buffer| buffer.clone())
            .unwrap_or_default()
    }

    /// Close stdin, give the simulator a moment to exit, then force it.
    pub fn shutdown(mut self) -> ValidationResult<()> {
        self.request_shutdown()
    }

    fn request_shutdown(&mut self) -> ValidationResult<()> {
        self.stdin.take();
        let start = Instant::now();
        let timeout = Duration::from_secs(2);
        while start.elapsed() < timeout {
            if self.child.try_wait()?.is_some() {
                self.join_workers();
                return Ok(());
            }
            thread::sleep(Duration::from_millis(10));
        }

        let _ = self.child.kill();
        let _ = self.child.wait();
        self.join_workers();
        Ok(())
    }

    fn join_workers(&mut self) {
        if let Some(handle) = self.log_collector.take() {
            let _ = handle.join();
        }
    }
}

impl SnapshotSource for SimulatorProcess {
    fn next_snapshot(&mut self, wait: Duration) -> ValidationResult<Option<World>> {
        match self.snapshots.recv_timeout(wait) {
            Ok(Ok(world)) => Ok(Some(world)),
            Ok(Err(err)) => Err(ValidationError::Snapshot(err)),
            Err(mpsc::RecvTimeoutError::Timeout) => match self.child.try_wait()? {
                Some(status) => Err(ValidationError::SimulatorExited(status)),
                None => Ok(None),
            },
            Err(mpsc::RecvTimeoutError::Disconnected) => match self.child.try_wait()? {
                Some(status) => Err(ValidationError::SimulatorExited(status)),
                None => Err(ValidationError::SourceClosed),
            },
        }
    }
}

impl SimulatorControl for SimulatorProcess {
    fn send(&mut self, message: ControlMessage) {
        let Some(stdin) = self.stdin.as_mut() else {
            warn!("control message dropped: simulator stdin closed");
            return;
        };
        let written = serde_json::to_string(&message)
            .map_err(ValidationError::from)
            .and_then(|line| {
                writeln!(stdin, "{line}")?;
                stdin.flush()?;
                Ok(())
            });
        if let Err(err) = written {
            warn!(%err, "control message dropped");
        }
    }
}

impl Drop for SimulatorProcess {
    fn drop(&mut self) {
        let _ = self.request_shutdown();
    }
}

/// Route JSON object lines on stdout to `snapshot_tx`, everything else to the log.
///
/// Object lines that fail to decode are forwarded as errors so the run stops
/// instead of waiting on a simulator that only emits garbage.
fn spawn_snapshot_reader<R: std::io::Read + Send + 'static>(
    reader: R,
    snapshot_tx: mpsc::Sender<SnapshotLine>,
    log_tx: mpsc::Sender<LogLine>,
) {
    thread::spawn(move || {
        let buf_reader = BufReader::new(reader);
        for line in buf_reader.lines().map_while(Result::ok) {
            let line = line.trim();
            if !line.starts_with('{') {
                let _ = log_tx.send(LogLine {
                    stream: LogStream::Stdout,
                    line: line.to_string(),
                });
                continue;
            }

            let snapshot = serde_json::from_str::<World>(line);
            if let Err(err) = &snapshot {
                warn!(%err, "malformed snapshot on simulator stdout");
                let _ = log_tx.send(LogLine {
                    stream: LogStream::Stdout,
                    line: line.to_string(),
                });
            }
            if snapshot_tx.send(snapshot).is_err() {
                break;
            }
        }
    });
}

fn spawn_log_reader<R: std::io::Read + Send + 'static>(
    reader: R,
    stream: LogStream,
    tx: mpsc::Sender<LogLine>,
) {
    thread::spawn(move || {
        let buf_reader = BufReader::new(reader);
        for line in buf_reader.lines().map_while(Result::ok) {
            let _ = tx.send(LogLine {
                stream,
                line: line.trim().to_string(),
            });
        }
    });
}

fn wait_for_ready(
    child: &mut Child,
    log_rx: &mpsc::Receiver<LogLine>,
    log_buffer: &Arc<Mutex<Vec<LogLine>>>,
    timeout: Duration,
) -> ValidationResult<()> {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if let Some(status) = child.try_wait()? {
            return Err(ValidationError::SimulatorExited(status));
        }

        match log_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(line) => {
                let ready = line.line.to_ascii_lowercase().contains(READY_MARKER);
                if let Ok(mut buffer) = log_buffer.lock() {
                    buffer.push(line);
                }
                if ready {
                    return Ok(());
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    Err(ValidationError::StartupTimeout(timeout))
}

fn spawn_log_collector(
    log_rx: mpsc::Receiver<LogLine>,
    buffer: Arc<Mutex<Vec<LogLine>>>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(line) = log_rx.recv() {
            if let Ok(mut guard) = buffer.lock() {
                guard.push(line);
            }
        }
    })
}
