//! Where snapshots come from, and how commands go back to the simulator.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ValidationError, ValidationResult};
use crate::world::World;

/// Pull side of the simulator boundary.
pub trait SnapshotSource {
    /// Block up to `wait` for the next snapshot.
    ///
    /// `Ok(None)` means nothing arrived in time; the caller decides whether to
    /// keep waiting. Errors mean no further snapshots will ever arrive.
    fn next_snapshot(&mut self, wait: Duration) -> ValidationResult<Option<World>>;
}

/// Snapshots pushed by another thread through an mpsc channel.
pub struct ChannelSource {
    rx: mpsc::Receiver<World>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<World>) -> Self {
        Self { rx }
    }

    /// Create a connected sender/source pair.
    pub fn channel() -> (mpsc::Sender<World>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }
}

impl SnapshotSource for ChannelSource {
    fn next_snapshot(&mut self, wait: Duration) -> ValidationResult<Option<World>> {
        match self.rx.recv_timeout(wait) {
            Ok(world) => Ok(Some(world)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(ValidationError::SourceClosed),
        }
    }
}

/// Replays recorded snapshots in order.
///
/// Once exhausted it behaves like a simulator that stopped talking: each pull
/// waits out its full duration and yields nothing.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    snapshots: VecDeque<World>,
}

impl ReplaySource {
    pub fn new(snapshots: impl IntoIterator<Item = World>) -> Self {
        Self {
            snapshots: snapshots.into_iter().collect(),
        }
    }

    /// Load a JSON-lines recording, one snapshot per line. Blank lines are skipped.
    pub fn from_path(path: impl AsRef<Path>) -> ValidationResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut snapshots = VecDeque::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            snapshots.push_back(serde_json::from_str(&line)?);
        }
        Ok(Self { snapshots })
    }

    pub fn remaining(&self) -> usize {
        self.snapshots.len()
    }
}

impl SnapshotSource for ReplaySource {
    fn next_snapshot(&mut self, wait: Duration) -> ValidationResult<Option<World>> {
        match self.snapshots.pop_front() {
            Some(world) => Ok(Some(world)),
            None => {
                thread::sleep(wait);
                Ok(None)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Blue,
    Yellow,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefereeCommand {
    Halt,
    Stop,
    NormalStart,
    ForceStart,
    Kickoff,
    Penalty,
    DirectFree,
    IndirectFree,
    Timeout,
    BallPlacement,
}

/// Commands pushed to the simulator side. The engine never waits for acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    ControlParams { params: serde_json::Value },
    RefereeCommand { command: RefereeCommand, team: Team },
}

/// Push side of the simulator boundary; fire-and-forget.
pub trait SimulatorControl {
    fn send(&mut self, message: ControlMessage);

    fn send_control_params(&mut self, params: serde_json::Value) {
        self.send(ControlMessage::ControlParams { params });
    }

    fn send_referee_command(&mut self, command: RefereeCommand, team: Team) {
        self.send(ControlMessage::RefereeCommand { command, team });
    }
}

/// Delivers control messages to an in-process simulator over mpsc.
#[derive(Debug, Clone)]
pub struct ChannelControl {
    tx: mpsc::Sender<ControlMessage>,
}

impl ChannelControl {
    pub fn new(tx: mpsc::Sender<ControlMessage>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::Receiver<ControlMessage>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(tx), rx)
    }
}

impl SimulatorControl for ChannelControl {
    fn send(&mut self, message: ControlMessage) {
        if self.tx.send(message).is_err() {
            warn!("control message dropped: simulator side disconnected");
        }
    }
}
