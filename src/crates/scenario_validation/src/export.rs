use std::sync::mpsc::{self, TrySendError};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::validation::ValidationGeometry;

/// Geometry of one active unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationGeometryEntry {
    pub description: String,
    pub geometry: ValidationGeometry,
}

/// Geometry of every active unit after one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryFrame {
    pub tick: u64,
    pub timestamp: f64,
    pub always: Vec<ValidationGeometryEntry>,
    pub eventually: Vec<ValidationGeometryEntry>,
}

impl GeometryFrame {
    pub fn entries(&self) -> impl Iterator<Item = &ValidationGeometryEntry> {
        self.always.iter().chain(self.eventually.iter())
    }
}

/// Frames a subscriber may fall behind by before new ones are dropped for it.
pub const SUBSCRIBER_BACKLOG: usize = 16;

#[derive(Default)]
struct FeedState {
    latest: Option<Arc<GeometryFrame>>,
    subscribers: Vec<mpsc::SyncSender<Arc<GeometryFrame>>>,
}

/// Hands published frames to observers; frames are shared immutably.
#[derive(Clone, Default)]
pub struct GeometryFeed {
    state: Arc<Mutex<FeedState>>,
}

impl GeometryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently published frame.
    pub fn latest(&self) -> Option<Arc<GeometryFrame>> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.latest.clone())
    }

    /// Receive frames published from now on.
    ///
    /// The channel holds at most [`SUBSCRIBER_BACKLOG`] frames. While it is full,
    /// newly published frames are skipped for this subscriber; [`Self::latest`]
    /// always has the current one.
    pub fn subscribe(&self) -> mpsc::Receiver<Arc<GeometryFrame>> {
        let (tx, rx) = mpsc::sync_channel(SUBSCRIBER_BACKLOG);
        if let Ok(mut state) = self.state.lock() {
            state.subscribers.push(tx);
        }
        rx
    }

    pub(crate) fn publish(&self, frame: GeometryFrame) {
        let frame = Arc::new(frame);
        if let Ok(mut state) = self.state.lock() {
            state.subscribers.retain(|subscriber| {
                !matches!(
                    subscriber.try_send(frame.clone()),
                    Err(TrySendError::Disconnected(_))
                )
            });
            state.latest = Some(frame);
        }
    }
}
