//! Playback notifications.
//!
//! Every notification the controller raises is queued as a [`PlaybackEvent`]
//! in addition to being passed to the registered callback. Hosts that prefer
//! polling drain the queue after each update:
//!
//! ```ignore
//! animator.update();
//! for event in animator.drain_events() {
//!     match event {
//!         PlaybackEvent::ElementCompleted { element_id, index, .. } => {
//!             println!("element {index} ({element_id}) done");
//!         }
//!         PlaybackEvent::Completed => println!("cycle complete"),
//!         _ => {}
//!     }
//! }
//! ```

use std::collections::VecDeque;

use ego_tree::NodeId;
use serde::Serialize;

/// A playback notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// `play` submitted a new cycle.
    Started,
    /// An element's delay elapsed and its animation began.
    ElementStarted {
        element_id: String,
        #[serde(skip)]
        node: NodeId,
        /// Position in flattened order.
        index: usize,
    },
    /// An element's animation finished.
    ElementCompleted {
        element_id: String,
        #[serde(skip)]
        node: NodeId,
        index: usize,
    },
    /// Every element finished.
    Completed,
    /// The cycle was torn down before every element finished.
    Cancelled,
}

impl PlaybackEvent {
    /// Stable id of the element, for per-element events.
    pub fn element_id(&self) -> Option<&str> {
        match self {
            Self::ElementStarted { element_id, .. } | Self::ElementCompleted { element_id, .. } => {
                Some(element_id)
            }
            _ => None,
        }
    }

    /// Element position, for per-element events.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::ElementStarted { index, .. } | Self::ElementCompleted { index, .. } => {
                Some(*index)
            }
            _ => None,
        }
    }

    /// Element node, for per-element events.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::ElementStarted { node, .. } | Self::ElementCompleted { node, .. } => Some(*node),
            _ => None,
        }
    }
}

/// Events held by a queue nobody drains before the oldest are dropped.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Bounded FIFO queue of playback events.
///
/// When full, pushing drops the oldest event.
#[derive(Debug)]
pub struct EventQueue {
    events: VecDeque<PlaybackEvent>,
    capacity: usize,
    dropped: usize,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue holding at most `capacity` events; zero disables queueing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity,
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: PlaybackEvent) {
        if self.capacity == 0 {
            return;
        }
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.dropped += 1;
            if self.dropped == 1 {
                tracing::debug!(capacity = self.capacity, "event queue full, dropping oldest");
            }
        }
        self.events.push_back(event);
    }

    /// Events discarded because the queue was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn pop(&mut self) -> Option<PlaybackEvent> {
        self.events.pop_front()
    }

    /// Drain all events from the queue.
    pub fn drain(&mut self) -> impl Iterator<Item = PlaybackEvent> + '_ {
        self.events.drain(..)
    }

    /// Events concerning one element.
    pub fn events_for_element(&self, element_id: &str) -> Vec<&PlaybackEvent> {
        self.events
            .iter()
            .filter(|event| event.element_id() == Some(element_id))
            .collect()
    }
}
