use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Pending intents above this depth suggest confirmation events are not
/// arriving (or the transport dropped them); worth a warning.
const QUEUE_DEPTH_WARN: usize = 8;

/// Which kind of locally-initiated action an intent record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionCategory {
    Relationship,
    Guild,
    Group,
}

impl ActionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relationship => "relationship",
            Self::Guild => "guild",
            Self::Group => "group",
        }
    }
}

#[derive(Debug)]
struct PendingIntent {
    target_id: String,
    marked_at: DateTime<Utc>,
}

/// Records locally-initiated remove/leave actions so the matching stream
/// event can be recognized and swallowed. The transport fires the same
/// event for "I left" and "I was kicked"; this converts call-time intent
/// into stream-time disambiguation.
///
/// Per category a FIFO of pending targets, consumed on first match, so
/// rapid repeated self-actions of the same category each keep their own
/// record. Records have no timeout; they live until consumed.
pub struct IntentTracker {
    pending: Mutex<HashMap<ActionCategory, VecDeque<PendingIntent>>>,
}

impl IntentTracker {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Record that the local user just initiated an action against
    /// `target_id`. Must be called when the action call is issued, not
    /// when it resolves, to win the race against the stream event.
    pub fn mark(&self, category: ActionCategory, target_id: &str) {
        let mut pending = self.pending.lock().unwrap();
        let queue = pending.entry(category).or_default();
        queue.push_back(PendingIntent {
            target_id: target_id.to_string(),
            marked_at: Utc::now(),
        });
        if queue.len() > QUEUE_DEPTH_WARN {
            warn!(
                category = category.as_str(),
                depth = queue.len(),
                "intent queue is growing; confirmation events may be missing"
            );
        }
    }

    /// If a pending record for `category` matches `target_id`, consume it
    /// and return true (the event was caused by the local user — suppress
    /// the notification; cache mutation still applies). Otherwise return
    /// false and leave all records untouched.
    pub fn consume_if_matches(&self, category: ActionCategory, target_id: &str) -> bool {
        let mut pending = self.pending.lock().unwrap();
        let Some(queue) = pending.get_mut(&category) else {
            return false;
        };
        let Some(position) = queue.iter().position(|p| p.target_id == target_id) else {
            return false;
        };
        let Some(intent) = queue.remove(position) else {
            return false;
        };
        debug!(
            category = category.as_str(),
            target_id,
            marked_at = %intent.marked_at,
            "consumed self-action intent"
        );
        true
    }

    /// Number of pending records for a category.
    pub fn pending_count(&self, category: ActionCategory) -> usize {
        let pending = self.pending.lock().unwrap();
        pending.get(&category).map_or(0, |q| q.len())
    }
}

impl Default for IntentTracker {
    fn default() -> Self {
        Self::new()
    }
}
