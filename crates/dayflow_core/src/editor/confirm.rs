//! Two-step delete confirmation with an expiring window.
//!
//! # Invariants
//! - At most one node is pending confirmation.
//! - Only the newest arm can expire the pending node.

use crate::model::node::NodeId;
use crate::timer::Timer;
use std::time::{Duration, Instant};

/// Outcome of one delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteRequest {
    /// First request; waiting for a second one inside the window.
    Armed,
    /// Second request inside the window for the same node.
    Confirmed(NodeId),
}

#[derive(Debug)]
pub struct DeleteConfirmation {
    window: Duration,
    timer: Timer,
    pending: Option<NodeId>,
}

impl DeleteConfirmation {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            timer: Timer::new(),
            pending: None,
        }
    }

    pub fn pending(&self) -> Option<&NodeId> {
        self.pending.as_ref()
    }

    /// Registers a delete request for `id` at `now`.
    pub fn request(&mut self, id: &NodeId, now: Instant) -> DeleteRequest {
        self.expire(now);
        if self.pending.as_ref() == Some(id) {
            self.clear();
            return DeleteRequest::Confirmed(id.clone());
        }
        self.timer.arm(now, self.window);
        self.pending = Some(id.clone());
        DeleteRequest::Armed
    }

    /// Drops the pending node once its window has passed.
    pub fn expire(&mut self, now: Instant) -> Option<NodeId> {
        self.timer.poll(now)?;
        self.pending.take()
    }

    /// Forgets `id` if it is pending, e.g. after it was deleted elsewhere.
    pub fn forget(&mut self, id: &NodeId) {
        if self.pending.as_ref() == Some(id) {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.timer.cancel();
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{DeleteConfirmation, DeleteRequest};
    use crate::model::node::NodeId;
    use std::time::{Duration, Instant};

    const WINDOW: Duration = Duration::from_secs(3);

    #[test]
    fn second_request_inside_window_confirms() {
        let start = Instant::now();
        let mut confirm = DeleteConfirmation::new(WINDOW);
        let id = NodeId::from("n1");
        assert_eq!(confirm.request(&id, start), DeleteRequest::Armed);
        assert_eq!(
            confirm.request(&id, start + Duration::from_millis(2999)),
            DeleteRequest::Confirmed(id.clone())
        );
        assert!(confirm.pending().is_none());
    }

    #[test]
    fn request_after_window_rearms() {
        let start = Instant::now();
        let mut confirm = DeleteConfirmation::new(WINDOW);
        let id = NodeId::from("n1");
        confirm.request(&id, start);
        assert_eq!(confirm.request(&id, start + WINDOW), DeleteRequest::Armed);
        assert_eq!(confirm.pending(), Some(&id));
    }

    #[test]
    fn request_for_other_node_moves_pending() {
        let start = Instant::now();
        let mut confirm = DeleteConfirmation::new(WINDOW);
        confirm.request(&NodeId::from("a"), start);
        assert_eq!(confirm.request(&NodeId::from("b"), start), DeleteRequest::Armed);
        assert_eq!(confirm.pending(), Some(&NodeId::from("b")));

        // The first arm was superseded; only the second one expires.
        assert_eq!(confirm.expire(start + WINDOW), Some(NodeId::from("b")));
        assert_eq!(confirm.expire(start + WINDOW * 2), None);
    }
}
