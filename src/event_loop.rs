//! Owned queue of UI actions, drained once per frame.

use std::collections::VecDeque;

use crate::error::GuifyError;

/// Something the user asked the form to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Open the dialog matching the widget in `row`.
    PickPath { row: usize },
    LoadConfig,
    SaveConfig,
    ChooseInputFiles,
    ChooseOutputFolder,
    Run,
}

/// Queue of actions posted while drawing a frame. The app drains it after
/// drawing, so handlers never run while the widget tree is borrowed.
#[derive(Debug)]
pub struct EventLoop {
    pending: VecDeque<Action>,
    running: bool,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn post(&mut self, action: Action) -> Result<(), GuifyError> {
        if !self.running {
            return Err(GuifyError::LoopStopped);
        }
        self.pending.push_back(action);
        Ok(())
    }

    /// Next queued action, or `None` when the queue is empty or stopped.
    pub fn next_action(&mut self) -> Option<Action> {
        if !self.running {
            return None;
        }
        self.pending.pop_front()
    }

    /// Stops the loop and discards queued actions. Returns how many were
    /// dropped.
    pub fn shutdown(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        if self.running {
            tracing::debug!("event loop shut down, {} pending action(s) dropped", dropped);
        }
        self.running = false;
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_come_out_in_order() {
        let mut el = EventLoop::new();
        el.post(Action::LoadConfig).unwrap();
        el.post(Action::Run).unwrap();
        assert_eq!(el.pending(), 2);
        assert_eq!(el.next_action(), Some(Action::LoadConfig));
        assert_eq!(el.next_action(), Some(Action::Run));
        assert_eq!(el.next_action(), None);
    }

    #[test]
    fn test_shutdown_drops_pending_and_refuses_posts() {
        let mut el = EventLoop::new();
        el.post(Action::PickPath { row: 1 }).unwrap();
        el.post(Action::Run).unwrap();
        assert_eq!(el.shutdown(), 2);
        assert!(!el.is_running());
        assert_eq!(el.next_action(), None);
        assert!(matches!(el.post(Action::Run), Err(GuifyError::LoopStopped)));
        assert_eq!(el.shutdown(), 0);
    }
}
