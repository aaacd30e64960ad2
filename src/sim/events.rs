//! Typed events published by a running level
//!
//! The level owns an [`EventBus`]. Collaborators either subscribe a listener
//! (called synchronously, in publish order) or drain the queued events after
//! each tick.

use serde::{Deserialize, Serialize};

/// Events surfaced to presentation and persistence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Score moved; carries the new score
    ScoreChanged { score: i64, level: u32 },
    /// Gravity written to the scene
    GravityChanged { x: f32, y: f32 },
    /// Every target is out; emitted once per level
    LevelCompleted { score: i64, level: u32 },
}

/// Explicit subscriber
pub trait EventListener {
    fn on_event(&mut self, event: &GameEvent);
}

impl<F: FnMut(&GameEvent)> EventListener for F {
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}

#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn EventListener>>,
    queue: Vec<GameEvent>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("queue", &self.queue)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn EventListener>) {
        self.listeners.push(listener);
    }

    pub fn publish(&mut self, event: GameEvent) {
        for listener in &mut self.listeners {
            listener.on_event(&event);
        }
        self.queue.push(event);
    }

    /// Take every event published since the last drain
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.queue)
    }

    pub fn pending(&self) -> &[GameEvent] {
        &self.queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_listeners_and_queue_see_same_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let sink = Rc::clone(&seen);
        bus.subscribe(Box::new(move |e: &GameEvent| sink.borrow_mut().push(*e)));

        bus.publish(GameEvent::ScoreChanged { score: 1, level: 0 });
        bus.publish(GameEvent::GravityChanged { x: 0.0, y: -8.0 });

        let drained = bus.drain();
        assert_eq!(drained, *seen.borrow());
        assert_eq!(drained.len(), 2);
        assert!(bus.drain().is_empty());
    }
}
