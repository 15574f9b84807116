//! In-process message bus linking viewers.
//!
//! Every subscriber, including the publisher itself, gets its own queue of
//! every published event. Filtering out self-originated events is the
//! subscriber's job (see `Viewer::pump`).

use std::cell::RefCell;
use std::rc::Rc;

use crossbeam::channel::{Receiver, Sender, unbounded};
use tracklane_protocol::BoardEvent;

/// Anything a viewer can publish board events into.
pub trait EventSink {
    fn publish(&self, event: BoardEvent);
}

impl EventSink for Sender<BoardEvent> {
    fn publish(&self, event: BoardEvent) {
        if self.send(event).is_err() {
            log::trace!("event dropped: receiver gone");
        }
    }
}

/// Fan-out bus shared by the viewers of one board.
///
/// Cloning is cheap and every clone publishes to the same subscribers.
#[derive(Debug, Clone, Default)]
pub struct Bus {
    subscribers: Rc<RefCell<Vec<Sender<BoardEvent>>>>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new queue that receives every event published from now on.
    pub fn subscribe(&self) -> Receiver<BoardEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.borrow_mut().push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl EventSink for Bus {
    fn publish(&self, event: BoardEvent) {
        let mut subscribers = self.subscribers.borrow_mut();
        log::debug!(
            "publish {:?} from {} to {} subscribers",
            kind(&event),
            event.origin(),
            subscribers.len()
        );
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

fn kind(event: &BoardEvent) -> &'static str {
    match event {
        BoardEvent::Scale(_) => "scale",
        BoardEvent::Selection(_) => "selection",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracklane_protocol::{Selection, ViewerId};

    fn clear(id: &str) -> BoardEvent {
        BoardEvent::Selection(Selection::cleared(ViewerId::from(id)))
    }

    #[test]
    fn delivers_to_every_subscriber_including_publisher() {
        let bus = Bus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();
        bus.publish(clear("a"));
        assert_eq!(a.try_iter().count(), 1);
        assert_eq!(b.try_iter().count(), 1);
    }

    #[test]
    fn late_subscriber_misses_earlier_events() {
        let bus = Bus::new();
        bus.publish(clear("a"));
        let late = bus.subscribe();
        assert!(late.try_recv().is_err());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let bus = Bus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);
        bus.clone().publish(clear("a"));
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(kept.len(), 1);
    }
}
