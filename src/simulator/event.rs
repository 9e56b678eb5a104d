use crate::logic::LogicValue;
use crate::netlist::NetId;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A scheduled change of `net` to `value` at `time` picoseconds.
///
/// Events are ordered by time, ties are broken by `id` which grows with every scheduled event.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Event {
    pub net: NetId,
    pub time: u64,
    pub value: LogicValue,
    pub id: u64,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.time, self.id, self.net, self.value).cmp(&(other.time, other.id, other.net, other.value))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of pending [Events](Event) which also hands out their ids.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventQueue {
    heap: BinaryHeap<Reverse<Event>>,
    next_id: u64,
}

impl EventQueue {
    /// Schedules a new event and returns it.
    pub(crate) fn push(&mut self, net: NetId, time: u64, value: LogicValue) -> Event {
        let event = Event {
            net,
            time,
            value,
            id: self.next_id,
        };
        self.next_id += 1;
        self.heap.push(Reverse(event));
        event
    }

    /// Returns the time of the earliest pending event.
    pub(crate) fn next_time(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse(e)| e.time)
    }

    /// Pops the earliest pending event if it is scheduled at `time`.
    pub(crate) fn pop_at(&mut self, time: u64) -> Option<Event> {
        if self.next_time() == Some(time) {
            self.heap.pop().map(|Reverse(e)| e)
        } else {
            None
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    /// Drops every pending event and restarts ids from 0.
    pub(crate) fn clear(&mut self) {
        self.heap.clear();
        self.next_id = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::Netlist;
    use LogicValue::*;

    #[test]
    fn test_order_by_time_then_id() {
        let mut nl = Netlist::new();
        let a = nl.create_net("a");
        let b = nl.create_net("b");

        let mut q = EventQueue::default();
        q.push(a, 5, One);
        q.push(b, 0, Zero);
        q.push(a, 0, One);

        assert_eq!(q.next_time(), Some(0));
        assert_eq!(q.pop_at(5), None);
        let first = q.pop_at(0).unwrap();
        assert_eq!((first.net, first.id), (b, 1));
        let second = q.pop_at(0).unwrap();
        assert_eq!((second.net, second.id), (a, 2));
        assert_eq!(q.pop_at(0), None);
        assert_eq!(q.len(), 1);

        q.clear();
        assert_eq!(q.len(), 0);
        assert_eq!(q.push(a, 1, X).id, 0);
    }
}
