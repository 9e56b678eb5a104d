use super::Event;
use crate::logic::LogicValue;
use crate::netlist::NetId;
use indexmap::IndexMap;

/// Accepted [Events](Event) of every net, in chronological order.
///
/// Consecutive events of a net never carry the same value. The same structure is the live
/// state of a running simulation, a checkpoint and the recorded waveform.
///
/// # Example
/// ```
/// # use netsim::{Netlist, LogicValue, Simulation};
/// # let mut nl = Netlist::new();
/// # let net = nl.create_net("a");
/// let mut sim = Simulation::new();
/// assert!(sim.add_event(net, 0, LogicValue::Zero));
/// assert!(sim.add_event(net, 10, LogicValue::One));
/// // Same value as before, dropped.
/// assert!(!sim.add_event(net, 20, LogicValue::One));
///
/// assert_eq!(sim.value_at(net, 5), LogicValue::Zero);
/// assert_eq!(sim.value_at(net, 30), LogicValue::One);
/// assert_eq!(sim.net_events(net).len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Simulation {
    events: IndexMap<NetId, Vec<Event>>,
}

impl Simulation {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the accepted events of `net`, oldest first.
    pub fn net_events(&self, net: NetId) -> &[Event] {
        self.events.get(&net).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns every net with at least one accepted event.
    pub fn nets(&self) -> impl Iterator<Item = NetId> + '_ {
        self.events
            .iter()
            .filter(|(_, e)| !e.is_empty())
            .map(|(net, _)| *net)
    }

    /// Returns the value of `net` at `time`, [X](LogicValue::X) if nothing was accepted up to then.
    pub fn value_at(&self, net: NetId, time: u64) -> LogicValue {
        let events = self.net_events(net);
        let after = events.partition_point(|e| e.time <= time);
        match after {
            0 => LogicValue::X,
            i => events[i - 1].value,
        }
    }

    /// Returns the most recently accepted value of `net`.
    pub fn last_value(&self, net: NetId) -> Option<LogicValue> {
        self.net_events(net).last().map(|e| e.value)
    }

    pub fn is_empty(&self) -> bool {
        self.events.values().all(Vec::is_empty)
    }

    pub fn clear(&mut self) {
        self.events.clear()
    }

    /// Records a change of `net` to `value` at `time`.
    ///
    /// See [Simulation::accept].
    pub fn add_event(&mut self, net: NetId, time: u64, value: LogicValue) -> bool {
        let id = self.net_events(net).len() as u64;
        self.accept(Event {
            net,
            time,
            value,
            id,
        })
    }

    /// Merges `event` into the history of its net and returns true if the value of the net changed.
    ///
    /// An event repeating the last value is dropped. An event at the same time as the last one
    /// overwrites it, and the overwritten entry disappears entirely if the value returns
    /// to the one before it.
    pub fn accept(&mut self, event: Event) -> bool {
        let events = self.events.entry(event.net).or_default();
        if let Some(last) = events.last() {
            if last.value == event.value {
                return false;
            }
            if last.time == event.time {
                events.pop();
                if events.last().map(|e| e.value) == Some(event.value) {
                    return true;
                }
            }
        }
        events.push(event);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::Netlist;
    use LogicValue::*;

    fn net() -> NetId {
        Netlist::new().create_net("n")
    }

    #[test]
    fn test_same_time_overwrite() {
        let n = net();
        let mut sim = Simulation::new();
        sim.add_event(n, 0, Zero);
        assert!(sim.add_event(n, 5, One));
        assert!(sim.add_event(n, 5, X));
        assert_eq!(
            sim.net_events(n).iter().map(|e| (e.time, e.value)).collect::<Vec<_>>(),
            vec![(0, Zero), (5, X)]
        );

        // Going back to the previous value erases the glitch.
        assert!(sim.add_event(n, 5, Zero));
        assert_eq!(sim.net_events(n).len(), 1);
        assert_eq!(sim.last_value(n), Some(Zero));
    }

    #[test]
    fn test_value_at_before_first_event() {
        let n = net();
        let mut sim = Simulation::new();
        assert!(sim.is_empty());
        assert_eq!(sim.last_value(n), None);
        sim.add_event(n, 10, One);
        assert_eq!(sim.value_at(n, 9), X);
        assert_eq!(sim.value_at(n, 10), One);
        assert_eq!(sim.nets().collect::<Vec<_>>(), vec![n]);
        sim.clear();
        assert!(sim.is_empty());
    }
}
