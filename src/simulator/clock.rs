use super::{Result, SimulationError};
use crate::logic::LogicValue;
use crate::netlist::NetId;

/// Periodic square wave driving a net, expanded to events on demand.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Clock {
    pub net: NetId,
    /// Half period in picoseconds.
    pub switch_time: u64,
    /// Value of the first half period is 0 if true, 1 otherwise.
    pub start_at_zero: bool,
}

impl Clock {
    /// Returns a clock with a period of `period` picoseconds.
    pub fn from_period(net: NetId, period: u64, start_at_zero: bool) -> Result<Self> {
        let switch_time = period / 2;
        if switch_time == 0 {
            return Err(SimulationError::InvalidClock(format!(
                "period of {} ps is too short",
                period
            )));
        }
        Ok(Self {
            net,
            switch_time,
            start_at_zero,
        })
    }

    /// Returns a clock with a frequency of `hz`, the period is rounded down to whole picoseconds.
    pub fn from_frequency(net: NetId, hz: f64, start_at_zero: bool) -> Result<Self> {
        if !hz.is_finite() || hz <= 0.0 {
            return Err(SimulationError::InvalidClock(format!(
                "frequency of {} Hz is not positive",
                hz
            )));
        }
        Self::from_period(net, (1e12 / hz) as u64, start_at_zero)
    }

    pub fn period(&self) -> u64 {
        self.switch_time * 2
    }

    /// Returns the value the clock drives at `time`.
    pub fn value_at(&self, time: u64) -> LogicValue {
        let first = LogicValue::from_bool(!self.start_at_zero);
        if (time / self.switch_time) % 2 == 0 {
            first
        } else {
            first.toggle()
        }
    }

    /// Returns the current value at `start` followed by every toggle in `(start, start + duration)`.
    pub fn transitions(&self, start: u64, duration: u64) -> impl Iterator<Item = (u64, LogicValue)> + '_ {
        let end = start.saturating_add(duration);
        let first_switch = (start / self.switch_time + 1) * self.switch_time;
        std::iter::once((start, self.value_at(start))).chain(
            (first_switch..end)
                .step_by(self.switch_time as usize)
                .map(move |t| (t, self.value_at(t))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::Netlist;
    use LogicValue::*;

    #[test]
    fn test_transitions() {
        let net = Netlist::new().create_net("clk");
        let clk = Clock::from_period(net, 10, true).unwrap();
        assert_eq!(
            clk.transitions(0, 20).collect::<Vec<_>>(),
            vec![(0, Zero), (5, One), (10, Zero), (15, One)]
        );
        // Resuming mid period keeps the phase.
        assert_eq!(
            clk.transitions(7, 10).collect::<Vec<_>>(),
            vec![(7, One), (10, Zero), (15, One)]
        );
    }

    #[test]
    fn test_frequency() {
        let net = Netlist::new().create_net("clk");
        let clk = Clock::from_frequency(net, 1e9, false).unwrap();
        assert_eq!(clk.period(), 1000);
        assert_eq!(clk.value_at(0), One);
        assert!(Clock::from_frequency(net, 0.0, false).is_err());
        assert!(Clock::from_period(net, 1, false).is_err());
    }
}
