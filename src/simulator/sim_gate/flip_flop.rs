use super::{AsyncControl, EvalContext, Handled, StateOutputs};
use crate::logic::{BooleanFunction, LogicValue};
use crate::netlist::{FlipFlopComponent, Gate, NetId};
use std::collections::{HashMap, HashSet};

/// Edge triggered flip-flop with optional asynchronous clear and preset.
///
/// A change on one of the nets of the clock function only marks the flip-flop as pending,
/// the next state is sampled by [FlipFlop::clock] once the whole instant settled.
#[derive(Debug, Clone)]
pub(crate) struct FlipFlop {
    clock: BooleanFunction,
    next_state: BooleanFunction,
    control: AsyncControl,
    pub(crate) outputs: StateOutputs,
    clock_nets: HashSet<NetId>,
    clock_level: LogicValue,
}

impl FlipFlop {
    pub(crate) fn new(gate: &Gate, ff: &FlipFlopComponent) -> Self {
        let clock_nets = ff
            .clock
            .variables()
            .iter()
            .filter_map(|pin| gate.fan_in_net(pin))
            .collect();
        Self {
            clock: ff.clock.clone(),
            next_state: ff.next_state.clone(),
            control: AsyncControl {
                clear: ff.clear.clone(),
                preset: ff.preset.clone(),
                behavior: ff.behavior,
            },
            outputs: StateOutputs::new(gate),
            clock_nets,
            clock_level: LogicValue::X,
        }
    }

    pub(crate) fn evaluate(
        &mut self,
        gate: &str,
        net: NetId,
        values: &HashMap<String, LogicValue>,
        time: u64,
        ctx: &mut EvalContext,
    ) -> Handled {
        let mut handled = Handled::Done;
        if self.clock_nets.contains(&net) {
            let level = self.clock.evaluate(values);
            if level == LogicValue::One && self.clock_level != LogicValue::One {
                handled = Handled::ClockPending;
            }
            self.clock_level = level;
        }

        // Clear and preset may share pins with the clock function.
        if let Some(forced) = self.control.resolve(gate, values, &self.outputs, ctx) {
            self.outputs.emit(forced, time, ctx);
        }
        handled
    }

    pub(crate) fn resync(&mut self, values: &HashMap<String, LogicValue>) {
        self.clock_level = self.clock.evaluate(values);
    }

    pub(crate) fn clock(&mut self, gate: &str, values: &HashMap<String, LogicValue>, time: u64, ctx: &mut EvalContext) {
        let forced = self.control.resolve(gate, values, &self.outputs, ctx);
        let outputs = forced.unwrap_or_else(|| {
            let state = self.next_state.evaluate(values);
            (state, state.toggle())
        });
        self.outputs.emit(outputs, time, ctx);
    }
}
