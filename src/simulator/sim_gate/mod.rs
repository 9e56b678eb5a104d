//! Per-gate evaluation state of the simulator, one [SimGate] per simulated gate.
mod combinational;
mod flip_flop;
mod latch;
mod ram;

pub(crate) use combinational::*;
pub(crate) use flip_flop::*;
pub(crate) use latch::*;
pub(crate) use ram::*;

use super::error::{Diagnostic, Reporter};
use super::{Result, Simulation, SimulationError};
use crate::logic::{BooleanFunction, LogicValue};
use crate::netlist::{AsyncSetResetBehavior, Gate, GateId, GateTypeProperty, NetId, PinType};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Outcome of [SimGate::evaluate].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Handled {
    Done,
    /// The gate has to be [clocked](SimGate::clock) once every event of the current instant settled.
    ClockPending,
}

/// Everything an evaluator may touch besides its own state.
pub(crate) struct EvalContext<'a> {
    /// New events keyed by net and time, a later write to the same key wins.
    pub(crate) new_events: &'a mut IndexMap<(NetId, u64), LogicValue>,
    pub(crate) history: &'a Simulation,
    pub(crate) reporter: &'a mut Reporter,
    pub(crate) delay: u64,
}

impl EvalContext<'_> {
    pub(crate) fn emit(&mut self, net: NetId, time: u64, value: LogicValue) {
        self.new_events.insert((net, time + self.delay), value);
    }
}

/// Category specific state of a [SimGate].
#[derive(Debug, Clone)]
pub(crate) enum SimGateKind {
    Combinational(Combinational),
    FlipFlop(FlipFlop),
    Latch(Latch),
    Ram(Ram),
}
use SimGateKind as Kind;

/// Evaluator of one netlist gate.
#[derive(Debug, Clone)]
pub(crate) struct SimGate {
    pub(crate) gate: GateId,
    pub(crate) name: String,
    /// Last value seen on every connected input pin.
    values: HashMap<String, LogicValue>,
    pub(crate) kind: SimGateKind,
}

impl SimGate {
    /// Builds the evaluator of `gate`, the category is picked from the properties of its type.
    pub(crate) fn build(id: GateId, gate: &Gate, reporter: &mut Reporter) -> Result<SimGate> {
        let ty = gate.ty();
        let kind = if let (true, Some(ff)) = (ty.has_property(GateTypeProperty::Ff), ty.flip_flop()) {
            Kind::FlipFlop(FlipFlop::new(gate, ff))
        } else if let (true, Some(latch)) = (ty.has_property(GateTypeProperty::Latch), ty.latch()) {
            Kind::Latch(Latch::new(gate, latch))
        } else if let (true, Some(ram)) = (ty.has_property(GateTypeProperty::Ram), ty.ram()) {
            Kind::Ram(Ram::new(gate, ram, reporter))
        } else if ty.has_property(GateTypeProperty::Combinational) || ty.has_property(GateTypeProperty::Lut) {
            Kind::Combinational(Combinational::new(gate))
        } else {
            return Err(SimulationError::UnsupportedGate {
                gate: gate.name().to_string(),
                ty: ty.name().to_string(),
            });
        };

        let values = gate.fan_in().map(|(pin, _)| (pin.to_string(), LogicValue::X)).collect();

        Ok(SimGate {
            gate: id,
            name: gate.name().to_string(),
            values,
            kind,
        })
    }

    /// Updates the cached value of input pin `pin`.
    pub(crate) fn set_input(&mut self, pin: &str, value: LogicValue) {
        if let Some(v) = self.values.get_mut(pin) {
            *v = value;
        }
    }

    /// Reloads the input values and clock levels from the last values recorded in `history`.
    pub(crate) fn resync(&mut self, gate: &Gate, history: &Simulation) {
        for (pin, net) in gate.fan_in() {
            if let Some(v) = self.values.get_mut(pin) {
                *v = history.last_value(net).unwrap_or(LogicValue::X);
            }
        }
        match &mut self.kind {
            Kind::FlipFlop(ff) => ff.resync(&self.values),
            Kind::Ram(r) => r.resync(&self.values),
            Kind::Combinational(_) | Kind::Latch(_) => {}
        }
    }

    /// Reacts to a change of `net` which feeds at least one of the inputs of the gate.
    pub(crate) fn evaluate(&mut self, net: NetId, time: u64, ctx: &mut EvalContext) -> Handled {
        match &mut self.kind {
            Kind::Combinational(c) => c.evaluate(&self.values, time, ctx),
            Kind::FlipFlop(ff) => ff.evaluate(&self.name, net, &self.values, time, ctx),
            Kind::Latch(l) => l.evaluate(&self.name, &self.values, time, ctx),
            Kind::Ram(r) => r.evaluate(net, &self.values),
        }
    }

    /// Commits the clocked update that [SimGate::evaluate] deferred.
    pub(crate) fn clock(&mut self, time: u64, ctx: &mut EvalContext) {
        match &mut self.kind {
            Kind::FlipFlop(ff) => ff.clock(&self.name, &self.values, time, ctx),
            Kind::Ram(r) => r.clock(&self.name, &self.values, time, ctx),
            Kind::Combinational(_) | Kind::Latch(_) => {}
        }
    }

    /// Returns the initial output events when seeded with `value`.
    pub(crate) fn seed(&mut self, value: LogicValue, reporter: &mut Reporter) -> Vec<(NetId, LogicValue)> {
        match &mut self.kind {
            Kind::FlipFlop(ff) => ff.outputs.seed(value),
            Kind::Latch(l) => l.outputs.seed(value),
            Kind::Ram(r) => r.fill(&self.name, value, reporter),
            Kind::Combinational(_) => vec![],
        }
    }

    /// Returns the initial output events when seeded from the init payload `data`.
    pub(crate) fn seed_from_data(&mut self, data: &str, reporter: &mut Reporter) -> Vec<(NetId, LogicValue)> {
        match &mut self.kind {
            Kind::Ram(r) => return r.load(&self.name, data, reporter),
            Kind::Combinational(_) => return vec![],
            Kind::FlipFlop(_) | Kind::Latch(_) => {}
        }
        let value = match data {
            "0" => LogicValue::Zero,
            "1" => LogicValue::One,
            _ => {
                reporter.report(Diagnostic::InvalidInitData {
                    gate: self.name.clone(),
                    data: data.to_string(),
                });
                LogicValue::X
            }
        };
        self.seed(value, reporter)
    }
}

/// State and negated state outputs of a flip-flop or latch.
#[derive(Debug, Clone, Default)]
pub(crate) struct StateOutputs {
    pub(crate) state: Vec<NetId>,
    pub(crate) neg_state: Vec<NetId>,
}

impl StateOutputs {
    pub(crate) fn new(gate: &Gate) -> Self {
        let nets = |ty: PinType| -> Vec<NetId> {
            gate.ty()
                .output_pins_of_type(ty)
                .filter_map(|pin| gate.fan_out_net(&pin.name))
                .collect()
        };
        Self {
            state: nets(PinType::State),
            neg_state: nets(PinType::NegState),
        }
    }

    pub(crate) fn emit(&self, (state, neg_state): (LogicValue, LogicValue), time: u64, ctx: &mut EvalContext) {
        for net in &self.state {
            ctx.emit(*net, time, state);
        }
        for net in &self.neg_state {
            ctx.emit(*net, time, neg_state);
        }
    }

    fn seed(&self, value: LogicValue) -> Vec<(NetId, LogicValue)> {
        let state = self.state.iter().map(|net| (*net, value));
        let neg_state = self.neg_state.iter().map(|net| (*net, value.toggle()));
        state.chain(neg_state).collect()
    }

    /// Returns the last accepted values of the first state and negated state nets.
    fn previous(&self, history: &Simulation) -> (LogicValue, LogicValue) {
        let last = |nets: &[NetId]| {
            nets.first()
                .and_then(|net| history.last_value(*net))
                .unwrap_or(LogicValue::X)
        };
        (last(&self.state), last(&self.neg_state))
    }
}

/// Asynchronous clear and preset of a flip-flop or latch.
#[derive(Debug, Clone)]
pub(crate) struct AsyncControl {
    pub(crate) clear: Option<BooleanFunction>,
    pub(crate) preset: Option<BooleanFunction>,
    pub(crate) behavior: (AsyncSetResetBehavior, AsyncSetResetBehavior),
}

impl AsyncControl {
    /// Returns the forced state and negated state if clear or preset is asserted.
    pub(crate) fn resolve(
        &self,
        gate: &str,
        values: &HashMap<String, LogicValue>,
        outputs: &StateOutputs,
        ctx: &mut EvalContext,
    ) -> Option<(LogicValue, LogicValue)> {
        let asserted = |f: &Option<BooleanFunction>| {
            f.as_ref()
                .map_or(false, |f| f.evaluate(values) == LogicValue::One)
        };
        match (asserted(&self.clear), asserted(&self.preset)) {
            (true, true) => {
                let (state, neg_state) = outputs.previous(ctx.history);
                Some((
                    set_reset_behavior(self.behavior.0, state, gate, ctx.reporter),
                    set_reset_behavior(self.behavior.1, neg_state, gate, ctx.reporter),
                ))
            }
            (false, true) => Some((LogicValue::One, LogicValue::Zero)),
            (true, false) => Some((LogicValue::Zero, LogicValue::One)),
            (false, false) => None,
        }
    }
}

/// Returns the output of a gate with both clear and preset asserted.
pub(crate) fn set_reset_behavior(
    behavior: AsyncSetResetBehavior,
    previous: LogicValue,
    gate: &str,
    reporter: &mut Reporter,
) -> LogicValue {
    use AsyncSetResetBehavior::*;
    match behavior {
        L => LogicValue::Zero,
        H => LogicValue::One,
        N => previous,
        T => previous.toggle(),
        X => LogicValue::X,
        Undef => {
            reporter.report(Diagnostic::UndefinedSetResetBehavior {
                gate: gate.to_string(),
            });
            LogicValue::X
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_set_reset_behavior_table() {
        let mut reporter = Reporter::default();
        for behavior in AsyncSetResetBehavior::iter() {
            let expected = match behavior {
                AsyncSetResetBehavior::L => LogicValue::Zero,
                AsyncSetResetBehavior::H => LogicValue::One,
                AsyncSetResetBehavior::N => LogicValue::One,
                AsyncSetResetBehavior::T => LogicValue::Zero,
                AsyncSetResetBehavior::X | AsyncSetResetBehavior::Undef => LogicValue::X,
            };
            assert_eq!(
                set_reset_behavior(behavior, LogicValue::One, "ff", &mut reporter),
                expected,
                "{}",
                behavior
            );
        }
        assert_eq!(reporter.take().len(), 1);
    }
}
