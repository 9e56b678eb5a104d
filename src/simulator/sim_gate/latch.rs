use super::{AsyncControl, EvalContext, Handled, StateOutputs};
use crate::logic::{BooleanFunction, LogicValue};
use crate::netlist::{Gate, LatchComponent};
use std::collections::HashMap;

/// Level sensitive latch, transparent while its enable function is 1.
#[derive(Debug, Clone)]
pub(crate) struct Latch {
    enable: BooleanFunction,
    data_in: BooleanFunction,
    control: AsyncControl,
    pub(crate) outputs: StateOutputs,
}

impl Latch {
    pub(crate) fn new(gate: &Gate, latch: &LatchComponent) -> Self {
        Self {
            enable: latch.enable.clone(),
            data_in: latch.data_in.clone(),
            control: AsyncControl {
                clear: latch.clear.clone(),
                preset: latch.preset.clone(),
                behavior: latch.behavior,
            },
            outputs: StateOutputs::new(gate),
        }
    }

    pub(crate) fn evaluate(
        &self,
        gate: &str,
        values: &HashMap<String, LogicValue>,
        time: u64,
        ctx: &mut EvalContext,
    ) -> Handled {
        if let Some(forced) = self.control.resolve(gate, values, &self.outputs, ctx) {
            self.outputs.emit(forced, time, ctx);
        } else if self.enable.evaluate(values) == LogicValue::One {
            let state = self.data_in.evaluate(values);
            self.outputs.emit((state, state.toggle()), time, ctx);
        }
        Handled::Done
    }
}
