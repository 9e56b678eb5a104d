use super::{EvalContext, Handled};
use crate::logic::{BooleanFunction, LogicValue};
use crate::netlist::{Gate, NetId};
use std::collections::HashMap;

/// Zero state evaluator, every output is a function of the current inputs.
#[derive(Debug, Clone)]
pub(crate) struct Combinational {
    pub(crate) outputs: Vec<(NetId, BooleanFunction)>,
}

impl Combinational {
    pub(crate) fn new(gate: &Gate) -> Self {
        let functions = gate.ty().functions();
        let outputs = gate
            .fan_out()
            .filter_map(|(pin, net)| {
                let mut function = functions.get(pin)?.clone();
                // Outputs may be expressed through sibling outputs, bounded to break cycles.
                for _ in 0..functions.len() {
                    let siblings: Vec<&String> = functions
                        .keys()
                        .filter(|other| function.depends_on(other))
                        .collect();
                    if siblings.is_empty() {
                        break;
                    }
                    for other in siblings {
                        function = function.substitute(other, &functions[other]);
                    }
                }
                Some((net, function))
            })
            .collect();
        Self { outputs }
    }

    pub(crate) fn evaluate(&self, values: &HashMap<String, LogicValue>, time: u64, ctx: &mut EvalContext) -> Handled {
        for (net, function) in &self.outputs {
            ctx.emit(*net, time, function.evaluate(values));
        }
        Handled::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::var;
    use crate::netlist::{GateType, GateTypeProperty, Netlist, PinDirection, PinType};
    use std::sync::Arc;

    #[test]
    fn test_sibling_outputs_are_substituted() {
        let ty = Arc::new(
            GateType::new("HA")
                .with_property(GateTypeProperty::Combinational)
                .with_pin("A", PinDirection::Input, PinType::None)
                .with_pin("B", PinDirection::Input, PinType::None)
                .with_pin("S", PinDirection::Output, PinType::None)
                .with_pin("C", PinDirection::Output, PinType::None)
                .with_pin("CN", PinDirection::Output, PinType::None)
                .with_function("S", var("A") ^ var("B"))
                .with_function("C", var("A") & var("B"))
                .with_function("CN", !var("C")),
        );
        let mut nl = Netlist::new();
        let g = nl.create_gate(&ty, "ha");
        for pin in ["S", "C", "CN"] {
            let net = nl.create_net(pin);
            nl.connect_output(g, pin, net);
        }

        let c = Combinational::new(nl.gate(g));
        assert_eq!(c.outputs.len(), 3);
        let (_, cn) = &c.outputs[2];
        assert_eq!(cn.to_string(), "!(A & B)");
    }
}
