//! Gate types commonly found in gate libraries, ready to be instantiated in a [Netlist](super::Netlist).
use super::gate_type::*;
use crate::logic::{constant, var, LogicValue};
use std::sync::Arc;

/// Data category used by the sequential types of this library for their init payload.
pub const INIT_CATEGORY: &str = "generic";
/// Data identifier used by the sequential types of this library for their init payload.
pub const INIT_IDENTIFIER: &str = "INIT";

fn init_component() -> InitComponent {
    InitComponent {
        category: INIT_CATEGORY.into(),
        identifiers: vec![INIT_IDENTIFIER.into()],
    }
}

/// Creates constructors for 2 input combinational gate types with inputs `A`, `B` and output `O`.
macro_rules! binary_gate_types {
    ($($name:ident => $type_name:expr, |$a:ident, $b:ident| $function:expr;)*) => {
        $(
            #[doc = concat!("Returns a new `", $type_name, "` gate type with inputs `A`, `B` and output `O`.")]
            pub fn $name() -> Arc<GateType> {
                let $a = var("A");
                let $b = var("B");
                Arc::new(
                    GateType::new($type_name)
                        .with_property(GateTypeProperty::Combinational)
                        .with_pin("A", PinDirection::Input, PinType::None)
                        .with_pin("B", PinDirection::Input, PinType::None)
                        .with_pin("O", PinDirection::Output, PinType::None)
                        .with_function("O", $function),
                )
            }
        )*
    };
}

binary_gate_types! {
    and2 => "AND2", |a, b| a & b;
    or2 => "OR2", |a, b| a | b;
    xor2 => "XOR2", |a, b| a ^ b;
    nand2 => "NAND2", |a, b| !(a & b);
    nor2 => "NOR2", |a, b| !(a | b);
    xnor2 => "XNOR2", |a, b| !(a ^ b);
}

/// Returns a new inverter gate type with input `I` and output `O`.
pub fn inv() -> Arc<GateType> {
    Arc::new(
        GateType::new("INV")
            .with_property(GateTypeProperty::Combinational)
            .with_pin("I", PinDirection::Input, PinType::None)
            .with_pin("O", PinDirection::Output, PinType::None)
            .with_function("O", !var("I")),
    )
}

/// Returns a new buffer gate type with input `I` and output `O`.
pub fn buf() -> Arc<GateType> {
    Arc::new(
        GateType::new("BUF")
            .with_property(GateTypeProperty::Combinational)
            .with_property(GateTypeProperty::Buffer)
            .with_pin("I", PinDirection::Input, PinType::None)
            .with_pin("O", PinDirection::Output, PinType::None)
            .with_function("O", var("I")),
    )
}

fn constant_type(name: &str, property: GateTypeProperty, value: LogicValue) -> Arc<GateType> {
    Arc::new(
        GateType::new(name)
            .with_property(GateTypeProperty::Combinational)
            .with_property(property)
            .with_pin("O", PinDirection::Output, PinType::None)
            .with_function("O", constant(value)),
    )
}

/// Returns a new ground gate type driving output `O` to 0.
pub fn gnd() -> Arc<GateType> {
    constant_type("GND", GateTypeProperty::Gnd, LogicValue::Zero)
}

/// Returns a new power gate type driving output `O` to 1.
pub fn vcc() -> Arc<GateType> {
    constant_type("VCC", GateTypeProperty::Vcc, LogicValue::One)
}

fn sequential_outputs(ty: GateType) -> GateType {
    ty.with_pin("Q", PinDirection::Output, PinType::State)
        .with_pin("QN", PinDirection::Output, PinType::NegState)
        .with_init(init_component())
}

/// Returns a new rising edge D flip-flop type with inputs `D`, `CLK` and outputs `Q`, `QN`.
pub fn dff() -> Arc<GateType> {
    let ty = GateType::new("DFF")
        .with_property(GateTypeProperty::Ff)
        .with_pin("D", PinDirection::Input, PinType::Data)
        .with_pin("CLK", PinDirection::Input, PinType::Clock)
        .with_flip_flop(FlipFlopComponent {
            clock: var("CLK"),
            next_state: var("D"),
            clear: None,
            preset: None,
            behavior: (AsyncSetResetBehavior::X, AsyncSetResetBehavior::X),
        });
    Arc::new(sequential_outputs(ty))
}

/// Returns a new D flip-flop type whose clock is gated by enable input `E`, clocked by `CLK & E`.
pub fn dff_enable() -> Arc<GateType> {
    let ty = GateType::new("DFFE")
        .with_property(GateTypeProperty::Ff)
        .with_pin("D", PinDirection::Input, PinType::Data)
        .with_pin("CLK", PinDirection::Input, PinType::Clock)
        .with_pin("E", PinDirection::Input, PinType::Enable)
        .with_flip_flop(FlipFlopComponent {
            clock: var("CLK") & var("E"),
            next_state: var("D"),
            clear: None,
            preset: None,
            behavior: (AsyncSetResetBehavior::X, AsyncSetResetBehavior::X),
        });
    Arc::new(sequential_outputs(ty))
}

/// Returns a new D flip-flop type with active high asynchronous reset `R` and set `S`.
///
/// `behavior` decides the `Q` and `QN` outputs when `R` and `S` are asserted together.
pub fn dff_reset_set(behavior: (AsyncSetResetBehavior, AsyncSetResetBehavior)) -> Arc<GateType> {
    let ty = GateType::new("DFFRS")
        .with_property(GateTypeProperty::Ff)
        .with_pin("D", PinDirection::Input, PinType::Data)
        .with_pin("CLK", PinDirection::Input, PinType::Clock)
        .with_pin("R", PinDirection::Input, PinType::Reset)
        .with_pin("S", PinDirection::Input, PinType::Set)
        .with_flip_flop(FlipFlopComponent {
            clock: var("CLK"),
            next_state: var("D"),
            clear: Some(var("R")),
            preset: Some(var("S")),
            behavior,
        });
    Arc::new(sequential_outputs(ty))
}

/// Returns a new transparent high D latch type with inputs `D`, `G` and outputs `Q`, `QN`.
pub fn dlatch() -> Arc<GateType> {
    let ty = GateType::new("DLATCH")
        .with_property(GateTypeProperty::Latch)
        .with_pin("D", PinDirection::Input, PinType::Data)
        .with_pin("G", PinDirection::Input, PinType::Enable)
        .with_latch(LatchComponent {
            enable: var("G"),
            data_in: var("D"),
            clear: None,
            preset: None,
            behavior: (AsyncSetResetBehavior::X, AsyncSetResetBehavior::X),
        });
    Arc::new(sequential_outputs(ty))
}

/// Returns a new D latch type with active high asynchronous reset `R` and set `S`.
pub fn dlatch_reset_set(behavior: (AsyncSetResetBehavior, AsyncSetResetBehavior)) -> Arc<GateType> {
    let ty = GateType::new("DLATCHRS")
        .with_property(GateTypeProperty::Latch)
        .with_pin("D", PinDirection::Input, PinType::Data)
        .with_pin("G", PinDirection::Input, PinType::Enable)
        .with_pin("R", PinDirection::Input, PinType::Reset)
        .with_pin("S", PinDirection::Input, PinType::Set)
        .with_latch(LatchComponent {
            enable: var("G"),
            data_in: var("D"),
            clear: Some(var("R")),
            preset: Some(var("S")),
            behavior,
        });
    Arc::new(sequential_outputs(ty))
}

fn bus(prefix: &str, width: usize) -> Vec<String> {
    (0..width).map(|i| format!("{}{}", prefix, i)).collect()
}

fn ram_type(name: &str, address_width: usize, data_width: usize, bit_size: u32) -> GateType {
    let mut ty = GateType::new(name)
        .with_property(GateTypeProperty::Ram)
        .with_pin("CLK", PinDirection::Input, PinType::Clock)
        .with_pin("WE", PinDirection::Input, PinType::Enable)
        .with_pin("RE", PinDirection::Input, PinType::Enable);

    for (prefix, direction, pin_type, width) in [
        ("WADDR", PinDirection::Input, PinType::Address, address_width),
        ("WDATA", PinDirection::Input, PinType::Data, data_width),
        ("RADDR", PinDirection::Input, PinType::Address, address_width),
        ("RDATA", PinDirection::Output, PinType::Data, data_width),
    ] {
        for pin in bus(prefix, width) {
            ty = ty.with_pin(pin, direction, pin_type);
        }
        ty = ty.with_pin_group(prefix, bus(prefix, width));
    }

    ty.with_ram(RamComponent {
        bit_size,
        ports: vec![
            RamPortComponent {
                data_group: "WDATA".into(),
                address_group: "WADDR".into(),
                clock: var("CLK"),
                enable: var("WE"),
                is_write: true,
            },
            RamPortComponent {
                data_group: "RDATA".into(),
                address_group: "RADDR".into(),
                clock: var("CLK"),
                enable: var("RE"),
                is_write: false,
            },
        ],
    })
    .with_init(init_component())
}

/// Returns a new simple dual port RAM type of `bit_size` bits with one write port
/// (`WADDR*`, `WDATA*`, enable `WE`) and one read port (`RADDR*`, `RDATA*`, enable `RE`),
/// both clocked on the rising edge of `CLK`.
pub fn ram(address_width: usize, data_width: usize, bit_size: u32) -> Arc<GateType> {
    Arc::new(ram_type("RAM", address_width, data_width, bit_size))
}

/// Same as [ram] with additional `WMASK*` inputs, data bit `i` is only written if `WMASKi` is 1.
pub fn ram_masked(address_width: usize, data_width: usize, bit_size: u32) -> Arc<GateType> {
    let mut ty = ram_type("RAMM", address_width, data_width, bit_size);
    for (mask, data) in bus("WMASK", data_width).into_iter().zip(bus("WDATA", data_width)) {
        ty = ty
            .with_pin(mask.clone(), PinDirection::Input, PinType::Enable)
            .with_function(data, var(mask));
    }
    Arc::new(ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_types() {
        let t = nand2();
        assert_eq!(t.name(), "NAND2");
        assert_eq!(t.input_pins().count(), 2);
        assert!(t.function("O").is_some());
    }

    #[test]
    fn test_ram_groups() {
        let t = ram_masked(4, 4, 64);
        assert_eq!(t.pins_of_group("WADDR").unwrap().len(), 4);
        assert_eq!(t.pins_of_group("RDATA").unwrap()[0], "RDATA0");
        assert_eq!(t.ram().unwrap().ports.len(), 2);
        assert!(t.function("WDATA3").unwrap().depends_on("WMASK3"));
    }
}
