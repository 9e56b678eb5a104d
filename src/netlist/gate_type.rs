use crate::logic::BooleanFunction;
use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use strum_macros::{Display, EnumIter, EnumString};

/// Properties a gate library assigns to a [GateType], they decide which evaluator the simulator uses.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum GateTypeProperty {
    Combinational,
    Lut,
    Ff,
    Latch,
    Ram,
    Gnd,
    Vcc,
    Buffer,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PinDirection {
    Input,
    Output,
}

/// Functional role of a pin.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PinType {
    None,
    Power,
    Ground,
    Clock,
    Enable,
    Set,
    Reset,
    State,
    NegState,
    Data,
    Address,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Pin {
    pub name: String,
    pub direction: PinDirection,
    pub ty: PinType,
}

/// Behavior of a sequential output when asynchronous set and reset are asserted at the same time.
///
/// | value   | output                               |
/// |---------|--------------------------------------|
/// | `L`     | 0                                    |
/// | `H`     | 1                                    |
/// | `N`     | previous output                      |
/// | `T`     | toggled previous output              |
/// | `X`     | unknown                              |
/// | `undef` | not defined by the library, an error |
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Display, EnumString, EnumIter)]
pub enum AsyncSetResetBehavior {
    L,
    H,
    N,
    T,
    X,
    #[strum(to_string = "undef")]
    Undef,
}

/// Flip-flop description of a [GateType].
#[derive(Debug, Clone, PartialEq)]
pub struct FlipFlopComponent {
    pub clock: BooleanFunction,
    pub next_state: BooleanFunction,
    pub clear: Option<BooleanFunction>,
    pub preset: Option<BooleanFunction>,
    /// Behavior of the state and negated state outputs respectively.
    pub behavior: (AsyncSetResetBehavior, AsyncSetResetBehavior),
}

/// Latch description of a [GateType].
#[derive(Debug, Clone, PartialEq)]
pub struct LatchComponent {
    pub enable: BooleanFunction,
    pub data_in: BooleanFunction,
    pub clear: Option<BooleanFunction>,
    pub preset: Option<BooleanFunction>,
    /// Behavior of the state and negated state outputs respectively.
    pub behavior: (AsyncSetResetBehavior, AsyncSetResetBehavior),
}

/// One read or write port of a [RamComponent].
#[derive(Debug, Clone, PartialEq)]
pub struct RamPortComponent {
    /// Name of the pin group holding the data pins, least significant bit first.
    pub data_group: String,
    /// Name of the pin group holding the address pins, least significant bit first.
    pub address_group: String,
    pub clock: BooleanFunction,
    pub enable: BooleanFunction,
    pub is_write: bool,
}

/// RAM description of a [GateType].
#[derive(Debug, Clone, PartialEq)]
pub struct RamComponent {
    /// Size of the memory array in bits.
    pub bit_size: u32,
    pub ports: Vec<RamPortComponent>,
}

/// Location of the initialization payload in a gate's data map.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InitComponent {
    pub category: String,
    pub identifiers: Vec<String>,
}

/// Gate library entry, shared by every gate of that type.
///
/// # Example
/// ```
/// # use netsim::{var, GateType, GateTypeProperty, PinDirection, PinType};
/// let and = GateType::new("AND2")
///     .with_property(GateTypeProperty::Combinational)
///     .with_pin("A", PinDirection::Input, PinType::None)
///     .with_pin("B", PinDirection::Input, PinType::None)
///     .with_pin("O", PinDirection::Output, PinType::None)
///     .with_function("O", var("A") & var("B"));
///
/// assert!(and.has_property(GateTypeProperty::Combinational));
/// assert_eq!(and.input_pins().count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GateType {
    name: String,
    properties: SmallVec<[GateTypeProperty; 2]>,
    pins: Vec<Pin>,
    pin_groups: IndexMap<String, Vec<String>>,
    functions: IndexMap<String, BooleanFunction>,
    ff: Option<FlipFlopComponent>,
    latch: Option<LatchComponent>,
    ram: Option<RamComponent>,
    init: Option<InitComponent>,
}

impl GateType {
    /// Returns a new [GateType] without properties or pins.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            properties: Default::default(),
            pins: Default::default(),
            pin_groups: Default::default(),
            functions: Default::default(),
            ff: None,
            latch: None,
            ram: None,
            init: None,
        }
    }

    pub fn with_property(mut self, property: GateTypeProperty) -> Self {
        if !self.properties.contains(&property) {
            self.properties.push(property);
        }
        self
    }

    pub fn with_pin<S: Into<String>>(mut self, name: S, direction: PinDirection, ty: PinType) -> Self {
        self.pins.push(Pin {
            name: name.into(),
            direction,
            ty,
        });
        self
    }

    /// Adds a pin group, `pins` are ordered from the least significant bit upwards.
    /// The pins have to be added separately with [GateType::with_pin].
    pub fn with_pin_group<S: Into<String>, I: IntoIterator<Item = String>>(mut self, name: S, pins: I) -> Self {
        self.pin_groups.insert(name.into(), pins.into_iter().collect());
        self
    }

    /// Sets the function of output pin `pin`.
    ///
    /// For RAM data input pins this is the per-bit write mask.
    pub fn with_function<S: Into<String>>(mut self, pin: S, function: BooleanFunction) -> Self {
        self.functions.insert(pin.into(), function);
        self
    }

    pub fn with_flip_flop(mut self, ff: FlipFlopComponent) -> Self {
        self.ff = Some(ff);
        self
    }

    pub fn with_latch(mut self, latch: LatchComponent) -> Self {
        self.latch = Some(latch);
        self
    }

    pub fn with_ram(mut self, ram: RamComponent) -> Self {
        self.ram = Some(ram);
        self
    }

    pub fn with_init(mut self, init: InitComponent) -> Self {
        self.init = Some(init);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_property(&self, property: GateTypeProperty) -> bool {
        self.properties.contains(&property)
    }

    pub fn properties(&self) -> &[GateTypeProperty] {
        &self.properties
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn pin(&self, name: &str) -> Option<&Pin> {
        self.pins.iter().find(|p| p.name == name)
    }

    pub fn pin_type(&self, name: &str) -> Option<PinType> {
        self.pin(name).map(|p| p.ty)
    }

    pub fn input_pins(&self) -> impl Iterator<Item = &Pin> {
        self.pins
            .iter()
            .filter(|p| p.direction == PinDirection::Input)
    }

    pub fn output_pins(&self) -> impl Iterator<Item = &Pin> {
        self.pins
            .iter()
            .filter(|p| p.direction == PinDirection::Output)
    }

    /// Returns the output pins of type `ty`.
    pub fn output_pins_of_type(&self, ty: PinType) -> impl Iterator<Item = &Pin> {
        self.output_pins().filter(move |p| p.ty == ty)
    }

    /// Returns the pins of group `name` ordered from the least significant bit upwards.
    pub fn pins_of_group(&self, name: &str) -> Option<&[String]> {
        self.pin_groups.get(name).map(Vec::as_slice)
    }

    pub fn function(&self, pin: &str) -> Option<&BooleanFunction> {
        self.functions.get(pin)
    }

    pub fn functions(&self) -> &IndexMap<String, BooleanFunction> {
        &self.functions
    }

    pub fn flip_flop(&self) -> Option<&FlipFlopComponent> {
        self.ff.as_ref()
    }

    pub fn latch(&self) -> Option<&LatchComponent> {
        self.latch.as_ref()
    }

    pub fn ram(&self) -> Option<&RamComponent> {
        self.ram.as_ref()
    }

    pub fn init(&self) -> Option<&InitComponent> {
        self.init.as_ref()
    }

    /// Returns the pins referenced by `function` that are of type [PinType::Clock],
    /// or every referenced input pin if none of them is explicitly a clock.
    pub fn clock_pins(&self, function: &BooleanFunction) -> IndexSet<String> {
        let vars = function.variables();
        let clocks: IndexSet<String> = vars
            .iter()
            .filter(|v| self.pin_type(v) == Some(PinType::Clock))
            .cloned()
            .collect();
        if clocks.is_empty() {
            vars
        } else {
            clocks
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::var;

    #[test]
    fn test_behavior_parse() {
        assert_eq!("undef".parse::<AsyncSetResetBehavior>().unwrap(), AsyncSetResetBehavior::Undef);
        assert_eq!("T".parse::<AsyncSetResetBehavior>().unwrap(), AsyncSetResetBehavior::T);
        assert_eq!(AsyncSetResetBehavior::Undef.to_string(), "undef");
    }

    #[test]
    fn test_clock_pins() {
        let ty = GateType::new("FF")
            .with_pin("C", PinDirection::Input, PinType::Clock)
            .with_pin("E", PinDirection::Input, PinType::Enable);

        let pins = ty.clock_pins(&(var("C") & var("E")));
        assert_eq!(pins.len(), 1);
        assert!(pins.contains("C"));

        let pins = ty.clock_pins(&var("E"));
        assert!(pins.contains("E"));
    }

    #[test]
    fn test_properties_deduplicate() {
        let ty = GateType::new("T")
            .with_property(GateTypeProperty::Ff)
            .with_property(GateTypeProperty::Ff);
        assert_eq!(ty.properties(), &[GateTypeProperty::Ff]);
        assert_eq!(GateTypeProperty::Ff.to_string(), "ff");
    }
}
