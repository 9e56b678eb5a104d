use super::gate_type::*;
use super::handles::*;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use unwrap::unwrap;

/// A wire connecting gate pins.
#[derive(Debug, Clone)]
pub struct Net {
    name: String,
    sources: SmallVec<[Endpoint; 1]>,
    destinations: Vec<Endpoint>,
    global_input: bool,
    global_output: bool,
}

impl Net {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn sources(&self) -> &[Endpoint] {
        &self.sources
    }
    pub fn destinations(&self) -> &[Endpoint] {
        &self.destinations
    }
    pub fn is_global_input(&self) -> bool {
        self.global_input
    }
    pub fn is_global_output(&self) -> bool {
        self.global_output
    }
}

/// An instance of a [GateType].
#[derive(Debug, Clone)]
pub struct Gate {
    name: String,
    ty: Arc<GateType>,
    fan_in: IndexMap<String, NetId>,
    fan_out: IndexMap<String, NetId>,
    data: HashMap<(String, String), String>,
}

impl Gate {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &GateType {
        &self.ty
    }

    /// Returns the net connected to input pin `pin`.
    pub fn fan_in_net(&self, pin: &str) -> Option<NetId> {
        self.fan_in.get(pin).copied()
    }

    /// Returns the net connected to output pin `pin`.
    pub fn fan_out_net(&self, pin: &str) -> Option<NetId> {
        self.fan_out.get(pin).copied()
    }

    /// Returns all connected input pins with their nets, in connection order.
    pub fn fan_in(&self) -> impl Iterator<Item = (&str, NetId)> {
        self.fan_in.iter().map(|(pin, net)| (pin.as_str(), *net))
    }

    /// Returns all connected output pins with their nets, in connection order.
    pub fn fan_out(&self) -> impl Iterator<Item = (&str, NetId)> {
        self.fan_out.iter().map(|(pin, net)| (pin.as_str(), *net))
    }

    /// Returns the data entry stored under `category` and `identifier`.
    pub fn data(&self, category: &str, identifier: &str) -> Option<&str> {
        self.data
            .get(&(category.to_string(), identifier.to_string()))
            .map(String::as_str)
    }

    pub fn is_gnd_gate(&self) -> bool {
        self.ty.has_property(GateTypeProperty::Gnd)
    }

    pub fn is_vcc_gate(&self) -> bool {
        self.ty.has_property(GateTypeProperty::Vcc)
    }
}

/// Arena of [Nets](Net) and [Gates](Gate) addressed by [NetId] and [GateId].
///
/// The simulator only ever reads from a netlist.
///
/// # Example
/// ```
/// # use netsim::{library, Netlist};
/// let mut nl = Netlist::new();
/// let and = library::and2();
///
/// let a = nl.create_net("A");
/// let b = nl.create_net("B");
/// let o = nl.create_net("O");
///
/// let g = nl.create_gate(&and, "and");
/// nl.connect_input(g, "A", a);
/// nl.connect_input(g, "B", b);
/// nl.connect_output(g, "O", o);
///
/// assert_eq!(nl.net(a).destinations().len(), 1);
/// assert_eq!(nl.net(o).sources()[0].gate, g);
/// assert_eq!(nl.net_by_name("B"), Some(b));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Netlist {
    nets: Vec<Net>,
    gates: Vec<Gate>,
}

impl Netlist {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the [NetId] of a new unconnected net.
    pub fn create_net<S: Into<String>>(&mut self, name: S) -> NetId {
        let idx = NetId::new(self.nets.len());
        self.nets.push(Net {
            name: name.into(),
            sources: Default::default(),
            destinations: Default::default(),
            global_input: false,
            global_output: false,
        });
        idx
    }

    /// Returns the [GateId] of a new unconnected gate of type `ty`.
    pub fn create_gate<S: Into<String>>(&mut self, ty: &Arc<GateType>, name: S) -> GateId {
        let idx = GateId::new(self.gates.len());
        self.gates.push(Gate {
            name: name.into(),
            ty: Arc::clone(ty),
            fan_in: Default::default(),
            fan_out: Default::default(),
            data: Default::default(),
        });
        idx
    }

    /// Connects input pin `pin` of `gate` to `net`.
    ///
    /// # Panics
    ///
    /// Will panic if `gate` or `net` don't belong to this netlist.
    pub fn connect_input<S: Into<String>>(&mut self, gate: GateId, pin: S, net: NetId) {
        let pin = pin.into();
        self.net_mut(net).destinations.push(Endpoint {
            gate,
            pin: pin.clone(),
        });
        self.gate_mut(gate).fan_in.insert(pin, net);
    }

    /// Connects output pin `pin` of `gate` to `net`.
    ///
    /// # Panics
    ///
    /// Will panic if `gate` or `net` don't belong to this netlist.
    pub fn connect_output<S: Into<String>>(&mut self, gate: GateId, pin: S, net: NetId) {
        let pin = pin.into();
        self.net_mut(net).sources.push(Endpoint {
            gate,
            pin: pin.clone(),
        });
        self.gate_mut(gate).fan_out.insert(pin, net);
    }

    pub fn mark_global_input(&mut self, net: NetId) {
        self.net_mut(net).global_input = true;
    }

    pub fn mark_global_output(&mut self, net: NetId) {
        self.net_mut(net).global_output = true;
    }

    /// Stores `value` in the data map of `gate` under `category` and `identifier`.
    pub fn set_data<C: Into<String>, I: Into<String>, V: Into<String>>(
        &mut self,
        gate: GateId,
        category: C,
        identifier: I,
        value: V,
    ) {
        self.gate_mut(gate)
            .data
            .insert((category.into(), identifier.into()), value.into());
    }

    /// Returns an immutable reference to the [Net] at `net`.
    ///
    /// # Panics
    ///
    /// Will panic if `net` doesn't belong to this netlist.
    pub fn net(&self, net: NetId) -> &Net {
        unwrap!(
            self.nets.get(net.idx),
            "Tried to access net out of bounds:{}, size:{}",
            net,
            self.nets.len()
        )
    }

    /// Returns an immutable reference to the [Gate] at `gate`.
    ///
    /// # Panics
    ///
    /// Will panic if `gate` doesn't belong to this netlist.
    pub fn gate(&self, gate: GateId) -> &Gate {
        unwrap!(
            self.gates.get(gate.idx),
            "Tried to access gate out of bounds:{}, size:{}",
            gate,
            self.gates.len()
        )
    }

    fn net_mut(&mut self, net: NetId) -> &mut Net {
        let len = self.nets.len();
        unwrap!(
            self.nets.get_mut(net.idx),
            "Tried to access net out of bounds:{}, size:{}",
            net,
            len
        )
    }

    fn gate_mut(&mut self, gate: GateId) -> &mut Gate {
        let len = self.gates.len();
        unwrap!(
            self.gates.get_mut(gate.idx),
            "Tried to access gate out of bounds:{}, size:{}",
            gate,
            len
        )
    }

    /// Returns the first net named `name`.
    pub fn net_by_name(&self, name: &str) -> Option<NetId> {
        self.nets
            .iter()
            .position(|n| n.name == name)
            .map(NetId::new)
    }

    /// Returns the first gate named `name`.
    pub fn gate_by_name(&self, name: &str) -> Option<GateId> {
        self.gates
            .iter()
            .position(|g| g.name == name)
            .map(GateId::new)
    }

    pub fn nets(&self) -> impl Iterator<Item = (NetId, &Net)> {
        self.nets
            .iter()
            .enumerate()
            .map(|(i, n)| (NetId::new(i), n))
    }

    pub fn gates(&self) -> impl Iterator<Item = (GateId, &Gate)> {
        self.gates
            .iter()
            .enumerate()
            .map(|(i, g)| (GateId::new(i), g))
    }

    pub fn gate_ids(&self) -> impl Iterator<Item = GateId> {
        (0..self.gates.len()).map(GateId::new)
    }

    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::library;

    #[test]
    fn test_connectivity() {
        let mut nl = Netlist::new();
        let inv = library::inv();
        let a = nl.create_net("a");
        let b = nl.create_net("b");
        let g1 = nl.create_gate(&inv, "g1");
        let g2 = nl.create_gate(&inv, "g2");
        nl.connect_input(g1, "I", a);
        nl.connect_output(g1, "O", b);
        nl.connect_input(g2, "I", b);

        assert_eq!(nl.gate(g1).fan_in_net("I"), Some(a));
        assert_eq!(nl.gate(g1).fan_out_net("O"), Some(b));
        assert_eq!(nl.gate(g2).fan_out_net("O"), None);
        assert_eq!(nl.net(b).destinations()[0].gate, g2);
        assert_eq!(nl.gate_by_name("g2"), Some(g2));
        assert_eq!(nl.gate_count(), 2);
    }

    #[test]
    fn test_data() {
        let mut nl = Netlist::new();
        let g = nl.create_gate(&library::dff(), "ff");
        nl.set_data(g, "generic", "INIT", "1");
        assert_eq!(nl.gate(g).data("generic", "INIT"), Some("1"));
        assert_eq!(nl.gate(g).data("generic", "OTHER"), None);
    }

    #[test]
    #[should_panic(expected = "Tried to access net out of bounds:3")]
    fn test_invalid_net_panics() {
        let nl = Netlist::new();
        nl.net(NetId::new(3));
    }
}
