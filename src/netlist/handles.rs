use std::fmt::{self, Display, Formatter};

/// Represents the index of a net in a [Netlist](super::Netlist).
///
/// Handles are only minted by the [Netlist](super::Netlist) that owns the net,
/// the simulator stores them instead of references.
#[repr(transparent)]
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct NetId {
    pub(super) idx: usize,
}

/// Represents the index of a gate in a [Netlist](super::Netlist).
#[repr(transparent)]
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct GateId {
    pub(super) idx: usize,
}

impl NetId {
    pub(super) const fn new(idx: usize) -> NetId {
        NetId { idx }
    }

    /// Returns the numeric id of the net, stable for the lifetime of the netlist.
    pub fn id(&self) -> usize {
        self.idx
    }
}

impl GateId {
    pub(super) const fn new(idx: usize) -> GateId {
        GateId { idx }
    }

    /// Returns the numeric id of the gate, stable for the lifetime of the netlist.
    pub fn id(&self) -> usize {
        self.idx
    }
}

impl Display for NetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.idx)
    }
}

impl Display for GateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.idx)
    }
}

/// A gate pin attached to a net, either driving it (source) or reading it (destination).
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Endpoint {
    pub gate: GateId,
    pub pin: String,
}
