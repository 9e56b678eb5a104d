use super::sim_gate::SimGate;
use crate::netlist::{GateId, NetId, Netlist};
use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::path::Path;

/// Simulated gates reading a net, as indices into the simulator's gates, with the pins they read it on.
pub(crate) type Successors = Vec<(usize, SmallVec<[String; 2]>)>;

/// Maps every net to the simulated gates that have to be notified when it changes.
#[derive(Debug, Clone, Default)]
pub(crate) struct DependencyIndex {
    successors: HashMap<NetId, Successors>,
}

impl DependencyIndex {
    /// Builds the index over the fan-out nets of `gates` and `inputs`.
    pub(crate) fn build(netlist: &Netlist, gates: &[SimGate], inputs: &[NetId]) -> Self {
        let positions: HashMap<GateId, usize> = gates.iter().enumerate().map(|(i, g)| (g.gate, i)).collect();
        let nets: IndexSet<NetId> = gates
            .iter()
            .flat_map(|g| netlist.gate(g.gate).fan_out().map(|(_, net)| net))
            .chain(inputs.iter().copied())
            .collect();

        let mut successors = HashMap::with_capacity(nets.len());
        for net in nets {
            let mut affected: IndexMap<usize, SmallVec<[String; 2]>> = IndexMap::new();
            for endpoint in netlist.net(net).destinations() {
                if let Some(&idx) = positions.get(&endpoint.gate) {
                    affected.entry(idx).or_default().push(endpoint.pin.clone());
                }
            }
            if !affected.is_empty() {
                successors.insert(net, affected.into_iter().collect());
            }
        }
        Self { successors }
    }

    /// Returns the gates reading `net`.
    pub(crate) fn successors(&self, net: NetId) -> &[(usize, SmallVec<[String; 2]>)] {
        self.successors.get(&net).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn net_count(&self) -> usize {
        self.successors.len()
    }

    /// Dumps the index in [dot](https://en.wikipedia.org/wiki/DOT_(graph_description_language)) format
    /// to `path`, nets and gates are nodes and every edge is labeled with the pins reading the net.
    pub(crate) fn dump_dot<P: AsRef<Path>>(&self, netlist: &Netlist, gates: &[SimGate], path: P) -> std::io::Result<()> {
        use petgraph::dot::Dot;

        let mut graph = petgraph::Graph::<String, String>::new();
        let gate_nodes: Vec<_> = gates
            .iter()
            .map(|g| graph.add_node(format!("{} ({})", g.name, netlist.gate(g.gate).ty().name())))
            .collect();

        let mut nets: Vec<_> = self.successors.iter().collect();
        nets.sort_by_key(|(net, _)| **net);
        for (net, successors) in nets {
            let node = graph.add_node(netlist.net(*net).name().to_string());
            for (idx, pins) in successors {
                graph.add_edge(node, gate_nodes[*idx], pins.join(","));
            }
        }
        std::fs::write(path, format!("{}", Dot::new(&graph)))
    }
}

/// Returns the nets entering `gates`: global inputs, nets without a source and
/// nets with a source outside of `gates`.
pub(crate) fn input_nets(netlist: &Netlist, gates: &IndexSet<GateId>) -> Vec<NetId> {
    let nets: IndexSet<NetId> = gates
        .iter()
        .flat_map(|g| netlist.gate(*g).fan_in().map(|(_, net)| net))
        .filter(|net| {
            let net = netlist.net(*net);
            net.is_global_input()
                || net.sources().is_empty()
                || net.sources().iter().any(|s| !gates.contains(&s.gate))
        })
        .collect();
    nets.into_iter().collect()
}

/// Returns the nets leaving `gates`: global outputs and nets with a destination outside of `gates`.
pub(crate) fn output_nets(netlist: &Netlist, gates: &IndexSet<GateId>) -> Vec<NetId> {
    let nets: IndexSet<NetId> = gates
        .iter()
        .flat_map(|g| netlist.gate(*g).fan_out().map(|(_, net)| net))
        .filter(|net| {
            let net = netlist.net(*net);
            net.is_global_output() || net.destinations().iter().any(|d| !gates.contains(&d.gate))
        })
        .collect();
    nets.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::library;
    use crate::simulator::error::Reporter;

    #[test]
    fn test_boundary_and_successors() {
        // a -> inv1 -> b, and2 reads a and b and drives c, only and2 is simulated.
        let mut nl = Netlist::new();
        let and = library::and2();
        let inv = library::inv();
        let a = nl.create_net("a");
        let b = nl.create_net("b");
        let c = nl.create_net("c");
        let g1 = nl.create_gate(&inv, "inv1");
        let g2 = nl.create_gate(&and, "and2");
        nl.connect_input(g1, "I", a);
        nl.connect_output(g1, "O", b);
        nl.connect_input(g2, "A", b);
        nl.connect_input(g2, "B", a);
        nl.connect_output(g2, "O", c);
        nl.mark_global_output(c);

        let set: IndexSet<GateId> = std::iter::once(g2).collect();
        assert_eq!(input_nets(&nl, &set), vec![b, a]);
        assert_eq!(output_nets(&nl, &set), vec![c]);

        let mut reporter = Reporter::default();
        let gates = vec![SimGate::build(g2, nl.gate(g2), &mut reporter).unwrap()];
        let index = DependencyIndex::build(&nl, &gates, &input_nets(&nl, &set));
        assert_eq!(index.successors(a).len(), 1);
        assert_eq!(index.successors(a)[0].1.as_slice(), &["B".to_string()]);
        assert!(index.successors(c).is_empty());
        assert_eq!(index.net_count(), 2);
    }
}
