//! Event-driven, four-valued simulation of gate-level netlists.
//!
//! A [Netlist] is built from shared [GateTypes](GateType), a subset of its gates is handed to a
//! [NetlistSimulator] which propagates [LogicValue] changes through combinational gates,
//! flip-flops, latches and RAMs and records every change as a waveform that can be exported
//! as a value change dump.
//!
//! # Example
//! ```
//! # use netsim::{library, LogicValue, Netlist, NetlistSimulator};
//! let mut nl = Netlist::new();
//! let d = nl.create_net("d");
//! let clk = nl.create_net("clk");
//! let q = nl.create_net("q");
//! let ff = nl.create_gate(&library::dff(), "ff");
//! nl.connect_input(ff, "D", d);
//! nl.connect_input(ff, "CLK", clk);
//! nl.connect_output(ff, "Q", q);
//!
//! let mut sim = NetlistSimulator::new(&nl);
//! sim.add_gates(nl.gate_ids()).unwrap();
//! sim.add_clock_period(clk, 10, true).unwrap();
//! sim.set_input(d, LogicValue::One);
//! sim.simulate(20).unwrap();
//!
//! assert_eq!(sim.simulation_state().value_at(q, 4), LogicValue::X);
//! assert_eq!(sim.simulation_state().value_at(q, 5), LogicValue::One);
//! ```
pub mod data_structures;
pub mod logic;
pub mod netlist;
pub mod simulator;

pub use logic::*;
pub use netlist::*;
pub use simulator::*;
