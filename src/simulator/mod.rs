//! Event-driven simulation of a set of gates of a [Netlist](crate::netlist::Netlist).
mod clock;
mod config;
mod dependency;
mod error;
mod event;
mod sim_gate;
mod simulation;
#[allow(clippy::module_inception)]
mod simulator;
mod waveform;

pub use clock::*;
pub use config::*;
pub use error::{Diagnostic, Result, SimulationError};
pub use event::Event;
pub use simulation::*;
pub use simulator::*;
