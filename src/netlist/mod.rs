mod gate_type;
mod handles;
pub mod library;
#[allow(clippy::module_inception)]
mod netlist;

pub use gate_type::*;
pub use handles::*;
pub use netlist::*;
