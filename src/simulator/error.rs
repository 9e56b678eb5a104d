use thiserror::Error;
use tracing::warn;

pub type Result<T> = std::result::Result<T, SimulationError>;

/// Fatal errors, the failed call leaves the simulator in an inspectable state.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("gate '{gate}' of type '{ty}' has no simulation model")]
    UnsupportedGate { gate: String, ty: String },

    #[error("simulator is already initialized")]
    AlreadyInitialized,

    #[error("simulator cannot be initialized after the simulation has started")]
    AlreadyStarted,

    #[error("gates cannot be added after initialization")]
    GatesAfterInitialization,

    #[error("sequential gates have to be seeded before initialization")]
    SeedAfterInitialization,

    #[error("invalid clock: {0}")]
    InvalidClock(String),

    #[error("no event settled after {iterations} iterations at {time} ps, the design probably contains a combinational loop")]
    IterationTimeout { time: u64, iterations: u64 },

    #[error("no gates were added to the simulator")]
    NoGates,

    #[error("nothing has been simulated yet")]
    NothingSimulated,

    #[error("end time {end} ps is beyond the simulated time {simulated} ps")]
    EndBeyondSimulation { end: u64, simulated: u64 },

    #[error("start time {start} ps is after end time {end} ps")]
    InvalidWindow { start: u64, end: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Recoverable errors, the affected gate is skipped or produces X and the simulation continues.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Error)]
pub enum Diagnostic {
    #[error("gate '{gate}': no init data found under '{category}'/'{identifier}'")]
    MissingInitData {
        gate: String,
        category: String,
        identifier: String,
    },

    #[error("gate '{gate}': invalid init data '{data}'")]
    InvalidInitData { gate: String, data: String },

    #[error("gate '{gate}': init data holds {actual} bits but the memory has {expected}")]
    MemorySizeMismatch {
        gate: String,
        expected: usize,
        actual: usize,
    },

    #[error("gate '{gate}': unsupported RAM geometry, {reason}")]
    InvalidRamGeometry { gate: String, reason: String },

    #[error("gate '{gate}': behavior of simultaneous set and reset is undefined")]
    UndefinedSetResetBehavior { gate: String },

    #[error("gate '{gate}': address {address} cannot be decoded")]
    UndecodableAddress { gate: String, address: String },
}

/// Sink for [Diagnostics](Diagnostic), every report is also logged.
#[derive(Debug, Clone, Default)]
pub(crate) struct Reporter {
    diagnostics: Vec<Diagnostic>,
}

impl Reporter {
    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        warn!(target: "netlist_simulator", "{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_drains() {
        let mut r = Reporter::default();
        r.report(Diagnostic::UndefinedSetResetBehavior { gate: "ff".into() });
        let taken = r.take();
        assert_eq!(taken.len(), 1);
        assert_eq!(
            taken[0].to_string(),
            "gate 'ff': behavior of simultaneous set and reset is undefined"
        );
        assert!(r.take().is_empty());
    }
}
