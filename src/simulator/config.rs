/// Default number of events processed within one simulated instant before
/// [simulate](super::NetlistSimulator::simulate) gives up with
/// [IterationTimeout](super::SimulationError::IterationTimeout).
pub const DEFAULT_ITERATION_TIMEOUT: u64 = 10_000_000;

/// Tunables of a [NetlistSimulator](super::NetlistSimulator).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SimulatorConfig {
    /// Maximum number of events processed at a single instant, 0 disables the check.
    pub iteration_timeout: u64,
    /// Delay in picoseconds added to every event emitted by a gate.
    pub gate_delay: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            iteration_timeout: DEFAULT_ITERATION_TIMEOUT,
            gate_delay: 0,
        }
    }
}
