use super::dependency::{self, DependencyIndex};
use super::error::{Diagnostic, Reporter};
use super::event::EventQueue;
use super::sim_gate::{EvalContext, Handled, SimGate};
use super::waveform::write_vcd;
use super::*;
use crate::data_structures::Immutable;
use crate::logic::LogicValue;
use crate::netlist::{Gate, GateId, GateTypeProperty, NetId, Netlist};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error, trace};

const LOG_TARGET: &str = "netlist_simulator";

/// Returns the init payload of `gate`, the data of every identifier of its init component
/// with the last identifier first.
fn init_data(gate: &Gate, reporter: &mut Reporter) -> Option<String> {
    let init = gate.ty().init()?;
    let mut data = String::new();
    for identifier in init.identifiers.iter().rev() {
        match gate.data(&init.category, identifier) {
            Some(d) => data.push_str(d),
            None => {
                reporter.report(Diagnostic::MissingInitData {
                    gate: gate.name().to_string(),
                    category: init.category.clone(),
                    identifier: identifier.clone(),
                });
                return None;
            }
        }
    }
    Some(data)
}

/// Source of the initial state of a sequential gate.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Seed {
    Value(LogicValue),
    FromNetlist,
}

/// Event-driven simulator of a set of gates of a [Netlist].
///
/// Gates and clocks are registered first, [initialize](NetlistSimulator::initialize) then builds the
/// evaluators, after which stimuli can be applied with [set_input](NetlistSimulator::set_input)
/// and time advanced with [simulate](NetlistSimulator::simulate). Every accepted change is recorded
/// in the [Simulation] which can be exported with [generate_vcd](NetlistSimulator::generate_vcd).
///
/// All events within the same instant settle before any flip-flop or RAM samples its inputs.
///
/// # Example
/// ```
/// # use netsim::{assert_net_value, library, LogicValue, Netlist, NetlistSimulator};
/// let mut nl = Netlist::new();
/// let and = library::and2();
/// let a = nl.create_net("A");
/// let b = nl.create_net("B");
/// let o = nl.create_net("O");
/// let g = nl.create_gate(&and, "and");
/// nl.connect_input(g, "A", a);
/// nl.connect_input(g, "B", b);
/// nl.connect_output(g, "O", o);
///
/// let mut sim = NetlistSimulator::new(&nl);
/// sim.add_gates(vec![g]).unwrap();
/// sim.set_input(a, LogicValue::One);
/// sim.set_input(b, LogicValue::One);
/// sim.simulate(10).unwrap();
///
/// assert_net_value!(sim, o, LogicValue::One);
/// assert_eq!(sim.current_time(), 10);
/// ```
#[derive(Debug)]
pub struct NetlistSimulator<'a> {
    netlist: &'a Netlist,
    config: SimulatorConfig,
    gates: IndexSet<GateId>,
    input_nets: Vec<NetId>,
    output_nets: Vec<NetId>,
    clocks: Vec<Clock>,
    seeds: Vec<(GateId, Seed)>,

    sim_gates: Vec<SimGate>,
    dependencies: Immutable<DependencyIndex>,
    initialized: bool,

    queue: EventQueue,
    new_events: IndexMap<(NetId, u64), LogicValue>,
    clock_pending: IndexSet<usize>,
    state: Simulation,
    current_time: u64,
    reporter: Reporter,
}

impl<'a> NetlistSimulator<'a> {
    /// Returns a simulator over `netlist` with the default [SimulatorConfig].
    pub fn new(netlist: &'a Netlist) -> Self {
        Self::with_config(netlist, Default::default())
    }

    pub fn with_config(netlist: &'a Netlist, config: SimulatorConfig) -> Self {
        Self {
            netlist,
            config,
            gates: Default::default(),
            input_nets: Default::default(),
            output_nets: Default::default(),
            clocks: Default::default(),
            seeds: Default::default(),
            sim_gates: Default::default(),
            dependencies: Default::default(),
            initialized: false,
            queue: Default::default(),
            new_events: Default::default(),
            clock_pending: Default::default(),
            state: Default::default(),
            current_time: 0,
            reporter: Default::default(),
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Adds `gates` to the simulated set, has to happen before initialization.
    pub fn add_gates<I: IntoIterator<Item = GateId>>(&mut self, gates: I) -> Result<()> {
        if self.initialized {
            return Err(SimulationError::GatesAfterInitialization);
        }
        self.gates.extend(gates);
        self.input_nets = dependency::input_nets(self.netlist, &self.gates);
        self.output_nets = dependency::output_nets(self.netlist, &self.gates);
        Ok(())
    }

    /// Returns the simulated gates in insertion order.
    pub fn gates(&self) -> impl Iterator<Item = GateId> + '_ {
        self.gates.iter().copied()
    }

    /// Returns the nets driven from outside of the simulated gates.
    pub fn input_nets(&self) -> &[NetId] {
        &self.input_nets
    }

    /// Returns the nets observed outside of the simulated gates.
    pub fn output_nets(&self) -> &[NetId] {
        &self.output_nets
    }

    /// Drives `net` with a clock of `hz` Hertz.
    pub fn add_clock_frequency(&mut self, net: NetId, hz: f64, start_at_zero: bool) -> Result<()> {
        self.clocks.push(Clock::from_frequency(net, hz, start_at_zero)?);
        Ok(())
    }

    /// Drives `net` with a clock of `period` picoseconds.
    pub fn add_clock_period(&mut self, net: NetId, period: u64, start_at_zero: bool) -> Result<()> {
        self.clocks.push(Clock::from_period(net, period, start_at_zero)?);
        Ok(())
    }

    pub fn clocks(&self) -> &[Clock] {
        &self.clocks
    }

    /// Drives `net` to `value` at the current time, does nothing if `net` already has that value.
    pub fn set_input(&mut self, net: NetId, value: LogicValue) {
        if self.state.last_value(net) == Some(value) {
            return;
        }
        self.queue.push(net, self.current_time, value);
    }

    fn is_sequential(gate: &Gate) -> bool {
        let ty = gate.ty();
        ty.has_property(GateTypeProperty::Ff)
            || ty.has_property(GateTypeProperty::Latch)
            || ty.has_property(GateTypeProperty::Ram)
    }

    fn request_seed<F: Fn(&Gate) -> bool>(&mut self, seed: Seed, filter: F) -> Result<()> {
        if self.initialized {
            return Err(SimulationError::SeedAfterInitialization);
        }
        let netlist = self.netlist;
        self.seeds.extend(
            self.gates
                .iter()
                .filter(|g| {
                    let gate = netlist.gate(**g);
                    Self::is_sequential(gate) && filter(gate)
                })
                .map(|g| (*g, seed)),
        );
        Ok(())
    }

    /// Seeds the flip-flops, latches and RAMs accepted by `filter` with `value` during initialization.
    ///
    /// Flip-flops and latches drive `value` on their state outputs and its complement on their
    /// negated state outputs, RAMs are filled with `value`.
    pub fn initialize_sequential_gates<F: Fn(&Gate) -> bool>(&mut self, value: LogicValue, filter: F) -> Result<()> {
        self.request_seed(Seed::Value(value), filter)
    }

    /// Seeds the flip-flops, latches and RAMs accepted by `filter` from the init data stored in the
    /// netlist during initialization.
    pub fn initialize_sequential_gates_from_netlist<F: Fn(&Gate) -> bool>(&mut self, filter: F) -> Result<()> {
        self.request_seed(Seed::FromNetlist, filter)
    }

    /// Builds the evaluators and the dependency index.
    ///
    /// Called by [simulate](NetlistSimulator::simulate) if needed. Fails if called twice, after
    /// the simulation started, or if a gate has no simulation model, in which case nothing is kept.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Err(SimulationError::AlreadyInitialized);
        }
        if self.current_time != 0 || !self.state.is_empty() {
            return Err(SimulationError::AlreadyStarted);
        }

        let netlist = self.netlist;
        let mut sim_gates = Vec::with_capacity(self.gates.len());
        for &id in &self.gates {
            match SimGate::build(id, netlist.gate(id), &mut self.reporter) {
                Ok(sim_gate) => sim_gates.push(sim_gate),
                Err(e) => {
                    error!(target: LOG_TARGET, "{}", e);
                    self.sim_gates.clear();
                    self.dependencies = Default::default();
                    return Err(e);
                }
            }
        }
        let dependencies = DependencyIndex::build(netlist, &sim_gates, &self.input_nets);

        for &id in &self.gates {
            let gate = netlist.gate(id);
            let value = if gate.is_gnd_gate() {
                LogicValue::Zero
            } else if gate.is_vcc_gate() {
                LogicValue::One
            } else {
                continue;
            };
            for (_, net) in gate.fan_out() {
                self.queue.push(net, self.current_time, value);
            }
        }

        let positions: HashMap<GateId, usize> = sim_gates.iter().enumerate().map(|(i, g)| (g.gate, i)).collect();
        for (id, seed) in self.seeds.clone() {
            let sim_gate = match positions.get(&id) {
                Some(&idx) => &mut sim_gates[idx],
                None => continue,
            };
            let events = match seed {
                Seed::Value(value) => sim_gate.seed(value, &mut self.reporter),
                Seed::FromNetlist => match init_data(netlist.gate(id), &mut self.reporter) {
                    Some(data) => sim_gate.seed_from_data(&data, &mut self.reporter),
                    None => continue,
                },
            };
            for (net, value) in events {
                self.queue.push(net, self.current_time, value);
            }
        }

        debug!(
            target: LOG_TARGET,
            "initialized {} gates, {} nets with successors, {} input nets, {} clocks",
            sim_gates.len(),
            dependencies.net_count(),
            self.input_nets.len(),
            self.clocks.len()
        );
        self.sim_gates = sim_gates;
        self.dependencies = Immutable::new(dependencies);
        self.initialized = true;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Advances the simulation by `duration` picoseconds.
    ///
    /// Initializes the simulator if needed and expands the clocks over the simulated window.
    /// Events scheduled past the window are kept for the next call.
    ///
    /// Fails with [SimulationError::IterationTimeout] if an instant does not settle within
    /// the [iteration timeout](NetlistSimulator::iteration_timeout), the current time then stays
    /// at that instant.
    pub fn simulate(&mut self, duration: u64) -> Result<()> {
        if !self.initialized {
            self.initialize()?;
        }
        for clock in &self.clocks {
            for (time, value) in clock.transitions(self.current_time, duration) {
                self.queue.push(clock.net, time, value);
            }
        }
        self.process_events(self.current_time.saturating_add(duration))
    }

    /// Runs the scheduler until every event up to `horizon` is processed.
    fn process_events(&mut self, horizon: u64) -> Result<()> {
        let timeout = self.config.iteration_timeout;
        let mut time = self.current_time;
        let mut iterations = 0;

        loop {
            let next = self.queue.next_time();
            if next != Some(time) {
                // Every event of this instant settled, commit the clocked updates.
                if !self.clock_pending.is_empty() {
                    self.flush_clocked(time);
                    continue;
                }
                match next {
                    Some(t) if t <= horizon => {
                        trace!(target: LOG_TARGET, "{} events processed at {} ps", iterations, time);
                        time = t;
                        self.current_time = t;
                        iterations = 0;
                    }
                    _ => break,
                }
            }

            while self.queue.next_time() == Some(time) {
                if timeout > 0 && iterations >= timeout {
                    self.commit_new_events();
                    let e = SimulationError::IterationTimeout { time, iterations: timeout };
                    error!(target: LOG_TARGET, "{}", e);
                    return Err(e);
                }
                let event = match self.queue.pop_at(time) {
                    Some(event) => event,
                    None => break,
                };
                iterations += 1;
                if !self.state.accept(event) {
                    continue;
                }

                let mut ctx = EvalContext {
                    new_events: &mut self.new_events,
                    history: &self.state,
                    reporter: &mut self.reporter,
                    delay: self.config.gate_delay,
                };
                for (idx, pins) in self.dependencies.successors(event.net) {
                    let sim_gate = &mut self.sim_gates[*idx];
                    for pin in pins {
                        sim_gate.set_input(pin, event.value);
                    }
                    if sim_gate.evaluate(event.net, time, &mut ctx) == Handled::ClockPending {
                        self.clock_pending.insert(*idx);
                    }
                }
            }
            self.commit_new_events();
        }

        self.current_time = horizon;
        Ok(())
    }

    /// Clocks every pending gate at `time`.
    fn flush_clocked(&mut self, time: u64) {
        let mut ctx = EvalContext {
            new_events: &mut self.new_events,
            history: &self.state,
            reporter: &mut self.reporter,
            delay: self.config.gate_delay,
        };
        for idx in std::mem::take(&mut self.clock_pending) {
            self.sim_gates[idx].clock(time, &mut ctx);
        }
        self.commit_new_events();
    }

    fn commit_new_events(&mut self) {
        for ((net, time), value) in self.new_events.drain(..) {
            self.queue.push(net, time, value);
        }
    }

    /// Drops the recorded state and every pending event and returns to the uninitialized state.
    ///
    /// Gates, clocks and seed requests are kept.
    pub fn reset(&mut self) {
        self.state.clear();
        self.queue.clear();
        self.new_events.clear();
        self.clock_pending.clear();
        self.sim_gates.clear();
        self.dependencies = Default::default();
        self.current_time = 0;
        self.initialized = false;
        debug!(target: LOG_TARGET, "simulator reset");
    }

    /// Returns the recorded history of every net.
    pub fn simulation_state(&self) -> &Simulation {
        &self.state
    }

    /// Replaces the recorded history, e.g. to restore a checkpoint.
    ///
    /// The inputs and clock levels seen by the gates are reloaded from `state`,
    /// clocked updates not yet committed are dropped.
    pub fn set_simulation_state(&mut self, state: Simulation) {
        self.state = state;
        self.clock_pending.clear();
        let netlist = self.netlist;
        for sim_gate in &mut self.sim_gates {
            let gate = netlist.gate(sim_gate.gate);
            sim_gate.resync(gate, &self.state);
        }
    }

    /// Returns the time in picoseconds up to which the simulation ran.
    pub fn current_time(&self) -> u64 {
        self.current_time
    }

    /// Returns the last accepted value of `net`, [X](LogicValue::X) if it never changed.
    pub fn net_value(&self, net: NetId) -> LogicValue {
        self.state.last_value(net).unwrap_or(LogicValue::X)
    }

    /// Returns the number of events scheduled but not processed yet.
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Sets the maximum number of events processed at a single instant, 0 disables the limit.
    pub fn set_iteration_timeout(&mut self, iterations: u64) {
        self.config.iteration_timeout = iterations;
    }

    pub fn iteration_timeout(&self) -> u64 {
        self.config.iteration_timeout
    }

    /// Returns the reported recoverable errors since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.reporter.take()
    }

    /// Checks the export window and returns the nets to export.
    fn vcd_nets(&self, start: u64, end: u64, nets: Option<&[NetId]>) -> Result<Vec<NetId>> {
        if self.gates.is_empty() {
            return Err(SimulationError::NoGates);
        }
        if self.state.is_empty() {
            return Err(SimulationError::NothingSimulated);
        }
        if end > self.current_time {
            return Err(SimulationError::EndBeyondSimulation {
                end,
                simulated: self.current_time,
            });
        }
        if start > end {
            return Err(SimulationError::InvalidWindow { start, end });
        }
        Ok(match nets {
            Some(nets) => nets.to_vec(),
            None => {
                let mut nets: Vec<NetId> = self.state.nets().collect();
                nets.sort();
                nets
            }
        })
    }

    /// Writes the recorded waveform of `nets` between `start` and `end` picoseconds as a value
    /// change dump to `writer`, all recorded nets if `nets` is None.
    pub fn write_vcd<W: Write>(&self, writer: W, start: u64, end: u64, nets: Option<&[NetId]>) -> Result<()> {
        let nets = self.vcd_nets(start, end, nets)?;
        write_vcd(writer, self.netlist, &self.state, &nets, start, end)?;
        Ok(())
    }

    /// Same as [write_vcd](NetlistSimulator::write_vcd) into the file at `path`,
    /// the file is not touched if the export fails.
    pub fn generate_vcd<P: AsRef<Path>>(&self, path: P, start: u64, end: u64, nets: Option<&[NetId]>) -> Result<()> {
        let mut buffer = Vec::new();
        self.write_vcd(&mut buffer, start, end, nets)?;
        std::fs::write(path, buffer)?;
        debug!(target: LOG_TARGET, "waveform from {} ps to {} ps written", start, end);
        Ok(())
    }

    /// Dumps the dependency index in dot format to `path`, empty before initialization.
    pub fn dump_dependency_dot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.dependencies.dump_dot(self.netlist, &self.sim_gates, path)?;
        Ok(())
    }
}

/// Asserts that the last accepted value of a net in a [NetlistSimulator] equals `expected`.
#[macro_export]
macro_rules! assert_net_value {
    ($sim:expr, $net:expr, $expected:expr) => {
        let net = $net;
        let actual = $sim.net_value(net);
        assert!(
            actual == $expected,
            "Net {} is {} at {} ps, expected: {}",
            net,
            actual,
            $sim.current_time(),
            $expected
        );
    };
}
