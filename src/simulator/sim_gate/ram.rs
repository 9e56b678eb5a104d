use super::{EvalContext, Handled};
use crate::logic::{values_to_int, BooleanFunction, LogicValue};
use crate::netlist::{Gate, NetId, RamComponent, RamPortComponent};
use crate::simulator::error::{Diagnostic, Reporter};
use bitvec::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Port {
    clock: BooleanFunction,
    enable: BooleanFunction,
    is_write: bool,
    clock_net: Option<NetId>,
    clock_level: LogicValue,
    address_pins: Vec<String>,
    data_pins: Vec<String>,
    /// Nets driven by the data pins of a read port.
    data_nets: Vec<Option<NetId>>,
}

/// Memory with clocked read and write ports.
///
/// Bit `i` of the word at address `a` of a port with data width `w` lives at bit `a * w + i`
/// of the memory. Every bit carries a known flag, unknown bits read as [X](LogicValue::X).
#[derive(Debug, Clone)]
pub(crate) struct Ram {
    ports: Vec<Port>,
    /// Per data pin write masks.
    masks: HashMap<String, BooleanFunction>,
    bits: BitVec<Lsb0, u64>,
    known: BitVec<Lsb0, u64>,
    clocked_reads: Vec<usize>,
    clocked_writes: Vec<usize>,
}

impl Ram {
    /// Builds the evaluator of `gate`, a RAM of unsupported geometry is reported and has no ports.
    pub(crate) fn new(gate: &Gate, ram: &RamComponent, reporter: &mut Reporter) -> Self {
        let ty = gate.ty();
        let mut ports = Vec::with_capacity(ram.ports.len());
        let mut problem = Self::check_size(ram.bit_size).err();

        for component in &ram.ports {
            let port = Self::build_port(gate, component);
            if let Err(reason) = Self::check_port(&port) {
                problem.get_or_insert(reason);
            }
            ports.push(port);
        }

        let rows = match problem {
            Some(reason) => {
                reporter.report(Diagnostic::InvalidRamGeometry {
                    gate: gate.name().to_string(),
                    reason,
                });
                ports.clear();
                0
            }
            None => (ram.bit_size / 64) as usize,
        };

        let masks = ports
            .iter()
            .filter(|p| p.is_write)
            .flat_map(|p| p.data_pins.iter())
            .filter_map(|pin| ty.function(pin).map(|f| (pin.clone(), f.clone())))
            .collect();

        Self {
            ports,
            masks,
            bits: BitVec::from_vec(vec![0; rows]),
            known: BitVec::from_vec(vec![0; rows]),
            clocked_reads: vec![],
            clocked_writes: vec![],
        }
    }

    fn check_size(bit_size: u32) -> Result<(), String> {
        let (rows, rem) = num_integer::div_rem(bit_size, 64);
        if rows == 0 || rem != 0 {
            return Err(format!("memory of {} bits is not a multiple of 64", bit_size));
        }
        Ok(())
    }

    fn check_port(port: &Port) -> Result<(), String> {
        let width = port.data_pins.len();
        if width == 0 || width > 32 || 64 % width != 0 {
            return Err(format!("data word of {} bits", width));
        }
        if port.address_pins.len() > 32 {
            return Err(format!("address of {} bits", port.address_pins.len()));
        }
        Ok(())
    }

    fn build_port(gate: &Gate, component: &RamPortComponent) -> Port {
        let ty = gate.ty();
        let group = |name: &str| ty.pins_of_group(name).map(<[String]>::to_vec).unwrap_or_default();
        let data_pins = group(&component.data_group);
        let data_nets = data_pins.iter().map(|pin| gate.fan_out_net(pin)).collect();
        let clock_net = ty
            .clock_pins(&component.clock)
            .iter()
            .find_map(|pin| gate.fan_in_net(pin));
        Port {
            clock: component.clock.clone(),
            enable: component.enable.clone(),
            is_write: component.is_write,
            clock_net,
            clock_level: LogicValue::X,
            address_pins: group(&component.address_group),
            data_pins,
            data_nets,
        }
    }

    pub(crate) fn evaluate(&mut self, net: NetId, values: &HashMap<String, LogicValue>) -> Handled {
        for (i, port) in self.ports.iter_mut().enumerate() {
            if port.clock_net != Some(net) {
                continue;
            }
            let level = port.clock.evaluate(values);
            let rising = level == LogicValue::One && port.clock_level != LogicValue::One;
            port.clock_level = level;
            if !rising || port.enable.evaluate(values) != LogicValue::One {
                continue;
            }
            let clocked = if port.is_write {
                &mut self.clocked_writes
            } else {
                &mut self.clocked_reads
            };
            if !clocked.contains(&i) {
                clocked.push(i);
            }
        }

        if self.clocked_reads.is_empty() && self.clocked_writes.is_empty() {
            Handled::Done
        } else {
            Handled::ClockPending
        }
    }

    /// Recomputes the clock levels of the ports and drops the ports queued for clocking.
    pub(crate) fn resync(&mut self, values: &HashMap<String, LogicValue>) {
        for port in &mut self.ports {
            port.clock_level = port.clock.evaluate(values);
        }
        self.clocked_reads.clear();
        self.clocked_writes.clear();
    }

    /// Serves the clocked ports, reads observe the memory before any of this instant's writes.
    pub(crate) fn clock(&mut self, gate: &str, values: &HashMap<String, LogicValue>, time: u64, ctx: &mut EvalContext) {
        for i in std::mem::take(&mut self.clocked_reads) {
            let port = &self.ports[i];
            let width = port.data_pins.len();
            let word: Vec<LogicValue> = match self.decode(gate, port, values, ctx.reporter) {
                Some(start) => (start..start + width).map(|bit| self.bit(bit)).collect(),
                None => vec![LogicValue::X; width],
            };
            for (net, value) in port.data_nets.iter().zip(word) {
                if let Some(net) = net {
                    ctx.emit(*net, time, value);
                }
            }
        }

        for i in std::mem::take(&mut self.clocked_writes) {
            let port = &self.ports[i];
            let start = match self.decode(gate, port, values, ctx.reporter) {
                Some(start) => start,
                None => continue,
            };
            let written: Vec<(usize, LogicValue)> = port
                .data_pins
                .iter()
                .enumerate()
                .filter(|(_, pin)| {
                    self.masks
                        .get(*pin)
                        .map_or(true, |mask| mask.evaluate(values) == LogicValue::One)
                })
                .map(|(bit, pin)| (start + bit, values.get(pin).copied().unwrap_or(LogicValue::X)))
                .collect();
            for (bit, value) in written {
                self.set_bit(bit, value);
            }
        }
    }

    /// Returns the first memory bit addressed by `port`.
    fn decode(
        &self,
        gate: &str,
        port: &Port,
        values: &HashMap<String, LogicValue>,
        reporter: &mut Reporter,
    ) -> Option<usize> {
        let address: Vec<LogicValue> = port
            .address_pins
            .iter()
            .map(|pin| values.get(pin).copied().unwrap_or(LogicValue::X))
            .collect();
        let width = port.data_pins.len();
        let start = values_to_int(&address)
            .map(|a| a as usize * width)
            .filter(|start| start + width <= self.bits.len());
        if start.is_none() {
            reporter.report(Diagnostic::UndecodableAddress {
                gate: gate.to_string(),
                address: address.iter().rev().map(LogicValue::to_string).collect(),
            });
        }
        start
    }

    fn bit(&self, index: usize) -> LogicValue {
        if self.known[index] {
            LogicValue::from_bool(self.bits[index])
        } else {
            LogicValue::X
        }
    }

    fn set_bit(&mut self, index: usize, value: LogicValue) {
        match value.as_bool() {
            Some(b) => {
                self.bits.set(index, b);
                self.known.set(index, true);
            }
            None => self.known.set(index, false),
        }
    }

    /// Returns the value of the word of `width` bits at `address`, None if any bit is unknown.
    #[cfg(test)]
    fn word(&self, address: usize, width: usize) -> Option<u32> {
        let start = address * width;
        if width > 32 || start + width > self.bits.len() {
            return None;
        }
        let bits: Vec<LogicValue> = (start..start + width).map(|bit| self.bit(bit)).collect();
        values_to_int(&bits)
    }

    /// Zeroes the outputs of every read port.
    fn reset_outputs(&self) -> Vec<(NetId, LogicValue)> {
        self.ports
            .iter()
            .filter(|p| !p.is_write)
            .flat_map(|p| p.data_nets.iter().flatten())
            .map(|net| (*net, LogicValue::Zero))
            .collect()
    }

    /// Fills the memory with `value`, which has to be 0 or 1.
    pub(crate) fn fill(&mut self, gate: &str, value: LogicValue, reporter: &mut Reporter) -> Vec<(NetId, LogicValue)> {
        let b = match value.as_bool() {
            Some(b) => b,
            None => {
                reporter.report(Diagnostic::InvalidInitData {
                    gate: gate.to_string(),
                    data: value.to_string(),
                });
                return vec![];
            }
        };
        self.bits.set_all(b);
        self.known.set_all(true);
        self.reset_outputs()
    }

    /// Loads the memory from a hexadecimal payload of 16 digits per 64 bit row, the last row first.
    pub(crate) fn load(&mut self, gate: &str, data: &str, reporter: &mut Reporter) -> Vec<(NetId, LogicValue)> {
        let invalid = || Diagnostic::InvalidInitData {
            gate: gate.to_string(),
            data: data.to_string(),
        };
        if !data.is_ascii() || data.len() % 16 != 0 {
            reporter.report(invalid());
            return vec![];
        }
        let rows: Option<Vec<u64>> = data
            .as_bytes()
            .rchunks(16)
            .map(|chunk| {
                std::str::from_utf8(chunk)
                    .ok()
                    .and_then(|digits| u64::from_str_radix(digits, 16).ok())
            })
            .collect();
        let rows = match rows {
            Some(rows) => rows,
            None => {
                reporter.report(invalid());
                return vec![];
            }
        };
        if rows.len() * 64 != self.bits.len() {
            reporter.report(Diagnostic::MemorySizeMismatch {
                gate: gate.to_string(),
                expected: self.bits.len(),
                actual: rows.len() * 64,
            });
            return vec![];
        }
        self.bits = BitVec::from_vec(rows);
        self.known.set_all(true);
        self.reset_outputs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::{library, Netlist};

    fn build(bit_size: u32, data_width: usize) -> (Ram, Reporter) {
        let mut nl = Netlist::new();
        let g = nl.create_gate(&library::ram(4, data_width, bit_size), "ram");
        let mut reporter = Reporter::default();
        let ram = Ram::new(nl.gate(g), nl.gate(g).ty().ram().unwrap(), &mut reporter);
        (ram, reporter)
    }

    #[test]
    fn test_load_hex_last_row_first() {
        let (mut ram, mut reporter) = build(128, 8);
        ram.load("ram", "00000000000000AB00000000000000CD", &mut reporter);
        assert!(reporter.take().is_empty());
        assert_eq!(ram.word(0, 8), Some(0xCD));
        assert_eq!(ram.word(8, 8), Some(0xAB));
        assert_eq!(ram.word(1, 8), Some(0));
    }

    #[test]
    fn test_size_mismatch_keeps_unknown() {
        let (mut ram, mut reporter) = build(128, 8);
        ram.load("ram", "00000000000000AB", &mut reporter);
        assert!(matches!(
            reporter.take().as_slice(),
            [Diagnostic::MemorySizeMismatch { expected: 128, actual: 64, .. }]
        ));
        assert_eq!(ram.word(0, 8), None);
    }

    #[test]
    fn test_fill() {
        let (mut ram, mut reporter) = build(64, 4);
        assert_eq!(ram.word(3, 4), None);
        ram.fill("ram", LogicValue::One, &mut reporter);
        assert_eq!(ram.word(3, 4), Some(0xF));
        ram.set_bit(12, LogicValue::X);
        assert_eq!(ram.word(3, 4), None);
    }

    #[test]
    fn test_invalid_geometry_is_inert() {
        let (ram, mut reporter) = build(100, 8);
        assert!(ram.ports.is_empty());
        assert!(matches!(
            reporter.take().as_slice(),
            [Diagnostic::InvalidRamGeometry { .. }]
        ));

        let (ram, mut reporter) = build(128, 3);
        assert!(ram.ports.is_empty());
        assert_eq!(reporter.take().len(), 1);
    }
}
