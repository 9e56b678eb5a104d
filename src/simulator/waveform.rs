use super::Simulation;
use crate::logic::LogicValue;
use crate::netlist::{NetId, Netlist};
use chrono::Local;
use std::collections::BTreeMap;
use std::io::{self, Write};
use vcd::{IdCode, TimescaleUnit, VarType, Writer};

impl From<LogicValue> for vcd::Value {
    fn from(v: LogicValue) -> Self {
        match v {
            LogicValue::Zero => vcd::Value::V0,
            LogicValue::One => vcd::Value::V1,
            LogicValue::X => vcd::Value::X,
            LogicValue::Z => vcd::Value::Z,
        }
    }
}

/// Variable id code of `net`.
fn id_code(net: NetId) -> io::Result<IdCode> {
    format!("n{}", net.id()).parse().map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("net {} has no valid id code: {:?}", net, e),
        )
    })
}

/// Writes the recorded values of `nets` between `start` and `end` as a value change dump with a
/// picosecond timescale.
///
/// The dump opens at `start` with the value every net had at that time, followed by every change
/// in `(start, end]`, and is closed by a timestamp at `end`.
pub(crate) fn write_vcd<W: Write>(
    w: W,
    netlist: &Netlist,
    state: &Simulation,
    nets: &[NetId],
    start: u64,
    end: u64,
) -> io::Result<()> {
    let mut writer = Writer::new(w);
    writer.date(&Local::now().format("%a %b %e %T %Y").to_string())?;
    writer.version(concat!("netsim ", env!("CARGO_PKG_VERSION")))?;
    writer.timescale(1, TimescaleUnit::PS)?;
    writer.add_module("TOP")?;

    let mut ids = Vec::with_capacity(nets.len());
    for net in nets {
        let id = id_code(*net)?;
        let name: String = netlist
            .net(*net)
            .name()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        writer.var_def(VarType::Wire, 1, id, &name, None)?;
        ids.push(id);
    }
    writer.upscope()?;
    writer.enddefinitions()?;

    writer.timestamp(start)?;
    let mut changes: BTreeMap<u64, Vec<(IdCode, LogicValue)>> = BTreeMap::new();
    for (net, id) in nets.iter().zip(&ids) {
        writer.change_scalar(*id, state.value_at(*net, start))?;
        for event in state.net_events(*net) {
            if event.time > start && event.time <= end {
                changes.entry(event.time).or_default().push((*id, event.value));
            }
        }
    }

    let mut last = start;
    for (time, values) in changes {
        writer.timestamp(time)?;
        for (id, value) in values {
            writer.change_scalar(id, value)?;
        }
        last = time;
    }
    if last != end {
        writer.timestamp(end)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window() {
        let mut nl = Netlist::new();
        let a = nl.create_net("a");
        let b = nl.create_net("my net");
        let mut state = Simulation::new();
        state.add_event(a, 0, LogicValue::Zero);
        state.add_event(a, 10, LogicValue::One);
        state.add_event(a, 20, LogicValue::Zero);
        state.add_event(a, 40, LogicValue::One);
        state.add_event(b, 5, LogicValue::Z);

        let mut out = vec![];
        write_vcd(&mut out, &nl, &state, &[a, b], 15, 30).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("$timescale 1 ps $end"));
        assert!(out.contains("my_net"));
        let body = &out[out.find("$enddefinitions").unwrap()..];
        let times: Vec<&str> = body.lines().filter(|l| l.starts_with('#')).collect();
        assert_eq!(times, vec!["#15", "#20", "#30"]);
        // Values at the window start.
        let dump: Vec<&str> = body.lines().skip_while(|l| *l != "#15").skip(1).take(2).collect();
        assert_eq!(dump[0].chars().next(), Some('1'));
        assert_eq!(dump[1].chars().next(), Some('z'));
    }
}
