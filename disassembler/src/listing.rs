use sim86::cpu::{Flags, Instruction, REGISTERS_16};
use sim86::machine::Machine;

#[cfg(test)]
#[path = "./listing_test.rs"]
mod listing_test;

/// registers, ip and flags of a session at one point in time
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub regs: [u16; 12],
    pub ip: u16,
    pub flags: Flags,
}

impl Snapshot {
    pub fn of(machine: &Machine) -> Self {
        Snapshot {
            regs: machine.cpu.regs.snapshot(&machine.mmu),
            ip: machine.cpu.regs.ip,
            flags: machine.cpu.regs.flags,
        }
    }
}

/// lists what changed between two snapshots, like "ax:0x0->0x1 ip:0x0->0x3 flags:->Z"
pub fn describe_changes(before: &Snapshot, after: &Snapshot) -> String {
    let mut parts = Vec::new();
    for (i, r) in REGISTERS_16.iter().enumerate() {
        if before.regs[i] != after.regs[i] {
            parts.push(format!("{}:{:#x}->{:#x}", r, before.regs[i], after.regs[i]));
        }
    }
    if before.ip != after.ip {
        parts.push(format!("ip:{:#x}->{:#x}", before.ip, after.ip));
    }
    if before.flags != after.flags {
        parts.push(format!("flags:{}->{}", before.flags, after.flags));
    }
    parts.join(" ")
}

/// one line of the execution trace. `clocks` holds the clocks spent and the running total
pub fn execution_line(op: &Instruction, changes: &str, clocks: Option<(usize, usize)>) -> String {
    let line = match clocks {
        Some((spent, total)) => format!("{} ; Clocks: +{} = {} | {}", op, spent, total, changes),
        None => format!("{} ; {}", op, changes),
    };
    line.trim_end().to_string()
}

pub fn final_registers(s: &Snapshot) -> String {
    let mut lines = vec!["Final registers:".to_string()];
    for (i, r) in REGISTERS_16.iter().enumerate() {
        let v = s.regs[i];
        if v != 0 {
            lines.push(format!("{:>8}: {:#06x} ({})", r.as_str(), v, v));
        }
    }
    if s.ip != 0 {
        lines.push(format!("{:>8}: {:#06x} ({})", "ip", s.ip, s.ip));
    }
    let flags = s.flags.to_string();
    if !flags.is_empty() {
        lines.push(format!("{:>8}: {}", "flags", flags));
    }
    lines.join("\n")
}
