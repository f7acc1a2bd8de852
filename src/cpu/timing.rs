//! Clock estimates from the 8086 instruction timing tables.

use crate::cpu::instruction::Instruction;
use crate::cpu::op::Op;
use crate::cpu::parameter::Parameter;
use crate::cpu::register::{R, AMode};

#[cfg(test)]
#[path = "./timing_test.rs"]
mod timing_test;

/// penalty per word transfer to or from an odd address
const ODD_TRANSFER_PENALTY: u32 = 4;

/// effective address calculation time
pub fn ea_clocks(p: &Parameter) -> u32 {
    match *p {
        Parameter::Ptr(amode, disp) => {
            let base = match amode {
                Some(AMode::BPDI) | Some(AMode::BXSI) => 7,
                Some(AMode::BPSI) | Some(AMode::BXDI) => 8,
                Some(_) => 5,
                None => 2,
            };
            if disp != 0 || amode.is_none() {
                base + 4
            } else {
                base
            }
        }
        _ => 0,
    }
}

/// Estimates the clocks of `op` when not branching. `ea` is the effective address of
/// its memory operand when known; word transfers to an odd address are penalized.
/// Returns None for instructions without an estimate.
pub fn estimate_clocks(op: &Instruction, ea: Option<u16>) -> Option<u32> {
    use crate::cpu::parameter::Parameter::{Reg, Ptr, Imm};

    let dst = op.params.dst;
    let src = op.params.src;
    let acc = |p: &Parameter| match *p {
        Reg(r) => r.is_accumulator(),
        _ => false,
    };
    let seg = |p: &Parameter| match *p {
        Reg(r) => r.is_segment(),
        _ => false,
    };

    // (base clocks, memory operand, number of memory transfers)
    let (base, mem, transfers) = match op.command {
        Op::Mov => match (dst, src) {
            (Ptr(None, _), Reg(_)) if acc(&src) => (10, None, 1),
            (Reg(_), Ptr(None, _)) if acc(&dst) => (10, None, 1),
            (Ptr(_, _), Reg(_)) => (9, Some(dst), 1),
            (Reg(_), Ptr(_, _)) => (8, Some(src), 1),
            (Reg(_), Reg(_)) => (2, None, 0),
            (Reg(_), Imm(_)) => (4, None, 0),
            (Ptr(_, _), Imm(_)) => (10, Some(dst), 1),
            _ => return None,
        },
        Op::Add | Op::Sub => match (dst, src) {
            (Reg(_), Reg(_)) => (3, None, 0),
            (Reg(_), Ptr(_, _)) => (9, Some(src), 1),
            (Ptr(_, _), Reg(_)) => (16, Some(dst), 2),
            (Reg(_), Imm(_)) => (4, None, 0),
            (Ptr(_, _), Imm(_)) => (17, Some(dst), 2),
            _ => return None,
        },
        Op::Cmp => match (dst, src) {
            (Reg(_), Reg(_)) => (3, None, 0),
            (Reg(_), Ptr(_, _)) => (9, Some(src), 1),
            (Ptr(_, _), Reg(_)) => (9, Some(dst), 1),
            (Reg(_), Imm(_)) => (4, None, 0),
            (Ptr(_, _), Imm(_)) => (10, Some(dst), 1),
            _ => return None,
        },
        Op::Inc | Op::Dec => match dst {
            Reg(r) if r.is_8bit() => (3, None, 0),
            Reg(_) => (2, None, 0),
            Ptr(_, _) => (15, Some(dst), 2),
            _ => return None,
        },
        Op::Push => match dst {
            Reg(_) if seg(&dst) => (10, None, 0),
            Reg(_) => (11, None, 0),
            Ptr(_, _) => (16, Some(dst), 2),
            _ => return None,
        },
        Op::Pop => match dst {
            Reg(_) => (8, None, 0),
            Ptr(_, _) => (17, Some(dst), 2),
            _ => return None,
        },
        Op::Xchg => match (dst, src) {
            // the one byte 90+r form
            (Reg(R::AX), Reg(_)) if op.length == 1 => (3, None, 0),
            (Reg(_), Reg(_)) => (4, None, 0),
            (Reg(_), Ptr(_, _)) => (17, Some(src), 2),
            _ => return None,
        },
        Op::Loop | Op::Loopnz => (5, None, 0),
        Op::Loopz | Op::Jcxz => (6, None, 0),
        Op::Int3 => return None,
        _ if op.command.is_jump() => (4, None, 0),
        _ => return None,
    };

    let mut clocks = base;
    if let Some(p) = mem {
        clocks += ea_clocks(&p);
    }
    if transfers > 0 && op.is_wide() {
        if let Some(addr) = ea {
            if addr & 1 != 0 {
                clocks += ODD_TRANSFER_PENALTY * transfers;
            }
        }
    }
    Some(clocks)
}

/// extra clocks when a jump or loop branches
pub fn branch_taken_clocks(op: Op) -> u32 {
    match op {
        Op::Loopnz => 14,
        _ if op.is_jump() => 12,
        _ => 0,
    }
}
