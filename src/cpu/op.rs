use std::fmt;

use crate::cpu::flag::{Flag, FlagEffect};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Op {
    Add,
    Sub,
    Cmp,
    Mov,
    Xchg,
    Push,
    Pop,
    Inc,
    Dec,

    /// Jump if overflow (OF=1)
    Jo,
    Jno,

    /// Jump if below (CF=1)
    Jb,
    Jnb,

    /// Jump if equal (ZF=1)
    Je,
    Jnz,

    /// Jump if below or equal (CF=1 or ZF=1)
    Jbe,
    Ja,

    /// Jump if sign (SF=1)
    Js,
    Jns,

    /// Jump if parity (PF=1)
    Jp,
    Jnp,

    /// Jump if less (SF != OF)
    Jl,
    Jnl,

    /// Jump if less or equal (ZF=1 or SF != OF)
    Jle,
    Jg,

    /// Decrement CX, jump if CX != 0
    Loop,
    Loopz,
    Loopnz,

    /// Jump if CX = 0
    Jcxz,

    /// Breakpoint, used as the halt sentinel
    Int3,
}

const STATUS_FLAGS: [(Flag, FlagEffect); 6] = [
    (Flag::Carry, FlagEffect::Result),
    (Flag::Zero, FlagEffect::Result),
    (Flag::Sign, FlagEffect::Result),
    (Flag::Overflow, FlagEffect::Result),
    (Flag::Parity, FlagEffect::Result),
    (Flag::Adjust, FlagEffect::Result),
];

/// inc and dec leave carry alone
const STATUS_FLAGS_NO_CARRY: [(Flag, FlagEffect); 5] = [
    (Flag::Zero, FlagEffect::Result),
    (Flag::Sign, FlagEffect::Result),
    (Flag::Overflow, FlagEffect::Result),
    (Flag::Parity, FlagEffect::Result),
    (Flag::Adjust, FlagEffect::Result),
];

impl Op {
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Add => "add",
            Op::Sub => "sub",
            Op::Cmp => "cmp",
            Op::Mov => "mov",
            Op::Xchg => "xchg",
            Op::Push => "push",
            Op::Pop => "pop",
            Op::Inc => "inc",
            Op::Dec => "dec",
            Op::Jo => "jo",
            Op::Jno => "jno",
            Op::Jb => "jb",
            Op::Jnb => "jnb",
            Op::Je => "je",
            Op::Jnz => "jnz",
            Op::Jbe => "jbe",
            Op::Ja => "ja",
            Op::Js => "js",
            Op::Jns => "jns",
            Op::Jp => "jp",
            Op::Jnp => "jnp",
            Op::Jl => "jl",
            Op::Jnl => "jnl",
            Op::Jle => "jle",
            Op::Jg => "jg",
            Op::Loop => "loop",
            Op::Loopz => "loopz",
            Op::Loopnz => "loopnz",
            Op::Jcxz => "jcxz",
            Op::Int3 => "int3",
        }
    }

    /// conditional short jump indexed by the low nibble of opcodes 0x70-0x7F
    pub fn jcc(cc: u8) -> Op {
        match cc & 0xF {
            0x0 => Op::Jo,
            0x1 => Op::Jno,
            0x2 => Op::Jb,
            0x3 => Op::Jnb,
            0x4 => Op::Je,
            0x5 => Op::Jnz,
            0x6 => Op::Jbe,
            0x7 => Op::Ja,
            0x8 => Op::Js,
            0x9 => Op::Jns,
            0xA => Op::Jp,
            0xB => Op::Jnp,
            0xC => Op::Jl,
            0xD => Op::Jnl,
            0xE => Op::Jle,
            _ => Op::Jg,
        }
    }

    /// short relative jumps, including the loop family
    pub fn is_jump(self) -> bool {
        match self {
            Op::Jo | Op::Jno | Op::Jb | Op::Jnb | Op::Je | Op::Jnz | Op::Jbe | Op::Ja |
            Op::Js | Op::Jns | Op::Jp | Op::Jnp | Op::Jl | Op::Jnl | Op::Jle | Op::Jg |
            Op::Loop | Op::Loopz | Op::Loopnz | Op::Jcxz => true,
            _ => false,
        }
    }

    /// which flags this op touches, and how
    pub fn flag_effects(self) -> &'static [(Flag, FlagEffect)] {
        match self {
            Op::Add | Op::Sub | Op::Cmp => &STATUS_FLAGS,
            Op::Inc | Op::Dec => &STATUS_FLAGS_NO_CARRY,
            _ => &[],
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
