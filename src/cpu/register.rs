use std::fmt;

use crate::cpu::flag::Flags;
use crate::memory::MMU;

#[cfg(test)]
#[path = "./register_test.rs"]
mod register_test;

/// Logical register identifiers. 8-bit halves, 16-bit general purpose, then segment registers.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum R {
    AL, CL, DL, BL, AH, CH, DH, BH,
    AX, CX, DX, BX, SP, BP, SI, DI,
    ES, CS, SS, DS,
}

impl R {
    pub fn as_str(self) -> &'static str {
        match self {
            R::AL => "al",
            R::CL => "cl",
            R::DL => "dl",
            R::BL => "bl",
            R::AH => "ah",
            R::CH => "ch",
            R::DH => "dh",
            R::BH => "bh",
            R::AX => "ax",
            R::CX => "cx",
            R::DX => "dx",
            R::BX => "bx",
            R::SP => "sp",
            R::BP => "bp",
            R::SI => "si",
            R::DI => "di",
            R::ES => "es",
            R::CS => "cs",
            R::SS => "ss",
            R::DS => "ds",
        }
    }

    pub fn is_8bit(self) -> bool {
        (self as usize) < 8
    }

    pub fn is_segment(self) -> bool {
        self as usize >= 16
    }

    pub fn is_accumulator(self) -> bool {
        self == R::AX || self == R::AL
    }

    pub fn map(self) -> RegisterMap {
        REGISTER_MAP[self as usize]
    }
}

impl fmt::Display for R {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a logical register lives.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RegisterMap {
    /// bits of a 16-bit general purpose storage slot
    Slot { index: usize, mask: u16, shift: u8 },

    /// a 16-bit word in memory, at the n:th segment window
    Window(usize),
}

const fn slot(index: usize, mask: u16, shift: u8) -> RegisterMap {
    RegisterMap::Slot { index, mask, shift }
}

/// storage slots are ordered AX, BX, CX, DX, SP, BP, SI, DI
const REGISTER_MAP: [RegisterMap; 20] = [
    slot(0, 0x00FF, 0), // al
    slot(2, 0x00FF, 0), // cl
    slot(3, 0x00FF, 0), // dl
    slot(1, 0x00FF, 0), // bl
    slot(0, 0xFF00, 8), // ah
    slot(2, 0xFF00, 8), // ch
    slot(3, 0xFF00, 8), // dh
    slot(1, 0xFF00, 8), // bh
    slot(0, 0xFFFF, 0), // ax
    slot(2, 0xFFFF, 0), // cx
    slot(3, 0xFFFF, 0), // dx
    slot(1, 0xFFFF, 0), // bx
    slot(4, 0xFFFF, 0), // sp
    slot(5, 0xFFFF, 0), // bp
    slot(6, 0xFFFF, 0), // si
    slot(7, 0xFFFF, 0), // di
    RegisterMap::Window(0), // es
    RegisterMap::Window(1), // cs
    RegisterMap::Window(2), // ss
    RegisterMap::Window(3), // ds
];

/// Default flat offsets of the ES, CS, SS and DS windows. They sit in the top
/// of the 1 MiB space, outside what a 16-bit effective address can reach.
pub const SEGMENT_WINDOWS: [u32; 4] = [0xF_FF00, 0xF_FF02, 0xF_FF04, 0xF_FF06];

/// the 16-bit registers in display order
pub const REGISTERS_16: [R; 12] = [
    R::AX, R::BX, R::CX, R::DX, R::SP, R::BP, R::SI, R::DI,
    R::ES, R::CS, R::SS, R::DS,
];

#[derive(Clone, Debug, PartialEq)]
pub struct RegisterState {
    slots: [u16; 8],
    pub ip: u16,
    pub flags: Flags,

    /// flat memory offsets backing es, cs, ss, ds
    segment_windows: [u32; 4],
}

impl Default for RegisterState {
    fn default() -> Self {
        RegisterState::with_windows(SEGMENT_WINDOWS)
    }
}

impl RegisterState {
    pub fn with_windows(segment_windows: [u32; 4]) -> Self {
        RegisterState {
            slots: [0; 8],
            ip: 0,
            flags: Flags::default(),
            segment_windows,
        }
    }

    /// reads a register. 8-bit registers are returned zero-extended
    pub fn get(&self, mmu: &MMU, r: R) -> u16 {
        match r.map() {
            RegisterMap::Slot { index, mask, shift } => (self.slots[index] & mask) >> shift,
            RegisterMap::Window(n) => mmu.read_u16(self.segment_windows[n]),
        }
    }

    /// writes a register. 8-bit registers only keep the low byte of `val`
    /// and leave the other half of their slot untouched
    pub fn set(&mut self, mmu: &mut MMU, r: R, val: u16) {
        match r.map() {
            RegisterMap::Slot { index, mask, shift } => {
                let v = self.slots[index];
                self.slots[index] = (v & !mask) | ((val << shift) & mask);
            }
            RegisterMap::Window(n) => mmu.write_u16(self.segment_windows[n], val),
        }
    }

    /// zeroes registers, flags and ip, including the segment windows
    pub fn reset(&mut self, mmu: &mut MMU) {
        self.slots = [0; 8];
        self.ip = 0;
        self.flags = Flags::default();
        for &w in &self.segment_windows {
            mmu.write_u16(w, 0);
        }
    }

    /// returns the value of every 16-bit register, in display order
    pub fn snapshot(&self, mmu: &MMU) -> [u16; 12] {
        let mut res = [0; 12];
        for (i, &r) in REGISTERS_16.iter().enumerate() {
            res[i] = self.get(mmu, r);
        }
        res
    }
}

/// register from the reg/rm field, selected by the width bit
pub fn get_register(reg: u8, wide: bool) -> R {
    if wide {
        r16(reg)
    } else {
        r8(reg)
    }
}

pub fn r8<T: Into<u8>>(v: T) -> R {
    match v.into() & 7 {
        0 => R::AL,
        1 => R::CL,
        2 => R::DL,
        3 => R::BL,
        4 => R::AH,
        5 => R::CH,
        6 => R::DH,
        _ => R::BH,
    }
}

pub fn r16<T: Into<u8>>(v: T) -> R {
    match v.into() & 7 {
        0 => R::AX,
        1 => R::CX,
        2 => R::DX,
        3 => R::BX,
        4 => R::SP,
        5 => R::BP,
        6 => R::SI,
        _ => R::DI,
    }
}

/// segment register from the 2-bit sr field
pub fn sr<T: Into<u8>>(v: T) -> R {
    match v.into() & 3 {
        0 => R::ES,
        1 => R::CS,
        2 => R::SS,
        _ => R::DS,
    }
}

/// Register combinations for memory operands, indexed by rm
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AMode {
    BXSI, BXDI, BPSI, BPDI, SI, DI, BP, BX
}

impl AMode {
    pub fn from_rm(rm: u8) -> AMode {
        match rm & 7 {
            0 => AMode::BXSI,
            1 => AMode::BXDI,
            2 => AMode::BPSI,
            3 => AMode::BPDI,
            4 => AMode::SI,
            5 => AMode::DI,
            6 => AMode::BP,
            _ => AMode::BX,
        }
    }

    /// base register and optional index register
    pub fn registers(self) -> (R, Option<R>) {
        match self {
            AMode::BXSI => (R::BX, Some(R::SI)),
            AMode::BXDI => (R::BX, Some(R::DI)),
            AMode::BPSI => (R::BP, Some(R::SI)),
            AMode::BPDI => (R::BP, Some(R::DI)),
            AMode::SI => (R::SI, None),
            AMode::DI => (R::DI, None),
            AMode::BP => (R::BP, None),
            AMode::BX => (R::BX, None),
        }
    }
}

impl fmt::Display for AMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.registers() {
            (base, Some(index)) => write!(f, "{} + {}", base, index),
            (base, None) => write!(f, "{}", base),
        }
    }
}
