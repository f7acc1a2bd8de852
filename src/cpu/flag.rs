use std::fmt;

#[cfg(test)]
#[path = "./flag_test.rs"]
mod flag_test;

/// https://en.wikipedia.org/wiki/FLAGS_register
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Flags {
    // ____ ODIT SZ_A _P_C
    pub carry: bool,     // 0: carry flag
    pub parity: bool,    // 2: parity flag
    pub adjust: bool,    // 4: adjust flag
    pub zero: bool,      // 6: zero flag
    pub sign: bool,      // 7: sign flag
    pub trap: bool,      // 8: trap flag (single step)
    pub interrupt: bool, // 9: interrupt flag
    pub direction: bool, // 10: direction flag
    pub overflow: bool,  // 11: overflow flag
}

pub const FLAG_CF: u16 = 0x0001;
pub const FLAG_PF: u16 = 0x0004;
pub const FLAG_AF: u16 = 0x0010;
pub const FLAG_ZF: u16 = 0x0040;
pub const FLAG_SF: u16 = 0x0080;
pub const FLAG_TF: u16 = 0x0100;
pub const FLAG_IF: u16 = 0x0200;
pub const FLAG_DF: u16 = 0x0400;
pub const FLAG_OF: u16 = 0x0800;

/// the nine architectural flags, in display order
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Flag {
    Carry, Parity, Adjust, Zero, Sign, Trap, Interrupt, Direction, Overflow,
}

pub const ALL_FLAGS: [Flag; 9] = [
    Flag::Carry, Flag::Parity, Flag::Adjust, Flag::Zero, Flag::Sign,
    Flag::Trap, Flag::Interrupt, Flag::Direction, Flag::Overflow,
];

impl Flag {
    pub fn mask(self) -> u16 {
        match self {
            Flag::Carry => FLAG_CF,
            Flag::Parity => FLAG_PF,
            Flag::Adjust => FLAG_AF,
            Flag::Zero => FLAG_ZF,
            Flag::Sign => FLAG_SF,
            Flag::Trap => FLAG_TF,
            Flag::Interrupt => FLAG_IF,
            Flag::Direction => FLAG_DF,
            Flag::Overflow => FLAG_OF,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Flag::Carry => 'C',
            Flag::Parity => 'P',
            Flag::Adjust => 'A',
            Flag::Zero => 'Z',
            Flag::Sign => 'S',
            Flag::Trap => 'T',
            Flag::Interrupt => 'I',
            Flag::Direction => 'D',
            Flag::Overflow => 'O',
        }
    }
}

/// How an instruction sets one flag.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FlagEffect {
    Zero,
    One,
    Result,
}

const fn parity_table() -> [bool; 256] {
    let mut res = [false; 256];
    let mut i = 0;
    while i < 256 {
        res[i] = (i as u8).count_ones() % 2 == 0;
        i += 1;
    }
    res
}

static PARITY_LOOKUP: [bool; 256] = parity_table();

impl Flags {
    pub fn new_from_u16(val: u16) -> Flags {
        let mut f = Flags::default();
        f.set_u16(val);
        f
    }

    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::Carry => self.carry,
            Flag::Parity => self.parity,
            Flag::Adjust => self.adjust,
            Flag::Zero => self.zero,
            Flag::Sign => self.sign,
            Flag::Trap => self.trap,
            Flag::Interrupt => self.interrupt,
            Flag::Direction => self.direction,
            Flag::Overflow => self.overflow,
        }
    }

    pub fn set(&mut self, flag: Flag, v: bool) {
        match flag {
            Flag::Carry => self.carry = v,
            Flag::Parity => self.parity = v,
            Flag::Adjust => self.adjust = v,
            Flag::Zero => self.zero = v,
            Flag::Sign => self.sign = v,
            Flag::Trap => self.trap = v,
            Flag::Interrupt => self.interrupt = v,
            Flag::Direction => self.direction = v,
            Flag::Overflow => self.overflow = v,
        }
    }

    /// Set equal to the most-significant bit of the result at the operand width.
    pub fn set_sign(&mut self, res: usize, wide: bool) {
        self.sign = res & sign_bit(wide) != 0;
    }

    /// Set if the result at the operand width is zero; cleared otherwise.
    pub fn set_zero(&mut self, res: usize, wide: bool) {
        self.zero = res & width_mask(wide) == 0;
    }

    /// Set if the least-significant byte of the result contains an
    /// even number of 1 bits; cleared otherwise.
    pub fn set_parity(&mut self, res: usize) {
        self.parity = PARITY_LOOKUP[res & 0xFF];
    }

    /// Set on a carry or borrow across the bit 3/4 boundary.
    pub fn set_adjust(&mut self, res: usize, v1: usize, v2: usize) {
        self.adjust = (res ^ v1 ^ v2) & 0x10 != 0;
    }

    /// Set on a carry or borrow out of the most-significant bit. `res` is the
    /// untruncated result, so a borrow shows up as bits above the width.
    pub fn set_carry(&mut self, res: usize, wide: bool) {
        self.carry = res & (width_mask(wide) + 1) != 0;
    }

    /// Operands of equal sign gave a result of the other sign.
    pub fn set_overflow_add(&mut self, res: usize, dst: usize, src: usize, wide: bool) {
        self.overflow = (res ^ dst) & (res ^ src) & sign_bit(wide) != 0;
    }

    /// Operands of different sign gave a result whose sign differs from `dst`.
    pub fn set_overflow_sub(&mut self, res: usize, dst: usize, src: usize, wide: bool) {
        self.overflow = (dst ^ src) & (dst ^ res) & sign_bit(wide) != 0;
    }

    /// computes all six status flags of `dst + src`
    pub fn from_add(res: usize, dst: usize, src: usize, wide: bool) -> Flags {
        let mut f = Flags::default();
        f.set_carry(res, wide);
        f.set_overflow_add(res, dst, src, wide);
        f.set_szp(res, wide);
        f.set_adjust(res, dst, src);
        f
    }

    /// computes all six status flags of `dst - src`
    pub fn from_sub(res: usize, dst: usize, src: usize, wide: bool) -> Flags {
        let mut f = Flags::default();
        f.set_carry(res, wide);
        f.set_overflow_sub(res, dst, src, wide);
        f.set_szp(res, wide);
        f.set_adjust(res, dst, src);
        f
    }

    fn set_szp(&mut self, res: usize, wide: bool) {
        self.set_sign(res, wide);
        self.set_zero(res, wide);
        self.set_parity(res);
    }

    /// applies an instruction's flag-effect table, taking result-derived values from `computed`
    pub fn apply(&mut self, effects: &[(Flag, FlagEffect)], computed: &Flags) {
        for &(flag, effect) in effects {
            let v = match effect {
                FlagEffect::Zero => false,
                FlagEffect::One => true,
                FlagEffect::Result => computed.get(flag),
            };
            self.set(flag, v);
        }
    }

    /// initializes the flags with a packed u16
    pub fn set_u16(&mut self, val: u16) {
        for &flag in &ALL_FLAGS {
            self.set(flag, val & flag.mask() != 0);
        }
    }

    /// returns the flags packed at their hardware bit positions
    pub fn u16(&self) -> u16 {
        ALL_FLAGS.iter()
            .filter(|&&flag| self.get(flag))
            .fold(0, |acc, flag| acc | flag.mask())
    }
}

/// renders the set flags as letters, like "PZ"
impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &flag in &ALL_FLAGS {
            if self.get(flag) {
                write!(f, "{}", flag.letter())?;
            }
        }
        Ok(())
    }
}

fn width_mask(wide: bool) -> usize {
    if wide { 0xFFFF } else { 0xFF }
}

fn sign_bit(wide: bool) -> usize {
    if wide { 0x8000 } else { 0x80 }
}
