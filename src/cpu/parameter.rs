use std::fmt;

use crate::cpu::register::{R, AMode};

/// A set of Parameters for an Instruction
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSet {
    pub dst: Parameter,
    pub src: Parameter,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Parameter {
    /// 8-bit, 16-bit or segment register
    Reg(R),

    /// memory operand. [amode+s16], or [u16] when amode is None
    Ptr(Option<AMode>, i16),

    /// immediate value, its width and signedness come from the instruction flags
    Imm(u16),

    /// short jump displacement, relative to the end of the instruction
    Rel(i8),

    None,
}

impl Parameter {
    /// operand kind name, used in error messages
    pub fn kind(&self) -> &'static str {
        match *self {
            Parameter::Reg(_) => "register",
            Parameter::Ptr(_, _) => "address",
            Parameter::Imm(_) => "immediate",
            Parameter::Rel(_) => "relative",
            Parameter::None => "none",
        }
    }

    pub fn is_ptr(&self) -> bool {
        match *self {
            Parameter::Ptr(_, _) => true,
            _ => false,
        }
    }

    pub fn is_reg(&self) -> bool {
        match *self {
            Parameter::Reg(_) => true,
            _ => false,
        }
    }
}

/// Renders the operand without instruction context. Immediates show as raw
/// decimal and displacements relative to the end of the instruction.
impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Parameter::Reg(r) => write!(f, "{}", r),
            Parameter::Ptr(None, disp) => write!(f, "[{}]", disp as u16),
            Parameter::Ptr(Some(amode), 0) => write!(f, "[{}]", amode),
            Parameter::Ptr(Some(amode), disp) => write!(
                f,
                "[{} {} {}]",
                amode,
                if disp < 0 { "-" } else { "+" },
                i32::from(disp).abs()
            ),
            Parameter::Imm(imm) => write!(f, "{}", imm),
            Parameter::Rel(rel) => write!(f, "{:+}", rel),
            Parameter::None => Ok(()),
        }
    }
}

/// Instruction encoding layout for Mod/Reg/RM byte
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ModRegRm {
    /// "mod" is correct name, but is reserved keyword
    /// High 2 bits
    pub md: u8,

    /// mid 3 bits
    pub reg: u8,

    /// low 3 bits
    pub rm: u8,
}

impl ModRegRm {
    pub fn from_u8(b: u8) -> Self {
        ModRegRm {
            md: b >> 6,
            reg: (b >> 3) & 7,
            rm: b & 7,
        }
    }
}
