use std::fmt;

use crate::cpu::op::Op;
use crate::cpu::parameter::{Parameter, ParameterSet};
use crate::hex::hex_bytes;
use crate::string::right_pad;

bitflags! {
    /// Encoding details that affect execution width and rendering
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct InstructionFlags: u8 {
        /// operates on 16-bit values (w bit)
        const WIDE         = 1 << 0;
        /// immediate came from the s bit group and is signed
        const SIGN_EXTEND  = 1 << 1;
        /// memory operand has no register partner, render "byte"/"word"
        const SPECIFY_SIZE = 1 << 2;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub command: Op,
    pub params: ParameterSet,

    /// address of the first byte
    pub offset: u16,

    /// encoded length in bytes
    pub length: u8,
    pub flags: InstructionFlags,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.params.dst, self.params.src) {
            (Parameter::None, _) => write!(f, "{}", self.command),
            (dst, Parameter::None) => write!(f, "{} {}", self.command, self.describe_parameter(&dst)),
            (dst, src) => write!(
                f,
                "{} {}, {}",
                self.command,
                self.describe_parameter(&dst),
                self.describe_parameter(&src)
            ),
        }
    }
}

impl Instruction {
    pub fn new(op: Op) -> Self {
        Instruction::new2(op, Parameter::None, Parameter::None)
    }

    pub fn new1(op: Op, dst: Parameter) -> Self {
        Instruction::new2(op, dst, Parameter::None)
    }

    pub fn new2(op: Op, dst: Parameter, src: Parameter) -> Self {
        Instruction {
            command: op,
            params: ParameterSet { dst, src },
            offset: 0,
            length: 0,
            flags: InstructionFlags::empty(),
        }
    }

    pub fn is_wide(&self) -> bool {
        self.flags.contains(InstructionFlags::WIDE)
    }

    /// the immediate as the value the instruction operates on
    pub fn signed_immediate(&self, imm: u16) -> i32 {
        if self.flags.contains(InstructionFlags::SIGN_EXTEND) {
            if self.is_wide() {
                i32::from(imm as i16)
            } else {
                i32::from(imm as u8 as i8)
            }
        } else {
            i32::from(imm)
        }
    }

    fn describe_parameter(&self, p: &Parameter) -> String {
        match *p {
            Parameter::Ptr(_, _) if self.flags.contains(InstructionFlags::SPECIFY_SIZE) => {
                let size = if self.is_wide() { "word" } else { "byte" };
                format!("{} {}", size, p)
            }
            Parameter::Imm(imm) => format!("{}", self.signed_immediate(imm)),
            Parameter::Rel(rel) => {
                // nasm style, relative to the start of the instruction
                format!("${:+}", i16::from(rel) + i16::from(self.length))
            }
            _ => format!("{}", p),
        }
    }
}

/// A decoded instruction together with its address and raw bytes, used for listings
#[derive(Clone, Debug, PartialEq)]
pub struct InstructionInfo {
    pub offset: u16,
    pub bytes: Vec<u8>,
    pub instruction: Instruction,
}

impl fmt::Display for InstructionInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{:04X}] {} {}",
            self.offset,
            right_pad(&hex_bytes(&self.bytes), 12),
            self.instruction,
        )
    }
}
