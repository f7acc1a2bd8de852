use crate::error::ExecuteError;
use crate::memory::MMU;

pub use self::cursor::*;
pub mod cursor;

pub use self::decoder::*;
pub mod decoder;

pub use self::flag::*;
pub mod flag;

pub use self::instruction::*;
pub mod instruction;

pub use self::op::*;
pub mod op;

pub use self::parameter::*;
pub mod parameter;

pub use self::register::*;
pub mod register;

pub use self::timing::*;
pub mod timing;


#[derive(Clone, Debug, Default)]
pub struct CPU {
    pub regs: RegisterState,
    pub instruction_count: usize,
    pub cycle_count: usize,
    pub decoder: Decoder,
}

impl CPU {
    pub fn new(segment_windows: [u32; 4]) -> Self {
        CPU {
            regs: RegisterState::with_windows(segment_windows),
            instruction_count: 0,
            cycle_count: 0,
            decoder: Decoder::default(),
        }
    }

    pub fn get_r(&self, mmu: &MMU, r: R) -> u16 {
        self.regs.get(mmu, r)
    }

    pub fn set_r(&mut self, mmu: &mut MMU, r: R, val: u16) {
        self.regs.set(mmu, r, val);
    }

    pub fn reset(&mut self, mmu: &mut MMU) {
        self.regs.reset(mmu);
        self.instruction_count = 0;
        self.cycle_count = 0;
    }

    pub fn push16(&mut self, mmu: &mut MMU, data: u16) {
        let sp = self.get_r(mmu, R::SP).wrapping_sub(2);
        self.set_r(mmu, R::SP, sp);
        mmu.write_u16(u32::from(sp), data);
    }

    pub fn pop16(&mut self, mmu: &mut MMU) -> u16 {
        let sp = self.get_r(mmu, R::SP);
        let data = mmu.read_u16(u32::from(sp));
        self.set_r(mmu, R::SP, sp.wrapping_add(2));
        data
    }

    /// the 16-bit address a memory operand refers to
    pub fn effective_address(&self, mmu: &MMU, p: &Parameter) -> Option<u16> {
        match *p {
            Parameter::Ptr(amode, disp) => {
                let base = match amode {
                    Some(amode) => {
                        let (r1, r2) = amode.registers();
                        let v = self.get_r(mmu, r1);
                        match r2 {
                            Some(r2) => v.wrapping_add(self.get_r(mmu, r2)),
                            None => v,
                        }
                    }
                    None => 0,
                };
                Some(base.wrapping_add(disp as u16))
            }
            _ => None,
        }
    }

    /// reads the value of a register, memory or immediate operand, truncated to the operand width
    pub fn read_parameter_value(&self, mmu: &MMU, p: &Parameter, wide: bool) -> Option<u16> {
        match *p {
            Parameter::Reg(r) => Some(self.get_r(mmu, r)),
            Parameter::Ptr(_, _) => {
                let addr = u32::from(self.effective_address(mmu, p)?);
                Some(if wide {
                    mmu.read_u16(addr)
                } else {
                    u16::from(mmu.read_u8(addr))
                })
            }
            Parameter::Imm(imm) => Some(if wide { imm } else { imm & 0xFF }),
            Parameter::Rel(_) | Parameter::None => None,
        }
    }

    /// writes to a register or memory operand. Returns false and leaves all
    /// state untouched when `p` is not a destination.
    pub fn write_parameter(&mut self, mmu: &mut MMU, p: &Parameter, wide: bool, data: u16) -> bool {
        match *p {
            Parameter::Reg(r) => {
                self.set_r(mmu, r, data);
                true
            }
            Parameter::Ptr(_, _) => {
                let addr = match self.effective_address(mmu, p) {
                    Some(addr) => u32::from(addr),
                    None => return false,
                };
                if wide {
                    mmu.write_u16(addr, data);
                } else {
                    mmu.write_u8(addr, data as u8);
                }
                true
            }
            _ => false,
        }
    }

    /// the arithmetic ops. Flags are updated according to the flag effects of `op`
    pub fn arith(&mut self, mmu: &mut MMU, op: &Instruction) -> Result<(), ExecuteError> {
        let wide = op.is_wide();
        let dst = op.params.dst;
        let src = match op.command {
            Op::Inc | Op::Dec => Parameter::Imm(1),
            _ => op.params.src,
        };
        let (a, b) = match (self.read_parameter_value(mmu, &dst, wide), self.read_parameter_value(mmu, &src, wide)) {
            (Some(a), Some(b)) => (a as usize, b as usize),
            _ => return Err(unsupported(op)),
        };

        let (res, computed) = match op.command {
            Op::Add | Op::Inc => {
                let res = a + b;
                (res, Flags::from_add(res, a, b, wide))
            }
            Op::Sub | Op::Cmp | Op::Dec => {
                let res = a.wrapping_sub(b);
                (res, Flags::from_sub(res, a, b, wide))
            }
            _ => return Err(unsupported(op)),
        };

        if op.command != Op::Cmp && !self.write_parameter(mmu, &dst, wide, res as u16) {
            return Err(unsupported(op));
        }
        self.regs.flags.apply(op.command.flag_effects(), &computed);
        Ok(())
    }

    /// evaluates the condition of a conditional jump
    pub fn jump_condition(&self, command: Op) -> Option<bool> {
        let f = &self.regs.flags;
        Some(match command {
            Op::Jo => f.overflow,
            Op::Jno => !f.overflow,
            Op::Jb => f.carry,
            Op::Jnb => !f.carry,
            Op::Je => f.zero,
            Op::Jnz => !f.zero,
            Op::Jbe => f.carry || f.zero,
            Op::Ja => !f.carry && !f.zero,
            Op::Js => f.sign,
            Op::Jns => !f.sign,
            Op::Jp => f.parity,
            Op::Jnp => !f.parity,
            Op::Jl => f.sign != f.overflow,
            Op::Jnl => f.sign == f.overflow,
            Op::Jle => f.zero || f.sign != f.overflow,
            Op::Jg => !f.zero && f.sign == f.overflow,
            _ => return None,
        })
    }
}

/// the error for an instruction whose operand kinds have no semantics
pub fn unsupported(op: &Instruction) -> ExecuteError {
    ExecuteError::Unsupported(op.command, op.params.dst.kind(), op.params.src.kind())
}
