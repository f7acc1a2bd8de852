use crate::cpu::cursor::ByteCursor;
use crate::cpu::instruction::{Instruction, InstructionFlags, InstructionInfo};
use crate::cpu::op::Op;
use crate::cpu::parameter::{Parameter, ModRegRm};
use crate::cpu::register::{R, AMode, get_register, r16, sr};
use crate::error::DecodeError;
use crate::memory::MMU;

#[cfg(test)]
#[path = "./decoder_test.rs"]
mod decoder_test;

/// longest encoding in the subset: opcode, mod/reg/rm, disp16, imm16
pub const MAX_INSTRUCTION_LENGTH: usize = 6;

/// Opcode groups. Each one has its own sub-decode.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Encoding {
    /// add/sub/cmp/mov between r/m and reg, either direction
    RegRm(Op),
    /// add/sub/cmp al/ax, imm
    AccImm(Op),
    /// push/pop es/cs/ss/ds
    SegPushPop,
    /// inc/dec r16
    IncDecReg,
    /// push/pop r16
    PushPopReg,
    /// jcc, loop family, jcxz
    ShortJump(Op),
    /// 80-83: add/sub/cmp r/m, imm selected by reg
    AluImm,
    /// xchg r/m, reg
    XchgRm,
    /// xchg ax, r16
    XchgAcc,
    /// mov between r/m16 and a segment register
    SegMov,
    /// pop r/m16
    PopRm,
    /// mov between al/ax and a direct address
    AccMem,
    /// mov reg, imm
    MovRegImm,
    /// mov r/m, imm
    MovRmImm,
    /// FE/FF: inc/dec/push r/m selected by reg
    Group2,
    /// int3
    Halt,
    Unknown,
}

fn classify(b: u8) -> Encoding {
    match b {
        0x00..=0x03 => Encoding::RegRm(Op::Add),
        0x28..=0x2B => Encoding::RegRm(Op::Sub),
        0x38..=0x3B => Encoding::RegRm(Op::Cmp),
        0x88..=0x8B => Encoding::RegRm(Op::Mov),
        0x04 | 0x05 => Encoding::AccImm(Op::Add),
        0x2C | 0x2D => Encoding::AccImm(Op::Sub),
        0x3C | 0x3D => Encoding::AccImm(Op::Cmp),
        0x06 | 0x07 | 0x0E | 0x16 | 0x17 | 0x1E | 0x1F => Encoding::SegPushPop,
        0x40..=0x4F => Encoding::IncDecReg,
        0x50..=0x5F => Encoding::PushPopReg,
        0x70..=0x7F => Encoding::ShortJump(Op::jcc(b)),
        0xE0 => Encoding::ShortJump(Op::Loopnz),
        0xE1 => Encoding::ShortJump(Op::Loopz),
        0xE2 => Encoding::ShortJump(Op::Loop),
        0xE3 => Encoding::ShortJump(Op::Jcxz),
        0x80..=0x83 => Encoding::AluImm,
        0x86 | 0x87 => Encoding::XchgRm,
        0x90..=0x97 => Encoding::XchgAcc,
        0x8C | 0x8E => Encoding::SegMov,
        0x8F => Encoding::PopRm,
        0xA0..=0xA3 => Encoding::AccMem,
        0xB0..=0xBF => Encoding::MovRegImm,
        0xC6 | 0xC7 => Encoding::MovRmImm,
        0xFE | 0xFF => Encoding::Group2,
        0xCC => Encoding::Halt,
        _ => Encoding::Unknown,
    }
}

#[derive(Clone, Debug, Default)]
pub struct Decoder {}

impl Decoder {
    /// decodes `data` from its start until it is exhausted or an instruction fails to decode.
    /// a failure is the last element
    pub fn decode_to_block(&self, data: &[u8], origin: u16) -> Vec<Result<InstructionInfo, DecodeError>> {
        let mut ops = Vec::new();
        let mut pos = 0;
        while pos < data.len() {
            let offset = origin.wrapping_add(pos as u16);
            let mut c = ByteCursor::at(&data[pos..], usize::from(offset));
            match self.decode(&mut c) {
                Ok(instr) => {
                    let len = usize::from(instr.length);
                    ops.push(Ok(InstructionInfo {
                        offset,
                        bytes: data[pos..pos + len].to_vec(),
                        instruction: instr,
                    }));
                    pos += len;
                }
                Err(e) => {
                    ops.push(Err(e));
                    break;
                }
            }
        }
        ops
    }

    pub fn disassemble_block_to_str(&self, data: &[u8], origin: u16) -> String {
        let ops = self.decode_to_block(data, origin);
        instruction_info_to_str(&ops)
    }

    /// decodes the instruction at `offset` in memory. Bytes at `end` and beyond are not read
    pub fn get_instruction(&self, mmu: &MMU, offset: u16, end: usize) -> Result<Instruction, DecodeError> {
        let available = end.saturating_sub(usize::from(offset));
        let data = mmu.read(u32::from(offset), available.min(MAX_INSTRUCTION_LENGTH));
        let mut c = ByteCursor::at(data, usize::from(offset));
        self.decode(&mut c)
    }

    /// decodes a single instruction from the start of `data`, which is located at `offset`
    pub fn decode_bytes(&self, data: &[u8], offset: u16) -> Result<Instruction, DecodeError> {
        let mut c = ByteCursor::at(data, usize::from(offset));
        self.decode(&mut c)
    }

    /// decodes the instruction at the cursor position, leaving the cursor after it
    pub fn decode(&self, c: &mut ByteCursor) -> Result<Instruction, DecodeError> {
        let start = c.position();
        let offset = c.address() as u16;
        let b = c.take_byte()?;

        let mut op = match classify(b) {
            Encoding::RegRm(cmd) => self.reg_rm(c, b, cmd)?,
            Encoding::AccImm(cmd) => self.acc_imm(c, b, cmd)?,
            Encoding::SegPushPop => self.seg_push_pop(b),
            Encoding::IncDecReg => self.inc_dec_reg(b),
            Encoding::PushPopReg => self.push_pop_reg(b),
            Encoding::ShortJump(cmd) => Instruction::new1(cmd, Parameter::Rel(c.take_s8()?)),
            Encoding::AluImm => self.alu_imm(c, b)?,
            Encoding::XchgRm => self.xchg_rm(c, b)?,
            Encoding::XchgAcc => self.xchg_acc(b),
            Encoding::SegMov => self.seg_mov(c, b)?,
            Encoding::PopRm => self.pop_rm(c, b)?,
            Encoding::AccMem => self.acc_mem(c, b)?,
            Encoding::MovRegImm => self.mov_reg_imm(c, b)?,
            Encoding::MovRmImm => self.mov_rm_imm(c, b)?,
            Encoding::Group2 => self.group2(c, b)?,
            Encoding::Halt => Instruction::new(Op::Int3),
            Encoding::Unknown => return Err(DecodeError::UnknownOpcode(usize::from(offset), b)),
        };

        op.offset = offset;
        op.length = (c.position() - start) as u8;
        trace!("{:04X}: decoded {}", offset, op);
        Ok(op)
    }

    /// 00-03, 28-2B, 38-3B, 88-8B: op r/m, reg or op reg, r/m
    fn reg_rm(&self, c: &mut ByteCursor, b: u8, cmd: Op) -> Result<Instruction, DecodeError> {
        let to_reg = b & 0b10 != 0;
        let wide = b & 1 != 0;
        let x = self.read_mod_reg_rm(c)?;
        let reg = Parameter::Reg(get_register(x.reg, wide));
        let rm = self.rm(c, x, wide)?;
        let mut op = if to_reg {
            Instruction::new2(cmd, reg, rm)
        } else {
            Instruction::new2(cmd, rm, reg)
        };
        op.flags.set(InstructionFlags::WIDE, wide);
        Ok(op)
    }

    /// 04/05, 2C/2D, 3C/3D: op al, imm8 or op ax, imm16
    fn acc_imm(&self, c: &mut ByteCursor, b: u8, cmd: Op) -> Result<Instruction, DecodeError> {
        let wide = b & 1 != 0;
        let acc = if wide { R::AX } else { R::AL };
        let imm = self.read_immediate(c, wide, false)?;
        let mut op = Instruction::new2(cmd, Parameter::Reg(acc), Parameter::Imm(imm));
        op.flags.set(InstructionFlags::WIDE, wide);
        Ok(op)
    }

    /// 06/07, 0E, 16/17, 1E/1F: push sreg, pop sreg
    fn seg_push_pop(&self, b: u8) -> Instruction {
        let cmd = if b & 1 == 0 { Op::Push } else { Op::Pop };
        let mut op = Instruction::new1(cmd, Parameter::Reg(sr(b >> 3)));
        op.flags |= InstructionFlags::WIDE;
        op
    }

    /// 40-47 inc r16, 48-4F dec r16
    fn inc_dec_reg(&self, b: u8) -> Instruction {
        let cmd = if b < 0x48 { Op::Inc } else { Op::Dec };
        let mut op = Instruction::new1(cmd, Parameter::Reg(r16(b)));
        op.flags |= InstructionFlags::WIDE;
        op
    }

    /// 50-57 push r16, 58-5F pop r16
    fn push_pop_reg(&self, b: u8) -> Instruction {
        let cmd = if b < 0x58 { Op::Push } else { Op::Pop };
        let mut op = Instruction::new1(cmd, Parameter::Reg(r16(b)));
        op.flags |= InstructionFlags::WIDE;
        op
    }

    /// 80-83: add/sub/cmp r/m, imm. s bit selects a sign-extended imm8 for word operands
    fn alu_imm(&self, c: &mut ByteCursor, b: u8) -> Result<Instruction, DecodeError> {
        let offset = c.address() - 1;
        let sign_extend = b & 0b10 != 0;
        let wide = b & 1 != 0;
        let x = self.read_mod_reg_rm(c)?;
        let cmd = match x.reg {
            0 => Op::Add,
            5 => Op::Sub,
            7 => Op::Cmp,
            reg => return Err(DecodeError::UnknownExtension(offset, b, reg)),
        };
        let dst = self.rm(c, x, wide)?;
        let imm = self.read_immediate(c, wide, sign_extend)?;
        let mut op = Instruction::new2(cmd, dst, Parameter::Imm(imm));
        op.flags.set(InstructionFlags::WIDE, wide);
        op.flags.set(InstructionFlags::SIGN_EXTEND, sign_extend);
        op.flags.set(InstructionFlags::SPECIFY_SIZE, dst.is_ptr());
        Ok(op)
    }

    /// 86/87: xchg reg, r/m
    fn xchg_rm(&self, c: &mut ByteCursor, b: u8) -> Result<Instruction, DecodeError> {
        let wide = b & 1 != 0;
        let x = self.read_mod_reg_rm(c)?;
        let reg = Parameter::Reg(get_register(x.reg, wide));
        let rm = self.rm(c, x, wide)?;
        let mut op = Instruction::new2(Op::Xchg, reg, rm);
        op.flags.set(InstructionFlags::WIDE, wide);
        Ok(op)
    }

    /// 90-97: xchg ax, r16
    fn xchg_acc(&self, b: u8) -> Instruction {
        let mut op = Instruction::new2(Op::Xchg, Parameter::Reg(R::AX), Parameter::Reg(r16(b)));
        op.flags |= InstructionFlags::WIDE;
        op
    }

    /// 8C: mov r/m16, sreg. 8E: mov sreg, r/m16
    fn seg_mov(&self, c: &mut ByteCursor, b: u8) -> Result<Instruction, DecodeError> {
        let offset = c.address() - 1;
        let x = self.read_mod_reg_rm(c)?;
        if x.reg > 3 {
            return Err(DecodeError::UnknownExtension(offset, b, x.reg));
        }
        let seg = Parameter::Reg(sr(x.reg));
        let rm = self.rm(c, x, true)?;
        let mut op = if b == 0x8E {
            Instruction::new2(Op::Mov, seg, rm)
        } else {
            Instruction::new2(Op::Mov, rm, seg)
        };
        op.flags |= InstructionFlags::WIDE;
        Ok(op)
    }

    /// 8F /0: pop r/m16
    fn pop_rm(&self, c: &mut ByteCursor, b: u8) -> Result<Instruction, DecodeError> {
        let offset = c.address() - 1;
        let x = self.read_mod_reg_rm(c)?;
        if x.reg != 0 {
            return Err(DecodeError::UnknownExtension(offset, b, x.reg));
        }
        let dst = self.rm(c, x, true)?;
        let mut op = Instruction::new1(Op::Pop, dst);
        op.flags |= InstructionFlags::WIDE;
        op.flags.set(InstructionFlags::SPECIFY_SIZE, dst.is_ptr());
        Ok(op)
    }

    /// A0/A1: mov al/ax, [u16]. A2/A3: mov [u16], al/ax
    fn acc_mem(&self, c: &mut ByteCursor, b: u8) -> Result<Instruction, DecodeError> {
        let wide = b & 1 != 0;
        let acc = Parameter::Reg(if wide { R::AX } else { R::AL });
        let ptr = Parameter::Ptr(None, c.take_s16()?);
        let mut op = if b & 0b10 == 0 {
            Instruction::new2(Op::Mov, acc, ptr)
        } else {
            Instruction::new2(Op::Mov, ptr, acc)
        };
        op.flags.set(InstructionFlags::WIDE, wide);
        Ok(op)
    }

    /// B0-B7: mov r8, imm8. B8-BF: mov r16, imm16
    fn mov_reg_imm(&self, c: &mut ByteCursor, b: u8) -> Result<Instruction, DecodeError> {
        let wide = b & 0b1000 != 0;
        let imm = self.read_immediate(c, wide, false)?;
        let mut op = Instruction::new2(Op::Mov, Parameter::Reg(get_register(b & 7, wide)), Parameter::Imm(imm));
        op.flags.set(InstructionFlags::WIDE, wide);
        Ok(op)
    }

    /// C6/C7 /0: mov r/m, imm
    fn mov_rm_imm(&self, c: &mut ByteCursor, b: u8) -> Result<Instruction, DecodeError> {
        let offset = c.address() - 1;
        let wide = b & 1 != 0;
        let x = self.read_mod_reg_rm(c)?;
        if x.reg != 0 {
            return Err(DecodeError::UnknownExtension(offset, b, x.reg));
        }
        let dst = self.rm(c, x, wide)?;
        let imm = self.read_immediate(c, wide, false)?;
        let mut op = Instruction::new2(Op::Mov, dst, Parameter::Imm(imm));
        op.flags.set(InstructionFlags::WIDE, wide);
        op.flags.set(InstructionFlags::SPECIFY_SIZE, dst.is_ptr());
        Ok(op)
    }

    /// FE /0 inc r/m8, /1 dec r/m8. FF /0 inc r/m16, /1 dec r/m16, /6 push r/m16
    fn group2(&self, c: &mut ByteCursor, b: u8) -> Result<Instruction, DecodeError> {
        let offset = c.address() - 1;
        let wide = b & 1 != 0;
        let x = self.read_mod_reg_rm(c)?;
        let cmd = match (x.reg, wide) {
            (0, _) => Op::Inc,
            (1, _) => Op::Dec,
            (6, true) => Op::Push,
            (reg, _) => return Err(DecodeError::UnknownExtension(offset, b, reg)),
        };
        let dst = self.rm(c, x, wide)?;
        let mut op = Instruction::new1(cmd, dst);
        op.flags.set(InstructionFlags::WIDE, wide);
        op.flags.set(InstructionFlags::SPECIFY_SIZE, dst.is_ptr());
        Ok(op)
    }

    /// decode the r/m operand selected by mod and rm
    fn rm(&self, c: &mut ByteCursor, x: ModRegRm, wide: bool) -> Result<Parameter, DecodeError> {
        Ok(match x.md {
            0 => if x.rm == 6 { // [u16]
                Parameter::Ptr(None, c.take_s16()?)
            } else { // [amode]
                Parameter::Ptr(Some(AMode::from_rm(x.rm)), 0)
            }
            // [amode+s8]
            1 => Parameter::Ptr(Some(AMode::from_rm(x.rm)), i16::from(c.take_s8()?)),
            // [amode+s16]
            2 => Parameter::Ptr(Some(AMode::from_rm(x.rm)), c.take_s16()?),
            // reg
            _ => Parameter::Reg(get_register(x.rm, wide)),
        })
    }

    fn read_mod_reg_rm(&self, c: &mut ByteCursor) -> Result<ModRegRm, DecodeError> {
        Ok(ModRegRm::from_u8(c.take_byte()?))
    }

    /// imm8, imm16, or imm8 sign-extended to 16 bits
    fn read_immediate(&self, c: &mut ByteCursor, wide: bool, sign_extend: bool) -> Result<u16, DecodeError> {
        Ok(match (wide, sign_extend) {
            (true, true) => i16::from(c.take_s8()?) as u16,
            (true, false) => c.take_u16()?,
            (false, _) => u16::from(c.take_byte()?),
        })
    }
}

/// one listing line per instruction; a decode failure ends the listing
pub fn instruction_info_to_str(ops: &[Result<InstructionInfo, DecodeError>]) -> String {
    let mut lines = Vec::new();
    for op in ops {
        match op {
            Ok(info) => lines.push(info.to_string()),
            Err(e) => lines.push(format!(";;; {}", e)),
        }
    }
    lines.join("\n")
}

pub fn instructions_to_str(ops: &[Instruction]) -> String {
    let mut lines = Vec::new();
    for op in ops {
        lines.push(op.to_string())
    }
    lines.join("\n")
}
