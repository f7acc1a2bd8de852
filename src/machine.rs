use crate::config::Config;
use crate::cpu::{CPU, Instruction, Op, Parameter, R, estimate_clocks, branch_taken_clocks, unsupported};
use crate::error::{Error, ExecuteError, LoadError};
use crate::memory::MMU;

#[cfg(test)]
#[path = "./machine_test.rs"]
mod machine_test;

/// the INT3 opcode, appended after loaded programs
const HALT_OPCODE: u8 = 0xCC;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum State {
    /// waiting for the next decode
    Ready,

    /// an instruction was decoded and awaits execution
    Decoded,

    /// a decode or execute error occured. Only a reset leaves this state
    Faulted,

    /// ip reached the end of the program, or INT3 was executed
    Halted,
}

pub struct Machine {
    pub cpu: CPU,
    pub mmu: MMU,
    config: Config,

    /// end of the loaded program. The halt sentinel starts here
    code_end: usize,
    state: State,

    /// the first error since the last reset
    error: Option<Error>,
}

impl Machine {
    pub fn default() -> Self {
        Machine::with_config(Config::default())
    }

    /// creates a session after validating `config`
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate()?;
        Ok(Machine::with_config(config))
    }

    fn with_config(config: Config) -> Self {
        Machine {
            cpu: CPU::new(config.segment_windows.to_array()),
            mmu: MMU::new(config.memory_size),
            config,
            code_end: 0,
            state: State::Ready,
            error: None,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn code_end(&self) -> usize {
        self.code_end
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// the text of the retained error, if any
    pub fn error_text(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    /// the loaded program, without the halt sentinel
    pub fn program(&self) -> &[u8] {
        self.mmu.read(0, self.code_end)
    }

    /// loads a raw program at address 0 followed by the halt sentinel, and resets the session
    pub fn load(&mut self, data: &[u8]) -> Result<(), Error> {
        let capacity = 0x1_0000 - self.config.halt_sentinel_len;
        if data.len() > capacity {
            let err = Error::from(LoadError::ProgramTooLarge(data.len(), capacity));
            warn!("{}", err);
            return Err(err);
        }

        // clear whatever a previous, longer program left behind
        self.code_end = 0;
        self.reset();

        self.mmu.write(0, data);
        let sentinel = vec![HALT_OPCODE; self.config.halt_sentinel_len];
        self.mmu.write(data.len() as u32, &sentinel);
        self.code_end = data.len();
        debug!("loaded {} bytes, code end at {:04X}", data.len(), self.code_end);
        Ok(())
    }

    /// reinitializes registers, flags and ip and clears the error.
    /// memory after the program is zero-filled, the program itself is kept
    pub fn reset(&mut self) {
        self.mmu.clear_from(self.code_end + self.config.halt_sentinel_len);
        self.cpu.reset(&mut self.mmu);
        self.error = None;
        self.state = State::Ready;
        debug!("reset, code end at {:04X}", self.code_end);
    }

    /// decodes the instruction at ip. Returns None and halts once ip reaches the end of the
    /// program. A halted or faulted session must be reset before it decodes again
    pub fn decode(&mut self) -> Result<Option<Instruction>, Error> {
        self.check_runnable()?;

        let ip = usize::from(self.cpu.regs.ip);
        if ip >= self.code_end {
            debug!("halted at {:04X}", ip);
            self.state = State::Halted;
            return Ok(None);
        }

        match self.cpu.decoder.get_instruction(&self.mmu, ip as u16, self.code_end) {
            Ok(op) => {
                self.state = State::Decoded;
                Ok(Some(op))
            }
            Err(e) => Err(self.fault(e.into())),
        }
    }

    /// applies `op` to registers, flags and memory and advances ip
    pub fn execute(&mut self, op: &Instruction) -> Result<(), Error> {
        self.check_runnable()?;

        let ea = self.memory_operand_address(op);
        let taken = match self.execute_op(op) {
            Ok(taken) => taken,
            Err(e) => return Err(self.fault(e.into())),
        };

        let mut clocks = estimate_clocks(op, ea).unwrap_or(0);
        if taken {
            clocks += branch_taken_clocks(op.command);
        }
        self.cpu.instruction_count += 1;
        self.cpu.cycle_count += clocks as usize;
        trace!("{:04X}: executed {}, {} clocks", op.offset, op, clocks);

        self.state = if op.command == Op::Int3 {
            debug!("halted by {} at {:04X}", op, op.offset);
            State::Halted
        } else {
            State::Ready
        };
        Ok(())
    }

    /// decodes and executes one instruction
    pub fn step(&mut self) -> Result<State, Error> {
        if let Some(op) = self.decode()? {
            self.execute(&op)?;
        }
        Ok(self.state)
    }

    fn check_runnable(&self) -> Result<(), Error> {
        match self.state {
            State::Faulted => Err(ExecuteError::Faulted.into()),
            State::Halted => Err(ExecuteError::Halted.into()),
            _ => Ok(()),
        }
    }

    /// retains the first error and enters the faulted state
    fn fault(&mut self, err: Error) -> Error {
        warn!("{}", err);
        if self.error.is_none() {
            self.error = Some(err.clone());
        }
        self.state = State::Faulted;
        err
    }

    fn memory_operand_address(&self, op: &Instruction) -> Option<u16> {
        let p = if op.params.dst.is_ptr() { &op.params.dst } else { &op.params.src };
        self.cpu.effective_address(&self.mmu, p)
    }

    /// runs the semantics of `op`. Returns whether a jump was taken.
    /// On error, no state has been modified
    fn execute_op(&mut self, op: &Instruction) -> Result<bool, ExecuteError> {
        let wide = op.is_wide();
        let dst = op.params.dst;
        let src = op.params.src;
        let mut next_ip = self.cpu.regs.ip.wrapping_add(u16::from(op.length));
        let mut taken = false;

        match op.command {
            Op::Mov => {
                let data = self.cpu.read_parameter_value(&self.mmu, &src, wide).ok_or_else(|| unsupported(op))?;
                if !self.cpu.write_parameter(&mut self.mmu, &dst, wide, data) {
                    return Err(unsupported(op));
                }
            }
            Op::Add | Op::Sub | Op::Cmp | Op::Inc | Op::Dec => {
                self.cpu.arith(&mut self.mmu, op)?;
            }
            Op::Push => {
                if !wide {
                    return Err(unsupported(op));
                }
                // push sp stores the decremented value
                let data = match dst {
                    Parameter::Reg(R::SP) => self.cpu.get_r(&self.mmu, R::SP).wrapping_sub(2),
                    _ => self.cpu.read_parameter_value(&self.mmu, &dst, true).ok_or_else(|| unsupported(op))?,
                };
                self.cpu.push16(&mut self.mmu, data);
            }
            Op::Pop => {
                if !wide || !is_destination(&dst) {
                    return Err(unsupported(op));
                }
                let sp = self.cpu.get_r(&self.mmu, R::SP);
                let data = self.cpu.pop16(&mut self.mmu);
                if !self.cpu.write_parameter(&mut self.mmu, &dst, true, data) {
                    self.cpu.set_r(&mut self.mmu, R::SP, sp);
                    return Err(unsupported(op));
                }
            }
            Op::Xchg => {
                if !is_destination(&dst) || !is_destination(&src) || (dst.is_ptr() && src.is_ptr()) {
                    return Err(unsupported(op));
                }
                let a = self.cpu.read_parameter_value(&self.mmu, &dst, wide).ok_or_else(|| unsupported(op))?;
                let b = self.cpu.read_parameter_value(&self.mmu, &src, wide).ok_or_else(|| unsupported(op))?;
                if !self.cpu.write_parameter(&mut self.mmu, &dst, wide, b) {
                    return Err(unsupported(op));
                }
                if !self.cpu.write_parameter(&mut self.mmu, &src, wide, a) {
                    self.cpu.write_parameter(&mut self.mmu, &dst, wide, a);
                    return Err(unsupported(op));
                }
            }
            Op::Loop | Op::Loopz | Op::Loopnz | Op::Jcxz => {
                let rel = relative(op)?;
                let cx = self.cpu.get_r(&self.mmu, R::CX);
                taken = match op.command {
                    Op::Jcxz => cx == 0,
                    _ => {
                        let cx = cx.wrapping_sub(1);
                        self.cpu.set_r(&mut self.mmu, R::CX, cx);
                        let zero = self.cpu.regs.flags.zero;
                        match op.command {
                            Op::Loopz => cx != 0 && zero,
                            Op::Loopnz => cx != 0 && !zero,
                            _ => cx != 0,
                        }
                    }
                };
                if taken {
                    next_ip = next_ip.wrapping_add(rel);
                }
            }
            Op::Int3 => {}
            _ => {
                let rel = relative(op)?;
                taken = self.cpu.jump_condition(op.command).ok_or_else(|| unsupported(op))?;
                if taken {
                    next_ip = next_ip.wrapping_add(rel);
                }
            }
        }

        self.cpu.regs.ip = next_ip;
        Ok(taken)
    }
}

fn is_destination(p: &Parameter) -> bool {
    p.is_reg() || p.is_ptr()
}

/// the sign-extended displacement of a short jump
fn relative(op: &Instruction) -> Result<u16, ExecuteError> {
    match op.params.dst {
        Parameter::Rel(rel) => Ok(i16::from(rel) as u16),
        _ => Err(unsupported(op)),
    }
}
