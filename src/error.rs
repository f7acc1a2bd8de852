use crate::cpu::Op;

quick_error! {
    /// the class of instruction decode error that occured
    #[derive(Clone, Debug, PartialEq)]
    pub enum DecodeError {
        /// the byte stream ended in the middle of an instruction
        StreamUnderflow(offset: usize) {
            display("ERROR: byte stream ended mid-instruction at offset {:04X}", offset)
        }
        /// unimplemented / invalid opcode byte
        UnknownOpcode(offset: usize, byte: u8) {
            display("ERROR: unrecognized opcode {:02X} ({:08b}) at offset {:04X}", byte, byte, offset)
        }
        /// the reg field of a group opcode selects nothing we decode
        UnknownExtension(offset: usize, byte: u8, reg: u8) {
            display("ERROR: unrecognized extension {} for opcode {:02X} ({:08b}) at offset {:04X}", reg, byte, byte, offset)
        }
    }
}

quick_error! {
    #[derive(Clone, Debug, PartialEq)]
    pub enum ExecuteError {
        /// a valid instruction whose operand kinds have no semantics here
        Unsupported(op: Op, dst: &'static str, src: &'static str) {
            display("ERROR: {} has no semantics for operands ({}, {})", op, dst, src)
        }
        /// the session faulted earlier and must be reset
        Faulted {
            display("ERROR: session is faulted, reset required")
        }
        /// the session reached the end of its program
        Halted {
            display("ERROR: session is halted, reset required")
        }
    }
}

quick_error! {
    #[derive(Clone, Debug, PartialEq)]
    pub enum LoadError {
        ProgramTooLarge(len: usize, capacity: usize) {
            display("ERROR: program of {} bytes does not fit in {} bytes of code space", len, capacity)
        }
    }
}

quick_error! {
    #[derive(Clone, Debug, PartialEq)]
    pub enum ConfigError {
        Parse(msg: String) {
            display("ERROR: config: {}", msg)
        }
        Invalid(msg: String) {
            display("ERROR: invalid config: {}", msg)
        }
    }
}

quick_error! {
    /// any error a simulator session can retain
    #[derive(Clone, Debug, PartialEq)]
    pub enum Error {
        Decode(err: DecodeError) {
            from()
            display("{}", err)
        }
        Execute(err: ExecuteError) {
            from()
            display("{}", err)
        }
        Load(err: LoadError) {
            from()
            display("{}", err)
        }
        Config(err: ConfigError) {
            from()
            display("{}", err)
        }
    }
}
