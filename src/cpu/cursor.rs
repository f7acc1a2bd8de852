use crate::error::DecodeError;

#[cfg(test)]
#[path = "./cursor_test.rs"]
mod cursor_test;

/// Bounds-checked reader over a byte window. All decoding reads go through here.
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,

    /// address of data[0], used for error reporting
    origin: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteCursor::at(data, 0)
    }

    pub fn at(data: &'a [u8], origin: usize) -> Self {
        ByteCursor {
            data,
            pos: 0,
            origin,
        }
    }

    /// returns the next byte and advances by one
    pub fn take_byte(&mut self) -> Result<u8, DecodeError> {
        match self.data.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                Ok(b)
            }
            None => Err(DecodeError::StreamUnderflow(self.address())),
        }
    }

    pub fn take_u16(&mut self) -> Result<u16, DecodeError> {
        let lo = self.take_byte()?;
        let hi = self.take_byte()?;
        Ok(u16::from(hi) << 8 | u16::from(lo))
    }

    pub fn take_s8(&mut self) -> Result<i8, DecodeError> {
        Ok(self.take_byte()? as i8)
    }

    pub fn take_s16(&mut self) -> Result<i16, DecodeError> {
        Ok(self.take_u16()? as i16)
    }

    /// number of bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// absolute address of the next byte
    pub fn address(&self) -> usize {
        self.origin + self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}
