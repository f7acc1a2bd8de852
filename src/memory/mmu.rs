use crate::hex::hex_bytes_separated;

#[cfg(test)]
#[path = "./mmu_test.rs"]
mod mmu_test;

/// 1 MiB, the full 20-bit address space
pub const MEMORY_SIZE: usize = 0x10_0000;

/// Flat byte-addressed memory. Addresses wrap at the end of the buffer.
#[derive(Clone)]
pub struct MMU {
    memory: Vec<u8>,
}

impl MMU {
    pub fn default() -> Self {
        MMU::new(MEMORY_SIZE)
    }

    pub fn new(size: usize) -> Self {
        MMU {
            memory: vec![0u8; size],
        }
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    fn index(&self, addr: u32) -> usize {
        addr as usize % self.memory.len()
    }

    pub fn read_u8(&self, addr: u32) -> u8 {
        self.memory[self.index(addr)]
    }

    pub fn read_u16(&self, addr: u32) -> u16 {
        u16::from(self.read_u8(addr.wrapping_add(1))) << 8 | u16::from(self.read_u8(addr))
    }

    pub fn write_u8(&mut self, addr: u32, data: u8) {
        let i = self.index(addr);
        self.memory[i] = data;
    }

    pub fn write_u16(&mut self, addr: u32, data: u16) {
        self.write_u8(addr, data as u8);
        self.write_u8(addr.wrapping_add(1), (data >> 8) as u8);
    }

    /// returns up to `length` bytes starting at `addr`, cut short at the end of memory
    pub fn read(&self, addr: u32, length: usize) -> &[u8] {
        let start = self.index(addr);
        let end = (start + length).min(self.memory.len());
        &self.memory[start..end]
    }

    /// writes `data` at `addr`; the caller guarantees it fits
    pub fn write(&mut self, addr: u32, data: &[u8]) {
        let start = self.index(addr);
        trace!("write to {:06X} in {} bytes: {}", start, data.len(), hex_bytes_separated(data, ' '));
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    /// zero-fills everything from `addr` to the end of memory
    pub fn clear_from(&mut self, addr: usize) {
        if addr < self.memory.len() {
            for b in &mut self.memory[addr..] {
                *b = 0;
            }
        }
    }
}
