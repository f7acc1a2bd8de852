// these modules are re-exported as a single module

pub use self::mmu::*;
mod mmu;
