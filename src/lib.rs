#![allow(clippy::verbose_bit_mask)]

#[macro_use]
extern crate bitflags;

#[macro_use]
extern crate log;

#[macro_use]
extern crate quick_error;

#[macro_use]
extern crate serde_derive;

#[cfg(test)]
extern crate pretty_assertions;

pub mod config;
pub mod cpu;
pub mod error;
pub mod hex;
pub mod machine;
pub mod memory;
pub mod string;
