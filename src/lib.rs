#![cfg_attr(not(any(test, doctest, feature = "std")), no_std)]
#![doc = include_str!("../README.md")]

mod num;
pub use num::*;
mod process;
pub use process::*;
mod config;
pub use config::*;
pub use miniconf::Leaf;
mod cic;
pub use cic::*;
mod strobe;
pub use strobe::*;
mod edge;
pub use edge::*;
mod pdm;
pub use pdm::*;
mod pipeline;
pub use pipeline::*;
mod clock;
pub use clock::*;
mod i2s;
pub use i2s::*;
mod converter;
pub use converter::*;

#[cfg(test)]
pub mod testing;
