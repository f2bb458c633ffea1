#![allow(missing_docs)]

#[macro_use]
mod macros;

pub mod base;
pub mod codec;
pub mod persist;
