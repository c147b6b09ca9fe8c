//! Command implementations for the ssrmine CLI

pub mod compare;
pub mod mine;
