//! Core types shared across the tokencache crates.

pub mod credentials;
pub mod error;
pub mod token;
