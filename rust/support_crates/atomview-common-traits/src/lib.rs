//! Traits and definitions shared by the atomview support crates.
//!
//! # Modules
//!
//! - [`memory_owner`]: Traits for owners of aligned memory regions that are
//!   handed out to shared, atomically accessed byte regions

pub mod memory_owner;
