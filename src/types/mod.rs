//! Core types shared by the gateway, tools, and engine.

pub mod message;
pub mod usage;

pub use message::*;
pub use usage::*;
