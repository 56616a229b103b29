//! Core types shared by the agent loop, provider, and transport.

pub mod event;
pub mod generation;
pub mod message;

pub use event::*;
pub use generation::*;
pub use message::*;
