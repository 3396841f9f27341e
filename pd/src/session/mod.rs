//! Streaming session
//!
//! Task-per-request streaming of model output as discrete events, plus the
//! wire framing handed to the transport.

mod runner;
mod wire;

pub use runner::{SessionRunner, StreamEvent};
pub use wire::{DONE_FRAME, sse_frames};
