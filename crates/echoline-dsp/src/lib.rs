//! Echoline DSP library — real-time delay-line effect engine.
//!
//! Pure DSP with no audio framework dependencies. The audio path
//! (`DelayEngine::process_block` and everything below it) never blocks,
//! allocates, or panics on valid input.

pub mod controls;
pub mod engine;
pub mod ring_buffer;

pub use controls::{DelayControls, MAX_DELAY_MS, MAX_FEEDBACK};
pub use engine::{DelayEngine, MAX_DELAY_SECONDS};
pub use ring_buffer::RingBuffer;
