/// Block-based delay effect with feedback recirculation.
///
/// Per channel, per block, the engine runs a fixed three-step sequence
/// against the shared ring buffer:
///
///   1. Fill: the incoming block enters the history at the write cursor.
///   2. Read-with-feedback: the block written `delay_samples` ago is added
///      into the output under a linear gain ramp.
///   3. Re-fill: the mixed block replaces the dry one at the same cursor,
///      so later reads hear the echo of the echo.
///
/// The write cursor is shared by all channels and advances exactly once
/// per block, after every channel has been processed — never mid-loop.
/// Each channel therefore computes its read position from the same cursor,
/// and channels could be processed in any order without changing output.
use std::sync::Arc;

use crate::controls::DelayControls;
use crate::ring_buffer::RingBuffer;

/// History horizon: the ring buffer holds this many seconds per channel.
pub const MAX_DELAY_SECONDS: f64 = 2.0;

pub struct DelayEngine {
    ring: RingBuffer,
    /// Shared write cursor, in `[0, capacity)`. The only engine state that
    /// persists across blocks besides the history itself.
    write_pos: usize,
    sample_rate: f64,
    controls: Arc<DelayControls>,
    /// Feedback gain applied at the end of the previous block; the ramp
    /// for the next block starts here.
    prev_feedback: f32,
}

impl DelayEngine {
    pub fn new(controls: Arc<DelayControls>) -> Self {
        let prev_feedback = controls.feedback();
        Self {
            ring: RingBuffer::new(),
            write_pos: 0,
            sample_rate: 44100.0,
            controls,
            prev_feedback,
        }
    }

    pub fn controls(&self) -> &Arc<DelayControls> {
        &self.controls
    }

    /// Ring buffer capacity in samples. 0 until `prepare` is called.
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Size the history for `MAX_DELAY_SECONDS` at the given rate and reset
    /// all state: storage zero-filled, cursor at 0. Idempotent for identical
    /// arguments. The host must not call this concurrently with
    /// `process_block`; that contract is not defended at runtime.
    pub fn prepare(&mut self, sample_rate: f64, _max_block_size: usize, channels: usize) {
        self.sample_rate = sample_rate;
        let capacity = (sample_rate * MAX_DELAY_SECONDS) as usize;
        self.ring.resize(channels, capacity);
        self.write_pos = 0;
        self.prev_feedback = self.controls.feedback();
    }

    /// Drop the history storage. The engine is inert until the next
    /// `prepare`.
    pub fn release(&mut self) {
        self.ring.resize(0, 0);
        self.write_pos = 0;
    }

    /// Clear the history without reallocating (playback stop/start), so
    /// stale echoes do not bleed into the next run.
    pub fn reset(&mut self) {
        self.ring.clear();
        self.write_pos = 0;
        self.prev_feedback = self.controls.feedback();
    }

    /// Process one block in place. `block` holds one equal-length slice per
    /// output channel; the first `num_inputs` of them carry input, the rest
    /// are cleared to silence. Does nothing until `prepare` has been called.
    ///
    /// Not re-entrant: the host invokes this serially, once per block.
    pub fn process_block(&mut self, block: &mut [&mut [f32]], num_inputs: usize) {
        let capacity = self.ring.capacity();
        if capacity == 0 || block.is_empty() {
            return;
        }
        let block_len = block[0].len();
        if block_len == 0 {
            return;
        }
        debug_assert!(block_len <= capacity);

        // Output channels with no corresponding input produce silence.
        for data in block.iter_mut().skip(num_inputs) {
            data.fill(0.0);
        }

        // One atomic load per value per block. Reading once up front keeps
        // every channel's read position and gain ramp consistent within the
        // block; both values tolerate one block of staleness.
        let delay_ms = self.controls.delay_ms();
        let feedback = self.controls.feedback();
        let delay_samples = ((delay_ms as f64 * self.sample_rate / 1000.0).round() as usize)
            .min(capacity - 1);

        let channels = num_inputs.min(self.ring.num_channels()).min(block.len());
        for (channel, data) in block.iter_mut().take(channels).enumerate() {
            self.process_channel(channel, data, delay_samples, self.prev_feedback, feedback);
        }
        self.prev_feedback = feedback;

        // Single cursor advance, after every channel has seen this block.
        self.write_pos = (self.write_pos + block_len) % capacity;
    }

    fn process_channel(
        &mut self,
        channel: usize,
        data: &mut [f32],
        delay_samples: usize,
        gain_start: f32,
        gain_end: f32,
    ) {
        // Fill: the dry block enters the history at the shared cursor.
        self.ring.write_range(channel, self.write_pos, data);

        // Read-with-feedback: pull the past into the output. Adding
        // `capacity` before subtracting keeps the index nonnegative.
        let capacity = self.ring.capacity();
        let read_pos = (self.write_pos + capacity - delay_samples) % capacity;
        self.ring
            .read_range_additive(channel, read_pos, data, gain_start, gain_end);

        // Re-fill: the mixed block closes the feedback loop.
        self.ring.write_range(channel, self.write_pos, data);
    }
}
