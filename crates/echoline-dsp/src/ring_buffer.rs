/// Fixed-capacity circular sample history, one lane per channel.
///
/// All addressing is modulo the capacity. Storage is allocated once in
/// `resize` (prepare time) and never grows afterward; the block-rate
/// operations `write_range` and `read_range_additive` are bounded,
/// allocation-free, and lock-free.
use std::ops::Range;

/// Split a possibly-wrapping range into its two contiguous pieces.
///
/// The first range covers the tail of the buffer starting at `start`; the
/// second covers whatever spills past the end, wrapped back to index 0.
/// The second range is empty when no wrap occurs.
///
/// `start` must be below `capacity` and `count` at most `capacity`.
pub fn wrap_split(start: usize, count: usize, capacity: usize) -> (Range<usize>, Range<usize>) {
    debug_assert!(start < capacity);
    debug_assert!(count <= capacity);
    let tail = count.min(capacity - start);
    (start..start + tail, 0..count - tail)
}

pub struct RingBuffer {
    /// One contiguous sample store per channel.
    lanes: Vec<Vec<f32>>,
    /// Fixed capacity in samples, shared by all lanes.
    capacity: usize,
}

impl RingBuffer {
    /// An empty buffer. Unusable until `resize` gives it a capacity.
    pub fn new() -> Self {
        Self {
            lanes: Vec::new(),
            capacity: 0,
        }
    }

    /// Reallocate storage for `channels` lanes of `capacity` samples each,
    /// zero-filled. Invalidates any in-flight cursor; the caller must reset
    /// its write position to 0. Must not be called while a block is being
    /// processed.
    pub fn resize(&mut self, channels: usize, capacity: usize) {
        self.lanes = (0..channels).map(|_| vec![0.0; capacity]).collect();
        self.capacity = capacity;
    }

    /// Zero-fill every lane without touching the allocation.
    pub fn clear(&mut self) {
        for lane in &mut self.lanes {
            lane.fill(0.0);
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn num_channels(&self) -> usize {
        self.lanes.len()
    }

    /// Copy `src` into the lane starting at `start`, wrapping to index 0
    /// past the end. At most two contiguous copies.
    pub fn write_range(&mut self, channel: usize, start: usize, src: &[f32]) {
        let (tail, head) = wrap_split(start, src.len(), self.capacity);
        let split = tail.len();
        let lane = &mut self.lanes[channel];
        lane[tail].copy_from_slice(&src[..split]);
        if !head.is_empty() {
            lane[head].copy_from_slice(&src[split..]);
        }
    }

    /// Add (not overwrite) lane contents starting at `start` into `dst`,
    /// under a gain ramped linearly from `gain_start` toward `gain_end`
    /// across the range. The ramp runs through the tail/head split as if
    /// the range were contiguous.
    ///
    /// Sample `i` gets gain `gain_start + (gain_end - gain_start) * i / len`,
    /// so the final sample sits one step short of `gain_end` — the next
    /// block picks up from there.
    pub fn read_range_additive(
        &self,
        channel: usize,
        start: usize,
        dst: &mut [f32],
        gain_start: f32,
        gain_end: f32,
    ) {
        let count = dst.len();
        if count == 0 {
            return;
        }
        let step = (gain_end - gain_start) / count as f32;

        let (tail, head) = wrap_split(start, count, self.capacity);
        let split = tail.len();
        let lane = &self.lanes[channel];
        for (i, (out, &s)) in dst[..split].iter_mut().zip(&lane[tail]).enumerate() {
            *out += s * (gain_start + step * i as f32);
        }
        for (i, (out, &s)) in dst[split..].iter_mut().zip(&lane[head]).enumerate() {
            *out += s * (gain_start + step * (split + i) as f32);
        }
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new()
    }
}
