/// Cross-thread control cells for the delay engine.
///
/// The control surface (UI/host automation) writes, the audio thread reads.
/// Each value is a single `f32` stored as its bit pattern in an `AtomicU32`,
/// so both sides are lock-free and wait-free: no torn reads, no compound
/// transactions. No ordering is needed between the two cells — both are
/// continuous physical quantities that tolerate one block of staleness,
/// hence `Relaxed`.
///
/// The store holds plain scalars; it never interpolates. Click-free
/// transitions are the engine's per-block gain ramp.
use std::sync::atomic::{AtomicU32, Ordering};

/// Upper bound for the delay time, matching the 2-second history horizon.
pub const MAX_DELAY_MS: f32 = 2000.0;

/// Feedback must stay strictly below unity or the loop never decays.
pub const MAX_FEEDBACK: f32 = 0.99;

pub struct DelayControls {
    delay_ms: AtomicU32,
    feedback: AtomicU32,
}

impl DelayControls {
    pub fn new(delay_ms: f32, feedback: f32) -> Self {
        let controls = Self {
            delay_ms: AtomicU32::new(0),
            feedback: AtomicU32::new(0),
        };
        controls.set_delay_ms(delay_ms);
        controls.set_feedback(feedback);
        controls
    }

    /// Set the delay time in milliseconds, silently clamped to
    /// `[0, MAX_DELAY_MS]`. Momentarily out-of-range UI input must never
    /// interrupt audio, so there is no error path here.
    pub fn set_delay_ms(&self, ms: f32) {
        let ms = ms.clamp(0.0, MAX_DELAY_MS);
        self.delay_ms.store(ms.to_bits(), Ordering::Relaxed);
    }

    pub fn delay_ms(&self) -> f32 {
        f32::from_bits(self.delay_ms.load(Ordering::Relaxed))
    }

    /// Set the feedback gain, silently clamped to `[0, MAX_FEEDBACK]`.
    pub fn set_feedback(&self, gain: f32) {
        let gain = gain.clamp(0.0, MAX_FEEDBACK);
        self.feedback.store(gain.to_bits(), Ordering::Relaxed);
    }

    pub fn feedback(&self) -> f32 {
        f32::from_bits(self.feedback.load(Ordering::Relaxed))
    }
}

impl Default for DelayControls {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_values_round_trip() {
        let controls = DelayControls::new(500.0, 0.5);
        assert_eq!(controls.delay_ms(), 500.0);
        assert_eq!(controls.feedback(), 0.5);
    }

    #[test]
    fn test_out_of_range_writes_clamp_silently() {
        let controls = DelayControls::default();

        controls.set_delay_ms(-10.0);
        assert_eq!(controls.delay_ms(), 0.0);
        controls.set_delay_ms(1.0e9);
        assert_eq!(controls.delay_ms(), MAX_DELAY_MS);

        controls.set_feedback(-0.2);
        assert_eq!(controls.feedback(), 0.0);
        controls.set_feedback(1.0);
        assert_eq!(controls.feedback(), MAX_FEEDBACK);
    }

    #[test]
    fn test_writes_from_another_thread_become_visible() {
        let controls = Arc::new(DelayControls::default());
        let writer = {
            let controls = Arc::clone(&controls);
            std::thread::spawn(move || {
                controls.set_delay_ms(250.0);
                controls.set_feedback(0.75);
            })
        };
        writer.join().unwrap();
        assert_eq!(controls.delay_ms(), 250.0);
        assert_eq!(controls.feedback(), 0.75);
    }
}
