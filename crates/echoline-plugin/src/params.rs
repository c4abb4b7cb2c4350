use std::sync::Arc;

use echoline_dsp::{DelayControls, MAX_DELAY_MS, MAX_FEEDBACK};
use nih_plug::prelude::*;

pub const DEFAULT_DELAY_MS: f32 = 500.0;
pub const DEFAULT_FEEDBACK: f32 = 0.4;

/// Host-facing parameters. Neither param carries a nih-plug smoother: the
/// engine ramps feedback across each block itself, and the ring buffer read
/// position quantizes to whole samples anyway.
#[derive(Params)]
pub struct EcholineParams {
    /// Delay time in milliseconds.
    #[id = "delay_ms"]
    pub delay_ms: FloatParam,

    /// Fraction of the delayed signal recirculated into the delay line.
    #[id = "feedback"]
    pub feedback: FloatParam,
}

impl EcholineParams {
    /// Parameter changes land in `controls` via the callbacks, from
    /// whatever thread the host delivers them on. The audio thread never
    /// reads the params directly.
    pub fn new(controls: &Arc<DelayControls>) -> Self {
        Self {
            delay_ms: FloatParam::new(
                "Delay Time",
                DEFAULT_DELAY_MS,
                FloatRange::Linear {
                    min: 0.0,
                    max: MAX_DELAY_MS,
                },
            )
            .with_unit(" ms")
            .with_step_size(1.0)
            .with_callback({
                let controls = Arc::clone(controls);
                Arc::new(move |ms| controls.set_delay_ms(ms))
            }),

            feedback: FloatParam::new(
                "Feedback",
                DEFAULT_FEEDBACK,
                FloatRange::Linear {
                    min: 0.0,
                    max: MAX_FEEDBACK,
                },
            )
            .with_unit(" %")
            .with_value_to_string(formatters::v2s_f32_percentage(0))
            .with_string_to_value(formatters::s2v_f32_percentage())
            .with_callback({
                let controls = Arc::clone(controls);
                Arc::new(move |gain| controls.set_feedback(gain))
            }),
        }
    }
}
