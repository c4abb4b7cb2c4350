// Echoline — delay effect plugin (CLAP + VST3).

use echoline_dsp::{DelayControls, DelayEngine};
use nih_plug::prelude::*;
use std::num::NonZeroU32;
use std::sync::Arc;

mod params;
use params::{DEFAULT_DELAY_MS, DEFAULT_FEEDBACK, EcholineParams};

struct Echoline {
    params: Arc<EcholineParams>,
    engine: DelayEngine,
    sample_rate: f64,
}

impl Default for Echoline {
    fn default() -> Self {
        let controls = Arc::new(DelayControls::new(DEFAULT_DELAY_MS, DEFAULT_FEEDBACK));
        Self {
            params: Arc::new(EcholineParams::new(&controls)),
            engine: DelayEngine::new(controls),
            sample_rate: 44100.0,
        }
    }
}

impl Plugin for Echoline {
    const NAME: &'static str = "Echoline";
    const VENDOR: &'static str = "Echoline Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;
    const SAMPLE_ACCURATE_AUTOMATION: bool = true;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        self.sample_rate = buffer_config.sample_rate as f64;
        let num_channels = audio_io_layout
            .main_input_channels
            .map(|c| c.get() as usize)
            .unwrap_or(2);

        self.engine.prepare(
            self.sample_rate,
            buffer_config.max_buffer_size as usize,
            num_channels,
        );
        true
    }

    fn reset(&mut self) {
        // Clear history so stale echoes don't bleed into the next run.
        self.engine.reset();
    }

    fn deactivate(&mut self) {
        self.engine.release();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let num_channels = buffer.channels();
        self.engine.process_block(buffer.as_slice(), num_channels);

        // Keep the host calling process() until the feedback tail has
        // decayed below -60 dB: the level after n echoes is feedback^n,
        // so n = log(0.001) / log(feedback).
        let controls = self.engine.controls();
        let delay_samples = (controls.delay_ms() as f64 * self.sample_rate / 1000.0).round();
        let feedback = controls.feedback() as f64;
        let tail_samples = if feedback > 0.001 {
            delay_samples * (-3.0 / feedback.log10())
        } else {
            delay_samples
        };

        ProcessStatus::Tail(tail_samples as u32)
    }
}

impl ClapPlugin for Echoline {
    const CLAP_ID: &'static str = "com.echoline-audio.echoline";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Delay effect with feedback recirculation");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for Echoline {
    const VST3_CLASS_ID: [u8; 16] = *b"EcholineDelayFx1";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Delay];
}

nih_export_clap!(Echoline);
nih_export_vst3!(Echoline);
