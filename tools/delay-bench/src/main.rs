/// Delay Bench — Echoline delay engine validation CLI.
///
/// Renders impulse responses and WAV files through the real engine, offline,
/// at whatever block size the caller asks for.
///
/// Usage:
///   delay-bench impulse [--rate R] [--delay MS] [--feedback G] [--duration S] [--block N] [--output FILE]
///   delay-bench decay   [--rate R] [--delay MS] [--feedback G] [--echoes N] [--block N]
///   delay-bench render  --input FILE --output FILE [--delay MS] [--feedback G] [--block N]
use std::sync::Arc;

use echoline_dsp::{DelayControls, DelayEngine};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "impulse" => cmd_impulse(&args[2..]),
        "decay" => cmd_decay(&args[2..]),
        "render" => cmd_render(&args[2..]),
        _ => {
            eprintln!("Unknown subcommand: {}", args[1]);
            print_usage();
        }
    }
}

fn print_usage() {
    eprintln!("Delay Bench — Echoline delay engine validation");
    eprintln!();
    eprintln!("Subcommands:");
    eprintln!("  impulse   Render an impulse response to WAV, print echo positions");
    eprintln!("  decay     Measure echo amplitudes against the expected g^n series");
    eprintln!("  render    Process an input WAV through the delay engine");
}

fn parse_flag(args: &[String], flag: &str, default: f64) -> f64 {
    for i in 0..args.len().saturating_sub(1) {
        if args[i] == flag {
            return args[i + 1].parse().unwrap_or(default);
        }
    }
    default
}

fn parse_flag_str<'a>(args: &'a [String], flag: &str, default: &'a str) -> &'a str {
    for i in 0..args.len().saturating_sub(1) {
        if args[i] == flag {
            return &args[i + 1];
        }
    }
    default
}

/// Build an engine prepared for the given configuration.
fn make_engine(delay_ms: f64, feedback: f64, sample_rate: f64, channels: usize) -> DelayEngine {
    let controls = Arc::new(DelayControls::new(delay_ms as f32, feedback as f32));
    let mut engine = DelayEngine::new(controls);
    engine.prepare(sample_rate, 8192, channels);
    engine
}

/// Push channel-major buffers through the engine in fixed-size blocks,
/// in place, the way a host would.
fn process_buffers(engine: &mut DelayEngine, lanes: &mut [Vec<f32>], block_size: usize) {
    let num_inputs = lanes.len();
    let len = lanes.first().map(|l| l.len()).unwrap_or(0);
    let mut start = 0;
    while start < len {
        let end = (start + block_size).min(len);
        let mut block: Vec<&mut [f32]> = lanes.iter_mut().map(|l| &mut l[start..end]).collect();
        engine.process_block(&mut block, num_inputs);
        start = end;
    }
}

// ─── Impulse response ───────────────────────────────────────────────────────

fn cmd_impulse(args: &[String]) {
    let rate = parse_flag(args, "--rate", 48000.0);
    let delay_ms = parse_flag(args, "--delay", 500.0);
    let feedback = parse_flag(args, "--feedback", 0.5);
    let duration = parse_flag(args, "--duration", 2.0);
    let block = parse_flag(args, "--block", 512.0) as usize;
    let output_path = parse_flag_str(args, "--output", "impulse.wav");

    let n_samples = (rate * duration) as usize;
    let mut lanes = vec![vec![0.0f32; n_samples]];
    lanes[0][0] = 1.0;

    let mut engine = make_engine(delay_ms, feedback, rate, 1);
    process_buffers(&mut engine, &mut lanes, block);

    println!("Impulse response");
    println!("  Rate:      {rate:.0} Hz");
    println!("  Delay:     {delay_ms:.1} ms ({:.0} samples)", delay_ms * rate / 1000.0);
    println!("  Feedback:  {feedback:.2}");
    println!("  Block:     {block}");
    println!("  Echoes:");
    for (i, &v) in lanes[0].iter().enumerate() {
        if v.abs() > 1e-4 {
            println!("    t={i} amp={v:.6}");
        }
    }

    write_wav(output_path, &lanes[0], rate as u32);
    println!("  Output:    {output_path}");
}

// ─── Echo decay measurement ─────────────────────────────────────────────────

fn cmd_decay(args: &[String]) {
    let rate = parse_flag(args, "--rate", 48000.0);
    let delay_ms = parse_flag(args, "--delay", 250.0);
    let feedback = parse_flag(args, "--feedback", 0.5);
    let echoes = parse_flag(args, "--echoes", 4.0) as usize;
    let block = parse_flag(args, "--block", 512.0) as usize;

    let delay_samples = (delay_ms * rate / 1000.0).round() as usize;
    let n_samples = delay_samples * (echoes + 1);
    let mut lanes = vec![vec![0.0f32; n_samples]];
    lanes[0][0] = 1.0;

    let mut engine = make_engine(delay_ms, feedback, rate, 1);
    process_buffers(&mut engine, &mut lanes, block);

    println!("Echo decay (delay {delay_samples} samples, feedback {feedback:.2})");
    println!("{:>5}  {:>10}  {:>10}  {:>10}", "Echo", "Expected", "Measured", "Delta");
    let mut worst = 0.0f64;
    for n in 1..=echoes {
        let expected = feedback.powi(n as i32);
        let measured = lanes[0][delay_samples * n] as f64;
        let delta = measured - expected;
        worst = worst.max(delta.abs());
        println!("{n:>5}  {expected:>10.6}  {measured:>10.6}  {delta:>+10.2e}");
    }
    println!("Worst deviation: {worst:.2e}");
}

// ─── Offline WAV processing ─────────────────────────────────────────────────

fn cmd_render(args: &[String]) {
    let delay_ms = parse_flag(args, "--delay", 500.0);
    let feedback = parse_flag(args, "--feedback", 0.5);
    let block = parse_flag(args, "--block", 512.0) as usize;
    let input_path = parse_flag_str(args, "--input", "");
    let output_path = parse_flag_str(args, "--output", "delayed.wav");

    if input_path.is_empty() {
        eprintln!("render requires --input FILE");
        std::process::exit(1);
    }

    let mut reader = hound::WavReader::open(input_path).expect("failed to open input WAV");
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().map(|s| s.unwrap()).collect(),
        hound::SampleFormat::Int => {
            let max_val = ((1i64 << (spec.bits_per_sample - 1)) - 1) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.unwrap() as f32 / max_val)
                .collect()
        }
    };

    let frames = interleaved.len() / channels;
    let mut lanes: Vec<Vec<f32>> = (0..channels).map(|_| Vec::with_capacity(frames)).collect();
    for frame in interleaved.chunks_exact(channels) {
        for (lane, &s) in lanes.iter_mut().zip(frame) {
            lane.push(s);
        }
    }

    let mut engine = make_engine(delay_ms, feedback, spec.sample_rate as f64, channels);
    process_buffers(&mut engine, &mut lanes, block);

    let out_spec = hound::WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: 24,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer =
        hound::WavWriter::create(output_path, out_spec).expect("failed to create output WAV");
    let max_val = (1 << 23) - 1;
    for i in 0..frames {
        for lane in &lanes {
            let scaled = (lane[i] as f64 * max_val as f64).round() as i32;
            writer
                .write_sample(scaled.clamp(-max_val, max_val))
                .expect("failed to write sample");
        }
    }
    writer.finalize().expect("failed to finalize WAV");

    println!("Render complete");
    println!("  Input:     {input_path} ({frames} frames, {channels} ch)");
    println!("  Delay:     {delay_ms:.1} ms, feedback {feedback:.2}");
    println!("  Output:    {output_path}");
}

fn write_wav(path: &str, samples: &[f32], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 24,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("failed to create WAV file");
    let max_val = (1 << 23) - 1;
    for &s in samples {
        let scaled = (s as f64 * max_val as f64).round() as i32;
        writer
            .write_sample(scaled.clamp(-max_val, max_val))
            .expect("failed to write sample");
    }
    writer.finalize().expect("failed to finalize WAV");
}
