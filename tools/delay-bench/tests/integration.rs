/// Integration tests for the delay-bench CLI.
///
/// These drive the real binary end to end and verify the delay engine's
/// behavior through the WAV files it writes:
/// 1. Echoes land at the exact delay offset with g^n amplitudes
/// 2. Renders are deterministic
/// 3. WAV processing preserves the input where no echo is due
use std::process::Command;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-p", "delay-bench", "--"]);
    cmd
}

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(name)
}

#[test]
fn test_impulse_renders_expected_echoes() {
    let output_path = temp_path("delay_bench_impulse.wav");
    let _ = std::fs::remove_file(&output_path);

    let status = cargo_bin()
        .args([
            "impulse",
            "--rate", "8000",
            "--delay", "100",
            "--feedback", "0.5",
            "--duration", "0.5",
            "--block", "512",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("failed to run delay-bench");

    assert!(status.success(), "delay-bench exited with error");
    assert!(output_path.exists(), "WAV file not created");

    let reader = hound::WavReader::open(&output_path).expect("invalid WAV file");
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().sample_rate, 8000);
    assert_eq!(reader.spec().bits_per_sample, 24);

    let samples = read_wav_normalized(&output_path);
    assert_eq!(samples.len(), 4000);

    // 100 ms at 8 kHz = 800 samples per echo period.
    assert!((samples[0] - 1.0).abs() < 1e-3, "dry impulse: {}", samples[0]);
    assert!((samples[800] - 0.5).abs() < 1e-3, "echo 1: {}", samples[800]);
    assert!((samples[1600] - 0.25).abs() < 1e-3, "echo 2: {}", samples[1600]);
    assert!((samples[2400] - 0.125).abs() < 1e-3, "echo 3: {}", samples[2400]);
    for (i, &v) in samples.iter().enumerate() {
        if i % 800 != 0 {
            assert!(v.abs() < 1e-3, "unexpected output {v} at sample {i}");
        }
    }

    std::fs::remove_file(&output_path).ok();
}

#[test]
fn test_impulse_is_deterministic() {
    let path1 = temp_path("delay_bench_det_1.wav");
    let path2 = temp_path("delay_bench_det_2.wav");

    for path in [&path1, &path2] {
        let _ = std::fs::remove_file(path);
        let status = cargo_bin()
            .args(["impulse", "--rate", "8000", "--duration", "0.5", "--output"])
            .arg(path)
            .status()
            .expect("failed to run delay-bench");
        assert!(status.success());
    }

    let samples1 = read_wav_raw(&path1);
    let samples2 = read_wav_raw(&path2);
    assert_eq!(samples1, samples2, "two identical renders should match");

    std::fs::remove_file(&path1).ok();
    std::fs::remove_file(&path2).ok();
}

#[test]
fn test_decay_reports_cleanly() {
    let status = cargo_bin()
        .args([
            "decay",
            "--rate", "8000",
            "--delay", "50",
            "--feedback", "0.7",
            "--echoes", "5",
        ])
        .status()
        .expect("failed to run delay-bench");
    assert!(status.success());
}

#[test]
fn test_render_preserves_input_before_first_echo() {
    let input_path = temp_path("delay_bench_render_in.wav");
    let output_path = temp_path("delay_bench_render_out.wav");
    let _ = std::fs::remove_file(&output_path);

    // 0.25 s of a 440 Hz sine at 8 kHz. With a 2 s delay the first echo
    // falls beyond the file, so the output must equal the input.
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&input_path, spec).unwrap();
    let n = 2000;
    for i in 0..n {
        let v = (2.0 * std::f64::consts::PI * 440.0 * i as f64 / 8000.0).sin() * 0.5;
        writer.write_sample((v * 32767.0).round() as i16).unwrap();
    }
    writer.finalize().unwrap();

    let status = cargo_bin()
        .args(["render", "--delay", "2000", "--feedback", "0.5", "--input"])
        .arg(&input_path)
        .arg("--output")
        .arg(&output_path)
        .status()
        .expect("failed to run delay-bench");
    assert!(status.success());

    let input = read_wav_normalized(&input_path);
    let output = read_wav_normalized(&output_path);
    assert_eq!(output.len(), input.len());
    for (i, (&a, &b)) in input.iter().zip(&output).enumerate() {
        assert!(
            (a - b).abs() < 1e-3,
            "sample {i} changed before the first echo: {a} vs {b}"
        );
    }

    std::fs::remove_file(&input_path).ok();
    std::fs::remove_file(&output_path).ok();
}

fn read_wav_normalized(path: &std::path::Path) -> Vec<f64> {
    let mut reader = hound::WavReader::open(path).expect("failed to open WAV");
    let max_val = ((1i64 << (reader.spec().bits_per_sample - 1)) - 1) as f64;
    reader
        .samples::<i32>()
        .map(|s| s.unwrap() as f64 / max_val)
        .collect()
}

fn read_wav_raw(path: &std::path::Path) -> Vec<i32> {
    let mut reader = hound::WavReader::open(path).expect("failed to open WAV");
    reader.samples::<i32>().map(|s| s.unwrap()).collect()
}
