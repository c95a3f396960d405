//! End-to-end behaviour of the engine and the offline renderer.

use rm_dsp::{Waveform, WavetableOscillator};
use rm_engine::{AudioBuffer, EngineConfig, RingModEngine};
use rm_host::{load_wav, render_offline, wav_to_bytes, Controller, Settings, WavData};

const SR: f64 = 48000.0;

/// The carrier a 1024-entry sine table should produce, computed by hand:
/// `sin(2π·i/N)` in double precision, stored as f32.
fn expected_carrier(frames: usize, frequency: f64, amplitude: f32) -> Vec<f32> {
    let table: Vec<f32> = (0..1024)
        .map(|i| libm::sin(std::f64::consts::TAU * i as f64 / 1024.0) as f32)
        .collect();
    let increment = frequency * 1024.0 / SR;
    let mut phase = 0.0f64;
    (0..frames)
        .map(|_| {
            let v = amplitude * table[phase as usize];
            phase = (phase + increment) % 1024.0;
            v
        })
        .collect()
}

#[test]
fn unit_input_yields_scaled_carrier_bit_for_bit() {
    let mut engine = RingModEngine::default();
    engine.prepare(SR, 512).unwrap();
    engine.set_frequency(440.0);
    engine.set_amplitude(0.5);
    engine.set_enabled(true);

    let mut buf = AudioBuffer::new(1, 480);
    buf.channel_mut(0).fill(1.0);
    engine.process(&mut buf);

    let expected = expected_carrier(480, 440.0, 0.5);
    for (s, (&got, &want)) in buf.channel(0).iter().zip(&expected).enumerate() {
        assert_eq!(got.to_bits(), want.to_bits(), "frame {}: {} vs {}", s, got, want);
    }
}

#[test]
fn carrier_is_continuous_across_blocks() {
    let mut engine = RingModEngine::default();
    engine.prepare(SR, 64).unwrap();

    let mut out = Vec::new();
    for len in [100, 7, 64, 309] {
        let mut buf = AudioBuffer::new(1, len);
        buf.channel_mut(0).fill(1.0);
        engine.process(&mut buf);
        out.extend_from_slice(buf.channel(0));
    }
    assert_eq!(out, expected_carrier(480, 440.0, 0.5));
}

#[test]
fn bypass_passes_input_and_free_runs_the_carrier() {
    let mut engine = RingModEngine::default();
    engine.prepare(SR, 256).unwrap();

    let input: Vec<f32> = (0..256).map(|i| (i as f32 * 0.37).sin() * 0.8 - 0.1).collect();
    engine.set_enabled(false);
    let mut buf = AudioBuffer::new(2, 256);
    buf.channel_mut(0).copy_from_slice(&input);
    buf.channel_mut(1).copy_from_slice(&input);
    engine.process(&mut buf);
    for ch in 0..2 {
        let same = buf.channel(ch).iter().zip(&input).all(|(a, b)| a.to_bits() == b.to_bits());
        assert!(same, "channel {} altered while bypassed", ch);
    }

    let mut reference = WavetableOscillator::new(SR, 1024, |a| Waveform::Sine.sample(a)).unwrap();
    reference.set_frequency(440.0);
    for _ in 0..256 {
        reference.advance();
    }
    let osc = engine.oscillator().unwrap();
    assert_eq!(osc.phase(), reference.phase());

    // Re-enabled output continues from the free-run phase.
    engine.set_enabled(true);
    let mut buf = AudioBuffer::new(1, 224);
    buf.channel_mut(0).fill(1.0);
    engine.process(&mut buf);
    let full = expected_carrier(480, 440.0, 0.5);
    assert_eq!(buf.channel(0), &full[256..]);
}

#[test]
fn offline_render_of_unit_file_matches_carrier() {
    let input = WavData::new(48000, vec![vec![1.0; 480]]);
    let mut engine = RingModEngine::new(EngineConfig::default());
    let out = render_offline(&mut engine, &input, 100).unwrap();
    assert_eq!(out.channels[0], expected_carrier(480, 440.0, 0.5));
}

#[test]
fn controller_renders_encoded_wav() {
    let settings = Settings { frequency: 1000.0, amplitude: 1.0, ..Settings::default() };
    let input = WavData::new(44100, vec![vec![0.5; 2048], vec![-0.5; 2048]]);
    let bytes = Controller::new(settings).render_bytes(&wav_to_bytes(&input).unwrap()).unwrap();

    let out = load_wav(&bytes).unwrap();
    assert_eq!(out.sample_rate, 44100);
    assert_eq!(out.frames(), 2048);
    // Both channels see the same carrier with opposite-sign input.
    for (l, r) in out.channels[0].iter().zip(&out.channels[1]) {
        assert!((l + r).abs() <= 1.0 / 32768.0 + f32::EPSILON, "{} vs {}", l, r);
    }
    let peak = out.channels[0].iter().fold(0.0f32, |m, s| m.max(s.abs()));
    assert!(peak > 0.45 && peak <= 0.5 + 1e-3, "peak {}", peak);
}

#[test]
fn bypassed_controller_render_is_transparent_to_one_lsb() {
    let settings = Settings { enabled: false, ..Settings::default() };
    let input = WavData::new(22050, vec![(0..1000).map(|i| (i as f32 / 50.0).sin() * 0.9).collect()]);
    let encoded = wav_to_bytes(&input).unwrap();
    let rendered = Controller::new(settings).render_bytes(&encoded).unwrap();

    let before = load_wav(&encoded).unwrap();
    let after = load_wav(&rendered).unwrap();
    assert_eq!(after.frames(), 1000);
    for (a, b) in before.channels[0].iter().zip(&after.channels[0]) {
        assert!((a - b).abs() <= 1.0 / 32768.0 + f32::EPSILON, "{} vs {}", a, b);
    }
}
