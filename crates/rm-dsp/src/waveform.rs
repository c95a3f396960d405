//! Single-cycle waveform generators used to fill wavetables.
//!
//! Every generator maps an angle in `[0, 2π)` to a value in `[-1, 1]`.

use core::f64::consts::TAU;

/// Built-in carrier shapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(rename_all = "lowercase"))]
pub enum Waveform {
    /// Pure sidebands, the classic ring modulator.
    #[default]
    Sine,
    Triangle,
    #[cfg_attr(feature = "serde", serde(alias = "saw"))]
    Sawtooth,
    Square,
}

impl Waveform {
    /// All variants, in display order.
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Triangle,
        Waveform::Sawtooth,
        Waveform::Square,
    ];

    /// Evaluate the waveform at `angle` radians. The shape is computed in
    /// f64 and rounded once to f32.
    pub fn sample(self, angle: f64) -> f32 {
        let value = match self {
            Waveform::Sine => libm::sin(angle),
            Waveform::Triangle => {
                let phase = unit_phase(angle);
                if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                }
            }
            Waveform::Sawtooth => 2.0 * unit_phase(angle) - 1.0,
            Waveform::Square => {
                if unit_phase(angle) < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        };
        value as f32
    }

    /// Lowercase name, as accepted by [`Waveform::from_name`].
    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Triangle => "triangle",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Square => "square",
        }
    }

    /// Parse a waveform name (case-insensitive). `saw` is accepted for sawtooth.
    pub fn from_name(name: &str) -> Option<Self> {
        let matches = |s: &str| name.eq_ignore_ascii_case(s);
        if matches("sine") {
            Some(Waveform::Sine)
        } else if matches("triangle") {
            Some(Waveform::Triangle)
        } else if matches("sawtooth") || matches("saw") {
            Some(Waveform::Sawtooth)
        } else if matches("square") {
            Some(Waveform::Square)
        } else {
            None
        }
    }
}

/// Map an angle onto `[0, 1)` of one cycle.
fn unit_phase(angle: f64) -> f64 {
    let p = angle / TAU;
    p - libm::floor(p)
}
