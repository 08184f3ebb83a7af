use serde::{Deserialize, Serialize};

/// Number of coefficients in one MFCC vector
pub const MFCC_LENGTH: usize = 13;

pub const DEFAULT_AVERAGE_PITCH: f64 = 120.0;
pub const DEFAULT_PITCH_STD_DEV: f64 = 15.0;

/// Compact numeric description of a speaking voice.
///
/// Always carries at least one coefficient vector; constructors replace an
/// empty coefficient set with a single zero vector. Equality is field-wise and
/// element-wise over every coefficient vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "VoiceProfileRecord")]
pub struct VoiceProfile {
    #[serde(rename = "averagePitch")]
    average_pitch: f64,
    #[serde(rename = "pitchStdDev")]
    pitch_std_dev: f64,
    #[serde(rename = "mfccValues")]
    mfcc_coefficients: Vec<Vec<f64>>,
}

/// Wire shape used when reading a stored profile back
#[derive(Deserialize)]
struct VoiceProfileRecord {
    #[serde(rename = "averagePitch")]
    average_pitch: f64,
    #[serde(rename = "pitchStdDev")]
    pitch_std_dev: f64,
    #[serde(rename = "mfccValues", default)]
    mfcc_coefficients: Vec<Vec<f64>>,
}

impl From<VoiceProfileRecord> for VoiceProfile {
    fn from(record: VoiceProfileRecord) -> Self {
        Self::new(
            record.average_pitch,
            record.pitch_std_dev,
            record.mfcc_coefficients,
        )
    }
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            average_pitch: DEFAULT_AVERAGE_PITCH,
            pitch_std_dev: DEFAULT_PITCH_STD_DEV,
            mfcc_coefficients: vec![Self::zero_vector()],
        }
    }
}

impl VoiceProfile {
    pub fn new(average_pitch: f64, pitch_std_dev: f64, mfcc_coefficients: Vec<Vec<f64>>) -> Self {
        let mfcc_coefficients = if mfcc_coefficients.is_empty() {
            vec![Self::zero_vector()]
        } else {
            mfcc_coefficients
        };

        Self {
            average_pitch,
            pitch_std_dev,
            mfcc_coefficients,
        }
    }

    pub fn zero_vector() -> Vec<f64> {
        vec![0.0; MFCC_LENGTH]
    }

    pub fn average_pitch(&self) -> f64 {
        self.average_pitch
    }

    pub fn pitch_std_dev(&self) -> f64 {
        self.pitch_std_dev
    }

    pub fn mfcc_coefficients(&self) -> &[Vec<f64>] {
        &self.mfcc_coefficients
    }

    /// Similarity in (0.0, 1.0], 1.0 meaning identical.
    ///
    /// Pitch statistics are compared as a normalized euclidean distance and
    /// weighted 0.7; the first coefficient vectors are compared over their
    /// shared length and weighted 0.3.
    pub fn similarity(&self, other: &VoiceProfile) -> f64 {
        let pitch_distance = ((self.average_pitch - other.average_pitch).powi(2) / 100.0
            + (self.pitch_std_dev - other.pitch_std_dev).powi(2) / 25.0)
            .sqrt();

        let mfcc_distance = match (
            self.mfcc_coefficients.first(),
            other.mfcc_coefficients.first(),
        ) {
            (Some(left), Some(right)) => {
                let shared = left.len().min(right.len());
                if shared == 0 {
                    0.0
                } else {
                    let sum_squared: f64 = left
                        .iter()
                        .zip(right.iter())
                        .map(|(a, b)| (a - b).powi(2))
                        .sum();
                    sum_squared.sqrt() / shared as f64
                }
            }
            _ => 0.0,
        };

        let combined = pitch_distance * 0.7 + mfcc_distance * 0.3;
        1.0 / (1.0 + combined)
    }
}
