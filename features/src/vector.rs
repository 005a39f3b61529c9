use serde::{Deserialize, Serialize};

use crate::config::{CENTROID_INDEX, DELTA_RANGE, FEATURE_LEN, MFCC_RANGE, ZCR_INDEX};
use crate::FeatureError;

/// Fixed-layout summary of one audio clip.
///
/// Always exactly [`FEATURE_LEN`] values:
///
/// ```text
/// [ 0..20)  mean MFCC
/// [20..40)  mean frame delta of the MFCCs
///  40       mean zero-crossing rate
///  41       mean spectral centroid (Hz)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub(crate) fn from_parts(mfcc: &[f64], delta: &[f64], zcr: f64, centroid: f64) -> Self {
        let mut values = Vec::with_capacity(FEATURE_LEN);
        values.extend_from_slice(mfcc);
        values.extend_from_slice(delta);
        values.push(zcr);
        values.push(centroid);
        debug_assert_eq!(values.len(), FEATURE_LEN);
        Self { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn mfcc_mean(&self) -> &[f64] {
        &self.values[MFCC_RANGE]
    }

    pub fn delta_mean(&self) -> &[f64] {
        &self.values[DELTA_RANGE]
    }

    pub fn zero_crossing_rate(&self) -> f64 {
        self.values[ZCR_INDEX]
    }

    pub fn spectral_centroid(&self) -> f64 {
        self.values[CENTROID_INDEX]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TryFrom<Vec<f64>> for FeatureVector {
    type Error = FeatureError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        if values.len() != FEATURE_LEN {
            return Err(FeatureError::Length {
                expected: FEATURE_LEN,
                got: values.len(),
            });
        }
        Ok(Self { values })
    }
}

impl From<FeatureVector> for Vec<f64> {
    fn from(v: FeatureVector) -> Self {
        v.values
    }
}

impl AsRef<[f64]> for FeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}
