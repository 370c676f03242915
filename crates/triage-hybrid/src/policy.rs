use std::cmp::Ordering;

use triage_core::config::{FallbackSettings, ThresholdMode};

/// Distance threshold applied to vector-tier matches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackPolicy {
    pub threshold: f32,
    pub mode: ThresholdMode,
}

impl FallbackPolicy {
    pub fn advisory(threshold: f32) -> Self { Self { threshold, mode: ThresholdMode::Advisory } }

    pub fn reject(threshold: f32) -> Self { Self { threshold, mode: ThresholdMode::Reject } }

    /// True unless `distance <= threshold`; a NaN distance always exceeds.
    pub fn exceeds(&self, distance: f32) -> bool {
        !matches!(distance.partial_cmp(&self.threshold), Some(Ordering::Less | Ordering::Equal))
    }

    /// Whether a match at `distance` should be used.
    pub fn accepts(&self, distance: f32) -> bool {
        match self.mode {
            ThresholdMode::Advisory => true,
            ThresholdMode::Reject => !self.exceeds(distance),
        }
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self { Self::from(&FallbackSettings::default()) }
}

impl From<&FallbackSettings> for FallbackPolicy {
    fn from(s: &FallbackSettings) -> Self { Self { threshold: s.threshold, mode: s.mode } }
}
