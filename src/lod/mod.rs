//! Level-of-detail tier selection
//!
//! A model ships up to four quality tiers (0 = highest detail). Each tier has
//! an inclusive upper distance bound; the camera-to-origin distance is compared
//! against the table every frame and the first tier whose bound covers the
//! distance wins. Past the last bound the lowest-quality tier is used.
//!
//! Selection is cheap and runs every frame. `LodTracker` turns the continuous
//! result into edges so the swap controller only hears about actual changes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Highest tier index a model may declare
pub const MAX_TIER: u8 = 3;

/// Threshold table validation failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LodError {
    #[error("threshold table is empty")]
    Empty,
    #[error("tier {0} is out of range (max {max})", max = MAX_TIER)]
    TierOutOfRange(u8),
    #[error("tier {tier} threshold {threshold} must be greater than {previous}")]
    NotIncreasing { tier: u8, threshold: f32, previous: f32 },
    #[error("tier {tier} threshold {threshold} is not a finite non-negative distance")]
    InvalidDistance { tier: u8, threshold: f32 },
}

/// Distance thresholds keyed by tier, strictly increasing
///
/// Serialized as a plain `{ tier: distance }` map so config files and the
/// shared state read naturally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<u8, f32>", into = "BTreeMap<u8, f32>")]
pub struct LodThresholds {
    /// (tier, max distance) pairs in ascending tier order
    tiers: Vec<(u8, f32)>,
}

impl LodThresholds {
    /// Build a table, checking that distances grow with the tier index
    pub fn new(map: BTreeMap<u8, f32>) -> Result<Self, LodError> {
        if map.is_empty() {
            return Err(LodError::Empty);
        }

        let mut tiers = Vec::with_capacity(map.len());
        let mut previous: Option<f32> = None;
        for (tier, threshold) in map {
            if tier > MAX_TIER {
                return Err(LodError::TierOutOfRange(tier));
            }
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(LodError::InvalidDistance { tier, threshold });
            }
            if let Some(previous) = previous {
                if threshold <= previous {
                    return Err(LodError::NotIncreasing { tier, threshold, previous });
                }
            }
            previous = Some(threshold);
            tiers.push((tier, threshold));
        }

        Ok(Self { tiers })
    }

    /// Tiers present in the table, ascending
    pub fn tiers(&self) -> impl Iterator<Item = u8> + '_ {
        self.tiers.iter().map(|(tier, _)| *tier)
    }

    /// Lowest-quality tier in the table
    pub fn highest_tier(&self) -> u8 {
        // Construction guarantees at least one entry
        self.tiers.last().map(|(tier, _)| *tier).unwrap_or(0)
    }

    /// Threshold for a tier, if declared
    pub fn threshold(&self, tier: u8) -> Option<f32> {
        self.tiers.iter().find(|(t, _)| *t == tier).map(|(_, d)| *d)
    }

    pub fn contains(&self, tier: u8) -> bool {
        self.threshold(tier).is_some()
    }
}

impl TryFrom<BTreeMap<u8, f32>> for LodThresholds {
    type Error = LodError;

    fn try_from(map: BTreeMap<u8, f32>) -> Result<Self, Self::Error> {
        Self::new(map)
    }
}

impl From<LodThresholds> for BTreeMap<u8, f32> {
    fn from(thresholds: LodThresholds) -> Self {
        thresholds.tiers.into_iter().collect()
    }
}

/// Pick the quality tier for a camera distance
///
/// Bounds are inclusive: a distance exactly on a threshold belongs to that
/// (higher-quality) tier.
pub fn select_tier(distance: f32, thresholds: &LodThresholds) -> u8 {
    thresholds
        .tiers
        .iter()
        .find(|(_, threshold)| distance <= *threshold)
        .map(|(tier, _)| *tier)
        .unwrap_or_else(|| thresholds.highest_tier())
}

/// Edge detector over per-frame tier selection
#[derive(Debug, Clone, Default)]
pub struct LodTracker {
    current: Option<u8>,
}

impl LodTracker {
    /// Start tracking from a tier that is already loaded
    pub fn starting_at(tier: u8) -> Self {
        Self { current: Some(tier) }
    }

    /// Last reported tier
    #[cfg(test)]
    pub fn current(&self) -> Option<u8> {
        self.current
    }

    /// Forget the last tier (next update always reports)
    pub fn reset(&mut self, tier: Option<u8>) {
        self.current = tier;
    }

    /// Run one frame of selection
    ///
    /// `forced` pins the tier (manual override); it is clamped to the table.
    /// Returns `Some(tier)` only when the result differs from last frame.
    pub fn update(&mut self, distance: f32, thresholds: &LodThresholds, forced: Option<u8>) -> Option<u8> {
        let tier = match forced {
            Some(tier) if thresholds.contains(tier) => tier,
            Some(tier) => tier.min(thresholds.highest_tier()),
            None => select_tier(distance, thresholds),
        };

        if self.current == Some(tier) {
            return None;
        }
        self.current = Some(tier);
        Some(tier)
    }
}
