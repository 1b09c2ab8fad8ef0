//! Magnitudes of the soft likelihood adjustments applied by the inference rules.

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Tunable configuration for soft reweighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftConfig {
    /// Multiplier on the status-inducing item when the holder's ability profits
    /// from the self-inflicted status.
    pub status_orb_ability_boost: f64,
    /// Multiplier on Toxic Orb for a Poison Heal holder that was poisoned.
    pub poison_heal_orb_boost: f64,
    /// Multiplier on the status-inducing item when no profiting ability is known.
    pub status_orb_base_boost: f64,
    /// Probability above which an unconfirmed ability counts as known.
    pub ability_confidence_threshold: f64,
    /// Multiplier on hazard-immunity items after a hazard was shrugged off.
    pub hazard_avoidance_boost: f64,
    /// Multiplier on multi-hit items after a long multi-hit streak.
    pub multi_hit_boost: f64,
    /// Hit count from which a multi-hit streak counts as long.
    pub multi_hit_threshold: u8,
    /// Multiplier on speed items after an unexplained speed advantage.
    pub speed_item_boost: f64,
}

impl Default for SoftConfig {
    fn default() -> Self {
        Self {
            status_orb_ability_boost: 20.0,
            poison_heal_orb_boost: 30.0,
            status_orb_base_boost: 5.0,
            ability_confidence_threshold: 0.5,
            hazard_avoidance_boost: 3.0,
            multi_hit_boost: 3.0,
            multi_hit_threshold: 4,
            speed_item_boost: 2.0,
        }
    }
}

impl SoftConfig {
    /// Defaults overridden by `SETSCOUT_*` environment variables, clamped to sane ranges.
    pub fn from_env() -> Self {
        let base = Self::default();
        let ability_boost = parse_env_f64("SETSCOUT_STATUS_ORB_BOOST", base.status_orb_ability_boost);
        let poison_heal = parse_env_f64(
            "SETSCOUT_POISON_HEAL_ORB_BOOST",
            base.poison_heal_orb_boost,
        );
        let base_boost = parse_env_f64("SETSCOUT_STATUS_ORB_BASE_BOOST", base.status_orb_base_boost);
        let threshold = parse_env_f64(
            "SETSCOUT_ABILITY_THRESHOLD",
            base.ability_confidence_threshold,
        );
        let hazard = parse_env_f64("SETSCOUT_HAZARD_BOOST", base.hazard_avoidance_boost);
        let multi_hit = parse_env_f64("SETSCOUT_MULTI_HIT_BOOST", base.multi_hit_boost);
        let hits = env::var("SETSCOUT_MULTI_HIT_THRESHOLD")
            .ok()
            .and_then(|value| value.parse::<u8>().ok())
            .unwrap_or(base.multi_hit_threshold);
        let speed = parse_env_f64("SETSCOUT_SPEED_BOOST", base.speed_item_boost);

        Self {
            status_orb_ability_boost: ability_boost.clamp(1.0, 100.0),
            poison_heal_orb_boost: poison_heal.clamp(1.0, 100.0),
            status_orb_base_boost: base_boost.clamp(1.0, 100.0),
            ability_confidence_threshold: threshold.clamp(0.0, 1.0),
            hazard_avoidance_boost: hazard.clamp(1.0, 20.0),
            multi_hit_boost: multi_hit.clamp(1.0, 20.0),
            multi_hit_threshold: hits.clamp(2, 10),
            speed_item_boost: speed.clamp(1.0, 20.0),
        }
    }

    /// Rejects values that would turn a soft boost into a penalty or a no-op NaN.
    pub fn validate(&self) -> Result<(), SoftConfigError> {
        let boosts = [
            ("status_orb_ability_boost", self.status_orb_ability_boost),
            ("poison_heal_orb_boost", self.poison_heal_orb_boost),
            ("status_orb_base_boost", self.status_orb_base_boost),
            ("hazard_avoidance_boost", self.hazard_avoidance_boost),
            ("multi_hit_boost", self.multi_hit_boost),
            ("speed_item_boost", self.speed_item_boost),
        ];
        for (field, value) in boosts {
            if !value.is_finite() || value < 1.0 {
                return Err(SoftConfigError::InvalidBoost { field, value });
            }
        }
        if !(0.0..=1.0).contains(&self.ability_confidence_threshold) {
            return Err(SoftConfigError::InvalidThreshold {
                value: self.ability_confidence_threshold,
            });
        }
        if self.multi_hit_threshold < 2 {
            return Err(SoftConfigError::InvalidHitThreshold {
                hits: self.multi_hit_threshold,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SoftConfigError {
    #[error("{field} must be a finite multiplier >= 1, got {value}")]
    InvalidBoost { field: &'static str, value: f64 },
    #[error("ability_confidence_threshold must be within [0, 1], got {value}")]
    InvalidThreshold { value: f64 },
    #[error("multi_hit_threshold must be at least 2, got {hits}")]
    InvalidHitThreshold { hits: u8 },
}

fn parse_env_f64(key: &str, fallback: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(fallback)
}
