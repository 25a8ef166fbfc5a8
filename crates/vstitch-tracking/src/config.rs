//! Isolation thresholds.
//!
//! Several revisions of the pipeline disagree on these values, so every
//! one of them is configurable.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which end of a track is being isolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The person leaves the view; look at the track's tail
    Exit,
    /// The person arrives in the view; look at the track's head
    Enter,
}

/// How the enter-side direction check compares bucketed velocity with
/// bucketed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnterDirectionRule {
    /// Keep when velocity and position differ on at least one axis.
    #[default]
    AnyAxis,
    /// Keep only when they differ on both axes.
    AllAxes,
}

impl FromStr for EnterDirectionRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" | "any_axis" => Ok(Self::AnyAxis),
            "all" | "all_axes" => Ok(Self::AllAxes),
            other => Err(format!("unknown enter direction rule: {}", other)),
        }
    }
}

/// Thresholds for merging fragmented tracks.
#[derive(Debug, Clone)]
pub struct CollationConfig {
    /// Max |Δwidth| and |Δheight| (normalized)
    pub size_tolerance: f64,
    /// Max |Δt| between the linked samples
    pub max_time_delta_ms: i64,
    /// Max speed (normalized units per ms) implied by the link
    pub max_link_speed: f64,
    /// Max |Δposition| when the linked samples share a timestamp
    pub position_tolerance: f64,
}

impl Default for CollationConfig {
    fn default() -> Self {
        Self {
            size_tolerance: 0.01,
            max_time_delta_ms: 500,
            max_link_speed: 0.5 / 1000.0,
            position_tolerance: 0.01,
        }
    }
}

/// Thresholds for the isolation stages.
#[derive(Debug, Clone)]
pub struct IsolationConfig {
    pub collation: CollationConfig,
    /// Max gap inside one identity when isolating exits
    pub exit_max_gap_ms: i64,
    /// Max gap inside one identity when isolating enters
    pub enter_max_gap_ms: i64,
    /// Minimum samples per track
    pub min_samples: usize,
    /// Distance from a frame edge that counts as "at the edge" on exit
    pub exit_edge_threshold: f64,
    /// Midline used for enter tracks
    pub enter_midline: f64,
    /// Inter-sample velocities averaged at the track end
    pub velocity_samples: usize,
    /// Per-axis magnitude below which a velocity counts as zero
    pub zero_velocity_threshold: f64,
    /// Slowest averaged speed (normalized units per ms) that is kept
    pub min_speed: f64,
    pub enter_rule: EnterDirectionRule,
}

impl Default for IsolationConfig {
    fn default() -> Self {
        Self {
            collation: CollationConfig::default(),
            exit_max_gap_ms: 10_000,
            enter_max_gap_ms: 30_000,
            min_samples: 2,
            exit_edge_threshold: 0.4,
            enter_midline: 0.5,
            velocity_samples: 4,
            zero_velocity_threshold: 0.0,
            min_speed: 0.015 / 1000.0,
            enter_rule: EnterDirectionRule::default(),
        }
    }
}

/// Tolerances used when resolving candidate continuations into chains.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Max gap between a candidate's tail and a later exit on the same camera
    pub same_camera_gap_ms: i64,
    /// Max |Δposition| for a same-camera continuation
    pub position_tolerance: f64,
    /// Max pairwise |Δvelocity| for a kinematic continuation
    pub velocity_tolerance: f64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            same_camera_gap_ms: 5000,
            position_tolerance: 0.1,
            velocity_tolerance: 0.1,
        }
    }
}

impl ChainConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            same_camera_gap_ms: env_or("CHAIN_SAME_CAMERA_GAP_MS", d.same_camera_gap_ms),
            position_tolerance: env_or("CHAIN_POSITION_TOLERANCE", d.position_tolerance),
            velocity_tolerance: env_or("CHAIN_VELOCITY_TOLERANCE", d.velocity_tolerance),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl IsolationConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            collation: CollationConfig {
                size_tolerance: env_or("COLLATION_SIZE_TOLERANCE", d.collation.size_tolerance),
                max_time_delta_ms: env_or(
                    "COLLATION_MAX_TIME_DELTA_MS",
                    d.collation.max_time_delta_ms,
                ),
                max_link_speed: env_or("COLLATION_MAX_LINK_SPEED", d.collation.max_link_speed),
                position_tolerance: env_or(
                    "COLLATION_POSITION_TOLERANCE",
                    d.collation.position_tolerance,
                ),
            },
            exit_max_gap_ms: env_or("OBJECT_ID_MAX_LENGTH_MS", d.exit_max_gap_ms),
            enter_max_gap_ms: env_or("ENTER_OBJECT_ID_MAX_LENGTH_MS", d.enter_max_gap_ms),
            min_samples: env_or("MINIMUM_EVENT_LENGTH", d.min_samples),
            exit_edge_threshold: env_or(
                "EDGE_EVENT_DETECTION_DISTANCE_FROM_EDGE",
                d.exit_edge_threshold,
            ),
            enter_midline: env_or("ENTER_EVENT_MIDLINE", d.enter_midline),
            velocity_samples: env_or("VELOCITY_SAMPLE_COUNT", d.velocity_samples),
            zero_velocity_threshold: env_or(
                "ZERO_VELOCITY_THRESHOLD",
                d.zero_velocity_threshold,
            ),
            min_speed: env_or("MINIMUM_VELOCITY", d.min_speed),
            enter_rule: env_or("ENTER_DIRECTION_RULE", d.enter_rule),
        }
    }

    pub fn max_gap_ms(&self, direction: Direction) -> i64 {
        match direction {
            Direction::Exit => self.exit_max_gap_ms,
            Direction::Enter => self.enter_max_gap_ms,
        }
    }

    /// Edge threshold for position bucketing.
    pub fn edge_threshold(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Exit => self.exit_edge_threshold,
            Direction::Enter => self.enter_midline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IsolationConfig::default();
        assert_eq!(config.max_gap_ms(Direction::Exit), 10_000);
        assert_eq!(config.max_gap_ms(Direction::Enter), 30_000);
        assert_eq!(config.edge_threshold(Direction::Exit), 0.4);
        assert_eq!(config.edge_threshold(Direction::Enter), 0.5);
        assert_eq!(config.enter_rule, EnterDirectionRule::AnyAxis);
    }

    #[test]
    fn test_parse_enter_rule() {
        assert_eq!("all".parse::<EnterDirectionRule>(), Ok(EnterDirectionRule::AllAxes));
        assert_eq!("ANY_AXIS".parse::<EnterDirectionRule>(), Ok(EnterDirectionRule::AnyAxis));
        assert!("some".parse::<EnterDirectionRule>().is_err());
    }
}
