//! Robust end-of-track velocity and the boundary-direction check.

use tracing::trace;
use vstitch_models::{Track, Vector2};

use crate::config::{Direction, EnterDirectionRule, IsolationConfig};
use crate::TrackMap;

/// A track that passed the velocity check, with its averaged velocity.
#[derive(Debug, Clone, PartialEq)]
pub struct IsolatedTrack {
    pub track: Track,
    /// Normalized units per millisecond
    pub velocity: Vector2,
}

/// Inter-sample velocities at the end of interest, nearest first.
///
/// Takes up to `max_samples` and drops the most distant one if the count
/// is even so each axis gets an odd-sized vote.
pub fn endpoint_velocities(track: &Track, direction: Direction, max_samples: usize) -> Vec<Vector2> {
    let steps = track.step_velocities();
    let mut picked: Vec<Vector2> = match direction {
        Direction::Exit => steps.into_iter().rev().filter(|v| v.is_finite()).take(max_samples).collect(),
        Direction::Enter => steps.into_iter().filter(|v| v.is_finite()).take(max_samples).collect(),
    };
    if picked.len() % 2 == 0 {
        picked.pop();
    }
    picked
}

/// Majority-sign average of one axis. Values against the majority are ignored.
fn axis_average(values: impl Iterator<Item = f64> + Clone, zero: f64) -> f64 {
    let positive = values.clone().filter(|&v| v > zero).count();
    let negative = values.clone().filter(|&v| v < -zero).count();
    let votes = positive.max(negative);
    if votes == 0 {
        return 0.0;
    }

    let agreeing: f64 = if positive > negative {
        values.filter(|&v| v > zero).sum()
    } else {
        values.filter(|&v| v < -zero).sum()
    };
    agreeing / votes as f64
}

/// Directional average of the endpoint velocities.
pub fn average_velocity(velocities: &[Vector2], zero: f64) -> Vector2 {
    Vector2::new(
        axis_average(velocities.iter().map(|v| v.x), zero),
        axis_average(velocities.iter().map(|v| v.y), zero),
    )
}

/// Whether a bucketed velocity is consistent with crossing the boundary
/// the bucketed position sits on.
pub fn direction_matches(
    velocity: Vector2,
    position: Vector2,
    direction: Direction,
    enter_rule: EnterDirectionRule,
) -> bool {
    let same_x = velocity.x == position.x;
    let same_y = velocity.y == position.y;
    match direction {
        // Moving toward the edge it is already near.
        Direction::Exit => same_x || same_y,
        Direction::Enter => match enter_rule {
            EnterDirectionRule::AnyAxis => !same_x || !same_y,
            EnterDirectionRule::AllAxes => !same_x && !same_y,
        },
    }
}

/// Average the endpoint velocity and reject tracks that are too slow or
/// moving the wrong way.
pub fn isolate_velocity(track: Track, direction: Direction, config: &IsolationConfig) -> Option<IsolatedTrack> {
    let velocities = endpoint_velocities(&track, direction, config.velocity_samples);
    if velocities.is_empty() {
        return None;
    }

    let velocity = average_velocity(&velocities, config.zero_velocity_threshold);
    if velocity.shorter_than(config.min_speed) {
        trace!(track_id = track.id, speed = velocity.length(), "Track too slow");
        return None;
    }

    let terminal = match direction {
        Direction::Exit => track.last(),
        Direction::Enter => track.first(),
    }?;
    let bucketed_velocity = velocity.bucket_velocity(config.zero_velocity_threshold);
    let bucketed_position = terminal.position.bucket_position(config.edge_threshold(direction));

    if !direction_matches(bucketed_velocity, bucketed_position, direction, config.enter_rule) {
        trace!(
            track_id = track.id,
            ?bucketed_velocity,
            ?bucketed_position,
            "Track moving away from its boundary"
        );
        return None;
    }

    Some(IsolatedTrack { track, velocity })
}

/// [`isolate_velocity`] every track, in id order.
pub fn isolate_velocities(tracks: TrackMap, direction: Direction, config: &IsolationConfig) -> Vec<IsolatedTrack> {
    tracks
        .into_values()
        .filter_map(|t| isolate_velocity(t, direction, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{track, track_xy};

    #[test]
    fn test_exit_takes_odd_count_from_tail() {
        let t = track(1, &[(0.1, 0), (0.2, 100), (0.3, 200), (0.5, 300), (0.8, 400), (0.9, 500)]);
        let v = endpoint_velocities(&t, Direction::Exit, 4);
        assert_eq!(v.len(), 3);
        // Nearest the end first.
        assert!((v[0].x - 0.001).abs() < 1e-12);
        assert!((v[1].x - 0.003).abs() < 1e-12);
    }

    #[test]
    fn test_enter_takes_from_head() {
        let t = track(1, &[(0.1, 0), (0.2, 100), (0.4, 200)]);
        let v = endpoint_velocities(&t, Direction::Enter, 4);
        // Two steps available, even, so the farther one is dropped.
        assert_eq!(v.len(), 1);
        assert!((v[0].x - 0.001).abs() < 1e-12);
    }

    #[test]
    fn test_average_ignores_outliers() {
        let velocities = [
            Vector2::new(0.002, 0.0),
            Vector2::new(-0.010, 0.0),
            Vector2::new(0.004, 0.0),
        ];
        let avg = average_velocity(&velocities, 0.0);
        assert!((avg.x - 0.003).abs() < 1e-12);
        assert_eq!(avg.y, 0.0);
    }

    #[test]
    fn test_exit_toward_edge_kept() {
        let config = IsolationConfig::default();
        let steps: Vec<(f64, i64)> = (0..10).map(|i| (0.5 + 0.05 * i as f64, i * 444)).collect();
        let iso = isolate_velocity(track(1, &steps), Direction::Exit, &config).unwrap();
        assert!(iso.velocity.x > 0.0);
        assert_eq!(iso.velocity.y, 0.0);
    }

    #[test]
    fn test_exit_away_from_edge_rejected() {
        let config = IsolationConfig::default();
        // Near the top edge but walking down and left.
        let t = track_xy(1, &[(0.7, 0.1, 0), (0.65, 0.2, 500), (0.6, 0.3, 1000)]);
        assert!(isolate_velocity(t, Direction::Exit, &config).is_none());
    }

    #[test]
    fn test_slow_track_rejected() {
        let config = IsolationConfig::default();
        let t = track(1, &[(0.95, 0), (0.9501, 1000), (0.9502, 2000)]);
        assert!(isolate_velocity(t, Direction::Exit, &config).is_none());
    }

    #[test]
    fn test_exit_direction_law() {
        let config = IsolationConfig::default();
        let tracks: Vec<Track> = vec![
            track_xy(1, &[(0.5, 0.5, 0), (0.7, 0.55, 500), (0.9, 0.6, 1000)]),
            track_xy(2, &[(0.5, 0.5, 0), (0.3, 0.3, 500), (0.1, 0.1, 1000)]),
            track_xy(3, &[(0.5, 0.9, 0), (0.5, 0.7, 500), (0.5, 0.5, 1000)]),
            track_xy(4, &[(0.9, 0.5, 0), (0.7, 0.5, 500), (0.95, 0.5, 1000)]),
        ];
        for t in tracks {
            if let Some(iso) = isolate_velocity(t, Direction::Exit, &config) {
                let v = iso.velocity.bucket_velocity(0.0);
                let p = iso.track.last().unwrap().position.bucket_position(0.4);
                assert!(v.x == p.x || v.y == p.y);
            }
        }
    }

    #[test]
    fn test_enter_rules() {
        // Appears at the left edge, walking right; y stays on the midline.
        let t = track_xy(1, &[(0.05, 0.5, 0), (0.1, 0.5, 500), (0.15, 0.5, 1000)]);

        let any = IsolationConfig::default();
        assert!(isolate_velocity(t.clone(), Direction::Enter, &any).is_some());

        let all = IsolationConfig {
            enter_rule: EnterDirectionRule::AllAxes,
            ..IsolationConfig::default()
        };
        assert!(isolate_velocity(t, Direction::Enter, &all).is_none());
    }

    #[test]
    fn test_enter_heading_back_out_rejected() {
        let config = IsolationConfig::default();
        // At the left edge moving further left, on a diagonal.
        let t = track_xy(1, &[(0.2, 0.2, 0), (0.15, 0.15, 500), (0.1, 0.1, 1000)]);
        assert!(isolate_velocity(t, Direction::Enter, &config).is_none());
    }
}
