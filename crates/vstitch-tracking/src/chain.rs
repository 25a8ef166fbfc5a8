//! Resolve exit events and their candidate continuations into one
//! forward-linked chain per person.
//!
//! Resolution walks the top-level exits from latest to earliest. A
//! candidate that continues into a later top-level exit absorbs it, either
//! by merging tracks or by being replaced with that exit outright, so each
//! appearance ends up in exactly one chain.

use tracing::{debug, trace};
use vstitch_models::{Event, ExitEvent, FinalizedEvent, ObjectId, Track};

use crate::config::ChainConfig;

/// Whether `later` continues `candidate`.
///
/// Either the same camera picks the person up again shortly after, close
/// to where they were, or the candidate's tail velocity, the later event's
/// head velocity and the velocity between them all agree.
pub fn can_collate(candidate: &Track, later: &Track, config: &ChainConfig) -> bool {
    let (Some(tail), Some(head)) = (candidate.last(), later.first()) else {
        return false;
    };

    let gap = head.timestamp_ms - tail.timestamp_ms;
    if gap <= 0 {
        return false;
    }

    if tail.camera_id() == head.camera_id()
        && gap < config.same_camera_gap_ms
        && (tail.position - head.position)
            .abs()
            .shorter_than(config.position_tolerance)
    {
        return true;
    }

    let n = candidate.len();
    if n < 2 || later.len() < 2 {
        return false;
    }

    let tail_velocity = candidate.samples[n - 2].velocity_to(tail);
    let head_velocity = head.velocity_to(&later.samples[1]);
    let between = tail.velocity_to(head);

    let tol = config.velocity_tolerance;
    (tail_velocity - head_velocity).shorter_than(tol)
        && (between - tail_velocity).shorter_than(tol)
        && (between - head_velocity).shorter_than(tol)
}

/// Merge a candidate with the later exit that continues it. The result
/// takes the later exit's id, velocity and candidates.
pub fn merge_continuation(candidate: Event, later: ExitEvent) -> ExitEvent {
    let (_, mut track, _) = candidate.into_parts();
    track.id = later.id;
    track.absorb(later.track);
    ExitEvent {
        id: later.id,
        track,
        velocity: later.velocity,
        related: later.related,
    }
}

/// Fold later top-level exits into the candidates they continue.
///
/// `exits` must be ordered by start time. Exits absorbed this way are
/// removed from the returned list.
pub fn resolve(mut exits: Vec<ExitEvent>, config: &ChainConfig) -> Vec<ExitEvent> {
    for i in (0..exits.len()).rev() {
        if i >= exits.len() {
            continue;
        }
        let mut j = 0;
        while j < exits[i].related.len() {
            // Each candidate absorbs at most one later exit.
            for k in i + 1..exits.len() {
                if can_collate(exits[i].related[j].track(), &exits[k].track, config) {
                    let later = exits.remove(k);
                    let candidate = exits[i].related.remove(j);
                    trace!(candidate = candidate.id(), later = later.id, "Merging continuation");
                    exits[i]
                        .related
                        .insert(j, Event::Exit(merge_continuation(candidate, later)));
                    break;
                }
                if exits[i].related[j].shares_first_sample(&exits[k].track) {
                    let later = exits.remove(k);
                    trace!(later = later.id, "Candidate is a later exit");
                    exits[i].related[j] = Event::Exit(later);
                    break;
                }
            }
            j += 1;
        }
    }
    exits
}

/// Build the finalized chain starting at `exit`, following the earliest
/// candidate that starts after the current node ends.
///
/// Iterative, so chain length does not grow the stack.
pub fn finalize(exit: ExitEvent) -> Option<FinalizedEvent> {
    let mut nodes: Vec<(ObjectId, Track)> = Vec::new();
    let mut current = Some(Event::Exit(exit));

    while let Some(event) = current.take() {
        let (id, track, related) = event.into_parts();
        let Some(end) = track.end_ms() else {
            break;
        };
        nodes.push((id, track));

        current = related
            .into_iter()
            .find(|e| e.track().start_ms().is_some_and(|start| start > end));
    }

    let mut following: Option<Box<FinalizedEvent>> = None;
    for (id, track) in nodes.into_iter().rev() {
        if let Some(mut node) = FinalizedEvent::from_track(id, track) {
            node.following = following.take();
            following = Some(Box::new(node));
        }
    }
    following.map(|head| *head)
}

/// Resolve and finalize every top-level exit.
pub fn resolve_chains(exits: Vec<ExitEvent>, config: &ChainConfig) -> Vec<FinalizedEvent> {
    let before = exits.len();
    let chains: Vec<FinalizedEvent> = resolve(exits, config)
        .into_iter()
        .filter_map(finalize)
        .collect();
    debug!(
        exits = before,
        chains = chains.len(),
        longest = chains.iter().map(|c| c.chain_len()).max().unwrap_or(0),
        "Resolved event chains"
    );
    chains
}
