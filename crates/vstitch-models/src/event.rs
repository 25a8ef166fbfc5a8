//! Enter, exit and finalized events.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::observation::{ObjectId, Observation, Track};
use crate::vector::Vector2;

/// A track that starts near a frame edge heading into view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnterEvent {
    pub id: ObjectId,
    pub track: Track,
    pub velocity: Vector2,
}

/// A track that ends near a frame edge heading out of view.
///
/// `related` holds candidate continuations on other cameras until the
/// chain is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExitEvent {
    pub id: ObjectId,
    pub track: Track,
    pub velocity: Vector2,
    #[serde(default)]
    pub related: Vec<Event>,
}

/// Either kind of boundary event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    Enter(EnterEvent),
    Exit(ExitEvent),
}

impl Event {
    pub fn id(&self) -> ObjectId {
        match self {
            Event::Enter(e) => e.id,
            Event::Exit(e) => e.id,
        }
    }

    pub fn track(&self) -> &Track {
        match self {
            Event::Enter(e) => &e.track,
            Event::Exit(e) => &e.track,
        }
    }

    /// Candidate continuations. Always empty for enter events.
    pub fn related(&self) -> &[Event] {
        match self {
            Event::Enter(_) => &[],
            Event::Exit(e) => &e.related,
        }
    }

    pub fn into_parts(self) -> (ObjectId, Track, Vec<Event>) {
        match self {
            Event::Enter(e) => (e.id, e.track, Vec::new()),
            Event::Exit(e) => (e.id, e.track, e.related),
        }
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, Event::Exit(_))
    }

    /// Whether this event and `track` begin with the same sample, which
    /// makes them the same appearance.
    pub fn shares_first_sample(&self, track: &Track) -> bool {
        match (self.track().first(), track.first()) {
            (Some(a), Some(b)) => a.is_same_sample(b),
            _ => false,
        }
    }
}

impl ExitEvent {
    pub fn new(id: ObjectId, track: Track, velocity: Vector2) -> Self {
        Self {
            id,
            track,
            velocity,
            related: Vec::new(),
        }
    }
}

impl From<EnterEvent> for Event {
    fn from(e: EnterEvent) -> Self {
        Event::Enter(e)
    }
}

impl From<ExitEvent> for Event {
    fn from(e: ExitEvent) -> Self {
        Event::Exit(e)
    }
}

/// One node of a resolved, time-ordered chain of appearances.
///
/// Each `following` node starts after this one ends. Built only by chain
/// resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedEvent {
    pub id: ObjectId,
    pub data: Vec<Observation>,
    pub start_ms: i64,
    pub end_ms: i64,
    pub following: Option<Box<FinalizedEvent>>,
}

impl FinalizedEvent {
    /// Returns `None` for an empty track.
    pub fn from_track(id: ObjectId, track: Track) -> Option<Self> {
        let start_ms = track.start_ms()?;
        let end_ms = track.end_ms()?;
        Some(Self {
            id,
            data: track.samples,
            start_ms,
            end_ms,
            following: None,
        })
    }

    /// Camera of the first sample.
    pub fn camera_id(&self) -> Option<&str> {
        self.data.first().map(|o| o.camera_id())
    }

    /// Walk the chain starting at this node.
    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter { next: Some(self) }
    }

    /// Number of nodes in the chain starting here.
    pub fn chain_len(&self) -> usize {
        self.iter().count()
    }

    pub fn last_node(&self) -> &FinalizedEvent {
        let mut node = self;
        while let Some(next) = node.following.as_deref() {
            node = next;
        }
        node
    }
}

impl Drop for FinalizedEvent {
    // Unlink iteratively so long chains don't recurse on drop.
    fn drop(&mut self) {
        let mut next = self.following.take();
        while let Some(mut node) = next {
            next = node.following.take();
        }
    }
}

/// Iterator over a finalized chain.
pub struct ChainIter<'a> {
    next: Option<&'a FinalizedEvent>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a FinalizedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.following.as_deref();
        Some(node)
    }
}
