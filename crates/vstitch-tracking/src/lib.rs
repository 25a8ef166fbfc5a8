//! Person tracking within one camera and across cameras.
//!
//! Raw per-frame detections are collated into tracks, cut down to the
//! part nearest a frame boundary, and turned into enter or exit events.
//! Exit events with their candidate continuations are then resolved into
//! forward-linked chains.

pub mod chain;
pub mod collation;
pub mod config;
pub mod edge;
pub mod events;
pub mod length;
pub mod segmentation;
pub mod velocity;

use std::collections::BTreeMap;

use vstitch_models::{ObjectId, Track};

/// Tracks keyed by object id, iterated in ascending id order.
pub type TrackMap = BTreeMap<ObjectId, Track>;

pub use chain::{can_collate, finalize, resolve, resolve_chains};
pub use config::{ChainConfig, CollationConfig, Direction, EnterDirectionRule, IsolationConfig};
pub use events::{enter_events, exit_events, isolate};
pub use velocity::IsolatedTrack;
