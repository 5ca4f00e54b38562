//! Showline resolves declarative timelines into concrete playout state.
//!
//! A timeline is a list of [`TimelineObject`]s. Each object says *when* it is active through
//! an [`Enable`] condition: absolute numbers, or expressions referring to other objects
//! (`"#intro.end + 500"`), classes (`".gfx"`) or layers (`"$L1"`), combined with boolean
//! (`&`, `|`, `!`) and arithmetic operators. Objects may be nested in groups and carry
//! keyframes that patch their content while active.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: `[TimelineObject] + ResolveOptions -> ResolvedGraph` (every object's instances)
//! 2. **Sweep**: `ResolvedGraph -> ResolvedStates` (which object holds each layer, over time)
//! 3. **Query**: `ResolvedStates + time -> TimelineState` (layer snapshot plus upcoming events)
//!
//! Resolution is deterministic: the same input and options always yield the same instances,
//! instance ids included. A resolve call is all-or-nothing: duplicate ids, cyclic references
//! and malformed expressions abort it with a [`TimelineError`].
//!
//! ```
//! use showline::{Enable, ResolveOptions, TimelineObject, get_state, resolve_timeline};
//!
//! let objects = vec![
//!     TimelineObject::new("bg", "L1", Enable::start(0).with_duration(10)),
//!     TimelineObject::new("flash", "L1", Enable::start(5).with_duration(10)).with_priority(1.0),
//! ];
//! let graph = resolve_timeline(&objects, ResolveOptions::at(0.0))?;
//! assert_eq!(get_state(&graph, 3.0, None).layers["L1"].id, "bg");
//! assert_eq!(get_state(&graph, 7.0, None).layers["L1"].id, "flash");
//! # Ok::<(), showline::TimelineError>(())
//! ```
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod expression;
mod foundation;
mod interval;
mod model;
mod resolve;
mod state;

pub use foundation::core::{References, Time, TimeKey, join_references};
pub use foundation::error::{TimelineError, TimelineResult};
pub use model::instance::{Cap, ScalarValue, TimelineInstance};
pub use model::load::{load_objects_from_path, load_objects_from_str};
pub use model::object::{Enable, EnableExpr, TimelineKeyframe, TimelineObject};
pub use model::resolved::{
    DEFAULT_LIMIT_COUNT, ResolveOptions, ResolveStatus, ResolvedGraph, ResolvedInfo,
    ResolvedObject, Statistics,
};
pub use resolve::resolver::resolve_timeline;
pub use state::model::{
    EventType, KeyframeState, LayerState, LayerTimeline, NextEvent, ResolvedStates, StateEntry,
    TimelineState,
};
pub use state::query::{StateSource, apply_keyframe_content, get_state, get_state_at_time};
pub use state::sweep::resolve_all_states;
