use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// A point on the timeline. Units are whatever the caller uses (usually milliseconds).
pub type Time = f64;

/// Provenance of a derived value: object (`#id`), class (`.class`), layer (`$layer`) and
/// instance (`@n`) references that caused it to exist.
///
/// A `BTreeSet` keeps the join a set-union with a deterministic lexicographic order, which the
/// equality checks elsewhere rely on.
pub type References = BTreeSet<String>;

/// Union of two reference sets.
pub fn join_references(a: &References, b: &References) -> References {
    a.union(b).cloned().collect()
}

pub(crate) fn object_reference(id: &str) -> String {
    format!("#{id}")
}

pub(crate) fn class_reference(class: &str) -> String {
    format!(".{class}")
}

pub(crate) fn layer_reference(layer: &str) -> String {
    format!("${layer}")
}

/// Totally ordered time, usable as a map key.
///
/// Serializes as a string so it can key a JSON object.
#[derive(Clone, Copy, Debug)]
pub struct TimeKey(pub Time);

impl PartialEq for TimeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimeKey {}

impl PartialOrd for TimeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for TimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for TimeKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// `end` of an instance, with `None` meaning open-ended.
pub(crate) fn end_or_infinity(end: Option<Time>) -> Time {
    end.unwrap_or(Time::INFINITY)
}

/// Instance id generator scoped to a single resolve call.
///
/// Ids are `@1`, `@2`, ... in allocation order, so the same input always yields the same ids.
#[derive(Debug, Default)]
pub(crate) struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn next_id(&mut self) -> String {
        self.next += 1;
        format!("@{}", self.next)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
