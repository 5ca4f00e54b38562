use std::collections::{HashMap, HashSet};

use crate::foundation::core::{IdSequence, References, Time, join_references};
use crate::model::instance::{Cap, TimelineInstance};

/// A start (`active`) or end boundary contributed by one owner.
///
/// Owners pair starts with ends: an end only closes what the same owner opened.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct InstanceEvent {
    pub(crate) time: Time,
    pub(crate) active: bool,
    pub(crate) owner: String,
    pub(crate) references: References,
    pub(crate) caps: Vec<Cap>,
}

impl InstanceEvent {
    pub(crate) fn start(time: Time, owner: impl Into<String>, references: References) -> Self {
        Self {
            time,
            active: true,
            owner: owner.into(),
            references,
            caps: Vec::new(),
        }
    }

    pub(crate) fn end(time: Time, owner: impl Into<String>, references: References) -> Self {
        Self {
            active: false,
            ..Self::start(time, owner, references)
        }
    }

    pub(crate) fn with_caps(mut self, caps: Vec<Cap>) -> Self {
        self.caps = caps;
        self
    }
}

/// Time ascending; at equal time ends come before starts. The sort is stable, so events that
/// tie on both keep their input order.
pub(crate) fn sort_events(events: &mut [InstanceEvent]) {
    events.sort_by(|a, b| a.time.total_cmp(&b.time).then(a.active.cmp(&b.active)));
}

/// Union of two cap lists, deduplicated by id (first occurrence wins).
pub(crate) fn join_caps(a: &[Cap], b: &[Cap]) -> Vec<Cap> {
    let mut out = a.to_vec();
    for cap in b {
        if !out.iter().any(|c| c.id == cap.id) {
            out.push(cap.clone());
        }
    }
    out
}

struct Active {
    owner: String,
    start: Time,
    references: References,
}

/// Sweep start/end events into a list of instances.
///
/// `allow_merge`: overlapping owners share one instance. Without it, a newly starting owner
/// cuts the running instance and takes over, and when the holder ends while others are still
/// active the latest-started remaining owner continues in a fresh instance.
///
/// `allow_zero_gaps`: an instance ending exactly where the next starts stays separate. Without
/// it (and with `allow_merge`) the two are joined.
pub(crate) fn convert_events_to_instances(
    mut events: Vec<InstanceEvent>,
    allow_merge: bool,
    allow_zero_gaps: bool,
    ids: &mut IdSequence,
) -> Vec<TimelineInstance> {
    drop_empty_owners(&mut events);
    sort_events(&mut events);

    let mut active: Vec<Active> = Vec::new();
    let mut holder: Option<String> = None;
    let mut previously_active = false;
    let mut out: Vec<TimelineInstance> = Vec::new();

    for event in events {
        active.retain(|a| a.owner != event.owner);
        if event.active {
            active.push(Active {
                owner: event.owner.clone(),
                start: event.time,
                references: event.references.clone(),
            });
        }

        if active.is_empty() {
            if previously_active {
                if let Some(last) = out.last_mut() {
                    last.end = Some(event.time);
                    last.references = join_references(&last.references, &event.references);
                }
            }
            previously_active = false;
            continue;
        }
        previously_active = true;

        let holds = holder.as_deref() == Some(event.owner.as_str());
        let last_open = out.last().is_some_and(|l| l.end.is_none());

        if !allow_merge && event.active && last_open && holder.is_some() && !holds {
            if let Some(last) = out.last_mut() {
                last.end = Some(event.time);
            }
            out.push(
                fresh(ids.next_id(), event.time, event.references)
                    .with_caps(event.caps),
            );
            holder = Some(event.owner);
        } else if !allow_merge && !event.active && last_open && holds {
            // Latest start wins; on a tie the earliest-activated owner is kept.
            let mut latest = &active[0];
            for a in &active[1..] {
                if a.start > latest.start {
                    latest = a;
                }
            }
            let references = latest.references.clone();
            let owner = latest.owner.clone();
            if let Some(last) = out.last_mut() {
                last.end = Some(event.time);
            }
            out.push(fresh(ids.next_id(), event.time, references));
            holder = Some(owner);
        } else if allow_merge
            && !allow_zero_gaps
            && out.last().is_some_and(|l| l.end == Some(event.time))
        {
            if let Some(last) = out.last_mut() {
                last.end = None;
                last.references = join_references(&last.references, &event.references);
                last.caps = join_caps(&last.caps, &event.caps);
            }
        } else if !last_open {
            out.push(fresh(event.owner.clone(), event.time, event.references).with_caps(event.caps));
            holder = Some(event.owner);
        } else if let Some(last) = out.last_mut() {
            last.references = join_references(&last.references, &event.references);
            last.caps = join_caps(&last.caps, &event.caps);
        }
    }
    out
}

/// Remove owners whose end does not come after their start. Sorting puts such an end before
/// its start, which would leave the owner open forever.
fn drop_empty_owners(events: &mut Vec<InstanceEvent>) {
    let starts: HashMap<&str, Time> = events
        .iter()
        .filter(|e| e.active)
        .map(|e| (e.owner.as_str(), e.time))
        .collect();
    let empty: HashSet<String> = events
        .iter()
        .filter(|e| !e.active && starts.get(e.owner.as_str()).is_some_and(|&start| e.time <= start))
        .map(|e| e.owner.clone())
        .collect();
    if !empty.is_empty() {
        events.retain(|e| !empty.contains(&e.owner));
    }
}

fn fresh(id: String, start: Time, references: References) -> TimelineInstance {
    TimelineInstance::new(id, start, None, references)
}

impl TimelineInstance {
    pub(crate) fn with_caps(mut self, caps: Vec<Cap>) -> Self {
        self.caps = caps;
        self
    }
}

/// Normalize a list of instances: sorted by start, no overlaps.
///
/// Instances keep their own id when they survive intact. See
/// [`convert_events_to_instances`] for the flags.
pub(crate) fn clean_instances(
    instances: &[TimelineInstance],
    allow_merge: bool,
    allow_zero_gaps: bool,
    ids: &mut IdSequence,
) -> Vec<TimelineInstance> {
    let mut events = Vec::with_capacity(instances.len() * 2);
    for instance in instances {
        events.push(
            InstanceEvent::start(instance.start, &instance.id, instance.references.clone())
                .with_caps(instance.caps.clone()),
        );
        if let Some(end) = instance.end {
            events.push(
                InstanceEvent::end(end, &instance.id, instance.references.clone())
                    .with_caps(instance.caps.clone()),
            );
        }
    }
    convert_events_to_instances(events, allow_merge, allow_zero_gaps, ids)
}

#[cfg(test)]
#[path = "../../tests/unit/interval/events.rs"]
mod tests;
