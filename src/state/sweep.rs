use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::foundation::core::{Time, TimeKey};
use crate::model::instance::TimelineInstance;
use crate::model::resolved::{ObjIdx, ResolvedGraph, ResolvedObject};
use crate::state::model::{
    EventType, KeyframeState, LayerState, NextEvent, ResolvedStates, StateEntry,
};

/// A time at which one instance of one object may gain or lose its layer.
#[derive(Debug, Clone, Copy)]
struct PointOfInterest {
    obj: ObjIdx,
    instance: usize,
    enable: bool,
}

/// A candidate for a layer: an object instance that is currently enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Aspirant {
    obj: ObjIdx,
    instance: usize,
}

/// What currently holds a layer.
#[derive(Debug, Clone)]
struct Holder {
    obj: ObjIdx,
    instance: usize,
    state_instance_id: String,
    since: TimeKey,
}

/// Sweep a resolved graph into layer occupancy over time.
///
/// At every point of interest each layer is given to the enabled object instance with the
/// highest priority; ties go to the later start, then to the larger id. A child is only
/// enabled while its layered parent holds its own layer. Keyframes attach to their object
/// while it holds its layer. Disabled objects never take part.
#[tracing::instrument(skip(graph), fields(objects = graph.objects.len()))]
pub fn resolve_all_states(graph: &ResolvedGraph) -> ResolvedStates {
    let mut sweep = Sweep::new(graph);
    for (time, mut points) in collect_points(graph) {
        points.sort_by_key(|p| {
            let object = graph.get(p.obj);
            (object.resolved.is_keyframe, object.resolved.level_deep, p.enable)
        });
        sweep.advance(time, &points);
    }
    sweep.finish()
}

fn collect_points(graph: &ResolvedGraph) -> BTreeMap<TimeKey, Vec<PointOfInterest>> {
    let mut points: BTreeMap<TimeKey, Vec<PointOfInterest>> = BTreeMap::new();
    let mut add = |time: Time, point: PointOfInterest| {
        points.entry(TimeKey(time)).or_default().push(point);
    };

    for (i, object) in graph.objects.iter().enumerate() {
        if object.disabled || !object.resolved.is_resolved() {
            continue;
        }
        let layered = if object.resolved.is_keyframe {
            owner(graph, object).is_some_and(|o| !o.layer.is_empty())
        } else {
            !object.layer.is_empty()
        };
        if !layered {
            continue;
        }

        let ancestor_times = ancestor_times(graph, object);
        for (n, instance) in object.resolved.instances.iter().enumerate() {
            if instance.end == Some(instance.start) {
                continue;
            }
            let point = |enable| PointOfInterest {
                obj: ObjIdx(i),
                instance: n,
                enable,
            };
            add(instance.start, point(true));
            if let Some(end) = instance.end {
                add(end, point(false));
            }
            // An ancestor changing hands inside this instance may enable or disable it.
            for &(time, enable) in &ancestor_times {
                if time > instance.start && time < instance.end_or_infinity() {
                    add(time, point(enable));
                }
            }
        }
    }
    points
}

fn owner<'a>(graph: &'a ResolvedGraph, object: &ResolvedObject) -> Option<&'a ResolvedObject> {
    object
        .resolved
        .parent_id
        .as_deref()
        .and_then(|id| graph.object(id))
}

/// Times at which an ancestor may gain or lose its layer: the boundaries of the ancestor's
/// own instances and of every object contending for the ancestor's layer.
fn ancestor_times(graph: &ResolvedGraph, object: &ResolvedObject) -> Vec<(Time, bool)> {
    let mut times = Vec::new();
    let mut push_boundaries = |instances: &[TimelineInstance]| {
        for instance in instances {
            times.push((instance.start, true));
            if let Some(end) = instance.end {
                times.push((end, false));
            }
        }
    };
    let mut current = owner(graph, object);
    while let Some(parent) = current {
        push_boundaries(&parent.resolved.instances);
        if let Some(rivals) = graph.layers.get(&parent.layer) {
            for rival in rivals.iter().filter(|id| **id != parent.id) {
                push_boundaries(graph.instances(rival));
            }
        }
        current = owner(graph, parent);
    }
    times
}

struct Sweep<'a> {
    graph: &'a ResolvedGraph,
    aspiring: HashMap<String, Vec<Aspirant>>,
    holders: HashMap<String, Holder>,
    /// Object ids currently holding a layer.
    active: HashSet<String>,
    objects: BTreeMap<String, Vec<TimelineInstance>>,
    layers: BTreeMap<String, Vec<String>>,
    state: BTreeMap<String, BTreeMap<TimeKey, Vec<StateEntry>>>,
    events: Vec<NextEvent>,
    keyframe_events: Vec<NextEvent>,
    event_times: BTreeSet<TimeKey>,
    /// Keyframe instances already applied, per hold of their object's layer.
    attached: BTreeSet<(ObjIdx, usize, TimeKey)>,
}

impl<'a> Sweep<'a> {
    fn new(graph: &'a ResolvedGraph) -> Self {
        Self {
            graph,
            aspiring: HashMap::new(),
            holders: HashMap::new(),
            active: HashSet::new(),
            objects: BTreeMap::new(),
            layers: BTreeMap::new(),
            state: BTreeMap::new(),
            events: Vec::new(),
            keyframe_events: Vec::new(),
            event_times: BTreeSet::new(),
            attached: BTreeSet::new(),
        }
    }

    fn instance(&self, obj: ObjIdx, n: usize) -> &'a TimelineInstance {
        let graph: &'a ResolvedGraph = self.graph;
        &graph.get(obj).resolved.instances[n]
    }

    /// Apply every point of one time. Points arrive sorted by nesting level with keyframes
    /// last; each level is applied as a batch before its layers are settled, so a parent's
    /// new layer ownership is visible to its children.
    fn advance(&mut self, time: TimeKey, points: &[PointOfInterest]) {
        let graph = self.graph;
        let mut checked = HashSet::new();
        let mut touched: Vec<&'a str> = Vec::new();
        let mut level = None;

        for point in points {
            if !checked.insert((point.obj, point.instance, point.enable)) {
                continue;
            }
            let object = graph.get(point.obj);
            let instance = self.instance(point.obj, point.instance);
            let enabled = instance.contains(time.0);

            if level != Some((object.resolved.is_keyframe, object.resolved.level_deep)) {
                self.settle_all(time, &mut touched);
                level = Some((object.resolved.is_keyframe, object.resolved.level_deep));
            }

            if object.resolved.is_keyframe {
                if enabled {
                    self.attach_keyframe(time, point.obj, point.instance);
                }
                continue;
            }

            let parent_ok = match owner(graph, object) {
                None => true,
                Some(parent) => parent.layer.is_empty() || self.active.contains(&parent.id),
            };
            let aspiring = self.aspiring.entry(object.layer.clone()).or_default();
            aspiring.retain(|a| a.obj != point.obj);
            if enabled && parent_ok {
                aspiring.push(Aspirant {
                    obj: point.obj,
                    instance: point.instance,
                });
            }
            if !touched.contains(&object.layer.as_str()) {
                touched.push(&object.layer);
            }
        }
        self.settle_all(time, &mut touched);
    }

    fn settle_all(&mut self, time: TimeKey, touched: &mut Vec<&'a str>) {
        for layer in touched.drain(..) {
            self.settle(time, layer);
        }
    }

    /// Give `layer` to its best aspirant, recording the hand-over.
    fn settle(&mut self, time: TimeKey, layer: &str) {
        let graph = self.graph;
        let aspiring = self.aspiring.entry(layer.to_owned()).or_default();
        aspiring.sort_by(|a, b| compare_aspirants(graph, a, b));
        let winner = aspiring.first().copied();

        let holder = self.holders.get(layer);
        let replace = match (winner, holder) {
            (Some(w), Some(h)) => w.obj != h.obj || w.instance != h.instance,
            (Some(_), None) => true,
            (None, _) => false,
        };
        let remove = winner.is_none() && holder.is_some();

        if replace || remove {
            self.release(time, layer);
        }
        match winner {
            Some(w) if replace => self.take(time, layer, w),
            None if remove => {
                self.state
                    .entry(layer.to_owned())
                    .or_default()
                    .insert(time, Vec::new());
            }
            _ => {}
        }
    }

    /// End the current holder's state instance at `time`.
    fn release(&mut self, time: TimeKey, layer: &str) {
        let graph = self.graph;
        let Some(holder) = self.holders.remove(layer) else {
            return;
        };
        let object = graph.get(holder.obj);

        if let Some(entries) = self
            .state
            .get_mut(layer)
            .and_then(|timeline| timeline.get_mut(&holder.since))
        {
            for entry in entries.iter_mut() {
                if let StateEntry::Object(held) = entry {
                    if held.id == object.id {
                        held.instance.end = Some(time.0);
                    }
                }
            }
        }
        if let Some(instances) = self.objects.get_mut(&object.id) {
            if let Some(instance) = instances
                .iter_mut()
                .find(|i| i.id == holder.state_instance_id)
            {
                instance.end = Some(time.0);
            }
        }
        self.active.remove(&object.id);

        let before_limit = graph
            .options
            .limit_time
            .is_none_or(|limit| time.0 < limit);
        if before_limit {
            self.push_event(EventType::End, time, &object.id);
        }
    }

    fn take(&mut self, time: TimeKey, layer: &str, winner: Aspirant) {
        let graph = self.graph;
        let object = graph.get(winner.obj);
        let resolved = self.instance(winner.obj, winner.instance);

        let instances = self.objects.entry(object.id.clone()).or_default();
        let mut id = resolved.id.clone();
        if instances.iter().any(|i| i.id == id) {
            id = format!("{}_{}", resolved.id, instances.len());
        }
        let mut instance = TimelineInstance::new(
            id.clone(),
            time.0,
            None,
            resolved.references.clone(),
        );
        instance.caps = resolved.caps.clone();
        instance.from_instance_id = Some(resolved.id.clone());
        instances.push(instance.clone());

        let holders_of_layer = self.layers.entry(layer.to_owned()).or_default();
        if !holders_of_layer.contains(&object.id) {
            holders_of_layer.push(object.id.clone());
        }

        self.state.entry(layer.to_owned()).or_default().insert(
            time,
            vec![StateEntry::Object(LayerState {
                id: object.id.clone(),
                layer: layer.to_owned(),
                priority: object.priority,
                classes: object.classes.clone(),
                is_group: object.is_group,
                parent_id: object.resolved.parent_id.clone(),
                content: object.content.clone(),
                instance,
            })],
        );
        self.holders.insert(
            layer.to_owned(),
            Holder {
                obj: winner.obj,
                instance: winner.instance,
                state_instance_id: id,
                since: time,
            },
        );
        self.active.insert(object.id.clone());

        if time.0 > graph.options.time {
            self.push_event(EventType::Start, time, &object.id);
        }
    }

    /// Attach a keyframe instance to its object's current hold of the layer, once per hold.
    fn attach_keyframe(&mut self, time: TimeKey, obj: ObjIdx, n: usize) {
        let graph = self.graph;
        let keyframe = graph.get(obj);
        let instance = self.instance(obj, n);
        let Some(parent) = owner(graph, keyframe) else {
            return;
        };
        let Some(since) = self
            .holders
            .get(&parent.layer)
            .filter(|h| graph.get(h.obj).id == parent.id)
            .map(|h| h.since)
        else {
            return;
        };
        if !self.attached.insert((obj, n, since)) {
            return;
        }

        let entries = self
            .state
            .entry(parent.layer.clone())
            .or_default()
            .entry(time)
            .or_default();
        entries.push(StateEntry::Keyframe(KeyframeState {
            id: keyframe.id.clone(),
            parent_id: parent.id.clone(),
            content: keyframe.content.clone(),
            instance: instance.clone(),
        }));

        self.keyframe_events.push(NextEvent {
            kind: EventType::Keyframe,
            time: time.0,
            obj_id: keyframe.id.clone(),
        });
        if let Some(end) = instance.end {
            self.keyframe_events.push(NextEvent {
                kind: EventType::Keyframe,
                time: end,
                obj_id: keyframe.id.clone(),
            });
        }
    }

    fn push_event(&mut self, kind: EventType, time: TimeKey, obj_id: &str) {
        self.events.push(NextEvent {
            kind,
            time: time.0,
            obj_id: obj_id.to_owned(),
        });
        self.event_times.insert(time);
    }

    fn finish(mut self) -> ResolvedStates {
        // Keyframe changes coinciding with a start/end are implied by it.
        for event in std::mem::take(&mut self.keyframe_events) {
            let key = TimeKey(event.time);
            if !self.event_times.contains(&key) {
                self.events.push(event);
            }
        }

        let options = self.graph.options;
        self.events.retain(|e| e.time > options.time);
        self.events.sort_by(|a, b| {
            a.time
                .total_cmp(&b.time)
                .then_with(|| b.kind.cmp(&a.kind))
                .then_with(|| a.obj_id.cmp(&b.obj_id))
        });
        self.events.dedup();

        tracing::debug!(
            layers = self.state.len(),
            next_events = self.events.len(),
            "states resolved"
        );
        ResolvedStates {
            options,
            statistics: self.graph.statistics,
            objects: self.objects,
            layers: self.layers,
            state: self.state,
            next_events: self.events,
        }
    }
}

/// Layer contention order: higher priority first, then the later start, then the larger id.
fn compare_aspirants(graph: &ResolvedGraph, a: &Aspirant, b: &Aspirant) -> Ordering {
    let (oa, ob) = (graph.get(a.obj), graph.get(b.obj));
    let (ia, ib) = (
        &oa.resolved.instances[a.instance],
        &ob.resolved.instances[b.instance],
    );
    ob.priority
        .total_cmp(&oa.priority)
        .then_with(|| ib.start.total_cmp(&ia.start))
        .then_with(|| ob.id.cmp(&oa.id))
}

#[cfg(test)]
#[path = "../../tests/unit/state/sweep.rs"]
mod tests;
