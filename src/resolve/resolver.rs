use std::collections::HashMap;

use crate::expression::ast::{Aspect, BinaryOp, Expr, Literal, Reference, Sigil};
use crate::expression::parser::parse_enable;
use crate::foundation::core::{IdSequence, join_references};
use crate::foundation::error::{TimelineError, TimelineResult};
use crate::interval::Operand;
use crate::interval::events::{InstanceEvent, convert_events_to_instances, join_caps};
use crate::interval::ops::{cap_instance, enclosing_parent, operate_on_arrays};
use crate::interval::repeat::apply_repeating_instances;
use crate::model::instance::{Cap, ScalarValue, TimelineInstance};
use crate::model::object::{EnableExpr, TimelineObject};
use crate::model::resolved::{
    ObjIdx, ResolveOptions, ResolveStatus, ResolvedGraph, ResolvedInfo, ResolvedObject,
    Statistics,
};

/// Resolve a timeline into concrete instances.
///
/// Objects are flattened (children and keyframes included), checked for id uniqueness and
/// then resolved one by one. Each object is resolved at most once; references to objects not
/// yet resolved are resolved on demand, and reaching an object that is still being resolved
/// aborts the call with [`TimelineError::CircularReference`].
#[tracing::instrument(skip(objects), fields(objects = objects.len()))]
pub fn resolve_timeline(
    objects: &[TimelineObject],
    options: ResolveOptions,
) -> TimelineResult<ResolvedGraph> {
    let mut resolver = Resolver::new(options);
    for object in objects {
        resolver.add_object(object, 0, None)?;
    }
    tracing::debug!(flattened = resolver.graph.objects.len(), "timeline flattened");

    for i in 0..resolver.graph.objects.len() {
        resolver.resolve_object(ObjIdx(i))?;
    }

    let graph = resolver.graph;
    tracing::debug!(
        resolved = graph.statistics.resolved_count,
        unresolved = graph.statistics.unresolved_count,
        instances = graph.statistics.resolved_instance_count,
        "timeline resolved"
    );
    Ok(graph)
}

/// State of one resolve call: the graph under construction and its instance id sequence.
///
/// Each object's [`ResolveStatus`] doubles as the visited set for cycle detection.
pub(crate) struct Resolver {
    pub(crate) graph: ResolvedGraph,
    pub(crate) ids: IdSequence,
}

impl Resolver {
    pub(crate) fn new(options: ResolveOptions) -> Self {
        Self {
            graph: ResolvedGraph {
                options,
                objects: Vec::new(),
                classes: Default::default(),
                layers: Default::default(),
                statistics: Statistics::default(),
                index: HashMap::new(),
            },
            ids: IdSequence::new(),
        }
    }

    fn register(&mut self, object: ResolvedObject) -> TimelineResult<()> {
        if self.graph.index.contains_key(&object.id) {
            return Err(TimelineError::duplicate_id(&object.id));
        }
        for class in &object.classes {
            self.graph
                .classes
                .entry(class.clone())
                .or_default()
                .push(object.id.clone());
        }
        if !object.layer.is_empty() {
            self.graph
                .layers
                .entry(object.layer.clone())
                .or_default()
                .push(object.id.clone());
        }
        self.graph
            .index
            .insert(object.id.clone(), ObjIdx(self.graph.objects.len()));
        self.graph.objects.push(object);
        Ok(())
    }

    pub(crate) fn add_object(
        &mut self,
        object: &TimelineObject,
        level_deep: usize,
        parent_id: Option<&str>,
    ) -> TimelineResult<()> {
        self.register(ResolvedObject {
            id: object.id.clone(),
            layer: object.layer.clone(),
            enable: object.enable.clone(),
            classes: object.classes.clone(),
            priority: object.priority,
            is_group: object.is_group,
            children: object.children.iter().map(|c| c.id.clone()).collect(),
            keyframes: object.keyframes.iter().map(|k| k.id.clone()).collect(),
            content: object.content.clone(),
            disabled: object.disabled,
            resolved: ResolvedInfo {
                level_deep,
                parent_id: parent_id.map(str::to_owned),
                ..ResolvedInfo::default()
            },
        })?;

        for keyframe in &object.keyframes {
            self.register(ResolvedObject {
                id: keyframe.id.clone(),
                layer: String::new(),
                enable: keyframe.enable.clone(),
                classes: keyframe.classes.clone(),
                priority: 0.0,
                is_group: false,
                children: Vec::new(),
                keyframes: Vec::new(),
                content: keyframe.content.clone(),
                disabled: keyframe.disabled,
                resolved: ResolvedInfo {
                    level_deep: level_deep + 1,
                    parent_id: Some(object.id.clone()),
                    is_keyframe: true,
                    ..ResolvedInfo::default()
                },
            })?;
        }

        for child in &object.children {
            self.add_object(child, level_deep + 1, Some(&object.id))?;
        }
        Ok(())
    }

    /// Resolve one object (memoized).
    pub(crate) fn resolve_object(&mut self, idx: ObjIdx) -> TimelineResult<()> {
        let object = &self.graph.objects[idx.0];
        match object.resolved.status {
            ResolveStatus::Resolved => return Ok(()),
            ResolveStatus::Resolving => {
                return Err(TimelineError::circular_reference(&object.id));
            }
            ResolveStatus::Unresolved => {}
        }
        let id = object.id.clone();
        let enable = object.enable.clone();
        let parent_id = object.resolved.parent_id.clone();
        self.graph.objects[idx.0].resolved.status = ResolveStatus::Resolving;

        let repeating = match &enable.repeating {
            Some(expr) => {
                let parsed = parse_enable(expr)?;
                let value = self.lookup(parsed.as_ref(), Aspect::Duration)?;
                scalar_for_duration(&id, "repeating", value)?
            }
            None => None,
        };

        let is_while = enable.while_.is_some();
        let start_expr = match (&enable.while_, &enable.start) {
            (Some(expr), _) => match expr.while_shortcut() {
                Some(true) => Some(Expr::Literal(Literal::True)),
                Some(false) => Some(Expr::Literal(Literal::False)),
                None => parse_enable(expr)?,
            },
            (None, Some(expr)) => parse_enable(expr)?,
            (None, None) => None,
        };

        let parent_instances = match &parent_id {
            Some(parent) => {
                let parent_start = Expr::Reference(Reference {
                    sigil: Sigil::Object,
                    name: parent.clone(),
                    aspect: Some(Aspect::Start),
                });
                match self.lookup(Some(&parent_start), Aspect::Start)? {
                    Some(Operand::Instances(list)) => Some(list),
                    _ => Some(Vec::new()),
                }
            }
            None => None,
        };

        let mut starts = self.lookup(start_expr.as_ref(), Aspect::Start)?;
        if let (Some(parents), Some(expr)) = (&parent_instances, &start_expr) {
            if expr.is_constant() {
                starts = starts.map(|s| self.rebase(parents, &s));
            }
        }

        let mut instances = if is_while {
            match starts {
                Some(Operand::Instances(list)) => list,
                Some(Operand::Scalar(s)) => {
                    vec![TimelineInstance::new(self.ids.next_id(), s.value, None, s.references)]
                }
                None => Vec::new(),
            }
        } else {
            let events = self.boundary_events(
                &id,
                &enable.end,
                &enable.duration,
                starts,
                parent_instances.as_deref(),
                repeating.as_ref(),
            )?;
            convert_events_to_instances(events, false, false, &mut self.ids)
        };

        if let Some(parents) = &parent_instances {
            instances = instances
                .into_iter()
                .filter_map(|instance| {
                    let parent = parents
                        .iter()
                        .find(|p| instance.references.contains(&p.id))
                        .or_else(|| enclosing_parent(&instance, parents))?;
                    let mut capped = cap_instance(&instance, parent)?;
                    capped.caps = join_caps(&capped.caps, &[Cap::from_instance(parent)]);
                    Some(capped)
                })
                .collect();
        }

        let options = self.graph.options;
        let mut instances =
            apply_repeating_instances(instances, repeating.as_ref(), &options, &mut self.ids);
        instances.retain(|i| i.end.is_none_or(|end| end > i.start));
        for instance in &mut instances {
            instance.id = self.ids.next_id();
        }

        tracing::trace!(object = %id, instances = instances.len(), "object resolved");
        self.record(idx, instances);
        Ok(())
    }

    /// Shift a parent-relative constant by the parent's instances.
    fn rebase(&mut self, parents: &[TimelineInstance], offset: &Operand) -> Operand {
        operate_on_arrays(
            &Operand::Instances(parents.to_vec()),
            offset,
            BinaryOp::Add,
            &mut self.ids,
        )
    }

    /// Start and end boundaries for a `start`-based object. Start `i` is paired with the end
    /// synthesized from it (duration) or with end `i` of the `end` expression.
    fn boundary_events(
        &mut self,
        id: &str,
        end: &Option<EnableExpr>,
        duration: &Option<EnableExpr>,
        starts: Option<Operand>,
        parents: Option<&[TimelineInstance]>,
        repeating: Option<&ScalarValue>,
    ) -> TimelineResult<Vec<InstanceEvent>> {
        let mut events = Vec::new();
        match starts {
            Some(Operand::Instances(list)) => {
                for (i, instance) in list.into_iter().enumerate() {
                    events.push(
                        InstanceEvent::start(instance.start, format!("{id}_{i}"), instance.references)
                            .with_caps(instance.caps),
                    );
                }
            }
            Some(Operand::Scalar(s)) => {
                events.push(InstanceEvent::start(s.value, format!("{id}_0"), s.references));
            }
            None => {}
        }

        if let Some(end) = end {
            let end_expr = parse_enable(end)?;
            let mut ends = self.lookup(end_expr.as_ref(), Aspect::End)?;
            if let (Some(parents), Some(expr)) = (parents, &end_expr) {
                if expr.is_constant() {
                    ends = ends.map(|e| self.rebase(parents, &e));
                }
            }
            match ends {
                Some(Operand::Instances(list)) => {
                    for (i, instance) in list.into_iter().enumerate() {
                        events.push(InstanceEvent::end(
                            instance.start,
                            format!("{id}_{i}"),
                            instance.references,
                        ));
                    }
                }
                Some(Operand::Scalar(s)) => {
                    events.push(InstanceEvent::end(s.value, format!("{id}_0"), s.references));
                }
                None => {}
            }
        } else if let Some(duration) = duration {
            let parsed = parse_enable(duration)?;
            let value = self.lookup(parsed.as_ref(), Aspect::Duration)?;
            if let Some(mut duration) = scalar_for_duration(id, "duration", value)? {
                if let Some(period) = repeating {
                    if duration.value > period.value {
                        duration.value = period.value;
                    }
                }
                let ends: Vec<InstanceEvent> = events
                    .iter()
                    .filter(|e| e.active)
                    .map(|e| {
                        InstanceEvent::end(
                            e.time + duration.value,
                            e.owner.clone(),
                            join_references(&e.references, &duration.references),
                        )
                    })
                    .collect();
                events.extend(ends);
            }
        }
        Ok(events)
    }

    fn record(&mut self, idx: ObjIdx, instances: Vec<TimelineInstance>) {
        let stats = &mut self.graph.statistics;
        let object = &mut self.graph.objects[idx.0];
        if instances.is_empty() {
            stats.unresolved_count += 1;
        } else {
            stats.resolved_count += 1;
            stats.resolved_instance_count += instances.len();
            if object.resolved.is_keyframe {
                stats.resolved_keyframe_count += 1;
            } else if object.is_group {
                stats.resolved_group_count += 1;
            } else {
                stats.resolved_object_count += 1;
            }
        }
        object.resolved.instances = instances;
        object.resolved.status = ResolveStatus::Resolved;
    }
}

/// Reduce a duration-like lookup to a scalar: a one-instance list contributes its start, an
/// empty list means no value, anything longer is an error.
fn scalar_for_duration(
    id: &str,
    what: &str,
    value: Option<Operand>,
) -> TimelineResult<Option<ScalarValue>> {
    match value {
        None => Ok(None),
        Some(Operand::Scalar(s)) => Ok(Some(s)),
        Some(Operand::Instances(list)) => match list.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(ScalarValue {
                value: single.start,
                references: single.references.clone(),
            })),
            _ => Err(TimelineError::resolution(format!(
                "{what} of '{id}' resolved to {} instances, expected a single value",
                list.len()
            ))),
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/resolver.rs"]
mod tests;
