use crate::expression::ast::BinaryOp;
use crate::foundation::core::{IdSequence, References, Time, join_references};
use crate::interval::Operand;
use crate::interval::events::{clean_instances, join_caps};
use crate::model::instance::{ScalarValue, TimelineInstance};

fn with_id(references: &References, id: &str) -> References {
    let mut out = references.clone();
    if !id.is_empty() {
        out.insert(id.to_owned());
    }
    out
}

/// Complement of a set of instances over `[0, inf)`.
///
/// Each gap instance references the instances on both sides of it. When the set does not start
/// at zero the leading gap is a synthetic `is_first` instance. Zero-length gaps are kept.
pub(crate) fn invert_instances(
    instances: &[TimelineInstance],
    ids: &mut IdSequence,
) -> Vec<TimelineInstance> {
    let cleaned = clean_instances(instances, true, true, ids);
    let Some(first) = cleaned.first() else {
        let mut everything = TimelineInstance::new(ids.next_id(), 0.0, None, References::new());
        everything.is_first = true;
        return vec![everything];
    };

    let mut out: Vec<TimelineInstance> = Vec::new();
    if first.start != 0.0 {
        let mut lead = TimelineInstance::new(
            ids.next_id(),
            0.0,
            None,
            with_id(&first.references, &first.id),
        );
        lead.is_first = true;
        out.push(lead);
    }
    for instance in &cleaned {
        if let Some(last) = out.last_mut() {
            last.end = Some(instance.start);
            last.references =
                join_references(&last.references, &with_id(&instance.references, &instance.id));
        }
        if let Some(end) = instance.end {
            out.push(
                TimelineInstance::new(
                    ids.next_id(),
                    end,
                    None,
                    with_id(&instance.references, &instance.id),
                )
                .with_caps(instance.caps.clone()),
            );
        }
    }
    out
}

struct Bound {
    value: Option<Time>,
    references: References,
}

/// Pairwise arithmetic over two tracks.
///
/// Two constants give a constant. Otherwise instance lists are zipped up to the shorter
/// length, a constant acting as the zero-length instance `[v, v]`. A synthetic `is_first`
/// operand passes its raw bounds through. Open ends stay open.
pub(crate) fn operate_on_arrays(
    left: &Operand,
    right: &Operand,
    op: BinaryOp,
    ids: &mut IdSequence,
) -> Operand {
    let apply = |a: Time, b: Time| op.arithmetic(a, b).unwrap_or(Time::NAN);

    let (left_list, right_list) = match (left, right) {
        (Operand::Scalar(a), Operand::Scalar(b)) => {
            return Operand::Scalar(ScalarValue {
                value: apply(a.value, b.value),
                references: join_references(&a.references, &b.references),
            });
        }
        (a, b) => (as_instances(a), as_instances(b)),
    };

    let len = match (left, right) {
        (Operand::Scalar(_), _) => right_list.len(),
        (_, Operand::Scalar(_)) => left_list.len(),
        _ => left_list.len().min(right_list.len()),
    };

    let mut result = Vec::with_capacity(len);
    for i in 0..len {
        let a = pick(&left_list, i);
        let b = pick(&right_list, i);

        let start = if a.is_first {
            Bound {
                value: Some(a.start),
                references: a.references.clone(),
            }
        } else if b.is_first {
            Bound {
                value: Some(b.start),
                references: b.references.clone(),
            }
        } else {
            Bound {
                value: Some(apply(a.start, b.start)),
                references: join_references(
                    &with_id(&a.references, &a.id),
                    &with_id(&b.references, &b.id),
                ),
            }
        };

        let end = if a.is_first {
            Bound {
                value: a.end,
                references: a.references.clone(),
            }
        } else if b.is_first {
            Bound {
                value: b.end,
                references: b.references.clone(),
            }
        } else {
            Bound {
                value: a.end.zip(b.end).map(|(x, y)| apply(x, y)),
                references: join_references(
                    &with_id(&a.references, &a.id),
                    &with_id(&b.references, &b.id),
                ),
            }
        };

        result.push(TimelineInstance::new(
            ids.next_id(),
            start.value.unwrap_or(0.0),
            end.value,
            join_references(&start.references, &end.references),
        ));
    }
    Operand::Instances(clean_instances(&result, false, false, ids))
}

fn as_instances(operand: &Operand) -> Vec<TimelineInstance> {
    match operand {
        Operand::Instances(list) => list.clone(),
        Operand::Scalar(s) => vec![TimelineInstance::new(
            String::new(),
            s.value,
            Some(s.value),
            s.references.clone(),
        )],
    }
}

/// A constant operand is a one-element list that pairs with every index.
fn pick(list: &[TimelineInstance], i: usize) -> &TimelineInstance {
    if list.len() == 1 { &list[0] } else { &list[i] }
}

/// Clip `instance` to `parent`. `None` when nothing remains.
pub(crate) fn cap_instance(
    instance: &TimelineInstance,
    parent: &TimelineInstance,
) -> Option<TimelineInstance> {
    let mut capped = instance.clone();
    if capped.start < parent.start {
        capped.start = parent.start;
    }
    if let Some(parent_end) = parent.end {
        if capped.end.is_none_or(|end| end > parent_end) {
            capped.end = Some(parent_end);
        }
    }
    (capped.end_or_infinity() >= capped.start).then_some(capped)
}

/// The parent instance an instance should be clipped to: one containing its start (the one
/// reaching furthest), else one containing its end (the one ending earliest).
pub(crate) fn enclosing_parent<'a>(
    instance: &TimelineInstance,
    parents: &'a [TimelineInstance],
) -> Option<&'a TimelineInstance> {
    let by_start = parents
        .iter()
        .filter(|p| p.start <= instance.start && instance.start < p.end_or_infinity())
        .max_by(|a, b| a.end_or_infinity().total_cmp(&b.end_or_infinity()));
    if by_start.is_some() {
        return by_start;
    }
    let end = instance.end_or_infinity();
    parents
        .iter()
        .filter(|p| p.start < end && end <= p.end_or_infinity())
        .min_by(|a, b| a.end_or_infinity().total_cmp(&b.end_or_infinity()))
}

/// Side of a boolean combination: a constant truth value, or instances to sweep over.
enum Side {
    Constant(bool),
    Instances(Vec<TimelineInstance>),
}

impl Side {
    fn new(operand: Operand, base: &mut References) -> Self {
        match operand {
            Operand::Scalar(s) => {
                *base = join_references(base, &s.references);
                Side::Constant(s.value != 0.0)
            }
            Operand::Instances(list) => Side::Instances(list),
        }
    }
}

/// `&` / `|` over two tracks by sweeping their boundaries.
///
/// A constant side is truthy when non-zero and seeds the state at time zero. Each emitted
/// instance references the constants plus every instance active when it opened.
pub(crate) fn combine_boolean(
    left: Operand,
    right: Operand,
    op: BinaryOp,
    ids: &mut IdSequence,
) -> Vec<TimelineInstance> {
    let mut base = References::new();
    let sides = [Side::new(left, &mut base), Side::new(right, &mut base)];

    // (time, active, side, index into that side's instances)
    let mut boundaries: Vec<(Time, bool, usize, usize)> = Vec::new();
    for (side_idx, side) in sides.iter().enumerate() {
        if let Side::Instances(list) = side {
            for (i, instance) in list.iter().enumerate() {
                if instance.end.is_some_and(|end| end <= instance.start) {
                    continue;
                }
                boundaries.push((instance.start, true, side_idx, i));
                if let Some(end) = instance.end {
                    boundaries.push((end, false, side_idx, i));
                }
            }
        }
    }
    boundaries.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut active: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
    let truthy = |active: &[Vec<usize>; 2], side_idx: usize| match &sides[side_idx] {
        Side::Constant(v) => *v,
        Side::Instances(_) => !active[side_idx].is_empty(),
    };
    let value = |active: &[Vec<usize>; 2]| {
        let (l, r) = (truthy(active, 0), truthy(active, 1));
        if op == BinaryOp::And { l && r } else { l || r }
    };
    let opened = |active: &[Vec<usize>; 2], ids: &mut IdSequence, time: Time| {
        let mut references = base.clone();
        let mut caps = Vec::new();
        for (side_idx, side) in sides.iter().enumerate() {
            if let Side::Instances(list) = side {
                for &i in &active[side_idx] {
                    references = join_references(&references, &with_id(&list[i].references, &list[i].id));
                    caps = join_caps(&caps, &list[i].caps);
                }
            }
        }
        TimelineInstance::new(ids.next_id(), time, None, references).with_caps(caps)
    };

    let mut out: Vec<TimelineInstance> = Vec::new();
    let mut current = value(&active);
    if current {
        out.push(opened(&active, ids, 0.0));
    }

    let mut i = 0;
    while i < boundaries.len() {
        let time = boundaries[i].0;
        while i < boundaries.len() && boundaries[i].0 == time {
            let (_, is_start, side_idx, idx) = boundaries[i];
            active[side_idx].retain(|&a| a != idx);
            if is_start {
                active[side_idx].push(idx);
            }
            i += 1;
        }
        let next = value(&active);
        if next != current {
            if next {
                out.push(opened(&active, ids, time));
            } else if let Some(last) = out.last_mut() {
                last.end = Some(time);
            }
            current = next;
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/interval/ops.rs"]
mod tests;
