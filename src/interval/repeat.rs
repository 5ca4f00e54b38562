use crate::foundation::core::{IdSequence, join_references};
use crate::interval::events::clean_instances;
use crate::model::instance::{ScalarValue, TimelineInstance};
use crate::model::resolved::ResolveOptions;

/// Tile instances with a repeat period.
///
/// Tiling starts at the period containing `options.time` (never before the instance's own
/// start) and produces at most `options.repeat_limit()` tiles, stopping at
/// `options.limit_time`. An open-ended instance lasts one period per tile. A tile is clipped to
/// the cap that the instance itself references. Without a usable period the input is
/// returned unchanged.
pub(crate) fn apply_repeating_instances(
    instances: Vec<TimelineInstance>,
    repeating: Option<&ScalarValue>,
    options: &ResolveOptions,
    ids: &mut IdSequence,
) -> Vec<TimelineInstance> {
    let Some(repeating) = repeating.filter(|r| r.value.is_finite() && r.value > 0.0) else {
        return instances;
    };
    let period = repeating.value;

    let mut tiles = Vec::new();
    for instance in &instances {
        let mut start = (options.time - (options.time - instance.start) % period).max(instance.start);
        let length = instance.duration().unwrap_or(period);
        let mut end = start + length;

        let cap = instance
            .caps
            .iter()
            .find(|cap| instance.references.contains(&cap.id));

        for _ in 0..options.repeat_limit() {
            if options.limit_time.is_some_and(|limit| start >= limit) {
                break;
            }
            let (tile_start, tile_end) = match cap {
                Some(cap) => (
                    start.max(cap.start),
                    cap.end.map_or(end, |cap_end| end.min(cap_end)),
                ),
                None => (start, end),
            };
            if tile_end > tile_start {
                tiles.push(
                    TimelineInstance::new(
                        ids.next_id(),
                        tile_start,
                        Some(tile_end),
                        join_references(&instance.references, &repeating.references),
                    )
                    .with_caps(instance.caps.clone()),
                );
            }
            start += period;
            end += period;
        }
    }
    clean_instances(&tiles, false, false, ids)
}

#[cfg(test)]
#[path = "../../tests/unit/interval/repeat.rs"]
mod tests;
