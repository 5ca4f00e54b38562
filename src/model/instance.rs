use crate::foundation::core::{References, Time, end_or_infinity};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A concrete `[start, end)` interval during which an object is active.
pub struct TimelineInstance {
    /// Instance id, unique within one resolve call (`@n`).
    pub id: String,
    /// Inclusive start.
    pub start: Time,
    /// Exclusive end; `None` means open-ended.
    pub end: Option<Time>,
    /// Provenance: what caused this instance to exist.
    pub references: References,
    /// Clipping bounds inherited from ancestor instances.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub caps: Vec<Cap>,
    /// Synthetic instance starting at the origin, produced by inverting a set that does not
    /// start at zero. Zip-combination passes its raw bounds through.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_first: bool,
    /// For state-level instances: the resolved instance this one was cut from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_instance_id: Option<String>,
}

impl TimelineInstance {
    /// A new instance without caps.
    pub fn new(id: impl Into<String>, start: Time, end: Option<Time>, references: References) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            references,
            caps: Vec::new(),
            is_first: false,
            from_instance_id: None,
        }
    }

    /// `end - start`, or `None` when open-ended.
    pub fn duration(&self) -> Option<Time> {
        self.end.map(|end| end - self.start)
    }

    /// `true` when `time` lies inside `[start, end)`.
    pub fn contains(&self, time: Time) -> bool {
        self.start <= time && time < end_or_infinity(self.end)
    }

    pub(crate) fn end_or_infinity(&self) -> Time {
        end_or_infinity(self.end)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A clipping bound inherited from an enclosing (parent/group) instance.
pub struct Cap {
    /// Id of the instance imposing the bound.
    pub id: String,
    /// Lower bound.
    pub start: Time,
    /// Upper bound; `None` means unbounded.
    pub end: Option<Time>,
}

impl Cap {
    pub(crate) fn from_instance(instance: &TimelineInstance) -> Self {
        Self {
            id: instance.id.clone(),
            start: instance.start,
            end: instance.end,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// A resolved constant with provenance, used where an expression yields a number
/// rather than a set of instances (durations, offsets, repeat periods).
pub struct ScalarValue {
    /// The number.
    pub value: f64,
    /// Provenance.
    pub references: References,
}

impl ScalarValue {
    /// A constant with no references.
    pub fn constant(value: f64) -> Self {
        Self {
            value,
            references: References::new(),
        }
    }
}
