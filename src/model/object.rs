use std::fmt;

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A declarative timeline object, as supplied by the caller.
///
/// Input is assumed to be pre-validated by an external schema validator (exactly one of
/// `start`/`while`, no contradictory `end` + `duration`, `isGroup` iff `children`). The resolver
/// itself only enforces id uniqueness.
pub struct TimelineObject {
    /// Unique id across all objects and keyframes of one timeline.
    pub id: String,
    /// Output layer. Empty means "not rendered" (still resolvable and referable).
    #[serde(default)]
    pub layer: String,
    /// Enable condition.
    pub enable: Enable,
    /// Tags that `.class` references select on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    /// Higher priority wins its layer.
    #[serde(default)]
    pub priority: f64,
    /// Marks a group; groups carry `children`.
    #[serde(default)]
    pub is_group: bool,
    /// Nested objects, resolved relative to this object's instances.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TimelineObject>,
    /// Content overrides applied while this object holds its layer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyframes: Vec<TimelineKeyframe>,
    /// Opaque payload, only touched by keyframe merging.
    #[serde(default)]
    pub content: serde_json::Value,
    /// Disabled objects are resolved but never enter the state.
    #[serde(default)]
    pub disabled: bool,
}

impl TimelineObject {
    /// Create an object on `layer` with the given enable condition and empty content.
    pub fn new(id: impl Into<String>, layer: impl Into<String>, enable: Enable) -> Self {
        Self {
            id: id.into(),
            layer: layer.into(),
            enable,
            content: serde_json::Value::Object(Default::default()),
            ..Self::default()
        }
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    /// Set the classes.
    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the content payload.
    pub fn with_content(mut self, content: serde_json::Value) -> Self {
        self.content = content;
        self
    }

    /// Turn this object into a group holding `children`.
    pub fn with_children(mut self, children: Vec<TimelineObject>) -> Self {
        self.is_group = true;
        self.children = children;
        self
    }

    /// Attach keyframes.
    pub fn with_keyframes(mut self, keyframes: Vec<TimelineKeyframe>) -> Self {
        self.keyframes = keyframes;
        self
    }

    /// Mark as disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A layer-less child whose content is merged into its parent while active.
pub struct TimelineKeyframe {
    /// Unique id (shares the namespace with objects).
    pub id: String,
    /// Enable condition, relative to the parent like any child.
    pub enable: Enable,
    /// Tags that `.class` references select on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    /// Partial content merged over the parent's content.
    #[serde(default)]
    pub content: serde_json::Value,
    /// Disabled keyframes are never applied.
    #[serde(default)]
    pub disabled: bool,
}

impl TimelineKeyframe {
    /// Create a keyframe overriding `content` while `enable` holds.
    pub fn new(id: impl Into<String>, enable: Enable, content: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            enable,
            content,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// When an object is active.
///
/// Either `while` (a continuous predicate) or `start` with an optional `end` or `duration`.
/// `repeating` tiles the resulting instances forward with the given period.
pub struct Enable {
    /// Start expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EnableExpr>,
    /// End expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EnableExpr>,
    /// Duration expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<EnableExpr>,
    /// Continuous predicate; takes precedence over `start`.
    #[serde(default, rename = "while", skip_serializing_if = "Option::is_none")]
    pub while_: Option<EnableExpr>,
    /// Repeat period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeating: Option<EnableExpr>,
}

impl Enable {
    /// `{ start }`.
    pub fn start(start: impl Into<EnableExpr>) -> Self {
        Self {
            start: Some(start.into()),
            ..Self::default()
        }
    }

    /// `{ while }`.
    pub fn while_(expr: impl Into<EnableExpr>) -> Self {
        Self {
            while_: Some(expr.into()),
            ..Self::default()
        }
    }

    /// Add an `end` expression.
    pub fn with_end(mut self, end: impl Into<EnableExpr>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// Add a `duration` expression.
    pub fn with_duration(mut self, duration: impl Into<EnableExpr>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    /// Add a `repeating` period expression.
    pub fn with_repeating(mut self, repeating: impl Into<EnableExpr>) -> Self {
        self.repeating = Some(repeating.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
/// An enable expression: a plain number or an expression string such as `"#a.end + 5"`.
pub enum EnableExpr {
    /// Numeric passthrough.
    Number(f64),
    /// Expression source.
    Text(String),
}

impl EnableExpr {
    /// `Some(true)` for the `1` while-shortcut, `Some(false)` for `0`.
    pub(crate) fn while_shortcut(&self) -> Option<bool> {
        match self {
            Self::Text(t) if t.trim() == "1" => Some(true),
            Self::Text(t) if t.trim() == "0" => Some(false),
            Self::Number(v) if *v == 1.0 => Some(true),
            Self::Number(v) if *v == 0.0 => Some(false),
            _ => None,
        }
    }
}

impl From<f64> for EnableExpr {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for EnableExpr {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<&str> for EnableExpr {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for EnableExpr {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl fmt::Display for EnableExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/object.rs"]
mod tests;
