//! Application state access.
//!
//! The pipeline never reads the full application state directly. A
//! [`MonitoredState`] snapshot is captured once per projection from an
//! allow-list of [`MonitorEntry`] values and every expression reads from it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Path in the application state holding the logged-in user.
pub const USER_STATE_PATH: &str = "security.user";

/// One segment of a parsed state path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object key.
    Key(String),
    /// Array index (`[0]` or a purely numeric dotted segment).
    Index(usize),
}

/// Splits a dotted path such as `a.b[0].c` into segments.
///
/// Empty segments are ignored, so `""` and `"."` produce no segments.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();

    for part in path.split('.') {
        let mut rest = part;
        // Key before any bracket, e.g. `items` in `items[2]`
        if let Some(open) = rest.find('[') {
            push_key_or_index(&mut segments, &rest[..open]);
            rest = &rest[open..];
            while let Some(stripped) = rest.strip_prefix('[') {
                let Some(close) = stripped.find(']') else {
                    // Unclosed bracket: keep the remainder as a key
                    push_key_or_index(&mut segments, stripped);
                    rest = "";
                    break;
                };
                let inner = stripped[..close].trim_matches(|c| c == '\'' || c == '"');
                push_key_or_index(&mut segments, inner);
                rest = &stripped[close + 1..];
            }
            push_key_or_index(&mut segments, rest);
        } else {
            push_key_or_index(&mut segments, rest);
        }
    }

    segments
}

fn push_key_or_index(segments: &mut Vec<PathSegment>, raw: &str) {
    if raw.is_empty() {
        return;
    }
    match raw.parse::<usize>() {
        Ok(index) => segments.push(PathSegment::Index(index)),
        Err(_) => segments.push(PathSegment::Key(raw.to_string())),
    }
}

/// Resolves a dotted path against a JSON value.
///
/// Returns `None` (undefined) for any missing segment; never panics.
/// An empty path resolves to the value itself.
pub fn get_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    get_segments(value, &parse_path(path))
}

/// Resolves already-parsed path segments against a JSON value.
pub fn get_segments<'v>(value: &'v Value, segments: &[PathSegment]) -> Option<&'v Value> {
    let mut current = value;
    for segment in segments {
        current = match (segment, current) {
            (PathSegment::Key(key), Value::Object(map)) => map.get(key)?,
            (PathSegment::Index(index), Value::Array(items)) => items.get(*index)?,
            // Numeric keys are valid object keys too
            (PathSegment::Index(index), Value::Object(map)) => map.get(&index.to_string())?,
            _ => return None,
        };
    }
    Some(current)
}

/// Sets `new_value` at a dotted path, creating intermediate objects.
///
/// Index segments are written as object keys, and non-object intermediates
/// are replaced, so the call always succeeds.
pub fn set_path(target: &mut Value, path: &str, new_value: Value) {
    let segments = parse_path(path);
    let Some((last, parents)) = segments.split_last() else {
        *target = new_value;
        return;
    };

    let mut current = target;
    for segment in parents {
        let key = segment_key(segment);
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map.entry(key).or_insert_with(|| Value::Object(Map::new())),
            _ => return,
        };
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(segment_key(last), new_value);
    }
}

fn segment_key(segment: &PathSegment) -> String {
    match segment {
        PathSegment::Key(key) => key.clone(),
        PathSegment::Index(index) => index.to_string(),
    }
}

/// Truthiness as understood by menu configuration authors.
///
/// `false`, `null`, `0`, `""` and undefined are falsy; everything else,
/// including empty arrays and objects, is truthy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// One entry of the monitored-state allow-list.
///
/// The value found at `path` in the application state is exposed to
/// expressions under `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorEntry {
    /// Name (dotted) under which the value is exposed.
    pub name: String,
    /// Path of the value in the application state.
    pub path: String,
}

impl MonitorEntry {
    /// Creates a new monitor entry.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Entries used when a local configuration declares no `monitorState`.
    pub fn defaults() -> Vec<MonitorEntry> {
        vec![
            MonitorEntry::new("router", "router.location.pathname"),
            MonitorEntry::new("browser", "browser"),
            MonitorEntry::new("userrole", "security.user.role"),
        ]
    }
}

/// Read-only snapshot of the monitored application state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonitoredState {
    snapshot: Value,
}

impl MonitoredState {
    /// Captures the values named by `entries` from `state`.
    ///
    /// Entries whose path is missing from the state are left undefined.
    pub fn capture(state: &Value, entries: &[MonitorEntry]) -> Self {
        let mut snapshot = Value::Object(Map::new());
        for entry in entries {
            if let Some(value) = get_path(state, &entry.path) {
                set_path(&mut snapshot, &entry.name, value.clone());
            }
        }
        Self { snapshot }
    }

    /// Wraps an already-restricted snapshot.
    pub fn from_snapshot(snapshot: Value) -> Self {
        Self { snapshot }
    }

    /// Looks up a dotted path in the snapshot.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        get_path(&self.snapshot, path)
    }

    /// Returns the snapshot as a JSON value.
    pub fn as_value(&self) -> &Value {
        &self.snapshot
    }
}
