//! Menu item model and loading.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::permission::Requirement;
use crate::error::{ConfigError, ConfigResult};
use crate::expression::{Condition, ConditionParser, Diagnostic};

/// Keys consumed by the item model; everything else is a display field.
const VISIBLE_IF_KEY: &str = "visibleIf";
const DISABLE_IF_KEY: &str = "disableIf";
const AUTHENTICATED_KEY: &str = "authenticated";
const REQUIRES_KEY: &str = "requires";

/// Stable identifier of a menu item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    /// Integer id, also used for index-based defaults.
    Number(i64),
    /// String id.
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{n}"),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::Text(s.to_string())
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        ItemId::Number(n)
    }
}

/// How strictly configuration is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Reject unsupported condition and requirement shapes.
    #[default]
    Strict,
    /// Keep unsupported shapes; they deny the item at evaluation time.
    Lenient,
}

/// Fields shared by every item variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemCommon {
    /// Item id, defaulted from the array index.
    pub id: ItemId,
    /// Visibility condition; the item is shown only when it is truthy.
    pub visibility: Option<Condition>,
    /// `true` requires a logged-in user, `false` an anonymous one.
    pub authenticated: Option<bool>,
    /// Additional access requirements.
    pub requires: Vec<Requirement>,
    /// Opaque display fields (label, icon, templates, ...).
    pub fields: Map<String, Value>,
}

impl ItemCommon {
    /// Creates an item with only an id.
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            visibility: None,
            authenticated: None,
            requires: Vec::new(),
            fields: Map::new(),
        }
    }

    /// Sets the visibility condition.
    pub fn with_visibility(mut self, condition: Condition) -> Self {
        self.visibility = Some(condition);
        self
    }

    /// Sets the `authenticated` requirement.
    pub fn with_authenticated(mut self, authenticated: bool) -> Self {
        self.authenticated = Some(authenticated);
        self
    }

    /// Adds a requirement.
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requires.push(requirement);
        self
    }

    /// Sets a display field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// A node of a menu tree.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuItem {
    /// A container of child items (`type: "group"` with an `items` array).
    Group {
        /// Shared fields.
        common: ItemCommon,
        /// Children, in order.
        items: Vec<MenuItem>,
    },
    /// A search filter (`type: "filter"`).
    Filter {
        /// Shared fields.
        common: ItemCommon,
    },
    /// A link (`type: "link"` with a string `href`).
    Link {
        /// Shared fields.
        common: ItemCommon,
        /// Link target, possibly a template.
        href: String,
    },
    /// Any other node, including malformed groups and links.
    Leaf {
        /// Shared fields.
        common: ItemCommon,
        /// The raw `type` tag, if it was a string.
        kind: Option<String>,
    },
}

impl MenuItem {
    /// Creates a group.
    pub fn group(common: ItemCommon, items: Vec<MenuItem>) -> Self {
        MenuItem::Group { common, items }
    }

    /// Creates a filter item.
    pub fn filter(common: ItemCommon) -> Self {
        MenuItem::Filter { common }
    }

    /// Creates a link item.
    pub fn link(common: ItemCommon, href: impl Into<String>) -> Self {
        MenuItem::Link {
            common,
            href: href.into(),
        }
    }

    /// Creates a leaf item of the given kind.
    pub fn leaf(common: ItemCommon, kind: Option<&str>) -> Self {
        MenuItem::Leaf {
            common,
            kind: kind.map(str::to_string),
        }
    }

    /// Returns the shared fields.
    pub fn common(&self) -> &ItemCommon {
        match self {
            MenuItem::Group { common, .. }
            | MenuItem::Filter { common }
            | MenuItem::Link { common, .. }
            | MenuItem::Leaf { common, .. } => common,
        }
    }

    /// Returns the shared fields mutably.
    pub fn common_mut(&mut self) -> &mut ItemCommon {
        match self {
            MenuItem::Group { common, .. }
            | MenuItem::Filter { common }
            | MenuItem::Link { common, .. }
            | MenuItem::Leaf { common, .. } => common,
        }
    }

    /// Returns the item id.
    pub fn id(&self) -> &ItemId {
        &self.common().id
    }

    /// Returns the `type` tag as written in configuration.
    pub fn kind(&self) -> &str {
        match self {
            MenuItem::Group { .. } => "group",
            MenuItem::Filter { .. } => "filter",
            MenuItem::Link { .. } => "link",
            MenuItem::Leaf { kind, .. } => kind.as_deref().unwrap_or(""),
        }
    }

    /// Returns the children of a group.
    pub fn children(&self) -> Option<&[MenuItem]> {
        match self {
            MenuItem::Group { items, .. } => Some(items),
            _ => None,
        }
    }

    /// Returns the display label (`label`, falling back to `labelId`).
    pub fn label(&self) -> Option<&str> {
        let fields = &self.common().fields;
        fields
            .get("label")
            .or_else(|| fields.get("labelId"))
            .and_then(Value::as_str)
    }

    /// Converts the item back to its configuration form.
    ///
    /// The visibility condition is always written under `visibleIf`.
    pub fn to_value(&self) -> Value {
        let common = self.common();
        let mut map = Map::new();
        map.insert("id".to_string(), id_value(&common.id));

        match self {
            MenuItem::Leaf { kind: None, .. } => {}
            _ => {
                map.insert("type".to_string(), Value::String(self.kind().to_string()));
            }
        }

        for (key, value) in &common.fields {
            map.insert(key.clone(), value.clone());
        }

        match self {
            MenuItem::Group { items, .. } => {
                map.insert(
                    "items".to_string(),
                    Value::Array(items.iter().map(MenuItem::to_value).collect()),
                );
            }
            MenuItem::Link { href, .. } => {
                map.insert("href".to_string(), Value::String(href.clone()));
            }
            MenuItem::Filter { .. } | MenuItem::Leaf { .. } => {}
        }

        if let Some(condition) = &common.visibility {
            map.insert(VISIBLE_IF_KEY.to_string(), condition.to_value());
        }
        if let Some(authenticated) = common.authenticated {
            map.insert(AUTHENTICATED_KEY.to_string(), Value::Bool(authenticated));
        }
        if !common.requires.is_empty() {
            map.insert(
                REQUIRES_KEY.to_string(),
                Value::Array(common.requires.iter().map(Requirement::to_value).collect()),
            );
        }

        Value::Object(map)
    }
}

impl Serialize for MenuItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

fn id_value(id: &ItemId) -> Value {
    match id {
        ItemId::Number(n) => Value::from(*n),
        ItemId::Text(s) => Value::String(s.clone()),
    }
}

/// Loads menu items from configuration values.
///
/// Malformed nodes never fail loading: they become leaves and a diagnostic
/// is recorded. Only condition and requirement shapes fail, and only in
/// [`LoadMode::Strict`].
#[derive(Debug, Default)]
pub struct MenuLoader {
    mode: LoadMode,
    diagnostics: Vec<Diagnostic>,
}

impl MenuLoader {
    /// Creates a new loader.
    pub fn new(mode: LoadMode) -> Self {
        Self {
            mode,
            diagnostics: Vec::new(),
        }
    }

    /// Returns the load mode.
    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    /// Loads a list of items. `location` names the list in diagnostics.
    ///
    /// # Errors
    ///
    /// Returns an error for unsupported conditions or requirements in strict
    /// mode.
    pub fn load_items(&mut self, items: &[Value], location: &str) -> ConfigResult<Vec<MenuItem>> {
        items
            .iter()
            .enumerate()
            .map(|(index, value)| self.load_item(value, index, &format!("{location}[{index}]")))
            .collect()
    }

    /// Loads a single item found at `index` of its parent list.
    ///
    /// # Errors
    ///
    /// Returns an error for unsupported conditions or requirements in strict
    /// mode.
    pub fn load_item(&mut self, value: &Value, index: usize, location: &str) -> ConfigResult<MenuItem> {
        let default_id = ItemId::Number(index as i64);

        let Value::Object(map) = value else {
            self.record(location, "menu item is not an object; kept as an empty leaf");
            return Ok(MenuItem::leaf(ItemCommon::new(default_id), None));
        };

        let mut fields = map.clone();
        let id = item_id(fields.remove("id"), default_id);
        let visibility = self.load_visibility(&mut fields, location)?;
        let mut requires = self.load_requirements(&mut fields, location)?;
        let authenticated = self.load_authenticated(&mut fields, location, &mut requires)?;

        let kind = match fields.get("type") {
            Some(Value::String(kind)) => {
                let kind = kind.clone();
                fields.remove("type");
                Some(kind)
            }
            // Non-string tags stay as display fields
            Some(_) => {
                self.record(location, "menu item 'type' is not a string; treated as a leaf");
                None
            }
            None => None,
        };

        let mut common = ItemCommon {
            id,
            visibility,
            authenticated,
            requires,
            fields,
        };

        let item = match kind.as_deref() {
            Some("group") => match common.fields.get("items") {
                Some(Value::Array(children)) => {
                    let children = children.clone();
                    common.fields.remove("items");
                    let items = self.load_items(&children, &format!("{location}.items"))?;
                    MenuItem::Group { common, items }
                }
                _ => {
                    self.record(location, "group has no 'items' array; treated as a leaf");
                    MenuItem::Leaf { common, kind }
                }
            },
            Some("filter") => MenuItem::Filter { common },
            Some("link") => match common.fields.get("href") {
                Some(Value::String(href)) => {
                    let href = href.clone();
                    common.fields.remove("href");
                    MenuItem::Link { common, href }
                }
                _ => {
                    self.record(location, "link has no string 'href'; treated as a leaf");
                    MenuItem::Leaf { common, kind }
                }
            },
            _ => MenuItem::Leaf { common, kind },
        };

        Ok(item)
    }

    /// Returns the diagnostics recorded so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes the loader, returning its diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub(crate) fn record(&mut self, location: &str, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(Some(location.to_string()), message);
        tracing::warn!(location, "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    fn load_visibility(
        &mut self,
        fields: &mut Map<String, Value>,
        location: &str,
    ) -> ConfigResult<Option<Condition>> {
        let visible_if = fields.remove(VISIBLE_IF_KEY);
        let disable_if = fields.remove(DISABLE_IF_KEY);

        let raw = match (visible_if, disable_if) {
            (Some(raw), Some(_)) => {
                self.record(location, "both 'visibleIf' and 'disableIf' set; using 'visibleIf'");
                raw
            }
            (Some(raw), None) | (None, Some(raw)) => raw,
            (None, None) => return Ok(None),
        };

        match self.mode {
            LoadMode::Strict => ConditionParser::parse(&raw)
                .map(Some)
                .map_err(|source| ConfigError::Condition {
                    location: location.to_string(),
                    source,
                }),
            LoadMode::Lenient => {
                let condition = ConditionParser::parse_lenient(&raw);
                if let Condition::Invalid { reason, .. } = &condition {
                    let message = format!("invalid condition kept, item will be hidden: {reason}");
                    self.record(location, message);
                }
                Ok(Some(condition))
            }
        }
    }

    fn load_authenticated(
        &mut self,
        fields: &mut Map<String, Value>,
        location: &str,
        requires: &mut Vec<Requirement>,
    ) -> ConfigResult<Option<bool>> {
        match fields.remove(AUTHENTICATED_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(b)),
            Some(other) => {
                let mut wrapped = Map::new();
                wrapped.insert(AUTHENTICATED_KEY.to_string(), other.clone());
                let raw = Value::Object(wrapped);
                match self.mode {
                    LoadMode::Strict => Err(ConfigError::UnknownRequirement {
                        location: location.to_string(),
                        requirement: raw.to_string(),
                    }),
                    LoadMode::Lenient => {
                        self.record(
                            location,
                            format!("non-boolean 'authenticated' kept, item will be hidden: {other}"),
                        );
                        requires.push(Requirement::Unknown(raw));
                        Ok(None)
                    }
                }
            }
        }
    }

    fn load_requirements(
        &mut self,
        fields: &mut Map<String, Value>,
        location: &str,
    ) -> ConfigResult<Vec<Requirement>> {
        let raw = match fields.remove(REQUIRES_KEY) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(list)) => list,
            Some(single) => vec![single],
        };

        let mut requires = Vec::with_capacity(raw.len());
        for value in raw {
            let requirement = Requirement::from_value(&value);
            if let Requirement::Unknown(raw) = &requirement {
                match self.mode {
                    LoadMode::Strict => {
                        return Err(ConfigError::UnknownRequirement {
                            location: location.to_string(),
                            requirement: raw.to_string(),
                        })
                    }
                    LoadMode::Lenient => {
                        let message = format!("unknown requirement kept, item will be hidden: {raw}");
                        self.record(location, message);
                    }
                }
            }
            requires.push(requirement);
        }
        Ok(requires)
    }
}

/// Applies the index fallback to a raw id. Falsy ids (`null`, `false`, `""`
/// and `0`) fall back to the index.
fn item_id(raw: Option<Value>, default_id: ItemId) -> ItemId {
    match raw {
        None | Some(Value::Null) | Some(Value::Bool(false)) => default_id,
        Some(Value::String(s)) if s.is_empty() => default_id,
        Some(Value::String(s)) => ItemId::Text(s),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(0) => default_id,
            Some(n) => ItemId::Number(n),
            None if n.as_f64() == Some(0.0) => default_id,
            None => ItemId::Text(n.to_string()),
        },
        Some(other) => ItemId::Text(other.to_string()),
    }
}
