//! Projection of the GeoNode menu configuration for the current session.
//!
//! [`get_parsed_configuration`] filters every named menu tree of the local
//! configuration against one snapshot of the application state and returns
//! the configuration augmented with one `*Allowed` list per tree.
//! [`get_custom_menu_filters`] extracts the search filters reachable from the
//! main menu and the filter form.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult};
use crate::expression::{resolve_fields, resolve_value, Condition, Diagnostic, Evaluator};
use crate::menu::{
    count_nodes, filter_tree, flatten_one_level, is_item_allowed, map_tree, LoadMode, MenuItem,
    MenuLoader, UserState,
};
use crate::state::{get_path, MonitorEntry, MonitoredState, USER_STATE_PATH};

/// Key of the monitored-state allow-list in the local configuration.
const MONITOR_STATE_KEY: &str = "monitorState";

/// Key of the menu configuration in the local configuration.
const GEONODE_CONFIGURATION_KEY: &str = "geoNodeConfiguration";

/// The named menu trees of a GeoNode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TreeName {
    /// Main menu, left aligned (`menu.items`).
    MenuLeft,
    /// Main menu, right aligned (`menu.rightItems`).
    MenuRight,
    /// Navigation bar (`navbar.items`).
    Navbar,
    /// Menu above the resource cards (`cardsMenu.items`).
    CardsMenu,
    /// Footer (`footer.items`).
    Footer,
    /// Options of a single resource card (`cardOptions.items`).
    CardOptions,
    /// Filter form (`filtersForm.items`).
    FiltersForm,
}

impl TreeName {
    /// Every tree, in projection order.
    pub const ALL: [TreeName; 7] = [
        TreeName::MenuLeft,
        TreeName::MenuRight,
        TreeName::Navbar,
        TreeName::CardsMenu,
        TreeName::Footer,
        TreeName::CardOptions,
        TreeName::FiltersForm,
    ];

    /// Path of the tree inside `geoNodeConfiguration`.
    pub fn source_path(self) -> &'static str {
        match self {
            TreeName::MenuLeft => "menu.items",
            TreeName::MenuRight => "menu.rightItems",
            TreeName::Navbar => "navbar.items",
            TreeName::CardsMenu => "cardsMenu.items",
            TreeName::Footer => "footer.items",
            TreeName::CardOptions => "cardOptions.items",
            TreeName::FiltersForm => "filtersForm.items",
        }
    }

    /// Key of the filtered projection in the augmented configuration.
    pub fn projection_key(self) -> &'static str {
        match self {
            TreeName::MenuLeft => "menuItemsLeftAllowed",
            TreeName::MenuRight => "menuItemsRightAllowed",
            TreeName::Navbar => "navbarItemsAllowed",
            TreeName::CardsMenu => "filterMenuItemsAllowed",
            TreeName::Footer => "footerMenuItemsAllowed",
            TreeName::CardOptions => "cardOptionsItemsAllowed",
            TreeName::FiltersForm => "filtersFormItemsAllowed",
        }
    }

    /// Short kebab-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            TreeName::MenuLeft => "menu-left",
            TreeName::MenuRight => "menu-right",
            TreeName::Navbar => "navbar",
            TreeName::CardsMenu => "cards-menu",
            TreeName::Footer => "footer",
            TreeName::CardOptions => "card-options",
            TreeName::FiltersForm => "filters-form",
        }
    }
}

impl fmt::Display for TreeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TreeName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TreeName::ALL
            .into_iter()
            .find(|name| name.as_str() == s || name.projection_key() == s || name.source_path() == s)
            .ok_or_else(|| ConfigError::invalid(format!("unknown menu tree: {s}")))
    }
}

/// The `geoNodeConfiguration` object with its menu trees loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuConfiguration {
    raw: Value,
    trees: BTreeMap<TreeName, Vec<MenuItem>>,
    diagnostics: Vec<Diagnostic>,
}

impl MenuConfiguration {
    /// Loads the menu trees of a `geoNodeConfiguration` object.
    ///
    /// A missing tree is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not an object, or in strict mode if a
    /// tree is not an array or holds an unsupported condition or
    /// requirement.
    pub fn from_value(raw: &Value, mode: LoadMode) -> ConfigResult<Self> {
        if !raw.is_object() {
            return Err(ConfigError::invalid(format!(
                "'{GEONODE_CONFIGURATION_KEY}' must be an object"
            )));
        }

        let mut loader = MenuLoader::new(mode);
        let mut trees = BTreeMap::new();

        for name in TreeName::ALL {
            let path = name.source_path();
            let items = match get_path(raw, path) {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => loader.load_items(items, path)?,
                Some(_) => match mode {
                    LoadMode::Strict => {
                        return Err(ConfigError::InvalidTree {
                            tree: path.to_string(),
                            reason: "expected an array of menu items".to_string(),
                        })
                    }
                    LoadMode::Lenient => {
                        loader.record(path, "menu tree is not an array; treated as empty");
                        Vec::new()
                    }
                },
            };
            trees.insert(name, items);
        }

        Ok(Self {
            raw: raw.clone(),
            trees,
            diagnostics: loader.into_diagnostics(),
        })
    }

    /// Returns the configuration as it was loaded.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Returns the unfiltered items of a tree.
    pub fn tree(&self, name: TreeName) -> &[MenuItem] {
        self.trees.get(&name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the problems recovered while loading.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// The application's local configuration, restricted to what menu
/// projection needs.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalConfig {
    /// Allow-list of state paths visible to expressions.
    pub monitor_state: Vec<MonitorEntry>,
    /// The menu configuration.
    pub configuration: MenuConfiguration,
}

impl LocalConfig {
    /// Parses a local configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid JSON or an invalid configuration.
    pub fn from_json_str(json: &str, mode: LoadMode) -> ConfigResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value, mode)
    }

    /// Loads a local configuration from a JSON value.
    ///
    /// A missing `monitorState` uses [`MonitorEntry::defaults`]; a missing
    /// `geoNodeConfiguration` has no menu items.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an object, if `monitorState` is
    /// not a list of `{name, path}` entries, or if the menu configuration
    /// fails to load.
    pub fn from_value(value: &Value, mode: LoadMode) -> ConfigResult<Self> {
        let Value::Object(map) = value else {
            return Err(ConfigError::invalid("local configuration must be an object"));
        };

        let monitor_state = match map.get(MONITOR_STATE_KEY) {
            None | Some(Value::Null) => MonitorEntry::defaults(),
            Some(entries) => serde_json::from_value(entries.clone()).map_err(|e| {
                ConfigError::invalid(format!("'{MONITOR_STATE_KEY}' must be a list of {{name, path}}: {e}"))
            })?,
        };

        let empty = Value::Object(Map::new());
        let raw = map.get(GEONODE_CONFIGURATION_KEY).unwrap_or(&empty);
        let configuration = MenuConfiguration::from_value(raw, mode)?;

        Ok(Self {
            monitor_state,
            configuration,
        })
    }

    /// Returns the problems recovered while loading.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.configuration.diagnostics()
    }
}

/// The configuration augmented with the filtered trees.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedConfiguration {
    /// The unfiltered `geoNodeConfiguration`.
    pub configuration: Value,
    /// One filtered projection per tree.
    pub allowed: BTreeMap<TreeName, Vec<MenuItem>>,
    /// Problems recovered during the pass.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedConfiguration {
    /// Returns the filtered items of a tree.
    pub fn allowed(&self, name: TreeName) -> &[MenuItem] {
        self.allowed.get(&name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the original configuration with the `*Allowed` keys added.
    pub fn to_value(&self) -> Value {
        let mut map = match &self.configuration {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        for name in TreeName::ALL {
            let items = self.allowed(name).iter().map(MenuItem::to_value).collect();
            map.insert(name.projection_key().to_string(), Value::Array(items));
        }
        Value::Object(map)
    }
}

impl Serialize for ParsedConfiguration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Everything read from the application state for one pass.
struct Snapshot {
    monitored: MonitoredState,
    context: Map<String, Value>,
    user_state: UserState,
}

impl Snapshot {
    fn capture(local: &LocalConfig, state: &Value) -> Self {
        let monitored = MonitoredState::capture(state, &local.monitor_state);
        let user_state = UserState::from_state(state);

        let mut context = Map::new();
        if let Some(user) = get_path(state, USER_STATE_PATH).filter(|_| user_state.is_authenticated()) {
            context.insert("user".to_string(), user.clone());
        }

        Self {
            monitored,
            context,
            user_state,
        }
    }

    fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.monitored, &self.context)
    }
}

/// Filters one tree and resolves display templates in what survives.
fn project_tree(items: &[MenuItem], user_state: &UserState, evaluator: &mut Evaluator<'_>) -> Vec<MenuItem> {
    let allowed = filter_tree(items, &mut |item| is_item_allowed(user_state, item, evaluator));
    map_tree(&allowed, &mut |item| resolve_item(item, evaluator))
}

fn resolve_item(item: &MenuItem, evaluator: &mut Evaluator<'_>) -> MenuItem {
    let mut resolved = item.clone();
    evaluator.set_subject(Some(item.id().to_string()));
    let fields = resolve_fields(&item.common().fields, evaluator);
    resolved.common_mut().fields = fields;

    if let MenuItem::Link { href, .. } = &mut resolved {
        match resolve_value(&Value::String(href.clone()), evaluator) {
            Some(Value::String(s)) => *href = s,
            Some(Value::Null) | None => {}
            Some(other) => *href = other.to_string(),
        }
    }
    evaluator.set_subject(None);
    resolved
}

/// Projects every menu tree of the configuration for the current session.
///
/// The monitored state is captured once and shared by every tree. The
/// original configuration is returned unchanged next to the projections.
///
/// # Example
///
/// ```
/// use geonode_menu_rs::{get_parsed_configuration, LoadMode, LocalConfig, TreeName};
/// use serde_json::json;
///
/// let local = LocalConfig::from_value(&json!({
///     "geoNodeConfiguration": {
///         "navbar": {"items": [
///             {"id": "upload", "type": "link", "href": "/upload", "authenticated": true},
///             {"id": "about", "type": "link", "href": "/about"}
///         ]}
///     }
/// }), LoadMode::Strict).unwrap();
///
/// let parsed = get_parsed_configuration(&local, &json!({"security": {}}));
/// assert_eq!(parsed.allowed(TreeName::Navbar).len(), 1);
/// ```
pub fn get_parsed_configuration(local: &LocalConfig, state: &Value) -> ParsedConfiguration {
    let snapshot = Snapshot::capture(local, state);
    let mut evaluator = snapshot.evaluator();

    let mut allowed = BTreeMap::new();
    for name in TreeName::ALL {
        let source = local.configuration.tree(name);
        let projected = project_tree(source, &snapshot.user_state, &mut evaluator);
        tracing::debug!(
            tree = %name,
            total = count_nodes(source),
            allowed = count_nodes(&projected),
            "projected menu tree"
        );
        allowed.insert(name, projected);
    }

    ParsedConfiguration {
        configuration: local.configuration.raw().clone(),
        allowed,
        diagnostics: evaluator.into_diagnostics(),
    }
}

/// Returns the search filters reachable from the main menu and the filter
/// form.
///
/// Both trees are filtered independently, one level of group nesting is
/// flattened, and only `filter` items are kept, main menu first.
pub fn get_custom_menu_filters(local: &LocalConfig, state: &Value) -> Vec<MenuItem> {
    let snapshot = Snapshot::capture(local, state);
    let mut evaluator = snapshot.evaluator();

    let menu = project_tree(
        local.configuration.tree(TreeName::MenuLeft),
        &snapshot.user_state,
        &mut evaluator,
    );
    let form = project_tree(
        local.configuration.tree(TreeName::FiltersForm),
        &snapshot.user_state,
        &mut evaluator,
    );

    flatten_one_level(&menu)
        .into_iter()
        .chain(flatten_one_level(&form))
        .filter(|item| matches!(item, MenuItem::Filter { .. }))
        .collect()
}

/// Evaluates one condition with the bindings a projection pass would use.
///
/// Returns the resolved value (`None` is undefined) and the diagnostics
/// recorded while evaluating.
pub fn evaluate_condition(
    local: &LocalConfig,
    state: &Value,
    condition: &Condition,
) -> (Option<Value>, Vec<Diagnostic>) {
    let snapshot = Snapshot::capture(local, state);
    let mut evaluator = snapshot.evaluator();
    let value = evaluator.evaluate(condition);
    (value, evaluator.into_diagnostics())
}

/// Returns the values a projection depends on: the monitored snapshot and
/// the raw user.
pub(crate) fn projection_inputs(local: &LocalConfig, state: &Value) -> (MonitoredState, Option<Value>) {
    let monitored = MonitoredState::capture(state, &local.monitor_state);
    let user = get_path(state, USER_STATE_PATH).cloned();
    (monitored, user)
}
