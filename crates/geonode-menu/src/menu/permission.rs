//! Role and ownership checks for menu items.
//!
//! These checks decide what is *shown*. They are not an authorization layer:
//! privileged actions behind a visible item are still checked by the server.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::item::MenuItem;
use crate::expression::Evaluator;
use crate::state::{get_path, USER_STATE_PATH};

/// The logged-in user, as far as menu filtering is concerned.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserRecord {
    /// Primary key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pk: Option<Value>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Login name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Superusers pass every role and ownership requirement.
    #[serde(default)]
    pub is_superuser: bool,
    /// Staff flag.
    #[serde(default)]
    pub is_staff: bool,
    /// Granted permission codes.
    #[serde(default)]
    pub perms: Vec<String>,
    /// Group names.
    #[serde(default)]
    pub groups: Vec<String>,
}

impl UserRecord {
    /// Creates a user with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Reads a user record from a state value.
    ///
    /// Unreadable fields are ignored rather than rejected, so any object is
    /// a user. `null` and non-objects are anonymous.
    pub fn from_value(value: &Value) -> Option<UserRecord> {
        let Value::Object(map) = value else {
            return None;
        };

        Some(UserRecord {
            pk: map.get("pk").filter(|v| !v.is_null()).cloned(),
            name: string_field(map, "name"),
            username: string_field(map, "username"),
            is_superuser: map.get("is_superuser").and_then(Value::as_bool).unwrap_or(false),
            is_staff: map.get("is_staff").and_then(Value::as_bool).unwrap_or(false),
            perms: string_list(map.get("perms")),
            groups: string_list(map.get("groups")),
        })
    }

    /// Returns true if `owner` names this user.
    ///
    /// Matches the login name, the display name, or the primary key.
    pub fn is_owner(&self, owner: &Value) -> bool {
        match owner {
            Value::String(s) => {
                self.username.as_deref() == Some(s.as_str()) || self.name.as_deref() == Some(s.as_str())
            }
            Value::Number(_) => self.pk.as_ref() == Some(owner),
            // Owner objects as returned by the resource API
            Value::Object(map) => ["username", "name", "pk"]
                .iter()
                .filter_map(|key| map.get(*key))
                .any(|v| !v.is_object() && self.is_owner(v)),
            _ => false,
        }
    }

    /// Returns true if the user holds the permission code.
    pub fn has_perm(&self, perm: &str) -> bool {
        self.perms.iter().any(|p| p == perm)
    }

    /// Returns true if the user belongs to the group.
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Collects strings from a list, accepting `{"name": ...}` entries too.
fn string_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => string_field(map, "name").or_else(|| string_field(map, "slug")),
            _ => None,
        })
        .collect()
}

/// Session context for permission checks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserState {
    /// The logged-in user; `None` means anonymous.
    pub user: Option<UserRecord>,
}

impl UserState {
    /// The anonymous session.
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    /// A session for the given user.
    pub fn with_user(user: UserRecord) -> Self {
        Self { user: Some(user) }
    }

    /// Reads the user from `security.user` in the application state.
    pub fn from_state(state: &Value) -> Self {
        Self {
            user: get_path(state, USER_STATE_PATH).and_then(UserRecord::from_value),
        }
    }

    /// Returns true if a user is logged in.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// An access requirement declared on a menu item.
#[derive(Debug, Clone, PartialEq)]
pub enum Requirement {
    /// A user must be logged in.
    Authenticated,
    /// No user may be logged in.
    Anonymous,
    /// The user must be a superuser.
    Superuser,
    /// The user must be staff (or superuser).
    Staff,
    /// The user must hold the permission code (or be superuser).
    Permission(String),
    /// The user must belong to the group.
    Group(String),
    /// The value at the given state path must name the user (or the user
    /// must be superuser).
    Owner(String),
    /// Unrecognized requirement; never satisfied.
    Unknown(Value),
}

impl Requirement {
    /// Reads a requirement from configuration.
    ///
    /// Accepts `"authenticated"`, `"anonymous"`, `"superuser"`, `"staff"`,
    /// `{"perm": p}`, `{"group": g}` and `{"owner": path}`. Anything else is
    /// [`Requirement::Unknown`].
    pub fn from_value(value: &Value) -> Requirement {
        match value {
            Value::String(s) => match s.to_lowercase().as_str() {
                "authenticated" => Requirement::Authenticated,
                "anonymous" => Requirement::Anonymous,
                "superuser" => Requirement::Superuser,
                "staff" => Requirement::Staff,
                _ => Requirement::Unknown(value.clone()),
            },
            Value::Object(map) if map.len() == 1 => {
                match map.iter().next() {
                    Some((key, Value::String(arg))) => match key.as_str() {
                        "perm" => Requirement::Permission(arg.clone()),
                        "group" => Requirement::Group(arg.clone()),
                        "owner" => Requirement::Owner(arg.clone()),
                        _ => Requirement::Unknown(value.clone()),
                    },
                    _ => Requirement::Unknown(value.clone()),
                }
            }
            _ => Requirement::Unknown(value.clone()),
        }
    }

    /// Converts the requirement back to its configuration form.
    pub fn to_value(&self) -> Value {
        match self {
            Requirement::Authenticated => json!("authenticated"),
            Requirement::Anonymous => json!("anonymous"),
            Requirement::Superuser => json!("superuser"),
            Requirement::Staff => json!("staff"),
            Requirement::Permission(p) => json!({ "perm": p }),
            Requirement::Group(g) => json!({ "group": g }),
            Requirement::Owner(path) => json!({ "owner": path }),
            Requirement::Unknown(raw) => raw.clone(),
        }
    }

    /// Checks the requirement against the session.
    ///
    /// `evaluator` resolves `owner` paths and records a diagnostic for
    /// unknown requirements.
    pub fn is_satisfied(&self, user_state: &UserState, evaluator: &mut Evaluator<'_>) -> bool {
        let user = user_state.user.as_ref();
        match self {
            Requirement::Authenticated => user.is_some(),
            Requirement::Anonymous => user.is_none(),
            Requirement::Superuser => user.is_some_and(|u| u.is_superuser),
            Requirement::Staff => user.is_some_and(|u| u.is_staff || u.is_superuser),
            Requirement::Permission(perm) => user.is_some_and(|u| u.is_superuser || u.has_perm(perm)),
            Requirement::Group(group) => user.is_some_and(|u| u.in_group(group)),
            Requirement::Owner(path) => {
                let Some(user) = user else {
                    return false;
                };
                user.is_superuser || evaluator.lookup(path).is_some_and(|owner| user.is_owner(owner))
            }
            Requirement::Unknown(raw) => {
                evaluator.record(format!("unknown requirement denies item: {raw}"));
                false
            }
        }
    }
}

/// Decides whether a menu item is shown to the session.
///
/// The item is allowed when its `authenticated` flag matches the session,
/// every requirement holds, and its visibility condition (if any) is truthy.
/// An item declaring nothing is allowed.
pub fn is_item_allowed(user_state: &UserState, item: &MenuItem, evaluator: &mut Evaluator<'_>) -> bool {
    let common = item.common();
    evaluator.set_subject(Some(common.id.to_string()));

    let allowed = common
        .authenticated
        .map_or(true, |required| required == user_state.is_authenticated())
        && common
            .requires
            .iter()
            .all(|requirement| requirement.is_satisfied(user_state, evaluator))
        && common
            .visibility
            .as_ref()
            .map_or(true, |condition| evaluator.is_truthy(condition));

    evaluator.set_subject(None);
    allowed
}
