//! Memoized configuration projection.

use serde_json::Value;

use crate::projection::{get_parsed_configuration, projection_inputs, LocalConfig, ParsedConfiguration};
use crate::state::MonitoredState;

/// Recomputes the parsed configuration only when its inputs change.
///
/// The inputs are the monitored state snapshot and the raw user at
/// `security.user`. State changes outside those paths reuse the last result.
#[derive(Debug)]
pub struct ConfigurationSelector {
    local: LocalConfig,
    last: Option<(SelectorKey, ParsedConfiguration)>,
    recomputations: usize,
}

#[derive(Debug, PartialEq)]
struct SelectorKey {
    monitored: MonitoredState,
    user: Option<Value>,
}

impl ConfigurationSelector {
    /// Creates a selector over a loaded local configuration.
    pub fn new(local: LocalConfig) -> Self {
        Self {
            local,
            last: None,
            recomputations: 0,
        }
    }

    /// Returns the local configuration.
    pub fn local(&self) -> &LocalConfig {
        &self.local
    }

    /// Returns the parsed configuration for `state`.
    pub fn select(&mut self, state: &Value) -> &ParsedConfiguration {
        let (monitored, user) = projection_inputs(&self.local, state);
        let key = SelectorKey { monitored, user };

        let entry = match self.last.take() {
            Some((last_key, parsed)) if last_key == key => (last_key, parsed),
            _ => {
                self.recomputations += 1;
                tracing::debug!(recomputations = self.recomputations, "recomputing menu projection");
                (key, get_parsed_configuration(&self.local, state))
            }
        };

        &self.last.insert(entry).1
    }

    /// Number of times the projection was actually computed.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    /// Drops the memoized result.
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::LoadMode;
    use crate::projection::TreeName;
    use serde_json::json;

    fn local() -> LocalConfig {
        LocalConfig::from_value(
            &json!({
                "geoNodeConfiguration": {
                    "navbar": {"items": [
                        {"id": "upload", "type": "link", "href": "/upload", "authenticated": true},
                        {"id": "about", "type": "link", "href": "/about"}
                    ]}
                }
            }),
            LoadMode::Strict,
        )
        .unwrap()
    }

    #[test]
    fn test_select_reuses_result_for_same_inputs() {
        let mut selector = ConfigurationSelector::new(local());
        let state = json!({"security": {}, "router": {"location": {"pathname": "/"}}});

        assert_eq!(selector.select(&state).allowed(TreeName::Navbar).len(), 1);
        assert_eq!(selector.select(&state).allowed(TreeName::Navbar).len(), 1);
        assert_eq!(selector.recomputations(), 1);
    }

    #[test]
    fn test_select_ignores_unmonitored_changes() {
        let mut selector = ConfigurationSelector::new(local());
        selector.select(&json!({"security": {}, "catalog": {"page": 1}}));
        selector.select(&json!({"security": {}, "catalog": {"page": 2}}));

        assert_eq!(selector.recomputations(), 1);
    }

    #[test]
    fn test_select_recomputes_on_route_change() {
        let mut selector = ConfigurationSelector::new(local());
        selector.select(&json!({"router": {"location": {"pathname": "/"}}}));
        selector.select(&json!({"router": {"location": {"pathname": "/catalogue"}}}));

        assert_eq!(selector.recomputations(), 2);
    }

    #[test]
    fn test_select_recomputes_on_login() {
        let mut selector = ConfigurationSelector::new(local());
        let anonymous = selector.select(&json!({"security": {}})).clone();
        let user = selector
            .select(&json!({"security": {"user": {"name": "alice"}}}))
            .clone();

        assert_eq!(anonymous.allowed(TreeName::Navbar).len(), 1);
        assert_eq!(user.allowed(TreeName::Navbar).len(), 2);
        assert_eq!(selector.recomputations(), 2);
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let mut selector = ConfigurationSelector::new(local());
        let state = json!({});
        selector.select(&state);
        selector.invalidate();
        selector.select(&state);

        assert_eq!(selector.recomputations(), 2);
    }
}
