//! Menu trees: item model, permission checks and recursive filtering.
//!
//! # Item Shapes
//!
//! - `{"type": "group", "items": [...]}` - [`MenuItem::Group`]
//! - `{"type": "filter", ...}` - [`MenuItem::Filter`]
//! - `{"type": "link", "href": "..."}` - [`MenuItem::Link`]
//! - anything else - [`MenuItem::Leaf`]
//!
//! Every item may declare `visibleIf` (alias `disableIf`), `authenticated`
//! and `requires`; all other keys are passed through untouched.
//!
//! # Example
//!
//! ```
//! use geonode_menu_rs::expression::Evaluator;
//! use geonode_menu_rs::menu::{filter_tree, is_item_allowed, LoadMode, MenuLoader, UserState};
//! use geonode_menu_rs::state::MonitoredState;
//! use serde_json::{json, Map};
//!
//! let raw = json!([
//!     {"id": "upload", "type": "link", "href": "/upload", "authenticated": true},
//!     {"id": "about", "type": "link", "href": "/about"}
//! ]);
//! let mut loader = MenuLoader::new(LoadMode::Strict);
//! let items = loader.load_items(raw.as_array().unwrap(), "navbar.items").unwrap();
//!
//! let state = MonitoredState::default();
//! let context = Map::new();
//! let mut evaluator = Evaluator::new(&state, &context);
//! let user_state = UserState::anonymous();
//!
//! let allowed = filter_tree(&items, &mut |item| is_item_allowed(&user_state, item, &mut evaluator));
//! assert_eq!(allowed.len(), 1);
//! assert_eq!(allowed[0].id().to_string(), "about");
//! ```

mod item;
mod permission;
mod tree;

pub use item::{ItemCommon, ItemId, LoadMode, MenuItem, MenuLoader};
pub use permission::{is_item_allowed, Requirement, UserRecord, UserState};
pub use tree::{count_nodes, filter_tree, flatten_one_level, map_tree};
