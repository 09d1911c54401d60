//! Recursive filtering of menu trees.

use super::item::MenuItem;

/// Filters a menu tree with `predicate`, returning a new tree.
///
/// Groups are filtered children-first and kept only if the predicate holds
/// for the group itself and at least one child survives. Other items are
/// kept iff the predicate holds. Surviving siblings keep their order and the
/// input is not modified.
///
/// # Example
///
/// ```
/// use geonode_menu_rs::menu::{filter_tree, ItemCommon, MenuItem};
///
/// let tree = vec![MenuItem::group(
///     ItemCommon::new(1),
///     vec![MenuItem::filter(ItemCommon::new(2))],
/// )];
///
/// assert!(filter_tree(&tree, &mut |item| item.kind() != "filter").is_empty());
/// assert_eq!(filter_tree(&tree, &mut |_| true), tree);
/// ```
pub fn filter_tree<P>(items: &[MenuItem], predicate: &mut P) -> Vec<MenuItem>
where
    P: FnMut(&MenuItem) -> bool,
{
    let mut allowed = Vec::with_capacity(items.len());

    for item in items {
        match item {
            MenuItem::Group { common, items } => {
                let children = filter_tree(items, predicate);
                if predicate(item) && !children.is_empty() {
                    allowed.push(MenuItem::Group {
                        common: common.clone(),
                        items: children,
                    });
                }
            }
            _ => {
                if predicate(item) {
                    allowed.push(item.clone());
                }
            }
        }
    }

    allowed
}

/// Replaces every group by its direct children, one level deep.
pub fn flatten_one_level(items: &[MenuItem]) -> Vec<MenuItem> {
    items
        .iter()
        .flat_map(|item| match item {
            MenuItem::Group { items, .. } => items.clone(),
            other => vec![other.clone()],
        })
        .collect()
}

/// Rebuilds a tree by applying `f` to every node.
///
/// The children of a mapped group are replaced by the mapped children of
/// the original group, so `f` only has to handle the node itself.
pub fn map_tree<F>(items: &[MenuItem], f: &mut F) -> Vec<MenuItem>
where
    F: FnMut(&MenuItem) -> MenuItem,
{
    items
        .iter()
        .map(|item| {
            let mut mapped = f(item);
            if let (MenuItem::Group { items: mapped_children, .. }, Some(children)) =
                (&mut mapped, item.children())
            {
                *mapped_children = map_tree(children, f);
            }
            mapped
        })
        .collect()
}

/// Counts every node of a tree.
pub fn count_nodes(items: &[MenuItem]) -> usize {
    items
        .iter()
        .map(|item| 1 + item.children().map_or(0, count_nodes))
        .sum()
}
