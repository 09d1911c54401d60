//! Output formatting utilities for the gnmenu CLI.
//!
//! This module provides functions for formatting data as tables or JSON:
//!
//! - [`menus`] - Projections, custom filters, check and eval results
//! - [`helpers`] - Common formatting utilities (truncation, item columns, diagnostics)

pub mod helpers;
mod menus;

pub use helpers::format_diagnostics;
pub use menus::{
    format_check_json, format_check_table, format_eval_json, format_eval_table, format_filters_json,
    format_filters_table, format_projection_json, format_projection_table,
};
