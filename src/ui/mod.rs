//! Terminal presentation: notifications, pending items and the grouped list.

mod console;
mod list;

pub use console::ConsoleView;
pub use list::{group_by_category, render_list};
