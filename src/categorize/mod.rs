//! Grocery item categorization.
//!
//! Maps a free-text item name ("Frozen peas", "Vollkornbrot") to one of the
//! fixed [`Category`] values using a multilingual keyword table:
//!
//! 1. Override rules resolve lexically ambiguous names first (anything frozen
//!    is Frozen Foods, "coffee beans" is a beverage, and so on).
//! 2. Otherwise the longest keyword found anywhere in the name wins.
//! 3. Names with no matching keyword fall back to [`Category::Other`].
//!
//! # Example
//!
//! ```
//! use shoplist::categorize::{categorize, Category};
//!
//! assert_eq!(categorize("Green Beans"), Category::Vegetables);
//! assert_eq!(categorize("frozen beef"), Category::FrozenFoods);
//! assert_eq!(categorize("xyz123"), Category::Other);
//! ```

mod category;
mod keywords;

pub use category::{slugify, Category, CategoryParseError};
pub use keywords::{KeywordTable, OverrideRule};

use std::sync::OnceLock;

static DEFAULT_CATEGORIZER: OnceLock<Categorizer> = OnceLock::new();

/// Categorize using the built-in keyword table.
pub fn categorize(item_name: &str) -> Category {
    DEFAULT_CATEGORIZER
        .get_or_init(Categorizer::default)
        .categorize(item_name)
}

/// Keyword-table driven categorizer. Stateless apart from its table.
#[derive(Debug, Clone, Default)]
pub struct Categorizer {
    table: KeywordTable,
}

impl Categorizer {
    pub fn new(table: KeywordTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    /// Assign a category to `item_name`. Total and case-insensitive.
    pub fn categorize(&self, item_name: &str) -> Category {
        let lowered = item_name.to_lowercase();

        if let Some(rule) = self.table.overrides().iter().find(|r| r.matches(&lowered)) {
            return rule.category;
        }

        // Longest keyword wins; strict `>` keeps the first match on ties so the
        // result only depends on table order.
        let mut best: Option<(Category, usize)> = None;
        for (category, words) in self.table.entries() {
            for word in words {
                if !lowered.contains(word.as_str()) {
                    continue;
                }
                let len = word.chars().count();
                if best.map_or(true, |(_, best_len)| len > best_len) {
                    best = Some((category, len));
                }
            }
        }

        best.map_or(Category::Other, |(category, _)| category)
    }
}
