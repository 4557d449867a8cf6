use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Grocery category assigned to a shopping list item.
///
/// Serialized by display name (`"Meat & Poultry"`), which is also the value
/// the list server stores in its `category` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Fruits,
    Vegetables,
    Dairy,
    Bakery,
    #[serde(rename = "Meat & Poultry")]
    MeatPoultry,
    #[serde(rename = "Fish & Seafood")]
    FishSeafood,
    #[serde(rename = "Pantry Staples")]
    PantryStaples,
    #[serde(rename = "Frozen Foods")]
    FrozenFoods,
    Beverages,
    Household,
    Other,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown category: {0}")]
pub struct CategoryParseError(pub String);

impl Category {
    /// Every category in display order. `Other` is always last.
    pub const ALL: [Category; 11] = [
        Category::Fruits,
        Category::Vegetables,
        Category::Dairy,
        Category::Bakery,
        Category::MeatPoultry,
        Category::FishSeafood,
        Category::PantryStaples,
        Category::FrozenFoods,
        Category::Beverages,
        Category::Household,
        Category::Other,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Fruits => "Fruits",
            Category::Vegetables => "Vegetables",
            Category::Dairy => "Dairy",
            Category::Bakery => "Bakery",
            Category::MeatPoultry => "Meat & Poultry",
            Category::FishSeafood => "Fish & Seafood",
            Category::PantryStaples => "Pantry Staples",
            Category::FrozenFoods => "Frozen Foods",
            Category::Beverages => "Beverages",
            Category::Household => "Household",
            Category::Other => "Other",
        }
    }

    /// Identifier-safe form of the display name, e.g. `meat-and-poultry`.
    pub fn slug(self) -> String {
        slugify(self.as_str())
    }

    /// Map a stored category name to a category, falling back to `Other`.
    ///
    /// Server rows may carry free-form category strings; anything unknown is
    /// grouped under `Other` when displaying a list.
    pub fn from_name_lossy(name: &str) -> Category {
        name.parse().unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CategoryParseError(wanted.to_string()))
    }
}

/// Slugify an arbitrary category name. Empty names slug to `other`.
pub fn slugify(name: &str) -> String {
    if name.is_empty() {
        return "other".to_string();
    }
    name.to_lowercase().replace(" & ", "-and-").replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_round_trip_through_parse() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("frozen foods".parse::<Category>(), Ok(Category::FrozenFoods));
        assert_eq!("  DAIRY ".parse::<Category>(), Ok(Category::Dairy));
    }

    #[test]
    fn test_parse_unknown_category() {
        let err = "Produce".parse::<Category>().unwrap_err();
        assert_eq!(err, CategoryParseError("Produce".to_string()));
        assert!(err.to_string().contains("Produce"));
    }

    #[test]
    fn test_lossy_falls_back_to_other() {
        assert_eq!(Category::from_name_lossy("Test"), Category::Other);
        assert_eq!(Category::from_name_lossy("Bakery"), Category::Bakery);
    }

    #[test]
    fn test_slugs() {
        assert_eq!(Category::MeatPoultry.slug(), "meat-and-poultry");
        assert_eq!(Category::PantryStaples.slug(), "pantry-staples");
        assert_eq!(Category::Dairy.slug(), "dairy");
        assert_eq!(slugify(""), "other");
    }

    #[test]
    fn test_serde_uses_display_name() {
        let json = serde_json::to_string(&Category::FishSeafood).unwrap();
        assert_eq!(json, "\"Fish & Seafood\"");
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Category::FishSeafood);
    }

    #[test]
    fn test_other_is_last() {
        assert_eq!(Category::ALL.last(), Some(&Category::Other));
    }
}
