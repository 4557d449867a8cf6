use super::category::Category;

/// A precedence rule applied before keyword scanning.
///
/// If the lowercased item name contains any of `indicators`, the item is
/// assigned `category` outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideRule {
    pub indicators: Vec<String>,
    pub category: Category,
}

impl OverrideRule {
    pub fn new(category: Category, indicators: &[&str]) -> Self {
        Self {
            indicators: indicators.iter().map(|s| s.to_lowercase()).collect(),
            category,
        }
    }

    pub(crate) fn matches(&self, lowered: &str) -> bool {
        self.indicators.iter().any(|i| lowered.contains(i.as_str()))
    }
}

/// Keyword table and override rules used by the categorizer.
///
/// Immutable once built. Keywords are stored lowercased, in the order given,
/// and `Other` never owns any keywords.
#[derive(Debug, Clone)]
pub struct KeywordTable {
    entries: Vec<(Category, Vec<String>)>,
    overrides: Vec<OverrideRule>,
}

impl KeywordTable {
    pub fn new(entries: Vec<(Category, Vec<String>)>, overrides: Vec<OverrideRule>) -> Self {
        let entries = entries
            .into_iter()
            .filter(|(category, _)| *category != Category::Other)
            .map(|(category, words)| {
                let words = words
                    .into_iter()
                    .map(|w| w.to_lowercase())
                    .filter(|w| !w.is_empty())
                    .collect();
                (category, words)
            })
            .collect();
        Self { entries, overrides }
    }

    /// The built-in English/German grocery table.
    pub fn builtin() -> Self {
        let entries = BUILTIN_KEYWORDS
            .iter()
            .map(|(category, words)| (*category, words.iter().map(|w| w.to_string()).collect()))
            .collect();
        let overrides = vec![
            OverrideRule::new(Category::FrozenFoods, &["frozen", "tiefkühl", "tk-"]),
            OverrideRule::new(Category::Beverages, &["juice", "saft"]),
            OverrideRule::new(Category::Beverages, &["coffee", "kaffee"]),
            OverrideRule::new(
                Category::Household,
                &["toilet paper", "toilettenpapier", "klopapier"],
            ),
            OverrideRule::new(Category::PantryStaples, &["chocolate", "schokolade"]),
        ];
        Self::new(entries, overrides)
    }

    pub fn entries(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.entries.iter().map(|(c, w)| (*c, w.as_slice()))
    }

    pub fn overrides(&self) -> &[OverrideRule] {
        &self.overrides
    }

    /// Keywords owned by `category`. Always empty for `Other`.
    pub fn keywords_for(&self, category: Category) -> &[String] {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, w)| w.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Fruits,
        &[
            "apple", "apfel", "banana", "banane", "orange", "beeren", "berries", "grape",
            "traube", "mango", "pineapple", "ananas", "avocado", "peach", "pfirsich", "plum",
            "pflaume", "strawberry", "erdbeere", "raspberry", "himbeere", "blueberry",
            "blaubeere", "heidelbeere", "kiwi", "lemon", "zitrone", "lime", "limette",
        ],
    ),
    (
        Category::Vegetables,
        &[
            "carrot", "karotte", "möhre", "broccoli", "brokkoli", "spinach", "spinat", "onion",
            "zwiebel", "garlic", "knoblauch", "potato", "kartoffel", "tomato", "tomate",
            "lettuce", "salat", "kopfsalat", "cabbage", "kohl", "pepper", "paprika", "cucumber",
            "gurke", "zucchini", "celery", "sellerie", "corn", "mais", "mushroom", "pilz",
            "champignon", "pea", "erbse", "green beans", "grüne bohnen",
        ],
    ),
    (
        Category::Dairy,
        &[
            "milk", "milch", "cheese", "käse", "yogurt", "joghurt", "butter", "cream", "sahne",
            "quark", "sour cream", "saure sahne", "schmand", "cottage cheese", "hüttenkäse",
            "körniger frischkäse",
        ],
    ),
    (
        Category::Bakery,
        &[
            "bread", "brot", "rolls", "brötchen", "bagel", "croissant", "muffin", "cake",
            "kuchen", "donuts", "donut", "cookies", "kekse", "plätzchen", "pie", "obstkuchen",
        ],
    ),
    (
        Category::MeatPoultry,
        &[
            "chicken", "huhn", "hähnchen", "beef", "rindfleisch", "pork", "schweinefleisch",
            "turkey", "pute", "putenfleisch", "sausage", "wurst", "würstchen", "bacon", "speck",
            "lamb", "lamm", "lammfleisch", "ham", "schinken", "mince", "hackfleisch",
            "ground meat",
        ],
    ),
    (
        Category::FishSeafood,
        &[
            "salmon", "lachs", "tuna", "thunfisch", "shrimp", "garnele", "krabbe", "cod",
            "kabeljau", "dorsch", "tilapia", "crab", "krebs", "lobster", "hummer", "herring",
            "hering", "trout", "forelle",
        ],
    ),
    (
        Category::PantryStaples,
        &[
            "pasta", "nudeln", "rice", "reis", "flour", "mehl", "sugar", "zucker", "oil", "öl",
            "vinegar", "essig", "spices", "gewürze", "herbs", "kräuter", "canned goods",
            "konserven", "dosenware", "beans", "bohnen", "lentils", "linsen", "cereal", "müsli",
            "cornflakes", "getreideflocken", "oats", "haferflocken", "jam", "marmelade", "honey",
            "honig", "peanut butter", "erdnussbutter", "nuts", "nüsse", "seeds", "samen",
            "kerne", "broth", "brühe", "soup", "suppe", "chocolate", "schokolade", "ketchup",
            "mustard", "senf", "mayonnaise", "mayo",
        ],
    ),
    (
        Category::FrozenFoods,
        &[
            "ice cream", "eis", "eiscreme", "frozen vegetables", "tiefkühlgemüse", "tk-gemüse",
            "frozen fruit", "tiefkühlobst", "tk-obst", "frozen meals", "fertiggerichte",
            "tk-fertiggerichte", "pizza", "tiefkühlpizza", "tk-pizza", "fries", "pommes",
            "frozen fish", "tk-fisch",
        ],
    ),
    (
        Category::Beverages,
        &[
            "water", "wasser", "juice", "saft", "soda", "limo", "limonade", "tea", "tee",
            "coffee", "kaffee", "milkshake", "milchshake", "sports drink", "sportgetränk",
            "isodrink", "beer", "bier", "wine", "wein", "cola",
        ],
    ),
    (
        Category::Household,
        &[
            "toilet paper", "toilettenpapier", "klopapier", "paper towels", "küchenrolle",
            "papiertücher", "soap", "seife", "shampoo", "detergent", "waschmittel",
            "spülmittel", "cleaning supplies", "putzmittel", "reinigungsmittel", "trash bags",
            "müllbeutel", "foil", "alufolie", "plastic wrap", "frischhaltefolie", "batteries",
            "batterien", "light bulb", "glühbirne",
        ],
    ),
];
