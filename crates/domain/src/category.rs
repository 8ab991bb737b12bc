//! Category listing entries and the meat classifier.

use crate::CategoryId;
use serde::{Deserialize, Serialize};

/// Word prefixes that mark a category as meat or fish.
const MEAT_PREFIXES: &[&str] = &[
    "meat",
    "beef",
    "pork",
    "chicken",
    "poultr",
    "sausage",
    "bacon",
    "turkey",
    "charcuter",
    "salami",
    "fish",
    "seafood",
    "salmon",
    "tuna",
    "shrimp",
    "prawn",
    "anchov",
    "sardine",
    "mackerel",
];

/// Words that only count as meat when they match exactly.
const MEAT_WORDS: &[&str] = &["ham", "hams", "lamb", "veal", "duck", "steak", "steaks"];

/// Word prefixes marking a meat-free stand-in (`meat-analogues`, `vegan-sausages`).
const SUBSTITUTE_PREFIXES: &[&str] = &[
    "analog",
    "alternativ",
    "substitut",
    "imitation",
    "vegetarian",
    "vegan",
    "veggie",
    "plant",
];

/// A selectable category with its product count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Upstream tag id.
    pub id: CategoryId,
    /// Display name.
    pub name: Box<str>,
    /// Number of products carrying the tag.
    pub products: u64,
}

impl Category {
    /// Returns true when the id or display name names meat or fish.
    #[must_use]
    pub fn is_meat_related(&self) -> bool {
        is_meat_related(self.id.as_str()) || is_meat_related(&self.name)
    }
}

/// Meat/fish keyword check over an id or display name.
///
/// Labels naming a substitute (`meat-analogues`, `plant-based-...`) or a
/// meat-free variant (`meat-free-...`) are not meat.
#[must_use]
pub fn is_meat_related(label: &str) -> bool {
    let words: Vec<String> = label
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect();
    if words
        .iter()
        .any(|word| SUBSTITUTE_PREFIXES.iter().any(|prefix| word.starts_with(prefix)))
    {
        return false;
    }
    words.iter().enumerate().any(|(index, word)| {
        let meat = MEAT_WORDS.contains(&word.as_str())
            || MEAT_PREFIXES.iter().any(|prefix| word.starts_with(prefix));
        let negated = matches!(
            words.get(index + 1).map(String::as_str),
            Some("free" | "less")
        );
        meat && !negated
    })
}
