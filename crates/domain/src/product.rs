//! Product summaries as returned by search, browse and lookup.

use crate::ProductId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Tag the upstream ingredient analysis attaches to products with animal ingredients.
pub const NON_VEGETARIAN_TAG: &str = "en:non-vegetarian";

/// Name shown for products the upstream left unnamed.
pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown Product";

/// Text shown when a product has no ingredient list.
pub const INGREDIENTS_UNAVAILABLE: &str = "Ingredients list not available.";

/// Nutrition quality letter; `A` is best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutritionGrade {
    /// Grade A.
    A,
    /// Grade B.
    B,
    /// Grade C.
    C,
    /// Grade D.
    D,
    /// Grade E.
    E,
}

impl NutritionGrade {
    /// All grades in ascending (best first) order.
    pub const ALL: [Self; 5] = [Self::A, Self::B, Self::C, Self::D, Self::E];

    /// Resolve an upstream grade string; anything other than a single A-E letter is unknown.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "a" => Some(Self::A),
            "b" => Some(Self::B),
            "c" => Some(Self::C),
            "d" => Some(Self::D),
            "e" => Some(Self::E),
            _ => None,
        }
    }

    /// Lowercase letter as used on the wire.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::A => 'a',
            Self::B => 'b',
            Self::C => 'c',
            Self::D => 'd',
            Self::E => 'e',
        }
    }
}

impl fmt::Display for NutritionGrade {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.letter().to_ascii_uppercase())
    }
}

/// Order two optional grades with unknown grades last.
#[must_use]
pub fn compare_grades(left: Option<NutritionGrade>, right: Option<NutritionGrade>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Nutrition facts per 100 g, present on detail lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionFacts {
    /// Energy in kJ.
    pub energy_kj: Option<f64>,
    /// Energy in kcal.
    pub energy_kcal: Option<f64>,
    /// Fat in grams.
    pub fat_g: Option<f64>,
    /// Carbohydrates in grams.
    pub carbohydrates_g: Option<f64>,
    /// Proteins in grams.
    pub proteins_g: Option<f64>,
    /// Salt in grams.
    pub salt_g: Option<f64>,
}

impl NutritionFacts {
    /// Returns true when no value is known.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.energy_kj.is_none()
            && self.energy_kcal.is_none()
            && self.fat_g.is_none()
            && self.carbohydrates_g.is_none()
            && self.proteins_g.is_none()
            && self.salt_g.is_none()
    }
}

/// A catalog item. Immutable once fetched; the feed only filters, sorts and appends them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    /// Identity key.
    pub id: ProductId,
    /// Upstream product name, if any.
    pub name: Option<Box<str>>,
    /// Raw brand string (comma separated upstream).
    pub brand: Option<Box<str>>,
    /// Front image URL.
    pub image_url: Option<Box<str>>,
    /// Category tags.
    #[serde(default)]
    pub categories: Vec<Box<str>>,
    /// Ingredient analysis tags (e.g. `en:vegetarian`).
    #[serde(default)]
    pub analysis_tags: Vec<Box<str>>,
    /// Nutrition grade, absent when unknown.
    pub grade: Option<NutritionGrade>,
    /// Nutrition facts, only populated by detail lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<NutritionFacts>,
    /// Ingredient list as printed on the pack, only populated by detail lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Box<str>>,
}

impl ProductSummary {
    /// Create a summary with only an identity key set.
    #[must_use]
    pub const fn new(id: ProductId) -> Self {
        Self {
            id,
            name: None,
            brand: None,
            image_url: None,
            categories: Vec::new(),
            analysis_tags: Vec::new(),
            grade: None,
            nutrition: None,
            ingredients: None,
        }
    }

    /// Trimmed product name when it is non-empty.
    #[must_use]
    pub fn usable_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Name for display, falling back to a placeholder.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.usable_name().unwrap_or(UNKNOWN_PRODUCT_NAME)
    }

    /// Ingredient list for display, falling back to a placeholder.
    #[must_use]
    pub fn ingredients_text(&self) -> &str {
        self.ingredients
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or(INGREDIENTS_UNAVAILABLE)
    }

    /// First brand of the comma separated brand list.
    #[must_use]
    pub fn primary_brand(&self) -> Option<&str> {
        self.brand
            .as_deref()
            .and_then(|brands| brands.split(',').next())
            .map(str::trim)
            .filter(|brand| !brand.is_empty())
    }

    /// Returns true when ingredient analysis flags the product as non-vegetarian.
    #[must_use]
    pub fn is_flagged_non_vegetarian(&self) -> bool {
        self.analysis_tags
            .iter()
            .any(|tag| tag.eq_ignore_ascii_case(NON_VEGETARIAN_TAG))
    }
}
