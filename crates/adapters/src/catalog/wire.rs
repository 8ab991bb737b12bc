//! Open Food Facts JSON payloads and their mapping onto the domain model.
//!
//! Upstream documents are loosely typed (numbers arrive as strings, fields are
//! missing or `null`), so products are decoded one by one and malformed
//! entries are skipped instead of failing the whole page.

use foodify_domain::{
    Category, CategoryId, NutritionFacts, NutritionGrade, ProductId, ProductSummary,
};
use serde::Deserialize;
use serde_json::{Map, Value};

/// `search.pl` and `/category/{id}.json` payload.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ListingPayload {
    products: Option<Vec<Value>>,
    count: Option<Value>,
}

impl ListingPayload {
    /// Total match count, when reported.
    pub(super) fn total(&self) -> Option<u64> {
        self.count.as_ref().and_then(as_u64)
    }

    /// Decoded products in upstream order plus the number of skipped entries.
    pub(super) fn into_products(self) -> (Vec<ProductSummary>, usize) {
        let raw = self.products.unwrap_or_default();
        let received = raw.len();
        let products: Vec<ProductSummary> = raw
            .into_iter()
            .filter_map(|value| serde_json::from_value::<RawProduct>(value).ok())
            .filter_map(|product| product.into_summary(None, false))
            .collect();
        let skipped = received.saturating_sub(products.len());
        (products, skipped)
    }
}

/// `/api/v0/product/{id}.json` payload.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct LookupPayload {
    status: Option<Value>,
    product: Option<Value>,
}

impl LookupPayload {
    /// The product, or `None` when upstream reports it missing.
    pub(super) fn into_product(
        self,
        requested: &ProductId,
    ) -> Result<Option<ProductSummary>, serde_json::Error> {
        if self.status.as_ref().and_then(as_u64) != Some(1) {
            return Ok(None);
        }
        let Some(product) = self.product.filter(|value| !value.is_null()) else {
            return Ok(None);
        };
        let raw: RawProduct = serde_json::from_value(product)?;
        Ok(raw.into_summary(Some(requested), true))
    }
}

/// `/categories.json` payload.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct CategoryListPayload {
    tags: Option<Vec<Value>>,
}

impl CategoryListPayload {
    /// Categories above the popularity floor, capped, in upstream order.
    pub(super) fn into_categories(self, min_products: u64, max_count: usize) -> Vec<Category> {
        self.tags
            .unwrap_or_default()
            .into_iter()
            .filter_map(|value| serde_json::from_value::<RawTag>(value).ok())
            .filter_map(RawTag::into_category)
            .filter(|category| category.products > min_products)
            .take(max_count)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct RawTag {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    products: Option<Value>,
}

impl RawTag {
    fn into_category(self) -> Option<Category> {
        let id = CategoryId::parse(&self.id).ok()?;
        let name: Box<str> = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| Box::from(id.as_str()), Box::from);
        Some(Category {
            id,
            name,
            products: self.products.as_ref().and_then(as_u64).unwrap_or(0),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProduct {
    #[serde(rename = "_id")]
    id: Option<Value>,
    code: Option<Value>,
    product_name: Option<String>,
    brands: Option<String>,
    image_front_small_url: Option<String>,
    image_small_url: Option<String>,
    image_front_url: Option<String>,
    image_url: Option<String>,
    categories_tags: Option<Vec<String>>,
    ingredients_analysis_tags: Option<Vec<String>>,
    nutrition_grades: Option<String>,
    nutriscore_grade: Option<String>,
    nutriments: Option<Map<String, Value>>,
    ingredients_text: Option<String>,
}

impl RawProduct {
    fn into_summary(
        self,
        fallback: Option<&ProductId>,
        with_nutrition: bool,
    ) -> Option<ProductSummary> {
        let id = [self.id.as_ref(), self.code.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(value_text)
            .find_map(|text| ProductId::parse(text).ok())
            .or_else(|| fallback.cloned())?;

        let image_url = [
            self.image_front_small_url,
            self.image_small_url,
            self.image_url,
            self.image_front_url,
        ]
        .into_iter()
        .find_map(non_empty);

        let grade = self
            .nutrition_grades
            .as_deref()
            .and_then(NutritionGrade::parse)
            .or_else(|| self.nutriscore_grade.as_deref().and_then(NutritionGrade::parse));

        let (nutrition, ingredients) = if with_nutrition {
            let facts = self
                .nutriments
                .as_ref()
                .map(nutrition_facts)
                .filter(|facts| !facts.is_empty());
            (facts, non_empty(self.ingredients_text))
        } else {
            (None, None)
        };

        Some(ProductSummary {
            id,
            name: non_empty(self.product_name),
            brand: non_empty(self.brands),
            image_url,
            categories: boxed(self.categories_tags),
            analysis_tags: boxed(self.ingredients_analysis_tags),
            grade,
            nutrition,
            ingredients,
        })
    }
}

fn nutrition_facts(nutriments: &Map<String, Value>) -> NutritionFacts {
    let number = |key: &str| nutriments.get(key).and_then(as_f64);
    NutritionFacts {
        energy_kj: number("energy-kj_100g").or_else(|| number("energy_100g")),
        energy_kcal: number("energy-kcal_100g"),
        fat_g: number("fat_100g"),
        carbohydrates_g: number("carbohydrates_100g"),
        proteins_g: number("proteins_100g"),
        salt_g: number("salt_100g"),
    }
}

fn boxed(values: Option<Vec<String>>) -> Vec<Box<str>> {
    values
        .unwrap_or_default()
        .into_iter()
        .map(String::into_boxed_str)
        .collect()
}

fn non_empty(value: Option<String>) -> Option<Box<str>> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(Box::from(trimmed))
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_owned()).filter(|text| !text.is_empty()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|text| text.trim().parse().ok()))
}

fn as_f64(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|text| text.trim().parse().ok()))
        .filter(|number: &f64| number.is_finite())
}
