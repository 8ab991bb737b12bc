//! Result post-processing: client-side corrections the upstream API cannot guarantee.

use foodify_domain::{ProductSummary, SortKey, compare_grades};

/// Clean one raw page for the active sort and filters.
///
/// - grade sort keeps only products with an A-E grade, stable-sorted best first
/// - every other sort drops products without a usable name
/// - the vegetarian filter also drops products flagged non-vegetarian
///
/// The input is never modified.
#[must_use]
pub fn clean_page(raw: &[ProductSummary], sort: SortKey, veg_only: bool) -> Vec<ProductSummary> {
    let mut cleaned: Vec<ProductSummary> = raw
        .iter()
        .filter(|product| match sort {
            SortKey::Grade => product.grade.is_some(),
            _ => product.usable_name().is_some(),
        })
        .filter(|product| !veg_only || !product.is_flagged_non_vegetarian())
        .cloned()
        .collect();

    if sort == SortKey::Grade {
        sort_by_grade(&mut cleaned);
    }
    cleaned
}

/// Stable sort, best grade first, unknown grades last.
pub fn sort_by_grade(products: &mut [ProductSummary]) {
    products.sort_by(|left, right| compare_grades(left.grade, right.grade));
}
