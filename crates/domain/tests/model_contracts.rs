//! Integration coverage for domain serialization and error mapping.

use foodify_domain::{
    Cart, CartItem, FeedPhase, NutritionGrade, PrimitiveError, ProductId, ProductSummary, Query,
    SortKey, Theme,
};
use foodify_shared::ErrorEnvelope;
use std::error::Error;

#[test]
fn primitive_errors_map_into_error_envelopes() -> Result<(), PrimitiveError> {
    let Err(error) = ProductId::parse("  ") else {
        return Err(PrimitiveError::EmptyProductId { input_length: 0 });
    };

    let envelope: ErrorEnvelope = error.into();
    assert_eq!(envelope.code.namespace(), "domain");
    assert_eq!(envelope.code.code(), "invalid_product_id");
    assert_eq!(
        envelope.metadata.get("input_length"),
        Some(&"2".to_string())
    );
    Ok(())
}

#[test]
fn product_summary_serializes_camel_case() -> Result<(), Box<dyn Error>> {
    let mut product = ProductSummary::new(ProductId::parse("3017620422003")?);
    product.name = Some("Nutella".into());
    product.image_url = Some("https://images.example/n.jpg".into());
    product.grade = Some(NutritionGrade::E);

    let value = serde_json::to_value(&product)?;
    assert_eq!(value["id"], "3017620422003");
    assert_eq!(value["imageUrl"], "https://images.example/n.jpg");
    assert_eq!(value["grade"], "e");
    assert!(value.get("nutrition").is_none());
    Ok(())
}

#[test]
fn cart_is_stored_as_a_plain_array() -> Result<(), Box<dyn Error>> {
    let mut cart = Cart::default();
    cart.add(CartItem {
        id: ProductId::parse("1")?,
        name: "Oat milk".into(),
        brand: Some("Oatly".into()),
        image_url: None,
        quantity: 1,
    });

    let json = serde_json::to_string(&cart)?;
    assert!(json.starts_with('['));
    let restored: Cart = serde_json::from_str(&json)?;
    assert_eq!(restored, cart);

    let theme: Theme = serde_json::from_str("\"dark\"")?;
    assert_eq!(theme, Theme::Dark);
    Ok(())
}

#[test]
fn query_and_phase_serialize_for_clients() -> Result<(), Box<dyn Error>> {
    let query = Query::default().with_sort(SortKey::Grade).with_veg_only(true);
    let value = serde_json::to_value(&query)?;
    assert_eq!(value["sort"], "grade");
    assert_eq!(value["vegOnly"], true);

    let phase = serde_json::to_value(FeedPhase::Fetching { token: 7 })?;
    assert_eq!(phase["status"], "fetching");
    assert_eq!(phase["token"], 7);
    Ok(())
}
