//! Remote catalog adapters.

#[cfg(feature = "open-food-facts")]
pub mod open_food_facts;

#[cfg(feature = "open-food-facts")]
mod wire;
