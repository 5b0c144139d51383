//! Cache Key Derivation
//!
//! The fingerprint is the payload's values rendered to text and joined by a
//! single space, in the order the attributes arrived. Attribute names are not
//! part of the key and the order is not canonicalised, so `{a:1, b:2}` and
//! `{b:2, a:1}` produce different keys.

use serde_json::Value;

use crate::ml::FeaturePayload;

/// Derives the cache key for a feature payload.
pub fn cache_key(features: &FeaturePayload) -> String {
    features
        .values()
        .map(render_value)
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        // Numbers, booleans, null and nested values use their compact JSON text
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn payload(value: Value) -> FeaturePayload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_values_joined_in_insertion_order() {
        let features = payload(json!({"year": 2018, "km_driven": 45000, "fuel": "Petrol"}));
        assert_eq!(cache_key(&features), "2018 45000 Petrol");
    }

    #[test]
    fn test_rendering_of_value_kinds() {
        let features = payload(json!({
            "mileage": 18.5,
            "owner": null,
            "certified": true,
            "tags": ["a", "b"]
        }));
        assert_eq!(cache_key(&features), r#"18.5 null true ["a","b"]"#);
    }

    #[test]
    fn test_reordered_payload_gets_different_key() {
        let a = payload(json!({"year": 2018, "fuel": "Petrol"}));
        let b = payload(json!({"fuel": "Petrol", "year": 2018}));
        assert_ne!(cache_key(&a), cache_key(&b));
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(cache_key(&FeaturePayload::new()), "");
    }

    proptest! {
        // Identical content in identical order always yields the same key.
        #[test]
        fn prop_key_is_deterministic(year in 1990i64..2025, km in 0u64..500_000, fuel in "[A-Za-z]{1,10}") {
            let a = payload(json!({"year": year, "km_driven": km, "fuel": fuel.clone()}));
            let b = payload(json!({"year": year, "km_driven": km, "fuel": fuel}));
            prop_assert_eq!(cache_key(&a), cache_key(&b));
        }

        // Changing a single value changes the key.
        #[test]
        fn prop_key_sensitive_to_values(year in 1990i64..2025, km1 in 0u64..500_000, km2 in 0u64..500_000) {
            prop_assume!(km1 != km2);
            let a = payload(json!({"year": year, "km_driven": km1}));
            let b = payload(json!({"year": year, "km_driven": km2}));
            prop_assert_ne!(cache_key(&a), cache_key(&b));
        }
    }
}
