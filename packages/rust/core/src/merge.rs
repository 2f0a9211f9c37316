//! Injection of transformed orders into the CRM template.
//!
//! The template is an OpenAPI document; orders become request examples under
//! `paths./post.post.requestBody.content.application/json.examples.Pedidos`.

use orderbridge_shared::{PipelineError, Result};
use serde_json::{Map, Value};

/// Object path, from the document root, of the example mapping.
pub const EXAMPLES_PATH: [&str; 8] = [
    "paths",
    "/post",
    "post",
    "requestBody",
    "content",
    "application/json",
    "examples",
    "Pedidos",
];

/// Key the merged document is written under.
pub const UPDATED_DOCUMENT_KEY: &str = "updated_crm_swagger.json";

/// Example key for the order at `index`.
pub fn example_key(index: usize) -> String {
    format!("value{index}")
}

/// Borrow the example mapping inside `document`.
pub fn example_mapping(document: &mut Value) -> Result<&mut Map<String, Value>> {
    let mut current = document;
    for (depth, segment) in EXAMPLES_PATH.iter().enumerate() {
        current = current.get_mut(*segment).ok_or_else(|| {
            PipelineError::not_found(format!(
                "document path '{}'",
                EXAMPLES_PATH[..=depth].join(".")
            ))
        })?;
    }

    current.as_object_mut().ok_or_else(|| {
        PipelineError::not_found(format!(
            "example mapping at '{}' (value is not an object)",
            EXAMPLES_PATH.join(".")
        ))
    })
}

/// Insert `orders` into the example mapping as `value0`, `value1`, ...
///
/// Existing entries with the same keys are replaced. Returns the inserted
/// keys in order.
pub fn inject_orders(document: &mut Value, orders: Vec<Value>) -> Result<Vec<String>> {
    let mapping = example_mapping(document)?;

    Ok(orders
        .into_iter()
        .enumerate()
        .map(|(i, order)| {
            let key = example_key(i);
            mapping.insert(key.clone(), order);
            key
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template() -> Value {
        json!({
            "openapi": "3.0.0",
            "paths": {
                "/post": {
                    "post": {
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "examples": {
                                        "Pedidos": {
                                            "exemplo": {"order_id": 0}
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn inserts_positional_keys() {
        let mut doc = template();
        let keys = inject_orders(
            &mut doc,
            vec![json!({"order_id": 1}), json!({"order_id": 2}), json!({"order_id": 3})],
        )
        .unwrap();

        assert_eq!(keys, vec!["value0", "value1", "value2"]);
        let mapping = example_mapping(&mut doc).unwrap();
        assert_eq!(mapping.len(), 4);
        assert_eq!(mapping["value0"], json!({"order_id": 1}));
        assert_eq!(mapping["value2"], json!({"order_id": 3}));
        assert_eq!(mapping["exemplo"], json!({"order_id": 0}));
    }

    #[test]
    fn empty_batch_leaves_mapping_untouched() {
        let mut doc = template();
        let keys = inject_orders(&mut doc, vec![]).unwrap();
        assert!(keys.is_empty());
        assert_eq!(doc, template());
    }

    #[test]
    fn existing_value_keys_are_replaced() {
        let mut doc = template();
        inject_orders(&mut doc, vec![json!("old0"), json!("old1")]).unwrap();
        inject_orders(&mut doc, vec![json!("new0")]).unwrap();

        let mapping = example_mapping(&mut doc).unwrap();
        assert_eq!(mapping["value0"], "new0");
        assert_eq!(mapping["value1"], "old1");
    }

    #[test]
    fn missing_path_names_the_missing_segment() {
        let mut doc = json!({"paths": {"/post": {"post": {}}}});
        let err = inject_orders(&mut doc, vec![json!({})]).unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
        assert!(err.to_string().contains("paths./post.post.requestBody"));
    }

    #[test]
    fn non_object_mapping_is_rejected() {
        let mut doc = template();
        doc["paths"]["/post"]["post"]["requestBody"]["content"]["application/json"]["examples"]
            ["Pedidos"] = json!([]);
        assert!(inject_orders(&mut doc, vec![json!({})]).is_err());
    }

    #[test]
    fn fixture_template_has_mapping() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/crm_swagger.fixture.json")
            .expect("read fixture");
        let mut doc: Value = serde_json::from_str(&fixture).expect("parse fixture");
        assert!(example_mapping(&mut doc).is_ok());
    }
}
