use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Result row handed to the downstream pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputItem {
    pub json: Value,
    pub source_item_index: usize,
}

impl OutputItem {
    pub fn new(json: Value, source_item_index: usize) -> Self {
        Self {
            json,
            source_item_index,
        }
    }

    /// True for error records emitted under continue-on-failure.
    pub fn is_error(&self) -> bool {
        self.json.get("error").is_some()
    }
}

/// Converts a raw API response into output items paired to `source_item_index`.
///
/// Null becomes a single `{"message": "No data returned"}` item, arrays fan
/// out one item per element, and bare scalars are wrapped as `{"data": ..}`.
pub fn normalize(response: Value, source_item_index: usize) -> Vec<OutputItem> {
    match response {
        Value::Null => vec![OutputItem::new(
            json!({ "message": "No data returned" }),
            source_item_index,
        )],
        Value::Array(elements) => elements
            .into_iter()
            .map(|element| OutputItem::new(as_object(element), source_item_index))
            .collect(),
        other => vec![OutputItem::new(as_object(other), source_item_index)],
    }
}

fn as_object(value: Value) -> Value {
    match value {
        Value::Object(_) => value,
        scalar => {
            let mut wrapped = Map::new();
            wrapped.insert(String::from("data"), scalar);
            Value::Object(wrapped)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_response_fans_out_to_same_source() {
        let items = normalize(json!([{ "id": 1 }, { "id": 2 }]), 4);

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| item.source_item_index == 4));
        assert_eq!(items[1].json, json!({ "id": 2 }));
    }

    #[test]
    fn object_response_yields_one_item() {
        let items = normalize(json!({ "id": 1 }), 0);
        assert_eq!(items, vec![OutputItem::new(json!({ "id": 1 }), 0)]);
    }

    #[test]
    fn null_response_yields_placeholder_message() {
        let items = normalize(Value::Null, 2);
        assert_eq!(
            items,
            vec![OutputItem::new(json!({ "message": "No data returned" }), 2)]
        );
    }

    #[test]
    fn empty_array_yields_no_items() {
        assert!(normalize(json!([]), 0).is_empty());
    }

    #[test]
    fn scalars_are_wrapped() {
        assert_eq!(normalize(json!("pong"), 0)[0].json, json!({ "data": "pong" }));
        assert_eq!(normalize(json!([1, { "id": 2 }]), 0)[0].json, json!({ "data": 1 }));
    }
}
