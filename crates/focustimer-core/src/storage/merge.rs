//! Field-by-field merge of a loosely-typed JSON object over a typed value.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ImportError;

pub(crate) struct MergeOutcome<T> {
    pub value: T,
    /// Fields present in the input whose values did not fit the target type,
    /// with the deserializer's message.
    pub rejected: Vec<(String, String)>,
}

/// Overlay the keys of `incoming` onto `base`.
///
/// Each known key is applied only if the result still deserializes as `T`;
/// otherwise the base value for that key is kept and the key is reported in
/// `rejected`. Unknown keys are ignored.
pub(crate) fn merge_fields<T>(base: &T, incoming: &Value) -> Result<MergeOutcome<T>, ImportError>
where
    T: Serialize + DeserializeOwned,
{
    let Value::Object(incoming) = incoming else {
        return Err(ImportError::NotAnObject);
    };
    let Value::Object(mut merged) = serde_json::to_value(base)? else {
        return Err(ImportError::NotAnObject);
    };

    let mut rejected = Vec::new();
    for (key, value) in incoming {
        if !merged.contains_key(key) {
            continue;
        }
        let mut candidate: Map<String, Value> = merged.clone();
        candidate.insert(key.clone(), value.clone());
        match serde_json::from_value::<T>(Value::Object(candidate.clone())) {
            Ok(_) => merged = candidate,
            Err(e) => rejected.push((key.clone(), e.to_string())),
        }
    }

    let value = serde_json::from_value(Value::Object(merged)).map_err(|e| {
        ImportError::InvalidField {
            field: "<record>".into(),
            message: e.to_string(),
        }
    })?;
    Ok(MergeOutcome { value, rejected })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Pair {
        a: u32,
        b: bool,
    }

    #[test]
    fn overlays_known_fields() {
        let base = Pair { a: 1, b: false };
        let out = merge_fields(&base, &serde_json::json!({"b": true, "zzz": 1})).unwrap();
        assert_eq!(out.value, Pair { a: 1, b: true });
        assert!(out.rejected.is_empty());
    }

    #[test]
    fn reports_mistyped_fields() {
        let base = Pair { a: 1, b: false };
        let out = merge_fields(&base, &serde_json::json!({"a": -4, "b": true})).unwrap();
        assert_eq!(out.value, Pair { a: 1, b: true });
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].0, "a");
    }

    #[test]
    fn rejects_non_objects() {
        let base = Pair { a: 1, b: false };
        assert!(matches!(
            merge_fields(&base, &serde_json::json!([1, 2])),
            Err(ImportError::NotAnObject)
        ));
    }
}
