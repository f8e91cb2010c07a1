//! First-observed-value field inference.
//!
//! Walk one JSON object, assign each key a Dart type from the value it holds
//! right now, and collect nested objects that need their own class.
//!
//! Policy:
//! - No joining across samples: what the value is, the field is.
//! - Arrays are judged by their first element only; the rest is never read.
//! - Nested classes are keyed by derived type name; a repeated name replaces
//!   the queued source object but keeps its queue position.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::ir::{ClassDescriptor, DartType, FieldDescriptor};
use crate::naming;

/// Nested classes still to synthesize, in discovery order.
pub type PendingClasses = IndexMap<String, Map<String, Value>>;

// ------------------------------ Observe ---------------------------------- //

/// Infer one field from `key`/`value`. Returns the nested object to schedule
/// when the field references a generated class.
pub fn observe_field(
    key: &str,
    value: &Value,
    class_suffix: &str,
) -> (FieldDescriptor, Option<Map<String, Value>>) {
    let (name, annotation) = scalar_field_name(key);
    let scalar = |ty: DartType| FieldDescriptor {
        key: key.to_string(),
        name: name.clone(),
        ty,
        doc: Some(annotation.clone().unwrap_or_else(|| literal_doc(value))),
    };

    match value {
        Value::Bool(_) => (scalar(DartType::Bool), None),
        Value::Number(n) => {
            if n.is_f64() {
                (scalar(DartType::Double), None)
            } else {
                (scalar(DartType::Int), None)
            }
        }
        Value::String(_) => (scalar(DartType::String), None),
        Value::Object(m) => {
            let field = reference_field(key, class_suffix);
            (field, Some(m.clone()))
        }
        Value::Array(xs) => match xs.first() {
            Some(Value::Object(m)) => {
                let field = reference_field(key, class_suffix);
                (field, Some(m.clone()))
            }
            _ => (scalar(DartType::Object), None),
        },
        Value::Null => (scalar(DartType::Object), None),
    }
}

fn reference_field(key: &str, class_suffix: &str) -> FieldDescriptor {
    let (bare, annotation) = naming::split_annotated_key(key);
    FieldDescriptor {
        key: key.to_string(),
        name: naming::field_name_for_key(&bare),
        ty: DartType::Reference(naming::type_name_for_key(&bare, class_suffix)),
        doc: annotation,
    }
}

/// Keys that are already Dart identifiers are kept as-is. Anything else is
/// stripped of its annotation and camel-cased.
fn scalar_field_name(key: &str) -> (String, Option<String>) {
    if naming::is_dart_identifier(key) {
        return (key.to_string(), None);
    }
    let (bare, annotation) = naming::split_annotated_key(key);
    let mut name: String = naming::field_name_for_key(&bare)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    if !naming::is_dart_identifier(&name) {
        // empty, or starts with a digit
        name.insert(0, '$');
    }
    (name, annotation)
}

/// Doc text for scalar fields: strings verbatim, everything else as JSON.
fn literal_doc(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Describe `object` as class `name`, returning nested classes to schedule.
pub fn observe_object(
    object: &Map<String, Value>,
    name: &str,
    class_suffix: &str,
) -> (ClassDescriptor, PendingClasses) {
    let mut fields = Vec::with_capacity(object.len());
    let mut pending = PendingClasses::new();
    for (key, value) in object {
        let (field, nested) = observe_field(key, value, class_suffix);
        if let (DartType::Reference(type_name), Some(nested)) = (&field.ty, nested) {
            pending.insert(type_name.clone(), nested);
        }
        fields.push(field);
    }
    let class = ClassDescriptor {
        name: name.to_string(),
        fields,
        source: object.clone(),
    };
    (class, pending)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn one_field_per_key_in_order() {
        let obj = object(json!({"z": 1, "a": "x", "m": true, "b": null}));
        let (class, pending) = observe_object(&obj, "Root", "");
        let keys: Vec<_> = class.fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, ["z", "a", "m", "b"]);
        assert!(pending.is_empty());
    }

    #[test]
    fn numeric_inference() {
        let (f, _) = observe_field("n", &json!(5), "");
        assert_eq!(f.ty, DartType::Int);
        let (f, _) = observe_field("n", &json!(5.0), "");
        assert_eq!(f.ty, DartType::Double);
        let (f, _) = observe_field("n", &json!(-0.5), "");
        assert_eq!(f.ty, DartType::Double);
        let (f, _) = observe_field("n", &json!(-3), "");
        assert_eq!(f.ty, DartType::Int);
        let (f, _) = observe_field("n", &json!(u64::MAX), "");
        assert_eq!(f.ty, DartType::Int);
    }

    #[test]
    fn scalar_docs_carry_the_literal() {
        let (f, _) = observe_field("name", &json!("Alice"), "");
        assert_eq!(f.doc.as_deref(), Some("Alice"));
        let (f, _) = observe_field("ok", &json!(false), "");
        assert_eq!(f.doc.as_deref(), Some("false"));
        let (f, _) = observe_field("tags", &json!([1, 2]), "");
        assert_eq!(f.ty, DartType::Object);
        assert_eq!(f.doc.as_deref(), Some("[1,2]"));
    }

    #[test]
    fn nested_object_is_queued_under_derived_name() {
        let obj = object(json!({"user_info": {"id": 1}}));
        let (class, pending) = observe_object(&obj, "Root", "Entity");
        let field = &class.fields[0];
        assert_eq!(field.name, "userInfo");
        assert_eq!(field.ty, DartType::Reference("UserInfoEntity".into()));
        assert_eq!(pending.len(), 1);
        assert_eq!(pending["UserInfoEntity"], object(json!({"id": 1})));
    }

    #[test]
    fn array_of_objects_uses_first_element_only() {
        let obj = object(json!({"items": [{"a": 1}, {"a": 2, "b": 3}]}));
        let (_, pending) = observe_object(&obj, "Root", "");
        assert_eq!(pending["Items"], object(json!({"a": 1})));
    }

    #[test]
    fn annotated_key_becomes_doc() {
        let obj = object(json!({"dataList (工序列表)": [{"id": 1}]}));
        let (class, pending) = observe_object(&obj, "Root", "");
        let field = &class.fields[0];
        assert_eq!(field.name, "dataList");
        assert_eq!(field.doc.as_deref(), Some("工序列表"));
        assert!(pending.contains_key("DataList"));
    }

    #[test]
    fn scalar_keys_become_dart_identifiers() {
        let (f, _) = observe_field("user_id", &json!(1), "");
        assert_eq!(f.name, "user_id");
        let (f, _) = observe_field("user-name", &json!("Ada"), "");
        assert_eq!((f.key.as_str(), f.name.as_str()), ("user-name", "userName"));
        assert_eq!(f.doc.as_deref(), Some("Ada"));
        let (f, _) = observe_field("age (年龄)", &json!(30), "");
        assert_eq!((f.name.as_str(), f.ty.clone()), ("age", DartType::Int));
        assert_eq!(f.doc.as_deref(), Some("年龄"));
        let (f, _) = observe_field("2fa", &json!(true), "");
        assert_eq!(f.name, "$2fa");
        let (f, _) = observe_field("名字", &json!("x"), "");
        assert_eq!(f.name, "$");
    }

    #[test]
    fn null_and_empty_array_are_dynamic() {
        let (f, nested) = observe_field("x", &Value::Null, "");
        assert_eq!(f.ty, DartType::Object);
        assert!(nested.is_none());
        let (f, nested) = observe_field("x", &json!([]), "");
        assert_eq!(f.ty, DartType::Object);
        assert!(nested.is_none());
    }

    #[test]
    fn repeated_type_name_keeps_one_entry() {
        let obj = object(json!({"user": {"a": 1}, "User": {"b": 2}}));
        let (_, pending) = observe_object(&obj, "Root", "");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending["User"], object(json!({"b": 2})));
    }
}
