// Strongly-typed IR for Dart codegen. Only `ClassDescriptor::source` keeps a
// serde_json value around, and only as provenance.

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DartType {
    Bool,
    Int,
    Double,
    String,
    Reference(String),       // nested generated class
    Object,                  // null, scalar arrays, empty arrays
}

impl DartType {
    pub fn dart_name(&self) -> &str {
        match self {
            DartType::Bool => "bool",
            DartType::Int => "int",
            DartType::Double => "double",
            DartType::String => "String",
            DartType::Reference(name) => name,
            DartType::Object => "Object",
        }
    }

    /// Everything synthesized from JSON alone is nullable.
    pub fn nullable(&self) -> String {
        format!("{}?", self.dart_name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub key: String,         // raw JSON key
    pub name: String,        // Dart identifier
    pub ty: DartType,
    pub doc: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>, // JSON insertion order
    pub source: Map<String, Value>,
}

impl ClassDescriptor {
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}
