//! JSON → Dart class synthesis.
//!
//! `synthesize` turns one object into one class body plus the nested objects
//! it discovered; `synthesize_all` drains those breadth-first until nothing
//! is left. A JSON document is a tree, so the queue always runs dry.

use std::collections::{HashSet, VecDeque};

use serde_json::{Map, Value};
use tracing::debug;

use crate::codegen::{self, ClassEmit};
use crate::error::{Error, Result};
use crate::inference::{self, PendingClasses};

#[derive(Debug, Clone)]
pub struct SynthOptions {
    pub emit_doc_comments: bool,
    /// Off when the fields go into a class that already exists.
    pub emit_class: bool,
    pub emit_constructor: bool,
    pub emit_serialization: bool,
    pub class_suffix: String,
    pub converters: Option<String>,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            emit_doc_comments: true,
            emit_class: true,
            emit_constructor: true,
            emit_serialization: true,
            class_suffix: String::new(),
            converters: None,
        }
    }
}

impl SynthOptions {
    /// Nested classes always get the full treatment.
    fn nested(&self) -> Self {
        Self {
            emit_doc_comments: true,
            emit_class: true,
            emit_constructor: true,
            emit_serialization: true,
            class_suffix: self.class_suffix.clone(),
            converters: self.converters.clone(),
        }
    }

    fn class_emit(&self) -> ClassEmit {
        ClassEmit {
            doc_comments: self.emit_doc_comments,
            class_wrapper: self.emit_class,
            constructor: self.emit_constructor,
            serialization: self.emit_serialization,
            converters: self.converters.clone(),
        }
    }
}

#[derive(Debug)]
pub struct Synthesis {
    pub class_body: String,
    pub pending: PendingClasses,
}

/// Output of a full run: the root body and the nested bodies in discovery
/// order.
#[derive(Debug, Default)]
pub struct SynthesisRun {
    pub root: String,
    pub nested: Vec<String>,
}

impl SynthesisRun {
    pub fn nested_source(&self) -> String {
        self.nested.join("\n\n")
    }

    /// Root then nested classes, separated by blank lines.
    pub fn into_source(self) -> String {
        let mut parts = Vec::with_capacity(self.nested.len() + 1);
        if !self.root.is_empty() {
            parts.push(self.root);
        }
        parts.extend(self.nested);
        parts.join("\n\n")
    }
}

pub fn synthesize(object: &Map<String, Value>, class_name: &str, options: &SynthOptions) -> Synthesis {
    let (class, pending) = inference::observe_object(object, class_name, &options.class_suffix);
    let class_body = codegen::class_source(&class, &options.class_emit());
    Synthesis { class_body, pending }
}

pub fn synthesize_all(object: &Map<String, Value>, class_name: &str, options: &SynthOptions) -> SynthesisRun {
    let root = synthesize(object, class_name, options);
    let nested_options = options.nested();

    // class names emitted or queued so far; each appears once per run
    let mut seen: HashSet<String> = HashSet::from([class_name.to_string()]);
    let mut queue: VecDeque<(String, Map<String, Value>)> = VecDeque::new();
    enqueue(&mut queue, &mut seen, root.pending);
    let mut nested = Vec::new();
    while let Some((name, source)) = queue.pop_front() {
        debug!(class = %name, fields = source.len(), "synthesizing nested class");
        let out = synthesize(&source, &name, &nested_options);
        nested.push(out.class_body);
        enqueue(&mut queue, &mut seen, out.pending);
    }

    SynthesisRun { root: root.class_body, nested }
}

fn enqueue(queue: &mut VecDeque<(String, Map<String, Value>)>, seen: &mut HashSet<String>, pending: PendingClasses) {
    for (name, source) in pending {
        if seen.insert(name.clone()) {
            queue.push_back((name, source));
        } else {
            debug!(class = %name, "class already synthesized in this run, skipping");
        }
    }
}

/// Parse user-supplied JSON into the object to synthesize from. A top-level
/// array contributes its first element.
pub fn parse_root(text: &str) -> Result<Map<String, Value>> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::EmptyJson);
    }
    let value: Value = serde_json::from_str(text).map_err(|e| Error::InvalidJson(e.to_string()))?;
    let object = match value {
        Value::Array(xs) => match xs.into_iter().next() {
            Some(Value::Object(m)) => m,
            Some(_) => return Err(Error::InvalidJson("array elements must be objects".into())),
            None => return Err(Error::EmptyJson),
        },
        Value::Object(m) => m,
        _ => return Err(Error::InvalidJson("expected an object or an array of objects".into())),
    };
    if object.is_empty() {
        return Err(Error::EmptyJson);
    }
    Ok(object)
}
