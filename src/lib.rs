//! Dart and Flutter project tooling: JSON to Dart class generation,
//! constructor / serialization / accessor generation, ARB localization,
//! route and asset navigation, and a filtered project tree.

pub mod assets;
pub mod classgen;
pub mod codegen;
pub mod context;
pub mod document;
pub mod error;
pub mod heuristics;
pub mod inference;
pub mod ir;
pub mod json_to_dart;
pub mod l10n;
pub mod naming;
pub mod outline;
pub mod path_de;
pub mod project_tree;
pub mod routes;
pub mod settings;
pub mod synth;
pub mod terminal;

pub use context::Workspace;
pub use error::{Error, Result, Severity};
