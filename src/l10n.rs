//! Flutter localization support: ARB files, `l10n.yaml`, key derivation,
//! machine translation of missing entries and literal extraction.

pub mod arb;
pub mod config;
pub mod definition;
pub mod extract;
pub mod key;
pub mod placeholder;
pub mod translate;
pub mod translate_arb;

pub use arb::ArbFile;
pub use config::L10nConfig;
pub use definition::{L10nDefinitions, Location};
pub use extract::{ExtractRequest, Extraction, extract_l10n};
pub use translate::{BatchReport, CancelFlag, GlossaryTranslator, IndicatifProgress, NoopProgress, Progress, Translator};
pub use translate_arb::translate_arb;
