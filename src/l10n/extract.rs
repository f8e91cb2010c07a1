//! Extract the string literal under the cursor into the ARB files and
//! replace it with an `S.current.<key>` reference.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::arb::{self, ArbFile};
use super::config::L10nConfig;
use super::key;
use super::placeholder::{self, Extracted};
use super::translate::{BatchReport, CancelFlag, Progress, Translator};
use crate::document::{Applied, DocumentEditor, Position, Range, TextEdit};
use crate::error::{Error, Result};
use crate::heuristics::{self, LiteralMatch};

const KEY_LOCALE: &str = "en";

#[derive(Debug, Clone)]
pub struct ExtractRequest<'r> {
    pub path: &'r Path,
    pub position: Position,
    /// Write the text to every ARB file, translated, not only the template.
    pub translate: bool,
    /// Key to use instead of deriving one.
    pub key: Option<&'r str>,
    /// Refuse to derive a key; `key` must be given.
    pub require_key: bool,
}

#[derive(Debug)]
pub struct Extraction {
    pub key: String,
    /// Text that replaced the literal.
    pub reference: String,
    /// The template already had this text under `key`.
    pub reused: bool,
    /// `None` when cancelled before anything was changed.
    pub applied: Option<Applied>,
    pub report: BatchReport,
}

/// One ARB file and the value it is going to receive.
struct Pending {
    path: PathBuf,
    value: Option<String>,
}

pub fn extract_l10n(
    editor: &mut dyn DocumentEditor,
    config: &L10nConfig,
    translator: &dyn Translator,
    req: &ExtractRequest<'_>,
    cancel: &CancelFlag,
    progress: &dyn Progress,
) -> Result<Extraction> {
    let doc = editor.document(req.path)?;
    let literal = heuristics::string_literal_at(doc.line(req.position.line), req.position.character)
        .ok_or(Error::NoLiteralAtCursor)?;
    if literal.inner.trim().is_empty() {
        return Err(Error::BlankLiteral);
    }

    let template_path = config.require_template()?;
    let extracted = placeholder::extract(&literal.inner);
    let template = ArbFile::read(&template_path)?;

    if let Some(existing) = template.key_for_value(&extracted.message) {
        let key = existing.to_string();
        info!(%key, "text already localized, reusing key");
        let reference = placeholder::reference(&key, &extracted.placeholders);
        let applied = replace_literal(editor, req, &literal, &reference)?;
        return Ok(Extraction { key, reference, reused: true, applied: Some(applied), report: BatchReport::default() });
    }

    let source_locale = template.require_locale()?.to_string();
    progress.message("Translating key...");
    let (key, english) = choose_key(req, &template, &extracted, &source_locale, translator)?;
    if cancel.is_cancelled() {
        return Ok(cancelled(key, &extracted));
    }

    let mut targets = vec![Pending { path: template_path.clone(), value: Some(extracted.message.clone()) }];
    if req.translate {
        for path in arb::list_arb_files(&config.arb_dir_path())? {
            if path != template_path {
                targets.push(Pending { path, value: None });
            }
        }
    }

    let mut report = BatchReport::default();
    progress.set_total(targets.len() as u64);
    let total = targets.len();
    for (n, target) in targets.iter_mut().enumerate() {
        if cancel.is_cancelled() {
            info!("extraction cancelled before writing");
            return Ok(cancelled(key, &extracted));
        }
        progress.step(&format!("{} / {total} Translating: {}", n + 1, arb::file_name(&target.path)));
        if target.value.is_some() {
            continue;
        }
        match translation_for(target, &extracted, &source_locale, english.as_deref(), config, translator) {
            Ok(value) => target.value = Some(value),
            Err(reason) => report.fail(&target.path, Some(&key), reason),
        }
    }

    let reference = placeholder::reference(&key, &extracted.placeholders);
    let applied = replace_literal(editor, req, &literal, &reference)?;
    for target in &targets {
        if let Some(value) = &target.value {
            arb::write_entry(&target.path, &key, value)?;
            report.written.push((target.path.clone(), key.clone()));
        }
    }
    progress.finish(&format!("{key} extracted"));
    info!(%key, files = report.written.len(), failed = report.failures.len(), "literal extracted");
    Ok(Extraction { key, reference, reused: false, applied: Some(applied), report })
}

/// Explicit key, or one derived from the English rendering of the text.
/// Also returns that rendering for reuse as the `en` value.
fn choose_key(
    req: &ExtractRequest<'_>,
    template: &ArbFile,
    extracted: &Extracted,
    source_locale: &str,
    translator: &dyn Translator,
) -> Result<(String, Option<String>)> {
    if let Some(explicit) = req.key.map(str::trim) {
        key::validate_key(explicit, template)?;
        return Ok((explicit.to_string(), None));
    }
    if req.require_key {
        return Err(Error::MissingKey);
    }
    let english = translator.translate(source_locale, KEY_LOCALE, &extracted.key_source);
    let derived = english
        .as_deref()
        .and_then(|en| key::derive_key(en, extracted.has_placeholders()))
        .ok_or(Error::MissingKey)?;
    debug!(key = %derived, "derived key");
    key::validate_key(&derived, template)?;
    Ok((derived, english))
}

fn translation_for(
    target: &Pending,
    extracted: &Extracted,
    source_locale: &str,
    english: Option<&str>,
    config: &L10nConfig,
    translator: &dyn Translator,
) -> std::result::Result<String, String> {
    let name = arb::file_name(&target.path);
    let arb = ArbFile::read(&target.path).map_err(|_| format!("{name} could not be parsed"))?;
    let locale = arb.locale().ok_or_else(|| format!("{name} does not define @@locale"))?;

    if locale == source_locale {
        return Ok(extracted.message.clone());
    }
    if locale == KEY_LOCALE && !extracted.has_placeholders() {
        if let Some(en) = english {
            return Ok(en.to_string());
        }
    }
    let translated = translator
        .translate(source_locale, locale, &extracted.message)
        .ok_or_else(|| format!("{name} translation failed"))?;
    placeholder::repair_translation(&translated, config.use_escaping, extracted.placeholders.len())
        .ok_or_else(|| format!("{name} translation is empty"))
}

fn replace_literal(
    editor: &mut dyn DocumentEditor,
    req: &ExtractRequest<'_>,
    literal: &LiteralMatch,
    reference: &str,
) -> Result<Applied> {
    let line = req.position.line;
    let range = Range::new(Position::new(line, literal.span.start), Position::new(line, literal.span.end));
    editor.apply(req.path, vec![TextEdit::replace(range, reference)])
}

fn cancelled(key: String, extracted: &Extracted) -> Extraction {
    Extraction {
        reference: placeholder::reference(&key, &extracted.placeholders),
        key,
        reused: false,
        applied: None,
        report: BatchReport { cancelled: true, ..BatchReport::default() },
    }
}
