//! Fill one ARB file with translations of the template entries it lacks.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::arb::{self, ArbFile};
use super::config::L10nConfig;
use super::placeholder;
use super::translate::{BatchReport, CancelFlag, Progress, Translator};
use crate::error::{Error, Result};

/// Translations that still contain `{Param` get this many placeholders
/// repaired; the template text is not consulted.
const REPAIRED_PLACEHOLDERS: usize = 5;

/// Translate every template message missing from `target` and write each
/// one as soon as it is translated. Nothing happens when `target` is the
/// template itself.
pub fn translate_arb(
    config: &L10nConfig,
    target: &Path,
    translator: &dyn Translator,
    cancel: &CancelFlag,
    progress: &dyn Progress,
) -> Result<BatchReport> {
    if !arb::is_arb_path(target) {
        return Err(Error::NotArbFile(target.to_path_buf()));
    }
    if !target.is_file() {
        return Err(Error::NotFound(target.to_path_buf()));
    }
    let template_path = config.require_template()?;
    if same_file(&template_path, target) {
        debug!(?target, "target is the template, nothing to translate");
        return Ok(BatchReport::default());
    }

    let target_arb = ArbFile::read(target)?;
    let locale = target_arb.require_locale()?.to_string();
    let template = ArbFile::read(&template_path)?;
    let source_locale = template.require_locale()?.to_string();

    let missing: Vec<(&str, &str)> = template
        .messages()
        .filter(|(key, _)| !target_arb.contains_key(key))
        .collect();

    let mut report = BatchReport::default();
    if missing.is_empty() {
        info!(target = %target_arb.file_name(), "nothing to translate");
        return Ok(report);
    }

    info!(target = %target_arb.file_name(), from = %source_locale, to = %locale, entries = missing.len(), "translating arb");
    progress.set_total(missing.len() as u64);
    let total = missing.len();
    for (n, (key, text)) in missing.into_iter().enumerate() {
        if cancel.is_cancelled() {
            info!(done = n, total, "translation cancelled");
            report.cancelled = true;
            break;
        }
        progress.step(&format!("{} / {total} Translating: {key}", n + 1));

        if text.is_empty() {
            report.fail(target, Some(key), "template text is empty");
            continue;
        }
        let Some(translated) = translator.translate(&source_locale, &locale, text) else {
            report.fail(target, Some(key), "translation failed");
            continue;
        };
        let count = if translated.contains("{Param") { REPAIRED_PLACEHOLDERS } else { 0 };
        let Some(repaired) = placeholder::repair_translation(&translated, config.use_escaping, count) else {
            report.fail(target, Some(key), "translation is empty");
            continue;
        };
        arb::write_entry(target, key, &repaired)?;
        report.written.push((target.to_path_buf(), key.to_string()));
    }
    progress.finish(&format!("{} translated", report.written.len()));
    Ok(report)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
