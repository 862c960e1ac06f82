//! Translation capabilities used before fuzzy matching.
//!
//! Translation is best effort: the normalizer makes a single attempt and
//! falls back to the untranslated text on any failure.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, bounded};
use csv::{ReaderBuilder, Trim};
use log::{info, warn};

use crate::error::{CaduceusError, Result};

/// Translates free text into a target language.
pub trait Translator: Send + Sync + fmt::Debug {
    /// Translate `text` written in `source_language` into `target_language`.
    fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String>;

    /// Get the name of this translator for debugging and logging.
    fn name(&self) -> &str;
}

/// A translator that never succeeds, so input is always matched untranslated.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTranslator;

impl Translator for NoopTranslator {
    fn translate(
        &self,
        _text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String> {
        Err(CaduceusError::translation(format!(
            "no translator configured for '{source_language}' to '{target_language}'"
        )))
    }

    fn name(&self) -> &str {
        "noop"
    }
}

/// Offline translator backed by a table of localized symptom aliases.
///
/// Each alias belongs to one language and maps to a canonical symptom written
/// in the table's native language. Lookups ignore case and surrounding
/// whitespace of the alias, never its language.
#[derive(Debug, Clone)]
pub struct AliasTranslator {
    native_language: String,
    /// (language, normalized alias) -> canonical symptom.
    aliases: HashMap<(String, String), String>,
}

impl AliasTranslator {
    /// Create an empty alias table whose canonical side is `native_language`.
    pub fn new<S: Into<String>>(native_language: S) -> Self {
        AliasTranslator {
            native_language: native_language.into(),
            aliases: HashMap::new(),
        }
    }

    /// Add an alias in `language` for a canonical symptom.
    pub fn add_alias<L, A, S>(&mut self, language: L, alias: A, symptom: S)
    where
        L: AsRef<str>,
        A: AsRef<str>,
        S: Into<String>,
    {
        self.aliases
            .insert(Self::key(language.as_ref(), alias.as_ref()), symptom.into());
    }

    /// Builder-style [`add_alias`](Self::add_alias).
    pub fn with_alias<L, A, S>(mut self, language: L, alias: A, symptom: S) -> Self
    where
        L: AsRef<str>,
        A: AsRef<str>,
        S: Into<String>,
    {
        self.add_alias(language, alias, symptom);
        self
    }

    fn key(language: &str, alias: &str) -> (String, String) {
        (language.trim().to_string(), alias.trim().to_lowercase())
    }

    /// Load `alias,language,symptom` rows. Malformed rows are skipped with a warning.
    pub fn from_csv<P: AsRef<Path>, S: Into<String>>(path: P, native_language: S) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let (Some(alias_col), Some(language_col), Some(symptom_col)) =
            (column("alias"), column("language"), column("symptom"))
        else {
            return Err(CaduceusError::reference_data(format!(
                "{} needs 'alias', 'language' and 'symptom' columns",
                path.display()
            )));
        };

        let mut translator = Self::new(native_language);
        for (line, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping alias row {} in {}: {e}", line + 2, path.display());
                    continue;
                }
            };
            match (
                record.get(alias_col),
                record.get(language_col),
                record.get(symptom_col),
            ) {
                (Some(alias), Some(language), Some(symptom))
                    if !alias.is_empty() && !language.is_empty() && !symptom.is_empty() =>
                {
                    translator.add_alias(language, alias, symptom);
                }
                _ => warn!(
                    "Skipping incomplete alias row {} in {}",
                    line + 2,
                    path.display()
                ),
            }
        }

        info!(
            "Loaded {} symptom aliases from {}",
            translator.len(),
            path.display()
        );
        Ok(translator)
    }

    /// Number of aliases.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl Translator for AliasTranslator {
    fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String> {
        if target_language != self.native_language {
            return Err(CaduceusError::translation(format!(
                "alias table translates into '{}', not '{target_language}'",
                self.native_language
            )));
        }
        self.aliases
            .get(&Self::key(source_language, text))
            .cloned()
            .ok_or_else(|| {
                CaduceusError::translation(format!("no '{source_language}' alias for '{text}'"))
            })
    }

    fn name(&self) -> &str {
        "alias"
    }
}

/// Wraps a translator so a single call never takes longer than `timeout`.
///
/// The call runs on a worker thread. When the bound expires the result is
/// abandoned and a timeout error is returned; the worker finishes on its own.
#[derive(Debug, Clone)]
pub struct BoundedTranslator {
    inner: Arc<dyn Translator>,
    timeout: Duration,
}

impl BoundedTranslator {
    /// Bound `inner` by `timeout`.
    pub fn new(inner: Arc<dyn Translator>, timeout: Duration) -> Self {
        BoundedTranslator { inner, timeout }
    }

    /// The configured bound.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Translator for BoundedTranslator {
    fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String> {
        let (tx, rx) = bounded(1);
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        let source = source_language.to_string();
        let target = target_language.to_string();

        thread::Builder::new()
            .name("caduceus-translate".to_string())
            .spawn(move || {
                let _ = tx.send(inner.translate(&text, &source, &target));
            })?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(CaduceusError::timeout(format!(
                "{} did not answer within {:?}",
                self.inner.name(),
                self.timeout
            ))),
            Err(RecvTimeoutError::Disconnected) => Err(CaduceusError::translation(format!(
                "{} worker stopped without answering",
                self.inner.name()
            ))),
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
