//! Delimited key/value sources.
//!
//! One `key=value` pair per line, split on the first `=`. Blank lines and
//! lines starting with `#` are skipped. Values are inferred in this order:
//!
//! 1. quoted (`"..."` or `'...'`): the text between the quotes,
//! 2. decimal digits: integer,
//! 3. `true` / `false`, any case: boolean,
//! 4. starting with a digit and parsing as a float: float,
//! 5. anything else: the text as is.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{fs, io};

use mould_types::Name;
use mould_value::Value;

/// Failure to read a key/value source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source `{}` not found", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `line` is 1-based.
    #[error("malformed line {line}: {text}")]
    MalformedLine { line: usize, text: String },
}

/// Read and parse the source at `path`.
pub fn read_source(path: impl AsRef<Path>) -> Result<BTreeMap<Name, Value>, SourceError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => SourceError::NotFound {
            path: path.to_path_buf(),
        },
        _ => SourceError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let raw = parse_source(&text)?;
    tracing::debug!(path = %path.display(), keys = raw.len(), "read source");
    Ok(raw)
}

/// Parse source text. A repeated key keeps its last value.
pub fn parse_source(text: &str) -> Result<BTreeMap<Name, Value>, SourceError> {
    let mut raw = BTreeMap::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let malformed = || SourceError::MalformedLine {
            line: index + 1,
            text: line.to_owned(),
        };
        let (key, value) = line.split_once('=').ok_or_else(malformed)?;
        let key = key.trim();
        if key.is_empty() {
            return Err(malformed());
        }
        let value = infer(value.trim()).ok_or_else(malformed)?;
        raw.insert(Name::new(key), value);
    }
    Ok(raw)
}

/// `None` for an unbalanced quote.
fn infer(text: &str) -> Option<Value> {
    if let Some(quote) = text.chars().next().filter(|c| matches!(c, '"' | '\'')) {
        let inner = text.strip_prefix(quote)?.strip_suffix(quote)?;
        return Some(Value::str(inner));
    }
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        // Digits only, so the parse fails only on overflow.
        return Some(match text.parse::<i64>() {
            Ok(n) => Value::Int(n),
            Err(_) => Value::str(text),
        });
    }
    if text.eq_ignore_ascii_case("true") {
        return Some(Value::Bool(true));
    }
    if text.eq_ignore_ascii_case("false") {
        return Some(Value::Bool(false));
    }
    if text.starts_with(|c: char| c.is_ascii_digit()) {
        if let Ok(f) = text.parse::<f64>() {
            return Some(Value::Float(f));
        }
    }
    Some(Value::str(text))
}
