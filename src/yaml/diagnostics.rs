//! YAML error diagnostics with source-span reporting

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// YAML parse error pointing at the offending location in a rate book file
#[derive(Debug, Error, Diagnostic)]
#[error("invalid YAML in {filename}: {message}")]
#[diagnostic(code(rateq::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    filename: String,

    /// The underlying error message
    message: String,
}

impl YamlSyntaxError {
    /// Create a syntax error from a serde_yml error
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));

        let offset = line_col_to_offset(source, line, column);
        let message = err.to_string();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            filename: filename.to_string(),
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Deserialize a YAML document, turning failures into a located diagnostic
pub fn parse_yaml<T: DeserializeOwned + 'static>(source: &str, filename: &str) -> Result<T, YamlSyntaxError> {
    serde_yml::from_str(source).map_err(|e| YamlSyntaxError::from_serde_error(&e, source, filename))
}

/// Convert 1-based line/column to a byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut line_start = 0;
    for (n, text) in source.split_inclusive('\n').enumerate() {
        if n + 1 == line {
            let col_offset = text
                .char_indices()
                .nth(column.saturating_sub(1))
                .map(|(i, _)| i)
                .unwrap_or(text.len().saturating_sub(1));
            return line_start + col_offset;
        }
        line_start += text.len();
    }
    source.len().saturating_sub(1)
}

/// Match `missing field: w` as well as the backtick-quoted form
fn is_missing_field(msg: &str, field: &str) -> bool {
    let Some(pos) = msg.find("missing field") else {
        return false;
    };
    let rest = msg[pos + "missing field".len()..].trim_start_matches([':', ' ', '`']);
    rest.strip_prefix(field)
        .is_some_and(|after| !after.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
}

/// Suggest a fix for common mistakes in rate book files
fn generate_help(message: &str) -> Option<String> {
    let msg = message.to_lowercase();

    if msg.contains("tab") {
        return Some("YAML requires spaces for indentation, not tabs.".to_string());
    }

    if msg.contains("duplicate") {
        return Some("Each key can only appear once. Remove or rename the duplicate key.".to_string());
    }

    if msg.contains("unknown variant") {
        if msg.contains("none") || msg.contains("discount_85") {
            return Some(
                "fuel_mode must be one of: none, included, standard, discount_85".to_string(),
            );
        }
        if msg.contains("xlmiles") || msg.contains("gofo") {
            return Some("zone_source must be one of: general, gofo, xlmiles".to_string());
        }
        if msg.contains("west") || msg.contains("central") {
            return Some("region must be one of: WEST, CENTRAL, EAST".to_string());
        }
        return None;
    }

    if is_missing_field(&msg, "w") {
        return Some("Every rate row needs a weight break: { w: 5, zones: { 2: 9.10 } }".to_string());
    }

    if is_missing_field(&msg, "region") {
        return Some("Warehouses need a region (WEST, CENTRAL or EAST).".to_string());
    }

    if msg.contains("invalid type") && msg.contains("expected f64") {
        return Some("Prices and weights must be plain numbers, without '$' or units.".to_string());
    }

    if msg.contains("mapping values are not allowed") {
        return Some("You may be missing a space after ':' or have incorrect indentation.".to_string());
    }

    None
}
