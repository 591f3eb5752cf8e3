// SPDX-FileCopyrightText: 2026 WorkVPN Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with fuzzy match suggestions.
//!
//! Turns Figment extraction errors into miette diagnostics that point at the
//! offending key in `workvpn.toml` and suggest the closest valid key.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;
use workvpn_core::VaultError;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
/// Catches `kdf_iteratons` -> `kdf_iterations` without suggesting noise.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(workvpn::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// The unrecognized key name.
        key: String,
        /// Closest valid key, if any is similar enough.
        suggestion: Option<String>,
        /// Comma-separated valid keys for the section.
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(workvpn::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(workvpn::config::missing_key),
        help("add `{key} = <value>` to your workvpn.toml")
    )]
    MissingKey { key: String },

    /// A semantic validation error (cost band, empty path, ...).
    #[error("validation error: {message}")]
    #[diagnostic(code(workvpn::config::validation))]
    Validation { message: String },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(workvpn::config::other))]
    Other(String),
}

impl ConfigError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<ConfigError> for VaultError {
    fn from(err: ConfigError) -> Self {
        VaultError::Config(err.to_string())
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert a `figment::Error` into a list of `ConfigError` diagnostics.
///
/// A single figment error may carry several underlying errors; each becomes
/// its own diagnostic.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, expected) => {
                let valid_keys: Vec<&str> = expected.to_vec();
                let (span, src) = locate_key(&error, field, toml_sources);
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, &valid_keys),
                    valid_keys: valid_keys.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: field.clone().into_owned(),
            },
            Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                key: error
                    .path
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join("."),
                detail: format!("found {actual}, expected {expected}"),
                expected: expected.to_string(),
            },
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

/// Find the span of `field` in the TOML file the error originated from.
fn locate_key(
    error: &figment::error::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    let Some((path, content)) = origin.and_then(|origin| {
        toml_sources
            .iter()
            .find(|(p, _)| *p == origin)
            .map(|(p, c)| (p.as_str(), c.as_str()))
    }) else {
        return (None, None);
    };

    let section: Vec<String> = error.path.iter().map(|s| s.to_string()).collect();
    match find_key_offset(content, &section, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(path, content.to_string())),
        ),
        None => (None, None),
    }
}

/// Find the byte offset of `field` in TOML `content`, searching after the
/// `[section]` header named by the first element of `path`.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let search_start = match path.first() {
        None => 0,
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
    };

    let mut line_start = search_start;
    for line in content[search_start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(after) = trimmed.strip_prefix(field)
            && after.trim_start().starts_with('=')
        {
            return Some(line_start + (line.len() - trimmed.len()));
        }
        line_start += line.len();
    }

    None
}

/// Suggest a similar key name using Jaro-Winkler string similarity.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|&key| (key, strsim::jaro_winkler(unknown, key)))
        .filter(|(_, score)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key.to_string())
}

/// Render `errors` as miette reports, one after another, without colour.
///
/// The library never prints; the embedding application decides where the
/// text goes.
pub fn render_errors(errors: &[ConfigError]) -> String {
    use miette::{GraphicalReportHandler, GraphicalTheme};

    let handler =
        GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor()).with_width(120);
    let mut out = String::new();
    for error in errors {
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut out, diagnostic).is_err() {
            out.push_str(&format!("Error: {error}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_closest_vault_key() {
        let valid = &["kdf_memory_cost", "kdf_iterations", "kdf_parallelism"];
        assert_eq!(
            suggest_key("kdf_iteratons", valid),
            Some("kdf_iterations".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["kdf_memory_cost", "kdf_iterations"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn find_key_offset_in_section() {
        let content = "[storage]\nvault_dir = \"/x\"\n[vault]\nkdf_iteratons = 3\n";
        let path = vec!["vault".to_string()];
        let o = find_key_offset(content, &path, "kdf_iteratons").expect("offset");
        assert_eq!(&content[o..o + 13], "kdf_iteratons");
    }

    #[test]
    fn find_key_offset_ignores_prefix_matches() {
        let content = "[vault]\nkdf_iterations_extra = 1\nkdf_iterations = 3\n";
        let path = vec!["vault".to_string()];
        let o = find_key_offset(content, &path, "kdf_iterations").expect("offset");
        assert_eq!(&content[o..o + 18], "kdf_iterations = 3");
    }

    #[test]
    fn config_error_converts_to_vault_error() {
        let err: VaultError = ConfigError::validation("vault.kdf_iterations too low").into();
        assert!(matches!(err, VaultError::Config(ref m) if m.contains("kdf_iterations")));
    }

    #[test]
    fn rendered_report_carries_message_and_help() {
        let errors = vec![
            ConfigError::UnknownKey {
                key: "kdf_iteratons".to_string(),
                suggestion: Some("kdf_iterations".to_string()),
                valid_keys: "kdf_iterations".to_string(),
                span: None,
                src: None,
            },
            ConfigError::validation("vault.calibration_target_ms must be greater than 0"),
        ];

        let text = render_errors(&errors);

        assert!(text.contains("unknown configuration key"));
        assert!(text.contains("kdf_iteratons"));
        assert!(text.contains("did you mean"));
        assert!(text.contains("calibration_target_ms"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn nothing_to_render() {
        assert!(render_errors(&[]).is_empty());
    }

    #[test]
    fn missing_section_has_no_offset() {
        let content = "[vault]\nkdf_iterations = 3\n";
        let path = vec!["storage".to_string()];
        assert_eq!(find_key_offset(content, &path, "vault_dir"), None);
    }
}
