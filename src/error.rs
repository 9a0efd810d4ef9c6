//! Error types for the rsytmpl library.

use crate::compiler::Segment;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rsytmpl operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building catalogs, compiling templates
/// and parsing log lines.
#[derive(Error, Debug)]
pub enum Error {
    /// A template name was defined twice.
    #[error("multiply defined template name '{name}'")]
    DuplicateTemplate { name: String },

    /// A definition line does not follow the `$template name,"body"[,option]` grammar.
    #[error("line {line_number}: no match for template definition {line:?}")]
    TemplateSyntax { line_number: usize, line: String },

    /// JSON or SQL shaped templates need a different rendering engine.
    #[error("template has an unsupported format: {template}")]
    UnsupportedTemplate { template: String },

    /// The template could not be fully decomposed into literal/placeholder runs.
    #[error("could not match at end of template '{template}': '{remainder}' (len:{}), decomposed: {decomposed:?}", .remainder.len())]
    TemplateCompile {
        template: String,
        remainder: String,
        decomposed: Vec<Segment>,
    },

    /// A placeholder refers to a field missing from the field dictionary.
    #[error("symbolic field name not found: {field}")]
    UnknownField { field: String },

    /// The assembled regex was rejected by the regex engine.
    #[error("unable to compile assembled pattern '{pattern}': {source}")]
    PatternAssembly {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// No template with this name in the catalog.
    #[error("template '{name}' not found")]
    TemplateNotFound { name: String },

    /// No template at this ordinal in the catalog.
    #[error("no template with number {index}")]
    TemplateIndexNotFound { index: usize },

    /// Error when a field is not found in a record.
    #[error("field '{field}' not found")]
    FieldNotFound { field: String },

    /// Error when a field value cannot be parsed as the requested type.
    #[error("field '{field}' with value '{value}' cannot be parsed as {target_type}: {source}")]
    FieldParseError {
        field: String,
        value: String,
        target_type: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error when a log line doesn't match the compiled template.
    #[error("log line '{line}' does not match template '{template}'")]
    LineFormatMismatch { line: String, template: String },

    /// A configuration file is unusable.
    #[error("configuration error in {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    /// IO error when reading log files, template files or configuration.
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Malformed TOML configuration.
    #[error("TOML error: {source}")]
    Toml {
        #[from]
        source: toml::de::Error,
    },
}

impl Error {
    /// Create a new duplicate template error.
    pub fn duplicate_template(name: impl Into<String>) -> Self {
        Self::DuplicateTemplate { name: name.into() }
    }

    /// Create a new template syntax error.
    pub fn template_syntax(line_number: usize, line: impl Into<String>) -> Self {
        Self::TemplateSyntax {
            line_number,
            line: line.into(),
        }
    }

    /// Create a new unsupported template error.
    pub fn unsupported_template(template: impl Into<String>) -> Self {
        Self::UnsupportedTemplate {
            template: template.into(),
        }
    }

    /// Create a new template compile error.
    pub fn template_compile(
        template: impl Into<String>,
        remainder: impl Into<String>,
        decomposed: Vec<Segment>,
    ) -> Self {
        Self::TemplateCompile {
            template: template.into(),
            remainder: remainder.into(),
            decomposed,
        }
    }

    /// Create a new unknown field error.
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }

    /// Create a new pattern assembly error.
    pub fn pattern_assembly(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::PatternAssembly {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create a new template not found error.
    pub fn template_not_found(name: impl Into<String>) -> Self {
        Self::TemplateNotFound { name: name.into() }
    }

    /// Create a new field not found error.
    pub fn field_not_found(field: impl Into<String>) -> Self {
        Self::FieldNotFound {
            field: field.into(),
        }
    }

    /// Create a new field parse error.
    pub fn field_parse_error(
        field: impl Into<String>,
        value: impl Into<String>,
        target_type: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::FieldParseError {
            field: field.into(),
            value: value.into(),
            target_type: target_type.into(),
            source: Box::new(source),
        }
    }

    /// Create a new line format mismatch error.
    pub fn line_format_mismatch(line: impl Into<String>, template: impl Into<String>) -> Self {
        Self::LineFormatMismatch {
            line: line.into(),
            template: template.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by selecting a template that does not exist.
    pub fn is_selection_error(&self) -> bool {
        matches!(
            self,
            Self::TemplateNotFound { .. } | Self::TemplateIndexNotFound { .. }
        )
    }
}
