//! Template compilation and line matching.
//!
//! A template such as `%TIMESTAMP% %HOSTNAME% %syslogtag%%msg%` is cut into
//! literal runs and `%placeholder%` references, each placeholder is replaced
//! by its field pattern inside a named group, and the result is compiled into
//! a single regex anchored at the start of the line.

use crate::catalog::TemplateDefinition;
use crate::error::{Error, Result};
use crate::fields::FieldDictionary;
use crate::record::Record;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, error, info};

lazy_static! {
    static ref UNSUPPORTED: Regex = Regex::new(r"^(\{|insert\s+into)").unwrap();
    static ref PLACEHOLDER: Regex =
        Regex::new(r"^(?P<txt>[^%]+)?%(?P<replacer>[^%]+)%").unwrap();
    static ref TERMINATOR: Regex = Regex::new(r"^(\s+|\\n)$").unwrap();
}

/// One step of a decomposed template: optional literal text followed by a
/// placeholder, exactly as written (property options included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub literal: Option<String>,
    pub placeholder: String,
}

impl Segment {
    /// Placeholder name without its `:`-separated property options.
    pub fn field_name(&self) -> &str {
        self.placeholder
            .split_once(':')
            .map_or(self.placeholder.as_str(), |(name, _)| name)
    }

    /// Property options, if any (`:::drop-last-lf` gives `["", "", "drop-last-lf"]`).
    pub fn property_options(&self) -> Option<Vec<&str>> {
        self.placeholder
            .split_once(':')
            .map(|(_, rest)| rest.split(':').collect())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}%{}%",
            self.literal.as_deref().unwrap_or_default(),
            self.placeholder
        )
    }
}

/// Cut a template into literal/placeholder segments.
///
/// Trailing whitespace or a literal `\n` escape after the last placeholder is
/// accepted and dropped; any other leftover text is an error carrying what
/// was decomposed so far.
///
/// Literal text is kept as written. A `\n` escape between placeholders stays
/// a backslash followed by `n`, and the compiled pattern matches exactly that.
pub fn decompose(template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut rest = template;

    while !rest.is_empty() {
        if let Some(captures) = PLACEHOLDER.captures(rest) {
            segments.push(Segment {
                literal: captures.name("txt").map(|m| m.as_str().to_string()),
                placeholder: captures["replacer"].to_string(),
            });
            rest = &rest[captures.get(0).map_or(rest.len(), |m| m.end())..];
        } else if TERMINATOR.is_match(rest) {
            break;
        } else {
            return Err(Error::template_compile(template, rest, segments));
        }
    }

    debug!("Decomposed {:?} into {:?}", template, segments);
    Ok(segments)
}

/// Builds [`CompiledTemplate`]s against a field dictionary.
#[derive(Debug, Clone, Default)]
pub struct TemplateCompiler {
    fields: FieldDictionary,
}

impl TemplateCompiler {
    /// A compiler using only the built-in fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// A compiler resolving placeholders against `fields`.
    pub fn with_fields(fields: FieldDictionary) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &FieldDictionary {
        &self.fields
    }

    /// Compile a catalog entry.
    pub fn compile_definition(&self, def: &TemplateDefinition) -> Result<CompiledTemplate> {
        self.compile(&def.name, &def.template, def.option.as_deref())
    }

    /// Compile one template.
    ///
    /// Fails on JSON/SQL shaped templates, on text that does not decompose,
    /// on unknown placeholders and when the assembled regex does not compile.
    pub fn compile(
        &self,
        name: &str,
        template: &str,
        options: Option<&str>,
    ) -> Result<CompiledTemplate> {
        debug!("Compiling template {}: {:?} options {:?}", name, template, options);

        if UNSUPPORTED.is_match(template) {
            return Err(Error::unsupported_template(template));
        }

        let segments = decompose(template)?;

        let mut groups = GroupNames::default();
        let mut pattern = String::from("^");
        for segment in &segments {
            if let Some(literal) = &segment.literal {
                pattern.push_str(&regex::escape(literal));
            }
            if let Some(ignored) = segment.property_options() {
                debug!("Ignored property options: {:?}", ignored);
            }
            let field = segment.field_name();
            let sub = self
                .fields
                .get(field)
                .ok_or_else(|| Error::unknown_field(field))?;
            pattern.push_str(&format!("(?P<{}>{})", groups.unique(field), sub));
        }

        let regex = Regex::new(&pattern).map_err(|e| {
            error!("Unable to compile {}: {}", pattern, e);
            Error::pattern_assembly(pattern.as_str(), e)
        })?;
        debug!("Compiled regexp {}", regex);

        Ok(CompiledTemplate {
            name: name.to_string(),
            template: template.to_string(),
            options: options.map(str::to_string),
            segments,
            regex,
        })
    }
}

/// Hands out capture-group names, suffixing repeated fields: `msg`, `msg1`, `msg2`.
#[derive(Default)]
struct GroupNames {
    used: HashMap<String, usize>,
}

impl GroupNames {
    fn unique(&mut self, field: &str) -> String {
        match self.used.get_mut(field) {
            Some(count) => {
                *count += 1;
                format!("{}{}", field, count)
            }
            None => {
                self.used.insert(field.to_string(), 0);
                field.to_string()
            }
        }
    }
}

/// A template ready to parse lines.
///
/// Compile once, then call [`parse`](Self::parse) for every line. The
/// compiled regex is immutable, so a template can be shared between threads.
///
/// # Example
///
/// ```rust
/// use rsytmpl::CompiledTemplate;
///
/// let template = CompiledTemplate::new(
///     "Traditional",
///     r"%TIMESTAMP% %HOSTNAME% %syslogtag%%msg%\n",
///     None,
/// )?;
/// let record = template.parse("Oct 11 14:01:13 myhost sshd[1234]: Accepted password");
/// assert_eq!(record.field("HOSTNAME")?, "myhost");
/// assert_eq!(record.field("msg")?, " Accepted password");
/// # Ok::<(), rsytmpl::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    name: String,
    template: String,
    options: Option<String>,
    segments: Vec<Segment>,
    regex: Regex,
}

impl CompiledTemplate {
    /// Compile with the built-in field dictionary.
    pub fn new(name: &str, template: &str, options: Option<&str>) -> Result<Self> {
        TemplateCompiler::new().compile(name, template, options)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The template text this was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn options(&self) -> Option<&str> {
        self.options.as_deref()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The assembled regex.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Capture-group names in template order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.regex.capture_names().flatten()
    }

    /// Parse a line, returning an empty record when it does not match.
    ///
    /// A mismatch is logged and otherwise harmless: callers streaming lines
    /// simply move on to the next one.
    pub fn parse(&self, line: &str) -> Record {
        self.capture(line).unwrap_or_else(|| {
            error!("{}: no match for logline {:?}", self.name, line);
            Record::new()
        })
    }

    /// Parse a line, turning a mismatch into [`Error::LineFormatMismatch`].
    pub fn try_parse(&self, line: &str) -> Result<Record> {
        self.capture(line)
            .ok_or_else(|| Error::line_format_mismatch(line, &self.template))
    }

    fn capture(&self, line: &str) -> Option<Record> {
        let captures = self.regex.captures(line)?;

        let fields: Vec<(String, String)> = self
            .group_names()
            .map(|name| {
                let value = captures.name(name).map_or("", |m| m.as_str());
                (name.to_string(), value.to_string())
            })
            .collect();

        if let Some(whole) = captures.get(0) {
            info!(
                "{}: match for logline {:?} {:?} span {:?}",
                self.name,
                line,
                fields,
                whole.range()
            );
        }
        Some(Record::from_fields(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRADITIONAL: &str =
        r"%TIMESTAMP% %HOSTNAME% %syslogtag%%msg:::sp-if-no-1st-sp%%msg:::drop-last-lf%\n";

    #[test]
    fn test_decompose_traditional() {
        let segments = decompose(TRADITIONAL).unwrap();
        let rendered: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "%TIMESTAMP%",
                " %HOSTNAME%",
                " %syslogtag%",
                "%msg:::sp-if-no-1st-sp%",
                "%msg:::drop-last-lf%",
            ]
        );
        assert_eq!(segments[3].field_name(), "msg");
        assert_eq!(
            segments[3].property_options(),
            Some(vec!["", "", "sp-if-no-1st-sp"])
        );
        assert_eq!(segments[0].property_options(), None);
    }

    #[test]
    fn test_decompose_accepts_trailing_whitespace() {
        assert_eq!(decompose("%msg%  ").unwrap().len(), 1);
        assert!(decompose("").unwrap().is_empty());
    }

    #[test]
    fn test_decompose_reports_remainder() {
        match decompose("<%PRI%> tail text").unwrap_err() {
            Error::TemplateCompile {
                remainder,
                decomposed,
                ..
            } => {
                assert_eq!(remainder, "> tail text");
                assert_eq!(decomposed.len(), 1);
                assert_eq!(decomposed[0].placeholder, "PRI");
                assert_eq!(decomposed[0].literal.as_deref(), Some("<"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_group_disambiguation() {
        let template = CompiledTemplate::new("twice", "%msg%|%msg%|%msg%", None).unwrap();
        assert_eq!(
            template.group_names().collect::<Vec<_>>(),
            vec!["msg", "msg1", "msg2"]
        );
    }

    #[test]
    fn test_counters_not_shared_between_compiles() {
        let compiler = TemplateCompiler::new();
        let a = compiler.compile("a", "%NUM% %NUM%", None).unwrap();
        let b = compiler.compile("b", "%NUM%", None).unwrap();
        assert_eq!(a.group_names().collect::<Vec<_>>(), vec!["NUM", "NUM1"]);
        assert_eq!(b.group_names().collect::<Vec<_>>(), vec!["NUM"]);
    }

    #[test]
    fn test_unsupported_shapes() {
        for body in [
            r#"{\"type\":\"%msg%\"}"#,
            "insert into SystemEvents (Message) values ('%msg%')",
            "insert   into x",
        ] {
            assert!(matches!(
                CompiledTemplate::new("bad", body, None).unwrap_err(),
                Error::UnsupportedTemplate { .. }
            ));
        }
    }

    #[test]
    fn test_unknown_field() {
        match CompiledTemplate::new("bad", "%HOSTNAME% %notarealfield:::x%", None).unwrap_err() {
            Error::UnknownField { field } => assert_eq!(field, "notarealfield"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_broken_extra_pattern_fails_compilation() {
        let compiler =
            TemplateCompiler::with_fields(FieldDictionary::builtin().with_field("broken", "(x"));
        assert!(matches!(
            compiler.compile("bad", "%broken%", None).unwrap_err(),
            Error::PatternAssembly { .. }
        ));
    }

    #[test]
    fn test_literals_are_escaped() {
        let template = CompiledTemplate::new("lit", "(%NUM%) [%msg%", None).unwrap();
        let record = template.parse("(12) [rest");
        assert_eq!(record.field("NUM").unwrap(), "12");
        assert_eq!(record.field("msg").unwrap(), "rest");
    }

    #[test]
    fn test_inner_newline_escape_is_literal() {
        let template = CompiledTemplate::new("nl", r"%NUM%\n%msg%", None).unwrap();
        let record = template.parse(r"12\nrest");
        assert_eq!(record.field("NUM").unwrap(), "12");
        assert_eq!(record.field("msg").unwrap(), "rest");
        assert!(template.parse("12\nrest").is_empty());
    }

    #[test]
    fn test_parse_traditional() {
        let template = CompiledTemplate::new("TraditionalFileFormat", TRADITIONAL, None).unwrap();
        let record = template.parse("Oct 11 14:01:13 myhost sshd[1234]: Accepted password for alice");
        assert_eq!(record.field("TIMESTAMP").unwrap(), "Oct 11 14:01:13");
        assert_eq!(record.field("HOSTNAME").unwrap(), "myhost");
        assert_eq!(record.field("syslogtag").unwrap(), "sshd[1234]:");
        assert_eq!(record.field("msg").unwrap(), " Accepted password for alice");
        assert_eq!(record.field("msg1").unwrap(), "");
    }

    #[test]
    fn test_match_is_anchored_at_start() {
        let template = CompiledTemplate::new("num", "%NUM% %msg%", None).unwrap();
        assert!(template.parse("x 12 tail").is_empty());
        assert!(!template.parse("12 tail").is_empty());
    }

    #[test]
    fn test_mismatch_is_recoverable() {
        let template = CompiledTemplate::new("TraditionalFileFormat", TRADITIONAL, None).unwrap();
        let record = template.parse("Oct 11 14:01:13");
        assert!(record.is_empty());
        assert!(matches!(
            template.try_parse("Oct 11 14:01:13").unwrap_err(),
            Error::LineFormatMismatch { .. }
        ));
        assert!(!template
            .parse("Oct 11 14:01:15 myhost cron[1]: ok")
            .is_empty());
    }
}
