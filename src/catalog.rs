//! Template catalog: named, numbered template definitions.
//!
//! Definitions use the legacy rsyslog line syntax
//!
//! ```text
//! $template Name,"template text"[,option]
//! ```
//!
//! where the directive may be commented out (`#$template`) so that the same
//! text can sit in an rsyslog configuration without being active there.

use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use tracing::debug;

/// Templates shipped with the library.
///
/// `FileFormat` must stay first and `TraditionalFileFormat` second: ordinal 1
/// is the default selection.
pub const DEFAULT_TEMPLATE_DEFS: &str = r##"
#
# These are the templates considered; when extending keep in mind:
#     - "FileFormat" must be first.
#     - default "TraditionalFileFormat" must be second corresponding to number 1
#
#  White lines, lines starting with "# " and lines with only "#" are comments.
#
# ----------------------------------------------------------------------
#  rsyslog legacy templates
#
#$template FileFormat,"%TIMESTAMP:::date-rfc3339% %HOSTNAME% %syslogtag%%msg:::sp-if-no-1st-sp%%msg:::drop-last-lf%\n"

#$template TraditionalFileFormat,"%TIMESTAMP% %HOSTNAME% %syslogtag%%msg:::sp-if-no-1st-sp%%msg:::drop-last-lf%\n"

#$template ForwardFormat,"<%PRI%>%TIMESTAMP:::date-rfc3339% %HOSTNAME% %syslogtag:1:32%%msg:::sp-if-no-1st-sp%%msg%"

#$template TraditionalForwardFormat,"<%PRI%>%TIMESTAMP% %HOSTNAME% %syslogtag:1:32%%msg:::sp-if-no-1st-sp%%msg%"

# ----------------------------------------------------------------------
# Docker log as output by command:  docker container logs <container-name>
# ----------------------------------------------------------------------
#$template DockerCLog,"%TIMESTAMP% %NUM% %bracket% %bracket% %bracket% %msg%"

# ----------------------------------------------------------------------
# User specific templates go in the file named by `file` in the
# [RSysTradiVariant] section of the configuration.
# ----------------------------------------------------------------------
"##;

/// Stands in for `\"` while a definition line is matched.
const QUOTE_SENTINEL: &str = "\u{1}";

lazy_static! {
    static ref DEFINITION: Regex = Regex::new(concat!(
        r"^(#?\$?template)\s+",
        r"(?P<name>[A-Za-z0-9_@]+)\s*,\s*",
        r#""(?P<template>[^"]*)""#,
        r"(\s*,\s*(?P<option>[A-Za-z]+))*\s*$",
    ))
    .unwrap();
    static ref BLANK: Regex = Regex::new(r"^(\s*|#( .*)?)$").unwrap();
}

/// One named template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDefinition {
    /// Unique name.
    pub name: String,
    /// Template text between the quotes.
    pub template: String,
    /// Trailing option tag such as `SQL`, as written.
    pub option: Option<String>,
    /// Insertion index.
    pub ordinal: usize,
}

impl TemplateDefinition {
    /// Case-insensitive check of the option tag.
    pub fn has_option(&self, tag: &str) -> bool {
        self.option
            .as_deref()
            .is_some_and(|o| o.eq_ignore_ascii_case(tag))
    }
}

/// How a caller picks a template out of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selector {
    /// Whatever sits at ordinal 1.
    #[default]
    Default,
    Index(usize),
    Name(String),
}

impl Selector {
    /// The ordinal used when no selector is given.
    pub const DEFAULT_INDEX: usize = 1;
}

/// Template definitions indexed by name and by ordinal.
///
/// A catalog is built once at startup and only grows through [`extend`](Self::extend).
///
/// # Example
///
/// ```rust
/// use rsytmpl::{Selector, TemplateCatalog};
///
/// let catalog = TemplateCatalog::builtin()?;
/// let def = catalog.select(&Selector::Default)?;
/// assert_eq!(def.name, "TraditionalFileFormat");
/// assert_eq!(def.ordinal, 1);
/// # Ok::<(), rsytmpl::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    by_name: HashMap<String, TemplateDefinition>,
    by_index: BTreeMap<usize, String>,
}

impl TemplateCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog holding [`DEFAULT_TEMPLATE_DEFS`].
    pub fn builtin() -> Result<Self> {
        Self::parse_block(DEFAULT_TEMPLATE_DEFS)
    }

    /// Parse a block of definitions into a new catalog, numbering from 0.
    pub fn parse_block(text: &str) -> Result<Self> {
        let mut catalog = Self::new();
        catalog.extend(text.as_bytes())?;
        Ok(catalog)
    }

    /// Merge more definitions, continuing the ordinal numbering.
    ///
    /// Either every definition in `input` is added or, on error, none is.
    /// Returns the names added, in document order.
    pub fn extend<R: io::Read>(&mut self, input: R) -> Result<Vec<String>> {
        let reader = BufReader::new(input);
        let mut staged: Vec<TemplateDefinition> = Vec::new();
        let mut next = self.by_index.len();

        for (i, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let line = line.trim_end_matches('\r');

            if BLANK.is_match(line) {
                continue;
            }

            let def = split_line(line, i + 1, next)?;
            if self.by_name.contains_key(&def.name) || staged.iter().any(|s| s.name == def.name) {
                return Err(Error::duplicate_template(def.name));
            }
            debug!(
                "Template #{} {}: {:?} option {:?}",
                def.ordinal, def.name, def.template, def.option
            );
            staged.push(def);
            next += 1;
        }

        let added = staged.iter().map(|d| d.name.clone()).collect();
        for def in staged {
            self.by_index.insert(def.ordinal, def.name.clone());
            self.by_name.insert(def.name.clone(), def);
        }
        Ok(added)
    }

    /// Merge the definitions found in a file.
    pub fn extend_from_file(&mut self, path: impl AsRef<Path>) -> Result<Vec<String>> {
        let file = File::open(path.as_ref())?;
        self.extend(file)
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Result<&TemplateDefinition> {
        self.by_name
            .get(name)
            .ok_or_else(|| Error::template_not_found(name))
    }

    /// Look up a definition by ordinal.
    pub fn get_index(&self, index: usize) -> Result<&TemplateDefinition> {
        self.by_index
            .get(&index)
            .and_then(|name| self.by_name.get(name))
            .ok_or(Error::TemplateIndexNotFound { index })
    }

    /// Resolve a selector.
    pub fn select(&self, selector: &Selector) -> Result<&TemplateDefinition> {
        match selector {
            Selector::Default => self.get_index(Selector::DEFAULT_INDEX),
            Selector::Index(index) => self.get_index(*index),
            Selector::Name(name) => self.get(name),
        }
    }

    /// Definitions in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = &TemplateDefinition> {
        self.by_index
            .values()
            .filter_map(|name| self.by_name.get(name))
    }

    /// Names in ordinal order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_index.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// Dump the name and number tables for an operator.
    pub fn print_avail_templates<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self)
    }
}

impl fmt::Display for TemplateCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.names().collect();
        writeln!(f, "Available templates: {:?}", names)?;
        writeln!(f, "Number associations:")?;
        for def in self.iter() {
            writeln!(f, "  {:>3}: {} \"{}\"", def.ordinal, def.name, def.template)?;
        }
        Ok(())
    }
}

fn split_line(line: &str, line_number: usize, ordinal: usize) -> Result<TemplateDefinition> {
    let protected = line.replace("\\\"", QUOTE_SENTINEL);
    let captures = DEFINITION
        .captures(&protected)
        .ok_or_else(|| Error::template_syntax(line_number, line))?;

    Ok(TemplateDefinition {
        name: captures["name"].to_string(),
        template: captures["template"].replace(QUOTE_SENTINEL, "\""),
        option: captures.name("option").map(|m| m.as_str().to_string()),
        ordinal,
    })
}
