//! Symbolic field dictionary.
//!
//! Maps a placeholder base name such as `HOSTNAME` to the regex fragment that
//! recognises it. The fragments describe what shows up in real syslog and dpkg
//! files, not what RFC 5424 / RFC 3339 allow.

use std::collections::HashMap;

macro_rules! let_dig {
    () => {
        r"([A-Za-z]|\d)"
    };
}

macro_rules! let_dig_hyp_pt {
    () => {
        concat!("(", let_dig!(), "|[.-])")
    };
}

/// `Mon DD HH:MM:SS` as written by syslog.
macro_rules! tstamp_empirical {
    () => {
        r"[A-Z][A-Za-z]*\s\d+\s\d+:\d+:\d+"
    };
}

/// `YYYY-MM-DD[ T]HH:MM:SS[.frac][zone letter]` as written by dpkg.
macro_rules! tstamp_emp_dpkg {
    () => {
        r"\d+-\d+-\d+(\s|T)\d+:\d+:\d+(\.\d+)?[A-Za-z]?"
    };
}

/// Host names: letter or digit, then letters/digits/dots/hyphens, ending on a
/// letter or digit. Dotted numbers are accepted as well.
pub const HOSTNAME: &str = concat!(
    "(",
    let_dig!(),
    let_dig_hyp_pt!(),
    "*",
    let_dig!(),
    "+",
    r"|\d+(\.\d+)*",
    ")"
);

/// Either the syslog or the dpkg timestamp layout.
pub const TIMESTAMP: &str = concat!("(", tstamp_empirical!(), "|", tstamp_emp_dpkg!(), ")");

/// Everything up to and including the first colon.
pub const SYSLOGTAG: &str = r"[^:]+:";

/// Rest of the line.
pub const MSG: &str = r".*";

/// `<13>`: one to three digits between angle brackets.
pub const PRI: &str = r"<\d{1,3}>";

pub const NUM: &str = r"\d+";

/// `[...]` without a nested opening bracket.
pub const BRACKET: &str = r"\[[^\[]*\]";

const BUILTIN: &[(&str, &str)] = &[
    ("HOSTNAME", HOSTNAME),
    ("TIMESTAMP", TIMESTAMP),
    ("syslogtag", SYSLOGTAG),
    ("msg", MSG),
    ("PRI", PRI),
    ("NUM", NUM),
    ("bracket", BRACKET),
];

/// Look up a field in the built-in dictionary.
pub fn builtin_pattern(name: &str) -> Option<&'static str> {
    BUILTIN
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, pattern)| *pattern)
}

/// Names known to the built-in dictionary.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTIN.iter().map(|(field, _)| *field)
}

/// The dictionary a compiler resolves placeholders against: the built-in
/// fields plus any extra patterns supplied by the caller.
///
/// Extra patterns take precedence over built-in ones of the same name.
///
/// ```rust
/// use rsytmpl::FieldDictionary;
///
/// let fields = FieldDictionary::builtin().with_field("word", r"\w+");
/// assert_eq!(fields.get("word"), Some(r"\w+"));
/// assert_eq!(fields.get("NUM"), Some(r"\d+"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldDictionary {
    extra: HashMap<String, String>,
}

impl FieldDictionary {
    /// Only the built-in fields.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Add (or shadow) a field pattern.
    pub fn with_field(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.extra.insert(name.into(), pattern.into());
        self
    }

    /// Resolve a placeholder base name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.extra
            .get(name)
            .map(String::as_str)
            .or_else(|| builtin_pattern(name))
    }

    /// True if `name` resolves.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}
