//! Flat string-keyed configuration and primitive value coercion.
//!
//! The container reads configuration from a single [`Properties`] map that is
//! populated before the container is built and treated as read-only after.
//! Values are coerced on demand into the primitive kind a field declares.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::Path;

use crate::error::BoxError;

/// Flat string-keyed, string-valued configuration.
///
/// # Examples
///
/// ```
/// use aeolus_di::Properties;
///
/// let props = Properties::parse("
/// ## database
/// db.url = jdbc:x
/// db.user: admin
/// ");
///
/// assert_eq!(props.get("db.url"), Some("jdbc:x"));
/// assert_eq!(props.get("db.user"), Some("admin"));
/// assert_eq!(props.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: HashMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts an entry, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Copies every entry of `other` into this map; `other` wins on conflicts.
    pub fn merge(&mut self, other: Properties) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parses `.properties` text.
    ///
    /// Leading whitespace is dropped from every line. Blank lines and lines
    /// whose first character is `#` or `!` are skipped. A line ending in an
    /// odd number of backslashes continues on the next line, whose leading
    /// whitespace is dropped.
    ///
    /// The key ends at the first unescaped `=`, `:` or whitespace. Whitespace
    /// after the key, at most one `=` or `:`, and the whitespace after that
    /// are skipped; the rest of the line is the value, trailing whitespace
    /// included. A line with no value maps its key to `""`.
    ///
    /// In keys and values `\t`, `\n`, `\r`, `\f` and `\uXXXX` decode to the
    /// character they name and `\` before any other character yields that
    /// character. A malformed `\u` escape is kept as written.
    ///
    /// ```
    /// use aeolus_di::Properties;
    ///
    /// let props = Properties::parse("greeting  Hello\\u0021 \nhome\\ dir = /srv/app");
    /// assert_eq!(props.get("greeting"), Some("Hello! "));
    /// assert_eq!(props.get("home dir"), Some("/srv/app"));
    /// ```
    pub fn parse(text: &str) -> Self {
        let mut props = Properties::new();
        let mut logical = String::new();
        let mut continuing = false;

        let text = text.replace("\r\n", "\n");
        for raw in text.split(['\n', '\r']) {
            let line = raw.trim_start_matches(is_blank);
            if !continuing && (line.is_empty() || line.starts_with(['#', '!'])) {
                continue;
            }

            let trailing = line.len() - line.trim_end_matches('\\').len();
            continuing = trailing % 2 == 1;
            logical.push_str(if continuing { &line[..line.len() - 1] } else { line });

            if !continuing {
                props.insert_line(&logical);
                logical.clear();
            }
        }

        if continuing && !logical.is_empty() {
            props.insert_line(&logical);
        }
        props
    }

    /// Reads and parses a `.properties` file.
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Renders the entries as `.properties` text, sorted by key, escaping
    /// whatever [`Properties::parse`] would otherwise read differently.
    pub fn to_text(&self) -> String {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable();

        let mut out = String::new();
        for (key, value) in entries {
            out.push_str(&escape(key, true));
            out.push('=');
            out.push_str(&escape(value, false));
            out.push('\n');
        }
        out
    }

    fn insert_line(&mut self, line: &str) {
        let mut key_end = line.len();
        let mut escaped = false;
        for (idx, c) in line.char_indices() {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '=' || c == ':' || is_blank(c) {
                key_end = idx;
                break;
            }
        }

        let mut value = line[key_end..].trim_start_matches(is_blank);
        if let Some(rest) = value.strip_prefix(['=', ':']) {
            value = rest.trim_start_matches(is_blank);
        }
        self.insert(unescape(&line[..key_end]), unescape(value));
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    // UTF-16 units from consecutive \u escapes, so surrogate pairs decode
    let mut units: Vec<u16> = Vec::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'u') {
            chars.next();
            let mut digits = String::with_capacity(4);
            while digits.len() < 4 {
                match chars.peek() {
                    Some(d) if d.is_ascii_hexdigit() => {
                        digits.push(*d);
                        chars.next();
                    }
                    _ => break,
                }
            }
            if digits.len() == 4 {
                if let Ok(unit) = u16::from_str_radix(&digits, 16) {
                    units.push(unit);
                    continue;
                }
            }
            flush_units(&mut units, &mut out);
            out.push_str("\\u");
            out.push_str(&digits);
            continue;
        }

        flush_units(&mut units, &mut out);
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    flush_units(&mut units, &mut out);
    out
}

fn flush_units(units: &mut Vec<u16>, out: &mut String) {
    out.extend(char::decode_utf16(units.drain(..)).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER)));
}

fn escape(text: &str, key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (idx, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            ' ' if key || idx == 0 => out.push_str("\\ "),
            '=' | ':' | '#' | '!' if key => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Properties {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl From<HashMap<String, String>> for Properties {
    fn from(entries: HashMap<String, String>) -> Self {
        Properties { entries }
    }
}

/// Declared primitive kind of a configurable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    Bool,
    Double,
    /// Any other kind; the raw string is passed through unchanged
    Other,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Text => "string",
            ValueKind::Int => "int",
            ValueKind::Long => "long",
            ValueKind::Bool => "bool",
            ValueKind::Double => "double",
            ValueKind::Other => "raw",
        };
        f.write_str(name)
    }
}

/// A configuration value after coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Text(String),
    Int(i32),
    Long(i64),
    Bool(bool),
    Double(f64),
}

/// Failure to turn a raw configuration string into a field value.
#[derive(Debug, thiserror::Error)]
pub enum CoercionError {
    #[error("cannot convert {raw:?} to {kind}")]
    Parse {
        raw: String,
        kind: ValueKind,
        #[source]
        source: BoxError,
    },
    #[error("value {raw:?} rejected by field of kind {kind}")]
    Rejected { raw: String, kind: ValueKind },
}

/// Coerces a raw string into the declared kind.
///
/// `Bool` is lenient: `"true"` in any case is `true`, everything else is
/// `false`. `Other` passes the string through unchanged.
///
/// # Examples
///
/// ```
/// use aeolus_di::{coerce, ConfigValue, ValueKind};
///
/// assert_eq!(coerce(ValueKind::Int, "42").unwrap(), ConfigValue::Int(42));
/// assert_eq!(coerce(ValueKind::Bool, "TRUE").unwrap(), ConfigValue::Bool(true));
/// assert_eq!(coerce(ValueKind::Bool, "yes").unwrap(), ConfigValue::Bool(false));
/// assert_eq!(coerce(ValueKind::Other, "v1").unwrap(), ConfigValue::Text("v1".into()));
/// assert!(coerce(ValueKind::Long, "forty").is_err());
/// ```
pub fn coerce(kind: ValueKind, raw: &str) -> Result<ConfigValue, CoercionError> {
    let parse_err = |source: BoxError| CoercionError::Parse {
        raw: raw.to_string(),
        kind,
        source,
    };
    match kind {
        ValueKind::Text | ValueKind::Other => Ok(ConfigValue::Text(raw.to_string())),
        ValueKind::Int => raw.parse().map(ConfigValue::Int).map_err(|e| parse_err(Box::new(e))),
        ValueKind::Long => raw.parse().map(ConfigValue::Long).map_err(|e| parse_err(Box::new(e))),
        ValueKind::Bool => Ok(ConfigValue::Bool(raw.eq_ignore_ascii_case("true"))),
        ValueKind::Double => raw.trim().parse().map(ConfigValue::Double).map_err(|e| parse_err(Box::new(e))),
    }
}

/// A field type the container can fill from configuration.
///
/// Implemented for `String`, `i32`, `i64`, `bool` and `f64`. Other types
/// declare [`ValueKind::Other`] and receive the raw text.
///
/// # Examples
///
/// ```
/// use aeolus_di::{ConfigValue, Property, ValueKind};
///
/// #[derive(Debug, PartialEq)]
/// enum Env { Dev, Prod }
///
/// impl Property for Env {
///     const KIND: ValueKind = ValueKind::Other;
///
///     fn from_value(value: ConfigValue) -> Option<Self> {
///         match value {
///             ConfigValue::Text(s) if s == "dev" => Some(Env::Dev),
///             ConfigValue::Text(s) if s == "prod" => Some(Env::Prod),
///             _ => None,
///         }
///     }
/// }
///
/// assert_eq!(Env::from_value(ConfigValue::Text("prod".into())), Some(Env::Prod));
/// ```
pub trait Property: Sized + Send + 'static {
    /// Kind the raw string is coerced to before [`from_value`](Self::from_value).
    const KIND: ValueKind;

    fn from_value(value: ConfigValue) -> Option<Self>;
}

impl Property for String {
    const KIND: ValueKind = ValueKind::Text;

    fn from_value(value: ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Property for i32 {
    const KIND: ValueKind = ValueKind::Int;

    fn from_value(value: ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Int(v) => Some(v),
            _ => None,
        }
    }
}

impl Property for i64 {
    const KIND: ValueKind = ValueKind::Long;

    fn from_value(value: ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Long(v) => Some(v),
            _ => None,
        }
    }
}

impl Property for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn from_value(value: ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl Property for f64 {
    const KIND: ValueKind = ValueKind::Double;

    fn from_value(value: ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Double(v) => Some(v),
            _ => None,
        }
    }
}

/// Coerces `raw` for a typed property.
pub(crate) fn convert<P: Property>(raw: &str) -> Result<P, CoercionError> {
    let value = coerce(P::KIND, raw)?;
    P::from_value(value).ok_or_else(|| CoercionError::Rejected {
        raw: raw.to_string(),
        kind: P::KIND,
    })
}
