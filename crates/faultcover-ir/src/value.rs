//! Python value objects.
//!
//! `PyValue` is a closed sum over the value shapes a generated argument can
//! take. Equality, ordering and hashing are structural and derived from the
//! variant plus its data, so a list never equals a tuple with the same
//! elements and a set never equals a list. Sets and dicts are stored in
//! ordered collections, which makes them hashable and independent of the
//! order in which they were built.
//!
//! `Display` renders the Python literal for the value (`True`, `'a'`,
//! `(1,)`, `set()`, `{1: [2]}`); that literal is what gets passed to the
//! interpreter when a test case is executed.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};

/// A float with value semantics usable as a set element or dict key.
///
/// Two floats are equal iff their bit patterns are equal after NaN and
/// zero are canonicalised: `nan == nan` and `0.0 == -0.0`, as in a Python
/// set. The sign of zero is kept for rendering.
#[derive(Debug, Clone, Copy)]
pub struct PyFloat(f64);

impl PyFloat {
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self(f64::NAN)
        } else {
            Self(value)
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// The value equality, hashing and ordering look at.
    fn key(self) -> f64 {
        if self.0 == 0.0 {
            0.0
        } else {
            self.0
        }
    }
}

impl From<f64> for PyFloat {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl PartialEq for PyFloat {
    fn eq(&self, other: &Self) -> bool {
        self.key().to_bits() == other.key().to_bits()
    }
}

impl Eq for PyFloat {}

impl Hash for PyFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().to_bits().hash(state);
    }
}

impl PartialOrd for PyFloat {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PyFloat {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().total_cmp(&other.key())
    }
}

impl fmt::Display for PyFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&float_repr(self.0))
    }
}

/// The variant family of a [`PyValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Char,
    Str,
    List,
    Tuple,
    Set,
    Dict,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Char => "char",
            ValueKind::Str => "str",
            ValueKind::List => "list",
            ValueKind::Tuple => "tuple",
            ValueKind::Set => "set",
            ValueKind::Dict => "dict",
        };
        f.write_str(name)
    }
}

/// An immutable Python value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PyValue {
    Bool(bool),
    Int(i64),
    Float(PyFloat),
    Char(char),
    Str(String),
    List(Vec<PyValue>),
    Tuple(Vec<PyValue>),
    Set(BTreeSet<PyValue>),
    Dict(BTreeMap<PyValue, PyValue>),
}

impl PyValue {
    pub fn float(value: f64) -> Self {
        PyValue::Float(PyFloat::new(value))
    }

    pub fn string(text: impl Into<String>) -> Self {
        PyValue::Str(text.into())
    }

    pub fn list(elements: impl IntoIterator<Item = PyValue>) -> Self {
        PyValue::List(elements.into_iter().collect())
    }

    pub fn tuple(elements: impl IntoIterator<Item = PyValue>) -> Self {
        PyValue::Tuple(elements.into_iter().collect())
    }

    /// Build a set; duplicate elements collapse.
    pub fn set(elements: impl IntoIterator<Item = PyValue>) -> Self {
        PyValue::Set(elements.into_iter().collect())
    }

    /// Build a dict; a repeated key keeps the last value, as in Python.
    pub fn dict(entries: impl IntoIterator<Item = (PyValue, PyValue)>) -> Self {
        PyValue::Dict(entries.into_iter().collect())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            PyValue::Bool(_) => ValueKind::Bool,
            PyValue::Int(_) => ValueKind::Int,
            PyValue::Float(_) => ValueKind::Float,
            PyValue::Char(_) => ValueKind::Char,
            PyValue::Str(_) => ValueKind::Str,
            PyValue::List(_) => ValueKind::List,
            PyValue::Tuple(_) => ValueKind::Tuple,
            PyValue::Set(_) => ValueKind::Set,
            PyValue::Dict(_) => ValueKind::Dict,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            PyValue::Float(x) => Some(x.get()),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            PyValue::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a list or tuple, in order.
    pub fn elements(&self) -> Option<&[PyValue]> {
        match self {
            PyValue::List(items) | PyValue::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&BTreeSet<PyValue>> {
        match self {
            PyValue::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<PyValue, PyValue>> {
        match self {
            PyValue::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    /// Number of elements for containers and strings; `None` for scalars.
    pub fn len(&self) -> Option<usize> {
        match self {
            PyValue::Str(s) => Some(s.chars().count()),
            PyValue::List(items) | PyValue::Tuple(items) => Some(items.len()),
            PyValue::Set(items) => Some(items.len()),
            PyValue::Dict(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Whether Python would accept this value as a set element or dict key.
    pub fn is_hashable(&self) -> bool {
        match self {
            PyValue::List(_) | PyValue::Set(_) | PyValue::Dict(_) => false,
            PyValue::Tuple(items) => items.iter().all(PyValue::is_hashable),
            _ => true,
        }
    }
}

impl From<bool> for PyValue {
    fn from(value: bool) -> Self {
        PyValue::Bool(value)
    }
}

impl From<i64> for PyValue {
    fn from(value: i64) -> Self {
        PyValue::Int(value)
    }
}

impl From<f64> for PyValue {
    fn from(value: f64) -> Self {
        PyValue::float(value)
    }
}

impl From<char> for PyValue {
    fn from(value: char) -> Self {
        PyValue::Char(value)
    }
}

impl From<&str> for PyValue {
    fn from(value: &str) -> Self {
        PyValue::Str(value.to_string())
    }
}

impl From<String> for PyValue {
    fn from(value: String) -> Self {
        PyValue::Str(value)
    }
}

impl fmt::Display for PyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PyValue::Bool(true) => f.write_str("True"),
            PyValue::Bool(false) => f.write_str("False"),
            PyValue::Int(i) => write!(f, "{i}"),
            PyValue::Float(x) => write!(f, "{x}"),
            PyValue::Char(c) => f.write_str(&str_repr(&c.to_string())),
            PyValue::Str(s) => f.write_str(&str_repr(s)),
            PyValue::List(items) => {
                f.write_char('[')?;
                write_joined(f, items.iter())?;
                f.write_char(']')
            }
            PyValue::Tuple(items) => {
                f.write_char('(')?;
                write_joined(f, items.iter())?;
                if items.len() == 1 {
                    f.write_char(',')?;
                }
                f.write_char(')')
            }
            PyValue::Set(items) if items.is_empty() => f.write_str("set()"),
            PyValue::Set(items) => {
                f.write_char('{')?;
                write_joined(f, items.iter())?;
                f.write_char('}')
            }
            PyValue::Dict(entries) => {
                f.write_char('{')?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_char('}')
            }
        }
    }
}

fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a PyValue>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Python `repr` of a float: shortest round-trip digits, positional
/// notation for decimal exponents in `-4..16`, scientific otherwise.
fn float_repr(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let sci = format!("{x:e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if (-4..16).contains(&exp) {
        let fixed = format!("{x}");
        if fixed.contains('.') {
            fixed
        } else {
            format!("{fixed}.0")
        }
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    }
}

/// Python `repr` of a str: single quotes unless only double quotes avoid
/// escaping, with control characters escaped.
fn str_repr(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || (0x7f..=0xa0).contains(&(c as u32)) => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
