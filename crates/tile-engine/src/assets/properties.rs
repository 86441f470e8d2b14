//! Typed map properties.
//!
//! Map files store every property as a string. `PropertyValue::coerce` turns
//! them into the most likely type: integers, floats, booleans, class
//! references (`Ladder`, `prefabs.Ladder`) and otherwise plain strings.

use std::collections::BTreeMap;

pub type Properties = BTreeMap<String, PropertyValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    /// A reference to a registered class; holds the name without any
    /// module prefix.
    Class(String),
    Str(String),
}

impl PropertyValue {
    pub fn coerce(raw: &str) -> Self {
        if is_int(raw) {
            if let Ok(v) = raw.parse() {
                return PropertyValue::Int(v);
            }
        }
        if is_float(raw) {
            if let Ok(v) = raw.parse() {
                return PropertyValue::Float(v);
            }
        }
        if raw.eq_ignore_ascii_case("true") {
            return PropertyValue::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return PropertyValue::Bool(false);
        }
        if let Some(class) = class_name(raw) {
            return PropertyValue::Class(class.to_string());
        }
        PropertyValue::Str(raw.to_string())
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            PropertyValue::Int(v) => Some(*v as f32),
            PropertyValue::Float(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// String view of string-like values. Class references count, since a
    /// capitalised word is ambiguous between the two.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) | PropertyValue::Class(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness used for flag-style tile properties such as `exit`.
    pub fn is_truthy(&self) -> bool {
        match self {
            PropertyValue::Int(v) => *v != 0,
            PropertyValue::Float(v) => *v != 0.0,
            PropertyValue::Bool(v) => *v,
            PropertyValue::Class(_) => true,
            PropertyValue::Str(s) => !s.is_empty(),
        }
    }
}

/// Coerce every value of a raw string map.
pub fn coerce_all<'a, I>(raw: I) -> Properties
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    raw.into_iter()
        .map(|(k, v)| (k.clone(), PropertyValue::coerce(v)))
        .collect()
}

fn is_int(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_float(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    match body.split_once('.') {
        Some((whole, frac)) => is_int(whole) && !whole.starts_with('-') && is_int(frac) && !frac.starts_with('-'),
        None => false,
    }
}

/// Accepts an optionally dotted path (`tiles.Ladder`) whose last segment is
/// an ASCII uppercase letter followed by one or more ASCII letters or
/// digits, and returns that segment. A leading dot with nothing before it
/// (`.Ladder`) is rejected.
fn class_name(s: &str) -> Option<&str> {
    let (prefix, name) = match s.rsplit_once('.') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, s),
    };
    if prefix.is_some_and(str::is_empty) {
        return None;
    }
    let mut chars = name.chars();
    let first = chars.next()?;
    let rest = chars.as_str();
    if first.is_ascii_uppercase()
        && !rest.is_empty()
        && rest.chars().all(|c| c.is_ascii_alphanumeric())
    {
        Some(name)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert_eq!(PropertyValue::coerce("1"), PropertyValue::Int(1));
        assert_eq!(PropertyValue::coerce("-51"), PropertyValue::Int(-51));
        assert_eq!(PropertyValue::coerce("0.1"), PropertyValue::Float(0.1));
        assert_eq!(PropertyValue::coerce("-2.5"), PropertyValue::Float(-2.5));
        assert_eq!(PropertyValue::coerce("1."), PropertyValue::Str("1.".into()));
        assert_eq!(PropertyValue::coerce("-"), PropertyValue::Str("-".into()));
    }

    #[test]
    fn booleans_ignore_case() {
        assert_eq!(PropertyValue::coerce("true"), PropertyValue::Bool(true));
        assert_eq!(PropertyValue::coerce("False"), PropertyValue::Bool(false));
        assert_eq!(PropertyValue::coerce("TRUE"), PropertyValue::Bool(true));
    }

    #[test]
    fn class_references() {
        assert_eq!(PropertyValue::coerce("Ladder"), PropertyValue::Class("Ladder".into()));
        assert_eq!(
            PropertyValue::coerce("prefabs.LiquidBody"),
            PropertyValue::Class("LiquidBody".into())
        );
        assert_eq!(PropertyValue::coerce("ladder"), PropertyValue::Str("ladder".into()));
        assert_eq!(PropertyValue::coerce("A"), PropertyValue::Str("A".into()));
        assert_eq!(PropertyValue::coerce(".Ladder"), PropertyValue::Str(".Ladder".into()));
        assert_eq!(
            PropertyValue::coerce("some text"),
            PropertyValue::Str("some text".into())
        );
    }

    #[test]
    fn accessors() {
        assert_eq!(PropertyValue::Int(3).as_f32(), Some(3.0));
        assert_eq!(PropertyValue::Class("Ladder".into()).as_str(), Some("Ladder"));
        assert!(PropertyValue::Int(1).is_truthy());
        assert!(!PropertyValue::Bool(false).is_truthy());
        assert!(!PropertyValue::Str(String::new()).is_truthy());
    }
}
