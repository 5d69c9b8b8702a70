//! Value kinds and typed argument values

use serde::{Deserialize, Serialize};
use std::fmt;

/// How many tokens an argument consumes after its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterCount {
    /// Flag, no value token
    None,
    /// Exactly one value token
    One,
    /// Greedy: every token up to the next known argument
    Greedy,
}

/// The type of value an argument carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    String,
    Bool,
    StringList,
    Int,
    Double,
}

impl ValueKind {
    #[inline]
    #[must_use]
    pub fn parameter_count(self) -> ParameterCount {
        match self {
            ValueKind::Bool => ParameterCount::None,
            ValueKind::String | ValueKind::Int | ValueKind::Double => ParameterCount::One,
            ValueKind::StringList => ParameterCount::Greedy,
        }
    }

    /// Built-in exact-match pattern and its failure message, if the kind has one
    #[must_use]
    pub fn default_pattern(self) -> Option<(&'static str, &'static str)> {
        match self {
            ValueKind::Int => Some((r"-?[0-9]+", "A negative or positive integer is expected.")),
            ValueKind::Double => Some((r"-?[0-9]*\.?[0-9]+", "A double is expected.")),
            _ => None,
        }
    }

    /// Whether `value` can be stored in an argument of this kind.
    ///
    /// An `Int` is accepted where a `Double` is expected.
    #[must_use]
    pub fn accepts(self, value: &ArgValue) -> bool {
        matches!(
            (self, value),
            (ValueKind::String, ArgValue::String(_))
                | (ValueKind::Bool, ArgValue::Bool(_))
                | (ValueKind::StringList, ArgValue::StringList(_))
                | (ValueKind::Int, ArgValue::Int(_))
                | (ValueKind::Double, ArgValue::Double(_) | ArgValue::Int(_))
        )
    }

    /// Promote an accepted value to this kind (`Int` -> `Double`)
    #[must_use]
    pub fn promote(self, value: ArgValue) -> ArgValue {
        match (self, value) {
            (ValueKind::Double, ArgValue::Int(i)) => ArgValue::Double(i as f64),
            (_, v) => v,
        }
    }

    /// Convert a single command-line token into a value of this kind
    #[must_use]
    pub fn convert_token(self, token: &str) -> Option<ArgValue> {
        match self {
            ValueKind::String => Some(ArgValue::String(token.to_string())),
            ValueKind::StringList => Some(ArgValue::StringList(vec![token.to_string()])),
            ValueKind::Bool => parse_bool(token).map(ArgValue::Bool),
            ValueKind::Int => token.parse::<i64>().ok().map(ArgValue::Int),
            ValueKind::Double => token.parse::<f64>().ok().map(ArgValue::Double),
        }
    }

    /// Convert a value read back from a settings store
    #[must_use]
    pub fn coerce(self, value: &serde_json::Value) -> Option<ArgValue> {
        use serde_json::Value;

        match (self, value) {
            (ValueKind::String, Value::String(s)) => Some(ArgValue::String(s.clone())),
            (ValueKind::String, Value::Number(n)) => Some(ArgValue::String(n.to_string())),
            (ValueKind::String, Value::Bool(b)) => Some(ArgValue::String(b.to_string())),

            (ValueKind::Bool, Value::Bool(b)) => Some(ArgValue::Bool(*b)),
            (ValueKind::Bool, Value::String(s)) => parse_bool(s).map(ArgValue::Bool),
            (ValueKind::Bool, Value::Number(n)) => n.as_i64().map(|i| ArgValue::Bool(i != 0)),

            (ValueKind::Int, Value::Number(n)) => n.as_i64().map(ArgValue::Int),
            (ValueKind::Int, Value::String(s)) => s.trim().parse().ok().map(ArgValue::Int),

            (ValueKind::Double, Value::Number(n)) => n.as_f64().map(ArgValue::Double),
            (ValueKind::Double, Value::String(s)) => s.trim().parse().ok().map(ArgValue::Double),

            (ValueKind::StringList, Value::String(s)) => Some(ArgValue::StringList(vec![s.clone()])),
            (ValueKind::StringList, Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(ArgValue::StringList),

            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Bool => "bool",
            ValueKind::StringList => "string list",
            ValueKind::Int => "int",
            ValueKind::Double => "double",
        };
        f.write_str(name)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// A typed argument value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    StringList(Vec<String>),
}

impl ArgValue {
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            ArgValue::String(_) => ValueKind::String,
            ArgValue::Bool(_) => ValueKind::Bool,
            ArgValue::StringList(_) => ValueKind::StringList,
            ArgValue::Int(_) => ValueKind::Int,
            ArgValue::Double(_) => ValueKind::Double,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            ArgValue::Double(d) => Some(*d),
            ArgValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ArgValue::StringList(l) => Some(l),
            _ => None,
        }
    }

    /// JSON form used by settings stores. `None` for non-finite doubles,
    /// which JSON cannot represent.
    #[must_use]
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            ArgValue::Double(d) if !d.is_finite() => None,
            _ => serde_json::to_value(self).ok(),
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::String(s) => write!(f, "{s}"),
            ArgValue::Bool(b) => write!(f, "{b}"),
            ArgValue::Int(i) => write!(f, "{i}"),
            ArgValue::Double(d) => write!(f, "{d}"),
            ArgValue::StringList(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::String(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::String(s)
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Bool(b)
    }
}

impl From<i64> for ArgValue {
    fn from(i: i64) -> Self {
        ArgValue::Int(i)
    }
}

impl From<f64> for ArgValue {
    fn from(d: f64) -> Self {
        ArgValue::Double(d)
    }
}

impl From<Vec<String>> for ArgValue {
    fn from(items: Vec<String>) -> Self {
        ArgValue::StringList(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_parameter_counts() {
        assert_eq!(ValueKind::Bool.parameter_count(), ParameterCount::None);
        assert_eq!(ValueKind::Int.parameter_count(), ParameterCount::One);
        assert_eq!(ValueKind::StringList.parameter_count(), ParameterCount::Greedy);
    }

    #[test]
    fn test_int_promotes_to_double() {
        assert!(ValueKind::Double.accepts(&ArgValue::Int(3)));
        assert!(!ValueKind::Int.accepts(&ArgValue::Double(3.0)));
        assert_eq!(ValueKind::Double.promote(ArgValue::Int(3)), ArgValue::Double(3.0));
    }

    #[test]
    fn test_coerce_from_settings() {
        assert_eq!(ValueKind::Bool.coerce(&json!("yes")), Some(ArgValue::Bool(true)));
        assert_eq!(ValueKind::Int.coerce(&json!("42")), Some(ArgValue::Int(42)));
        assert_eq!(ValueKind::String.coerce(&json!(7)), Some(ArgValue::String("7".into())));
        assert_eq!(
            ValueKind::StringList.coerce(&json!(["a", "b"])),
            Some(ArgValue::StringList(vec!["a".into(), "b".into()]))
        );
        assert_eq!(
            ValueKind::StringList.coerce(&json!("solo")),
            Some(ArgValue::StringList(vec!["solo".into()]))
        );
        assert_eq!(ValueKind::StringList.coerce(&json!(["a", 1])), None);
        assert_eq!(ValueKind::Int.coerce(&json!({"x": 1})), None);

        let d = ValueKind::Double.coerce(&json!(2.5)).and_then(|v| v.as_double());
        assert_relative_eq!(d.unwrap(), 2.5);
    }

    #[test]
    fn test_convert_token_overflow() {
        assert_eq!(ValueKind::Int.convert_token("99999999999999999999"), None);
        assert_eq!(ValueKind::Int.convert_token("-12"), Some(ArgValue::Int(-12)));
    }

    #[test]
    fn test_display() {
        let list = ArgValue::StringList(vec!["a".into(), "b".into()]);
        assert_eq!(list.to_string(), "a, b");
        assert_eq!(ValueKind::StringList.to_string(), "string list");
        assert_eq!(ArgValue::Int(5).to_json(), Some(json!(5)));
        assert_eq!(ArgValue::Double(f64::NAN).to_json(), None);
        assert_eq!(ArgValue::Double(f64::INFINITY).to_json(), None);
    }
}
