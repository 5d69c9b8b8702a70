use crate::types::ArgValue;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Values produced by a successful parse, keyed by canonical argument name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArguments {
    values: HashMap<String, ArgValue>,
}

impl ParsedArguments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: &str, value: ArgValue) {
        self.values.insert(name.to_string(), value);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ArgValue::as_str)
    }

    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ArgValue::as_bool)
    }

    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ArgValue::as_int)
    }

    #[must_use]
    pub fn get_double(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ArgValue::as_double)
    }

    #[must_use]
    pub fn get_list(&self, name: &str) -> Option<&[String]> {
        self.get(name).and_then(ArgValue::as_list)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Name-sorted view, stable for printing and serialization
    #[must_use]
    pub fn sorted(&self) -> BTreeMap<&str, &ArgValue> {
        self.iter().collect()
    }
}

impl Serialize for ParsedArguments {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.sorted().serialize(serializer)
    }
}
