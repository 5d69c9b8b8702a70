use super::validation::ExactMatch;
use crate::types::{ArgValue, ValueKind};

/// A registered argument and the value collected for it during the last parse
#[derive(Debug, Clone)]
pub struct ArgumentDescriptor {
    pub long_name: String,
    pub short_name: String,
    pub kind: ValueKind,
    pub help: String,
    pub default_value: Option<ArgValue>,
    pub ignore_rest: bool,
    pub deprecated: bool,
    pub group: String,
    pub(crate) validation: Option<ExactMatch>,
    pub(crate) value: Option<ArgValue>,
}

impl ArgumentDescriptor {
    pub(crate) fn new(long_name: &str, short_name: &str, kind: ValueKind) -> Self {
        let validation = kind
            .default_pattern()
            .and_then(|(pattern, message)| ExactMatch::new(pattern, message).ok());

        Self {
            long_name: long_name.to_string(),
            short_name: short_name.to_string(),
            kind,
            help: String::new(),
            default_value: None,
            ignore_rest: false,
            deprecated: false,
            group: String::new(),
            validation,
            value: None,
        }
    }

    /// Key under which parsed values are reported
    #[must_use]
    pub fn canonical_name(&self) -> &str {
        if self.long_name.is_empty() {
            &self.short_name
        } else {
            &self.long_name
        }
    }

    #[must_use]
    pub fn validation(&self) -> Option<&ExactMatch> {
        self.validation.as_ref()
    }

    #[must_use]
    pub fn value(&self) -> Option<&ArgValue> {
        self.value.as_ref()
    }

    /// Message reported when a value is rejected
    #[must_use]
    pub fn failure_message(&self) -> String {
        match &self.validation {
            Some(v) => v.message().to_string(),
            None => format!("A {} value is expected.", self.kind),
        }
    }

    /// Validate and store one value token. Returns `false` if it is rejected.
    pub(crate) fn add_parameter(&mut self, token: &str) -> bool {
        if let Some(v) = &self.validation
            && !v.is_match(token)
        {
            return false;
        }

        let Some(converted) = self.kind.convert_token(token) else {
            return false;
        };

        match (&mut self.value, converted) {
            (Some(ArgValue::StringList(items)), ArgValue::StringList(mut more)) => {
                items.append(&mut more);
            }
            (slot, converted) => *slot = Some(converted),
        }
        true
    }

    pub(crate) fn set_flag(&mut self) {
        self.value = Some(ArgValue::Bool(true));
    }

    /// Mark a list argument as present even when no value follows it
    pub(crate) fn ensure_present(&mut self) {
        if self.value.is_none() && self.kind == ValueKind::StringList {
            self.value = Some(ArgValue::StringList(Vec::new()));
        }
    }

    pub(crate) fn reset(&mut self) {
        self.value = None;
    }

    /// `"  -s, --long"`, `"  --long"` or `"  -s"`
    #[must_use]
    pub fn names_column(&self, long_prefix: &str, short_prefix: &str) -> String {
        let mut column = String::from("  ");
        if !self.short_name.is_empty() {
            column.push_str(short_prefix);
            column.push_str(&self.short_name);
        }
        if !self.long_name.is_empty() {
            if !self.short_name.is_empty() {
                column.push_str(", ");
            }
            column.push_str(long_prefix);
            column.push_str(&self.long_name);
        }
        column
    }

    /// One help line. `shown_default` overrides the registered default.
    #[must_use]
    pub fn help_line(
        &self,
        field_width: usize,
        long_prefix: &str,
        short_prefix: &str,
        shown_default: Option<&str>,
    ) -> String {
        let names = self.names_column(long_prefix, short_prefix);
        let mut line = if self.help.is_empty() {
            names
        } else {
            format!("{names:<field_width$}{help}", help = self.help)
        };

        let default = shown_default
            .map(str::to_string)
            .or_else(|| self.default_value.as_ref().map(ToString::to_string));
        if let Some(default) = default {
            line.push_str(&format!(" (default: {default})"));
        }
        line.push('\n');
        line
    }
}
