//! Command-line parsing against registered argument descriptors
//!
//! Arguments are registered up front with a name, a value kind and an optional
//! default. Parsing a token list yields typed values keyed by canonical name,
//! plus whatever tokens were not recognized. Defaults can be read from a
//! [`SettingsStore`](crate::settings::SettingsStore).

mod descriptor;
mod error;
mod help;
mod parsed;
mod validation;

pub use descriptor::ArgumentDescriptor;
pub use error::{DefinitionError, ParseError};
pub use parsed::ParsedArguments;
pub use validation::ExactMatch;

use crate::settings::{SettingsError, SettingsStore};
use crate::types::{ArgValue, ParameterCount, ValueKind};
use std::collections::{BTreeMap, HashMap, HashSet};

pub const DEFAULT_LONG_PREFIX: &str = "--";
pub const DEFAULT_SHORT_PREFIX: &str = "-";

pub struct CommandLineParser {
    descriptors: Vec<ArgumentDescriptor>,
    name_index: HashMap<String, usize>,
    groups: BTreeMap<String, Vec<usize>>,
    current_group: String,

    long_prefix: String,
    short_prefix: String,
    strict: bool,

    settings: Option<Box<dyn SettingsStore>>,
    use_settings: bool,
    disable_settings_arg: Option<String>,
    merge_settings: bool,

    // State of the last parse
    processed: HashSet<String>,
    unparsed: Vec<String>,
    error: Option<ParseError>,
}

impl CommandLineParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            name_index: HashMap::new(),
            groups: BTreeMap::new(),
            current_group: String::new(),
            long_prefix: DEFAULT_LONG_PREFIX.to_string(),
            short_prefix: DEFAULT_SHORT_PREFIX.to_string(),
            strict: false,
            settings: None,
            use_settings: false,
            disable_settings_arg: None,
            merge_settings: true,
            processed: HashSet::new(),
            unparsed: Vec::new(),
            error: None,
        }
    }

    /// Parser with a settings store attached. The store is consulted only
    /// after [`enable_settings`](Self::enable_settings).
    #[must_use]
    pub fn with_settings(settings: Box<dyn SettingsStore>) -> Self {
        let mut parser = Self::new();
        parser.settings = Some(settings);
        parser
    }

    pub fn set_settings(&mut self, settings: Box<dyn SettingsStore>) {
        self.settings = Some(settings);
    }

    #[must_use]
    pub fn settings(&self) -> Option<&dyn SettingsStore> {
        self.settings.as_deref()
    }

    pub fn set_argument_prefix(&mut self, long_prefix: &str, short_prefix: &str) {
        self.long_prefix = long_prefix.to_string();
        self.short_prefix = short_prefix.to_string();
    }

    #[must_use]
    pub fn long_prefix(&self) -> &str {
        &self.long_prefix
    }

    #[must_use]
    pub fn short_prefix(&self) -> &str {
        &self.short_prefix
    }

    pub fn set_strict_mode(&mut self, strict: bool) {
        self.strict = strict;
    }

    #[must_use]
    pub fn strict_mode(&self) -> bool {
        self.strict
    }

    /// Use the attached settings store for defaults. When `disable_long_arg` is
    /// given and that argument appears on the command line, the store is
    /// ignored for that parse.
    pub fn enable_settings(&mut self, disable_long_arg: Option<&str>) {
        self.use_settings = true;
        self.disable_settings_arg = disable_long_arg.map(str::to_string);
    }

    #[must_use]
    pub fn settings_enabled(&self) -> bool {
        self.use_settings
    }

    /// Whether list values from the command line are appended to stored ones
    /// (`true`) or replace them (`false`)
    pub fn merge_settings(&mut self, merge: bool) {
        self.merge_settings = merge;
    }

    #[must_use]
    pub fn settings_merged(&self) -> bool {
        self.merge_settings
    }

    pub fn begin_group(&mut self, description: &str) {
        self.current_group = description.to_string();
    }

    pub fn end_group(&mut self) {
        self.current_group.clear();
    }

    /// Start registering an argument. Finish with [`ArgumentBuilder::register`].
    pub fn argument(&mut self, long_name: &str, kind: ValueKind) -> ArgumentBuilder<'_> {
        ArgumentBuilder {
            parser: self,
            long_name: long_name.to_string(),
            short_name: String::new(),
            kind,
            help: String::new(),
            default_value: None,
            ignore_rest: false,
            deprecated: false,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_argument(
        &mut self,
        long_name: &str,
        short_name: &str,
        kind: ValueKind,
        help: &str,
        default_value: Option<ArgValue>,
        ignore_rest: bool,
        deprecated: bool,
    ) -> Result<(), DefinitionError> {
        if long_name.is_empty() && short_name.is_empty() {
            return Err(DefinitionError::MissingName);
        }

        for name in [long_name, short_name] {
            if !name.is_empty() && self.name_index.contains_key(name) {
                return Err(DefinitionError::DuplicateName(name.to_string()));
            }
        }
        if long_name == short_name {
            return Err(DefinitionError::DuplicateName(long_name.to_string()));
        }

        let mut desc = ArgumentDescriptor::new(long_name, short_name, kind);

        if let Some(value) = default_value {
            if !kind.accepts(&value) {
                return Err(DefinitionError::DefaultTypeMismatch {
                    name: desc.canonical_name().to_string(),
                    kind,
                    value,
                });
            }
            desc.default_value = Some(kind.promote(value));
        }

        desc.help = help.to_string();
        desc.ignore_rest = ignore_rest;
        desc.deprecated = deprecated;
        desc.group = self.current_group.clone();

        let index = self.descriptors.len();
        for name in [long_name, short_name] {
            if !name.is_empty() {
                self.name_index.insert(name.to_string(), index);
            }
        }
        self.groups.entry(desc.group.clone()).or_default().push(index);
        self.descriptors.push(desc);

        Ok(())
    }

    /// Register a flag that is still accepted but listed as deprecated
    pub fn add_deprecated_argument(
        &mut self,
        long_name: &str,
        short_name: &str,
        help: &str,
    ) -> Result<(), DefinitionError> {
        self.add_argument(long_name, short_name, ValueKind::Bool, help, None, false, true)
    }

    /// Require every value of `name` to match `pattern` in full
    pub fn set_exact_match_regular_expression(
        &mut self,
        name: &str,
        pattern: &str,
        failure_message: &str,
    ) -> Result<(), DefinitionError> {
        let index = self
            .lookup(name)
            .ok_or_else(|| DefinitionError::UnknownArgument(name.to_string()))?;

        let desc = &mut self.descriptors[index];
        if desc.kind == ValueKind::Bool {
            return Err(DefinitionError::BoolHasNoValue(name.to_string()));
        }

        let matcher = ExactMatch::new(pattern, failure_message).map_err(|source| {
            DefinitionError::InvalidPattern {
                name: name.to_string(),
                source,
            }
        })?;
        desc.validation = Some(matcher);
        Ok(())
    }

    #[must_use]
    pub fn descriptors(&self) -> &[ArgumentDescriptor] {
        &self.descriptors
    }

    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<&ArgumentDescriptor> {
        self.lookup(name).map(|i| &self.descriptors[i])
    }

    /// Whether `name` (bare or prefixed) is registered
    #[must_use]
    pub fn argument_added(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Whether `name` (bare or prefixed) was supplied in the last parse
    #[must_use]
    pub fn argument_parsed(&self, name: &str) -> bool {
        self.lookup(name)
            .is_some_and(|i| self.processed.contains(self.descriptors[i].canonical_name()))
    }

    #[must_use]
    pub fn unparsed_arguments(&self) -> &[String] {
        &self.unparsed
    }

    /// Description of the last parse failure, empty if it succeeded
    #[must_use]
    pub fn error_string(&self) -> String {
        self.error.as_ref().map(ToString::to_string).unwrap_or_default()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    pub fn parse_arguments<I, S>(&mut self, arguments: I) -> Result<ParsedArguments, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<String> = arguments
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();

        self.reset_parse_state();

        if let Err(e) = self.scan(&tokens) {
            tracing::debug!(error = %e, "argument parsing failed");
            self.error = Some(e.clone());
            return Err(e);
        }

        let use_settings = self.settings_active(&tokens);
        Ok(self.collect_results(use_settings))
    }

    /// Write parsed values into the settings store and persist it. Returns how
    /// many values were written.
    ///
    /// List arguments given on the command line store their command-line
    /// values only, so a merged list is not merged again on the next parse.
    /// Values JSON cannot hold (non-finite doubles) are skipped.
    pub fn store_parsed(&mut self, parsed: &ParsedArguments) -> Result<usize, SettingsError> {
        if self.settings.is_none() {
            return Ok(0);
        }

        let mut entries = Vec::with_capacity(parsed.len());
        for (name, value) in parsed.iter() {
            let own_value = self
                .lookup(name)
                .map(|i| &self.descriptors[i])
                .filter(|d| d.kind == ValueKind::StringList && self.processed.contains(name))
                .and_then(ArgumentDescriptor::value);
            let value = own_value.unwrap_or(value);

            match value.to_json() {
                Some(json) => entries.push((name.to_string(), json)),
                None => tracing::warn!(argument = name, %value, "value cannot be stored, skipping"),
            }
        }

        let Some(settings) = self.settings.as_deref_mut() else {
            return Ok(0);
        };
        for (name, json) in &entries {
            settings.set_value(name, json.clone());
        }
        settings.sync()?;
        Ok(entries.len())
    }

    fn reset_parse_state(&mut self) {
        self.processed.clear();
        self.unparsed.clear();
        self.error = None;
        for desc in &mut self.descriptors {
            desc.reset();
        }
    }

    fn has_prefix(&self, token: &str) -> bool {
        token.starts_with(&self.long_prefix) || token.starts_with(&self.short_prefix)
    }

    /// Resolve a prefixed token to a descriptor index
    fn resolve(&self, token: &str) -> Option<usize> {
        if let Some(bare) = token.strip_prefix(self.long_prefix.as_str())
            && let Some(&index) = self.name_index.get(bare)
        {
            return Some(index);
        }
        token
            .strip_prefix(self.short_prefix.as_str())
            .and_then(|bare| self.name_index.get(bare).copied())
    }

    fn lookup(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied().or_else(|| self.resolve(name))
    }

    fn scan(&mut self, tokens: &[String]) -> Result<(), ParseError> {
        let mut ignore_rest = false;
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];
            i += 1;

            if ignore_rest {
                self.unparsed.push(token.clone());
                continue;
            }

            let index = if self.has_prefix(token) {
                self.resolve(token)
            } else {
                None
            };

            let Some(index) = index else {
                if self.strict {
                    return Err(ParseError::UnknownArgument(token.clone()));
                }
                self.unparsed.push(token.clone());
                continue;
            };

            let desc = &self.descriptors[index];
            if self.processed.contains(desc.canonical_name()) {
                if self.strict {
                    return Err(ParseError::AlreadyProcessed(token.clone()));
                }
                // Values following the repeat fall through as ordinary tokens
                tracing::warn!(argument = %token, "skipping argument, already processed");
                continue;
            }

            let kind = desc.kind;
            ignore_rest = desc.ignore_rest;
            if desc.deprecated {
                tracing::warn!(argument = %token, help = %desc.help, "deprecated argument");
            }
            self.processed.insert(desc.canonical_name().to_string());

            match kind.parameter_count() {
                ParameterCount::None => self.descriptors[index].set_flag(),
                ParameterCount::One => {
                    let value = tokens.get(i).ok_or_else(|| ParseError::MissingValue {
                        argument: token.clone(),
                        expected: 1,
                        found: 0,
                    })?;
                    self.accept_value(index, token, value)?;
                    i += 1;
                }
                ParameterCount::Greedy => {
                    self.descriptors[index].ensure_present();
                    while let Some(value) = tokens.get(i) {
                        if self.resolve(value).is_some() {
                            break;
                        }
                        self.accept_value(index, token, value)?;
                        i += 1;
                    }
                }
            }
        }

        Ok(())
    }

    fn accept_value(&mut self, index: usize, argument: &str, value: &str) -> Result<(), ParseError> {
        let desc = &mut self.descriptors[index];
        if desc.add_parameter(value) {
            tracing::trace!(%argument, %value, "value accepted");
            Ok(())
        } else {
            Err(ParseError::InvalidValue {
                argument: argument.to_string(),
                message: desc.failure_message(),
            })
        }
    }

    fn settings_active(&self, tokens: &[String]) -> bool {
        if !self.use_settings || self.settings.is_none() {
            return false;
        }
        match &self.disable_settings_arg {
            Some(name) => {
                let flag = format!("{}{name}", self.long_prefix);
                let disabled = tokens.iter().any(|t| *t == flag) || self.argument_parsed(name);
                if disabled {
                    tracing::debug!(argument = %flag, "settings disabled from the command line");
                }
                !disabled
            }
            None => true,
        }
    }

    /// Stored value for `desc`, converted to its kind
    fn stored_value(&self, desc: &ArgumentDescriptor) -> Option<ArgValue> {
        let raw = self.settings.as_deref()?.value(desc.canonical_name())?;
        let converted = desc.kind.coerce(&raw);
        if converted.is_none() {
            tracing::warn!(
                argument = desc.canonical_name(),
                stored = %raw,
                kind = %desc.kind,
                "ignoring stored value of the wrong type"
            );
        }
        converted
    }

    fn collect_results(&self, use_settings: bool) -> ParsedArguments {
        let mut parsed = ParsedArguments::new();

        for desc in &self.descriptors {
            let key = desc.canonical_name();

            if self.processed.contains(key) {
                let Some(mut value) = desc.value().cloned() else {
                    continue;
                };

                if use_settings
                    && self.merge_settings
                    && let ArgValue::StringList(from_command_line) = &value
                    && let Some(ArgValue::StringList(mut merged)) = self.stored_value(desc)
                {
                    merged.extend(from_command_line.iter().cloned());
                    value = ArgValue::StringList(merged);
                }

                parsed.insert(key, value);
                continue;
            }

            let stored = if use_settings { self.stored_value(desc) } else { None };
            if let Some(value) = stored.or_else(|| desc.default_value.clone()) {
                parsed.insert(key, value);
            }
        }

        parsed
    }
}

impl std::fmt::Debug for CommandLineParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandLineParser")
            .field("descriptors", &self.descriptors)
            .field("long_prefix", &self.long_prefix)
            .field("short_prefix", &self.short_prefix)
            .field("strict", &self.strict)
            .field("use_settings", &self.use_settings)
            .field("merge_settings", &self.merge_settings)
            .finish_non_exhaustive()
    }
}

impl Default for CommandLineParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent registration of one argument
pub struct ArgumentBuilder<'p> {
    parser: &'p mut CommandLineParser,
    long_name: String,
    short_name: String,
    kind: ValueKind,
    help: String,
    default_value: Option<ArgValue>,
    ignore_rest: bool,
    deprecated: bool,
}

impl ArgumentBuilder<'_> {
    #[must_use]
    pub fn short(mut self, name: &str) -> Self {
        self.short_name = name.to_string();
        self
    }

    #[must_use]
    pub fn help(mut self, text: &str) -> Self {
        self.help = text.to_string();
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<ArgValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn ignore_rest(mut self) -> Self {
        self.ignore_rest = true;
        self
    }

    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn register(self) -> Result<(), DefinitionError> {
        self.parser.add_argument(
            &self.long_name,
            &self.short_name,
            self.kind,
            &self.help,
            self.default_value,
            self.ignore_rest,
            self.deprecated,
        )
    }
}
