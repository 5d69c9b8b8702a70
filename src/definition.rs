//! Declarative argument definitions loaded from JSON

use crate::parser::{CommandLineParser, DefinitionError, DEFAULT_LONG_PREFIX, DEFAULT_SHORT_PREFIX};
use crate::types::{ArgValue, ValueKind};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// One argument entry of a definition file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgumentSpec {
    #[serde(default)]
    pub long: String,
    #[serde(default)]
    pub short: String,
    pub kind: ValueKind,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub default: Option<ArgValue>,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub ignore_rest: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub pattern_message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserDefinition {
    #[serde(default = "default_long_prefix")]
    pub long_prefix: String,
    #[serde(default = "default_short_prefix")]
    pub short_prefix: String,
    #[serde(default)]
    pub strict: bool,
    pub arguments: Vec<ArgumentSpec>,
}

fn default_long_prefix() -> String {
    DEFAULT_LONG_PREFIX.to_string()
}

fn default_short_prefix() -> String {
    DEFAULT_SHORT_PREFIX.to_string()
}

impl ParserDefinition {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read argument definition: {}", path.display()))?;
        text.parse::<Self>()
            .with_context(|| format!("Invalid argument definition: {}", path.display()))
    }

    /// Register every argument on `parser`
    pub fn apply(&self, parser: &mut CommandLineParser) -> Result<(), DefinitionError> {
        parser.set_argument_prefix(&self.long_prefix, &self.short_prefix);
        parser.set_strict_mode(self.strict);

        for spec in &self.arguments {
            parser.begin_group(&spec.group);
            let registered = parser.add_argument(
                &spec.long,
                &spec.short,
                spec.kind,
                &spec.help,
                spec.default.clone(),
                spec.ignore_rest,
                spec.deprecated,
            );
            parser.end_group();
            registered?;

            if let Some(pattern) = &spec.pattern {
                let name = if spec.long.is_empty() { &spec.short } else { &spec.long };
                parser.set_exact_match_regular_expression(name, pattern, &spec.pattern_message)?;
            }
        }

        Ok(())
    }

    pub fn build_parser(&self) -> Result<CommandLineParser, DefinitionError> {
        let mut parser = CommandLineParser::new();
        self.apply(&mut parser)?;
        Ok(parser)
    }
}

impl std::str::FromStr for ParserDefinition {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const DEFINITION: &str = r#"{
        "strict": true,
        "arguments": [
            { "long": "help", "short": "h", "kind": "bool", "help": "Print usage" },
            { "long": "port", "kind": "int", "default": 104, "group": "Network",
              "pattern": "[0-9]{1,5}", "pattern_message": "A port number is expected." },
            { "long": "aet", "kind": "string", "default": "CTK", "group": "Network" },
            { "long": "peers", "kind": "string_list" },
            { "long": "timeout", "kind": "double", "default": 30 }
        ]
    }"#;

    #[test]
    fn test_build_from_json() {
        let definition: ParserDefinition = DEFINITION.parse().unwrap();
        assert_eq!(definition.long_prefix, "--");
        assert_eq!(definition.arguments.len(), 5);

        let mut parser = definition.build_parser().unwrap();
        assert!(parser.strict_mode());
        assert_eq!(parser.descriptor("port").unwrap().group, "Network");
        assert_eq!(
            parser.descriptor("timeout").unwrap().default_value,
            Some(ArgValue::Double(30.0))
        );

        let parsed = parser.parse_arguments(["--port", "11112", "--peers", "a", "b"]).unwrap();
        assert_eq!(parsed.get_int("port"), Some(11112));
        assert_eq!(parsed.get_str("aet"), Some("CTK"));
        assert_eq!(parsed.get_list("peers").map(<[String]>::len), Some(2));

        let err = parser.parse_arguments(["--port", "123456"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Value(s) associated with argument --port are incorrect. A port number is expected."
        );
    }

    #[test]
    fn test_group_is_scoped_to_its_entry() {
        let definition: ParserDefinition = DEFINITION.parse().unwrap();
        let parser = definition.build_parser().unwrap();
        assert_eq!(parser.descriptor("peers").unwrap().group, "");
    }

    #[test]
    fn test_definition_errors_propagate() {
        let definition: ParserDefinition = r#"{
            "arguments": [
                { "long": "level", "kind": "int", "default": "high" }
            ]
        }"#
        .parse()
        .unwrap();
        assert_matches!(
            definition.build_parser(),
            Err(DefinitionError::DefaultTypeMismatch { .. })
        );
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let parsed: Result<ParserDefinition, _> =
            r#"{ "arguments": [ { "long": "x", "kind": "bool", "colour": "red" } ] }"#.parse();
        assert!(parsed.is_err());
    }

    #[test]
    fn test_from_path_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ParserDefinition::from_path(&dir.path().join("none.json")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read argument definition"));
    }
}
