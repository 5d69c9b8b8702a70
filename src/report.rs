use crate::parser::ParsedArguments;
use serde::Serialize;

/// Outcome of a parse, as printed by the command-line tool
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub values: &'a ParsedArguments,
    pub unparsed: &'a [String],
}

impl<'a> Report<'a> {
    #[must_use]
    pub fn new(values: &'a ParsedArguments, unparsed: &'a [String]) -> Self {
        Self { values, unparsed }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub fn print_report(values: &ParsedArguments, unparsed: &[String]) -> serde_json::Result<()> {
    println!("{}", Report::new(values, unparsed).to_json()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CommandLineParser;
    use crate::types::ValueKind;
    use serde_json::json;

    #[test]
    fn test_report_shape() {
        let mut parser = CommandLineParser::new();
        parser.argument("verbose", ValueKind::Bool).short("v").register().unwrap();
        parser.argument("level", ValueKind::Double).default_value(0.5).register().unwrap();
        parser.argument("tags", ValueKind::StringList).register().unwrap();

        let parsed = parser.parse_arguments(["-v", "--tags", "x", "y"]).unwrap();
        let report = Report::new(&parsed, parser.unparsed_arguments());
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "values": { "level": 0.5, "tags": ["x", "y"], "verbose": true },
                "unparsed": []
            })
        );
    }
}
