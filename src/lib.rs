pub mod cli;
pub mod definition;
pub mod parser;
pub mod report;
pub mod settings;
pub mod types;

// Re-export commonly used items
pub use parser::{CommandLineParser, DefinitionError, ParseError, ParsedArguments};
pub use report::print_report;
pub use settings::{JsonSettings, MemorySettings, SettingsStore};
pub use types::{ArgValue, ValueKind};
