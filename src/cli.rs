use clap::Parser;
use std::path::PathBuf;

/// Parse command-line tokens against a JSON argument definition
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON file describing the accepted arguments
    #[arg(short, long, value_name = "FILE")]
    pub definition: PathBuf,

    /// JSON settings file supplying stored defaults
    #[arg(short, long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Let command-line lists replace stored lists instead of extending them
    #[arg(long)]
    pub no_merge: bool,

    /// Reject unknown and repeated arguments
    #[arg(long)]
    pub strict: bool,

    /// Argument that, when given, makes the parse ignore the settings file
    #[arg(long, value_name = "NAME")]
    pub disable_settings_arg: Option<String>,

    /// Write the parsed values back to the settings file
    #[arg(long, requires = "settings")]
    pub save: bool,

    /// Print the help text generated from the definition and exit
    #[arg(long)]
    pub help_text: bool,

    /// Tokens to parse (pass them after `--`)
    #[arg(value_name = "TOKENS", last = true, allow_hyphen_values = true)]
    pub tokens: Vec<String>,
}
