use std::path::PathBuf;

use clap::Parser;
use sqlchat_db::OutputFormat;
use sqlchat_llm::ProviderKind;

/// Ask questions of a PostgreSQL database in plain language.
///
/// Without `--ask` the binary reads one question per line from stdin. `/clear` clears the
/// screen, `/quit` exits.
#[derive(Parser, Debug, Default)]
#[command(name = "sqlchat", version, about)]
pub struct Args {
    /// Config file (default: ~/.config/sqlchat/config.toml)
    #[arg(long, env = "SQLCHAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Model identifier sent with every completion request
    #[arg(long)]
    pub model: Option<String>,

    /// Completion wire format: `ollama` or `openai_compatible`
    #[arg(long)]
    pub provider: Option<ProviderKind>,

    /// Base URL of the completion endpoint
    #[arg(long)]
    pub llm_url: Option<String>,

    /// How read results are printed: `table`, `json` or `markdown`
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Run a single question and exit instead of reading stdin
    #[arg(long)]
    pub ask: Option<String>,

    /// Write the effective configuration to the config path and exit
    #[arg(long)]
    pub write_default_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let args = Args::try_parse_from([
            "sqlchat",
            "--model",
            "llama3",
            "--provider",
            "openai",
            "--format",
            "json",
            "--ask",
            "how many orders?",
        ])
        .unwrap();
        assert_eq!(args.model.as_deref(), Some("llama3"));
        assert_eq!(args.provider, Some(ProviderKind::OpenAiCompatible));
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.ask.as_deref(), Some("how many orders?"));
        assert!(!args.write_default_config);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Args::try_parse_from(["sqlchat", "--format", "xml"]).is_err());
    }
}
