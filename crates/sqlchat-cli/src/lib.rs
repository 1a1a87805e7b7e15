//! Command-line front end for the sqlchat pipeline.

pub mod cli;
pub mod config;
pub mod render;
pub mod repl;
pub mod tracing_setup;

use clap::Parser;
use color_eyre::eyre::Result;
use sqlchat_db::PgConnector;
use sqlchat_llm::ChatClient;
use sqlchat_pipeline::Pipeline;
use tokio::io::BufReader;

use crate::cli::Args;
use crate::config::AppConfig;

pub async fn try_main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let vars: ::config::Map<String, String> = std::env::vars().collect();
    let mut app_config = AppConfig::load(args.config.as_deref(), &vars)?;
    app_config.apply_args(&args);

    if args.write_default_config {
        let path = args
            .config
            .clone()
            .unwrap_or_else(AppConfig::default_config_path);
        app_config.save_to_path(&path)?;
        println!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    let _guard = tracing_setup::init_tracing(&tracing_setup::default_log_dir())?;
    tracing::info!(
        provider = ?app_config.llm.provider,
        model = %app_config.llm.model,
        database = ?app_config.database,
        "starting sqlchat"
    );

    let llm = ChatClient::new(app_config.provider_config()?);
    let pipeline = Pipeline::new(llm, PgConnector, app_config.pipeline_config());
    let format = app_config.output.format;

    let mut stdout = std::io::stdout();
    match args.ask {
        Some(question) if question.trim().is_empty() => println!("{}", repl::EMPTY_QUESTION),
        Some(question) => repl::ask(&pipeline, question.trim(), format, &mut stdout).await?,
        None => {
            let stdin = BufReader::new(tokio::io::stdin());
            repl::run_repl(&pipeline, format, stdin, &mut stdout).await?;
        }
    }
    Ok(())
}
