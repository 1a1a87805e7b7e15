#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    sqlchat_cli::try_main().await
}
