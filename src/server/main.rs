use prk_todo::adapters::HttpServer;
use prk_todo::config::Config;
use prk_todo::storage::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(feature = "tracing")]
    {
        tracing_subscriber::fmt()
            .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
            .init();
    }

    let config = Config::from_env()?;
    let database = Database::connect(&config.database).await?;
    let http_server = HttpServer::new(database.clone(), config.http).await?;
    let served = http_server.run().await;
    database.close().await;
    served
}
