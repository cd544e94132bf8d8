//! Stats command handler.

use clap::Args;
use std::time::Duration;
use sumika_core::{config::AppConfig, AppResult};
use sumika_search::{create_search_client, DocumentSearch};

/// Show document index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let api_key = AppConfig::resolve_key(&config.search.api_key_env);
        let search = create_search_client(
            &config.search,
            api_key.as_deref(),
            Duration::from_secs(config.retrieval.timeout_secs),
        )?;

        let stats = search.describe().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!("総レコード数: {}", stats.total_records);
            for (namespace, count) in &stats.namespaces {
                println!("  {}: {}", namespace, count);
            }
        }

        Ok(())
    }
}
