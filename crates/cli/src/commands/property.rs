//! Property command handler.
//!
//! Lists and shows records from the property namespace so a session can
//! pin one with `ask --property <id>`.

use clap::{Args, Subcommand};
use std::time::Duration;
use sumika_core::{config::AppConfig, AppError, AppResult};
use sumika_search::{create_search_client, DocumentSearch};

/// List and show property records
#[derive(Args, Debug)]
pub struct PropertyCommand {
    #[command(subcommand)]
    action: PropertyAction,
}

#[derive(Subcommand, Debug)]
enum PropertyAction {
    /// List property records
    List,

    /// Show one property record
    Show {
        /// Property record id
        id: String,
    },
}

impl PropertyCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let api_key = AppConfig::resolve_key(&config.search.api_key_env);
        let search = create_search_client(
            &config.search,
            api_key.as_deref(),
            Duration::from_secs(config.retrieval.timeout_secs),
        )?;

        match &self.action {
            PropertyAction::List => {
                let properties = search.list_properties().await?;
                if properties.is_empty() {
                    println!("物件情報が登録されていません。");
                    return Ok(());
                }
                for property in &properties {
                    println!("{}\t{} - {}", property.id, property.name, property.location);
                }
                Ok(())
            }
            PropertyAction::Show { id } => {
                match search.fetch_property(id).await? {
                    Some(snapshot) => {
                        println!("{}", snapshot.text);
                        Ok(())
                    }
                    None => Err(AppError::Search(format!(
                        "Property record not found: {}",
                        id
                    ))),
                }
            }
        }
    }
}
