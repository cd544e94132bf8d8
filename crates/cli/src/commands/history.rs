//! History command handler.

use clap::{Args, Subcommand};
use sumika_chat::ConversationStore;
use sumika_core::{config::AppConfig, AppResult};

/// Inspect, export or clear conversation history
#[derive(Args, Debug)]
pub struct HistoryCommand {
    #[command(subcommand)]
    action: HistoryAction,
}

#[derive(Subcommand, Debug)]
enum HistoryAction {
    /// Show a session's turns
    Show {
        /// Session id
        #[arg(short, long, default_value = "default")]
        session: String,
    },

    /// Export a session as CSV to stdout
    Export {
        /// Session id
        #[arg(short, long, default_value = "default")]
        session: String,
    },

    /// Delete a session's history
    Clear {
        /// Session id
        #[arg(short, long, default_value = "default")]
        session: String,
    },

    /// List sessions with persisted history
    Sessions,
}

impl HistoryCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let store = ConversationStore::new(&config.data_dir);

        match &self.action {
            HistoryAction::Show { session } => {
                let loaded = store.load(session)?;
                if loaded.is_empty() {
                    println!("履歴はありません。");
                    return Ok(());
                }
                for turn in &loaded.turns {
                    println!("[{}]", turn.asked_at.format("%Y-%m-%d %H:%M:%S"));
                    println!("Q: {}", turn.question);
                    println!("A: {}", turn.answer);
                    println!();
                }
                Ok(())
            }
            HistoryAction::Export { session } => {
                let loaded = store.load(session)?;
                println!("session_id,timestamp,question,answer,context_reference");
                for turn in &loaded.turns {
                    let context_json = serde_json::to_string(&turn.context)?;
                    println!(
                        "{},{},{},{},{}",
                        csv_quote(&turn.session_id),
                        csv_quote(&turn.asked_at.to_rfc3339()),
                        csv_quote(&turn.question),
                        csv_quote(&turn.answer),
                        csv_quote(&context_json),
                    );
                }
                Ok(())
            }
            HistoryAction::Clear { session } => {
                store.clear(session)?;
                println!("履歴をクリアしました: {}", session);
                Ok(())
            }
            HistoryAction::Sessions => {
                for id in store.list_sessions()? {
                    println!("{}", id);
                }
                Ok(())
            }
        }
    }
}

/// Quote one CSV field, doubling embedded quotes.
fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
