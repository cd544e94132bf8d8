//! Template command handler.

use clap::{Args, Subcommand};
use sumika_core::{config::AppConfig, AppResult};
use sumika_prompt::{list_templates, load_template};

/// List and show prompt templates
#[derive(Args, Debug)]
pub struct TemplateCommand {
    #[command(subcommand)]
    action: TemplateAction,
}

#[derive(Subcommand, Debug)]
enum TemplateAction {
    /// List available templates
    List,

    /// Show one template
    Show {
        /// Template name
        name: String,
    },
}

impl TemplateCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.action {
            TemplateAction::List => {
                for name in list_templates(&config.data_dir)? {
                    println!("{}", name);
                }
                Ok(())
            }
            TemplateAction::Show { name } => {
                let template = load_template(&config.data_dir, name)?;
                println!("name: {}", template.name);
                if let Some(ref description) = template.description {
                    println!("description: {}", description);
                }
                println!("\n--- system ---\n{}", template.system);
                println!("\n--- layout ---\n{}", template.layout);
                Ok(())
            }
        }
    }
}
