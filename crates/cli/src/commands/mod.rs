//! Command handlers for the sumika CLI.

pub mod ask;
pub mod history;
pub mod property;
pub mod stats;
pub mod template;

pub use ask::AskCommand;
pub use history::HistoryCommand;
pub use property::PropertyCommand;
pub use stats::StatsCommand;
pub use template::TemplateCommand;
