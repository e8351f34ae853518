mod config_cmd;
mod health;
mod identity;
mod item;
mod sync_cmd;
mod tryon;

use clap::ValueEnum;

pub use config_cmd::ConfigCommand;
pub use health::HealthCommand;
pub use identity::IdentityCommand;
pub use item::ItemCommand;
pub use sync_cmd::SyncCommand;
pub use tryon::TryOnCommand;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
