use clap::{Args, Subcommand};

use crate::context::AppContext;

#[derive(Args)]
pub struct IdentityCommand {
    #[command(subcommand)]
    pub command: IdentitySubcommand,
}

#[derive(Subcommand)]
pub enum IdentitySubcommand {
    /// Show the owner identity of this installation, creating it if needed
    Show,

    /// Forget the owner identity; the next command creates or recovers one
    Reset {
        /// Also drop the local closet cache
        #[arg(long)]
        purge_cache: bool,
    },
}

impl IdentityCommand {
    pub async fn run(&self, ctx: &mut AppContext) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            IdentitySubcommand::Show => {
                let owner_id = ctx.owner_id().await?;
                let identity = ctx.session.identity();

                println!("Owner ID: {}", owner_id);
                if let Some(email) = identity.cached_email()? {
                    println!("Email:    {}", email);
                }
                println!("Service:  {}", ctx.session.api().base_url());
                Ok(())
            }

            IdentitySubcommand::Reset { purge_cache } => {
                ctx.session.clear_owner_session()?;
                println!("✓ Owner identity cleared");

                if *purge_cache {
                    let removed = ctx.repo.clear().await?;
                    println!("✓ Removed {} cached item(s)", removed);
                }
                Ok(())
            }
        }
    }
}
