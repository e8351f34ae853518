//! Pull the remote closet into the local cache.

use clap::Args;

use cloakroom_core::{sync_closet, SyncReport};

use super::OutputFormat;
use crate::context::AppContext;

/// Sync the closet with the catalog service
#[derive(Args)]
pub struct SyncCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl SyncCommand {
    pub async fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        let owner_id = ctx.owner_id().await?;
        let mut closet = ctx.repo.load(owner_id).await?;

        if matches!(self.format, OutputFormat::Text) {
            println!("Syncing closet for owner #{}...", owner_id);
            println!();
        }

        let report = sync_closet(&ctx.session, &mut closet, owner_id).await?;
        if report.changed() {
            ctx.repo.save(&closet).await?;
        }

        match self.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "owner_id": owner_id,
                        "inserted": report.inserted,
                        "updated": report.updated,
                        "unchanged": report.unchanged,
                        "cached": report.items.len(),
                    }))?
                );
            }
            OutputFormat::Text => print_report(&report),
        }

        Ok(())
    }
}

fn print_report(report: &SyncReport) {
    println!("  ✓ {} new", report.inserted);
    println!("  ✓ {} updated", report.updated);
    println!("  ✓ {} unchanged", report.unchanged);
    println!();

    if report.changed() {
        println!("Sync complete. {} item(s) cached.", report.items.len());
    } else {
        println!("Already up to date. {} item(s) cached.", report.items.len());
    }
}
