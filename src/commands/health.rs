use clap::Args;

use cloakroom_core::{ApiError, ErrorKind};

use crate::context::AppContext;

/// Check that the catalog service is reachable and healthy
#[derive(Args)]
pub struct HealthCommand {}

impl HealthCommand {
    pub async fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        let base_url = ctx.session.api().base_url();
        match ctx.session.check_health().await {
            Ok(true) => println!("✓ {} is healthy", base_url),
            Ok(false) => println!("✗ {} reports a degraded status", base_url),
            Err(e) => {
                println!("{}", failure_line(base_url, &e));
                return Err(e.into());
            }
        }
        Ok(())
    }
}

fn failure_line(base_url: &str, error: &ApiError) -> String {
    match error.kind() {
        ErrorKind::Network => format!("✗ {} is unreachable", base_url),
        _ => format!("✗ {} health check failed: {}", base_url, error),
    }
}
