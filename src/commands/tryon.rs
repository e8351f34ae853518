use clap::Args;

use cloakroom_core::{submit_try_on, sync_closet, Closet, ItemId, OutfitComposer, Slot};

use super::OutputFormat;
use crate::context::AppContext;

/// Compose an outfit from cached items and render a try-on
#[derive(Args)]
pub struct TryOnCommand {
    /// Item IDs placed by their category
    items: Vec<ItemId>,

    /// Top item ID
    #[arg(long)]
    top: Option<ItemId>,

    /// Bottom item ID
    #[arg(long)]
    bottom: Option<ItemId>,

    /// Shoes item ID
    #[arg(long)]
    shoes: Option<ItemId>,

    /// Accessory item ID
    #[arg(long)]
    accessory: Option<ItemId>,

    /// Sync the closet before composing
    #[arg(long)]
    sync: bool,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl TryOnCommand {
    fn selections(&self) -> [(Slot, Option<ItemId>); 4] {
        [
            (Slot::Top, self.top),
            (Slot::Bottom, self.bottom),
            (Slot::Shoes, self.shoes),
            (Slot::Accessory, self.accessory),
        ]
    }

    pub async fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        let owner_id = ctx.owner_id().await?;
        let mut closet = ctx.repo.load(owner_id).await?;

        if self.sync {
            let report = sync_closet(&ctx.session, &mut closet, owner_id).await?;
            if report.changed() {
                ctx.repo.save(&closet).await?;
            }
        }

        let mut composer = OutfitComposer::from_closet(&closet);
        for id in &self.items {
            composer.select_item(slot_for(&closet, *id)?, *id)?;
        }
        for (slot, id) in self.selections() {
            if let Some(id) = id {
                composer.select_item(slot, id)?;
            }
        }
        let request = composer.build_try_on_request(owner_id)?;

        if matches!(self.format, OutputFormat::Text) {
            println!("Generating try-on...");
            for slot in Slot::ALL {
                if let Some(item) = composer.selected_item(slot) {
                    println!("  {:<10} #{} {}", slot, item.id, item.display_name());
                }
            }
            println!();
        }

        let mut result = submit_try_on(&ctx.session, &request).await?;
        result.generated_image_url = ctx.session.resolve_asset_url(&result.generated_image_url);

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            OutputFormat::Text => {
                println!("✓ Outfit #{} generated", result.outfit_id);
                println!("Image: {}", result.generated_image_url);
                if !result.message.is_empty() {
                    println!("{}", result.message);
                }
            }
        }
        Ok(())
    }
}

fn slot_for(closet: &Closet, id: ItemId) -> Result<Slot, String> {
    let item = closet
        .get(id)
        .ok_or_else(|| format!("Item not found in closet: {}", id))?;
    Slot::from_category(item.category).ok_or_else(|| {
        format!(
            "Item #{} is {}, which cannot be used in a try-on",
            id, item.category
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloakroom_core::ClothingItem;

    fn item(id: i64, category: &str) -> ClothingItem {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "owner_id": 1,
            "processed_url": format!("/static/{}_proc.png", id),
            "category": category,
            "created_at": "2024-01-01T10:00:00",
        }))
        .unwrap()
    }

    #[test]
    fn test_slot_for_follows_item_category() {
        let closet = Closet::from_items([item(1, "top"), item(2, "shoes"), item(3, "accessory")]);

        assert_eq!(slot_for(&closet, 1), Ok(Slot::Top));
        assert_eq!(slot_for(&closet, 2), Ok(Slot::Shoes));
        assert_eq!(slot_for(&closet, 3), Ok(Slot::Accessory));
    }

    #[test]
    fn test_slot_for_rejects_outerwear_and_unknown_items() {
        let closet = Closet::from_items([item(5, "outerwear")]);

        let err = slot_for(&closet, 5).unwrap_err();
        assert!(err.contains("outerwear"));
        assert_eq!(
            slot_for(&closet, 42).unwrap_err(),
            "Item not found in closet: 42"
        );
    }
}
