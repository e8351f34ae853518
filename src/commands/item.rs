use clap::{Args, Subcommand};
use std::path::PathBuf;

use cloakroom_core::{add_angle_photos, rename_item, upload_new_item, Category, ImageFile, ItemId};

use super::OutputFormat;
use crate::context::AppContext;

#[derive(Args)]
pub struct ItemCommand {
    #[command(subcommand)]
    pub command: ItemSubcommand,
}

#[derive(Subcommand)]
pub enum ItemSubcommand {
    /// List cached items, newest first
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Only show one category (top, bottom, outerwear, shoes, accessory)
        #[arg(long)]
        category: Option<Category>,
    },

    /// Show an item with its angle photos
    Show {
        /// Item ID
        id: ItemId,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Upload a photo as a new item
    Upload {
        /// Image file
        path: PathBuf,

        /// Item name
        #[arg(long)]
        name: Option<String>,
    },

    /// Attach more photos of an existing item
    AddPhotos {
        /// Item ID
        id: ItemId,

        /// Image files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Angle label for the new photos (e.g. back, side)
        #[arg(long)]
        angle: Option<String>,
    },

    /// Rename an item
    Rename {
        /// Item ID
        id: ItemId,

        /// New name
        name: String,
    },
}

impl ItemCommand {
    pub async fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ItemSubcommand::List { format, category } => {
                let closet = ctx.cached_closet().await?;
                let items = match category {
                    Some(category) => closet.by_category(*category),
                    None => closet.ordered(),
                };

                if items.is_empty() {
                    println!("No items found");
                    if closet.is_empty() {
                        println!("Run 'cloakroom sync' to fetch your closet.");
                    }
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        let items: Vec<_> = items.iter().map(|i| ctx.with_asset_urls(i)).collect();
                        println!("{}", serde_json::to_string_pretty(&items)?);
                    }
                    OutputFormat::Text => {
                        println!(
                            "{:<8}  {:<10}  {:<30}  {:<16}  PHOTOS",
                            "ID", "CATEGORY", "NAME", "ADDED"
                        );
                        println!("{}", "-".repeat(80));
                        for item in &items {
                            let name = truncate(&item.display_name(), 30);
                            println!(
                                "{:<8}  {:<10}  {:<30}  {:<16}  {}",
                                item.id,
                                item.category,
                                name,
                                item.created_at.format("%Y-%m-%d %H:%M"),
                                item.photos.len()
                            );
                        }
                        println!("\nTotal: {} item(s)", items.len());
                    }
                }
                Ok(())
            }

            ItemSubcommand::Show { id, format } => {
                let cached = match ctx.session.identity().cached_owner_id()? {
                    Some(owner_id) => ctx.repo.get_by_id(owner_id, *id).await?,
                    None => None,
                };
                let item = match cached {
                    Some(item) => ctx.with_asset_urls(&item),
                    None => return Err(format!("Item not found: {}", id).into()),
                };

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&item)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", item);
                    }
                }
                Ok(())
            }

            ItemSubcommand::Upload { path, name } => {
                let image = ImageFile::from_path(path)?;
                let owner_id = ctx.owner_id().await?;
                let mut closet = ctx.repo.load(owner_id).await?;

                let item =
                    upload_new_item(&ctx.session, &mut closet, owner_id, image, name.as_deref())
                        .await?;
                ctx.repo.save_item(&item).await?;

                println!("Uploaded item:");
                println!("{}", ctx.with_asset_urls(&item));
                Ok(())
            }

            ItemSubcommand::AddPhotos { id, paths, angle } => {
                let images = paths
                    .iter()
                    .map(|path| ImageFile::from_path(path))
                    .collect::<Result<Vec<_>, _>>()?;
                let owner_id = ctx.owner_id().await?;
                let mut closet = ctx.repo.load(owner_id).await?;

                let item =
                    add_angle_photos(&ctx.session, &mut closet, *id, images, angle.as_deref())
                        .await?;
                ctx.repo.save_item(&item).await?;

                println!("✓ Added {} photo(s) to item #{}", paths.len(), item.id);
                println!("{}", ctx.with_asset_urls(&item));
                Ok(())
            }

            ItemSubcommand::Rename { id, name } => {
                let owner_id = ctx.owner_id().await?;
                let mut closet = ctx.repo.load(owner_id).await?;

                let item = rename_item(&ctx.session, &mut closet, *id, name).await?;
                ctx.repo.save_item(&item).await?;

                println!("✓ Renamed item #{} to '{}'", item.id, item.display_name());
                Ok(())
            }
        }
    }
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() > max {
        let head: String = value.chars().take(max - 3).collect();
        format!("{}...", head)
    } else {
        value.to_string()
    }
}
