//! Catalog commands: publish, list, show, update, delete

use super::{format_price, require_item};
use anyhow::{Context, Result};
use librio_core::{
    AppContext, CatalogStore, Draft, Item, ItemId, ItemPatch, ItemStatus, SortOrder,
};
use rust_decimal::Decimal;

/// Publish form fields as given on the command line
pub struct DraftArgs {
    pub title: String,
    pub author: String,
    pub price: Decimal,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub seller: Option<String>,
}

impl From<DraftArgs> for Draft {
    fn from(args: DraftArgs) -> Self {
        Draft {
            title: args.title,
            author: args.author,
            price: args.price,
            publisher: args.publisher,
            year: args.year,
            genre: args.genre,
            description: args.description,
            image: args.image,
            seller: args.seller,
        }
    }
}

/// Update fields as given on the command line
pub struct PatchArgs {
    pub title: Option<String>,
    pub author: Option<String>,
    pub price: Option<Decimal>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub status: Option<String>,
}

impl TryFrom<PatchArgs> for ItemPatch {
    type Error = anyhow::Error;

    fn try_from(args: PatchArgs) -> Result<Self> {
        let status = args
            .status
            .map(|s| s.parse::<ItemStatus>().map_err(anyhow::Error::msg))
            .transpose()?;
        Ok(ItemPatch {
            title: args.title,
            author: args.author,
            publisher: args.publisher,
            year: args.year,
            genre: args.genre,
            description: args.description,
            price: args.price,
            image: args.image,
            status,
        })
    }
}

fn print_item(item: &Item, currency: &str) {
    println!("Id:          {}", item.id);
    println!("Title:       {}", item.title);
    println!("Author:      {}", item.author);
    println!("Publisher:   {}", item.publisher);
    println!("Year:        {}", item.year);
    println!("Genre:       {}", item.genre);
    println!("Price:       {}", format_price(item.price, currency));
    println!("Status:      {}", item.status.as_str());
    println!("Seller:      {}", item.seller);
    println!("Published:   {}", item.published_at.format("%Y-%m-%d %H:%M"));
    if let Some(updated) = item.updated_at {
        println!("Updated:     {}", updated.format("%Y-%m-%d %H:%M"));
    }
    println!("Description: {}", item.description);
}

/// Publish a book
pub async fn publish(ctx: &AppContext, args: DraftArgs, json: bool) -> Result<()> {
    let item = ctx
        .publish(Draft::from(args))
        .await
        .context("Failed to publish book")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        println!("Published {} ({})", item.title, item.id);
    }
    Ok(())
}

/// List books, optionally filtered and sorted
pub async fn list(
    store: &CatalogStore,
    sort: Option<&str>,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    let order = match sort {
        Some(s) => s
            .parse::<SortOrder>()
            .map_err(|_| anyhow::anyhow!("Unknown sort order: {}", s))?,
        None => store.preferences().await.gallery_sort,
    };

    let mut items = store.list_items().await.context("Failed to load books")?;
    if let Some(query) = search {
        items.retain(|item| item.matches(query));
    }
    order.sort(&mut items);

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No books found");
        return Ok(());
    }
    let currency = store.preferences().await.currency;
    for item in &items {
        println!(
            "{}  {} by {}  {}",
            item.id,
            item.title,
            item.author,
            format_price(item.price, &currency)
        );
    }
    Ok(())
}

/// Show one book
pub async fn show(store: &CatalogStore, id: &str, json: bool) -> Result<()> {
    let item = require_item(store, id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        print_item(&item, &store.preferences().await.currency);
    }
    Ok(())
}

/// Update fields of a book
pub async fn update(store: &CatalogStore, id: &str, args: PatchArgs, json: bool) -> Result<()> {
    let patch = ItemPatch::try_from(args)?;
    if patch.is_empty() {
        anyhow::bail!("Nothing to update");
    }

    let item = store
        .update_item(&ItemId::new(id), patch)
        .await
        .context("Failed to update book")?
        .ok_or_else(|| anyhow::anyhow!("No book with id {}", id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        println!("Updated {} ({})", item.title, item.id);
    }
    Ok(())
}

/// Delete a book
pub async fn delete(store: &CatalogStore, id: &str) -> Result<()> {
    let removed = store
        .delete_item(&ItemId::new(id))
        .await
        .context("Failed to delete book")?;
    if removed {
        println!("Deleted {}", id);
    } else {
        tracing::warn!("No book with id {}", id);
        println!("Nothing to delete");
    }
    Ok(())
}
