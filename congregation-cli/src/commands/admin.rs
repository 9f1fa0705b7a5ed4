//! Content management: statistics entries, gallery images, collections
//!
//! Records are validated before any connection is made.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use congregation_server::db::RecordRepo;
use congregation_server::http::routes::gallery::GALLERY_LIMIT;
use congregation_server::http::routes::stats::STATS_LIMIT;
use congregation_server::models::{CongregationStats, GalleryImage, Schema};
use serde::Serialize;

use super::{require_store, DatabaseArgs};

#[derive(Parser, Debug)]
pub struct StatsArgs {
    #[command(subcommand)]
    pub command: StatsCommands,
}

#[derive(Subcommand, Debug)]
pub enum StatsCommands {
    /// Record a statistics entry
    Add(AddStatsArgs),
    /// Print the entries the API serves
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct AddStatsArgs {
    /// Number of publishers
    #[arg(long, allow_negative_numbers = true)]
    pub publishers: i64,

    /// Number of pioneers
    #[arg(long, allow_negative_numbers = true)]
    pub pioneers: i64,

    /// Name of the youngest publisher
    #[arg(long)]
    pub youngest: String,

    #[arg(long, allow_negative_numbers = true)]
    pub youngest_age: Option<i64>,

    /// Name of the oldest publisher
    #[arg(long)]
    pub oldest: String,

    #[arg(long, allow_negative_numbers = true)]
    pub oldest_age: Option<i64>,

    /// Who entered the figures
    #[arg(long)]
    pub updated_by: Option<String>,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

#[derive(Parser, Debug)]
pub struct GalleryArgs {
    #[command(subcommand)]
    pub command: GalleryCommands,
}

#[derive(Subcommand, Debug)]
pub enum GalleryCommands {
    /// Add an image to the gallery
    Add(AddImageArgs),
    /// Print the images the API serves, in display order
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct AddImageArgs {
    /// Absolute http(s) URL of the image
    #[arg(long)]
    pub url: String,

    #[arg(long)]
    pub caption: Option<String>,

    /// Display position; lower comes first
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub order: i64,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,
}

#[derive(Args, Debug)]
pub struct CollectionsArgs {
    /// Maximum number of names to print
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

impl AddStatsArgs {
    fn record(&self) -> CongregationStats {
        CongregationStats {
            publishers: self.publishers,
            pioneers: self.pioneers,
            youngest_publisher: self.youngest.clone(),
            youngest_age: self.youngest_age,
            oldest_publisher: self.oldest.clone(),
            oldest_age: self.oldest_age,
            updated_by: self.updated_by.clone(),
        }
    }
}

impl AddImageArgs {
    fn record(&self) -> GalleryImage {
        GalleryImage {
            url: self.url.clone(),
            caption: self.caption.clone(),
            order: self.order,
        }
    }
}

pub async fn run_stats(args: StatsArgs) -> Result<()> {
    match args.command {
        StatsCommands::Add(add) => {
            let record = add.record().validated().context("Invalid statistics entry")?;
            insert(&add.db, &record).await
        }
        StatsCommands::List(list) => {
            let records = fetch::<CongregationStats>(&list.db, STATS_LIMIT).await?;
            print_json(&records)
        }
    }
}

pub async fn run_gallery(args: GalleryArgs) -> Result<()> {
    match args.command {
        GalleryCommands::Add(add) => {
            let record = add.record().validated().context("Invalid gallery image")?;
            insert(&add.db, &record).await
        }
        GalleryCommands::List(list) => {
            let mut images = fetch::<GalleryImage>(&list.db, GALLERY_LIMIT).await?;
            GalleryImage::sort_for_display(&mut images);
            print_json(&images)
        }
    }
}

pub async fn run_collections(args: CollectionsArgs) -> Result<()> {
    let settings = args.db.settings(None, None)?;
    let store = require_store(&settings).await?;
    let repo = RecordRepo::new(store.as_ref(), &settings.collections);

    let names = repo
        .collection_names(args.limit)
        .await
        .context("Failed to list collections")?;
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

async fn insert<T: Schema>(db: &DatabaseArgs, record: &T) -> Result<()> {
    let settings = db.settings(None, None)?;
    let store = require_store(&settings).await?;
    let repo = RecordRepo::new(store.as_ref(), &settings.collections);

    let id = repo
        .create(record)
        .await
        .with_context(|| format!("Failed to store {}", T::KIND))?;
    println!("{}", id);
    Ok(())
}

async fn fetch<T: Schema>(db: &DatabaseArgs, limit: usize) -> Result<Vec<T>> {
    let settings = db.settings(None, None)?;
    let store = require_store(&settings).await?;
    let repo = RecordRepo::new(store.as_ref(), &settings.collections);

    repo.list::<T>(limit)
        .await
        .with_context(|| format!("Failed to read {}", T::KIND))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
