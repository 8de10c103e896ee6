use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use filmshelf_lib::catalog::category::Category;
use filmshelf_lib::catalog::drive::Drive;
use filmshelf_lib::catalog::filter::{filter_movies, ExternalIdFilter, NameFilter};
use filmshelf_lib::catalog::registry::{database_path, DriveRegistry};
use filmshelf_lib::catalog::Catalog;
use slog::Logger;
use sloggers::terminal::TerminalLoggerBuilder;
use sloggers::Build;

/// Movie catalogs for removable drives
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding the drive registry and the cache databases
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the registered drives and whether they are connected
    Drives,
    /// Register a drive by label and mount path
    AddDrive { label: String, path: PathBuf },
    /// Change a drive's label or mount path
    EditDrive {
        drive: String,
        label: String,
        path: PathBuf,
    },
    /// Unregister a drive and purge its cached catalog
    RemoveDrive { drive: String },
    /// List a drive's categories
    Categories { drive: String },
    /// Add a category folder to a drive's index
    AddCategory {
        drive: String,
        name: String,
        path: String,
    },
    /// List the movies in a category
    Movies {
        drive: String,
        category: String,
        /// Only movies whose name contains this fragment
        #[arg(long)]
        name: Option<String>,
        /// Only movies that carry an external metadata id
        #[arg(long)]
        tagged: bool,
    },
    /// Rate a movie from 1 to 10
    Rate {
        drive: String,
        category: String,
        movie: String,
        rating: i64,
    },
    /// Delete every record kept for a drive, on the drive and in the cache
    Clean { drive: String },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let logger = TerminalLoggerBuilder::new().build()?;

    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => ProjectDirs::from("", "", "filmshelf")
            .context("could not determine a data directory")?
            .data_dir()
            .to_path_buf(),
    };
    let databases_dir = data_dir.join("databases");
    fs::create_dir_all(&databases_dir)?;
    let mut registry = DriveRegistry::load(data_dir.join("drives.json"), &logger)?;

    match args.command {
        Command::Drives => {
            for drive in registry.drives() {
                let state = if drive.is_connected() {
                    "connected"
                } else {
                    "disconnected"
                };
                println!(
                    "{}  {}  {}  ({})",
                    drive.uuid(),
                    drive.label,
                    drive.path.display(),
                    state
                );
            }
        }
        Command::AddDrive { label, path } => {
            let drive = Drive::new(label, path);
            let uuid = drive.uuid();
            registry.add(drive)?;
            println!("{uuid}");
        }
        Command::EditDrive { drive, label, path } => {
            let uuid = resolve_drive(&registry, &drive)?.uuid();
            registry.edit(uuid, &label, &path)?;
        }
        Command::RemoveDrive { drive } => {
            let uuid = resolve_drive(&registry, &drive)?.uuid();
            let removed = registry.remove(uuid, &databases_dir)?;
            println!("removed {}", removed.label);
        }
        Command::Categories { drive } => {
            let mut catalog = open_catalog(&registry, &drive, &databases_dir, &logger)?;
            for category in catalog.categories() {
                println!("{}  {}", category.name, category.path);
            }
        }
        Command::AddCategory { drive, name, path } => {
            let mut catalog = open_catalog(&registry, &drive, &databases_dir, &logger)?;
            let mut categories = catalog.categories();
            if categories.iter().any(|c| c.path == path) {
                return Err(anyhow!("a category already uses the path {path}"));
            }
            categories.push(Category::new(name, path));
            catalog.save_categories(&categories);
        }
        Command::Movies {
            drive,
            category,
            name,
            tagged,
        } => {
            let mut catalog = open_catalog(&registry, &drive, &databases_dir, &logger)?;
            let categories = catalog.categories();
            let category = categories
                .iter()
                .find(|c| c.name == category || c.path == category)
                .ok_or_else(|| anyhow!("no category named {category}"))?;

            let mut movies = catalog.movies(category);
            if let Some(fragment) = name {
                movies = filter_movies(movies, &NameFilter(fragment), true);
            }
            if tagged {
                movies = filter_movies(movies, &ExternalIdFilter, true);
            }
            for movie in movies {
                let info = &movie.info;
                println!(
                    "{}  [{}]  rating {}/10  {}",
                    movie.name(),
                    if info.year.is_empty() { "----" } else { info.year.as_str() },
                    info.rating(),
                    info.title
                );
            }
        }
        Command::Rate {
            drive,
            category,
            movie,
            rating,
        } => {
            let mut catalog = open_catalog(&registry, &drive, &databases_dir, &logger)?;
            let categories = catalog.categories();
            let category = categories
                .iter()
                .find(|c| c.name == category || c.path == category)
                .ok_or_else(|| anyhow!("no category named {category}"))?;
            let mut movies = catalog.movies(category);
            let target = movies
                .iter_mut()
                .find(|m| m.name() == movie || m.relative_path() == movie)
                .ok_or_else(|| anyhow!("no movie named {movie}"))?;
            target.info.set_rating(rating);
            if target.info.rating() as i64 != rating {
                return Err(anyhow!("rating must be between 1 and 10"));
            }
            catalog.save_movie(category, target);
        }
        Command::Clean { drive } => {
            let mut catalog = open_catalog(&registry, &drive, &databases_dir, &logger)?;
            catalog.clean_all();
            println!("cleaned {}", catalog.drive().label);
        }
    }

    Ok(())
}

fn resolve_drive(registry: &DriveRegistry, key: &str) -> Result<Drive> {
    registry
        .resolve(key)
        .cloned()
        .ok_or_else(|| anyhow!("no drive registered as {key}"))
}

fn open_catalog(
    registry: &DriveRegistry,
    key: &str,
    databases_dir: &std::path::Path,
    logger: &Logger,
) -> Result<Catalog> {
    let drive = resolve_drive(registry, key)?;
    let cache_db = database_path(databases_dir, &drive);
    Ok(Catalog::open(drive, &cache_db, logger)?)
}
