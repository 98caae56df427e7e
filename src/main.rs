use clap::{Args, Parser, Subcommand};
use stacwalk::{config, output, CreateOptions, Generator};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "stacwalk")]
#[command(about = "Build STAC-style catalogs from directory trees")]
#[command(long_about = "\
Build STAC-style catalogs from directory trees

Your filesystem is the data source. Recognized satellite product folders
(Sentinel-1, Sentinel-2, Landsat Collection 2) become single Items; other
folders are walked recursively and their files become generic Assets.

Source structure and what it becomes:

  data/
  ├── S1A_IW_GRDH_...SAFE/      # Sentinel-1 product → one Item, no recursion
  │   └── manifest.safe
  ├── logs/                     # --collection data/logs → Collection \"logs\"
  │   └── run-2024-05-01.txt    #     asset inside it
  ├── scene.tif                 # raster → Item in the generic collection
  └── notes.md                  # plain file → Asset in the generic collection

Boundaries are forced with --collection/--item (literal paths or globs,
recursive ** supported); --ignore excludes subtrees entirely. Everything
outside a boundary lands in a shared \"Files\" collection, attached only
when non-empty.

Asset locations are rewritten to <prefix>/<path relative to source> and a
self-contained descriptor tree (catalog.json, collection.json, item JSON)
is written under the destination.

Run 'stacwalk gen-config' for a documented catalog.toml build profile.")]
#[command(version = version_string())]
struct Cli {
    /// Source directory to catalog
    #[arg(long, default_value = "data", global = true)]
    source: PathBuf,

    /// Build profile TOML (flags override its values)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Flags shared by commands that run a build.
#[derive(Args, Clone)]
struct BuildArgs {
    /// Catalog identifier
    #[arg(long)]
    name: Option<String>,

    /// Catalog description
    #[arg(long)]
    description: Option<String>,

    /// Force a collection boundary (repeatable; literal path or glob)
    #[arg(long = "collection", value_name = "SPEC")]
    collections: Vec<String>,

    /// Force an item boundary (repeatable; literal path or glob)
    #[arg(long = "item", value_name = "SPEC")]
    items: Vec<String>,

    /// Exclude a subtree (repeatable; literal path or glob)
    #[arg(long = "ignore", value_name = "SPEC")]
    ignore: Vec<String>,

    /// Public prefix for rewritten asset hrefs
    #[arg(long)]
    asset_prefix: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Build the catalog and write the descriptor tree
    Build {
        #[command(flatten)]
        args: BuildArgs,

        /// Destination directory (default: stac_<name, lowercased>)
        #[arg(long)]
        dest: Option<PathBuf>,
    },
    /// Build in memory and print the structure without writing anything
    Check {
        #[command(flatten)]
        args: BuildArgs,
    },
    /// Print a stock catalog.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let profile = match &cli.config {
        Some(path) => config::load_profile(path)?,
        None => config::BuildProfile::default(),
    };

    match cli.command {
        Command::Build { args, dest } => {
            let opts = merge_options(&cli.source, args, &profile);
            let dest = dest.or_else(|| profile.destination.clone());

            let mut generator = Generator::new();
            generator.create(opts)?;
            let written = generator.save(dest.as_deref(), None)?;

            if let Some(catalog) = generator.catalog() {
                output::print_catalog_output(catalog);
            }
            output::print_diagnostics(generator.diagnostics());
            println!("Saved to {}", written.display());
        }
        Command::Check { args } => {
            let opts = merge_options(&cli.source, args, &profile);
            let mut generator = Generator::new();
            generator.create(opts)?;

            if let Some(catalog) = generator.catalog() {
                output::print_catalog_output(catalog);
            }
            output::print_diagnostics(generator.diagnostics());
        }
        Command::GenConfig => {
            print!("{}", config::stock_profile_toml());
        }
    }

    Ok(())
}

/// CLI flags win; the profile fills the gaps; spec lists concatenate with
/// CLI entries first.
fn merge_options(source: &Path, args: BuildArgs, profile: &config::BuildProfile) -> CreateOptions {
    let name = args
        .name
        .or_else(|| profile.name.clone())
        .unwrap_or_else(|| "Catalog".to_string());

    let mut opts = CreateOptions::new(source, name);
    opts.description = args.description.or_else(|| profile.description.clone());
    opts.collection_specs = [args.collections, profile.collections.clone()].concat();
    opts.item_specs = [args.items, profile.items.clone()].concat();
    opts.ignore_specs = [args.ignore, profile.ignore.clone()].concat();
    if let Some(prefix) = args.asset_prefix.or_else(|| profile.asset_prefix.clone()) {
        opts.asset_prefix = prefix;
    }
    opts
}
