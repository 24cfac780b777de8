use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use traitstack::{
    Blueprint, Catalog, GenerateConfig, Generator, OutputNaming, RasterSize, RawItemSelection,
    ResvgRasterizer, Table, TableLayout,
};

#[derive(Parser, Debug)]
#[command(name = "traitstack", version)]
/// Generate a collection of layered images and their metadata from a selection table.
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite every item and write `<base>.png` + `<base>.json` pairs.
    Generate(GenerateArgs),
    /// Resolve every item and report problems without rendering anything.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// CSV file with one trait combination per row.
    #[arg(long, default_value = "collection.csv")]
    csv: PathBuf,

    /// JSON description of traits.
    #[arg(long, default_value = "traits.json")]
    traits: PathBuf,

    /// Directory layer paths of the traits file are relative to.
    #[arg(long, default_value = ".")]
    assets_root: PathBuf,

    /// Header of the item name column; trait columns start after it.
    #[arg(long, default_value = "name")]
    name_column: String,

    /// Header of the column closing the trait columns.
    #[arg(long, default_value = "attribute_number")]
    last_column: String,
}

impl InputArgs {
    fn load(&self) -> anyhow::Result<(Catalog, Vec<RawItemSelection>)> {
        let layout = TableLayout {
            name_column: self.name_column.clone(),
            last_column: self.last_column.clone(),
        };
        let items = Table::from_path(&self.csv)?.raw_items(&layout)?;
        let catalog = Catalog::from_path(&self.traits)?;
        Ok((catalog, items))
    }
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    input: InputArgs,

    /// JSON template of the metadata files.
    #[arg(long, default_value = "blueprint.json")]
    blueprint: PathBuf,

    /// Output directory.
    #[arg(long, default_value = "out")]
    out: PathBuf,

    /// Width of an SVG layer used as the first (background) layer.
    #[arg(long, default_value_t = 1080)]
    svg_width: u32,

    /// Height of an SVG layer used as the first (background) layer.
    #[arg(long, default_value_t = 1080)]
    svg_height: u32,

    /// Name output files after the item name instead of its row number.
    #[arg(long)]
    use_names: bool,

    /// Add an `attribute-number` entry to the metadata attributes.
    #[arg(long)]
    attribute_number: bool,

    /// Worker threads (defaults to the number of CPUs).
    #[arg(long)]
    threads: Option<usize>,

    /// Only generate the item at this row (1-based).
    item: Option<usize>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[command(flatten)]
    input: InputArgs,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let (catalog, items) = args.input.load()?;
    let blueprint = Blueprint::from_path(&args.blueprint)?;

    let config = GenerateConfig {
        out_dir: args.out.clone(),
        assets_root: args.input.assets_root.clone(),
        default_vector_size: RasterSize::new(args.svg_width, args.svg_height)?,
        include_attribute_number: args.attribute_number,
        naming: if args.use_names {
            OutputNaming::Name
        } else {
            OutputNaming::Index
        },
        only_item: args.item,
        threads: args.threads,
    };
    let generator = Generator::new(
        config,
        catalog,
        blueprint,
        Box::new(ResvgRasterizer::new()),
    )?;
    let report = generator.generate(&items)?;

    eprintln!(
        "generated {} of {} items into {} ({} excluded, {} failed)",
        report.generated_count(),
        report.requested,
        args.out.display(),
        report.excluded.len(),
        report.failures.len()
    );
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let (catalog, items) = args.input.load()?;
    let report = traitstack::check(&catalog, &items, &args.input.assets_root);

    for conflict in &report.excluded {
        eprintln!("excluded: {conflict}");
    }
    for (category, variant) in &report.unknown {
        eprintln!("unknown selection: {category}={variant}");
    }
    for path in &report.missing_assets {
        eprintln!("missing asset: {}", path.display());
    }
    for (index, name) in &report.without_layers {
        eprintln!("no layers: item {index} '{name}'");
    }
    eprintln!(
        "{} of {} items renderable",
        report.renderable, report.items
    );

    if !report.is_clean() {
        anyhow::bail!("check found problems");
    }
    Ok(())
}
