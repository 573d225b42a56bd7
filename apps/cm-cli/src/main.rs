use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use cm_app::{AppResult, MatrixConfig, MatrixSession, read_image_data_uri};
use cm_core::{FixedColor, GridTarget, UpdateField, WEEKS};
use cm_store::FileStore;
use tracing::info;

#[derive(Parser)]
#[command(name = "cm-cli")]
#[command(about = "Capability matrix - weekly capability grid editor", long_about = None)]
struct Cli {
    /// Path to the YAML config file
    #[arg(short, long, default_value = "capability-matrix.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print fill counts, week labels, update info and the palette
    Show,
    /// Set one cell to a marker id ("none" or "" clears it)
    Set {
        target: Target,
        /// Cell key, "row-week-col" for main cells or "row-col" for chassis
        key: String,
        marker: String,
    },
    /// Set the display label of a week (0-2 digits)
    Week { week: u8, label: String },
    /// Set a field of the "last updated" header
    Info { field: InfoField, text: String },
    /// Manage image markers
    #[command(subcommand)]
    Palette(PaletteCommands),
    /// Attach an image to a legend color, or detach it when no image is given
    ColorImage {
        #[arg(value_parser = parse_color)]
        color: FixedColor,
        image: Option<PathBuf>,
    },
    /// Export the matrix as CSV
    Export {
        /// Output CSV file path (defaults to a dated file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import a CSV file over the current matrix
    Import { path: PathBuf },
    /// Reset everything and delete stored data
    Clear,
}

#[derive(Subcommand)]
enum PaletteCommands {
    /// Add an image marker from a file
    Add { name: String, image: PathBuf },
    /// Remove an image marker and clear the cells using it
    Remove { id: String },
    /// List image markers
    List,
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    Main,
    Chassis,
}

impl From<Target> for GridTarget {
    fn from(target: Target) -> Self {
        match target {
            Target::Main => GridTarget::Main,
            Target::Chassis => GridTarget::Chassis,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum InfoField {
    Date,
    Time,
    EditedBy,
}

impl From<InfoField> for UpdateField {
    fn from(field: InfoField) -> Self {
        match field {
            InfoField::Date => UpdateField::Date,
            InfoField::Time => UpdateField::Time,
            InfoField::EditedBy => UpdateField::EditedBy,
        }
    }
}

fn parse_color(id: &str) -> Result<FixedColor, String> {
    FixedColor::from_id(id).ok_or_else(|| {
        let known: Vec<&str> = FixedColor::ALL[1..].iter().map(|c| c.id()).collect();
        format!("unknown color '{}', expected one of: {}", id, known.join(", "))
    })
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = MatrixConfig::load(&cli.config)?;
    let mut session = config.open_session()?;

    match cli.command {
        Commands::Show => cmd_show(&session),
        Commands::Set {
            target,
            key,
            marker,
        } => cmd_set(&mut session, target.into(), &key, &marker),
        Commands::Week { week, label } => cmd_week(&mut session, week, &label),
        Commands::Info { field, text } => {
            session.set_update_info(field.into(), &text);
            println!("✓ Updated");
            Ok(())
        }
        Commands::Palette(palette_cmd) => match palette_cmd {
            PaletteCommands::Add { name, image } => cmd_palette_add(&mut session, &name, &image),
            PaletteCommands::Remove { id } => cmd_palette_remove(&mut session, &id),
            PaletteCommands::List => cmd_palette_list(&session),
        },
        Commands::ColorImage { color, image } => {
            cmd_color_image(&mut session, color, image.as_deref())
        }
        Commands::Export { output } => cmd_export(&session, output),
        Commands::Import { path } => cmd_import(&mut session, &path),
        Commands::Clear => {
            session.clear_all();
            println!("✓ Matrix cleared");
            Ok(())
        }
    }
}

fn cmd_show(session: &MatrixSession<FileStore>) -> AppResult<()> {
    let store = session.store();

    println!("Capability matrix");
    println!("  Main cells filled:    {}", store.filled_count(GridTarget::Main));
    println!("  Chassis cells filled: {}", store.filled_count(GridTarget::Chassis));

    let labels: Vec<&str> = (1..=WEEKS)
        .map(|week| store.week_label(week).unwrap_or_default())
        .collect();
    println!("  Weeks: {}", labels.join(" "));

    let update = store.update_info();
    println!("\nLast updated:");
    println!("  Date:      {}", update.get(UpdateField::Date));
    println!("  Time:      {}", update.get(UpdateField::Time));
    println!("  Edited by: {}", update.get(UpdateField::EditedBy));

    println!();
    cmd_palette_list(session)
}

fn cmd_set(
    session: &mut MatrixSession<FileStore>,
    target: GridTarget,
    key: &str,
    marker: &str,
) -> AppResult<()> {
    session.set_cell(target, key, marker)?;
    let label = session.resolve_marker(marker).label();
    println!("✓ {} {} = {}", target.name(), key, label);
    Ok(())
}

fn cmd_week(session: &mut MatrixSession<FileStore>, week: u8, label: &str) -> AppResult<()> {
    if session.set_week_label(week, label) {
        println!("✓ Week {} label = '{}'", week, label);
    } else {
        println!(
            "Label ignored: week must be 1-{} and the label at most two digits",
            WEEKS
        );
    }
    Ok(())
}

fn cmd_palette_add(
    session: &mut MatrixSession<FileStore>,
    name: &str,
    image: &Path,
) -> AppResult<()> {
    let uri = read_image_data_uri(image)?;
    let id = session.add_palette_entry(name, &uri);
    println!("✓ Added '{}' as {}", name, id);
    Ok(())
}

fn cmd_palette_remove(session: &mut MatrixSession<FileStore>, id: &str) -> AppResult<()> {
    match session.remove_palette_entry(id) {
        Some(removal) => println!(
            "✓ Removed '{}' ({} main, {} chassis cells cleared)",
            removal.entry.name, removal.cleared_main, removal.cleared_chassis
        ),
        None => println!("No palette entry with id: {}", id),
    }
    Ok(())
}

fn cmd_palette_list(session: &MatrixSession<FileStore>) -> AppResult<()> {
    let palette = session.store().palette();
    if palette.is_empty() {
        println!("Palette is empty");
    } else {
        println!("Palette:");
        for (index, entry) in palette.iter().enumerate() {
            println!("  [{}] {} ({})", index, entry.name, entry.id);
        }
    }
    Ok(())
}

fn cmd_color_image(
    session: &mut MatrixSession<FileStore>,
    color: FixedColor,
    image: Option<&Path>,
) -> AppResult<()> {
    match image {
        Some(path) => {
            let uri = read_image_data_uri(path)?;
            if session.set_color_image(color, &uri) {
                println!("✓ Image set for {}", color.label());
            } else {
                println!("{} cannot carry an image", color.label());
            }
        }
        None => {
            if session.clear_color_image(color) {
                println!("✓ Image cleared for {}", color.label());
            } else {
                println!("{} has no image", color.label());
            }
        }
    }
    Ok(())
}

fn cmd_export(session: &MatrixSession<FileStore>, output: Option<PathBuf>) -> AppResult<()> {
    let path = output.unwrap_or_else(|| PathBuf::from(cm_app::default_export_file_name()));
    let csv = session.export_csv()?;
    std::fs::write(&path, csv)?;
    info!(path = %path.display(), "CSV exported");
    println!("✓ Exported to {}", path.display());
    Ok(())
}

fn cmd_import(session: &mut MatrixSession<FileStore>, path: &Path) -> AppResult<()> {
    let bytes = std::fs::read(path)?;
    match session.import_csv(&bytes) {
        Ok(summary) => {
            println!("✓ Imported {}", path.display());
            println!("  Main cells:    {}", summary.main_cells);
            println!("  Chassis cells: {}", summary.chassis_cells);
            Ok(())
        }
        Err(e) if e.is_import_failure() => {
            eprintln!("Error importing file. Please check the file format.");
            Err(e)
        }
        Err(e) => Err(e),
    }
}
