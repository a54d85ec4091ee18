//! Stocktrack CLI - data entry and review for the daily stock ledger

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use stocktrack::config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "stocktrack")]
#[command(version)]
#[command(about = "Daily stock tracking - item catalog, usage ledger and price history")]
#[command(long_about = r#"
Stocktrack keeps a catalog of stock items and a dated ledger of stock movements:
  • Register items with a unit of measure and a category
  • Log opening stock, shipments, closing stock, waste and voids per day
  • Review a day's log with the derived used quantity
  • Track purchase prices from priced shipments

Example usage:
  stocktrack init
  stocktrack add-item --name Salmon --unit kg --category ikan
  stocktrack log --item Salmon --opening 10 --shipment 5 --closing 8 --waste 1 --price 50
  stocktrack view --date 2024-01-01
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputMode::Text)]
    format: OutputMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the config file, create the database and seed default units and categories
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// List units of measure
    Units,

    /// List item categories
    Categories,

    /// Add a unit of measure
    AddUnit {
        /// Unit name
        name: String,
    },

    /// Add an item category
    AddCategory {
        /// Category name
        name: String,
    },

    /// List items, optionally filtered by a name search
    Items {
        /// Case-insensitive substring of the item name
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Add a stock item
    AddItem {
        /// Item name (unique, case-insensitive)
        #[arg(short, long)]
        name: String,

        /// Unit of measure name
        #[arg(short, long)]
        unit: String,

        /// Category name
        #[arg(long)]
        category: String,

        /// The item is not counted every day
        #[arg(long)]
        not_daily: bool,

        /// Create the unit or category when it does not exist yet
        #[arg(long)]
        create_lookups: bool,
    },

    /// Edit an item; omitted fields keep their current value
    EditItem {
        /// Item id
        #[arg(long)]
        id: i64,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New unit name
        #[arg(short, long)]
        unit: Option<String>,

        /// New category name
        #[arg(long)]
        category: Option<String>,

        /// Whether the item is counted every day
        #[arg(long)]
        daily: Option<bool>,
    },

    /// Delete an item that has no ledger history
    DeleteItem {
        /// Item id
        #[arg(long)]
        id: i64,
    },

    /// Log one day of stock movement for an item
    Log {
        /// Item name
        #[arg(short, long)]
        item: String,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        #[arg(long, default_value = "0")]
        opening: f64,

        #[arg(long, default_value = "0")]
        shipment: f64,

        #[arg(long, default_value = "0")]
        closing: f64,

        #[arg(long, default_value = "0")]
        waste: f64,

        #[arg(long)]
        waste_reason: Option<String>,

        #[arg(long = "void", default_value = "0")]
        void_qty: f64,

        #[arg(long)]
        void_reason: Option<String>,

        /// Price per unit of the shipment
        #[arg(short, long)]
        price: Option<f64>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Show logged stock for a date or an inclusive date range
    View {
        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// End of the range (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Show the purchase price history of an item
    Prices {
        /// Item name
        #[arg(short, long)]
        item: String,
    },

    /// Show row counts
    Stats,
}

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    pub fn is_human(self) -> bool {
        self == OutputMode::Text
    }
}

/// Print a machine-readable success document
pub fn emit_success(output_mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    if output_mode == OutputMode::Json {
        let doc = serde_json::json!({
            "ok": true,
            "command": command,
            "data": data,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = cli.format;
    if let Err(e) = run(cli) {
        if output_mode.is_human() {
            stocktrack::ui::error(&format!("{:#}", e));
        } else {
            let doc = serde_json::json!({ "ok": false, "error": format!("{:#}", e) });
            println!("{}", doc);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let output_mode = cli.format;
    let loaded = config::load_config(cli.config.as_deref())?;
    let settings = loaded.clone().unwrap_or_default();
    let database = cli.database.clone().unwrap_or_else(|| settings.database_path());

    // Only init runs without an open database
    let open = || commands::open_database(&database);

    match cli.command {
        Commands::Init { force } => {
            let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
            commands::run_init(output_mode, &config_path, loaded, &database, force)
        }
        Commands::Units => commands::run_units(&open()?, output_mode),
        Commands::Categories => commands::run_categories(&open()?, output_mode),
        Commands::AddUnit { name } => commands::run_add_unit(&open()?, output_mode, &name),
        Commands::AddCategory { name } => commands::run_add_category(&open()?, output_mode, &name),
        Commands::Items { search } => commands::run_items(&open()?, output_mode, search.as_deref()),
        Commands::AddItem { name, unit, category, not_daily, create_lookups } => commands::run_add_item(
            &open()?,
            output_mode,
            commands::ItemArgs { name, unit, category, daily: !not_daily, create_lookups },
        ),
        Commands::EditItem { id, name, unit, category, daily } => {
            commands::run_edit_item(&open()?, output_mode, id, name, unit, category, daily)
        }
        Commands::DeleteItem { id } => commands::run_delete_item(&open()?, output_mode, id),
        Commands::Log {
            item,
            date,
            opening,
            shipment,
            closing,
            waste,
            waste_reason,
            void_qty,
            void_reason,
            price,
            notes,
        } => commands::run_log(
            &open()?,
            output_mode,
            commands::LogArgs {
                item,
                date,
                opening,
                shipment,
                closing,
                waste,
                waste_reason,
                void_qty,
                void_reason,
                price,
                notes,
            },
        ),
        Commands::View { date, to } => commands::run_view(&open()?, output_mode, date.as_deref(), to.as_deref()),
        Commands::Prices { item } => commands::run_prices(&open()?, output_mode, &item),
        Commands::Stats => commands::run_stats(&open()?, output_mode, &database),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocktrack::{CatalogStore, Database};
    use tempfile::TempDir;

    fn cli(dir: &TempDir, args: &[&str]) -> Cli {
        let config = dir.path().join("stocktrack.toml");
        let database = dir.path().join("data").join("stock.db");
        let mut argv = vec![
            "stocktrack".to_string(),
            "-c".to_string(),
            config.to_string_lossy().to_string(),
            "-d".to_string(),
            database.to_string_lossy().to_string(),
            "-f".to_string(),
            "json".to_string(),
        ];
        argv.extend(args.iter().map(|a| a.to_string()));
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_every_command_dispatches() {
        let dir = TempDir::new().unwrap();

        run(cli(&dir, &["init"])).unwrap();
        assert!(dir.path().join("stocktrack.toml").exists());

        run(cli(&dir, &["add-unit", "tray"])).unwrap();
        run(cli(&dir, &["add-category", "dessert"])).unwrap();
        run(cli(&dir, &["add-item", "--name", "Mochi", "--unit", "tray", "--category", "dessert"])).unwrap();
        run(cli(&dir, &["log", "--item", "Mochi", "--date", "2024-01-01", "--shipment", "3", "--price", "12"])).unwrap();
        for args in [
            &["units"][..],
            &["categories"],
            &["items"],
            &["view", "--date", "2024-01-01"],
            &["prices", "--item", "mochi"],
            &["stats"],
        ] {
            run(cli(&dir, args)).unwrap();
        }

        let db = Database::open(&dir.path().join("data").join("stock.db")).unwrap();
        let stats = db.stats().unwrap();
        assert_eq!(stats.items, 1);
        assert_eq!(stats.log_entries, 1);
        assert_eq!(stats.price_records, 1);
        assert!(CatalogStore::new(&db).find_unit("TRAY").unwrap().is_some());
    }

    #[test]
    fn test_commands_before_init_open_database() {
        let dir = TempDir::new().unwrap();

        run(cli(&dir, &["units"])).unwrap();

        assert!(dir.path().join("data").join("stock.db").exists());
        assert!(!dir.path().join("stocktrack.toml").exists());
    }
}
