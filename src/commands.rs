use crate::{OutputMode, emit_success};
use chrono::NaiveDate;
use std::path::Path;
use stocktrack::config::{self, StockConfig};
use stocktrack::ui::{self, EntryRow, Icons, ItemRow, LookupRow, PriceRow, render_rows};
use stocktrack::{CatalogStore, Database, EntityKind, NewItem, NewStockEntry, StockLedger};

pub struct ItemArgs {
    pub name: String,
    pub unit: String,
    pub category: String,
    pub daily: bool,
    pub create_lookups: bool,
}

pub struct LogArgs {
    pub item: String,
    pub date: Option<String>,
    pub opening: f64,
    pub shipment: f64,
    pub closing: f64,
    pub waste: f64,
    pub waste_reason: Option<String>,
    pub void_qty: f64,
    pub void_reason: Option<String>,
    pub price: Option<f64>,
    pub notes: Option<String>,
}

pub fn open_database(path: &Path) -> anyhow::Result<Database> {
    config::ensure_db_dir(path)?;
    Ok(Database::open(path)?)
}

pub fn run_init(
    output_mode: OutputMode,
    config_path: &Path,
    existing: Option<StockConfig>,
    database: &Path,
    force: bool,
) -> anyhow::Result<()> {
    let settings = match existing {
        Some(settings) if !force => settings,
        _ => {
            let settings = StockConfig {
                database: Some(database.to_string_lossy().to_string()),
                ..StockConfig::with_defaults()
            };
            config::write_config(config_path, &settings, force)?;
            tracing::info!("Wrote config to {}", config_path.display());
            settings
        }
    };

    let db = open_database(database)?;
    let seed_units = settings.seed_units();
    let seed_categories = settings.seed_categories();
    let (units, categories) = db.seed_defaults(seed_units.as_slice(), seed_categories.as_slice())?;

    if output_mode.is_human() {
        ui::header(Icons::GEAR, "Stocktrack initialized");
        ui::status(Icons::DATABASE, "Database", &database.display().to_string());
        ui::summary_row("Config:", &config_path.display().to_string());
        ui::section("Lookup values");
        ui::summary_row("Units added:", &units.to_string());
        ui::summary_row("Categories added:", &categories.to_string());
    } else {
        emit_success(
            output_mode,
            "init",
            serde_json::json!({
                "config": config_path.display().to_string(),
                "database": database.display().to_string(),
                "units_added": units,
                "categories_added": categories,
            }),
        )?;
    }
    Ok(())
}

pub fn run_units(db: &Database, output_mode: OutputMode) -> anyhow::Result<()> {
    let units = CatalogStore::new(db).list_units()?;
    if !output_mode.is_human() {
        return emit_success(output_mode, "units", serde_json::to_value(&units)?);
    }

    if units.is_empty() {
        ui::warn("No units defined. Run `stocktrack init` or `stocktrack add-unit`.");
    } else {
        let rows: Vec<LookupRow> = units.iter().map(LookupRow::from).collect();
        println!("{}", render_rows(&rows));
    }
    Ok(())
}

pub fn run_categories(db: &Database, output_mode: OutputMode) -> anyhow::Result<()> {
    let categories = CatalogStore::new(db).list_categories()?;
    if !output_mode.is_human() {
        return emit_success(output_mode, "categories", serde_json::to_value(&categories)?);
    }

    if categories.is_empty() {
        ui::warn("No categories defined. Run `stocktrack init` or `stocktrack add-category`.");
    } else {
        let rows: Vec<LookupRow> = categories.iter().map(LookupRow::from).collect();
        println!("{}", render_rows(&rows));
    }
    Ok(())
}

pub fn run_add_unit(db: &Database, output_mode: OutputMode, name: &str) -> anyhow::Result<()> {
    let unit_id = CatalogStore::new(db).add_unit(name)?;
    if output_mode.is_human() {
        ui::success(&format!("Added unit {} (id {})", name.trim(), unit_id));
        Ok(())
    } else {
        emit_success(output_mode, "add-unit", serde_json::json!({ "unit_id": unit_id }))
    }
}

pub fn run_add_category(db: &Database, output_mode: OutputMode, name: &str) -> anyhow::Result<()> {
    let category_id = CatalogStore::new(db).add_category(name)?;
    if output_mode.is_human() {
        ui::success(&format!("Added category {} (id {})", name.trim(), category_id));
        Ok(())
    } else {
        emit_success(output_mode, "add-category", serde_json::json!({ "category_id": category_id }))
    }
}

pub fn run_items(db: &Database, output_mode: OutputMode, search: Option<&str>) -> anyhow::Result<()> {
    let catalog = CatalogStore::new(db);
    let items = match search {
        Some(query) => catalog.search_items(query)?,
        None => catalog.list_items()?,
    };

    if !output_mode.is_human() {
        return emit_success(output_mode, "items", serde_json::to_value(&items)?);
    }

    match search {
        Some(query) => ui::header(Icons::SEARCH, &format!("Items matching '{}'", query)),
        None => ui::header(Icons::BOX, &format!("Items ({})", items.len())),
    }
    if items.is_empty() {
        ui::warn("No items found.");
    } else {
        let rows: Vec<ItemRow> = items.iter().map(ItemRow::from).collect();
        println!("{}", render_rows(&rows));
    }
    Ok(())
}

fn unit_id(catalog: &CatalogStore, name: &str, create: bool) -> anyhow::Result<i64> {
    if create {
        return Ok(catalog.resolve_or_create_unit(name)?);
    }
    match catalog.find_unit(name)? {
        Some(unit) => Ok(unit.unit_id),
        None => {
            let known: Vec<String> = catalog.list_units()?.into_iter().map(|u| u.unit_name).collect();
            anyhow::bail!("unknown unit '{}' (known: {})", name, known.join(", "))
        }
    }
}

fn category_id(catalog: &CatalogStore, name: &str, create: bool) -> anyhow::Result<i64> {
    if create {
        return Ok(catalog.resolve_or_create_category(name)?);
    }
    match catalog.find_category(name)? {
        Some(category) => Ok(category.category_id),
        None => {
            let known: Vec<String> = catalog
                .list_categories()?
                .into_iter()
                .map(|c| c.category_name)
                .collect();
            anyhow::bail!("unknown category '{}' (known: {})", name, known.join(", "))
        }
    }
}

pub fn run_add_item(db: &Database, output_mode: OutputMode, args: ItemArgs) -> anyhow::Result<()> {
    let catalog = CatalogStore::new(db);
    let unit = unit_id(&catalog, &args.unit, args.create_lookups)?;
    let category = category_id(&catalog, &args.category, args.create_lookups)?;

    let item_id = catalog.add_item(&NewItem::new(args.name.as_str(), unit, category).daily(args.daily))?;

    if output_mode.is_human() {
        ui::success(&format!("Added {} (id {})", args.name.trim(), item_id));
        Ok(())
    } else {
        emit_success(output_mode, "add-item", serde_json::json!({ "item_id": item_id }))
    }
}

pub fn run_edit_item(
    db: &Database,
    output_mode: OutputMode,
    id: i64,
    name: Option<String>,
    unit: Option<String>,
    category: Option<String>,
    daily: Option<bool>,
) -> anyhow::Result<()> {
    let catalog = CatalogStore::new(db);
    let current = catalog
        .get_item(id)?
        .ok_or(stocktrack::Error::NotFound { kind: EntityKind::Item, id })?;

    let mut edited = NewItem::from(&current);
    if let Some(name) = name {
        edited.name = name;
    }
    if let Some(unit) = unit {
        edited.unit_id = unit_id(&catalog, &unit, false)?;
    }
    if let Some(category) = category {
        edited.category_id = category_id(&catalog, &category, false)?;
    }
    if let Some(daily) = daily {
        edited.is_daily_tracked = daily;
    }

    catalog.update_item(id, &edited)?;
    let updated = catalog.get_item(id)?;

    if !output_mode.is_human() {
        return emit_success(output_mode, "edit-item", serde_json::to_value(&updated)?);
    }

    ui::header(Icons::EDIT, &format!("Updated item {}", id));
    if let Some(item) = updated {
        println!("{}", render_rows(&[ItemRow::from(&item)]));
    }
    Ok(())
}

pub fn run_delete_item(db: &Database, output_mode: OutputMode, id: i64) -> anyhow::Result<()> {
    let deleted = CatalogStore::new(db).delete_item(id)?;

    if !output_mode.is_human() {
        return emit_success(output_mode, "delete-item", serde_json::json!({ "item_id": id, "deleted": deleted }));
    }

    if deleted {
        ui::success(&format!("{} Deleted item {}", Icons::DEL, id));
    } else {
        ui::warn(&format!("No item with id {}; nothing deleted.", id));
    }
    Ok(())
}

fn parse_date(value: Option<&str>) -> anyhow::Result<NaiveDate> {
    match value {
        Some(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map_err(|e| anyhow::anyhow!("invalid date '{}' (expected YYYY-MM-DD): {}", text, e)),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

pub fn run_log(db: &Database, output_mode: OutputMode, args: LogArgs) -> anyhow::Result<()> {
    let date = parse_date(args.date.as_deref())?;
    let catalog = CatalogStore::new(db);
    let Some(item) = catalog.find_item(&args.item)? else {
        anyhow::bail!("unknown item '{}'", args.item);
    };

    let mut entry = NewStockEntry::new(date, item.item_id)
        .opening(args.opening)
        .shipment(args.shipment)
        .closing(args.closing)
        .waste(args.waste, non_blank(args.waste_reason))
        .void(args.void_qty, non_blank(args.void_reason));
    if let Some(price) = args.price {
        entry = entry.price(price);
    }
    if let Some(notes) = non_blank(args.notes) {
        entry = entry.notes(notes);
    }
    entry.validate()?;

    let outcome = StockLedger::new(db).append_entry(&entry)?;

    if !output_mode.is_human() {
        return emit_success(output_mode, "log", serde_json::to_value(outcome)?);
    }

    ui::header(Icons::INBOX, &format!("Logged {} for {}", item.item_name, date));
    ui::success(&format!("Used: {} {}", ui::qty(outcome.used_qty), item.unit_name));
    if outcome.price_id.is_some() {
        if let Some(total) = entry.purchase_total() {
            ui::info(&format!("{} Purchase recorded", Icons::MONEY), &ui::qty(total));
        }
    }
    Ok(())
}

pub fn run_view(db: &Database, output_mode: OutputMode, date: Option<&str>, to: Option<&str>) -> anyhow::Result<()> {
    let from = parse_date(date)?;
    let ledger = StockLedger::new(db);
    let entries = match to {
        Some(to) => ledger.entries_between(from, parse_date(Some(to))?)?,
        None => ledger.entries_for_date(from)?,
    };

    if !output_mode.is_human() {
        return emit_success(output_mode, "view", serde_json::to_value(&entries)?);
    }

    match to {
        Some(to) => ui::header(Icons::CALENDAR, &format!("Logged stock {} to {}", from, to.trim())),
        None => ui::header(Icons::CALENDAR, &format!("Logged stock for {}", from)),
    }
    if entries.is_empty() {
        ui::warn("No records.");
        return Ok(());
    }

    let rows: Vec<EntryRow> = entries.iter().map(EntryRow::from).collect();
    println!("{}", render_rows(&rows));
    let total_used: f64 = entries.iter().map(|e| e.used_qty).sum();
    ui::summary_row("Entries:", &entries.len().to_string());
    ui::summary_row("Total used:", &ui::dim(&stocktrack::output::format_qty(total_used)));
    Ok(())
}

pub fn run_prices(db: &Database, output_mode: OutputMode, item_name: &str) -> anyhow::Result<()> {
    let Some(item) = CatalogStore::new(db).find_item(item_name)? else {
        anyhow::bail!("unknown item '{}'", item_name);
    };
    let prices = StockLedger::new(db).prices_for_item(item.item_id)?;

    if !output_mode.is_human() {
        return emit_success(output_mode, "prices", serde_json::to_value(&prices)?);
    }

    ui::header(Icons::MONEY, &format!("Price history for {} ({})", item.item_name, item.unit_name));
    if prices.is_empty() {
        ui::warn("No priced shipments logged.");
    } else {
        let rows: Vec<PriceRow> = prices.iter().map(PriceRow::from).collect();
        println!("{}", render_rows(&rows));
    }
    Ok(())
}

pub fn run_stats(db: &Database, output_mode: OutputMode, database: &Path) -> anyhow::Result<()> {
    let stats = db.stats()?;

    if !output_mode.is_human() {
        return emit_success(output_mode, "stats", serde_json::to_value(&stats)?);
    }

    ui::header(Icons::STATS, &format!("Stocktrack Statistics ({})", database.display()));
    let units = stats.units.to_string();
    let categories = stats.categories.to_string();
    let items = stats.items.to_string();
    let entries = stats.log_entries.to_string();
    let prices = stats.price_records.to_string();
    println!(
        "{}",
        ui::stats_table(&[
            ("Units", units.as_str()),
            ("Categories", categories.as_str()),
            ("Items", items.as_str()),
            ("Log entries", entries.as_str()),
            ("Price records", prices.as_str()),
        ])
    );
    Ok(())
}
