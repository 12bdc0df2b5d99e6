/// Category and derived filter command handlers
use anyhow::Result;
use herald_core::{Engine, ResolvedFilters};
use herald_storage::FilterMode;
use tabled::{Table, Tabled};

use super::helpers::truncate_str;

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Patterns")]
    patterns: String,
}

pub fn list(engine: &Engine) -> Result<()> {
    let rows: Vec<CategoryRow> = engine
        .categories()
        .load_categories()
        .into_iter()
        .map(|c| CategoryRow {
            id: c.id,
            name: c.display_name,
            mode: c.filter_mode.to_string(),
            patterns: truncate_str(&c.package_patterns.join(", "), 60),
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}

pub fn set_mode(engine: &Engine, id: &str, mode: FilterMode) -> Result<()> {
    if engine.categories().update_category_filter(id, mode)? {
        println!("Category '{id}' set to {mode}");
    } else {
        println!("No category '{id}' (see `herald categories`)");
    }
    Ok(())
}

pub fn reset(engine: &Engine) -> Result<()> {
    let categories = engine.categories().reset_categories()?;
    println!("Restored {} built-in categories", categories.len());
    Ok(())
}

pub fn reset_all(engine: &Engine, force: bool) -> Result<()> {
    if !force {
        println!("This erases all categories, overrides and rules. Re-run with --force.");
        return Ok(());
    }
    let removed = engine.reset_all()?;
    println!("Erased {removed} stored entries; built-in categories apply again");
    Ok(())
}

pub fn apply(engine: &Engine) -> Result<()> {
    let filters = engine.categories().apply_filters()?;
    print_filters(&filters);
    Ok(())
}

pub fn show_filters(engine: &Engine, json: bool) -> Result<()> {
    let filters = engine.categories().resolved_filters();
    if json {
        let value = serde_json::json!({
            "blocked": filters.blocked,
            "private": filters.private,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_filters(&filters);
    }
    Ok(())
}

fn print_filters(filters: &ResolvedFilters) {
    println!("Blocked ({})", filters.blocked.len());
    for pattern in &filters.blocked {
        println!("  - {pattern}");
    }
    println!("Private ({})", filters.private.len());
    for pattern in &filters.private {
        println!("  - {pattern}");
    }
}
