/// Per-app override command handlers
use anyhow::Result;
use herald_core::Engine;
use herald_storage::FilterMode;

pub fn list(engine: &Engine) -> Result<()> {
    let overrides = engine.categories().app_overrides();
    if overrides.is_empty() {
        println!("No app overrides");
        return Ok(());
    }

    println!("App overrides:");
    for (package, mode) in &overrides {
        println!("  {package} -> {mode}");
    }
    Ok(())
}

pub fn set(engine: &Engine, package: &str, mode: Option<FilterMode>) -> Result<()> {
    engine.categories().set_app_override(package, mode)?;
    match mode {
        Some(mode) => println!("'{package}' overridden to {mode}"),
        None => println!("Override for '{package}' removed"),
    }
    Ok(())
}
