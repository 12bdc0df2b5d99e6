/// Notification rule command handlers
use anyhow::Result;
use herald_core::Engine;
use herald_storage::{Condition, Disposition, Rule};
use tabled::{Table, Tabled};

use super::helpers::{find_rule_id, short_id, truncate_str};
use crate::ConditionArg;

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "On")]
    enabled: String,
    #[tabled(rename = "When")]
    kind: String,
    #[tabled(rename = "Matching")]
    args: String,
    #[tabled(rename = "Then")]
    action: String,
}

impl From<ConditionArg> for Condition {
    fn from(arg: ConditionArg) -> Self {
        match arg {
            ConditionArg::Bluetooth { devices } => Self::BluetoothConnected {
                devices: devices.into_iter().collect(),
            },
            ConditionArg::Wifi { ssids } => Self::WifiConnected {
                ssids: ssids.into_iter().collect(),
            },
            ConditionArg::Foreground { packages } => Self::ForegroundApp {
                packages: packages.into_iter().collect(),
            },
            ConditionArg::Category { id } => Self::AppInCategory { category_id: id },
            ConditionArg::Words { words } => Self::ContainsWords { words },
        }
    }
}

pub fn list(engine: &Engine) -> Result<()> {
    let rules = engine.rules().load_rules();
    if rules.is_empty() {
        println!("No rules. Add one with `herald rule add`.");
        return Ok(());
    }

    let rows: Vec<RuleRow> = rules
        .iter()
        .map(|r| RuleRow {
            id: short_id(r.id),
            name: truncate_str(&r.name, 30),
            enabled: if r.enabled { "yes" } else { "no" }.to_string(),
            kind: r.condition.kind().to_string(),
            args: truncate_str(&r.condition.describe(), 40),
            action: r.action.to_string(),
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}

pub fn add(
    engine: &Engine,
    name: String,
    action: Disposition,
    condition: ConditionArg,
) -> Result<()> {
    let rule = Rule::new(name, condition.into(), action);
    let id = engine.rules().add_rule(rule)?;
    println!("Added rule {}", short_id(id));
    Ok(())
}

pub fn remove(engine: &Engine, identifier: &str) -> Result<()> {
    let id = find_rule_id(&engine.rules().load_rules(), identifier)?;
    if engine.rules().remove_rule(id)? {
        println!("Removed rule {}", short_id(id));
    } else {
        println!("No rule {id}");
    }
    Ok(())
}

pub fn set_enabled(engine: &Engine, identifier: &str, enabled: bool) -> Result<()> {
    let id = find_rule_id(&engine.rules().load_rules(), identifier)?;
    if engine.rules().set_rule_enabled(id, enabled)? {
        println!(
            "Rule {} {}",
            short_id(id),
            if enabled { "enabled" } else { "disabled" }
        );
    } else {
        println!("No rule {id}");
    }
    Ok(())
}
