/// Notification check command handler
use anyhow::Result;
use herald_core::{Engine, NotificationContext};

/// Notification and device state to evaluate
pub struct CheckRequest {
    pub package: String,
    pub title: Option<String>,
    pub text: Option<String>,
    pub devices: Vec<String>,
    pub wifi: Option<String>,
    /// Foreground reports replayed into the tracker before resolving
    pub foreground: Vec<String>,
}

pub fn check(engine: &Engine, request: CheckRequest, json: bool) -> Result<()> {
    for package in &request.foreground {
        engine
            .foreground()
            .update_foreground_package(Some(package.as_str()));
    }

    let ctx = NotificationContext {
        package: request.package,
        title: request.title,
        text: request.text,
        connected_devices: request.devices.into_iter().collect(),
        wifi_ssid: request.wifi,
    };

    let resolution = engine.resolver().resolve(&ctx);
    let foreground = engine.foreground().effective_package_default();

    if json {
        let value = serde_json::json!({
            "package": ctx.package,
            "disposition": resolution.disposition,
            "foreground": foreground,
            "reasons": resolution.reasons.iter().map(ToString::to_string).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{} -> {}", ctx.package, resolution.disposition);
    if let Some(foreground) = foreground {
        println!("  foreground: {foreground}");
    }
    for reason in &resolution.reasons {
        println!("  - {reason}");
    }
    Ok(())
}
