//! Theme selection backed by the settings store

use super::Context;
use anyhow::Result;
use imghost_cli::output::{accent, Status};
use imghost_core::settings::Theme;
use owo_colors::OwoColorize;

/// List all themes, marking the active one
pub fn list(ctx: &Context) -> Result<()> {
    let current = ctx.theme();

    ctx.header("Themes");
    for theme in Theme::ALL {
        let marker = if theme == current { "●" } else { " " };
        let swatch = accent("■■", theme);
        let line = format!("{:<10} {}", theme.id(), theme.display_name());
        if theme == current {
            println!("  {} {} {}", accent(marker, theme), swatch, line.bold());
        } else {
            println!("  {} {} {}", marker, swatch, line);
        }
    }

    Ok(())
}

/// Print the active theme id
pub fn get(ctx: &Context) -> Result<()> {
    println!("{}", ctx.theme());
    Ok(())
}

/// Persist a new theme
pub fn set(ctx: &Context, name: &str) -> Result<()> {
    let theme: Theme = name.parse()?;
    ctx.settings.set_theme(theme)?;

    let location = ctx
        .settings
        .path()
        .map_or_else(|| "memory".to_string(), |p| p.display().to_string());
    Status::success(&format!(
        "Theme set to {} ({})",
        accent(theme.display_name(), theme),
        location
    ));

    Ok(())
}
