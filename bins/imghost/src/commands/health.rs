//! Backend health check command

use super::Context;
use anyhow::Result;
use imghost_api_client::{HealthResponse, ImghostClient};
use imghost_cli::output::{format_duration, Status};
use imghost_cli::progress;
use imghost_core::{Error, ErrorCode};
use owo_colors::OwoColorize;
use serde_json::json;

/// Query the backend and report each component
///
/// An unhealthy backend is reported and then turned into a network error so
/// the exit code reflects it.
pub async fn run(ctx: &Context, json: bool) -> Result<()> {
    let client = ImghostClient::with_config(super::upload::client_config(ctx)?)?;

    let spinner = progress::spinner(&format!("Checking {}", client.base_url()));
    let result = client.health().check_timed().await;
    spinner.finish_and_clear();
    let (health, elapsed) = result?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "url": client.base_url(),
                "healthy": health.is_healthy(),
                "response_ms": elapsed.as_millis() as u64,
                "health": health,
            }))?
        );
    } else {
        print_report(ctx, client.base_url(), &health, elapsed);
    }

    if health.is_healthy() {
        Ok(())
    } else {
        Err(Error::new(
            ErrorCode::ServiceUnavailable,
            format!("Backend reports status {}", health.status),
        )
        .into())
    }
}

fn print_report(ctx: &Context, url: &str, health: &HealthResponse, elapsed: std::time::Duration) {
    ctx.header("Backend health");
    println!("  {:<10} {}", "URL:", url);

    let status = if health.is_healthy() {
        format!("✓ {}", health.status).green().to_string()
    } else {
        format!("✗ {}", health.status).red().to_string()
    };
    println!(
        "  {:<10} {} {}",
        "Status:",
        status,
        format!("({})", format_duration(elapsed)).dimmed()
    );

    if let Some(uptime) = health.uptime_seconds {
        println!(
            "  {:<10} {}",
            "Uptime:",
            format_duration(std::time::Duration::from_secs(uptime))
        );
    }

    for (name, component) in health.components() {
        let mark = if component.is_ok() {
            "✓".green().to_string()
        } else {
            "✗".red().to_string()
        };
        let message = component.message.as_deref().unwrap_or(&component.status);
        println!("    └─ {:<10} {} {}", name, mark, message.dimmed());
    }

    if health.is_healthy() {
        println!();
        Status::success("Backend is operational");
    }
}
