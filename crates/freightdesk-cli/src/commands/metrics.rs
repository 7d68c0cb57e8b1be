use crate::commands::print_json;
use crate::util::format_average;
use anyhow::{Context as _, Result};
use chrono::Utc;
use clap::Args;
use freightdesk_config::AppConfig;
use freightdesk_store::catalog::ShipmentCatalog;
use std::path::PathBuf;
use tracing::debug;

const TOP_ROUTES_SHOWN: usize = 5;

#[derive(Debug, Args)]
pub struct MetricsArgs {
    /// Directory holding the shipment catalog and driver roster
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

pub fn show_metrics(config: &AppConfig, args: MetricsArgs, json: bool) -> Result<()> {
    let mut data = config.data.clone();
    if let Some(dir) = args.data_dir {
        data.dir = dir;
    }
    let catalog = ShipmentCatalog::new(data.shipments_path(), data.drivers_path());
    debug!(path = %catalog.shipments_path().display(), "loading shipment catalog");

    let snapshot = catalog
        .snapshot(Utc::now())
        .with_context(|| format!("compute metrics from {}", catalog.shipments_path().display()))?;

    if json {
        return print_json(&snapshot);
    }

    println!("loads: {}", snapshot.total_loads);
    println!("revenue: {:.2}", snapshot.total_revenue);
    println!("average rate: {}", format_average(snapshot.average_rate));
    println!("average weight: {}", format_average(snapshot.average_weight));
    println!(
        "miles: {:.0} (average {})",
        snapshot.total_miles,
        format_average(snapshot.average_miles)
    );
    println!(
        "drivers: {} active of {}",
        snapshot.active_drivers, snapshot.total_drivers
    );

    if !snapshot.equipment_breakdown.is_empty() {
        println!("equipment:");
        for (equipment, count) in &snapshot.equipment_breakdown {
            println!("  {}: {}", equipment, count);
        }
    }
    if !snapshot.commodity_breakdown.is_empty() {
        println!("commodities:");
        for (commodity, count) in &snapshot.commodity_breakdown {
            println!("  {}: {}", commodity, count);
        }
    }
    if !snapshot.top_routes.is_empty() {
        println!("top routes:");
        for route in snapshot.top_routes.iter().take(TOP_ROUTES_SHOWN) {
            println!("  {:.2}  {}  ({})", route.rate, route.route, route.load_id);
        }
    }
    Ok(())
}
