use anyhow::{bail, Result};
use rusqlite::Connection;
use std::env;
use std::path::{Path, PathBuf};

use csf_tracker::{
    count_controls, dashboard_stats, delete_all_controls, generate_sample_controls,
    get_all_controls, insert_controls, load_controls_csv, setup_database,
    write_controls_csv,
};

const DEFAULT_DB_PATH: &str = "controls.db";
const DEFAULT_SAMPLE_COUNT: usize = 40;
const DEFAULT_SAMPLE_SEED: u64 = 2024;

fn db_path() -> PathBuf {
    env::var("CSF_TRACKER_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH))
}

fn open_database() -> Result<Connection> {
    let path = db_path();
    let conn = Connection::open(&path)?;
    setup_database(&conn)?;
    Ok(conn)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("seed") => {
            let count = match args.get(2) {
                Some(raw) => raw
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid count: {raw}"))?,
                None => DEFAULT_SAMPLE_COUNT,
            };
            run_seed(count)
        }
        Some("import") => match args.get(2) {
            Some(path) => run_import(Path::new(path)),
            None => bail!("Usage: csf-tracker import <file.csv>"),
        },
        Some("export") => match args.get(2) {
            Some(path) => run_export(Path::new(path)),
            None => bail!("Usage: csf-tracker export <file.csv>"),
        },
        Some("stats") => run_stats(),
        Some("clear") => run_clear(),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("🛡️  CSF Tracker - NIST CSF compliance control tracking");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Usage:");
    println!("  csf-tracker seed [count]      Load sample controls");
    println!("  csf-tracker import <csv>      Import controls from CSV");
    println!("  csf-tracker export <csv>      Export controls to CSV");
    println!("  csf-tracker stats             Print dashboard statistics");
    println!("  csf-tracker clear             Delete all controls");
    println!();
    println!("Database path: {:?} (override with CSF_TRACKER_DB)", db_path());
}

fn run_seed(count: usize) -> Result<()> {
    println!("🎲 Seeding {} sample controls...", count);

    let mut conn = open_database()?;
    let controls = generate_sample_controls(count, DEFAULT_SAMPLE_SEED);
    let written = insert_controls(&mut conn, &controls)?;

    println!("✓ Inserted: {} controls", written);
    println!("✓ Database contains {} controls", count_controls(&conn)?);

    Ok(())
}

fn run_import(csv_path: &Path) -> Result<()> {
    println!("📂 Importing controls from {:?}...", csv_path);

    let controls = load_controls_csv(csv_path)?;
    println!("✓ Parsed {} controls from CSV", controls.len());

    let mut conn = open_database()?;
    let written = insert_controls(&mut conn, &controls)?;

    println!("✓ Written: {} controls (existing ids updated in place)", written);
    println!("✓ Database contains {} controls", count_controls(&conn)?);

    Ok(())
}

fn run_export(csv_path: &Path) -> Result<()> {
    println!("📤 Exporting controls to {:?}...", csv_path);

    let conn = open_database()?;
    let controls = get_all_controls(&conn)?;
    let written = write_controls_csv(csv_path, &controls)?;

    println!("✓ Exported {} controls", written);

    Ok(())
}

fn run_stats() -> Result<()> {
    let conn = open_database()?;
    let controls = get_all_controls(&conn)?;
    let stats = dashboard_stats(&controls);

    println!("📊 Compliance Dashboard");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Total controls:    {}", stats.summary.total);
    println!("Compliant:         {}", stats.summary.compliant);
    println!("Non-compliant:     {}", stats.summary.non_compliant);
    println!("Compliance rate:   {:.1}%", stats.summary.compliance_rate);

    println!("\nOpen gaps by priority:");
    println!("  High:   {}", stats.priority_breakdown.high);
    println!("  Medium: {}", stats.priority_breakdown.medium);
    println!("  Low:    {}", stats.priority_breakdown.low);

    println!("\nRemediation status:");
    println!("  Not Started: {}", stats.remediation_breakdown.not_started);
    println!("  In Progress: {}", stats.remediation_breakdown.in_progress);
    println!("  Completed:   {}", stats.remediation_breakdown.completed);

    println!("\nControls by NIST function:");
    for func in &stats.function_distribution {
        println!("  {}  {:<10} {}", func.code, func.label, func.count);
    }

    if !stats.domain_ranking.is_empty() {
        println!("\nTop risk domains (weighted):");
        for (rank, domain) in stats.domain_ranking.iter().enumerate() {
            println!(
                "  {}. {} - score {} (H:{} M:{} L:{})",
                rank + 1,
                domain.domain,
                domain.weighted_score,
                domain.high,
                domain.medium,
                domain.low
            );
        }
    }

    println!("\nProjected gap closure (synthetic, current state only):");
    for point in &stats.gap_projection {
        println!("  Month {:>2}: {} open", point.month, point.projected_open);
    }

    Ok(())
}

fn run_clear() -> Result<()> {
    let conn = open_database()?;
    let deleted = delete_all_controls(&conn)?;

    println!("🗑️  Deleted {} controls", deleted);

    Ok(())
}
