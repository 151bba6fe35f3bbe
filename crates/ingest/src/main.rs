use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use ingest::{ImportTarget, import_path};
use store::JsonFileStore;

fn main() -> Result<()> {
    // Usage:
    //   import_workbook report.xlsx [database_path] [--bids]
    //
    // Without --bids the workbook must carry both "Calls" and "Inventory"
    // sheets; with it, a "Bids" sheet.
    //
    // Defaults:
    //   database_path: ../../database (resolved from this crate's manifest dir)

    let args: Vec<String> = env::args().skip(1).collect();

    let mut workbook_path: Option<String> = None;
    let mut database_path: Option<String> = None;
    let mut target = ImportTarget::Csd;

    for a in &args {
        if a == "--bids" {
            target = ImportTarget::Presales;
        } else if a.to_lowercase().ends_with(".xlsx") || a.to_lowercase().ends_with(".xls") {
            workbook_path = Some(a.clone());
        } else {
            database_path = Some(a.clone());
        }
    }

    let Some(workbook_path) = workbook_path else {
        println!("❌ No workbook given (expected an .xls/.xlsx path).");
        return Ok(());
    };

    // Default database path should be usable no matter what the current
    // working directory is.
    let database_path = database_path.unwrap_or_else(|| {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../database")
            .to_string_lossy()
            .to_string()
    });

    let store = JsonFileStore::new(&database_path);
    store
        .ensure_exists()
        .with_context(|| format!("Preparing database at {}", database_path))?;

    println!(
        "📖 Importing {} ({}) into {}",
        workbook_path,
        match target {
            ImportTarget::Csd => "Calls + Inventory",
            ImportTarget::Presales => "Bids",
        },
        store.path().display()
    );

    match import_path(&store, &PathBuf::from(&workbook_path), target) {
        Ok(summary) => {
            println!("\n📊 Summary:");
            for count in &summary.imported {
                println!("✓ {}: {} record(s) imported", count.collection, count.records);
            }
            println!("✅ {}", summary.message);
        }
        Err(err) => {
            println!("❌ {}", err);
            std::process::exit(1);
        }
    }

    Ok(())
}
