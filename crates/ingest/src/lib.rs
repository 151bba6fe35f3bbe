mod decode;

pub use decode::{RowCells, SheetRecord, decode_sheet};

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{Sheets, open_workbook_auto, open_workbook_auto_from_rs};
use serde::Serialize;
use thiserror::Error;

use models::{BidRecord, CallRecord, InventoryRecord};
use store::DocumentStore;

pub const SHEET_CALLS: &str = "Calls";
pub const SHEET_INVENTORY: &str = "Inventory";
pub const SHEET_BIDS: &str = "Bids";

pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Import failures, split by how they surface to the user (upload problems
/// verbatim, missing sheets by name, write failures as a generic retry
/// prompt with the detail kept for the server log).
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("{0}")]
    Validation(String),

    #[error("Sheet '{0}' not found in the Excel file.")]
    SheetNotFound(String),

    #[error("An error occurred during file processing. Please try again.")]
    Write(#[source] anyhow::Error),
}

/// Which logical dataset an upload targets. A workbook import touches
/// exactly one target: `Presales` replaces `bids`, `Csd` replaces `calls`
/// and `inventory` together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportTarget {
    Csd,
    Presales,
}

impl ImportTarget {
    /// The upload form passes `sheetName=Bids` for pre-sales workbooks and
    /// nothing for CSD ones.
    pub fn from_sheet_name(sheet_name: Option<&str>) -> Self {
        match sheet_name {
            Some(SHEET_BIDS) => ImportTarget::Presales,
            _ => ImportTarget::Csd,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CollectionCount {
    pub collection: String,
    pub records: usize,
}

#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub message: String,
    pub imported: Vec<CollectionCount>,
}

/// Validates the upload envelope before any bytes are parsed.
pub fn validate_upload(file_name: &str, size: u64) -> Result<(), ImportError> {
    if size == 0 {
        return Err(ImportError::Validation("File is required.".to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ImportError::Validation("Max file size is 5MB.".to_string()));
    }

    let lower = file_name.to_lowercase();
    if !lower.ends_with(".xls") && !lower.ends_with(".xlsx") {
        return Err(ImportError::Validation(
            "Only .xls and .xlsx files are accepted.".to_string(),
        ));
    }
    Ok(())
}

/// Imports an uploaded workbook held in memory.
pub fn import_bytes(
    store: &dyn DocumentStore,
    file_name: &str,
    bytes: &[u8],
    target: ImportTarget,
) -> Result<ImportSummary, ImportError> {
    validate_upload(file_name, bytes.len() as u64)?;

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|_| {
        ImportError::Validation("The file could not be read as an Excel workbook.".to_string())
    })?;
    run_import(store, &mut workbook, target)
}

/// Imports a workbook from disk (CLI path).
pub fn import_path(
    store: &dyn DocumentStore,
    path: &Path,
    target: ImportTarget,
) -> Result<ImportSummary, ImportError> {
    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    validate_upload(&path.to_string_lossy(), size)?;

    let mut workbook = open_workbook_auto(path).map_err(|_| {
        ImportError::Validation("The file could not be read as an Excel workbook.".to_string())
    })?;
    run_import(store, &mut workbook, target)
}

fn run_import<R: Read + Seek>(
    store: &dyn DocumentStore,
    workbook: &mut Sheets<R>,
    target: ImportTarget,
) -> Result<ImportSummary, ImportError> {
    match target {
        ImportTarget::Presales => import_presales(store, workbook),
        ImportTarget::Csd => import_csd(store, workbook),
    }
}

fn import_presales<R: Read + Seek>(
    store: &dyn DocumentStore,
    workbook: &mut Sheets<R>,
) -> Result<ImportSummary, ImportError> {
    let bids: Vec<BidRecord> = decode_sheet(workbook, SHEET_BIDS)?;

    let count = store::replace_collection(store, store::BIDS, bids).map_err(ImportError::Write)?;

    Ok(ImportSummary {
        message: "Pre-Sales data successfully uploaded.".to_string(),
        imported: vec![CollectionCount {
            collection: store::BIDS.to_string(),
            records: count,
        }],
    })
}

fn import_csd<R: Read + Seek>(
    store: &dyn DocumentStore,
    workbook: &mut Sheets<R>,
) -> Result<ImportSummary, ImportError> {
    // Both required sheets are decoded before anything is cleared, so a
    // workbook missing one sheet leaves the existing collections untouched.
    let calls: Vec<CallRecord> = decode_sheet(workbook, SHEET_CALLS)?;
    let inventory: Vec<InventoryRecord> = decode_sheet(workbook, SHEET_INVENTORY)?;

    let calls_count =
        store::replace_collection(store, store::CALLS, calls).map_err(ImportError::Write)?;
    let inventory_count = store::replace_collection(store, store::INVENTORY, inventory)
        .map_err(ImportError::Write)?;

    Ok(ImportSummary {
        message: "Data successfully uploaded and stored in the database.".to_string(),
        imported: vec![
            CollectionCount {
                collection: store::CALLS.to_string(),
                records: calls_count,
            },
            CollectionCount {
                collection: store::INVENTORY.to_string(),
                records: inventory_count,
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use store::JsonFileStore;
    use tempfile::tempdir;

    fn csd_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();

        let calls = workbook.add_worksheet();
        calls.set_name(SHEET_CALLS).unwrap();
        let headers = ["Month", "SC Name", "SC Code", "Risk", "Status", "Total", "Cancelled"];
        for (col, header) in headers.iter().enumerate() {
            calls.write(0, col as u16, *header).unwrap();
        }
        calls.write(1, 0, "May").unwrap();
        calls.write(1, 1, "North Hub").unwrap();
        calls.write(1, 2, "NH01").unwrap();
        calls.write(1, 3, "No Risk").unwrap();
        calls.write(1, 4, "Active").unwrap();
        calls.write(1, 5, 100).unwrap();
        calls.write(1, 6, 10).unwrap();
        // Short row: only month and center present.
        calls.write(2, 0, "May").unwrap();
        calls.write(2, 1, "South Hub").unwrap();

        let inventory = workbook.add_worksheet();
        inventory.set_name(SHEET_INVENTORY).unwrap();
        inventory.write(0, 0, "Month").unwrap();
        inventory.write(1, 0, "May").unwrap();
        inventory.write(1, 1, "North Hub").unwrap();
        inventory.write(1, 2, "12").unwrap();
        inventory.write(1, 3, "1,200").unwrap();
        inventory.write(1, 4, "300").unwrap();
        inventory.write(1, 5, "55").unwrap();

        workbook.save_to_buffer().unwrap()
    }

    fn bids_workbook(month_cell_serial: Option<f64>) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let bids = workbook.add_worksheet();
        bids.set_name(SHEET_BIDS).unwrap();
        bids.write(0, 0, "Month").unwrap();

        match month_cell_serial {
            Some(serial) => bids.write(1, 0, serial).unwrap(),
            None => bids.write(1, 0, "Jul-25").unwrap(),
        };
        bids.write(1, 1, 12).unwrap(); // noOfBid
        bids.write(1, 7, 40).unwrap(); // bidSubmission
        bids.write(1, 10, 10).unwrap(); // won
        bids.write(1, 14, 0.45).unwrap(); // techQualifiedPercent as a fraction
        bids.write(1, 20, "1,50,000").unwrap(); // wonValue

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_csd_import_replaces_both_collections() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        let summary =
            import_bytes(&store, "report.xlsx", &csd_workbook(), ImportTarget::Csd).unwrap();
        assert_eq!(summary.imported.len(), 2);

        let calls = store::load_calls(&store).unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "1");
        assert_eq!(calls[0].center, "North Hub");
        assert_eq!(calls[0].total_calls, 100);
        // Short row decoded with defaults instead of erroring.
        assert_eq!(calls[1].center, "South Hub");
        assert_eq!(calls[1].total_calls, 0);
        assert_eq!(calls[1].status, "");

        let inventory = store::load_inventory(&store).unwrap();
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory[0].available, "1,200");
    }

    fn calls_only_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let calls = workbook.add_worksheet();
        calls.set_name(SHEET_CALLS).unwrap();
        calls.write(0, 0, "Month").unwrap();
        calls.write(1, 0, "May").unwrap();
        calls.write(1, 1, "North Hub").unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_missing_inventory_sheet_keeps_existing_documents() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        store
            .insert_many(
                store::CALLS,
                vec![serde_json::json!({"id": "1", "month": "May", "center": "Old"})],
            )
            .unwrap();
        store
            .insert_many(
                store::INVENTORY,
                vec![serde_json::json!({"id": "1", "month": "May", "center": "Old"})],
            )
            .unwrap();

        let err = import_bytes(&store, "report.xlsx", &calls_only_workbook(), ImportTarget::Csd)
            .unwrap_err();
        match err {
            ImportError::SheetNotFound(name) => assert_eq!(name, "Inventory"),
            other => panic!("expected SheetNotFound, got {other:?}"),
        }

        // Neither collection was cleared: sheets are confirmed before the
        // delete-then-insert starts.
        assert_eq!(store.list(store::CALLS).unwrap().len(), 1);
        assert_eq!(store.list(store::INVENTORY).unwrap().len(), 1);
    }

    #[test]
    fn test_bids_import_normalizes_serial_months() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        import_bytes(
            &store,
            "bids.xlsx",
            &bids_workbook(Some(45108.0)),
            ImportTarget::Presales,
        )
        .unwrap();

        let bids = store::load_bids(&store).unwrap();
        assert_eq!(bids.len(), 1);
        // 45108 days past Dec 31 1899 lands in 2023.
        assert!(bids[0].month.ends_with("-23"), "month was {}", bids[0].month);
        assert_eq!(bids[0].bid_submission, 40);
        assert_eq!(bids[0].won, 10);
        assert_eq!(bids[0].tech_qualified_percent, "0.45");
        assert_eq!(bids[0].won_value, "1,50,000");
    }

    #[test]
    fn test_bids_import_keeps_text_months() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        import_bytes(&store, "bids.xlsx", &bids_workbook(None), ImportTarget::Presales).unwrap();

        let bids = store::load_bids(&store).unwrap();
        assert_eq!(bids[0].month, "Jul-25");
    }

    #[test]
    fn test_upload_validation() {
        assert!(validate_upload("report.xlsx", 1024).is_ok());
        assert!(validate_upload("report.XLS", 1024).is_ok());

        let err = validate_upload("report.xlsx", 0).unwrap_err();
        assert_eq!(err.to_string(), "File is required.");

        let err = validate_upload("report.xlsx", MAX_UPLOAD_BYTES + 1).unwrap_err();
        assert_eq!(err.to_string(), "Max file size is 5MB.");

        let err = validate_upload("report.csv", 1024).unwrap_err();
        assert_eq!(err.to_string(), "Only .xls and .xlsx files are accepted.");
    }

    #[test]
    fn test_sheet_not_found_message_names_the_sheet() {
        let err = ImportError::SheetNotFound("Inventory".to_string());
        assert_eq!(err.to_string(), "Sheet 'Inventory' not found in the Excel file.");
    }
}
