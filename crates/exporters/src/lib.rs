//! Table exports: the three record collections rendered as CSV or XLSX with
//! a fixed column order, matching what the dashboard tables show.

use anyhow::{Context, Result, anyhow};
use rust_xlsxwriter::Workbook;

use models::{BidRecord, CallRecord, InventoryRecord};

/// A flat table ready for rendering: column headings plus stringly rows in
/// the same order. Column order is part of the export contract.
#[derive(Debug)]
pub struct TableExport {
    pub columns: &'static [&'static str],
    pub rows: Vec<Vec<String>>,
}

pub const CALLS_EXPORT_COLUMNS: [&str; 6] = [
    "SC Name",
    "SC Code",
    "Risk",
    "Status",
    "Total Calls",
    "Cancelled Calls",
];

pub const INVENTORY_EXPORT_COLUMNS: [&str; 5] = [
    "Service Center",
    "Avg. Consumption",
    "Available Value",
    "Occupied Value",
    "Under Transit Value",
];

pub const BIDS_EXPORT_COLUMNS: [&str; 25] = [
    "Month",
    "No. Of Bid",
    "Go/No-GO",
    "GO",
    "NO GO",
    "PQ/TQ Stage(Bid Preparation)",
    "Commercial finalization stage",
    "Bid submission",
    "PQ/TQ evaluation",
    "Financial evaluation",
    "Won",
    "Lost",
    "Cancelled",
    "Dropped",
    "Tech Qualified %",
    "Tech Qualified bids",
    "Fin Qualified %",
    "Fin Qualified bids",
    "Quoted Price",
    "Open Prospects",
    "WON Value",
    "LOST Value",
    "PO value",
    "R&R",
    "MS",
];

pub fn calls_table(records: &[CallRecord]) -> TableExport {
    TableExport {
        columns: &CALLS_EXPORT_COLUMNS,
        rows: records
            .iter()
            .map(|c| {
                vec![
                    c.center.clone(),
                    c.sc_code.clone(),
                    c.risk.clone(),
                    c.status.clone(),
                    c.total_calls.to_string(),
                    c.cancelled_calls.to_string(),
                ]
            })
            .collect(),
    }
}

pub fn inventory_table(records: &[InventoryRecord]) -> TableExport {
    TableExport {
        columns: &INVENTORY_EXPORT_COLUMNS,
        rows: records
            .iter()
            .map(|i| {
                vec![
                    i.center.clone(),
                    i.consumption.clone(),
                    i.available.clone(),
                    i.occupied.clone(),
                    i.in_transit.clone(),
                ]
            })
            .collect(),
    }
}

pub fn bids_table(records: &[BidRecord]) -> TableExport {
    TableExport {
        columns: &BIDS_EXPORT_COLUMNS,
        rows: records
            .iter()
            .map(|b| {
                vec![
                    b.month.clone(),
                    b.no_of_bid.to_string(),
                    b.go_no_go.to_string(),
                    b.go.to_string(),
                    b.no_go.to_string(),
                    b.pqtq_stage.to_string(),
                    b.commercial_finalization.to_string(),
                    b.bid_submission.to_string(),
                    b.pqtq_evaluation.to_string(),
                    b.financial_evaluation.to_string(),
                    b.won.to_string(),
                    b.lost.to_string(),
                    b.cancelled.to_string(),
                    b.dropped.to_string(),
                    b.tech_qualified_percent.clone(),
                    b.tech_qualified_bids.to_string(),
                    b.fin_qualified_percent.clone(),
                    b.fin_qualified_bids.to_string(),
                    b.quoted_price.clone(),
                    b.open_prospects.to_string(),
                    b.won_value.clone(),
                    b.lost_value.clone(),
                    b.po_value.clone(),
                    b.rr.to_string(),
                    b.ms.to_string(),
                ]
            })
            .collect(),
    }
}

/// Renders a table as CSV text (header row first).
pub fn to_csv(table: &TableExport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(table.columns)
        .context("Writing CSV header")?;
    for row in &table.rows {
        writer.write_record(row).context("Writing CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow!("Flushing CSV output: {err}"))?;
    String::from_utf8(bytes).context("CSV output was not UTF-8")
}

/// Renders a table as a single-sheet XLSX workbook.
pub fn to_xlsx(table: &TableExport, sheet_name: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sheet_name)
        .context("Setting worksheet name")?;

    for (col, heading) in table.columns.iter().enumerate() {
        worksheet
            .write(0, col as u16, *heading)
            .context("Writing XLSX header")?;
    }
    for (row_idx, row) in table.rows.iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            worksheet
                .write(row_idx as u32 + 1, col as u16, cell.as_str())
                .context("Writing XLSX cell")?;
        }
    }

    workbook.save_to_buffer().context("Serializing XLSX workbook")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_calls() -> Vec<CallRecord> {
        vec![CallRecord {
            id: "1".to_string(),
            month: "May".to_string(),
            center: "North Hub".to_string(),
            sc_code: "NH01".to_string(),
            risk: "No Risk".to_string(),
            status: "Active".to_string(),
            total_calls: 120,
            cancelled_calls: 12,
        }]
    }

    #[test]
    fn test_csv_has_stable_header_and_rows() {
        let csv = to_csv(&calls_table(&sample_calls())).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "SC Name,SC Code,Risk,Status,Total Calls,Cancelled Calls"
        );
        assert_eq!(lines.next().unwrap(), "North Hub,NH01,No Risk,Active,120,12");
    }

    #[test]
    fn test_csv_quotes_comma_formatted_values() {
        let rows = vec![InventoryRecord {
            center: "North Hub".to_string(),
            consumption: "12".to_string(),
            available: "1,200".to_string(),
            occupied: "300".to_string(),
            in_transit: "55".to_string(),
            ..Default::default()
        }];
        let csv = to_csv(&inventory_table(&rows)).unwrap();
        assert!(csv.contains("\"1,200\""));
    }

    #[test]
    fn test_bids_export_covers_every_column() {
        let table = bids_table(&[BidRecord::default()]);
        assert_eq!(table.columns.len(), 25);
        assert_eq!(table.rows[0].len(), 25);
    }

    #[test]
    fn test_xlsx_output_is_nonempty_zip() {
        let bytes = to_xlsx(&calls_table(&sample_calls()), "Calls Data").unwrap();
        // XLSX files are zip archives; check the magic bytes.
        assert_eq!(&bytes[0..2], b"PK");
    }
}
