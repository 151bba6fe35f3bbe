use std::io::{Read, Seek};

use calamine::{Data, Reader, Sheets};

use data_normalization::{DAY_SERIAL_MIN, RawMonth, normalize_month};
use models::{BidRecord, CallRecord, InventoryRecord};

use crate::ImportError;

/// A record type that can be built from one positionally-bound sheet row.
pub trait SheetRecord: Sized {
    /// Column order this record binds against (see the arrays in `models`).
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &RowCells) -> Self;
}

/// One data row with lenient, never-failing cell accessors. A missing or
/// unreadable cell yields the field's default.
pub struct RowCells<'a> {
    cells: &'a [Data],
}

impl<'a> RowCells<'a> {
    pub fn new(cells: &'a [Data]) -> Self {
        Self { cells }
    }

    /// The cell as display text; empty string when absent.
    pub fn text(&self, idx: usize) -> String {
        match self.cells.get(idx) {
            None | Some(Data::Empty) => String::new(),
            Some(Data::String(s)) => s.trim().to_string(),
            Some(Data::Float(f)) => trim_float(*f),
            Some(Data::Int(i)) => i.to_string(),
            Some(Data::Bool(b)) => b.to_string(),
            Some(other) => other.to_string().trim().to_string(),
        }
    }

    /// The cell as an integer count, defaulting to 0.
    pub fn count(&self, idx: usize) -> i64 {
        match self.cells.get(idx) {
            Some(Data::Int(i)) => *i,
            Some(Data::Float(f)) => *f as i64,
            Some(Data::DateTime(dt)) => dt.as_f64() as i64,
            _ => data_normalization::coerce_count(&self.text(idx)),
        }
    }

    /// The cell as a month label. Numeric day serials become their canonical
    /// `"Mon-YY"` display before storage; everything else stays as text.
    /// This hook is schema-specific (the Bids sheet carries serial months).
    pub fn month(&self, idx: usize) -> String {
        let serial = match self.cells.get(idx) {
            Some(Data::Float(f)) => Some(*f),
            Some(Data::Int(i)) => Some(*i as f64),
            Some(Data::DateTime(dt)) => Some(dt.as_f64()),
            _ => None,
        };

        match serial {
            Some(n) if n > DAY_SERIAL_MIN => normalize_month(RawMonth::Number(n)).display,
            _ => self.text(idx),
        }
    }
}

fn trim_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

impl SheetRecord for CallRecord {
    const COLUMNS: &'static [&'static str] = &models::CALLS_COLUMNS;

    fn from_row(row: &RowCells) -> Self {
        CallRecord {
            id: String::new(),
            month: row.text(0),
            center: row.text(1),
            sc_code: row.text(2),
            risk: row.text(3),
            status: row.text(4),
            total_calls: row.count(5),
            cancelled_calls: row.count(6),
        }
    }
}

impl SheetRecord for InventoryRecord {
    const COLUMNS: &'static [&'static str] = &models::INVENTORY_COLUMNS;

    fn from_row(row: &RowCells) -> Self {
        InventoryRecord {
            id: String::new(),
            month: row.text(0),
            center: row.text(1),
            consumption: row.text(2),
            available: row.text(3),
            occupied: row.text(4),
            in_transit: row.text(5),
        }
    }
}

impl SheetRecord for BidRecord {
    const COLUMNS: &'static [&'static str] = &models::BIDS_COLUMNS;

    fn from_row(row: &RowCells) -> Self {
        BidRecord {
            id: String::new(),
            month: row.month(0),
            no_of_bid: row.count(1),
            go_no_go: row.count(2),
            go: row.count(3),
            no_go: row.count(4),
            pqtq_stage: row.count(5),
            commercial_finalization: row.count(6),
            bid_submission: row.count(7),
            pqtq_evaluation: row.count(8),
            financial_evaluation: row.count(9),
            won: row.count(10),
            lost: row.count(11),
            cancelled: row.count(12),
            dropped: row.count(13),
            tech_qualified_percent: row.text(14),
            tech_qualified_bids: row.count(15),
            fin_qualified_percent: row.text(16),
            fin_qualified_bids: row.count(17),
            quoted_price: row.text(18),
            open_prospects: row.count(19),
            won_value: row.text(20),
            lost_value: row.text(21),
            po_value: row.text(22),
            rr: row.count(23),
            ms: row.count(24),
        }
    }
}

/// Decodes a named sheet into typed records, skipping the header row and
/// preserving row order. Rows that are entirely empty (trailing padding in
/// real exports) are dropped; short rows decode with field defaults.
pub fn decode_sheet<T, R>(workbook: &mut Sheets<R>, sheet_name: &str) -> Result<Vec<T>, ImportError>
where
    T: SheetRecord,
    R: Read + Seek,
{
    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|_| ImportError::SheetNotFound(sheet_name.to_string()))?;

    Ok(range
        .rows()
        .skip(1)
        .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
        .map(|row| T::from_row(&RowCells::new(row)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_cells_text_and_count_defaults() {
        let cells = vec![
            Data::String(" July ".to_string()),
            Data::Float(1200.0),
            Data::String("1,234".to_string()),
            Data::Empty,
        ];
        let row = RowCells::new(&cells);

        assert_eq!(row.text(0), "July");
        assert_eq!(row.text(1), "1200");
        assert_eq!(row.count(2), 1234);
        assert_eq!(row.text(3), "");
        assert_eq!(row.count(9), 0);
    }

    #[test]
    fn test_month_cell_serial_hook() {
        let cells = vec![Data::Float(45108.0), Data::Float(7.0)];
        let row = RowCells::new(&cells);

        assert!(row.month(0).contains('-'));
        // Below the serial threshold: kept as plain text.
        assert_eq!(row.month(1), "7");
    }

    #[test]
    fn test_bid_row_binds_all_columns() {
        let mut cells: Vec<Data> = (0..25i64).map(Data::Int).collect();
        cells[0] = Data::String("Jul-25".to_string());
        cells[14] = Data::String("45%".to_string());
        cells[16] = Data::Float(0.3);
        cells[18] = Data::String("9,99,999".to_string());

        let bid = BidRecord::from_row(&RowCells::new(&cells));
        assert_eq!(bid.month, "Jul-25");
        assert_eq!(bid.no_of_bid, 1);
        assert_eq!(bid.bid_submission, 7);
        assert_eq!(bid.tech_qualified_percent, "45%");
        assert_eq!(bid.fin_qualified_percent, "0.3");
        assert_eq!(bid.quoted_price, "9,99,999");
        assert_eq!(bid.ms, 24);
        assert_eq!(BidRecord::COLUMNS.len(), 25);
    }
}
