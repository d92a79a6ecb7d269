use serde::Serialize;
use tracing::info;

/// Counters of one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Sheets declared by the workbook
    pub sheets_total: usize,
    /// Sheets whose rows were folded
    pub sheets_processed: usize,
    /// Sheets skipped for row data (no SKU column, unreadable)
    pub sheets_skipped: usize,
    /// Rows folded into the SKU index
    pub rows_folded: usize,
    pub unique_skus: usize,
    pub images_persisted: usize,
    pub images_deduplicated: usize,
    /// Images dropped because they could not be read or persisted
    pub images_skipped: usize,
}

impl IngestReport {
    pub fn log(&self) {
        info!(
            sheets_total = self.sheets_total,
            sheets_processed = self.sheets_processed,
            sheets_skipped = self.sheets_skipped,
            rows_folded = self.rows_folded,
            unique_skus = self.unique_skus,
            images_persisted = self.images_persisted,
            images_deduplicated = self.images_deduplicated,
            images_skipped = self.images_skipped,
            "ingestion finished"
        );
    }
}
