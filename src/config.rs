use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Extrato";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_PKG_NAME"))
}

/// Get the application data directory (~/Extrato on all platforms)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Extrato")
}

/// Default location of the ledger database
pub fn database_path() -> PathBuf {
    app_data_dir().join("ledger.db")
}

/// Tunables for a single import run.
///
/// Everything that shapes pipeline behavior lives here so the engine itself
/// stays free of magic numbers.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum characters per chunk sent to the structuring service.
    pub max_chunk_chars: usize,
    /// Per-request timeout for structuring calls, in seconds.
    pub structuring_timeout_secs: u64,
    /// Bounded worker pool size for concurrent chunk structuring.
    pub max_in_flight: usize,
    /// Minimum non-whitespace characters for extracted text to be usable.
    pub min_extracted_chars: usize,
    /// Tolerance when matching candidate amounts against numeric tokens.
    pub amount_tolerance: f64,
    /// Below this consistency ratio the batch is flagged for user review.
    pub consistency_threshold: f64,
    /// Accepted year range for transaction dates.
    pub min_year: i32,
    pub max_year: i32,
    /// Invoice billing month = due date minus this many days.
    pub invoice_billing_offset_days: i64,
    /// More than this many existing entries in the billing month means the
    /// invoice was already imported.
    pub invoice_dup_entry_threshold: i64,
    /// Receipt duplicate window around the transaction timestamp, minutes.
    pub receipt_window_minutes: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 4000,
            structuring_timeout_secs: 10,
            max_in_flight: 4,
            min_extracted_chars: 10,
            amount_tolerance: 0.01,
            consistency_threshold: 0.3,
            min_year: 1990,
            max_year: 2100,
            invoice_billing_offset_days: 15,
            invoice_dup_entry_threshold: 5,
            receipt_window_minutes: 5,
        }
    }
}
