/// Sentinel recorded in the source files for a missing reading
pub const MISSING_SENTINEL: f64 = -9999.0;

/// Pagination defaults
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Summary rows printed after an ingest run
pub const SUMMARY_PREVIEW_ROWS: usize = 5;

/// I/O defaults
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const DEFAULT_DATABASE_FILE: &str = "weather.db";
