//! Application constants and configuration

use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://traces-backend.onrender.com/api/traces";
/// Environment variable that overrides the configured API base URL
pub const API_URL_ENV: &str = "TRACE_OBSERVER_API_URL";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "Trace Observer";

// Network
pub const MAX_RETRIES: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_millis(1000);

// Filters
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const PAGE_SIZE_OPTIONS: [u32; 3] = [10, 25, 50];
pub const MAX_VISIBLE_PAGES: u32 = 5;

// Virtualized table
pub const TRACE_ROW_HEIGHT: f32 = 60.0;
pub const TRACE_ROW_BUFFER: usize = 5;
/// Used until the table container has been measured once
pub const PROVISIONAL_VIEWPORT_HEIGHT: f32 = 600.0;
