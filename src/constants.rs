pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const CONFIG_FILE: &str = ".civic-cli-config.json";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_ANALYTICS_DAYS: u32 = 7;
pub const DEFAULT_HOTSPOT_DAYS: u32 = 30;
pub const DEFAULT_LIST_LIMIT: u32 = 50;
pub const MAX_LIST_LIMIT: u32 = 200;

// Submission
pub const TITLE_MAX_CHARS: usize = 30;
pub const FALLBACK_TITLE: &str = "Issue";
pub const DEFAULT_PHOTO_MIME: &str = "image/jpeg";

// Map viewport
pub const DEFAULT_CENTER: (f64, f64) = (20.0, 0.0);
pub const WORLD_ZOOM: u8 = 2;
pub const NEIGHBORHOOD_ZOOM: u8 = 13;
pub const MAX_ZOOM: u8 = 18;

// Env overrides
pub const ENV_API_URL: &str = "CIVIC_API_URL";
pub const ENV_ACCESS_TOKEN: &str = "CIVIC_ACCESS_TOKEN";
pub const ENV_IDENTITY_URL: &str = "CIVIC_IDENTITY_URL";
pub const ENV_IDENTITY_ANON_KEY: &str = "CIVIC_IDENTITY_ANON_KEY";
pub const ENV_LOG_FILTER: &str = "CIVIC_LOG";
