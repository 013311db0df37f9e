/// User agent string for HTTP requests
pub const USER_AGENT: &str = "mcp-weather-context/0.1.0";

/// National Weather Service API base URL
pub const NWS_API_BASE: &str = "https://api.weather.gov";

/// Accept header sent with every upstream request
pub const ACCEPT_GEO_JSON: &str = "application/geo+json";

/// Upstream request timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Separator placed between items of multi-item reports
pub const REPORT_SEPARATOR: &str = "\n---\n";

/// Number of hourly periods included in the hourly forecast
pub const HOURLY_PERIODS: usize = 24;

/// Default interval for monitoring snapshots, in minutes
pub const DEFAULT_MONITOR_INTERVAL_MINUTES: u32 = 15;

/// Text served by the `config://app` resource
pub const APP_CONFIG_TEXT: &str = "App configuration here";

pub const APP_CONFIG_URI: &str = "config://app";

// Session context history capacities
pub const LOCATION_HISTORY_CAPACITY: usize = 10;
pub const INTERACTION_HISTORY_CAPACITY: usize = 100;
pub const TREND_HISTORY_CAPACITY: usize = 24;
pub const ALERT_HISTORY_CAPACITY: usize = 50;
pub const FAILED_QUERY_CAPACITY: usize = 100;

// Sentinel replies returned instead of errors
pub const LOCATION_UNAVAILABLE: &str = "Unable to fetch location data.";
pub const FORECAST_UNAVAILABLE: &str = "Unable to fetch forecast data.";
pub const HOURLY_UNAVAILABLE: &str = "Unable to fetch hourly forecast data.";
pub const RADAR_UNAVAILABLE: &str = "Unable to fetch radar data.";
pub const NO_RADAR_STATIONS: &str = "No radar stations found nearby.";
pub const ALERTS_UNAVAILABLE: &str = "Unable to fetch alerts or no alerts found.";
pub const NO_ACTIVE_ALERTS: &str = "No active alerts for this state.";
pub const CONDITIONS_UNPARSEABLE: &str = "Unable to parse current conditions.";
