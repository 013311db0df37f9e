use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MONITOR_INTERVAL_MINUTES;

// ============================================================================
// National Weather Service API Models
//
// Leaf fields are optional: the API omits keys freely and a missing value
// must fall back to a default rather than fail the whole response.
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PointsResponse {
    pub properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
pub struct PointsProperties {
    pub forecast: Option<String>,
    #[serde(rename = "forecastHourly")]
    pub forecast_hourly: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
pub struct ForecastProperties {
    #[serde(default)]
    pub periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForecastPeriod {
    pub name: Option<String>,
    #[serde(rename = "startTime")]
    pub start_time: Option<String>,
    pub temperature: Option<f64>,
    #[serde(rename = "windSpeed")]
    pub wind_speed: Option<String>,
    #[serde(rename = "windDirection")]
    pub wind_direction: Option<String>,
    #[serde(rename = "shortForecast")]
    pub short_forecast: Option<String>,
    #[serde(rename = "detailedForecast")]
    pub detailed_forecast: Option<String>,
    #[serde(rename = "relativeHumidity")]
    pub relative_humidity: Option<QuantitativeValue>,
}

impl ForecastPeriod {
    pub fn humidity(&self) -> Option<f64> {
        self.relative_humidity.as_ref().and_then(|h| h.value)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct QuantitativeValue {
    pub value: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AlertResponse {
    pub features: Vec<AlertFeature>,
}

#[derive(Debug, Deserialize)]
pub struct AlertFeature {
    #[serde(default)]
    pub properties: AlertProperties,
}

#[derive(Debug, Default, Deserialize)]
pub struct AlertProperties {
    pub event: Option<String>,
    #[serde(rename = "areaDesc")]
    pub area_desc: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub instruction: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RadarStationsResponse {
    pub features: Vec<RadarStationFeature>,
}

#[derive(Debug, Deserialize)]
pub struct RadarStationFeature {
    pub geometry: Option<PointGeometry>,
    #[serde(default)]
    pub properties: RadarStationProperties,
}

impl RadarStationFeature {
    /// Station position as `(latitude, longitude)`; GeoJSON stores it as `[lon, lat]`
    pub fn position(&self) -> Option<(f64, f64)> {
        match self.geometry.as_ref()?.coordinates.as_slice() {
            [lon, lat, ..] => Some((*lat, *lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PointGeometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RadarStationProperties {
    pub name: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetAlertsRequest {
    /// Two-letter US state code, e.g. CA or NY
    pub state: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct LocationRequest {
    /// Latitude of the location
    pub lat: f64,
    /// Longitude of the location
    pub lon: f64,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct MonitorRequest {
    /// Latitude of the location
    pub lat: f64,
    /// Longitude of the location
    pub lon: f64,
    /// Update interval in minutes
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
}

fn default_interval_minutes() -> u32 {
    DEFAULT_MONITOR_INTERVAL_MINUTES
}

/// Partial threshold update; omitted fields keep their current value
#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct ThresholdUpdate {
    /// Minimum acceptable temperature in °F
    pub temperature_min: Option<f64>,
    /// Maximum acceptable temperature in °F
    pub temperature_max: Option<f64>,
    /// Maximum acceptable wind speed in mph
    pub wind_speed_max: Option<f64>,
    /// Maximum acceptable precipitation
    pub precipitation_max: Option<f64>,
}
