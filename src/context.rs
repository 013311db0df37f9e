//! Per-session state: bounded histories of what was asked and seen, the
//! alert thresholds, and the monitoring slot.

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;

use crate::constants::{
    ALERT_HISTORY_CAPACITY, FAILED_QUERY_CAPACITY, INTERACTION_HISTORY_CAPACITY,
    LOCATION_HISTORY_CAPACITY, TREND_HISTORY_CAPACITY,
};
use crate::error::{ParseError, ThresholdError};
use crate::models::{AlertProperties, ForecastPeriod, ThresholdUpdate};

/// Reads the leading numeric token of strings like `"10 mph"` or `"5 to 10 mph"`.
///
/// Fails with [`ParseError::Empty`] on blank input and
/// [`ParseError::NotANumber`] when the first token is not a finite number.
pub fn parse_leading_number(text: &str) -> Result<f64, ParseError> {
    let token = text.split_whitespace().next().ok_or(ParseError::Empty)?;
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError::NotANumber(token.to_string())),
    }
}

/// Point-in-time weather measurements used for trends and alerting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionsSnapshot {
    /// °F
    pub temperature: f64,
    /// mph
    pub wind_speed: f64,
    pub conditions: String,
    /// Percent, 0 when the forecast has none
    pub humidity: f64,
}

impl ConditionsSnapshot {
    /// Builds a snapshot from a forecast period. Missing temperature, wind
    /// and humidity count as 0; missing conditions as an empty string.
    pub fn from_period(period: &ForecastPeriod) -> Result<Self, ParseError> {
        let wind_speed = parse_leading_number(period.wind_speed.as_deref().unwrap_or("0"))?;

        Ok(Self {
            temperature: period.temperature.unwrap_or(0.0),
            wind_speed,
            conditions: period.short_forecast.clone().unwrap_or_default(),
            humidity: period.humidity().unwrap_or(0.0),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub state: Option<String>,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionRecord {
    pub action: String,
    pub details: Value,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSample {
    pub conditions: ConditionsSnapshot,
    pub timestamp: DateTime<Local>,
}

/// An upstream alert as reported by a state alert query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    pub event: String,
    pub area: String,
    pub severity: String,
    pub description: String,
    pub instructions: String,
}

impl From<&AlertProperties> for AlertRecord {
    fn from(props: &AlertProperties) -> Self {
        let or = |value: &Option<String>, fallback: &str| {
            value.clone().unwrap_or_else(|| fallback.to_string())
        };

        Self {
            event: or(&props.event, "Unknown"),
            area: or(&props.area_desc, "Unknown"),
            severity: or(&props.severity, "Unknown"),
            description: or(&props.description, "No description available"),
            instructions: or(&props.instruction, "No specific instructions provided"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedQueryRecord {
    pub url: String,
    pub error: String,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoringSettings {
    pub latitude: f64,
    pub longitude: f64,
    pub interval_minutes: u32,
    pub last_update: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlertThresholds {
    /// °F
    pub temperature: TemperatureRange,
    /// mph
    pub wind_speed_max: f64,
    /// Kept for reporting; no alert is derived from it
    pub precipitation_max: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            temperature: TemperatureRange { min: 32.0, max: 90.0 },
            wind_speed_max: 30.0,
            precipitation_max: 0.5,
        }
    }
}

impl AlertThresholds {
    /// Applies the fields present in `update`. Nothing changes if the
    /// resulting temperature range would be inverted.
    pub fn apply(&mut self, update: &ThresholdUpdate) -> Result<(), ThresholdError> {
        let min = update.temperature_min.unwrap_or(self.temperature.min);
        let max = update.temperature_max.unwrap_or(self.temperature.max);
        if min > max {
            return Err(ThresholdError::InvertedTemperatureRange { min, max });
        }

        self.temperature = TemperatureRange { min, max };
        if let Some(wind) = update.wind_speed_max {
            self.wind_speed_max = wind;
        }
        if let Some(precipitation) = update.precipitation_max {
            self.precipitation_max = precipitation;
        }
        Ok(())
    }

    /// Evaluates a snapshot against the thresholds. Temperature is checked
    /// first (low and high are exclusive), then wind.
    pub fn evaluate(&self, snapshot: &ConditionsSnapshot) -> Vec<String> {
        let mut alerts = Vec::new();

        if snapshot.temperature < self.temperature.min {
            alerts.push(format!(
                "Temperature {}°F is below minimum threshold of {}°F",
                snapshot.temperature, self.temperature.min
            ));
        } else if snapshot.temperature > self.temperature.max {
            alerts.push(format!(
                "Temperature {}°F is above maximum threshold of {}°F",
                snapshot.temperature, self.temperature.max
            ));
        }

        if snapshot.wind_speed > self.wind_speed_max {
            alerts.push(format!(
                "Wind speed {} mph exceeds maximum threshold of {} mph",
                snapshot.wind_speed, self.wind_speed_max
            ));
        }

        alerts
    }
}

impl fmt::Display for AlertThresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  Temperature: {}-{}\u{00b0}F",
            self.temperature.min, self.temperature.max
        )?;
        writeln!(f, "  Wind Speed: max {} mph", self.wind_speed_max)?;
        writeln!(f, "  Precipitation: max {}", self.precipitation_max)
    }
}

/// Ordered sequence that drops its oldest entry once full
#[derive(Debug, Clone)]
pub struct BoundedHistory<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedHistory<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        while self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Up to `n` newest entries, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &T> {
        self.items.iter().skip(self.items.len().saturating_sub(n))
    }
}

pub struct SessionContext {
    location_history: BoundedHistory<LocationRecord>,
    last_queries: BoundedHistory<FailedQueryRecord>,
    interactions: BoundedHistory<InteractionRecord>,
    weather_trends: BoundedHistory<TrendSample>,
    alert_history: BoundedHistory<AlertRecord>,
    monitoring: Option<MonitoringSettings>,
    thresholds: AlertThresholds,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(FAILED_QUERY_CAPACITY)
    }
}

impl SessionContext {
    pub fn new(failed_query_capacity: usize) -> Self {
        Self {
            location_history: BoundedHistory::new(LOCATION_HISTORY_CAPACITY),
            last_queries: BoundedHistory::new(failed_query_capacity),
            interactions: BoundedHistory::new(INTERACTION_HISTORY_CAPACITY),
            weather_trends: BoundedHistory::new(TREND_HISTORY_CAPACITY),
            alert_history: BoundedHistory::new(ALERT_HISTORY_CAPACITY),
            monitoring: None,
            thresholds: AlertThresholds::default(),
        }
    }

    /// Appends a visited location
    pub fn record_location(&mut self, latitude: f64, longitude: f64, state: Option<String>) {
        tracing::debug!(latitude, longitude, ?state, "recording location");
        self.location_history.push(LocationRecord {
            latitude,
            longitude,
            state,
            timestamp: Local::now(),
        });
    }

    /// Appends a completed action with its payload
    pub fn record_interaction(&mut self, action: impl Into<String>, details: Value) {
        let action = action.into();
        tracing::debug!(%action, "recording interaction");
        self.interactions.push(InteractionRecord {
            action,
            details,
            timestamp: Local::now(),
        });
    }

    /// Appends a conditions sample to the trend history
    pub fn record_trend(&mut self, conditions: ConditionsSnapshot) {
        self.weather_trends.push(TrendSample {
            conditions,
            timestamp: Local::now(),
        });
    }

    /// Appends an upstream alert; repeats are kept
    pub fn record_alert(&mut self, alert: AlertRecord) {
        self.alert_history.push(alert);
    }

    /// Appends a query that produced no usable data
    pub fn record_failed_query(&mut self, url: impl Into<String>, error: impl Into<String>) {
        self.last_queries.push(FailedQueryRecord {
            url: url.into(),
            error: error.into(),
            timestamp: Local::now(),
        });
    }

    /// Overwrites the monitoring slot, stamped with the current time, and
    /// returns that timestamp
    pub fn set_monitoring(
        &mut self,
        latitude: f64,
        longitude: f64,
        interval_minutes: u32,
    ) -> DateTime<Local> {
        let last_update = Local::now();
        self.monitoring = Some(MonitoringSettings {
            latitude,
            longitude,
            interval_minutes,
            last_update,
        });
        last_update
    }

    pub fn derive_alerts(&self, snapshot: &ConditionsSnapshot) -> Vec<String> {
        self.thresholds.evaluate(snapshot)
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    pub fn update_thresholds(&mut self, update: &ThresholdUpdate) -> Result<(), ThresholdError> {
        self.thresholds.apply(update)
    }

    pub fn location_history(&self) -> &BoundedHistory<LocationRecord> {
        &self.location_history
    }

    pub fn failed_queries(&self) -> &BoundedHistory<FailedQueryRecord> {
        &self.last_queries
    }

    pub fn interactions(&self) -> &BoundedHistory<InteractionRecord> {
        &self.interactions
    }

    pub fn weather_trends(&self) -> &BoundedHistory<TrendSample> {
        &self.weather_trends
    }

    pub fn alert_history(&self) -> &BoundedHistory<AlertRecord> {
        &self.alert_history
    }

    pub fn monitoring(&self) -> Option<&MonitoringSettings> {
        self.monitoring.as_ref()
    }

    /// Human-readable overview of the session; safe on an empty context
    pub fn summarize(&self) -> String {
        let last_location = self
            .location_history
            .last()
            .map(|loc| format!("{}, {}", loc.latitude, loc.longitude))
            .unwrap_or_else(|| "None".to_string());
        let last_interaction = self
            .interactions
            .last()
            .map(|i| i.action.as_str())
            .unwrap_or("None");

        format!(
            "Context Summary:\n\
             Last Location: {}\n\
             Failed Queries: {}\n\
             Alert History: {}\n\
             Monitoring Active: {}\n\
             Last Interaction: {}\n\
             Recent Trends: {}\n\
             Alert Thresholds:\n{}",
            last_location,
            self.last_queries.len(),
            self.alert_history.len(),
            if self.monitoring.is_some() { "Yes" } else { "No" },
            last_interaction,
            self.weather_trends.recent(3).count(),
            self.thresholds,
        )
    }
}
