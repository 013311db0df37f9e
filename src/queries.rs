//! Weather operations composed from the gateway, the location resolver and
//! the session context. Every operation returns report text; failures come
//! back as short sentinel strings.

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;

use crate::config::Config;
use crate::constants::{
    ALERTS_UNAVAILABLE, CONDITIONS_UNPARSEABLE, FORECAST_UNAVAILABLE, HOURLY_PERIODS,
    HOURLY_UNAVAILABLE, LOCATION_UNAVAILABLE, NO_ACTIVE_ALERTS, NO_RADAR_STATIONS,
    RADAR_UNAVAILABLE, REPORT_SEPARATOR,
};
use crate::context::{AlertRecord, ConditionsSnapshot, SessionContext};
use crate::error::ResolveError;
use crate::formatters::{
    format_alert, format_current_conditions, format_daily_period, format_hourly_period,
    format_monitoring, format_radar_station,
};
use crate::gateway::Gateway;
use crate::models::{
    AlertResponse, ForecastPeriod, ForecastResponse, RadarStationFeature, RadarStationsResponse,
    ThresholdUpdate,
};
use crate::resolver::{GridEndpoints, LocationResolver};

/// Returns the station closest to `(lat, lon)` by Euclidean distance in
/// degrees. Ties keep the earlier station; stations without usable
/// coordinates are skipped.
pub fn nearest_station(
    stations: &[RadarStationFeature],
    lat: f64,
    lon: f64,
) -> Option<(&RadarStationFeature, f64)> {
    let mut nearest: Option<(&RadarStationFeature, f64)> = None;

    for station in stations {
        let Some((station_lat, station_lon)) = station.position() else {
            continue;
        };
        let distance = ((station_lat - lat).powi(2) + (station_lon - lon).powi(2)).sqrt();

        if nearest.map_or(true, |(_, best)| distance < best) {
            nearest = Some((station, distance));
        }
    }

    nearest
}

/// Pushes a snapshot into the context and returns the derived alerts
fn observe(ctx: &mut SessionContext, action: &str, snapshot: ConditionsSnapshot) -> Vec<String> {
    ctx.record_trend(snapshot.clone());
    let alerts = ctx.derive_alerts(&snapshot);
    ctx.record_interaction(action, json!({ "conditions": snapshot, "alerts": &alerts }));
    alerts
}

/// Two ASCII letters, upper-cased; `None` for anything else
fn normalize_state(state: &str) -> Option<String> {
    let state = state.trim();
    (state.len() == 2 && state.chars().all(|c| c.is_ascii_alphabetic()))
        .then(|| state.to_ascii_uppercase())
}

#[derive(Clone)]
pub struct WeatherQueries {
    gateway: Arc<dyn Gateway>,
    resolver: LocationResolver,
    api_base: String,
    // Tool calls may arrive concurrently; every mutation goes through this lock
    // and it is never held across an await.
    context: Arc<Mutex<SessionContext>>,
}

impl WeatherQueries {
    pub fn new(gateway: Arc<dyn Gateway>, config: &Config) -> Self {
        Self {
            resolver: LocationResolver::new(gateway.clone(), config.api_base.clone()),
            gateway,
            api_base: config.api_base.clone(),
            context: Arc::new(Mutex::new(SessionContext::new(config.failed_query_capacity))),
        }
    }

    /// Runs `f` against the session context
    pub fn with_context<R>(&self, f: impl FnOnce(&mut SessionContext) -> R) -> R {
        f(&mut self.context.lock())
    }

    /// Fetches `url` and decodes it as `T`. Any failure is logged, recorded
    /// in the session's failed-query log and reported as `None`.
    async fn fetch_as<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        let error = match self.gateway.fetch(url).await {
            Ok(raw) => match serde_json::from_value(raw) {
                Ok(data) => return Some(data),
                Err(e) => format!("unexpected response shape: {}", e),
            },
            Err(e) => e.to_string(),
        };

        tracing::warn!(%url, %error, "upstream query failed");
        self.context.lock().record_failed_query(url, error);
        None
    }

    async fn resolve(&self, lat: f64, lon: f64) -> Option<GridEndpoints> {
        self.context.lock().record_location(lat, lon, None);

        match self.resolver.resolve(lat, lon).await {
            Ok(endpoints) => Some(endpoints),
            Err(err) => {
                tracing::warn!(error = %err, "location lookup failed");
                self.record_resolve_failure(&err);
                None
            }
        }
    }

    fn record_resolve_failure(&self, err: &ResolveError) {
        let reason = match err {
            ResolveError::Fetch { source, .. } => source.to_string(),
            ResolveError::MissingEndpoint { field, .. } => format!("missing {}", field),
        };
        self.context.lock().record_failed_query(err.url(), reason);
    }

    /// Resolves the location and fetches its forecast periods
    async fn forecast_periods(&self, lat: f64, lon: f64) -> Result<Vec<ForecastPeriod>, &'static str> {
        let endpoints = self.resolve(lat, lon).await.ok_or(LOCATION_UNAVAILABLE)?;
        let forecast = self
            .fetch_as::<ForecastResponse>(&endpoints.forecast_url)
            .await
            .ok_or(FORECAST_UNAVAILABLE)?;
        Ok(forecast.properties.periods)
    }

    fn snapshot_of(&self, period: &ForecastPeriod) -> Option<ConditionsSnapshot> {
        match ConditionsSnapshot::from_period(period) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::warn!(error = %err, wind = ?period.wind_speed, "unreadable wind speed");
                None
            }
        }
    }

    /// Reports the first forecast period as current conditions, recording a
    /// trend sample and any threshold alerts
    pub async fn current_conditions(&self, lat: f64, lon: f64) -> String {
        let periods = match self.forecast_periods(lat, lon).await {
            Ok(periods) => periods,
            Err(sentinel) => return sentinel.to_string(),
        };
        let Some(current) = periods.first() else {
            return FORECAST_UNAVAILABLE.to_string();
        };
        let Some(snapshot) = self.snapshot_of(current) else {
            return CONDITIONS_UNPARSEABLE.to_string();
        };

        let alerts = observe(&mut self.context.lock(), "current_conditions", snapshot);
        format_current_conditions(current, &alerts)
    }

    /// Reports the next 24 hourly periods
    pub async fn hourly_forecast(&self, lat: f64, lon: f64) -> String {
        let Some(endpoints) = self.resolve(lat, lon).await else {
            return LOCATION_UNAVAILABLE.to_string();
        };
        let Some(hourly) = self
            .fetch_as::<ForecastResponse>(&endpoints.hourly_forecast_url)
            .await
        else {
            return HOURLY_UNAVAILABLE.to_string();
        };

        hourly
            .properties
            .periods
            .iter()
            .take(HOURLY_PERIODS)
            .map(format_hourly_period)
            .collect::<Vec<_>>()
            .join(REPORT_SEPARATOR)
    }

    /// Reports every period of the daily forecast
    pub async fn daily_forecast(&self, lat: f64, lon: f64) -> String {
        match self.forecast_periods(lat, lon).await {
            Ok(periods) => periods
                .iter()
                .map(format_daily_period)
                .collect::<Vec<_>>()
                .join(REPORT_SEPARATOR),
            Err(sentinel) => sentinel.to_string(),
        }
    }

    /// Reports the radar station nearest to the location
    pub async fn radar_nearest(&self, lat: f64, lon: f64) -> String {
        // Only validates that the point is covered; the endpoints are unused.
        if self.resolve(lat, lon).await.is_none() {
            return LOCATION_UNAVAILABLE.to_string();
        }

        let url = format!("{}/radar/stations", self.api_base);
        let Some(radar) = self.fetch_as::<RadarStationsResponse>(&url).await else {
            return RADAR_UNAVAILABLE.to_string();
        };

        match nearest_station(&radar.features, lat, lon) {
            Some((station, distance)) => format_radar_station(station, distance),
            None => NO_RADAR_STATIONS.to_string(),
        }
    }

    /// Reports active alerts for a state and adds them to the alert history
    pub async fn state_alerts(&self, state: &str) -> String {
        let Some(state) = normalize_state(state) else {
            return format!("Invalid state code: {}", state);
        };

        let url = format!("{}/alerts/active/area/{}", self.api_base, state);
        let Some(response) = self.fetch_as::<AlertResponse>(&url).await else {
            return ALERTS_UNAVAILABLE.to_string();
        };
        if response.features.is_empty() {
            return NO_ACTIVE_ALERTS.to_string();
        }

        let records: Vec<AlertRecord> = response
            .features
            .iter()
            .map(|feature| AlertRecord::from(&feature.properties))
            .collect();
        let report = records
            .iter()
            .map(format_alert)
            .collect::<Vec<_>>()
            .join(REPORT_SEPARATOR);

        let mut ctx = self.context.lock();
        for record in records {
            ctx.record_alert(record);
        }
        report
    }

    /// Takes one monitoring snapshot. Repeating it every `interval_minutes`
    /// is left to the caller.
    pub async fn monitor_snapshot(&self, lat: f64, lon: f64, interval_minutes: u32) -> String {
        let periods = match self.forecast_periods(lat, lon).await {
            Ok(periods) => periods,
            Err(sentinel) => return sentinel.to_string(),
        };

        let Some(current) = periods.first() else {
            return FORECAST_UNAVAILABLE.to_string();
        };
        // An unreadable wind speed still yields a report, just without a
        // trend sample or threshold alerts.
        let snapshot = self.snapshot_of(current);

        let (updated_at, alerts) = {
            let mut ctx = self.context.lock();
            let updated_at = ctx.set_monitoring(lat, lon, interval_minutes);
            let alerts = snapshot
                .map(|snapshot| observe(&mut ctx, "monitor_conditions", snapshot))
                .unwrap_or_default();
            (updated_at, alerts)
        };

        format_monitoring(current, updated_at, interval_minutes, &alerts)
    }

    /// Summary of the session context
    pub fn context_summary(&self) -> String {
        self.context.lock().summarize()
    }

    /// Current alert thresholds as text
    pub fn alert_thresholds(&self) -> String {
        format!("Alert Thresholds:\n{}", self.context.lock().thresholds())
    }

    /// Applies a partial threshold update and reports the result
    pub fn set_alert_thresholds(&self, update: &ThresholdUpdate) -> String {
        let result = self.context.lock().update_thresholds(update);
        match result {
            Ok(()) => self.alert_thresholds(),
            Err(err) => format!("Thresholds unchanged: {}", err),
        }
    }
}
