use std::sync::Arc;

use crate::error::ResolveError;
use crate::gateway::Gateway;
use crate::models::PointsResponse;

/// Forecast endpoints advertised by a grid point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridEndpoints {
    pub forecast_url: String,
    pub hourly_forecast_url: String,
}

/// Turns coordinates into the forecast endpoints of their grid point
#[derive(Clone)]
pub struct LocationResolver {
    gateway: Arc<dyn Gateway>,
    api_base: String,
}

impl LocationResolver {
    pub fn new(gateway: Arc<dyn Gateway>, api_base: impl Into<String>) -> Self {
        Self {
            gateway,
            api_base: api_base.into(),
        }
    }

    pub fn points_url(&self, lat: f64, lon: f64) -> String {
        format!("{}/points/{},{}", self.api_base, lat, lon)
    }

    /// Looks up the grid point for `(lat, lon)`; both forecast endpoints
    /// must be present in the response
    pub async fn resolve(&self, lat: f64, lon: f64) -> Result<GridEndpoints, ResolveError> {
        let url = self.points_url(lat, lon);

        let raw = self
            .gateway
            .fetch(&url)
            .await
            .map_err(|source| ResolveError::Fetch {
                url: url.clone(),
                source,
            })?;

        let missing = |field| ResolveError::MissingEndpoint {
            url: url.clone(),
            field,
        };

        let points: PointsResponse =
            serde_json::from_value(raw).map_err(|_| missing("properties"))?;

        Ok(GridEndpoints {
            forecast_url: points.properties.forecast.ok_or_else(|| missing("forecast"))?,
            hourly_forecast_url: points
                .properties
                .forecast_hourly
                .ok_or_else(|| missing("forecastHourly"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct FixedGateway(Result<Value, GatewayError>);

    #[async_trait]
    impl Gateway for FixedGateway {
        async fn fetch(&self, _url: &str) -> Result<Value, GatewayError> {
            self.0.clone()
        }
    }

    fn resolver(reply: Result<Value, GatewayError>) -> LocationResolver {
        LocationResolver::new(Arc::new(FixedGateway(reply)), "https://api.weather.gov")
    }

    #[test]
    fn points_url_uses_raw_coordinates() {
        let r = resolver(Ok(Value::Null));
        assert_eq!(
            r.points_url(40.7128, -74.006),
            "https://api.weather.gov/points/40.7128,-74.006"
        );
    }

    #[tokio::test]
    async fn extracts_both_endpoints() {
        let r = resolver(Ok(json!({
            "properties": {
                "forecast": "https://api.weather.gov/gridpoints/OKX/33,37/forecast",
                "forecastHourly": "https://api.weather.gov/gridpoints/OKX/33,37/forecast/hourly"
            }
        })));

        let endpoints = r.resolve(40.7, -74.0).await.unwrap();
        assert!(endpoints.forecast_url.ends_with("/forecast"));
        assert!(endpoints.hourly_forecast_url.ends_with("/forecast/hourly"));
    }

    #[tokio::test]
    async fn gateway_failure_is_reported() {
        let r = resolver(Err(GatewayError::Timeout));
        let err = r.resolve(1.0, 2.0).await.unwrap_err();
        assert!(matches!(err, ResolveError::Fetch { source: GatewayError::Timeout, .. }));
        assert_eq!(err.url(), "https://api.weather.gov/points/1,2");
    }

    #[tokio::test]
    async fn missing_fields_do_not_panic() {
        let no_props = resolver(Ok(json!({ "status": 404 })));
        assert!(matches!(
            no_props.resolve(1.0, 2.0).await,
            Err(ResolveError::MissingEndpoint { field: "properties", .. })
        ));

        let no_hourly = resolver(Ok(json!({ "properties": { "forecast": "x" } })));
        assert!(matches!(
            no_hourly.resolve(1.0, 2.0).await,
            Err(ResolveError::MissingEndpoint { field: "forecastHourly", .. })
        ));
    }
}
