use anyhow::Result;
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters, ServerHandler},
    model::{
        AnnotateAble, CallToolResult, Content, Implementation, ListResourcesResult,
        PaginatedRequestParam, ProtocolVersion, RawResource, ReadResourceRequestParam,
        ReadResourceResult, ResourceContents, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer,
};
use serde_json::json;
use std::sync::Arc;

use crate::config::Config;
use crate::constants::{APP_CONFIG_TEXT, APP_CONFIG_URI};
use crate::gateway::{Gateway, HttpGateway};
use crate::models::{GetAlertsRequest, LocationRequest, MonitorRequest, ThresholdUpdate};
use crate::queries::WeatherQueries;

fn text_result(text: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// MCP server exposing the weather operations as tools
#[derive(Clone)]
pub struct Weather {
    queries: WeatherQueries,
    tool_router: ToolRouter<Self>,
}

impl Weather {
    /// Creates a service talking to the National Weather Service over HTTP
    pub fn new(config: &Config) -> Result<Self> {
        let gateway = HttpGateway::new(config)?;
        Ok(Self::with_gateway(Arc::new(gateway), config))
    }

    pub fn with_gateway(gateway: Arc<dyn Gateway>, config: &Config) -> Self {
        Self {
            queries: WeatherQueries::new(gateway, config),
            tool_router: Self::tool_router(),
        }
    }

    pub fn queries(&self) -> &WeatherQueries {
        &self.queries
    }
}

#[tool_handler]
impl ServerHandler for Weather {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "mcp-weather-context".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Weather conditions, forecasts, radar and alerts from the National Weather \
                Service API, with a session context that tracks recent queries and raises \
                threshold alerts."
                    .to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(vec![
            RawResource::new(APP_CONFIG_URI, "App configuration").no_annotation(),
        ]))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let uri = request.uri;
        if uri == APP_CONFIG_URI {
            Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(APP_CONFIG_TEXT, uri)],
            })
        } else {
            Err(McpError::resource_not_found(
                "resource_not_found",
                Some(json!({ "uri": uri })),
            ))
        }
    }
}

#[tool_router]
impl Weather {
    #[tool(description = "Get current weather conditions for a location. Raises threshold alerts for extreme temperature or wind.")]
    async fn get_current_conditions(
        &self,
        Parameters(request): Parameters<LocationRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Getting current conditions for {}, {}", request.lat, request.lon);
        text_result(self.queries.current_conditions(request.lat, request.lon).await)
    }

    #[tool(description = "Get the hourly weather forecast (next 24 hours) for a location.")]
    async fn get_hourly_forecast(
        &self,
        Parameters(request): Parameters<LocationRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Getting hourly forecast for {}, {}", request.lat, request.lon);
        text_result(self.queries.hourly_forecast(request.lat, request.lon).await)
    }

    #[tool(description = "Get the daily weather forecast for a location.")]
    async fn get_daily_forecast(
        &self,
        Parameters(request): Parameters<LocationRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Getting daily forecast for {}, {}", request.lat, request.lon);
        text_result(self.queries.daily_forecast(request.lat, request.lon).await)
    }

    #[tool(description = "Find the weather radar station nearest to a location.")]
    async fn get_radar_data(
        &self,
        Parameters(request): Parameters<LocationRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Getting radar data for {}, {}", request.lat, request.lon);
        text_result(self.queries.radar_nearest(request.lat, request.lon).await)
    }

    #[tool(description = "Get active weather alerts for a US state. Provide a two-letter state code (e.g., 'CA' for California, 'NY' for New York).")]
    async fn get_alerts(
        &self,
        Parameters(request): Parameters<GetAlertsRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Getting alerts for state: {}", request.state);
        text_result(self.queries.state_alerts(&request.state).await)
    }

    #[tool(description = "Take a monitoring snapshot of current conditions. Call again every interval_minutes (default 15) to keep monitoring.")]
    async fn monitor_conditions(
        &self,
        Parameters(request): Parameters<MonitorRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "Monitoring {}, {} every {} minutes",
            request.lat,
            request.lon,
            request.interval_minutes
        );
        text_result(
            self.queries
                .monitor_snapshot(request.lat, request.lon, request.interval_minutes)
                .await,
        )
    }

    #[tool(description = "Summarize the session: last location, failed queries, alerts seen, monitoring state and alert thresholds.")]
    async fn get_context_summary(&self) -> Result<CallToolResult, McpError> {
        text_result(self.queries.context_summary())
    }

    #[tool(description = "Show the thresholds used to raise temperature and wind alerts.")]
    async fn get_alert_thresholds(&self) -> Result<CallToolResult, McpError> {
        text_result(self.queries.alert_thresholds())
    }

    #[tool(description = "Update alert thresholds. Omitted fields keep their current value.")]
    async fn set_alert_thresholds(
        &self,
        Parameters(update): Parameters<ThresholdUpdate>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(?update, "Updating alert thresholds");
        text_result(self.queries.set_alert_thresholds(&update))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advertises_tools_and_resources() {
        let weather = Weather::new(&Config::default()).unwrap();
        let info = weather.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
        assert_eq!(info.server_info.name, "mcp-weather-context");
    }

    #[test]
    fn registers_every_tool() {
        let weather = Weather::new(&Config::default()).unwrap();
        let names: Vec<String> = weather
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();

        for expected in [
            "get_current_conditions",
            "get_hourly_forecast",
            "get_daily_forecast",
            "get_radar_data",
            "get_alerts",
            "monitor_conditions",
            "get_context_summary",
            "get_alert_thresholds",
            "set_alert_thresholds",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing tool {expected}");
        }
    }
}
