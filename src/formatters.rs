use chrono::{DateTime, Local};

use crate::context::AlertRecord;
use crate::models::{ForecastPeriod, RadarStationFeature};

fn text_or<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    value.as_deref().unwrap_or(fallback)
}

fn temperature(period: &ForecastPeriod) -> String {
    period
        .temperature
        .map(|t| t.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn wind(period: &ForecastPeriod) -> String {
    format!(
        "{} {}",
        text_or(&period.wind_speed, "N/A"),
        text_or(&period.wind_direction, "")
    )
}

fn humidity(period: &ForecastPeriod) -> String {
    period
        .humidity()
        .map(|h| h.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Appends an `Alerts:` block listing derived threshold alerts, if any
fn push_alerts(output: &mut String, alerts: &[String]) {
    if alerts.is_empty() {
        return;
    }
    output.push_str("\nAlerts:\n");
    for alert in alerts {
        output.push_str(&format!("- {}\n", alert));
    }
}

/// Formats the first forecast period as a current-conditions report
pub fn format_current_conditions(period: &ForecastPeriod, alerts: &[String]) -> String {
    let mut output = format!(
        "Current Conditions:\nTemperature: {}\u{00b0}F\nWind: {}\nConditions: {}\nHumidity: {}%\n",
        temperature(period),
        wind(period),
        text_or(&period.short_forecast, "N/A"),
        humidity(period)
    );
    push_alerts(&mut output, alerts);
    output
}

pub fn format_hourly_period(period: &ForecastPeriod) -> String {
    format!(
        "Time: {}\nTemperature: {}\u{00b0}F\nConditions: {}\nWind: {}\n",
        text_or(&period.start_time, "N/A"),
        temperature(period),
        text_or(&period.short_forecast, "N/A"),
        wind(period)
    )
}

pub fn format_daily_period(period: &ForecastPeriod) -> String {
    format!(
        "Day: {}\nTemperature: {}\u{00b0}F\nConditions: {}\nWind: {}\nDetails: {}\n",
        text_or(&period.name, "N/A"),
        temperature(period),
        text_or(&period.short_forecast, "N/A"),
        wind(period),
        text_or(&period.detailed_forecast, "N/A")
    )
}

/// Formats the nearest radar station; `distance` is in degrees
pub fn format_radar_station(station: &RadarStationFeature, distance: f64) -> String {
    let props = &station.properties;
    format!(
        "Nearest Radar Station: {}\nLocation: {}\nStatus: {}\nDistance: {:.2} degrees\n",
        text_or(&props.name, "Unknown"),
        text_or(&props.location, "Unknown"),
        text_or(&props.status, "Unknown"),
        distance
    )
}

pub fn format_alert(alert: &AlertRecord) -> String {
    format!(
        "Event: {}\nArea: {}\nSeverity: {}\nDescription: {}\nInstructions: {}\n",
        alert.event, alert.area, alert.severity, alert.description, alert.instructions
    )
}

/// Formats a monitoring snapshot stamped with `updated_at`
pub fn format_monitoring(
    period: &ForecastPeriod,
    updated_at: DateTime<Local>,
    interval_minutes: u32,
    alerts: &[String],
) -> String {
    let mut output = format!(
        "Weather Monitoring (Last Updated: {})\nTemperature: {}\u{00b0}F\nConditions: {}\nWind: {}\nHumidity: {}%\nUpdate Interval: {} minutes\n",
        updated_at.format("%Y-%m-%d %H:%M:%S"),
        temperature(period),
        text_or(&period.short_forecast, "N/A"),
        wind(period),
        humidity(period),
        interval_minutes
    );
    push_alerts(&mut output, alerts);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuantitativeValue;

    fn period() -> ForecastPeriod {
        ForecastPeriod {
            name: Some("Tonight".into()),
            start_time: Some("2024-06-01T18:00:00-04:00".into()),
            temperature: Some(72.0),
            wind_speed: Some("10 mph".into()),
            wind_direction: Some("SW".into()),
            short_forecast: Some("Partly Cloudy".into()),
            detailed_forecast: Some("Partly cloudy, with a low around 60.".into()),
            relative_humidity: Some(QuantitativeValue { value: Some(55.0) }),
        }
    }

    #[test]
    fn current_conditions_report() {
        let text = format_current_conditions(&period(), &[]);
        assert_eq!(
            text,
            "Current Conditions:\nTemperature: 72°F\nWind: 10 mph SW\nConditions: Partly Cloudy\nHumidity: 55%\n"
        );
        assert!(!text.contains("Alerts:"));
    }

    #[test]
    fn current_conditions_with_alerts() {
        let text = format_current_conditions(&period(), &["Too hot".to_string()]);
        assert!(text.ends_with("\nAlerts:\n- Too hot\n"));
    }

    #[test]
    fn missing_values_render_placeholders() {
        let text = format_daily_period(&ForecastPeriod::default());
        assert!(text.contains("Day: N/A"));
        assert!(text.contains("Temperature: N/A°F"));
        assert!(text.contains("Details: N/A"));
    }

    #[test]
    fn monitoring_report_includes_interval() {
        let text = format_monitoring(&period(), Local::now(), 30, &[]);
        assert!(text.starts_with("Weather Monitoring (Last Updated: "));
        assert!(text.contains("Update Interval: 30 minutes"));
        assert!(text.contains("Humidity: 55%"));
    }
}
