//! Density reading sources.
//!
//! A [`ReadingSource`] produces the current reading for each zone. The
//! static source serves a fixed table (the sample readings shipped with a
//! venue). The HTTP source polls a prediction endpoint that answers with a
//! JSON object mapping zone names to density values.

use std::collections::BTreeMap;
use std::time::Duration;

use crowd_guard_density_models::DensityReading;

use crate::DensityError;

/// Default timeout for remote reading requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Trait for anything that can report current zone readings.
#[async_trait::async_trait]
pub trait ReadingSource: Send + Sync {
    /// Fetches the current readings.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError`] if the readings can't be obtained.
    async fn readings(&self) -> Result<Vec<DensityReading>, DensityError>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Serves a fixed set of readings.
#[derive(Debug, Clone, Default)]
pub struct StaticReadings {
    readings: Vec<DensityReading>,
}

impl StaticReadings {
    /// Creates a source that always returns `readings`.
    #[must_use]
    pub const fn new(readings: Vec<DensityReading>) -> Self {
        Self { readings }
    }
}

#[async_trait::async_trait]
impl ReadingSource for StaticReadings {
    async fn readings(&self) -> Result<Vec<DensityReading>, DensityError> {
        Ok(self.readings.clone())
    }

    fn describe(&self) -> String {
        format!("static table ({} zones)", self.readings.len())
    }
}

/// Fetches readings from a prediction endpoint over HTTP.
pub struct HttpReadings {
    url: String,
    client: reqwest::Client,
}

impl HttpReadings {
    /// Creates a source for `url` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError::Http`] if the HTTP client can't be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DensityError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl ReadingSource for HttpReadings {
    async fn readings(&self) -> Result<Vec<DensityReading>, DensityError> {
        log::debug!("Fetching density readings from {}", self.url);

        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        let readings = parse_prediction_response(status, &body)?;
        log::debug!("Fetched {} density readings", readings.len());
        Ok(readings)
    }

    fn describe(&self) -> String {
        format!("prediction endpoint {}", self.url)
    }
}

/// Turns a prediction endpoint response into readings.
///
/// # Errors
///
/// Returns [`DensityError::Upstream`] for a non-success status or a
/// malformed body.
pub fn parse_prediction_response(
    status: reqwest::StatusCode,
    body: &str,
) -> Result<Vec<DensityReading>, DensityError> {
    if !status.is_success() {
        return Err(DensityError::Upstream {
            message: format!("HTTP {status}: {body}"),
        });
    }
    parse_prediction_body(body)
}

/// Parses a prediction payload of the form `{"Z1HA": 2.95, ...}`.
///
/// Entries are returned ordered by zone name. Values that aren't numbers
/// are reported as an upstream error rather than skipped.
///
/// # Errors
///
/// Returns [`DensityError::Upstream`] if the body isn't a JSON object of
/// numbers.
pub fn parse_prediction_body(body: &str) -> Result<Vec<DensityReading>, DensityError> {
    let map: BTreeMap<String, f64> =
        serde_json::from_str(body).map_err(|e| DensityError::Upstream {
            message: format!("Malformed prediction payload: {e}"),
        })?;

    Ok(map
        .into_iter()
        .map(|(zone_name, value)| DensityReading { zone_name, value })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_source_returns_its_table() {
        let source = StaticReadings::new(vec![
            DensityReading::new("Z1HA", 2.95),
            DensityReading::new("Z1HC", 5.32),
        ]);

        let readings = source.readings().await.unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].zone_name, "Z1HC");
        assert_eq!(source.describe(), "static table (2 zones)");
    }

    #[tokio::test]
    async fn sources_are_usable_as_trait_objects() {
        let source: Box<dyn ReadingSource> = Box::new(StaticReadings::default());
        assert!(source.readings().await.unwrap().is_empty());
    }

    #[test]
    fn prediction_body_parses_into_sorted_readings() {
        let readings = parse_prediction_body(r#"{"Z2HE": 1.89, "Z1HC": 5.32}"#).unwrap();
        assert_eq!(
            readings,
            vec![
                DensityReading::new("Z1HC", 5.32),
                DensityReading::new("Z2HE", 1.89),
            ]
        );
    }

    #[test]
    fn malformed_prediction_body_is_an_upstream_error() {
        for body in ["", "[]", r#"{"Z1HA": "busy"}"#] {
            assert!(
                matches!(
                    parse_prediction_body(body),
                    Err(DensityError::Upstream { .. })
                ),
                "{body:?}"
            );
        }
    }

    #[test]
    fn error_status_is_an_upstream_error() {
        let err = parse_prediction_response(
            reqwest::StatusCode::SERVICE_UNAVAILABLE,
            r#"{"Z1HA": 2.95}"#,
        )
        .unwrap_err();
        assert!(
            matches!(&err, DensityError::Upstream { message } if message.starts_with("HTTP 503")),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn success_status_parses_the_body() {
        let readings =
            parse_prediction_response(reqwest::StatusCode::OK, r#"{"Z1HA": 2.95}"#).unwrap();
        assert_eq!(readings, [DensityReading::new("Z1HA", 2.95)]);
    }

    #[test]
    fn http_source_describes_its_url() {
        let source = HttpReadings::new("http://localhost:9/predict", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            source.describe(),
            "prediction endpoint http://localhost:9/predict"
        );
    }
}
