//! OpenWeatherMap HTTP client.
//!
//! Two independent, stateless calls. No retries: a failed call is reported
//! to the caller as-is.

use std::time::Duration;

use envirosense_core::ApiConfig;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::dto::{AirQualityResponse, WeatherResponse};
use crate::types::WeatherError;

const USER_AGENT: &str = concat!("EnviroSense/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    lang: String,
    units: String,
}

impl OpenWeatherClient {
    /// Build a client from the `[api]` config section.
    ///
    /// Fails with [`WeatherError::MissingApiKey`] when no key can be resolved.
    pub fn from_config(config: &ApiConfig) -> Result<Self, WeatherError> {
        let api_key = config
            .resolved_api_key()
            .ok_or(WeatherError::MissingApiKey)?;
        Self::new(config, api_key)
    }

    /// Build a client with an explicit API key, ignoring key resolution.
    pub fn new(config: &ApiConfig, api_key: impl Into<String>) -> Result<Self, WeatherError> {
        // reqwest has no separate write timeout; the overall deadline covers
        // connect, send and receive together.
        let total = config
            .connect_timeout_secs
            .saturating_add(config.read_timeout_secs)
            .saturating_add(config.write_timeout_secs);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .timeout(Duration::from_secs(total))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            lang: config.lang.clone(),
            units: config.units.clone(),
        })
    }

    /// Current conditions at the coordinate.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherResponse, WeatherError> {
        let url = format!("{}/weather", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", self.units.clone()),
                ("lang", self.lang.clone()),
            ])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Current air pollution at the coordinate.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_air_quality(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<AirQualityResponse, WeatherError> {
        let url = format!("{}/air_pollution", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, WeatherError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!("Weather API returned status {}", status);
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ApiConfig {
        ApiConfig {
            base_url: server.uri(),
            ..ApiConfig::default()
        }
    }

    fn client_for(server: &MockServer) -> OpenWeatherClient {
        OpenWeatherClient::new(&config_for(server), "test_key").unwrap()
    }

    fn weather_body() -> serde_json::Value {
        serde_json::json!({
            "coord": {"lon": 21.0122, "lat": 52.2297},
            "weather": [{"id": 803, "main": "Clouds", "description": "zachmurzenie duże", "icon": "04d"}],
            "main": {"temp": 9.4, "feels_like": 7.2, "temp_min": 8.0, "temp_max": 10.1, "pressure": 1021, "humidity": 71},
            "visibility": 10000,
            "wind": {"speed": 4.6, "deg": 250},
            "clouds": {"all": 75},
            "sys": {"country": "PL", "sunrise": 1710476400, "sunset": 1710519600},
            "name": "Warszawa",
            "cod": 200
        })
    }

    #[tokio::test]
    async fn test_fetch_weather_sends_expected_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("lat", "52.2297"))
            .and(query_param("lon", "21.0122"))
            .and(query_param("appid", "test_key"))
            .and(query_param("units", "metric"))
            .and(query_param("lang", "pl"))
            .respond_with(ResponseTemplate::new(200).set_body_json(weather_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client.fetch_weather(52.2297, 21.0122).await.unwrap();

        assert_eq!(response.name, "Warszawa");
        assert_eq!(response.main.pressure, 1021);
        assert_eq!(response.wind.deg, Some(250));
    }

    #[tokio::test]
    async fn test_fetch_air_quality() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/air_pollution"))
            .and(query_param("appid", "test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "coord": {"lon": 21.0122, "lat": 52.2297},
                "list": [{
                    "main": {"aqi": 2},
                    "components": {"co": 230.3, "no": 0.0, "no2": 11.0, "o3": 60.5, "so2": 2.1, "pm2_5": 14.3, "pm10": 20.0, "nh3": 0.8},
                    "dt": 1710513000
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client.fetch_air_quality(52.2297, 21.0122).await.unwrap();

        assert_eq!(response.list.len(), 1);
        assert_eq!(response.list[0].components.pm25, 14.3);
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string(r#"{"cod":401,"message":"Invalid API key"}"#),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.fetch_weather(1.0, 2.0).await.unwrap_err();

        match err {
            WeatherError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("Invalid API key"));
            }
            other => unreachable!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/air_pollution"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.fetch_air_quality(1.0, 2.0).await.unwrap_err();

        assert!(matches!(err, WeatherError::Parse(_)));
    }

    #[tokio::test]
    async fn test_network_error_does_not_leak_api_key() {
        // Nothing listens on port 1.
        let config = ApiConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..ApiConfig::default()
        };
        let client = OpenWeatherClient::new(&config, "SECRET_KEY_123").unwrap();

        let err = client.fetch_weather(1.0, 2.0).await.unwrap_err();
        assert!(matches!(err, WeatherError::Network(_)));

        let app_error = envirosense_core::AppError::from(err);
        assert!(!app_error.to_string().contains("SECRET_KEY_123"));
        assert!(!format!("{app_error:?}").contains("SECRET_KEY_123"));
    }

    #[test]
    fn test_huge_timeouts_do_not_overflow() {
        let config = ApiConfig {
            connect_timeout_secs: u64::MAX / 2,
            read_timeout_secs: u64::MAX / 2,
            write_timeout_secs: 10,
            ..ApiConfig::default()
        };
        assert!(OpenWeatherClient::new(&config, "test_key").is_ok());
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(weather_body()))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = config_for(&server);
        config.base_url = format!("{}/", server.uri());
        let client = OpenWeatherClient::new(&config, "test_key").unwrap();

        assert!(client.fetch_weather(52.2297, 21.0122).await.is_ok());
    }
}
