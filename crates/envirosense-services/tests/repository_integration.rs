//! Integration tests for EnviroRepository.
//!
//! The OpenWeatherMap API is replaced by a wiremock server and storage by an
//! in-memory SQLite store.

use envirosense_core::{ApiConfig, AppError};
use envirosense_services::{EnviroRepository, LocalStore, SqliteMeasurementStore};
use envirosense_weather::{AirQuality, OpenWeatherClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LAT: f64 = 50.0614;
const LON: f64 = 19.9366;

fn weather_json() -> serde_json::Value {
    serde_json::json!({
        "coord": {"lon": LON, "lat": LAT},
        "weather": [{"id": 500, "main": "Rain", "description": "lekki deszcz", "icon": "10d"}],
        "main": {"temp": 11.8, "feels_like": 10.9, "temp_min": 10.5, "temp_max": 12.9, "pressure": 1009, "humidity": 82},
        "visibility": 9000,
        "wind": {"speed": 3.1, "deg": 180},
        "clouds": {"all": 90},
        "sys": {"country": "PL", "sunrise": 1710476200, "sunset": 1710519400},
        "name": "Kraków",
        "cod": 200
    })
}

fn air_json() -> serde_json::Value {
    serde_json::json!({
        "coord": {"lon": LON, "lat": LAT},
        "list": [{
            "main": {"aqi": 3},
            "components": {"co": 300.4, "no": 0.2, "no2": 20.6, "o3": 40.1, "so2": 5.3, "pm2_5": 28.4, "pm10": 41.0, "nh3": 1.2},
            "dt": 1710513000
        }]
    })
}

async fn mount_weather(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(template)
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_air(server: &MockServer, template: ResponseTemplate, calls: u64) {
    Mock::given(method("GET"))
        .and(path("/air_pollution"))
        .respond_with(template)
        .expect(calls)
        .mount(server)
        .await;
}

fn test_repository(server: &MockServer) -> EnviroRepository {
    let config = ApiConfig {
        base_url: server.uri(),
        ..ApiConfig::default()
    };
    let api = OpenWeatherClient::new(&config, "test_key").unwrap();
    let store = LocalStore::new(SqliteMeasurementStore::open_in_memory().unwrap());
    EnviroRepository::new(api, store)
}

#[tokio::test]
async fn test_fetch_environment_data_joins_both_calls() {
    let server = MockServer::start().await;
    mount_weather(&server, ResponseTemplate::new(200).set_body_json(weather_json())).await;
    mount_air(&server, ResponseTemplate::new(200).set_body_json(air_json()), 1).await;

    let repo = test_repository(&server);

    let before = chrono::Utc::now().timestamp_millis();
    let measurement = repo.fetch_environment_data(LAT, LON).await.unwrap();
    let after = chrono::Utc::now().timestamp_millis();

    assert_eq!(measurement.id, 0);
    assert!(measurement.timestamp >= before && measurement.timestamp <= after);

    assert_eq!(measurement.location.name.as_deref(), Some("Kraków"));
    assert_eq!(measurement.location.country.as_deref(), Some("PL"));
    assert_eq!(measurement.weather.description, "Lekki deszcz");
    assert_eq!(measurement.weather.icon, "10d");
    assert_eq!(measurement.weather.wind_direction, 180);
    assert_eq!(measurement.air_quality.aqi, 3);
    assert_eq!(measurement.air_quality.pm25, 28.4);

    // Fetching never saves.
    assert_eq!(repo.get_measurement_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_weather_failure_skips_air_quality() {
    let server = MockServer::start().await;
    mount_weather(&server, ResponseTemplate::new(500).set_body_string("boom")).await;
    mount_air(&server, ResponseTemplate::new(200).set_body_json(air_json()), 0).await;

    let repo = test_repository(&server);
    let err = repo.fetch_environment_data(LAT, LON).await.unwrap_err();

    assert!(matches!(err, AppError::Remote(_)));
    assert!(!err.needs_permission());
}

#[tokio::test]
async fn test_air_quality_failure_discards_weather() {
    let server = MockServer::start().await;
    mount_weather(&server, ResponseTemplate::new(200).set_body_json(weather_json())).await;
    mount_air(&server, ResponseTemplate::new(503), 1).await;

    let repo = test_repository(&server);
    let count_before = repo.get_measurement_count().await.unwrap();

    let result = repo.fetch_environment_data(LAT, LON).await;
    assert!(matches!(result, Err(AppError::Remote(_))));
    assert_eq!(repo.get_measurement_count().await.unwrap(), count_before);
}

#[tokio::test]
async fn test_empty_air_list_uses_defaults() {
    let server = MockServer::start().await;
    mount_weather(&server, ResponseTemplate::new(200).set_body_json(weather_json())).await;
    mount_air(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "coord": {"lon": LON, "lat": LAT},
            "list": []
        })),
        1,
    )
    .await;

    let repo = test_repository(&server);
    let measurement = repo.fetch_environment_data(LAT, LON).await.unwrap();

    assert_eq!(measurement.air_quality, AirQuality::default());
    assert_eq!(measurement.air_quality.aqi, 1);
}

#[tokio::test]
async fn test_save_then_get_round_trip() {
    let server = MockServer::start().await;
    mount_weather(&server, ResponseTemplate::new(200).set_body_json(weather_json())).await;
    mount_air(&server, ResponseTemplate::new(200).set_body_json(air_json()), 1).await;

    let repo = test_repository(&server);
    let measurement = repo.fetch_environment_data(LAT, LON).await.unwrap();

    let id = repo.save_measurement(&measurement).await.unwrap();
    assert!(id > 0);

    let loaded = repo.get_measurement_by_id(id).await.unwrap().unwrap();
    assert_eq!(loaded, measurement.clone().with_id(id));
    assert!(loaded.is_saved());

    assert!(repo.get_measurement_by_id(id + 1).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_updates_count_and_feed() {
    let server = MockServer::start().await;
    mount_weather(&server, ResponseTemplate::new(200).set_body_json(weather_json())).await;
    mount_air(&server, ResponseTemplate::new(200).set_body_json(air_json()), 1).await;

    let repo = test_repository(&server);
    let measurement = repo.fetch_environment_data(LAT, LON).await.unwrap();

    let first = repo.save_measurement(&measurement).await.unwrap();
    let second = repo.save_measurement(&measurement).await.unwrap();
    assert_ne!(first, second);

    let mut feed = repo.get_all_measurements();
    assert_eq!(feed.next().await.unwrap().unwrap().len(), 2);

    repo.delete_measurement_by_id(first).await.unwrap();
    assert_eq!(repo.get_measurement_count().await.unwrap(), 1);

    let snapshot = feed.next().await.unwrap().unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, second);

    // Unknown ids are ignored.
    repo.delete_measurement_by_id(first).await.unwrap();
    assert_eq!(repo.get_measurement_count().await.unwrap(), 1);

    let saved = repo.get_measurement_by_id(second).await.unwrap().unwrap();
    repo.delete_measurement(&saved).await.unwrap();
    assert_eq!(repo.get_measurement_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_all_and_averages() {
    let server = MockServer::start().await;
    mount_weather(&server, ResponseTemplate::new(200).set_body_json(weather_json())).await;
    mount_air(&server, ResponseTemplate::new(200).set_body_json(air_json()), 1).await;

    let repo = test_repository(&server);
    let base = repo.fetch_environment_data(LAT, LON).await.unwrap();

    assert_eq!(repo.average_temperature(5).await.unwrap(), None);

    for (offset, temp) in [(0, 10.0), (1, 20.0)] {
        let mut m = base.clone();
        m.timestamp += offset;
        m.weather.temperature = temp;
        repo.save_measurement(&m).await.unwrap();
    }

    assert_eq!(repo.average_temperature(5).await.unwrap(), Some(15.0));
    assert_eq!(repo.average_temperature(1).await.unwrap(), Some(20.0));
    assert_eq!(repo.average_aqi(5).await.unwrap(), Some(3.0));

    let mut recent = repo.get_recent_measurements(1);
    let newest = recent.next().await.unwrap().unwrap();
    assert_eq!(newest.len(), 1);
    assert_eq!(newest[0].weather.temperature, 20.0);

    let mut window = repo.get_measurements_between(base.timestamp, base.timestamp);
    assert_eq!(window.next().await.unwrap().unwrap().len(), 1);

    repo.delete_all_measurements().await.unwrap();
    assert_eq!(repo.get_measurement_count().await.unwrap(), 0);
}
