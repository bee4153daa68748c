//! Wire types for the OpenWeatherMap `weather` and `air_pollution` endpoints.

use serde::Deserialize;

/// Response of `GET /weather`
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherResponse {
    pub coord: Coordinates,
    #[serde(default)]
    pub weather: Vec<WeatherInfo>,
    pub main: MainInfo,
    pub visibility: i32,
    pub wind: WindInfo,
    pub clouds: CloudsInfo,
    pub sys: SysInfo,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cod: i32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherInfo {
    pub id: i32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainInfo {
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: i32,
    pub humidity: i32,
    pub temp_min: f64,
    pub temp_max: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindInfo {
    pub speed: f64,
    /// Omitted by the API in calm conditions
    #[serde(default)]
    pub deg: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudsInfo {
    pub all: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SysInfo {
    /// Missing for coordinates outside any country (open sea)
    #[serde(default)]
    pub country: Option<String>,
    pub sunrise: i64,
    pub sunset: i64,
}

/// Response of `GET /air_pollution`
#[derive(Debug, Clone, Deserialize)]
pub struct AirQualityResponse {
    pub coord: Coordinates,
    #[serde(default)]
    pub list: Vec<AirQualityData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AirQualityData {
    pub main: AirMain,
    pub components: AirComponents,
    /// Unix seconds
    pub dt: i64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AirMain {
    /// 1 = Good, 2 = Fair, 3 = Moderate, 4 = Poor, 5 = Very Poor
    pub aqi: i32,
}

/// Pollutant concentrations, µg/m³
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AirComponents {
    pub co: f64,
    pub no: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    #[serde(rename = "pm2_5")]
    pub pm25: f64,
    pub pm10: f64,
    pub nh3: f64,
}
