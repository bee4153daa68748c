//! Conversions from API responses into the domain model.
//!
//! All functions are total: optional upstream fields fall back to defaults
//! instead of failing.

use crate::dto::{AirQualityResponse, WeatherResponse};
use crate::types::{AirQuality, Location, Weather};

/// Icon shown when the response carries no condition entry.
pub const FALLBACK_ICON: &str = "01d";

pub fn to_weather(response: &WeatherResponse) -> Weather {
    let info = response.weather.first();

    Weather {
        temperature: response.main.temp,
        feels_like: response.main.feels_like,
        humidity: response.main.humidity,
        pressure: response.main.pressure,
        wind_speed: response.wind.speed,
        wind_direction: response.wind.deg.unwrap_or(0),
        description: info
            .map(|w| capitalize_first(&w.description))
            .unwrap_or_default(),
        icon: info
            .map(|w| w.icon.clone())
            .unwrap_or_else(|| FALLBACK_ICON.to_string()),
        clouds: response.clouds.all,
        visibility: response.visibility,
        sunrise: response.sys.sunrise,
        sunset: response.sys.sunset,
    }
}

pub fn to_location(response: &WeatherResponse) -> Location {
    Location {
        latitude: response.coord.lat,
        longitude: response.coord.lon,
        name: non_empty(&response.name),
        country: response.sys.country.as_deref().and_then(non_empty),
    }
}

/// Only the first (current) reading is used; an empty list maps to
/// [`AirQuality::default`].
pub fn to_air_quality(response: &AirQualityResponse) -> AirQuality {
    let Some(data) = response.list.first() else {
        tracing::debug!("Air pollution response had no readings, using defaults");
        return AirQuality::default();
    };

    let c = &data.components;
    AirQuality {
        aqi: data.main.aqi,
        pm25: c.pm25,
        pm10: c.pm10,
        no2: c.no2,
        o3: c.o3,
        co: c.co,
        so2: c.so2,
        nh3: c.nh3,
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{
        AirComponents, AirMain, AirQualityData, CloudsInfo, Coordinates, MainInfo, SysInfo,
        WeatherInfo, WindInfo,
    };

    fn weather_response() -> WeatherResponse {
        WeatherResponse {
            coord: Coordinates {
                lat: 50.06,
                lon: 19.94,
            },
            weather: vec![WeatherInfo {
                id: 500,
                main: "Rain".to_string(),
                description: "słabe opady deszczu".to_string(),
                icon: "10d".to_string(),
            }],
            main: MainInfo {
                temp: 12.3,
                feels_like: 11.1,
                pressure: 1008,
                humidity: 87,
                temp_min: 11.0,
                temp_max: 13.5,
            },
            visibility: 8000,
            wind: WindInfo {
                speed: 4.1,
                deg: Some(190),
            },
            clouds: CloudsInfo { all: 90 },
            sys: SysInfo {
                country: Some("PL".to_string()),
                sunrise: 1_710_476_000,
                sunset: 1_710_519_000,
            },
            name: "Kraków".to_string(),
            cod: 200,
        }
    }

    #[test]
    fn test_to_weather_maps_fields() {
        let weather = to_weather(&weather_response());
        assert_eq!(weather.temperature, 12.3);
        assert_eq!(weather.feels_like, 11.1);
        assert_eq!(weather.humidity, 87);
        assert_eq!(weather.pressure, 1008);
        assert_eq!(weather.wind_direction, 190);
        assert_eq!(weather.description, "Słabe opady deszczu");
        assert_eq!(weather.icon, "10d");
        assert_eq!(weather.clouds, 90);
        assert_eq!(weather.visibility, 8000);
        assert_eq!(weather.sunset, 1_710_519_000);
    }

    #[test]
    fn test_missing_wind_direction_defaults_to_zero() {
        let mut response = weather_response();
        response.wind.deg = None;
        assert_eq!(to_weather(&response).wind_direction, 0);
    }

    #[test]
    fn test_missing_condition_uses_fallbacks() {
        let mut response = weather_response();
        response.weather.clear();
        let weather = to_weather(&response);
        assert_eq!(weather.description, "");
        assert_eq!(weather.icon, FALLBACK_ICON);
    }

    #[test]
    fn test_to_location() {
        let location = to_location(&weather_response());
        assert_eq!(location.latitude, 50.06);
        assert_eq!(location.longitude, 19.94);
        assert_eq!(location.name.as_deref(), Some("Kraków"));
        assert_eq!(location.country.as_deref(), Some("PL"));
    }

    #[test]
    fn test_to_location_blank_name_is_none() {
        let mut response = weather_response();
        response.name = String::new();
        response.sys.country = None;
        let location = to_location(&response);
        assert!(location.name.is_none());
        assert!(location.country.is_none());
    }

    #[test]
    fn test_empty_air_list_is_good_and_zero() {
        let response = AirQualityResponse {
            coord: Coordinates { lat: 0.0, lon: 0.0 },
            list: vec![],
        };
        let aq = to_air_quality(&response);
        assert_eq!(
            aq,
            AirQuality {
                aqi: 1,
                pm25: 0.0,
                pm10: 0.0,
                no2: 0.0,
                o3: 0.0,
                co: 0.0,
                so2: 0.0,
                nh3: 0.0,
            }
        );
    }

    #[test]
    fn test_only_first_air_reading_is_used() {
        let reading = |aqi, pm25| AirQualityData {
            main: AirMain { aqi },
            components: AirComponents {
                co: 210.0,
                no: 0.1,
                no2: 5.0,
                o3: 40.0,
                so2: 1.5,
                pm25,
                pm10: 9.0,
                nh3: 0.4,
            },
            dt: 1_710_513_000,
        };
        let response = AirQualityResponse {
            coord: Coordinates {
                lat: 50.06,
                lon: 19.94,
            },
            list: vec![reading(2, 7.5), reading(5, 300.0)],
        };

        let aq = to_air_quality(&response);
        assert_eq!(aq.aqi, 2);
        assert_eq!(aq.pm25, 7.5);
        assert_eq!(aq.co, 210.0);
        assert_eq!(aq.nh3, 0.4);
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("clear sky"), "Clear sky");
        assert_eq!(capitalize_first("ósmy"), "Ósmy");
        assert_eq!(capitalize_first(""), "");
    }
}
