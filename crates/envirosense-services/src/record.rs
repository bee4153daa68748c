//! Flat, table-shaped form of a [`Measurement`].

use envirosense_weather::{AirQuality, Location, Measurement, Weather};

/// One row of the `measurements` table.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    /// 0 for a row that has not been inserted yet
    pub id: i64,
    pub timestamp: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: Option<String>,
    pub country: Option<String>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: i32,
    pub pressure: i32,
    pub wind_speed: f64,
    pub wind_direction: i32,
    pub weather_description: String,
    pub weather_icon: String,
    pub clouds: i32,
    pub visibility: i32,
    pub sunrise: i64,
    pub sunset: i64,
    pub aqi: i32,
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub o3: f64,
    pub co: f64,
    pub so2: f64,
    pub nh3: f64,
}

impl MeasurementRecord {
    pub fn from_measurement(m: &Measurement) -> Self {
        Self {
            id: m.id,
            timestamp: m.timestamp,
            latitude: m.location.latitude,
            longitude: m.location.longitude,
            location_name: m.location.name.clone(),
            country: m.location.country.clone(),
            temperature: m.weather.temperature,
            feels_like: m.weather.feels_like,
            humidity: m.weather.humidity,
            pressure: m.weather.pressure,
            wind_speed: m.weather.wind_speed,
            wind_direction: m.weather.wind_direction,
            weather_description: m.weather.description.clone(),
            weather_icon: m.weather.icon.clone(),
            clouds: m.weather.clouds,
            visibility: m.weather.visibility,
            sunrise: m.weather.sunrise,
            sunset: m.weather.sunset,
            aqi: m.air_quality.aqi,
            pm25: m.air_quality.pm25,
            pm10: m.air_quality.pm10,
            no2: m.air_quality.no2,
            o3: m.air_quality.o3,
            co: m.air_quality.co,
            so2: m.air_quality.so2,
            nh3: m.air_quality.nh3,
        }
    }

    pub fn into_measurement(self) -> Measurement {
        Measurement {
            id: self.id,
            timestamp: self.timestamp,
            location: Location {
                latitude: self.latitude,
                longitude: self.longitude,
                name: self.location_name,
                country: self.country,
            },
            weather: Weather {
                temperature: self.temperature,
                feels_like: self.feels_like,
                humidity: self.humidity,
                pressure: self.pressure,
                wind_speed: self.wind_speed,
                wind_direction: self.wind_direction,
                description: self.weather_description,
                icon: self.weather_icon,
                clouds: self.clouds,
                visibility: self.visibility,
                sunrise: self.sunrise,
                sunset: self.sunset,
            },
            air_quality: AirQuality {
                aqi: self.aqi,
                pm25: self.pm25,
                pm10: self.pm10,
                no2: self.no2,
                o3: self.o3,
                co: self.co,
                so2: self.so2,
                nh3: self.nh3,
            },
        }
    }
}

impl From<&Measurement> for MeasurementRecord {
    fn from(m: &Measurement) -> Self {
        Self::from_measurement(m)
    }
}

impl From<MeasurementRecord> for Measurement {
    fn from(record: MeasurementRecord) -> Self {
        record.into_measurement()
    }
}
