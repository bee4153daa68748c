use chrono::{DateTime, Local, TimeZone, Utc};
use envirosense_core::AppError;
use serde::{Deserialize, Serialize};

/// A bare latitude/longitude pair, as produced by a location provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude within -90..=90 and longitude within -180..=180.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Geographic location of a measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
    /// ISO country code
    pub country: Option<String>,
}

impl Location {
    /// "City, CC", "City", or the coordinates when the place is unnamed.
    pub fn display_name(&self) -> String {
        match (&self.name, &self.country) {
            (Some(name), Some(country)) => format!("{}, {}", name, country),
            (Some(name), None) => name.clone(),
            _ => self.coordinates_string(),
        }
    }

    pub fn coordinates_string(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Current weather conditions, metric units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    /// °C
    pub temperature: f64,
    /// °C
    pub feels_like: f64,
    /// %
    pub humidity: i32,
    /// hPa
    pub pressure: i32,
    /// m/s
    pub wind_speed: f64,
    /// Degrees, 0 when the API omits it
    pub wind_direction: i32,
    pub description: String,
    /// OpenWeatherMap icon code, e.g. "01d"
    pub icon: String,
    /// %
    pub clouds: i32,
    /// Meters
    pub visibility: i32,
    /// Unix seconds
    pub sunrise: i64,
    /// Unix seconds
    pub sunset: i64,
}

impl Weather {
    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon)
    }

    pub fn formatted_temperature(&self) -> String {
        format!("{}°C", self.temperature as i64)
    }

    pub fn formatted_feels_like(&self) -> String {
        format!("{}°C", self.feels_like as i64)
    }

    pub fn formatted_wind_speed(&self) -> String {
        format!("{} m/s", self.wind_speed as i64)
    }

    pub fn formatted_humidity(&self) -> String {
        format!("{}%", self.humidity)
    }

    pub fn formatted_pressure(&self) -> String {
        format!("{} hPa", self.pressure)
    }
}

/// Severity bands of the upstream 1-5 air quality index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiLevel {
    Good,
    Fair,
    Moderate,
    Poor,
    VeryPoor,
}

impl AqiLevel {
    /// Map the categorical index; anything outside 1..=4 is treated as the worst band.
    pub fn from_aqi(aqi: i32) -> Self {
        match aqi {
            1 => Self::Good,
            2 => Self::Fair,
            3 => Self::Moderate,
            4 => Self::Poor,
            _ => Self::VeryPoor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Moderate => "Moderate",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Good => "Air quality is good. Ideal conditions for outdoor activity.",
            Self::Fair => "Air quality is acceptable. Sensitive people may feel discomfort.",
            Self::Moderate => "Air quality may affect sensitive people.",
            Self::Poor => "Air quality is poor. Limit outdoor activity.",
            Self::VeryPoor => "Air quality is very poor. Avoid staying outdoors.",
        }
    }

    /// Indicator colour as 0xAARRGGBB
    pub fn color_argb(&self) -> u32 {
        match self {
            Self::Good => 0xFF4C_AF50,
            Self::Fair => 0xFF8B_C34A,
            Self::Moderate => 0xFFFF_EB3B,
            Self::Poor => 0xFFFF_9800,
            Self::VeryPoor => 0xFFF4_4336,
        }
    }

    /// Colour as a CSS-style "#RRGGBB" string
    pub fn color_hex(&self) -> String {
        format!("#{:06X}", self.color_argb() & 0x00FF_FFFF)
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Good => "🟢",
            Self::Fair => "🟡",
            Self::Moderate => "🟠",
            Self::Poor => "🔴",
            Self::VeryPoor => "🟣",
        }
    }
}

/// Air pollution reading; concentrations in µg/m³
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQuality {
    /// Upstream categorical index, 1 (good) to 5 (very poor)
    pub aqi: i32,
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub o3: f64,
    pub co: f64,
    pub so2: f64,
    pub nh3: f64,
}

impl Default for AirQuality {
    /// "Good" with every pollutant at zero. Used when the API returns no reading.
    fn default() -> Self {
        Self {
            aqi: 1,
            pm25: 0.0,
            pm10: 0.0,
            no2: 0.0,
            o3: 0.0,
            co: 0.0,
            so2: 0.0,
            nh3: 0.0,
        }
    }
}

impl AirQuality {
    pub fn level(&self) -> AqiLevel {
        AqiLevel::from_aqi(self.aqi)
    }

    /// Approximate 0-500 index derived from PM2.5 alone.
    ///
    /// Linear interpolation between breakpoints, truncated toward zero. This
    /// is display-only and unrelated to the upstream `aqi` field.
    pub fn aqi_value(&self) -> i32 {
        let pm = self.pm25;
        let value = if pm <= 12.0 {
            pm / 12.0 * 50.0
        } else if pm <= 35.4 {
            50.0 + (pm - 12.1) / 23.3 * 50.0
        } else if pm <= 55.4 {
            100.0 + (pm - 35.5) / 19.9 * 50.0
        } else if pm <= 150.4 {
            150.0 + (pm - 55.5) / 94.9 * 50.0
        } else if pm <= 250.4 {
            200.0 + (pm - 150.5) / 99.9 * 100.0
        } else {
            300.0 + (pm - 250.5) / 249.5 * 200.0
        };
        (value as i32).min(500)
    }

    pub fn formatted_pm25(&self) -> String {
        format!("{:.1} µg/m³", self.pm25)
    }

    pub fn formatted_pm10(&self) -> String {
        format!("{:.1} µg/m³", self.pm10)
    }
}

/// One complete environmental snapshot.
///
/// `id` is 0 until the measurement has been saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: i64,
    /// Capture time, Unix millis
    pub timestamp: i64,
    pub location: Location,
    pub weather: Weather,
    pub air_quality: AirQuality,
}

impl Measurement {
    /// Build an unsaved measurement captured now.
    pub fn capture(location: Location, weather: Weather, air_quality: AirQuality) -> Self {
        Self {
            id: 0,
            timestamp: Utc::now().timestamp_millis(),
            location,
            weather,
            air_quality,
        }
    }

    /// Same measurement under a different id.
    pub fn with_id(self, id: i64) -> Self {
        Self { id, ..self }
    }

    pub fn is_saved(&self) -> bool {
        self.id != 0
    }

    fn captured_at<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        DateTime::<Utc>::from_timestamp_millis(self.timestamp).map(|dt| dt.with_timezone(tz))
    }

    fn format_in<Tz: TimeZone>(&self, tz: &Tz, pattern: &str) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        self.captured_at(tz)
            .map(|dt| dt.format(pattern).to_string())
            .unwrap_or_default()
    }

    /// "dd.MM.yyyy" in the given zone
    pub fn formatted_date_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        self.format_in(tz, "%d.%m.%Y")
    }

    /// "HH:mm" in the given zone
    pub fn formatted_time_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        self.format_in(tz, "%H:%M")
    }

    pub fn formatted_date_time_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        self.format_in(tz, "%d.%m.%Y, %H:%M")
    }

    pub fn formatted_date(&self) -> String {
        self.formatted_date_in(&Local)
    }

    pub fn formatted_time(&self) -> String {
        self.formatted_time_in(&Local)
    }

    pub fn formatted_date_time(&self) -> String {
        self.formatted_date_time_in(&Local)
    }

    /// Plain-text summary for sharing, with times in the given zone.
    pub fn share_text_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let level = self.air_quality.level();
        [
            "📍 EnviroSense - Environmental measurement".to_string(),
            String::new(),
            format!("📅 Date: {}", self.formatted_date_time_in(tz)),
            format!("📍 Location: {}", self.location.display_name()),
            String::new(),
            "🌡️ WEATHER:".to_string(),
            format!("• Temperature: {}", self.weather.formatted_temperature()),
            format!("• Humidity: {}", self.weather.formatted_humidity()),
            format!("• Wind: {}", self.weather.formatted_wind_speed()),
            format!("• Pressure: {}", self.weather.formatted_pressure()),
            format!("• {}", self.weather.description),
            String::new(),
            "💨 AIR QUALITY:".to_string(),
            format!("• AQI: {} - {}", self.air_quality.aqi, level.label()),
            format!("• PM2.5: {}", self.air_quality.formatted_pm25()),
            format!("• PM10: {}", self.air_quality.formatted_pm10()),
            String::new(),
            level.description().to_string(),
        ]
        .join("\n")
    }

    pub fn share_text(&self) -> String {
        self.share_text_in(&Local)
    }
}

/// Weather API client errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("No API key configured")]
    MissingApiKey,
}

impl From<reqwest::Error> for WeatherError {
    /// The request URL carries the API key, so it is dropped from the error.
    fn from(e: reqwest::Error) -> Self {
        WeatherError::Network(e.without_url())
    }
}

impl From<WeatherError> for AppError {
    fn from(e: WeatherError) -> Self {
        AppError::remote(e.to_string())
    }
}
