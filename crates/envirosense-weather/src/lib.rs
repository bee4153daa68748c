//! Weather and air-quality data for EnviroSense.
//!
//! Domain model, OpenWeatherMap client and the mapping between the two.

pub mod client;
pub mod dto;
pub mod location;
pub mod mapper;
pub mod types;

pub use client::OpenWeatherClient;
pub use dto::{AirQualityResponse, WeatherResponse};
pub use location::{locate_with_timeout, FixedLocationProvider, LocationProvider};
pub use types::*;
