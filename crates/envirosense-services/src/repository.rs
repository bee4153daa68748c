//! Single entry point for environmental data.
//!
//! `EnviroRepository` joins the remote API and the local store. Remote calls
//! are never cached and never retried; saved measurements only come from an
//! explicit [`EnviroRepository::save_measurement`].

use envirosense_core::{AppError, AppResult};
use envirosense_weather::mapper::{to_air_quality, to_location, to_weather};
use envirosense_weather::{AirQuality, Location, Measurement, OpenWeatherClient, Weather};
use tracing::instrument;

use crate::local_store::{LocalStore, RecordFeed};
use crate::measurement_backend::AverageField;
use crate::record::MeasurementRecord;

pub struct EnviroRepository {
    api: OpenWeatherClient,
    store: LocalStore,
}

impl EnviroRepository {
    pub fn new(api: OpenWeatherClient, store: LocalStore) -> Self {
        Self { api, store }
    }

    /// Current weather plus the location the API resolved the coordinate to.
    #[instrument(skip(self))]
    pub async fn fetch_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<(Weather, Location)> {
        let response = self
            .api
            .fetch_weather(latitude, longitude)
            .await
            .map_err(AppError::from)?;
        Ok((to_weather(&response), to_location(&response)))
    }

    #[instrument(skip(self))]
    pub async fn fetch_air_quality(&self, latitude: f64, longitude: f64) -> AppResult<AirQuality> {
        let response = self
            .api
            .fetch_air_quality(latitude, longitude)
            .await
            .map_err(AppError::from)?;
        Ok(to_air_quality(&response))
    }

    /// Weather, then air quality, joined into an unsaved [`Measurement`].
    ///
    /// The calls run one after the other. If weather fails, air quality is
    /// never requested; if air quality fails, the weather result is dropped.
    pub async fn fetch_environment_data(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<Measurement> {
        let (weather, location) = self.fetch_weather(latitude, longitude).await?;
        let air_quality = self.fetch_air_quality(latitude, longitude).await?;

        let measurement = Measurement::capture(location, weather, air_quality);
        tracing::info!(
            "Fetched environment data for {} (AQI {})",
            measurement.location.display_name(),
            measurement.air_quality.aqi
        );
        Ok(measurement)
    }

    pub fn get_all_measurements(&self) -> MeasurementFeed {
        MeasurementFeed(self.store.watch_all())
    }

    pub fn get_recent_measurements(&self, limit: usize) -> MeasurementFeed {
        MeasurementFeed(self.store.watch_recent(limit))
    }

    /// Measurements taken between `start` and `end` (epoch millis, inclusive).
    pub fn get_measurements_between(&self, start: i64, end: i64) -> MeasurementFeed {
        MeasurementFeed(self.store.watch_between(start, end))
    }

    pub async fn get_measurement_by_id(&self, id: i64) -> AppResult<Option<Measurement>> {
        Ok(self.store.get(id).await?.map(Measurement::from))
    }

    /// Persist `measurement`, returning its id.
    ///
    /// An unsaved measurement (id 0) gets a new id; a saved one overwrites
    /// the row with the same id.
    pub async fn save_measurement(&self, measurement: &Measurement) -> AppResult<i64> {
        let id = self
            .store
            .insert_or_replace(MeasurementRecord::from(measurement))
            .await?;
        tracing::info!("Saved measurement {}", id);
        Ok(id)
    }

    pub async fn delete_measurement(&self, measurement: &Measurement) -> AppResult<()> {
        self.delete_measurement_by_id(measurement.id).await
    }

    /// Deleting an id that does not exist is not an error.
    pub async fn delete_measurement_by_id(&self, id: i64) -> AppResult<()> {
        let removed = self.store.delete(id).await?;
        if removed == 0 {
            tracing::debug!("No measurement with id {} to delete", id);
        }
        Ok(())
    }

    pub async fn delete_all_measurements(&self) -> AppResult<()> {
        let removed = self.store.delete_all().await?;
        tracing::info!("Cleared {} measurement(s)", removed);
        Ok(())
    }

    pub async fn get_measurement_count(&self) -> AppResult<usize> {
        self.store.count().await
    }

    /// Mean temperature of the `limit` newest measurements.
    pub async fn average_temperature(&self, limit: usize) -> AppResult<Option<f64>> {
        self.store.average(AverageField::Temperature, limit).await
    }

    /// Mean upstream AQI (1-5) of the `limit` newest measurements.
    pub async fn average_aqi(&self, limit: usize) -> AppResult<Option<f64>> {
        self.store.average(AverageField::Aqi, limit).await
    }
}

/// [`RecordFeed`] projected onto the domain model.
pub struct MeasurementFeed(RecordFeed);

impl MeasurementFeed {
    /// Next snapshot, in store order. `None` once the store is gone.
    pub async fn next(&mut self) -> Option<AppResult<Vec<Measurement>>> {
        let snapshot = self.0.next().await?;
        Some(snapshot.map(|records| records.into_iter().map(Measurement::from).collect()))
    }
}
