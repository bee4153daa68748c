//! SQLite-based measurement storage.
//!
//! This module provides `SqliteMeasurementStore`, the local implementation of
//! [`MeasurementBackend`]. One table, one row per saved measurement.

use std::path::Path;

use envirosense_core::RusqliteErrorExt;
use rusqlite::{params, Connection, Row};

use crate::measurement_backend::{AverageField, BackendResult, MeasurementBackend};
use crate::record::MeasurementRecord;

const SELECT_COLUMNS: &str = "SELECT id, timestamp, latitude, longitude, location_name, country,
        temperature, feels_like, humidity, pressure, wind_speed, wind_direction,
        weather_description, weather_icon, clouds, visibility, sunrise, sunset,
        aqi, pm25, pm10, no2, o3, co, so2, nh3
     FROM measurements";

/// SQLite-based measurement storage.
pub struct SqliteMeasurementStore {
    conn: Connection,
}

impl SqliteMeasurementStore {
    /// Open (or create) the store at the given path.
    ///
    /// Creates parent directories, the database file and the schema as needed.
    pub fn open<P: AsRef<Path>>(path: P) -> BackendResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                envirosense_core::DatabaseError::ConnectionFailed(format!(
                    "cannot create {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let conn = Connection::open(path).map_err(|e| e.into_database_error())?;
        let store = Self { conn };
        store.init_schema()?;
        tracing::debug!("Opened measurement store at {}", path.display());
        Ok(store)
    }

    /// Create an in-memory store (tests, throwaway sessions).
    pub fn open_in_memory() -> BackendResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| e.into_database_error())?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> BackendResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS measurements (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp INTEGER NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                location_name TEXT,
                country TEXT,
                temperature REAL NOT NULL,
                feels_like REAL NOT NULL,
                humidity INTEGER NOT NULL,
                pressure INTEGER NOT NULL,
                wind_speed REAL NOT NULL,
                wind_direction INTEGER NOT NULL,
                weather_description TEXT NOT NULL,
                weather_icon TEXT NOT NULL,
                clouds INTEGER NOT NULL,
                visibility INTEGER NOT NULL,
                sunrise INTEGER NOT NULL,
                sunset INTEGER NOT NULL,
                aqi INTEGER NOT NULL,
                pm25 REAL NOT NULL,
                pm10 REAL NOT NULL,
                no2 REAL NOT NULL,
                o3 REAL NOT NULL,
                co REAL NOT NULL,
                so2 REAL NOT NULL,
                nh3 REAL NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_measurements_timestamp ON measurements(timestamp DESC);
            "#,
        )?;
        Ok(())
    }

    fn row_to_record(row: &Row) -> rusqlite::Result<MeasurementRecord> {
        Ok(MeasurementRecord {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            latitude: row.get(2)?,
            longitude: row.get(3)?,
            location_name: row.get(4)?,
            country: row.get(5)?,
            temperature: row.get(6)?,
            feels_like: row.get(7)?,
            humidity: row.get(8)?,
            pressure: row.get(9)?,
            wind_speed: row.get(10)?,
            wind_direction: row.get(11)?,
            weather_description: row.get(12)?,
            weather_icon: row.get(13)?,
            clouds: row.get(14)?,
            visibility: row.get(15)?,
            sunrise: row.get(16)?,
            sunset: row.get(17)?,
            aqi: row.get(18)?,
            pm25: row.get(19)?,
            pm10: row.get(20)?,
            no2: row.get(21)?,
            o3: row.get(22)?,
            co: row.get(23)?,
            so2: row.get(24)?,
            nh3: row.get(25)?,
        })
    }

    fn query_records<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> BackendResult<Vec<MeasurementRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, Self::row_to_record)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

impl MeasurementBackend for SqliteMeasurementStore {
    fn insert_or_replace(&self, record: &MeasurementRecord) -> BackendResult<i64> {
        // NULL id lets SQLite assign the next one.
        let id = (record.id != 0).then_some(record.id);

        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO measurements (
                id, timestamp, latitude, longitude, location_name, country,
                temperature, feels_like, humidity, pressure, wind_speed, wind_direction,
                weather_description, weather_icon, clouds, visibility, sunrise, sunset,
                aqi, pm25, pm10, no2, o3, co, so2, nh3
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26
            )
            "#,
            params![
                id,
                record.timestamp,
                record.latitude,
                record.longitude,
                record.location_name,
                record.country,
                record.temperature,
                record.feels_like,
                record.humidity,
                record.pressure,
                record.wind_speed,
                record.wind_direction,
                record.weather_description,
                record.weather_icon,
                record.clouds,
                record.visibility,
                record.sunrise,
                record.sunset,
                record.aqi,
                record.pm25,
                record.pm10,
                record.no2,
                record.o3,
                record.co,
                record.so2,
                record.nh3,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!("Stored measurement with ID: {}", id);
        Ok(id)
    }

    fn get(&self, id: i64) -> BackendResult<Option<MeasurementRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        Ok(self.query_records(&sql, params![id])?.into_iter().next())
    }

    fn list_all(&self) -> BackendResult<Vec<MeasurementRecord>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY timestamp DESC, id DESC");
        self.query_records(&sql, [])
    }

    fn list_recent(&self, limit: usize) -> BackendResult<Vec<MeasurementRecord>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY timestamp DESC, id DESC LIMIT ?1");
        self.query_records(&sql, params![sql_limit(limit)])
    }

    fn list_between(&self, start: i64, end: i64) -> BackendResult<Vec<MeasurementRecord>> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE timestamp BETWEEN ?1 AND ?2 ORDER BY timestamp DESC, id DESC"
        );
        self.query_records(&sql, params![start, end])
    }

    fn delete(&self, id: i64) -> BackendResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM measurements WHERE id = ?1", params![id])?;
        tracing::debug!("Deleted measurement {} ({} row(s))", id, removed);
        Ok(removed)
    }

    fn delete_all(&self) -> BackendResult<usize> {
        let removed = self.conn.execute("DELETE FROM measurements", [])?;
        tracing::debug!("Deleted all measurements ({} row(s))", removed);
        Ok(removed)
    }

    fn count(&self) -> BackendResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM measurements", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn average(&self, field: AverageField, limit: usize) -> BackendResult<Option<f64>> {
        let column = field.column();
        let sql = format!(
            "SELECT AVG({column}) FROM (
                SELECT {column} FROM measurements ORDER BY timestamp DESC, id DESC LIMIT ?1
            )"
        );
        let avg: Option<f64> = self
            .conn
            .query_row(&sql, params![sql_limit(limit)], |row| row.get(0))?;
        Ok(avg)
    }
}
