//! Command handlers and terminal rendering.

use std::time::Duration;

use anyhow::Result;
use envirosense_core::{AppError, LocationError};
use envirosense_services::EnviroRepository;
use envirosense_weather::{locate_with_timeout, LocationProvider, Measurement};

/// How long to wait for a location fix.
const LOCATION_TIMEOUT: Duration = Duration::from_secs(15);

pub async fn fetch<P: LocationProvider>(
    repo: &EnviroRepository,
    provider: &P,
    save: bool,
) -> Result<()> {
    let coordinate = locate_with_timeout(provider, LOCATION_TIMEOUT)
        .await
        .map_err(AppError::from)?
        .ok_or(AppError::Location(LocationError::Unavailable))?;

    let measurement = repo
        .fetch_environment_data(coordinate.latitude, coordinate.longitude)
        .await?;
    print_measurement(&measurement);

    if save {
        let id = repo.save_measurement(&measurement).await?;
        println!("\nSaved as #{}", id);
    }
    Ok(())
}

pub async fn history(repo: &EnviroRepository, limit: Option<usize>) -> Result<()> {
    let mut feed = match limit {
        Some(limit) => repo.get_recent_measurements(limit),
        None => repo.get_all_measurements(),
    };

    let measurements = feed.next().await.transpose()?.unwrap_or_default();
    if measurements.is_empty() {
        println!("No saved measurements yet. Run `envirosense fetch --save` to add one.");
        return Ok(());
    }

    for m in &measurements {
        println!(
            "#{:<5} {}  {:<24} {:>6}  {} AQI {}",
            m.id,
            m.formatted_date_time(),
            m.location.display_name(),
            m.weather.formatted_temperature(),
            m.air_quality.level().emoji(),
            m.air_quality.aqi,
        );
    }
    Ok(())
}

pub async fn show(repo: &EnviroRepository, id: i64) -> Result<()> {
    let measurement = find(repo, id).await?;
    println!("#{}", measurement.id);
    print_measurement(&measurement);
    Ok(())
}

pub async fn delete(repo: &EnviroRepository, id: i64) -> Result<()> {
    repo.delete_measurement_by_id(id).await?;
    println!("Deleted measurement #{}", id);
    Ok(())
}

pub async fn clear(repo: &EnviroRepository) -> Result<()> {
    repo.delete_all_measurements().await?;
    println!("History cleared");
    Ok(())
}

pub async fn count(repo: &EnviroRepository) -> Result<()> {
    println!("{}", repo.get_measurement_count().await?);
    Ok(())
}

pub async fn stats(repo: &EnviroRepository, limit: usize) -> Result<()> {
    let total = repo.get_measurement_count().await?;
    println!("Saved measurements: {}", total);

    match repo.average_temperature(limit).await? {
        Some(avg) => println!("Average temperature (last {}): {:.1}°C", limit, avg),
        None => println!("Average temperature: n/a"),
    }
    match repo.average_aqi(limit).await? {
        Some(avg) => println!("Average AQI (last {}): {:.1}", limit, avg),
        None => println!("Average AQI: n/a"),
    }
    Ok(())
}

pub async fn share(repo: &EnviroRepository, id: i64) -> Result<()> {
    let measurement = find(repo, id).await?;
    println!("{}", measurement.share_text());
    Ok(())
}

async fn find(repo: &EnviroRepository, id: i64) -> Result<Measurement> {
    repo.get_measurement_by_id(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("No measurement with id {}", id))
}

fn print_measurement(m: &Measurement) {
    let w = &m.weather;
    let aq = &m.air_quality;
    let level = aq.level();

    println!("{}  ({})", m.location.display_name(), m.location.coordinates_string());
    println!("{}", m.formatted_date_time());
    println!();
    println!(
        "  {}  {} (feels like {})",
        w.description,
        w.formatted_temperature(),
        w.formatted_feels_like()
    );
    println!(
        "  Humidity {}  Pressure {}  Wind {} from {}°",
        w.formatted_humidity(),
        w.formatted_pressure(),
        w.formatted_wind_speed(),
        w.wind_direction
    );
    println!("  Clouds {}%  Visibility {} m", w.clouds, w.visibility);
    println!();
    println!(
        "  {} {} (AQI {}, ~{} on the 0-500 scale)",
        level.emoji(),
        level.label(),
        aq.aqi,
        aq.aqi_value()
    );
    println!("  {}", level.description());
    println!("  PM2.5 {}  PM10 {}", aq.formatted_pm25(), aq.formatted_pm10());
    println!(
        "  NO₂ {:.1}  O₃ {:.1}  CO {:.1}  SO₂ {:.1}  NH₃ {:.1} µg/m³",
        aq.no2, aq.o3, aq.co, aq.so2, aq.nh3
    );
}
