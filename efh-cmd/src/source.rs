//! Loading of the dashboard sources from disk or over HTTP.

use crate::config::SourceConfig;
use efh_core::compression::decode_snapshot;
use efh_core::dataset::Dataset;
use efh_core::fetch::fetch_source;
use efh_core::forecast::{parse_forecast_csv, parse_forecast_json};
use efh_core::location::LocationLookup;
use efh_core::model_settings::{parse_model_metadata, ModelMetadata, ModelSelection};
use efh_core::truth::parse_truth_csv;
use log::info;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

/// Everything read from the sources, loaded once per run.
pub struct LoadedSources {
    pub dataset: Dataset,
    pub metadata: HashMap<String, ModelMetadata>,
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Forecast sources ending in `.json` (optionally `.json.gz`) are JSON.
fn is_json(location: &str) -> bool {
    let location = location.split('?').next().unwrap_or(location);
    let location = location.strip_suffix(".gz").unwrap_or(location);
    location.ends_with(".json")
}

/// Read one source as text, decompressing gzip snapshots.
pub async fn read_source(client: &Client, location: &str) -> anyhow::Result<String> {
    if is_remote(location) {
        return Ok(fetch_source(client, location).await?);
    }
    let bytes = tokio::fs::read(location)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", location, e))?;
    Ok(decode_snapshot(&bytes)?)
}

/// Fetch all sources concurrently and assemble the dataset.
pub async fn load_sources(config: &SourceConfig) -> anyhow::Result<LoadedSources> {
    let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

    let (forecasts, truth, locations, model_settings) = tokio::try_join!(
        read_source(&client, &config.forecasts),
        read_source(&client, &config.truth),
        read_source(&client, &config.locations),
        read_source(&client, &config.model_settings),
    )?;

    let records = if is_json(&config.forecasts) {
        parse_forecast_json(&forecasts)?
    } else {
        parse_forecast_csv(&forecasts)?
    };
    let truth = parse_truth_csv(&truth)?;
    let locations = LocationLookup::parse_location_csv(&locations)?;
    let model_selection = ModelSelection::parse_json(&model_settings)?;

    let metadata = match &config.metadata {
        Some(location) => parse_model_metadata(&read_source(&client, location).await?)?,
        None => HashMap::new(),
    };

    info!(
        "[EFH] sources: {} forecast records, {} truth locations, {} locations",
        records.len(),
        truth.len(),
        locations.items().len()
    );

    let dataset = Dataset::new(records, truth)
        .with_locations(locations)
        .with_model_selection(model_selection);
    Ok(LoadedSources { dataset, metadata })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_detection() {
        assert!(is_remote("https://example.org/forecasts_to_plot.csv"));
        assert!(!is_remote("data/forecasts_to_plot.csv"));
        assert!(is_json("forecasts_to_plot.json"));
        assert!(is_json("forecasts_to_plot.json.gz"));
        assert!(is_json("https://example.org/forecasts_to_plot.json?raw=true"));
        assert!(!is_json("forecasts_to_plot.csv.gz"));
    }

    #[tokio::test]
    async fn test_read_local_source() {
        let path = std::env::temp_dir().join(format!("efh-source-{}.csv", std::process::id()));
        std::fs::write(&path, "location,location_name,population\nDE,Germany,83166711\n").unwrap();
        let text = read_source(&Client::new(), path.to_str().unwrap()).await.unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(text.starts_with("location,"));

        let missing = read_source(&Client::new(), "/nonexistent/efh.csv").await;
        assert!(missing.is_err());
    }
}
