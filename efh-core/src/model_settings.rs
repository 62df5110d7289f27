//! Model selection defaults and per-model metadata.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default model selection shipped with the hub (`settings_model_selection.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSelection {
    /// Models making up the hub ensemble, offered as a legend preset.
    #[serde(default)]
    pub ensemble_model_names: Vec<String>,
    /// Models visible before the user changes anything.
    #[serde(default)]
    pub default_model_names: Vec<String>,
}

impl ModelSelection {
    pub fn parse_json(json_data: &str) -> Result<ModelSelection> {
        Ok(serde_json::from_str(json_data)?)
    }
}

/// Descriptive metadata of a model, shown next to legend entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelMetadata {
    pub id: String,
    pub team: String,
    pub contributors: String,
    pub model: String,
    pub description_short: String,
    pub description: String,
    pub website: String,
}

#[derive(Debug, Deserialize)]
struct RawModelMetadata {
    #[serde(default)]
    team_name: String,
    #[serde(default)]
    model_name: String,
    model_abbr: String,
    #[serde(default)]
    model_contributors: String,
    #[serde(default)]
    website_url: String,
    #[serde(default)]
    methods_long: String,
    #[serde(default)]
    methods: String,
}

impl From<RawModelMetadata> for ModelMetadata {
    fn from(raw: RawModelMetadata) -> Self {
        ModelMetadata {
            id: raw.model_abbr,
            team: raw.team_name,
            contributors: raw.model_contributors,
            model: raw.model_name,
            description_short: raw.methods,
            description: raw.methods_long,
            website: raw.website_url,
        }
    }
}

/// Parse the metadata dictionary keyed by model abbreviation.
pub fn parse_model_metadata(json_data: &str) -> Result<HashMap<String, ModelMetadata>> {
    let raw: HashMap<String, RawModelMetadata> = serde_json::from_str(json_data)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| (key, value.into()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_selection() {
        let json = r#"{"ensembleModelNames": ["EuroCOVIDhub-ensemble"],
                       "defaultModelNames": ["EuroCOVIDhub-ensemble", "ILM-EKF"]}"#;
        let selection = ModelSelection::parse_json(json).unwrap();
        assert_eq!(selection.ensemble_model_names, vec!["EuroCOVIDhub-ensemble"]);
        assert_eq!(selection.default_model_names.len(), 2);
    }

    #[test]
    fn test_parse_model_metadata() {
        let json = r#"{"ILM-EKF": {"team_name": "ILM", "model_name": "EKF", "model_abbr": "ILM-EKF",
                       "model_contributors": "A. Person", "website_url": "https://example.org",
                       "methods": "Kalman filter", "methods_long": "Extended Kalman filter"}}"#;
        let metadata = parse_model_metadata(json).unwrap();
        let ekf = &metadata["ILM-EKF"];
        assert_eq!(ekf.id, "ILM-EKF");
        assert_eq!(ekf.description_short, "Kalman filter");
    }
}
