//! Class-index → label names, read from a model's `config.json`.
//!
//! Hugging Face exports store the mapping as `id2label`, an object keyed by
//! the stringified class index:
//!
//! ```json
//! { "id2label": { "0": "NEGATIVE", "1": "POSITIVE" } }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

#[derive(Deserialize)]
struct ModelConfig {
    #[serde(default)]
    id2label: HashMap<String, String>,
}

/// Label names indexed by class id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelMap {
    names: Vec<String>,
}

impl LabelMap {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the `id2label` map of a `config.json` document.
    ///
    /// Gaps in the index range are filled with `LABEL_<i>`.
    pub fn from_config_str(json: &str) -> anyhow::Result<Self> {
        let config: ModelConfig = serde_json::from_str(json).context("parse model config")?;

        let mut indexed = Vec::with_capacity(config.id2label.len());
        for (key, name) in config.id2label {
            let idx: usize = key
                .parse()
                .with_context(|| format!("id2label key '{key}' is not a class index"))?;
            indexed.push((idx, name));
        }

        let len = indexed.iter().map(|(i, _)| i + 1).max().unwrap_or(0);
        let mut names: Vec<String> = (0..len).map(placeholder).collect();
        for (idx, name) in indexed {
            names[idx] = name;
        }
        Ok(Self { names })
    }

    pub fn from_config_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        Self::from_config_str(&json)
    }

    /// Name of class `idx`, or `LABEL_<idx>` if the config does not list it.
    pub fn name(&self, idx: usize) -> String {
        self.names
            .get(idx)
            .cloned()
            .unwrap_or_else(|| placeholder(idx))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn placeholder(idx: usize) -> String {
    format!("LABEL_{idx}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sst2_config() {
        let json = r#"{
            "architectures": ["DistilBertForSequenceClassification"],
            "id2label": { "0": "NEGATIVE", "1": "POSITIVE" },
            "label2id": { "NEGATIVE": 0, "POSITIVE": 1 }
        }"#;
        let labels = LabelMap::from_config_str(json).unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.name(0), "NEGATIVE");
        assert_eq!(labels.name(1), "POSITIVE");
    }

    #[test]
    fn fills_gaps_and_out_of_range() {
        let labels = LabelMap::from_config_str(r#"{"id2label": {"2": "tabby"}}"#).unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.name(0), "LABEL_0");
        assert_eq!(labels.name(2), "tabby");
        assert_eq!(labels.name(7), "LABEL_7");
    }

    #[test]
    fn missing_id2label_is_empty() {
        let labels = LabelMap::from_config_str("{}").unwrap();
        assert!(labels.is_empty());
        assert_eq!(labels.name(0), "LABEL_0");
    }

    #[test]
    fn rejects_non_numeric_keys() {
        assert!(LabelMap::from_config_str(r#"{"id2label": {"x": "cat"}}"#).is_err());
    }
}
