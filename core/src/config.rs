use crate::{
    record::RegionObservation,
    stats::{MomentsTable, StatisticsSource},
    types::Year,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SIMULATION_YEAR: Year = 2024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AfiConfig {
    pub statistics:      StatisticsSource,
    #[serde(default = "default_simulation_year")]
    pub simulation_year: Year,
    /// Relative to the data directory.
    #[serde(default = "default_model_file")]
    pub model_file:      String,
    /// Relative to the data directory.
    #[serde(default = "default_regions_file")]
    pub regions_file:    String,
}

fn default_simulation_year() -> Year {
    DEFAULT_SIMULATION_YEAR
}

fn default_model_file() -> String {
    "model/linear_model.json".into()
}

fn default_regions_file() -> String {
    "regions/regions.json".into()
}

#[derive(Debug, Clone, Deserialize)]
struct RegionsFile {
    observations: Vec<RegionObservation>,
}

impl AfiConfig {
    /// Load from the data/ directory.
    /// In tests, use AfiConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/afi_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: AfiConfig = serde_json::from_str(&content)?;
        log::debug!("loaded config from {path}: {:?}", config.statistics);
        Ok(config)
    }

    pub fn model_path(&self, data_dir: &str) -> String {
        format!("{data_dir}/{}", self.model_file)
    }

    /// Read the observation rows shipped alongside the config.
    pub fn load_observations(&self, data_dir: &str) -> anyhow::Result<Vec<RegionObservation>> {
        let path = format!("{data_dir}/{}", self.regions_file);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: RegionsFile = serde_json::from_str(&content)?;
        Ok(file.observations)
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            statistics: StatisticsSource::Fixed {
                label:   "published".into(),
                moments: MomentsTable::PUBLISHED,
            },
            simulation_year: DEFAULT_SIMULATION_YEAR,
            model_file:      default_model_file(),
            regions_file:    default_regions_file(),
        }
    }
}
