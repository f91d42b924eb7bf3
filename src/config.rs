//! City generation configuration
//!
//! Field names serialize in camelCase, so a JSON file such as
//! `{"terrain": {"probabilityOfRiver": 1.0}, "roadNetwork": {"maxRoadAngle": 0.4}}`
//! loads directly. Missing keys take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::erosion::ErosionParams;
use crate::error::{CityError, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TerrainConfig {
    /// Terrain width in blocks
    pub column_count: usize,
    /// Terrain depth in blocks
    pub row_count: usize,
    /// Initial random displacement of the diamond-square fractal
    pub height_jitter: f32,
    /// Multiplier applied to the jitter at each fractal level
    pub height_jitter_decay: f32,
    pub hill_count: usize,
    pub max_hill_height: f32,
    pub probability_of_river: f32,
    pub erosion: ErosionParams,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            column_count: 64,
            row_count: 64,
            height_jitter: 20.0,
            height_jitter_decay: 0.65,
            hill_count: 10,
            max_hill_height: 20.0,
            probability_of_river: 0.5,
            erosion: ErosionParams::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NeighborhoodConfig {
    pub count: usize,
    /// Width of one neighborhood's street grid, in blocks
    pub column_count: usize,
    /// Depth of one neighborhood's street grid, in blocks
    pub row_count: usize,
    /// Closest two neighborhood centers may be, in blocks
    pub min_distance_between: f32,
}

impl NeighborhoodConfig {
    /// Half the larger neighborhood dimension; where branching and zoning probability reach zero.
    pub fn half_extent(&self) -> f32 {
        self.column_count.max(self.row_count) as f32 / 2.0
    }
}

impl Default for NeighborhoodConfig {
    fn default() -> Self {
        Self {
            count: 8,
            column_count: 16,
            row_count: 16,
            min_distance_between: 8.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoadNetworkConfig {
    pub is_present: bool,
    /// Steepest road segment allowed, in radians
    pub max_road_angle: f32,
    /// Radius around a neighborhood center where every branch is built
    pub safe_from_decay_blocks: f32,
}

impl Default for RoadNetworkConfig {
    fn default() -> Self {
        Self {
            is_present: true,
            max_road_angle: std::f32::consts::PI / 6.0,
            safe_from_decay_blocks: 4.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZonedBlockConfig {
    pub is_present: bool,
    /// Distance from the nearest neighborhood center where build probability starts to fall
    pub block_distance_decay_begins: f32,
    pub max_building_stories: u32,
}

impl Default for ZonedBlockConfig {
    fn default() -> Self {
        Self {
            is_present: true,
            block_distance_decay_begins: 4.0,
            max_building_stories: 40,
        }
    }
}

/// Everything needed to generate one city.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CityConfig {
    pub terrain: TerrainConfig,
    pub neighborhoods: NeighborhoodConfig,
    pub road_network: RoadNetworkConfig,
    pub zoned_blocks: ZonedBlockConfig,
}

impl CityConfig {
    /// Load a configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: CityConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value is inside the range the generators can work with.
    pub fn validate(&self) -> Result<()> {
        let terrain = &self.terrain;
        if terrain.column_count < 4 || terrain.row_count < 4 {
            return invalid(format!(
                "terrain must be at least 4x4 blocks, got {}x{}",
                terrain.column_count, terrain.row_count
            ));
        }
        if !(terrain.height_jitter >= 0.0) {
            return invalid(format!("heightJitter must be non-negative, got {}", terrain.height_jitter));
        }
        if !(terrain.height_jitter_decay > 0.0 && terrain.height_jitter_decay <= 1.0) {
            return invalid(format!(
                "heightJitterDecay must be in (0, 1], got {}",
                terrain.height_jitter_decay
            ));
        }
        if !(terrain.max_hill_height >= 0.0) {
            return invalid(format!("maxHillHeight must be non-negative, got {}", terrain.max_hill_height));
        }
        check_probability("probabilityOfRiver", terrain.probability_of_river)?;

        let neighborhoods = &self.neighborhoods;
        if neighborhoods.column_count == 0 || neighborhoods.row_count == 0 {
            return invalid("neighborhood extent must be at least 1x1 block".to_string());
        }
        if !(neighborhoods.min_distance_between >= 0.0) {
            return invalid(format!(
                "minDistanceBetween must be non-negative, got {}",
                neighborhoods.min_distance_between
            ));
        }

        let roads = &self.road_network;
        if !(roads.max_road_angle >= 0.0 && roads.max_road_angle <= std::f32::consts::PI) {
            return invalid(format!("maxRoadAngle must be in [0, pi], got {}", roads.max_road_angle));
        }
        if !(roads.safe_from_decay_blocks >= 0.0) {
            return invalid(format!(
                "safeFromDecayBlocks must be non-negative, got {}",
                roads.safe_from_decay_blocks
            ));
        }

        let zoning = &self.zoned_blocks;
        if !(zoning.block_distance_decay_begins >= 0.0) {
            return invalid(format!(
                "blockDistanceDecayBegins must be non-negative, got {}",
                zoning.block_distance_decay_begins
            ));
        }
        if zoning.max_building_stories == 0 {
            return invalid("maxBuildingStories must be at least 1".to_string());
        }

        Ok(())
    }
}

fn check_probability(name: &str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        invalid(format!("{} must be in [0, 1], got {}", name, value))
    }
}

fn invalid(message: String) -> Result<()> {
    Err(CityError::InvalidConfig(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CityConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = CityConfig::from_json_str(
            r#"{
                "terrain": { "columnCount": 24, "probabilityOfRiver": 1.0 },
                "roadNetwork": { "isPresent": false, "safeFromDecayBlocks": 2 },
                "zonedBlocks": { "maxBuildingStories": 12 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.terrain.column_count, 24);
        assert_eq!(config.terrain.row_count, 64);
        assert_eq!(config.terrain.probability_of_river, 1.0);
        assert!(!config.road_network.is_present);
        assert_eq!(config.road_network.safe_from_decay_blocks, 2.0);
        assert_eq!(config.zoned_blocks.max_building_stories, 12);
        assert_eq!(config.neighborhoods, NeighborhoodConfig::default());
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let mut config = CityConfig::default();
        config.terrain.probability_of_river = 1.5;
        assert!(matches!(config.validate(), Err(CityError::InvalidConfig(_))));

        let mut config = CityConfig::default();
        config.road_network.max_road_angle = 4.0;
        assert!(config.validate().is_err());

        let mut config = CityConfig::default();
        config.terrain.column_count = 2;
        assert!(config.validate().is_err());

        let mut config = CityConfig::default();
        config.zoned_blocks.max_building_stories = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            CityConfig::from_json_str("{ \"terrain\": 3 }"),
            Err(CityError::Json(_))
        ));
    }
}
