//! Erosion simulation parameters and configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Erosion intensity preset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErosionPreset {
    /// No erosion - raw fractal terrain
    None,
    /// Minimal erosion - subtle smoothing
    Minimal,
    /// Normal erosion - balanced
    #[default]
    Normal,
    /// Dramatic erosion - deep gullies and slumped slopes
    Dramatic,
}

impl ErosionPreset {
    pub fn all() -> &'static [Self] {
        &[Self::None, Self::Minimal, Self::Normal, Self::Dramatic]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::None => "No erosion (raw terrain)",
            Self::Minimal => "Subtle smoothing",
            Self::Normal => "Balanced erosion",
            Self::Dramatic => "Deep gullies and slumped slopes",
        }
    }
}

impl std::fmt::Display for ErosionPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Minimal => write!(f, "minimal"),
            Self::Normal => write!(f, "normal"),
            Self::Dramatic => write!(f, "dramatic"),
        }
    }
}

impl FromStr for ErosionPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "minimal" => Ok(Self::Minimal),
            "normal" => Ok(Self::Normal),
            "dramatic" => Ok(Self::Dramatic),
            other => Err(format!(
                "unknown erosion preset '{}' (expected none, minimal, normal or dramatic)",
                other
            )),
        }
    }
}

/// Erosion simulation parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErosionParams {
    // =========================================================================
    // Thermal Erosion Parameters
    // =========================================================================

    /// Enable talus-slope thermal erosion
    pub enable_thermal: bool,

    /// Number of thermal relaxation passes over the whole grid
    pub thermal_iterations: usize,

    /// Steepest stable slope angle (radians); anything steeper slumps
    pub talus_angle: f32,

    /// Fraction of the excess height moved per pass (0.0-0.5)
    pub thermal_rate: f32,

    // =========================================================================
    // Hydraulic Erosion Parameters
    // =========================================================================

    /// Enable particle-based hydraulic erosion
    pub enable_hydraulic: bool,

    /// Number of water droplets to simulate per grid cell
    pub droplets_per_cell: f32,

    /// Momentum conservation factor (0.0-1.0)
    /// Higher values = droplets maintain direction longer, creating straighter paths
    pub droplet_inertia: f32,

    /// Sediment carrying capacity multiplier
    pub droplet_capacity_factor: f32,

    /// Rate at which droplets erode terrain (0.0-1.0)
    pub droplet_erosion_rate: f32,

    /// Rate at which droplets deposit sediment (0.0-1.0)
    pub droplet_deposit_rate: f32,

    /// Water evaporation rate per step (0.0-1.0)
    pub droplet_evaporation: f32,

    /// Minimum water volume before droplet dies
    pub droplet_min_volume: f32,

    /// Maximum path length (steps) per droplet
    pub droplet_max_steps: usize,

    /// Radius for spreading erosion effects (in cells)
    pub droplet_erosion_radius: usize,

    /// Gravity factor affecting droplet acceleration
    pub droplet_gravity: f32,
}

impl Default for ErosionParams {
    fn default() -> Self {
        Self {
            enable_thermal: true,
            thermal_iterations: 20,
            talus_angle: 0.6,
            thermal_rate: 0.25,

            enable_hydraulic: true,
            droplets_per_cell: 1.0,
            droplet_inertia: 0.3,
            droplet_capacity_factor: 4.0,
            droplet_erosion_rate: 0.3,
            droplet_deposit_rate: 0.3,
            droplet_evaporation: 0.02,
            droplet_min_volume: 0.01,
            droplet_max_steps: 64,
            droplet_erosion_radius: 2,
            droplet_gravity: 4.0,
        }
    }
}

impl ErosionParams {
    /// Create parameters from a preset
    pub fn from_preset(preset: ErosionPreset) -> Self {
        match preset {
            ErosionPreset::None => Self {
                enable_thermal: false,
                enable_hydraulic: false,
                ..Default::default()
            },
            ErosionPreset::Minimal => Self {
                thermal_iterations: 5,
                droplets_per_cell: 0.25,
                droplet_erosion_rate: 0.1,
                ..Default::default()
            },
            ErosionPreset::Normal => Self::default(),
            ErosionPreset::Dramatic => Self {
                thermal_iterations: 50,
                talus_angle: 0.45,
                droplets_per_cell: 3.0,
                droplet_erosion_rate: 0.5,
                droplet_capacity_factor: 8.0,
                ..Default::default()
            },
        }
    }

    /// Whether any simulation would change the terrain.
    pub fn is_enabled(&self) -> bool {
        (self.enable_thermal && self.thermal_iterations > 0)
            || (self.enable_hydraulic && self.droplets_per_cell > 0.0)
    }
}
