//! Error type for city generation.

use thiserror::Error;

/// Everything that can go wrong while configuring or generating a city.
///
/// Searches that find nothing (no path, no site) are not errors; they come
/// back as `None` and the caller falls back.
#[derive(Debug, Error)]
pub enum CityError {
    /// A road endpoint fell outside the allowed coordinate bound.
    #[error(
        "road coordinate ({x}, {z}) is outside the allowed bound x {min_x}..={max_x}, z {min_z}..={max_z}"
    )]
    OutOfBounds {
        x: i32,
        z: i32,
        min_x: i32,
        max_x: i32,
        min_z: i32,
        max_z: i32,
    },

    /// A configuration value is outside its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, CityError>;
