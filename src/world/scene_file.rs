//! Scene loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable scene files.

use std::fs;
use std::path::Path;
use super::SceneDescriptor;

/// Error type for scene loading, validation and export
#[derive(Debug)]
pub enum SceneError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    ImageError(image::ImageError),
    /// Descriptor failed validation
    Invalid(String),
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for SceneError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneError::ParseError(e)
    }
}

impl From<ron::Error> for SceneError {
    fn from(e: ron::Error) -> Self {
        SceneError::SerializeError(e)
    }
}

impl From<image::ImageError> for SceneError {
    fn from(e: image::ImageError) -> Self {
        SceneError::ImageError(e)
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::IoError(e) => write!(f, "IO error: {}", e),
            SceneError::ParseError(e) => write!(f, "Parse error: {}", e),
            SceneError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            SceneError::ImageError(e) => write!(f, "Image error: {}", e),
            SceneError::Invalid(msg) => write!(f, "Invalid scene: {}", msg),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::IoError(e) => Some(e),
            SceneError::ParseError(e) => Some(e),
            SceneError::SerializeError(e) => Some(e),
            SceneError::ImageError(e) => Some(e),
            SceneError::Invalid(_) => None,
        }
    }
}

/// Load and validate a scene from a RON file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneDescriptor, SceneError> {
    let contents = fs::read_to_string(path)?;
    load_scene_from_str(&contents)
}

/// Load and validate a scene from a RON string (for embedded scenes or testing)
pub fn load_scene_from_str(s: &str) -> Result<SceneDescriptor, SceneError> {
    let scene: SceneDescriptor = ron::from_str(s)?;
    scene.validate()?;
    Ok(scene)
}

/// Serialize a scene to pretty RON
pub fn scene_to_string(scene: &SceneDescriptor) -> Result<String, SceneError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    Ok(ron::ser::to_string_pretty(scene, config)?)
}

/// Save a scene to a RON file
pub fn save_scene<P: AsRef<Path>>(scene: &SceneDescriptor, path: P) -> Result<(), SceneError> {
    let contents = scene_to_string(scene)?;
    fs::write(path, contents)?;
    Ok(())
}
