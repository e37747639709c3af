//! Runtime configuration.
//!
//! Every field has a default so an empty (or missing) config file yields the
//! stock brick placer: a 15x15 floor at height 0.5, a half-unit grid and an
//! orbit camera looking at `(0, 2, 0)`. Natively the file is looked up at the
//! path in `BRICK_PLACER_CONFIG` or `brick-placer.toml` in the working
//! directory. On the web there is no file and the page origin is used as the
//! upload base URL.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PlacerError, Result};

pub const CONFIG_PATH_ENV: &str = "BRICK_PLACER_CONFIG";
pub const UPLOAD_URL_ENV: &str = "BRICK_PLACER_UPLOAD_URL";
pub const DEFAULT_CONFIG_FILE: &str = "brick-placer.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacerConfig {
    pub upload: UploadConfig,
    pub grid: GridConfig,
    pub floor: FloorConfig,
    pub camera: CameraConfig,
    /// Where a fresh in-hand brick appears.
    pub spawn: [f32; 3],
    pub clear_colour: [f64; 4],
}

impl Default for PlacerConfig {
    fn default() -> Self {
        Self {
            upload: UploadConfig::default(),
            grid: GridConfig::default(),
            floor: FloorConfig::default(),
            camera: CameraConfig::default(),
            spawn: [0.0, 1.0, 0.0],
            clear_colour: [0.2, 0.2, 0.3, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Scheme and authority of the layout service. `None` means "same origin"
    /// on the web and is an error natively.
    pub base_url: Option<String>,
    pub path: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            base_url: Some("http://localhost:8080".to_string()),
            #[cfg(target_arch = "wasm32")]
            base_url: None,
            path: "/api/upload".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Horizontal snapping step for x and z.
    pub step: f32,
    /// Vertical layer height, y is always rounded up to it.
    pub layer_height: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            step: 0.5,
            layer_height: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorConfig {
    /// Side length of the square floor.
    pub size: f32,
    pub height: f32,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            size: 15.0,
            height: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Longitudinal angle in radians.
    pub alpha: f32,
    /// Latitudinal angle in radians, measured from +Y.
    pub beta: f32,
    pub radius: f32,
    pub target: [f32; 3],
    pub fovy_degrees: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub orbit_sensitivity: f32,
    pub zoom_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            alpha: -std::f32::consts::FRAC_PI_2,
            beta: std::f32::consts::PI / 2.5,
            radius: 3.0,
            target: [0.0, 2.0, 0.0],
            fovy_degrees: 45.0,
            min_radius: 1.0,
            max_radius: 60.0,
            orbit_sensitivity: 0.005,
            zoom_sensitivity: 0.5,
        }
    }
}

impl PlacerConfig {
    /// Parse a config file. Values that would break snapping or the camera
    /// are rejected here rather than on the first frame.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        positive("grid.step", self.grid.step)?;
        positive("grid.layer_height", self.grid.layer_height)?;
        positive("floor.size", self.floor.size)?;
        finite("floor.height", self.floor.height)?;
        for (field, value) in [("spawn", self.spawn), ("camera.target", self.camera.target)] {
            for v in value {
                finite(field, v)?;
            }
        }

        let camera = &self.camera;
        finite("camera.alpha", camera.alpha)?;
        finite("camera.beta", camera.beta)?;
        positive("camera.fovy_degrees", camera.fovy_degrees)?;
        positive("camera.min_radius", camera.min_radius)?;
        positive("camera.max_radius", camera.max_radius)?;
        finite("camera.orbit_sensitivity", camera.orbit_sensitivity)?;
        finite("camera.zoom_sensitivity", camera.zoom_sensitivity)?;
        if camera.min_radius > camera.max_radius {
            return Err(PlacerError::InvalidConfig {
                field: "camera.min_radius",
                reason: format!(
                    "{} is larger than camera.max_radius {}",
                    camera.min_radius, camera.max_radius
                ),
            });
        }
        if !(camera.min_radius..=camera.max_radius).contains(&camera.radius) {
            return Err(PlacerError::InvalidConfig {
                field: "camera.radius",
                reason: format!(
                    "{} is outside {}..={}",
                    camera.radius, camera.min_radius, camera.max_radius
                ),
            });
        }
        Ok(())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| PlacerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Resolve the configuration for this process.
    ///
    /// An explicitly configured path must exist, the default file is optional.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let mut config = match explicit {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    log::info!("Loading config from {}", path.display());
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        if let Ok(url) = std::env::var(UPLOAD_URL_ENV) {
            config.upload.base_url = Some(url);
        }
        config.validate()?;
        Ok(config)
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Result<Self> {
        Ok(Self::default())
    }

    pub fn clear_colour(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_colour;
        wgpu::Color { r, g, b, a }
    }
}

fn finite(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PlacerError::InvalidConfig {
            field,
            reason: format!("{} is not a finite number", value),
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(PlacerError::InvalidConfig {
            field,
            reason: format!("{} must be greater than zero", value),
        })
    }
}
