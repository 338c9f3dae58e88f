use crate::error::ConfigError;
use crate::scene::camera::CameraRecord;
use crate::scene::context::SceneDefaults;
use crate::scene::light::{LightParams, LightType};
use nalgebra::{Point3, Vector3, Vector4};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Viewer configuration, read from TOML. Every section and field is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    /// Lights used when the scene has none.
    #[serde(default = "default_lights")]
    pub lights: Vec<LightConfig>,
    #[serde(default)]
    pub controls: ControlsConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            render: RenderConfig::default(),
            camera: CameraConfig::default(),
            lights: default_lights(),
            controls: ControlsConfig::default(),
            assets: AssetsConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if config.window.width == 0 || config.window.height == 0 {
            return Err(ConfigError::WindowSize {
                path: path.to_path_buf(),
                width: config.window.width,
                height: config.window.height,
            });
        }
        Ok(config)
    }

    /// Defaults handed to the render context for scenes without cameras or lights.
    pub fn scene_defaults(&self) -> SceneDefaults {
        SceneDefaults {
            camera: self.camera.to_record(),
            lights: self.lights.iter().map(LightConfig::to_params).collect(),
            active_camera: self.camera.active,
        }
    }

    pub fn texture_dir(&self) -> Option<&Path> {
        self.assets.texture_dir.as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
        }
    }
}

fn default_width() -> usize {
    600
}
fn default_height() -> usize {
    400
}
fn default_title() -> String {
    "sceneview".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// Supersampling factor per axis: 1 for no AA, 2 for 2x2 SSAA.
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default = "default_cull_mode")]
    pub cull_mode: String, // "back", "front", "none"
    #[serde(default)]
    pub wireframe: bool,
    #[serde(default = "default_background")]
    pub background: [f32; 3],
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            cull_mode: default_cull_mode(),
            wireframe: false,
            background: default_background(),
            output: default_output(),
        }
    }
}

fn default_samples() -> usize {
    1
}
fn default_cull_mode() -> String {
    "back".to_string()
}
fn default_background() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_output() -> PathBuf {
    PathBuf::from("output.png")
}

/// A camera description. Used for the default camera here and for
/// `[[cameras]]` entries in scene files.
#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    #[serde(default)]
    pub look_at: [f32; 3],
    #[serde(default = "default_up")]
    pub up: [f32; 3],
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    /// Which scene camera to look through.
    #[serde(default)]
    pub active: usize,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: default_camera_position(),
            look_at: [0.0, 0.0, 0.0],
            up: default_up(),
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
            active: 0,
        }
    }
}

impl CameraConfig {
    pub fn to_record(&self) -> CameraRecord {
        CameraRecord {
            name: if self.name.is_empty() {
                "default".to_string()
            } else {
                self.name.clone()
            },
            position: Point3::from(self.position),
            look_at: Point3::from(self.look_at),
            up: Vector3::from(self.up),
            fov_y: self.fov.to_radians(),
            near: self.near,
            far: self.far,
        }
    }
}

fn default_camera_position() -> [f32; 3] {
    [0.0, 3.0, 3.0]
}
fn default_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}
fn default_fov() -> f32 {
    60.0
}
fn default_near() -> f32 {
    0.1
}
fn default_far() -> f32 {
    1000.0
}

/// A light description. Used for default lights here and for `[[lights]]`
/// entries in scene files.
#[derive(Debug, Clone, Deserialize)]
pub struct LightConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_light_type")]
    pub r#type: LightType,
    #[serde(default = "default_light_position")]
    pub position: [f32; 3],
    #[serde(default)]
    pub direction: [f32; 3],
    #[serde(default)]
    pub ambient: [f32; 3],
    #[serde(default = "default_white")]
    pub diffuse: [f32; 3],
    #[serde(default = "default_white")]
    pub specular: [f32; 3],
    /// (constant, linear, quadratic)
    #[serde(default = "default_attenuation")]
    pub attenuation: [f32; 3],
    /// Spot cone half-angles in radians.
    #[serde(default = "default_inner_cone")]
    pub inner_cone: f32,
    #[serde(default = "default_outer_cone")]
    pub outer_cone: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            r#type: default_light_type(),
            position: default_light_position(),
            direction: [0.0, 0.0, 0.0],
            ambient: [0.0, 0.0, 0.0],
            diffuse: default_white(),
            specular: default_white(),
            attenuation: default_attenuation(),
            inner_cone: default_inner_cone(),
            outer_cone: default_outer_cone(),
        }
    }
}

impl LightConfig {
    pub fn to_params(&self) -> LightParams {
        let [constant, linear, quadratic] = self.attenuation;
        LightParams {
            name: self.name.clone(),
            light_type: self.r#type,
            position: Point3::from(self.position),
            direction: Vector3::from(self.direction),
            ambient: opaque(self.ambient),
            diffuse: opaque(self.diffuse),
            specular: opaque(self.specular),
            constant_attenuation: constant,
            linear_attenuation: linear,
            quadratic_attenuation: quadratic,
            inner_cone: self.inner_cone,
            outer_cone: self.outer_cone,
        }
    }
}

fn opaque(c: [f32; 3]) -> Vector4<f32> {
    Vector4::new(c[0], c[1], c[2], 1.0)
}

fn default_lights() -> Vec<LightConfig> {
    vec![
        LightConfig {
            name: "default_light_0".to_string(),
            position: [1.0, 1.0, 1.0],
            ..Default::default()
        },
        LightConfig {
            name: "default_light_1".to_string(),
            position: [-1.0, 1.0, 1.0],
            ..Default::default()
        },
    ]
}
fn default_light_type() -> LightType {
    LightType::Point
}
fn default_light_position() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_white() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_attenuation() -> [f32; 3] {
    [1.0, 1.0, 0.1]
}
fn default_inner_cone() -> f32 {
    0.3
}
fn default_outer_cone() -> f32 {
    2.0
}

/// Keyboard and mouse control rates.
#[derive(Debug, Clone, Deserialize)]
pub struct ControlsConfig {
    /// Translation per key press.
    #[serde(default = "default_step")]
    pub step: f32,
    #[serde(default = "default_step")]
    pub scale_step: f32,
    #[serde(default = "default_min_scale")]
    pub min_scale: f32,
    /// Degrees of rotation per pixel of mouse offset from the window center.
    #[serde(default = "default_mouse_sensitivity")]
    pub mouse_sensitivity: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            step: default_step(),
            scale_step: default_step(),
            min_scale: default_min_scale(),
            mouse_sensitivity: default_mouse_sensitivity(),
        }
    }
}

fn default_step() -> f32 {
    0.1
}
fn default_min_scale() -> f32 {
    0.1
}
fn default_mouse_sensitivity() -> f32 {
    0.5
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetsConfig {
    /// Directory searched by file name for material textures, instead of the
    /// path written in the MTL file.
    #[serde(default)]
    pub texture_dir: Option<PathBuf>,
}
