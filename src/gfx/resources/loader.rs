//! Resource loading with per-resource failure policies
//!
//! Images and shader sources are read from the resource root. A failure is always
//! logged; whether it aborts startup depends on the resource's [`ResourcePolicy`].
//! Optional images fall back to a neutral 1x1 texture, optional shaders to the copy
//! compiled into the binary.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::{error, info, warn};

use super::texture_resource::TextureRole;
use crate::config::{ResourcePolicies, ResourcePolicy, ShaderMode};
use crate::error::AppError;

const PARALLAX_SHADER: &str = include_str!("../../../resources/shaders/parallax_mapping.wgsl");
const BUMP_SHADER: &str = include_str!("../../../resources/shaders/bump_mapping.wgsl");
const PHONG_SHADER: &str = include_str!("../../../resources/shaders/phong.wgsl");

/// Every file the demo loads from the resource root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceId {
    ColorTexture,
    DisplacementMap,
    NormalMap,
    SphereTexture,
    SurfaceShader,
    PhongShader,
}

impl ResourceId {
    pub const IMAGES: [ResourceId; 4] = [
        ResourceId::ColorTexture,
        ResourceId::DisplacementMap,
        ResourceId::NormalMap,
        ResourceId::SphereTexture,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ResourceId::ColorTexture => "color texture",
            ResourceId::DisplacementMap => "displacement map",
            ResourceId::NormalMap => "normal map",
            ResourceId::SphereTexture => "sphere texture",
            ResourceId::SurfaceShader => "surface shader",
            ResourceId::PhongShader => "phong shader",
        }
    }

    /// Path below the resource root
    pub fn relative_path(self, shader_mode: ShaderMode) -> PathBuf {
        let path = match self {
            ResourceId::ColorTexture => "images/wood.png",
            ResourceId::DisplacementMap => "images/toy_box_disp.png",
            ResourceId::NormalMap => "images/toy_box_normal.png",
            ResourceId::SphereTexture => "images/spheremap-3.jpg",
            ResourceId::SurfaceShader => match shader_mode {
                ShaderMode::Parallax => "shaders/parallax_mapping.wgsl",
                ShaderMode::Bump => "shaders/bump_mapping.wgsl",
            },
            ResourceId::PhongShader => "shaders/phong.wgsl",
        };
        PathBuf::from(path)
    }

    pub fn policy(self, policies: &ResourcePolicies) -> ResourcePolicy {
        match self {
            ResourceId::ColorTexture => policies.color_texture,
            ResourceId::DisplacementMap => policies.displacement_map,
            ResourceId::NormalMap => policies.normal_map,
            ResourceId::SphereTexture => policies.sphere_texture,
            ResourceId::SurfaceShader => policies.surface_shader,
            ResourceId::PhongShader => policies.phong_shader,
        }
    }

    /// Texel interpretation for image resources, `None` for shaders
    pub fn texture_role(self) -> Option<TextureRole> {
        match self {
            ResourceId::ColorTexture | ResourceId::SphereTexture => Some(TextureRole::Color),
            ResourceId::NormalMap => Some(TextureRole::Normal),
            ResourceId::DisplacementMap => Some(TextureRole::Displacement),
            ResourceId::SurfaceShader | ResourceId::PhongShader => None,
        }
    }

    /// Shader source compiled into the binary
    pub fn embedded_shader(self, shader_mode: ShaderMode) -> Option<&'static str> {
        match self {
            ResourceId::SurfaceShader => Some(match shader_mode {
                ShaderMode::Parallax => PARALLAX_SHADER,
                ShaderMode::Bump => BUMP_SHADER,
            }),
            ResourceId::PhongShader => Some(PHONG_SHADER),
            _ => None,
        }
    }
}

/// Shader source together with where it came from
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub name: String,
    pub source: String,
    pub embedded: bool,
}

pub struct ResourceLoader {
    root: PathBuf,
    policies: ResourcePolicies,
    shader_mode: ShaderMode,
    max_texture_dimension: u32,
}

impl ResourceLoader {
    pub fn new(root: impl Into<PathBuf>, policies: ResourcePolicies, shader_mode: ShaderMode) -> Self {
        Self {
            root: root.into(),
            policies,
            shader_mode,
            max_texture_dimension: wgpu::Limits::default().max_texture_dimension_2d,
        }
    }

    /// Images larger than `max` on either side are treated as load failures
    pub fn with_max_texture_dimension(mut self, max: u32) -> Self {
        self.max_texture_dimension = max;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn shader_mode(&self) -> ShaderMode {
        self.shader_mode
    }

    pub fn path_of(&self, id: ResourceId) -> PathBuf {
        self.root.join(id.relative_path(self.shader_mode))
    }

    /// Decodes an image resource
    ///
    /// Returns `Ok(None)` when an optional image could not be loaded and the caller
    /// should substitute a neutral texture.
    pub fn load_image(&self, id: ResourceId) -> Result<Option<RgbaImage>, AppError> {
        let path = self.path_of(id);
        match image::open(&path) {
            Ok(decoded) => {
                let rgba = decoded.to_rgba8();
                if let Some(reason) =
                    unsupported_dimensions(rgba.width(), rgba.height(), self.max_texture_dimension)
                {
                    return self.on_failure(id, path, reason).map(|()| None);
                }
                info!(
                    "Loaded {} from {} ({}x{})",
                    id.label(),
                    path.display(),
                    rgba.width(),
                    rgba.height()
                );
                Ok(Some(rgba))
            }
            Err(err) => self.on_failure(id, path, err.to_string()).map(|()| None),
        }
    }

    /// Reads a shader source, falling back to the embedded copy for optional shaders
    pub fn load_shader(&self, id: ResourceId) -> Result<ShaderSource, AppError> {
        let path = self.path_of(id);
        let name = id
            .relative_path(self.shader_mode)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| id.label().to_string());

        match std::fs::read_to_string(&path) {
            Ok(source) => {
                info!("Loaded {} from {}", id.label(), path.display());
                Ok(ShaderSource {
                    name,
                    source,
                    embedded: false,
                })
            }
            Err(err) => {
                self.on_failure(id, path, err.to_string())?;
                let source = id.embedded_shader(self.shader_mode).unwrap_or_default();
                Ok(ShaderSource {
                    name,
                    source: source.to_string(),
                    embedded: true,
                })
            }
        }
    }

    /// Applies the resource's policy to a failure reported elsewhere, e.g. by shader compilation
    pub fn on_failure(&self, id: ResourceId, path: PathBuf, reason: String) -> Result<(), AppError> {
        match id.policy(&self.policies) {
            ResourcePolicy::Required => {
                error!("Failed to load {} from {}: {}", id.label(), path.display(), reason);
                Err(AppError::ResourceLoad {
                    what: id.label(),
                    path,
                    reason,
                })
            }
            ResourcePolicy::Optional => {
                warn!(
                    "Failed to load {} from {}: {}; using fallback",
                    id.label(),
                    path.display(),
                    reason
                );
                Ok(())
            }
        }
    }
}

/// Why a `width` x `height` image cannot become a texture, if it cannot
pub fn unsupported_dimensions(width: u32, height: u32, max: u32) -> Option<String> {
    if width == 0 || height == 0 {
        Some(format!("image is empty ({width}x{height})"))
    } else if width > max || height > max {
        Some(format!("image is {width}x{height}, the device allows at most {max}x{max}"))
    } else {
        None
    }
}
