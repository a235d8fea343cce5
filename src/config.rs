//! Application configuration
//!
//! Plain configuration structs with sensible defaults.
//! `AppConfig::from_env()` layers `BUMPVIEW_*` environment overrides on top of the
//! defaults; the individual parsers are pure so they can be tested without touching
//! the process environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;

/// Passive stereo layouts supported by the framebuffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StereoMode {
    #[default]
    Disabled,
    /// Left eye in the left half, right eye in the right half of each view
    PassiveLeftRight,
    /// Left eye on top, right eye on the bottom of each view
    PassiveTopBottom,
}

/// Which haptic device the handler should expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceSelection {
    /// No device connected; the tool is driven by the null device
    None,
    /// Simulated device following a scripted trajectory
    #[default]
    Virtual,
}

/// Whether a failed resource load aborts startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourcePolicy {
    Required,
    Optional,
}

/// Surface shading technique for the textured plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShaderMode {
    Bump,
    #[default]
    Parallax,
}

/// Per-resource load policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePolicies {
    pub color_texture: ResourcePolicy,
    pub displacement_map: ResourcePolicy,
    pub normal_map: ResourcePolicy,
    pub sphere_texture: ResourcePolicy,
    pub surface_shader: ResourcePolicy,
    pub phong_shader: ResourcePolicy,
}

impl Default for ResourcePolicies {
    fn default() -> Self {
        Self {
            color_texture: ResourcePolicy::Optional,
            displacement_map: ResourcePolicy::Optional,
            normal_map: ResourcePolicy::Required,
            sphere_texture: ResourcePolicy::Required,
            surface_shader: ResourcePolicy::Required,
            phong_shader: ResourcePolicy::Required,
        }
    }
}

/// Settings for the haptic thread and the tool it drives
#[derive(Debug, Clone, PartialEq)]
pub struct HapticsConfig {
    pub device: DeviceSelection,
    /// Fail startup instead of falling back to the null device
    pub require_device: bool,
    /// Target loop rate; `None` lets the loop run as fast as it can
    pub rate_limit_hz: Option<u32>,
    pub shutdown_timeout: Duration,
    pub shutdown_poll_interval: Duration,
    pub tool_radius: f64,
    /// Radius of the virtual workspace the device is mapped into
    pub workspace_radius: f64,
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            device: DeviceSelection::Virtual,
            require_device: false,
            rate_limit_hz: Some(1000),
            shutdown_timeout: Duration::from_secs(2),
            shutdown_poll_interval: Duration::from_millis(100),
            tool_radius: 0.02,
            workspace_radius: 0.9,
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub title: String,
    pub vsync: bool,
    pub stereo: StereoMode,
    pub shader_mode: ShaderMode,
    /// Explicit resource root; resolved from the executable location when `None`
    pub resource_root: Option<PathBuf>,
    pub policies: ResourcePolicies,
    pub haptics: HapticsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "bumpview - parallax mapping".to_string(),
            vsync: true,
            stereo: StereoMode::Disabled,
            shader_mode: ShaderMode::Parallax,
            resource_root: None,
            policies: ResourcePolicies::default(),
            haptics: HapticsConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_root = Some(root.into());
        self
    }

    /// Defaults overridden by `BUMPVIEW_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(root) = lookup("BUMPVIEW_RESOURCES").filter(|v| !v.is_empty()) {
            config.resource_root = Some(PathBuf::from(root));
        }

        if let Some(value) = lookup("BUMPVIEW_DEVICE") {
            match parse_device_selection(&value) {
                Some(device) => config.haptics.device = device,
                None => warn!("Ignoring BUMPVIEW_DEVICE={value:?}, expected none|virtual"),
            }
        }

        if let Some(value) = lookup("BUMPVIEW_REQUIRE_DEVICE") {
            match parse_flag(&value) {
                Some(flag) => config.haptics.require_device = flag,
                None => warn!("Ignoring BUMPVIEW_REQUIRE_DEVICE={value:?}"),
            }
        }

        if let Some(value) = lookup("BUMPVIEW_HAPTIC_RATE") {
            match parse_rate_limit(&value) {
                Some(rate) => config.haptics.rate_limit_hz = rate,
                None => warn!("Ignoring BUMPVIEW_HAPTIC_RATE={value:?}"),
            }
        }

        if let Some(value) = lookup("BUMPVIEW_VSYNC") {
            match parse_flag(&value) {
                Some(flag) => config.vsync = flag,
                None => warn!("Ignoring BUMPVIEW_VSYNC={value:?}"),
            }
        }

        if let Some(value) = lookup("BUMPVIEW_STEREO") {
            match parse_stereo_mode(&value) {
                Some(mode) => config.stereo = mode,
                None => warn!("Ignoring BUMPVIEW_STEREO={value:?}, expected off|left-right|top-bottom"),
            }
        }

        if let Some(value) = lookup("BUMPVIEW_SHADER") {
            match parse_shader_mode(&value) {
                Some(mode) => config.shader_mode = mode,
                None => warn!("Ignoring BUMPVIEW_SHADER={value:?}, expected parallax|bump"),
            }
        }

        config
    }

    /// Resource root to load images and shaders from
    ///
    /// Searches, in order: the configured root, `<exe_dir>/../resources`,
    /// `<exe_dir>/resources`, then the crate's own `resources/` directory.
    pub fn resolve_resource_root(&self) -> PathBuf {
        if let Some(root) = &self.resource_root {
            return root.clone();
        }

        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

        resource_root_candidates(exe_dir.as_deref(), &manifest_dir)
            .into_iter()
            .find(|candidate| candidate.is_dir())
            .unwrap_or_else(|| manifest_dir.join("resources"))
    }
}

/// Candidate resource roots in search order
pub fn resource_root_candidates(exe_dir: Option<&Path>, manifest_dir: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(3);
    if let Some(dir) = exe_dir {
        candidates.push(dir.join("..").join("resources"));
        candidates.push(dir.join("resources"));
    }
    candidates.push(manifest_dir.join("resources"));
    candidates
}

pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn parse_device_selection(value: &str) -> Option<DeviceSelection> {
    match value.trim().to_ascii_lowercase().as_str() {
        "none" | "null" => Some(DeviceSelection::None),
        "virtual" | "sim" => Some(DeviceSelection::Virtual),
        _ => None,
    }
}

/// `0` means free-running
pub fn parse_rate_limit(value: &str) -> Option<Option<u32>> {
    let hz: u32 = value.trim().parse().ok()?;
    Some((hz > 0).then_some(hz))
}

pub fn parse_stereo_mode(value: &str) -> Option<StereoMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" | "none" | "disabled" => Some(StereoMode::Disabled),
        "left-right" | "lr" => Some(StereoMode::PassiveLeftRight),
        "top-bottom" | "tb" => Some(StereoMode::PassiveTopBottom),
        "active" => {
            warn!("Active stereo is not supported, falling back to mono rendering");
            Some(StereoMode::Disabled)
        }
        _ => None,
    }
}

pub fn parse_shader_mode(value: &str) -> Option<ShaderMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "parallax" => Some(ShaderMode::Parallax),
        "bump" => Some(ShaderMode::Bump),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.vsync);
        assert_eq!(config.stereo, StereoMode::Disabled);
        assert_eq!(config.shader_mode, ShaderMode::Parallax);
        assert_eq!(config.haptics.device, DeviceSelection::Virtual);
        assert_eq!(config.haptics.rate_limit_hz, Some(1000));
        assert_eq!(config.policies.normal_map, ResourcePolicy::Required);
        assert_eq!(config.policies.color_texture, ResourcePolicy::Optional);
        assert_eq!(config.policies.displacement_map, ResourcePolicy::Optional);
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("BUMPVIEW_RESOURCES", "/opt/bumpview"),
            ("BUMPVIEW_DEVICE", "none"),
            ("BUMPVIEW_REQUIRE_DEVICE", "1"),
            ("BUMPVIEW_HAPTIC_RATE", "0"),
            ("BUMPVIEW_VSYNC", "off"),
            ("BUMPVIEW_STEREO", "top-bottom"),
        ]));

        assert_eq!(config.resource_root, Some(PathBuf::from("/opt/bumpview")));
        assert_eq!(config.haptics.device, DeviceSelection::None);
        assert!(config.haptics.require_device);
        assert_eq!(config.haptics.rate_limit_hz, None);
        assert!(!config.vsync);
        assert_eq!(config.stereo, StereoMode::PassiveTopBottom);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("BUMPVIEW_DEVICE", "phantom"),
            ("BUMPVIEW_HAPTIC_RATE", "fast"),
            ("BUMPVIEW_STEREO", "sideways"),
            ("BUMPVIEW_SHADER", "relief"),
        ]));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_shader_selection() {
        let bump = AppConfig::from_lookup(lookup_from(&[("BUMPVIEW_SHADER", "Bump")]));
        assert_eq!(bump.shader_mode, ShaderMode::Bump);

        let parallax = AppConfig::from_lookup(lookup_from(&[("BUMPVIEW_SHADER", "parallax")]));
        assert_eq!(parallax.shader_mode, ShaderMode::Parallax);
        assert_eq!(parse_shader_mode("steep"), None);
    }

    #[test]
    fn test_active_stereo_falls_back() {
        assert_eq!(parse_stereo_mode("active"), Some(StereoMode::Disabled));
    }

    #[test]
    fn test_rate_limit_parsing() {
        assert_eq!(parse_rate_limit("2000"), Some(Some(2000)));
        assert_eq!(parse_rate_limit("0"), Some(None));
        assert_eq!(parse_rate_limit("-5"), None);
    }

    #[test]
    fn test_resource_root_search_order() {
        let exe = Path::new("/app/bin");
        let manifest = Path::new("/src/bumpview");
        let candidates = resource_root_candidates(Some(exe), manifest);
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/app/bin/../resources"),
                PathBuf::from("/app/bin/resources"),
                PathBuf::from("/src/bumpview/resources"),
            ]
        );

        let explicit = AppConfig::default().with_resource_root("/data");
        assert_eq!(explicit.resolve_resource_root(), PathBuf::from("/data"));
    }
}
