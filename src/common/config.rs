use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::geometry::Size;

pub fn data_dir() -> PathBuf { dirs::home_dir().unwrap().join(".tabula") }
pub fn config_file() -> PathBuf { dirs::home_dir().unwrap().join(".tabula.toml") }

fn yes() -> bool { true }
fn default_gap() -> f64 { 24.0 }
fn default_padding() -> f64 { 32.0 }
fn default_details_min() -> Size { Size::new(320.0, 420.0) }
fn default_details_floor() -> Size { Size::new(240.0, 320.0) }
fn default_details_preferred() -> Size { Size::new(420.0, 520.0) }
fn default_focus_min() -> Size { Size::new(520.0, 580.0) }
fn default_list_min() -> Size { Size::new(360.0, 440.0) }
fn default_list_size() -> Size { Size::new(520.0, 660.0) }
fn default_cascade_step() -> f64 { 32.0 }
fn default_fallback_viewport() -> Size { Size::new(1440.0, 900.0) }

/// Geometry and behavior settings for the workspace canvas.
///
/// The defaults are load-bearing: placement and focus sizing were tuned
/// around them, so overriding them changes where blocks land but must not
/// reorder the placement attempts.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct LayoutSettings {
    /// Space kept between neighboring blocks.
    #[serde(default = "default_gap")]
    pub gap: f64,
    /// Space kept between any block and the canvas edge.
    #[serde(default = "default_padding")]
    pub padding: f64,
    /// Minimum details-block size a placement direction must be able to offer.
    #[serde(default = "default_details_min")]
    pub details_min: Size,
    /// Hard floor for the details block when the canvas itself is tiny.
    #[serde(default = "default_details_floor")]
    pub details_floor: Size,
    /// Details-block size used when there is no previous geometry to reuse.
    #[serde(default = "default_details_preferred")]
    pub details_preferred: Size,
    /// Minimum size a block grows to when it enters focus mode.
    #[serde(default = "default_focus_min")]
    pub focus_min: Size,
    #[serde(default = "default_list_min")]
    pub list_min: Size,
    /// Size given to the list block of a newly opened project.
    #[serde(default = "default_list_size")]
    pub list_default: Size,
    /// Offset between the default positions of consecutively opened projects.
    #[serde(default = "default_cascade_step")]
    pub cascade_step: f64,
    /// Stand-in canvas size until the host reports real container bounds.
    #[serde(default = "default_fallback_viewport")]
    pub fallback_viewport: Size,
    /// Mirror committed block geometry to the layout store. Hosts that want
    /// an empty canvas on every launch turn this off.
    #[serde(default = "yes")]
    pub persist_layouts: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            gap: default_gap(),
            padding: default_padding(),
            details_min: default_details_min(),
            details_floor: default_details_floor(),
            details_preferred: default_details_preferred(),
            focus_min: default_focus_min(),
            list_min: default_list_min(),
            list_default: default_list_size(),
            cascade_step: default_cascade_step(),
            fallback_viewport: default_fallback_viewport(),
            persist_layouts: yes(),
        }
    }
}

impl LayoutSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.gap < 0.0 {
            issues.push("gap must not be negative".to_string());
        }
        if self.padding < 0.0 {
            issues.push("padding must not be negative".to_string());
        }
        if self.details_floor.width > self.details_min.width
            || self.details_floor.height > self.details_min.height
        {
            issues.push("details_floor must not exceed details_min".to_string());
        }
        if self.details_preferred.width < self.details_min.width
            || self.details_preferred.height < self.details_min.height
        {
            issues.push("details_preferred should be at least details_min".to_string());
        }
        if self.fallback_viewport.is_degenerate() {
            issues.push("fallback_viewport must have a positive size".to_string());
        }
        if self.cascade_step <= 0.0 {
            issues.push("cascade_step must be positive".to_string());
        }

        issues
    }

    pub fn auto_fix(&mut self) -> usize {
        let mut fixes = 0;
        let defaults = Self::default();

        if self.gap < 0.0 {
            self.gap = defaults.gap;
            fixes += 1;
        }
        if self.padding < 0.0 {
            self.padding = defaults.padding;
            fixes += 1;
        }
        if self.details_floor.width > self.details_min.width
            || self.details_floor.height > self.details_min.height
        {
            self.details_floor = Size::new(
                self.details_floor.width.min(self.details_min.width),
                self.details_floor.height.min(self.details_min.height),
            );
            fixes += 1;
        }
        if self.fallback_viewport.is_degenerate() {
            self.fallback_viewport = defaults.fallback_viewport;
            fixes += 1;
        }
        if self.cascade_step <= 0.0 {
            self.cascade_step = defaults.cascade_step;
            fixes += 1;
        }

        fixes
    }

    /// Load settings from the given TOML file, or the default location when
    /// `path` is `None`. A missing file yields the defaults.
    pub fn load(path: Option<&std::path::Path>) -> anyhow::Result<Self> {
        let path = path.map(PathBuf::from).unwrap_or_else(config_file);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let mut settings: Self = toml::from_str(&raw)
            .with_context(|| format!("parsing settings from {}", path.display()))?;
        let fixed = settings.auto_fix();
        if fixed > 0 {
            tracing::warn!("corrected {fixed} invalid settings value(s) from {}", path.display());
        }
        Ok(settings)
    }
}
