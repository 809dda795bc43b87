use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::layout_engine::PresetWidths;

pub fn config_file() -> PathBuf { dirs::home_dir().unwrap_or_default().join(".reel.toml") }

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub settings: Settings,
    #[serde(default)]
    pub window_rules: Vec<WindowRule>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Untile a window as soon as the user starts dragging it.
    #[serde(default = "yes")]
    pub untile_on_drag: bool,
    #[serde(default = "yes")]
    pub tiled_keep_below: bool,
    #[serde(default = "no")]
    pub floating_keep_above: bool,
    /// Leave keep-above and keep-below alone entirely. Overrides
    /// `tiled_keep_below` and `floating_keep_above`.
    #[serde(default = "no")]
    pub no_layering: bool,
    /// Hide tiled windows from the task switcher.
    #[serde(default = "no")]
    pub skip_switcher: bool,
    /// Windows that were maximized before tiling are maximized again when
    /// they leave tiling.
    #[serde(default = "no")]
    pub re_maximize: bool,
    /// Quiet period after the last area change before everything is
    /// re-arranged. Panels and docks settle during this window.
    #[serde(default = "default_area_change_delay_ms")]
    pub area_change_delay_ms: u64,
    #[serde(default)]
    pub layout: LayoutSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct LayoutSettings {
    #[serde(default)]
    pub gaps: GapSettings,
    #[serde(default)]
    pub columns: ColumnSettings,
    #[serde(default)]
    pub scrolling: ScrollingSettings,
}

/// Gap configuration for window spacing
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct GapSettings {
    /// Outer gaps (space between windows and screen edges)
    #[serde(default)]
    pub outer: OuterGaps,
    /// Inner gaps (space between windows)
    #[serde(default)]
    pub inner: InnerGaps,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct OuterGaps {
    #[serde(default = "default_outer_gap")]
    pub top: i32,
    #[serde(default = "default_outer_gap")]
    pub left: i32,
    #[serde(default = "default_outer_gap")]
    pub bottom: i32,
    #[serde(default = "default_outer_gap")]
    pub right: i32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct InnerGaps {
    /// Horizontal gap between columns
    #[serde(default = "default_inner_gap")]
    pub horizontal: i32,
    /// Vertical gap between windows of one column
    #[serde(default = "default_inner_gap")]
    pub vertical: i32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct ColumnSettings {
    /// New columns start in stacked mode.
    #[serde(default = "no")]
    pub stack_by_default: bool,
    /// Pixels added or removed by the width increase/decrease commands.
    #[serde(default = "default_resize_step")]
    pub resize_step: i32,
    /// Widths cycled through by the preset width commands, e.g. "50%, 100%".
    #[serde(default = "default_preset_widths")]
    pub preset_widths: String,
    /// Interactive resizes take the width from the neighboring column.
    #[serde(default = "no")]
    pub resize_neighbor_column: bool,
    /// Opacity in percent of columns not fully on screen. 100 disables
    /// dimming.
    #[serde(default = "default_off_screen_opacity")]
    pub off_screen_opacity: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScrollingSettings {
    #[serde(default)]
    pub mode: ScrollMode,
    /// Extra scroll applied past a column brought into view.
    #[serde(default)]
    pub overscroll: i32,
    /// Pixels moved by the manual scroll commands.
    #[serde(default = "default_scroll_step")]
    pub scroll_step: i32,
}

#[derive(
    Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScrollMode {
    /// Scroll only as far as needed to show the focused column.
    #[default]
    Lazy,
    /// Keep the focused column centered.
    Centered,
    /// Center the focused column together with the neighbors that fit.
    Grouped,
}

/// Decides whether newly appearing windows start tiled. The first rule whose
/// patterns all match wins; windows matching no rule are tiled.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct WindowRule {
    /// Regex matched against the whole window class.
    #[serde(default)]
    pub class: Option<String>,
    /// Regex matched against the whole window caption.
    #[serde(default)]
    pub caption: Option<String>,
    pub tile: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            untile_on_drag: yes(),
            tiled_keep_below: yes(),
            floating_keep_above: no(),
            no_layering: no(),
            skip_switcher: no(),
            re_maximize: no(),
            area_change_delay_ms: default_area_change_delay_ms(),
            layout: LayoutSettings::default(),
        }
    }
}

impl Default for OuterGaps {
    fn default() -> Self {
        Self {
            top: default_outer_gap(),
            left: default_outer_gap(),
            bottom: default_outer_gap(),
            right: default_outer_gap(),
        }
    }
}

impl Default for InnerGaps {
    fn default() -> Self {
        Self {
            horizontal: default_inner_gap(),
            vertical: default_inner_gap(),
        }
    }
}

impl Default for ColumnSettings {
    fn default() -> Self {
        Self {
            stack_by_default: no(),
            resize_step: default_resize_step(),
            preset_widths: default_preset_widths(),
            resize_neighbor_column: no(),
            off_screen_opacity: default_off_screen_opacity(),
        }
    }
}

impl Default for ScrollingSettings {
    fn default() -> Self {
        Self {
            mode: ScrollMode::default(),
            overscroll: 0,
            scroll_step: default_scroll_step(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.area_change_delay_ms > 60_000 {
            issues.push(format!(
                "area_change_delay_ms must be at most 60000, got {}",
                self.area_change_delay_ms
            ));
        }

        issues.extend(self.layout.validate());

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.area_change_delay_ms > 60_000 {
            self.area_change_delay_ms = default_area_change_delay_ms();
            fixes += 1;
        }

        fixes += self.layout.auto_fix_values();

        fixes
    }
}

impl LayoutSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        issues.extend(self.gaps.validate());
        issues.extend(self.columns.validate());
        issues.extend(self.scrolling.validate());

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        self.gaps.auto_fix_values() + self.columns.auto_fix_values() + self.scrolling.auto_fix_values()
    }
}

impl GapSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = self.outer.validate();
        issues.extend(self.inner.validate());
        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        self.outer.auto_fix_values() + self.inner.auto_fix_values()
    }
}

impl OuterGaps {
    fn fields_mut(&mut self) -> [(&'static str, &mut i32); 4] {
        [
            ("top", &mut self.top),
            ("left", &mut self.left),
            ("bottom", &mut self.bottom),
            ("right", &mut self.right),
        ]
    }

    /// Validates outer gap configuration values and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> {
        [
            ("top", self.top),
            ("left", self.left),
            ("bottom", self.bottom),
            ("right", self.right),
        ]
        .into_iter()
        .filter(|(_, value)| *value < 0)
        .map(|(name, value)| format!("outer.{name} gap must be non-negative, got {value}"))
        .collect()
    }

    /// Clamps negative gaps to zero. Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;
        for (_, value) in self.fields_mut() {
            if *value < 0 {
                *value = 0;
                fixes += 1;
            }
        }
        fixes
    }
}

impl InnerGaps {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.horizontal < 0 {
            issues.push(format!(
                "inner.horizontal gap must be non-negative, got {}",
                self.horizontal
            ));
        }

        if self.vertical < 0 {
            issues.push(format!(
                "inner.vertical gap must be non-negative, got {}",
                self.vertical
            ));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.horizontal < 0 {
            self.horizontal = 0;
            fixes += 1;
        }

        if self.vertical < 0 {
            self.vertical = 0;
            fixes += 1;
        }

        fixes
    }
}

impl ColumnSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.resize_step <= 0 {
            issues.push(format!("resize_step must be positive, got {}", self.resize_step));
        }

        if let Err(e) = PresetWidths::parse(&self.preset_widths, 0) {
            issues.push(format!("preset_widths is invalid: {e}"));
        }

        if self.off_screen_opacity > 100 {
            issues.push(format!(
                "off_screen_opacity must be at most 100, got {}",
                self.off_screen_opacity
            ));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.resize_step <= 0 {
            self.resize_step = default_resize_step();
            fixes += 1;
        }

        if PresetWidths::parse(&self.preset_widths, 0).is_err() {
            self.preset_widths = default_preset_widths();
            fixes += 1;
        }

        if self.off_screen_opacity > 100 {
            self.off_screen_opacity = 100;
            fixes += 1;
        }

        fixes
    }
}

impl ScrollingSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.overscroll < 0 {
            issues.push(format!("overscroll must be non-negative, got {}", self.overscroll));
        }

        if self.scroll_step <= 0 {
            issues.push(format!("scroll_step must be positive, got {}", self.scroll_step));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.overscroll < 0 {
            self.overscroll = 0;
            fixes += 1;
        }

        if self.scroll_step <= 0 {
            self.scroll_step = default_scroll_step();
            fixes += 1;
        }

        fixes
    }
}

impl WindowRule {
    pub fn validate(&self, index: usize) -> Vec<String> {
        [("class", &self.class), ("caption", &self.caption)]
            .into_iter()
            .filter_map(|(name, pattern)| {
                let pattern = pattern.as_deref()?;
                Regex::new(pattern)
                    .err()
                    .map(|e| format!("window_rules[{index}].{name} is not a valid regex: {e}"))
            })
            .collect()
    }
}

fn yes() -> bool { true }

fn no() -> bool { false }

fn default_area_change_delay_ms() -> u64 { 1000 }

fn default_outer_gap() -> i32 { 16 }

fn default_inner_gap() -> i32 { 8 }

fn default_resize_step() -> i32 { 100 }

fn default_scroll_step() -> i32 { 200 }

fn default_preset_widths() -> String { "50%, 100%".to_string() }

fn default_off_screen_opacity() -> u32 { 100 }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    /// Reads `path` when it exists, otherwise falls back to the bundled defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Config> {
        if path.exists() { Self::read(path) } else { Ok(Self::default()) }
    }

    pub fn default() -> Config {
        Self::parse(include_str!("../../reel.default.toml"))
            .expect("bundled reel.default.toml must parse")
    }

    /// Save the current config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;

        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = self.settings.validate();

        for (index, rule) in self.window_rules.iter().enumerate() {
            issues.extend(rule.validate(index));
        }

        issues
    }

    /// Attempts to fix configuration values automatically. Window rules with
    /// invalid patterns are dropped. Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = self.settings.auto_fix_values();

        let before = self.window_rules.len();
        let mut index = 0;
        self.window_rules.retain(|rule| {
            let keep = rule.validate(index).is_empty();
            index += 1;
            keep
        });
        fixes += before - self.window_rules.len();

        fixes
    }

    fn parse(buf: &str) -> anyhow::Result<Config> { Ok(toml::from_str(buf)?) }
}
