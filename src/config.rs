use crate::error::ConfigError;
use crate::geo::{LatLng, Point};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_OFFSET: Point = Point::new(12.0, -15.0); // 6 (label arrow width) + 6 (padding)

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    #[default]
    Right,
    Auto,
}

/// Per-label options. Fixed for the lifetime of a label except `opacity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelOptions {
    pub class_name: String,
    pub clickable: bool,
    /// Only honored when `clickable` is set.
    pub draggable: bool,
    pub direction: Direction,
    pub no_hide: bool,
    pub offset: Point,
    pub opacity: f64,
    pub zoom_animation: bool,
    pub pane: Option<String>,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            class_name: String::new(),
            clickable: false,
            draggable: false,
            direction: Direction::Right,
            no_hide: false,
            offset: DEFAULT_OFFSET,
            opacity: 1.0,
            zoom_animation: true,
            pane: None,
        }
    }
}

impl LabelOptions {
    pub(crate) fn merge(&mut self, file: LabelOptionsFile) {
        if let Some(v) = file.class_name {
            self.class_name = v;
        }
        if let Some(v) = file.clickable {
            self.clickable = v;
        }
        if let Some(v) = file.draggable {
            self.draggable = v;
        }
        if let Some(v) = file.direction {
            self.direction = v;
        }
        if let Some(v) = file.no_hide {
            self.no_hide = v;
        }
        if let Some(v) = file.offset {
            self.offset = v;
        }
        if let Some(v) = file.opacity {
            self.opacity = v;
        }
        if let Some(v) = file.zoom_animation {
            self.zoom_animation = v;
        }
        if file.pane.is_some() {
            self.pane = file.pane;
        }
    }
}

/// Capabilities of the environment hosting the map, injected instead of probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Environment {
    /// Touch input is available; enables tap-to-close unless `noHide` is set.
    pub touch: bool,
    /// CSS 3D transforms are available; required for animated zoom tracking.
    pub any3d: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            touch: false,
            any3d: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub center: LatLng,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            center: LatLng::new(51.505, -0.09),
            zoom: 13.0,
            width: 800.0,
            height: 600.0,
        }
    }
}

/// How the reference node measures rendered markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    pub font_family: String,
    pub font_size: f64,
    pub line_height: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    /// Fixed advance per character. When unset, system fonts are measured.
    pub char_width: Option<f64>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font_family: "\"Helvetica Neue\", Arial, Helvetica, sans-serif".to_string(),
            font_size: 12.0,
            line_height: 1.5,
            padding_x: 6.0,
            padding_y: 1.0,
            char_width: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub background: String,
    pub label_fill: String,
    pub label_border: String,
    pub label_text: String,
    pub anchor_color: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: "#DDE6EE".to_string(),
            label_fill: "rgba(235,235,235,0.81)".to_string(),
            label_border: "#999999".to_string(),
            label_text: "#222222".to_string(),
            anchor_color: "#2A81CB".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub label: LabelOptions,
    pub environment: Environment,
    pub view: ViewConfig,
    pub text: TextConfig,
    pub render: RenderConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.label.opacity) {
            return Err(ConfigError::InvalidOpacity {
                value: self.label.opacity,
            });
        }
        if self.view.width <= 0.0 || self.view.height <= 0.0 {
            return Err(ConfigError::InvalidViewSize {
                width: self.view.width,
                height: self.view.height,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LabelOptionsFile {
    class_name: Option<String>,
    clickable: Option<bool>,
    draggable: Option<bool>,
    direction: Option<Direction>,
    no_hide: Option<bool>,
    offset: Option<Point>,
    opacity: Option<f64>,
    zoom_animation: Option<bool>,
    pane: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct EnvironmentFile {
    touch: Option<bool>,
    any3d: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ViewConfigFile {
    center: Option<LatLng>,
    zoom: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct TextConfigFile {
    font_family: Option<String>,
    font_size: Option<f64>,
    line_height: Option<f64>,
    padding_x: Option<f64>,
    padding_y: Option<f64>,
    char_width: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    background: Option<String>,
    label_fill: Option<String>,
    label_border: Option<String>,
    label_text: Option<String>,
    anchor_color: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    label: Option<LabelOptionsFile>,
    environment: Option<EnvironmentFile>,
    view: Option<ViewConfigFile>,
    text: Option<TextConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Parse a JSON5 config document and merge it over the defaults.
pub fn parse_config(contents: &str) -> Result<Config, json5::Error> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();

    if let Some(label) = parsed.label {
        config.label.merge(label);
    }

    if let Some(env) = parsed.environment {
        if let Some(v) = env.touch {
            config.environment.touch = v;
        }
        if let Some(v) = env.any3d {
            config.environment.any3d = v;
        }
    }

    if let Some(view) = parsed.view {
        if let Some(v) = view.center {
            config.view.center = v;
        }
        if let Some(v) = view.zoom {
            config.view.zoom = v;
        }
        if let Some(v) = view.width {
            config.view.width = v;
        }
        if let Some(v) = view.height {
            config.view.height = v;
        }
    }

    if let Some(text) = parsed.text {
        if let Some(v) = text.font_family {
            config.text.font_family = v;
        }
        if let Some(v) = text.font_size {
            config.text.font_size = v;
        }
        if let Some(v) = text.line_height {
            config.text.line_height = v;
        }
        if let Some(v) = text.padding_x {
            config.text.padding_x = v;
        }
        if let Some(v) = text.padding_y {
            config.text.padding_y = v;
        }
        if text.char_width.is_some() {
            config.text.char_width = text.char_width;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.background {
            config.render.background = v;
        }
        if let Some(v) = render.label_fill {
            config.render.label_fill = v;
        }
        if let Some(v) = render.label_border {
            config.render.label_border = v;
        }
        if let Some(v) = render.label_text {
            config.render.label_text = v;
        }
        if let Some(v) = render.anchor_color {
            config.render.anchor_color = v;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_surface() {
        let options = LabelOptions::default();
        assert_eq!(options.class_name, "");
        assert!(!options.clickable);
        assert!(!options.draggable);
        assert_eq!(options.direction, Direction::Right);
        assert!(!options.no_hide);
        assert_eq!(options.offset, Point::new(12.0, -15.0));
        assert_eq!(options.opacity, 1.0);
        assert!(options.zoom_animation);
        assert_eq!(options.pane, None);
    }

    #[test]
    fn merges_partial_json5_over_defaults() {
        let config = parse_config(
            r#"{
                // comments are allowed
                label: { direction: "auto", offset: [4, -4], clickable: true },
                environment: { touch: true },
                view: { zoom: 5, center: [48.85, 2.35] },
                text: { charWidth: 7 },
            }"#,
        )
        .unwrap();
        assert_eq!(config.label.direction, Direction::Auto);
        assert_eq!(config.label.offset, Point::new(4.0, -4.0));
        assert!(config.label.clickable);
        assert_eq!(config.label.opacity, 1.0);
        assert!(config.environment.touch);
        assert!(config.environment.any3d);
        assert_eq!(config.view.zoom, 5.0);
        assert_eq!(config.view.center, LatLng::new(48.85, 2.35));
        assert_eq!(config.view.width, 800.0);
        assert_eq!(config.text.char_width, Some(7.0));
    }

    #[test]
    fn rejects_out_of_range_opacity() {
        let config = parse_config(r#"{ "label": { "opacity": 1.5 } }"#).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOpacity { .. })
        ));
    }

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, Config::default());
    }
}
