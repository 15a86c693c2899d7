use serde::{Deserialize, Serialize};

/// Configuration embedded in the crate
pub const DEFAULT_CONFIG: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res/app.toml"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppMetadata {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "SceneConfig::default_background")]
    pub background: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleConfig {
    #[serde(default = "TriangleConfig::default_color")]
    pub color: String,
    /// Side length is `initial canvas width / side_divisor * sqrt(2)`
    #[serde(default = "TriangleConfig::default_side_divisor")]
    pub side_divisor: f32,
}

/// App configuration, in TOML
/// [app] names the app, [scene] and [triangle] are optional and
/// fall back to the defaults for every missing key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppMetadata,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub triangle: TriangleConfig,
}

impl SceneConfig {
    fn default_background() -> String {
        "#1E3D58".to_owned()
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: Self::default_background(),
        }
    }
}

impl TriangleConfig {
    fn default_color() -> String {
        "#FF5733".to_owned()
    }

    fn default_side_divisor() -> f32 {
        15.0
    }
}

impl Default for TriangleConfig {
    fn default() -> Self {
        Self {
            color: Self::default_color(),
            side_divisor: Self::default_side_divisor(),
        }
    }
}

impl AppConfig {
    pub fn new(data: impl AsRef<str>) -> anyhow::Result<Self> {
        toml::from_str(data.as_ref()).map_err(|err| anyhow::anyhow!("AppConfig::new: {}", err))
    }

    pub fn embedded() -> anyhow::Result<Self> {
        Self::new(DEFAULT_CONFIG)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|err| anyhow::anyhow!("AppConfig::from_file: failed to read file: {}", err))?;
        Self::new(data).map_err(|err| anyhow::anyhow!("AppConfig::from_file: {}", err))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn config_empty_string() {
        assert_eq!(None, AppConfig::new("").ok())
    }

    #[test]
    fn config_defaults() {
        let document = r#"
            [app]
            name = "test"
        "#;

        let result = AppConfig::new(document).unwrap();

        assert_eq!(
            AppConfig {
                app: AppMetadata {
                    name: "test".to_owned(),
                    description: None,
                },
                scene: SceneConfig {
                    background: "#1E3D58".to_owned(),
                },
                triangle: TriangleConfig {
                    color: "#FF5733".to_owned(),
                    side_divisor: 15.0,
                },
            },
            result
        );
    }

    #[test]
    fn config_partial_triangle() {
        let document = r##"
            [app]
            name = "test"
            description = "testing"

            [triangle]
            color = "#00FF00"
        "##;

        let result = AppConfig::new(document).unwrap();

        assert_eq!(Some("testing"), result.app.description.as_deref());
        assert_eq!("#00FF00", result.triangle.color);
        assert_eq!(15.0, result.triangle.side_divisor);
        assert_eq!(SceneConfig::default(), result.scene);
    }

    #[test]
    fn config_wrong_type() {
        let document = r#"
            [app]
            name = "test"

            [triangle]
            side_divisor = "fifteen"
        "#;

        assert!(AppConfig::new(document).is_err());
    }

    #[test]
    fn embedded_config_parses() {
        let config = AppConfig::embedded().unwrap();
        assert_eq!("shapegl", config.app.name);
        assert_eq!(SceneConfig::default(), config.scene);
        assert_eq!(TriangleConfig::default(), config.triangle);
    }
}
