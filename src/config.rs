use crate::error::Result;
use crate::utils::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_HOST, DEFAULT_INPUT_FILE, DEFAULT_MAP_HEIGHT_PX,
    DEFAULT_MAP_TITLE, DEFAULT_POPUP_MAX_WIDTH_PX, DEFAULT_PORT, DEFAULT_ZOOM,
};
use crate::writers::HtmlWriter;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "AGPE_MAP";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    pub input: InputConfig,
    pub server: ServerConfig,
    pub map: MapConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct InputConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MapConfig {
    pub title: String,
    pub zoom: u8,
    pub height_px: u32,
    pub popup_max_width: u32,
}

impl MapConfig {
    pub fn html_writer(&self) -> HtmlWriter {
        HtmlWriter::new()
            .with_title(self.title.clone())
            .with_map_height(self.height_px)
            .with_popup_max_width(self.popup_max_width)
    }
}

impl AppConfig {
    /// Layer defaults, an optional TOML file and `AGPE_MAP_*` environment
    /// variables (e.g. `AGPE_MAP_SERVER__PORT=9000`).
    ///
    /// An explicitly named file must exist; the default `agpe-map.toml` is
    /// only read when present.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let file_source = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        Self::builder_with_defaults()?
            .add_source(file_source)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Built-in defaults only, without consulting files or the environment.
    pub fn defaults() -> Result<Self> {
        Self::builder_with_defaults()?
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    fn builder_with_defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("input.path", DEFAULT_INPUT_FILE)?
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", DEFAULT_PORT as i64)?
            .set_default("map.title", DEFAULT_MAP_TITLE)?
            .set_default("map.zoom", DEFAULT_ZOOM as i64)?
            .set_default("map.height_px", DEFAULT_MAP_HEIGHT_PX as i64)?
            .set_default("map.popup_max_width", DEFAULT_POPUP_MAX_WIDTH_PX as i64)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults() -> Result<()> {
        let config = AppConfig::defaults()?;

        assert_eq!(config.input.path, PathBuf::from("AGPE_EBSA_unificada.csv"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8501);
        assert_eq!(
            config.map,
            MapConfig {
                title: "AGPE EBSA - Mapa de clientes".to_string(),
                zoom: 9,
                height_px: 650,
                popup_max_width: 350,
            }
        );
        Ok(())
    }

    #[test]
    fn test_file_overrides_defaults() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "[input]\npath = \"data/clientes.csv\"\n\n[map]\nzoom = 11")?;
        file.flush()?;

        let config = AppConfig::load(Some(file.path()))?;

        assert_eq!(config.input.path, PathBuf::from("data/clientes.csv"));
        assert_eq!(config.map.zoom, 11);
        assert_eq!(config.map.height_px, 650);
        assert_eq!(config.server.port, 8501);
        Ok(())
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = AppConfig::load(Some(Path::new("does/not/exist.toml")));
        assert!(matches!(result, Err(MapError::ConfigSource(_))));
    }
}
