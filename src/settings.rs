use crate::error::EditorError;
use crate::map::MAX_MAP_SIZE;
use crate::tileset::{MAX_TILE_SIZE, MIN_TILE_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Persistent editor settings (`settings.toml`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Width of the tile sheet pane, pixels.
    pub horizontal_offset: u32,
    /// Map pane zoom factor.
    pub zoom_level: u32,
    /// Map columns.
    pub map_width: u32,
    /// Map rows.
    pub map_height: u32,
    /// Window and splitter geometry, kept verbatim for the host.
    pub ui: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tile_width: 32,
            tile_height: 32,
            horizontal_offset: 360,
            zoom_level: 1,
            map_width: 64,
            map_height: 64,
            ui: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Reads `path`; a missing or broken file yields defaults.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::try_load(path) {
            Ok(s) => {
                info!("Loaded settings from {:?}", path);
                s
            }
            Err(e) => {
                error!("{}", e);
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self, EditorError> {
        let content = fs::read_to_string(path).map_err(|source| EditorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings = toml::from_str(&content).map_err(|source| EditorError::Settings {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(settings.sanitized())
    }

    /// Clamps values the editor cannot work with.
    pub fn sanitized(mut self) -> Self {
        self.tile_width = self.tile_width.clamp(MIN_TILE_SIZE, MAX_TILE_SIZE);
        self.tile_height = self.tile_height.clamp(MIN_TILE_SIZE, MAX_TILE_SIZE);
        self.zoom_level = self.zoom_level.max(1);
        self.map_width = self.map_width.clamp(1, MAX_MAP_SIZE);
        self.map_height = self.map_height.clamp(1, MAX_MAP_SIZE);
        self
    }

    /// Writes the settings as TOML.
    pub fn save(&self, path: &Path) -> Result<(), EditorError> {
        let content = toml::to_string_pretty(self).map_err(|e| EditorError::InvalidDocument {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        fs::write(path, content).map_err(|source| EditorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file(name: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock went backwards")
            .as_nanos();
        std::env::temp_dir().join(format!("mq_map_editor_{nanos}_{name}"))
    }

    #[test]
    fn round_trips_through_toml() {
        let path = temp_file("settings.toml");
        let mut s = Settings::default();
        s.tile_width = 16;
        s.ui.insert("main-window".into(), "AdnQywADAAAAAA".into());
        s.save(&path).expect("save");
        assert_eq!(Settings::load(&path), s);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn partial_file_fills_defaults_and_clamps() {
        let path = temp_file("partial.toml");
        fs::write(&path, "tile-width = 2\nmap-height = 10\n").unwrap();
        let s = Settings::load(&path);
        assert_eq!(s.tile_width, MIN_TILE_SIZE);
        assert_eq!(s.map_height, 10);
        assert_eq!(s.map_width, Settings::default().map_width);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn huge_map_size_is_clamped() {
        let path = temp_file("huge.toml");
        fs::write(&path, "map-width = 65536\nmap-height = 0\n").unwrap();
        let s = Settings::load(&path);
        assert_eq!((s.map_width, s.map_height), (MAX_MAP_SIZE, 1));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn broken_file_yields_defaults() {
        let path = temp_file("broken.toml");
        fs::write(&path, "tile-width = [").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
        let _ = fs::remove_file(&path);
    }
}
