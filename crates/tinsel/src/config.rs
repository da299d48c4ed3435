use crate::events::AppEvent;
use async_channel::Sender;
use choreo::{ImageRef, Layout, ParamsError, SceneParams};
use directories::ProjectDirs;
use fs_err as fs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff"];

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: i32,
    pub height: i32,
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            fullscreen: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Shown in this order, before anything found in `photo_dir`.
    #[serde(default)]
    pub photos: Vec<ImageRef>,
    #[serde(default)]
    pub photo_dir: Option<PathBuf>,
    #[serde(default)]
    pub captions: Vec<String>,
    /// Fixes per-card speeds and sway phases across runs.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub initial_layout: Layout,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub scene: SceneParams,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid scene parameters: {0}")]
    Params(#[from] ParamsError),
}

impl Config {
    /// The image list source: explicit photos first, then the directory scan.
    pub fn images(&self) -> Vec<ImageRef> {
        let mut images = self.photos.clone();
        if let Some(dir) = &self.photo_dir {
            images.extend(scan_photo_dir(dir));
        }
        images
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Image files directly inside `dir`, sorted by file name.
pub fn scan_photo_dir(dir: &Path) -> Vec<ImageRef> {
    let read_dir = match fs::read_dir(dir) {
        Ok(r) => r,
        Err(e) => {
            log::warn!("Cannot read photo directory: {}", e);
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = read_dir
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && is_image(p))
        .collect();
    paths.sort();

    paths
        .into_iter()
        .map(|p| ImageRef::new(p.to_string_lossy()))
        .collect()
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "tinsel", "tinsel").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// `TINSEL_SEED=7`, `TINSEL_SCENE__ROTATION__DECAY=0.9`, ...
fn environment() -> config::Environment {
    config::Environment::with_prefix("TINSEL")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn load_with(path: &Path, env: config::Environment) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(env)
        .build()?;

    let config: Config = s.try_deserialize()?;
    config.scene.validate()?;
    Ok(config)
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    load_with(path, environment())
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&get_config_path()?)
}

/// Falls back to the defaults when the file is missing or broken.
pub fn load_or_default(path: Option<&Path>) -> Config {
    let result = match path {
        Some(p) => load_config_from(p),
        None => load_config(),
    };
    result.unwrap_or_else(|e| {
        log::error!("Using default configuration: {}", e);
        Config::default()
    })
}

/// Anchors a relative `--config` path to the working directory so the watcher
/// has a directory to watch.
pub fn resolve_config_path(path: PathBuf) -> std::io::Result<PathBuf> {
    std::path::absolute(path)
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

pub async fn run_async_watcher(config_path: PathBuf, tx: Sender<AppEvent>) {
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(s: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(s, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_bundled_default_config_parses() {
        let config = from_toml(DEFAULT_CONFIG);
        assert_eq!(config.initial_layout, Layout::Formed);
        assert_eq!(config.scene, SceneParams::default());
        assert!(!config.captions.is_empty());
        assert_eq!(config.scene.validate(), Ok(()));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = from_toml(
            r#"
            photos = ["a.png", "b.png"]
            initial_layout = "carousel"
            seed = 7

            [scene.rotation]
            angular_speed = 0.9
            "#,
        );
        assert_eq!(
            config.photos,
            vec![ImageRef::new("a.png"), ImageRef::new("b.png")]
        );
        assert_eq!(config.initial_layout, Layout::Chaos);
        assert_eq!(config.seed, Some(7));
        assert!((config.scene.rotation.angular_speed - 0.9).abs() < 1e-6);
        assert_eq!(config.scene.rotation.decay, 0.95);
        assert_eq!(config.window.width, 1280);
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = std::env::temp_dir().join(format!("tinsel-env-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "initial_layout = \"formed\"\nseed = 1\n").unwrap();

        let vars = config::Map::from([
            ("TINSEL_INITIAL_LAYOUT".to_string(), "chaos".to_string()),
            ("TINSEL_SEED".to_string(), "42".to_string()),
            (
                "TINSEL_SCENE__ROTATION__DECAY".to_string(),
                "0.5".to_string(),
            ),
            ("TINSELX_SEED".to_string(), "3".to_string()),
        ]);
        let config = load_with(&path, environment().source(Some(vars))).unwrap();

        assert_eq!(config.initial_layout, Layout::Chaos);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.scene.rotation.decay, 0.5);
        assert_eq!(config.scene.rotation.angular_speed, 0.45);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_environment_is_ignored_without_overrides() {
        let missing = std::env::temp_dir().join("tinsel-no-such-config.toml");
        let config = load_with(&missing, environment().source(Some(config::Map::new()))).unwrap();
        assert_eq!(config.initial_layout, Layout::Formed);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_relative_config_path_gets_a_parent() {
        let resolved = resolve_config_path(PathBuf::from("tinsel.toml")).unwrap();
        assert!(resolved.is_absolute());
        assert!(
            resolved
                .parent()
                .is_some_and(|p| !p.as_os_str().is_empty())
        );
        assert!(resolved.ends_with("tinsel.toml"));
    }

    #[test]
    fn test_photo_dir_is_scanned_in_name_order() {
        let dir = std::env::temp_dir().join(format!("tinsel-photos-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for name in ["b.JPG", "a.png", "notes.txt", "c.webp"] {
            fs::write(dir.join(name), b"").unwrap();
        }

        let config = Config {
            photos: vec![ImageRef::new("first.png")],
            photo_dir: Some(dir.clone()),
            ..Config::default()
        };
        let names: Vec<String> = config
            .images()
            .iter()
            .map(|i| {
                Path::new(i.as_str())
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        assert_eq!(names, vec!["first.png", "a.png", "b.JPG", "c.webp"]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_photo_dir_yields_nothing() {
        let missing = std::env::temp_dir().join("tinsel-definitely-not-here");
        assert!(scan_photo_dir(&missing).is_empty());
    }
}
