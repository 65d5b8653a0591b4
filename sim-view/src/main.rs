//! Application entry point for the palm-tree viewer.
//!
//! This binary sets up logging and eframe/egui and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.
//!
//! Usage: `palm-view [config.json]`. The optional JSON file holds a
//! `SimConfig`; any field left out keeps its default.

mod viewer;

use anyhow::{Context, Result, anyhow};
use sim_core::config::SimConfig;
use std::path::Path;
use viewer::Viewer;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

/// Loads the configuration and launches the native window titled
/// `"Palm Tree"`.
fn run() -> Result<()> {
    let viewer = match std::env::args().nth(1) {
        Some(path) => Viewer::with_config(load_config(Path::new(&path))?),
        None => Viewer::new(),
    };

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Palm Tree",
        options,
        Box::new(move |_cc| Ok(Box::new(viewer))),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}

fn load_config(path: &Path) -> Result<SimConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = serde_json::from_str(&content)
        .with_context(|| format!("parsing config {}", path.display()))?;
    log::info!("loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_file(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("palm-view-{}-{name}", std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let path = scratch_file(
            "partial.json",
            r#"{ "wind": { "strength": 0.001 }, "shed": { "speed_threshold": 1.5 } }"#,
        );
        let cfg = load_config(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(cfg.wind.strength, 0.001);
        assert_eq!(cfg.shed.speed_threshold, 1.5);
        assert_eq!(cfg.wind.jitter, SimConfig::default().wind.jitter);
        assert_eq!(cfg.world, SimConfig::default().world);
    }

    #[test]
    fn world_settings_parse() {
        let path = scratch_file(
            "world.json",
            r#"{ "world": { "gravity": [0.0, -0.1], "floor": null, "iterations": 2 } }"#,
        );
        let cfg = load_config(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(cfg.world.gravity, glam::Vec2::new(0.0, -0.1));
        assert_eq!(cfg.world.floor, None);
        assert_eq!(cfg.world.iterations, 2);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_config(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(format!("{err:#}").contains("reading config"));
    }

    #[test]
    fn malformed_file_is_reported() {
        let path = scratch_file("bad.json", "{ wind: ");
        let err = load_config(&path).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(format!("{err:#}").contains("parsing config"));
    }
}
