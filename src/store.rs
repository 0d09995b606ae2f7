//! JSON ingestion of show and dissolve files.
//!
//! Loading happens off the render thread (on the input worker or at
//! startup); the parsed data is sanitized here once so the render path never
//! revalidates anything.

use crate::types::{DissolveSet, SceneSet};
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

/// Control-channel paths may omit the `.json` suffix.
fn resolve_path(path: &str) -> PathBuf {
    if path.to_ascii_lowercase().ends_with(".json") {
        PathBuf::from(path)
    } else {
        PathBuf::from(format!("{path}.json"))
    }
}

pub fn load_scene_set(path: &str) -> Result<SceneSet> {
    let path = resolve_path(path);
    let text = fs::read_to_string(&path)
        .with_context(|| format!("reading scene file {}", path.display()))?;
    let mut set: SceneSet = serde_json::from_str(&text)
        .with_context(|| format!("parsing scene file {}", path.display()))?;
    set.sanitize();
    info!("loaded {} scene(s) from {}", set.scenes.len(), path.display());
    Ok(set)
}

pub fn load_dissolve_set(path: &str) -> Result<DissolveSet> {
    let path = resolve_path(path);
    let text = fs::read_to_string(&path)
        .with_context(|| format!("reading dissolve file {}", path.display()))?;
    let set: DissolveSet = serde_json::from_str(&text)
        .with_context(|| format!("parsing dissolve file {}", path.display()))?;
    info!(
        "loaded {} dissolve pattern(s) from {}",
        set.dissolve_patterns.len(),
        path.display()
    );
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_suffix_is_appended_once() {
        assert_eq!(resolve_path("show"), PathBuf::from("show.json"));
        assert_eq!(resolve_path("show.json"), PathBuf::from("show.json"));
        assert_eq!(resolve_path("SHOW.JSON"), PathBuf::from("SHOW.JSON"));
    }

    #[test]
    fn scene_set_parses_and_sanitizes() {
        let text = r#"{
            "scenes": [{
                "scene_id": 0,
                "led_count": 10,
                "fps": 500,
                "palettes": [[[255, 0, 0], [0, 255, 0]]],
                "effects": [{
                    "effect_id": 0,
                    "segments": [{
                        "segment_id": 0,
                        "color": [0, 1],
                        "transparency": [2.0],
                        "length": [4, 4, 4],
                        "move_range": [9, 0],
                        "dimmer_time": [[-5, 0, 150]]
                    }]
                }]
            }]
        }"#;
        let mut set: SceneSet = serde_json::from_str(text).unwrap();
        set.sanitize();

        let scene = &set.scenes[0];
        assert_eq!(scene.fps, 240);
        assert_eq!(scene.palettes[0].len(), 6);

        let segment = &scene.effects[0].segments[0];
        assert_eq!(segment.transparency, vec![1.0, 0.0]);
        assert_eq!(segment.length, vec![4, 4]);
        assert_eq!(segment.move_range, [0, 9]);
        assert_eq!(segment.dimmer_time[0].duration_ms, 0);
        assert_eq!(segment.dimmer_time[0].end_brightness, 100);
    }

    #[test]
    fn dissolve_set_parses_fade_windows() {
        let text = r#"{"dissolve_patterns": [[[0, 1000, 0, 0], [-10, 500, 100, 200]]]}"#;
        let set: DissolveSet = serde_json::from_str(text).unwrap();
        let pattern = &set.dissolve_patterns[0];
        assert_eq!(pattern[0].fade_in_ms, 1000);
        assert_eq!(pattern[1].start_ms, 0);
        assert_eq!(pattern[1].end_ms(), 800);
    }
}
