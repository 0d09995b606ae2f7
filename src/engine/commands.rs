use crate::color::Rgb;
use crate::types::{DissolveSet, SceneSet};

/// Control messages consumed by the scene-manager dispatcher.
///
/// One tagged variant per control-channel operation; the queue is drained in
/// a single step at the top of each frame, so a batch of commands is either
/// fully visible at frame N+1 or not at all.
#[derive(Clone, Debug)]
pub enum EngineCommand {
    /// Replace the loaded show. Parsing happened on the input worker; the
    /// render thread only swaps the data in.
    LoadShow(SceneSet),
    /// Replace the loaded dissolve patterns.
    LoadDissolves(DissolveSet),
    CacheScene(usize),
    CacheEffect(usize),
    CachePalette(usize),
    TriggerPattern,
    Pause,
    Resume,
    SetDissolvePattern(usize),
    SetSpeedPercent(i64),
    SetMasterBrightness(i64),
    UpdatePaletteEntry {
        palette: usize,
        color: usize,
        rgb: Rgb,
    },
}
