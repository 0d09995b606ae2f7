use super::commands::EngineCommand;
use super::state::SceneManager;

/// Apply one control message to the scene manager.
///
/// Invalid arguments were already rejected on the input worker; anything
/// that survives to here mutates state or is dropped with a warning inside
/// the manager. Nothing in this path can fail the frame loop.
pub fn handle_command(command: EngineCommand, manager: &mut SceneManager) {
    match command {
        EngineCommand::LoadShow(set) => manager.load_show(set),
        EngineCommand::LoadDissolves(set) => manager.load_dissolves(set),
        EngineCommand::CacheScene(id) => manager.cache_scene(id),
        EngineCommand::CacheEffect(id) => manager.cache_effect(id),
        EngineCommand::CachePalette(id) => manager.cache_palette(id),
        EngineCommand::TriggerPattern => manager.trigger_pattern(),
        EngineCommand::Pause => manager.pause(),
        EngineCommand::Resume => manager.resume(),
        EngineCommand::SetDissolvePattern(id) => manager.set_dissolve_pattern(id),
        EngineCommand::SetSpeedPercent(value) => manager.set_speed_percent(value),
        EngineCommand::SetMasterBrightness(value) => manager.set_master_brightness(value),
        EngineCommand::UpdatePaletteEntry {
            palette,
            color,
            rgb,
        } => manager.update_palette_entry(palette, color, rgb),
    }
}
