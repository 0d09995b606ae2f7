use super::state::SceneManager;
use crate::color::Rgb;
use crate::dissolve::DissolveSource;
use std::time::Instant;

/// Produce the frame for `now`: the active pattern, or the per-LED merge of
/// both dissolve sides while a transition runs.
///
/// Master brightness is applied by the loop afterwards; the frame kept in
/// `last_frame` stays at scene level so a replaced dissolve fades from the
/// un-dimmed colors.
pub fn render_frame(manager: &mut SceneManager, default_led_count: usize, now: Instant) -> Vec<Rgb> {
    let led_count = manager.led_count(default_led_count);

    let frame = match &manager.dissolve {
        Some(dissolve) => {
            let target_frame = manager.render_selection(dissolve.target, led_count, now);
            let merged = match &dissolve.source {
                DissolveSource::Selection(selection) => {
                    let source_frame = manager.render_selection(*selection, led_count, now);
                    dissolve.merged_frame(&source_frame, &target_frame, now)
                }
                DissolveSource::Frame(frozen) => dissolve.merged_frame(frozen, &target_frame, now),
            };
            merged
        }
        None => manager.render_selection(manager.active, led_count, now),
    };

    // Once every covered LED has finished, the merged frame equals the
    // target; commit the selection and retire the transition.
    let complete = manager
        .dissolve
        .as_ref()
        .is_some_and(|dissolve| dissolve.is_complete(now, led_count));
    if complete {
        if let Some(dissolve) = manager.dissolve.take() {
            manager.active = dissolve.target;
            log::info!(
                "dissolve complete, active selection is now {:?}",
                manager.active
            );
        }
    }

    manager.last_frame = frame.clone();
    frame
}
