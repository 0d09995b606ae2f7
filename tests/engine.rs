use ledanim::color::Rgb;
use ledanim::engine::renderer::render_frame;
use ledanim::engine::{tick_frame, SceneManager};
use ledanim::types::{Effect, Scene, SceneSet, Segment, Selection, PALETTE_SIZE};
use std::time::{Duration, Instant};

fn full_palette(first: Rgb) -> Vec<Rgb> {
    let mut palette = vec![first];
    palette.resize(PALETTE_SIZE, [0, 0, 0]);
    palette
}

fn solid_segment(color_index: i64, leds: i64) -> Segment {
    let mut seg = Segment::new(0);
    seg.color = vec![color_index];
    seg.transparency = vec![0.0];
    seg.length = vec![leds];
    seg.move_range = [0, leds.max(1) - 1];
    seg
}

/// One scene, two palettes (white / green), two effects (color point 0 / 1).
fn two_way_show() -> SceneSet {
    SceneSet {
        scenes: vec![Scene {
            scene_id: 0,
            led_count: 10,
            fps: 60,
            current_effect_id: 0,
            current_palette_id: 0,
            palettes: vec![full_palette([255, 255, 255]), full_palette([0, 255, 0])],
            effects: vec![
                Effect {
                    effect_id: 0,
                    segments: vec![solid_segment(0, 10)],
                },
                Effect {
                    effect_id: 1,
                    segments: vec![solid_segment(1, 10)],
                },
            ],
        }],
    }
}

fn manager_with_show() -> SceneManager {
    let mut manager = SceneManager::new(255, 100);
    manager.load_show(two_way_show());
    manager
}

#[test]
fn show_plays_immediately_after_load() {
    let mut manager = manager_with_show();
    let frame = render_frame(&mut manager, 225, Instant::now());
    assert_eq!(frame, vec![[255, 255, 255]; 10]);
}

#[test]
fn cached_changes_are_invisible_until_triggered() {
    let mut manager = manager_with_show();
    let now = Instant::now();
    let before = render_frame(&mut manager, 225, now);

    manager.cache_effect(1);
    manager.cache_palette(1);
    assert_eq!(
        manager.pending,
        Selection {
            scene: 0,
            effect: 1,
            palette: 1
        }
    );

    // Byte-identical output until /change_pattern applies the cache.
    let after = render_frame(&mut manager, 225, now);
    assert_eq!(before, after);
    assert_eq!(manager.active, Selection::default());
}

#[test]
fn trigger_without_patterns_switches_instantly() {
    let mut manager = manager_with_show();
    manager.cache_effect(1);
    manager.trigger_pattern();
    assert!(manager.dissolve.is_none());
    assert_eq!(manager.active.effect, 1);

    // Effect 1 paints with color point 1 (black in palette 0 beyond entry 0).
    let frame = render_frame(&mut manager, 225, Instant::now());
    assert_eq!(frame, vec![[0, 0, 0]; 10]);
}

#[test]
fn trigger_with_no_pending_changes_is_a_no_op() {
    let mut manager = manager_with_show();
    manager.trigger_pattern();
    assert!(manager.dissolve.is_none());
    assert_eq!(manager.active, manager.pending);
}

#[test]
fn invalid_cache_ids_leave_pending_unchanged() {
    let mut manager = manager_with_show();
    let pending = manager.pending;
    manager.cache_scene(7);
    manager.cache_effect(9);
    manager.cache_palette(3);
    assert_eq!(manager.pending, pending);
}

#[test]
fn palette_update_is_visible_on_the_next_frame() {
    let mut manager = manager_with_show();
    manager.update_palette_entry(0, 0, [9, 8, 7]);
    let frame = render_frame(&mut manager, 225, Instant::now());
    assert_eq!(frame, vec![[9, 8, 7]; 10]);
}

#[test]
fn palette_update_with_bad_indices_is_dropped() {
    let mut manager = manager_with_show();
    manager.update_palette_entry(5, 0, [1, 2, 3]);
    manager.update_palette_entry(0, 6, [1, 2, 3]);
    let frame = render_frame(&mut manager, 225, Instant::now());
    assert_eq!(frame, vec![[255, 255, 255]; 10]);
}

#[test]
fn brightness_and_speed_inputs_are_clamped() {
    let mut manager = manager_with_show();
    manager.set_master_brightness(400);
    assert_eq!(manager.master_brightness, 255);
    manager.set_master_brightness(-5);
    assert_eq!(manager.master_brightness, 0);

    manager.set_speed_percent(5000);
    assert_eq!(manager.speed_percent, 1023);
    manager.set_speed_percent(-1);
    assert_eq!(manager.speed_percent, 0);
}

#[test]
fn compositor_discards_leds_outside_the_strip() {
    let mut manager = manager_with_show();
    {
        let seg = &mut manager.scene_set.scenes[0].effects[0].segments[0];
        seg.length = vec![5];
        seg.current_position = 8;
    }
    let frame = render_frame(&mut manager, 225, Instant::now());
    assert_eq!(&frame[0..8], vec![[0, 0, 0]; 8].as_slice());
    assert_eq!(frame[8], [255, 255, 255]);
    assert_eq!(frame[9], [255, 255, 255]);

    {
        let seg = &mut manager.scene_set.scenes[0].effects[0].segments[0];
        seg.current_position = -3;
    }
    let frame = render_frame(&mut manager, 225, Instant::now());
    assert_eq!(frame[0], [255, 255, 255]);
    assert_eq!(frame[1], [255, 255, 255]);
    assert_eq!(&frame[2..], vec![[0, 0, 0]; 8].as_slice());
}

#[test]
fn paused_ticks_produce_no_frame() {
    let mut manager = manager_with_show();
    {
        let seg = &mut manager.scene_set.scenes[0].effects[0].segments[0];
        seg.length = vec![1];
        seg.move_speed = 60.0;
        seg.is_edge_reflect = false;
        seg.move_range = [0, 9];
    }
    let now = Instant::now();
    assert!(tick_frame(&mut manager, 225, 60, now).is_some());
    let frame_before = manager.last_frame.clone();
    let position_before = manager.scene_set.scenes[0].effects[0].segments[0].current_position;

    // While paused nothing leaves the engine and nothing moves.
    manager.pause();
    for tick in 1..=5u64 {
        let later = now + Duration::from_millis(16 * tick);
        assert!(tick_frame(&mut manager, 225, 60, later).is_none());
    }
    assert_eq!(manager.last_frame, frame_before);
    assert_eq!(
        manager.scene_set.scenes[0].effects[0].segments[0].current_position,
        position_before
    );

    // Resuming picks playback straight back up.
    manager.resume();
    let resumed = tick_frame(&mut manager, 225, 60, now + Duration::from_millis(100));
    assert!(resumed.is_some());
    assert_ne!(
        manager.scene_set.scenes[0].effects[0].segments[0].current_position,
        position_before
    );
}

#[test]
fn ticks_without_a_show_produce_no_frame() {
    let mut manager = SceneManager::new(255, 100);
    assert!(tick_frame(&mut manager, 225, 60, Instant::now()).is_none());
}

#[test]
fn pause_gates_playback_without_touching_the_dimmer_clock() {
    let mut manager = manager_with_show();
    let birth = manager.scene_set.scenes[0].effects[0].segments[0].segment_start_time;

    manager.pause();
    assert!(manager.paused);
    manager.pause(); // idempotent
    assert!(manager.paused);
    manager.resume();
    assert!(!manager.paused);

    // The dimmer phase is wall-clock time since segment birth; pausing must
    // not reset it, so a paused interval elapses like any other.
    let after = manager.scene_set.scenes[0].effects[0].segments[0].segment_start_time;
    assert_eq!(birth, after);

    let seg = &mut manager.scene_set.scenes[0].effects[0].segments[0];
    seg.dimmer_time = vec![ledanim::types::DimmerStep::from((1000, 0, 100))];
    assert_eq!(seg.brightness_at(birth + Duration::from_millis(500)), 0.5);
}

#[test]
fn speed_percent_drives_movement_through_the_manager() {
    let mut manager = manager_with_show();
    {
        let seg = &mut manager.scene_set.scenes[0].effects[0].segments[0];
        seg.length = vec![1];
        seg.move_speed = 60.0;
        seg.is_edge_reflect = false;
        seg.move_range = [0, 9];
    }
    manager.set_speed_percent(200);
    // 60 LEDs/s at 60 fps, doubled: two LEDs per frame.
    manager.advance_animation(60.0);
    assert_eq!(
        manager.scene_set.scenes[0].effects[0].segments[0].current_position,
        2
    );
}
