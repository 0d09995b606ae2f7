pub mod commands;
pub mod handler;
pub mod renderer;
pub mod state;

pub use commands::EngineCommand;
pub use state::SceneManager;

use crate::color::{self, Rgb};
use crate::config::Settings;
use crate::output::LedOutput;
use crate::perf::PerfMonitor;
use log::info;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

/// One tick of playback: integrate movement, render, apply master
/// brightness. Returns the frame to emit, or `None` while paused or without
/// a loaded show — a paused tick produces no frame and moves nothing.
pub fn tick_frame(
    manager: &mut SceneManager,
    default_led_count: usize,
    fps: u32,
    now: Instant,
) -> Option<Vec<Rgb>> {
    if manager.paused || !manager.has_show() {
        return None;
    }
    manager.advance_animation(fps as f32);
    let mut frame = renderer::render_frame(manager, default_led_count, now);
    color::apply_master_brightness_to_frame(&mut frame, manager.master_brightness);
    Some(frame)
}

/// Run the frame loop until the control channel disconnects.
///
/// One tick per `1/fps` seconds, fps taken from the scene being played
/// (falling back to the configured target while no show is loaded). Each
/// tick: drain control messages, integrate movement, render, dim, emit.
/// While paused the loop keeps draining commands but produces no frames.
/// A frame that overruns its budget does not accumulate debt; the sleep is
/// simply dropped and the next frame starts immediately.
pub fn run_engine(
    command_rx: Receiver<EngineCommand>,
    settings: &Settings,
    mut manager: SceneManager,
    output: LedOutput,
) {
    let mut perf = PerfMonitor::new();

    loop {
        let frame_start = Instant::now();

        // Apply queued control messages in one step so a frame never
        // observes half a batch.
        loop {
            match command_rx.try_recv() {
                Ok(command) => handler::handle_command(command, &mut manager),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    info!("control channel closed, stopping engine");
                    return;
                }
            }
        }

        let fps = manager.fps(settings.target_fps).max(1);
        let frame_budget = Duration::from_secs_f64(1.0 / fps as f64);

        if let Some(frame) = tick_frame(&mut manager, settings.led_count, fps, frame_start) {
            output.send_frame(&frame);
            perf.record(frame_start.elapsed(), frame_budget);
        }

        if let Some(sleep) = frame_budget.checked_sub(frame_start.elapsed()) {
            thread::sleep(sleep);
        }
    }
}
