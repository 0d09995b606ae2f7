use crate::color::{Rgb, BLACK};
use crate::dissolve::{Dissolve, DissolveSource};
use crate::types::{DissolveSet, Scene, SceneSet, Selection, PALETTE_SIZE};
use log::{debug, info, warn};
use std::time::Instant;

/// Owns the loaded show and the playback state the frame loop renders from.
///
/// Control messages mutate this through the command handler, always between
/// two frames, so every frame observes a consistent snapshot.
pub struct SceneManager {
    pub scene_set: SceneSet,
    pub dissolve_set: DissolveSet,
    /// What is currently visible.
    pub active: Selection,
    /// What has been cached for the next `/change_pattern`.
    pub pending: Selection,
    pub dissolve: Option<Dissolve>,
    pub paused: bool,
    pub master_brightness: u8,
    pub speed_percent: u16,
    pub dissolve_pattern_index: usize,
    /// The most recent rendered frame, before master brightness. Serves as
    /// the frozen source when a running dissolve is replaced.
    pub last_frame: Vec<Rgb>,
}

impl SceneManager {
    pub fn new(master_brightness: u8, speed_percent: u16) -> Self {
        Self {
            scene_set: SceneSet::default(),
            dissolve_set: DissolveSet::default(),
            active: Selection::default(),
            pending: Selection::default(),
            dissolve: None,
            paused: false,
            master_brightness,
            speed_percent: speed_percent.min(1023),
            dissolve_pattern_index: 0,
            last_frame: Vec::new(),
        }
    }

    pub fn has_show(&self) -> bool {
        !self.scene_set.is_empty()
    }

    pub fn active_scene(&self) -> Option<&Scene> {
        self.scene_set.scenes.get(self.active.scene)
    }

    /// The scene the next frame belongs to: the dissolve target while one is
    /// running, the active scene otherwise.
    fn frame_scene(&self) -> Option<&Scene> {
        let selection = match &self.dissolve {
            Some(dissolve) => dissolve.target,
            None => self.active,
        };
        self.scene_set.scenes.get(selection.scene)
    }

    pub fn fps(&self, fallback: u32) -> u32 {
        self.frame_scene().map(|s| s.fps).unwrap_or(fallback)
    }

    pub fn led_count(&self, fallback: usize) -> usize {
        self.frame_scene().map(|s| s.led_count).unwrap_or(fallback)
    }

    pub fn speed_factor(&self) -> f32 {
        self.speed_percent as f32 / 100.0
    }

    /// Replace the loaded show. Playback restarts on the first scene with its
    /// own default effect/palette selection; animation begins on the next
    /// frame.
    pub fn load_show(&mut self, mut set: SceneSet) {
        set.sanitize();
        self.scene_set = set;
        self.active = self
            .scene_set
            .scenes
            .first()
            .map(|scene| Selection {
                scene: 0,
                effect: scene.current_effect_id,
                palette: scene.current_palette_id,
            })
            .unwrap_or_default();
        self.pending = self.active;
        self.dissolve = None;
        self.last_frame = vec![BLACK; self.led_count(0)];
        info!(
            "show loaded: {} scene(s), starting at scene {} effect {} palette {}",
            self.scene_set.scenes.len(),
            self.active.scene,
            self.active.effect,
            self.active.palette
        );
    }

    pub fn load_dissolves(&mut self, set: DissolveSet) {
        info!(
            "dissolve set loaded: {} pattern(s)",
            set.dissolve_patterns.len()
        );
        self.dissolve_set = set;
    }

    /// Cache a scene change. The pending effect/palette follow the new
    /// scene's own defaults until overridden by further cache commands.
    pub fn cache_scene(&mut self, id: usize) {
        match self.scene_set.scenes.get(id) {
            Some(scene) => {
                self.pending = Selection {
                    scene: id,
                    effect: scene.current_effect_id,
                    palette: scene.current_palette_id,
                };
                debug!("scene {} cached, waiting for /change_pattern", id);
            }
            None => warn!(
                "scene {} not found ({} loaded), change dropped",
                id,
                self.scene_set.scenes.len()
            ),
        }
    }

    pub fn cache_effect(&mut self, id: usize) {
        let available = self
            .scene_set
            .scenes
            .get(self.pending.scene)
            .map(|scene| scene.effects.len())
            .unwrap_or(0);
        if id < available {
            self.pending.effect = id;
            debug!("effect {} cached, waiting for /change_pattern", id);
        } else {
            warn!(
                "effect {} not found in scene {} ({} available), change dropped",
                id, self.pending.scene, available
            );
        }
    }

    pub fn cache_palette(&mut self, id: usize) {
        let available = self
            .scene_set
            .scenes
            .get(self.pending.scene)
            .map(|scene| scene.palettes.len())
            .unwrap_or(0);
        if id < available {
            self.pending.palette = id;
            debug!("palette {} cached, waiting for /change_pattern", id);
        } else {
            warn!(
                "palette {} not found in scene {} ({} available), change dropped",
                id, self.pending.scene, available
            );
        }
    }

    /// Apply the cached selection. With a dissolve pattern available the
    /// switch crossfades per LED; without one it is instant. Triggering while
    /// a dissolve runs replaces it, fading on from the current merged frame.
    pub fn trigger_pattern(&mut self) {
        if !self.has_show() {
            warn!("no show loaded, /change_pattern ignored");
            return;
        }
        if self.pending == self.active {
            debug!("no pending changes, /change_pattern is a no-op");
            return;
        }
        match self.dissolve_set.pattern(self.dissolve_pattern_index) {
            Some(pattern) => {
                let source = if self.dissolve.is_some() {
                    DissolveSource::Frame(self.last_frame.clone())
                } else {
                    DissolveSource::Selection(self.active)
                };
                info!(
                    "dissolve started: {:?} -> {:?} (pattern {})",
                    self.active, self.pending, self.dissolve_pattern_index
                );
                self.dissolve = Some(Dissolve::new(pattern.clone(), source, self.pending));
            }
            None => {
                info!(
                    "no dissolve pattern selected, switching instantly: {:?} -> {:?}",
                    self.active, self.pending
                );
                self.active = self.pending;
                self.dissolve = None;
            }
        }
    }

    pub fn set_dissolve_pattern(&mut self, id: usize) {
        if self.dissolve_set.pattern(id).is_some() {
            self.dissolve_pattern_index = id;
            info!("dissolve pattern set to {}", id);
        } else {
            warn!(
                "dissolve pattern {} not found ({} loaded)",
                id,
                self.dissolve_set.dissolve_patterns.len()
            );
        }
    }

    pub fn pause(&mut self) {
        if self.paused {
            debug!("already paused");
            return;
        }
        self.paused = true;
        info!("playback paused, output stopped");
    }

    pub fn resume(&mut self) {
        if !self.paused {
            debug!("not paused");
            return;
        }
        self.paused = false;
        info!("playback resumed");
    }

    pub fn set_master_brightness(&mut self, value: i64) {
        let clamped = value.clamp(0, 255) as u8;
        if clamped as i64 != value {
            warn!(
                "master brightness {} out of range, clamped to {}",
                value, clamped
            );
        }
        self.master_brightness = clamped;
    }

    pub fn set_speed_percent(&mut self, value: i64) {
        let clamped = value.clamp(0, 1023) as u16;
        if clamped as i64 != value {
            warn!("speed percent {} out of range, clamped to {}", value, clamped);
        }
        self.speed_percent = clamped;
    }

    /// Update one color entry of a palette on the active scene. Takes effect
    /// on the next rendered frame.
    pub fn update_palette_entry(&mut self, palette: usize, color: usize, rgb: Rgb) {
        if color >= PALETTE_SIZE {
            warn!("palette color index {} out of range, update dropped", color);
            return;
        }
        let scene_index = self.active.scene;
        let Some(scene) = self.scene_set.scenes.get_mut(scene_index) else {
            warn!("no active scene, palette update dropped");
            return;
        };
        match scene.palettes.get_mut(palette) {
            Some(entries) => {
                entries[color] = rgb;
                debug!(
                    "palette {}[{}] = ({},{},{}) on scene {}",
                    palette, color, rgb[0], rgb[1], rgb[2], scene_index
                );
            }
            None => warn!(
                "palette {} not found in scene {} ({} available), update dropped",
                palette,
                scene_index,
                scene.palettes.len()
            ),
        }
    }

    /// Advance movement for every effect visible this frame: the active one,
    /// or both sides of a running dissolve (deduplicated when they share an
    /// effect, so no segment moves twice per frame).
    pub fn advance_animation(&mut self, fps: f32) {
        let mut targets: Vec<(usize, usize)> = Vec::new();
        match &self.dissolve {
            Some(dissolve) => {
                targets.push((dissolve.target.scene, dissolve.target.effect));
                if let DissolveSource::Selection(source) = &dissolve.source {
                    let key = (source.scene, source.effect);
                    if !targets.contains(&key) {
                        targets.push(key);
                    }
                }
            }
            None => targets.push((self.active.scene, self.active.effect)),
        }

        let factor = self.speed_factor();
        for (scene_index, effect_index) in targets {
            if let Some(effect) = self
                .scene_set
                .scenes
                .get_mut(scene_index)
                .and_then(|scene| scene.effects.get_mut(effect_index))
            {
                effect.advance_all(fps, factor);
            }
        }
    }

    /// Render one selection into a fresh strip buffer. Invalid indices fall
    /// back to a black frame rather than failing.
    pub fn render_selection(
        &self,
        selection: Selection,
        led_count: usize,
        now: Instant,
    ) -> Vec<Rgb> {
        let mut frame = vec![BLACK; led_count];
        if let Some(scene) = self.scene_set.scenes.get(selection.scene) {
            if let Some(effect) = scene.effects.get(selection.effect) {
                effect.render_to(scene.palette(selection.palette), now, &mut frame);
            }
        }
        frame
    }
}
