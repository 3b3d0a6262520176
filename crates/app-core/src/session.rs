//! AR interaction session: tap handling, video placement, and the timed
//! fish-swarm choreography.
//!
//! The session owns the scene graph, the current video anchor, the spawn
//! deadline, and the fish batch. Everything runs on the frontend's single
//! drive loop; `tick` is called once per frame with the loop's clock.

use glam::{Quat, Vec2, Vec3};
use rand::prelude::*;
use smallvec::SmallVec;

use crate::constants::{
    BOB_AMPLITUDE, BOB_FREQUENCY, FISH_ASSET, FISH_BASE_Y_MAX, FISH_BASE_Y_MIN, FISH_BASE_Y_SHIFT,
    FISH_COUNT, FISH_SCALE, FISH_SPAWN_DELAY_SEC, SWARM_RADIUS, VIDEO_ASSET, VIDEO_PANEL_HEIGHT,
    VIDEO_PANEL_WIDTH, VIDEO_SURFACE_LIFT,
};
use crate::scene::{
    AnchorId, EntityId, ModelHandle, Pose, Renderable, Scene, Transform, VideoHandle,
};

/// One result of a surface hit test: a wall-aligned world pose whose local
/// +Y is the outward normal.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceHit {
    pub pose: Pose,
}

/// Screen-point to detected-surface query. The platform tracker is opaque;
/// the frontends substitute a synthetic wall.
pub trait SurfaceRaycaster {
    fn raycast(&self, screen: Vec2) -> SmallVec<[SurfaceHit; 4]>;
}

/// Bundled, read-only assets resolved by fixed name. Absence is an error the
/// session logs and swallows.
pub trait AssetLibrary {
    fn load_video(&self, name: &str) -> anyhow::Result<VideoHandle>;
    fn load_model(&self, name: &str) -> anyhow::Result<ModelHandle>;
}

/// Process-wide audio output session. Activation failure never blocks
/// placement.
pub trait AudioSession {
    fn activate_playback(&mut self) -> anyhow::Result<()>;
}

/// Playback surface for the placed panel.
pub trait VideoPlayer {
    fn play(&mut self, video: VideoHandle);
}

/// Placement failure taxonomy. Every variant is logged and swallowed at the
/// session boundary; nothing reaches the user as error UI.
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("no vertical surface under the tap")]
    NoSurface,
    #[error("video asset '{name}' unavailable: {reason}")]
    VideoAsset {
        name: &'static str,
        reason: anyhow::Error,
    },
    #[error("model asset '{name}' unavailable: {reason}")]
    ModelAsset {
        name: &'static str,
        reason: anyhow::Error,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Tracking running, nothing placed.
    Idle,
    /// Video anchored and playing; the swarm deadline is pending.
    VideoPlaying,
    /// The deadline elapsed; spawning happens on this tick.
    FishSwarmPending,
    /// The batch exists and bobs every tick. Terminal until teardown.
    FishSwarmActive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapOutcome {
    /// No detected surface under the tap; nothing changed.
    NoSurface,
    /// The bundled video could not be resolved; nothing changed.
    VideoUnavailable,
    VideoPlaced { anchor: AnchorId },
}

pub struct ArSession {
    scene: Scene,
    state: SessionState,
    video_anchor: Option<AnchorId>,
    /// Absolute loop time at which the swarm spawns. A superseding tap
    /// replaces this, so rapid re-tapping never stacks spawns.
    spawn_deadline: Option<f64>,
    /// Latch: the batch is created at most once per overlay session.
    swarm_spawned: bool,
    fish: Vec<EntityId>,
    rng: StdRng,
}

impl ArSession {
    pub fn new(seed: u64) -> Self {
        Self {
            scene: Scene::new(),
            state: SessionState::Idle,
            video_anchor: None,
            spawn_deadline: None,
            swarm_spawned: false,
            fish: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn video_anchor(&self) -> Option<AnchorId> {
        self.video_anchor
    }

    pub fn fish(&self) -> &[EntityId] {
        &self.fish
    }

    pub fn spawn_deadline(&self) -> Option<f64> {
        self.spawn_deadline
    }

    /// Handle a tap at `screen`. On a surface hit this replaces any previous
    /// video panel with a new one at the hit pose, starts playback, and
    /// (re)arms the swarm deadline. Misses and missing assets are logged
    /// no-ops.
    pub fn handle_tap(
        &mut self,
        screen: Vec2,
        now_sec: f64,
        tracker: &impl SurfaceRaycaster,
        assets: &impl AssetLibrary,
        audio: &mut impl AudioSession,
        player: &mut impl VideoPlayer,
    ) -> TapOutcome {
        match self.place_video(screen, now_sec, tracker, assets, audio, player) {
            Ok(anchor) => TapOutcome::VideoPlaced { anchor },
            Err(e @ PlacementError::NoSurface) => {
                log::info!("[tap] {e}");
                TapOutcome::NoSurface
            }
            Err(e) => {
                log::error!("[tap] {e}");
                TapOutcome::VideoUnavailable
            }
        }
    }

    fn place_video(
        &mut self,
        screen: Vec2,
        now_sec: f64,
        tracker: &impl SurfaceRaycaster,
        assets: &impl AssetLibrary,
        audio: &mut impl AudioSession,
        player: &mut impl VideoPlayer,
    ) -> Result<AnchorId, PlacementError> {
        let hits = tracker.raycast(screen);
        let hit = hits.first().ok_or(PlacementError::NoSurface)?;

        // Resolve the asset before touching the scene so a missing video
        // leaves the previous panel (if any) in place.
        let video = assets
            .load_video(VIDEO_ASSET)
            .map_err(|reason| PlacementError::VideoAsset {
                name: VIDEO_ASSET,
                reason,
            })?;

        if let Some(prev) = self.video_anchor.take() {
            self.scene.remove_anchor(prev);
        }

        let anchor = self.scene.add_anchor(hit.pose);
        // Lift the panel off the wall along the surface normal and tip the
        // flat mesh upright to face outward.
        let _ = self.scene.spawn(
            anchor,
            Transform {
                translation: Vec3::new(0.0, VIDEO_SURFACE_LIFT, 0.0),
                rotation: Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
                scale: 1.0,
            },
            Renderable::VideoPanel {
                video,
                width: VIDEO_PANEL_WIDTH,
                height: VIDEO_PANEL_HEIGHT,
            },
        );
        self.video_anchor = Some(anchor);

        player.play(video);
        if let Err(e) = audio.activate_playback() {
            log::warn!("[audio] session activation failed, playing without audio: {e:#}");
        }

        if !self.swarm_spawned {
            // Re-arming on a superseding tap replaces the pending deadline.
            self.spawn_deadline = Some(now_sec + FISH_SPAWN_DELAY_SEC);
            self.state = SessionState::VideoPlaying;
        }

        log::info!(
            "[tap] video anchored at ({:.2},{:.2},{:.2})",
            hit.pose.translation.x,
            hit.pose.translation.y,
            hit.pose.translation.z
        );
        Ok(anchor)
    }

    /// Advance the session to `now_sec`: fire the swarm deadline when due,
    /// then apply the bob animation to every fish.
    pub fn tick(&mut self, now_sec: f64, assets: &impl AssetLibrary) {
        if let Some(due) = self.spawn_deadline {
            if now_sec >= due && !self.swarm_spawned {
                self.state = SessionState::FishSwarmPending;
                self.spawn_deadline = None;
                self.spawn_swarm(assets);
            }
        }

        if self.swarm_spawned {
            let t = now_sec as f32;
            for id in &self.fish {
                if let Some(node) = self.scene.node_mut(*id) {
                    if let Renderable::Model { phase, .. } = node.renderable {
                        node.transform.translation.y =
                            (t * BOB_FREQUENCY + phase).sin() * BOB_AMPLITUDE;
                    }
                }
            }
        }
    }

    /// Clone the template into a ring of fish around the world origin. A
    /// missing model logs and leaves the batch empty; the swarm still counts
    /// as active, matching the animation timer that runs regardless.
    fn spawn_swarm(&mut self, assets: &impl AssetLibrary) {
        self.swarm_spawned = true;
        self.state = SessionState::FishSwarmActive;

        let model = match assets.load_model(FISH_ASSET) {
            Ok(m) => m,
            Err(reason) => {
                let e = PlacementError::ModelAsset {
                    name: FISH_ASSET,
                    reason,
                };
                log::error!("[swarm] {e}");
                return;
            }
        };

        let center = self.scene.add_anchor(Pose::IDENTITY);
        for i in 0..FISH_COUNT {
            let angle = i as f32 * (std::f32::consts::TAU / FISH_COUNT as f32);
            let x = angle.cos() * SWARM_RADIUS;
            let z = angle.sin() * SWARM_RADIUS;
            let y = self.rng.gen_range(FISH_BASE_Y_MIN..=FISH_BASE_Y_MAX) + FISH_BASE_Y_SHIFT;
            let phase = self.rng.gen_range(0.0..std::f32::consts::TAU);

            let position = Vec3::new(x, y, z);
            if let Some(id) = self.scene.spawn(
                center,
                Transform {
                    translation: position,
                    rotation: face_origin(position),
                    scale: FISH_SCALE,
                },
                Renderable::Model { model, phase },
            ) {
                self.fish.push(id);
            }
        }
        log::info!("[swarm] spawned {} fish", self.fish.len());
    }

    /// Tear the session down: drop every anchor and entity and disarm the
    /// deadline. The frontend stops the drive loop alongside this, so no
    /// further mutation happens.
    pub fn shutdown(&mut self) {
        self.scene.clear();
        self.fish.clear();
        self.video_anchor = None;
        self.spawn_deadline = None;
        self.swarm_spawned = false;
        self.state = SessionState::Idle;
    }
}

/// Orientation that points an entity's forward (-Z) axis at the world
/// origin.
pub fn face_origin(position: Vec3) -> Quat {
    let to_center = -position;
    if to_center.length_squared() < 1e-12 {
        return Quat::IDENTITY;
    }
    let forward = to_center.normalize();
    Quat::from_rotation_arc(Vec3::NEG_Z, forward)
}
