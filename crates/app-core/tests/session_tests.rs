// Integration tests for the AR session state machine: placement, the timed
// swarm spawn, the bob animation, and teardown.

use app_core::constants::{
    BOB_AMPLITUDE, BOB_FREQUENCY, FISH_COUNT, FISH_SCALE, FISH_SPAWN_DELAY_SEC, SWARM_RADIUS,
    VIDEO_SURFACE_LIFT,
};
use app_core::scene::{ModelHandle, Pose, Renderable, VideoHandle};
use app_core::session::{
    face_origin, ArSession, AssetLibrary, AudioSession, SessionState, SurfaceHit,
    SurfaceRaycaster, TapOutcome, VideoPlayer,
};
use glam::{Quat, Vec2, Vec3};
use smallvec::{smallvec, SmallVec};

struct WallTracker {
    hit: Option<Pose>,
}

impl SurfaceRaycaster for WallTracker {
    fn raycast(&self, _screen: Vec2) -> SmallVec<[SurfaceHit; 4]> {
        match self.hit {
            Some(pose) => smallvec![SurfaceHit { pose }],
            None => SmallVec::new(),
        }
    }
}

struct FakeAssets {
    video_ok: bool,
    model_ok: bool,
}

impl FakeAssets {
    fn all_ok() -> Self {
        Self {
            video_ok: true,
            model_ok: true,
        }
    }
}

impl AssetLibrary for FakeAssets {
    fn load_video(&self, _name: &str) -> anyhow::Result<VideoHandle> {
        if self.video_ok {
            Ok(VideoHandle(7))
        } else {
            Err(anyhow::anyhow!("video not bundled"))
        }
    }

    fn load_model(&self, _name: &str) -> anyhow::Result<ModelHandle> {
        if self.model_ok {
            Ok(ModelHandle(3))
        } else {
            Err(anyhow::anyhow!("model not bundled"))
        }
    }
}

#[derive(Default)]
struct FakeAudio {
    fail: bool,
    activations: usize,
}

impl AudioSession for FakeAudio {
    fn activate_playback(&mut self) -> anyhow::Result<()> {
        self.activations += 1;
        if self.fail {
            Err(anyhow::anyhow!("audio route unavailable"))
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
struct FakePlayer {
    played: Vec<VideoHandle>,
}

impl VideoPlayer for FakePlayer {
    fn play(&mut self, video: VideoHandle) {
        self.played.push(video);
    }
}

fn wall_pose(x: f32, y: f32) -> Pose {
    Pose {
        translation: Vec3::new(x, y, -2.0),
        rotation: Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
    }
}

fn tap_at(
    session: &mut ArSession,
    pose: Option<Pose>,
    now_sec: f64,
    assets: &FakeAssets,
    audio: &mut FakeAudio,
    player: &mut FakePlayer,
) -> TapOutcome {
    let tracker = WallTracker { hit: pose };
    session.handle_tap(
        Vec2::new(200.0, 300.0),
        now_sec,
        &tracker,
        assets,
        audio,
        player,
    )
}

#[test]
fn tap_on_wall_places_one_video_anchor() {
    let mut session = ArSession::new(42);
    let assets = FakeAssets::all_ok();
    let mut audio = FakeAudio::default();
    let mut player = FakePlayer::default();

    let outcome = tap_at(
        &mut session,
        Some(wall_pose(0.2, 1.1)),
        0.0,
        &assets,
        &mut audio,
        &mut player,
    );
    assert!(matches!(outcome, TapOutcome::VideoPlaced { .. }));
    assert_eq!(session.state(), SessionState::VideoPlaying);
    assert_eq!(session.scene().anchor_count(), 1);
    assert_eq!(session.scene().entity_count(), 1);
    assert_eq!(player.played.len(), 1);
    assert_eq!(audio.activations, 1);

    // Panel sits just off the wall along the surface normal.
    let anchor = session.video_anchor().expect("video anchor");
    let entity = session.scene().anchor(anchor).unwrap().entities()[0];
    let world = session.scene().world_position(entity).unwrap();
    let expected = Vec3::new(0.2, 1.1, -2.0 + VIDEO_SURFACE_LIFT);
    assert!(
        (world - expected).length() < 1e-5,
        "panel at {world:?}, expected {expected:?}"
    );
}

#[test]
fn retap_replaces_the_previous_video_anchor() {
    let mut session = ArSession::new(42);
    let assets = FakeAssets::all_ok();
    let mut audio = FakeAudio::default();
    let mut player = FakePlayer::default();

    tap_at(
        &mut session,
        Some(wall_pose(0.0, 0.0)),
        0.0,
        &assets,
        &mut audio,
        &mut player,
    );
    let first = session.video_anchor().unwrap();

    tap_at(
        &mut session,
        Some(wall_pose(0.8, -0.4)),
        1.0,
        &assets,
        &mut audio,
        &mut player,
    );
    let second = session.video_anchor().unwrap();

    assert_ne!(first, second);
    assert_eq!(session.scene().anchor_count(), 1, "old anchor must be gone");
    assert_eq!(session.scene().entity_count(), 1);
    assert!(session.scene().anchor(first).is_none());
    let pose = session.scene().anchor(second).unwrap().pose;
    assert!((pose.translation - Vec3::new(0.8, -0.4, -2.0)).length() < 1e-6);
}

#[test]
fn tap_with_no_hit_changes_nothing() {
    let mut session = ArSession::new(42);
    let assets = FakeAssets::all_ok();
    let mut audio = FakeAudio::default();
    let mut player = FakePlayer::default();

    let outcome = tap_at(&mut session, None, 0.0, &assets, &mut audio, &mut player);
    assert_eq!(outcome, TapOutcome::NoSurface);
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.scene().anchor_count(), 0);
    assert!(session.video_anchor().is_none());
    assert!(session.spawn_deadline().is_none());
    assert!(player.played.is_empty());
}

#[test]
fn missing_video_aborts_and_keeps_the_previous_panel() {
    let mut session = ArSession::new(42);
    let mut audio = FakeAudio::default();
    let mut player = FakePlayer::default();

    let ok = FakeAssets::all_ok();
    tap_at(
        &mut session,
        Some(wall_pose(0.0, 0.0)),
        0.0,
        &ok,
        &mut audio,
        &mut player,
    );
    let placed = session.video_anchor().unwrap();

    let broken = FakeAssets {
        video_ok: false,
        model_ok: true,
    };
    let outcome = tap_at(
        &mut session,
        Some(wall_pose(1.0, 1.0)),
        1.0,
        &broken,
        &mut audio,
        &mut player,
    );
    assert_eq!(outcome, TapOutcome::VideoUnavailable);
    assert_eq!(session.video_anchor(), Some(placed));
    assert_eq!(session.scene().anchor_count(), 1);
    assert_eq!(player.played.len(), 1, "failed tap must not restart playback");
}

#[test]
fn audio_failure_still_places_the_video() {
    let mut session = ArSession::new(42);
    let assets = FakeAssets::all_ok();
    let mut audio = FakeAudio {
        fail: true,
        activations: 0,
    };
    let mut player = FakePlayer::default();

    let outcome = tap_at(
        &mut session,
        Some(wall_pose(0.0, 0.5)),
        0.0,
        &assets,
        &mut audio,
        &mut player,
    );
    assert!(matches!(outcome, TapOutcome::VideoPlaced { .. }));
    assert_eq!(session.scene().anchor_count(), 1);
    assert_eq!(player.played.len(), 1);
}

#[test]
fn swarm_spawns_only_after_the_delay() {
    let mut session = ArSession::new(42);
    let assets = FakeAssets::all_ok();
    let mut audio = FakeAudio::default();
    let mut player = FakePlayer::default();

    tap_at(
        &mut session,
        Some(wall_pose(0.0, 0.0)),
        0.0,
        &assets,
        &mut audio,
        &mut player,
    );
    assert_eq!(session.spawn_deadline(), Some(FISH_SPAWN_DELAY_SEC));

    session.tick(FISH_SPAWN_DELAY_SEC - 0.1, &assets);
    assert_eq!(session.state(), SessionState::VideoPlaying);
    assert!(session.fish().is_empty());

    session.tick(FISH_SPAWN_DELAY_SEC, &assets);
    assert_eq!(session.state(), SessionState::FishSwarmActive);
    assert_eq!(session.fish().len(), FISH_COUNT);
    // video anchor + swarm center anchor
    assert_eq!(session.scene().anchor_count(), 2);
    assert_eq!(session.scene().entity_count(), FISH_COUNT + 1);
}

#[test]
fn swarm_ring_has_exact_geometry() {
    let mut session = ArSession::new(7);
    let assets = FakeAssets::all_ok();
    let mut audio = FakeAudio::default();
    let mut player = FakePlayer::default();

    tap_at(
        &mut session,
        Some(wall_pose(0.0, 0.0)),
        0.0,
        &assets,
        &mut audio,
        &mut player,
    );
    session.tick(FISH_SPAWN_DELAY_SEC, &assets);
    assert_eq!(session.fish().len(), FISH_COUNT);

    let step = std::f32::consts::TAU / FISH_COUNT as f32;
    for (i, id) in session.fish().iter().enumerate() {
        let node = session.scene().node(*id).expect("fish node");
        let p = node.transform.translation;

        // Equal angular increments on the fixed-radius circle.
        let radius = (p.x * p.x + p.z * p.z).sqrt();
        assert!(
            (radius - SWARM_RADIUS).abs() < 1e-4,
            "fish {i} radius {radius}"
        );
        let angle = i as f32 * step;
        assert!((p.x - angle.cos() * SWARM_RADIUS).abs() < 1e-4, "fish {i} x");
        assert!((p.z - angle.sin() * SWARM_RADIUS).abs() < 1e-4, "fish {i} z");

        assert!((node.transform.scale - FISH_SCALE).abs() < 1e-9);
        match node.renderable {
            Renderable::Model { phase, .. } => {
                assert!((0.0..std::f32::consts::TAU).contains(&phase), "fish {i} phase");
            }
            _ => panic!("fish {i} is not a model instance"),
        }
    }

    // Phases must desynchronize the batch, not repeat one value.
    let mut phases: Vec<f32> = session
        .fish()
        .iter()
        .map(|id| match session.scene().node(*id).unwrap().renderable {
            Renderable::Model { phase, .. } => phase,
            _ => unreachable!(),
        })
        .collect();
    phases.sort_by(|a, b| a.partial_cmp(b).unwrap());
    phases.dedup_by(|a, b| (*a - *b).abs() < 1e-6);
    assert!(phases.len() > FISH_COUNT / 2, "phases look degenerate");
}

#[test]
fn bob_motion_follows_the_shared_sine() {
    let mut session = ArSession::new(99);
    let assets = FakeAssets::all_ok();
    let mut audio = FakeAudio::default();
    let mut player = FakePlayer::default();

    tap_at(
        &mut session,
        Some(wall_pose(0.0, 0.0)),
        0.0,
        &assets,
        &mut audio,
        &mut player,
    );
    session.tick(FISH_SPAWN_DELAY_SEC, &assets);

    for t in [16.0_f64, 18.25, 21.5, 60.0] {
        session.tick(t, &assets);
        for (i, id) in session.fish().iter().enumerate() {
            let node = session.scene().node(*id).unwrap();
            let phase = match node.renderable {
                Renderable::Model { phase, .. } => phase,
                _ => unreachable!(),
            };
            let expected = (t as f32 * BOB_FREQUENCY + phase).sin() * BOB_AMPLITUDE;
            assert!(
                (node.transform.translation.y - expected).abs() < 1e-4,
                "fish {i} at t={t}: y={} expected {expected}",
                node.transform.translation.y
            );
        }
    }
}

#[test]
fn retap_reschedules_the_pending_spawn_instead_of_stacking() {
    let mut session = ArSession::new(42);
    let assets = FakeAssets::all_ok();
    let mut audio = FakeAudio::default();
    let mut player = FakePlayer::default();

    tap_at(
        &mut session,
        Some(wall_pose(0.0, 0.0)),
        0.0,
        &assets,
        &mut audio,
        &mut player,
    );
    // Supersede before the first deadline fires.
    tap_at(
        &mut session,
        Some(wall_pose(0.5, 0.5)),
        10.0,
        &assets,
        &mut audio,
        &mut player,
    );
    assert_eq!(session.spawn_deadline(), Some(10.0 + FISH_SPAWN_DELAY_SEC));

    // The first tap's deadline must not fire.
    session.tick(17.0, &assets);
    assert!(session.fish().is_empty());

    session.tick(10.0 + FISH_SPAWN_DELAY_SEC, &assets);
    assert_eq!(session.fish().len(), FISH_COUNT, "exactly one batch");
}

#[test]
fn swarm_never_respawns_in_the_same_session() {
    let mut session = ArSession::new(42);
    let assets = FakeAssets::all_ok();
    let mut audio = FakeAudio::default();
    let mut player = FakePlayer::default();

    tap_at(
        &mut session,
        Some(wall_pose(0.0, 0.0)),
        0.0,
        &assets,
        &mut audio,
        &mut player,
    );
    session.tick(FISH_SPAWN_DELAY_SEC, &assets);
    assert_eq!(session.fish().len(), FISH_COUNT);

    // A later tap still moves the video but arms no new deadline.
    tap_at(
        &mut session,
        Some(wall_pose(1.0, 0.0)),
        30.0,
        &assets,
        &mut audio,
        &mut player,
    );
    assert!(session.spawn_deadline().is_none());
    assert_eq!(session.state(), SessionState::FishSwarmActive);

    session.tick(120.0, &assets);
    assert_eq!(session.fish().len(), FISH_COUNT);
    assert_eq!(session.scene().entity_count(), FISH_COUNT + 1);
}

#[test]
fn missing_model_leaves_the_batch_empty_but_active() {
    let mut session = ArSession::new(42);
    let assets = FakeAssets {
        video_ok: true,
        model_ok: false,
    };
    let mut audio = FakeAudio::default();
    let mut player = FakePlayer::default();

    tap_at(
        &mut session,
        Some(wall_pose(0.0, 0.0)),
        0.0,
        &assets,
        &mut audio,
        &mut player,
    );
    session.tick(FISH_SPAWN_DELAY_SEC, &assets);

    assert_eq!(session.state(), SessionState::FishSwarmActive);
    assert!(session.fish().is_empty());
    assert_eq!(session.scene().anchor_count(), 1, "no swarm center anchor");

    // No retry on later ticks.
    session.tick(FISH_SPAWN_DELAY_SEC + 5.0, &assets);
    assert!(session.fish().is_empty());
}

#[test]
fn shutdown_tears_everything_down() {
    let mut session = ArSession::new(42);
    let assets = FakeAssets::all_ok();
    let mut audio = FakeAudio::default();
    let mut player = FakePlayer::default();

    tap_at(
        &mut session,
        Some(wall_pose(0.0, 0.0)),
        0.0,
        &assets,
        &mut audio,
        &mut player,
    );
    session.tick(FISH_SPAWN_DELAY_SEC, &assets);
    session.shutdown();

    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.scene().anchor_count(), 0);
    assert_eq!(session.scene().entity_count(), 0);
    assert!(session.fish().is_empty());
    assert!(session.spawn_deadline().is_none());

    // Ticking a torn-down session mutates nothing.
    session.tick(1000.0, &assets);
    assert_eq!(session.scene().entity_count(), 0);
}

#[test]
fn same_seed_spawns_an_identical_batch() {
    let assets = FakeAssets::all_ok();

    let batch = |seed: u64| -> Vec<(f32, f32)> {
        let mut session = ArSession::new(seed);
        let mut audio = FakeAudio::default();
        let mut player = FakePlayer::default();
        tap_at(
            &mut session,
            Some(wall_pose(0.0, 0.0)),
            0.0,
            &assets,
            &mut audio,
            &mut player,
        );
        session.tick(FISH_SPAWN_DELAY_SEC, &assets);
        session
            .fish()
            .iter()
            .map(|id| {
                let node = session.scene().node(*id).unwrap();
                match node.renderable {
                    Renderable::Model { phase, .. } => (node.transform.translation.y, phase),
                    _ => unreachable!(),
                }
            })
            .collect()
    };

    assert_eq!(batch(1234), batch(1234));
    assert_ne!(batch(1234), batch(4321));
}

#[test]
fn face_origin_points_forward_at_the_center() {
    for p in [
        Vec3::new(1.5, 0.0, 0.0),
        Vec3::new(0.0, -1.0, 1.5),
        Vec3::new(-0.7, 2.0, -0.7),
    ] {
        let q = face_origin(p);
        let forward = q * Vec3::NEG_Z;
        let expected = (-p).normalize();
        assert!(
            (forward - expected).length() < 1e-5,
            "facing {forward:?}, expected {expected:?}"
        );
    }
}
