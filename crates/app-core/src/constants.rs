// Shared tuning constants used by both the web and native frontends.

// Bundled asset names, resolved by the platform asset library
pub const VIDEO_ASSET: &str = "LOR-E-P1";
pub const FISH_ASSET: &str = "swordfish";

// Video panel placement
pub const VIDEO_PANEL_WIDTH: f32 = 0.3;
pub const VIDEO_PANEL_HEIGHT: f32 = 0.3;
pub const VIDEO_SURFACE_LIFT: f32 = 0.001; // offset off the wall to avoid z-fighting

// Fish swarm
pub const FISH_COUNT: usize = 40;
pub const SWARM_RADIUS: f32 = 1.5; // ring radius around the world origin
pub const FISH_SCALE: f32 = 0.0025;
pub const FISH_BASE_Y_MIN: f32 = -1.0;
pub const FISH_BASE_Y_MAX: f32 = 1.0;
pub const FISH_BASE_Y_SHIFT: f32 = -1.5; // whole ring sits below the panel

// Swim animation
pub const FISH_SPAWN_DELAY_SEC: f64 = 16.0; // video plays alone before the swarm appears
pub const BOB_FREQUENCY: f32 = 1.5;
pub const BOB_AMPLITUDE: f32 = 0.4;
pub const ANIM_TICK_HZ: f64 = 60.0;

// Preview camera and synthetic wall (desktop/web stand-in for the tracker)
pub const CAMERA_Z: f32 = 3.0;
pub const CAMERA_FOVY_RADIANS: f32 = std::f32::consts::FRAC_PI_4;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 100.0;
pub const PREVIEW_WALL_Z: f32 = -2.0; // vertical plane facing the camera

// Render colors and billboard sizing
pub const FISH_PREVIEW_MODEL_SIZE: f32 = 60.0; // approximate model extent; scales the billboard stand-in
pub const FISH_COLOR: [f32; 4] = [0.55, 0.75, 0.95, 1.0]; // silvery blue
pub const PANEL_COLOR: [f32; 4] = [0.08, 0.08, 0.10, 1.0]; // dark screen
pub const PANEL_GLOW_RATE: f32 = 2.0; // shimmer frequency while "playing"
