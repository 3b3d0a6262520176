//! Platform collaborators for the web frontend: the synthetic wall tracker,
//! the bundled asset manifest, and media/audio playback.

use app_core::constants::{CAMERA_Z, PREVIEW_WALL_Z};
use app_core::raycast::hit_preview_wall;
use app_core::scene::{ModelHandle, VideoHandle};
use app_core::session::{AssetLibrary, AudioSession, SurfaceHit, SurfaceRaycaster, VideoPlayer};
use glam::Vec2;
use smallvec::SmallVec;
use web_sys as web;

// Bundled media shipped next to the page, addressed by fixed name.
const VIDEOS: &[(&str, &str)] = &[("LOR-E-P1", "assets/LOR-E-P1.mp4")];
const MODELS: &[&str] = &["swordfish"];

pub struct BundledAssets;

impl AssetLibrary for BundledAssets {
    fn load_video(&self, name: &str) -> anyhow::Result<VideoHandle> {
        VIDEOS
            .iter()
            .position(|(n, _)| *n == name)
            .map(|i| VideoHandle(i as u32))
            .ok_or_else(|| anyhow::anyhow!("no bundled video named '{name}'"))
    }

    fn load_model(&self, name: &str) -> anyhow::Result<ModelHandle> {
        MODELS
            .iter()
            .position(|n| *n == name)
            .map(|i| ModelHandle(i as u32))
            .ok_or_else(|| anyhow::anyhow!("no bundled model named '{name}'"))
    }
}

pub fn video_url(video: VideoHandle) -> Option<&'static str> {
    VIDEOS.get(video.0 as usize).map(|(_, url)| *url)
}

/// Stand-in for the platform plane tracker: taps are hit-tested against one
/// synthetic vertical wall in front of the camera.
pub struct PreviewWallTracker {
    width: f32,
    height: f32,
}

impl PreviewWallTracker {
    pub fn for_canvas(canvas: &web::HtmlCanvasElement) -> Self {
        Self {
            width: canvas.width().max(1) as f32,
            height: canvas.height().max(1) as f32,
        }
    }
}

impl SurfaceRaycaster for PreviewWallTracker {
    fn raycast(&self, screen: Vec2) -> SmallVec<[SurfaceHit; 4]> {
        let mut hits = SmallVec::new();
        if let Some(pose) =
            hit_preview_wall(screen, self.width, self.height, CAMERA_Z, PREVIEW_WALL_Z)
        {
            hits.push(SurfaceHit { pose });
        }
        hits
    }
}

/// WebAudio-backed audio session. Activation resumes the context, which the
/// browser only allows inside a user gesture; the tap is one.
#[derive(Default)]
pub struct WebAudioSession {
    ctx: Option<web::AudioContext>,
}

impl AudioSession for WebAudioSession {
    fn activate_playback(&mut self) -> anyhow::Result<()> {
        if self.ctx.is_none() {
            let ctx = web::AudioContext::new()
                .map_err(|e| anyhow::anyhow!("AudioContext error: {e:?}"))?;
            self.ctx = Some(ctx);
        }
        if let Some(ctx) = &self.ctx {
            if ctx.state() == web::AudioContextState::Suspended {
                ctx.resume()
                    .map_err(|e| anyhow::anyhow!("resume error: {e:?}"))?;
            }
        }
        Ok(())
    }
}

/// Loops the clip's soundtrack through an off-screen media element while the
/// panel quad renders in the scene.
#[derive(Default)]
pub struct MediaPanel {
    element: Option<web::HtmlAudioElement>,
}

impl MediaPanel {
    pub fn stop(&mut self) {
        if let Some(el) = self.element.take() {
            let _ = el.pause();
        }
    }
}

impl VideoPlayer for MediaPanel {
    fn play(&mut self, video: VideoHandle) {
        self.stop();
        let Some(url) = video_url(video) else {
            log::error!("[media] unknown video handle {video:?}");
            return;
        };
        match web::HtmlAudioElement::new_with_src(url) {
            Ok(el) => {
                el.set_loop(true);
                let _ = el.play();
                self.element = Some(el);
            }
            Err(e) => log::error!("[media] element error: {e:?}"),
        }
    }
}
