//! Anchored scene graph owned by the AR session.
//!
//! Stands in for the platform scene graph: anchors hold a world pose,
//! entities hang off an anchor with a local transform. Both frontends
//! consume the flattened [`RenderInstance`] records, so the types here stay
//! platform-neutral.

use fnv::FnvHashMap;
use glam::{Quat, Vec3};

use crate::constants::{FISH_COLOR, FISH_PREVIEW_MODEL_SIZE, PANEL_COLOR, PANEL_GLOW_RATE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

/// Opaque handle to a bundled video resolved by the platform asset library.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoHandle(pub u32);

/// Opaque handle to a loaded 3D model template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelHandle(pub u32);

/// World placement of an anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Local transform of an entity relative to its anchor.
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Renderable {
    /// Textured plane playing a bundled video, facing out from the wall.
    VideoPanel {
        video: VideoHandle,
        width: f32,
        height: f32,
    },
    /// Cloned model instance. `phase` desynchronizes the shared bob motion.
    Model { model: ModelHandle, phase: f32 },
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub anchor: AnchorId,
    pub transform: Transform,
    pub renderable: Renderable,
}

#[derive(Clone, Debug)]
pub struct Anchor {
    pub pose: Pose,
    entities: Vec<EntityId>,
}

impl Anchor {
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }
}

/// Flat per-instance record for the instanced quad pipelines.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RenderInstance {
    pub pos: [f32; 3],
    pub scale: f32,
    pub color: [f32; 4],
    pub glow: f32,
    /// 0 = flat panel, 1 = circular-masked billboard.
    pub shape: f32,
    pub _pad: [f32; 2],
}

#[derive(Default)]
pub struct Scene {
    anchors: FnvHashMap<AnchorId, Anchor>,
    nodes: FnvHashMap<EntityId, SceneNode>,
    next_anchor: u64,
    next_entity: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_anchor(&mut self, pose: Pose) -> AnchorId {
        let id = AnchorId(self.next_anchor);
        self.next_anchor += 1;
        self.anchors.insert(
            id,
            Anchor {
                pose,
                entities: Vec::new(),
            },
        );
        id
    }

    /// Removes an anchor and everything parented to it. Returns false if the
    /// anchor was already gone.
    pub fn remove_anchor(&mut self, id: AnchorId) -> bool {
        match self.anchors.remove(&id) {
            Some(anchor) => {
                for e in anchor.entities {
                    self.nodes.remove(&e);
                }
                true
            }
            None => false,
        }
    }

    pub fn anchor(&self, id: AnchorId) -> Option<&Anchor> {
        self.anchors.get(&id)
    }

    /// Attaches an entity under `anchor`; None if the anchor does not exist.
    pub fn spawn(
        &mut self,
        anchor: AnchorId,
        transform: Transform,
        renderable: Renderable,
    ) -> Option<EntityId> {
        let parent = self.anchors.get_mut(&anchor)?;
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        parent.entities.push(id);
        self.nodes.insert(
            id,
            SceneNode {
                anchor,
                transform,
                renderable,
            },
        );
        Some(id)
    }

    pub fn node(&self, id: EntityId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: EntityId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    pub fn entity_count(&self) -> usize {
        self.nodes.len()
    }

    /// World-space position of an entity (anchor pose applied to the local
    /// translation).
    pub fn world_position(&self, id: EntityId) -> Option<Vec3> {
        let node = self.nodes.get(&id)?;
        let anchor = self.anchors.get(&node.anchor)?;
        Some(anchor.pose.translation + anchor.pose.rotation * node.transform.translation)
    }

    pub fn clear(&mut self) {
        self.anchors.clear();
        self.nodes.clear();
    }

    /// Flattens the graph for the instanced renderers. `now_sec` drives the
    /// video panel's playback shimmer.
    pub fn render_instances(&self, now_sec: f64) -> Vec<RenderInstance> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for (id, node) in &self.nodes {
            let Some(pos) = self.world_position(*id) else {
                continue;
            };
            let inst = match node.renderable {
                Renderable::VideoPanel { width, .. } => RenderInstance {
                    pos: pos.to_array(),
                    scale: width,
                    color: PANEL_COLOR,
                    glow: 0.5 + 0.5 * (now_sec as f32 * PANEL_GLOW_RATE).sin(),
                    shape: 0.0,
                    _pad: [0.0; 2],
                },
                Renderable::Model { .. } => RenderInstance {
                    pos: pos.to_array(),
                    // The billboard stands in for the model mesh, so the tiny
                    // per-instance scale is multiplied by the template extent.
                    scale: node.transform.scale * FISH_PREVIEW_MODEL_SIZE,
                    color: FISH_COLOR,
                    glow: 0.0,
                    shape: 1.0,
                    _pad: [0.0; 2],
                },
            };
            out.push(inst);
        }
        out
    }
}
