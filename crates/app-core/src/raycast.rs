//! Screen-to-world ray math for the preview camera, and the synthetic wall
//! hit test both frontends use in place of the platform plane tracker.

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use crate::constants::{CAMERA_FOVY_RADIANS, CAMERA_ZFAR, CAMERA_ZNEAR};
use crate::scene::Pose;

/// Compute a world-space ray from pixel coordinates under the fixed
/// look-at camera at `(0, 0, camera_z)`.
///
/// Returns `(ray_origin, ray_direction)`.
pub fn screen_to_world_ray(
    width: f32,
    height: f32,
    sx: f32,
    sy: f32,
    camera_z: f32,
) -> (Vec3, Vec3) {
    let ndc_x = (2.0 * sx / width) - 1.0;
    let ndc_y = 1.0 - (2.0 * sy / height);
    let aspect = width / height.max(1.0);
    let proj = Mat4::perspective_rh(CAMERA_FOVY_RADIANS, aspect, CAMERA_ZNEAR, CAMERA_ZFAR);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, camera_z), Vec3::ZERO, Vec3::Y);
    let inv = (proj * view).inverse();
    let p_far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
    let p1: Vec3 = p_far.truncate() / p_far.w;
    let ro = Vec3::new(0.0, 0.0, camera_z);
    let rd = (p1 - ro).normalize();
    (ro, rd)
}

/// Intersect a ray with the plane `z = plane_z`. Returns the distance along
/// the ray, or None when the ray is parallel to or pointing away from it.
#[inline]
pub fn ray_vertical_plane(ray_origin: Vec3, ray_dir: Vec3, plane_z: f32) -> Option<f32> {
    if ray_dir.z.abs() < 1e-6 {
        return None;
    }
    let t = (plane_z - ray_origin.z) / ray_dir.z;
    (t >= 0.0).then_some(t)
}

/// Hit test against the synthetic wall: a vertical plane at `plane_z` whose
/// outward normal faces the camera. The returned pose is wall-aligned the
/// way a tracked vertical plane reports it.
pub fn hit_preview_wall(
    screen: Vec2,
    width: f32,
    height: f32,
    camera_z: f32,
    plane_z: f32,
) -> Option<Pose> {
    let (ro, rd) = screen_to_world_ray(width, height, screen.x, screen.y, camera_z);
    let t = ray_vertical_plane(ro, rd, plane_z)?;
    let point = ro + rd * t;
    // A vertical plane's local +Y is its outward normal (+Z in world here),
    // so the pose tips local Y onto the world Z axis.
    let rotation = Quat::from_rotation_x(std::f32::consts::FRAC_PI_2);
    Some(Pose {
        translation: point,
        rotation,
    })
}
