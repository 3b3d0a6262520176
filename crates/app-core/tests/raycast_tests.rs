use app_core::constants::{CAMERA_Z, PREVIEW_WALL_Z};
use app_core::raycast::{hit_preview_wall, ray_vertical_plane, screen_to_world_ray};
use glam::{Vec2, Vec3};

#[test]
fn center_screen_ray_points_straight_ahead() {
    let (ro, rd) = screen_to_world_ray(800.0, 600.0, 400.0, 300.0, CAMERA_Z);
    assert!((ro - Vec3::new(0.0, 0.0, CAMERA_Z)).length() < 1e-6);
    assert!(
        (rd - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-4,
        "center ray {rd:?}"
    );
}

#[test]
fn screen_edges_diverge_from_the_axis() {
    let (_, left) = screen_to_world_ray(800.0, 600.0, 0.0, 300.0, CAMERA_Z);
    let (_, right) = screen_to_world_ray(800.0, 600.0, 800.0, 300.0, CAMERA_Z);
    assert!(left.x < 0.0);
    assert!(right.x > 0.0);
    // Both still look into the scene.
    assert!(left.z < 0.0 && right.z < 0.0);
}

#[test]
fn ray_vertical_plane_basic_hit() {
    let t = ray_vertical_plane(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, -1.0), -2.0);
    assert_eq!(t, Some(5.0));
}

#[test]
fn ray_vertical_plane_misses_when_parallel_or_behind() {
    // Parallel to the plane.
    assert_eq!(
        ray_vertical_plane(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), -2.0),
        None
    );
    // Plane behind the ray origin.
    assert_eq!(
        ray_vertical_plane(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, -1.0), 5.0),
        None
    );
}

#[test]
fn preview_wall_hit_lands_on_the_wall() {
    let pose = hit_preview_wall(
        Vec2::new(400.0, 300.0),
        800.0,
        600.0,
        CAMERA_Z,
        PREVIEW_WALL_Z,
    )
    .expect("center tap must hit the wall");
    assert!((pose.translation.z - PREVIEW_WALL_Z).abs() < 1e-5);
    assert!(pose.translation.x.abs() < 1e-4);
    assert!(pose.translation.y.abs() < 1e-4);

    // Wall pose reports its outward normal as local +Y.
    let normal = pose.rotation * Vec3::Y;
    assert!(
        (normal - Vec3::Z).length() < 1e-5,
        "wall normal {normal:?} should face the camera"
    );
}

#[test]
fn preview_wall_miss_when_wall_is_behind_the_camera() {
    let pose = hit_preview_wall(Vec2::new(400.0, 300.0), 800.0, 600.0, CAMERA_Z, CAMERA_Z + 2.0);
    assert!(pose.is_none());
}
