// Host-side tests for ray construction and surface picking.

use app_core::{ray_triangle, Camera, DeformConfig, DeformationEngine, Ray};
use glam::{Mat4, Vec2, Vec3};

fn test_camera() -> Camera {
    Camera {
        eye: Vec3::new(0.0, 0.0, 3.0),
        target: Vec3::ZERO,
        up: Vec3::Y,
        aspect: 1.0,
        fovy_radians: std::f32::consts::FRAC_PI_4,
        znear: 0.1,
        zfar: 100.0,
    }
}

// two triangles covering the [-1, 1] square in the local XY plane
fn quad() -> (Vec<Vec3>, Vec<u32>) {
    let positions = vec![
        Vec3::new(-1.0, -1.0, 0.0),
        Vec3::new(1.0, -1.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(-1.0, 1.0, 0.0),
    ];
    let indices = vec![0, 1, 2, 0, 2, 3];
    (positions, indices)
}

#[test]
fn ray_triangle_hit_and_parameter() {
    let a = Vec3::ZERO;
    let b = Vec3::new(1.0, 0.0, 0.0);
    let c = Vec3::new(0.0, 1.0, 0.0);
    let t = ray_triangle(
        Vec3::new(0.25, 0.25, -1.0),
        Vec3::new(0.0, 0.0, 1.0),
        a,
        b,
        c,
    );
    assert!(t.is_some());
    assert!((t.unwrap() - 1.0).abs() < 1e-6);
}

#[test]
fn ray_triangle_misses() {
    let a = Vec3::ZERO;
    let b = Vec3::new(1.0, 0.0, 0.0);
    let c = Vec3::new(0.0, 1.0, 0.0);
    // outside the triangle
    assert!(ray_triangle(
        Vec3::new(0.9, 0.9, -1.0),
        Vec3::new(0.0, 0.0, 1.0),
        a,
        b,
        c
    )
    .is_none());
    // parallel to the triangle plane
    assert!(ray_triangle(
        Vec3::new(0.25, 0.25, -1.0),
        Vec3::new(1.0, 0.0, 0.0),
        a,
        b,
        c
    )
    .is_none());
    // triangle behind the ray origin
    assert!(ray_triangle(
        Vec3::new(0.25, 0.25, 1.0),
        Vec3::new(0.0, 0.0, 1.0),
        a,
        b,
        c
    )
    .is_none());
}

#[test]
fn camera_ray_points_at_target_through_center() {
    let camera = test_camera();
    let ray = camera.ray_through(Vec2::ZERO);
    assert_eq!(ray.origin, camera.eye);
    assert!(ray.dir.z < -0.99, "center ray should look down -Z");
    assert!(ray.dir.x.abs() < 1e-4);
    assert!(ray.dir.y.abs() < 1e-4);
}

#[test]
fn pick_returns_nearest_mesh_across_candidates() {
    let mut engine = DeformationEngine::new(DeformConfig::default());
    let (positions, indices) = quad();
    let far = engine
        .register_mesh(positions.clone(), indices.clone(), Mat4::IDENTITY)
        .unwrap();
    let near = engine
        .register_mesh(
            positions,
            indices,
            Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0)),
        )
        .unwrap();

    let hit = engine.pick(&test_camera(), Vec2::ZERO).expect("hit");
    assert_eq!(hit.mesh, near);
    assert!((hit.point.z - 1.0).abs() < 1e-4);
    assert!(hit.distance < 3.0);
    let _ = far;
}

#[test]
fn pick_against_empty_registry_is_none() {
    let engine = DeformationEngine::new(DeformConfig::default());
    assert!(engine.pick(&test_camera(), Vec2::ZERO).is_none());
}

#[test]
fn pick_miss_off_to_the_side_is_none() {
    let mut engine = DeformationEngine::new(DeformConfig::default());
    let (positions, indices) = quad();
    engine
        .register_mesh(positions, indices, Mat4::IDENTITY)
        .unwrap();
    assert!(engine
        .pick(&test_camera(), Vec2::new(0.99, 0.99))
        .is_none());
}

#[test]
fn plane_intersection_basics() {
    let ray = Ray {
        origin: Vec3::new(0.0, 0.0, 3.0),
        dir: Vec3::new(0.0, 0.0, -1.0),
    };
    let hit = ray
        .intersect_plane(Vec3::new(0.0, 0.0, -1.0), Vec3::ZERO)
        .expect("hit");
    assert!(hit.length() < 1e-6);

    // grazing ray: direction lies in the plane
    let grazing = Ray {
        origin: Vec3::new(0.0, 0.0, 3.0),
        dir: Vec3::new(1.0, 0.0, 0.0),
    };
    assert!(grazing
        .intersect_plane(Vec3::new(0.0, 0.0, 1.0), Vec3::ZERO)
        .is_none());

    // plane behind the origin
    assert!(ray
        .intersect_plane(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 5.0))
        .is_none());
}

#[test]
fn resolve_drag_slides_in_the_camera_facing_plane() {
    let mut engine = DeformationEngine::new(DeformConfig::default());
    let (positions, indices) = quad();
    engine
        .register_mesh(positions, indices, Mat4::IDENTITY)
        .unwrap();
    let camera = test_camera();

    assert!(engine.resolve_drag(&camera, Vec2::ZERO).is_none(), "no grab yet");

    let hit = engine.pick(&camera, Vec2::ZERO).expect("hit");
    engine.grab_start(hit);
    let dragged = engine
        .resolve_drag(&camera, Vec2::new(0.4, 0.1))
        .expect("drag point");
    // the drag plane faces the camera and passes through the grab point
    assert!(dragged.z.abs() < 1e-4);
    assert!(dragged.x > 0.0);
    assert!(dragged.y > 0.0);
}

#[test]
fn picking_respects_live_deformation() {
    // after pulling the surface toward the camera the hit moves with it
    let config = DeformConfig {
        strength: 1.0,
        grab_lerp: 1.0,
        ..DeformConfig::default()
    };
    let mut engine = DeformationEngine::new(config);
    let (positions, indices) = quad();
    engine
        .register_mesh(positions, indices, Mat4::IDENTITY)
        .unwrap();
    let camera = test_camera();

    let before = engine.pick(&camera, Vec2::ZERO).expect("hit");
    engine.grab_start(before);
    engine.apply(Vec3::new(0.0, 0.0, 0.5));
    engine.grab_end();

    let after = engine.pick(&camera, Vec2::ZERO).expect("hit");
    assert!(after.point.z > before.point.z);
    assert!(after.distance < before.distance);
}
