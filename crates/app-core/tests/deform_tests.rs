// Host-side tests for the elastic deformation engine.

use std::cell::RefCell;
use std::rc::Rc;

use app_core::{
    influence_weight, DeformConfig, DeformEvent, DeformationEngine, MeshError, MeshId, Phase,
    SurfaceHit,
};
use glam::{Mat4, Vec3};

fn engine_with_vertices(config: DeformConfig, vertices: &[Vec3]) -> (DeformationEngine, MeshId) {
    let mut engine = DeformationEngine::new(config);
    let id = engine
        .register_mesh(vertices.to_vec(), Vec::new(), Mat4::IDENTITY)
        .expect("register");
    (engine, id)
}

fn grab_at(engine: &mut DeformationEngine, id: MeshId, point: Vec3) {
    engine.grab_start(SurfaceHit {
        mesh: id,
        point,
        distance: 0.0,
    });
}

fn vertex(engine: &DeformationEngine, id: MeshId, i: usize) -> Vec3 {
    let p = engine.positions(id).expect("positions");
    Vec3::new(p[i * 3], p[i * 3 + 1], p[i * 3 + 2])
}

#[test]
fn rest_invariance_without_grab() {
    let (mut engine, id) = engine_with_vertices(
        DeformConfig::default(),
        &[Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0)],
    );
    // apply without a grab session is a no-op, return ticks have nothing to do
    engine.apply(Vec3::new(5.0, 0.0, 0.0));
    for _ in 0..10 {
        assert!(!engine.return_tick());
    }
    let rest: Vec<f32> = engine.mesh(id).unwrap().rest_positions().to_vec();
    assert_eq!(engine.positions(id).unwrap(), rest.as_slice());
    assert_eq!(engine.phase(), Phase::Rest);
}

#[test]
fn falloff_weight_bounds_and_monotonicity() {
    let radius = 3.0;
    assert_eq!(influence_weight(0.0, radius), 1.0);
    assert_eq!(influence_weight(radius, radius), 0.0);
    let mut prev = influence_weight(0.0, radius);
    for step in 1..=30 {
        let d = radius * step as f32 / 30.0;
        let w = influence_weight(d, radius);
        assert!(w <= prev, "weight increased at distance {d}");
        prev = w;
    }
    // clamped beyond the radius
    assert_eq!(influence_weight(radius * 2.0, radius), 0.0);
}

#[test]
fn vertices_outside_radius_never_receive_pull() {
    let (mut engine, id) = engine_with_vertices(
        DeformConfig::default(),
        &[Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)],
    );
    grab_at(&mut engine, id, Vec3::ZERO);
    engine.apply(Vec3::new(0.0, 2.0, 0.0));

    let near = vertex(&engine, id, 0);
    let far = vertex(&engine, id, 1);
    assert!(near.y > 0.0, "in-radius vertex should follow the pull");
    assert_eq!(far, Vec3::new(10.0, 0.0, 0.0), "out-of-radius vertex moved");
}

#[test]
fn out_of_radius_vertices_relax_toward_rest() {
    let config = DeformConfig::default();
    let return_lerp = config.return_lerp;
    let (mut engine, id) = engine_with_vertices(config, &[Vec3::ZERO]);

    // displace the vertex, then grab far away so it falls outside the radius
    grab_at(&mut engine, id, Vec3::ZERO);
    engine.apply(Vec3::new(1.0, 0.0, 0.0));
    engine.grab_end();
    let displaced = vertex(&engine, id, 0);
    assert!(displaced.x > 0.0);

    grab_at(&mut engine, id, Vec3::new(100.0, 0.0, 0.0));
    engine.apply(Vec3::new(101.0, 0.0, 0.0));
    let relaxed = vertex(&engine, id, 0);
    assert!((relaxed.x - displaced.x * (1.0 - return_lerp)).abs() < 1e-6);
    assert_eq!(relaxed.y, 0.0);
    assert_eq!(relaxed.z, 0.0);
    assert!(relaxed.x.abs() < displaced.x.abs(), "must move toward rest");
}

#[test]
fn settle_converges_and_snaps_exactly() {
    // concrete scenario: unit displacement, shipped spring constants
    let config = DeformConfig {
        spring: 0.2,
        damping: 0.75,
        velocity_threshold: 0.001,
        distance_threshold: 0.001,
        strength: 1.0,
        grab_lerp: 1.0,
        ..DeformConfig::default()
    };
    let (mut engine, id) = engine_with_vertices(config, &[Vec3::ZERO]);

    grab_at(&mut engine, id, Vec3::ZERO);
    engine.apply(Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(vertex(&engine, id, 0), Vec3::new(1.0, 0.0, 0.0));
    engine.grab_end();
    assert_eq!(engine.phase(), Phase::Returning);

    let mut ticks = 0;
    while engine.return_tick() {
        ticks += 1;
        assert!(ticks < 400, "return phase failed to settle");
    }
    assert!(ticks > 5, "spring settled implausibly fast");

    // exact rest, zero velocity, bitwise
    assert_eq!(engine.positions(id).unwrap(), &[0.0, 0.0, 0.0]);
    let velocities = engine.mesh(id).unwrap().velocities().unwrap();
    assert!(velocities.iter().all(|&v| v == 0.0));
    assert_eq!(engine.phase(), Phase::Rest);
}

#[test]
fn return_error_decreases_over_ticks() {
    let config = DeformConfig {
        strength: 1.0,
        grab_lerp: 1.0,
        ..DeformConfig::default()
    };
    let (mut engine, id) = engine_with_vertices(config, &[Vec3::ZERO]);
    grab_at(&mut engine, id, Vec3::ZERO);
    engine.apply(Vec3::new(1.0, 0.0, 0.0));
    engine.grab_end();

    let error = |engine: &DeformationEngine| vertex(engine, id, 0).length();
    let initial = error(&engine);
    for _ in 0..10 {
        engine.return_tick();
    }
    let mid = error(&engine);
    for _ in 0..20 {
        engine.return_tick();
    }
    let late = error(&engine);
    assert!(mid < initial);
    assert!(late < mid);
}

#[test]
fn repeated_apply_converges_toward_fixed_target() {
    let config = DeformConfig::default();
    let (mut engine, id) = engine_with_vertices(config.clone(), &[Vec3::ZERO]);
    let grab_point = Vec3::new(0.5, 0.0, 0.0);
    let drag_point = Vec3::new(1.5, 0.0, 0.0);

    grab_at(&mut engine, id, grab_point);
    let weight = influence_weight(0.5, config.radius);
    let target = (drag_point - grab_point) * (weight * config.strength);

    engine.apply(drag_point);
    let d1 = vertex(&engine, id, 0).distance(target);
    engine.apply(drag_point);
    let d2 = vertex(&engine, id, 0).distance(target);
    assert!(d2 < d1, "second apply must move strictly closer to target");
}

#[test]
fn regrab_resets_velocities_and_abandons_return() {
    let config = DeformConfig {
        strength: 1.0,
        grab_lerp: 1.0,
        ..DeformConfig::default()
    };
    let (mut engine, id) = engine_with_vertices(config, &[Vec3::ZERO]);
    grab_at(&mut engine, id, Vec3::ZERO);
    engine.apply(Vec3::new(1.0, 0.0, 0.0));
    engine.grab_end();
    engine.return_tick();
    engine.return_tick();
    let velocities = engine.mesh(id).unwrap().velocities().unwrap();
    assert!(velocities.iter().any(|&v| v != 0.0));

    grab_at(&mut engine, id, Vec3::ZERO);
    assert_eq!(engine.phase(), Phase::Grabbed);
    assert!(!engine.mesh(id).unwrap().is_returning());
    let velocities = engine.mesh(id).unwrap().velocities().unwrap();
    assert!(velocities.iter().all(|&v| v == 0.0));
}

#[test]
fn pathological_config_hits_safety_cap() {
    // damping of exactly 1.0 never loses energy, so the oscillator can
    // never pass the settle test on its own
    let config = DeformConfig {
        damping: 1.0,
        strength: 1.0,
        grab_lerp: 1.0,
        max_return_ticks: 50,
        ..DeformConfig::default()
    };
    let (mut engine, id) = engine_with_vertices(config, &[Vec3::ZERO]);
    grab_at(&mut engine, id, Vec3::ZERO);
    engine.apply(Vec3::new(1.0, 0.0, 0.0));
    engine.grab_end();

    let mut ticks = 0;
    while engine.return_tick() {
        ticks += 1;
        assert!(ticks <= 50, "safety cap did not bound the return phase");
    }
    assert_eq!(engine.positions(id).unwrap(), &[0.0, 0.0, 0.0]);
    assert_eq!(engine.phase(), Phase::Rest);
}

#[test]
fn lifecycle_events_fire_once_per_transition() {
    let (mut engine, id) = engine_with_vertices(DeformConfig::default(), &[Vec3::ZERO]);
    let seen: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    engine.subscribe(move |event| {
        sink.borrow_mut().push(match event {
            DeformEvent::GrabStarted { .. } => "start",
            DeformEvent::GrabEnded => "end",
        });
    });

    engine.grab_end(); // no session: nothing fires
    grab_at(&mut engine, id, Vec3::ZERO);
    grab_at(&mut engine, id, Vec3::ZERO); // already grabbed: nothing fires
    engine.grab_end();
    engine.grab_end();

    assert_eq!(seen.borrow().as_slice(), &["start", "end"]);
}

#[test]
fn operations_on_unregistered_meshes_are_noops() {
    let (donor, id) = engine_with_vertices(DeformConfig::default(), &[Vec3::ZERO]);
    drop(donor);

    let mut engine = DeformationEngine::new(DeformConfig::default());
    assert!(engine.positions(id).is_none());
    assert!(!engine.take_dirty(id));
    assert!(!engine.remove_mesh(id));
    engine.set_transform(id, Mat4::from_translation(Vec3::X));
    // grab/apply/release against an empty registry must not panic
    grab_at(&mut engine, id, Vec3::ZERO);
    engine.apply(Vec3::X);
    engine.grab_end();
    assert!(!engine.return_tick());
}

#[test]
fn register_rejects_bad_geometry() {
    let mut engine = DeformationEngine::new(DeformConfig::default());
    assert!(matches!(
        engine.register_mesh(Vec::new(), Vec::new(), Mat4::IDENTITY),
        Err(MeshError::EmptyGeometry)
    ));
    let verts = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
    assert!(matches!(
        engine.register_mesh(verts.clone(), vec![0, 1], Mat4::IDENTITY),
        Err(MeshError::IndicesNotTriangles(2))
    ));
    assert!(matches!(
        engine.register_mesh(verts, vec![0, 1, 5], Mat4::IDENTITY),
        Err(MeshError::IndexOutOfBounds { index: 5, .. })
    ));
}

#[test]
fn world_transform_shifts_the_influence_zone() {
    // vertex at local origin, mesh translated to x = 10: a grab at the
    // translated position must deform it, a grab at the local origin not
    let transform = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
    let mut engine = DeformationEngine::new(DeformConfig::default());
    let id = engine
        .register_mesh(vec![Vec3::ZERO], Vec::new(), transform)
        .expect("register");

    grab_at(&mut engine, id, Vec3::new(10.0, 0.0, 0.0));
    engine.apply(Vec3::new(10.0, 1.0, 0.0));
    assert!(vertex(&engine, id, 0).y > 0.0);
    engine.grab_end();
    while engine.return_tick() {}

    grab_at(&mut engine, id, Vec3::ZERO);
    engine.apply(Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(vertex(&engine, id, 0), Vec3::ZERO);
}

#[test]
fn dirty_flag_tracks_mutation() {
    let (mut engine, id) = engine_with_vertices(DeformConfig::default(), &[Vec3::ZERO]);
    assert!(engine.take_dirty(id), "registration leaves the buffer dirty");
    assert!(!engine.take_dirty(id));
    grab_at(&mut engine, id, Vec3::ZERO);
    engine.apply(Vec3::X);
    assert!(engine.take_dirty(id));
    assert!(!engine.take_dirty(id));
}
