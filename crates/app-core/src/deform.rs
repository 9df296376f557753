//! Elastic deformation engine.
//!
//! Owns the rest-pose, live, and velocity buffers for every registered mesh
//! and drives the grab/stretch/return interaction: while a grab is active,
//! vertices inside the influence radius are pulled toward the drag point with
//! a quadratic falloff; on release, a per-component damped spring relaxes the
//! whole mesh back to its rest pose and snaps it exactly once it settles.
//!
//! The engine never schedules its own frames. The owning loop calls
//! [`DeformationEngine::apply`] (throttled) while grabbed and
//! [`DeformationEngine::return_tick`] once per frame until it reports quiet.

use fnv::FnvHashMap;
use glam::{Mat4, Vec2, Vec3};
use smallvec::SmallVec;

use crate::camera::Camera;
use crate::config::DeformConfig;
use crate::mesh::{DeformableMesh, MeshError, MeshId};
use crate::picking::{self, SurfaceHit};

/// Lifecycle notifications, fired exactly once per transition.
///
/// A deliberately closed set: subscribers (audio cues, cursor styling) match
/// on these rather than on ad-hoc event names.
#[derive(Clone, Copy, Debug)]
pub enum DeformEvent {
    GrabStarted { mesh: MeshId, point: Vec3 },
    GrabEnded,
}

/// Interaction phase of the engine as a whole.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Rest,
    Grabbed,
    Returning,
}

struct GrabSession {
    point: Vec3,
}

type Listener = Box<dyn FnMut(&DeformEvent)>;

/// Quadratic falloff weight: 1 at the grab point, 0 at the influence radius.
#[inline]
pub fn influence_weight(distance: f32, radius: f32) -> f32 {
    let t = (distance / radius).clamp(0.0, 1.0);
    (1.0 - t) * (1.0 - t)
}

pub struct DeformationEngine {
    config: DeformConfig,
    meshes: FnvHashMap<MeshId, DeformableMesh>,
    next_id: u32,
    grab: Option<GrabSession>,
    listeners: Vec<Listener>,
}

impl DeformationEngine {
    pub fn new(config: DeformConfig) -> Self {
        Self {
            config,
            meshes: FnvHashMap::default(),
            next_id: 0,
            grab: None,
            listeners: Vec::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &DeformConfig {
        &self.config
    }

    /// Capture a mesh's rest pose and start tracking it.
    ///
    /// The rest positions are copied once here and never change afterwards.
    /// Meshes without indices can be deformed but never picked.
    pub fn register_mesh(
        &mut self,
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        transform: Mat4,
    ) -> Result<MeshId, MeshError> {
        let mesh = DeformableMesh::new(positions, indices, transform)?;
        let id = MeshId(self.next_id);
        self.next_id += 1;
        log::info!(
            "[deform] registered mesh {:?} ({} vertices)",
            id,
            mesh.vertex_count()
        );
        self.meshes.insert(id, mesh);
        Ok(id)
    }

    /// Drop a mesh (e.g. after a model swap). Unknown ids are ignored.
    pub fn remove_mesh(&mut self, id: MeshId) -> bool {
        self.meshes.remove(&id).is_some()
    }

    #[inline]
    pub fn mesh(&self, id: MeshId) -> Option<&DeformableMesh> {
        self.meshes.get(&id)
    }

    pub fn mesh_ids(&self) -> Vec<MeshId> {
        self.meshes.keys().copied().collect()
    }

    /// Supply a fresh world transform; call whenever the host moves the mesh.
    pub fn set_transform(&mut self, id: MeshId, transform: Mat4) {
        if let Some(mesh) = self.meshes.get_mut(&id) {
            mesh.set_transform(transform);
        }
    }

    /// Flat live positions for upload, or `None` for an unknown id.
    pub fn positions(&self, id: MeshId) -> Option<&[f32]> {
        self.meshes.get(&id).map(|m| m.positions())
    }

    /// True when the mesh mutated since the last call; clears the flag.
    pub fn take_dirty(&mut self, id: MeshId) -> bool {
        match self.meshes.get_mut(&id) {
            Some(mesh) => std::mem::take(&mut mesh.dirty),
            None => false,
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&DeformEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: DeformEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    #[inline]
    pub fn is_grabbed(&self) -> bool {
        self.grab.is_some()
    }

    /// World-space point where the active grab began, if any.
    #[inline]
    pub fn grabbed_point(&self) -> Option<Vec3> {
        self.grab.as_ref().map(|g| g.point)
    }

    pub fn phase(&self) -> Phase {
        if self.grab.is_some() {
            Phase::Grabbed
        } else if self.meshes.values().any(|m| m.returning) {
            Phase::Returning
        } else {
            Phase::Rest
        }
    }

    /// Resolve the pointer to a contact point on the nearest registered mesh.
    ///
    /// Pure query; returns `None` when the ray misses everything.
    pub fn pick(&self, camera: &Camera, ndc: Vec2) -> Option<SurfaceHit> {
        let ray = camera.ray_through(ndc);
        let mut hits: SmallVec<[SurfaceHit; 4]> = SmallVec::new();
        for (&id, mesh) in &self.meshes {
            if let Some((point, distance)) = picking::raycast_mesh(&ray, mesh) {
                hits.push(SurfaceHit {
                    mesh: id,
                    point,
                    distance,
                });
            }
        }
        hits.into_iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Resolve the pointer to a drag target on the camera-facing plane
    /// through the grab point. `None` when not grabbed or the ray grazes the
    /// plane; the caller skips the deformation update for that tick.
    pub fn resolve_drag(&self, camera: &Camera, ndc: Vec2) -> Option<Vec3> {
        let grab = self.grab.as_ref()?;
        camera
            .ray_through(ndc)
            .intersect_plane(camera.view_direction(), grab.point)
    }

    /// Begin a grab at a resolved contact point. Ignored while already
    /// grabbed. Any in-flight return is abandoned and its velocities are
    /// zeroed so no momentum carries into the next release.
    pub fn grab_start(&mut self, hit: SurfaceHit) {
        if self.grab.is_some() {
            return;
        }
        for mesh in self.meshes.values_mut() {
            mesh.returning = false;
            mesh.return_ticks = 0;
            if let Some(velocities) = &mut mesh.velocities {
                velocities.fill(Vec3::ZERO);
            }
        }
        log::info!(
            "[deform] grab started on {:?} at ({:.2},{:.2},{:.2})",
            hit.mesh,
            hit.point.x,
            hit.point.y,
            hit.point.z
        );
        self.grab = Some(GrabSession { point: hit.point });
        self.emit(DeformEvent::GrabStarted {
            mesh: hit.mesh,
            point: hit.point,
        });
    }

    /// Pull vertices toward the drag target.
    ///
    /// Every vertex of every mesh is visited: vertices inside the radius
    /// blend toward rest + pull * falloff * strength, vertices outside relax
    /// toward rest so nothing pops when the grab point sweeps past them.
    /// No-op without an active grab. O(total vertex count) per call with no
    /// per-vertex allocation; the caller throttles the rate.
    pub fn apply(&mut self, drag_point: Vec3) {
        let Some(grabbed) = self.grab.as_ref().map(|g| g.point) else {
            return;
        };
        let pull = drag_point - grabbed;
        let radius = self.config.radius;
        let radius_sq = radius * radius;
        let strength = self.config.strength;
        let grab_lerp = self.config.grab_lerp;
        let return_lerp = self.config.return_lerp;

        for mesh in self.meshes.values_mut() {
            if mesh.rest.is_empty() {
                continue;
            }
            for i in 0..mesh.rest.len() {
                let world = mesh.transform.transform_point3(mesh.rest[i]);
                let dist_sq = world.distance_squared(grabbed);
                if dist_sq > radius_sq {
                    mesh.current[i] = mesh.current[i].lerp(mesh.rest[i], return_lerp);
                    continue;
                }
                let weight = influence_weight(dist_sq.sqrt(), radius);
                let target_world = world + pull * (weight * strength);
                let target_local = mesh.inverse.transform_point3(target_world);
                mesh.current[i] = mesh.current[i].lerp(target_local, grab_lerp);
            }
            mesh.dirty = true;
        }
    }

    /// End the grab and start the spring return on every mesh.
    ///
    /// Velocity buffers are allocated on the first release and reused after.
    pub fn grab_end(&mut self) {
        if self.grab.take().is_none() {
            return;
        }
        let mut returning = 0usize;
        for mesh in self.meshes.values_mut() {
            if mesh.rest.is_empty() {
                continue;
            }
            let n = mesh.rest.len();
            mesh.velocities.get_or_insert_with(|| vec![Vec3::ZERO; n]);
            mesh.returning = true;
            mesh.return_ticks = 0;
            returning += 1;
        }
        log::info!("[deform] grab ended; {} meshes returning", returning);
        self.emit(DeformEvent::GrabEnded);
    }

    /// Advance the spring return one frame. Returns true while any mesh is
    /// still moving; once a mesh settles it is snapped exactly onto its rest
    /// pose and its velocities are zeroed.
    pub fn return_tick(&mut self) -> bool {
        let spring = self.config.spring;
        let damping = self.config.damping;
        let velocity_threshold = self.config.velocity_threshold;
        let distance_threshold = self.config.distance_threshold;
        let max_ticks = self.config.max_return_ticks;

        let mut any_active = false;
        for (&id, mesh) in self.meshes.iter_mut() {
            if !mesh.returning {
                continue;
            }
            let DeformableMesh {
                rest,
                current,
                velocities,
                returning,
                return_ticks,
                dirty,
                ..
            } = mesh;
            let n = rest.len();
            let velocities = velocities.get_or_insert_with(|| vec![Vec3::ZERO; n]);

            let mut has_changes = false;
            for i in 0..n {
                let spring_force = (rest[i] - current[i]) * spring;
                // damping applies after the spring force is added; the
                // settle time depends on this order
                let v = (velocities[i] + spring_force) * damping;
                velocities[i] = v;
                current[i] += v;

                let speed = v.x.abs() + v.y.abs() + v.z.abs();
                let offset = current[i] - rest[i];
                let distance = offset.x.abs() + offset.y.abs() + offset.z.abs();
                if speed > velocity_threshold || distance > distance_threshold {
                    has_changes = true;
                }
            }
            *dirty = true;
            *return_ticks += 1;

            if has_changes && *return_ticks >= max_ticks {
                log::warn!(
                    "[deform] mesh {:?} did not settle within {} ticks; snapping to rest",
                    id,
                    max_ticks
                );
                has_changes = false;
            }
            if has_changes {
                any_active = true;
            } else {
                // exact copy clears accumulated floating-point drift
                current.copy_from_slice(rest);
                velocities.fill(Vec3::ZERO);
                *returning = false;
            }
        }
        any_active
    }
}
