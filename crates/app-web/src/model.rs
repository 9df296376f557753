//! Procedural blob model: generation, placement, and the detail-swap
//! transition.
//!
//! The toy ships a high- and a low-resolution variant of the same blob; the
//! switch button crossfades between them with a stepped clip sweep while
//! BOTH stay registered with the engine, so the surface remains grabbable
//! mid-swap.

use app_core::{constants, DeformationEngine, MeshError, MeshId};
use glam::{Mat4, Vec2, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Detail {
    High,
    Low,
}

impl Detail {
    // (segments, rings) of the UV sphere; High lands near 10k vertices,
    // Low near 500
    fn grid(self) -> (u32, u32) {
        match self {
            Detail::High => (128, 80),
            Detail::Low => (30, 16),
        }
    }

    fn other(self) -> Detail {
        match self {
            Detail::High => Detail::Low,
            Detail::Low => Detail::High,
        }
    }
}

/// Everything the renderer needs to create GPU buffers for a new mesh.
pub struct GpuMeshInit {
    pub id: MeshId,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
}

/// Clip behavior for the model-swap sweep, in world-space X.
#[derive(Clone, Copy, Debug)]
pub enum ClipSide {
    None,
    /// Visible where `x >= front` (the outgoing mesh).
    KeepAbove(f32),
    /// Visible where `x <= front` (the incoming mesh).
    KeepBelow(f32),
}

pub struct MeshDrawInfo {
    pub id: MeshId,
    pub clip: ClipSide,
}

struct Transition {
    old: MeshId,
    elapsed_ms: f32,
    duration_ms: f32,
    steps: u32,
}

pub struct ModelRig {
    current: MeshId,
    detail: Detail,
    rotation: Vec2, // x = pitch, y = yaw
    scale: f32,
    z: f32,
    transition: Option<Transition>,
    pending_adds: Vec<GpuMeshInit>,
    pending_removals: Vec<MeshId>,
}

impl ModelRig {
    pub fn new(engine: &mut DeformationEngine, viewport_width: f32) -> Result<Self, MeshError> {
        let (scale, z) = placement(viewport_width);
        let detail = Detail::High;
        let (segments, rings) = detail.grid();
        let (positions, indices) = blob_mesh(segments, rings);
        let normals = vertex_normals(&positions, &indices);
        let transform = compose_transform(Vec2::ZERO, scale, z);
        let id = engine.register_mesh(positions, indices.clone(), transform)?;
        Ok(Self {
            current: id,
            detail,
            rotation: Vec2::ZERO,
            scale,
            z,
            transition: None,
            pending_adds: vec![GpuMeshInit {
                id,
                normals: flatten(&normals),
                indices,
            }],
            pending_removals: Vec::new(),
        })
    }

    pub fn resize(&mut self, viewport_width: f32) {
        let (scale, z) = placement(viewport_width);
        self.scale = scale;
        self.z = z;
    }

    #[inline]
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Swap between the high- and low-detail blob. Ignored while a swap is
    /// already running. Returns whether a swap started.
    pub fn toggle_detail(&mut self, engine: &mut DeformationEngine) -> bool {
        if self.transition.is_some() {
            return false;
        }
        let next = self.detail.other();
        let to_high = next == Detail::High;
        let (segments, rings) = next.grid();
        let (positions, indices) = blob_mesh(segments, rings);
        let normals = vertex_normals(&positions, &indices);
        let transform = compose_transform(self.rotation, self.scale, self.z);
        match engine.register_mesh(positions, indices.clone(), transform) {
            Ok(id) => {
                self.pending_adds.push(GpuMeshInit {
                    id,
                    normals: flatten(&normals),
                    indices,
                });
                // returning to the high-res model sweeps much faster
                self.transition = Some(Transition {
                    old: self.current,
                    elapsed_ms: 0.0,
                    duration_ms: if to_high { 1000.0 } else { 3000.0 },
                    steps: if to_high { 16 } else { 48 },
                });
                self.current = id;
                self.detail = next;
                log::info!("[model] switching to {:?}", next);
                true
            }
            Err(e) => {
                log::error!("[model] switch failed: {}", e);
                false
            }
        }
    }

    /// Per-frame update: pointer-follow rotation (suspended while grabbed),
    /// transition progress, and fresh world transforms into the engine.
    pub fn update(
        &mut self,
        engine: &mut DeformationEngine,
        mouse_ndc: Vec2,
        grabbed: bool,
        dt_ms: f32,
    ) {
        if !grabbed {
            let target_yaw = mouse_ndc.x * constants::ROTATION_Y_FACTOR;
            let target_pitch = -mouse_ndc.y * constants::ROTATION_X_FACTOR;
            self.rotation.y += (target_yaw - self.rotation.y) * constants::ROTATION_LERP_FACTOR;
            self.rotation.x += (target_pitch - self.rotation.x) * constants::ROTATION_LERP_FACTOR;
        }
        let transform = compose_transform(self.rotation, self.scale, self.z);
        engine.set_transform(self.current, transform);

        if let Some(tr) = &mut self.transition {
            // both meshes rotate in lockstep during the swap
            engine.set_transform(tr.old, transform);
            tr.elapsed_ms += dt_ms;
            if tr.elapsed_ms >= tr.duration_ms {
                engine.remove_mesh(tr.old);
                self.pending_removals.push(tr.old);
                self.transition = None;
                log::info!("[model] switch complete");
            }
        }
    }

    pub fn draws(&self) -> Vec<MeshDrawInfo> {
        match &self.transition {
            Some(tr) => {
                let front = clip_front(tr);
                vec![
                    MeshDrawInfo {
                        id: tr.old,
                        clip: ClipSide::KeepAbove(front),
                    },
                    MeshDrawInfo {
                        id: self.current,
                        clip: ClipSide::KeepBelow(front),
                    },
                ]
            }
            None => vec![MeshDrawInfo {
                id: self.current,
                clip: ClipSide::None,
            }],
        }
    }

    pub fn take_pending_adds(&mut self) -> Vec<GpuMeshInit> {
        std::mem::take(&mut self.pending_adds)
    }

    pub fn take_pending_removals(&mut self) -> Vec<MeshId> {
        std::mem::take(&mut self.pending_removals)
    }
}

// Sweep front in world X, quantized to a step count for the chunky
// low-fi reveal. The outgoing mesh keeps the right side of the front.
fn clip_front(tr: &Transition) -> f32 {
    let p = (tr.elapsed_ms / tr.duration_ms).clamp(0.0, 1.0);
    let q = (p * tr.steps as f32).floor() / tr.steps as f32;
    -2.0 + 4.0 * q
}

fn placement(viewport_width: f32) -> (f32, f32) {
    if viewport_width <= constants::MOBILE_BREAKPOINT {
        (constants::MOBILE_SCALE, constants::MOBILE_Z)
    } else {
        (constants::DESKTOP_SCALE, constants::DESKTOP_Z)
    }
}

fn compose_transform(rotation: Vec2, scale: f32, z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, z))
        * Mat4::from_rotation_x(rotation.x)
        * Mat4::from_rotation_y(rotation.y)
        * Mat4::from_scale(Vec3::splat(scale))
}

fn flatten(normals: &[Vec3]) -> Vec<f32> {
    bytemuck::cast_slice(normals).to_vec()
}

/// UV sphere with a gentle lobed surface so it reads as an organic blob
/// rather than a geometric primitive.
pub fn blob_mesh(segments: u32, rings: u32) -> (Vec<Vec3>, Vec<u32>) {
    use std::f32::consts::{PI, TAU};

    let mut positions = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
    for r in 0..=rings {
        let phi = PI * r as f32 / rings as f32;
        for s in 0..=segments {
            let theta = TAU * s as f32 / segments as f32;
            let lobes = 1.0 + 0.08 * (3.0 * theta).sin() * (2.0 * phi).sin();
            positions.push(Vec3::new(
                lobes * phi.sin() * theta.cos(),
                lobes * phi.cos() * 1.1,
                lobes * phi.sin() * theta.sin(),
            ));
        }
    }

    let stride = segments + 1;
    let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
    for r in 0..rings {
        for s in 0..segments {
            let a = r * stride + s;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            indices.extend_from_slice(&[a, b, c, b, d, c]);
        }
    }
    (positions, indices)
}

/// Area-weighted vertex normals from the rest geometry. The deformation
/// never recomputes these; lighting uses the rest-pose shading throughout,
/// which holds up fine for the gentle stretches involved.
pub fn vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let p0 = positions[tri[0] as usize];
        let p1 = positions[tri[1] as usize];
        let p2 = positions[tri[2] as usize];
        let face = (p1 - p0).cross(p2 - p0);
        for &i in tri {
            normals[i as usize] += face;
        }
    }
    for n in &mut normals {
        *n = n.normalize_or_zero();
    }
    normals
}
