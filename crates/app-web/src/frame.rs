//! Per-frame loop.
//!
//! Frame order matters and mirrors the engine's integration contract:
//! model placement first, then the throttled deformation apply, then the
//! spring return ticks, then buffer uploads, then the draw.

use std::cell::RefCell;
use std::rc::Rc;

use app_core::{Camera, ColorWheel, DeformationEngine, Throttle};
use instant::Instant;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::input::MouseState;
use crate::lighting::LightingRig;
use crate::model::ModelRig;
use crate::render::{self, GpuState};
use crate::ui;

pub struct FrameContext {
    pub engine: Rc<RefCell<DeformationEngine>>,
    pub camera: Rc<RefCell<Camera>>,
    pub mouse: Rc<RefCell<MouseState>>,
    pub model: Rc<RefCell<ModelRig>>,
    pub lighting: Rc<RefCell<LightingRig>>,
    pub disco: Rc<RefCell<bool>>,

    pub canvas: web::HtmlCanvasElement,
    pub letters: Vec<web::HtmlElement>,
    pub wheel: ColorWheel,

    pub gpu: Option<GpuState<'static>>,
    pub throttle: Throttle,
    pub started: Instant,
    pub last_instant: Instant,
    pub last_letter_ms: f64,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt_ms = (now - self.last_instant).as_secs_f32() * 1000.0;
        self.last_instant = now;
        let time_ms = (now - self.started).as_secs_f64() * 1000.0;

        let width = self.canvas.width();
        let height = self.canvas.height();
        self.camera.borrow_mut().aspect = width as f32 / height.max(1) as f32;

        let mouse_ndc = self.mouse.borrow().ndc;

        // model placement, pointer-follow rotation, transition progress;
        // feeds fresh world transforms into the engine
        {
            let mut engine = self.engine.borrow_mut();
            let grabbed = engine.is_grabbed();
            self.model
                .borrow_mut()
                .update(&mut engine, mouse_ndc, grabbed, dt_ms);
        }

        // throttled deformation while grabbed, then the spring return
        {
            let mut engine = self.engine.borrow_mut();
            if engine.is_grabbed() && self.throttle.ready(now) {
                let camera = self.camera.borrow();
                if let Some(drag) = engine.resolve_drag(&camera, mouse_ndc) {
                    engine.apply(drag);
                }
                // a grazing ray skips this tick's update
            }
            engine.return_tick();
        }

        {
            let mut lighting = self.lighting.borrow_mut();
            lighting.set_mouse(mouse_ndc);
            lighting.animate(time_ms);
        }

        if *self.disco.borrow() {
            self.last_letter_ms =
                ui::animate_letters(&self.letters, &self.wheel, time_ms, self.last_letter_ms);
        }

        // upload mutated buffers, then draw
        if let Some(gpu) = &mut self.gpu {
            gpu.resize_if_needed(width, height);
            let mut engine = self.engine.borrow_mut();
            let mut model = self.model.borrow_mut();
            for init in model.take_pending_adds() {
                if let Some(positions) = engine.positions(init.id) {
                    gpu.add_mesh(init.id, positions, &init.normals, &init.indices);
                }
            }
            for id in model.take_pending_removals() {
                gpu.remove_mesh(id);
            }
            for id in engine.mesh_ids() {
                if engine.take_dirty(id) {
                    if let Some(positions) = engine.positions(id) {
                        gpu.update_positions(id, positions);
                    }
                }
            }
            let draws: Vec<render::MeshDraw> = model
                .draws()
                .into_iter()
                .filter_map(|d| {
                    engine.mesh(d.id).map(|m| render::MeshDraw {
                        id: d.id,
                        model: m.transform(),
                        clip: d.clip,
                    })
                })
                .collect();
            let camera = self.camera.borrow();
            let view_proj = camera.projection_matrix() * camera.view_matrix();
            let lighting = self.lighting.borrow();
            let lights = render::LightParams {
                point_pos: lighting.point_position(),
                point_color: lighting.point_color(),
                point_intensity: lighting.point_intensity(),
            };
            if let Err(e) = gpu.render(view_proj, &draws, &lights) {
                log::error!("render error: {:?}", e);
            }
        }
    }
}

pub async fn init_gpu(canvas: &web::HtmlCanvasElement) -> Option<GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for the surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    match GpuState::new(leaked_canvas).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        if let Some(w) = web::window() {
            let _ = w.request_animation_frame(
                tick_clone
                    .borrow()
                    .as_ref()
                    .unwrap()
                    .as_ref()
                    .unchecked_ref(),
            );
        }
    }) as Box<dyn FnMut()>));
    if let Some(w) = web::window() {
        let _ = w.request_animation_frame(tick.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}
