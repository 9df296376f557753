#![cfg(target_arch = "wasm32")]
//! Browser entry point: wires the deformation engine, renderer, audio, and
//! UI together. Systems that need a user gesture (audio, WebGPU surface)
//! start on the first click that dismisses the start overlay.

mod audio;
mod dom;
mod events;
mod frame;
mod input;
mod lighting;
mod model;
mod overlay;
mod render;
mod ui;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use app_core::{constants, Camera, ColorWheel, DeformConfig, DeformEvent, DeformationEngine, StretchTracker, Throttle};
use glam::Vec3;
use instant::Instant;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("app-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id("app-canvas")
        .ok_or_else(|| anyhow::anyhow!("missing #app-canvas"))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    dom::sync_canvas_backing_size(&canvas);

    let config = DeformConfig::default();
    config.validate()?;
    let throttle_interval = config.throttle;
    let engine = Rc::new(RefCell::new(DeformationEngine::new(config)));

    let camera = Rc::new(RefCell::new(Camera {
        eye: Vec3::new(0.0, 0.0, constants::CAMERA_Z),
        target: Vec3::ZERO,
        up: Vec3::Y,
        aspect: canvas.width() as f32 / canvas.height().max(1) as f32,
        fovy_radians: constants::CAMERA_FOV_DEG.to_radians(),
        znear: constants::CAMERA_ZNEAR,
        zfar: constants::CAMERA_ZFAR,
    }));

    let model = Rc::new(RefCell::new(model::ModelRig::new(
        &mut engine.borrow_mut(),
        dom::viewport_width(),
    )?));

    // keep the canvas backing store and the responsive placement in sync
    {
        let canvas_resize = canvas.clone();
        let model_resize = model.clone();
        let closure = Closure::wrap(Box::new(move || {
            dom::sync_canvas_backing_size(&canvas_resize);
            model_resize.borrow_mut().resize(dom::viewport_width());
        }) as Box<dyn FnMut()>);
        window
            .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
            .ok();
        closure.forget();
    }

    let mouse = Rc::new(RefCell::new(input::MouseState::default()));
    let stretch = Rc::new(RefCell::new(StretchTracker::new(
        constants::STRETCH_INITIAL_THRESHOLD,
        constants::STRETCH_SUBSEQUENT_THRESHOLD,
    )));
    let lighting = Rc::new(RefCell::new(lighting::LightingRig::new()));
    let disco = Rc::new(RefCell::new(false));

    // grab lifecycle drives the cursor
    {
        let document_cursor = document.clone();
        engine.borrow_mut().subscribe(move |event| match event {
            DeformEvent::GrabStarted { .. } => dom::set_body_cursor(&document_cursor, "grabbing"),
            DeformEvent::GrabEnded => dom::set_body_cursor(&document_cursor, "grab"),
        });
        dom::set_body_cursor(&document, "grab");
    }

    // first gesture: unlock audio, bring up WebGPU, start the loop
    static STARTED: AtomicBool = AtomicBool::new(false);
    {
        let canvas_start = canvas.clone();
        let document_start = document.clone();
        let engine_start = engine.clone();
        let camera_start = camera.clone();
        let mouse_start = mouse.clone();
        let stretch_start = stretch.clone();
        let lighting_start = lighting.clone();
        let model_start = model.clone();
        let disco_start = disco.clone();
        let closure = Closure::wrap(Box::new(move || {
            if STARTED.swap(true, Ordering::SeqCst) {
                return;
            }
            let canvas = canvas_start.clone();
            let document = document_start.clone();
            let engine = engine_start.clone();
            let camera = camera_start.clone();
            let mouse = mouse_start.clone();
            let stretch = stretch_start.clone();
            let lighting = lighting_start.clone();
            let model = model_start.clone();
            let disco = disco_start.clone();
            spawn_local(async move {
                log::info!("[gesture] starting systems after click");
                let audio = match audio::AudioRig::new(js_sys::Date::now() as u64) {
                    Ok(a) => Rc::new(a),
                    Err(()) => {
                        log::error!("audio init failed");
                        return;
                    }
                };
                audio.unlock();
                overlay::hide(&document);

                let gpu = frame::init_gpu(&canvas).await;

                let letters = ui::wire_ui(ui::UiWiring {
                    document: document.clone(),
                    engine: engine.clone(),
                    model: model.clone(),
                    lighting: lighting.clone(),
                    audio: audio.clone(),
                    disco: disco.clone(),
                });
                events::wire_input_handlers(events::InputWiring {
                    canvas: canvas.clone(),
                    engine: engine.clone(),
                    camera: camera.clone(),
                    mouse: mouse.clone(),
                    stretch: stretch.clone(),
                    audio: audio.clone(),
                });

                let now = Instant::now();
                let ctx = frame::FrameContext {
                    engine,
                    camera,
                    mouse,
                    model,
                    lighting,
                    disco,
                    canvas,
                    letters,
                    wheel: ColorWheel::new(
                        constants::COLOR_CACHE_STEP,
                        constants::COLOR_SATURATION,
                        constants::COLOR_LIGHTNESS,
                    ),
                    gpu,
                    throttle: Throttle::new(throttle_interval),
                    started: now,
                    last_instant: now,
                    last_letter_ms: 0.0,
                };
                frame::start_loop(Rc::new(RefCell::new(ctx)));
            });
        }) as Box<dyn FnMut()>);
        canvas
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
        closure.forget();
    }

    overlay::show(&document);
    Ok(())
}
