use glam::Vec2;
use web_sys as web;

#[derive(Default, Clone, Copy)]
pub struct MouseState {
    /// CSS pixel position in the viewport.
    pub px: Vec2,
    /// Normalized device coordinates, +y up.
    pub ndc: Vec2,
    pub down: bool,
}

#[inline]
pub fn pointer_viewport_px(ev: &web::PointerEvent) -> Vec2 {
    Vec2::new(ev.client_x() as f32, ev.client_y() as f32)
}

#[inline]
pub fn pointer_ndc(ev: &web::PointerEvent, canvas: &web::HtmlCanvasElement) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    let x_css = ev.client_x() as f32 - rect.left() as f32;
    let y_css = ev.client_y() as f32 - rect.top() as f32;
    let w = rect.width() as f32;
    let h = rect.height() as f32;
    if w > 0.0 && h > 0.0 {
        Vec2::new((x_css / w) * 2.0 - 1.0, 1.0 - (y_css / h) * 2.0)
    } else {
        Vec2::ZERO
    }
}

/// Screen center in CSS pixels; reference point for the release cue.
#[inline]
pub fn viewport_center() -> Vec2 {
    let (w, h) = web::window()
        .map(|win| {
            let w = win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            let h = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            (w, h)
        })
        .unwrap_or((0.0, 0.0));
    Vec2::new(w as f32 / 2.0, h as f32 / 2.0)
}
