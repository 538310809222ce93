use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, TouchEvent};
use yew::prelude::*;

use crate::fetch;
use crate::state::{GlobeConfig, GlobeEngine, TouchState, is_visible};
use crate::util::{clog, now_ms};

const OCEAN_INNER: &str = "#5bc0de";
const OCEAN_OUTER: &str = "#338eda";
const LAND_FILL: &str = "#4c8a64";
const LAND_STROKE: &str = "#2f5d43";
const MARKER_FILL: &str = "#ec3750";

#[derive(Properties, PartialEq, Clone)]
pub struct GlobeViewProps {
    pub config: GlobeConfig,
    /// A marker was hovered or clicked; surface its name.
    pub on_caption: Callback<String>,
    /// The pointer left all markers; dismiss the caption.
    pub on_caption_clear: Callback<()>,
    /// The idle window elapsed; hide the intro banner (fires once).
    pub on_hide_banner: Callback<()>,
}

#[function_component(GlobeView)]
pub fn globe_view(props: &GlobeViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let engine = use_mut_ref(|| None::<GlobeEngine>);
    let draw_ref = use_mut_ref(|| None::<Rc<dyn Fn()>>);
    let touch_state = use_mut_ref(TouchState::default);
    let hover_name = use_mut_ref(|| None::<String>);

    {
        let canvas_ref = canvas_ref.clone();
        let engine = engine.clone();
        let draw_ref_setup = draw_ref.clone();
        let touch_state = touch_state.clone();
        let hover_name = hover_name.clone();
        let config = props.config;
        let on_caption = props.on_caption.clone();
        let on_caption_clear = props.on_caption_clear.clone();
        let on_hide_banner = props.on_hide_banner.clone();

        use_effect_with((), move |_| {
            let window = web_sys::window().expect("no global `window` exists");
            let canvas: HtmlCanvasElement = canvas_ref
                .cast::<HtmlCanvasElement>()
                .expect("canvas_ref not attached to a canvas element");

            // Viewport is read once; resize is deliberately not handled.
            let width = window
                .inner_width()
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(800.0);
            let height = window
                .inner_height()
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(600.0);
            canvas.set_width(width.max(0.0) as u32);
            canvas.set_height(height.max(0.0) as u32);
            *engine.borrow_mut() = Some(GlobeEngine::new(width, height, config, now_ms()));

            // Build draw closure and store in draw_ref.
            let draw_closure: Rc<dyn Fn()> = {
                let canvas = canvas.clone();
                let engine = engine.clone();
                Rc::new(move || {
                    if !canvas.is_connected() {
                        return;
                    }
                    let ctx = match canvas.get_context("2d").ok().flatten() {
                        Some(c) => c.dyn_into::<CanvasRenderingContext2d>().unwrap(),
                        None => return,
                    };
                    let guard = engine.borrow();
                    let Some(e) = guard.as_ref() else {
                        return;
                    };
                    draw_globe(&ctx, &canvas, e);
                })
            };
            *draw_ref_setup.borrow_mut() = Some(draw_closure.clone());

            // Initial draw (empty globe until the fetches resolve).
            (draw_closure)();

            // Landmass outlines, fetched once. A failure leaves the layer
            // empty; the globe stays interactive either way.
            {
                let engine = engine.clone();
                let draw = draw_closure.clone();
                spawn_local(async move {
                    match fetch::load_landmasses().await {
                        Ok(outlines) => {
                            clog(&format!("landmasses: {} outlines", outlines.len()));
                            if let Some(e) = engine.borrow_mut().as_mut() {
                                e.set_landmasses(outlines);
                            }
                            draw();
                        }
                        Err(err) => clog(&format!("landmass fetch failed: {err}")),
                    }
                });
            }

            // Club locations, appended exactly once, then an initial marker draw.
            {
                let engine = engine.clone();
                let draw = draw_closure.clone();
                spawn_local(async move {
                    match fetch::load_locations().await {
                        Ok(locations) => {
                            clog(&format!("clubs: {}", locations.len()));
                            if let Some(e) = engine.borrow_mut().as_mut() {
                                e.set_locations(locations);
                            }
                            draw();
                        }
                        Err(err) => clog(&format!("club fetch failed: {err}")),
                    }
                });
            }

            // Animation frame loop: advance the spin, then redraw.
            let raf_id = Rc::new(RefCell::new(None));
            {
                let raf_id_clone = raf_id.clone();
                let engine = engine.clone();
                let draw_ref_loop = draw_ref_setup.clone();
                let window_loop = window.clone();
                let on_hide_banner = on_hide_banner.clone();
                let closure_cell: Rc<RefCell<Option<Closure<dyn FnMut()>>>> =
                    Rc::new(RefCell::new(None));
                let closure_cell_clone = closure_cell.clone();
                *closure_cell.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                    let hide = {
                        let mut guard = engine.borrow_mut();
                        match guard.as_mut() {
                            Some(e) => e.tick(now_ms()).hide_banner,
                            None => false,
                        }
                    };
                    if hide {
                        on_hide_banner.emit(());
                    }
                    if let Some(f) = &*draw_ref_loop.borrow() {
                        f();
                    }
                    if let Ok(id) = window_loop.request_animation_frame(
                        closure_cell_clone
                            .borrow()
                            .as_ref()
                            .unwrap()
                            .as_ref()
                            .unchecked_ref(),
                    ) {
                        *raf_id_clone.borrow_mut() = Some(id);
                    }
                }) as Box<dyn FnMut()>));
                if let Ok(id) = window.request_animation_frame(
                    closure_cell
                        .borrow()
                        .as_ref()
                        .unwrap()
                        .as_ref()
                        .unchecked_ref(),
                ) {
                    *raf_id.borrow_mut() = Some(id);
                }
            }

            // Wheel zoom. Every decorative layer reads the same radius off
            // the engine, so the discs can never desynchronize.
            let wheel_cb = {
                let engine = engine.clone();
                let draw_ref = draw_ref_setup.clone();
                Closure::wrap(Box::new(move |e: web_sys::WheelEvent| {
                    e.prevent_default();
                    if let Some(eng) = engine.borrow_mut().as_mut() {
                        let k = eng.zoom() * (-e.delta_y() * 0.001).exp();
                        eng.set_zoom(k);
                    }
                    if let Some(f) = &*draw_ref.borrow() {
                        f();
                    }
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("wheel", wheel_cb.as_ref().unchecked_ref())
                .unwrap();

            // Mouse down starts a drag session.
            let mousedown_cb = {
                let engine = engine.clone();
                let draw_ref = draw_ref_setup.clone();
                Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
                    if let Some(eng) = engine.borrow_mut().as_mut() {
                        eng.begin_drag(e.offset_x() as f64, e.offset_y() as f64);
                    }
                    if let Some(f) = &*draw_ref.borrow() {
                        f();
                    }
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback(
                    "mousedown",
                    mousedown_cb.as_ref().unchecked_ref(),
                )
                .unwrap();

            // Mouse move: rotate during a drag, hover-test markers otherwise.
            let mousemove_cb = {
                let engine = engine.clone();
                let draw_ref = draw_ref_setup.clone();
                let hover_name = hover_name.clone();
                let on_caption = on_caption.clone();
                let on_caption_clear = on_caption_clear.clone();
                Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
                    let x = e.offset_x() as f64;
                    let y = e.offset_y() as f64;
                    let mut guard = engine.borrow_mut();
                    let Some(eng) = guard.as_mut() else {
                        return;
                    };
                    if eng.is_dragging() {
                        eng.drag_to(x, y);
                        drop(guard);
                        if let Some(f) = &*draw_ref.borrow() {
                            f();
                        }
                        return;
                    }
                    let hit = eng.hit_test(x, y).map(|loc| loc.name.clone());
                    drop(guard);
                    let mut hover = hover_name.borrow_mut();
                    if hit != *hover {
                        match &hit {
                            Some(name) => on_caption.emit(name.clone()),
                            None => on_caption_clear.emit(()),
                        }
                        *hover = hit;
                    }
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback(
                    "mousemove",
                    mousemove_cb.as_ref().unchecked_ref(),
                )
                .unwrap();

            // Mouse up anywhere ends the press and resumes auto-rotation,
            // including presses that landed off the silhouette. The engine
            // ignores ups with no matching press.
            let mouseup_cb = {
                let engine = engine.clone();
                Closure::wrap(Box::new(move |_e: web_sys::MouseEvent| {
                    if let Some(eng) = engine.borrow_mut().as_mut() {
                        eng.end_drag(now_ms());
                    }
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("mouseup", mouseup_cb.as_ref().unchecked_ref())
                .unwrap();

            // Click surfaces the marker name, same as hover.
            let click_cb = {
                let engine = engine.clone();
                let on_caption = on_caption.clone();
                Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
                    let guard = engine.borrow();
                    let Some(eng) = guard.as_ref() else {
                        return;
                    };
                    if let Some(loc) = eng.hit_test(e.offset_x() as f64, e.offset_y() as f64) {
                        on_caption.emit(loc.name.clone());
                    }
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("click", click_cb.as_ref().unchecked_ref())
                .unwrap();

            // Touch: one finger drags, two fingers pinch-zoom. A second
            // finger suppresses (and cancels) the drag.
            let touch_start_cb = {
                let canvas_tc = canvas.clone();
                let engine = engine.clone();
                let touch_state_tc = touch_state.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    let rect = canvas_tc.get_bounding_client_rect();
                    let mut guard = engine.borrow_mut();
                    let Some(eng) = guard.as_mut() else {
                        return;
                    };
                    let touches = e.touches();
                    if touches.length() == 1 {
                        if let Some(t0) = touches.item(0) {
                            let cx = t0.client_x() as f64 - rect.left();
                            let cy = t0.client_y() as f64 - rect.top();
                            let mut ts = touch_state_tc.borrow_mut();
                            ts.single_active = true;
                            ts.pinch = false;
                            drop(ts);
                            eng.begin_drag(cx, cy);
                        }
                    } else if touches.length() >= 2 {
                        if let (Some(t0), Some(t1)) = (touches.item(0), touches.item(1)) {
                            eng.end_drag(now_ms());
                            let dx = (t1.client_x() - t0.client_x()) as f64;
                            let dy = (t1.client_y() - t0.client_y()) as f64;
                            let mut ts = touch_state_tc.borrow_mut();
                            ts.pinch = true;
                            ts.single_active = false;
                            ts.start_pinch_dist = (dx * dx + dy * dy).sqrt().max(1.0);
                            ts.start_zoom = eng.zoom();
                        }
                    }
                    e.prevent_default();
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback(
                    "touchstart",
                    touch_start_cb.as_ref().unchecked_ref(),
                )
                .ok();

            let touch_move_cb = {
                let canvas_tc = canvas.clone();
                let engine = engine.clone();
                let touch_state_tc = touch_state.clone();
                let draw_ref = draw_ref_setup.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    let touches = e.touches();
                    let rect = canvas_tc.get_bounding_client_rect();
                    {
                        let mut guard = engine.borrow_mut();
                        let Some(eng) = guard.as_mut() else {
                            return;
                        };
                        if touches.length() == 1 && touch_state_tc.borrow().single_active {
                            if let Some(t0) = touches.item(0) {
                                let cx = t0.client_x() as f64 - rect.left();
                                let cy = t0.client_y() as f64 - rect.top();
                                eng.drag_to(cx, cy);
                            }
                        } else if touches.length() >= 2 && touch_state_tc.borrow().pinch {
                            if let (Some(t0), Some(t1)) = (touches.item(0), touches.item(1)) {
                                let dx = (t1.client_x() - t0.client_x()) as f64;
                                let dy = (t1.client_y() - t0.client_y()) as f64;
                                let dist = (dx * dx + dy * dy).sqrt().max(1.0);
                                let ts = touch_state_tc.borrow();
                                let k = ts.start_zoom * dist / ts.start_pinch_dist;
                                drop(ts);
                                eng.set_zoom(k);
                            }
                        }
                    }
                    if let Some(f) = &*draw_ref.borrow() {
                        f();
                    }
                    e.prevent_default();
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback(
                    "touchmove",
                    touch_move_cb.as_ref().unchecked_ref(),
                )
                .ok();

            let touch_end_cb = {
                let canvas_tc = canvas.clone();
                let engine = engine.clone();
                let touch_state_tc = touch_state.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    let left = e.touches().length();
                    let mut guard = engine.borrow_mut();
                    let Some(eng) = guard.as_mut() else {
                        return;
                    };
                    let mut ts = touch_state_tc.borrow_mut();
                    if left == 0 {
                        ts.single_active = false;
                        ts.pinch = false;
                        // A tap that missed the silhouette still paused the
                        // spin; lifting the finger resumes it.
                        eng.end_drag(now_ms());
                    } else if left == 1 {
                        // Pinch collapsed to one finger: that finger starts
                        // a fresh drag session.
                        ts.pinch = false;
                        ts.single_active = true;
                        if let Some(t0) = e.touches().item(0) {
                            let rect = canvas_tc.get_bounding_client_rect();
                            eng.begin_drag(
                                t0.client_x() as f64 - rect.left(),
                                t0.client_y() as f64 - rect.top(),
                            );
                        }
                    }
                    e.prevent_default();
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback(
                    "touchend",
                    touch_end_cb.as_ref().unchecked_ref(),
                )
                .ok();
            canvas
                .add_event_listener_with_callback(
                    "touchcancel",
                    touch_end_cb.as_ref().unchecked_ref(),
                )
                .ok();

            // Cleanup for all listeners and the frame loop.
            let window_clone = window.clone();
            move || {
                let _ = canvas
                    .remove_event_listener_with_callback("wheel", wheel_cb.as_ref().unchecked_ref());
                let _ = canvas.remove_event_listener_with_callback(
                    "mousedown",
                    mousedown_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "mousemove",
                    mousemove_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas
                    .remove_event_listener_with_callback("click", click_cb.as_ref().unchecked_ref());
                let _ = window_clone.remove_event_listener_with_callback(
                    "mouseup",
                    mouseup_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "touchstart",
                    touch_start_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "touchmove",
                    touch_move_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "touchend",
                    touch_end_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "touchcancel",
                    touch_end_cb.as_ref().unchecked_ref(),
                );
                if let Some(id) = *raf_id.borrow() {
                    let _ = window_clone.cancel_animation_frame(id);
                }
                let _keep_alive = (
                    &wheel_cb,
                    &mousedown_cb,
                    &mousemove_cb,
                    &mouseup_cb,
                    &click_cb,
                    &touch_start_cb,
                    &touch_move_cb,
                    &touch_end_cb,
                );
            }
        });
    }

    html! {
        <canvas ref={canvas_ref} id="globe-canvas" style="display:block; width:100%; height:100%; cursor:grab;"></canvas>
    }
}

/// Redraw everything from current engine state. Pure function of that state:
/// layers back to front are ocean, landmasses, highlight, shading, markers,
/// with all three decorative discs sharing the engine's layer radius.
fn draw_globe(ctx: &CanvasRenderingContext2d, canvas: &HtmlCanvasElement, e: &GlobeEngine) {
    let w = canvas.width() as f64;
    let h = canvas.height() as f64;
    let (cx, cy) = e.projection().translate();
    let r = e.layer_radius();

    ctx.set_fill_style_str("#0e1116");
    ctx.fill_rect(0.0, 0.0, w, h);

    // Ocean disc with an upper-right light source.
    if let Ok(g) = ctx.create_radial_gradient(cx + 0.5 * r, cy - 0.5 * r, 0.1 * r, cx + 0.5 * r, cy - 0.5 * r, 1.8 * r)
    {
        let _ = g.add_color_stop(0.1, OCEAN_INNER);
        let _ = g.add_color_stop(1.0, OCEAN_OUTER);
        ctx.set_fill_style_canvas_gradient(&g);
        ctx.begin_path();
        ctx.arc(cx, cy, r, 0.0, TAU).ok();
        ctx.fill();
    }

    // Landmass outlines. Segments are split at the horizon: only runs of
    // near-hemisphere vertices are drawn, which approximates great-circle
    // clipping well at this outline density.
    let center = e.projection().center();
    ctx.set_fill_style_str(LAND_FILL);
    ctx.set_stroke_style_str(LAND_STROKE);
    ctx.set_line_width(0.75);
    for ring in e.landmasses() {
        let mut run_open = false;
        let mut any = false;
        ctx.begin_path();
        for point in ring {
            if is_visible(*point, center) {
                let (x, y) = e.projection().project(*point);
                if run_open {
                    ctx.line_to(x, y);
                } else {
                    ctx.move_to(x, y);
                    run_open = true;
                    any = true;
                }
            } else {
                run_open = false;
            }
        }
        if any {
            ctx.fill();
            ctx.stroke();
        }
    }

    // Highlight and shading discs, same radius as the sphere.
    if let Ok(g) = ctx.create_radial_gradient(cx + 0.5 * r, cy - 0.5 * r, 0.05 * r, cx + 0.5 * r, cy - 0.5 * r, 1.8 * r)
    {
        let _ = g.add_color_stop(0.05, "rgba(221, 255, 255, 0.5)");
        let _ = g.add_color_stop(1.0, "rgba(153, 170, 187, 0.0625)");
        ctx.set_fill_style_canvas_gradient(&g);
        ctx.begin_path();
        ctx.arc(cx, cy, r, 0.0, TAU).ok();
        ctx.fill();
    }
    if let Ok(g) = ctx.create_radial_gradient(cx, cy - 0.2 * r, 0.5 * r, cx, cy - 0.2 * r, 1.5 * r) {
        let _ = g.add_color_stop(0.5, "rgba(153, 170, 187, 0.0)");
        let _ = g.add_color_stop(1.0, "rgba(62, 97, 132, 0.3)");
        ctx.set_fill_style_canvas_gradient(&g);
        ctx.begin_path();
        ctx.arc(cx, cy, r, 0.0, TAU).ok();
        ctx.fill();
    }

    // Markers. Far-side markers stay in the set with their paint suppressed.
    ctx.set_fill_style_str(MARKER_FILL);
    for marker in e.markers() {
        if !marker.visible {
            continue;
        }
        ctx.begin_path();
        ctx.arc(marker.x, marker.y, marker.radius, 0.0, TAU).ok();
        ctx.fill();
    }
}
