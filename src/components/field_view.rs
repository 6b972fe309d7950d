//! Canvas host: owns the particle field and snake engine, drives both from a
//! single animation-frame loop, and bridges DOM input into the engines.

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{
    CanvasRenderingContext2d, Element, FocusEvent, HtmlCanvasElement, HtmlElement, KeyboardEvent,
};
use yew::prelude::*;

use crate::game::{Direction, GamePhase, Palette, ParticleField, Rng, SnakeEngine};
use crate::state::{GameSession, Pointer, SessionAction};
use crate::util::{clog, now_ms};

#[derive(Properties, PartialEq, Clone)]
pub struct FieldViewProps {
    pub session: UseReducerHandle<GameSession>,
}

/// True for elements whose focus must veto game key handling.
fn is_text_input(target: Option<web_sys::EventTarget>) -> bool {
    let Some(el) = target.and_then(|t| t.dyn_into::<Element>().ok()) else {
        return false;
    };
    if matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT") {
        return true;
    }
    if el.get_attribute("role").as_deref() == Some("textbox") {
        return true;
    }
    el.dyn_into::<HtmlElement>()
        .map(|h| h.is_content_editable())
        .unwrap_or(false)
}

fn arrow_direction(key: &str) -> Option<Direction> {
    match key {
        "ArrowUp" => Some(Direction::Up),
        "ArrowDown" => Some(Direction::Down),
        "ArrowLeft" => Some(Direction::Left),
        "ArrowRight" => Some(Direction::Right),
        _ => None,
    }
}

#[function_component(FieldView)]
pub fn field_view(props: &FieldViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let field = use_mut_ref(|| None::<ParticleField>);
    let snake = use_mut_ref(|| None::<SnakeEngine>);
    let pointer = use_mut_ref(Pointer::default);
    // Always-current session handle for closures installed once on mount.
    let session_ref = use_mut_ref(|| props.session.clone());

    {
        let session_ref = session_ref.clone();
        let handle = props.session.clone();
        use_effect_with(handle.clone(), move |_| {
            *session_ref.borrow_mut() = handle;
            || ()
        });
    }

    {
        let canvas_ref = canvas_ref.clone();
        let field = field.clone();
        let snake = snake.clone();
        let pointer = pointer.clone();
        let session_ref = session_ref.clone();

        use_effect_with((), move |_| {
            let window = web_sys::window().expect("no global `window` exists");
            let document = window.document().expect("should have a document on window");
            let canvas: HtmlCanvasElement = canvas_ref
                .cast::<HtmlCanvasElement>()
                .expect("canvas_ref not attached to a canvas element");

            let apply_canvas_size = {
                let canvas = canvas.clone();
                let window = window.clone();
                move || {
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
                    (width, height)
                }
            };
            let (w, h) = apply_canvas_size();

            *field.borrow_mut() = Some(ParticleField::new(
                w,
                h,
                Palette::default(),
                Rng::new(js_sys::Date::now() as u32),
            ));
            *snake.borrow_mut() = Some(SnakeEngine::new(w, h));

            // Animation frame loop: advance particles, tick the snake, then
            // rasterize field and snake in that order.
            let raf_id = Rc::new(RefCell::new(None));
            let closure_cell: Rc<RefCell<Option<Closure<dyn FnMut()>>>> =
                Rc::new(RefCell::new(None));
            {
                let raf_id_inner = raf_id.clone();
                let closure_cell_inner = closure_cell.clone();
                let window_loop = window.clone();
                let canvas = canvas.clone();
                let field = field.clone();
                let snake = snake.clone();
                let pointer = pointer.clone();
                let session_ref = session_ref.clone();
                let last_frame = RefCell::new(now_ms());
                let last_reported = RefCell::new(0u32);
                let was_resetting = RefCell::new(false);
                *closure_cell.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                    let now = now_ms();
                    // Clamp dt so a resumed background tab cannot jump.
                    let dt = ((now - *last_frame.borrow()) / 1000.0).clamp(0.0, 0.1);
                    *last_frame.borrow_mut() = now;

                    let session = session_ref.borrow().clone();
                    let mut field_slot = field.borrow_mut();
                    let mut snake_slot = snake.borrow_mut();
                    if let Some(field) = field_slot.as_mut() {
                        field.advance(dt, pointer.borrow().position());

                        if let Some(engine) = snake_slot.as_mut() {
                            if session.enabled {
                                engine.tick(now, &mut *field);
                            } else if engine.phase() != GamePhase::Inactive {
                                engine.abort();
                            }

                            let resetting = engine.is_resetting();
                            if resetting && !*was_resetting.borrow() {
                                clog(&format!("snake: game over at score {}", engine.score()));
                            }
                            *was_resetting.borrow_mut() = resetting;

                            let shown = match engine.phase() {
                                GamePhase::Inactive => 0,
                                _ => engine.score(),
                            };
                            if *last_reported.borrow() != shown {
                                *last_reported.borrow_mut() = shown;
                                session.dispatch(SessionAction::SetScore(shown));
                            }
                        }

                        if let Some(ctx) = canvas
                            .get_context("2d")
                            .ok()
                            .flatten()
                            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
                        {
                            let w = canvas.width() as f64;
                            let h = canvas.height() as f64;
                            ctx.set_fill_style_str("#0a0f1e");
                            ctx.fill_rect(0.0, 0.0, w, h);
                            field.render(&ctx);
                            if let Some(engine) = snake_slot.as_ref() {
                                engine.draw(&ctx, now);
                            }
                        }
                    }

                    if let Ok(id) = window_loop.request_animation_frame(
                        closure_cell_inner
                            .borrow()
                            .as_ref()
                            .unwrap()
                            .as_ref()
                            .unchecked_ref(),
                    ) {
                        *raf_id_inner.borrow_mut() = Some(id);
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

            // Keyboard bridge: arrow keys start or steer the snake. Other
            // keys pass through untouched, and everything is vetoed while a
            // text input holds focus.
            let key_cb = {
                let snake = snake.clone();
                let session_ref = session_ref.clone();
                Closure::wrap(Box::new(move |e: KeyboardEvent| {
                    let session = session_ref.borrow().clone();
                    if session.input_focused || !session.enabled {
                        return;
                    }
                    let Some(dir) = arrow_direction(e.key().as_str()) else {
                        return;
                    };
                    let mut slot = snake.borrow_mut();
                    let Some(engine) = slot.as_mut() else {
                        return;
                    };
                    match engine.phase() {
                        GamePhase::Inactive => {
                            engine.start(now_ms());
                            e.prevent_default();
                        }
                        GamePhase::Active => {
                            engine.change_direction(dir);
                            e.prevent_default();
                        }
                        GamePhase::GameOver { .. } => {}
                    }
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("keydown", key_cb.as_ref().unchecked_ref())
                .unwrap();

            // Pointer repulsion feed, throttled inside `Pointer`.
            let mousemove_cb = {
                let canvas = canvas.clone();
                let pointer = pointer.clone();
                Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
                    let rect = canvas.get_bounding_client_rect();
                    let x = e.client_x() as f64 - rect.left();
                    let y = e.client_y() as f64 - rect.top();
                    pointer.borrow_mut().update(x, y, now_ms());
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback(
                    "mousemove",
                    mousemove_cb.as_ref().unchecked_ref(),
                )
                .unwrap();

            // Resize regenerates the pool and playable bounds.
            let resize_cb = {
                let apply_canvas_size = apply_canvas_size.clone();
                let field = field.clone();
                let snake = snake.clone();
                Closure::wrap(Box::new(move |_e: web_sys::Event| {
                    let (w, h) = apply_canvas_size();
                    if let Some(field) = field.borrow_mut().as_mut() {
                        field.resize(w, h);
                    }
                    if let Some(engine) = snake.borrow_mut().as_mut() {
                        engine.set_bounds(w, h);
                    }
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())
                .unwrap();

            // Input-focus veto: typing in a field must never start the game.
            let focusin_cb = {
                let session_ref = session_ref.clone();
                Closure::wrap(Box::new(move |e: FocusEvent| {
                    if is_text_input(e.target()) {
                        session_ref
                            .borrow()
                            .dispatch(SessionAction::SetInputFocused(true));
                    }
                }) as Box<dyn FnMut(_)>)
            };
            let focusout_cb = {
                let session_ref = session_ref.clone();
                Closure::wrap(Box::new(move |e: FocusEvent| {
                    if is_text_input(e.target()) {
                        session_ref
                            .borrow()
                            .dispatch(SessionAction::SetInputFocused(false));
                    }
                }) as Box<dyn FnMut(_)>)
            };
            document
                .add_event_listener_with_callback("focusin", focusin_cb.as_ref().unchecked_ref())
                .unwrap();
            document
                .add_event_listener_with_callback("focusout", focusout_cb.as_ref().unchecked_ref())
                .unwrap();

            // Cleanup: drop every listener and the outstanding frame request.
            let window_clone = window.clone();
            let document_clone = document.clone();
            move || {
                let _ = window_clone
                    .remove_event_listener_with_callback("keydown", key_cb.as_ref().unchecked_ref());
                let _ = window_clone.remove_event_listener_with_callback(
                    "mousemove",
                    mousemove_cb.as_ref().unchecked_ref(),
                );
                let _ = window_clone
                    .remove_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref());
                let _ = document_clone.remove_event_listener_with_callback(
                    "focusin",
                    focusin_cb.as_ref().unchecked_ref(),
                );
                let _ = document_clone.remove_event_listener_with_callback(
                    "focusout",
                    focusout_cb.as_ref().unchecked_ref(),
                );
                if let Some(id) = *raf_id.borrow() {
                    let _ = window_clone.cancel_animation_frame(id);
                }
                closure_cell.borrow_mut().take();
                let _keep_alive = (&key_cb, &mousemove_cb, &resize_cb, &focusin_cb, &focusout_cb);
            }
        });
    }

    html! {
        <canvas
            ref={canvas_ref}
            id="ambient-canvas"
            style="position:absolute; inset:0; display:block; width:100%; height:100%;">
        </canvas>
    }
}
