use crate::{
    app::App,
    config::AppConfig,
    input::InputState,
    ui::Ui,
    webgl::{GlShader, WebGlContext, FRAGMENT_SHADER, VERTEX_SHADER},
};
use std::{cell::RefCell, fmt::Display, rc::Rc};
use wasm_bindgen::{closure::Closure, prelude::*, JsCast};
use web_sys::{Element, Event, HtmlCanvasElement, PointerEvent, WebGl2RenderingContext, Window};

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn init_platform() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).map_err(to_js)
}

fn to_js(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn resize_to_display(canvas: &HtmlCanvasElement) {
    canvas.set_width(canvas.client_width().max(1) as u32);
    canvas.set_height(canvas.client_height().max(1) as u32);
}

fn request_animation_frame(window: &Window, callback: &FrameCallback) -> Result<(), JsValue> {
    if let Some(callback) = callback.borrow().as_ref() {
        window.request_animation_frame(callback.as_ref().unchecked_ref())?;
    }
    Ok(())
}

/// Keep delivering `pointerup` to the canvas when the release happens outside it
fn capture_pointer(event: &PointerEvent) {
    let Some(target) = event
        .current_target()
        .and_then(|target| target.dyn_into::<Element>().ok())
    else {
        return;
    };

    if let Err(e) = target.set_pointer_capture(event.pointer_id()) {
        log::warn!("shapegl::capture_pointer: {e:?}");
    }
}

fn register_pointer_listeners(
    canvas: &HtmlCanvasElement,
    input: &Rc<RefCell<InputState>>,
) -> Result<(), JsValue> {
    let listeners: [(&str, fn(&mut InputState, &PointerEvent)); 4] = [
        ("pointermove", |input, event| {
            input.pointer_moved(event.offset_x().into(), event.offset_y().into())
        }),
        ("pointerdown", |input, event| {
            capture_pointer(event);
            input.pointer_moved(event.offset_x().into(), event.offset_y().into());
            input.button_pressed(event.button().max(0) as u16);
        }),
        ("pointerup", |input, event| {
            input.button_released(event.button().max(0) as u16)
        }),
        ("pointercancel", |input, _| input.cancel()),
    ];

    for (name, handler) in listeners {
        let input = input.clone();
        let listener = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            handler(&mut input.borrow_mut(), &event)
        });
        canvas.add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())?;
        listener.forget();
    }

    Ok(())
}

/// Start the app on `canvas`: build the controls, hook up input and run
/// one `App::update` per animation frame until the page goes away
#[wasm_bindgen(js_name = "appMain")]
pub fn app_main(canvas: HtmlCanvasElement) -> Result<(), JsValue> {
    init_platform()?;

    let window = web_sys::window().ok_or_else(|| to_js("no global `window` exists"))?;
    let document = window
        .document()
        .ok_or_else(|| to_js("should have a document on window"))?;

    let on_context_menu =
        Closure::<dyn FnMut(Event)>::new(|event: Event| event.prevent_default());
    canvas.add_event_listener_with_callback("contextmenu", on_context_menu.as_ref().unchecked_ref())?;
    on_context_menu.forget();

    resize_to_display(&canvas);
    let initial_size = (canvas.width(), canvas.height());

    let on_resize = {
        let canvas = canvas.clone();
        Closure::<dyn FnMut()>::new(move || resize_to_display(&canvas))
    };
    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    on_resize.forget();

    log::debug!("shapegl::app_main: Creating WebGL2 context");
    let gl: WebGl2RenderingContext = canvas
        .get_context("webgl2")?
        .ok_or_else(|| to_js("WebGL2 is not supported by this browser"))?
        .dyn_into()?;
    let mut ctx = WebGlContext::new(gl);

    log::debug!("shapegl::app_main: Loading shaders");
    let shader = GlShader::new(&ctx, VERTEX_SHADER, FRAGMENT_SHADER).map_err(to_js)?;

    let config = AppConfig::embedded().map_err(to_js)?;
    let mut app = App::new(&config, shader, initial_size).map_err(to_js)?;

    let ui = Ui::new(&document, &canvas)?;
    let input = Rc::new(RefCell::new(InputState::new()));
    register_pointer_listeners(&canvas, &input)?;

    let frame: FrameCallback = Rc::new(RefCell::new(None));
    let next_frame = frame.clone();
    let frame_window = window.clone();
    *frame.borrow_mut() = Some(Closure::new(move || {
        let canvas_size = (canvas.width(), canvas.height());
        let ui_state = ui.state();

        if let Err(e) = app.update(&mut ctx, &mut input.borrow_mut(), &ui_state, canvas_size) {
            log::error!("shapegl::app_main: {e}");
        }

        if let Err(e) = request_animation_frame(&frame_window, &next_frame) {
            log::error!("shapegl::app_main: failed to schedule next frame: {e:?}");
        }
    }));

    log::info!("shapegl::app_main: Starting frame loop");
    request_animation_frame(&window, &frame)
}
