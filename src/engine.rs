use crate::browser;
use anyhow::{anyhow, Error, Result};
// wasm is single threaded, so Rc RefCell over Mutex
use async_trait::async_trait;
use futures::channel::mpsc::{unbounded, UnboundedReceiver};
use futures::channel::oneshot::channel;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use wasm_bindgen::{
    // unchecked_ref (unsafe) cast from Javascript type to Rust type
    // - we create the closures ourselves and know their signatures
    JsCast,
    JsValue,
};
use web_sys::{CanvasRenderingContext2d, HtmlAudioElement, HtmlImageElement, KeyboardEvent};

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    /// `delta_ms` is wall clock time since the previous frame
    fn update(&mut self, delta_ms: f64, keystate: &KeyState);
    fn draw(&self, renderer: &Renderer);
}

// ==================== Geometry ====================
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Axis aligned box, origin at the top left like the canvas
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub const fn new_from_x_y(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect::new(Point { x, y }, Size { width, height })
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    pub fn right(&self) -> f64 {
        self.position.x + self.size.width
    }

    pub fn bottom(&self) -> f64 {
        self.position.y + self.size.height
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.position.x + self.size.width * 0.5,
            y: self.position.y + self.size.height * 0.5,
        }
    }

    pub fn set_x(&mut self, x: f64) {
        self.position.x = x;
    }

    pub fn set_y(&mut self, y: f64) {
        self.position.y = y;
    }

    /// Strict overlap: boxes that only share an edge do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x() < other.right()
            && self.right() > other.x()
            && self.y() < other.bottom()
            && self.bottom() > other.y()
    }
}

// ==================== Game Loop ====================
/// Shared between the animation frame closure and whoever started the loop.
/// Stopping only prevents the next frame from being scheduled.
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    stopped: Rc<Cell<bool>>,
}

impl LoopHandle {
    pub fn stop(&self) {
        self.stopped.set(true);
    }

    pub fn is_running(&self) -> bool {
        !self.stopped.get()
    }
}

pub struct GameLoop {
    last_frame: f64,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<LoopHandle> {
        let mut keyevent_receiver = prepare_input()?;
        let mut game = game.initialize().await?;
        let mut game_loop = GameLoop {
            last_frame: browser::now()?,
        };
        let renderer = Renderer {
            context: browser::context()?,
        };
        let mut keystate = KeyState::new();
        let handle = LoopHandle::default();
        let loop_handle = handle.clone();

        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            if !loop_handle.is_running() {
                return;
            }
            process_input(&mut keystate, &mut keyevent_receiver);

            let delta_ms = (perf - game_loop.last_frame).max(0.0);
            game_loop.last_frame = perf;
            game.update(delta_ms, &keystate);
            game.draw(&renderer);
            keystate.end_frame();

            if let Some(closure) = f.borrow().as_ref() {
                if let Err(err) = browser::request_animation_frame(closure) {
                    log::error!("GameLoop: {:#}", err);
                }
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(handle)
    }
}

// ==================== Rendering ====================
pub struct Renderer {
    context: CanvasRenderingContext2d,
}

pub struct TextStyle<'a> {
    pub font: &'a str,
    pub color: &'a str,
    pub align: &'a str,
}

impl Renderer {
    pub fn clear(&self, rect: &Rect) {
        self.context
            .clear_rect(rect.x(), rect.y(), rect.width(), rect.height());
    }

    pub fn draw_image(&self, image: &HtmlImageElement, frame: &Rect, destination: &Rect) {
        if let Err(err) = self
            .context
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                frame.x(),
                frame.y(),
                frame.width(),
                frame.height(),
                destination.x(),
                destination.y(),
                destination.width(),
                destination.height(),
            )
        {
            log::error!("draw_image failed : {:#?}", err);
        }
    }

    pub fn draw_entire_image(&self, image: &HtmlImageElement, position: &Point) {
        if let Err(err) = self
            .context
            .draw_image_with_html_image_element(image, position.x, position.y)
        {
            log::error!("draw_entire_image failed : {:#?}", err);
        }
    }

    /// Draws `frame` centred on `center`, rotated by `angle` radians
    pub fn draw_rotated_image(
        &self,
        image: &HtmlImageElement,
        frame: &Rect,
        center: &Point,
        size: f64,
        angle: f64,
    ) {
        self.context.save();
        let moved = self
            .context
            .translate(center.x, center.y)
            .and_then(|_| self.context.rotate(angle));
        match moved {
            Ok(()) => self.draw_image(
                image,
                frame,
                &Rect::new_from_x_y(-size * 0.5, -size * 0.5, size, size),
            ),
            Err(err) => log::error!("draw_rotated_image failed : {:#?}", err),
        }
        self.context.restore();
    }

    pub fn fill_rect(&self, rect: &Rect, color: &str) {
        self.context.set_fill_style_str(color);
        self.context
            .fill_rect(rect.x(), rect.y(), rect.width(), rect.height());
    }

    pub fn stroke_rect(&self, rect: &Rect) {
        self.context
            .stroke_rect(rect.x(), rect.y(), rect.width(), rect.height());
    }

    pub fn draw_text(&self, text: &str, position: &Point, style: &TextStyle) {
        self.context.save();
        self.context.set_font(style.font);
        self.context.set_fill_style_str(style.color);
        self.context.set_text_align(style.align);
        self.context.set_shadow_offset_x(2.0);
        self.context.set_shadow_offset_y(2.0);
        self.context.set_shadow_color("black");
        if let Err(err) = self.context.fill_text(text, position.x, position.y) {
            log::error!("fill_text failed : {:#?}", err);
        }
        self.context.restore();
    }
}

pub trait DebugDraw {
    fn draw_debug(&self, renderer: &Renderer);
}

impl DebugDraw for Rect {
    fn draw_debug(&self, renderer: &Renderer) {
        renderer.stroke_rect(self);
    }
}

/// Whole picture, drawn wherever the caller asks
pub struct Image {
    element: HtmlImageElement,
}

impl Image {
    pub fn new(element: HtmlImageElement) -> Self {
        Image { element }
    }

    pub fn draw_at(&self, renderer: &Renderer, position: &Point) {
        renderer.draw_entire_image(&self.element, position);
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::new_image()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let error_callback = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "[engine.rs::load_image] Error loading image: {:#?}",
                err
            )));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callback alive until image is loaded or errors
    success_callback.forget();
    error_callback.forget();

    // ?? - Result<Result<(), Error>, oneshot::Canceled>
    // - first ? yields the channel result
    // - second ? yields the image load result
    rx.await??;

    Ok(image)
}

// ==================== Audio ====================
pub struct Sound {
    element: HtmlAudioElement,
}

impl Sound {
    /// Restarts the clip from the beginning, cutting off a clip still playing
    pub fn play(&self) {
        self.element.set_current_time(0.0);
        if let Err(err) = self.element.play() {
            log::warn!("could not play sound : {:#?}", err);
        }
    }
}

pub fn load_sound(source: &str) -> Result<Sound> {
    let element = browser::new_audio(source)?;
    element.set_preload("auto");
    Ok(Sound { element })
}

// ==================== Input ====================
enum KeyPress {
    KeyUp(KeyboardEvent),
    KeyDown(KeyboardEvent),
}

/// Keys currently held plus the keys that went down during this frame.
/// Keys are identified by `KeyboardEvent.code`, e.g. "ArrowUp" or "Space".
#[derive(Debug, Default)]
pub struct KeyState {
    pressed: HashSet<String>,
    just_pressed: HashSet<String>,
}

impl KeyState {
    pub fn new() -> Self {
        KeyState::default()
    }

    pub fn is_pressed(&self, code: &str) -> bool {
        self.pressed.contains(code)
    }

    /// True only on the frame the key went down, auto repeat excluded
    pub fn was_just_pressed(&self, code: &str) -> bool {
        self.just_pressed.contains(code)
    }

    pub fn press(&mut self, code: &str) {
        if self.pressed.insert(code.to_string()) {
            self.just_pressed.insert(code.to_string());
        }
    }

    pub fn release(&mut self, code: &str) {
        self.pressed.remove(code);
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
    }
}

fn prepare_input() -> Result<UnboundedReceiver<KeyPress>> {
    let (keydown_sender, keyevent_receiver) = unbounded();
    let keydown_sender = Rc::new(RefCell::new(keydown_sender));
    let keyup_sender = keydown_sender.clone();

    let onkeydown = browser::closure_wrap(Box::new(move |keycode: KeyboardEvent| {
        let _ = keydown_sender
            .borrow_mut()
            .start_send(KeyPress::KeyDown(keycode));
    }) as Box<dyn FnMut(KeyboardEvent)>);
    let onkeyup = browser::closure_wrap(Box::new(move |keycode: KeyboardEvent| {
        let _ = keyup_sender.borrow_mut().start_send(KeyPress::KeyUp(keycode));
    }) as Box<dyn FnMut(KeyboardEvent)>);

    let window = browser::window()?;
    window
        .add_event_listener_with_callback("keydown", onkeydown.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("could not listen for keydown : {:#?}", err))?;
    window
        .add_event_listener_with_callback("keyup", onkeyup.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("could not listen for keyup : {:#?}", err))?;

    // listeners live for the whole page
    onkeydown.forget();
    onkeyup.forget();

    Ok(keyevent_receiver)
}

fn process_input(state: &mut KeyState, keyevent_receiver: &mut UnboundedReceiver<KeyPress>) {
    loop {
        match keyevent_receiver.try_next() {
            Ok(None) | Err(_) => break,
            Ok(Some(KeyPress::KeyDown(event))) => state.press(&event.code()),
            Ok(Some(KeyPress::KeyUp(event))) => state.release(&event.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_boxes_intersect_both_ways() {
        let a = Rect::new_from_x_y(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new_from_x_y(5.0, 5.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new_from_x_y(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new_from_x_y(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new_from_x_y(0.0, 10.0, 10.0, 10.0);
        assert!(!a.intersects(&right));
        assert!(!a.intersects(&below));
        assert!(!right.intersects(&a));
    }

    #[test]
    fn contained_box_intersects() {
        let outer = Rect::new_from_x_y(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new_from_x_y(40.0, 40.0, 5.0, 5.0);
        assert!(outer.intersects(&inner));
        assert!(inner.intersects(&outer));
    }

    #[test]
    fn center_is_midpoint() {
        let rect = Rect::new_from_x_y(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.center(), Point { x: 60.0, y: 45.0 });
    }

    #[test]
    fn key_press_is_edge_triggered() {
        let mut keys = KeyState::new();
        keys.press("Space");
        assert!(keys.was_just_pressed("Space"));
        keys.end_frame();

        // auto repeat delivers another keydown while still held
        keys.press("Space");
        assert!(keys.is_pressed("Space"));
        assert!(!keys.was_just_pressed("Space"));

        keys.release("Space");
        keys.press("Space");
        assert!(keys.was_just_pressed("Space"));
    }

    #[test]
    fn loop_handle_stop_is_idempotent() {
        let handle = LoopHandle::default();
        let shared = handle.clone();
        assert!(shared.is_running());
        handle.stop();
        handle.stop();
        assert!(!shared.is_running());
    }
}
