//! Neon Runner entry point
//!
//! On the web this wires the engine to the page: canvas, HUD, buttons,
//! sliders and the requestAnimationFrame pump. Natively it plays one
//! headless run with a simple autopilot and prints the results payload.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlInputElement, KeyboardEvent, TouchEvent};

    use neon_runner::consts::{ENGINE_NAME, FIELD_HEIGHT, FIELD_WIDTH};
    use neon_runner::persistence::LocalStore;
    use neon_runner::platform::{InputEvent, JsClock, Key};
    use neon_runner::renderer::CanvasSurface;
    use neon_runner::renderer::canvas::SPRITE_URL;
    use neon_runner::report::JsCallbackSink;
    use neon_runner::sim::GamePhase;
    use neon_runner::{Config, Engine, Scheduling, Tunable};

    const OVERLAY_ACTIVE: &str = "neon_runner_overlay--active";

    /// DOM ids are namespaced by the engine name
    fn element_id(name: &str) -> String {
        format!("{}_{}", ENGINE_NAME, name)
    }

    /// DOM readouts and overlays
    struct Hud {
        document: Document,
    }

    impl Hud {
        fn set_text(&self, name: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(&element_id(name)) {
                el.set_text_content(Some(text));
            }
        }

        fn set_overlay(&self, name: &str, active: bool) {
            let Some(el) = self.document.get_element_by_id(&element_id(name)) else {
                return;
            };
            let classes = el.class_list();
            let result = if active {
                classes.add_1(OVERLAY_ACTIVE)
            } else {
                classes.remove_1(OVERLAY_ACTIVE)
            };
            if let Err(e) = result {
                log::debug!("Overlay {} not updated: {:?}", name, e);
            }
        }

        fn show_slider_value(&self, tunable: Tunable, value: f64) {
            let label = format!("{}Value", tunable.slider_id());
            self.set_text(&label, &tunable.format_value(value));
        }
    }

    /// Game instance holding the engine and its page bindings
    struct Game {
        engine: Engine<LocalStore, JsClock>,
        surface: CanvasSurface,
        hud: Hud,
        pending_frame: Option<i32>,
        // Last values written to the DOM
        last_phase: GamePhase,
        last_score: u64,
        last_high_score: u64,
    }

    impl Game {
        /// Push changed readouts and overlay visibility to the DOM
        fn sync_hud(&mut self) {
            let phase = self.engine.phase();
            let score = self.engine.score();
            let high_score = self.engine.high_score();

            if score != self.last_score {
                self.hud.set_text("score", &score.to_string());
                self.last_score = score;
            }

            if phase != self.last_phase {
                self.hud.set_overlay("startOverlay", phase == GamePhase::Ready);
                self.hud.set_overlay("pauseOverlay", phase == GamePhase::Paused);
                self.hud.set_overlay("gameOverOverlay", phase == GamePhase::GameOver);
                if phase == GamePhase::GameOver {
                    let final_score = self
                        .engine
                        .last_results()
                        .map_or(score, |results| results.score);
                    self.hud.set_text("finalScore", &final_score.to_string());
                }
                self.last_phase = phase;
            }

            if high_score != self.last_high_score {
                self.hud.set_text("highScore", &high_score.to_string());
                self.last_high_score = high_score;
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Neon Runner starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id(&element_id("canvas"))
            .ok_or("no canvas")?
            .dyn_into()?;

        let mut surface = CanvasSurface::new(&canvas)?;
        surface.load_sprite(SPRITE_URL);
        resize_canvas(&canvas);

        let seed = js_sys::Date::now() as u64;
        let engine = Engine::new(Config::default(), seed, LocalStore::new(), JsClock)
            .with_sink(JsCallbackSink::default());

        let hud = Hud {
            document: document.clone(),
        };
        hud.set_text("score", "0");
        hud.set_text("highScore", &engine.high_score().to_string());
        hud.set_overlay("startOverlay", true);
        for tunable in Tunable::ALL {
            let value = engine.config().tunable(tunable);
            hud.show_slider_value(tunable, value);
            if let Some(slider) = slider_input(&document, tunable) {
                let (min, max) = tunable.range();
                slider.set_min(&min.to_string());
                slider.set_max(&max.to_string());
                slider.set_step(&tunable.step().to_string());
                slider.set_value(&format!("{:.*}", tunable.decimals(), value));
            }
        }

        // Boot frame behind the start overlay
        engine.draw(&mut surface);

        let game = Rc::new(RefCell::new(Game {
            last_high_score: engine.high_score(),
            engine,
            surface,
            hud,
            pending_frame: None,
            last_phase: GamePhase::Ready,
            last_score: 0,
        }));

        log::info!("Game initialized with seed: {}", seed);

        setup_keyboard(&document, game.clone())?;
        setup_touch(&document, &canvas, game.clone())?;
        setup_buttons(&document, game.clone())?;
        setup_sliders(&document, game.clone())?;
        setup_auto_pause(&window, &document, game)?;
        setup_resize(&window, canvas)?;

        log::info!("Neon Runner running!");
        Ok(())
    }

    fn slider_input(document: &Document, tunable: Tunable) -> Option<HtmlInputElement> {
        document
            .get_element_by_id(&element_id(&format!("{}Slider", tunable.slider_id())))?
            .dyn_into()
            .ok()
    }

    /// Fit the canvas to its container, keeping the field's aspect ratio
    fn resize_canvas(canvas: &HtmlCanvasElement) {
        let Some(parent) = canvas.parent_element() else {
            return;
        };
        let width = (parent.client_width() as f32).min(FIELD_WIDTH);
        let height = width * FIELD_HEIGHT / FIELD_WIDTH;
        let style = canvas.style();
        if let Err(e) = style
            .set_property("width", &format!("{}px", width))
            .and_then(|_| style.set_property("height", &format!("{}px", height)))
        {
            log::warn!("Canvas resize failed: {:?}", e);
        }
    }

    /// Feed one input event to the engine and follow its scheduling hint
    fn dispatch(game: &Rc<RefCell<Game>>, event: InputEvent) {
        let scheduling = {
            let mut g = game.borrow_mut();
            let scheduling = g.engine.handle_input(event);
            g.sync_hud();
            scheduling
        };
        apply_scheduling(game, scheduling);
    }

    fn apply_scheduling(game: &Rc<RefCell<Game>>, scheduling: Scheduling) {
        match scheduling {
            Scheduling::Request => {
                cancel_animation_frame(game);
                request_animation_frame(game.clone());
            }
            Scheduling::Cancel => cancel_animation_frame(game),
            Scheduling::Idle => {}
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let handle = game.clone();
        let closure = Closure::once(move |_time: f64| {
            game_loop(handle);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => game.borrow_mut().pending_frame = Some(id),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    /// Idempotent: cancelling with nothing pending does nothing
    fn cancel_animation_frame(game: &Rc<RefCell<Game>>) {
        let Some(id) = game.borrow_mut().pending_frame.take() else {
            return;
        };
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.cancel_animation_frame(id) {
                log::debug!("cancelAnimationFrame failed: {:?}", e);
            }
        }
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        let scheduling = {
            let mut guard = game.borrow_mut();
            let g = &mut *guard;
            g.pending_frame = None;
            let scheduling = g.engine.frame(&mut g.surface);
            g.sync_hud();
            scheduling
        };
        apply_scheduling(&game, scheduling);
    }

    fn setup_keyboard(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = Key::from_code(&event.code());
                if key == Key::Other {
                    return;
                }
                let phase = game.borrow().engine.phase();
                if key.suppresses_default(phase) {
                    event.prevent_default();
                }
                dispatch(&game, InputEvent::KeyDown(key));
            });
            document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let key = Key::from_code(&event.code());
            if key != Key::Other {
                dispatch(&game, InputEvent::KeyUp(key));
            }
        });
        document.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_touch(
        document: &Document,
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                dispatch(&game, InputEvent::CanvasTap);
            });
            canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        if let Some(button) = document.get_element_by_id(&element_id("touchJump")) {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                dispatch(&game, InputEvent::JumpButton);
            });
            button.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let buttons = [
            ("startBtn", InputEvent::StartButton),
            ("pauseBtn", InputEvent::PauseButton),
            ("restartBtn", InputEvent::RestartButton),
        ];
        for (name, event) in buttons {
            let Some(button) = document.get_element_by_id(&element_id(name)) else {
                log::warn!("Button {} not found", name);
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                dispatch(&game, event);
            });
            button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_sliders(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        for tunable in Tunable::ALL {
            let Some(slider) = slider_input(document, tunable) else {
                log::warn!("Slider {} not found", tunable.slider_id());
                continue;
            };
            let game = game.clone();
            let input = slider.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Ok(value) = input.value().parse::<f64>() else {
                    log::warn!("Unreadable {} slider value", tunable.slider_id());
                    return;
                };
                dispatch(&game, InputEvent::Slider(tunable, value));
                let g = game.borrow();
                g.hud.show_slider_value(tunable, g.engine.config().tunable(tunable));
            });
            slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_auto_pause(
        window: &web_sys::Window,
        document: &Document,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden
                    && game.borrow().engine.phase() == GamePhase::Playing
                {
                    log::info!("Auto-paused (tab hidden)");
                    dispatch(&game, InputEvent::FocusLost);
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Window blur (click outside)
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            if game.borrow().engine.phase() == GamePhase::Playing {
                log::info!("Auto-paused (window blur)");
                dispatch(&game, InputEvent::FocusLost);
            }
        });
        window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_resize(window: &web_sys::Window, canvas: HtmlCanvasElement) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            resize_canvas(&canvas);
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Neon Runner failed to start: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use neon_runner::consts::OBSTACLE_HITBOX_INSET;
    use neon_runner::persistence::MemoryStore;
    use neon_runner::platform::{Clock, ManualClock, SystemClock};
    use neon_runner::report::{ReportError, RunResults};
    use neon_runner::sim::{Command, GamePhase, ObstacleKind};
    use neon_runner::{Config, Engine};

    /// 60 Hz display
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after five minutes of simulated play
    const MAX_FRAMES: u32 = 60 * 60 * 5;
    /// React when a hazard is this many frames away
    const JUMP_LEAD_FRAMES: f32 = 8.0;
    const DUCK_LEAD_FRAMES: f32 = 6.0;

    type HeadlessEngine = Engine<MemoryStore, ManualClock>;

    /// Jump ground hazards, duck flyers
    fn autopilot(engine: &mut HeadlessEngine) {
        let state = engine.state();
        let runner = state.runner.hitbox();
        let speed = state.current_speed;
        let ducking = state.runner.is_ducking;

        let next = state
            .obstacles
            .iter()
            .filter(|o| o.hitbox().right() > runner.x)
            .min_by(|a, b| a.x.total_cmp(&b.x));

        let mut commands = Vec::new();
        match next {
            Some(obstacle) => {
                let gap = obstacle.x + OBSTACLE_HITBOX_INSET - runner.right();
                match obstacle.kind {
                    ObstacleKind::Flyer { .. } if gap <= speed * DUCK_LEAD_FRAMES => {
                        if !ducking {
                            commands.push(Command::DuckStart);
                        }
                    }
                    ObstacleKind::Flyer { .. } => {}
                    _ if gap <= speed * JUMP_LEAD_FRAMES => {
                        if ducking {
                            commands.push(Command::DuckEnd);
                        }
                        commands.push(Command::Jump);
                    }
                    _ => {}
                }
            }
            None if ducking => commands.push(Command::DuckEnd),
            None => {}
        }

        for command in commands {
            engine.command(command);
        }
    }

    pub fn run() {
        let start = SystemClock.now_ms();
        let clock = ManualClock::new(start);
        let seed = start as u64;

        let mut engine = Engine::new(Config::default(), seed, MemoryStore::new(), clock.clone())
            .with_sink(|results: &RunResults| -> Result<(), ReportError> {
                log::info!("Run over after {} s with score {}", results.duration, results.score);
                Ok(())
            });

        engine.command(Command::Start);
        let mut frames = 0;
        while engine.phase() == GamePhase::Playing && frames < MAX_FRAMES {
            autopilot(&mut engine);
            clock.advance(FRAME_MS);
            engine.step();
            frames += 1;
        }

        match engine.last_results() {
            Some(results) => match results.to_json() {
                Ok(json) => println!("{}", json),
                Err(e) => log::error!("{}", e),
            },
            None => log::warn!(
                "Autopilot survived {} frames (score {}), no results",
                frames,
                engine.score()
            ),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Neon Runner (native) starting headless run...");
    log::info!("The playable version is the web build, run it with `trunk serve`");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
