//! Real-time viewer for a hinge-jointed arm.
//!
//! Controls:
//! - WASD: move, mouse: look (while the cursor is captured)
//! - 1/2, 3/4, 5/6: turn the turntable, shoulder and elbow
//! - Tab: toggle cursor capture, P: toggle pivot markers, Escape: quit

use std::num::NonZeroU32;
use std::panic::{ self, AssertUnwindSafe };
use std::time::Instant;

use glutin::config::{ Config, ConfigTemplateBuilder, GlConfig };
use glutin::context::{ ContextApi, ContextAttributesBuilder, PossiblyCurrentContext, Version };
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{ Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface };
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasWindowHandle;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ ActiveEventLoop, EventLoop };
use winit::keyboard::PhysicalKey;
use winit::window::{ CursorGrabMode, Window, WindowId };

use armature_viewer::engine::config::{ SceneConfig, DEFAULT_CONFIG_PATH };
use armature_viewer::engine::error::{ EngineError, EngineResult };
use armature_viewer::engine::systems::keyboard_input_system::{ InputAction, KeyboardInputSystem };
use armature_viewer::game::program::Program;

fn non_zero(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}

fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .max_by_key(|c| c.num_samples())
        .expect("no OpenGL config matches the requested template")
}

fn window_error(e: impl std::fmt::Display) -> EngineError {
    EngineError::Window(e.to_string())
}

struct App {
    config: SceneConfig,
    window: Option<Window>,
    gl_context: Option<PossiblyCurrentContext>,
    gl_surface: Option<Surface<WindowSurface>>,
    program: Option<Program>,
    input: KeyboardInputSystem,
    cursor_captured: bool,
    last_frame_time: Option<Instant>,
    error: Option<EngineError>,
}

impl App {
    fn new(config: SceneConfig) -> Self {
        Self {
            config,
            window: None,
            gl_context: None,
            gl_surface: None,
            program: None,
            input: KeyboardInputSystem::new(),
            cursor_captured: false,
            last_frame_time: None,
            error: None,
        }
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> EngineResult<()> {
        let window_config = &self.config.window;
        let attributes = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(LogicalSize::new(window_config.width, window_config.height));

        let template = ConfigTemplateBuilder::new().with_depth_size(24);
        // The picker has to return a config, so an empty list can only surface as an unwind.
        let built = panic::catch_unwind(
            AssertUnwindSafe(|| {
                DisplayBuilder::new()
                    .with_window_attributes(Some(attributes))
                    .build(event_loop, template, pick_config)
            })
        ).map_err(|_| EngineError::Window("no OpenGL config matches the requested template".to_string()))?;
        let (window, gl_config) = built.map_err(window_error)?;
        let window = window.ok_or_else(|| EngineError::Window("no window was created".to_string()))?;
        let raw_handle = window.window_handle().map_err(window_error)?.as_raw();

        let display = gl_config.display();
        let ctx_attrs = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(raw_handle));
        let not_current = unsafe { display.create_context(&gl_config, &ctx_attrs) }.map_err(window_error)?;

        let size = window.inner_size();
        let attrs = SurfaceAttributesBuilder::<WindowSurface>
            ::new()
            .build(raw_handle, non_zero(size.width), non_zero(size.height));
        let surface = unsafe { display.create_window_surface(&gl_config, &attrs) }.map_err(window_error)?;
        let ctx = not_current.make_current(&surface).map_err(window_error)?;

        // Blocking swap paces the frame loop.
        if let Err(e) = surface.set_swap_interval(&ctx, SwapInterval::Wait(NonZeroU32::MIN)) {
            log::warn!("Could not enable vsync: {e}");
        }

        let gl = unsafe { glow::Context::from_loader_function_cstr(|s| display.get_proc_address(s)) };
        let program = Program::new(gl, &self.config)?;

        self.last_frame_time = Some(Instant::now());
        window.request_redraw();

        self.window = Some(window);
        self.gl_context = Some(ctx);
        self.gl_surface = Some(surface);
        self.program = Some(program);
        self.set_cursor_capture(true);
        Ok(())
    }

    fn set_cursor_capture(&mut self, captured: bool) {
        let Some(window) = &self.window else {
            return;
        };
        self.cursor_captured = captured;

        if captured {
            let grab_result = window
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
            if let Err(e) = grab_result {
                log::warn!("Cursor grab not supported: {e}");
            }
            window.set_cursor_visible(false);
            self.reset_pointer_baseline();
        } else {
            if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
                log::warn!("Cursor release failed: {e}");
            }
            window.set_cursor_visible(true);
        }
        log::debug!("Cursor captured: {captured}");
    }

    /// The next pointer sample only re-establishes the baseline.
    fn reset_pointer_baseline(&mut self) {
        if let Some(program) = &mut self.program {
            program.scene.camera.reset_pointer_baseline();
        }
    }

    fn redraw(&mut self) {
        let (Some(window), Some(surface), Some(ctx), Some(program)) = (
            &self.window,
            &self.gl_surface,
            &self.gl_context,
            &mut self.program,
        ) else {
            return;
        };

        let now = Instant::now();
        let frame_time = self.last_frame_time.map_or(0.0, |last| (now - last).as_secs_f32());
        self.last_frame_time = Some(now);

        program.update(&self.input, frame_time);

        let size = window.inner_size();
        program.render(size.width, size.height);

        if let Err(e) = surface.swap_buffers(ctx) {
            log::error!("Buffer swap failed: {e}");
        }
        window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.initialize(event_loop) {
            log::error!("Startup failed: {e}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::RedrawRequested => self.redraw(),

            WindowEvent::Resized(size) => {
                if let (Some(surface), Some(ctx)) = (&self.gl_surface, &self.gl_context) {
                    surface.resize(ctx, non_zero(size.width), non_zero(size.height));
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::Focused(false) => {
                self.input.release_all();
                self.reset_pointer_baseline();
            }

            // The OS may drop the grab while unfocused.
            WindowEvent::Focused(true) => {
                if self.cursor_captured {
                    self.set_cursor_capture(true);
                }
            }

            WindowEvent::CursorEntered { .. } => self.reset_pointer_baseline(),

            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(key_code) = event.physical_key else {
                    return;
                };
                match self.input.receive_key(key_code, event.state, event.repeat) {
                    InputAction::Exit => event_loop.exit(),
                    InputAction::ToggleCapture => self.set_cursor_capture(!self.cursor_captured),
                    InputAction::TogglePivots => {
                        if let Some(program) = &mut self.program {
                            program.scene.show_pivots = !program.scene.show_pivots;
                        }
                    }
                    InputAction::None => {}
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if !self.cursor_captured {
                    return;
                }
                if let Some(program) = &mut self.program {
                    program.scene.camera.process_pointer(position.x, position.y);
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(program) = self.program.take() {
            program.cleanup();
        }
        self.gl_surface = None;
        self.gl_context = None;
        self.window = None;
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SceneConfig::load_or_default(DEFAULT_CONFIG_PATH)?;
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    if let Some(e) = app.error.take() {
        return Err(e.into());
    }
    Ok(())
}
