use std::ffi::CString;
use std::num::NonZeroU32;

use glutin::config::{Config as GlConfig, ConfigTemplate, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContextSurfaceAccessor,
    PossiblyCurrentContext, Version,
};
use glutin::display::{Display, DisplayApiPreference, GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};

use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};

use thiserror::Error;

use winit::dpi::{PhysicalSize, Size};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::{Window, WindowBuilder};

use gl_wrapper::framebuffer::{FrameBuffer, FrameBufferError};
use gl_wrapper::renderer::GlRenderer;
use gl_wrapper::texture::{Texture2D, TextureError};
use gl_wrapper::viewport::Viewport;
use gl_wrapper::GlInfo;

use crate::config::Config;
use crate::quad::{QuadError, TexturedQuad};
use crate::render_loop::{LoopState, RenderLoop};
use crate::screenshot::{self, ScreenshotError};

pub struct App {
    event_loop: EventLoop<()>,
    gl_context: PossiblyCurrentContext,
    gl_window: GlWindow,
    config: Config,
}

impl App {
    /// Opens the window and makes a 3.3 core context current on it.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let event_loop = EventLoop::new();
        let window_builder = WindowBuilder::new()
            .with_inner_size(Size::Physical(PhysicalSize::new(
                config.window.width,
                config.window.height,
            )))
            .with_title(&config.window.title);

        let (window, gl_config) = create_window(&event_loop, window_builder)?;
        let gl_display = gl_config.display();

        let context_attr = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(window.raw_window_handle()));

        let gl_window = GlWindow::new(window, &gl_config)?;

        let gl_context = unsafe { gl_display.create_context(&gl_config, &context_attr)? }
            .make_current(&gl_window.surface)?;

        gl::load_with(|symbol| match CString::new(symbol) {
            Ok(symbol) => gl_display.get_proc_address(symbol.as_c_str()).cast(),
            Err(_) => std::ptr::null(),
        });

        let interval = if config.window.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = gl_window.surface.set_swap_interval(&gl_context, interval) {
            log::warn!("could not set swap interval: {e}");
        }

        let info = GlInfo::query();
        log::info!("OpenGL {} on {} ({})", info.version, info.renderer, info.vendor);
        log::debug!(
            "texture units: {} per stage, {} combined, max size {}",
            info.max_texture_units,
            info.max_combined_texture_units,
            info.max_texture_size
        );

        Ok(Self {
            event_loop,
            gl_context,
            gl_window,
            config,
        })
    }

    pub fn run(self) -> Result<(), AppError> {
        let App {
            mut event_loop,
            gl_context,
            gl_window,
            config,
        } = self;

        let quad = TexturedQuad::load(&config)?;

        let size = gl_window.window.inner_size();
        let mut framebuffer_size = (size.width, size.height);
        let mut renderer = GlRenderer::new(size.width, size.height);
        log::debug!("initial viewport {:?}", renderer.viewport());

        let mut render_loop = RenderLoop::new();
        let mut screenshot = config.screenshot.clone();
        let mut failure: Option<AppError> = None;

        let [r, g, b, a] = config.clear_color;

        event_loop.run_return(|event, _window_target, control_flow| {
            *control_flow = ControlFlow::Poll;

            match event {
                Event::MainEventsCleared => {
                    let mut captured = false;

                    let step = render_loop.step(|| {
                        if let Some(path) = screenshot.take() {
                            let (width, height) = framebuffer_size;
                            let color = config.clear_color;
                            capture(&mut renderer, &quad, width, height, color, &path)?;
                            captured = true;
                        }

                        renderer.clear_color(r, g, b, a);
                        quad.draw(&mut renderer);

                        gl_window.surface.swap_buffers(&gl_context)?;
                        Ok::<(), AppError>(())
                    });

                    match step {
                        Ok(LoopState::Running) => {
                            if captured {
                                render_loop.request_close();
                            }
                        }
                        Ok(LoopState::Closing) => control_flow.set_exit(),
                        Err(e) => {
                            failure = Some(e);
                            control_flow.set_exit();
                        }
                    }
                }
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::Resized(size) => {
                        if let (Some(width), Some(height)) =
                            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                        {
                            gl_window.surface.resize(&gl_context, width, height);
                            framebuffer_size = (size.width, size.height);
                            let vp = renderer.resize(size.width, size.height);
                            log::debug!("resized to {:?}, viewport {:?}", size, vp);
                        }
                    }
                    WindowEvent::KeyboardInput { input, .. } => {
                        render_loop.handle_key(input.virtual_keycode, input.state);
                    }
                    WindowEvent::CloseRequested => render_loop.request_close(),
                    _ => (),
                },
                _ => (),
            }
        });

        log::info!(
            "{:?} after {} frames",
            render_loop.state(),
            render_loop.frames()
        );

        // GL objects go first, while the context is still current
        drop(quad);
        drop(renderer);
        drop(gl_context);
        drop(gl_window);

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Draws one frame into an offscreen target and saves it.
fn capture(
    renderer: &mut GlRenderer,
    quad: &TexturedQuad,
    width: u32,
    height: u32,
    clear_color: [f32; 4],
    path: &std::path::Path,
) -> Result<(), AppError> {
    let target = Texture2D::render_target(width, height)?;
    let fb = FrameBuffer::from_texture(&target)?;
    let [r, g, b, a] = clear_color;

    fb.bind();
    renderer.clear_color(r, g, b, a);
    quad.draw(renderer);
    let pixels = renderer.read_pixels(Viewport::new(0, 0, width as i32, height as i32));
    FrameBuffer::bind_default();

    screenshot::write_png(path, width, height, &pixels)?;

    Ok(())
}

/// Picks the first config the display offers and builds a window for it.
#[cfg(not(windows))]
fn create_window(
    event_loop: &EventLoop<()>,
    window_builder: WindowBuilder,
) -> Result<(Window, GlConfig), AppError> {
    let display = unsafe { Display::new(event_loop.raw_display_handle(), display_preference())? };
    let gl_config = first_config(&display, ConfigTemplateBuilder::new().build())?;

    // applies the config's X11 visual to the window
    let window = glutin_winit::finalize_window(event_loop, window_builder, &gl_config)
        .map_err(|e| AppError::Display(e.to_string()))?;

    Ok((window, gl_config))
}

/// WGL needs the window before it can offer modern configs.
#[cfg(windows)]
fn create_window(
    event_loop: &EventLoop<()>,
    window_builder: WindowBuilder,
) -> Result<(Window, GlConfig), AppError> {
    let window = window_builder
        .build(event_loop)
        .map_err(|e| AppError::Display(e.to_string()))?;
    let handle = window.raw_window_handle();

    let preference = DisplayApiPreference::WglThenEgl(Some(handle));
    let display = unsafe { Display::new(event_loop.raw_display_handle(), preference)? };
    let template = ConfigTemplateBuilder::new()
        .compatible_with_native_window(handle)
        .build();
    let gl_config = first_config(&display, template)?;

    Ok((window, gl_config))
}

#[cfg(target_os = "macos")]
fn display_preference() -> DisplayApiPreference {
    DisplayApiPreference::Cgl
}

#[cfg(all(unix, not(target_os = "macos")))]
fn display_preference() -> DisplayApiPreference {
    use winit::platform::unix::register_xlib_error_hook;

    DisplayApiPreference::GlxThenEgl(Box::new(register_xlib_error_hook))
}

fn first_config(display: &Display, template: ConfigTemplate) -> Result<GlConfig, AppError> {
    let mut configs = unsafe { display.find_configs(template)? };
    configs.next().ok_or(AppError::NoConfig)
}

pub struct GlWindow {
    // XXX the surface must be dropped before the window.
    pub surface: Surface<WindowSurface>,
    pub window: Window,
}

impl GlWindow {
    pub fn new(window: Window, config: &GlConfig) -> Result<Self, AppError> {
        let (width, height): (u32, u32) = window.inner_size().into();
        let (width, height) = match (NonZeroU32::new(width), NonZeroU32::new(height)) {
            (Some(w), Some(h)) => (w, h),
            _ => return Err(AppError::ZeroSize),
        };

        let raw_window_handle = window.raw_window_handle();
        let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            raw_window_handle,
            width,
            height,
        );

        let surface = unsafe { config.display().create_window_surface(config, &attrs)? };

        Ok(Self { window, surface })
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("could not create window: {0}")]
    Display(String),
    #[error("display offers no matching GL config")]
    NoConfig,
    #[error("window has a zero-sized surface")]
    ZeroSize,
    #[error("GL context error: {0}")]
    Context(#[from] glutin::error::Error),
    #[error(transparent)]
    Quad(#[from] QuadError),
    #[error("screenshot target: {0}")]
    Target(#[from] TextureError),
    #[error("screenshot target: {0}")]
    FrameBuffer(#[from] FrameBufferError),
    #[error(transparent)]
    Screenshot(#[from] ScreenshotError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_gl_config_is_an_error_value() {
        let err: Result<GlConfig, AppError> = None.ok_or(AppError::NoConfig);

        match err {
            Err(e @ AppError::NoConfig) => {
                assert_eq!(e.to_string(), "display offers no matching GL config")
            }
            _ => panic!("expected NoConfig"),
        }
    }
}
