#![deny(clippy::all)]
#![forbid(unsafe_code)]

use error_iter::ErrorIter as _;
use frame_driver::{FrameDriver, Simulation, ViewMode};
use pixels::wgpu::Color;
use pixels::{Error, Pixels, PixelsBuilder, SurfaceTexture};
use std::sync::Arc;
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowBuilder};
use winit_input_helper::WinitInputHelper;

const BACKGROUND_COLOR: Color = Color::WHITE;

/// Opens a window at the given logical (CSS-pixel) size and runs the
/// render loop on it until the window is closed. The window's scale
/// factor is taken as the device pixel ratio, so the pixel buffer is
/// allocated at backing resolution while the window keeps its logical
/// size on screen.
///
/// Keys: T runs one training cycle and logs its summary; Escape, Q, or X
/// quits.
pub fn animate<S: Simulation + 'static>(
    title: &str,
    css_width: u32,
    css_height: u32,
    mode: ViewMode,
    simulation: S,
) -> Result<(), Error> {
    let event_loop = EventLoop::new().unwrap();
    let mut input = WinitInputHelper::new();

    let window = Arc::new(build_window(&event_loop, title, css_width, css_height));
    let viewport = view_canvas::Viewport::new(css_width, css_height, Some(window.scale_factor()));
    let mut pixels = build_pixels(&window, viewport.buffer_width(), viewport.buffer_height())?;

    let mut driver = FrameDriver::new(simulation, viewport, mode);
    driver.start();
    window.request_redraw();

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);

            if let Event::WindowEvent {
                event: WindowEvent::RedrawRequested,
                ..
            } = event
            {
                let mut surface = view_canvas::FrameSurface::new(
                    pixels.frame_mut(),
                    viewport.buffer_width(),
                    viewport.buffer_height(),
                );
                let reschedule = driver.frame(&mut surface);
                if let Err(err) = pixels.render() {
                    log_error("pixels.render", err);
                    driver.stop();
                    elwt.exit();
                    return;
                }
                if reschedule {
                    // One simulation step per displayed frame.
                    window.request_redraw();
                }
            }

            if input.update(&event) {
                if input.key_pressed(KeyCode::Escape)
                    || input.key_pressed(KeyCode::KeyQ)
                    || input.key_pressed(KeyCode::KeyX)
                    || input.close_requested()
                    || input.destroyed()
                {
                    driver.stop();
                    elwt.exit();
                    return;
                }

                if input.key_pressed(KeyCode::KeyT) {
                    log::info!("{}", driver.train());
                }

                if let Some(size) = input.window_resized() {
                    if let Err(err) = pixels.resize_surface(size.width, size.height) {
                        log_error("pixels.resize_surface", err);
                        driver.stop();
                        elwt.exit();
                    }
                }
            }
        })
        .unwrap();
    Ok(())
}

fn build_window(
    event_loop: &EventLoop<()>,
    title: &str,
    css_width: u32,
    css_height: u32,
) -> Window {
    WindowBuilder::new()
        .with_title(title)
        .with_inner_size(LogicalSize::new(css_width, css_height))
        .with_resizable(false)
        .build(event_loop)
        .unwrap()
}

fn build_pixels(
    window: &Arc<Window>,
    buffer_width: u32,
    buffer_height: u32,
) -> Result<Pixels<'static>, Error> {
    let window_size = window.inner_size();
    let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, window.clone());
    PixelsBuilder::new(buffer_width, buffer_height, surface_texture)
        .clear_color(BACKGROUND_COLOR)
        .build()
}

fn log_error<E: std::error::Error + 'static>(method_name: &str, err: E) {
    log::error!("{method_name}() failed: {err}");
    for source in err.sources().skip(1) {
        log::error!("  caused by: {source}");
    }
}
