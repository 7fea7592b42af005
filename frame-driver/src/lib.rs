#![deny(clippy::all)]
#![forbid(unsafe_code)]

use view_canvas::{DrawSurface, Rgba, TriangleStyle, Viewport, draw_triangle, fill_circle};

const BACKGROUND_COLOR: Rgba = [0xff, 0xff, 0xff, 0xff];
const ANIMAL_STROKE_COLOR: Rgba = [0x00, 0x00, 0x00, 0xff];
const ANIMAL_FILL_COLOR: Rgba = [0xff, 0xff, 0xff, 0xff];
const FOOD_COLOR: Rgba = [0x00, 0xff, 0x80, 0xff];

// Glyph sizes as fractions of the logical viewport width.
const ANIMAL_SIZE_RATIO: f64 = 0.01;
const FOOD_RADIUS_RATIO: f64 = 0.005;

/// Position normalized to [0, 1] in both axes; rotation is raw radians,
/// never canonicalized.
#[derive(Clone, Copy, Debug)]
pub struct Animal {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct Food {
    pub x: f32,
    pub y: f32,
}

/// Point-in-time view of the simulation, fetched once per frame and
/// dropped when the frame is done. Order is render order.
#[derive(Clone, Debug, Default)]
pub struct WorldSnapshot {
    pub animals: Vec<Animal>,
    pub foods: Vec<Food>,
}

/// The external engine that owns all domain state. `step` is the only
/// mutation point the renderer ever triggers; `train` is independent of
/// the frame cadence and driven by manual input.
pub trait Simulation {
    fn world(&self) -> WorldSnapshot;
    fn step(&mut self);
    fn train(&mut self) -> String;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ViewMode {
    /// Render the current snapshot once, without stepping.
    Static,
    /// Step, render, and reschedule on every display frame.
    Continuous,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DriverState {
    Idle,
    Running,
    Stopped,
}

/// Paces the simulation to the display: one step per rendered frame in
/// continuous mode. Holds no snapshot across frames.
pub struct FrameDriver<S: Simulation> {
    simulation: S,
    viewport: Viewport,
    mode: ViewMode,
    state: DriverState,
}

impl<S: Simulation> FrameDriver<S> {
    pub fn new(simulation: S, viewport: Viewport, mode: ViewMode) -> Self {
        Self {
            simulation,
            viewport,
            mode,
            state: DriverState::Idle,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn start(&mut self) {
        if self.state == DriverState::Idle {
            log::info!("starting {:?} render loop", self.mode);
            self.state = DriverState::Running;
        }
    }

    pub fn stop(&mut self) {
        if self.state == DriverState::Running {
            log::info!("render loop stopped");
            self.state = DriverState::Stopped;
        }
    }

    /// Runs one frame: clear, step (continuous mode only), fetch a fresh
    /// snapshot, draw every food then every animal. Returns whether the
    /// caller should schedule another frame.
    pub fn frame(&mut self, surface: &mut impl DrawSurface) -> bool {
        if self.state != DriverState::Running {
            return false;
        }

        surface.clear(BACKGROUND_COLOR);
        if self.mode == ViewMode::Continuous {
            self.simulation.step();
        }
        let snapshot = self.simulation.world();
        log::trace!(
            "frame: {} animals, {} foods",
            snapshot.animals.len(),
            snapshot.foods.len()
        );
        self.render(&snapshot, surface);

        match self.mode {
            ViewMode::Continuous => true,
            ViewMode::Static => {
                self.stop();
                false
            }
        }
    }

    /// Runs one training cycle on the collaborator, outside the frame
    /// cadence, and returns its human-readable summary.
    pub fn train(&mut self) -> String {
        self.simulation.train()
    }

    fn render(&self, snapshot: &WorldSnapshot, surface: &mut impl DrawSurface) {
        let width = f64::from(self.viewport.css_width());
        let height = f64::from(self.viewport.css_height());

        for food in &snapshot.foods {
            fill_circle(
                surface,
                &self.viewport,
                f64::from(food.x) * width,
                f64::from(food.y) * height,
                FOOD_RADIUS_RATIO * width,
                FOOD_COLOR,
            );
        }

        let style = TriangleStyle {
            stroke: ANIMAL_STROKE_COLOR,
            // The training-loop view fills the glyphs; the one-shot
            // preview only strokes them.
            fill: (self.mode == ViewMode::Continuous).then_some(ANIMAL_FILL_COLOR),
        };
        for animal in &snapshot.animals {
            draw_triangle(
                surface,
                &self.viewport,
                f64::from(animal.x) * width,
                f64::from(animal.y) * height,
                ANIMAL_SIZE_RATIO * width,
                f64::from(animal.rotation),
                style,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    enum Call {
        Step,
        World,
        Draw,
    }

    type CallLog = Rc<RefCell<Vec<Call>>>;

    struct ScriptedSimulation {
        snapshot: WorldSnapshot,
        calls: CallLog,
    }

    impl ScriptedSimulation {
        fn new(snapshot: WorldSnapshot) -> (Self, CallLog) {
            let calls = CallLog::default();
            (
                Self {
                    snapshot,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl Simulation for ScriptedSimulation {
        fn world(&self) -> WorldSnapshot {
            self.calls.borrow_mut().push(Call::World);
            self.snapshot.clone()
        }

        fn step(&mut self) {
            self.calls.borrow_mut().push(Call::Step);
        }

        fn train(&mut self) -> String {
            "trained".to_string()
        }
    }

    struct RecordingSurface {
        width: u32,
        height: u32,
        pixels: Vec<Rgba>,
        calls: CallLog,
    }

    impl RecordingSurface {
        fn new(width: u32, height: u32, calls: CallLog) -> Self {
            Self {
                width,
                height,
                pixels: vec![[0; 4]; width as usize * height as usize],
                calls,
            }
        }

        fn pixel(&self, x: u32, y: u32) -> Rgba {
            self.pixels[y as usize * self.width as usize + x as usize]
        }
    }

    impl DrawSurface for RecordingSurface {
        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }

        fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
            self.calls.borrow_mut().push(Call::Draw);
            self.pixels[y as usize * self.width as usize + x as usize] = color;
        }
    }

    fn one_animal_one_food() -> WorldSnapshot {
        WorldSnapshot {
            animals: vec![Animal {
                x: 0.5,
                y: 0.5,
                rotation: 0.0,
            }],
            foods: vec![Food { x: 0.25, y: 0.25 }],
        }
    }

    fn steps_in(calls: &CallLog) -> usize {
        calls.borrow().iter().filter(|c| **c == Call::Step).count()
    }

    #[test]
    fn continuous_frame_steps_then_fetches_then_draws() {
        let (sim, calls) = ScriptedSimulation::new(one_animal_one_food());
        let viewport = Viewport::new(800, 600, None);
        let mut driver = FrameDriver::new(sim, viewport, ViewMode::Continuous);
        let mut surface = RecordingSurface::new(800, 600, calls.clone());
        driver.start();

        assert!(driver.frame(&mut surface));

        let calls = calls.borrow();
        let step_at = calls.iter().position(|c| *c == Call::Step).unwrap();
        let world_at = calls.iter().position(|c| *c == Call::World).unwrap();
        let first_draw = calls.iter().position(|c| *c == Call::Draw).unwrap();
        assert_eq!(calls.iter().filter(|c| **c == Call::Step).count(), 1);
        assert_eq!(calls.iter().filter(|c| **c == Call::World).count(), 1);
        assert!(step_at < world_at);
        // The clear comes first; all post-snapshot rasterization must
        // follow the fetch.
        assert!(first_draw < step_at, "clear should precede the step");
        let last_world = calls.iter().rposition(|c| *c == Call::World).unwrap();
        assert!(calls[last_world + 1..].contains(&Call::Draw));
    }

    #[test]
    fn one_step_per_frame() {
        let (sim, calls) = ScriptedSimulation::new(WorldSnapshot::default());
        let viewport = Viewport::new(100, 100, None);
        let mut driver = FrameDriver::new(sim, viewport, ViewMode::Continuous);
        let mut surface = RecordingSurface::new(100, 100, calls.clone());
        driver.start();

        for expected in 1..=5 {
            assert!(driver.frame(&mut surface));
            assert_eq!(steps_in(&calls), expected);
        }
        assert_eq!(driver.state(), DriverState::Running);
    }

    #[test]
    fn static_mode_renders_once_and_never_steps() {
        let (sim, calls) = ScriptedSimulation::new(one_animal_one_food());
        let viewport = Viewport::new(800, 600, None);
        let mut driver = FrameDriver::new(sim, viewport, ViewMode::Static);
        let mut surface = RecordingSurface::new(800, 600, calls.clone());
        driver.start();

        assert!(!driver.frame(&mut surface));
        assert_eq!(driver.state(), DriverState::Stopped);
        assert_eq!(steps_in(&calls), 0);
        assert_eq!(
            calls.borrow().iter().filter(|c| **c == Call::World).count(),
            1
        );

        // A stopped driver renders nothing further.
        let before = calls.borrow().len();
        assert!(!driver.frame(&mut surface));
        assert_eq!(calls.borrow().len(), before);
    }

    #[test]
    fn idle_driver_does_not_render() {
        let (sim, calls) = ScriptedSimulation::new(one_animal_one_food());
        let viewport = Viewport::new(800, 600, None);
        let mut driver = FrameDriver::new(sim, viewport, ViewMode::Continuous);
        let mut surface = RecordingSurface::new(800, 600, calls.clone());

        assert!(!driver.frame(&mut surface));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn stop_cancels_a_running_loop() {
        let (sim, calls) = ScriptedSimulation::new(WorldSnapshot::default());
        let viewport = Viewport::new(100, 100, None);
        let mut driver = FrameDriver::new(sim, viewport, ViewMode::Continuous);
        let mut surface = RecordingSurface::new(100, 100, calls.clone());
        driver.start();
        assert!(driver.frame(&mut surface));

        driver.stop();
        assert_eq!(driver.state(), DriverState::Stopped);
        assert!(!driver.frame(&mut surface));
        assert_eq!(steps_in(&calls), 1);
    }

    #[test]
    fn glyphs_land_at_scaled_viewport_positions() {
        // 800x600 CSS viewport, scale 1: the animal at (0.5, 0.5) has its
        // nose at (400 + size * 1.5, 300) with size = 0.01 * 800 = 8, and
        // the food at (0.25, 0.25) is centered at (200, 150).
        let (sim, calls) = ScriptedSimulation::new(one_animal_one_food());
        let viewport = Viewport::new(800, 600, None);
        let mut driver = FrameDriver::new(sim, viewport, ViewMode::Static);
        let mut surface = RecordingSurface::new(800, 600, calls);
        driver.start();
        driver.frame(&mut surface);

        assert_eq!(surface.pixel(412, 300), super::ANIMAL_STROKE_COLOR);
        assert_eq!(surface.pixel(200, 150), super::FOOD_COLOR);
    }

    #[test]
    fn centered_animal_stays_centered_across_pixel_ratios() {
        for scale in [1.0, 2.0] {
            let (sim, calls) = ScriptedSimulation::new(one_animal_one_food());
            let viewport = Viewport::new(800, 600, Some(scale));
            let mut driver = FrameDriver::new(sim, viewport, ViewMode::Static);
            let mut surface =
                RecordingSurface::new(viewport.buffer_width(), viewport.buffer_height(), calls);
            driver.start();
            driver.frame(&mut surface);

            let nose_x = ((400.0 + 8.0 * 1.5) * scale) as u32;
            let nose_y = (300.0 * scale) as u32;
            assert_eq!(surface.pixel(nose_x, nose_y), super::ANIMAL_STROKE_COLOR);
        }
    }

    #[test]
    fn train_is_a_passthrough() {
        let (sim, _calls) = ScriptedSimulation::new(WorldSnapshot::default());
        let viewport = Viewport::new(100, 100, None);
        let mut driver = FrameDriver::new(sim, viewport, ViewMode::Continuous);
        assert_eq!(driver.train(), "trained");
    }
}
