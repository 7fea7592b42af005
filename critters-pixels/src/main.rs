#![deny(clippy::all)]
#![forbid(unsafe_code)]

use frame_driver::{Animal, Food, Simulation, ViewMode, WorldSnapshot};
use pixels::Error;
use pixels_view_support::animate;
use rand::prelude::*;
use rand::rngs::SmallRng;

const VIEWPORT_WIDTH: u32 = 800;
const VIEWPORT_HEIGHT: u32 = 600;
const NUM_CRITTERS: usize = 40;
const NUM_FOODS: usize = 60;

const SPEED: f32 = 0.002;
const STEERING_JITTER: f32 = 0.05;
const TURN_BIAS_MUTATION: f32 = 0.03;
const EATING_RANGE: f32 = 0.01;
const GENERATION_LENGTH: usize = 2500;

fn main() -> Result<(), Error> {
    env_logger::init();
    let mode = if std::env::args().any(|arg| arg == "--snapshot") {
        ViewMode::Static
    } else {
        ViewMode::Continuous
    };
    let simulation = CritterSim::random(
        NUM_CRITTERS,
        NUM_FOODS,
        SmallRng::from_rng(&mut rand::rng()),
    );
    animate("Critters", VIEWPORT_WIDTH, VIEWPORT_HEIGHT, mode, simulation)
}

#[derive(Clone, Debug)]
struct Critter {
    x: f32,
    y: f32,
    rotation: f32,
    turn_bias: f32,
    eaten: u32,
}

impl Critter {
    fn random(rng: &mut SmallRng, turn_bias: f32) -> Self {
        Self {
            x: rng.random_range(0.0..1.0),
            y: rng.random_range(0.0..1.0),
            rotation: rng.random_range(0.0..std::f32::consts::TAU),
            turn_bias,
            eaten: 0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct FoodPoint {
    x: f32,
    y: f32,
}

impl FoodPoint {
    fn random(rng: &mut SmallRng) -> Self {
        Self {
            x: rng.random_range(0.0..1.0),
            y: rng.random_range(0.0..1.0),
        }
    }
}

/// Critters wander the wrapping unit square with a heritable steering
/// bias; foods respawn elsewhere when eaten. Training scores a generation
/// by foods eaten and reseeds the population from the better half.
struct CritterSim {
    critters: Vec<Critter>,
    foods: Vec<FoodPoint>,
    rng: SmallRng,
}

impl CritterSim {
    fn random(num_critters: usize, num_foods: usize, mut rng: SmallRng) -> Self {
        let critters = (0..num_critters)
            .map(|_| {
                let bias = rng.random_range(-STEERING_JITTER..STEERING_JITTER);
                Critter::random(&mut rng, bias)
            })
            .collect();
        let foods = (0..num_foods).map(|_| FoodPoint::random(&mut rng)).collect();
        Self {
            critters,
            foods,
            rng,
        }
    }

    fn process_movement(&mut self) {
        for critter in &mut self.critters {
            let jitter = self.rng.random_range(-STEERING_JITTER..STEERING_JITTER);
            critter.rotation += critter.turn_bias + jitter;
            critter.x = (critter.x + critter.rotation.cos() * SPEED).rem_euclid(1.0);
            critter.y = (critter.y + critter.rotation.sin() * SPEED).rem_euclid(1.0);
        }
    }

    fn process_eating(&mut self) {
        for critter in &mut self.critters {
            for food in &mut self.foods {
                let dx = critter.x - food.x;
                let dy = critter.y - food.y;
                if (dx * dx + dy * dy).sqrt() <= EATING_RANGE {
                    critter.eaten += 1;
                    *food = FoodPoint::random(&mut self.rng);
                }
            }
        }
    }

    fn evolve(&mut self) -> (u32, f32, u32) {
        let min = self.critters.iter().map(|c| c.eaten).min().unwrap_or(0);
        let max = self.critters.iter().map(|c| c.eaten).max().unwrap_or(0);
        let total: u32 = self.critters.iter().map(|c| c.eaten).sum();
        let avg = total as f32 / self.critters.len().max(1) as f32;

        self.critters.sort_by(|a, b| b.eaten.cmp(&a.eaten));
        let parents: Vec<f32> = self.critters[..self.critters.len().div_ceil(2)]
            .iter()
            .map(|c| c.turn_bias)
            .collect();
        self.critters = (0..self.critters.len())
            .map(|_| {
                let parent = parents[self.rng.random_range(0..parents.len())];
                let bias = parent + self.rng.random_range(-TURN_BIAS_MUTATION..TURN_BIAS_MUTATION);
                Critter::random(&mut self.rng, bias)
            })
            .collect();
        for food in &mut self.foods {
            *food = FoodPoint::random(&mut self.rng);
        }

        (min, avg, max)
    }
}

impl Simulation for CritterSim {
    fn world(&self) -> WorldSnapshot {
        WorldSnapshot {
            animals: self
                .critters
                .iter()
                .map(|c| Animal {
                    x: c.x,
                    y: c.y,
                    rotation: c.rotation,
                })
                .collect(),
            foods: self.foods.iter().map(|f| Food { x: f.x, y: f.y }).collect(),
        }
    }

    fn step(&mut self) {
        self.process_eating();
        self.process_movement();
    }

    fn train(&mut self) -> String {
        for _ in 0..GENERATION_LENGTH {
            self.step();
        }
        let (min, avg, max) = self.evolve();
        log::debug!("generation complete");
        format!("generation done: min={min} avg={avg:.2} max={max} foods eaten")
    }
}
