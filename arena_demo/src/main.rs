//! Headless arena demo
//!
//! Loads the procedural arena on a background thread, then drives the
//! player through a scripted input track while throwing spheres in random
//! directions. Body positions are logged once a second of simulated time.
//!
//! Usage: `arena_demo [config.toml|config.ron] [frames]`

use arena_physics::foundation::logging;
use arena_physics::prelude::*;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FRAME_DELTA: f64 = 1.0 / 60.0;
const DEFAULT_FRAMES: u64 = 1200;
const RNG_SEED: u64 = 0x00a1_e5a5;

/// Demo failures
#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid frame count `{0}`")]
    FrameCount(String),

    #[error("World geometry failed to load: {0}")]
    Geometry(#[from] GeometryError),
}

struct ArenaDemo {
    world: PhysicsWorld,
    rng: StdRng,
    frames: u64,
    throws: usize,
}

impl ArenaDemo {
    fn new(config: PhysicsConfig, frames: u64) -> Result<Self, DemoError> {
        let mut world = PhysicsWorld::new(config)?;
        let arena = ArenaBuilder::standard();
        info!("Indexing {} arena triangles in the background", arena.build()?.len());
        world.load_world_geometry(arena);
        Ok(Self {
            world,
            rng: StdRng::seed_from_u64(RNG_SEED),
            frames,
            throws: 0,
        })
    }

    /// Input for frame `frame`: walk a square, jump now and then, throw every half second
    fn scripted_input(&mut self, frame: u64) -> PlayerInput {
        let leg = (frame / 120) % 4;
        let move_direction = match leg {
            0 => Vec3::new(0.0, 0.0, -1.0),
            1 => Vec3::new(1.0, 0.0, 0.0),
            2 => Vec3::new(0.0, 0.0, 1.0),
            _ => Vec3::new(-1.0, 0.0, 0.0),
        };

        let throw = (frame % 30 == 0).then(|| ThrowCommand {
            direction: Vec3::new(
                self.rng.gen_range(-1.0..1.0),
                self.rng.gen_range(0.0..0.5),
                self.rng.gen_range(-1.0..1.0),
            ),
            held_seconds: self.rng.gen_range(0.0..2.0),
        });

        PlayerInput {
            move_direction,
            run: leg % 2 == 1,
            jump: frame % 90 == 45,
            throw,
        }
    }

    fn run(mut self) {
        let stopwatch = Stopwatch::start_new();

        for frame in 0..self.frames {
            if self.world.poll_pending_index() {
                info!("World geometry ready after {} frames", frame);
                self.report_surroundings();
            }

            let input = self.scripted_input(frame);
            if input.throw.is_some() {
                self.throws += 1;
            }
            self.world.step_frame(FRAME_DELTA, &input);

            if frame % 60 == 0 {
                self.report(frame);
            }
        }

        info!(
            "Simulated {} frames ({:.1}s) in {:.1}ms, {} throws",
            self.frames,
            self.world.clock().simulated_time(),
            stopwatch.elapsed_millis(),
            self.throws
        );
    }

    fn report(&self, frame: u64) {
        let snapshot = self.world.snapshot();
        let player = &snapshot.player;
        info!(
            "frame {:>5}: player feet ({:.2}, {:.2}, {:.2}) {}",
            frame,
            player.start.x,
            player.start.y,
            player.start.z,
            if self.world.player().is_grounded() { "grounded" } else { "airborne" }
        );

        let live = self.world.spheres().live();
        let resting = live.iter().filter(|sphere| sphere.is_grounded()).count();
        debug!("{} spheres in play, {} on the ground", live.len(), resting);
    }

    fn report_surroundings(&self) {
        let index = self.world.index();
        let eye = self.world.player().eye();
        if let Some(hit) = index.ray_cast(&Ray::new(eye, Vec3::new(0.0, -1.0, 0.0)), 100.0) {
            info!("Ground is {:.2} below the player's eye", hit.distance);
        }

        // Arena walls are single-sided sheets, so containment is asked of
        // the open layout where only closed platforms remain
        let platform = Vec3::new(6.0, 1.0, 3.0);
        match ArenaBuilder::standard().with_wall_height(0.0).build() {
            Ok(triangles) => {
                let open = Octree::build(triangles, self.world.config().octree.clone());
                info!(
                    "Platform interior at ({:.1}, {:.1}, {:.1}) is {}",
                    platform.x,
                    platform.y,
                    platform.z,
                    if open.contains_point(platform) { "solid" } else { "open" }
                );
            }
            Err(err) => debug!("Skipping containment check: {}", err),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            info!("Loading configuration from {}", path);
            PhysicsConfig::load_from_file(&path).map_err(DemoError::from)?
        }
        None => PhysicsConfig::default(),
    };
    let frames = match args.next() {
        Some(raw) => raw.parse().map_err(|_| DemoError::FrameCount(raw))?,
        None => DEFAULT_FRAMES,
    };

    println!("=== Arena Physics Demo ===");
    println!("Running {frames} frames at 60 Hz; set RUST_LOG=debug for sphere detail");

    ArenaDemo::new(config, frames)?.run();
    Ok(())
}
