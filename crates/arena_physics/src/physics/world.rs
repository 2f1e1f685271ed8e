//! The simulation aggregate
//!
//! [`PhysicsWorld`] owns the world index, the player and the sphere pool and
//! advances them frame by frame. Each frame is clamped and split into fixed
//! substeps; within a substep the order is:
//!
//! 1. player input and player integration,
//! 2. per thrown sphere: integration, then sphere-vs-player,
//! 3. sphere-vs-sphere over all thrown pairs,
//! 4. the out-of-bounds check.

use log::{info, warn};

use super::integrator::{integrate, IntegrationParams};
use super::player::{CapsuleSnapshot, Player, PlayerInput, ThrowCommand};
use super::projectiles::SpherePool;
use super::resolver::{resolve_sphere_capsule, resolve_sphere_pairs};
use crate::config::{ConfigError, PhysicsConfig};
use crate::foundation::math::Vec3;
use crate::foundation::time::FrameClock;
use crate::geometry::{GeometryError, GeometryProvider, IndexBuilder};
use crate::spatial::{Octree, SpatialQuery};

/// Body positions published once per frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    /// Player capsule pose
    pub player: CapsuleSnapshot,
    /// Sphere centers in pool order
    pub spheres: Vec<Vec3>,
}

/// Player, spheres and static world
pub struct PhysicsWorld {
    config: PhysicsConfig,
    params: IntegrationParams,
    clock: FrameClock,
    index: Box<dyn SpatialQuery>,
    pending: Option<IndexBuilder>,
    player: Player,
    spheres: SpherePool,
}

impl PhysicsWorld {
    /// Create a world with no static geometry
    ///
    /// Until geometry is installed every body is in free fall.
    pub fn new(config: PhysicsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            params: IntegrationParams::from(&config),
            clock: FrameClock::new(config.max_frame_delta, config.substeps_per_frame),
            index: Box::new(Octree::empty(config.octree.clone())),
            pending: None,
            player: Player::new(config.player.clone()),
            spheres: SpherePool::new(config.projectiles.clone()),
            config,
        })
    }

    /// Configuration the world was created with
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Frame counter and simulated time
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Current static world index
    pub fn index(&self) -> &dyn SpatialQuery {
        self.index.as_ref()
    }

    /// The player
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// The player, mutably
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// The sphere pool
    pub fn spheres(&self) -> &SpherePool {
        &self.spheres
    }

    /// The sphere pool, mutably
    pub fn spheres_mut(&mut self) -> &mut SpherePool {
        &mut self.spheres
    }

    /// Replace the static world index
    pub fn set_index(&mut self, index: Box<dyn SpatialQuery>) {
        info!("Installed world index with {} triangles", index.triangle_count());
        self.index = index;
    }

    /// Load `provider` and rebuild the octree synchronously
    ///
    /// On error the current index is kept.
    pub fn set_world_geometry(
        &mut self,
        provider: &dyn GeometryProvider,
    ) -> Result<(), GeometryError> {
        let triangles = provider.triangles()?;
        self.set_index(Box::new(Octree::build(triangles, self.config.octree.clone())));
        Ok(())
    }

    /// Start building the octree for `provider` in the background
    ///
    /// Replaces any build already in flight. Call [`poll_pending_index`]
    /// each frame to install the result.
    ///
    /// [`poll_pending_index`]: Self::poll_pending_index
    pub fn load_world_geometry<P>(&mut self, provider: P)
    where
        P: GeometryProvider + Send + 'static,
    {
        self.pending = Some(IndexBuilder::spawn(provider, self.config.octree.clone()));
    }

    /// True while a background build is outstanding
    pub fn has_pending_index(&self) -> bool {
        self.pending.is_some()
    }

    /// Install a finished background build
    ///
    /// Returns true if a new index was installed. A failed build is logged
    /// and leaves the current index in place.
    pub fn poll_pending_index(&mut self) -> bool {
        let Some(result) = self.pending.as_ref().and_then(IndexBuilder::poll) else {
            return false;
        };
        self.pending = None;

        match result {
            Ok(octree) => {
                self.set_index(Box::new(octree));
                true
            }
            Err(err) => {
                warn!("World geometry failed to load: {}", err);
                false
            }
        }
    }

    /// Throw a sphere from the player's head
    pub fn throw_sphere(&mut self, command: &ThrowCommand) -> Option<usize> {
        self.spheres.throw(
            self.player.eye(),
            self.player.capsule().radius,
            self.player.velocity(),
            command,
        )
    }

    /// Advance the simulation by one rendered frame
    pub fn step_frame(&mut self, frame_delta: f64, input: &PlayerInput) {
        let dt = self.clock.advance(frame_delta);
        self.run_substeps(dt, input);
    }

    fn run_substeps(&mut self, dt: f64, input: &PlayerInput) {
        if dt <= 0.0 {
            return;
        }

        if let Some(ref command) = input.throw {
            self.throw_sphere(command);
        }
        for _ in 0..self.clock.substeps() {
            self.substep(dt, input);
        }
    }

    fn substep(&mut self, dt: f64, input: &PlayerInput) {
        let index = self.index.as_ref();

        self.player.step(input, index, &self.params, dt);

        for sphere in self.spheres.live_mut() {
            integrate(sphere, index, &self.params, dt);
            resolve_sphere_capsule(sphere, self.player.body_mut());
        }
        resolve_sphere_pairs(self.spheres.live_mut());

        self.player.check_out_of_bounds(self.config.out_of_bounds_y);
    }

    /// Positions for renderers
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            player: self.player.snapshot(),
            spheres: self.spheres.centers(),
        }
    }
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("frame", &self.clock.frame_count())
            .field("triangles", &self.index.triangle_count())
            .field("pending_index", &self.pending.is_some())
            .field("player", &self.player.snapshot())
            .field("spheres", &self.spheres.len())
            .finish()
    }
}
