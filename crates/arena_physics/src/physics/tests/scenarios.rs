//! Frame-level behavior of a complete world

use crate::config::{BodyProfile, PhysicsConfig};
use crate::foundation::logging::init_for_tests;
use crate::foundation::math::Vec3;
use crate::geometry::{ArenaBuilder, TriangleSoup};
use crate::physics::body::{BodyState, RigidBody};
use crate::physics::collision::{ContactPolicy, Sphere, Triangle};
use crate::physics::integrator::{integrate, IntegrationParams};
use crate::physics::player::{PlayerInput, ThrowCommand};
use crate::physics::world::PhysicsWorld;
use crate::spatial::{BruteForceIndex, SpatialQuery};
use approx::{assert_abs_diff_eq, assert_relative_eq};
use std::time::Duration;

const FRAME: f64 = 1.0 / 60.0;

fn arena_world() -> PhysicsWorld {
    init_for_tests();
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    world.set_world_geometry(&ArenaBuilder::new()).unwrap();
    world
}

/// Large triangle through `center` whose face normal is `normal`
fn plane_triangle(center: Vec3, normal: Vec3) -> Triangle {
    let n = normal.normalize();
    let helper = if n.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
    let t1 = (helper - n * n.dot(&helper)).normalize();
    let t2 = n.cross(&t1);
    Triangle::new(
        center - t1 * 10.0 - t2 * 10.0,
        center + t1 * 10.0 - t2 * 10.0,
        center + t2 * 10.0,
    )
}

#[test]
fn test_gravity_only_free_fall() {
    init_for_tests();
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    world.spheres_mut().spawn(Vec3::new(0.0, 10.0, 0.0), Vec3::zeros());

    let frames = 30;
    for _ in 0..frames {
        world.step_frame(FRAME, &PlayerInput::idle());
    }

    let t = frames as f64 * FRAME;
    let sphere = &world.spheres().live()[0];
    let free_fall_speed = 30.0 * t;
    // Air damping only slows the fall
    assert!(sphere.velocity.y < 0.0);
    assert!(-sphere.velocity.y <= free_fall_speed);
    assert!(-sphere.velocity.y > free_fall_speed * 0.95);

    let drop = 10.0 - sphere.position().y;
    assert_abs_diff_eq!(drop, 0.5 * 30.0 * t * t, epsilon = 0.15);
    assert_eq!(sphere.state, BodyState::Airborne);
}

#[test]
fn test_frame_delta_is_clamped() {
    init_for_tests();
    let mut long = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let mut capped = PhysicsWorld::new(PhysicsConfig::default()).unwrap();

    long.step_frame(2.0, &PlayerInput::idle());
    capped.step_frame(0.05, &PlayerInput::idle());

    assert_eq!(long.snapshot(), capped.snapshot());
    assert_relative_eq!(long.clock().simulated_time(), 0.05);
}

#[test]
fn test_flat_ground_landing_zeroes_vertical_velocity() {
    let index = BruteForceIndex::new(
        vec![plane_triangle(Vec3::zeros(), Vec3::y())],
        ContactPolicy::Deepest,
    );
    let params = IntegrationParams::default();
    let mut body = RigidBody::new(Sphere::new(Vec3::new(0.0, 0.21, 0.0), 0.2), BodyProfile::SPHERE);
    body.velocity = Vec3::new(0.5, -9.0, 0.0);

    integrate(&mut body, &index, &params, FRAME / 5.0).unwrap();

    assert_eq!(body.state, BodyState::Grounded);
    assert_abs_diff_eq!(body.velocity.y, 0.0, epsilon = 1e-12);
}

#[test]
fn test_steep_slope_is_a_wall() {
    let normal = Vec3::new(0.0, 0.3, 0.95).normalize();
    let index = BruteForceIndex::new(
        vec![plane_triangle(Vec3::zeros(), normal)],
        ContactPolicy::Deepest,
    );
    let params = IntegrationParams {
        gravity: 0.0,
        ..IntegrationParams::default()
    };
    let undamped = BodyProfile {
        damping: 0.0,
        ..BodyProfile::SPHERE
    };
    let mut body = RigidBody::new(Sphere::new(normal * 0.15, 0.2), undamped);
    body.velocity = Vec3::new(1.0, 2.0, -6.0);
    let tangential = body.velocity - normal * normal.dot(&body.velocity);

    integrate(&mut body, &index, &params, 0.001).unwrap();

    assert_eq!(body.state, BodyState::Airborne);
    assert_relative_eq!(body.velocity, tangential, epsilon = 1e-12);
}

#[test]
fn test_contact_fully_resolved_after_one_step() {
    let triangle = plane_triangle(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.2, 1.0, -0.4));
    let index = BruteForceIndex::new(vec![triangle], ContactPolicy::Deepest);
    let params = IntegrationParams::default();

    let mut body = RigidBody::new(Sphere::new(Vec3::new(0.1, 1.1, 0.2), 0.3), BodyProfile::SPHERE);
    body.velocity = Vec3::new(0.0, -3.0, 0.0);
    integrate(&mut body, &index, &params, 0.01).unwrap();

    let residual = index.intersect(&body.collider).map_or(0.0, |c| c.depth);
    assert!(residual <= 1e-9, "residual depth {residual}");
}

#[test]
fn test_player_settles_on_floor() {
    let mut world = arena_world();
    for _ in 0..120 {
        world.step_frame(FRAME, &PlayerInput::idle());
    }

    let snapshot = world.snapshot();
    assert_abs_diff_eq!(snapshot.player.start.y, 0.35, epsilon = 0.01);
    assert!(world.player().velocity().y.abs() < 0.5);
}

#[test]
fn test_resting_bodies_stay_grounded() {
    let mut world = arena_world();
    world.spheres_mut().spawn(Vec3::new(3.0, 0.6, -2.0), Vec3::zeros());
    for _ in 0..120 {
        world.step_frame(FRAME, &PlayerInput::idle());
    }

    for frame in 0..60 {
        world.step_frame(FRAME, &PlayerInput::idle());
        assert!(world.player().is_grounded(), "player airborne on frame {frame}");
        assert!(world.spheres().live()[0].is_grounded(), "sphere airborne on frame {frame}");
    }
    assert_abs_diff_eq!(world.snapshot().player.start.y, 0.35, epsilon = 1e-9);
}

#[test]
fn test_walking_speed_reaches_grounded_terminal_velocity() {
    let mut world = arena_world();
    for _ in 0..30 {
        world.step_frame(FRAME, &PlayerInput::idle());
    }

    let east = PlayerInput::walking(Vec3::new(1.0, 0.0, 0.0));
    for _ in 0..180 {
        world.step_frame(FRAME, &east);
        assert!(world.player().is_grounded());
    }

    // v = v·exp(-k·dt) + a·dt at steady state, close to a / k = 4.5
    let dt = FRAME / 5.0;
    let terminal = 18.0 * dt / (1.0 - (-4.0 * dt).exp());
    let velocity = world.player().velocity();
    assert_abs_diff_eq!(velocity.x, terminal, epsilon = 1e-3);
    assert_abs_diff_eq!(velocity.x, 4.5, epsilon = 0.1);
    assert_abs_diff_eq!(velocity.y, 0.0, epsilon = 1e-9);
}

#[test]
fn test_player_walks_and_jumps() {
    let mut world = arena_world();
    for _ in 0..30 {
        world.step_frame(FRAME, &PlayerInput::idle());
    }

    let forward = PlayerInput::walking(Vec3::new(0.0, 0.0, -1.0));
    for _ in 0..30 {
        world.step_frame(FRAME, &forward);
    }
    let walked = world.snapshot().player.start;
    assert!(walked.z < -0.5);

    let jump = PlayerInput {
        jump: true,
        ..PlayerInput::idle()
    };
    world.step_frame(FRAME, &jump);
    for _ in 0..5 {
        world.step_frame(FRAME, &PlayerInput::idle());
    }
    assert!(world.snapshot().player.start.y > 1.0);
}

#[test]
fn test_walls_contain_the_player() {
    let mut world = arena_world();
    let run_east = PlayerInput {
        run: true,
        ..PlayerInput::walking(Vec3::new(1.0, 0.0, 0.0))
    };
    for _ in 0..600 {
        world.step_frame(FRAME, &run_east);
    }
    let capsule = world.player().capsule();
    assert!(capsule.start.x <= 20.0 - 0.35 + 1e-2);
    assert!(capsule.start.x > 15.0);
}

#[test]
fn test_out_of_bounds_player_respawns() {
    init_for_tests();
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let player = world.player_mut();
    player.body_mut().translate(Vec3::new(3.0, -27.0, 1.0));
    player.body_mut().velocity = Vec3::new(0.0, -50.0, 0.0);

    world.step_frame(1e-6, &PlayerInput::idle());

    let snapshot = world.snapshot();
    assert_relative_eq!(snapshot.player.start, Vec3::new(0.0, 0.35, 0.0), epsilon = 1e-6);
    assert_relative_eq!(snapshot.player.end, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-6);
    assert_abs_diff_eq!(world.player().velocity().magnitude(), 0.0, epsilon = 1e-4);
}

#[test]
fn test_falling_forever_without_geometry_respawns_repeatedly() {
    init_for_tests();
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    let mut respawns = 0;
    let mut last_y = world.snapshot().player.end.y;
    for _ in 0..600 {
        world.step_frame(FRAME, &PlayerInput::idle());
        let y = world.snapshot().player.end.y;
        if y > last_y {
            respawns += 1;
        }
        last_y = y;
        assert!(y > -25.0);
    }
    assert!(respawns >= 2);
}

#[test]
fn test_thrown_sphere_lands_in_front() {
    let mut world = arena_world();
    for _ in 0..30 {
        world.step_frame(FRAME, &PlayerInput::idle());
    }

    let throw = PlayerInput {
        throw: Some(ThrowCommand {
            direction: Vec3::new(0.0, 0.0, -1.0),
            held_seconds: 0.0,
        }),
        ..PlayerInput::idle()
    };
    world.step_frame(FRAME, &throw);
    assert_eq!(world.spheres().live_count(), 1);
    assert!(world.spheres().live()[0].velocity.z < -10.0);

    for _ in 0..180 {
        world.step_frame(FRAME, &PlayerInput::idle());
    }
    let sphere = world.spheres().live()[0].position();
    assert!(sphere.z < -3.0);
    assert_abs_diff_eq!(sphere.y, 0.2, epsilon = 0.05);
    // The rest of the pool is still parked
    assert_eq!(world.snapshot().spheres[1], Vec3::new(0.0, -100.0, 0.0));
}

#[test]
fn test_spheres_never_rest_inside_each_other() {
    let mut world = arena_world();
    for k in 0..12 {
        let angle = k as f64 * 0.5;
        world.spheres_mut().spawn(
            Vec3::new(2.0 + 0.1 * angle.cos(), 1.0 + 0.35 * k as f64, -2.0 + 0.1 * angle.sin()),
            Vec3::zeros(),
        );
    }
    for _ in 0..240 {
        world.step_frame(FRAME, &PlayerInput::idle());
    }

    let live = world.spheres().live();
    for (i, a) in live.iter().enumerate() {
        assert!(a.position().y > 0.1);
        for b in &live[i + 1..] {
            let gap = (a.position() - b.position()).magnitude();
            assert!(gap > 0.3, "spheres overlap: gap {gap}");
        }
    }
}

#[test]
fn test_background_index_is_installed() {
    init_for_tests();
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    world.load_world_geometry(ArenaBuilder::standard());
    assert!(world.has_pending_index());

    // Free fall until the index arrives
    let mut installed = false;
    for _ in 0..5_000 {
        if world.poll_pending_index() {
            installed = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(installed);
    assert!(!world.has_pending_index());
    assert_eq!(world.index().triangle_count(), ArenaBuilder::standard().build().unwrap().len());
}

#[test]
fn test_failed_background_load_keeps_free_fall() {
    init_for_tests();
    let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
    world.load_world_geometry(TriangleSoup::new(vec![Vec3::zeros(); 3], vec![0, 1, 5]));

    for _ in 0..5_000 {
        if !world.has_pending_index() {
            break;
        }
        assert!(!world.poll_pending_index());
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(!world.has_pending_index());
    assert_eq!(world.index().triangle_count(), 0);

    world.step_frame(FRAME, &PlayerInput::idle());
    assert!(world.player().velocity().y < 0.0);
}

#[test]
fn test_synchronous_geometry_error_keeps_index() {
    let mut world = arena_world();
    let before = world.index().triangle_count();
    let broken = TriangleSoup::new(vec![Vec3::zeros()], vec![0]);
    assert!(world.set_world_geometry(&broken).is_err());
    assert_eq!(world.index().triangle_count(), before);
}
