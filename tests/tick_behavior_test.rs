//! End-to-end tick behavior of the simulation core, driven the way the game
//! loop drives it: one loudness sample per fixed-cadence step.

use rand::SeedableRng;
use rand::rngs::StdRng;
use screamy_bird::world::{BIRD_H, GRAVITY, PIPE_GAP, Phase, WORLD_H, World};

#[test]
fn silent_run_falls_closed_form_until_the_ground_ends_it() {
    let mut w = World::new();
    w.reset();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..150 {
        w.step(0.0, &mut rng);
    }

    // With velocity starting at zero the fall is y0 + sum(k * gravity). The
    // ground (y + height >= world height) is reached on tick 37, well before
    // the first gate at tick 150, so the run ends there with no pipes and
    // no further movement.
    assert_eq!(w.phase, Phase::GameOver);
    assert_eq!(w.frame_count, 37);
    let n = 37.0;
    let expected = 300.0 + GRAVITY * n * (n + 1.0) / 2.0;
    assert!((w.bird.y - expected).abs() < 1e-6);
    assert!(w.bird.y + BIRD_H >= WORLD_H);
    assert!(w.pipes.is_empty());
}

#[test]
fn surviving_run_spawns_one_gate_per_150_frames() {
    let mut w = World::new();
    w.reset();
    let mut rng = StdRng::seed_from_u64(42);

    // A full-volume shout every 39 ticks exactly cancels the gravity gained
    // in between, so the bird oscillates mid-screen indefinitely.
    for tick in 1..=300u64 {
        let loudness = if tick % 39 == 1 { 100.0 } else { 0.0 };
        w.step(loudness, &mut rng);
    }

    assert_eq!(w.phase, Phase::Running);
    assert_eq!(w.frame_count, 300);
    assert_eq!(w.pipes.len(), 4, "two gates after 300 frames");
    for gate in w.pipes.chunks(2) {
        let (top, bottom) = (&gate[0], &gate[1]);
        assert_eq!(top.y, 0.0);
        assert_eq!(top.x, bottom.x);
        assert!((bottom.y - (top.height + PIPE_GAP)).abs() < 1e-12);
    }
}

#[test]
fn restart_after_game_over_starts_from_scratch() {
    let mut w = World::new();
    w.reset();
    let mut rng = StdRng::seed_from_u64(42);

    while w.phase == Phase::Running {
        w.step(0.0, &mut rng);
    }
    assert_eq!(w.phase, Phase::GameOver);
    let frozen_y = w.bird.y;

    // Game over means frozen: further steps change nothing.
    w.step(200.0, &mut rng);
    assert_eq!(w.bird.y, frozen_y);

    // Restart is a full reset and the world ticks again.
    w.reset();
    assert_eq!(w.phase, Phase::Running);
    assert_eq!(w.score, 0);
    assert_eq!(w.frame_count, 0);
    assert!(w.pipes.is_empty());
    w.step(0.0, &mut rng);
    assert_eq!(w.frame_count, 1);
    assert!((w.bird.velocity - GRAVITY).abs() < 1e-12);
}
