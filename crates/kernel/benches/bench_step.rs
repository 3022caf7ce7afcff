use std::hint::black_box;
use std::time::Instant;

use boxworld_common::Bounds;
use boxworld_kernel::{BoxDesc, World};

fn make_world(box_count: usize) -> World {
    let mut world = World::new(Bounds::new(0.0, 0.0, 2000.0, 2000.0), 0.2);
    let side = (box_count as f64).sqrt().ceil() as usize;
    for i in 0..box_count {
        let x = (i % side) as f64 * 12.0;
        let y = (i / side) as f64 * 12.0;
        let desc = BoxDesc::new(x, y, 10.0, 10.0).with_velocity((i % 7) as f64 - 3.0, 0.0);
        world
            .add_box(desc)
            .expect("bench boxes have positive extents");
    }
    world
}

fn bench_step(box_count: usize, iterations: usize) {
    let mut world = make_world(box_count);

    let start = Instant::now();
    for _ in 0..iterations {
        black_box(&mut world).step();
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  step ({box_count} boxes, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}, residual pairs {}",
        world.overlapping_pairs().len()
    );
}

fn main() {
    println!("=== World::step (O(n^2) pair scan) ===");
    for &count in &[10, 100, 500, 1000] {
        let iterations = if count >= 500 { 20 } else { 200 };
        bench_step(count, iterations);
    }
}
