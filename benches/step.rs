//! Benchmarks for the per-frame simulation step.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;

use maskflow::bridge::{bridge_particle_colors, bridge_particle_offsets, InstanceBuffer};
use maskflow::prelude::*;

fn sample_field() -> FieldGrid {
    FieldGrid::sample(&MaskImage::noise(512, 42), &FieldConfig::new(100))
}

fn spawn_particles(count: u32, bounds: Bounds) -> Vec<Particle> {
    (0..count)
        .map(|i| {
            let mut ctx = SpawnContext::with_seed(i, count, bounds, 7);
            Particle::at(ctx.random_in_bounds())
        })
        .collect()
}

fn bench_field_sampling(c: &mut Criterion) {
    let mask = MaskImage::noise(512, 42);
    c.bench_function("field_sample_100x100", |b| {
        b.iter(|| black_box(FieldGrid::sample(&mask, &FieldConfig::new(100))))
    });
}

fn bench_integrator_step(c: &mut Criterion) {
    let field = sample_field();
    let bounds = Bounds::new(field.width, field.height);

    let mut group = c.benchmark_group("integrator_step");
    for count in [1_000u32, 10_000, 50_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut particles = spawn_particles(count, bounds);
            let mut integrator =
                FlowIntegrator::new(Steering::SpeedFromField, particles.len());
            b.iter(|| integrator.step(&mut particles, &field, bounds));
        });
    }
    group.finish();
}

fn bench_full_frame(c: &mut Criterion) {
    let field = sample_field();
    let bounds = Bounds::new(field.width, field.height);
    let count = 10_000u32;

    c.bench_function("frame_10k_step_and_bridge", |b| {
        let mut particles = spawn_particles(count, bounds);
        let mut integrator = FlowIntegrator::new(Steering::SpeedFromField, particles.len());
        let mut offsets = InstanceBuffer::new(particles.len(), 3);
        let mut colors = InstanceBuffer::new(particles.len(), 3);

        b.iter(|| {
            integrator.step(&mut particles, &field, bounds);
            bridge_particle_offsets(&mut offsets, &particles);
            bridge_particle_colors(&mut colors, integrator.steer_values());
            black_box(offsets.as_bytes());
        });
    });
}

fn bench_trail_advance(c: &mut Criterion) {
    c.bench_function("trail_advance_full", |b| {
        let mut trail = TrailCanvas::new(1280, 720);
        for i in 0..200 {
            trail.record((i * 6) as f32, (i * 3) as f32);
        }
        b.iter(|| {
            // Steady state: one pointer event per frame.
            trail.record(640.0, 360.0);
            trail.advance();
            black_box(trail.raster().len())
        });
    });
}

criterion_group!(
    benches,
    bench_field_sampling,
    bench_integrator_step,
    bench_full_frame,
    bench_trail_advance
);
criterion_main!(benches);
