//! # Holonomic Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use swerve_lib::{
    drive_ctrl::{calc_module_speeds, ModuleGeometry, Params, NUM_MODULES},
    sim::SimRig,
};

fn holonomic_benchmark(c: &mut Criterion) {
    // ---- Speed calculation alone ----

    let geometry = ModuleGeometry::from_dims(10.925, 12.925).unwrap();

    c.bench_function("calc_module_speeds", |b| {
        b.iter(|| {
            calc_module_speeds(
                black_box(&geometry.bearings_deg),
                black_box(37.0),
                black_box(0.8),
                black_box(0.4),
            )
        })
    });

    // ---- Full drivetrain update ----

    let mut rig = SimRig::new(
        Params::default(),
        [35.0, -120.0, 170.0, -10.0],
        [0.0; NUM_MODULES],
        12.0,
    )
    .unwrap();

    let mut direction_deg = 0.0;

    c.bench_function("drive_ctrl_holonomic", |b| {
        b.iter(|| {
            direction_deg += 7.0;
            let out = rig.ctrl.holonomic(black_box(direction_deg), 0.8, 0.4);
            rig.step();
            out
        })
    });
}

criterion_group!(benches, holonomic_benchmark);
criterion_main!(benches);
