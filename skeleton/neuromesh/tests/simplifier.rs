//! Retry behaviour of the watertight simplifier.

mod common;

use common::{Call, ScriptedKernel, soup};
use mesh_types::MeshTopology;
use neuromesh::{FaceSchedule, SimplifyParams, SimplifyStatus, WatertightSimplifier};

const SCHEDULE: FaceSchedule = FaceSchedule {
    dfaces: 160,
    min_faces: 80,
};

#[test]
fn first_attempt_succeeds() {
    let kernel = ScriptedKernel::new(5000, 3000);
    let simplifier = WatertightSimplifier::new(&kernel, SimplifyParams::default());

    let out = simplifier.simplify(&soup(5000), 1.0, SCHEDULE).unwrap();

    assert_eq!(out.status, SimplifyStatus::Aggressive { attempt: 1 });
    assert_eq!(out.attempts, 1);
    assert_eq!(out.mesh.face_count(), 80);
    assert_eq!(
        kernel.calls(),
        vec![
            Call::Remesh,
            Call::Decimate {
                base: 3000,
                target: 80
            },
            Call::Check(80),
        ]
    );
}

#[test]
fn every_attempt_restarts_from_the_remeshed_checkpoint() {
    let kernel = ScriptedKernel::new(5000, 3000).watertight_from(Some(400));
    let simplifier = WatertightSimplifier::new(&kernel, SimplifyParams::default());

    let out = simplifier.simplify(&soup(5000), 1.0, SCHEDULE).unwrap();

    assert_eq!(out.status, SimplifyStatus::Aggressive { attempt: 3 });
    assert_eq!(out.mesh.face_count(), 400);
    assert_eq!(
        kernel.decimations(),
        vec![(3000, 80), (3000, 240), (3000, 400)]
    );
}

#[test]
fn emergency_loop_starts_from_the_alpha_wrap() {
    // remeshing leaves too few faces to reach the second target
    let kernel = ScriptedKernel::new(3000, 100).watertight_from(Some(240));
    let simplifier = WatertightSimplifier::new(&kernel, SimplifyParams::default());

    let out = simplifier.simplify(&soup(3000), 1.0, SCHEDULE).unwrap();

    assert_eq!(out.status, SimplifyStatus::Emergency { attempt: 2 });
    assert_eq!(out.attempts, 3);
    assert_eq!(kernel.decimations(), vec![(100, 80), (3000, 80), (3000, 240)]);
}

#[test]
fn huge_increment_ends_both_loops_after_one_attempt() {
    let kernel = ScriptedKernel::new(600, 100).watertight_from(None);
    let simplifier = WatertightSimplifier::new(&kernel, SimplifyParams::default());
    let schedule = FaceSchedule {
        dfaces: usize::MAX,
        min_faces: 80,
    };

    let out = simplifier.simplify(&soup(600), 1.0, schedule).unwrap();

    assert_eq!(out.status, SimplifyStatus::Exhausted);
    assert_eq!(kernel.decimations(), vec![(100, 80), (600, 80)]);
}

#[test]
fn exhaustion_returns_the_last_candidate() {
    let kernel = ScriptedKernel::new(600, 100).watertight_from(None);
    let simplifier = WatertightSimplifier::new(&kernel, SimplifyParams::default());

    let out = simplifier.simplify(&soup(600), 1.0, SCHEDULE).unwrap();

    // emergency targets stop at 2/3 of 600 faces
    assert_eq!(out.status, SimplifyStatus::Exhausted);
    assert_eq!(
        kernel.decimations(),
        vec![(100, 80), (600, 80), (600, 240), (600, 400)]
    );
    assert_eq!(out.mesh.face_count(), 400);
}

#[test]
fn attempt_ceilings_bound_the_search() {
    let kernel = ScriptedKernel::new(1_000_000, 1_000_000).watertight_from(None);
    let params = SimplifyParams::default().with_attempts(3, 2);
    let simplifier = WatertightSimplifier::new(&kernel, params);

    let out = simplifier.simplify(&soup(1_000_000), 1.0, SCHEDULE).unwrap();

    assert_eq!(out.status, SimplifyStatus::Exhausted);
    assert_eq!(out.attempts, 5);
    assert_eq!(kernel.decimations().len(), 5);
}

#[test]
fn stray_components_are_removed() {
    let kernel = ScriptedKernel::new(5000, 3000).with_stray_component();
    let simplifier = WatertightSimplifier::new(&kernel, SimplifyParams::default());

    let out = simplifier.simplify(&soup(5000), 1.0, SCHEDULE).unwrap();

    assert_eq!(out.removed_components, 1);
    assert_eq!(out.mesh.face_count(), 80);
}

#[test]
fn empty_input_is_rejected() {
    let kernel = ScriptedKernel::new(0, 0);
    let simplifier = WatertightSimplifier::new(&kernel, SimplifyParams::default());
    assert!(simplifier.simplify(&soup(0), 1.0, SCHEDULE).is_err());
    assert!(kernel.calls().is_empty());
}
