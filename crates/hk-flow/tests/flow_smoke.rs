//! Integration tests for hk-flow: friction factor, regimes, pipe points, Moody data.

use hk_core::units::{constants::water_nu_m2ps, us};
use hk_flow::{
    FlowRegime, FrictionEquation, FrictionFactorSolver, MarkerShape, MoodyDiagram, MoodyOptions,
    MoodyPoint, Pipe, RegimeClassifier, colebrook_residual, is_transition,
};
use hk_solver::BisectionRootFinder;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn classify_laminar_reference_value() {
    let classifier = RegimeClassifier::new();
    let mut rng = StdRng::seed_from_u64(0);
    let f = classifier.classify(1000.0, 0.001, &mut rng).unwrap();
    assert!((f - 0.064).abs() < f64::EPSILON);
}

#[test]
fn classify_turbulent_matches_direct_colebrook() {
    let classifier = RegimeClassifier::new();
    let mut rng = StdRng::seed_from_u64(0);
    let f = classifier.classify(1e6, 0.0, &mut rng).unwrap();
    let direct = FrictionFactorSolver::new()
        .friction_factor(1e6, 0.0, FrictionEquation::Colebrook)
        .unwrap();
    assert_eq!(f, direct);
}

#[test]
fn colebrook_residual_at_reference_point() {
    let f = FrictionFactorSolver::new()
        .friction_factor(1e5, 0.001, FrictionEquation::Colebrook)
        .unwrap();
    assert!(colebrook_residual(f, 1e5, 0.001).abs() < 1e-6);
}

#[test]
fn seeded_transition_draws_reproduce() {
    let classifier = RegimeClassifier::new();
    let draw = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..5)
            .map(|_| classifier.classify(3000.0, 0.001, &mut rng).unwrap())
            .collect::<Vec<_>>()
    };
    assert_eq!(draw(11), draw(11));
    assert_ne!(draw(11), draw(12));
}

#[test]
fn transition_draws_are_centred_between_laminar_and_colebrook() {
    let classifier = RegimeClassifier::new();
    let stats = classifier.transition_statistics(3000.0, 0.001).unwrap();
    assert!(stats.colebrook > stats.laminar);
    assert!(stats.mean > stats.laminar && stats.mean < stats.colebrook);

    let mut rng = StdRng::seed_from_u64(99);
    let within_3_sigma = (0..500)
        .map(|_| classifier.classify(3000.0, 0.001, &mut rng).unwrap())
        .filter(|f| (f - stats.mean).abs() < 3.0 * stats.sigma)
        .count();
    assert!(within_3_sigma >= 490);
}

#[test]
fn classifier_with_bisection_backend() {
    let solver = FrictionFactorSolver::with_root_finder(
        BisectionRootFinder::default().with_lower_bound(1e-8),
    );
    let classifier = RegimeClassifier::with_solver(solver);
    let mut rng = StdRng::seed_from_u64(0);

    let f = classifier.classify(1e5, 0.001, &mut rng).unwrap();
    assert!((f - 0.022_174_535_844_515).abs() < 1e-9);
}

#[test]
fn pipe_point_in_transition_band() {
    // 1 in pipe, 1 gpm of water: Re ~ 3100
    let pipe = Pipe::from_us_customary("small".into(), 1.0, 100.0).unwrap();
    let nu = water_nu_m2ps();
    let q = us::gpm(1.0);
    let re = pipe.reynolds(q, nu);
    assert!(is_transition(re), "Re = {re}");

    let classifier = RegimeClassifier::new();
    let mut rng = StdRng::seed_from_u64(5);
    let op = pipe.operating_point(q, nu, &classifier, &mut rng).unwrap();
    assert_eq!(op.regime, FlowRegime::Transition);

    let mut replay = StdRng::seed_from_u64(5);
    let again = pipe.operating_point(q, nu, &classifier, &mut replay).unwrap();
    assert_eq!(op, again);

    let point = MoodyPoint::new(op.reynolds, op.friction_factor);
    assert_eq!(point.marker, MarkerShape::Triangle);
}

#[test]
fn moody_with_coarse_sampling() {
    let options = MoodyOptions {
        laminar_points: 3,
        transition_points: 3,
        turbulent_points: 4,
        roughness_curves: vec![0.0, 0.01],
        ..MoodyOptions::default()
    };
    let diagram = MoodyDiagram::build(&FrictionFactorSolver::new(), &options).unwrap();
    assert_eq!(diagram.series.len(), 4);
    let rough = &diagram.series[3];
    assert_eq!(rough.relative_roughness, Some(0.01));
    assert_eq!(rough.reynolds.len(), 4);
    // Fully rough limit of Colebrook at rr = 0.01: f ~ 0.038
    let last = *rough.friction_factor.last().unwrap();
    assert!((last - 0.038).abs() < 0.001, "f = {last}");
}
