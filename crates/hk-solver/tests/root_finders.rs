//! Backend agreement for the scalar root finders.

use hk_solver::{BisectionRootFinder, NewtonRootFinder, RootFinder};
use proptest::prelude::*;

/// Implicit equation with the same shape as Colebrook: 1/sqrt(x) + 2 log10(c/sqrt(x)) = 0.
fn implicit_log(c: f64) -> impl Fn(f64) -> f64 {
    move |x: f64| {
        let s = (x.abs() + 1e-10).sqrt();
        1.0 / s + 2.0 * (c / s).log10()
    }
}

#[test]
fn newton_and_bisection_agree_on_implicit_log() {
    let g = implicit_log(2.51e-5);
    let newton = NewtonRootFinder::default()
        .with_lower_bound(1e-8)
        .find_root(&g, 0.02)
        .unwrap();
    let bisection = BisectionRootFinder::default()
        .with_lower_bound(1e-8)
        .find_root(&g, 0.02)
        .unwrap();

    assert!(newton.converged && bisection.converged);
    assert!(newton.root > 0.0);
    assert!((newton.root - bisection.root).abs() / newton.root < 1e-8);
}

proptest! {
    #[test]
    fn square_roots_agree(a in 1e-3f64..1e4) {
        let g = move |x: f64| x * x - a;
        let x0 = 1.0;
        let newton = NewtonRootFinder::default()
            .with_lower_bound(0.0)
            .find_root(&g, x0)
            .unwrap();
        let bisection = BisectionRootFinder::default()
            .with_lower_bound(0.0)
            .find_root(&g, x0)
            .unwrap();

        prop_assert!(newton.converged);
        prop_assert!(bisection.converged);
        let exact = a.sqrt();
        prop_assert!((newton.root - exact).abs() <= 1e-9 * exact.max(1.0) / exact.min(1.0));
        prop_assert!((bisection.root - exact).abs() <= 1e-9 * exact.max(1.0) / exact.min(1.0));
    }
}
