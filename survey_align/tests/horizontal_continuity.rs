use approx::assert_relative_eq;
use survey_align::geometry::{distance, Point};
use survey_align::transition::TransitionShape;
use survey_align::{EvaluationSettings, HorizontalAlignmentCurve};

const SHAPES: [TransitionShape; 6] = [
    TransitionShape::Linear,
    TransitionShape::Bloss,
    TransitionShape::Sine,
    TransitionShape::Cosine,
    TransitionShape::Helmert,
    TransitionShape::VienneseBend,
];

/// Tangent, spiral in, arc, spiral out, tangent.
fn curve(shape: TransitionShape, radius: f64) -> HorizontalAlignmentCurve {
    HorizontalAlignmentCurve::builder(1000.0, Point::new(500.0, 200.0), 0.3)
        .line(50.0)
        .spiral(shape, 80.0, f64::INFINITY, radius)
        .arc(60.0, radius)
        .spiral(shape, 80.0, radius, f64::INFINITY)
        .line(50.0)
        .build()
        .unwrap()
}

#[test]
fn joints_are_continuous_for_every_shape() {
    for shape in SHAPES {
        for radius in [250.0, -250.0] {
            let curve = curve(shape, radius);
            for joint in [1050.0, 1130.0, 1190.0, 1270.0] {
                let before = curve.evaluate(joint - 1e-9).unwrap();
                let at = curve.evaluate(joint).unwrap();
                assert!(
                    distance(before.point, at.point) < 1e-6,
                    "{:?} position jump at {}",
                    shape,
                    joint
                );
                assert_relative_eq!(before.heading, at.heading, epsilon = 1e-8);
                assert_relative_eq!(before.curvature, at.curvature, epsilon = 1e-6);
            }
        }
    }
}

#[test]
fn total_turn_is_independent_of_shape() {
    for shape in SHAPES {
        let curve = curve(shape, 250.0);
        let end = curve.heading_at(1320.0).unwrap();
        assert_relative_eq!(end, 0.3 + 140.0 / 250.0, epsilon = 1e-12);
    }
}

#[test]
fn mirrored_turns_mirror_the_plan() {
    for shape in SHAPES {
        let left = curve(shape, 250.0);
        let right = curve(shape, -250.0);
        let start = Point::new(500.0, 200.0);
        for station in [1100.0, 1160.0, 1250.0, 1320.0] {
            let l = left.point_at(station).unwrap();
            let r = right.point_at(station).unwrap();
            // Reflect across the initial tangent line.
            let (sin, cos) = 0.3f64.sin_cos();
            let along = |p: Point| ((p.x - start.x) * cos + (p.y - start.y) * sin, -(p.x - start.x) * sin + (p.y - start.y) * cos);
            let (la, lo) = along(l);
            let (ra, ro) = along(r);
            assert_relative_eq!(la, ra, epsilon = 1e-6);
            assert_relative_eq!(lo, -ro, epsilon = 1e-6);
        }
    }
}

#[test]
fn cubic_parabola_heading_follows_its_slope() {
    let curve = HorizontalAlignmentCurve::builder(0.0, Point::new(0.0, 0.0), 0.0)
        .line(20.0)
        .cubic(80.0, f64::INFINITY, 250.0)
        .line(20.0)
        .build()
        .unwrap();
    // y' = x² / (2 R L) at the end of the cubic.
    let slope: f64 = 80.0 * 80.0 / (2.0 * 250.0 * 80.0);
    assert_relative_eq!(curve.heading_at(100.0).unwrap(), slope.atan(), epsilon = 1e-12);
    let before = curve.evaluate(100.0 - 1e-9).unwrap();
    let after = curve.evaluate(100.0).unwrap();
    assert!(distance(before.point, after.point) < 1e-6);
}

#[test]
fn negative_length_runs_backwards() {
    let curve = HorizontalAlignmentCurve::builder(0.0, Point::new(0.0, 0.0), 0.0)
        .line(-10.0)
        .line(5.0)
        .build()
        .unwrap();
    assert_eq!(curve.domain(), (0.0, 15.0));
    let p = curve.point_at(4.0).unwrap();
    assert_relative_eq!(p.x, -4.0, epsilon = 1e-12);
    // The following segment keeps the reversed travel direction.
    let p = curve.point_at(15.0).unwrap();
    assert_relative_eq!(p.x, -15.0, epsilon = 1e-9);
}

#[test]
fn open_ends_extend_along_the_tangents() {
    let curve = HorizontalAlignmentCurve::builder(0.0, Point::new(0.0, 0.0), 0.0)
        .line(10.0)
        .arc(10.0, 100.0)
        .open_start()
        .open_end()
        .build()
        .unwrap();
    assert_eq!(curve.domain(), (f64::NEG_INFINITY, f64::INFINITY));
    let before = curve.point_at(-5.0).unwrap();
    assert_relative_eq!(before.x, -5.0, epsilon = 1e-12);
    assert_relative_eq!(before.y, 0.0, epsilon = 1e-12);

    let end = curve.evaluate(20.0).unwrap();
    let past = curve.evaluate(30.0).unwrap();
    assert_relative_eq!(past.heading, end.heading, epsilon = 1e-12);
    assert_relative_eq!(past.curvature, 0.0);
    assert_relative_eq!(distance(end.point, past.point), 10.0, epsilon = 1e-9);
}

#[test]
fn coarse_quadrature_still_converges() {
    let coarse = EvaluationSettings {
        quadrature_panels: 2,
        ..EvaluationSettings::default()
    };
    let fine = EvaluationSettings::default();
    for shape in [TransitionShape::Helmert, TransitionShape::VienneseBend] {
        let build = |settings| {
            HorizontalAlignmentCurve::builder(0.0, Point::new(0.0, 0.0), 0.0)
                .spiral(shape, 120.0, f64::INFINITY, 150.0)
                .settings(settings)
                .build()
                .unwrap()
        };
        let a = build(coarse).point_at(120.0).unwrap();
        let b = build(fine).point_at(120.0).unwrap();
        assert!(distance(a, b) < 1e-6, "{:?}", shape);
    }
}
