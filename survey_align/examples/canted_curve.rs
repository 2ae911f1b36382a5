use survey_align::geometry::Point;
use survey_align::segment::CantShape;
use survey_align::transition::TransitionShape;
use survey_align::{
    Alignment, AlignmentPlacementResolver, CantFunction, HorizontalAlignmentCurve, PointAddress,
    VerticalAlignmentCurve,
};

/// Prints both rail heads along a canted Bloss curve.
fn main() -> survey_align::Result<()> {
    env_logger::init();
    let horizontal = HorizontalAlignmentCurve::builder(0.0, Point::new(0.0, 0.0), 0.0)
        .line(50.0)
        .spiral(TransitionShape::Bloss, 100.0, f64::INFINITY, 500.0)
        .arc(100.0, 500.0)
        .build()?;
    let vertical = VerticalAlignmentCurve::builder(0.0, 20.0).grade(250.0, 0.004).build()?;
    let cant = CantFunction::builder(0.0, 1.5)
        .constant(50.0, 0.0, 0.0)
        .transition(CantShape::BlossCurve, 100.0, (0.0, 0.0), (0.1, 0.0))
        .constant(100.0, 0.1, 0.0)
        .build()?;
    let alignment = Alignment::new(horizontal)
        .with_vertical(vertical)
        .with_cant(cant);

    let resolver = AlignmentPlacementResolver::default();
    println!("station,left_x,left_y,left_z,right_x,right_y,right_z");
    for i in 0..=25 {
        let station = 10.0 * i as f64;
        let left = resolver.resolve_frame(&alignment, &PointAddress::at(station).with_lateral(0.75))?;
        let right = resolver.resolve_frame(&alignment, &PointAddress::at(station).with_lateral(-0.75))?;
        println!(
            "{:.1},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4}",
            station,
            left.origin.x,
            left.origin.y,
            left.origin.z,
            right.origin.x,
            right.origin.y,
            right.origin.z
        );
    }
    Ok(())
}
