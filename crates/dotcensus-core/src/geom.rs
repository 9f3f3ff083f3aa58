//! Canvas coordinates, aliased over `euclid`. Group centers and published
//! dot positions live in the same untyped pixel space as the SVG output.

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}
