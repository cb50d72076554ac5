// src/measurement.rs
// Angle and distance measurements for whiteboard annotations

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Angle at `vertex` between the arms towards `p1` and `p3`, in degrees (0-180).
///
/// Returns 0 when either arm has zero length.
pub fn calculate_angle(p1: Point, vertex: Point, p3: Point) -> f64 {
    let (v1x, v1y) = (p1.x - vertex.x, p1.y - vertex.y);
    let (v2x, v2y) = (p3.x - vertex.x, p3.y - vertex.y);

    let mag1 = v1x.hypot(v1y);
    let mag2 = v2x.hypot(v2y);
    if mag1 == 0.0 || mag2 == 0.0 {
        return 0.0;
    }

    // Rounding can push the cosine just outside [-1, 1]
    let cos_angle = ((v1x * v2x + v1y * v2y) / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

pub fn calculate_distance(p1: Point, p2: Point) -> f64 {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    (dx * dx + dy * dy).sqrt()
}

pub fn format_angle(angle: f64) -> String {
    format!("{:.1}°", angle)
}

pub fn format_distance(distance: f64) -> String {
    format!("{:.1} px", distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.05
    }

    #[test]
    fn test_distance() {
        assert_eq!(calculate_distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)), 5.0);
        assert_eq!(calculate_distance(Point::new(0.0, 0.0), Point::new(10.0, 0.0)), 10.0);
        assert_eq!(calculate_distance(Point::new(0.0, 0.0), Point::new(0.0, 10.0)), 10.0);
        assert_eq!(calculate_distance(Point::new(5.0, 5.0), Point::new(5.0, 5.0)), 0.0);
    }

    #[test]
    fn test_right_angle() {
        let angle = calculate_angle(Point::new(1.0, 0.0), Point::new(0.0, 0.0), Point::new(0.0, 1.0));
        assert!(close(angle, 90.0));
    }

    #[test]
    fn test_straight_angle() {
        let angle = calculate_angle(Point::new(-1.0, 0.0), Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        assert!(close(angle, 180.0));
    }

    #[test]
    fn test_acute_angle() {
        let angle = calculate_angle(Point::new(1.0, 0.0), Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        assert!(close(angle, 45.0));
    }

    #[test]
    fn test_degenerate_angle_is_zero() {
        let vertex = Point::new(2.0, 2.0);
        assert_eq!(calculate_angle(vertex, vertex, Point::new(5.0, 1.0)), 0.0);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_angle(45.0), "45.0°");
        assert_eq!(format_angle(33.333), "33.3°");
        assert_eq!(format_distance(12.345), "12.3 px");
    }
}
