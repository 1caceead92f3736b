use cgmath::{vec2, Vector2};

/// A unit-speed particle bound to a rectangular playground.
///
/// The direction is fixed at construction; reflection only flips the sign of
/// one velocity component at a time, so the speed never changes.
#[derive(Debug, Clone)]
pub struct Point {
    pub position: Vector2<f64>,
    velocity: Vector2<f64>,
    playground: Vector2<f64>,
}

impl Point {
    /// `direction` is an angle in radians; the y axis points down, so a
    /// direction of π/2 moves the point towards the top of the canvas.
    pub fn new(position: Vector2<f64>, direction: f64, playground: Vector2<f64>) -> Self {
        Self {
            position,
            velocity: vec2(direction.cos(), -direction.sin()),
            playground,
        }
    }

    pub fn velocity(&self) -> Vector2<f64> {
        self.velocity
    }

    /// Moves the point one step along its velocity, reflecting off the
    /// playground edges. A coordinate that would leave `[0, bound]` lands on
    /// the bound exactly and the matching velocity component flips sign.
    pub fn advance(&mut self) {
        self.position.x += self.velocity.x;
        if self.position.x < 0.0 {
            self.position.x = 0.0;
            self.velocity.x = -self.velocity.x;
        } else if self.position.x > self.playground.x {
            self.position.x = self.playground.x;
            self.velocity.x = -self.velocity.x;
        }

        self.position.y += self.velocity.y;
        if self.position.y < 0.0 {
            self.position.y = 0.0;
            self.velocity.y = -self.velocity.y;
        } else if self.position.y > self.playground.y {
            self.position.y = self.playground.y;
            self.velocity.y = -self.velocity.y;
        }
    }
}

/// Builds an ensemble of `count` points at `center`, with directions spread
/// evenly over `[0, 2π)` so that no two points share a trajectory.
pub fn fan_out(count: usize, center: Vector2<f64>, playground: Vector2<f64>) -> Vec<Point> {
    (0..count)
        .map(|i| {
            let direction = std::f64::consts::TAU * i as f64 / count as f64;
            Point::new(center, direction, playground)
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_advance_unit_speed() {
        let mut p = Point::new(vec2(10.0, 10.0), 0.0, vec2(100.0, 100.0));
        p.advance();

        assert_abs_diff_eq!(p.position.x, 11.0);
        assert_abs_diff_eq!(p.position.y, 10.0);
    }

    #[test]
    fn test_reflection_clamps_to_bound() {
        // Heading straight right from just inside the edge.
        let mut p = Point::new(vec2(99.5, 50.0), 0.0, vec2(100.0, 100.0));
        p.advance();

        assert_abs_diff_eq!(p.position.x, 100.0);
        assert_abs_diff_eq!(p.velocity().x, -1.0);

        // The next step moves back inside.
        p.advance();
        assert_abs_diff_eq!(p.position.x, 99.0);
    }

    #[test]
    fn test_reflection_at_origin() {
        let mut p = Point::new(vec2(0.5, 0.5), std::f64::consts::PI * 0.75, vec2(100.0, 100.0));
        let v = p.velocity();
        p.advance();

        assert_abs_diff_eq!(p.position.x, 0.0);
        assert_abs_diff_eq!(p.position.y, 0.0);
        assert_abs_diff_eq!(p.velocity().x, -v.x);
        assert_abs_diff_eq!(p.velocity().y, -v.y);
    }

    #[test]
    fn test_position_stays_in_playground() {
        let playground = vec2(20.0, 20.0);
        let mut points = fan_out(16, vec2(10.0, 10.0), playground);

        for _ in 0..1000 {
            for p in &mut points {
                p.advance();

                assert!(p.position.x >= 0.0 && p.position.x <= playground.x);
                assert!(p.position.y >= 0.0 && p.position.y <= playground.y);
            }
        }
    }

    #[test]
    fn test_fan_out_directions() {
        let points = fan_out(4, vec2(0.0, 0.0), vec2(10.0, 10.0));

        assert_eq!(points.len(), 4);
        // 0, π/2, π, 3π/2 with the y axis pointing down.
        assert_abs_diff_eq!(points[0].velocity().x, 1.0);
        assert_abs_diff_eq!(points[0].velocity().y, 0.0);
        assert_abs_diff_eq!(points[1].velocity().x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(points[1].velocity().y, -1.0);
        assert_abs_diff_eq!(points[2].velocity().x, -1.0);
        assert_abs_diff_eq!(points[2].velocity().y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(points[3].velocity().x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(points[3].velocity().y, 1.0);
    }

    #[test]
    fn test_fan_out_unit_speed() {
        for p in fan_out(7, vec2(5.0, 5.0), vec2(10.0, 10.0)) {
            let v = p.velocity();
            assert_abs_diff_eq!(v.x * v.x + v.y * v.y, 1.0, epsilon = 1e-12);
        }
    }
}
