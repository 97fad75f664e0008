use nalgebra as na;

/// The robot marker in its own frame, pointing along +x.
pub const ROBOT_TRIANGLE: [[f64; 2]; 3] = [[-8.0, 4.0], [-8.0, -4.0], [8.0, 0.0]];

/// Places the robot marker at `pose` and truncates the vertices to
/// canvas pixels.
pub fn robot_triangle(pose: &na::Isometry3<f64>) -> [na::Point2<i32>; 3] {
    ROBOT_TRIANGLE.map(|[x, y]| {
        let p = pose * na::Point3::new(x, y, 0.0);
        to_pixel(&p.xy())
    })
}

/// Truncates toward zero.
pub fn to_pixel(point: &na::Point2<f64>) -> na::Point2<i32> {
    na::Point2::new(point.x as i32, point.y as i32)
}

/// An ellipse with semi-axes given along its own rotated frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub center: na::Point2<f64>,
    pub semi_axes: na::Vector2<f64>,
    /// Counter-clockwise rotation of the first axis in radians.
    pub angle: f64,
}

/// Computes the confidence ellipse of a 2x2 position covariance.
///
/// The semi-axes come from the eigenvalues of the covariance with the
/// correlation clamped to [-1, 1]. Each one is `sqrt(eigenvalue) *
/// scale`, or 1.0 when it is not a finite number. The rotation angle
/// comes from the correlation term and is 0 when both standard
/// deviations are equal. The first semi-axis lies along the angle.
pub fn uncertainty_ellipse(
    center: na::Point2<f64>,
    covariance: &na::Matrix2<f64>,
    scale: f64,
) -> Ellipse {
    let var_x = covariance[(0, 0)];
    let var_y = covariance[(1, 1)];
    let sigma_x = clamp_negative(var_x).sqrt();
    let sigma_y = clamp_negative(var_y).sqrt();

    let rho = {
        let cov_xy = (covariance[(0, 1)] + covariance[(1, 0)]) / 2.0;
        let rho = cov_xy / (sigma_x * sigma_y);
        if rho.is_finite() {
            rho.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    };
    let cov_xy = match rho * sigma_x * sigma_y {
        cov_xy if cov_xy.is_finite() => cov_xy,
        _ => 0.0,
    };

    let angle = if sigma_x == sigma_y {
        0.0
    } else {
        let angle = 0.5 * (2.0 * cov_xy / (var_x - var_y)).atan();
        if angle.is_finite() {
            angle
        } else {
            0.0
        }
    };

    let (major, minor) = principal_variances(var_x, var_y, cov_xy);

    // Variance along the first axis picks which eigenvalue it gets
    let along = {
        let (sin, cos) = angle.sin_cos();
        var_x * cos * cos + 2.0 * cov_xy * sin * cos + var_y * sin * sin
    };
    let (first, second) = if along - minor >= major - along || along.is_nan() {
        (major, minor)
    } else {
        (minor, major)
    };
    let semi_axes = na::Vector2::new(first, second)
        .map(|var| sanitize_axis(clamp_negative(var).sqrt() * scale.abs()));

    Ellipse {
        center,
        semi_axes,
        angle,
    }
}

/// Eigenvalues of the symmetric matrix `[[xx, xy], [xy, yy]]`, larger
/// first.
fn principal_variances(xx: f64, yy: f64, xy: f64) -> (f64, f64) {
    let mean = (xx + yy) / 2.0;
    let radius = ((xx - yy) / 2.0).hypot(xy);
    (mean + radius, mean - radius)
}

/// Maps negative values to zero and keeps NaN.
fn clamp_negative(val: f64) -> f64 {
    if val < 0.0 {
        0.0
    } else {
        val
    }
}

fn sanitize_axis(axis: f64) -> f64 {
    if axis.is_finite() {
        axis
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    const EPS: f64 = 1e-9;

    fn pose2d(x: f64, y: f64, yaw: f64) -> na::Isometry3<f64> {
        na::Isometry3::new(na::Vector3::new(x, y, 0.0), na::Vector3::z() * yaw)
    }

    #[test]
    fn identity_triangle() {
        let tri = robot_triangle(&na::Isometry3::identity());
        assert_eq!(
            tri,
            [
                na::Point2::new(-8, 4),
                na::Point2::new(-8, -4),
                na::Point2::new(8, 0)
            ]
        );
    }

    #[test]
    fn triangle_follows_pose() {
        let pose = pose2d(100.7, 50.2, 0.0);
        let tri = robot_triangle(&pose);
        assert_eq!(
            tri,
            [
                na::Point2::new(92, 54),
                na::Point2::new(92, 46),
                na::Point2::new(108, 50)
            ]
        );

        let pose = pose2d(10.4, 20.6, 0.3);
        let tri = robot_triangle(&pose);
        for (vertex, [x, y]) in tri.iter().zip(ROBOT_TRIANGLE) {
            let p = pose * na::Point3::new(x, y, 0.0);
            assert_eq!(vertex.x, p.x as i32);
            assert_eq!(vertex.y, p.y as i32);
        }
    }

    #[test]
    fn pixels_truncate_toward_zero() {
        let tri = robot_triangle(&pose2d(10.6, -3.6, 0.0));
        assert_eq!(tri[2], na::Point2::new(18, -3));

        assert_eq!(to_pixel(&na::Point2::new(0.9, -0.9)), na::Point2::new(0, 0));
        assert_eq!(to_pixel(&na::Point2::new(5.99, 7.5)), na::Point2::new(5, 7));
    }

    #[test]
    fn rotated_triangle() {
        let tri = robot_triangle(&pose2d(0.0, 0.0, FRAC_PI_2));
        // tip lands on +y
        assert_eq!(tri[2].x, 0);
        assert!(tri[2].y == 7 || tri[2].y == 8);
    }

    #[test]
    fn axis_aligned_covariance() {
        let cov = na::Matrix2::new(4.0, 0.0, 0.0, 1.0);
        let ellipse = uncertainty_ellipse(na::Point2::new(3.0, 4.0), &cov, 2.0);

        assert_eq!(ellipse.center, na::Point2::new(3.0, 4.0));
        assert!(ellipse.angle.abs() < EPS);
        assert!((ellipse.semi_axes.x - 4.0).abs() < EPS);
        assert!((ellipse.semi_axes.y - 2.0).abs() < EPS);
    }

    #[test]
    fn correlated_covariance_gives_eigenvalues() {
        let cov = na::Matrix2::new(5.0, 2.0, 2.0, 2.0);
        let ellipse = uncertainty_ellipse(na::Point2::origin(), &cov, 1.0);

        let eigen = cov.symmetric_eigen();
        let mut expect: Vec<f64> = eigen.eigenvalues.iter().map(|val| val.sqrt()).collect();
        let mut actual = vec![ellipse.semi_axes.x, ellipse.semi_axes.y];
        expect.sort_by(|a, b| a.partial_cmp(b).unwrap());
        actual.sort_by(|a, b| a.partial_cmp(b).unwrap());

        assert!((expect[0] - actual[0]).abs() < 1e-6);
        assert!((expect[1] - actual[1]).abs() < 1e-6);

        // the first axis points along the major eigenvector
        let major = na::Vector2::new(ellipse.angle.cos(), ellipse.angle.sin());
        let stretched = cov * major;
        assert!((stretched - major * ellipse.semi_axes.x.powi(2)).norm() < 1e-6);
    }

    #[test]
    fn equal_variances_have_zero_angle() {
        let cov = na::Matrix2::new(3.0, 1.0, 1.0, 3.0);
        let ellipse = uncertainty_ellipse(na::Point2::origin(), &cov, 1.0);
        assert_eq!(ellipse.angle, 0.0);

        // eigenvalues are 4 and 2
        assert!((ellipse.semi_axes.x - 2.0).abs() < EPS);
        assert!((ellipse.semi_axes.y - 2f64.sqrt()).abs() < EPS);
    }

    #[test]
    fn axes_continuous_near_equal_variances() {
        let exact = uncertainty_ellipse(
            na::Point2::origin(),
            &na::Matrix2::new(3.0, 1.0, 1.0, 3.0),
            1.0,
        );
        let nudged = uncertainty_ellipse(
            na::Point2::origin(),
            &na::Matrix2::new(3.0 + 1e-9, 1.0, 1.0, 3.0),
            1.0,
        );

        let sorted = |axes: na::Vector2<f64>| (axes.max(), axes.min());
        let (a_major, a_minor) = sorted(exact.semi_axes);
        let (b_major, b_minor) = sorted(nudged.semi_axes);
        assert!((a_major - b_major).abs() < 1e-6);
        assert!((a_minor - b_minor).abs() < 1e-6);
    }

    #[test]
    fn first_axis_follows_angle_when_y_dominates() {
        let cov = na::Matrix2::new(1.0, 0.0, 0.0, 9.0);
        let ellipse = uncertainty_ellipse(na::Point2::origin(), &cov, 1.0);
        assert_eq!(ellipse.angle, 0.0);
        assert!((ellipse.semi_axes.x - 1.0).abs() < EPS);
        assert!((ellipse.semi_axes.y - 3.0).abs() < EPS);
    }

    #[test]
    fn correlation_is_clamped() {
        // |xy| exceeds sqrt(xx * yy)
        let cov = na::Matrix2::new(4.0, 10.0, 10.0, 1.0);
        let ellipse = uncertainty_ellipse(na::Point2::origin(), &cov, 1.0);

        // fully correlated: one axis collapses
        assert!(ellipse.semi_axes.iter().all(|axis| axis.is_finite() && *axis >= 0.0));
        let minor = ellipse.semi_axes.x.min(ellipse.semi_axes.y);
        let major = ellipse.semi_axes.x.max(ellipse.semi_axes.y);
        assert!(minor < 1e-6);
        assert!((major - 5f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn degenerate_covariances_stay_finite() {
        let inputs = [
            na::Matrix2::new(f64::NAN, 0.0, 0.0, 1.0),
            na::Matrix2::new(f64::INFINITY, 1.0, 1.0, 1.0),
            na::Matrix2::new(-1.0, 0.0, 0.0, -2.0),
            na::Matrix2::new(0.0, 0.0, 0.0, 0.0),
            na::Matrix2::new(1.0, f64::NAN, f64::NAN, 2.0),
        ];

        for cov in &inputs {
            let ellipse = uncertainty_ellipse(na::Point2::new(1.0, 1.0), cov, 2.4477);
            assert!(ellipse.angle.is_finite(), "{:?}", cov);
            assert!(
                ellipse
                    .semi_axes
                    .iter()
                    .all(|axis| axis.is_finite() && *axis >= 0.0),
                "{:?}",
                cov
            );
        }

        let nan = uncertainty_ellipse(na::Point2::origin(), &inputs[0], 1.0);
        assert_eq!(nan.semi_axes.x, 1.0);
    }

    #[test]
    fn diagonal_angle() {
        let cov = na::Matrix2::new(2.0, 1.0, 1.0, 1.0);
        let ellipse = uncertainty_ellipse(na::Point2::origin(), &cov, 1.0);
        let expect = 0.5 * 2f64.atan();
        assert!((ellipse.angle - expect).abs() < EPS);
        assert!(ellipse.angle > 0.0 && ellipse.angle < FRAC_PI_4);
    }
}
