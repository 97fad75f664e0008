use crate::covariance::CovarianceImage;
use nalgebra as na;

/// An update received from one of the input streams. Applying an
/// update replaces the stored copy of that stream.
#[derive(Debug, Clone)]
pub enum Update {
    GroundTruth(na::Isometry3<f64>),
    Odometry(na::Isometry3<f64>),
    Estimate(na::Isometry3<f64>),
    World(Landmarks),
    Map(Landmarks),
    Scan(Scan),
    Covariance(CovarianceImage),
}

/// A landmark with an optional 2x2 position covariance.
#[derive(Debug, Clone, PartialEq)]
pub struct Landmark {
    pub id: i32,
    pub position: na::Point2<f64>,
    pub covariance: Option<na::Matrix2<f64>>,
}

impl Landmark {
    pub fn new(id: i32, x: f64, y: f64) -> Self {
        Self {
            id,
            position: na::Point2::new(x, y),
            covariance: None,
        }
    }

    /// Builds a landmark from a flattened `[xx, xy, yx, yy]`
    /// covariance. Any other length means the landmark has no
    /// covariance.
    pub fn with_flat_covariance(id: i32, x: f64, y: f64, covariance: &[f64]) -> Self {
        let covariance = match *covariance {
            [xx, xy, yx, yy] => Some(na::Matrix2::new(xx, xy, yx, yy)),
            _ => None,
        };

        Self {
            id,
            position: na::Point2::new(x, y),
            covariance,
        }
    }

    /// Landmarks still sitting at the origin have not been initialized
    /// by the estimator.
    pub fn is_initialized(&self) -> bool {
        self.position != na::Point2::origin()
    }
}

/// An ordered landmark list. Ids are not assumed to be sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Landmarks {
    pub landmarks: Vec<Landmark>,
}

impl Landmarks {
    pub fn find(&self, id: i32) -> Option<&Landmark> {
        self.landmarks.iter().find(|landmark| landmark.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Landmark> + '_ {
        self.landmarks.iter()
    }
}

impl FromIterator<Landmark> for Landmarks {
    fn from_iter<I: IntoIterator<Item = Landmark>>(iter: I) -> Self {
        Self {
            landmarks: iter.into_iter().collect(),
        }
    }
}

/// A range/bearing observation of a landmark.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub id: i32,
    pub range: f64,
    pub bearing: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scan {
    pub measurements: Vec<Measurement>,
}

impl FromIterator<Measurement> for Scan {
    fn from_iter<I: IntoIterator<Item = Measurement>>(iter: I) -> Self {
        Self {
            measurements: iter.into_iter().collect(),
        }
    }
}

/// Builds a rigid transform from a position and a unit quaternion
/// given in (x, y, z, w) order. A zero quaternion is read as no
/// rotation.
pub fn isometry_from_pose(position: [f64; 3], orientation: [f64; 4]) -> na::Isometry3<f64> {
    let [x, y, z] = position;
    let [qx, qy, qz, qw] = orientation;
    let quaternion = na::Quaternion::new(qw, qx, qy, qz);
    let rotation = na::UnitQuaternion::try_new(quaternion, f64::EPSILON)
        .unwrap_or_else(na::UnitQuaternion::identity);
    na::Isometry3::from_parts(na::Translation3::new(x, y, z), rotation)
}
