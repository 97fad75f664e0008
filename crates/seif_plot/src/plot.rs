use crate::{
    config::{
        Config, DEFAULT_CONFIDENCE_SCALE, DEFAULT_COVARIANCE_PRESENT_SIZE, DEFAULT_FLIP_VERTICAL,
        DEFAULT_MAP_IMAGE_HW,
    },
    covariance::{CovarianceImage, GrayCanvas},
    geometry::{robot_triangle, to_pixel, uncertainty_ellipse},
    message::{Landmarks, Scan, Update},
    scene::{colors, Primitive, Scene},
};
use log::trace;
use nalgebra as na;

/// Rendering parameters of a [Plot].
#[derive(Debug, Clone)]
pub struct PlotParams {
    /// Map canvas size in [height, width] order.
    pub map_image_hw: [usize; 2],
    pub covariance_present_size: usize,
    pub confidence_scale: f64,
    pub flip_vertical: bool,
}

impl Default for PlotParams {
    fn default() -> Self {
        Self {
            map_image_hw: DEFAULT_MAP_IMAGE_HW,
            covariance_present_size: DEFAULT_COVARIANCE_PRESENT_SIZE,
            confidence_scale: DEFAULT_CONFIDENCE_SCALE,
            flip_vertical: DEFAULT_FLIP_VERTICAL,
        }
    }
}

impl From<&Config> for PlotParams {
    fn from(config: &Config) -> Self {
        Self {
            map_image_hw: config.map_image_hw(),
            covariance_present_size: config.covariance_present_size.get(),
            confidence_scale: config.confidence_scale.raw(),
            flip_vertical: config.flip_vertical,
        }
    }
}

/// The latest received copy of every input stream.
#[derive(Debug, Default)]
pub struct Plot {
    params: PlotParams,
    ground_truth: Option<na::Isometry3<f64>>,
    odometry: Option<na::Isometry3<f64>>,
    estimate: Option<na::Isometry3<f64>>,
    world: Landmarks,
    map: Landmarks,
    scan: Scan,
    covariance: Option<(CovarianceImage, GrayCanvas)>,
    inspection: Option<String>,
}

impl Plot {
    pub fn new(params: PlotParams) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// Replaces the stored copy of the stream the update belongs to.
    pub fn update(&mut self, update: Update) {
        match update {
            Update::GroundTruth(pose) => self.ground_truth = Some(pose),
            Update::Odometry(pose) => self.odometry = Some(pose),
            Update::Estimate(pose) => self.estimate = Some(pose),
            Update::World(world) => self.world = world,
            Update::Map(map) => self.map = map,
            Update::Scan(scan) => self.scan = scan,
            Update::Covariance(image) => {
                let canvas = image.render(self.params.covariance_present_size);
                self.covariance = Some((image, canvas));
            }
        }
    }

    /// The covariance canvas, once an image has been received.
    pub fn covariance_canvas(&self) -> Option<&GrayCanvas> {
        self.covariance.as_ref().map(|(_, canvas)| canvas)
    }

    /// The text produced by the last [inspect](Self::inspect) call.
    pub fn inspection(&self) -> Option<&str> {
        self.inspection.as_deref()
    }

    /// Looks up the raw covariance value under a pointer on the
    /// covariance canvas. The readout is cleared when the pointer is off
    /// the canvas.
    pub fn inspect(&mut self, x: i32, y: i32) {
        let size = self.params.covariance_present_size;
        self.inspection = self.covariance.as_ref().and_then(|(image, _)| {
            let (col, row) = image.canvas_to_image(x, y, size)?;
            let value = image.get(col, row)?;
            Some(format!("({}, {}) {:.6}", col, row, value))
        });
    }

    /// Builds the map canvas for the current state.
    pub fn scene(&self) -> Scene {
        let mut primitives = vec![];

        // Sight lines from the true robot position to observed landmarks
        if let Some(ground_truth) = &self.ground_truth {
            let robot = to_pixel(&na::Point2::from(ground_truth.translation.vector.xy()));

            for meas in &self.scan.measurements {
                match self.world.find(meas.id) {
                    Some(landmark) => primitives.push(Primitive::Line {
                        from: robot,
                        to: to_pixel(&landmark.position),
                        color: colors::sight_line(),
                    }),
                    None => trace!("scan refers to unknown landmark {}", meas.id),
                }
            }
        }

        // Robot poses. Ground truth is painted last.
        let poses = [
            (&self.odometry, colors::odometry()),
            (&self.estimate, colors::estimate()),
            (&self.ground_truth, colors::ground_truth()),
        ];
        primitives.extend(poses.into_iter().filter_map(|(pose, color)| {
            let pose = pose.as_ref()?;
            Some(Primitive::FilledTriangle {
                vertices: robot_triangle(pose),
                color,
            })
        }));

        // True landmarks
        primitives.extend(self.world.iter().map(|landmark| Primitive::Dot {
            center: to_pixel(&landmark.position),
            color: colors::landmark(),
        }));

        // Uncertainty of estimated landmarks
        primitives.extend(
            self.map
                .iter()
                .filter(|landmark| landmark.is_initialized())
                .filter_map(|landmark| {
                    let covariance = landmark.covariance.as_ref()?;
                    let ellipse = uncertainty_ellipse(
                        landmark.position,
                        covariance,
                        self.params.confidence_scale,
                    );
                    Some(Primitive::Ellipse {
                        ellipse,
                        color: colors::uncertainty(),
                    })
                }),
        );

        Scene {
            image_hw: self.params.map_image_hw,
            primitives,
            flip_vertical: self.params.flip_vertical,
            overlay: self.inspection.clone(),
        }
    }
}
