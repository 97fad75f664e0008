use noisy_float::prelude::*;
use serde::Deserialize;
use serde_semver::SemverReq;
use std::num::NonZeroUsize;

pub const DEFAULT_MAP_IMAGE_HW: [usize; 2] = [600, 800];
pub const DEFAULT_COVARIANCE_PRESENT_SIZE: usize = 600;
/// sqrt of the 95% quantile of the chi-square distribution with 2 DOF.
pub const DEFAULT_CONFIDENCE_SCALE: f64 = 2.4477;
pub const DEFAULT_FLIP_VERTICAL: bool = true;

#[derive(Debug, Clone, SemverReq)]
#[version("0.1.0")]
pub struct Version;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Config format version.
    pub version: Version,

    /// ROS Namespace.
    pub namespace: String,

    /// Input topic for the ground truth robot pose.
    #[serde(default = "default_ground_truth_topic")]
    pub ground_truth_topic: String,

    /// Input topic for the odometry pose estimate.
    #[serde(default = "default_odom_topic")]
    pub odom_topic: String,

    /// Input topic for the SLAM pose estimate.
    #[serde(default)]
    pub pose_topic: Option<String>,

    /// Input topic for the ground truth landmarks.
    #[serde(default = "default_world_topic")]
    pub world_topic: String,

    /// Input topic for the estimated landmarks with covariances.
    #[serde(default)]
    pub map_topic: Option<String>,

    /// Input topic for landmark measurements.
    #[serde(default)]
    pub scan_topic: Option<String>,

    /// Input topic for the global covariance image.
    #[serde(default)]
    pub covariance_topic: Option<String>,

    /// Title of the map window.
    #[serde(default = "default_map_window")]
    pub map_window: String,

    /// Title of the covariance window.
    #[serde(default = "default_covariance_window")]
    pub covariance_window: String,

    /// Map canvas size in [height, width] order.
    #[serde(default = "default_map_image_hw")]
    pub map_image_hw: [NonZeroUsize; 2],

    /// Side length of the square covariance canvas.
    #[serde(default = "default_covariance_present_size")]
    pub covariance_present_size: NonZeroUsize,

    /// Scale applied to the standard deviations of uncertainty ellipses.
    #[serde(default = "default_confidence_scale")]
    pub confidence_scale: R64,

    /// Flip the map canvas so that +y points up on screen.
    #[serde(default = "default_flip_vertical")]
    pub flip_vertical: bool,

    /// Key polling timeout of the render loop in milliseconds.
    #[serde(default = "default_key_wait_ms")]
    pub key_wait_ms: u64,
}

impl Config {
    pub fn map_image_hw(&self) -> [usize; 2] {
        let [h, w] = self.map_image_hw;
        [h.get(), w.get()]
    }
}

fn default_ground_truth_topic() -> String {
    "ground_truth".into()
}

fn default_odom_topic() -> String {
    "odom".into()
}

fn default_world_topic() -> String {
    "world".into()
}

fn default_map_window() -> String {
    "Simulation".into()
}

fn default_covariance_window() -> String {
    "Covariance".into()
}

fn default_map_image_hw() -> [NonZeroUsize; 2] {
    DEFAULT_MAP_IMAGE_HW.map(|len| NonZeroUsize::new(len).unwrap())
}

fn default_covariance_present_size() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_COVARIANCE_PRESENT_SIZE).unwrap()
}

fn default_confidence_scale() -> R64 {
    r64(DEFAULT_CONFIDENCE_SCALE)
}

fn default_flip_vertical() -> bool {
    DEFAULT_FLIP_VERTICAL
}

fn default_key_wait_ms() -> u64 {
    10
}
