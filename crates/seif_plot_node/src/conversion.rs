use anyhow::Result;
use nalgebra as na;
use r2r::{
    geometry_msgs::msg::{Point, Pose, PoseWithCovariance, Quaternion},
    nav_msgs::msg::Odometry,
    seif_msgs::msg as seif_msgs,
    sensor_msgs::msg::Image,
};
use seif_plot::{message::isometry_from_pose, CovarianceImage, Landmark, Landmarks, Measurement};

pub fn odometry_to_pose(odom: &Odometry) -> na::Isometry3<f64> {
    let Odometry {
        pose:
            PoseWithCovariance {
                pose:
                    Pose {
                        position: Point { x, y, z },
                        orientation:
                            Quaternion {
                                x: qx,
                                y: qy,
                                z: qz,
                                w: qw,
                            },
                    },
                ..
            },
        ..
    } = *odom;

    isometry_from_pose([x, y, z], [qx, qy, qz, qw])
}

pub fn world_to_landmarks(world: seif_msgs::World) -> Landmarks {
    world
        .landmarks
        .into_iter()
        .map(|landmark| {
            let seif_msgs::Landmark {
                id,
                x,
                y,
                covariance,
            } = landmark;
            Landmark::with_flat_covariance(id, x, y, &covariance)
        })
        .collect()
}

pub fn scan_to_measurements(scan: seif_msgs::Scan) -> seif_plot::Scan {
    scan.measurements
        .into_iter()
        .map(|meas| {
            let seif_msgs::Measurement { id, range, bearing } = meas;
            Measurement { id, range, bearing }
        })
        .collect()
}

pub fn image_to_covariance(image: &Image) -> Result<CovarianceImage> {
    let Image {
        height,
        width,
        ref encoding,
        is_bigendian,
        step,
        ref data,
        ..
    } = *image;

    CovarianceImage::decode(width, height, encoding, is_bigendian != 0, step, data)
}
