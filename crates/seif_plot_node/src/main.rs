mod conversion;
mod logger;
mod opencv_gui;

use crate::opencv_gui::OpencvFrontend;
use anyhow::Result;
use async_std::task::spawn_blocking;
use clap::Parser;
use futures::{future, prelude::*, stream::BoxStream};
use r2r::{
    log_info, log_warn, nav_msgs::msg::Odometry, seif_msgs::msg as seif_msgs,
    sensor_msgs::msg::Image, Context, Node, QosProfile,
};
use seif_plot::{Config, Plot, PlotParams, Update};
use serde_loader::Json5Path;
use std::{path::PathBuf, time::Duration};

/// The type defines the program arguments.
#[derive(Parser)]
struct Opts {
    #[clap(long)]
    pub config: PathBuf,
}

#[async_std::main]
async fn main() -> Result<()> {
    // Parse program arguments.
    let opts = Opts::parse();

    // Load the configuration file.
    let config: Config = Json5Path::open_and_take(&opts.config)?;
    logger::init()?;

    // Create a ROS node.
    let ctx = Context::create()?;
    let mut node = Node::create(ctx, env!("CARGO_PKG_NAME"), &config.namespace)?;

    // Create ROS subscriptions. Only the latest sample of each topic
    // is of interest.
    let input_stream = subscribe_all(&mut node, &config)?;

    // Forward input messages to the GUI thread
    let (update_tx, update_rx) = flume::unbounded();
    let forward_future = input_stream
        .map(Ok)
        .forward(update_tx.into_sink())
        .map(|_result| ());

    // Start OpenCV GUI
    let gui_future = spawn_blocking({
        let config = config.clone();
        move || {
            let frontend = OpencvFrontend::new(&config)?;
            let plot = Plot::new(PlotParams::from(&config));
            let key_wait = Duration::from_millis(config.key_wait_ms);
            seif_plot::run(plot, update_rx, frontend, key_wait)?;
            anyhow::Ok(())
        }
    });

    // Create a future to spin the ROS node
    let spin_future = spawn_blocking(move || loop {
        node.spin_once(Duration::from_millis(100));
    });

    // The program ends when the GUI is closed
    let join = future::join(forward_future, spin_future);
    futures::select! {
        result = gui_future.fuse() => {
            result?;
        }
        _ = join.fuse() => {}
    };

    log_info!(env!("CARGO_PKG_NAME"), "shutdown");
    Ok(())
}

/// Subscribes every configured topic and merges the converted messages
/// into one stream.
fn subscribe_all(node: &mut Node, config: &Config) -> Result<BoxStream<'static, Update>> {
    let Config {
        ground_truth_topic,
        odom_topic,
        pose_topic,
        world_topic,
        map_topic,
        scan_topic,
        covariance_topic,
        ..
    } = config;
    let qos = || QosProfile::default().keep_last(1);
    let mut streams: Vec<BoxStream<'static, Update>> = vec![];

    log_info!(
        env!("CARGO_PKG_NAME"),
        "Subscribe ground truth pose from {}",
        ground_truth_topic
    );
    streams.push(
        node.subscribe::<Odometry>(ground_truth_topic, qos())?
            .map(|odom| Update::GroundTruth(conversion::odometry_to_pose(&odom)))
            .boxed(),
    );

    log_info!(
        env!("CARGO_PKG_NAME"),
        "Subscribe odometry pose from {}",
        odom_topic
    );
    streams.push(
        node.subscribe::<Odometry>(odom_topic, qos())?
            .map(|odom| Update::Odometry(conversion::odometry_to_pose(&odom)))
            .boxed(),
    );

    if let Some(topic) = pose_topic {
        log_info!(
            env!("CARGO_PKG_NAME"),
            "Subscribe estimated pose from {}",
            topic
        );
        streams.push(
            node.subscribe::<Odometry>(topic, qos())?
                .map(|odom| Update::Estimate(conversion::odometry_to_pose(&odom)))
                .boxed(),
        );
    }

    log_info!(
        env!("CARGO_PKG_NAME"),
        "Subscribe world landmarks from {}",
        world_topic
    );
    streams.push(
        node.subscribe::<seif_msgs::World>(world_topic, qos())?
            .map(|world| Update::World(conversion::world_to_landmarks(world)))
            .boxed(),
    );

    if let Some(topic) = map_topic {
        log_info!(
            env!("CARGO_PKG_NAME"),
            "Subscribe estimated landmarks from {}",
            topic
        );
        streams.push(
            node.subscribe::<seif_msgs::World>(topic, qos())?
                .map(|map| Update::Map(conversion::world_to_landmarks(map)))
                .boxed(),
        );
    }

    if let Some(topic) = scan_topic {
        log_info!(env!("CARGO_PKG_NAME"), "Subscribe scans from {}", topic);
        streams.push(
            node.subscribe::<seif_msgs::Scan>(topic, qos())?
                .map(|scan| Update::Scan(conversion::scan_to_measurements(scan)))
                .boxed(),
        );
    }

    if let Some(topic) = covariance_topic {
        log_info!(
            env!("CARGO_PKG_NAME"),
            "Subscribe covariance image from {}",
            topic
        );
        streams.push(
            node.subscribe::<Image>(topic, qos())?
                .filter_map(|image| async move {
                    match conversion::image_to_covariance(&image) {
                        Ok(image) => Some(Update::Covariance(image)),
                        Err(err) => {
                            log_warn!(
                                env!("CARGO_PKG_NAME"),
                                "invalid covariance image: {}",
                                err
                            );
                            None
                        }
                    }
                })
                .boxed(),
        );
    }

    Ok(futures::stream::select_all(streams).boxed())
}
