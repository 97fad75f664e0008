//! Display state and rendering logic of the SEIF plot node.
//!
//! The [Plot] keeps the latest copy of every input stream and turns it
//! into a [Scene] on each frame. The [run] loop drives a [Frontend]
//! which does the actual drawing.

pub mod config;
pub mod covariance;
pub mod geometry;
pub mod message;
pub mod plot;
pub mod render_loop;
pub mod scene;

pub use config::Config;
pub use covariance::{CovarianceImage, GrayCanvas};
pub use message::{Landmark, Landmarks, Measurement, Scan, Update};
pub use plot::{Plot, PlotParams};
pub use render_loop::{is_exit_key, run, Frontend, ESCAPE_KEY};
pub use scene::{Primitive, Scene};
