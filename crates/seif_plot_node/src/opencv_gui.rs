use anyhow::Result;
use nalgebra as na;
use opencv::{
    core::{self, Point, Scalar, Size, Vector, CV_8UC3},
    highgui,
    imgproc::{self, COLOR_GRAY2BGR, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
};
use r2r::log_warn;
use seif_plot::{
    geometry::to_pixel,
    scene::{colors, Color},
    Config, Frontend, GrayCanvas, Primitive, Scene,
};
use std::time::Duration;

/// Draws the map and the covariance canvas into two HighGUI windows.
/// The windows live as long as the frontend and must be used from the
/// thread that created them.
pub struct OpencvFrontend {
    map_window: String,
    covariance_window: String,
    pointer_rx: flume::Receiver<(i32, i32)>,
}

impl OpencvFrontend {
    pub fn new(config: &Config) -> Result<Self> {
        let Config {
            map_window,
            covariance_window,
            ..
        } = config;

        highgui::named_window(map_window, highgui::WINDOW_AUTOSIZE)?;
        highgui::named_window(covariance_window, highgui::WINDOW_AUTOSIZE)?;

        // Forward pointer moves to the render loop
        let (pointer_tx, pointer_rx) = flume::unbounded();
        highgui::set_mouse_callback(
            covariance_window,
            Some(Box::new(move |event: i32, x: i32, y: i32, _flags: i32| {
                if event == highgui::EVENT_MOUSEMOVE {
                    let _ = pointer_tx.send((x, y));
                }
            })),
        )?;

        Ok(Self {
            map_window: map_window.clone(),
            covariance_window: covariance_window.clone(),
            pointer_rx,
        })
    }
}

impl Frontend for OpencvFrontend {
    fn present(&mut self, scene: &Scene, covariance: Option<&GrayCanvas>) -> Result<()> {
        let canvas = draw_scene(scene)?;
        highgui::imshow(&self.map_window, &canvas)?;

        if let Some(covariance) = covariance {
            let canvas = gray_to_bgr(covariance)?;
            highgui::imshow(&self.covariance_window, &canvas)?;
        }

        Ok(())
    }

    fn pointer_events(&mut self) -> Vec<(i32, i32)> {
        self.pointer_rx.try_iter().collect()
    }

    fn wait_key(&mut self, timeout: Duration) -> Result<Option<i32>> {
        // wait_key(0) blocks forever
        let millis = timeout.as_millis().clamp(1, i32::MAX as u128) as i32;
        let key = highgui::wait_key(millis)?;
        Ok((key >= 0).then_some(key))
    }
}

impl Drop for OpencvFrontend {
    fn drop(&mut self) {
        for window in [&self.map_window, &self.covariance_window] {
            if let Err(err) = highgui::destroy_window(window) {
                log_warn!(
                    env!("CARGO_PKG_NAME"),
                    "unable to close window '{}': {}",
                    window,
                    err
                );
            }
        }
    }
}

fn draw_scene(scene: &Scene) -> Result<Mat> {
    let [h, w] = scene.image_hw;
    let mut canvas =
        Mat::new_rows_cols_with_default(h as i32, w as i32, CV_8UC3, Scalar::all(0.0))?;

    for prim in &scene.primitives {
        match *prim {
            Primitive::Line { from, to, color } => {
                imgproc::line(
                    &mut canvas,
                    to_cv_point(&from),
                    to_cv_point(&to),
                    to_scalar(color),
                    1, // thickness
                    LINE_8,
                    0, // shift
                )?;
            }
            Primitive::FilledTriangle { vertices, color } => {
                let points: Vector<Point> = vertices.iter().map(to_cv_point).collect();
                imgproc::fill_convex_poly(&mut canvas, &points, to_scalar(color), LINE_8, 0)?;
            }
            Primitive::Dot { center, color } => {
                imgproc::circle(
                    &mut canvas,
                    to_cv_point(&center),
                    0, // radius
                    to_scalar(color),
                    1, // thickness
                    LINE_8,
                    0, // shift
                )?;
            }
            Primitive::Ellipse { ellipse, color } => {
                let center = to_pixel(&ellipse.center);
                let axes = Size::new(
                    ellipse.semi_axes.x.round() as i32,
                    ellipse.semi_axes.y.round() as i32,
                );
                imgproc::ellipse(
                    &mut canvas,
                    to_cv_point(&center),
                    axes,
                    ellipse.angle.to_degrees(),
                    0.0,   // start angle
                    360.0, // end angle
                    to_scalar(color),
                    1, // thickness
                    LINE_8,
                    0, // shift
                )?;
            }
        }
    }

    // Stored frame has +y up
    let mut canvas = if scene.flip_vertical {
        let mut out = Mat::default();
        core::flip(&canvas, &mut out, 0)?;
        out
    } else {
        canvas
    };

    if let Some(text) = &scene.overlay {
        imgproc::put_text(
            &mut canvas,
            text,
            Point::new(10, 20),
            FONT_HERSHEY_SIMPLEX,
            0.5, // font scale
            to_scalar(colors::overlay_text()),
            1, // thickness
            LINE_8,
            false,
        )?;
    }

    Ok(canvas)
}

fn gray_to_bgr(canvas: &GrayCanvas) -> Result<Mat> {
    let gray = Mat::from_slice(canvas.pixels())?;
    let gray = gray.reshape(1, canvas.size() as i32)?;
    let mut out = Mat::default();
    imgproc::cvt_color(&gray, &mut out, COLOR_GRAY2BGR, 0)?;
    Ok(out)
}

fn to_cv_point(point: &na::Point2<i32>) -> Point {
    Point::new(point.x, point.y)
}

fn to_scalar(color: Color) -> Scalar {
    let (r, g, b) = color.into_components();
    Scalar::new(b as f64, g as f64, r as f64, 0.0)
}
