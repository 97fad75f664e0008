use crate::{covariance::GrayCanvas, message::Update, plot::Plot, scene::Scene};
use anyhow::Result;
use flume::TryRecvError;
use log::info;
use std::time::Duration;

pub const ESCAPE_KEY: i32 = 27;

/// The display side of the render loop.
pub trait Frontend {
    /// Shows the map scene and, when available, the covariance canvas.
    fn present(&mut self, scene: &Scene, covariance: Option<&GrayCanvas>) -> Result<()>;

    /// Takes the pointer positions observed on the covariance canvas
    /// since the last call.
    fn pointer_events(&mut self) -> Vec<(i32, i32)>;

    /// Waits for a key press. Returns `None` on timeout.
    fn wait_key(&mut self, timeout: Duration) -> Result<Option<i32>>;
}

pub fn is_exit_key(key: i32) -> bool {
    key & 0xff == ESCAPE_KEY
}

/// Renders, dispatches pending updates and polls the keyboard until
/// Escape is pressed or the update channel is closed.
///
/// Only the latest update of every stream takes effect on a frame
/// because all pending updates are applied before the next render.
pub fn run<F>(
    mut plot: Plot,
    updates: flume::Receiver<Update>,
    mut frontend: F,
    key_wait: Duration,
) -> Result<Plot>
where
    F: Frontend,
{
    loop {
        frontend.present(&plot.scene(), plot.covariance_canvas())?;

        loop {
            match updates.try_recv() {
                Ok(update) => plot.update(update),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    info!("input streams closed");
                    return Ok(plot);
                }
            }
        }

        for (x, y) in frontend.pointer_events() {
            plot.inspect(x, y);
        }

        if let Some(key) = frontend.wait_key(key_wait)? {
            if is_exit_key(key) {
                info!("escape pressed");
                return Ok(plot);
            }
        }
    }
}
