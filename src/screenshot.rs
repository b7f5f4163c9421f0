//! Screen capture on a background thread.
//!
//! Capturing and encoding a full-screen PNG takes far longer than a frame, so it happens on a
//! [`Worker`]. The gesture loop only ever enqueues a request and never waits for the result;
//! failures are logged by the worker.

use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Local};
use image::RgbaImage;

use crate::{automation::DryRun, worker::Worker};

/// Grabs the contents of the screen.
pub trait ScreenCapture {
    fn capture(&mut self) -> anyhow::Result<RgbaImage>;
}

/// Receives screenshot requests from the dispatcher.
///
/// Implementations must not block.
pub trait ScreenshotSink {
    fn request(&mut self);
}

impl<S: ScreenshotSink + ?Sized> ScreenshotSink for Box<S> {
    fn request(&mut self) {
        (**self).request();
    }
}

impl ScreenshotSink for DryRun {
    fn request(&mut self) {
        log::info!("[dry-run] screenshot");
    }
}

/// Returns the file name a screenshot taken at `time` is saved under.
pub fn file_name(time: &DateTime<Local>) -> String {
    format!("screenshot_{}.png", time.format("%Y%m%d-%H%M%S"))
}

fn take_screenshot<C: ScreenCapture>(
    capture: &mut C,
    dir: &Path,
    time: &DateTime<Local>,
) -> anyhow::Result<PathBuf> {
    let image = capture.capture().context("failed to capture the screen")?;
    let path = dir.join(file_name(time));
    image
        .save(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Writes screenshots as PNG files into a directory.
pub struct Screenshotter {
    worker: Worker<DateTime<Local>>,
}

impl Screenshotter {
    /// Spawns the screenshot worker thread.
    ///
    /// At most one request is queued while a capture is running; further requests are dropped.
    pub fn spawn<C>(mut capture: C, dir: impl Into<PathBuf>) -> io::Result<Self>
    where
        C: ScreenCapture + Send + 'static,
    {
        let dir = dir.into();
        let worker = Worker::builder()
            .name("screenshot")
            .capacity(1)
            .spawn(move |time: DateTime<Local>| {
                match take_screenshot(&mut capture, &dir, &time) {
                    Ok(path) => log::info!("screenshot saved as {}", path.display()),
                    Err(e) => log::error!("screenshot failed: {e:#}"),
                }
            })?;
        Ok(Self { worker })
    }
}

impl ScreenshotSink for Screenshotter {
    fn request(&mut self) {
        if self.worker.try_send(Local::now()).is_err() {
            log::warn!("screenshot worker is busy, dropping request");
        }
    }
}

#[cfg(feature = "desktop")]
pub use self::desktop::XcapCapture;

#[cfg(feature = "desktop")]
mod desktop {
    use anyhow::{anyhow, Context};
    use image::RgbaImage;

    use super::ScreenCapture;

    /// Captures the primary monitor.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct XcapCapture;

    impl ScreenCapture for XcapCapture {
        fn capture(&mut self) -> anyhow::Result<RgbaImage> {
            let monitors = xcap::Monitor::all().map_err(|e| anyhow!("{e}"))?;
            let monitor = monitors
                .iter()
                .find(|m| m.is_primary())
                .or_else(|| monitors.first())
                .context("no monitor found")?;
            let shot = monitor.capture_image().map_err(|e| anyhow!("{e}"))?;
            let (width, height) = (shot.width(), shot.height());
            RgbaImage::from_raw(width, height, shot.into_raw())
                .context("captured image has an unexpected size")
        }
    }
}
