//! Hand gesture mouse control.
//!
//! Hand landmarks produced by an external vision process are turned into mouse actions: moving
//! the cursor, clicking, scrolling and taking screenshots. The processing of each frame is
//! strictly sequential:
//!
//! 1. [`hand::identity`] smooths the reported handedness.
//! 2. [`hand::fingers`] decides which fingers are extended.
//! 3. [`gesture`] maps the finger pattern to a [`gesture::Gesture`].
//! 4. [`dispatch`] performs the action, subject to the [`cooldown`] timers.
//!
//! # Coordinates
//!
//! Landmarks use normalized image coordinates: X points to the right, Y points *down*, and both
//! are nominally in `[0, 1]`. Cursor and screen coordinates are in pixels.
//!
//! # Environment Variables
//!
//! Some options can also be set through the environment:
//!
//! * `GESTURE_MOUSE_SOURCE`: where landmarks are read from. `-` reads from *stdin*,
//!   `cmd:<command>` spawns a vision process and reads its *stdout*, anything else is a file path.
//! * `GESTURE_MOUSE_SENSITIVITY`: cursor sensitivity between 1.0 and 5.0.
//! * `GESTURE_MOUSE_SCREENSHOT_DIR`: directory screenshots are written to.
//! * `RUST_LOG`: overrides the log filter set up by [`init_logger!`].

use log::LevelFilter;

pub mod app;
pub mod automation;
pub mod config;
pub mod cooldown;
pub mod dispatch;
pub mod gesture;
pub mod hand;
pub mod present;
pub mod screenshot;
pub mod source;
pub mod timer;
pub mod worker;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_CRATE_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and this crate log at *debug* level, everything else at *info*. `RUST_LOG`
/// is applied on top.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
