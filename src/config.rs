//! Command-line and environment configuration.

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::{
    app::LoopOptions,
    cooldown::CooldownDurations,
    dispatch::{DispatchOptions, Sensitivity},
    source::SourceSpec,
};

/// Control the mouse pointer with hand gestures.
///
/// Hand landmarks are read as JSON lines from the configured source, one frame per line.
#[derive(Parser, Debug, Clone)]
#[command(name = "gesture-mouse", version, about, long_about = None)]
pub struct Config {
    /// Where to read landmark frames from: `-` for stdin, `cmd:<command>` to spawn a detector
    /// process, or a file path.
    #[arg(short, long, env = "GESTURE_MOUSE_SOURCE", default_value = "-")]
    pub source: SourceSpec,

    /// Factor between hand and cursor motion (clamped to 1.0..=5.0).
    #[arg(long, env = "GESTURE_MOUSE_SENSITIVITY", default_value_t = 2.2)]
    pub sensitivity: f32,

    /// Units scrolled per scroll gesture.
    #[arg(long, default_value_t = 150)]
    pub scroll_amount: i32,

    /// Cooldown of left and right clicks, in seconds.
    #[arg(long, value_name = "SECS", value_parser = parse_secs, default_value = "1")]
    pub click_cooldown: Duration,

    /// Cooldown of double clicks, in seconds.
    #[arg(long, value_name = "SECS", value_parser = parse_secs, default_value = "1")]
    pub double_click_cooldown: Duration,

    /// Cooldown of scrolling, in seconds.
    #[arg(long, value_name = "SECS", value_parser = parse_secs, default_value = "3")]
    pub scroll_cooldown: Duration,

    /// Cooldown of screenshots, in seconds.
    #[arg(long, value_name = "SECS", value_parser = parse_secs, default_value = "3")]
    pub screenshot_cooldown: Duration,

    /// Directory screenshots are written to.
    #[arg(long, env = "GESTURE_MOUSE_SCREENSHOT_DIR", default_value = ".")]
    pub screenshot_dir: PathBuf,

    /// Pause after each frame, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 10)]
    pub frame_interval: u64,

    /// Pause after a frame could not be read, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    pub retry_interval: u64,

    /// Log actions instead of performing them.
    #[arg(long)]
    pub dry_run: bool,
}

/// Longest accepted cooldown.
const MAX_COOLDOWN: Duration = Duration::from_secs(60 * 60);

fn parse_secs(s: &str) -> Result<Duration, String> {
    let secs: f32 = s.parse().map_err(|e| format!("{e}"))?;
    let duration =
        Duration::try_from_secs_f32(secs).map_err(|e| format!("invalid duration `{s}`: {e}"))?;
    if duration > MAX_COOLDOWN {
        return Err(format!(
            "cooldown must not exceed {} seconds",
            MAX_COOLDOWN.as_secs()
        ));
    }
    Ok(duration)
}

impl Config {
    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            sensitivity: Sensitivity::new(self.sensitivity),
            cooldowns: CooldownDurations {
                click: self.click_cooldown,
                double_click: self.double_click_cooldown,
                scroll: self.scroll_cooldown,
                screenshot: self.screenshot_cooldown,
            },
            scroll_amount: self.scroll_amount,
        }
    }

    pub fn loop_options(&self) -> LoopOptions {
        LoopOptions {
            frame_interval: Duration::from_millis(self.frame_interval),
            retry_interval: Duration::from_millis(self.retry_interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::try_parse_from(std::iter::once("gesture-mouse").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_match_builtin_options() {
        let config = parse(&["--source", "-"]).unwrap();
        assert_eq!(config.source, SourceSpec::Stdin);
        assert_eq!(config.dispatch_options(), DispatchOptions::default());
        assert_eq!(config.loop_options(), LoopOptions::default());
        assert!(!config.dry_run);
    }

    #[test]
    fn overrides() {
        let config = parse(&[
            "--source",
            "cmd:detect-hands --camera 0",
            "--sensitivity",
            "9",
            "--scroll-cooldown",
            "0.5",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(
            config.source,
            SourceSpec::Command("detect-hands --camera 0".into())
        );
        let options = config.dispatch_options();
        assert_eq!(options.sensitivity.get(), Sensitivity::MAX);
        assert_eq!(options.cooldowns.scroll, Duration::from_millis(500));
        assert!(config.dry_run);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse(&["--source", ""]).is_err());
        assert!(parse(&["--click-cooldown", "-1"]).is_err());
        assert!(parse(&["--click-cooldown", "soon"]).is_err());
        assert!(parse(&["--click-cooldown", "1e19"]).is_err());
        assert!(parse(&["--screenshot-cooldown", "3601"]).is_err());
        assert!(parse(&["--screenshot-cooldown", "3600"]).is_ok());
    }
}
