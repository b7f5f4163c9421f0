use std::io::{self, BufReader};

use anyhow::Context;
use clap::Parser;

use gesture_mouse::{
    app::{spawn_control_reader, App, Pipeline},
    automation::{Automation, DryRun},
    config::Config,
    dispatch::Dispatcher,
    present::LogPresenter,
    screenshot::ScreenshotSink,
    source::{self, SourceSpec},
};

fn main() -> anyhow::Result<()> {
    gesture_mouse::init_logger!();

    let config = Config::parse();
    log::debug!("{config:?}");

    let source = source::open(&config.source)
        .with_context(|| format!("failed to open landmark source `{}`", config.source))?;
    let (automation, screenshots) = backends(&config)?;
    let dispatcher = Dispatcher::new(automation, screenshots, config.dispatch_options())
        .context("failed to query the screen size")?;

    let presenter = LogPresenter::new();
    presenter.print_help();

    let app = App::new(
        source,
        Pipeline::new(dispatcher),
        presenter,
        config.loop_options(),
    );
    let stop = app.stop_handle();
    ctrlc::set_handler(move || {
        log::info!("interrupted, shutting down");
        stop.stop();
    })
    .context("failed to install Ctrl+C handler")?;

    if config.source == SourceSpec::Stdin {
        log::info!("landmarks are read from stdin, sensitivity can't be adjusted at runtime");
    } else {
        spawn_control_reader(BufReader::new(io::stdin()), app.control_sender())
            .context("failed to spawn control reader")?;
        log::info!("type `+` or `-` and press Enter to adjust the sensitivity");
    }

    log::info!("sensitivity {}", config.dispatch_options().sensitivity);
    app.run().context("failed to start the gesture loop")?;
    Ok(())
}

type Backends = (Box<dyn Automation>, Box<dyn ScreenshotSink>);

#[cfg(feature = "desktop")]
fn backends(config: &Config) -> anyhow::Result<Backends> {
    use gesture_mouse::{
        automation::EnigoAutomation,
        screenshot::{Screenshotter, XcapCapture},
    };

    if config.dry_run {
        return Ok(dry_run());
    }
    let automation = EnigoAutomation::new()?;
    let screenshots = Screenshotter::spawn(XcapCapture, &config.screenshot_dir)
        .context("failed to spawn screenshot worker")?;
    log::info!(
        "saving screenshots to {}",
        config.screenshot_dir.display()
    );
    Ok((Box::new(automation), Box::new(screenshots)))
}

#[cfg(not(feature = "desktop"))]
fn backends(config: &Config) -> anyhow::Result<Backends> {
    if !config.dry_run {
        log::warn!("built without the `desktop` feature, actions will only be logged");
    }
    Ok(dry_run())
}

fn dry_run() -> Backends {
    (Box::new(DryRun::default()), Box::new(DryRun::default()))
}
