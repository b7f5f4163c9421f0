//! The per-frame gesture loop.

use std::{
    fmt,
    io::{self, BufRead},
    panic::resume_unwind,
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crossbeam::channel::{Receiver, Sender};

use crate::{
    automation::Automation,
    dispatch::{Dispatcher, Sensitivity},
    gesture::classify,
    hand::{fingers::FingerState, identity::HandednessConfirmer},
    present::{FrameStatus, Presenter, StatusBoard, StatusLabel},
    screenshot::ScreenshotSink,
    source::{Frame, FrameError, LandmarkSource},
    timer::{FpsCounter, Timer},
};

/// Processes frames from hand detection to action.
///
/// Frames are processed strictly one after another; all state lives here and in the contained
/// [`Dispatcher`].
pub struct Pipeline<A, S> {
    confirmer: HandednessConfirmer,
    dispatcher: Dispatcher<A, S>,
    status: StatusBoard,
    t_classify: Timer,
    t_dispatch: Timer,
}

impl<A: Automation, S: ScreenshotSink> Pipeline<A, S> {
    pub fn new(dispatcher: Dispatcher<A, S>) -> Self {
        Self {
            confirmer: HandednessConfirmer::new(),
            dispatcher,
            status: StatusBoard::new(),
            t_classify: Timer::new("classify"),
            t_dispatch: Timer::new("dispatch"),
        }
    }

    /// Classifies `frame` and performs the resulting action.
    ///
    /// Errors come from the OS automation backend. The frame's effect on gesture state is kept
    /// even when that happens.
    pub fn process(&mut self, frame: &Frame, now: Instant) -> anyhow::Result<FrameStatus> {
        let (gesture, landmarks) = match &frame.hand {
            Some(hand) => {
                let gesture = self.t_classify.time(|| {
                    let handedness = self.confirmer.observe(hand.handedness);
                    let fingers = FingerState::from_landmarks(&hand.landmarks, handedness);
                    let gesture = classify(fingers);
                    log::trace!("{handedness} hand, fingers {fingers} -> {gesture:?}");
                    gesture
                });
                (gesture, Some(&hand.landmarks))
            }
            None => (None, None),
        };

        let performed = self
            .t_dispatch
            .time(|| self.dispatcher.dispatch(gesture, landmarks, now))?;
        Ok(self
            .status
            .update(performed, self.dispatcher.indicator(), now))
    }

    /// Records that the current frame could not be processed.
    pub fn frame_failed(&mut self, label: StatusLabel, now: Instant) -> FrameStatus {
        self.status
            .set_transient(label, self.dispatcher.indicator(), now)
    }

    /// Applies a user adjustment and returns the new sensitivity.
    pub fn control(&mut self, control: Control) -> Sensitivity {
        let sensitivity = self.dispatcher.sensitivity_mut();
        match control {
            Control::IncreaseSensitivity => sensitivity.increment(),
            Control::DecreaseSensitivity => sensitivity.decrement(),
        }
        log::info!("sensitivity {sensitivity}");
        *sensitivity
    }

    pub fn confirmer(&self) -> &HandednessConfirmer {
        &self.confirmer
    }

    pub fn dispatcher(&self) -> &Dispatcher<A, S> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<A, S> {
        &mut self.dispatcher
    }

    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        [&self.t_classify, &self.t_dispatch].into_iter()
    }
}

/// A user adjustment made while the loop is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    IncreaseSensitivity,
    DecreaseSensitivity,
}

impl FromStr for Control {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" | "up" => Ok(Control::IncreaseSensitivity),
            "-" | "down" => Ok(Control::DecreaseSensitivity),
            _ => Err(format!("unknown control `{s}`, expected `+` or `-`")),
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::IncreaseSensitivity => f.write_str("+"),
            Control::DecreaseSensitivity => f.write_str("-"),
        }
    }
}

/// Spawns a thread that parses one [`Control`] per line of `reader` and sends it to `controls`.
///
/// The thread exits at the end of input or once the receiving loop is gone.
pub fn spawn_control_reader<R>(reader: R, controls: Sender<Control>) -> io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("controls".into())
        .spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        log::warn!("failed to read controls: {e}");
                        break;
                    }
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match line.parse() {
                    Ok(control) => {
                        if controls.send(control).is_err() {
                            break;
                        }
                    }
                    Err(e) => log::warn!("{e}"),
                }
            }
        })
}

/// Requests the gesture loop to stop.
///
/// Stopping takes effect immediately, even while the loop waits for the next frame. A frame that
/// is read after the request is discarded.
#[derive(Debug, Clone)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
    wake: Sender<()>,
    woken: Receiver<()>,
}

impl Default for StopHandle {
    fn default() -> Self {
        let (wake, woken) = crossbeam::channel::bounded(1);
        Self {
            stopped: Arc::new(AtomicBool::new(false)),
            wake,
            woken,
        }
    }
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.wake.try_send(()).ok();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Blocks for up to `timeout` and returns whether a stop was requested.
    pub fn wait(&self, timeout: Duration) -> bool {
        if self.is_stopped() {
            return true;
        }
        self.woken.recv_timeout(timeout).ok();
        self.is_stopped()
    }
}

/// Pacing of the gesture loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopOptions {
    /// Pause after each processed frame.
    pub frame_interval: Duration,
    /// Pause after a frame could not be read.
    pub retry_interval: Duration,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(10),
            retry_interval: Duration::from_millis(1000),
        }
    }
}

type ReadResult = Result<Option<Frame>, FrameError>;

enum Event {
    Stop,
    Control(Option<Control>),
    Frame(ReadResult),
    ReaderExited,
}

/// The running application: a landmark source feeding the [`Pipeline`].
pub struct App<L, A, S, P> {
    source: L,
    pipeline: Pipeline<A, S>,
    presenter: P,
    options: LoopOptions,
    stop: StopHandle,
    control_tx: Sender<Control>,
    control_rx: Receiver<Control>,
}

impl<L, A, S, P> App<L, A, S, P>
where
    L: LandmarkSource + Send + 'static,
    A: Automation,
    S: ScreenshotSink,
    P: Presenter,
{
    pub fn new(source: L, pipeline: Pipeline<A, S>, presenter: P, options: LoopOptions) -> Self {
        let (control_tx, control_rx) = crossbeam::channel::unbounded();
        Self {
            source,
            pipeline,
            presenter,
            options,
            stop: StopHandle::new(),
            control_tx,
            control_rx,
        }
    }

    /// Returns a handle that can stop [`App::run`] from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Returns a sender for adjustments that are applied between frames.
    pub fn control_sender(&self) -> Sender<Control> {
        self.control_tx.clone()
    }

    /// Runs the loop until stopped or until the source runs out of frames.
    ///
    /// Frames are read on a separate thread, so that a stop request is honored even while the
    /// source blocks. Per-frame failures are logged and shown to the user, but never end the loop.
    ///
    /// If the source is still blocked in a read when the loop stops, it is released by the reader
    /// thread once that read returns.
    ///
    /// # Panics
    ///
    /// Panics raised by the source are propagated to the caller.
    pub fn run(self) -> io::Result<Pipeline<A, S>> {
        let Self {
            source,
            mut pipeline,
            mut presenter,
            options,
            stop,
            // Held so that `control_rx` never disconnects.
            control_tx: _control_tx,
            control_rx,
        } = self;

        if stop.is_stopped() {
            return Ok(pipeline);
        }
        let (frames, reader) = spawn_reader(source)?;

        let mut fps = FpsCounter::new("gesture loop");
        loop {
            let event = crossbeam::select! {
                recv(stop.woken) -> _ => Event::Stop,
                recv(control_rx) -> control => Event::Control(control.ok()),
                recv(frames) -> frame => frame.map_or(Event::ReaderExited, Event::Frame),
            };
            // The stop request may have raced with a frame that was read in the meantime.
            if stop.is_stopped() {
                break;
            }

            let delay = match event {
                Event::Stop => break,
                Event::Control(control) => {
                    if let Some(control) = control {
                        pipeline.control(control);
                    }
                    continue;
                }
                Event::Frame(Ok(Some(frame))) => {
                    let now = Instant::now();
                    let status = match pipeline.process(&frame, now) {
                        Ok(status) => status,
                        Err(e) => {
                            log::error!("failed to process frame: {e:#}");
                            pipeline.frame_failed(StatusLabel::Error, now)
                        }
                    };
                    let hand = frame.hand.as_ref().map(|hand| &hand.landmarks);
                    presenter.present(&status, hand);
                    options.frame_interval
                }
                Event::Frame(Ok(None)) => {
                    log::info!("landmark source exhausted");
                    break;
                }
                Event::Frame(Err(e)) => {
                    log::warn!("{:#}", anyhow::Error::from(e));
                    let status =
                        pipeline.frame_failed(StatusLabel::SourceUnavailable, Instant::now());
                    presenter.present(&status, None);
                    options.retry_interval
                }
                Event::ReaderExited => {
                    if let Err(payload) = reader.join() {
                        resume_unwind(payload);
                    }
                    break;
                }
            };

            fps.tick_with(pipeline.timers());
            if stop.wait(delay) {
                break;
            }
        }

        log::debug!("gesture loop stopped");
        Ok(pipeline)
    }
}

/// Reads frames from `source` on a background thread.
///
/// The channel has no buffer, so at most one frame is read ahead of the loop. The thread exits
/// after the source is exhausted or when the receiver is dropped.
fn spawn_reader<L>(mut source: L) -> io::Result<(Receiver<ReadResult>, JoinHandle<()>)>
where
    L: LandmarkSource + Send + 'static,
{
    let (sender, recv) = crossbeam::channel::bounded(0);
    let handle = thread::Builder::new()
        .name("landmark reader".into())
        .spawn(move || loop {
            let result = source.read_frame();
            let exhausted = matches!(result, Ok(None));
            if sender.send(result).is_err() || exhausted {
                break;
            }
        })?;
    Ok((recv, handle))
}
