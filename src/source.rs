//! Hand landmarks from an external vision process.
//!
//! Landmark detection is not done in-process. Instead, a detector (for example a MediaPipe Hands
//! script reading the webcam) writes one JSON object per camera frame:
//!
//! ```json
//! {"hands": [{"handedness": "Right", "landmarks": [[0.51, 0.87], [0.47, 0.82], ...]}]}
//! ```
//!
//! `landmarks` holds the 21 landmarks in [`LandmarkIdx`] order, either as `[x, y]` / `[x, y, z]`
//! arrays or as `{"x": .., "y": ..}` objects, in normalized image coordinates. An empty `hands`
//! array means that no hand was found. Only the first hand is used.
//!
//! [`LandmarkIdx`]: crate::hand::landmark::LandmarkIdx

use std::{
    fmt,
    fs::File,
    io::{self, BufRead, BufReader},
    path::PathBuf,
    process::{Child, ChildStdout, Command, Stdio},
    str::FromStr,
};

use anyhow::Context;
use serde::Deserialize;

use crate::hand::landmark::{HandLandmarks, Handedness};

/// A hand found in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedHand {
    pub handedness: Handedness,
    pub landmarks: HandLandmarks,
}

/// Detection results for one camera frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub hand: Option<DetectedHand>,
}

/// A frame could not be read. The next read may succeed.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("failed to read from landmark source")]
    Io(#[from] io::Error),
    #[error("line {line}: malformed frame")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line}: expected {expected} landmarks, got {got}")]
    LandmarkCount {
        line: usize,
        expected: usize,
        got: usize,
    },
}

/// A producer of per-frame hand detections.
pub trait LandmarkSource {
    /// Reads the next frame, blocking until it is available.
    ///
    /// Returns `Ok(None)` once the source is exhausted.
    fn read_frame(&mut self) -> Result<Option<Frame>, FrameError>;
}

impl<S: LandmarkSource + ?Sized> LandmarkSource for Box<S> {
    fn read_frame(&mut self) -> Result<Option<Frame>, FrameError> {
        (**self).read_frame()
    }
}

#[derive(Deserialize)]
struct RawFrame {
    #[serde(default)]
    hands: Vec<RawHand>,
}

#[derive(Deserialize)]
struct RawHand {
    #[serde(alias = "label")]
    handedness: RawHandedness,
    landmarks: Vec<RawPoint>,
}

#[derive(Deserialize)]
enum RawHandedness {
    #[serde(alias = "left", alias = "LEFT")]
    Left,
    #[serde(alias = "right", alias = "RIGHT")]
    Right,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Array2([f32; 2]),
    Array3([f32; 3]),
    Object { x: f32, y: f32 },
}

impl RawPoint {
    fn xy(&self) -> (f32, f32) {
        match *self {
            RawPoint::Array2([x, y]) | RawPoint::Array3([x, y, _]) => (x, y),
            RawPoint::Object { x, y } => (x, y),
        }
    }
}

/// Parses one line of the wire format.
///
/// Invalid UTF-8 is reported as [`FrameError::Malformed`].
pub fn parse_frame(line: impl AsRef<[u8]>, line_no: usize) -> Result<Frame, FrameError> {
    let raw: RawFrame =
        serde_json::from_slice(line.as_ref()).map_err(|source| FrameError::Malformed {
            line: line_no,
            source,
        })?;

    let Some(hand) = raw.hands.into_iter().next() else {
        return Ok(Frame { hand: None });
    };

    let got = hand.landmarks.len();
    let landmarks = HandLandmarks::from_coords(hand.landmarks.iter().map(RawPoint::xy)).ok_or(
        FrameError::LandmarkCount {
            line: line_no,
            expected: HandLandmarks::NUM_LANDMARKS,
            got,
        },
    )?;
    let handedness = match hand.handedness {
        RawHandedness::Left => Handedness::Left,
        RawHandedness::Right => Handedness::Right,
    };

    Ok(Frame {
        hand: Some(DetectedHand {
            handedness,
            landmarks,
        }),
    })
}

/// Reads frames in the JSON lines format described in the [module docs][self].
pub struct JsonLinesSource<R> {
    reader: R,
    line: Vec<u8>,
    line_no: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> LandmarkSource for JsonLinesSource<R> {
    fn read_frame(&mut self) -> Result<Option<Frame>, FrameError> {
        loop {
            self.line.clear();
            // Lines are read as raw bytes so that every consumed line is counted, even one that
            // turns out not to be UTF-8.
            let read = self.reader.read_until(b'\n', &mut self.line);
            if !self.line.is_empty() {
                self.line_no += 1;
            }
            if read? == 0 {
                return Ok(None);
            }

            if self.line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return parse_frame(&self.line, self.line_no).map(Some);
        }
    }
}

/// Where to read landmarks from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// Standard input (`-`).
    Stdin,
    /// A file of recorded frames.
    File(PathBuf),
    /// A shell command whose standard output is read (`cmd:<command>`).
    Command(String),
}

impl FromStr for SourceSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(SourceSpec::Stdin)
        } else if let Some(cmd) = s.strip_prefix("cmd:") {
            if cmd.trim().is_empty() {
                return Err("`cmd:` requires a command".into());
            }
            Ok(SourceSpec::Command(cmd.to_string()))
        } else if s.is_empty() {
            Err("empty source".into())
        } else {
            Ok(SourceSpec::File(s.into()))
        }
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Stdin => f.write_str("-"),
            SourceSpec::File(path) => write!(f, "{}", path.display()),
            SourceSpec::Command(cmd) => write!(f, "cmd:{cmd}"),
        }
    }
}

/// Opens a landmark source.
///
/// Failure to open the source is fatal: no frames can be processed without it.
pub fn open(spec: &SourceSpec) -> anyhow::Result<Box<dyn LandmarkSource + Send>> {
    let source: Box<dyn LandmarkSource + Send> = match spec {
        SourceSpec::Stdin => Box::new(JsonLinesSource::new(BufReader::new(io::stdin()))),
        SourceSpec::File(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open landmark file {}", path.display()))?;
            Box::new(JsonLinesSource::new(BufReader::new(file)))
        }
        SourceSpec::Command(cmd) => Box::new(ProcessSource::spawn(cmd)?),
    };
    log::info!("reading landmarks from {spec}");
    Ok(source)
}

/// Reads landmarks from the standard output of a child process.
///
/// The process is killed when the source is dropped.
pub struct ProcessSource {
    child: Child,
    lines: JsonLinesSource<BufReader<ChildStdout>>,
}

impl ProcessSource {
    pub fn spawn(cmd: &str) -> anyhow::Result<Self> {
        let mut child = shell(cmd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to start vision process `{cmd}`"))?;
        log::debug!("spawned vision process {} (`{cmd}`)", child.id());
        let stdout = child
            .stdout
            .take()
            .context("vision process has no stdout")?;
        Ok(Self {
            child,
            lines: JsonLinesSource::new(BufReader::new(stdout)),
        })
    }
}

#[cfg(unix)]
fn shell(cmd: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(cmd);
    command
}

#[cfg(windows)]
fn shell(cmd: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(cmd);
    command
}

impl LandmarkSource for ProcessSource {
    fn read_frame(&mut self) -> Result<Option<Frame>, FrameError> {
        self.lines.read_frame()
    }
}

impl Drop for ProcessSource {
    fn drop(&mut self) {
        match self.child.try_wait() {
            Ok(Some(status)) => log::debug!("vision process exited with {status}"),
            _ => {
                log::debug!("stopping vision process {}", self.child.id());
                self.child.kill().ok();
                self.child.wait().ok();
            }
        }
    }
}
