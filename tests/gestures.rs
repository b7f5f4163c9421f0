//! End-to-end gesture scenarios, from landmark frames to recorded mouse actions.

use std::time::{Duration, Instant};

use gesture_mouse::{
    app::Pipeline,
    automation::{Automation, MouseButton, ScreenSize},
    dispatch::{DispatchOptions, Dispatcher},
    gesture::Gesture,
    hand::landmark::{HandLandmarks, Handedness},
    present::StatusLabel,
    screenshot::ScreenshotSink,
    source::{DetectedHand, Frame},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Move(i32, i32),
    Click(MouseButton),
    DoubleClick,
    Scroll(i32),
}

struct Recorder {
    screen: ScreenSize,
    cursor: (i32, i32),
    events: Vec<Event>,
}

impl Recorder {
    fn new(width: u32, height: u32) -> Self {
        Self {
            screen: ScreenSize { width, height },
            cursor: (width as i32 / 2, height as i32 / 2),
            events: Vec::new(),
        }
    }
}

impl Automation for Recorder {
    fn move_cursor_to(&mut self, x: i32, y: i32) -> anyhow::Result<()> {
        self.cursor = (x, y);
        self.events.push(Event::Move(x, y));
        Ok(())
    }

    fn click(&mut self, button: MouseButton) -> anyhow::Result<()> {
        self.events.push(Event::Click(button));
        Ok(())
    }

    fn double_click(&mut self) -> anyhow::Result<()> {
        self.events.push(Event::DoubleClick);
        Ok(())
    }

    fn scroll(&mut self, amount: i32) -> anyhow::Result<()> {
        self.events.push(Event::Scroll(amount));
        Ok(())
    }

    fn cursor_position(&mut self) -> anyhow::Result<(i32, i32)> {
        Ok(self.cursor)
    }

    fn screen_size(&mut self) -> anyhow::Result<ScreenSize> {
        Ok(self.screen)
    }
}

#[derive(Default)]
struct Shots(u32);

impl ScreenshotSink for Shots {
    fn request(&mut self) {
        self.0 += 1;
    }
}

// An upright hand facing the camera, with each finger raised or folded per `fingers`
// (thumb first). The whole hand is shifted right by `shift`.
fn hand(handedness: Handedness, fingers: [bool; 5], shift: f32) -> Frame {
    let mut coords = [
        (0.50, 0.90),
        (0.42, 0.85),
        (0.36, 0.78),
        (0.32, 0.72),
        (0.28, 0.66),
        (0.42, 0.60),
        (0.41, 0.50),
        (0.41, 0.44),
        (0.41, 0.38),
        (0.50, 0.58),
        (0.50, 0.47),
        (0.50, 0.40),
        (0.50, 0.34),
        (0.57, 0.60),
        (0.58, 0.50),
        (0.58, 0.44),
        (0.58, 0.39),
        (0.63, 0.64),
        (0.65, 0.57),
        (0.66, 0.52),
        (0.67, 0.48),
    ];

    // Right thumbs point towards smaller x when extended, left thumbs towards larger x.
    let outward = match handedness {
        Handedness::Right => -0.04,
        Handedness::Left => 0.04,
    };
    coords[4].0 = if fingers[0] {
        coords[3].0 + outward
    } else {
        coords[3].0 - outward
    };
    for (finger, (pip, tip)) in [(6, 8), (10, 12), (14, 16), (18, 20)].into_iter().enumerate() {
        if !fingers[finger + 1] {
            coords[tip].1 = coords[pip].1 + 0.05;
        }
    }

    let landmarks =
        HandLandmarks::from_coords(coords.map(|(x, y): (f32, f32)| (x + shift, y))).unwrap();
    Frame {
        hand: Some(DetectedHand {
            handedness,
            landmarks,
        }),
    }
}

const MOVE: [bool; 5] = [false, true, true, false, false];
const FREEZE: [bool; 5] = [true, true, true, false, false];
const LEFT_CLICK: [bool; 5] = [false, false, true, false, false];
const RIGHT_CLICK: [bool; 5] = [false, true, false, false, false];
const DOUBLE_CLICK: [bool; 5] = [false; 5];
const SCROLL_UP: [bool; 5] = [true, true, true, true, false];
const SCROLL_DOWN: [bool; 5] = [true, true, true, false, true];
const SCREENSHOT: [bool; 5] = [true; 5];

fn pipeline(width: u32, height: u32) -> Pipeline<Recorder, Shots> {
    let dispatcher = Dispatcher::new(
        Recorder::new(width, height),
        Shots::default(),
        DispatchOptions::default(),
    )
    .unwrap();
    Pipeline::new(dispatcher)
}

fn events(pipeline: &Pipeline<Recorder, Shots>) -> &[Event] {
    &pipeline.dispatcher().automation().events
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[test]
fn relative_motion_scales_with_sensitivity() {
    let mut p = pipeline(1000, 1000);
    let t0 = Instant::now();

    p.process(&hand(Handedness::Right, MOVE, 0.0), t0).unwrap();
    // The first frame anchors at the current cursor position, so the cursor stays put.
    assert_eq!(events(&p), [Event::Move(500, 500)]);

    p.process(&hand(Handedness::Right, MOVE, 0.1), t0 + ms(10))
        .unwrap();
    // 0.1 * 1000 px of hand motion at the default sensitivity of 2.2.
    assert_eq!(events(&p).last(), Some(&Event::Move(720, 500)));
}

#[test]
fn anchor_is_cleared_and_recreated() {
    let mut p = pipeline(1000, 1000);
    let t0 = Instant::now();

    p.process(&hand(Handedness::Right, MOVE, 0.0), t0).unwrap();
    p.process(&hand(Handedness::Right, MOVE, 0.1), t0 + ms(10))
        .unwrap();
    assert!(p.dispatcher().anchor().is_some());

    p.process(&Frame::default(), t0 + ms(20)).unwrap();
    assert!(p.dispatcher().anchor().is_none());

    // The hand reappears somewhere else. The cursor must not jump.
    p.process(&hand(Handedness::Right, MOVE, -0.2), t0 + ms(30))
        .unwrap();
    assert_eq!(events(&p).last(), Some(&Event::Move(720, 500)));
    let anchor = p.dispatcher().anchor().unwrap();
    approx::assert_relative_eq!(anchor.hand.x, 300.0, max_relative = 1e-5);
    approx::assert_relative_eq!(anchor.cursor.x, 720.0);
}

#[test]
fn freeze_keeps_anchor() {
    let mut p = pipeline(1000, 1000);
    let t0 = Instant::now();

    p.process(&hand(Handedness::Right, MOVE, 0.0), t0).unwrap();
    let status = p
        .process(&hand(Handedness::Right, FREEZE, 0.1), t0 + ms(10))
        .unwrap();
    assert_eq!(status.label, StatusLabel::Action(Gesture::FreezeCursor));
    assert_eq!(events(&p), [Event::Move(500, 500)]);
    assert!(p.dispatcher().anchor().is_some());

    // Moving continues relative to the original anchor.
    p.process(&hand(Handedness::Right, MOVE, 0.1), t0 + ms(20))
        .unwrap();
    assert_eq!(events(&p).last(), Some(&Event::Move(720, 500)));
}

#[test]
fn other_gestures_drop_anchor() {
    let mut p = pipeline(1000, 1000);
    let t0 = Instant::now();
    p.process(&hand(Handedness::Right, MOVE, 0.0), t0).unwrap();
    p.process(&hand(Handedness::Right, LEFT_CLICK, 0.0), t0 + ms(10))
        .unwrap();
    assert!(p.dispatcher().anchor().is_none());
}

#[test]
fn double_click_is_throttled() {
    let mut p = pipeline(1000, 1000);
    let t0 = Instant::now();

    let status = p
        .process(&hand(Handedness::Right, DOUBLE_CLICK, 0.0), t0)
        .unwrap();
    assert_eq!(status.label, StatusLabel::Action(Gesture::DoubleClick));
    for i in 1..10 {
        p.process(&hand(Handedness::Right, DOUBLE_CLICK, 0.0), t0 + ms(i * 100))
            .unwrap();
    }
    assert_eq!(events(&p), [Event::DoubleClick]);

    p.process(&hand(Handedness::Right, DOUBLE_CLICK, 0.0), t0 + ms(1001))
        .unwrap();
    assert_eq!(events(&p), [Event::DoubleClick, Event::DoubleClick]);
}

#[test]
fn clicks_share_a_cooldown() {
    let mut p = pipeline(1000, 1000);
    let t0 = Instant::now();

    p.process(&hand(Handedness::Right, RIGHT_CLICK, 0.0), t0)
        .unwrap();
    let status = p
        .process(&hand(Handedness::Right, LEFT_CLICK, 0.0), t0 + ms(500))
        .unwrap();
    assert_eq!(events(&p), [Event::Click(MouseButton::Right)]);
    // The label stays on the action that actually ran.
    assert_eq!(status.label, StatusLabel::Action(Gesture::RightClick));

    p.process(&hand(Handedness::Right, LEFT_CLICK, 0.0), t0 + ms(1100))
        .unwrap();
    assert_eq!(
        events(&p),
        [
            Event::Click(MouseButton::Right),
            Event::Click(MouseButton::Left)
        ]
    );
}

#[test]
fn scrolling_shares_a_cooldown() {
    let mut p = pipeline(1000, 1000);
    let t0 = Instant::now();

    p.process(&hand(Handedness::Right, SCROLL_UP, 0.0), t0).unwrap();
    p.process(&hand(Handedness::Right, SCROLL_DOWN, 0.0), t0 + ms(2000))
        .unwrap();
    p.process(&hand(Handedness::Right, SCROLL_DOWN, 0.0), t0 + ms(3100))
        .unwrap();
    assert_eq!(events(&p), [Event::Scroll(150), Event::Scroll(-150)]);
}

#[test]
fn screenshots_are_requested_once_per_cooldown() {
    let mut p = pipeline(1000, 1000);
    let t0 = Instant::now();

    for i in 0..30 {
        p.process(&hand(Handedness::Right, SCREENSHOT, 0.0), t0 + ms(i * 100))
            .unwrap();
    }
    assert_eq!(p.dispatcher().screenshots().0, 1);
    p.process(&hand(Handedness::Right, SCREENSHOT, 0.0), t0 + ms(3001))
        .unwrap();
    assert_eq!(p.dispatcher().screenshots().0, 2);
    assert!(events(&p).is_empty());
}

#[test]
fn thumb_polarity_follows_confirmed_handedness() {
    let mut p = pipeline(1000, 1000);
    let t0 = Instant::now();

    // A left hand with its thumb extended, but the detector claims it is a right hand.
    let mut frame = hand(Handedness::Left, FREEZE, 0.0);
    if let Some(hand) = &mut frame.hand {
        hand.handedness = Handedness::Right;
    }
    // Interpreted with right-hand polarity, the thumb counts as folded: Move Cursor.
    let status = p.process(&frame, t0).unwrap();
    assert_eq!(status.label, StatusLabel::Action(Gesture::MoveCursor));

    // Once the left label has been seen three times in a row, the thumb counts as extended.
    let left = hand(Handedness::Left, FREEZE, 0.0);
    p.process(&left, t0 + ms(10)).unwrap();
    p.process(&left, t0 + ms(20)).unwrap();
    assert_eq!(p.confirmer().confirmed(), Some(Handedness::Right));
    let status = p.process(&left, t0 + ms(30)).unwrap();
    assert_eq!(p.confirmer().confirmed(), Some(Handedness::Left));
    assert_eq!(status.label, StatusLabel::Action(Gesture::FreezeCursor));
}

#[test]
fn unknown_pose_returns_to_ready() {
    let mut p = pipeline(1000, 1000);
    let t0 = Instant::now();

    let status = p
        .process(&hand(Handedness::Right, [true, false, false, false, true], 0.0), t0)
        .unwrap();
    assert_eq!(status.label, StatusLabel::Ready);
    assert!(events(&p).is_empty());
}
