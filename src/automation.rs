//! OS input injection.
//!
//! The [`Automation`] trait is everything the gesture pipeline needs from the operating system.
//! Two backends exist:
//!
//! * [`DryRun`] only logs what it would do and tracks a virtual cursor.
//! * `EnigoAutomation` (requires the `desktop` feature) injects real input events.

use std::fmt;

/// A mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

/// Size of the screen in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for ScreenSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Mouse control provided by the operating system.
pub trait Automation {
    /// Moves the cursor to an absolute screen position.
    fn move_cursor_to(&mut self, x: i32, y: i32) -> anyhow::Result<()>;

    fn click(&mut self, button: MouseButton) -> anyhow::Result<()>;

    /// Double-clicks the left mouse button.
    fn double_click(&mut self) -> anyhow::Result<()>;

    /// Scrolls vertically. Positive amounts scroll up, negative amounts scroll down.
    ///
    /// The unit is platform-defined.
    fn scroll(&mut self, amount: i32) -> anyhow::Result<()>;

    fn cursor_position(&mut self) -> anyhow::Result<(i32, i32)>;

    fn screen_size(&mut self) -> anyhow::Result<ScreenSize>;
}

impl<A: Automation + ?Sized> Automation for Box<A> {
    fn move_cursor_to(&mut self, x: i32, y: i32) -> anyhow::Result<()> {
        (**self).move_cursor_to(x, y)
    }

    fn click(&mut self, button: MouseButton) -> anyhow::Result<()> {
        (**self).click(button)
    }

    fn double_click(&mut self) -> anyhow::Result<()> {
        (**self).double_click()
    }

    fn scroll(&mut self, amount: i32) -> anyhow::Result<()> {
        (**self).scroll(amount)
    }

    fn cursor_position(&mut self) -> anyhow::Result<(i32, i32)> {
        (**self).cursor_position()
    }

    fn screen_size(&mut self) -> anyhow::Result<ScreenSize> {
        (**self).screen_size()
    }
}

/// An [`Automation`] backend that logs instead of acting.
///
/// The cursor is simulated, so that relative cursor movement behaves like it would on a real
/// screen (including clamping to the screen bounds).
#[derive(Debug, Clone)]
pub struct DryRun {
    screen: ScreenSize,
    cursor: (i32, i32),
}

impl DryRun {
    /// Creates a dry-run backend for a screen of the given size, at least 1x1 pixels.
    pub fn new(screen: ScreenSize) -> Self {
        let screen = ScreenSize {
            width: screen.width.max(1),
            height: screen.height.max(1),
        };
        Self {
            screen,
            cursor: (screen.width as i32 / 2, screen.height as i32 / 2),
        }
    }
}

impl Default for DryRun {
    fn default() -> Self {
        Self::new(ScreenSize {
            width: 1920,
            height: 1080,
        })
    }
}

impl Automation for DryRun {
    fn move_cursor_to(&mut self, x: i32, y: i32) -> anyhow::Result<()> {
        let x = x.clamp(0, self.screen.width as i32 - 1);
        let y = y.clamp(0, self.screen.height as i32 - 1);
        if (x, y) != self.cursor {
            log::trace!("[dry-run] move cursor to {x},{y}");
        }
        self.cursor = (x, y);
        Ok(())
    }

    fn click(&mut self, button: MouseButton) -> anyhow::Result<()> {
        log::info!("[dry-run] {button:?} click at {:?}", self.cursor);
        Ok(())
    }

    fn double_click(&mut self) -> anyhow::Result<()> {
        log::info!("[dry-run] double click at {:?}", self.cursor);
        Ok(())
    }

    fn scroll(&mut self, amount: i32) -> anyhow::Result<()> {
        log::info!("[dry-run] scroll by {amount}");
        Ok(())
    }

    fn cursor_position(&mut self) -> anyhow::Result<(i32, i32)> {
        Ok(self.cursor)
    }

    fn screen_size(&mut self) -> anyhow::Result<ScreenSize> {
        Ok(self.screen)
    }
}

#[cfg(feature = "desktop")]
pub use self::desktop::EnigoAutomation;

#[cfg(feature = "desktop")]
mod desktop {
    use anyhow::anyhow;
    use enigo::{Axis, Button, Coordinate, Direction, Enigo, Mouse, Settings};

    use super::{Automation, MouseButton, ScreenSize};

    /// Injects input events into the running desktop session.
    pub struct EnigoAutomation {
        enigo: Enigo,
    }

    impl EnigoAutomation {
        pub fn new() -> anyhow::Result<Self> {
            let enigo = Enigo::new(&Settings::default())
                .map_err(|e| anyhow!("failed to connect to the display server: {e:?}"))?;
            Ok(Self { enigo })
        }
    }

    impl Automation for EnigoAutomation {
        fn move_cursor_to(&mut self, x: i32, y: i32) -> anyhow::Result<()> {
            self.enigo
                .move_mouse(x, y, Coordinate::Abs)
                .map_err(|e| anyhow!("{e:?}"))
        }

        fn click(&mut self, button: MouseButton) -> anyhow::Result<()> {
            let button = match button {
                MouseButton::Left => Button::Left,
                MouseButton::Right => Button::Right,
            };
            self.enigo
                .button(button, Direction::Click)
                .map_err(|e| anyhow!("{e:?}"))
        }

        fn double_click(&mut self) -> anyhow::Result<()> {
            self.click(MouseButton::Left)?;
            self.click(MouseButton::Left)
        }

        fn scroll(&mut self, amount: i32) -> anyhow::Result<()> {
            // enigo scrolls down for positive lengths.
            self.enigo
                .scroll(-amount, Axis::Vertical)
                .map_err(|e| anyhow!("{e:?}"))
        }

        fn cursor_position(&mut self) -> anyhow::Result<(i32, i32)> {
            self.enigo.location().map_err(|e| anyhow!("{e:?}"))
        }

        fn screen_size(&mut self) -> anyhow::Result<ScreenSize> {
            let (width, height) = self.enigo.main_display().map_err(|e| anyhow!("{e:?}"))?;
            Ok(ScreenSize {
                width: width.max(1) as u32,
                height: height.max(1) as u32,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_clamps_cursor() {
        let mut dry = DryRun::new(ScreenSize {
            width: 100,
            height: 50,
        });
        assert_eq!(dry.cursor_position().unwrap(), (50, 25));
        dry.move_cursor_to(-10, 70).unwrap();
        assert_eq!(dry.cursor_position().unwrap(), (0, 49));
        dry.move_cursor_to(12, 34).unwrap();
        assert_eq!(dry.cursor_position().unwrap(), (12, 34));
    }

    #[test]
    fn dry_run_zero_sized_screen() {
        let mut dry = DryRun::new(ScreenSize {
            width: 0,
            height: 0,
        });
        dry.move_cursor_to(5, -5).unwrap();
        assert_eq!(dry.cursor_position().unwrap(), (0, 0));
        assert_eq!(
            dry.screen_size().unwrap(),
            ScreenSize {
                width: 1,
                height: 1
            }
        );
    }

    #[test]
    fn boxed_backend() {
        let mut boxed: Box<dyn Automation> = Box::new(DryRun::default());
        assert_eq!(
            boxed.screen_size().unwrap(),
            ScreenSize {
                width: 1920,
                height: 1080
            }
        );
        boxed.click(MouseButton::Right).unwrap();
        boxed.scroll(-150).unwrap();
    }
}
