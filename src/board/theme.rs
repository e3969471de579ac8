pub const DEFAULT_DARK_START: u32 = 19;
pub const DEFAULT_DARK_END: u32 = 7;

/// Hours during which automatic theming selects dark mode.
/// `start` is inclusive, `end` exclusive; `start > end` wraps past midnight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeWindow {
    pub start: u32,
    pub end: u32,
}

impl Default for ThemeWindow {
    fn default() -> Self {
        Self {
            start: DEFAULT_DARK_START,
            end: DEFAULT_DARK_END,
        }
    }
}

impl ThemeWindow {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn is_dark_at(&self, hour: u32) -> bool {
        if self.start > self.end {
            hour >= self.start || hour < self.end
        } else {
            hour >= self.start && hour < self.end
        }
    }
}

/// Light/dark decision: either scheduled from the clock or pinned by the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeController {
    auto: bool,
    dark: bool,
    window: ThemeWindow,
}

impl ThemeController {
    pub fn new(auto: bool, window: ThemeWindow) -> Self {
        Self {
            auto,
            dark: false,
            window,
        }
    }

    /// Start from a known choice; only visible while scheduling is off,
    /// since the first `refresh` overrides it otherwise.
    pub fn with_dark(mut self, dark: bool) -> Self {
        self.dark = dark;
        self
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }

    pub fn is_auto(&self) -> bool {
        self.auto
    }

    pub fn window(&self) -> ThemeWindow {
        self.window
    }

    /// Manual toggle: pins the current choice and turns scheduling off.
    pub fn toggle(&mut self) -> bool {
        self.auto = false;
        self.dark = !self.dark;
        self.dark
    }

    /// Re-evaluate against the clock. No effect while pinned.
    pub fn refresh(&mut self, hour: u32) -> bool {
        if self.auto {
            self.dark = self.window.is_dark_at(hour);
        }
        self.dark
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_window_boundaries() {
        let w = ThemeWindow::new(17, 7);
        assert!(w.is_dark_at(20));
        assert!(!w.is_dark_at(10));
        assert!(!w.is_dark_at(7));
        assert!(w.is_dark_at(17));
        assert!(w.is_dark_at(0));
        assert!(w.is_dark_at(6));
    }

    #[test]
    fn daytime_window_and_empty_window() {
        let w = ThemeWindow::new(9, 17);
        assert!(w.is_dark_at(9));
        assert!(w.is_dark_at(16));
        assert!(!w.is_dark_at(17));
        assert!(!w.is_dark_at(3));

        let empty = ThemeWindow::new(8, 8);
        assert!((0..24).all(|h| !empty.is_dark_at(h)));
    }

    #[test]
    fn auto_follows_clock() {
        let mut theme = ThemeController::new(true, ThemeWindow::new(17, 7));
        assert!(theme.refresh(20));
        assert!(!theme.refresh(10));
    }

    #[test]
    fn toggle_pins_and_flips_once() {
        let mut theme = ThemeController::new(true, ThemeWindow::new(17, 7));
        theme.refresh(20);
        assert!(theme.is_dark());

        assert!(!theme.toggle());
        assert!(!theme.is_auto());
        // clock no longer overrides the pinned choice
        assert!(!theme.refresh(21));

        assert!(theme.toggle());
        assert!(theme.is_dark());
    }

    #[test]
    fn pinned_choice_survives_refresh() {
        let mut theme = ThemeController::new(false, ThemeWindow::new(17, 7)).with_dark(true);
        assert!(theme.refresh(10));

        let mut scheduled = ThemeController::new(true, ThemeWindow::new(17, 7)).with_dark(true);
        assert!(!scheduled.refresh(10));
    }
}
