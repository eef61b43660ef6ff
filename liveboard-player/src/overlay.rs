// Control Overlay State Machine
//
// Visibility, volume/mute, fullscreen, and info-panel state for one slot.
// Pure and synchronous: every input carries the current instant, the next
// wake-up is exposed through `next_deadline()`, and the slot driver does
// the actual sleeping. Tests drive it with hand-made instants.

use crate::config::OverlayConfig;
use tokio::time::Instant;

/// Snapshot of the overlay handed to the rendering host.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView {
    pub visible: bool,
    pub volume: f64,
    pub muted: bool,
    pub fullscreen: bool,
    pub info_visible: bool,
    pub cursor_hidden: bool,
}

/// Timer-driven control surface state.
///
/// The auto-hide countdown runs only while no pinned region (volume bar,
/// quality/line menu) is hovered; entering one suspends it outright and
/// leaving the last one restarts it from zero.
pub struct ControlOverlay {
    config: OverlayConfig,
    visible: bool,
    pinned: u32,
    deadline: Option<Instant>,
    volume: f64,
    muted: bool,
    remembered_volume: f64,
    fullscreen: bool,
    info_hover: bool,
}

impl ControlOverlay {
    #[must_use]
    pub fn new(config: OverlayConfig) -> Self {
        let remembered_volume = config.default_restore_volume;
        Self {
            config,
            visible: false,
            pinned: 0,
            deadline: None,
            // streams start muted so autoplay is allowed
            volume: 0.0,
            muted: true,
            remembered_volume,
            fullscreen: false,
            info_hover: false,
        }
    }

    // ========== Visibility ==========

    /// Pointer moved anywhere over the slot surface.
    pub fn pointer_moved(&mut self, now: Instant) {
        self.visible = true;
        self.deadline = if self.pinned == 0 {
            Some(now + self.config.hide_delay())
        } else {
            None
        };
    }

    /// Pointer left the slot surface entirely: hide at once.
    pub fn pointer_left(&mut self) {
        self.visible = false;
        self.deadline = None;
        self.info_hover = false;
    }

    /// Pointer entered a pinned sub-region; auto-hide is suspended no
    /// matter how much countdown remained.
    pub fn pin_enter(&mut self) {
        self.pinned += 1;
        self.deadline = None;
    }

    /// Pointer left a pinned sub-region. Leaving the last one restarts the
    /// countdown from a full delay.
    pub fn pin_exit(&mut self, now: Instant) {
        self.pinned = self.pinned.saturating_sub(1);
        if self.pinned == 0 && self.visible {
            self.deadline = Some(now + self.config.hide_delay());
        }
    }

    /// Fire any due timer. Returns true when visibility changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline && self.pinned == 0 => {
                self.visible = false;
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// When the driver must call `poll` next. None while nothing is
    /// counting down.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn pinned_regions(&self) -> u32 {
        self.pinned
    }

    // ========== Volume / mute ==========

    /// Apply a volume drag. Zero mutes; anything above zero unmutes and is
    /// remembered for later unmute. Returns the effective audio level to
    /// request from the host.
    pub fn set_volume(&mut self, volume: f64) -> f64 {
        let volume = volume.clamp(0.0, 1.0);
        self.volume = volume;
        if volume > 0.0 {
            self.muted = false;
            self.remembered_volume = volume;
        } else {
            self.muted = true;
        }
        self.effective_level()
    }

    /// Toggle the mute button. At zero volume this restores the remembered
    /// level; otherwise it silences without forgetting the slider.
    pub fn toggle_mute(&mut self) -> f64 {
        if self.volume == 0.0 {
            self.volume = self.remembered_volume;
            self.muted = false;
        } else {
            self.muted = !self.muted;
        }
        self.effective_level()
    }

    /// Audio level the sink should actually play at.
    pub fn effective_level(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    // ========== Fullscreen ==========

    /// Record the platform's fullscreen-change notification. This is the
    /// only writer of the flag, so exits via system gestures stay correct.
    pub fn set_fullscreen_reported(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// State a fullscreen toggle should request from the host.
    pub fn fullscreen_toggle_target(&self) -> bool {
        !self.fullscreen
    }

    /// The pointer is hidden in fullscreen once the overlay goes away.
    pub fn cursor_hidden(&self) -> bool {
        self.fullscreen && !self.visible
    }

    // ========== Info panel ==========

    pub fn info_enter(&mut self) {
        self.info_hover = true;
    }

    pub fn info_exit(&mut self) {
        self.info_hover = false;
    }

    /// The info panel renders only while hovered and only once the current
    /// load has frame geometry to show.
    pub fn info_visible(&self, has_video_info: bool) -> bool {
        self.info_hover && has_video_info
    }

    pub fn view(&self, has_video_info: bool) -> OverlayView {
        OverlayView {
            visible: self.visible,
            volume: self.volume,
            muted: self.muted,
            fullscreen: self.fullscreen,
            info_visible: self.info_visible(has_video_info),
            cursor_hidden: self.cursor_hidden(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn overlay() -> ControlOverlay {
        ControlOverlay::new(OverlayConfig::default())
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test]
    async fn test_hides_exactly_at_idle_threshold() {
        let mut overlay = overlay();
        let t0 = Instant::now();
        overlay.pointer_moved(t0);
        assert!(overlay.is_visible());

        assert!(!overlay.poll(t0 + ms(999)));
        assert!(overlay.is_visible());
        assert!(overlay.poll(t0 + ms(1000)));
        assert!(!overlay.is_visible());
        assert_eq!(overlay.next_deadline(), None);
    }

    #[tokio::test]
    async fn test_movement_restarts_countdown() {
        let mut overlay = overlay();
        let t0 = Instant::now();
        overlay.pointer_moved(t0);
        overlay.pointer_moved(t0 + ms(800));

        assert!(!overlay.poll(t0 + ms(1000)));
        assert!(overlay.is_visible());
        assert!(overlay.poll(t0 + ms(1800)));
        assert!(!overlay.is_visible());
    }

    #[tokio::test]
    async fn test_pinned_region_suspends_auto_hide() {
        let mut overlay = overlay();
        let t0 = Instant::now();
        overlay.pointer_moved(t0);
        overlay.pin_enter();
        assert_eq!(overlay.next_deadline(), None);

        // countdown would have fired long ago; pin holds it open
        assert!(!overlay.poll(t0 + ms(5000)));
        assert!(overlay.is_visible());

        // leaving restarts a fresh full delay
        overlay.pin_exit(t0 + ms(5000));
        assert!(!overlay.poll(t0 + ms(5999)));
        assert!(overlay.poll(t0 + ms(6000)));
        assert!(!overlay.is_visible());
    }

    #[tokio::test]
    async fn test_nested_pinned_regions() {
        let mut overlay = overlay();
        let t0 = Instant::now();
        overlay.pointer_moved(t0);
        overlay.pin_enter();
        overlay.pin_enter();
        overlay.pin_exit(t0 + ms(100));
        // one region still hovered
        assert_eq!(overlay.pinned_regions(), 1);
        assert_eq!(overlay.next_deadline(), None);

        overlay.pin_exit(t0 + ms(200));
        assert!(overlay.poll(t0 + ms(1200)));
    }

    #[tokio::test]
    async fn test_pointer_move_inside_pin_does_not_arm_timer() {
        let mut overlay = overlay();
        let t0 = Instant::now();
        overlay.pointer_moved(t0);
        overlay.pin_enter();
        overlay.pointer_moved(t0 + ms(100));
        assert_eq!(overlay.next_deadline(), None);
        assert!(!overlay.poll(t0 + ms(5000)));
    }

    #[tokio::test]
    async fn test_pointer_leave_forces_hide() {
        let mut overlay = overlay();
        let t0 = Instant::now();
        overlay.pointer_moved(t0);
        overlay.pointer_left();
        assert!(!overlay.is_visible());
        assert_eq!(overlay.next_deadline(), None);
    }

    #[test]
    fn test_volume_drag_semantics() {
        let mut overlay = overlay();
        assert_eq!(overlay.set_volume(0.0), 0.0);
        assert!(overlay.is_muted());

        assert!((overlay.set_volume(0.4) - 0.4).abs() < f64::EPSILON);
        assert!(!overlay.is_muted());
        assert!((overlay.volume() - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unmute_from_zero_restores_default() {
        let mut overlay = overlay();
        // initial state: volume 0, muted
        let level = overlay.toggle_mute();
        assert!((level - 0.6).abs() < f64::EPSILON);
        assert!(!overlay.is_muted());
    }

    #[test]
    fn test_mute_toggle_remembers_slider() {
        let mut overlay = overlay();
        overlay.set_volume(0.8);

        assert_eq!(overlay.toggle_mute(), 0.0);
        assert!(overlay.is_muted());
        // slider position survives the mute
        assert!((overlay.volume() - 0.8).abs() < f64::EPSILON);

        assert!((overlay.toggle_mute() - 0.8).abs() < f64::EPSILON);
        assert!(!overlay.is_muted());
    }

    #[test]
    fn test_unmute_from_zero_restores_last_nonzero() {
        let mut overlay = overlay();
        overlay.set_volume(0.3);
        overlay.set_volume(0.0);
        assert!(overlay.is_muted());

        let level = overlay.toggle_mute();
        assert!((level - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fullscreen_follows_platform_reports() {
        let mut overlay = overlay();
        assert!(overlay.fullscreen_toggle_target());

        overlay.set_fullscreen_reported(true);
        assert!(overlay.is_fullscreen());
        assert!(!overlay.fullscreen_toggle_target());

        // system gesture exit arrives as a report, not a request
        overlay.set_fullscreen_reported(false);
        assert!(!overlay.is_fullscreen());
    }

    #[tokio::test]
    async fn test_cursor_hidden_only_in_hidden_fullscreen() {
        let mut overlay = overlay();
        let t0 = Instant::now();
        overlay.set_fullscreen_reported(true);
        assert!(overlay.cursor_hidden());

        overlay.pointer_moved(t0);
        assert!(!overlay.cursor_hidden());

        overlay.poll(t0 + ms(1000));
        assert!(overlay.cursor_hidden());
    }

    #[test]
    fn test_info_panel_requires_video_info() {
        let mut overlay = overlay();
        overlay.info_enter();
        assert!(!overlay.info_visible(false));
        assert!(overlay.info_visible(true));
        overlay.info_exit();
        assert!(!overlay.info_visible(true));
    }
}
