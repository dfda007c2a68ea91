use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use scrollstage_core::motion::{Carousel, DelayedActivation, ScrollInertia, TransientFlag};
use scrollstage_core::progress::ScrollDirection;
use scrollstage_core::sequence::{SequenceDirection, SequenceEvent, TriggerOutcome};
use scrollstage_core::watcher::{Region, Viewport};
use scrollstage_core::{
    AppConfig, Clock, MonotonicClock, Placement, ScrollProgressModel, StagedVisibilitySequencer,
    ThemeMode, ThresholdWatcher,
};
use tracing::{debug, trace};

use crate::page::{Page, ROW_HEIGHT_PX, SECTIONS};
use crate::theme::Theme;

/// Labels for the link stages; the last stage is always the theme toggle
const LINK_LABELS: &[&str] = &["WhatsApp", "Instagram", "LinkedIn"];

/// How long the settle wobble plays
const WOBBLE_MS: u64 = 300;

/// Pixels the menu drops when it slides out of its resting position
const SLIDE_PX: f64 = 128.0;

type SectionCallback = Box<dyn FnMut(bool, f64)>;

/// Watcher plus delayed highlight for one page section
pub struct SectionView {
    pub index: usize,
    watcher: ThresholdWatcher<SectionCallback>,
    mailbox: Rc<Cell<Option<(bool, f64)>>>,
    activation: DelayedActivation,
}

impl SectionView {
    fn new(index: usize, region: Region, threshold: f64, delay: Duration) -> Result<Self> {
        let mailbox = Rc::new(Cell::new(None));
        let sink = Rc::clone(&mailbox);
        let callback: SectionCallback = Box::new(move |visible, ratio| sink.set(Some((visible, ratio))));

        let mut watcher = ThresholdWatcher::new(callback);
        watcher.observe(Page::target(index), region, threshold)?;

        Ok(Self {
            index,
            watcher,
            mailbox,
            activation: DelayedActivation::new(delay),
        })
    }

    pub fn is_active(&self) -> bool {
        self.activation.is_active()
    }
}

/// Application state
pub struct App<C: Clock + Clone = MonotonicClock> {
    pub config: AppConfig,
    clock: C,
    pub page: Page,

    pub progress: ScrollProgressModel<C>,
    pub menu: StagedVisibilitySequencer<C>,
    pub sections: Vec<SectionView>,
    pub gallery: Carousel,
    gallery_section: Option<usize>,

    pub inertia: ScrollInertia,
    wobble: TransientFlag,
    theme_shift: TransientFlag,

    pub theme_mode: ThemeMode,
    pub theme: Theme,

    /// First visible page row
    pub scroll: u16,
    /// Rows available to the page
    pub viewport_height: u16,

    pub menu_expanded: bool,
    pub selected_stage: usize,

    pub should_quit: bool,
    pub status_message: Option<String>,
}

impl App<MonotonicClock> {
    pub fn with_config(config: AppConfig) -> Result<Self> {
        Self::new(config, MonotonicClock::new())
    }
}

impl<C: Clock + Clone> App<C> {
    pub fn new(config: AppConfig, clock: C) -> Result<Self> {
        let page = Page::new();

        let progress = ScrollProgressModel::new(config.progress.clone(), clock.clone())?;
        let menu = StagedVisibilitySequencer::new(&config.sequence, clock.clone())?;

        let activation_delay = Duration::from_millis(config.motion.activation_delay_ms);
        let mut sections = Vec::with_capacity(SECTIONS.len());
        for (index, section) in SECTIONS.iter().enumerate() {
            let Some(region) = page.region(index) else {
                continue;
            };
            sections.push(SectionView::new(
                index,
                region,
                section.threshold,
                activation_delay,
            )?);
        }

        let gallery_section = Page::gallery_section();
        let slides = gallery_section.map_or(0, |index| SECTIONS[index].slides.len());

        let theme_mode = config.ui.theme;
        Ok(Self {
            gallery: Carousel::from_config(slides, &config.motion),
            gallery_section,
            inertia: ScrollInertia::from_config(&config.motion),
            wobble: TransientFlag::new(Duration::from_millis(WOBBLE_MS)),
            theme_shift: TransientFlag::new(Duration::from_millis(
                config.motion.theme_transition_ms,
            )),
            theme: Theme::for_mode(theme_mode),
            theme_mode,
            config,
            clock,
            page,
            progress,
            menu,
            sections,
            scroll: 0,
            viewport_height: 0,
            menu_expanded: false,
            selected_stage: 0,
            should_quit: false,
            status_message: None,
        })
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn max_scroll(&self) -> u16 {
        self.page.height_rows().saturating_sub(self.viewport_height)
    }

    fn offset_px(&self) -> f64 {
        self.scroll as f64 * ROW_HEIGHT_PX
    }

    fn viewport_px(&self) -> f64 {
        self.viewport_height as f64 * ROW_HEIGHT_PX
    }

    /// Visible window in document coordinates
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.offset_px(), self.viewport_px())
    }

    /// Terminal resized; `height` is the rows left for the page
    pub fn set_viewport(&mut self, height: u16) {
        let before = self.scroll;
        self.viewport_height = height;
        self.scroll = self.scroll.min(self.max_scroll());
        self.progress
            .on_resize(self.viewport_px(), self.page.height_px());
        if self.scroll != before {
            // The clamp moved the page
            self.progress
                .on_scroll_signal(self.offset_px(), self.viewport_px(), self.page.height_px());
        }
        self.update_placement();
    }

    /// Move the page by `delta` rows (positive is down)
    pub fn scroll_by(&mut self, delta: i32) {
        let target = (self.scroll as i32 + delta).clamp(0, self.max_scroll() as i32) as u16;
        if target == self.scroll {
            return;
        }

        let direction = if target > self.scroll {
            ScrollDirection::Down
        } else {
            ScrollDirection::Up
        };
        self.scroll = target;

        self.progress
            .on_scroll_signal(self.offset_px(), self.viewport_px(), self.page.height_px());
        self.inertia.on_scroll(self.now(), direction);
        self.update_placement();
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_by(-(self.scroll as i32));
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_by(self.max_scroll() as i32 - self.scroll as i32);
    }

    pub fn page_rows(&self) -> i32 {
        self.viewport_height.saturating_sub(2).max(1) as i32
    }

    fn update_placement(&mut self) {
        let placement = Placement::for_offset(self.offset_px(), self.config.sequence.dock_offset_px);
        if placement != self.menu.placement() {
            debug!(?placement, "Menu placement changed");
            self.menu.set_placement(placement);
        }
    }

    /// Open or close the fan-out menu
    pub fn toggle_menu(&mut self) {
        let direction = if self.menu_expanded {
            SequenceDirection::Closing
        } else {
            SequenceDirection::Opening
        };

        match self.menu.trigger(direction) {
            TriggerOutcome::Ignored => {
                self.set_status("Menu is still moving");
            }
            TriggerOutcome::Started | TriggerOutcome::Restarted => {
                self.menu_expanded = !self.menu_expanded;
                self.clear_status();
            }
        }
    }

    pub fn stage_count(&self) -> usize {
        self.menu.stage_count()
    }

    pub fn is_theme_stage(&self, index: usize) -> bool {
        index + 1 == self.stage_count()
    }

    pub fn stage_label(&self, index: usize) -> &'static str {
        if self.is_theme_stage(index) {
            match self.theme_mode {
                ThemeMode::Light => "Moon",
                ThemeMode::Dark => "Sun",
            }
        } else {
            LINK_LABELS[index % LINK_LABELS.len()]
        }
    }

    pub fn select_next_stage(&mut self) {
        let count = self.stage_count();
        self.selected_stage = (self.selected_stage + 1) % count;
    }

    pub fn select_prev_stage(&mut self) {
        let count = self.stage_count();
        self.selected_stage = (self.selected_stage + count - 1) % count;
    }

    /// Act on the selected stage if it is showing
    pub fn activate_selected(&mut self) {
        let index = self.selected_stage;
        if !self.menu.container().visible || !self.menu.is_visible(index) {
            return;
        }
        if self.is_theme_stage(index) {
            self.toggle_theme();
        } else {
            let label = self.stage_label(index);
            self.set_status(format!("Opening {}", label));
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme_mode = self.theme_mode.toggled();
        self.theme = Theme::for_mode(self.theme_mode);
        self.theme_shift.raise(self.now());
        debug!(mode = ?self.theme_mode, "Theme switched");
    }

    /// Caption of the slide the gallery is showing
    pub fn gallery_caption(&self) -> Option<&'static str> {
        let index = self.gallery_section?;
        SECTIONS[index].slides.get(self.gallery.current()).copied()
    }

    /// Skip to the next gallery slide unless one is still fading in
    pub fn next_slide(&mut self) {
        let now = self.now();
        if self.gallery.next(now) {
            debug!(slide = self.gallery.current(), "Gallery slide selected");
        } else if self.gallery.is_transitioning(now) {
            self.set_status("Slide is still changing");
        }
    }

    pub fn theme_transitioning(&self) -> bool {
        self.theme_shift.is_active(self.now())
    }

    /// Advance every engine component to the current time
    pub fn frame(&mut self) {
        let now = self.now();

        self.progress.tick();
        for crossing in self.progress.take_crossings() {
            if crossing.marker == "bottom" && crossing.entered {
                self.set_status("Reached the end of the page");
            }
        }

        for event in self.menu.advance() {
            if let SequenceEvent::Finished { at_ms, direction } = event {
                trace!(at_ms, ?direction, "Menu sequence finished");
            }
        }

        let viewport = self.viewport();
        for section in &mut self.sections {
            section.watcher.update(viewport);
            if let Some((visible, ratio)) = section.mailbox.take() {
                trace!(section = section.index, visible, ratio, "Section visibility changed");
                section.activation.set_visible(now, visible);
                if self.gallery_section == Some(section.index) {
                    self.gallery.set_visible(now, visible);
                }
            }
            if section.activation.poll(now) {
                debug!(section = section.index, "Section highlighted");
            }
        }

        if self.gallery.poll(now) {
            trace!(slide = self.gallery.current(), "Gallery advanced");
        }

        if self.inertia.poll(now) {
            self.wobble.raise(now);
        }
        if self.wobble.poll(now) {
            self.inertia.finish_wobble();
        }
        self.theme_shift.poll(now);
    }

    /// Whether the next frame is needed soon
    pub fn needs_animation(&self) -> bool {
        !self.progress.is_settled()
            || self.menu.is_running()
            || self.inertia.offset() != 0.0
            || self.inertia.wobble().is_some()
            || self.theme_transitioning()
            || self.gallery.is_transitioning(self.now())
    }

    /// Vertical displacement of the menu in rows
    pub fn menu_offset_rows(&self) -> i32 {
        let mut px = self.inertia.offset();
        if self.menu.container().slid {
            px += SLIDE_PX;
        }
        (px / ROW_HEIGHT_PX).round() as i32
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Stop everything and mark the app for exit
    pub fn quit(&mut self) {
        self.progress.unmount();
        self.menu.unmount();
        for section in &mut self.sections {
            section.watcher.unobserve();
        }
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollstage_core::ManualClock;

    fn app() -> (App<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let mut app = App::new(AppConfig::default(), clock.clone()).unwrap();
        app.set_viewport(20);
        (app, clock)
    }

    fn run_frames(app: &mut App<ManualClock>, clock: &ManualClock, ms: u64) {
        for _ in 0..(ms / 16).max(1) {
            clock.advance_ms(16);
            app.frame();
        }
    }

    #[test]
    fn test_scroll_is_clamped() {
        let (mut app, _clock) = app();
        app.scroll_by(-5);
        assert_eq!(app.scroll, 0);
        app.scroll_by(10_000);
        assert_eq!(app.scroll, app.max_scroll());
    }

    #[test]
    fn test_progress_follows_scroll() {
        let (mut app, clock) = app();
        app.scroll_to_bottom();
        assert_eq!(app.progress.raw_progress(), 1.0);
        run_frames(&mut app, &clock, 2000);
        assert!(app.progress.display_progress() > 0.0);
        assert!(app.needs_animation());
    }

    #[test]
    fn test_placement_docks_after_scrolling() {
        let (mut app, _clock) = app();
        assert_eq!(app.menu.placement(), Placement::Floating);
        app.scroll_by(9);
        assert_eq!(app.menu.placement(), Placement::Docked);
        app.scroll_to_top();
        assert_eq!(app.menu.placement(), Placement::Floating);
    }

    #[test]
    fn test_resize_clamp_updates_placement() {
        let (mut app, clock) = app();
        app.scroll_to_bottom();
        assert_eq!(app.menu.placement(), Placement::Docked);

        clock.advance_ms(50);
        app.set_viewport(app.page.height_rows() + 10);
        assert_eq!(app.scroll, 0);
        assert_eq!(app.menu.placement(), Placement::Floating);
        assert_eq!(app.progress.offset(), 0.0);
        assert_eq!(app.progress.direction(), ScrollDirection::Up);
    }

    #[test]
    fn test_menu_opens_all_stages() {
        let (mut app, clock) = app();
        app.toggle_menu();
        assert!(app.menu_expanded);
        run_frames(&mut app, &clock, 2000);
        assert!(!app.menu.is_running());
        assert!(app.menu.stage_flags().iter().all(|v| *v));
        assert!(app.menu.container().visible);
    }

    #[test]
    fn test_toggle_while_moving_is_ignored() {
        let (mut app, clock) = app();
        app.toggle_menu();
        run_frames(&mut app, &clock, 100);
        app.toggle_menu();
        assert!(app.menu_expanded);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_last_stage_toggles_theme() {
        let (mut app, clock) = app();
        app.toggle_menu();
        run_frames(&mut app, &clock, 2000);

        app.select_prev_stage();
        assert!(app.is_theme_stage(app.selected_stage));
        assert_eq!(app.stage_label(app.selected_stage), "Moon");
        app.activate_selected();
        assert_eq!(app.theme_mode, ThemeMode::Dark);
        assert_eq!(app.theme, Theme::dark());
        assert!(app.theme_transitioning());

        run_frames(&mut app, &clock, 1000);
        assert!(!app.theme_transitioning());
    }

    #[test]
    fn test_hidden_stage_does_nothing() {
        let (mut app, _clock) = app();
        app.select_prev_stage();
        app.activate_selected();
        assert_eq!(app.theme_mode, ThemeMode::Light);
    }

    #[test]
    fn test_section_highlight_waits_for_delay() {
        let (mut app, clock) = app();
        app.frame();
        assert!(!app.sections[0].is_active());
        run_frames(&mut app, &clock, 320);
        assert!(app.sections[0].is_active());
        // Far below the fold
        assert!(!app.sections[SECTIONS.len() - 1].is_active());
    }

    #[test]
    fn test_inertia_settles_after_scrolling() {
        let (mut app, clock) = app();
        app.scroll_by(3);
        assert_ne!(app.menu_offset_rows(), 0);
        run_frames(&mut app, &clock, 150);
        assert_eq!(app.inertia.offset(), 0.0);
        assert!(app.inertia.wobble().is_some());
        run_frames(&mut app, &clock, WOBBLE_MS + 50);
        assert!(app.inertia.wobble().is_none());
    }

    #[test]
    fn test_gallery_rotates_only_on_screen() {
        let (mut app, clock) = app();
        let gallery = app.gallery_section.unwrap();
        run_frames(&mut app, &clock, 7000);
        assert_eq!(app.gallery.current(), 0);
        assert!(!app.gallery.is_playing());

        let top = app.page.region(gallery).unwrap().top;
        app.scroll_by((top / ROW_HEIGHT_PX) as i32);
        app.frame();
        assert!(app.gallery.is_playing());
        run_frames(&mut app, &clock, 6100);
        assert_eq!(app.gallery.current(), 1);
        assert_eq!(app.gallery_caption(), Some(SECTIONS[gallery].slides[1]));

        app.scroll_to_top();
        app.frame();
        assert!(!app.gallery.is_playing());
        run_frames(&mut app, &clock, 7000);
        assert_eq!(app.gallery.current(), 1);
    }

    #[test]
    fn test_next_slide_is_locked_while_changing() {
        let (mut app, clock) = app();
        app.next_slide();
        assert_eq!(app.gallery.current(), 1);
        app.next_slide();
        assert_eq!(app.gallery.current(), 1);
        assert!(app.status_message.is_some());

        run_frames(&mut app, &clock, 1600);
        app.next_slide();
        assert_eq!(app.gallery.current(), 2);
    }

    #[test]
    fn test_quit_stops_engine() {
        let (mut app, _clock) = app();
        app.toggle_menu();
        app.quit();
        assert!(app.should_quit);
        assert!(!app.menu.is_running());
        assert!(!app.progress.is_mounted());
    }
}
