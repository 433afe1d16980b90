use std::time::Duration;

use crate::collection::{ImageSource, PhotoCollection};
use crate::error::{GalleryError, Result};

/// Handle for a scheduled timer. The runtime keys its timer on this value and
/// hands it back when the timer fires, so a stale firing can be told apart
/// from the live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Everything the view needs to draw the lightbox.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightboxState {
    pub selected: Option<PhotoCollection>,
    /// Only meaningful while `selected` is set.
    pub current_index: usize,
    pub is_open: bool,
    pub is_auto_playing: bool,
    pub is_loading: bool,
}

impl LightboxState {
    pub fn current_image(&self) -> Option<&ImageSource> {
        self.selected.as_ref()?.image(self.current_index)
    }

    /// Fraction of the collection seen so far, counting the current image.
    pub fn progress(&self) -> f32 {
        match &self.selected {
            Some(c) if !c.is_empty() => (self.current_index + 1) as f32 / c.len() as f32,
            _ => 0.0,
        }
    }
}

struct PendingOpen {
    timer: TimerId,
    collection: PhotoCollection,
}

/// Owns the lightbox state and the timers that drive it.
pub struct Lightbox {
    state: LightboxState,
    pending_open: Option<PendingOpen>,
    auto_play_timer: Option<TimerId>,
    next_timer: u64,
    open_delay: Duration,
    auto_play_interval: Duration,
}

impl Default for Lightbox {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(crate::config::DEFAULT_OPEN_DELAY_MS),
            Duration::from_millis(crate::config::DEFAULT_AUTO_PLAY_INTERVAL_MS),
        )
    }
}

impl Lightbox {
    pub fn new(open_delay: Duration, auto_play_interval: Duration) -> Self {
        Self {
            state: LightboxState::default(),
            pending_open: None,
            auto_play_timer: None,
            next_timer: 0,
            open_delay,
            auto_play_interval,
        }
    }

    pub fn state(&self) -> &LightboxState {
        &self.state
    }

    pub fn open_delay(&self) -> Duration {
        self.open_delay
    }

    pub fn auto_play_interval(&self) -> Duration {
        self.auto_play_interval
    }

    pub fn pending_open_timer(&self) -> Option<TimerId> {
        self.pending_open.as_ref().map(|p| p.timer)
    }

    pub fn auto_play_timer(&self) -> Option<TimerId> {
        self.auto_play_timer
    }

    pub fn active_timer_count(&self) -> usize {
        usize::from(self.pending_open.is_some()) + usize::from(self.auto_play_timer.is_some())
    }

    fn allocate_timer(&mut self) -> TimerId {
        self.next_timer += 1;
        TimerId(self.next_timer)
    }

    /// Enter the loading phase for `collection`. The switch to the open state
    /// happens in [`Lightbox::finish_open`] once the returned timer fires.
    /// A later call replaces any pending open.
    pub fn open_gallery(&mut self, collection: PhotoCollection) -> Result<TimerId> {
        collection.validate()?;

        let timer = self.allocate_timer();
        if let Some(previous) = self.pending_open.as_ref() {
            log::debug!(
                "Open of collection {} superseded by {}",
                previous.collection.id,
                collection.id
            );
        }
        log::debug!("Loading collection {} ({:?})", collection.id, timer);
        self.state.is_loading = true;
        self.pending_open = Some(PendingOpen { timer, collection });
        Ok(timer)
    }

    /// The open-delay timer fired. Returns false if `timer` was superseded or
    /// cancelled.
    pub fn finish_open(&mut self, timer: TimerId) -> bool {
        if self.pending_open_timer() != Some(timer) {
            return false;
        }
        let Some(pending) = self.pending_open.take() else {
            return false;
        };

        log::debug!("Opened collection {}", pending.collection.id);
        self.auto_play_timer = None;
        self.state = LightboxState {
            selected: Some(pending.collection),
            current_index: 0,
            is_open: true,
            is_auto_playing: false,
            is_loading: false,
        };
        true
    }

    pub fn close_gallery(&mut self) {
        if self.state.is_open || self.state.is_loading {
            log::debug!("Closing lightbox, {} timer(s) cancelled", self.active_timer_count());
        }
        self.pending_open = None;
        self.auto_play_timer = None;
        self.state = LightboxState::default();
    }

    fn open_len(&self) -> Option<usize> {
        if !self.state.is_open {
            return None;
        }
        self.state.selected.as_ref().map(PhotoCollection::len).filter(|&n| n > 0)
    }

    pub fn next_image(&mut self) {
        if let Some(len) = self.open_len() {
            self.state.current_index = (self.state.current_index + 1) % len;
        }
    }

    pub fn prev_image(&mut self) {
        if let Some(len) = self.open_len() {
            self.state.current_index = (self.state.current_index + len - 1) % len;
        }
    }

    /// Show the image at `index` directly. Ignored while closed; an index past
    /// the end is rejected and the current image stays.
    pub fn jump_to(&mut self, index: usize) -> Result<()> {
        let Some(len) = self.open_len() else {
            return Ok(());
        };
        if index >= len {
            return Err(GalleryError::IndexOutOfRange { index, len });
        }
        self.state.current_index = index;
        Ok(())
    }

    /// Flip auto-play. Ignored unless the lightbox is open, since auto-play
    /// may never be on while closed.
    pub fn toggle_auto_play(&mut self) {
        if !self.state.is_open {
            return;
        }
        if self.state.is_auto_playing {
            self.state.is_auto_playing = false;
            self.auto_play_timer = None;
            log::debug!("Auto-play stopped");
        } else {
            let timer = self.allocate_timer();
            self.state.is_auto_playing = true;
            self.auto_play_timer = Some(timer);
            log::debug!("Auto-play started ({:?})", timer);
        }
    }

    /// The auto-play timer fired. Advances like [`Lightbox::next_image`] if
    /// `timer` is still the live one.
    pub fn auto_play_tick(&mut self, timer: TimerId) -> bool {
        if !self.state.is_open || self.auto_play_timer != Some(timer) {
            return false;
        }
        self.next_image();
        true
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn collection(id: u32, images: usize) -> PhotoCollection {
        PhotoCollection {
            id,
            title: format!("Collection {id}"),
            description: String::new(),
            cover_image: ImageSource::Local(PathBuf::from("cover.jpg")),
            images: (0..images)
                .map(|i| ImageSource::Local(PathBuf::from(format!("{id}-{i}.jpg"))))
                .collect(),
        }
    }

    fn opened(images: usize) -> Lightbox {
        let mut lightbox = Lightbox::default();
        let timer = lightbox.open_gallery(collection(1, images)).unwrap();
        assert!(lightbox.finish_open(timer));
        lightbox
    }

    fn selected_id(lightbox: &Lightbox) -> Option<u32> {
        lightbox.state().selected.as_ref().map(|c| c.id)
    }

    #[test]
    fn starts_closed() {
        let lightbox = Lightbox::default();
        assert_eq!(lightbox.state(), &LightboxState::default());
        assert_eq!(lightbox.active_timer_count(), 0);
        assert_eq!(lightbox.open_delay(), Duration::from_millis(300));
        assert_eq!(lightbox.auto_play_interval(), Duration::from_millis(4000));
    }

    #[test]
    fn open_goes_through_loading() {
        let mut lightbox = Lightbox::default();
        let timer = lightbox.open_gallery(collection(1, 4)).unwrap();

        assert!(lightbox.state().is_loading);
        assert!(!lightbox.state().is_open);
        assert!(lightbox.state().selected.is_none());
        assert_eq!(lightbox.pending_open_timer(), Some(timer));

        assert!(lightbox.finish_open(timer));
        let state = lightbox.state();
        assert!(state.is_open);
        assert!(!state.is_loading);
        assert_eq!(state.current_index, 0);
        assert_eq!(selected_id(&lightbox), Some(1));
        assert_eq!(lightbox.pending_open_timer(), None);
    }

    #[test]
    fn open_rejects_empty_collection() {
        let mut lightbox = Lightbox::default();
        let err = lightbox.open_gallery(collection(9, 0)).unwrap_err();
        assert!(matches!(err, GalleryError::InvalidCollection { id: 9 }));
        assert_eq!(lightbox.state(), &LightboxState::default());
        assert_eq!(lightbox.active_timer_count(), 0);
    }

    #[test]
    fn next_wraps_after_last_image() {
        // Four images: three steps reach the end, the fourth wraps.
        let mut lightbox = opened(4);
        for _ in 0..3 {
            lightbox.next_image();
        }
        assert_eq!(lightbox.state().current_index, 3);
        lightbox.next_image();
        assert_eq!(lightbox.state().current_index, 0);
    }

    #[test]
    fn prev_from_first_goes_to_last() {
        let mut lightbox = opened(5);
        lightbox.prev_image();
        assert_eq!(lightbox.state().current_index, 4);
    }

    #[test]
    fn full_cycle_returns_to_start() {
        for len in 1..=6 {
            for start in 0..len {
                let mut lightbox = opened(len);
                lightbox.jump_to(start).unwrap();
                for _ in 0..len {
                    lightbox.next_image();
                    assert!(lightbox.state().current_index < len);
                }
                assert_eq!(lightbox.state().current_index, start);
                for _ in 0..len {
                    lightbox.prev_image();
                    assert!(lightbox.state().current_index < len);
                }
                assert_eq!(lightbox.state().current_index, start);
            }
        }
    }

    #[test]
    fn single_image_collection_stays_put() {
        let mut lightbox = opened(1);
        lightbox.next_image();
        assert_eq!(lightbox.state().current_index, 0);
        lightbox.prev_image();
        assert_eq!(lightbox.state().current_index, 0);
    }

    #[test]
    fn navigation_is_ignored_while_closed() {
        let mut lightbox = Lightbox::default();
        lightbox.next_image();
        lightbox.prev_image();
        assert!(lightbox.jump_to(3).is_ok());
        lightbox.toggle_auto_play();
        assert_eq!(lightbox.state(), &LightboxState::default());
        assert_eq!(lightbox.active_timer_count(), 0);
    }

    #[test]
    fn navigation_is_ignored_while_loading() {
        let mut lightbox = Lightbox::default();
        lightbox.open_gallery(collection(1, 3)).unwrap();
        lightbox.next_image();
        lightbox.toggle_auto_play();
        assert_eq!(lightbox.state().current_index, 0);
        assert!(!lightbox.state().is_auto_playing);
        assert_eq!(lightbox.auto_play_timer(), None);
    }

    #[test]
    fn jump_to_sets_index_directly() {
        let mut lightbox = opened(4);
        lightbox.jump_to(2).unwrap();
        assert_eq!(lightbox.state().current_index, 2);
        lightbox.jump_to(0).unwrap();
        assert_eq!(lightbox.state().current_index, 0);
    }

    #[test]
    fn jump_to_out_of_range_fails_and_keeps_index() {
        let mut lightbox = opened(3);
        lightbox.jump_to(1).unwrap();
        let err = lightbox.jump_to(3).unwrap_err();
        assert!(matches!(err, GalleryError::IndexOutOfRange { index: 3, len: 3 }));
        assert_eq!(lightbox.state().current_index, 1);
    }

    #[test]
    fn close_resets_everything() {
        let mut lightbox = opened(4);
        lightbox.next_image();
        lightbox.toggle_auto_play();
        assert!(lightbox.state().is_auto_playing);

        lightbox.close_gallery();
        assert_eq!(lightbox.state(), &LightboxState::default());
        assert!(!lightbox.state().is_auto_playing);
        assert_eq!(lightbox.active_timer_count(), 0);
    }

    #[test]
    fn close_is_idempotent() {
        let mut once = opened(4);
        once.toggle_auto_play();
        once.close_gallery();
        let snapshot = once.state().clone();

        once.close_gallery();
        assert_eq!(once.state(), &snapshot);
        assert_eq!(once.active_timer_count(), 0);
    }

    #[test]
    fn close_during_loading_cancels_open() {
        let mut lightbox = Lightbox::default();
        let timer = lightbox.open_gallery(collection(1, 3)).unwrap();
        lightbox.close_gallery();

        assert!(!lightbox.state().is_loading);
        assert!(!lightbox.finish_open(timer));
        assert!(!lightbox.state().is_open);
        assert_eq!(lightbox.active_timer_count(), 0);
    }

    #[test]
    fn later_open_supersedes_pending_one() {
        let mut lightbox = Lightbox::default();
        let first = lightbox.open_gallery(collection(1, 4)).unwrap();
        let second = lightbox.open_gallery(collection(2, 3)).unwrap();
        assert_ne!(first, second);
        assert_eq!(lightbox.active_timer_count(), 1);

        assert!(!lightbox.finish_open(first));
        assert!(lightbox.state().is_loading);
        assert!(lightbox.state().selected.is_none());

        assert!(lightbox.finish_open(second));
        assert_eq!(selected_id(&lightbox), Some(2));
        assert_eq!(lightbox.state().current_index, 0);

        // The stale timer arriving late changes nothing.
        assert!(!lightbox.finish_open(first));
        assert_eq!(selected_id(&lightbox), Some(2));
    }

    #[test]
    fn toggle_auto_play_starts_and_cancels_timer() {
        let mut lightbox = opened(3);
        lightbox.toggle_auto_play();
        let timer = lightbox.auto_play_timer().expect("timer should be running");
        assert!(lightbox.state().is_auto_playing);

        lightbox.toggle_auto_play();
        assert!(!lightbox.state().is_auto_playing);
        assert_eq!(lightbox.auto_play_timer(), None);
        assert!(!lightbox.auto_play_tick(timer));
        assert_eq!(lightbox.state().current_index, 0);
    }

    #[test]
    fn auto_play_advances_once_per_tick() {
        let mut lightbox = opened(4);
        lightbox.jump_to(2).unwrap();
        lightbox.toggle_auto_play();
        let timer = lightbox.auto_play_timer().unwrap();

        for _ in 0..3 {
            assert!(lightbox.auto_play_tick(timer));
            assert_eq!(lightbox.auto_play_timer(), Some(timer));
            assert_eq!(lightbox.active_timer_count(), 1);
        }
        assert_eq!(lightbox.state().current_index, (2 + 3) % 4);
    }

    #[test]
    fn restarting_auto_play_issues_fresh_timer() {
        let mut lightbox = opened(4);
        lightbox.toggle_auto_play();
        let first = lightbox.auto_play_timer().unwrap();
        lightbox.toggle_auto_play();
        lightbox.toggle_auto_play();
        let second = lightbox.auto_play_timer().unwrap();

        assert_ne!(first, second);
        assert_eq!(lightbox.active_timer_count(), 1);
        assert!(!lightbox.auto_play_tick(first));
        assert!(lightbox.auto_play_tick(second));
        assert_eq!(lightbox.state().current_index, 1);
    }

    #[test]
    fn tick_after_close_is_ignored() {
        let mut lightbox = opened(4);
        lightbox.toggle_auto_play();
        let timer = lightbox.auto_play_timer().unwrap();
        lightbox.close_gallery();

        assert!(!lightbox.auto_play_tick(timer));
        assert_eq!(lightbox.state(), &LightboxState::default());
    }

    #[test]
    fn reopening_turns_auto_play_off() {
        let mut lightbox = opened(4);
        lightbox.toggle_auto_play();
        let old = lightbox.auto_play_timer().unwrap();

        let timer = lightbox.open_gallery(collection(2, 2)).unwrap();
        assert!(lightbox.finish_open(timer));
        assert!(!lightbox.state().is_auto_playing);
        assert_eq!(lightbox.auto_play_timer(), None);
        assert!(!lightbox.auto_play_tick(old));
    }

    #[test]
    fn current_image_and_progress_follow_index() {
        let mut lightbox = opened(4);
        assert_eq!(
            lightbox.state().current_image(),
            Some(&ImageSource::Local(PathBuf::from("1-0.jpg")))
        );
        assert_eq!(lightbox.state().progress(), 0.25);
        lightbox.prev_image();
        assert_eq!(
            lightbox.state().current_image(),
            Some(&ImageSource::Local(PathBuf::from("1-3.jpg")))
        );
        assert_eq!(lightbox.state().progress(), 1.0);
        assert_eq!(LightboxState::default().progress(), 0.0);
    }
}
