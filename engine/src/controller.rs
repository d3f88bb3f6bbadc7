//! Render/pagination controller.
//!
//! Owns the view state and applies a freshly computed view model to the
//! surface after every transition. Favourite button state is re-derived
//! from the registry each time, never patched in place.

use crate::error::Result;
use crate::favorites::FavoritesRegistry;
use crate::parse::is_blank;
use crate::render::{
    page_count, render_favorites_panel, render_filtered, render_unfiltered, FavoritesPanelView,
    ViewModel,
};
use crate::schedule::{Debouncer, Scheduler, TimerHandle};
use crate::store::KeyValueStore;
use crate::types::ViewState;
use crate::SearchEngine;
use std::time::Duration;

/// What the view state means for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Unfiltered { page: usize },
    Filtered { query: String },
}

impl ViewState {
    pub fn mode(&self) -> Mode {
        if is_blank(&self.query_text) {
            Mode::Unfiltered { page: self.page }
        } else {
            Mode::Filtered {
                query: self.query_text.clone(),
            }
        }
    }
}

/// Display adapter. Each call replaces the whole relevant subtree.
pub trait Surface {
    fn replace_content(&mut self, view: &ViewModel);
    fn show_favorites(&mut self, panel: &FavoritesPanelView);
}

/// Keyboard input relevant to the search box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    Enter,
    Escape,
    Other,
}

impl SearchKey {
    pub fn from_key(key: &str) -> Self {
        match key {
            "Enter" => SearchKey::Enter,
            "Escape" | "Esc" => SearchKey::Escape,
            _ => SearchKey::Other,
        }
    }
}

pub struct Controller<S: KeyValueStore, T: Scheduler, V: Surface> {
    engine: SearchEngine,
    favorites: FavoritesRegistry<S>,
    scheduler: T,
    surface: V,
    debouncer: Debouncer,
    state: ViewState,
    /// Raw search box contents; becomes the query once searched
    input: String,
    view: ViewModel,
}

impl<S: KeyValueStore, T: Scheduler, V: Surface> Controller<S, T, V> {
    /// Create the controller and render page 1 of the catalogue
    pub fn new(engine: SearchEngine, favorites: FavoritesRegistry<S>, scheduler: T, surface: V) -> Self {
        let delay = Duration::from_millis(engine.config().debounce_ms);
        let state = ViewState::default();
        let view = compute_view(&engine, &state, &favorites);
        let mut controller = Controller {
            engine,
            favorites,
            scheduler,
            surface,
            debouncer: Debouncer::new(delay),
            state,
            input: String::new(),
            view,
        };
        controller.surface.replace_content(&controller.view);
        controller
    }

    pub fn view_state(&self) -> &ViewState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    pub fn favorites(&self) -> &FavoritesRegistry<S> {
        &self.favorites
    }

    pub fn surface(&self) -> &V {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut V {
        &mut self.surface
    }

    pub fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }

    /// Keystroke in the search box: schedule a search after the quiet period
    pub fn on_input(&mut self, text: &str) -> TimerHandle {
        self.input = text.to_string();
        self.debouncer.trigger(&mut self.scheduler)
    }

    /// A timer elapsed; only the most recent one runs the search
    pub fn on_timer(&mut self, handle: TimerHandle) -> bool {
        if !self.debouncer.fire(handle) {
            return false;
        }
        let query = self.input.clone();
        self.apply_query(&query);
        true
    }

    /// Search button or Enter: search now
    pub fn on_submit(&mut self) {
        self.debouncer.cancel(&mut self.scheduler);
        let query = self.input.clone();
        self.apply_query(&query);
    }

    /// Clear affordance or Escape: empty the query and show page 1
    pub fn on_clear(&mut self) {
        self.debouncer.cancel(&mut self.scheduler);
        self.input.clear();
        self.apply_query("");
    }

    pub fn on_key(&mut self, key: SearchKey) {
        match key {
            SearchKey::Enter => self.on_submit(),
            SearchKey::Escape => self.on_clear(),
            SearchKey::Other => {}
        }
    }

    /// Jump to a page of the unfiltered catalogue. Ignored while filtering.
    pub fn on_page(&mut self, page: usize) {
        if !matches!(self.state.mode(), Mode::Unfiltered { .. }) {
            return;
        }
        let total = self.total_pages();
        self.state.page = page.clamp(1, total.max(1));
        self.rerender();
    }

    pub fn on_next_page(&mut self) {
        let page = self.state.page + 1;
        self.on_page(page);
    }

    pub fn on_previous_page(&mut self) {
        let page = self.state.page.saturating_sub(1);
        self.on_page(page);
    }

    /// Flip a resource's favourite state and re-render; returns the new state
    pub fn on_toggle_favorite(&mut self, url: &str, title: &str) -> Result<bool> {
        let active = self.favorites.toggle(url, title)?;
        self.rerender();
        Ok(active)
    }

    /// Remove from the favourites panel; refreshes both panel and buttons
    pub fn on_remove_favorite(&mut self, url: &str) -> Result<()> {
        self.favorites.remove(url)?;
        self.rerender();
        self.on_show_favorites();
        Ok(())
    }

    pub fn on_show_favorites(&mut self) {
        let panel = render_favorites_panel(&self.favorites);
        self.surface.show_favorites(&panel);
    }

    pub fn total_pages(&self) -> usize {
        page_count(self.engine.catalogue().len(), self.engine.config().page_size)
    }

    fn apply_query(&mut self, query: &str) {
        if is_blank(query) {
            self.state = ViewState::default();
        } else {
            self.state.query_text = query.trim().to_string();
        }
        self.rerender();
    }

    fn rerender(&mut self) {
        self.view = compute_view(&self.engine, &self.state, &self.favorites);
        // The clear affordance follows the search box, not the committed query
        self.view.clear_visible = !self.input.is_empty();
        self.surface.replace_content(&self.view);
    }
}

/// The view for a state, computed from scratch
pub fn compute_view<S: KeyValueStore>(
    engine: &SearchEngine,
    state: &ViewState,
    favorites: &FavoritesRegistry<S>,
) -> ViewModel {
    match state.mode() {
        Mode::Unfiltered { page } => {
            render_unfiltered(engine.catalogue(), page, engine.config().page_size, favorites)
        }
        Mode::Filtered { query } => {
            let groups = engine.search_grouped(&query);
            render_filtered(engine.catalogue(), &groups, &query, favorites)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::render::{FAVORITE_OFF_GLYPH, FAVORITE_ON_GLYPH};
    use crate::schedule::ManualScheduler;
    use crate::store::MemoryStore;
    use crate::types::{Catalogue, Organization, Resource};

    #[derive(Default)]
    struct Recorder {
        views: Vec<ViewModel>,
        panels: Vec<FavoritesPanelView>,
    }

    impl Surface for Recorder {
        fn replace_content(&mut self, view: &ViewModel) {
            self.views.push(view.clone());
        }

        fn show_favorites(&mut self, panel: &FavoritesPanelView) {
            self.panels.push(panel.clone());
        }
    }

    fn catalogue() -> Catalogue {
        let mut organizations = vec![
            Organization {
                id: "u1".into(),
                name: "Havana University".into(),
                resources: vec![Resource {
                    kind: "course".into(),
                    title: "Intro to Algorithms".into(),
                    url: "http://a".into(),
                }],
            },
            Organization {
                id: "u2".into(),
                name: "Matanzas Tech".into(),
                resources: vec![Resource {
                    kind: "library".into(),
                    title: "Digital Library".into(),
                    url: "http://b".into(),
                }],
            },
        ];
        for i in 3..=7 {
            organizations.push(Organization {
                id: format!("u{}", i),
                name: format!("Centro {}", i),
                resources: vec![],
            });
        }
        Catalogue::new(organizations)
    }

    fn controller() -> Controller<MemoryStore, ManualScheduler, Recorder> {
        let engine = SearchEngine::new(catalogue(), EngineConfig::default());
        Controller::new(
            engine,
            FavoritesRegistry::load(MemoryStore::new()),
            ManualScheduler::new(),
            Recorder::default(),
        )
    }

    fn section_ids(view: &ViewModel) -> Vec<&str> {
        view.sections.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_initial_render_is_page_one() {
        let c = controller();
        assert_eq!(c.surface().views.len(), 1);
        assert_eq!(section_ids(c.view()), vec!["u1", "u2", "u3", "u4", "u5"]);
        assert_eq!(c.mode(), Mode::Unfiltered { page: 1 });
    }

    #[test]
    fn test_typing_is_debounced() {
        let mut c = controller();
        c.on_input("alg");
        c.scheduler_mut().advance(Duration::from_millis(100));
        c.on_input("algo");
        c.scheduler_mut().advance(Duration::from_millis(100));
        let last = c.on_input("algorithm");
        assert_eq!(c.surface().views.len(), 1);

        let due = c.scheduler_mut().advance(Duration::from_millis(300));
        assert_eq!(due, vec![last]);
        for handle in due {
            assert!(c.on_timer(handle));
        }
        assert_eq!(c.surface().views.len(), 2);
        assert_eq!(section_ids(c.view()), vec!["u1"]);
        assert!(c.view().pagination.is_none());
    }

    #[test]
    fn test_submit_bypasses_debounce() {
        let mut c = controller();
        let pending = c.on_input("digital");
        c.on_key(SearchKey::Enter);
        assert_eq!(section_ids(c.view()), vec!["u2"]);
        assert!(!c.on_timer(pending));
        assert_eq!(c.surface().views.len(), 2);
    }

    #[test]
    fn test_escape_restores_page_one() {
        let mut c = controller();
        c.on_page(2);
        c.on_input("havana");
        c.on_submit();
        assert_eq!(c.mode(), Mode::Filtered { query: "havana".into() });

        c.on_key(SearchKey::Escape);
        assert_eq!(c.mode(), Mode::Unfiltered { page: 1 });
        assert_eq!(c.input(), "");
        assert_eq!(section_ids(c.view()), vec!["u1", "u2", "u3", "u4", "u5"]);
        assert!(!c.view().clear_visible);
    }

    #[test]
    fn test_clear_visible_follows_raw_input() {
        let mut c = controller();
        c.on_input("abc");
        c.on_toggle_favorite("http://a", "Intro to Algorithms").unwrap();
        assert_eq!(c.mode(), Mode::Unfiltered { page: 1 });
        assert!(c.view().clear_visible);

        c.on_input("   ");
        c.on_submit();
        assert_eq!(c.mode(), Mode::Unfiltered { page: 1 });
        assert!(c.view().clear_visible);

        c.on_clear();
        assert!(!c.view().clear_visible);
    }

    #[test]
    fn test_no_results_state() {
        let mut c = controller();
        c.on_input("zzz_no_match");
        c.on_submit();
        assert!(c.view().no_results);
        assert!(c.view().sections.is_empty());
    }

    #[test]
    fn test_paging_clamps_and_ignores_filtered() {
        let mut c = controller();
        c.on_next_page();
        assert_eq!(section_ids(c.view()), vec!["u6", "u7"]);
        c.on_next_page();
        assert_eq!(c.view_state().page, 2);
        c.on_previous_page();
        c.on_previous_page();
        assert_eq!(c.view_state().page, 1);

        c.on_input("tech");
        c.on_submit();
        let before = c.surface().views.len();
        c.on_page(2);
        assert_eq!(c.surface().views.len(), before);
    }

    #[test]
    fn test_favorite_toggle_rerenders_buttons() {
        let mut c = controller();
        assert!(c.on_toggle_favorite("http://a", "Intro to Algorithms").unwrap());
        assert_eq!(c.view().sections[0].resources[0].favorite.glyph, FAVORITE_ON_GLYPH);

        c.on_input("algorithm");
        c.on_submit();
        assert!(c.view().sections[0].resources[0].favorite.active);

        assert!(!c.on_toggle_favorite("http://a", "Intro to Algorithms").unwrap());
        assert_eq!(c.view().sections[0].resources[0].favorite.glyph, FAVORITE_OFF_GLYPH);
        assert!(c.favorites().is_empty());
    }

    #[test]
    fn test_remove_from_panel_updates_view() {
        let mut c = controller();
        c.on_toggle_favorite("http://b", "Digital Library").unwrap();
        c.on_show_favorites();
        assert_eq!(c.surface().panels.last().unwrap().entries.len(), 1);

        c.on_remove_favorite("http://b").unwrap();
        assert!(c.surface().panels.last().unwrap().entries.is_empty());
        assert!(!c.view().sections[1].resources[0].favorite.active);
    }
}
