//! View-model computation.
//!
//! Everything here is a pure function of the catalogue, the view state and
//! the favourites registry. Applying the result to a display surface is the
//! adapter's job.

use crate::favorites::{FavoritesRegistry, EMPTY_FAVORITES_MESSAGE};
use crate::group::{highlight, GroupedResults, Segment};
use crate::store::KeyValueStore;
use crate::types::{Catalogue, FavoriteEntry, Organization, Resource};
use serde::Serialize;

pub const FAVORITE_ON_GLYPH: &str = "★";
pub const FAVORITE_OFF_GLYPH: &str = "☆";
/// CSS class carried by an active favourite button
pub const ACTIVE_CLASS: &str = "active";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteButton {
    pub active: bool,
    pub glyph: &'static str,
    pub url: String,
    pub title: String,
}

impl FavoriteButton {
    fn for_resource<S: KeyValueStore>(resource: &Resource, favorites: &FavoritesRegistry<S>) -> Self {
        let active = favorites.contains(&resource.url);
        FavoriteButton {
            active,
            glyph: if active {
                FAVORITE_ON_GLYPH
            } else {
                FAVORITE_OFF_GLYPH
            },
            url: resource.url.clone(),
            title: resource.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceView {
    pub kind: String,
    pub url: String,
    pub title: String,
    pub title_segments: Vec<Segment>,
    pub favorite: FavoriteButton,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub id: String,
    pub name: String,
    /// e.g. "3 recursos"
    pub badge: String,
    pub resources: Vec<ResourceView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageButton {
    pub number: usize,
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationView {
    pub current: usize,
    pub total_pages: usize,
    pub previous_disabled: bool,
    pub next_disabled: bool,
    pub pages: Vec<PageButton>,
}

/// Everything the page shows for one view state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub query: String,
    pub sections: Vec<SectionView>,
    /// `None` while filtering or when there is nothing to page through
    pub pagination: Option<PaginationView>,
    pub no_results: bool,
    pub clear_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesPanelView {
    pub entries: Vec<FavoriteEntry>,
    pub empty_message: Option<&'static str>,
}

/// `ceil(organizations / page_size)`
pub fn page_count(organizations: usize, page_size: usize) -> usize {
    organizations.div_ceil(page_size.max(1))
}

/// Clamp a requested page into `1..=total_pages` (1 when there are no pages)
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Organizations `[(page-1)*page_size, page*page_size)` of the catalogue
pub fn page_slice(catalogue: &Catalogue, page: usize, page_size: usize) -> &[Organization] {
    let organizations = catalogue.organizations();
    let page_size = page_size.max(1);
    let start = (page.max(1) - 1).saturating_mul(page_size).min(organizations.len());
    let end = start.saturating_add(page_size).min(organizations.len());
    &organizations[start..end]
}

pub fn pagination(current: usize, total_pages: usize) -> PaginationView {
    PaginationView {
        current,
        total_pages,
        previous_disabled: current <= 1,
        next_disabled: current >= total_pages,
        pages: (1..=total_pages)
            .map(|number| PageButton {
                number,
                current: number == current,
            })
            .collect(),
    }
}

fn badge(org: &Organization) -> String {
    format!("{} recursos", org.resources.len())
}

/// Page `page` of the full catalogue, with pagination controls
pub fn render_unfiltered<S: KeyValueStore>(
    catalogue: &Catalogue,
    page: usize,
    page_size: usize,
    favorites: &FavoritesRegistry<S>,
) -> ViewModel {
    let total_pages = page_count(catalogue.len(), page_size);
    let current = clamp_page(page, total_pages);

    let sections = page_slice(catalogue, current, page_size)
        .iter()
        .map(|org| SectionView {
            id: org.id.clone(),
            name: org.name.clone(),
            badge: badge(org),
            resources: org
                .resources
                .iter()
                .map(|resource| ResourceView {
                    kind: resource.kind.clone(),
                    url: resource.url.clone(),
                    title: resource.title.clone(),
                    title_segments: highlight(&resource.title, &[]),
                    favorite: FavoriteButton::for_resource(resource, favorites),
                })
                .collect(),
        })
        .collect();

    ViewModel {
        query: String::new(),
        sections,
        pagination: (total_pages > 0).then(|| pagination(current, total_pages)),
        no_results: false,
        clear_visible: false,
    }
}

/// Grouped search results on one unpaginated view
pub fn render_filtered<S: KeyValueStore>(
    catalogue: &Catalogue,
    groups: &GroupedResults,
    query: &str,
    favorites: &FavoritesRegistry<S>,
) -> ViewModel {
    let sections = groups
        .iter()
        .map(|(id, group)| SectionView {
            id: id.clone(),
            name: group.name.clone(),
            badge: catalogue
                .get(id)
                .map(badge)
                .unwrap_or_else(|| format!("{} recursos", group.resources.len())),
            resources: group
                .resources
                .iter()
                .map(|annotated| ResourceView {
                    kind: annotated.resource.kind.clone(),
                    url: annotated.resource.url.clone(),
                    title: annotated.resource.title.clone(),
                    title_segments: annotated.title_segments.clone(),
                    favorite: FavoriteButton::for_resource(&annotated.resource, favorites),
                })
                .collect(),
        })
        .collect::<Vec<_>>();

    ViewModel {
        query: query.to_string(),
        no_results: sections.is_empty(),
        sections,
        pagination: None,
        clear_visible: !query.is_empty(),
    }
}

pub fn render_favorites_panel<S: KeyValueStore>(favorites: &FavoritesRegistry<S>) -> FavoritesPanelView {
    FavoritesPanelView {
        entries: favorites.list().to_vec(),
        empty_message: favorites.is_empty().then_some(EMPTY_FAVORITES_MESSAGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn catalogue(n: usize) -> Catalogue {
        Catalogue::new(
            (1..=n)
                .map(|i| Organization {
                    id: format!("u{}", i),
                    name: format!("University {}", i),
                    resources: vec![Resource {
                        kind: "course".into(),
                        title: format!("Course {}", i),
                        url: format!("http://u{}/course", i),
                    }],
                })
                .collect(),
        )
    }

    fn favorites() -> FavoritesRegistry<MemoryStore> {
        FavoritesRegistry::load(MemoryStore::new())
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 5), 0);
        assert_eq!(page_count(5, 5), 1);
        assert_eq!(page_count(11, 5), 3);
    }

    #[test]
    fn test_page_slice_bounds() {
        let catalogue = catalogue(11);
        let ids = |page| -> Vec<String> {
            page_slice(&catalogue, page, 5).iter().map(|o| o.id.clone()).collect()
        };
        assert_eq!(ids(1), vec!["u1", "u2", "u3", "u4", "u5"]);
        assert_eq!(ids(3), vec!["u11"]);
        assert!(ids(4).is_empty());
    }

    #[test]
    fn test_first_and_last_page_controls() {
        let catalogue = catalogue(11);
        let first = render_unfiltered(&catalogue, 1, 5, &favorites());
        let pager = first.pagination.unwrap();
        assert!(pager.previous_disabled);
        assert!(!pager.next_disabled);
        assert_eq!(pager.pages.len(), 3);
        assert!(pager.pages[0].current);

        let last = render_unfiltered(&catalogue, 3, 5, &favorites());
        let pager = last.pagination.unwrap();
        assert!(!pager.previous_disabled);
        assert!(pager.next_disabled);
        assert_eq!(last.sections.len(), 1);
    }

    #[test]
    fn test_out_of_range_page_is_clamped() {
        let catalogue = catalogue(6);
        let view = render_unfiltered(&catalogue, 9, 5, &favorites());
        assert_eq!(view.pagination.unwrap().current, 2);
        assert_eq!(view.sections[0].id, "u6");
    }

    #[test]
    fn test_empty_catalogue_has_no_pagination() {
        let view = render_unfiltered(&Catalogue::default(), 1, 5, &favorites());
        assert!(view.sections.is_empty());
        assert!(view.pagination.is_none());
        assert!(!view.no_results);
    }

    #[test]
    fn test_favorite_state_is_derived() {
        let catalogue = catalogue(2);
        let mut favorites = favorites();
        favorites.add("http://u2/course", "Course 2").unwrap();
        let view = render_unfiltered(&catalogue, 1, 5, &favorites);
        let buttons: Vec<&FavoriteButton> =
            view.sections.iter().map(|s| &s.resources[0].favorite).collect();
        assert_eq!(buttons[0].glyph, FAVORITE_OFF_GLYPH);
        assert!(!buttons[0].active);
        assert_eq!(buttons[1].glyph, FAVORITE_ON_GLYPH);
        assert!(buttons[1].active);
    }

    #[test]
    fn test_filtered_without_groups_shows_no_results() {
        let view = render_filtered(&catalogue(2), &GroupedResults::new(), "zzz", &favorites());
        assert!(view.no_results);
        assert!(view.sections.is_empty());
        assert!(view.pagination.is_none());
        assert!(view.clear_visible);
    }

    #[test]
    fn test_favorites_panel() {
        let mut favorites = favorites();
        assert_eq!(
            render_favorites_panel(&favorites),
            FavoritesPanelView {
                entries: vec![],
                empty_message: Some(EMPTY_FAVORITES_MESSAGE),
            }
        );
        favorites.add("http://a", "A").unwrap();
        let panel = render_favorites_panel(&favorites);
        assert_eq!(panel.entries.len(), 1);
        assert_eq!(panel.empty_message, None);
    }
}
