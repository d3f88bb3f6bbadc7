//! Browser host: DOM surface, web storage, `setTimeout` scheduling and the
//! event wiring that feeds the controller.

use crate::catalogue::parse_catalogue;
use crate::config::EngineConfig;
use crate::controller::{Controller, SearchKey, Surface};
use crate::error::{EngineError, Result};
use crate::favorites::FavoritesRegistry;
use crate::html::{favorites_html, pagination_html, sections_html};
use crate::render::{FavoritesPanelView, ViewModel};
use crate::schedule::{Scheduler, TimerHandle};
use crate::store::KeyValueStore;
use crate::theme::{toggle_theme, Theme};
use crate::tour::{self, AnchorLocator, Tour};
use crate::types::Catalogue;
use crate::SearchEngine;
use js_sys::{Function, Promise};
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, HtmlInputElement, KeyboardEvent, Response,
    Storage, Window,
};

type App = Controller<BrowserStore, TimeoutScheduler, DomSurface>;

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
    static TOUR: RefCell<Tour> = RefCell::new(Tour::default());
}

/// Run `f` against the live app, if it is loaded and not already borrowed
fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
    APP.with(|cell| match cell.try_borrow_mut() {
        Ok(mut app) => app.as_mut().map(f),
        Err(_) => {
            console_warn!("[app] event ignored while a render is in progress");
            None
        }
    })
}

fn to_js(e: EngineError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// localStorage / sessionStorage, or nothing when the browser denies access
pub struct BrowserStore {
    storage: Option<Storage>,
}

impl BrowserStore {
    pub fn local(window: &Window) -> Self {
        BrowserStore {
            storage: window.local_storage().ok().flatten(),
        }
    }

    pub fn session(window: &Window) -> Self {
        BrowserStore {
            storage: window.session_storage().ok().flatten(),
        }
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| EngineError::Storage("web storage unavailable".into()))?;
        storage
            .set_item(key, value)
            .map_err(|e| EngineError::Storage(format!("{:?}", e)))
    }
}

/// A scheduled `setTimeout` and the closure it will call
struct Timeout {
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

/// `setTimeout`-backed scheduler; elapsed handles go to `App::on_timer`.
/// Callbacks live until their timeout is cleared or has fired.
pub struct TimeoutScheduler {
    window: Window,
    next_id: u64,
    timeouts: HashMap<TimerHandle, Timeout>,
    /// Fired timeouts whose closures are dropped on the next scheduler call
    fired: Vec<TimerHandle>,
}

impl TimeoutScheduler {
    pub fn new(window: Window) -> Self {
        TimeoutScheduler {
            window,
            next_id: 0,
            timeouts: HashMap::new(),
            fired: Vec::new(),
        }
    }

    /// A closure cannot be dropped while it runs, so fired ones are released here
    fn release_fired(&mut self) {
        for handle in self.fired.drain(..) {
            self.timeouts.remove(&handle);
        }
    }
}

impl Scheduler for TimeoutScheduler {
    fn schedule_after(&mut self, delay: Duration) -> TimerHandle {
        self.release_fired();
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);

        let callback: Closure<dyn FnMut()> = Closure::once(move || {
            with_app(|app| {
                app.scheduler_mut().fired.push(handle);
                app.on_timer(handle)
            });
        });
        let function: &Function = callback.as_ref().unchecked_ref();
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(function, millis)
        {
            Ok(id) => {
                self.timeouts.insert(
                    handle,
                    Timeout {
                        id,
                        _callback: callback,
                    },
                );
            }
            Err(e) => console_error!("[schedule] setTimeout failed: {:?}", e),
        }
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.release_fired();
        if let Some(timeout) = self.timeouts.remove(&handle) {
            self.window.clear_timeout_with_handle(timeout.id);
        }
    }
}

fn set_display(element: &Element, value: &str) {
    let result = match element.dyn_ref::<HtmlElement>() {
        Some(html) => html.style().set_property("display", value),
        None => element.set_attribute("style", &format!("display: {}", value)),
    };
    if let Err(e) = result {
        console_warn!("[dom] could not set display: {:?}", e);
    }
}

fn by_id(document: &Document, id: &str) -> Option<Element> {
    document.get_element_by_id(id)
}

pub struct DomSurface {
    sections: Element,
    pagination: Option<Element>,
    no_results: Option<Element>,
    clear: Option<Element>,
    favorites_list: Option<Element>,
    favorites_modal: Option<Element>,
}

impl DomSurface {
    pub fn from_document(document: &Document) -> std::result::Result<Self, JsValue> {
        let sections = match by_id(document, "universities") {
            Some(element) => element,
            None => document
                .query_selector("main")?
                .ok_or("No <main> element to render into")?,
        };
        Ok(DomSurface {
            sections,
            pagination: by_id(document, "pagination"),
            no_results: by_id(document, "noResults"),
            clear: by_id(document, "clearSearch"),
            favorites_list: by_id(document, "favoritesList"),
            favorites_modal: by_id(document, "favoritesModal"),
        })
    }

    /// Replace the content area with the load error; nothing else renders
    pub fn show_load_error(&self, message: &str) {
        self.sections.set_inner_html(&format!(
            r#"<p class="load-error">No se pudo cargar el catálogo: {}</p>"#,
            crate::html::escape(message)
        ));
        if let Some(pagination) = &self.pagination {
            set_display(pagination, "none");
        }
    }

    fn set_clear_visible(&self, visible: bool) {
        if let Some(clear) = &self.clear {
            set_display(clear, if visible { "block" } else { "none" });
        }
    }
}

impl Surface for DomSurface {
    fn replace_content(&mut self, view: &ViewModel) {
        self.sections.set_inner_html(&sections_html(view));

        if let Some(element) = &self.pagination {
            match &view.pagination {
                Some(pagination) => {
                    element.set_inner_html(&pagination_html(pagination));
                    set_display(element, "flex");
                }
                None => {
                    element.set_inner_html("");
                    set_display(element, "none");
                }
            }
        }
        if let Some(element) = &self.no_results {
            set_display(element, if view.no_results { "block" } else { "none" });
        }
        self.set_clear_visible(view.clear_visible);
    }

    fn show_favorites(&mut self, panel: &FavoritesPanelView) {
        if let Some(list) = &self.favorites_list {
            list.set_inner_html(&favorites_html(panel));
        }
        if let Some(modal) = &self.favorites_modal {
            set_display(modal, "block");
        }
    }
}

fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> std::result::Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Nearest element matching `selector` from the event target upwards
fn closest(event: &Event, selector: &str) -> Option<Element> {
    event
        .target()?
        .dyn_into::<Element>()
        .ok()?
        .closest(selector)
        .ok()
        .flatten()
}

fn bind_search(document: &Document) -> std::result::Result<(), JsValue> {
    let input: HtmlInputElement = by_id(document, "searchInput")
        .ok_or("Search input not found")?
        .dyn_into()?;

    let field = input.clone();
    listen(&input, "input", move |_| {
        let text = field.value();
        with_app(|app| {
            app.surface().set_clear_visible(!text.is_empty());
            app.on_input(&text);
        });
    })?;

    let field = input.clone();
    listen(&input, "keydown", move |event| {
        let Some(key) = event
            .dyn_ref::<KeyboardEvent>()
            .map(|e| SearchKey::from_key(&e.key()))
        else {
            return;
        };
        if key == SearchKey::Escape {
            field.set_value("");
        }
        let text = field.value();
        with_app(|app| {
            if key == SearchKey::Enter {
                app.on_input(&text);
            }
            app.on_key(key);
        });
    })?;
    if let Some(button) = by_id(document, "searchButton") {
        let input = input.clone();
        listen(&button, "click", move |_| {
            let text = input.value();
            with_app(|app| {
                app.on_input(&text);
                app.on_submit();
            });
        })?;
    }
    if let Some(clear) = by_id(document, "clearSearch") {
        listen(&clear, "click", move |_| {
            input.set_value("");
            with_app(|app| app.on_clear());
        })?;
    }
    Ok(())
}

/// Favourite buttons are found by delegation, so every re-render is covered
fn bind_content(surface_root: &Element) -> std::result::Result<(), JsValue> {
    listen(surface_root, "click", |event| {
        let Some(button) = closest(&event, ".favorite-btn") else {
            return;
        };
        let url = button.get_attribute("data-url").unwrap_or_default();
        let title = button.get_attribute("data-title").unwrap_or_default();
        if let Some(Err(e)) = with_app(|app| app.on_toggle_favorite(&url, &title)) {
            console_error!("[favorites] {}", e);
        }
    })
}

fn bind_pagination(document: &Document) -> std::result::Result<(), JsValue> {
    let Some(pagination) = by_id(document, "pagination") else {
        return Ok(());
    };
    listen(&pagination, "click", |event| {
        let Some(button) = closest(&event, ".page-btn") else {
            return;
        };
        if button.has_attribute("disabled") {
            return;
        }
        if let Some(page) = button.get_attribute("data-page").and_then(|p| p.parse().ok()) {
            with_app(|app| app.on_page(page));
        }
    })
}

fn bind_favorites(document: &Document) -> std::result::Result<(), JsValue> {
    if let Some(link) = by_id(document, "favoritesLink") {
        listen(&link, "click", |event| {
            event.prevent_default();
            with_app(|app| app.on_show_favorites());
        })?;
    }
    if let Some(list) = by_id(document, "favoritesList") {
        listen(&list, "click", |event| {
            let Some(button) = closest(&event, ".remove-favorite") else {
                return;
            };
            let url = button.get_attribute("data-url").unwrap_or_default();
            if let Some(Err(e)) = with_app(|app| app.on_remove_favorite(&url)) {
                console_error!("[favorites] {}", e);
            }
        })?;
    }
    Ok(())
}

fn bind_modals(document: &Document, window: &Window) -> std::result::Result<(), JsValue> {
    let modals: Vec<Element> = ["favoritesModal", "tourConfirmModal"]
        .iter()
        .filter_map(|id| by_id(document, id))
        .collect();

    let closers = document.query_selector_all(".close-modal")?;
    for i in 0..closers.length() {
        let Some(closer) = closers.get(i) else {
            continue;
        };
        let modals = modals.clone();
        listen(&closer, "click", move |_| {
            for modal in &modals {
                set_display(modal, "none");
            }
        })?;
    }

    listen(window, "click", move |event| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        if let Some(modal) = modals.iter().find(|m| **m == target) {
            set_display(modal, "none");
        }
    })
}

fn bind_menu(document: &Document) -> std::result::Result<(), JsValue> {
    let (Some(hamburger), Some(menu)) = (
        document.query_selector(".hamburger")?,
        document.query_selector(".nav-menu")?,
    ) else {
        return Ok(());
    };
    let (button, nav) = (hamburger.clone(), menu.clone());
    listen(&hamburger, "click", move |_| {
        let open = nav.class_list().toggle("active").unwrap_or(false);
        let _ = button.set_attribute("aria-expanded", if open { "true" } else { "false" });
    })?;
    let links = document.query_selector_all(".nav-link")?;
    for i in 0..links.length() {
        let Some(link) = links.get(i) else {
            continue;
        };
        let hamburger = hamburger.clone();
        let menu = menu.clone();
        listen(&link, "click", move |_| {
            let _ = menu.class_list().remove_1("active");
            let _ = hamburger.set_attribute("aria-expanded", "false");
        })?;
    }
    Ok(())
}

fn apply_theme(document: &Document, theme: Theme) {
    if let Some(body) = document.body() {
        let classes = body.class_list();
        let _ = match theme.body_class() {
            Some(class) => classes.add_1(class),
            None => classes.remove_1("light-mode"),
        };
    }
    if let Some(toggle) = by_id(document, "themeToggle") {
        toggle.set_text_content(Some(theme.toggle_glyph()));
    }
}

fn bind_theme(document: &Document, window: &Window) -> std::result::Result<(), JsValue> {
    apply_theme(document, Theme::load(&BrowserStore::local(window)));
    let Some(toggle) = by_id(document, "themeToggle") else {
        return Ok(());
    };
    let document = document.clone();
    let window = window.clone();
    listen(&toggle, "click", move |_| {
        let mut store = BrowserStore::local(&window);
        match toggle_theme(&mut store) {
            Ok(theme) => apply_theme(&document, theme),
            Err(e) => console_error!("[theme] {}", e),
        }
    })
}

struct DomLocator<'a>(&'a Document);

impl AnchorLocator for DomLocator<'_> {
    fn exists(&self, selector: &str) -> bool {
        matches!(self.0.query_selector(selector), Ok(Some(_)))
    }
}

fn hide_tour(document: &Document) {
    for id in ["tourOverlay", "tourTooltip", "tourSpotlight"] {
        if let Some(element) = by_id(document, id) {
            set_display(&element, "none");
        }
    }
}

/// Spotlight the current step's anchor and place the tooltip beside it
fn show_tour_step(document: &Document, window: &Window) {
    let step = TOUR.with(|tour| tour.borrow().current().copied());
    let Some(step) = step else {
        hide_tour(document);
        return;
    };
    let (Ok(Some(target)), Some(tooltip)) = (
        document.query_selector(step.selector),
        by_id(document, "tourTooltip"),
    ) else {
        return;
    };

    tooltip.set_inner_html(&format!(
        r#"<p>{}</p><button id="nextTourBtn">Siguiente</button>"#,
        crate::html::escape(step.description)
    ));
    set_display(&tooltip, "block");

    let rect = target.get_bounding_client_rect();
    if let (Some(svg), Some(circle)) = (by_id(document, "tourSpotlight"), by_id(document, "spotlightCircle")) {
        let radius = rect.width().max(rect.height()) / 2.0 + 20.0;
        let _ = circle.set_attribute("cx", &(rect.left() + rect.width() / 2.0).to_string());
        let _ = circle.set_attribute("cy", &(rect.top() + rect.height() / 2.0).to_string());
        let _ = circle.set_attribute("r", &radius.to_string());
        set_display(&svg, "block");
    }

    if let Some(tooltip) = tooltip.dyn_ref::<HtmlElement>() {
        let viewport_height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let viewport_width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let height = f64::from(tooltip.offset_height());
        let width = f64::from(tooltip.offset_width());

        let mut top = rect.bottom() + 10.0;
        if top + height > viewport_height {
            top = rect.top() - height - 10.0;
        }
        let left = (rect.left() + rect.width() / 2.0 - width / 2.0)
            .min(viewport_width - width - 10.0)
            .max(10.0);

        let style = tooltip.style();
        let _ = style.set_property("top", &format!("{}px", top));
        let _ = style.set_property("left", &format!("{}px", left));
    }
}

fn start_tour(document: &Document, window: &Window) {
    if let Some(overlay) = by_id(document, "tourOverlay") {
        set_display(&overlay, "block");
    }
    let locator = DomLocator(document);
    TOUR.with(|tour| {
        tour.borrow_mut().start(&locator);
    });
    show_tour_step(document, window);
}

fn bind_tour(document: &Document, window: &Window) -> std::result::Result<(), JsValue> {
    let confirm = by_id(document, "tourConfirmModal");

    if let Some(link) = by_id(document, "helpLink") {
        let (document, window) = (document.clone(), window.clone());
        listen(&link, "click", move |event| {
            event.prevent_default();
            start_tour(&document, &window);
        })?;
    }
    if let Some(button) = by_id(document, "startTourBtn") {
        let (document, window, confirm) = (document.clone(), window.clone(), confirm.clone());
        listen(&button, "click", move |_| {
            if let Some(confirm) = &confirm {
                set_display(confirm, "none");
            }
            start_tour(&document, &window);
            let _ = tour::mark_seen(&mut BrowserStore::session(&window));
        })?;
    }
    if let Some(button) = by_id(document, "skipTourBtn") {
        let (window, confirm) = (window.clone(), confirm.clone());
        listen(&button, "click", move |_| {
            if let Some(confirm) = &confirm {
                set_display(confirm, "none");
            }
            let _ = tour::mark_seen(&mut BrowserStore::session(&window));
        })?;
    }
    if let Some(tooltip) = by_id(document, "tourTooltip") {
        let (document, window) = (document.clone(), window.clone());
        listen(&tooltip, "click", move |event| {
            if closest(&event, "#nextTourBtn").is_none() {
                return;
            }
            let locator = DomLocator(&document);
            TOUR.with(|tour| {
                tour.borrow_mut().advance(&locator);
            });
            show_tour_step(&document, &window);
        })?;
    }
    if let Some(overlay) = by_id(document, "tourOverlay") {
        let document = document.clone();
        listen(&overlay, "click", move |_| {
            TOUR.with(|tour| tour.borrow_mut().end());
            hide_tour(&document);
        })?;
    }

    if let Some(confirm) = &confirm {
        if tour::should_prompt(&BrowserStore::session(window)) {
            set_display(confirm, "block");
        }
    }
    Ok(())
}

async fn fetch_catalogue(window: &Window, url: &str) -> Result<Catalogue> {
    let load_error = |e: JsValue| EngineError::Load(format!("{:?}", e));

    let request: Promise = window.fetch_with_str(url);
    let response: Response = JsFuture::from(request)
        .await
        .map_err(load_error)?
        .dyn_into()
        .map_err(load_error)?;
    if !response.ok() {
        return Err(EngineError::Load(format!(
            "GET {} returned {}",
            url,
            response.status()
        )));
    }
    let body = JsFuture::from(response.text().map_err(load_error)?)
        .await
        .map_err(load_error)?
        .as_string()
        .ok_or_else(|| EngineError::Load("response body is not text".into()))?;
    parse_catalogue(&body)
}

/// Boot the full page: theme, menu, catalogue fetch, search, favourites, tour
#[wasm_bindgen]
pub async fn start_app(config_json: String) -> std::result::Result<(), JsValue> {
    let config = EngineConfig::from_json(&config_json).map_err(to_js)?;
    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;

    bind_theme(&document, &window)?;
    bind_menu(&document)?;
    bind_modals(&document, &window)?;

    let surface = DomSurface::from_document(&document)?;
    let catalogue = match fetch_catalogue(&window, &config.catalogue_url).await {
        Ok(catalogue) => catalogue,
        Err(e) => {
            console_error!("Error loading {}: {}", config.catalogue_url, e);
            surface.show_load_error(&e.to_string());
            return Ok(());
        }
    };

    let content_root = surface.sections.clone();
    let engine = SearchEngine::new(catalogue, config);
    let favorites = FavoritesRegistry::load(BrowserStore::local(&window));
    let app = Controller::new(engine, favorites, TimeoutScheduler::new(window.clone()), surface);
    APP.with(|cell| *cell.borrow_mut() = Some(app));

    bind_search(&document)?;
    bind_content(&content_root)?;
    bind_pagination(&document)?;
    bind_favorites(&document)?;
    bind_tour(&document, &window)?;

    console_log!("Bibliored search initialized");
    Ok(())
}
