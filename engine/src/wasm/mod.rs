//! JavaScript-facing API.
//!
//! `init_engine` / `search_catalogue` serve pages that render results
//! themselves; `start_app` fetches the catalogue and drives the whole page.

mod dom;

use crate::error::EngineError;
use crate::SearchEngine;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

pub use dom::start_app;

// Use thread_local with RefCell for lazy initialization from JS
thread_local! {
    static ENGINE: RefCell<Option<SearchEngine>> = const { RefCell::new(None) };
}

/// Initialize the search engine with a catalogue and config from JavaScript
/// catalogue_json: JSON array of {id, name, resources: [{type, title, url}]}
/// config_json: JSON object of EngineConfig fields (`{}` for defaults)
#[wasm_bindgen]
pub fn init_engine(catalogue_json: &str, config_json: &str) -> Result<(), JsError> {
    let engine = SearchEngine::from_json(catalogue_json, config_json)?;

    ENGINE.with(|cell| {
        *cell.borrow_mut() = Some(engine);
    });

    Ok(())
}

/// Check if the engine has been initialized
#[wasm_bindgen]
pub fn is_engine_ready() -> bool {
    ENGINE.with(|cell| cell.borrow().is_some())
}

/// Search the catalogue and return the grouped results as a JSON object
/// keyed by organization id, in relevance order
#[wasm_bindgen]
pub fn search_catalogue(query: &str) -> Result<String, JsError> {
    ENGINE.with(|cell| {
        let engine_ref = cell.borrow();
        let engine = engine_ref.as_ref().ok_or(EngineError::NotInitialized)?;
        let groups = engine.search_grouped(query);
        Ok(serde_json::to_string(&groups)?)
    })
}

/// Get total number of resources in the loaded catalogue
#[wasm_bindgen]
pub fn get_resource_count() -> Result<usize, JsError> {
    ENGINE.with(|cell| {
        let engine_ref = cell.borrow();
        let engine = engine_ref.as_ref().ok_or(EngineError::NotInitialized)?;
        Ok(engine.catalogue().resource_count())
    })
}
