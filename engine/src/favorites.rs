use crate::error::Result;
use crate::store::KeyValueStore;
use crate::types::FavoriteEntry;
use serde::Deserialize;

/// Storage key holding the JSON array of `{url, title}`
pub const FAVORITES_KEY: &str = "favorites";

/// Message shown in the favourites panel when nothing is saved
pub const EMPTY_FAVORITES_MESSAGE: &str = "No tienes favoritos guardados";

/// Persisted set of bookmarked resources, keyed by url, in insertion order.
/// Every mutation is written back to the store before returning.
pub struct FavoritesRegistry<S: KeyValueStore> {
    store: S,
    entries: Vec<FavoriteEntry>,
}

impl<S: KeyValueStore> FavoritesRegistry<S> {
    /// Load from the store; a missing or corrupt value yields an empty registry
    pub fn load(store: S) -> Self {
        let entries = match store.get(FAVORITES_KEY) {
            Some(raw) => decode(&raw),
            None => Vec::new(),
        };
        FavoritesRegistry { store, entries }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.iter().any(|fav| fav.url == url)
    }

    pub fn list(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a favourite; a url already present is left untouched
    pub fn add(&mut self, url: &str, title: &str) -> Result<()> {
        if self.contains(url) {
            return Ok(());
        }
        self.entries.push(FavoriteEntry {
            url: url.to_string(),
            title: title.to_string(),
        });
        self.persist()
    }

    /// Remove a favourite; returns whether it was present
    pub fn remove(&mut self, url: &str) -> Result<bool> {
        let before = self.entries.len();
        self.entries.retain(|fav| fav.url != url);
        if self.entries.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Flip the favourite state of a resource; returns the new state
    pub fn toggle(&mut self, url: &str, title: &str) -> Result<bool> {
        if self.remove(url)? {
            Ok(false)
        } else {
            self.add(url, title)?;
            Ok(true)
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.entries)?;
        self.store.set(FAVORITES_KEY, &json)
    }
}

#[derive(Deserialize)]
struct StoredFavorite {
    url: String,
    #[serde(default)]
    title: String,
}

/// Decode the persisted array, dropping duplicate urls; invalid JSON is empty
fn decode(raw: &str) -> Vec<FavoriteEntry> {
    let stored: Vec<StoredFavorite> = match serde_json::from_str(raw) {
        Ok(stored) => stored,
        Err(e) => {
            console_warn!("[favorites] ignoring malformed stored value: {}", e);
            return Vec::new();
        }
    };
    let mut entries: Vec<FavoriteEntry> = Vec::with_capacity(stored.len());
    for fav in stored {
        if !entries.iter().any(|e| e.url == fav.url) {
            entries.push(FavoriteEntry {
                url: fav.url,
                title: fav.title,
            });
        }
    }
    entries
}
