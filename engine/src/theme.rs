use crate::error::Result;
use crate::store::KeyValueStore;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Anything other than `"light"` (including absence) is dark
    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        match store.get(THEME_KEY).as_deref() {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn save<S: KeyValueStore>(self, store: &mut S) -> Result<()> {
        store.set(THEME_KEY, self.as_str())
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Glyph on the toggle button, offering the other theme
    pub fn toggle_glyph(self) -> &'static str {
        match self {
            Theme::Dark => "☀️",
            Theme::Light => "🌙",
        }
    }

    /// Body class to apply, if any
    pub fn body_class(self) -> Option<&'static str> {
        match self {
            Theme::Dark => None,
            Theme::Light => Some("light-mode"),
        }
    }
}

/// Flip the stored theme and return the new one
pub fn toggle_theme<S: KeyValueStore>(store: &mut S) -> Result<Theme> {
    let next = Theme::load(store).toggled();
    next.save(store)?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_absent_or_unknown_is_dark() {
        assert_eq!(Theme::load(&MemoryStore::new()), Theme::Dark);
        assert_eq!(Theme::load(&MemoryStore::with(THEME_KEY, "sepia")), Theme::Dark);
        assert_eq!(Theme::load(&MemoryStore::with(THEME_KEY, "light")), Theme::Light);
    }

    #[test]
    fn test_toggle_persists() {
        let mut store = MemoryStore::new();
        assert_eq!(toggle_theme(&mut store).unwrap(), Theme::Light);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(Theme::Light.toggle_glyph(), "🌙");
        assert_eq!(toggle_theme(&mut store).unwrap(), Theme::Dark);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));
    }
}
