//! Guided tour over page elements.
//!
//! The tour only decides which step is showing. Finding each anchor on the
//! page and positioning the spotlight belongs to the host.

use crate::error::Result;
use crate::store::KeyValueStore;

/// Session-store key set once the tour has been started or skipped
pub const TOUR_SEEN_KEY: &str = "tourSeen";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TourStep {
    pub selector: &'static str,
    pub description: &'static str,
}

pub const TOUR_STEPS: &[TourStep] = &[
    TourStep {
        selector: ".logo",
        description: "Este es el logo de Bibliored Cuba. Haz clic para volver a la página principal.",
    },
    TourStep {
        selector: "#themeToggle",
        description: "Botón para cambiar entre modo oscuro y claro.",
    },
    TourStep {
        selector: ".search-box",
        description: "Barra de búsqueda: Escribe para buscar universidades o recursos.",
    },
    TourStep {
        selector: ".university-section:first-child .university-header",
        description: "Cabecera de universidad: Muestra el nombre y el número de recursos.",
    },
    TourStep {
        selector: ".resource-card:first-child",
        description: "Tarjeta de recurso: Contiene tipo, enlace y botón de favorito.",
    },
    TourStep {
        selector: "#favoritesLink",
        description: "Enlace a favoritos: Abre el modal con tus recursos guardados.",
    },
];

/// Resolves whether a step's element currently exists on the page
pub trait AnchorLocator {
    fn exists(&self, selector: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct Tour {
    steps: &'static [TourStep],
    current: Option<usize>,
}

impl Default for Tour {
    fn default() -> Self {
        Tour::new(TOUR_STEPS)
    }
}

impl Tour {
    pub fn new(steps: &'static [TourStep]) -> Self {
        Tour {
            steps,
            current: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&TourStep> {
        self.current.map(|i| &self.steps[i])
    }

    /// Start from step 0, skipping steps whose anchor is missing
    pub fn start<L: AnchorLocator>(&mut self, locator: &L) -> Option<&TourStep> {
        self.seek(0, locator)
    }

    /// Advance past the current step; ends the tour after the last one
    pub fn advance<L: AnchorLocator>(&mut self, locator: &L) -> Option<&TourStep> {
        match self.current {
            Some(i) => self.seek(i + 1, locator),
            None => None,
        }
    }

    pub fn end(&mut self) {
        self.current = None;
    }

    fn seek<L: AnchorLocator>(&mut self, from: usize, locator: &L) -> Option<&TourStep> {
        self.current = (from..self.steps.len()).find(|&i| locator.exists(self.steps[i].selector));
        self.current()
    }
}

/// Offer the tour prompt only when it has not been seen this session
pub fn should_prompt<S: KeyValueStore>(session: &S) -> bool {
    session.get(TOUR_SEEN_KEY).is_none()
}

pub fn mark_seen<S: KeyValueStore>(session: &mut S) -> Result<()> {
    session.set(TOUR_SEEN_KEY, "true")
}
