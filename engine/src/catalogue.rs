use crate::error::{EngineError, Result};
use crate::types::{Catalogue, Organization};
use std::collections::HashSet;

/// Parse the catalogue document: an array of `{id, name, resources: [...]}`
pub fn parse_catalogue(json: &str) -> Result<Catalogue> {
    let organizations: Vec<Organization> = serde_json::from_str(json)?;
    validate(&organizations)?;
    Ok(Catalogue::new(organizations))
}

/// Organization ids anchor DOM sections, so they must be non-empty and unique
fn validate(organizations: &[Organization]) -> Result<()> {
    let mut seen = HashSet::new();
    for org in organizations {
        if org.id.trim().is_empty() {
            return Err(EngineError::InvalidCatalogue(format!(
                "organization '{}' has an empty id",
                org.name
            )));
        }
        if !seen.insert(org.id.as_str()) {
            return Err(EngineError::InvalidCatalogue(format!(
                "duplicate organization id '{}'",
                org.id
            )));
        }
    }
    Ok(())
}

/// Fetch and parse a catalogue over HTTP
#[cfg(feature = "native")]
pub fn fetch_catalogue(url: &str) -> Result<Catalogue> {
    let response = reqwest::blocking::get(url).map_err(|e| EngineError::Load(e.to_string()))?;
    if !response.status().is_success() {
        return Err(EngineError::Load(format!(
            "GET {} returned {}",
            url,
            response.status()
        )));
    }
    let body = response
        .text()
        .map_err(|e| EngineError::Load(e.to_string()))?;
    parse_catalogue(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalogue() {
        let json = r#"[
            {"id": "uh", "name": "Universidad de La Habana", "resources": [
                {"type": "repositorio", "title": "Repositorio UH", "url": "https://repo.uh.cu"}
            ]},
            {"id": "umcc", "name": "Universidad de Matanzas", "resources": []}
        ]"#;
        let catalogue = parse_catalogue(json).unwrap();
        assert_eq!(catalogue.len(), 2);
        assert_eq!(catalogue.resource_count(), 1);
        assert_eq!(catalogue.organizations()[0].resources[0].kind, "repositorio");
    }

    #[test]
    fn test_missing_resources_defaults_to_empty() {
        let catalogue = parse_catalogue(r#"[{"id": "a", "name": "A"}]"#).unwrap();
        assert!(catalogue.organizations()[0].resources.is_empty());
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let json = r#"[{"id": "a", "name": "A"}, {"id": "a", "name": "B"}]"#;
        assert!(matches!(
            parse_catalogue(json),
            Err(EngineError::InvalidCatalogue(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            parse_catalogue(r#"{"id": "a"}"#),
            Err(EngineError::Parse(_))
        ));
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_fetch_unreachable_is_load_error() {
        let result = fetch_catalogue("http://127.0.0.1:9/universities.json");
        assert!(matches!(result, Err(EngineError::Load(_))));
    }
}
