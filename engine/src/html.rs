use crate::group::Segment;
use crate::render::{FavoritesPanelView, PaginationView, ResourceView, SectionView, ViewModel, ACTIVE_CLASS};

/// Escape text for use in element content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Highlighted segments are wrapped in `<mark>` exactly once
pub fn segments_html(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| {
            if segment.highlighted {
                format!("<mark>{}</mark>", escape(&segment.text))
            } else {
                escape(&segment.text)
            }
        })
        .collect()
}

fn resource_html(out: &mut String, resource: &ResourceView) {
    let button = &resource.favorite;
    let class = if button.active {
        format!("favorite-btn {}", ACTIVE_CLASS)
    } else {
        "favorite-btn".to_string()
    };
    out.push_str(&format!(
        r#"<div class="resource-card"><button class="{}" data-url="{}" data-title="{}">{}</button><span class="resource-type">{}</span><span class="resource-title">{}</span><a href="{}" class="resource-link" target="_blank">{}</a></div>"#,
        class,
        escape(&button.url),
        escape(&button.title),
        button.glyph,
        escape(&resource.kind),
        segments_html(&resource.title_segments),
        escape(&resource.url),
        escape(&resource.url),
    ));
}

fn section_html(out: &mut String, section: &SectionView) {
    out.push_str(&format!(
        r#"<section id="{}" class="university-section"><div class="university-header"><h2 class="university-title">{}</h2><span class="resource-count-badge">{}</span></div><div class="resources-grid">"#,
        escape(&section.id),
        escape(&section.name),
        escape(&section.badge),
    ));
    for resource in &section.resources {
        resource_html(out, resource);
    }
    out.push_str("</div></section>");
}

/// All organization sections of a view, as one replaceable fragment
pub fn sections_html(view: &ViewModel) -> String {
    let mut out = String::new();
    for section in &view.sections {
        section_html(&mut out, section);
    }
    out
}

pub fn pagination_html(pagination: &PaginationView) -> String {
    let disabled = |flag: bool| if flag { " disabled" } else { "" };
    let mut out = format!(
        r#"<button class="page-btn" data-page="{}"{}>Anterior</button>"#,
        pagination.current.saturating_sub(1).max(1),
        disabled(pagination.previous_disabled),
    );
    for page in &pagination.pages {
        out.push_str(&format!(
            r#"<button class="page-btn{}" data-page="{}">{}</button>"#,
            if page.current { " active" } else { "" },
            page.number,
            page.number,
        ));
    }
    out.push_str(&format!(
        r#"<button class="page-btn" data-page="{}"{}>Siguiente</button>"#,
        (pagination.current + 1).min(pagination.total_pages),
        disabled(pagination.next_disabled),
    ));
    out
}

pub fn favorites_html(panel: &FavoritesPanelView) -> String {
    if let Some(message) = panel.empty_message {
        return format!("<li>{}</li>", escape(message));
    }
    panel
        .entries
        .iter()
        .map(|fav| {
            format!(
                r#"<li class="favorite-item"><a href="{}" target="_blank">{}</a><button class="remove-favorite" data-url="{}">×</button></li>"#,
                escape(&fav.url),
                escape(&fav.title),
                escape(&fav.url),
            )
        })
        .collect()
}
