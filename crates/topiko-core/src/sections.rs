//! Theme section registry.
//!
//! Site configurations list the page sections to render by type key, either
//! as bare strings (`"hero"`) or as structured entries
//! (`{"type": "hero", "props": {...}}`). The registry resolves those keys to
//! the theme components that render them. The set of sections is fixed at
//! compile time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// The page sections the theme knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Hero,
    About,
    Services,
    Gallery,
    Footer,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        SectionKind::Hero,
        SectionKind::About,
        SectionKind::Services,
        SectionKind::Gallery,
        SectionKind::Footer,
    ];

    /// Resolve a type key. Unknown keys yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "hero" => Some(SectionKind::Hero),
            "about" => Some(SectionKind::About),
            "services" => Some(SectionKind::Services),
            "gallery" => Some(SectionKind::Gallery),
            "footer" => Some(SectionKind::Footer),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            SectionKind::Hero => "hero",
            SectionKind::About => "about",
            SectionKind::Services => "services",
            SectionKind::Gallery => "gallery",
            SectionKind::Footer => "footer",
        }
    }

    pub fn component(&self) -> &'static SectionComponent {
        match self {
            SectionKind::Hero => &HERO,
            SectionKind::About => &ABOUT,
            SectionKind::Services => &SERVICES,
            SectionKind::Gallery => &GALLERY,
            SectionKind::Footer => &FOOTER,
        }
    }
}

/// A renderable theme component.
#[derive(Debug, PartialEq, Eq)]
pub struct SectionComponent {
    pub kind: SectionKind,
    /// Component name.
    pub name: &'static str,
    /// Theme the component belongs to.
    pub theme: &'static str,
    /// Template path relative to the site source root.
    pub template: &'static str,
}

static HERO: SectionComponent = SectionComponent {
    kind: SectionKind::Hero,
    name: "Hero",
    theme: "salon",
    template: "themes/salon/Hero.astro",
};

static ABOUT: SectionComponent = SectionComponent {
    kind: SectionKind::About,
    name: "About",
    theme: "salon",
    template: "themes/salon/About.astro",
};

static SERVICES: SectionComponent = SectionComponent {
    kind: SectionKind::Services,
    name: "Services",
    theme: "salon",
    template: "themes/salon/Services.astro",
};

static GALLERY: SectionComponent = SectionComponent {
    kind: SectionKind::Gallery,
    name: "Gallery",
    theme: "salon",
    template: "themes/salon/Gallery.astro",
};

static FOOTER: SectionComponent = SectionComponent {
    kind: SectionKind::Footer,
    name: "Footer",
    theme: "salon",
    template: "themes/salon/Footer.astro",
};

/// A structured section entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    #[serde(rename = "type")]
    pub section_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Map<String, Value>>,
}

impl SectionConfig {
    pub fn new(section_type: impl Into<String>) -> Self {
        Self {
            section_type: section_type.into(),
            props: None,
        }
    }
}

/// A section entry as written in a site configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionDefinition {
    Key(String),
    Config(SectionConfig),
}

impl From<&str> for SectionDefinition {
    fn from(key: &str) -> Self {
        SectionDefinition::Key(key.to_string())
    }
}

impl From<SectionConfig> for SectionDefinition {
    fn from(config: SectionConfig) -> Self {
        SectionDefinition::Config(config)
    }
}

fn available_keys() -> String {
    SectionKind::ALL
        .iter()
        .map(SectionKind::key)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Get the component for a section type key.
pub fn lookup(type_key: &str) -> Option<&'static SectionComponent> {
    match SectionKind::from_key(type_key) {
        Some(kind) => Some(kind.component()),
        None => {
            warn!(
                section_type = %type_key,
                available = %available_keys(),
                "Section type not found in registry"
            );
            None
        }
    }
}

/// Bring a section definition into structured form.
pub fn normalize(definition: SectionDefinition) -> SectionConfig {
    match definition {
        SectionDefinition::Key(key) => SectionConfig::new(key),
        SectionDefinition::Config(config) => config,
    }
}

/// Normalize section definitions and drop the ones the registry cannot render.
///
/// Order is preserved and duplicates are kept.
pub fn validate(definitions: &[SectionDefinition]) -> Vec<SectionConfig> {
    definitions
        .iter()
        .cloned()
        .map(normalize)
        .filter(|section| {
            let known = lookup(&section.section_type).is_some();
            if !known {
                warn!(section_type = %section.section_type, "Skipping invalid section");
            }
            known
        })
        .collect()
}

/// Section order used when a site configuration lists none.
pub fn default_order() -> Vec<SectionDefinition> {
    ["hero", "about", "services", "footer"]
        .into_iter()
        .map(SectionDefinition::from)
        .collect()
}

/// Resolve the sections a site configuration asks for.
///
/// Reads the optional `sections` array, falling back to [`default_order`]
/// when it is missing, empty or not an array. Entries that are neither
/// strings nor `{type, props?}` objects are skipped.
pub fn sections_for(site_config: &Value) -> Vec<SectionConfig> {
    let definitions: Vec<SectionDefinition> = match site_config.get("sections") {
        Some(Value::Array(entries)) if !entries.is_empty() => entries
            .iter()
            .filter_map(|entry| {
                let parsed = serde_json::from_value(entry.clone());
                if parsed.is_err() {
                    warn!(entry = %entry, "Skipping malformed section entry");
                }
                parsed.ok()
            })
            .collect(),
        _ => default_order(),
    };
    validate(&definitions)
}
