use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use palette::{Hsl, IntoColor, Srgb, named};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Srgb<u8>> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            rgb.into_format()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// OrganismCatalog – the recognized organism set and its display colours
// ---------------------------------------------------------------------------

/// The fixed set of organism names a table may mention, plus one display
/// colour per organism for a downstream plotting consumer. The colour carries
/// no behavioural weight in the core; the name set drives all row
/// classification during extraction.
#[derive(Debug, Clone)]
pub struct OrganismCatalog {
    names: Vec<String>,
    colors: BTreeMap<String, Srgb<u8>>,
}

impl OrganismCatalog {
    /// Catalog over the given names with generated display colours.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        let names: Vec<String> = names.iter().map(|s| s.as_ref().to_string()).collect();
        let palette = generate_palette(names.len());
        let colors = names.iter().cloned().zip(palette).collect();
        OrganismCatalog { names, colors }
    }

    /// The reference seven-organism cheese-rind community configuration.
    pub fn reference() -> Self {
        let entries: [(&str, Srgb<u8>); 7] = [
            ("Candida", named::RED),
            ("S. equorum", named::GREEN),
            ("S. succinus", named::BLUE),
            ("Brevibacterium", named::ORANGE),
            ("Brachybacterium", named::BLACK),
            ("Penicillium", named::PURPLE),
            ("Scopulariopsis", named::BROWN),
        ];
        let names = entries.iter().map(|(n, _)| n.to_string()).collect();
        let colors = entries
            .iter()
            .map(|(n, c)| (n.to_string(), *c))
            .collect();
        OrganismCatalog { names, colors }
    }

    /// Load a catalog from a JSON config file:
    ///
    /// ```json
    /// { "organisms": [ { "name": "Candida", "color": "#ff0000" },
    ///                  { "name": "S. equorum" } ] }
    /// ```
    ///
    /// Organisms without an explicit colour get one from the generated
    /// palette.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).context("reading catalog file")?;
        let file: CatalogFile = serde_json::from_str(&text).context("parsing catalog JSON")?;
        if file.organisms.is_empty() {
            bail!("catalog file lists no organisms");
        }

        let fallback = generate_palette(file.organisms.len());
        let mut names = Vec::with_capacity(file.organisms.len());
        let mut colors = BTreeMap::new();
        for (i, entry) in file.organisms.into_iter().enumerate() {
            let color = match entry.color {
                Some(hex) => parse_hex_color(&hex)
                    .with_context(|| format!("organism '{}': bad colour '{hex}'", entry.name))?,
                None => fallback[i],
            };
            colors.insert(entry.name.clone(), color);
            names.push(entry.name);
        }
        Ok(OrganismCatalog { names, colors })
    }

    /// Recognized organism names, in catalog order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Exact-match test against the recognized names.
    pub fn contains_exact(&self, label: &str) -> bool {
        self.names.iter().any(|n| n == label)
    }

    /// Substring test: does `label` mention any recognized name? The exact
    /// branch must always be checked before this one when classifying rows,
    /// so a name that is a substring of another still opens its own section.
    pub fn mentions(&self, label: &str) -> bool {
        self.names.iter().any(|n| label.contains(n.as_str()))
    }

    /// Display colour for an organism, if catalogued.
    pub fn color_for(&self, name: &str) -> Option<Srgb<u8>> {
        self.colors.get(name).copied()
    }

    /// Legend entries (organism name → colour) for a plotting consumer.
    pub fn legend_entries(&self) -> Vec<(String, Srgb<u8>)> {
        self.names
            .iter()
            .filter_map(|n| self.colors.get(n).map(|c| (n.clone(), *c)))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    organisms: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    name: String,
    #[serde(default)]
    color: Option<String>,
}

/// Parse a `#rrggbb` (or `rrggbb`) hex colour.
fn parse_hex_color(s: &str) -> Option<Srgb<u8>> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Srgb::new(r, g, b))
}
