//! Weapon Catalog
//!
//! Static catalog entries that card faces are drawn from.

use serde::{Serialize, Deserialize};

/// Texture shown on every card's back face.
pub const BACK_TEXTURE_PATH: &str = "/assets/backImage.png";

/// Weapon rarity tier. Cosmetic only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    /// Tier 1
    Consumer,
    /// Tier 2
    Industrial,
    /// Tier 3
    MilSpec,
    /// Tier 4
    Restricted,
    /// Tier 5
    Classified,
    /// Tier 6
    Covert,
}

/// A catalog entry. Never mutated once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weapon {
    /// Unique identifier, used to decide whether two cards match
    pub id: String,
    /// Display name
    pub name: String,
    /// Rarity tier
    pub rarity: Rarity,
    /// Symbolic texture path for the front face
    pub texture_path: String,
}

impl Weapon {
    /// Create a catalog entry.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        rarity: Rarity,
        texture_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rarity,
            texture_path: texture_path.into(),
        }
    }
}

/// The built-in catalog.
pub fn default_catalog() -> Vec<Weapon> {
    vec![
        Weapon::new("ak47", "AK-47", Rarity::Covert, "assets/ak47.png"),
        Weapon::new("awp", "AWP", Rarity::Covert, "assets/awp.png"),
        Weapon::new("m4a1s", "M4A1-S", Rarity::Classified, "assets/m4a1s.png"),
        Weapon::new("deagle", "Desert Eagle", Rarity::MilSpec, "assets/deagle.png"),
    ]
}

/// Every texture a board built from `catalog` may display, back face last.
///
/// Duplicate paths are listed once, in first-seen order.
pub fn asset_paths(catalog: &[Weapon]) -> Vec<String> {
    let mut paths: Vec<String> = Vec::with_capacity(catalog.len() + 1);
    for weapon in catalog {
        if !paths.contains(&weapon.texture_path) {
            paths.push(weapon.texture_path.clone());
        }
    }
    if !paths.iter().any(|p| p == BACK_TEXTURE_PATH) {
        paths.push(BACK_TEXTURE_PATH.to_string());
    }
    paths
}
