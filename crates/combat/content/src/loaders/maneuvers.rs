//! Maneuver catalog loader.
//!
//! Each RON file holds a list of [`ManeuverDefinition`]s. Files are merged into
//! a single [`ManeuverCatalog`]; an id may only appear once across all of them.

use std::path::Path;

use combat_core::{ManeuverCatalog, ManeuverDefinition};

use crate::loaders::{LoadResult, read_file};

/// Catalog files shipped with this crate, in load order.
const EMBEDDED: [(&str, &str); 3] = [
    (
        "standard.ron",
        include_str!("../../data/maneuvers/standard.ron"),
    ),
    (
        "martial_arts.ron",
        include_str!("../../data/maneuvers/martial_arts.ron"),
    ),
    ("weapon.ron", include_str!("../../data/maneuvers/weapon.ron")),
];

/// Loader for the maneuver catalog from RON files.
pub struct ManeuverLoader;

impl ManeuverLoader {
    /// The catalog shipped with this crate.
    pub fn load_embedded() -> LoadResult<ManeuverCatalog> {
        let mut definitions = Vec::new();
        for (source, content) in EMBEDDED {
            definitions.extend(Self::parse(content, source)?);
        }
        Self::build(definitions)
    }

    /// Loads every `.ron` file in `dir`, sorted by file name.
    pub fn load_dir(dir: &Path) -> LoadResult<ManeuverCatalog> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "ron") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut definitions = Vec::new();
        for path in &paths {
            definitions.extend(Self::load_file(path)?);
        }

        tracing::debug!(
            target: "combat::content",
            dir = %dir.display(),
            files = paths.len(),
            "loaded maneuver files"
        );
        Self::build(definitions)
    }

    /// Reads one RON file without building a catalog.
    pub fn load_file(path: &Path) -> LoadResult<Vec<ManeuverDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parses a RON list of maneuvers. `source` names the input in error messages.
    pub fn parse(content: &str, source: &str) -> LoadResult<Vec<ManeuverDefinition>> {
        let definitions: Vec<ManeuverDefinition> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse maneuver RON {}: {}", source, e))?;

        for definition in &definitions {
            validate(definition).map_err(|e| anyhow::anyhow!("{} ({})", e, source))?;
        }
        Ok(definitions)
    }

    /// Builds a catalog, rejecting duplicate ids.
    pub fn build(definitions: Vec<ManeuverDefinition>) -> LoadResult<ManeuverCatalog> {
        let catalog = ManeuverCatalog::from_definitions(definitions)?;
        tracing::info!(
            target: "combat::content",
            maneuvers = catalog.len(),
            "maneuver catalog ready"
        );
        Ok(catalog)
    }
}

fn validate(definition: &ManeuverDefinition) -> LoadResult<()> {
    let id = &definition.id;
    if id.as_str().trim().is_empty() {
        anyhow::bail!("maneuver with blank id");
    }
    if definition.name.trim().is_empty() {
        anyhow::bail!("maneuver '{}' has a blank name", id);
    }
    if definition.attribute.trim().is_empty() || definition.ability.trim().is_empty() {
        anyhow::bail!("maneuver '{}' needs both an attribute and an ability", id);
    }
    if definition.redirects() && !definition.is_defense() {
        anyhow::bail!("maneuver '{}' redirects but is not a defense", id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{
        AttributeCategory, CombatantProfile, DamageType, ManeuverCategory, ManeuverId,
        ResourcePool, SpecialEffect,
    };

    #[test]
    fn embedded_catalog_loads() {
        let catalog = ManeuverLoader::load_embedded().expect("embedded catalog");

        for id in ["punch", "block", "flying_kick", "aikido_throw", "slash"] {
            assert!(catalog.contains(&ManeuverId::new(id)), "missing {id}");
        }
        assert!(!catalog.by_category(ManeuverCategory::Weapon).is_empty());

        let throw = catalog.get(&ManeuverId::new("aikido_throw")).unwrap();
        assert!(throw.is_defense());
        assert!(throw.redirects());

        let brand = catalog.get(&ManeuverId::new("flaming_brand")).unwrap();
        assert_eq!(
            brand.special_effects,
            vec![SpecialEffect::ContinuousDamage {
                turns: 2,
                amount: 1,
                damage_type: DamageType::Aggravated,
            }]
        );
    }

    #[test]
    fn embedded_requirements_gate_availability() {
        let catalog = ManeuverLoader::load_embedded().unwrap();

        let novice = CombatantProfile::new();
        let ids: Vec<_> = catalog
            .list_available(&novice, None)
            .into_iter()
            .map(|m| m.id.as_str().to_owned())
            .collect();
        assert!(ids.contains(&"punch".to_owned()));
        assert!(!ids.contains(&"flying_kick".to_owned()));
        assert!(!ids.contains(&"claw".to_owned()));

        let master = CombatantProfile::new()
            .with_rating(AttributeCategory::Ability, "martial_arts", 4)
            .with_resource(ResourcePool::Rage, 2)
            .with_style("aikido");
        let available = catalog.list_available(&master, None);
        assert!(available.iter().any(|m| m.id.as_str() == "iron_fist"));
        assert!(available.iter().any(|m| m.id.as_str() == "aikido_throw"));
        assert!(!available.iter().any(|m| m.id.as_str() == "throat_strike"));
    }

    #[test]
    fn parse_fills_defaults() {
        let defs = ManeuverLoader::parse(
            r#"[(id: "shove", name: "Shove", attribute: "strength", ability: "brawl")]"#,
            "inline",
        )
        .unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].category, ManeuverCategory::Standard);
        assert_eq!(defs[0].damage_type, DamageType::Bashing);
        assert!(defs[0].requirements.is_empty());
    }

    #[test]
    fn malformed_definitions_are_rejected() {
        let blank = ManeuverLoader::parse(
            r#"[(id: "x", name: " ", attribute: "dexterity", ability: "brawl")]"#,
            "inline",
        );
        assert!(blank.unwrap_err().to_string().contains("blank name"));

        let offensive_redirect = ManeuverLoader::parse(
            r#"[(id: "x", name: "X", attribute: "dexterity", ability: "brawl",
                 special_effects: [Redirect])]"#,
            "inline",
        );
        assert!(
            offensive_redirect
                .unwrap_err()
                .to_string()
                .contains("not a defense")
        );

        assert!(ManeuverLoader::parse("not ron at all", "inline").is_err());
    }

    #[test]
    fn load_dir_merges_files_and_rejects_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.ron"),
            r#"[(id: "punch", name: "Punch", attribute: "dexterity", ability: "brawl")]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("b.ron"),
            r#"[(id: "block", name: "Block", role: Defense, attribute: "dexterity", ability: "brawl")]"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = ManeuverLoader::load_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 2);

        std::fs::write(
            dir.path().join("c.ron"),
            r#"[(id: "punch", name: "Other Punch", attribute: "dexterity", ability: "brawl")]"#,
        )
        .unwrap();
        let err = ManeuverLoader::load_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("duplicate maneuver id"));
    }
}
