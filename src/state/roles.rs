use crate::types::*;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::path::Path;

/// Built-in secret targets: (id, name, category)
const BUILTIN_TARGETS: &[(&str, &str, &str)] = &[
    ("airport", "Airport", "place"),
    ("beach", "Beach", "place"),
    ("casino", "Casino", "place"),
    ("circus", "Circus", "place"),
    ("hospital", "Hospital", "place"),
    ("library", "Library", "place"),
    ("museum", "Museum", "place"),
    ("submarine", "Submarine", "place"),
    ("space-station", "Space Station", "place"),
    ("train", "Night Train", "place"),
    ("lighthouse", "Lighthouse", "place"),
    ("bakery", "Bakery", "place"),
    ("piano", "Piano", "thing"),
    ("umbrella", "Umbrella", "thing"),
    ("telescope", "Telescope", "thing"),
    ("volcano", "Volcano", "nature"),
    ("glacier", "Glacier", "nature"),
    ("penguin", "Penguin", "animal"),
    ("octopus", "Octopus", "animal"),
    ("giraffe", "Giraffe", "animal"),
];

/// Catalog the round's secret target is drawn from
#[derive(Debug, Clone)]
pub struct SecretCatalog {
    targets: Vec<SecretTarget>,
}

impl Default for SecretCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SecretCatalog {
    pub fn builtin() -> Self {
        Self {
            targets: BUILTIN_TARGETS
                .iter()
                .map(|(id, name, category)| SecretTarget {
                    id: id.to_string(),
                    name: name.to_string(),
                    category: Some(category.to_string()),
                })
                .collect(),
        }
    }

    /// Use the given targets, or `None` if there are none to draw from
    pub fn from_targets(targets: Vec<SecretTarget>) -> Option<Self> {
        if targets.is_empty() {
            None
        } else {
            Some(Self { targets })
        }
    }

    /// Load a JSON array of targets from disk
    pub fn from_json_file(path: &Path) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let targets: Vec<SecretTarget> = serde_json::from_str(&raw)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
        Self::from_targets(targets)
            .ok_or_else(|| format!("Secret catalog {} is empty", path.display()))
    }

    /// Load from `path` if given, falling back to the built-in catalog
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };
        match Self::from_json_file(path) {
            Ok(catalog) => {
                tracing::info!(
                    targets = catalog.len(),
                    "Loaded secret catalog from {}",
                    path.display()
                );
                catalog
            }
            Err(e) => {
                tracing::warn!("{}. Using the built-in secret catalog.", e);
                Self::builtin()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> SecretTarget {
        self.targets
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| Self::builtin().targets[0].clone())
    }
}

impl Room {
    /// Draw a secret target and one impostor among the living.
    ///
    /// Crew share the target; the impostor and the eliminated get nothing.
    pub fn assign_roles_for_round<R: Rng + ?Sized>(&mut self, catalog: &SecretCatalog, rng: &mut R) {
        let target = catalog.pick(rng);

        let alive: Vec<usize> = self
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.alive)
            .map(|(i, _)| i)
            .collect();
        let impostor_idx = alive.choose(rng).copied();

        for (i, player) in self.players.iter_mut().enumerate() {
            if !player.alive {
                player.role = None;
                player.assigned_secret = None;
            } else if Some(i) == impostor_idx {
                player.role = Some(Role::Impostor);
                player.assigned_secret = None;
            } else {
                player.role = Some(Role::Crew);
                player.assigned_secret = Some(target.id.clone());
            }
        }

        tracing::debug!(
            room_id = %self.id,
            candidates = alive.len(),
            "Assigned roles for round"
        );
        self.secret_target = Some(target);
    }
}
