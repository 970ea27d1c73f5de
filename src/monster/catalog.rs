//! Seed catalog used by random generation.

use rand::Rng;

use crate::monster::model::Monster;

/// A candidate monster. Drawn records always start unfavorited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub desc: &'static str,
    pub role: &'static str,
}

impl CatalogEntry {
    pub fn to_monster(&self) -> Monster {
        Monster::new(self.name, self.desc, false, self.role)
    }
}

pub static CATALOG: &[CatalogEntry] = &[
    CatalogEntry { name: "Werewolf", desc: "Howls at every full moon.", role: "soldier" },
    CatalogEntry { name: "Mummy", desc: "Wrapped up in ancient business.", role: "shield" },
    CatalogEntry { name: "Banshee", desc: "Her scream patches wounds and ears alike.", role: "medic" },
    CatalogEntry { name: "Goblin", desc: "Will steal the buttons off your coat.", role: "thief" },
    CatalogEntry { name: "Lich", desc: "Keeps his soul in a jam jar.", role: "mage" },
    CatalogEntry { name: "Golem", desc: "Made of clay and stubbornness.", role: "shield" },
    CatalogEntry { name: "Kobold", desc: "Sets traps, mostly for himself.", role: "thief" },
    CatalogEntry { name: "Wraith", desc: "Drifts through walls to mend the fallen.", role: "medic" },
    CatalogEntry { name: "Minotaur", desc: "Never lost in a maze.", role: "soldier" },
    CatalogEntry { name: "Hag", desc: "Brews soup nobody asked for.", role: "mage" },
    CatalogEntry { name: "Gargoyle", desc: "Guards the rooftop, judges pigeons.", role: "shield" },
    CatalogEntry { name: "Doppelganger", desc: "Looks a lot like you today.", role: "thief" },
    CatalogEntry { name: "Zombie", desc: "Slow, steady and hungry.", role: "soldier" },
    CatalogEntry { name: "Will-o'-the-wisp", desc: "Lights the way to trouble.", role: "mage" },
];

/// Pick one entry uniformly at random.
pub fn draw<R: Rng + ?Sized>(catalog: &[CatalogEntry], rng: &mut R) -> Monster {
    catalog[rng.gen_range(0..catalog.len())].to_monster()
}

/// Number of distinct names in a catalog.
pub fn distinct_names(catalog: &[CatalogEntry]) -> usize {
    let mut names: Vec<&str> = catalog.iter().map(|e| e.name).collect();
    names.sort_unstable();
    names.dedup();
    names.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monster::model::Role;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn catalog_roles_are_known() {
        for entry in CATALOG {
            assert!(Role::parse(entry.role).is_some(), "{} has bad role", entry.name);
        }
    }

    #[test]
    fn catalog_names_are_distinct() {
        assert_eq!(distinct_names(CATALOG), CATALOG.len());
    }

    #[test]
    fn draw_is_unfavorited() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            assert!(!draw(CATALOG, &mut rng).favorite);
        }
    }
}
