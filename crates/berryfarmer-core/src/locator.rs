//! Classification of nearby berry bushes.

use std::collections::BTreeMap;

use berryfarmer_types::{BerryType, Material, PropId};

use crate::options::ConfigSnapshot;

/// Bushes visible this tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NearbyBushes {
    /// Visible bushes per type, regardless of configuration.
    pub counts: BTreeMap<BerryType, u32>,
    /// Bushes of enabled types, in host order.
    pub list: Vec<Material>,
    /// Prop ids that matched no known bush type.
    pub unrecognized: Vec<PropId>,
}

impl NearbyBushes {
    /// The bush closest to the camera.
    ///
    /// Ranks by screen depth (ascending, stable), not by world distance.
    pub fn closest(&self) -> Option<&Material> {
        let mut ranked: Vec<&Material> = self.list.iter().collect();
        ranked.sort_by(|a, b| a.screen_depth().total_cmp(&b.screen_depth()));
        ranked.first().copied()
    }
}

/// Classify every visible material and keep the enabled bush types.
///
/// Unrecognized props count toward neither output; they are returned so the
/// caller can log them at a rate-limited cadence.
pub fn find_nearby(materials: &[Material], config: &ConfigSnapshot) -> NearbyBushes {
    let mut nearby = NearbyBushes {
        counts: zeroed_counts(),
        ..NearbyBushes::default()
    };

    for material in materials {
        let Some(berry) = BerryType::from_bush_prop(material.prop) else {
            nearby.unrecognized.push(material.prop);
            continue;
        };

        if let Some(count) = nearby.counts.get_mut(&berry) {
            *count = count.saturating_add(1);
        }

        if config.collects(berry) {
            nearby.list.push(*material);
        }
    }

    nearby
}

/// Count visible bushes per type, ignoring configuration.
pub fn count_nearby(materials: &[Material]) -> BTreeMap<BerryType, u32> {
    find_nearby(materials, &ConfigSnapshot::default()).counts
}

fn zeroed_counts() -> BTreeMap<BerryType, u32> {
    BerryType::ALL.into_iter().map(|berry| (berry, 0)).collect()
}

#[cfg(test)]
mod tests {
    use berryfarmer_types::{MoverId, WorldPosition};

    use super::*;

    fn bush(id: u64, prop: u32, depth: f32) -> Material {
        Material {
            id: MoverId(id),
            prop: PropId(prop),
            world_pos: WorldPosition::new(0.0, 0.0, 0.0),
            screen_pos: WorldPosition::new(0.0, 0.0, depth),
        }
    }

    fn collecting(berries: &[BerryType]) -> ConfigSnapshot {
        let mut config = ConfigSnapshot::default();
        for berry in berries {
            config.collect.insert(*berry, true);
        }
        config
    }

    #[test]
    fn enabled_type_wins_over_closer_disabled_type() {
        let materials = [bush(1, 47, 5.0), bush(2, 48, 1.0)];
        let nearby = find_nearby(&materials, &collecting(&[BerryType::Cloudberry]));

        assert_eq!(nearby.list.len(), 1);
        assert_eq!(nearby.closest().map(|m| m.id), Some(MoverId(1)));
        assert_eq!(nearby.counts.get(&BerryType::Cloudberry), Some(&1));
        assert_eq!(nearby.counts.get(&BerryType::Lightberry), Some(&1));
    }

    #[test]
    fn unrecognized_props_are_excluded_everywhere() {
        let materials = [bush(1, 47, 2.0), bush(2, 999, 0.5)];
        let nearby = find_nearby(&materials, &collecting(&BerryType::ALL));

        assert_eq!(nearby.list.len(), 1);
        assert_eq!(nearby.counts.values().sum::<u32>(), 1);
        assert_eq!(nearby.unrecognized, vec![PropId(999)]);
    }

    #[test]
    fn closest_sorts_by_screen_depth() {
        let materials = [bush(1, 49, 9.0), bush(2, 49, 3.0), bush(3, 49, 6.0)];
        let nearby = find_nearby(&materials, &collecting(&[BerryType::Exoberry]));
        assert_eq!(nearby.closest().map(|m| m.id), Some(MoverId(2)));
    }

    #[test]
    fn equal_depth_keeps_host_order() {
        let materials = [bush(7, 47, 4.0), bush(8, 47, 4.0)];
        let nearby = find_nearby(&materials, &collecting(&[BerryType::Cloudberry]));
        assert_eq!(nearby.closest().map(|m| m.id), Some(MoverId(7)));
    }

    #[test]
    fn counts_ignore_configuration() {
        let materials = [bush(1, 47, 1.0), bush(2, 48, 1.0), bush(3, 48, 1.0)];
        let counts = count_nearby(&materials);
        assert_eq!(counts.get(&BerryType::Cloudberry), Some(&1));
        assert_eq!(counts.get(&BerryType::Lightberry), Some(&2));
        assert_eq!(counts.get(&BerryType::Exoberry), Some(&0));
    }

    #[test]
    fn nothing_enabled_means_empty_list() {
        let materials = [bush(1, 47, 1.0)];
        let nearby = find_nearby(&materials, &ConfigSnapshot::default());
        assert!(nearby.list.is_empty());
        assert!(nearby.closest().is_none());
    }
}
