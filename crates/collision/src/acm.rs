//! Allowed collision matrix
//!
//! Decides for an unordered pair of cached objects whether the narrow phase
//! should look at it at all. Rules are applied in a fixed order and the
//! first one that matches wins.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::CollisionConfig;
use crate::object::CollisionObject;

/// Why a pair was filtered out, or that it should be tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairDecision {
    Test,
    SameObject,
    WorldPair,
    SelfCollisionDisabled,
    Ignored,
    Adjacent,
}

impl PairDecision {
    #[must_use]
    pub fn is_test(self) -> bool {
        self == PairDecision::Test
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedCollisionMatrix {
    /// Symmetric: every ignored pair is stored under both names.
    ignored: BTreeMap<String, BTreeSet<String>>,
    world_collisions: bool,
    skip_adjacent_links: bool,
}

impl Default for AllowedCollisionMatrix {
    fn default() -> Self {
        Self::from_config(&CollisionConfig::default())
    }
}

impl AllowedCollisionMatrix {
    #[must_use]
    pub fn new(world_collisions: bool, skip_adjacent_links: bool) -> Self {
        Self {
            ignored: BTreeMap::new(),
            world_collisions,
            skip_adjacent_links,
        }
    }

    #[must_use]
    pub fn from_config(config: &CollisionConfig) -> Self {
        Self::new(config.world_collisions, config.skip_adjacent_links)
    }

    /// Never test `a` against `b`.
    pub fn ignore(&mut self, a: &str, b: &str) {
        self.ignored.entry(a.to_owned()).or_default().insert(b.to_owned());
        self.ignored.entry(b.to_owned()).or_default().insert(a.to_owned());
    }

    /// Removes an ignore entry. Returns `false` if there was none.
    pub fn unignore(&mut self, a: &str, b: &str) -> bool {
        let removed = self.remove_one_way(a, b);
        self.remove_one_way(b, a);
        removed
    }

    #[must_use]
    pub fn is_ignored(&self, a: &str, b: &str) -> bool {
        self.ignored.get(a).is_some_and(|others| others.contains(b))
    }

    /// Ignored pairs with the smaller name first, in name order.
    pub fn ignored_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.ignored.iter().flat_map(|(a, others)| {
            others
                .iter()
                .filter(move |b| a < *b)
                .map(move |b| (a.as_str(), b.as_str()))
        })
    }

    #[must_use]
    pub fn world_collisions(&self) -> bool {
        self.world_collisions
    }

    #[must_use]
    pub fn skip_adjacent_links(&self) -> bool {
        self.skip_adjacent_links
    }

    pub fn set_world_collisions(&mut self, enabled: bool) {
        self.world_collisions = enabled;
    }

    pub fn set_skip_adjacent_links(&mut self, enabled: bool) {
        self.skip_adjacent_links = enabled;
    }

    #[must_use]
    pub fn decide<S>(&self, a: &CollisionObject<S>, b: &CollisionObject<S>, self_collision: bool) -> PairDecision {
        let robot_a = a.is_robot_link();
        let robot_b = b.is_robot_link();
        if a.name() == b.name() {
            PairDecision::SameObject
        } else if !robot_a && !robot_b && !self.world_collisions {
            PairDecision::WorldPair
        } else if robot_a && robot_b && !self_collision {
            PairDecision::SelfCollisionDisabled
        } else if self.is_ignored(a.name(), b.name()) {
            PairDecision::Ignored
        } else if self.skip_adjacent_links && a.is_adjacent_to(b) {
            PairDecision::Adjacent
        } else {
            PairDecision::Test
        }
    }

    #[must_use]
    pub fn should_test<S>(&self, a: &CollisionObject<S>, b: &CollisionObject<S>, self_collision: bool) -> bool {
        self.decide(a, b, self_collision).is_test()
    }

    fn remove_one_way(&mut self, a: &str, b: &str) -> bool {
        let Some(others) = self.ignored.get_mut(a) else {
            return false;
        };
        let removed = others.remove(b);
        if others.is_empty() {
            self.ignored.remove(a);
        }
        removed
    }
}
