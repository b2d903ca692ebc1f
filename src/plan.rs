//! Match id generation and client spawn planning
//!
//! A plan assigns every simulated client a match id such that each id is
//! shared by exactly two clients. The assignment is shuffled so the two
//! players of a match are not spawned back to back.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one match, shared by its two players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(u32);

impl MatchId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered assignment of match ids to client slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSpawnPlan {
    ids: Vec<MatchId>,
}

impl ClientSpawnPlan {
    /// Build a plan for `games` players.
    ///
    /// Draws `games / 2` ids (duplicates between draws are kept, not
    /// retried), lists each twice and applies a uniform shuffle. An odd
    /// `games` yields `games - 1` clients.
    pub fn generate<R: Rng>(games: u32, rng: &mut R) -> Self {
        let matches = (games / 2) as usize;
        let drawn: Vec<MatchId> = (0..matches).map(|_| MatchId(rng.random())).collect();

        let mut ids = Vec::with_capacity(matches * 2);
        ids.extend_from_slice(&drawn);
        ids.extend_from_slice(&drawn);
        ids.shuffle(rng);

        Self { ids }
    }

    /// Build a plan from an optional seed; `None` seeds from the OS
    pub fn from_seed(games: u32, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::generate(games, &mut rng)
    }

    /// Wrap an explicit assignment
    pub fn from_ids(ids: Vec<MatchId>) -> Self {
        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[MatchId] {
        &self.ids
    }

    /// Number of matches, i.e. half the client count
    pub fn match_count(&self) -> usize {
        self.ids.len() / 2
    }

    /// Per-client endpoints, `{base}/play?id={match}`, in plan order
    pub fn endpoints(&self, base: &str) -> Vec<String> {
        self.ids.iter().map(|id| endpoint_for(base, *id)).collect()
    }
}

/// Endpoint a client of match `id` connects to
pub fn endpoint_for(base: &str, id: MatchId) -> String {
    format!("{}/play?id={}", base.trim_end_matches('/'), id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn occurrences(plan: &ClientSpawnPlan) -> HashMap<MatchId, usize> {
        let mut counts = HashMap::new();
        for id in plan.ids() {
            *counts.entry(*id).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_even_games_pairs_every_id() {
        let mut rng = StdRng::seed_from_u64(7);
        let plan = ClientSpawnPlan::generate(100, &mut rng);

        assert_eq!(plan.len(), 100);
        assert_eq!(plan.match_count(), 50);
        let counts = occurrences(&plan);
        assert_eq!(counts.len(), 50);
        assert!(counts.values().all(|&c| c == 2));
    }

    #[test]
    fn test_odd_games_drops_one_slot() {
        let mut rng = StdRng::seed_from_u64(7);
        let plan = ClientSpawnPlan::generate(7, &mut rng);
        assert_eq!(plan.len(), 6);
    }

    #[test]
    fn test_zero_and_one_games_are_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(ClientSpawnPlan::generate(0, &mut rng).is_empty());
        assert!(ClientSpawnPlan::generate(1, &mut rng).is_empty());
    }

    #[test]
    fn test_same_seed_same_plan() {
        let a = ClientSpawnPlan::from_seed(40, Some(99));
        let b = ClientSpawnPlan::from_seed(40, Some(99));
        assert_eq!(a, b);

        let c = ClientSpawnPlan::from_seed(40, Some(100));
        assert_ne!(a, c);
    }

    #[test]
    fn test_shuffle_separates_pairs() {
        // Unshuffled, the second half mirrors the first; a shuffle of 200
        // entries keeping that exact layout is practically impossible.
        let plan = ClientSpawnPlan::from_seed(200, Some(3));
        let (first, second) = plan.ids().split_at(100);
        assert_ne!(first, second);
    }

    #[test]
    fn test_endpoint_format() {
        let plan = ClientSpawnPlan::from_ids(vec![MatchId::new(4_294_967_295), MatchId::new(0)]);
        let endpoints = plan.endpoints("ws://localhost:5000");
        assert_eq!(endpoints[0], "ws://localhost:5000/play?id=4294967295");
        assert_eq!(endpoints[1], "ws://localhost:5000/play?id=0");
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        assert_eq!(
            endpoint_for("ws://host:5000/", MatchId::new(12)),
            "ws://host:5000/play?id=12"
        );
    }

    proptest! {
        #[test]
        fn prop_plan_length_and_pairing(games in 0u32..2000, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = ClientSpawnPlan::generate(games, &mut rng);

            prop_assert_eq!(plan.len(), (2 * (games / 2)) as usize);
            // Collisions between draws are allowed, so counts are even
            // rather than exactly two.
            for count in occurrences(&plan).values() {
                prop_assert_eq!(count % 2, 0);
            }
        }
    }
}
