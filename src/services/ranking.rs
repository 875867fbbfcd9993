// src/services/ranking.rs
// DOCUMENTATION: Rank recomputation for cities and user profiles
// PURPOSE: Higher metric => numerically lower rank, ties broken by id

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::db::TravelogStore;
use crate::errors::TravelogError;

/// Rank assigned to entities excluded from a ranking
pub const UNRANKED: i32 = -1;

/// Compute rank changes for `(id, metric, current_rank)` entries
/// DOCUMENTATION: Ranks are 1..n over the entries with `Some` metric;
/// entries with `None` get UNRANKED. Only entries whose rank differs
/// from the current one are returned, so an unchanged set yields nothing
pub fn assign_ranks(entries: &[(i64, Option<i64>, i32)]) -> Vec<(i64, i32)> {
    let mut ranked: Vec<(i64, i64)> = entries
        .iter()
        .filter_map(|(id, metric, _)| metric.map(|m| (*id, m)))
        .collect();
    ranked.sort_by_key(|(id, metric)| (Reverse(*metric), *id));

    let mut target: HashMap<i64, i32> = ranked
        .iter()
        .enumerate()
        .map(|(i, (id, _))| (*id, i as i32 + 1))
        .collect();

    entries
        .iter()
        .filter_map(|(id, _, current)| {
            let rank = target.remove(id).unwrap_or(UNRANKED);
            (rank != *current).then_some((*id, rank))
        })
        .collect()
}

/// Applies rankings through the store
/// DOCUMENTATION: Each re-rank is a single store operation, so the list it
/// ranks and the ranks it writes come from the same snapshot
pub struct RankingService;

impl RankingService {
    /// Rank every city by tourist_count; returns the number of ranks changed
    pub async fn rerank_cities<S: TravelogStore>(store: &S) -> Result<usize, TravelogError> {
        let changed = store.rerank_cities().await?;
        log::debug!("Re-ranked cities ({} changed)", changed);
        Ok(changed)
    }

    /// Rank profiles with at least one city by city_count
    pub async fn rerank_profiles<S: TravelogStore>(store: &S) -> Result<usize, TravelogError> {
        let changed = store.rerank_profiles().await?;
        log::info!("Re-ranked profiles ({} changed)", changed);
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{url_name_for, NewCity};

    #[test]
    fn test_higher_metric_gets_lower_rank() {
        let changes = assign_ranks(&[(1, Some(10), -1), (2, Some(30), -1), (3, Some(20), -1)]);
        assert_eq!(changes, vec![(1, 3), (2, 1), (3, 2)]);
    }

    #[test]
    fn test_ties_broken_by_insertion_order() {
        let changes = assign_ranks(&[(5, Some(7), -1), (2, Some(7), -1)]);
        assert_eq!(changes, vec![(5, 2), (2, 1)]);
    }

    #[test]
    fn test_unchanged_ranks_not_written() {
        assert!(assign_ranks(&[(1, Some(30), 1), (2, Some(10), 2)]).is_empty());
        assert_eq!(assign_ranks(&[(1, Some(30), 2), (2, Some(10), 2)]), vec![(1, 1)]);
    }

    #[test]
    fn test_unmeasured_entries_unranked() {
        let changes = assign_ranks(&[(1, None, 3), (2, Some(1), -1), (3, None, -1)]);
        assert_eq!(changes, vec![(1, UNRANKED), (2, 1)]);
    }

    async fn add_city(store: &MemoryStore, name: &str, tourists: i64) {
        store
            .insert_city(NewCity {
                name: name.to_string(),
                url_name: url_name_for(name),
                country_name: "Country".to_string(),
                tourist_count: tourists,
                tourist_growth: 0.0,
                description: String::new(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rerank_cities_is_idempotent() {
        let store = MemoryStore::new();
        add_city(&store, "Rome", 100).await;
        add_city(&store, "Oslo", 300).await;
        add_city(&store, "Lima", 200).await;

        assert_eq!(RankingService::rerank_cities(&store).await.unwrap(), 3);
        assert_eq!(RankingService::rerank_cities(&store).await.unwrap(), 0);

        let ranked: Vec<_> = store
            .popular_cities(10)
            .await
            .unwrap()
            .into_iter()
            .map(|c| (c.name, c.rank))
            .collect();
        assert_eq!(
            ranked,
            vec![("Oslo".to_string(), 1), ("Lima".to_string(), 2), ("Rome".to_string(), 3)]
        );
    }
}
