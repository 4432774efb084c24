//! External station identifier resolution.
//!
//! Callers name stations by a numeric code (e.g. UIC `87686006`, optionally
//! written with the area prefix) or a display name, while the schedule store
//! is keyed by dataset ids such as `StopArea:OCE87686006`. A code is tried,
//! in order, as:
//!
//! 1. the area id built from the configured prefix and the code
//! 2. a substring of any stop id
//!
//! Any other input, and a code matching nothing, is compared to stop names
//! after accent folding and lower-casing.
//!
//! When several stops match, areas win over points, then shorter ids. The
//! result is always a station-level stop, since the connection index is
//! keyed at that level.

use std::collections::HashMap;
use std::sync::Arc;

use moka::sync::Cache as MokaCache;
use rayon::prelude::*;
use tracing::trace;

use crate::domain::{Stop, StopIdx};
use crate::planner::fold_accents;
use crate::schedule::ScheduleStore;

/// Configuration for station resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Prefix turning a numeric code into an area id.
    pub area_prefix: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            area_prefix: "StopArea:OCE".to_string(),
        }
    }
}

/// Resolves external ids to stations, memoizing every answer.
///
/// The mapping is static for a dataset release, so entries are kept for the
/// life of the resolver and never evicted.
/// The memo is safe to populate from concurrent queries.
pub struct StationResolver {
    store: Arc<ScheduleStore>,
    config: ResolverConfig,
    by_name: HashMap<String, Vec<StopIdx>>,
    cache: MokaCache<String, Option<StopIdx>>,
}

impl StationResolver {
    pub fn new(store: Arc<ScheduleStore>, config: ResolverConfig) -> Self {
        let mut by_name: HashMap<String, Vec<StopIdx>> = HashMap::new();
        for (idx, stop) in store.stops() {
            by_name.entry(normalize_name(&stop.name)).or_default().push(idx);
        }
        let cache = MokaCache::builder().build();

        Self {
            store,
            config,
            by_name,
            cache,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The station for an external id, or `None` if nothing matches.
    pub fn resolve(&self, external_id: &str) -> Option<StopIdx> {
        let key = external_id.trim();
        if key.is_empty() {
            return None;
        }
        self.cache.get_with(key.to_string(), || self.lookup(key))
    }

    /// Resolves many ids in parallel, preserving input order.
    pub fn resolve_many<S: AsRef<str> + Sync>(&self, external_ids: &[S]) -> Vec<Option<StopIdx>> {
        external_ids
            .par_iter()
            .map(|id| self.resolve(id.as_ref()))
            .collect()
    }

    /// Number of memoized resolutions.
    pub fn cached_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    fn lookup(&self, external_id: &str) -> Option<StopIdx> {
        if let Some(code) = self.numeric_code(external_id) {
            let area_id = format!("{}{}", self.config.area_prefix, code);
            if let Some(idx) = self.store.stop_by_id(&area_id) {
                return Some(self.store.station_of(idx));
            }

            let found = self.best_of(
                self.store
                    .stops()
                    .filter(|(_, stop)| stop.id.contains(code)),
            );
            if let Some(idx) = found {
                trace!(external_id, stop = %self.store.stop(idx).id, "resolved by code substring");
                return Some(self.store.station_of(idx));
            }
        }

        let found = self.by_name.get(&normalize_name(external_id)).and_then(|matches| {
            self.best_of(matches.iter().map(|idx| (*idx, self.store.stop(*idx))))
        });
        if let Some(idx) = found {
            trace!(external_id, stop = %self.store.stop(idx).id, "resolved by name");
            return Some(self.store.station_of(idx));
        }

        trace!(external_id, "no station found");
        None
    }

    /// The digits of an all-digit input, with or without the area prefix.
    fn numeric_code<'s>(&self, external_id: &'s str) -> Option<&'s str> {
        let code = external_id
            .strip_prefix(self.config.area_prefix.as_str())
            .unwrap_or(external_id);
        (!code.is_empty() && code.bytes().all(|b| b.is_ascii_digit())).then_some(code)
    }

    /// Prefers areas, then shorter ids, then lower indices.
    fn best_of<'s>(&self, candidates: impl Iterator<Item = (StopIdx, &'s Stop)>) -> Option<StopIdx> {
        candidates
            .min_by_key(|(idx, stop)| (!stop.is_area(), stop.id.len(), *idx))
            .map(|(idx, _)| idx)
    }
}

impl std::fmt::Debug for StationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StationResolver")
            .field("config", &self.config)
            .field("cached", &self.cache.entry_count())
            .finish()
    }
}

/// Accent-folded, lower-cased name with runs of separators collapsed.
fn normalize_name(name: &str) -> String {
    fold_accents(name)
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, hm, paris_lyon};

    fn resolver() -> (Arc<ScheduleStore>, StationResolver) {
        let store = Arc::new(paris_lyon(hm(9, 50)));
        let resolver = StationResolver::new(Arc::clone(&store), ResolverConfig::default());
        (store, resolver)
    }

    #[test]
    fn exact_area_id_from_code() {
        let (store, resolver) = resolver();
        let paris = store.stop_by_id("StopArea:OCE87686006").unwrap();
        assert_eq!(resolver.resolve("87686006"), Some(paris));
        assert_eq!(resolver.resolve(" 87686006 "), Some(paris));
    }

    #[test]
    fn substring_fallback_prefers_area() {
        let mut f = Fixture::new();
        f.named_station("Area:X-99887766", "Somewhere");
        f.point("Area:X-99887766", "Point:99887766-1");
        let store = Arc::new(f.build());
        let resolver = StationResolver::new(Arc::clone(&store), ResolverConfig::default());

        assert_eq!(resolver.resolve("99887766"), store.stop_by_id("Area:X-99887766"));
    }

    #[test]
    fn point_match_maps_to_station() {
        let mut f = Fixture::new();
        f.named_station("Area:North", "North");
        f.point("Area:North", "Point:1234");
        let store = Arc::new(f.build());
        let resolver = StationResolver::new(Arc::clone(&store), ResolverConfig::default());

        assert_eq!(resolver.resolve("1234"), store.stop_by_id("Area:North"));
    }

    #[test]
    fn name_fallback_ignores_accents_and_case() {
        let (store, resolver) = resolver();
        let macon = store.stop_by_id("StopArea:OCE87725002").unwrap();
        assert_eq!(resolver.resolve("macon ville"), Some(macon));
        assert_eq!(resolver.resolve("MÂCON-VILLE"), Some(macon));
    }

    #[test]
    fn name_match_prefers_area_over_point() {
        let (store, resolver) = resolver();
        let paris = store.stop_by_id("StopArea:OCE87686006").unwrap();
        assert_eq!(resolver.resolve("Paris Gare de Lyon"), Some(paris));
    }

    #[test]
    fn prefixed_code_resolves() {
        let (store, resolver) = resolver();
        let lyon = store.stop_by_id("StopArea:OCE87723197").unwrap();
        assert_eq!(resolver.resolve("StopArea:OCE87723197"), Some(lyon));
    }

    #[test]
    fn name_with_digits_skips_code_lookup() {
        let mut f = Fixture::new();
        f.named_station("Area:1300", "Marseille");
        f.named_station("Area:Paris-13", "Paris 13");
        let store = Arc::new(f.build());
        let resolver = StationResolver::new(Arc::clone(&store), ResolverConfig::default());

        assert_eq!(resolver.resolve("Paris 13"), store.stop_by_id("Area:Paris-13"));
        assert_eq!(resolver.resolve("Lyon 13"), None);
        assert_eq!(resolver.resolve("13"), store.stop_by_id("Area:1300"));
    }

    #[test]
    fn cache_keeps_every_answer() {
        let (_, resolver) = resolver();
        let ids: Vec<String> = (0..2_000).map(|n| format!("unknown-{n}")).collect();
        assert!(resolver.resolve_many(&ids).iter().all(Option::is_none));
        assert_eq!(resolver.cached_count(), 2_000);
    }

    #[test]
    fn unknown_and_empty_ids() {
        let (_, resolver) = resolver();
        assert_eq!(resolver.resolve("00000000"), None);
        assert_eq!(resolver.resolve("Atlantis"), None);
        assert_eq!(resolver.resolve("   "), None);
    }

    #[test]
    fn repeated_resolution_is_stable_and_cached() {
        let (_, resolver) = resolver();
        let first = resolver.resolve("87723197");
        for _ in 0..3 {
            assert_eq!(resolver.resolve("87723197"), first);
        }
        assert!(first.is_some());
        assert_eq!(resolver.cached_count(), 1);
    }

    #[test]
    fn resolve_many_keeps_order() {
        let (store, resolver) = resolver();
        let ids = ["87723197", "nowhere", "87686006"];
        let resolved = resolver.resolve_many(&ids);
        assert_eq!(
            resolved,
            vec![
                store.stop_by_id("StopArea:OCE87723197"),
                None,
                store.stop_by_id("StopArea:OCE87686006"),
            ]
        );
    }
}
