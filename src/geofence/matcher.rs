//! Geofence matching.
//!
//! A rule is eligible when it has something to show and any of these hold:
//! a scanned SSID is in its SSID list, a scanned BSSID is in its BSSID
//! list, or the resolved position lies within its radius (inclusive).
//! One eligible rule is then drawn uniformly at random.

use log::{debug, info};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::location::{NetworkObservation, Resolution};

use super::catalogue::LocationRule;

/// Whether `rule` matches the current surroundings.
pub fn is_eligible(
    rule: &LocationRule,
    observations: &[NetworkObservation],
    resolution: &Resolution,
) -> bool {
    if rule.actions.is_empty() {
        return false;
    }
    let by_ssid = observations.iter().any(|o| rule.matching_ssids.contains(&o.ssid));
    let by_bssid = observations
        .iter()
        .any(|o| rule.matching_bssids.contains(&o.bssid.to_ascii_lowercase()));
    let by_distance = resolution
        .coordinates()
        .is_some_and(|here| here.distance_km(&rule.target) <= rule.radius_km);

    by_ssid || by_bssid || by_distance
}

/// Stateless matcher over a loaded catalogue.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeofenceMatcher;

impl GeofenceMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Every eligible rule, in catalogue order.
    pub fn eligible<'a>(
        &self,
        rules: &'a [LocationRule],
        observations: &[NetworkObservation],
        resolution: &Resolution,
    ) -> Vec<&'a LocationRule> {
        rules
            .iter()
            .filter(|r| is_eligible(r, observations, resolution))
            .collect()
    }

    /// Draw one eligible rule, or `None` when nothing matches.
    pub fn select<'a, R: Rng + ?Sized>(
        &self,
        rules: &'a [LocationRule],
        observations: &[NetworkObservation],
        resolution: &Resolution,
        rng: &mut R,
    ) -> Option<&'a LocationRule> {
        let eligible = self.eligible(rules, observations, resolution);
        debug!("MATCH: {} of {} rules eligible", eligible.len(), rules.len());
        let chosen = eligible.choose(rng).copied();
        match chosen {
            Some(rule) => info!("MATCH: {}", rule.directory.display()),
            None => info!("MATCH: no rule matches"),
        }
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionToken;
    use crate::location::Coordinates;
    use crate::location::geo::EARTH_RADIUS_KM;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::PathBuf;

    fn rule(name: &str, target: Coordinates, radius_km: f64) -> LocationRule {
        LocationRule {
            directory: PathBuf::from(name),
            target,
            radius_km,
            matching_ssids: BTreeSet::new(),
            matching_bssids: BTreeSet::new(),
            actions: vec![ActionToken::Clear],
        }
    }

    fn here(lat: f64, lon: f64) -> Resolution {
        Resolution::Resolved(Coordinates::new(lat, lon))
    }

    #[test]
    fn within_radius_matches() {
        let r = rule("near", Coordinates::new(0.0, 0.0), 5.0);
        // ~4.9995 km east along the equator.
        assert!(is_eligible(&r, &[], &here(0.0, 0.04496)));
        // ~5.56 km: outside.
        assert!(!is_eligible(&r, &[], &here(0.0, 0.04996)));
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let target = Coordinates::new(0.0, 0.0);
        let point = Coordinates::new(0.0, 0.03);
        let exact = target.distance_km(&point);
        let r = rule("edge", target, exact);
        assert!(is_eligible(&r, &[], &Resolution::Resolved(point)));
        let tighter = rule("edge", target, exact - 1e-9);
        assert!(!is_eligible(&tighter, &[], &Resolution::Resolved(point)));
        // Sanity: 0.03 deg of longitude on the equator.
        assert!((exact - EARTH_RADIUS_KM * 0.03_f64.to_radians()).abs() < 1e-9);
    }

    #[test]
    fn negative_radius_only_matches_by_identifier() {
        let target = Coordinates::new(1.0, 1.0);
        let mut r = rule("odd", target, -1.0);
        assert!(!is_eligible(&r, &[], &Resolution::Resolved(target)));

        r.matching_ssids.insert("Cafe".into());
        let scan = [NetworkObservation::new("aa:bb:cc:dd:ee:ff", "Cafe", -60)];
        assert!(is_eligible(&r, &scan, &Resolution::Resolved(target)));
    }

    #[test]
    fn identifiers_match_without_resolution() {
        let mut by_ssid = rule("ssid", Coordinates::new(10.0, 10.0), 0.0);
        by_ssid.matching_ssids.insert("Cafe".into());
        let mut by_bssid = rule("bssid", Coordinates::new(10.0, 10.0), 0.0);
        by_bssid.matching_bssids.insert("aa:bb:cc:dd:ee:ff".into());

        let scan = [NetworkObservation::new("AA:BB:CC:DD:EE:FF", "Cafe", -60)];
        assert!(is_eligible(&by_ssid, &scan, &Resolution::Unresolved));
        assert!(is_eligible(&by_bssid, &scan, &Resolution::Unresolved));

        let other = [NetworkObservation::new("11:22:33:44:55:66", "cafe", -60)];
        assert!(!is_eligible(&by_ssid, &other, &Resolution::Unresolved));
        assert!(!is_eligible(&by_bssid, &other, &Resolution::Unresolved));
    }

    #[test]
    fn empty_actions_never_match() {
        let mut r = rule("blank", Coordinates::new(0.0, 0.0), 100.0);
        r.actions.clear();
        assert!(!is_eligible(&r, &[], &here(0.0, 0.0)));
    }

    #[test]
    fn unresolved_without_identifiers_matches_nothing() {
        let rules = [rule("a", Coordinates::new(0.0, 0.0), 1e6)];
        let picked = GeofenceMatcher::new().select(
            &rules,
            &[],
            &Resolution::Unresolved,
            &mut StdRng::seed_from_u64(0),
        );
        assert!(picked.is_none());
    }

    #[test]
    fn selection_is_uniform_over_eligible_rules() {
        let origin = Coordinates::new(0.0, 0.0);
        let rules = [
            rule("a", origin, 1.0),
            rule("b", origin, 1.0),
            rule("far", Coordinates::new(45.0, 45.0), 1.0),
            rule("c", origin, 1.0),
        ];
        let matcher = GeofenceMatcher::new();
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for _ in 0..3000 {
            let r = matcher.select(&rules, &[], &here(0.0, 0.0), &mut rng).unwrap();
            *counts.entry(r.directory.display().to_string()).or_default() += 1;
        }
        assert!(!counts.contains_key("far"));
        assert_eq!(counts.len(), 3);
        for n in counts.values() {
            assert!((800..1200).contains(n), "skewed selection: {counts:?}");
        }
    }

    #[test]
    fn same_seed_same_choice() {
        let origin = Coordinates::new(0.0, 0.0);
        let rules = [rule("a", origin, 1.0), rule("b", origin, 1.0), rule("c", origin, 1.0)];
        let matcher = GeofenceMatcher::new();
        let pick = |seed| {
            matcher
                .select(&rules, &[], &here(0.0, 0.0), &mut StdRng::seed_from_u64(seed))
                .map(|r| r.directory.clone())
        };
        assert_eq!(pick(3), pick(3));
    }
}
