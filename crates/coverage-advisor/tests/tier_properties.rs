/// Property-based tests for the tier tables and engine determinism
use coverage_advisor::recommendations::engine::tiers::{
    Tier, TierResolver, ELECTRICAL_DAMAGE_LIMIT, LIABILITY_LIMITS, THEFT_PERCENTAGE,
};
use coverage_advisor::recommendations::{
    AssemblyMode, FormSubmission, ProductSelection, RecommendationService,
};
use proptest::prelude::*;

fn reference_resolve(tiers: &[Tier<u64>], probe: f64) -> u64 {
    let probe = if probe.is_finite() && probe >= 0.0 { probe } else { 0.0 };
    tiers
        .iter()
        .filter(|tier| tier.lower_bound <= probe)
        .max_by(|a, b| a.lower_bound.total_cmp(&b.lower_bound))
        .or_else(|| tiers.iter().min_by(|a, b| a.lower_bound.total_cmp(&b.lower_bound)))
        .map(|tier| tier.value)
        .unwrap_or_default()
}

// Property: every probe resolves to a value from the table
proptest! {
    #[test]
    fn resolve_is_total(probe in proptest::num::f64::ANY) {
        let electrical = *ELECTRICAL_DAMAGE_LIMIT.resolve(probe);
        prop_assert!([30_000, 60_000, 100_000].contains(&electrical));

        let theft = *THEFT_PERCENTAGE.resolve(probe);
        prop_assert!(theft == 25 || theft == 50);

        let limits = LIABILITY_LIMITS.resolve(probe);
        prop_assert!(limits.general >= 600_000);
    }

    #[test]
    fn resolve_is_monotonic(a in 0.0f64..20_000_000.0, b in 0.0f64..20_000_000.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(ELECTRICAL_DAMAGE_LIMIT.resolve(low) <= ELECTRICAL_DAMAGE_LIMIT.resolve(high));
        prop_assert!(THEFT_PERCENTAGE.resolve(low) <= THEFT_PERCENTAGE.resolve(high));
        prop_assert!(LIABILITY_LIMITS.resolve(low).general <= LIABILITY_LIMITS.resolve(high).general);
    }
}

// Property: declaration order of the table never changes the result
proptest! {
    #[test]
    fn resolve_ignores_table_order(
        mut bounds in proptest::collection::vec(0u32..5_000_000u32, 1..8),
        probe in 0.0f64..6_000_000.0,
        rotation in 0usize..8
    ) {
        bounds.sort_unstable();
        bounds.dedup();
        let sorted: Vec<Tier<u64>> = bounds
            .iter()
            .map(|bound| Tier::new(*bound as f64, *bound as u64 + 1))
            .collect();
        let mut shuffled = sorted.clone();
        let len = shuffled.len();
        shuffled.rotate_left(rotation % len);
        shuffled.reverse();

        let expected = reference_resolve(&sorted, probe);
        let by_bound = TierResolver::try_new(&sorted).expect("non-empty table");
        let rotated = TierResolver::try_new(&shuffled).expect("non-empty table");
        prop_assert_eq!(*by_bound.resolve(probe), expected);
        prop_assert_eq!(*rotated.resolve(probe), expected);
    }
}

// Property: the same form always yields the same recommendations
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn recommendations_are_deterministic(
        building in 0u32..3_000_000u32,
        contents in 0u32..3_000_000u32,
        billing in 0u32..15_000_000u32,
        tenant in proptest::bool::ANY
    ) {
        let submission: FormSubmission = serde_json::from_value(serde_json::json!({
            "empresa": {
                "nombre": "Industrias Prueba S.L.",
                "cif": "B00000001",
                "facturacion": billing,
                "instalaciones": if tenant { "inquilino" } else { "propietario" }
            },
            "capitales": { "continente": building, "contenido": contents }
        }))
        .expect("form deserializes");

        let service = RecommendationService::new(
            std::sync::Arc::new(NoSessions),
            AssemblyMode::Strict,
        );
        let first = service.evaluate(&submission, ProductSelection::All).expect("evaluates");
        let second = service.evaluate(&submission, ProductSelection::All).expect("evaluates");
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), 2);
    }
}

struct NoSessions;

impl coverage_advisor::recommendations::ProfileRepository for NoSessions {
    fn store(
        &self,
        _record: coverage_advisor::recommendations::SessionRecord,
    ) -> Result<(), coverage_advisor::recommendations::RepositoryError> {
        Ok(())
    }

    fn fetch(
        &self,
        _session_id: &coverage_advisor::recommendations::SessionId,
    ) -> Result<
        Option<coverage_advisor::recommendations::SessionRecord>,
        coverage_advisor::recommendations::RepositoryError,
    > {
        Ok(None)
    }
}
