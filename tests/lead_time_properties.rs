use proptest::prelude::*;

use echelon_sim::lead_time::{GeometricLeadTimeBuilder, LeadTimeModel};

fn model(accessibility: Vec<f64>, mean_secondary: f64, primary: u32) -> GeometricLeadTimeBuilder {
    GeometricLeadTimeBuilder::new()
        .cycle_length(1)
        .primary_offsets(vec![0])
        .secondary_offsets(vec![0])
        .delay(0)
        .retailer_to_district(vec![0])
        .primary_lead_times(vec![primary])
        .mean_secondary_lead_times(vec![mean_secondary])
        .accessibility(vec![accessibility])
}

proptest! {
    #[test]
    fn total_pmf_is_normalized(
        mut access in prop::collection::vec(0.0f64..=1.0, 6),
        open in 0usize..6,
        mean_secondary in 1.0f64..5.0,
        primary in 1u32..4,
        sent in -12i32..12,
    ) {
        // at least one period must be reachable
        access[open] = access[open].max(0.1);
        let lt = model(access.clone(), mean_secondary, primary).build().unwrap();
        let pmf = lt.total_lead_time_pmf(0, sent).unwrap();

        prop_assert!((pmf.total() - 1.0).abs() < 1e-9);
        prop_assert!(pmf.min_lead_time().unwrap() > primary);
        for (lead, &p) in pmf.probabilities().iter().enumerate() {
            let period = (sent + lead as i32).rem_euclid(6) as usize;
            if access[period] == 0.0 {
                prop_assert_eq!(p, 0.0);
            }
        }
    }

    #[test]
    fn conditional_pmf_renormalizes(
        access in prop::collection::vec(0.2f64..=1.0, 4),
        mean_secondary in 1.0f64..4.0,
        cut in 0u32..6,
    ) {
        let lt = model(access, mean_secondary, 1).build().unwrap();
        let pmf = lt.total_lead_time_pmf(0, 0).unwrap();
        if let Some(conditional) = pmf.conditional(cut) {
            prop_assert!((conditional.total() - 1.0).abs() < 1e-9);
            prop_assert!(conditional.min_lead_time().unwrap() >= cut);
        }
    }

    #[test]
    fn realized_lead_time_lies_in_pmf_support(
        access in prop::collection::vec(0.2f64..=1.0, 4),
        mean_secondary in 1.0f64..3.0,
        seed in any::<u64>(),
    ) {
        let mut lt = model(access, mean_secondary, 1).build().unwrap();
        lt.generate(-8, 200, seed).unwrap();
        for t in -8..40 {
            let Some(l) = lt.total_lead_time(0, t).unwrap() else {
                continue;
            };
            let pmf = lt.total_lead_time_pmf(0, t).unwrap();
            prop_assert!(l > 1);
            // late visits beyond the collapsed tail are possible
            if (l as usize) < pmf.len() {
                prop_assert!(pmf.probability(l) > 0.0, "t={} l={}", t, l);
            }
        }
    }
}
