use std::hash::Hasher;

use colonie_core::catalog::{Shape, SortRule};
use colonie_core::{
    Dataset, MemorySource, Outcome, Record, ReportEngine, ReportId, SeedConfig, TIMELINE_CAP,
    Value, generate_dataset,
};
use twox_hash::XxHash64;

const SEEDS: [u64; 4] = [1, 1337, 0x00C0_FFEE, 0xFACE_B00C];

fn engine(seed: u64) -> ReportEngine<MemorySource> {
    ReportEngine::new(MemorySource::new(generate_dataset(&SeedConfig::with_seed(seed))))
}

fn int(record: &Record, field: &str) -> i64 {
    record
        .get(field)
        .and_then(Value::as_i64)
        .unwrap_or_else(|| panic!("missing integer field {field} in {record:?}"))
}

/// Reports emitting success/mitigated/failure next to their action total.
const OUTCOME_PARTITIONED: [(ReportId, &str); 9] = [
    (ReportId::PerformanceByModel, "total_actions"),
    (ReportId::EthicalDilemmas, "times_faced"),
    (ReportId::RobotSpecialization, "total_actions"),
    (ReportId::ActionCategories, "total"),
    (ReportId::RobotSpecializationDetailed, "total_actions"),
    (ReportId::DilemmaSuccessByLaw, "total_actions"),
    (ReportId::VulnerabilityImpact, "total_actions"),
    (ReportId::SectorEthicalAnalysis, "total_actions"),
    (ReportId::PerformanceByDifficulty, "total_actions"),
];

/// Reports carrying a success rate and the total it is computed over.
const RATED: [(ReportId, &str, &str); 11] = [
    (ReportId::PerformanceByModel, "total_actions", "success_rate"),
    (ReportId::ScenarioDifficulty, "total_actions", "success_rate"),
    (ReportId::EthicalDilemmas, "times_faced", "success_rate"),
    (ReportId::RobotSpecialization, "total_actions", "success_rate"),
    (ReportId::SectorRiskAnalysis, "actions", "success_rate"),
    (ReportId::ActionCategories, "total", "success_rate"),
    (ReportId::DilemmaSuccessByLaw, "total_actions", "success_percent"),
    (ReportId::VulnerabilityImpact, "total_actions", "success_rate"),
    (ReportId::SectorEthicalAnalysis, "total_actions", "success_rate"),
    (ReportId::LawConflictAnalysis, "linked_actions", "resolution_rate"),
    (ReportId::PerformanceByDifficulty, "total_actions", "success_rate"),
];

/// `round(100 * success / total, 1)` with halves rounded up, in integers.
fn tenths_half_up(success: i64, total: i64) -> f64 {
    let tenths = (2 * success * 1000 + total) / (2 * total);
    tenths as f64 / 10.0
}

#[test]
fn outcome_counts_sum_to_total() {
    for seed in SEEDS {
        let engine = engine(seed);
        for (id, total_field) in OUTCOME_PARTITIONED {
            for record in engine.evaluate(id).unwrap() {
                let sum: i64 = Outcome::ALL
                    .iter()
                    .map(|outcome| int(&record, outcome.label()))
                    .sum();
                assert_eq!(
                    sum,
                    int(&record, total_field),
                    "{id} seed {seed}: {record:?}"
                );
            }
        }
    }
}

#[test]
fn rate_is_absent_exactly_when_total_is_zero() {
    for seed in SEEDS {
        let engine = engine(seed);
        for (id, total_field, rate_field) in RATED {
            for record in engine.evaluate(id).unwrap() {
                let total = int(&record, total_field);
                let rate = record.get(rate_field).unwrap();
                if total == 0 {
                    assert!(rate.is_absent(), "{id}: zero total with rate {rate:?}");
                    continue;
                }
                let actual = rate.as_f64().unwrap();
                assert!((0.0..=100.0).contains(&actual), "{id}: rate {actual}");
                // law-conflict-analysis does not emit its success count.
                let Some(success) = record.get("success").and_then(Value::as_i64) else {
                    continue;
                };
                let expected = tenths_half_up(success, total);
                assert_eq!(
                    actual, expected,
                    "{id}: {success}/{total} gave {actual}, expected {expected}"
                );
            }
        }
    }
}

#[test]
fn descending_rate_reports_put_absent_last() {
    let mut data = generate_dataset(&SeedConfig::with_seed(5));
    // Idle robots guarantee absent rates in the robot reports.
    let next_id = data.robots.len() as u32 + 1;
    for offset in 0..20 {
        let mut idle = data.robots[0].clone();
        idle.id = next_id + offset;
        idle.name = format!("R{:03}_idle", idle.id);
        data.robots.push(idle);
    }
    let engine = ReportEngine::new(MemorySource::new(data));

    for id in ReportId::ALL {
        let Shape::Grouped(spec) = id.definition().shape else {
            continue;
        };
        let SortRule::Descending(field) = spec.sort else {
            continue;
        };
        let records = engine.evaluate(id).unwrap();
        let values: Vec<_> = records.iter().map(|r| r.get(field).unwrap().clone()).collect();
        let first_absent = values.iter().position(Value::is_absent).unwrap_or(values.len());
        assert!(
            values[first_absent..].iter().all(Value::is_absent),
            "{id}: present value after an absent one"
        );
        for pair in values[..first_absent].windows(2) {
            assert!(pair[0].as_f64() >= pair[1].as_f64(), "{id}: not descending");
        }
    }
}

#[test]
fn vulnerability_reports_follow_rank_order() {
    let rank = |label: &str| match label {
        "low" => 1,
        "medium" => 2,
        "high" => 3,
        other => panic!("unexpected vulnerability {other}"),
    };
    for seed in SEEDS {
        let engine = engine(seed);
        for id in [
            ReportId::HumansVulnerability,
            ReportId::VulnerabilityVsOutcomes,
            ReportId::VulnerabilityImpact,
        ] {
            let ranks: Vec<_> = engine
                .evaluate(id)
                .unwrap()
                .iter()
                .map(|r| rank(&r.get("vulnerability").unwrap().to_string()))
                .collect();
            assert!(ranks.windows(2).all(|w| w[0] <= w[1]), "{id}: {ranks:?}");
        }

        let distribution = engine.evaluate(ReportId::HumansVulnerability).unwrap();
        let labels: Vec<_> = distribution
            .iter()
            .map(|r| r.get("vulnerability").unwrap().to_string())
            .collect();
        assert_eq!(labels, vec!["low", "medium", "high"]);
    }
}

#[test]
fn law_ordered_reports_ascend_by_priority() {
    let engine = engine(1337);
    for id in [
        ReportId::ScenarioDifficulty,
        ReportId::EthicalDilemmas,
        ReportId::ScenariosByPriority,
        ReportId::EthicalComplexity,
        ReportId::DilemmaSuccessByLaw,
        ReportId::TimeExecutionPatterns,
    ] {
        let laws: Vec<_> = engine
            .evaluate(id)
            .unwrap()
            .iter()
            .map(|r| int(r, "law"))
            .collect();
        assert!(laws.windows(2).all(|w| w[0] <= w[1]), "{id}: {laws:?}");
    }
}

#[test]
fn timeline_is_capped_and_newest_first() {
    for seed in SEEDS {
        let feed = engine(seed).evaluate(ReportId::Timeline).unwrap();
        assert_eq!(feed.len(), TIMELINE_CAP);
        let stamps: Vec<_> = feed
            .iter()
            .map(|r| r.get("timestamp").unwrap().to_string())
            .collect();
        assert!(stamps.windows(2).all(|w| w[0] >= w[1]), "seed {seed}");
    }

    let small = SeedConfig {
        actions: 7,
        ..SeedConfig::with_seed(9)
    };
    let feed = ReportEngine::new(MemorySource::new(generate_dataset(&small)))
        .evaluate(ReportId::Timeline)
        .unwrap();
    assert_eq!(feed.len(), 7);
}

#[test]
fn top_n_reports_respect_their_limits() {
    let engine = engine(1337);
    assert_eq!(engine.evaluate(ReportId::RobotSpecialization).unwrap().len(), 15);
    assert_eq!(
        engine.evaluate(ReportId::RobotSpecializationDetailed).unwrap().len(),
        15
    );
    let maturity = engine.evaluate(ReportId::RobotEthicalMaturity).unwrap();
    assert_eq!(maturity.len(), 10);
    assert!(maturity.iter().all(|r| int(r, "scenarios_handled") > 0));
}

#[test]
fn global_stats_matches_collection_sizes() {
    let config = SeedConfig::default();
    let engine = ReportEngine::new(MemorySource::new(generate_dataset(&config)));
    let stats = engine.evaluate(ReportId::GlobalStats).unwrap();
    assert_eq!(stats.len(), 1);
    let row = &stats[0];
    assert_eq!(int(row, "total_actions"), i64::from(config.actions));
    assert_eq!(int(row, "total_robots"), i64::from(config.robots));
    assert_eq!(
        int(row, "active_robots") + int(row, "inactive_robots") + int(row, "broken_robots"),
        int(row, "total_robots")
    );
    assert_eq!(int(row, "total_scenarios"), 28);
    assert_eq!(
        int(row, "total_success") + int(row, "total_mitigated") + int(row, "total_failure"),
        int(row, "total_actions")
    );
}

#[test]
fn repeated_evaluation_is_byte_identical() {
    let engine = engine(0x00C0_FFEE);
    let render = || {
        let results = engine.evaluate_all().unwrap();
        let map: serde_json::Map<String, serde_json::Value> = results
            .into_iter()
            .map(|(id, records)| (id.slug().to_string(), serde_json::to_value(records).unwrap()))
            .collect();
        serde_json::to_string(&map).unwrap()
    };
    let first = render();
    let second = render();
    assert_eq!(snapshot_hash(first.as_bytes()), snapshot_hash(second.as_bytes()));
    assert_eq!(first, second);
}

#[test]
fn empty_store_yields_empty_groups_and_one_global_row() {
    let engine = ReportEngine::new(MemorySource::new(Dataset::empty()));
    for (id, records) in engine.evaluate_all().unwrap() {
        if id == ReportId::GlobalStats {
            assert_eq!(records.len(), 1);
            assert!(records[0].get("success_rate").unwrap().is_absent());
        } else {
            assert!(records.is_empty(), "{id} returned rows for an empty store");
        }
    }
}

fn snapshot_hash(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}
