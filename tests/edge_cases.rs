use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rulematch::{
    BenchmarkError, CompileError, Consistency, Record, RuleRepository, Schema, benchmark,
    benchmark_detailed, generate,
};

const MODES: [Consistency; 2] = [Consistency::Concurrent, Consistency::Phased];

#[test]
fn single_flag_rule_matches() {
    for mode in MODES {
        let repo = RuleRepository::with_consistency(mode);
        repo.put("r1", "is_vip == true").unwrap();

        let vip = Record::new().set("is_vip", true);
        assert_eq!(repo.match_record(&vip), ["r1"]);

        let regular = Record::new().set("is_vip", false);
        assert!(repo.match_record(&regular).is_empty());
    }
}

#[test]
fn disjunction_rule_matches_on_either_side() {
    for mode in MODES {
        let repo = RuleRepository::with_consistency(mode);
        repo.put("r1", "is_vip == true").unwrap();
        repo.put("r2", "(is_vip == true) or (user_id == 12345)").unwrap();

        let record = Record::new().set("is_vip", false).set("user_id", 12345_i64);
        assert_eq!(repo.match_record(&record), ["r2"]);

        let both = Record::new().set("is_vip", true).set("user_id", 1_i64);
        let mut hits = repo.match_record(&both);
        hits.sort();
        assert_eq!(hits, ["r1", "r2"]);
    }
}

#[test]
fn empty_repository_matches_nothing() {
    let repo = RuleRepository::new();
    assert!(repo.match_record(&Record::new().set("is_vip", true)).is_empty());
    assert!(repo.is_empty());
}

#[test]
fn empty_record_is_a_non_match_for_every_rule() {
    let repo = RuleRepository::new();
    repo.put("a", "is_vip").unwrap();
    repo.put("b", "not is_vip").unwrap();
    repo.put("c", r#"env == "prod""#).unwrap();
    let report = repo.match_detailed(&Record::new());
    assert!(report.hits().is_empty());
    assert_eq!(report.evaluated(), 3);
    assert_eq!(report.failed(), 3);
}

#[test]
fn wrong_kind_does_not_abort_the_pass() {
    let repo = RuleRepository::with_consistency(Consistency::Phased);
    repo.put("bad", "user_id == 12345").unwrap();
    repo.put("good", r#"env == "prod""#).unwrap();
    repo.put("bare", "env").unwrap();

    let record = Record::new().set("user_id", "12345").set("env", "prod");
    assert_eq!(repo.match_record(&record), ["good"]);
}

#[test]
fn short_circuit_hides_missing_field() {
    let repo = RuleRepository::new();
    repo.put("r", "is_vip or blacklisted").unwrap();
    assert_eq!(repo.match_record(&Record::new().set("is_vip", true)), ["r"]);
    assert!(repo.match_record(&Record::new().set("is_vip", false)).is_empty());
}

#[test]
fn replace_keeps_single_entry() {
    let repo = RuleRepository::new();
    repo.put("r", "is_vip").unwrap();
    repo.put("r", "blacklisted").unwrap();
    assert_eq!(repo.len(), 1);
    let record = Record::new().set("is_vip", true).set("blacklisted", false);
    assert!(repo.match_record(&record).is_empty());
}

#[test]
fn empty_and_whitespace_rules_rejected() {
    let repo = RuleRepository::new();
    for text in ["", "   ", "()", "and", "is_vip ==", "== 1"] {
        let err = repo.put("r", text).unwrap_err();
        assert!(
            matches!(err.error, CompileError::Syntax { .. }),
            "{text:?} gave {err}"
        );
        assert_eq!(err.error.text(), text);
    }
    assert!(repo.is_empty());
}

#[test]
fn deeply_nested_rule() {
    let mut text = "is_vip".to_owned();
    for _ in 0..60 {
        text = format!("not ({text})");
    }
    let repo = RuleRepository::new();
    repo.put("deep", &text).unwrap();
    assert_eq!(repo.match_record(&Record::new().set("is_vip", true)), ["deep"]);
}

#[test]
fn pathologically_nested_rules_are_rejected() {
    let depth = 100_000;
    let parens = format!("{}is_vip{}", "(".repeat(depth), ")".repeat(depth));
    let negations = format!("{}is_vip", "not ".repeat(depth));
    let bangs = format!("{}is_vip", "!".repeat(depth));

    let repo = RuleRepository::new();
    for text in [&parens, &negations, &bangs] {
        let err = repo.put("deep", text).unwrap_err();
        match &err.error {
            CompileError::Syntax { reason, .. } => {
                assert!(reason.contains("nested too deeply"), "{reason}");
            }
            other => panic!("expected Syntax, got {other:?}"),
        }
    }
    assert!(repo.is_empty());
}

#[test]
fn long_flat_chains_compile_and_match() {
    let text = (0..100_000)
        .map(|i| format!("f{}", i % 7))
        .collect::<Vec<_>>()
        .join(" or ");
    let repo = RuleRepository::new();
    repo.put("long", &text).unwrap();
    assert_eq!(repo.match_record(&Record::new().set("f0", true)), ["long"]);

    let none: Record = (0..7).map(|i| (format!("f{i}"), false)).collect();
    assert!(repo.match_record(&none).is_empty());
}

#[test]
fn wide_conjunction() {
    let text = (0..500)
        .map(|i| format!("f{i}"))
        .collect::<Vec<_>>()
        .join(" and ");
    let repo = RuleRepository::new();
    repo.put("wide", &text).unwrap();
    let record: Record = (0..500).map(|i| (format!("f{i}"), true)).collect();
    assert_eq!(repo.match_record(&record), ["wide"]);
}

#[test]
fn benchmark_empty_input_is_error() {
    let repo = RuleRepository::new();
    repo.put("r1", "is_vip").unwrap();
    assert_eq!(benchmark(&repo, &[]), Err(BenchmarkError::EmptyInput));
}

#[test]
fn benchmark_single_record_bounded_by_wall_time() {
    let repo = RuleRepository::new();
    repo.put("r1", "is_vip == true").unwrap();
    let inputs = [Record::new().set("is_vip", true)];

    let start = Instant::now();
    let average = benchmark(&repo, &inputs).unwrap();
    assert!(average <= start.elapsed());
}

#[test]
fn benchmark_generated_workload() {
    let schema = Schema::factor_pool();
    let mut rng = StdRng::seed_from_u64(99);
    let repo = RuleRepository::with_consistency(Consistency::Phased);
    for i in 0..50 {
        let text = rulematch::synthesize(&schema, 5, &mut rng);
        repo.put(&format!("auto-{i}"), &text).unwrap();
    }
    let inputs = generate(&schema, 20, &mut rng);
    let report = benchmark_detailed(&repo, &inputs).unwrap();
    assert_eq!(report.records(), 20);
    assert_eq!(report.rules(), 50);
    assert_eq!(repo.len(), 50);
}
