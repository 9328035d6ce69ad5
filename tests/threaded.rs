use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rulematch::{Consistency, Record, RuleRepository, Schema, generate, synthesize};

const MODES: [Consistency; 2] = [Consistency::Concurrent, Consistency::Phased];

fn vip_record() -> Record {
    Record::new()
        .set("is_vip", true)
        .set("blacklisted", false)
        .set("env", "prod")
        .set("user_id", 12345_i64)
}

#[test]
fn match_across_threads() {
    for mode in MODES {
        let repo = Arc::new(RuleRepository::with_consistency(mode));
        repo.put("vip", "is_vip").unwrap();
        repo.put("deny", "blacklisted").unwrap();
        repo.put("prod_vip", r#"is_vip and env == "prod""#).unwrap();
        repo.put("known", "user_id == 12345 or user_id == 67890").unwrap();

        let mut handles = vec![];

        // Thread 1: vip in prod -> vip, prod_vip, known
        let r = Arc::clone(&repo);
        handles.push(thread::spawn(move || r.match_record(&vip_record())));

        // Thread 2: blacklisted, unknown id -> deny
        let r = Arc::clone(&repo);
        handles.push(thread::spawn(move || {
            let record = Record::new()
                .set("is_vip", false)
                .set("blacklisted", true)
                .set("env", "staging")
                .set("user_id", 55555_i64);
            r.match_record(&record)
        }));

        // Thread 3: empty record -> every rule fails to evaluate
        let r = Arc::clone(&repo);
        handles.push(thread::spawn(move || r.match_record(&Record::new())));

        let results: Vec<Vec<String>> = handles
            .into_iter()
            .map(|h| {
                let mut hits = h.join().unwrap();
                hits.sort();
                hits
            })
            .collect();

        assert_eq!(results[0], ["known", "prod_vip", "vip"]);
        assert_eq!(results[1], ["deny"]);
        assert!(results[2].is_empty());
    }
}

#[test]
fn concurrent_puts_on_distinct_ids() {
    for mode in MODES {
        let repo = Arc::new(RuleRepository::with_consistency(mode));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let r = Arc::clone(&repo);
                thread::spawn(move || {
                    for i in 0..100 {
                        r.put(&format!("t{t}-{i}"), "is_vip").unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(repo.len(), 800);
        assert_eq!(repo.match_record(&vip_record()).len(), 800);
    }
}

#[test]
fn racing_puts_on_one_id_keep_a_single_entry() {
    for mode in MODES {
        let repo = Arc::new(RuleRepository::with_consistency(mode));
        let texts = ["is_vip", "blacklisted", "not is_vip", r#"env == "prod""#];
        let handles: Vec<_> = texts
            .into_iter()
            .map(|text| {
                let r = Arc::clone(&repo);
                thread::spawn(move || {
                    for _ in 0..200 {
                        r.put("shared", text).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(repo.len(), 1);
        let winner = repo.get("shared").unwrap();
        assert!(texts.contains(&winner.source()));
    }
}

#[test]
fn match_while_writing_sees_whole_rules() {
    for mode in MODES {
        let schema = Schema::factor_pool();
        let repo = Arc::new(RuleRepository::with_consistency(mode));
        let done = Arc::new(AtomicBool::new(false));

        let mut rng = StdRng::seed_from_u64(17);
        let inputs = generate(&schema, 50, &mut rng);

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let r = Arc::clone(&repo);
                let done = Arc::clone(&done);
                let inputs = inputs.clone();
                thread::spawn(move || {
                    let mut passes = 0_usize;
                    while !done.load(Ordering::Acquire) {
                        for record in &inputs {
                            let report = r.match_detailed(record);
                            // Every visible rule is fully compiled, so nothing
                            // fails on schema-complete records.
                            assert_eq!(report.failed(), 0);
                            assert!(report.hits().len() <= report.evaluated());
                        }
                        passes += 1;
                    }
                    passes
                })
            })
            .collect();

        let writer = {
            let r = Arc::clone(&repo);
            thread::spawn(move || {
                let schema = Schema::factor_pool();
                let mut rng = StdRng::seed_from_u64(18);
                for i in 0..500 {
                    let text = synthesize(&schema, 5, &mut rng);
                    r.put(&format!("auto-{}", i % 300), &text).unwrap();
                }
            })
        };

        writer.join().unwrap();
        done.store(true, Ordering::Release);
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(repo.len(), 300);
    }
}
