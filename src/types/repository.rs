use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, warn};

use super::error::RuleError;
use super::match_report::MatchReport;
use super::record::Record;
use super::rule::Rule;
use crate::compile::Compiler;
use crate::evaluate::{MatchPass, is_hit};

/// How a [`RuleRepository`] stores its rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Consistency {
    /// Sharded concurrent map. Writers and readers may run at the same time;
    /// every key is updated atomically and an enumeration sees each rule
    /// either fully installed or not at all. Enumeration order is
    /// unspecified.
    #[default]
    Concurrent,
    /// One insertion-ordered table behind a reader-writer lock, tuned for a
    /// load-then-read lifecycle: install every rule first, then match from
    /// as many threads as needed. Enumeration follows first-insertion order.
    ///
    /// Writing while other threads are matching is memory safe, but each
    /// write waits for in-flight match passes and blocks new ones.
    Phased,
}

#[derive(Debug, Default)]
struct PhasedTable {
    index: HashMap<String, usize>,
    rules: Vec<Arc<Rule>>,
}

#[derive(Debug)]
enum Store {
    Concurrent(DashMap<String, Arc<Rule>>),
    Phased(RwLock<PhasedTable>),
}

/// A store of compiled rules keyed by id, with insert-or-replace semantics.
///
/// Thread-safe and designed to live behind `Arc`. Racing `put`s on the same
/// id resolve last-write-wins.
///
/// # Example
///
/// ```
/// use rulematch::{Record, RuleRepository};
///
/// let repo = RuleRepository::new();
/// repo.put("r1", "is_vip == true").unwrap();
/// repo.put("r2", "(is_vip == true) or (user_id == 12345)").unwrap();
///
/// let record = Record::new().set("is_vip", false).set("user_id", 12345_i64);
/// assert_eq!(repo.match_record(&record), vec!["r2".to_owned()]);
/// ```
#[derive(Debug)]
pub struct RuleRepository {
    compiler: Compiler,
    store: Store,
}

impl Default for RuleRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRepository {
    /// An empty, concurrent repository with an untyped compiler.
    #[must_use]
    pub fn new() -> Self {
        Self::with_consistency(Consistency::Concurrent)
    }

    #[must_use]
    pub fn with_consistency(consistency: Consistency) -> Self {
        let store = match consistency {
            Consistency::Concurrent => Store::Concurrent(DashMap::new()),
            Consistency::Phased => Store::Phased(RwLock::new(PhasedTable::default())),
        };
        Self {
            compiler: Compiler::new(),
            store,
        }
    }

    /// Use `compiler` for every subsequent [`put`](Self::put).
    #[must_use]
    pub fn with_compiler(mut self, compiler: Compiler) -> Self {
        self.compiler = compiler;
        self
    }

    #[must_use]
    pub fn consistency(&self) -> Consistency {
        match self.store {
            Store::Concurrent(_) => Consistency::Concurrent,
            Store::Phased(_) => Consistency::Phased,
        }
    }

    #[must_use]
    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Compile `text` and install it under `id`, replacing any rule already
    /// stored there.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] if the text does not compile. The repository is
    /// left exactly as it was.
    pub fn put(&self, id: &str, text: &str) -> Result<(), RuleError> {
        let predicate = self.compiler.compile(text).map_err(|error| {
            warn!(rule_id = id, %error, "rejected rule");
            RuleError {
                id: id.to_owned(),
                error,
            }
        })?;
        let rule = Arc::new(Rule::new(id.to_owned(), text.to_owned(), predicate));
        let replaced = self.install(rule);
        debug!(rule_id = id, replaced, "installed rule");
        Ok(())
    }

    fn install(&self, rule: Arc<Rule>) -> bool {
        match &self.store {
            Store::Concurrent(map) => map.insert(rule.id().to_owned(), rule).is_some(),
            Store::Phased(lock) => {
                let mut guard = lock.write();
                let table = &mut *guard;
                if let Some(&idx) = table.index.get(rule.id()) {
                    table.rules[idx] = rule;
                    return true;
                }
                table.index.insert(rule.id().to_owned(), table.rules.len());
                table.rules.push(rule);
                false
            }
        }
    }

    /// Remove the rule stored under `id`. Returns whether one was present.
    pub fn remove(&self, id: &str) -> bool {
        let removed = match &self.store {
            Store::Concurrent(map) => map.remove(id).is_some(),
            Store::Phased(lock) => {
                let mut guard = lock.write();
                let table = &mut *guard;
                match table.index.remove(id) {
                    Some(idx) => {
                        table.rules.remove(idx);
                        for slot in table.index.values_mut() {
                            if *slot > idx {
                                *slot -= 1;
                            }
                        }
                        true
                    }
                    None => false,
                }
            }
        };
        if removed {
            debug!(rule_id = id, "removed rule");
        }
        removed
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<Rule>> {
        match &self.store {
            Store::Concurrent(map) => map.get(id).map(|entry| Arc::clone(entry.value())),
            Store::Phased(lock) => {
                let table = lock.read();
                table.index.get(id).map(|&idx| Arc::clone(&table.rules[idx]))
            }
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        match &self.store {
            Store::Concurrent(map) => map.contains_key(id),
            Store::Phased(lock) => lock.read().index.contains_key(id),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match &self.store {
            Store::Concurrent(map) => map.len(),
            Store::Phased(lock) => lock.read().rules.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visit every stored rule until `visit` returns `false`.
    ///
    /// Safe to call while other threads `put`. Locks are held while `visit`
    /// runs, so `visit` must not call back into this repository at all.
    /// Reads such as `get`, `contains` or `len` can deadlock against a
    /// writer queued on another thread, just like `put` and `remove`. Take a
    /// [`snapshot`](Self::snapshot) first if the visitor needs the
    /// repository.
    pub fn for_each(&self, mut visit: impl FnMut(&Rule) -> bool) {
        match &self.store {
            Store::Concurrent(map) => {
                for entry in map.iter() {
                    if !visit(entry.value()) {
                        break;
                    }
                }
            }
            Store::Phased(lock) => {
                let table = lock.read();
                for rule in &table.rules {
                    if !visit(rule) {
                        break;
                    }
                }
            }
        }
    }

    /// The current rules, detached from the repository's locks.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<Rule>> {
        let mut rules = Vec::with_capacity(self.len());
        match &self.store {
            Store::Concurrent(map) => {
                rules.extend(map.iter().map(|entry| Arc::clone(entry.value())));
            }
            Store::Phased(lock) => rules.extend(lock.read().rules.iter().cloned()),
        }
        rules
    }

    /// Ids of all stored rules, in enumeration order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        let mut ids = Vec::with_capacity(self.len());
        self.for_each(|rule| {
            ids.push(rule.id().to_owned());
            true
        });
        ids
    }

    /// Evaluate every rule against `record` and return the ids that match,
    /// in enumeration order.
    ///
    /// A rule whose evaluation fails (missing field, wrong value kind) is
    /// treated as not matching; the failure never aborts the pass.
    #[must_use]
    pub fn match_record(&self, record: &Record) -> Vec<String> {
        let mut hits = Vec::new();
        self.for_each(|rule| {
            if is_hit(rule, record) {
                hits.push(rule.id().to_owned());
            }
            true
        });
        hits
    }

    /// Like [`match_record`](Self::match_record), also reporting how many
    /// rules were evaluated, how many failed to evaluate, and how long the
    /// pass took.
    pub fn match_detailed(&self, record: &Record) -> MatchReport {
        let mut pass = MatchPass::new(record);
        self.for_each(|rule| {
            pass.visit(rule);
            true
        });
        pass.finish()
    }
}

impl fmt::Display for RuleRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RuleRepository({} rules, {:?})",
            self.len(),
            self.consistency()
        )
    }
}
