use std::collections::{BTreeMap, BTreeSet};

use crate::contract::{InvocationOutcome, TargetReport, TargetStatistics};

/// Folds invocation outcomes into per-target statistics.
///
/// Outcomes are grouped by target name only, so same-named targets in
/// different regions share one entry. The requested concurrency and the
/// region of a group come from the first outcome recorded for it.
#[derive(Debug, Default)]
pub struct Aggregation {
    groups: BTreeMap<String, TargetStatistics>,
    recorded: usize,
}

impl Aggregation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: InvocationOutcome) {
        self.recorded += 1;
        let target = &outcome.target;
        let statistics = self
            .groups
            .entry(target.name.clone())
            .or_insert_with(|| TargetStatistics {
                name: target.name.clone(),
                path: target.path.clone(),
                region: target.region.clone(),
                requested_concurrency: target.count,
                achieved_concurrency: 0,
                responder_ids: BTreeSet::new(),
                failures: Vec::new(),
                latencies: Vec::new(),
            });

        statistics.latencies.push(outcome.latency);
        match (outcome.error, outcome.responder_id) {
            (Some(error), _) => statistics.failures.push(error),
            (None, Some(responder_id)) => {
                statistics.responder_ids.insert(responder_id);
                statistics.achieved_concurrency = statistics
                    .responder_ids
                    .len()
                    .min(statistics.requested_concurrency);
            }
            (None, None) => {}
        }
    }

    pub fn recorded(&self) -> usize {
        self.recorded
    }

    pub fn finish(self) -> BTreeMap<String, TargetStatistics> {
        self.groups
    }
}

pub fn aggregate_outcomes(
    outcomes: impl IntoIterator<Item = InvocationOutcome>,
) -> BTreeMap<String, TargetStatistics> {
    let mut aggregation = Aggregation::new();
    for outcome in outcomes {
        aggregation.record(outcome);
    }
    aggregation.finish()
}

pub fn target_reports(statistics: &BTreeMap<String, TargetStatistics>) -> Vec<TargetReport> {
    statistics.values().map(TargetStatistics::report).collect()
}
