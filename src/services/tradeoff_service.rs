//! Multi-Criteria Tradeoff Ranking
//!
//! Given a set of options scored against several objectives, the ranker
//! partitions them into four tiers: the Pareto front, dominated (excluded)
//! options, options missing objective values (incomplete), and options that
//! violate a stated preference range. Input order is preserved within every
//! tier, which downstream code relies on for narrative seeding.

use std::collections::HashMap;

use crate::services::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    Min,
    Max,
}

#[derive(Debug, Clone)]
pub struct Objective {
    pub key: &'static str,
    pub goal: Goal,
    /// Inclusive acceptable range; values outside it push the option into
    /// the does-not-meet-preference tier.
    pub range: Option<(f64, f64)>,
}

impl Objective {
    pub fn minimize(key: &'static str) -> Self {
        Self {
            key,
            goal: Goal::Min,
            range: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TradeoffOption {
    pub key: String,
    pub values: HashMap<&'static str, f64>,
}

/// The four tiers of option keys, best tier first, input order inside each.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeoffSolution {
    pub front: Vec<String>,
    pub excluded: Vec<String>,
    pub incomplete: Vec<String>,
    pub does_not_meet_preference: Vec<String>,
}

impl TradeoffSolution {
    /// All option keys, concatenated tier by tier.
    pub fn ordered_keys(&self) -> Vec<String> {
        self.front
            .iter()
            .chain(self.excluded.iter())
            .chain(self.incomplete.iter())
            .chain(self.does_not_meet_preference.iter())
            .cloned()
            .collect()
    }
}

pub trait TradeoffRanker: Send + Sync {
    fn solve(
        &self,
        objectives: &[Objective],
        options: &[TradeoffOption],
    ) -> Result<TradeoffSolution, PipelineError>;
}

/// An in-process Pareto solver over the objective set.
pub struct ParetoRanker;

fn is_complete(option: &TradeoffOption, objectives: &[Objective]) -> bool {
    objectives.iter().all(|o| option.values.contains_key(o.key))
}

fn meets_preferences(option: &TradeoffOption, objectives: &[Objective]) -> bool {
    objectives.iter().all(|o| match o.range {
        Some((lo, hi)) => option
            .values
            .get(o.key)
            .map(|v| (lo..=hi).contains(v))
            .unwrap_or(false),
        None => true,
    })
}

/// Whether `a` dominates `b`: at least as good on every objective and
/// strictly better on one.
fn dominates(a: &TradeoffOption, b: &TradeoffOption, objectives: &[Objective]) -> bool {
    let mut strictly_better = false;
    for objective in objectives {
        let (va, vb) = match (a.values.get(objective.key), b.values.get(objective.key)) {
            (Some(va), Some(vb)) => (*va, *vb),
            _ => return false,
        };
        let (better, worse) = match objective.goal {
            Goal::Min => (va < vb, va > vb),
            Goal::Max => (va > vb, va < vb),
        };
        if worse {
            return false;
        }
        if better {
            strictly_better = true;
        }
    }
    strictly_better
}

impl TradeoffRanker for ParetoRanker {
    fn solve(
        &self,
        objectives: &[Objective],
        options: &[TradeoffOption],
    ) -> Result<TradeoffSolution, PipelineError> {
        if objectives.is_empty() {
            return Err(PipelineError::Ranking(
                "no objectives to rank against".to_string(),
            ));
        }

        let mut solution = TradeoffSolution::default();
        let mut contenders: Vec<&TradeoffOption> = Vec::new();

        for option in options {
            if !is_complete(option, objectives) {
                solution.incomplete.push(option.key.clone());
            } else if !meets_preferences(option, objectives) {
                solution.does_not_meet_preference.push(option.key.clone());
            } else {
                contenders.push(option);
            }
        }

        for option in &contenders {
            let dominated = contenders
                .iter()
                .any(|other| dominates(other, option, objectives));
            if dominated {
                solution.excluded.push(option.key.clone());
            } else {
                solution.front.push(option.key.clone());
            }
        }

        Ok(solution)
    }
}
