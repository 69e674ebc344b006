//! Expands wildcard rule rows into concrete relations between registered exams and dates.
//!
//! The rows of each category are applied in order. A row which matches nothing is reported and
//! otherwise ignored. A row which touches a relation of an earlier row is reported once,
//! distinguishing rows which only re-assert stored values from rows which override them.
//!
//! Gap relations are keyed by their canonical [`ExamPair`]; a later row replaces the whole
//! relation of the pair. Pins are keyed by exam, so the last pin of an exam wins. Precedences are
//! kept as an ordered list in which a repeated pair is moved to the end. After all gap rows have
//! been applied, ideal gaps which do not exceed the minimal gap of their pair are disabled.
mod gaps;
mod pattern;
mod rules;
mod store;

use std::collections::BTreeMap;

use log::debug;

pub use gaps::*;
pub use pattern::*;
pub use rules::*;
pub use store::*;

use crate::error::CompileError;
use crate::registry::DateId;
use crate::registry::ExamId;
use crate::registry::Registry;
use crate::run_log::DuplicateKind;
use crate::run_log::Notice;
use crate::run_log::RunLog;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompiledRelations {
    pub gaps: GapRelations,
    /// `(a, b)`: `a` takes place no later than `b`.
    pub precedences: Vec<(ExamId, ExamId)>,
    pub pins: KeyedStore<ExamId, DateId>,
    pub hints: BTreeMap<ExamId, DateId>,
}

/// Compiles every category of `rules`; pins are resolved before hints.
pub fn compile(
    registry: &Registry,
    rules: &RuleSet,
    log: &mut RunLog,
) -> Result<CompiledRelations, CompileError> {
    let gaps = compile_gaps(registry, &rules.gaps, log)?;
    let precedences = compile_precedences(registry, &rules.precedences, log)?;
    let pins = compile_pins(registry, &rules.pins, log)?;
    let hints = compile_hints(registry, &rules.hints, log);

    debug!(
        "Compiled {} gap relations, {} precedences, {} pins and {} hints",
        gaps.len(),
        precedences.len(),
        pins.len(),
        hints.len()
    );

    Ok(CompiledRelations {
        gaps,
        precedences,
        pins,
        hints,
    })
}

fn expand_pair_rule(
    registry: &Registry,
    row: RowRef,
    first: &str,
    second: &str,
) -> Result<Vec<(ExamId, ExamId)>, CompileError> {
    let invalid = |source| CompileError::InvalidPattern { row, source };
    let pattern = NamePattern::compile(first).map_err(invalid)?;
    let template = SubstitutionTemplate::parse(second).map_err(invalid)?;
    match_pairs(&pattern, &template, registry).map_err(invalid)
}

/// Folds the outcomes of the upserts of one row into the kind of duplicate it is, if any.
fn duplicate_kind(outcomes: impl IntoIterator<Item = Upsert>) -> Option<DuplicateKind> {
    outcomes
        .into_iter()
        .fold(None, |kind, outcome| match (kind, outcome) {
            (Some(DuplicateKind::Overriding), _) | (_, Upsert::Overridden) => {
                Some(DuplicateKind::Overriding)
            }
            (_, Upsert::Reasserted) => Some(DuplicateKind::NonOverriding),
            (kind, Upsert::Inserted) => kind,
        })
}

pub fn compile_gaps(
    registry: &Registry,
    rules: &[GapRule],
    log: &mut RunLog,
) -> Result<GapRelations, CompileError> {
    let mut gaps = GapRelations::default();

    for rule in rules {
        let pairs = expand_pair_rule(registry, rule.row, &rule.first, &rule.second)?;
        if pairs.is_empty() {
            log.record(Notice::ZeroMatches { row: rule.row });
            continue;
        }

        let relation = GapRelation::from_rule(rule);
        let outcomes = pairs
            .into_iter()
            .filter_map(|(a, b)| ExamPair::new(a, b))
            .map(|pair| gaps.upsert(pair, relation))
            .collect::<Vec<_>>();
        if let Some(kind) = duplicate_kind(outcomes) {
            log.record(Notice::Duplicate {
                row: rule.row,
                kind,
            });
        }
    }

    for redundant in disable_redundant_ideal_gaps(&mut gaps) {
        log.record(Notice::RedundantIdealGap {
            first: registry.exam(redundant.pair.first()).name.clone(),
            second: registry.exam(redundant.pair.second()).name.clone(),
            min_days: redundant.min_days,
            ideal_days: redundant.ideal_days,
        });
    }

    Ok(gaps)
}

pub fn compile_precedences(
    registry: &Registry,
    rules: &[PrecedenceRule],
    log: &mut RunLog,
) -> Result<Vec<(ExamId, ExamId)>, CompileError> {
    let mut precedences: Vec<(ExamId, ExamId)> = vec![];

    for rule in rules {
        let pairs = expand_pair_rule(registry, rule.row, &rule.first, &rule.second)?;
        if pairs.is_empty() {
            log.record(Notice::ZeroMatches { row: rule.row });
            continue;
        }

        let mut repeated = false;
        for pair in pairs {
            if let Some(position) = precedences.iter().position(|&existing| existing == pair) {
                let _ = precedences.remove(position);
                repeated = true;
            }
            precedences.push(pair);
        }
        if repeated {
            log.record(Notice::Duplicate {
                row: rule.row,
                kind: DuplicateKind::Repeated,
            });
        }
    }

    Ok(precedences)
}

/// Resolves the pins; a pin naming an unknown date is an error even when it matches no exam.
pub fn compile_pins(
    registry: &Registry,
    rules: &[PinRule],
    log: &mut RunLog,
) -> Result<KeyedStore<ExamId, DateId>, CompileError> {
    let mut pins = KeyedStore::default();

    for rule in rules {
        let pattern = NamePattern::compile(&rule.pattern).map_err(|source| {
            CompileError::InvalidPattern {
                row: rule.row,
                source,
            }
        })?;
        let exams = match_names(&pattern, registry);
        if exams.is_empty() {
            log.record(Notice::ZeroMatches { row: rule.row });
        }
        let date = registry
            .find_date(&rule.date)
            .ok_or_else(|| CompileError::UnknownDate {
                row: rule.row,
                label: rule.date.clone(),
            })?;

        let outcomes = exams
            .into_iter()
            .map(|exam| pins.upsert(exam, date))
            .collect::<Vec<_>>();
        if let Some(kind) = duplicate_kind(outcomes) {
            log.record(Notice::Duplicate {
                row: rule.row,
                kind,
            });
        }
    }

    Ok(pins)
}

/// Resolves the rows of an earlier schedule by exact name; rows which cannot be resolved are
/// reported and skipped.
pub fn compile_hints(
    registry: &Registry,
    rows: &[HintRow],
    log: &mut RunLog,
) -> BTreeMap<ExamId, DateId> {
    let mut hints = BTreeMap::new();

    for row in rows {
        let Some(exam) = registry.find_exam(&row.exam) else {
            log.record(Notice::UnknownHintExam {
                row: row.row,
                exam: row.exam.clone(),
            });
            continue;
        };
        let Some(date) = registry.find_date(&row.date) else {
            log.record(Notice::UnknownHintDate {
                row: row.row,
                label: row.date.clone(),
            });
            continue;
        };
        let _ = hints.insert(exam, date);
    }

    hints
}
