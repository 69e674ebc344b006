use super::store::KeyedStore;
use super::GapRule;
use crate::registry::ExamId;

/// An unordered pair of distinct exams, stored with the lower id first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExamPair {
    first: ExamId,
    second: ExamId,
}

impl ExamPair {
    /// Returns [`None`] when `a == b`.
    pub fn new(a: ExamId, b: ExamId) -> Option<ExamPair> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(ExamPair {
                first: a,
                second: b,
            }),
            std::cmp::Ordering::Greater => Some(ExamPair {
                first: b,
                second: a,
            }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn first(self) -> ExamId {
        self.first
    }

    pub fn second(self) -> ExamId {
        self.second
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdealGap {
    /// Zero once the gap has been disabled.
    pub days: u32,
    pub weight: i64,
}

impl IdealGap {
    pub fn is_enabled(self) -> bool {
        self.days >= 1
    }
}

/// The gaps requested between the two exams of an [`ExamPair`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GapRelation {
    /// Hard: the exams are at least this many dates apart.
    pub min_days: Option<u32>,
    /// Soft: violating it costs `weight`.
    pub ideal: Option<IdealGap>,
}

impl GapRelation {
    pub fn from_rule(rule: &GapRule) -> GapRelation {
        GapRelation {
            min_days: rule.min_days.filter(|&days| days >= 1),
            ideal: rule
                .ideal_days
                .filter(|&days| days >= 1)
                .map(|days| IdealGap {
                    days,
                    weight: rule.weight,
                }),
        }
    }

    pub fn enabled_min_days(&self) -> Option<u32> {
        self.min_days.filter(|&days| days >= 1)
    }

    pub fn enabled_ideal(&self) -> Option<IdealGap> {
        self.ideal.filter(|ideal| ideal.is_enabled())
    }
}

pub type GapRelations = KeyedStore<ExamPair, GapRelation>;

/// An ideal gap which was disabled because the minimal gap of the same pair implies it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RedundantIdealGap {
    pub pair: ExamPair,
    pub min_days: u32,
    pub ideal_days: u32,
}

/// Zeroes every ideal gap which does not exceed the minimal gap of its pair.
pub fn disable_redundant_ideal_gaps(gaps: &mut GapRelations) -> Vec<RedundantIdealGap> {
    let mut disabled = vec![];
    for (&pair, relation) in gaps.iter_mut() {
        let (Some(min_days), Some(ideal)) = (relation.enabled_min_days(), relation.ideal.as_mut())
        else {
            continue;
        };
        if ideal.is_enabled() && ideal.days <= min_days {
            disabled.push(RedundantIdealGap {
                pair,
                min_days,
                ideal_days: ideal.days,
            });
            ideal.days = 0;
        }
    }
    disabled
}
