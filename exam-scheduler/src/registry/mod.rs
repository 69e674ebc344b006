//! The exams and dates of one scheduling run.
//!
//! Both are kept in input order; an [`ExamId`] or [`DateId`] is the position of the entity in
//! that order and stays valid for the whole run since entities are never removed.
use std::fmt::Display;
use std::fmt::Formatter;

use fnv::FnvHashMap;
use itertools::Itertools;
use scheduler_oracle::containers::KeyedVec;
use scheduler_oracle::containers::StorageKey;

use crate::error::CompileError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExamId(u32);

impl StorageKey for ExamId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        ExamId(u32::try_from(index).expect("exam indices fit in a u32"))
    }
}

impl Display for ExamId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateId(u32);

impl DateId {
    /// The position of the date on the timeline.
    pub fn position(self) -> i32 {
        self.0 as i32
    }
}

impl StorageKey for DateId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        DateId(u32::try_from(index).expect("date indices fit in a u32"))
    }
}

impl Display for DateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exam {
    pub name: String,
    pub demand: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Date {
    pub label: String,
    pub capacity: i32,
}

/// Trims `name` and collapses every run of whitespace into a single space.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace().join(" ")
}

#[derive(Clone, Debug)]
pub struct Registry {
    exams: KeyedVec<ExamId, Exam>,
    dates: KeyedVec<DateId, Date>,
    exam_index: FnvHashMap<String, ExamId>,
    date_index: FnvHashMap<String, DateId>,
    placeholder_prefix: String,
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new("_")
    }
}

impl Registry {
    /// Exams whose name starts with `placeholder_prefix` are internal placeholders; an empty
    /// prefix means there are none.
    pub fn new(placeholder_prefix: impl Into<String>) -> Self {
        Registry {
            exams: KeyedVec::default(),
            dates: KeyedVec::default(),
            exam_index: FnvHashMap::default(),
            date_index: FnvHashMap::default(),
            placeholder_prefix: placeholder_prefix.into(),
        }
    }

    pub fn add_exam(&mut self, name: &str, demand: i32) -> Result<ExamId, CompileError> {
        let name = normalize_name(name);
        if self.exam_index.contains_key(&name) {
            return Err(CompileError::DuplicateExam(name));
        }

        let id = self.exams.push(Exam {
            name: name.clone(),
            demand,
        });
        let _ = self.exam_index.insert(name, id);
        Ok(id)
    }

    pub fn add_date(&mut self, label: &str, capacity: i32) -> Result<DateId, CompileError> {
        let label = label.trim().to_owned();
        if self.date_index.contains_key(&label) {
            return Err(CompileError::DuplicateDate(label));
        }

        let id = self.dates.push(Date {
            label: label.clone(),
            capacity,
        });
        let _ = self.date_index.insert(label, id);
        Ok(id)
    }

    pub fn exam(&self, exam: ExamId) -> &Exam {
        &self.exams[exam]
    }

    pub fn date(&self, date: DateId) -> &Date {
        &self.dates[date]
    }

    pub fn contains_exam(&self, exam: ExamId) -> bool {
        self.exams.contains_key(exam)
    }

    pub fn contains_date(&self, date: DateId) -> bool {
        self.dates.contains_key(date)
    }

    pub fn exams(&self) -> impl Iterator<Item = (ExamId, &Exam)> {
        self.exams.iter_with_keys()
    }

    pub fn dates(&self) -> impl Iterator<Item = (DateId, &Date)> {
        self.dates.iter_with_keys()
    }

    pub fn num_exams(&self) -> usize {
        self.exams.len()
    }

    /// The number of dates; exams are placed on `[0, horizon)`.
    pub fn horizon(&self) -> usize {
        self.dates.len()
    }

    /// Looks up an exam by its name after normalising it.
    pub fn find_exam(&self, name: &str) -> Option<ExamId> {
        self.exam_index.get(&normalize_name(name)).copied()
    }

    pub fn find_date(&self, label: &str) -> Option<DateId> {
        self.date_index.get(label.trim()).copied()
    }

    /// The date at position `position` on the timeline.
    pub fn date_at(&self, position: i32) -> Option<DateId> {
        let position = usize::try_from(position).ok()?;
        (position < self.dates.len()).then(|| DateId::create_from_index(position))
    }

    /// The largest capacity of any date, or [`None`] if there are no dates.
    pub fn max_capacity(&self) -> Option<i32> {
        self.dates.iter().map(|date| date.capacity).max()
    }

    pub fn is_placeholder(&self, exam: ExamId) -> bool {
        !self.placeholder_prefix.is_empty()
            && self.exams[exam].name.starts_with(&self.placeholder_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_normalised() {
        assert_eq!("Calculus 1 A", normalize_name("  Calculus   1  A "));
    }

    #[test]
    fn exams_are_indexed_in_input_order() {
        let mut registry = Registry::default();
        let first = registry.add_exam("Algebra", 1).expect("new exam");
        let second = registry.add_exam("Physics  1", 2).expect("new exam");

        assert_eq!(0, first.index());
        assert_eq!(1, second.index());
        assert_eq!(Some(second), registry.find_exam("Physics 1"));
        assert_eq!("Physics 1", registry.exam(second).name);
    }

    #[test]
    fn identifiers_cover_the_whole_u32_range() {
        let last = u32::MAX as usize;

        assert_eq!(last, ExamId::create_from_index(last).index());
        assert_eq!(last, DateId::create_from_index(last).index());
    }

    #[test]
    #[should_panic(expected = "exam indices fit in a u32")]
    fn exam_indices_beyond_u32_panic_instead_of_wrapping() {
        let _ = ExamId::create_from_index(u32::MAX as usize + 1);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = Registry::default();
        let _ = registry.add_exam("Algebra", 1).expect("new exam");

        assert_eq!(
            Err(CompileError::DuplicateExam("Algebra".to_owned())),
            registry.add_exam(" Algebra", 3)
        );
    }

    #[test]
    fn horizon_and_capacity_follow_the_dates() {
        let mut registry = Registry::default();
        assert_eq!(None, registry.max_capacity());

        let _ = registry.add_date("01/02/2025", 2).expect("new date");
        let _ = registry.add_date("02/02/2025", 5).expect("new date");

        assert_eq!(2, registry.horizon());
        assert_eq!(Some(5), registry.max_capacity());
        assert_eq!(registry.find_date("02/02/2025"), registry.date_at(1));
        assert_eq!(None, registry.date_at(2));
    }

    #[test]
    fn placeholders_are_recognised_by_prefix() {
        let mut registry = Registry::new("_");
        let real = registry.add_exam("Algebra", 1).expect("new exam");
        let placeholder = registry.add_exam("_reserved", 1).expect("new exam");

        assert!(!registry.is_placeholder(real));
        assert!(registry.is_placeholder(placeholder));

        let mut without_placeholders = Registry::new("");
        let exam = without_placeholders
            .add_exam("_reserved", 1)
            .expect("new exam");
        assert!(!without_placeholders.is_placeholder(exam));
    }
}
