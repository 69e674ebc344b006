//! Name patterns: regular expressions over exam names with `#` as a single-character wildcard.
//!
//! Matching is a two-stage pure computation. [`NamePattern::compile`] turns a pattern into a
//! classifier for names. [`NamePattern::derive_related`] uses a pattern together with a
//! [`SubstitutionTemplate`] to rewrite a name into a new pattern which selects the related exams.
use std::iter::Peekable;
use std::str::Chars;

use fnv::FnvHashMap;
use regex::Regex;

use crate::error::PatternError;
use crate::registry::normalize_name;
use crate::registry::ExamId;
use crate::registry::Registry;

/// The wildcard which may be used in patterns in addition to `.`.
const WILDCARD: char = '#';

/// Applies the whitespace normalisation of names and replaces the wildcard by `.`.
fn preprocess(pattern: &str) -> String {
    normalize_name(pattern).replace(WILDCARD, ".")
}

#[derive(Clone, Debug)]
pub struct NamePattern {
    source: String,
    /// Only matches the whole name.
    anchored: Regex,
    /// Finds every occurrence; used for substitution.
    unanchored: Regex,
}

impl NamePattern {
    pub fn compile(pattern: &str) -> Result<NamePattern, PatternError> {
        NamePattern::from_regex(preprocess(pattern)).map_err(|reason| {
            PatternError::InvalidPattern {
                pattern: pattern.to_owned(),
                reason,
            }
        })
    }

    fn from_regex(source: String) -> Result<NamePattern, String> {
        let anchored =
            Regex::new(&format!(r"\A(?:{source})\z")).map_err(|error| error.to_string())?;
        let unanchored = Regex::new(&source).map_err(|error| error.to_string())?;
        Ok(NamePattern {
            source,
            anchored,
            unanchored,
        })
    }

    /// The regular expression after preprocessing.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the whole of `name` matches.
    pub fn matches(&self, name: &str) -> bool {
        self.anchored.is_match(name)
    }

    /// Replaces every non-overlapping occurrence of this pattern in `name` by `template`.
    ///
    /// An empty occurrence directly after a non-empty one is replaced as well, so `.*` rewrites
    /// `Algebra` twice: once for the whole name and once for the empty remainder.
    pub fn derive_related(&self, template: &SubstitutionTemplate, name: &str) -> String {
        let mut derived = String::with_capacity(name.len() + template.replacement.len());
        let mut copied = 0;
        let mut position = 0;
        while position <= name.len() {
            let Some(captures) = self.unanchored.captures_at(name, position) else {
                break;
            };
            let Some(occurrence) = captures.get(0) else {
                break;
            };

            derived.push_str(&name[copied..occurrence.start()]);
            captures.expand(&template.replacement, &mut derived);
            copied = occurrence.end();

            position = if occurrence.is_empty() {
                // The next occurrence has to start after this one.
                match name[occurrence.end()..].chars().next() {
                    Some(next) => occurrence.end() + next.len_utf8(),
                    None => break,
                }
            } else {
                occurrence.end()
            };
        }
        derived.push_str(&name[copied..]);
        derived
    }

    /// Checks that every group `template` refers to exists in this pattern.
    pub fn check_template(&self, template: &SubstitutionTemplate) -> Result<(), PatternError> {
        let invalid = |reason: String| PatternError::InvalidTemplate {
            template: template.source.clone(),
            reason,
        };

        for group in &template.groups {
            match group {
                GroupRef::Index(index) if *index >= self.unanchored.captures_len() => {
                    return Err(invalid(format!("invalid group reference {index}")));
                }
                GroupRef::Name(name)
                    if !self
                        .unanchored
                        .capture_names()
                        .any(|candidate| candidate == Some(name.as_str())) =>
                {
                    return Err(invalid(format!("unknown group name '{name}'")));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum GroupRef {
    Index(usize),
    Name(String),
}

/// The second pattern of a pair rule, used as the replacement when rewriting a matched name.
///
/// Groups are referenced as `\1`, `\g<1>` or `\g<name>`; `$` has no special meaning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubstitutionTemplate {
    source: String,
    /// The template in the replacement syntax of [`regex::Captures::expand`].
    replacement: String,
    groups: Vec<GroupRef>,
}

impl SubstitutionTemplate {
    pub fn parse(template: &str) -> Result<SubstitutionTemplate, PatternError> {
        let source = preprocess(template);
        let invalid = |reason: String| PatternError::InvalidTemplate {
            template: template.to_owned(),
            reason,
        };

        let mut replacement = String::with_capacity(source.len());
        let mut groups = vec![];
        let mut chars = source.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '$' => replacement.push_str("$$"),
                '\\' => match chars.next() {
                    None => return Err(invalid("bad escape (end of template)".to_owned())),
                    Some(digit @ '1'..='9') => {
                        let mut number = String::from(digit);
                        if let Some(second) = chars.next_if(char::is_ascii_digit) {
                            number.push(second);
                        }
                        push_group(&mut replacement, &number);
                        groups.push(GroupRef::Index(number.parse().unwrap_or(usize::MAX)));
                    }
                    Some('g') => {
                        let name = read_group_name(&mut chars).map_err(invalid)?;
                        push_group(&mut replacement, &name);
                        groups.push(match name.parse() {
                            Ok(index) => GroupRef::Index(index),
                            Err(_) => GroupRef::Name(name),
                        });
                    }
                    Some('0') => {
                        let mut value = 0;
                        for _ in 0..2 {
                            match chars.next_if(|c| ('0'..='7').contains(c)) {
                                Some(digit) => value = value * 8 + (digit as u32 - '0' as u32),
                                None => break,
                            }
                        }
                        replacement.extend(char::from_u32(value));
                    }
                    Some('\\') => replacement.push('\\'),
                    Some('n') => replacement.push('\n'),
                    Some('t') => replacement.push('\t'),
                    Some('r') => replacement.push('\r'),
                    Some('f') => replacement.push('\x0c'),
                    Some('v') => replacement.push('\x0b'),
                    Some('a') => replacement.push('\x07'),
                    Some('b') => replacement.push('\x08'),
                    Some(letter) if letter.is_ascii_alphabetic() => {
                        return Err(invalid(format!("bad escape \\{letter}")));
                    }
                    // Kept as is, so that the derived pattern sees the escape.
                    Some(other) => {
                        replacement.push('\\');
                        if other == '$' {
                            replacement.push_str("$$");
                        } else {
                            replacement.push(other);
                        }
                    }
                },
                other => replacement.push(other),
            }
        }

        Ok(SubstitutionTemplate {
            source,
            replacement,
            groups,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn push_group(replacement: &mut String, group: &str) {
    replacement.push_str("${");
    replacement.push_str(group);
    replacement.push('}');
}

/// Reads the `<name>` following `\g`.
fn read_group_name(chars: &mut Peekable<Chars<'_>>) -> Result<String, String> {
    if chars.next() != Some('<') {
        return Err("missing < after \\g".to_owned());
    }

    let mut name = String::new();
    loop {
        match chars.next() {
            Some('>') => break,
            Some(c) if c.is_alphanumeric() || c == '_' => name.push(c),
            Some(c) => return Err(format!("bad character '{c}' in group name")),
            None => return Err("missing >, unterminated name".to_owned()),
        }
    }

    if name.is_empty() {
        return Err("missing group name".to_owned());
    }
    let is_number = name.chars().all(|c| c.is_ascii_digit());
    let starts_with_digit = name.starts_with(|c: char| c.is_ascii_digit());
    if starts_with_digit && !is_number {
        return Err(format!("bad character in group name '{name}'"));
    }
    Ok(name)
}

/// The exams whose whole name matches `pattern`, in registry order.
pub fn match_names(pattern: &NamePattern, registry: &Registry) -> Vec<ExamId> {
    registry
        .exams()
        .filter(|(_, exam)| pattern.matches(&exam.name))
        .map(|(id, _)| id)
        .collect()
}

/// Expands a pair rule: every exam matching `pattern` is paired with every other exam matching
/// the pattern derived from its name by `template`.
///
/// The pairs are ordered by the first exam and then by the second; self-pairs are left out.
pub fn match_pairs(
    pattern: &NamePattern,
    template: &SubstitutionTemplate,
    registry: &Registry,
) -> Result<Vec<(ExamId, ExamId)>, PatternError> {
    pattern.check_template(template)?;

    let mut related_by_derived: FnvHashMap<String, Vec<ExamId>> = FnvHashMap::default();
    let mut pairs = vec![];
    for first in match_names(pattern, registry) {
        let name = &registry.exam(first).name;
        let derived = pattern.derive_related(template, name);

        if !related_by_derived.contains_key(&derived) {
            let related = NamePattern::from_regex(derived.clone()).map_err(|reason| {
                PatternError::InvalidDerivedPattern {
                    name: name.clone(),
                    derived: derived.clone(),
                    reason,
                }
            })?;
            let _ = related_by_derived.insert(derived.clone(), match_names(&related, registry));
        }

        pairs.extend(
            related_by_derived[&derived]
                .iter()
                .filter(|&&second| second != first)
                .map(|&second| (first, second)),
        );
    }
    Ok(pairs)
}
