//! npm range matching
//!
//! A range is a set of alternatives joined by `||`. Each alternative is a
//! list of comparators that must all hold. Caret, tilde, x-ranges, partial
//! versions and hyphen ranges are desugared into plain comparators when
//! parsed:
//! - `^1.2.3` -> `>=1.2.3 <2.0.0`
//! - `~1.2.3` -> `>=1.2.3 <1.3.0`
//! - `1.2.x`, `1.2` -> `>=1.2.0 <1.3.0`
//! - `1.0.0 - 2.0.0` -> `>=1.0.0 <=2.0.0`
//!
//! A prerelease version only satisfies an alternative that names a
//! prerelease of the same `major.minor.patch`.

use semver::Version;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Comparator {
    op: Op,
    version: Version,
}

impl Comparator {
    fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    /// Matches nothing (`<0.0.0`)
    fn none() -> Self {
        Self::new(Op::Lt, Version::new(0, 0, 0))
    }

    fn matches(&self, version: &Version) -> bool {
        match self.op {
            Op::Eq => *version == self.version,
            Op::Gt => *version > self.version,
            Op::Gte => *version >= self.version,
            Op::Lt => *version < self.version,
            Op::Lte => *version <= self.version,
        }
    }

    fn names_prerelease_of(&self, version: &Version) -> bool {
        !self.version.pre.is_empty()
            && (self.version.major, self.version.minor, self.version.patch)
                == (version.major, version.minor, version.patch)
    }
}

/// Version with optional trailing wildcards
#[derive(Debug, Clone, PartialEq, Eq)]
enum Partial {
    Any,
    Major(u64),
    Minor(u64, u64),
    Full(Version),
}

impl Partial {
    fn parse(text: &str) -> Option<Self> {
        let text = text.strip_prefix('v').unwrap_or(text);
        if let Ok(version) = Version::parse(text) {
            return Some(Partial::Full(version));
        }

        let pieces = text
            .split('.')
            .map(|piece| match piece {
                "*" | "x" | "X" => Some(None),
                number => number.parse::<u64>().ok().map(Some),
            })
            .collect::<Option<Vec<_>>>()?;

        match pieces.as_slice() {
            [None, ..] => Some(Partial::Any),
            [Some(major)] | [Some(major), None, ..] => Some(Partial::Major(*major)),
            [Some(major), Some(minor)] | [Some(major), Some(minor), None] => {
                Some(Partial::Minor(*major, *minor))
            }
            [Some(major), Some(minor), Some(patch)] => {
                Some(Partial::Full(Version::new(*major, *minor, *patch)))
            }
            _ => None,
        }
    }

    /// Smallest version the partial covers
    fn floor(&self) -> Version {
        match self {
            Partial::Any => Version::new(0, 0, 0),
            Partial::Major(major) => Version::new(*major, 0, 0),
            Partial::Minor(major, minor) => Version::new(*major, *minor, 0),
            Partial::Full(version) => version.clone(),
        }
    }

    /// First version past a wildcard partial; None for full versions and `*`
    fn ceiling(&self) -> Option<Version> {
        match self {
            Partial::Major(major) => Some(Version::new(major + 1, 0, 0)),
            Partial::Minor(major, minor) => Some(Version::new(*major, minor + 1, 0)),
            Partial::Any | Partial::Full(_) => None,
        }
    }
}

/// Parsed npm version range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpmRange {
    alternatives: Vec<Vec<Comparator>>,
}

impl NpmRange {
    /// Parse range text as written in a manifest
    ///
    /// Returns None for dist-tags and anything else that is not a range.
    pub fn parse(text: &str) -> Option<Self> {
        let alternatives = text
            .split("||")
            .map(parse_alternative)
            .collect::<Option<Vec<_>>>()?;
        Some(Self { alternatives })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|comparators| {
            comparators.iter().all(|c| c.matches(version))
                && (version.pre.is_empty()
                    || comparators.iter().any(|c| c.names_prerelease_of(version)))
        })
    }
}

fn is_operator(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '~' | '^')
}

fn parse_alternative(text: &str) -> Option<Vec<Comparator>> {
    let text = text.trim();

    if let Some((from, to)) = text.split_once(" - ") {
        return hyphen(from.trim(), to.trim());
    }

    let mut comparators = Vec::new();
    let mut pending = None;
    for token in text.split_whitespace() {
        // ">= 1.2.3" is one comparator
        if token.chars().all(is_operator) {
            if pending.replace(token).is_some() {
                return None;
            }
            continue;
        }

        let (op, version) = match pending.take() {
            Some(op) => (op, token),
            None => token.split_at(token.find(|c| !is_operator(c)).unwrap_or(token.len())),
        };
        comparators.extend(desugar(op, version)?);
    }

    pending.is_none().then_some(comparators)
}

fn hyphen(from: &str, to: &str) -> Option<Vec<Comparator>> {
    let from = Partial::parse(from)?;
    let to = Partial::parse(to)?;

    let mut comparators = Vec::new();
    if from != Partial::Any {
        comparators.push(Comparator::new(Op::Gte, from.floor()));
    }
    match to {
        Partial::Any => {}
        Partial::Full(version) => comparators.push(Comparator::new(Op::Lte, version)),
        partial => comparators.extend(partial.ceiling().map(|v| Comparator::new(Op::Lt, v))),
    }
    Some(comparators)
}

fn desugar(op: &str, version: &str) -> Option<Vec<Comparator>> {
    let partial = Partial::parse(version)?;
    let floor = partial.floor();
    let ceiling = partial.ceiling();

    let comparators = match (op, &partial) {
        (">" | "<", Partial::Any) => vec![Comparator::none()],
        ("" | "=" | ">=" | "<=" | "~" | "~>" | "^", Partial::Any) => Vec::new(),
        ("" | "=", Partial::Full(version)) => vec![Comparator::new(Op::Eq, version.clone())],
        ("" | "=", _) => bounded(floor, ceiling),
        (">=", _) => vec![Comparator::new(Op::Gte, floor)],
        (">", Partial::Full(version)) => vec![Comparator::new(Op::Gt, version.clone())],
        (">", _) => ceiling
            .map(|v| Comparator::new(Op::Gte, v))
            .into_iter()
            .collect(),
        ("<", _) => vec![Comparator::new(Op::Lt, floor)],
        ("<=", Partial::Full(version)) => vec![Comparator::new(Op::Lte, version.clone())],
        ("<=", _) => ceiling
            .map(|v| Comparator::new(Op::Lt, v))
            .into_iter()
            .collect(),
        ("~" | "~>", Partial::Full(version)) => {
            let next = Version::new(version.major, version.minor + 1, 0);
            bounded(floor, Some(next))
        }
        ("~" | "~>", _) => bounded(floor, ceiling),
        ("^", Partial::Full(version)) => {
            let next = match (version.major, version.minor) {
                (0, 0) => Version::new(0, 0, version.patch + 1),
                (0, minor) => Version::new(0, minor + 1, 0),
                (major, _) => Version::new(major + 1, 0, 0),
            };
            bounded(floor, Some(next))
        }
        ("^", Partial::Minor(0, minor)) => bounded(floor, Some(Version::new(0, minor + 1, 0))),
        ("^", _) => {
            let next = Version::new(floor.major + 1, 0, 0);
            bounded(floor, Some(next))
        }
        _ => return None,
    };
    Some(comparators)
}

fn bounded(floor: Version, ceiling: Option<Version>) -> Vec<Comparator> {
    std::iter::once(Comparator::new(Op::Gte, floor))
        .chain(ceiling.map(|v| Comparator::new(Op::Lt, v)))
        .collect()
}
