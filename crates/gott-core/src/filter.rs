//! Temporal filter mini-language.
//!
//! A filter is a conjunction of predicates over intervals. Command-line
//! arguments resolve to at most one predicate: a keyword (`:today`,
//! `:yesterday`, `:week`, `:month`, `:all`) or a literal `YYYY-MM-DD` date.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::calendar::{self, start_of_day};
use crate::interval::Interval;

/// A boolean test over an interval.
pub type Predicate = Box<dyn Fn(&Interval) -> bool>;

/// Filter argument errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Too many arguments, or one that is neither a keyword nor a date.
    #[error(
        "invalid filter {0}: choose one of :today, :yesterday, :week, :month or :all, or provide a date as YYYY-MM-DD"
    )]
    InvalidArgument(String),
}

/// Canned filter keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKeyword {
    Today,
    Yesterday,
    Week,
    Month,
    All,
}

impl FilterKeyword {
    /// All keywords, in the order they are documented.
    pub const ALL: [Self; 5] = [
        Self::Today,
        Self::Yesterday,
        Self::Week,
        Self::Month,
        Self::All,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Today => ":today",
            Self::Yesterday => ":yesterday",
            Self::Week => ":week",
            Self::Month => ":month",
            Self::All => ":all",
        }
    }

    /// The predicate this keyword stands for, relative to `today`.
    /// `:all` has none.
    pub fn predicate(self, today: NaiveDate) -> Option<Predicate> {
        match self {
            Self::Today => Some(date(today)),
            Self::Yesterday => Some(date(today - Duration::days(1))),
            Self::Week => {
                let (monday, sunday) = calendar::week_bounds(today);
                Some(date_range(monday, sunday))
            }
            Self::Month => {
                let (first, last) = calendar::month_bounds(today);
                Some(date_range(first, last))
            }
            Self::All => None,
        }
    }
}

impl fmt::Display for FilterKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKeyword {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|keyword| keyword.as_str() == s)
            .ok_or_else(|| FilterError::InvalidArgument(format!("{s:?}")))
    }
}

/// Matches intervals on the given project.
pub fn project(project: impl Into<String>) -> Predicate {
    let project = project.into();
    Box::new(move |i| i.project.as_deref() == Some(project.as_str()))
}

/// Matches intervals carrying the given tag.
pub fn tag(tag: impl Into<String>) -> Predicate {
    let tag = tag.into();
    Box::new(move |i| i.tags.contains(&tag))
}

/// Matches intervals beginning on the local calendar day `day`.
pub fn date(day: NaiveDate) -> Predicate {
    Box::new(move |i| i.begin.is_some_and(|b| b.date_naive() == day))
}

/// Matches intervals beginning strictly after 00:00 of `from` and strictly
/// before 00:00 of the day after `to`.
///
/// The whole `to` day is included; an interval beginning exactly at
/// midnight of `from` is not.
pub fn date_range(from: NaiveDate, to: NaiveDate) -> Predicate {
    let lower = start_of_day(from);
    let upper = start_of_day(to + Duration::days(1));
    Box::new(move |i| i.begin.is_some_and(|b| b > lower && b < upper))
}

/// A conjunction of predicates. An empty filter matches everything.
#[derive(Default)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("predicates", &self.predicates.len())
            .finish()
    }
}

impl Filter {
    /// A filter that matches every interval.
    pub fn all() -> Self {
        Self::default()
    }

    /// Adds a predicate that must also hold.
    #[must_use]
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Resolves command-line filter arguments relative to `today`.
    ///
    /// Accepts zero arguments (match everything) or exactly one keyword or
    /// `YYYY-MM-DD` date.
    pub fn from_args<S: AsRef<str>>(args: &[S], today: NaiveDate) -> Result<Self, FilterError> {
        let arg = match args {
            [] => return Ok(Self::all()),
            [arg] => arg.as_ref(),
            _ => {
                let joined: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
                return Err(FilterError::InvalidArgument(format!("{joined:?}")));
            }
        };

        let predicate = match arg.parse::<FilterKeyword>() {
            Ok(keyword) => keyword.predicate(today),
            Err(err) => {
                let day = calendar::parse_date(arg).map_err(|_| err)?;
                Some(date(day))
            }
        };

        Ok(predicate.map_or_else(Self::all, |p| Self::all().and(p)))
    }

    /// Whether every predicate holds for `interval`.
    pub fn matches(&self, interval: &Interval) -> bool {
        self.predicates.iter().all(|p| p(interval))
    }

    /// Number of active predicates.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}
