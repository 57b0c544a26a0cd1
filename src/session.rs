//! Logging in, and deciding which year's data a logged-in user may see.
//!
//! There is no global session: [`login`] returns a [`Session`], and every page asks that session
//! for a [`RequestContext`] naming the one year it will operate on.

use crate::error::{Error, Result};
use crate::models::Year;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// A year coordinator, limited to their own cohort.
    Year,
    /// A teacher using the dashboard, limited to the cohort they teach.
    Teacher,
    /// Head of department, may view every cohort.
    Hod,
}

/// The cohorts a user may view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum YearScope {
    Single(Year),
    All,
}

impl fmt::Display for YearScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearScope::Single(year) => write!(f, "{year}"),
            YearScope::All => f.write_str("ALL"),
        }
    }
}

impl TryFrom<String> for YearScope {
    type Error = Error;

    fn try_from(raw: String) -> Result<Self> {
        if raw.trim().eq_ignore_ascii_case("all") {
            Ok(YearScope::All)
        } else {
            raw.parse().map(YearScope::Single)
        }
    }
}

impl From<YearScope> for String {
    fn from(scope: YearScope) -> Self {
        scope.to_string()
    }
}

/// One entry of the credential table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub password: String,
    pub role: Role,
    pub year: YearScope,
}

impl UserEntry {
    fn new(password: &str, role: Role, year: YearScope) -> Self {
        Self {
            password: password.to_string(),
            role,
            year,
        }
    }
}

/// The credentials the dashboard ships with, used when the configuration names no users.
pub fn default_users() -> BTreeMap<String, UserEntry> {
    use YearScope::{All, Single};

    BTreeMap::from([
        ("se".to_string(), UserEntry::new("se123", Role::Year, Single(Year::Se))),
        ("te".to_string(), UserEntry::new("te123", Role::Year, Single(Year::Te))),
        ("be".to_string(), UserEntry::new("be123", Role::Year, Single(Year::Be))),
        ("hod".to_string(), UserEntry::new("hod123", Role::Hod, All)),
        ("tech".to_string(), UserEntry::new("tech123", Role::Teacher, Single(Year::Be))),
    ])
}

/// A logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: String,
    pub role: Role,
    pub scope: YearScope,
}

/// Checks `user` and `password` against the credential table.
pub fn login(users: &BTreeMap<String, UserEntry>, user: &str, password: &str) -> Result<Session> {
    match users.get(user) {
        Some(entry) if entry.password == password => {
            info!(user, role = ?entry.role, scope = %entry.year, "logged in");
            Ok(Session {
                user: user.to_string(),
                role: entry.role,
                scope: entry.year,
            })
        }
        _ => {
            warn!(user, "rejected login");
            Err(Error::InvalidCredentials)
        }
    }
}

impl Session {
    /// Resolves the year a single request will operate on.
    ///
    /// Users scoped to one year get that year (asking for another is refused). Users who may see
    /// every year must say which one they want.
    pub fn context(&self, requested: Option<Year>) -> Result<RequestContext> {
        let year = match (self.scope, requested) {
            (YearScope::Single(own), None) => own,
            (YearScope::Single(own), Some(year)) if own == year => own,
            (YearScope::Single(_), Some(year)) => {
                return Err(Error::Forbidden {
                    user: self.user.clone(),
                    allowed: self.scope.to_string(),
                    requested: year,
                });
            }
            (YearScope::All, Some(year)) => year,
            (YearScope::All, None) => return Err(Error::YearRequired),
        };

        Ok(RequestContext {
            user: self.user.clone(),
            role: self.role,
            year,
        })
    }
}

/// Everything a single page needs to know about who is asking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub user: String,
    pub role: Role,
    pub year: Year,
}
