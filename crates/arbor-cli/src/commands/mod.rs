//! Subcommand implementations.

pub(crate) mod check;
pub(crate) mod claims;
pub(crate) mod resolve;
pub(crate) mod validate;

use arbor_core::ResolutionContext;
use chrono::{NaiveDate, Utc};

use crate::Subject;

impl Subject {
    pub(crate) fn context(&self) -> ResolutionContext {
        ResolutionContext::new(self.principal, self.org)
    }

    pub(crate) fn as_of(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }
}
