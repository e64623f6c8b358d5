//! Id subsets a single run can be limited to.

use std::collections::BTreeSet;

/// Which gates, or which evidence sources, a run covers.
///
/// Ids are kept sorted so two selections naming the same ids compare and
/// hash equal regardless of the order they were given in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Selection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl Selection {
    pub fn only<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(ids.into_iter().map(Into::into).collect())
    }

    /// `None` and an empty list both mean everything.
    pub fn from_ids(ids: Option<Vec<String>>) -> Self {
        match ids {
            Some(ids) if !ids.is_empty() => Self::only(ids),
            _ => Self::All,
        }
    }

    pub fn includes(&self, id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(id),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Named ids, empty for `All`.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        let ids = match self {
            Self::All => None,
            Self::Only(ids) => Some(ids),
        };
        ids.into_iter().flatten().map(String::as_str)
    }
}
