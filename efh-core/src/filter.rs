use crate::target::Target;
use serde::{Deserialize, Serialize};

/// The user's location and target selection.
///
/// Changes produce a new value; a filter is never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataFilter {
    /// `None` until a default location has been resolved.
    pub location: Option<String>,
    pub target: Target,
}

impl Default for DataFilter {
    fn default() -> Self {
        DataFilter {
            location: None,
            target: Target::Cases,
        }
    }
}

impl DataFilter {
    pub fn new(location: Option<String>, target: Target) -> Self {
        DataFilter { location, target }
    }

    pub fn with_location(&self, location: impl Into<String>) -> Self {
        DataFilter {
            location: Some(location.into()),
            target: self.target,
        }
    }

    pub fn with_target(&self, target: Target) -> Self {
        DataFilter {
            location: self.location.clone(),
            target,
        }
    }

    /// Prefix of every chart series id for this filter, e.g. `"cases-DE"`.
    pub fn series_prefix(&self) -> String {
        format!(
            "{}-{}",
            self.target.key(),
            self.location.as_deref().unwrap_or("")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_produce_new_filters() {
        let initial = DataFilter::default();
        let located = initial.with_location("DE");
        let deaths = located.with_target(Target::Death);
        assert_eq!(initial.location, None);
        assert_eq!(located.series_prefix(), "cases-DE");
        assert_eq!(deaths.series_prefix(), "death-DE");
        assert_eq!(located.target, Target::Cases);
    }
}
