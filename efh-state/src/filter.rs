use efh_core::filter::DataFilter;
use efh_core::location::LocationLookup;
use efh_core::target::Target;

/// Holds the current [`DataFilter`]. Every change replaces the filter value.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    current: DataFilter,
}

impl FilterState {
    pub fn new(filter: DataFilter) -> Self {
        FilterState { current: filter }
    }

    pub fn current(&self) -> &DataFilter {
        &self.current
    }

    /// Returns false if the location was already selected.
    pub fn change_location(&mut self, location: &str) -> bool {
        if self.current.location.as_deref() == Some(location) {
            return false;
        }
        self.current = self.current.with_location(location);
        true
    }

    pub fn change_target(&mut self, target: Target) -> bool {
        if self.current.target == target {
            return false;
        }
        self.current = self.current.with_target(target);
        true
    }

    /// Select `preferred`, or the first location by name, unless a location
    /// is already selected.
    pub fn resolve_default_location(&mut self, preferred: Option<&str>, lookup: &LocationLookup) -> bool {
        if self.current.location.is_some() {
            return false;
        }
        let location = preferred
            .map(str::to_string)
            .or_else(|| lookup.first().map(|item| item.id.clone()));
        match location {
            Some(location) => {
                log::info!("[EFH] filter: default location {}", location);
                self.current = self.current.with_location(location);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use efh_core::location::LocationLookupItem;

    fn lookup() -> LocationLookup {
        LocationLookup::new(vec![
            LocationLookupItem {
                id: "DE".to_string(),
                name: "Germany".to_string(),
                population: 83_166_711,
            },
            LocationLookupItem {
                id: "AT".to_string(),
                name: "Austria".to_string(),
                population: 8_901_064,
            },
        ])
    }

    #[test]
    fn test_default_location() {
        let mut state = FilterState::default();
        assert!(state.resolve_default_location(None, &lookup()));
        assert_eq!(state.current().location.as_deref(), Some("AT"));
        // an existing selection wins
        assert!(!state.resolve_default_location(Some("DE"), &lookup()));

        let mut preferred = FilterState::default();
        preferred.resolve_default_location(Some("DE"), &lookup());
        assert_eq!(preferred.current().location.as_deref(), Some("DE"));
    }

    #[test]
    fn test_changes_report_whether_filter_changed() {
        let mut state = FilterState::default();
        assert!(state.change_location("DE"));
        assert!(!state.change_location("DE"));
        assert!(state.change_target(Target::Death));
        assert!(!state.change_target(Target::Death));
        assert_eq!(state.current().series_prefix(), "death-DE");
    }
}
