//! Visible-model set management for the legend and the chart.

use std::collections::BTreeSet;

/// Which models are drawn.
///
/// The visible set is the user's explicit choice if there is one, else the
/// configured default models, else every model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelVisibility {
    user: Option<BTreeSet<String>>,
    defaults: Option<BTreeSet<String>>,
}

impl ModelVisibility {
    /// Every model visible.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default models visible until the user changes the selection. An empty
    /// default list means every model is visible.
    pub fn with_defaults<I, S>(default_models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let defaults: BTreeSet<String> = default_models.into_iter().map(Into::into).collect();
        ModelVisibility {
            user: None,
            defaults: (!defaults.is_empty()).then_some(defaults),
        }
    }

    /// Replace the configured defaults. A user choice still takes precedence.
    pub fn set_defaults<I, S>(&mut self, default_models: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.defaults = Self::with_defaults(default_models).defaults;
    }

    /// Whether the user has chosen a visible set.
    pub fn has_user_choice(&self) -> bool {
        self.user.is_some()
    }

    /// The explicit subset currently in force, `None` meaning all visible.
    pub fn explicit(&self) -> Option<&BTreeSet<String>> {
        self.user.as_ref().or(self.defaults.as_ref())
    }

    pub fn is_visible(&self, model: &str) -> bool {
        match self.explicit() {
            Some(set) => set.contains(model),
            None => true,
        }
    }

    /// Flip one model. Without an explicit subset the subset starts as every
    /// model except the clicked one.
    pub fn toggle<'a>(&mut self, model: &str, all_models: impl IntoIterator<Item = &'a str>) {
        let mut subset = match self.explicit() {
            Some(set) => set.clone(),
            None => all_models.into_iter().map(str::to_string).collect(),
        };
        if !subset.remove(model) {
            subset.insert(model.to_string());
        }
        self.user = Some(subset);
    }

    /// Replace the visible set.
    pub fn change<I, S>(&mut self, models: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user = Some(models.into_iter().map(Into::into).collect());
    }

    pub fn show_all<'a>(&mut self, all_models: impl IntoIterator<Item = &'a str>) {
        self.change(all_models);
    }

    pub fn hide_all(&mut self) {
        self.user = Some(BTreeSet::new());
    }

    /// Show only the hub ensemble models.
    pub fn ensemble_only(&mut self, ensemble_models: &[String]) {
        self.change(ensemble_models.iter().cloned());
    }
}
