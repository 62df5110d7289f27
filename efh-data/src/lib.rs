//! Chart data transformation for forecast hub data.
//!
//! This crate turns the raw dataset plus the user's filter and display
//! settings into a [`view::ChartDataView`], and projects that view into
//! renderable chart series for either display mode.

pub mod choropleth;
pub mod projection;
pub mod view;
pub mod visibility;

/// Sticky model colour assignment.
pub mod colors {
    use std::collections::HashMap;

    /// Colours handed out to models, in order of first encounter.
    pub const PALETTE: [&str; 8] = [
        "rgb(101,179,46)",
        "rgb(124,189,196)",
        "rgb(192,210,54)",
        "rgb(62,91,132)",
        "rgb(0,140,117)",
        "rgb(130,66,141)",
        "rgb(232,104,63)",
        "rgb(184,26,93)",
    ];

    /// Append-only `model -> colour` table.
    ///
    /// A model keeps its colour for the lifetime of the table, even while it
    /// is absent from the current view.
    #[derive(Debug, Clone, Default)]
    pub struct ColorAssignment {
        assigned: HashMap<String, &'static str>,
        counter: usize,
    }

    impl ColorAssignment {
        pub fn new() -> Self {
            Self::default()
        }

        /// Colour of `model`, assigning the next palette entry on first use.
        pub fn pick(&mut self, model: &str) -> &'static str {
            if let Some(color) = self.assigned.get(model) {
                return color;
            }
            let color = PALETTE[self.counter % PALETTE.len()];
            self.counter += 1;
            self.assigned.insert(model.to_string(), color);
            log::debug!("[EFH] colors: {} -> {}", model, color);
            color
        }

        pub fn get(&self, model: &str) -> Option<&'static str> {
            self.assigned.get(model).copied()
        }

        pub fn len(&self) -> usize {
            self.assigned.len()
        }

        pub fn is_empty(&self) -> bool {
            self.assigned.is_empty()
        }
    }

}
