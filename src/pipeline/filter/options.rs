use serde::{Deserialize, Serialize};

/// One user-selectable filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FilterOption {
    RemoveRepetitions,
    RemoveUntranslatables,
    RemoveMeasurements,
    RemoveHyperlinks,
}

impl FilterOption {
    pub const ALL: [FilterOption; 4] = [
        Self::RemoveRepetitions,
        Self::RemoveUntranslatables,
        Self::RemoveMeasurements,
        Self::RemoveHyperlinks,
    ];

    /// Name shown to users when selecting options.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::RemoveRepetitions => "Remove repetitions",
            Self::RemoveUntranslatables => "Remove untranslatables",
            Self::RemoveMeasurements => "Remove measurements",
            Self::RemoveHyperlinks => "Remove hyperlinks",
        }
    }

    /// One-line explanation, used as command-line help.
    pub fn description(&self) -> &'static str {
        match self {
            Self::RemoveRepetitions => {
                "Can greatly speed up the process by removing repetitions from extracted text. \
                 Recommended unless repetitions are truly needed."
            }
            Self::RemoveUntranslatables => {
                "Can speed up the process by removing untranslatables from extracted text."
            }
            Self::RemoveMeasurements => {
                "Can speed up the process by removing SI units and measurements from extracted text."
            }
            Self::RemoveHyperlinks => {
                "Can speed up the process by removing hyperlinks from extracted text."
            }
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|option| option.display_name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Which optional filter stages run. Trimming and empty removal always run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterOptions {
    pub remove_repetitions: bool,
    pub remove_untranslatables: bool,
    pub remove_measurements: bool,
    pub remove_hyperlinks: bool,
}

impl FilterOptions {
    pub fn all() -> Self {
        Self::from_selected(FilterOption::ALL)
    }

    pub fn from_selected(selected: impl IntoIterator<Item = FilterOption>) -> Self {
        let mut options = Self::default();
        for option in selected {
            options.set(option, true);
        }
        options
    }

    pub fn set(&mut self, option: FilterOption, enabled: bool) {
        match option {
            FilterOption::RemoveRepetitions => self.remove_repetitions = enabled,
            FilterOption::RemoveUntranslatables => self.remove_untranslatables = enabled,
            FilterOption::RemoveMeasurements => self.remove_measurements = enabled,
            FilterOption::RemoveHyperlinks => self.remove_hyperlinks = enabled,
        }
    }

    pub fn is_enabled(&self, option: FilterOption) -> bool {
        match option {
            FilterOption::RemoveRepetitions => self.remove_repetitions,
            FilterOption::RemoveUntranslatables => self.remove_untranslatables,
            FilterOption::RemoveMeasurements => self.remove_measurements,
            FilterOption::RemoveHyperlinks => self.remove_hyperlinks,
        }
    }

    pub fn enabled(&self) -> Vec<FilterOption> {
        FilterOption::ALL
            .into_iter()
            .filter(|option| self.is_enabled(*option))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_option_has_a_name_and_description() {
        for option in FilterOption::ALL {
            assert!(option.display_name().starts_with("Remove "));
            assert!(option.description().contains("removing"));
        }
    }

    #[test]
    fn display_names_round_trip() {
        for option in FilterOption::ALL {
            assert_eq!(FilterOption::from_display_name(option.display_name()), Some(option));
        }
        assert_eq!(
            FilterOption::from_display_name(" remove HYPERLINKS "),
            Some(FilterOption::RemoveHyperlinks)
        );
        assert_eq!(FilterOption::from_display_name("Remove everything"), None);
    }

    #[test]
    fn is_enabled_follows_set() {
        let mut options = FilterOptions::default();
        options.set(FilterOption::RemoveHyperlinks, true);
        assert!(options.is_enabled(FilterOption::RemoveHyperlinks));
        assert_eq!(options.enabled(), vec![FilterOption::RemoveHyperlinks]);
        options.set(FilterOption::RemoveHyperlinks, false);
        assert!(!options.is_enabled(FilterOption::RemoveHyperlinks));
    }

    #[test]
    fn default_enables_nothing() {
        assert!(FilterOptions::default().enabled().is_empty());
    }

    #[test]
    fn all_enables_everything() {
        let options = FilterOptions::all();
        assert_eq!(options.enabled(), FilterOption::ALL.to_vec());
    }

    #[test]
    fn from_selected_sets_only_chosen() {
        let options = FilterOptions::from_selected([FilterOption::RemoveMeasurements]);
        assert!(options.remove_measurements);
        assert!(!options.remove_repetitions);
        assert!(!options.remove_hyperlinks);
        assert!(!options.remove_untranslatables);
    }

    #[test]
    fn serializes_with_field_names() {
        let json = serde_json::to_value(FilterOptions::all()).unwrap();
        assert_eq!(json["remove_repetitions"], true);
        assert_eq!(json["remove_hyperlinks"], true);
    }
}
