use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::ConfigSubtype;

/// Classification of an action as published to the integration registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Verifies credentials or exchanges tokens with the remote system.
    Authentication,
    /// Pulls data from the remote system; scheduled periodically.
    PullData,
    /// Pushes data to the remote system.
    PushData,
    /// Anything else.
    Generic,
}

impl ActionType {
    /// Wire name used by the registry (`"pull_data"`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::PullData => "pull_data",
            Self::PushData => "push_data",
            Self::Generic => "generic",
        }
    }

    /// Whether actions of this type run on a schedule.
    pub const fn is_periodic(self) -> bool {
        matches!(self, Self::PullData)
    }
}

impl From<ConfigSubtype> for ActionType {
    fn from(subtype: ConfigSubtype) -> Self {
        match subtype {
            ConfigSubtype::Auth => Self::Authentication,
            ConfigSubtype::Pull => Self::PullData,
            ConfigSubtype::Push => Self::PushData,
            ConfigSubtype::Generic => Self::Generic,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turn a snake_case key into a display name: `"pull_observations"` becomes
/// `"Pull Observations"`.
///
/// Every run of letters starts upper-case and continues lower-case; digits
/// and other characters pass through and start a new word.
pub fn humanize(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut in_word = false;
    for ch in key.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ConfigSubtype::Auth, ActionType::Authentication, "authentication")]
    #[case(ConfigSubtype::Pull, ActionType::PullData, "pull_data")]
    #[case(ConfigSubtype::Push, ActionType::PushData, "push_data")]
    #[case(ConfigSubtype::Generic, ActionType::Generic, "generic")]
    fn subtype_maps_to_wire_name(
        #[case] subtype: ConfigSubtype,
        #[case] expected: ActionType,
        #[case] wire: &str,
    ) {
        let action_type = ActionType::from(subtype);
        assert_eq!(action_type, expected);
        assert_eq!(action_type.as_str(), wire);
        assert_eq!(serde_json::to_value(action_type).unwrap(), serde_json::json!(wire));
    }

    #[test]
    fn only_pull_is_periodic() {
        assert!(ActionType::PullData.is_periodic());
        assert!(!ActionType::Authentication.is_periodic());
        assert!(!ActionType::PushData.is_periodic());
        assert!(!ActionType::Generic.is_periodic());
    }

    #[rstest]
    #[case("pull_observations", "Pull Observations")]
    #[case("auth", "Auth")]
    #[case("MY_SLUG", "My Slug")]
    #[case("v2_api", "V2 Api")]
    #[case("3d_scan", "3D Scan")]
    #[case("", "")]
    fn humanize_title_cases_words(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(humanize(key), expected);
    }
}
