use serde::{Deserialize, Serialize};

/// Process-wide presentation settings, persisted with the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_toggles_between_variants() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn settings_serde_uses_lowercase_theme() {
        let json = serde_json::to_string(&Settings { theme: Theme::Dark }).unwrap();
        assert_eq!(json, "{\"theme\":\"dark\"}");
        let back: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(back.theme, Theme::Light);
    }
}
