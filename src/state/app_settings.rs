use log::LevelFilter;

#[derive(Debug, Default, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `POOL_LOG` picks the level shown in the log pane ("debug", "info", ...).
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let log_level = lookup("POOL_LOG").and_then(|raw| raw.trim().parse::<LevelFilter>().ok());
        Self { full_screen: false, log_level }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_comes_from_env() {
        let settings = AppSettings::from_lookup(|key| (key == "POOL_LOG").then(|| "debug".to_string()));
        assert_eq!(settings.log_level, Some(LevelFilter::Debug));
    }

    #[test]
    fn bad_log_level_is_ignored() {
        let settings = AppSettings::from_lookup(|_| Some("loud".to_string()));
        assert_eq!(settings.log_level, None);
        assert!(!settings.full_screen);
    }
}
