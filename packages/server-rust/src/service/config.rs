/// Settings for the storefront services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Products shown in each storefront home section.
    pub home_section_size: u32,
    /// How far back a game's release date may be to count as a new release.
    pub release_window_days: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            home_section_size: 4,
            release_window_days: 7,
        }
    }
}
