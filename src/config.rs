//! Runtime switches read from the page URL query string.

use crate::particles;

const MAX_PARTICLES: usize = 2000;

#[derive(Clone, Debug, PartialEq)]
pub struct SiteConfig {
    pub diagnostics: bool,
    pub mascot: bool,
    pub particles: bool,
    pub particle_count: usize,
    pub log_level: log::Level,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            diagnostics: false,
            mascot: true,
            particles: true,
            particle_count: particles::DEFAULT_COUNT,
            log_level: log::Level::Info,
        }
    }
}

impl SiteConfig {
    /// Parses `location.search` (with or without the leading `?`).
    /// Unknown keys and malformed values are ignored.
    pub fn from_query(search: &str) -> Self {
        let mut config = Self::default();
        let search = search.strip_prefix('?').unwrap_or(search);
        for pair in search.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "diag" => config.diagnostics = flag(value),
                "nomascot" => config.mascot = !flag(value),
                "noparticles" => config.particles = !flag(value),
                "particles" => {
                    if let Ok(n) = value.parse::<usize>() {
                        config.particle_count = n.min(MAX_PARTICLES);
                    }
                }
                "log" => {
                    if let Ok(level) = value.parse::<log::Level>() {
                        config.log_level = level;
                    }
                }
                _ => {}
            }
        }
        config
    }
}

fn flag(value: &str) -> bool {
    matches!(value, "" | "1" | "true" | "yes" | "on")
}
