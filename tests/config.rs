use rlabz_site::config::SiteConfig;

#[test]
fn empty_query_gives_defaults() {
    assert_eq!(SiteConfig::from_query(""), SiteConfig::default());
    assert_eq!(SiteConfig::from_query("?"), SiteConfig::default());
    let defaults = SiteConfig::default();
    assert!(defaults.mascot && defaults.particles && !defaults.diagnostics);
    assert_eq!(defaults.particle_count, 400);
}

#[test]
fn flags_and_values() {
    let config = SiteConfig::from_query("?diag&nomascot=1&particles=50&log=debug");
    assert!(config.diagnostics);
    assert!(!config.mascot);
    assert!(config.particles);
    assert_eq!(config.particle_count, 50);
    assert_eq!(config.log_level, log::Level::Debug);
}

#[test]
fn explicit_false_flags() {
    let config = SiteConfig::from_query("diag=0&noparticles=off");
    assert!(!config.diagnostics);
    assert!(config.particles);
}

#[test]
fn particle_count_is_capped() {
    assert_eq!(SiteConfig::from_query("particles=99999").particle_count, 2000);
    assert_eq!(SiteConfig::from_query("particles=0").particle_count, 0);
}

#[test]
fn malformed_values_are_ignored() {
    let config = SiteConfig::from_query("particles=lots&log=chatty&utm_source=x");
    assert_eq!(config, SiteConfig::default());
}
