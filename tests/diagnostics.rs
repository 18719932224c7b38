use rlabz_site::diagnostics::{MascotStart, startup_status};

#[test]
fn only_a_failed_mascot_degrades_the_page() {
    for start in [MascotStart::Running, MascotStart::Disabled, MascotStart::NoContainer] {
        assert_eq!(startup_status(start), ("ready", "Running"), "{start:?}");
    }
    let (status, message) = startup_status(MascotStart::Failed);
    assert_eq!(status, "degraded");
    assert!(message.contains("Mascot"));
}
