use glam::Vec2;
use rlabz_site::particles::{Link, POINTER_LINK_DISTANCE, ParticleField};
use rlabz_site::viewport::Rect;

fn in_bounds(field: &ParticleField) -> bool {
    let (w, h) = field.size();
    field
        .particles()
        .iter()
        .all(|p| (0.0..=w).contains(&p.position.x) && (0.0..=h).contains(&p.position.y))
}

#[test]
fn same_seed_same_field() {
    let a = ParticleField::new(800.0, 600.0, 50, 7);
    let b = ParticleField::new(800.0, 600.0, 50, 7);
    assert_eq!(a.particles(), b.particles());
    assert_eq!(a.particles().len(), 50);
    assert!(in_bounds(&a));
}

#[test]
fn particles_wrap_at_the_edges() {
    let mut field = ParticleField::new(200.0, 100.0, 80, 11);
    field.set_pointer(Some(Vec2::new(100.0, 50.0)));
    for _ in 0..600 {
        field.step();
        assert!(in_bounds(&field));
    }
}

#[test]
fn pointer_excites_and_calm_returns() {
    let mut field = ParticleField::new(300.0, 300.0, 40, 3);
    field.set_pointer(Some(Vec2::new(150.0, 150.0)));
    for _ in 0..30 {
        field.step();
    }
    assert!(field.particles().iter().any(|p| p.excitement > 0.0));
    assert!(field.particles().iter().all(|p| p.excitement <= 1.0));

    field.set_pointer(None);
    for _ in 0..200 {
        field.step();
    }
    assert!(field.particles().iter().all(|p| p.excitement == 0.0));
}

#[test]
fn card_focus_caps_excitement() {
    let mut field = ParticleField::new(400.0, 400.0, 60, 5);
    field.set_focus(Some(Rect::new(150.0, 150.0, 100.0, 100.0)));
    for _ in 0..300 {
        field.step();
    }
    assert!(field.particles().iter().any(|p| p.excitement > 0.5));
    assert!(field.particles().iter().all(|p| p.excitement <= 0.9 + 1e-6));
}

#[test]
fn sparkles_live_only_while_a_card_is_focused() {
    let mut field = ParticleField::new(400.0, 400.0, 10, 9);
    field.set_focus(Some(Rect::new(100.0, 100.0, 200.0, 120.0)));
    for _ in 0..100 {
        field.step();
    }
    assert!(!field.sparkles().is_empty());
    assert!(
        field
            .sparkles()
            .iter()
            .all(|s| s.life > 0.0 && s.life <= 1.0 && !s.is_dead())
    );

    field.set_focus(None);
    for _ in 0..100 {
        field.step();
    }
    assert!(field.sparkles().is_empty());
}

#[test]
fn pointer_links_reach_nearby_particles() {
    let mut field = ParticleField::new(500.0, 500.0, 30, 2);
    let target = field.particles()[0].position;
    field.set_pointer(Some(target));

    let links = field.links();
    assert!(links.contains(&Link::Pointer { a: 0, alpha: 0.5 }));
    for link in &links {
        match *link {
            Link::Pointer { a, alpha } => {
                let d = field.particles()[a].position.distance(target);
                assert!(d < POINTER_LINK_DISTANCE);
                assert!(alpha > 0.0 && alpha <= 0.5);
            }
            Link::Pair { a, b, alpha } => {
                assert!(a < b);
                assert!(alpha > 0.0 && alpha <= 0.2);
            }
        }
    }
}

#[test]
fn non_finite_pointer_is_dropped() {
    let mut field = ParticleField::new(500.0, 500.0, 30, 2);
    field.set_pointer(Some(Vec2::new(f32::NAN, 10.0)));
    assert!(
        !field
            .links()
            .iter()
            .any(|l| matches!(l, Link::Pointer { .. }))
    );
}

#[test]
fn resize_rescatters_inside_new_bounds() {
    let mut field = ParticleField::new(1000.0, 1000.0, 100, 4);
    field.resize(120.0, 80.0);
    assert_eq!(field.size(), (120.0, 80.0));
    assert_eq!(field.particles().len(), 100);
    assert!(in_bounds(&field));

    field.resize(0.0, -3.0);
    assert_eq!(field.size(), (1.0, 1.0));
}
