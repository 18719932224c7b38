use rlabz_site::effects::{
    Counter, REVEAL_PERCENT, Tilt, in_view, show_ready, tilt, visible_fraction,
};

#[test]
fn reveal_line_sits_at_85_percent() {
    assert!(in_view(679.0, 800.0, REVEAL_PERCENT));
    assert!(!in_view(681.0, 800.0, REVEAL_PERCENT));
    assert!(in_view(-200.0, 800.0, REVEAL_PERCENT));
}

#[test]
fn visible_fraction_of_partly_scrolled_elements() {
    assert_eq!(visible_fraction(0.0, 100.0, 800.0), 1.0);
    assert_eq!(visible_fraction(750.0, 100.0, 800.0), 0.5);
    assert_eq!(visible_fraction(-50.0, 100.0, 800.0), 0.5);
    assert_eq!(visible_fraction(900.0, 100.0, 800.0), 0.0);
    assert_eq!(visible_fraction(10.0, 0.0, 800.0), 1.0);
    assert_eq!(visible_fraction(-10.0, 0.0, 800.0), 0.0);
}

#[test]
fn counter_lands_exactly_on_target() {
    let mut counter = Counter::new(1000);
    let mut shown = Vec::new();
    while !counter.is_done() {
        shown.push(counter.step());
        assert!(shown.len() <= 200, "counter never finished");
    }
    assert_eq!(shown.last(), Some(&1000));
    assert!(shown.windows(2).all(|w| w[0] <= w[1]));
    assert!((120..=126).contains(&shown.len()));
    assert_eq!(counter.step(), 1000);
}

#[test]
fn counter_shows_whole_numbers_below_target() {
    let mut counter = Counter::new(7);
    let first = counter.step();
    assert_eq!(first, 0);
    assert_eq!(counter.target(), 7);
}

#[test]
fn non_positive_counters_finish_at_once() {
    let mut zero = Counter::new(0);
    assert_eq!(zero.step(), 0);
    assert!(zero.is_done());

    let mut negative = Counter::new(-5);
    assert_eq!(negative.step(), -5);
    assert!(negative.is_done());
}

#[test]
fn tilt_is_flat_at_card_center() {
    let t = tilt(150.0, 100.0, 300.0, 200.0);
    assert_eq!(t.rotate_x, 0.0);
    assert_eq!(t.rotate_y, 0.0);
    assert_eq!(t.scale, 1.02);
}

#[test]
fn tilt_leans_toward_the_pointer() {
    let t = tilt(300.0, 0.0, 300.0, 200.0);
    assert_eq!(t.rotate_x, 5.0);
    assert_eq!(t.rotate_y, 7.5);
}

#[test]
fn tilt_css() {
    assert_eq!(
        Tilt::REST.css(),
        "perspective(1000px) rotateX(0deg) rotateY(0deg) scale(1)"
    );
}

#[test]
fn show_ready_visits_every_item_after_a_failure() {
    let mut pending = vec![1, 2, 3, 4, 5, 6];
    let mut shown = Vec::new();
    let result = show_ready(
        &mut pending,
        |n| n % 2 == 0 || *n == 5,
        |n| {
            if *n == 2 || *n == 5 {
                return Err(format!("failed {n}"));
            }
            shown.push(*n);
            Ok(())
        },
    );
    assert_eq!(result, Err("failed 2".to_string()));
    assert_eq!(shown, vec![4, 6]);
    // Failed items stay queued with the ones that were not ready yet.
    assert_eq!(pending, vec![1, 2, 3, 5]);
}

#[test]
fn show_ready_drains_everything_in_view() {
    let mut pending = vec!["a", "b"];
    let result: Result<(), ()> = show_ready(&mut pending, |_| true, |_| Ok(()));
    assert_eq!(result, Ok(()));
    assert!(pending.is_empty());
}
