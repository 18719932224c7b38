use glam::{Vec2, Vec3};
use rlabz_site::pose::{
    BLEND, FeatureKind, GREETING_DELAY_MS, GREETING_DURATION_MS, IDLE_AFTER_MS, Mode, PoseInputs,
    PoseUpdater, Prop, blend, finite_or,
};
use rlabz_site::viewport::{Camera, Placement};

fn placement() -> Placement {
    Placement {
        position: Vec3::new(1.0, -0.5, 0.0),
        scale: 0.82,
        shadow_opacity: 0.2,
        ease: 0.0,
    }
}

/// Runs the updater past the greeting window so the other modes can show.
fn after_greeting() -> f64 {
    GREETING_DELAY_MS + GREETING_DURATION_MS + 1.0
}

#[test]
fn blend_covers_about_two_thirds_in_ten_steps() {
    let mut v = 0.0;
    for _ in 0..10 {
        v = blend(v, 1.0, BLEND);
    }
    assert!(v > 0.6 && v < 0.7, "got {v}");
}

#[test]
fn blend_converges_without_overshoot() {
    let mut v = 2.0_f32;
    let mut last = v;
    for _ in 0..200 {
        v = blend(v, -1.0, BLEND);
        assert!(v <= last);
        assert!(v >= -1.0);
        last = v;
    }
    assert!((v + 1.0).abs() < 1e-4);
}

#[test]
fn finite_or_keeps_last_good() {
    assert_eq!(finite_or(0.5, 1.0), 0.5);
    assert_eq!(finite_or(f32::NAN, 1.0), 1.0);
    assert_eq!(finite_or(f32::INFINITY, -2.0), -2.0);
}

#[test]
fn greeting_window_wins_over_everything() {
    let updater = PoseUpdater::new(0.0, 1);
    let mut inputs = PoseInputs::new(0.0);
    inputs.hover(Some(FeatureKind::Web));

    assert!(matches!(updater.mode(&inputs, 1500.0), Mode::Greeting { .. }));
    assert!(!matches!(updater.mode(&inputs, 999.0), Mode::Greeting { .. }));
    assert!(!matches!(
        updater.mode(&inputs, GREETING_DELAY_MS + GREETING_DURATION_MS),
        Mode::Greeting { .. }
    ));
    match updater.mode(&inputs, 1250.0) {
        Mode::Greeting { elapsed_ms } => assert_eq!(elapsed_ms, 250.0),
        other => panic!("expected greeting, got {other}"),
    }
}

#[test]
fn hover_beats_idle() {
    let updater = PoseUpdater::new(0.0, 1);
    let now = after_greeting() + 10_000.0;
    let mut inputs = PoseInputs::new(0.0);
    assert_eq!(updater.mode(&inputs, now), Mode::Idle);

    inputs.hover(Some(FeatureKind::Digital));
    assert_eq!(updater.mode(&inputs, now), Mode::Holding(Prop::Rocket));
}

#[test]
fn idle_after_pointer_rests() {
    let updater = PoseUpdater::new(0.0, 1);
    let now = after_greeting() + 1000.0;
    let mut inputs = PoseInputs::new(0.0);
    inputs.pointer_moved(Vec2::new(0.2, 0.1), now - IDLE_AFTER_MS + 1.0);
    assert_eq!(updater.mode(&inputs, now), Mode::Tracking);

    inputs.pointer_moved(Vec2::new(0.2, 0.1), now - IDLE_AFTER_MS - 1.0);
    assert_eq!(updater.mode(&inputs, now), Mode::Idle);
}

#[test]
fn holding_shows_the_feature_prop() {
    let mut updater = PoseUpdater::new(0.0, 3);
    let camera = Camera::default();
    let now = after_greeting();
    let mut inputs = PoseInputs::new(now);
    inputs.hover(Some(FeatureKind::Mobile));

    let mode = updater.update(&inputs, now, &placement(), &camera);
    assert_eq!(mode, Mode::Holding(Prop::Phone));
    assert_eq!(updater.pose().held, Some(Prop::Phone));

    inputs.hover(None);
    updater.update(&inputs, now + 16.0, &placement(), &camera);
    assert_eq!(updater.pose().held, None);
}

#[test]
fn holding_raises_the_right_arm() {
    let mut updater = PoseUpdater::new(0.0, 3);
    let camera = Camera::default();
    let now = after_greeting();
    let mut inputs = PoseInputs::new(now);
    inputs.hover(Some(FeatureKind::Web));
    for i in 0..120 {
        updater.update(&inputs, now + i as f64 * 16.0, &placement(), &camera);
    }
    let (pitch, roll) = Prop::Laptop.hold_pose();
    assert!((updater.pose().arm_right_pitch - pitch).abs() < 0.01);
    assert!((updater.pose().arm_right_roll - roll).abs() < 0.01);
}

#[test]
fn greeting_waves_and_lights_up() {
    let mut updater = PoseUpdater::new(0.0, 3);
    let camera = Camera::default();
    let inputs = PoseInputs::new(0.0);
    for i in 0..60 {
        updater.update(&inputs, 1000.0 + i as f64 * 16.0, &placement(), &camera);
    }
    assert!(updater.pose().arm_right_pitch < -1.5);
    assert_eq!(updater.pose().indicator_scale, 1.2);
}

#[test]
fn head_pitch_is_capped() {
    let mut updater = PoseUpdater::new(0.0, 3);
    let camera = Camera::default();
    let now = after_greeting();
    let mut inputs = PoseInputs::new(now);
    for i in 0..200 {
        let t = now + i as f64 * 16.0;
        inputs.pointer_moved(Vec2::new(0.0, -1.0), t);
        updater.update(&inputs, t, &placement(), &camera);
    }
    assert!(updater.pose().head_pitch <= 0.15 + 1e-6);
}

#[test]
fn non_finite_placement_keeps_last_good_root() {
    let mut updater = PoseUpdater::new(0.0, 3);
    let camera = Camera::default();
    let inputs = PoseInputs::new(0.0);
    let now = after_greeting();

    updater.update(&inputs, now, &placement(), &camera);
    let good = *updater.pose();

    let broken = Placement {
        position: Vec3::new(f32::NAN, 0.0, 0.0),
        scale: f32::INFINITY,
        shadow_opacity: f32::NAN,
        ease: 0.0,
    };
    updater.update(&inputs, now + 16.0, &broken, &camera);
    let pose = updater.pose();
    assert_eq!(pose.root_position, good.root_position);
    assert_eq!(pose.root_scale, good.root_scale);
    assert_eq!(pose.shadow_opacity, good.shadow_opacity);
}

#[test]
fn non_finite_placement_before_any_good_uses_fallback() {
    let mut updater = PoseUpdater::new(0.0, 3);
    let camera = Camera::default();
    let inputs = PoseInputs::new(0.0);
    let broken = Placement {
        position: Vec3::splat(f32::NAN),
        scale: f32::NAN,
        shadow_opacity: 0.2,
        ease: 0.0,
    };
    updater.update(&inputs, 0.0, &broken, &camera);
    let pose = updater.pose();
    assert!(pose.root_position.is_finite());
    assert_eq!(pose.root_scale, 1.0);
    assert!((pose.root_position.y + 1.0).abs() < 0.1);
}

#[test]
fn nan_pointer_never_poisons_the_head() {
    let mut updater = PoseUpdater::new(0.0, 3);
    let camera = Camera::default();
    let now = after_greeting();
    let mut inputs = PoseInputs::new(now);
    inputs.pointer_moved(Vec2::new(f32::NAN, f32::NAN), now);
    for i in 0..5 {
        updater.update(&inputs, now + i as f64, &placement(), &camera);
    }
    assert!(updater.pose().head_yaw.is_finite());
    assert!(updater.pose().head_pitch.is_finite());
}

#[test]
fn feature_names_parse() {
    assert_eq!("mobile".parse::<FeatureKind>(), Ok(FeatureKind::Mobile));
    assert_eq!(" Web ".parse::<FeatureKind>(), Ok(FeatureKind::Web));
    assert_eq!("digital".parse::<FeatureKind>().map(FeatureKind::prop), Ok(Prop::Rocket));
    assert_eq!("cloud".parse::<FeatureKind>().map(FeatureKind::prop), Ok(Prop::Cloud));
    assert!("design".parse::<FeatureKind>().is_err());
}

#[test]
fn mode_display_is_readable() {
    assert_eq!(Mode::Holding(Prop::Laptop).to_string(), "holding laptop");
    assert_eq!(Mode::Idle.to_string(), "idle");
}

#[test]
fn idle_pulses_the_indicator() {
    let mut updater = PoseUpdater::new(0.0, 5);
    let camera = Camera::default();
    let inputs = PoseInputs::new(0.0);
    let start = after_greeting();
    let mut lowest = f32::MAX;
    let mut highest = f32::MIN;
    for i in 0..300 {
        let mode = updater.update(&inputs, start + i as f64 * 16.0, &placement(), &camera);
        assert_eq!(mode, Mode::Idle);
        let expected = 1.0 + (updater.time() * 3.0).sin() * 0.15;
        let scale = updater.pose().indicator_scale;
        assert!((scale - expected).abs() < 1e-5, "frame {i}: {scale} vs {expected}");
        lowest = lowest.min(scale);
        highest = highest.max(scale);
    }
    assert!(lowest < 0.9 && highest > 1.1, "{lowest}..{highest}");
}

#[test]
fn antenna_twitches_then_decays() {
    let mut updater = PoseUpdater::new(0.0, 11);
    let camera = Camera::default();
    let mut inputs = PoseInputs::new(0.0);
    let mut now = after_greeting();
    let mut twitches = 0;
    let mut last = updater.pose().antenna_roll;
    for _ in 0..4000 {
        updater.update(&inputs, now, &placement(), &camera);
        now += 16.0;
        let roll = updater.pose().antenna_roll;
        assert!(roll.abs() <= 0.3, "roll {roll}");
        if (roll - last * 0.9).abs() > 1e-6 {
            twitches += 1;
        } else if twitches > 0 && roll.abs() > 1e-3 {
            break;
        }
        last = roll;
    }
    assert!(twitches > 0, "no twitch in idle");
    let mut roll = updater.pose().antenna_roll;
    assert!(roll.abs() > 1e-3);

    // Moving the pointer settles the antenna by a fifth each frame.
    for _ in 0..5 {
        inputs.pointer_moved(Vec2::ZERO, now);
        assert_eq!(updater.update(&inputs, now, &placement(), &camera), Mode::Tracking);
        now += 16.0;
        let settled = updater.pose().antenna_roll;
        assert!((settled - roll * 0.8).abs() <= roll.abs() * 1e-5, "{settled} vs {roll}");
        roll = settled;
    }
}

#[test]
fn tracking_reference_follows_the_mascot_once_scrolled() {
    let camera = Camera::default();
    let scrolled = Placement {
        ease: 1.0,
        ..placement()
    };

    // At full scroll a pointer resting on the mascot means "look straight ahead".
    let mut updater = PoseUpdater::new(0.0, 7);
    let mut inputs = PoseInputs::new(0.0);
    let mut now = after_greeting();
    let mut pointer = camera.project(scrolled.position).truncate();
    for _ in 0..200 {
        inputs.pointer_moved(pointer, now);
        updater.update(&inputs, now, &scrolled, &camera);
        pointer = camera.project(updater.pose().root_position).truncate();
        now += 16.0;
    }
    assert!(pointer.x > 0.2);
    assert!(updater.pose().head_yaw.abs() < 0.01, "yaw {}", updater.pose().head_yaw);

    // At the top of the page the same pointer sits right of the viewport center.
    let mut updater = PoseUpdater::new(0.0, 7);
    for _ in 0..200 {
        inputs.pointer_moved(pointer, now);
        updater.update(&inputs, now, &placement(), &camera);
        now += 16.0;
    }
    assert!((updater.pose().head_yaw - pointer.x * 0.6).abs() < 0.02);
}

#[test]
fn greeting_turns_the_head_toward_the_camera() {
    let camera = Camera::default();
    let inputs = PoseInputs::new(0.0);
    for x in [1.0_f32, -1.0] {
        let at = Placement {
            position: Vec3::new(x, -0.5, 0.0),
            ..placement()
        };
        let mut updater = PoseUpdater::new(0.0, 3);
        for i in 0..120 {
            let mode = updater.update(&inputs, 1000.0 + i as f64 * 16.0, &at, &camera);
            assert!(matches!(mode, Mode::Greeting { .. }));
        }
        let yaw = (-x).atan2(camera.z);
        let pitch = (-0.5_f32 + 1.6).atan2(camera.z);
        let pose = updater.pose();
        assert!((pose.head_yaw - yaw).abs() < 1e-3, "x {x}: yaw {}", pose.head_yaw);
        assert!((pose.head_pitch - pitch).abs() < 1e-3, "x {x}: pitch {}", pose.head_pitch);
        assert_eq!(pose.head_yaw.signum(), -x.signum());
    }
}
