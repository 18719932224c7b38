//! Per-frame mascot pose.
//!
//! Event handlers only touch [`PoseInputs`]. Once per frame the
//! [`PoseUpdater`] resolves a single [`Mode`], derives targets for every
//! animated part and eases the current pose toward them.

use crate::viewport::{Camera, Placement};
use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

pub const BLEND: f32 = 0.1;
pub const IDLE_BLEND: f32 = 0.05;
pub const TIME_STEP: f32 = 0.02;
pub const IDLE_AFTER_MS: f64 = 500.0;
pub const GREETING_DELAY_MS: f64 = 1000.0;
pub const GREETING_DURATION_MS: f64 = 2000.0;
const HEAD_PITCH_LIMIT: f32 = 0.15;
const HEAD_HEIGHT: f32 = 1.6;
const WRIST_RELAX: f32 = 0.8;
const ANTENNA_SETTLE: f32 = 0.8;
const ANTENNA_DECAY: f32 = 0.9;
const TWITCH_CHANCE: f64 = 0.015;
const TWITCH_AMPLITUDE: f32 = 0.3;
const FALLBACK_ROOT: Vec3 = Vec3::new(0.0, -1.0, 0.0);

pub fn blend(current: f32, target: f32, k: f32) -> f32 {
    current + (target - current) * k
}

/// `candidate` if it is a real number, otherwise the last good value.
pub fn finite_or(candidate: f32, last_good: f32) -> f32 {
    if candidate.is_finite() {
        candidate
    } else {
        last_good
    }
}

// Keeps NaN intact so the caller's guard can reject it.
fn cap_pitch(pitch: f32) -> f32 {
    if pitch > HEAD_PITCH_LIMIT {
        HEAD_PITCH_LIMIT
    } else {
        pitch
    }
}

fn ease_toward(current: &mut f32, target: f32, k: f32) {
    *current = finite_or(blend(*current, target, k), *current);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Prop {
    Phone,
    Laptop,
    Rocket,
    Cloud,
}

impl Prop {
    pub const ALL: [Prop; 4] = [Prop::Phone, Prop::Laptop, Prop::Rocket, Prop::Cloud];

    /// Right arm `(pitch, roll)` while presenting this prop.
    pub fn hold_pose(self) -> (f32, f32) {
        match self {
            Prop::Laptop => (-1.2, -0.3),
            Prop::Phone | Prop::Rocket | Prop::Cloud => (-1.8, -0.5),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Prop::Phone => "phone",
            Prop::Laptop => "laptop",
            Prop::Rocket => "rocket",
            Prop::Cloud => "cloud",
        }
    }
}

/// Feature cards the mascot reacts to, keyed by the card's `data-feature`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Mobile,
    Web,
    Digital,
    Cloud,
}

impl FeatureKind {
    pub fn prop(self) -> Prop {
        match self {
            FeatureKind::Mobile => Prop::Phone,
            FeatureKind::Web => Prop::Laptop,
            FeatureKind::Digital => Prop::Rocket,
            FeatureKind::Cloud => Prop::Cloud,
        }
    }
}

impl FromStr for FeatureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobile" => Ok(FeatureKind::Mobile),
            "web" => Ok(FeatureKind::Web),
            "digital" => Ok(FeatureKind::Digital),
            "cloud" => Ok(FeatureKind::Cloud),
            other => Err(format!("unknown feature: {}", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mode {
    Greeting { elapsed_ms: f64 },
    Holding(Prop),
    Idle,
    Tracking,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Greeting { elapsed_ms } => write!(f, "greeting ({:.0} ms)", elapsed_ms),
            Mode::Holding(prop) => write!(f, "holding {}", prop.name()),
            Mode::Idle => f.write_str("idle"),
            Mode::Tracking => f.write_str("tracking"),
        }
    }
}

/// Written by event handlers, read once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseInputs {
    pub pointer: Vec2,
    pub last_pointer_move_ms: f64,
    pub hovered: Option<FeatureKind>,
}

impl PoseInputs {
    pub fn new(now_ms: f64) -> Self {
        Self {
            pointer: Vec2::ZERO,
            last_pointer_move_ms: now_ms,
            hovered: None,
        }
    }

    pub fn pointer_moved(&mut self, ndc: Vec2, now_ms: f64) {
        self.pointer = ndc;
        self.last_pointer_move_ms = now_ms;
    }

    pub fn hover(&mut self, feature: Option<FeatureKind>) {
        self.hovered = feature;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub root_position: Vec3,
    pub root_scale: f32,
    pub shadow_opacity: f32,
    pub body_yaw: f32,
    pub head_pitch: f32,
    pub head_yaw: f32,
    pub antenna_roll: f32,
    pub arm_left_pitch: f32,
    pub arm_right_pitch: f32,
    pub arm_right_roll: f32,
    pub hand_right_pitch: f32,
    pub hand_right_roll: f32,
    pub indicator_scale: f32,
    pub held: Option<Prop>,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            root_position: Vec3::ZERO,
            root_scale: 1.0,
            shadow_opacity: 0.2,
            body_yaw: 0.0,
            head_pitch: 0.0,
            head_yaw: 0.0,
            antenna_roll: 0.0,
            arm_left_pitch: 0.0,
            arm_right_pitch: 0.0,
            arm_right_roll: -0.1,
            hand_right_pitch: 0.0,
            hand_right_roll: 0.0,
            indicator_scale: 1.0,
            held: None,
        }
    }
}

pub struct PoseUpdater {
    pose: Pose,
    time: f32,
    loaded_at_ms: f64,
    has_good_root: bool,
    rng: SmallRng,
}

impl PoseUpdater {
    pub fn new(loaded_at_ms: f64, seed: u64) -> Self {
        Self {
            pose: Pose::default(),
            time: 0.0,
            loaded_at_ms,
            has_good_root: false,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn mode(&self, inputs: &PoseInputs, now_ms: f64) -> Mode {
        let since_load = now_ms - self.loaded_at_ms;
        if (GREETING_DELAY_MS..GREETING_DELAY_MS + GREETING_DURATION_MS).contains(&since_load) {
            return Mode::Greeting {
                elapsed_ms: since_load - GREETING_DELAY_MS,
            };
        }
        if let Some(feature) = inputs.hovered {
            return Mode::Holding(feature.prop());
        }
        if now_ms - inputs.last_pointer_move_ms > IDLE_AFTER_MS {
            return Mode::Idle;
        }
        Mode::Tracking
    }

    /// Advances one frame and returns the mode that drove it.
    pub fn update(
        &mut self,
        inputs: &PoseInputs,
        now_ms: f64,
        placement: &Placement,
        camera: &Camera,
    ) -> Mode {
        self.time += TIME_STEP;
        let t = self.time;
        let mode = self.mode(inputs, now_ms);

        self.place_root(placement);
        self.update_body(mode);
        self.update_arms(mode);
        self.update_head(mode, inputs, placement, camera);

        self.pose.held = match mode {
            Mode::Holding(prop) => Some(prop),
            _ => None,
        };
        self.pose.arm_left_pitch = (t * 1.5).sin() * 0.1;
        mode
    }

    fn place_root(&mut self, placement: &Placement) {
        let bob = (self.time * 1.2).sin() * 0.06;
        let p = &mut self.pose;
        if placement.position.is_finite() && placement.scale.is_finite() {
            p.root_position = placement.position + Vec3::new(0.0, bob, 0.0);
            p.root_scale = placement.scale;
            self.has_good_root = true;
        } else if !self.has_good_root {
            p.root_position = FALLBACK_ROOT + Vec3::new(0.0, bob, 0.0);
            p.root_scale = 1.0;
        }
        p.shadow_opacity = finite_or(placement.shadow_opacity, p.shadow_opacity);
    }

    fn update_body(&mut self, mode: Mode) {
        self.pose.body_yaw = (self.time * 0.5 - 0.5).sin() * 0.02;
        if let Mode::Greeting { .. } = mode {
            ease_toward(&mut self.pose.body_yaw, 0.0, BLEND);
        }
    }

    fn update_arms(&mut self, mode: Mode) {
        let t = self.time;
        let p = &mut self.pose;
        match mode {
            Mode::Greeting { elapsed_ms } => {
                let wave = ((elapsed_ms / 1000.0) as f32 * TAU).sin() * 0.3;
                ease_toward(&mut p.arm_right_pitch, -2.5, BLEND);
                ease_toward(&mut p.arm_right_roll, 0.4 + wave, BLEND);
                ease_toward(&mut p.hand_right_pitch, 1.0, BLEND);
                p.hand_right_roll = (t * 8.0).sin() * 0.2;
            }
            Mode::Holding(prop) => {
                p.hand_right_pitch *= WRIST_RELAX;
                p.hand_right_roll *= WRIST_RELAX;
                let (pitch, roll) = prop.hold_pose();
                ease_toward(&mut p.arm_right_pitch, pitch, BLEND);
                ease_toward(&mut p.arm_right_roll, roll, BLEND);
            }
            Mode::Idle | Mode::Tracking => {
                p.hand_right_pitch *= WRIST_RELAX;
                p.hand_right_roll *= WRIST_RELAX;
                ease_toward(&mut p.arm_right_pitch, (t * 1.5 + 1.0).sin() * 0.1, BLEND);
                ease_toward(&mut p.arm_right_roll, -0.1, BLEND);
            }
        }
    }

    fn update_head(
        &mut self,
        mode: Mode,
        inputs: &PoseInputs,
        placement: &Placement,
        camera: &Camera,
    ) {
        let t = self.time;
        if !self.pose.head_yaw.is_finite() {
            self.pose.head_yaw = 0.0;
        }
        if !self.pose.head_pitch.is_finite() {
            self.pose.head_pitch = 0.0;
        }

        match mode {
            Mode::Greeting { .. } => {
                let at = placement.position;
                let depth = camera.z - at.z;
                let yaw = (-at.x).atan2(depth);
                let pitch = cap_pitch((at.y + HEAD_HEIGHT).atan2(depth));
                let p = &mut self.pose;
                ease_toward(&mut p.head_yaw, yaw, BLEND);
                ease_toward(&mut p.head_pitch, pitch, BLEND);
                p.antenna_roll *= ANTENNA_SETTLE;
                p.indicator_scale = 1.2;
            }
            Mode::Idle => {
                let yaw = (t * 0.4).sin() * 0.3 + (t * 1.1).sin() * 0.1;
                let pitch = (t * 0.3).sin() * 0.15;
                let twitch = self
                    .rng
                    .gen_bool(TWITCH_CHANCE)
                    .then(|| self.rng.gen_range(-TWITCH_AMPLITUDE..TWITCH_AMPLITUDE));
                let p = &mut self.pose;
                ease_toward(&mut p.head_yaw, yaw, IDLE_BLEND);
                ease_toward(&mut p.head_pitch, pitch, IDLE_BLEND);
                match twitch {
                    Some(roll) => p.antenna_roll = roll,
                    None => p.antenna_roll *= ANTENNA_DECAY,
                }
                p.indicator_scale = 1.0 + (t * 3.0).sin() * 0.15;
            }
            Mode::Holding(_) | Mode::Tracking => {
                // Reference point slides from the viewport center to the
                // mascot's own screen position as the page scrolls.
                let on_screen = camera.project(self.pose.root_position).truncate();
                let reference = on_screen * placement.ease;
                let d = inputs.pointer - reference;
                let yaw = d.x * 0.6;
                let pitch = cap_pitch(-d.y * 0.4);
                let p = &mut self.pose;
                ease_toward(&mut p.head_yaw, yaw, BLEND);
                ease_toward(&mut p.head_pitch, pitch, BLEND);
                p.antenna_roll *= ANTENNA_SETTLE;
                p.indicator_scale = 1.0;
            }
        }
    }
}
