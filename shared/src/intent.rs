//! Keyboard input aggregation.
//!
//! The aggregator tracks the set of currently-held recognized keys and
//! derives the movement intent from that set every time it is read. Nothing
//! is stored incrementally per axis: releasing one of two keys bound to the
//! same axis keeps the axis active while the other key is still down.
//!
//! Key identifiers are textual and case-insensitive ("w", "ArrowUp", ...).
//! Unrecognized keys are ignored, not rejected.

use std::collections::HashSet;

use nalgebra::Vector2;

/// Recognized physical keys. The aggregator stores these, not the derived
/// axes, so intent can be re-derived from the full held set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeldKey {
    W,
    A,
    S,
    D,
    Q,
    E,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    Shift,
    F3,
}

impl HeldKey {
    /// Parse a textual key identifier, case-insensitively.
    ///
    /// Returns `None` for keys this demo does not bind.
    pub fn parse(key: &str) -> Option<Self> {
        let lower = key.to_ascii_lowercase();
        let held = match lower.as_str() {
            "w" => Self::W,
            "a" => Self::A,
            "s" => Self::S,
            "d" => Self::D,
            "q" => Self::Q,
            "e" => Self::E,
            "arrowup" => Self::ArrowUp,
            "arrowdown" => Self::ArrowDown,
            "arrowleft" => Self::ArrowLeft,
            "arrowright" => Self::ArrowRight,
            " " | "space" => Self::Space,
            "shift" => Self::Shift,
            "f3" => Self::F3,
            _ => return None,
        };
        Some(held)
    }
}

/// Movement intent derived from the held-key set.
///
/// `axis.y` is forward/back, `axis.x` is strafe; each component is -1, 0, or
/// 1. The two axes are independent: keys bound to one never perturb the
/// other.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputIntent {
    pub axis: Vector2<f32>,
    pub want_jump: bool,
    pub boost: bool,
}

impl InputIntent {
    pub const NEUTRAL: Self = Self {
        axis: Vector2::new(0.0, 0.0),
        want_jump: false,
        boost: false,
    };
}

/// Tracks held keys and derives [`InputIntent`] on demand.
#[derive(Clone, Debug, Default)]
pub struct InputAggregator {
    held: HashSet<HeldKey>,
}

impl InputAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key-down. Returns the recognized key, if any, so callers can
    /// react to discrete presses (e.g. the debug toggle).
    pub fn press(&mut self, key: &str) -> Option<HeldKey> {
        let held = HeldKey::parse(key)?;
        self.held.insert(held);
        Some(held)
    }

    /// Record a key-up. Unrecognized keys are ignored.
    pub fn release(&mut self, key: &str) -> Option<HeldKey> {
        let held = HeldKey::parse(key)?;
        self.held.remove(&held);
        Some(held)
    }

    /// Drop all held keys (e.g. on window focus loss, where key-up messages
    /// may never arrive).
    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, key: HeldKey) -> bool {
        self.held.contains(&key)
    }

    /// Derive the current movement intent from the held-key set.
    pub fn intent(&self) -> InputIntent {
        let forward = self.is_held(HeldKey::W) || self.is_held(HeldKey::ArrowUp);
        let back = self.is_held(HeldKey::S) || self.is_held(HeldKey::ArrowDown);
        let left = self.is_held(HeldKey::Q);
        let right = self.is_held(HeldKey::E);

        let axis = Vector2::new(
            (right as i8 - left as i8) as f32,
            (forward as i8 - back as i8) as f32,
        );

        InputIntent {
            axis,
            want_jump: self.is_held(HeldKey::Space),
            boost: self.is_held(HeldKey::Shift),
        }
    }

    /// Signed turn input: positive turns right, negative turns left.
    pub fn turn(&self) -> f32 {
        let left = self.is_held(HeldKey::A) || self.is_held(HeldKey::ArrowLeft);
        let right = self.is_held(HeldKey::D) || self.is_held(HeldKey::ArrowRight);
        (right as i8 - left as i8) as f32
    }

    /// True while any movement-or-strafe key is held. Drives walk/idle
    /// selection and the walk-start edge.
    pub fn movement_active(&self) -> bool {
        let intent = self.intent();
        intent.axis.x != 0.0 || intent.axis.y != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(HeldKey::parse("ArrowUp"), Some(HeldKey::ArrowUp));
        assert_eq!(HeldKey::parse("arrowup"), Some(HeldKey::ArrowUp));
        assert_eq!(HeldKey::parse("SHIFT"), Some(HeldKey::Shift));
        assert_eq!(HeldKey::parse(" "), Some(HeldKey::Space));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut agg = InputAggregator::new();
        assert_eq!(agg.press("f13"), None);
        assert_eq!(agg.release("escape"), None);
        assert_eq!(agg.intent(), InputIntent::NEUTRAL);
    }

    #[test]
    fn forward_axis_from_either_binding() {
        let mut agg = InputAggregator::new();
        agg.press("w");
        assert_eq!(agg.intent().axis.y, 1.0);
        agg.release("w");
        agg.press("ArrowUp");
        assert_eq!(agg.intent().axis.y, 1.0);
    }

    #[test]
    fn releasing_one_of_two_keys_on_an_axis_keeps_it_active() {
        // Both bindings for forward held, then one released: the axis must
        // stay active because intent is re-derived from the held set.
        let mut agg = InputAggregator::new();
        agg.press("w");
        agg.press("arrowup");
        agg.release("w");
        assert_eq!(agg.intent().axis.y, 1.0);
        agg.release("arrowup");
        assert_eq!(agg.intent().axis.y, 0.0);
    }

    #[test]
    fn axes_are_independent() {
        let mut agg = InputAggregator::new();
        agg.press("w");
        agg.press("e");
        let intent = agg.intent();
        assert_eq!(intent.axis, Vector2::new(1.0, 1.0));

        // Releasing a strafe key must not perturb the forward axis.
        agg.release("e");
        let intent = agg.intent();
        assert_eq!(intent.axis, Vector2::new(0.0, 1.0));
    }

    #[test]
    fn opposed_keys_cancel() {
        let mut agg = InputAggregator::new();
        agg.press("w");
        agg.press("s");
        assert_eq!(agg.intent().axis.y, 0.0);
        assert!(!agg.movement_active());
    }

    #[test]
    fn jump_and_boost_flags() {
        let mut agg = InputAggregator::new();
        agg.press("space");
        agg.press("shift");
        let intent = agg.intent();
        assert!(intent.want_jump);
        assert!(intent.boost);
        agg.release(" ");
        assert!(!agg.intent().want_jump);
    }

    #[test]
    fn turn_input_is_not_movement() {
        let mut agg = InputAggregator::new();
        agg.press("a");
        assert_eq!(agg.turn(), -1.0);
        assert!(!agg.movement_active());
        agg.press("d");
        assert_eq!(agg.turn(), 0.0);
    }

    #[test]
    fn clear_drops_everything() {
        let mut agg = InputAggregator::new();
        agg.press("w");
        agg.press("shift");
        agg.clear();
        assert_eq!(agg.intent(), InputIntent::NEUTRAL);
    }
}
