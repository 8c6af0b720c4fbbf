/// Platform-agnostic input handling.
///
/// Browser callbacks (or winit events on native) only translate into
/// `InputEvent`s and push them onto a queue; the frame driver drains the
/// queue once per tick, so two events arriving between ticks coalesce into
/// their final flag state and ordering stays deterministic.
use tracing::warn;

/// Platform-independent input events
#[derive(Debug, Clone)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    MouseMove { dx: f32, dy: f32 },
    PointerLockChanged { locked: bool },
    PointerLockError,
    FocusLost,
}

/// The four tracked movement keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKey {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
}

impl MoveKey {
    /// Map a textual key identifier to a movement key. Anything else is not
    /// part of the tracked key set and is ignored by construction.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "w" => Some(MoveKey::Forward),
            "s" => Some(MoveKey::Back),
            "a" => Some(MoveKey::StrafeLeft),
            "d" => Some(MoveKey::StrafeRight),
            _ => None,
        }
    }
}

/// Held-key flags plus pointer-lock status and the coalesced look delta
pub struct InputState {
    pub forward: bool,
    pub back: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub pointer_locked: bool,
    pub look_delta: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Self {
            forward: false,
            back: false,
            strafe_left: false,
            strafe_right: false,
            pointer_locked: false,
            look_delta: (0.0, 0.0),
        }
    }

    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                // keys only register while the pointer is captured
                if self.pointer_locked {
                    if let Some(mk) = MoveKey::from_key(key) {
                        self.set_key(mk, true);
                    }
                }
            }
            InputEvent::KeyUp(key) => {
                if self.pointer_locked {
                    if let Some(mk) = MoveKey::from_key(key) {
                        self.set_key(mk, false);
                    }
                }
            }
            InputEvent::MouseMove { dx, dy } => {
                if self.pointer_locked {
                    self.look_delta.0 += dx;
                    self.look_delta.1 += dy;
                }
            }
            InputEvent::PointerLockChanged { locked } => {
                self.pointer_locked = *locked;
                if !locked {
                    // no residual motion once the pointer is released
                    self.clear_keys();
                }
            }
            InputEvent::PointerLockError => {
                warn!("pointer lock request failed; look/move input stays disabled");
            }
            InputEvent::FocusLost => {
                self.clear_keys();
            }
        }
    }

    fn set_key(&mut self, key: MoveKey, down: bool) {
        match key {
            MoveKey::Forward => self.forward = down,
            MoveKey::Back => self.back = down,
            MoveKey::StrafeLeft => self.strafe_left = down,
            MoveKey::StrafeRight => self.strafe_right = down,
        }
    }

    pub fn clear_keys(&mut self) {
        self.forward = false;
        self.back = false;
        self.strafe_left = false;
        self.strafe_right = false;
    }

    pub fn any_movement(&self) -> bool {
        self.forward || self.back || self.strafe_left || self.strafe_right
    }

    /// Raw axis intent: x in {-1, 0, 1} from the strafe keys, z in {-1, 0, 1}
    /// from forward/back (forward is negative z, as seen from the camera)
    pub fn move_intent(&self) -> (f32, f32) {
        let mut move_x = 0.0;
        let mut move_z = 0.0;
        if self.forward {
            move_z -= 1.0;
        }
        if self.back {
            move_z += 1.0;
        }
        if self.strafe_left {
            move_x -= 1.0;
        }
        if self.strafe_right {
            move_x += 1.0;
        }
        (move_x, move_z)
    }

    /// Take the accumulated look delta, resetting it for the next frame
    pub fn consume_look(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.look_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locked_state() -> InputState {
        let mut state = InputState::new();
        state.process_event(&InputEvent::PointerLockChanged { locked: true });
        state
    }

    #[test]
    fn unlock_clears_movement_flags() {
        let mut state = locked_state();
        state.process_event(&InputEvent::KeyDown("w".into()));
        assert!(state.forward);
        state.process_event(&InputEvent::PointerLockChanged { locked: false });
        assert!(!state.forward);
        assert!(!state.any_movement());
    }

    #[test]
    fn events_between_ticks_coalesce_to_final_state() {
        let mut state = locked_state();
        state.process_event(&InputEvent::KeyDown("d".into()));
        state.process_event(&InputEvent::KeyUp("d".into()));
        assert!(!state.strafe_right);
    }

    #[test]
    fn unrecognized_keys_are_ignored() {
        let mut state = locked_state();
        state.process_event(&InputEvent::KeyDown("q".into()));
        state.process_event(&InputEvent::KeyDown("Shift".into()));
        assert!(!state.any_movement());
    }

    #[test]
    fn uppercase_keys_map_like_lowercase() {
        let mut state = locked_state();
        state.process_event(&InputEvent::KeyDown("W".into()));
        assert!(state.forward);
    }

    #[test]
    fn mouse_deltas_accumulate_only_while_locked() {
        let mut state = InputState::new();
        state.process_event(&InputEvent::MouseMove { dx: 5.0, dy: -3.0 });
        assert_eq!(state.consume_look(), (0.0, 0.0));

        state.process_event(&InputEvent::PointerLockChanged { locked: true });
        state.process_event(&InputEvent::MouseMove { dx: 5.0, dy: -3.0 });
        state.process_event(&InputEvent::MouseMove { dx: 1.0, dy: 1.0 });
        assert_eq!(state.consume_look(), (6.0, -2.0));
        assert_eq!(state.consume_look(), (0.0, 0.0));
    }

    #[test]
    fn keys_ignored_while_unlocked() {
        let mut state = InputState::new();
        state.process_event(&InputEvent::KeyDown("w".into()));
        assert!(!state.forward);
    }

    #[test]
    fn diagonal_intent_is_unit_per_axis() {
        let mut state = locked_state();
        state.process_event(&InputEvent::KeyDown("w".into()));
        state.process_event(&InputEvent::KeyDown("d".into()));
        assert_eq!(state.move_intent(), (1.0, -1.0));
    }
}
