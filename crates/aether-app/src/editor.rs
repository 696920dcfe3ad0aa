//! Keyboard parameter editing.
//!
//! Key presses are queued as [`Edit`]s and folded into a single new
//! [`ParameterSet`] once per frame, so any number of presses between two
//! frames costs exactly one parameter application (and one environment
//! bake).
//!
//! | key          | edit                          |
//! |--------------|-------------------------------|
//! | Up / Down    | elevation +/- 1 degree        |
//! | Right / Left | azimuth +/- 1 degree          |
//! | `]` / `[`    | turbidity +/- 1               |
//! | V / C        | cloud coverage +/- 0.05       |
//! | R            | reset every parameter         |

use aether_sky::{ParamValue, ParameterError, ParameterSet};
use tracing::{debug, warn};
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// One queued change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edit {
    /// Move a scalar or integer parameter by `steps` of its advisory step, clamped to its range.
    Nudge { name: &'static str, steps: f32 },
    /// Restore the defaults.
    Reset,
}

/// The edit bound to `key`, if any.
pub fn edit_for_key(key: KeyCode) -> Option<Edit> {
    let by = |name, steps| Some(Edit::Nudge { name, steps });
    match key {
        KeyCode::ArrowUp => by("elevation", 10.0),
        KeyCode::ArrowDown => by("elevation", -10.0),
        KeyCode::ArrowRight => by("azimuth", 10.0),
        KeyCode::ArrowLeft => by("azimuth", -10.0),
        KeyCode::BracketRight => by("turbidity", 1.0),
        KeyCode::BracketLeft => by("turbidity", -1.0),
        KeyCode::KeyV => by("coverage", 5.0),
        KeyCode::KeyC => by("coverage", -5.0),
        KeyCode::KeyR => Some(Edit::Reset),
        _ => None,
    }
}

/// Collects edits between frames.
#[derive(Debug, Default)]
pub struct ParameterEditor {
    pending: Vec<Edit>,
}

impl ParameterEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the edit bound to a pressed key. Held keys repeat.
    /// Returns whether the key was bound.
    pub fn process_event(&mut self, event: &KeyEvent) -> bool {
        if event.state != ElementState::Pressed {
            return false;
        }
        match event.physical_key {
            PhysicalKey::Code(code) => self.press(code),
            PhysicalKey::Unidentified(_) => false,
        }
    }

    pub fn press(&mut self, key: KeyCode) -> bool {
        match edit_for_key(key) {
            Some(edit) => {
                self.pending.push(edit);
                true
            }
            None => false,
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Fold every queued edit into a copy of `current`. `None` when nothing was queued.
    pub fn take_batch(&mut self, current: &ParameterSet) -> Option<ParameterSet> {
        if self.pending.is_empty() {
            return None;
        }

        let mut params = current.clone();
        for edit in self.pending.drain(..) {
            match edit {
                Edit::Reset => params = ParameterSet::default(),
                Edit::Nudge { name, steps } => {
                    if let Err(e) = nudge(&mut params, name, steps) {
                        warn!("Ignoring edit of '{name}': {e}");
                    }
                }
            }
        }
        debug!(
            "Edited parameters: elevation {:.1}, azimuth {:.1}, turbidity {:.0}, coverage {:.2}",
            params.sun.elevation, params.sun.azimuth, params.atmosphere.turbidity, params.cloud.coverage
        );
        Some(params)
    }
}

fn nudge(params: &mut ParameterSet, name: &str, steps: f32) -> Result<(), ParameterError> {
    let Some(spec) = ParameterSet::spec(name) else {
        return Err(ParameterError::Unknown(name.to_string()));
    };
    let value: ParamValue = params.get(name)?;
    params.set(name, spec.nudge(value, steps))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbound_keys_are_ignored() {
        let mut editor = ParameterEditor::new();
        assert!(!editor.press(KeyCode::KeyQ));
        assert!(!editor.has_pending());
        assert!(editor.take_batch(&ParameterSet::default()).is_none());
    }

    #[test]
    fn test_arrow_keys_move_the_sun_by_one_degree() {
        let mut editor = ParameterEditor::new();
        editor.press(KeyCode::ArrowUp);
        editor.press(KeyCode::ArrowLeft);
        let params = editor.take_batch(&ParameterSet::default()).unwrap();
        assert!((params.sun.elevation - 46.0).abs() < 1e-4);
        assert!((params.sun.azimuth - 179.0).abs() < 1e-4);
    }

    #[test]
    fn test_many_presses_make_one_batch() {
        let mut editor = ParameterEditor::new();
        for _ in 0..5 {
            editor.press(KeyCode::BracketLeft);
        }
        let params = editor.take_batch(&ParameterSet::default()).unwrap();
        assert_eq!(params.atmosphere.turbidity, 5.0);
        assert!(editor.take_batch(&params).is_none());
    }

    #[test]
    fn test_edits_clamp_to_advisory_range() {
        let mut editor = ParameterEditor::new();
        let mut current = ParameterSet::default();
        current.sun.elevation = 89.5;
        editor.press(KeyCode::ArrowUp);
        let params = editor.take_batch(&current).unwrap();
        assert_eq!(params.sun.elevation, 90.0);
    }

    #[test]
    fn test_reset_discards_earlier_edits_in_the_batch() {
        let mut editor = ParameterEditor::new();
        let mut current = ParameterSet::default();
        current.cloud.coverage = 0.9;
        editor.press(KeyCode::ArrowUp);
        editor.press(KeyCode::KeyR);
        editor.press(KeyCode::KeyV);
        let params = editor.take_batch(&current).unwrap();
        assert_eq!(params.sun.elevation, 45.0);
        assert!((params.cloud.coverage - 0.55).abs() < 1e-6);
    }

    #[test]
    fn test_every_bound_parameter_exists() {
        let keys = [
            KeyCode::ArrowUp,
            KeyCode::ArrowRight,
            KeyCode::BracketRight,
            KeyCode::KeyV,
        ];
        for key in keys {
            let Some(Edit::Nudge { name, .. }) = edit_for_key(key) else {
                panic!("{key:?} is not a nudge");
            };
            assert!(ParameterSet::spec(name).is_some(), "{name}");
        }
    }
}
