use std::collections::HashSet;

use crate::camera::Movement;

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
}

/// Non-character keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Escape,
}

impl Movement {
    /// Key bound to this movement: `W/S/A/D` planar, `E/Q` vertical.
    pub fn key(self) -> KeyCode {
        KeyCode::Character(match self {
            Movement::Forward => 'W',
            Movement::Backward => 'S',
            Movement::Left => 'A',
            Movement::Right => 'D',
            Movement::Up => 'E',
            Movement::Down => 'Q',
        })
    }
}

/// Keys currently held down, polled once per frame.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys.insert(key);
        } else {
            self.keys.remove(&key);
        }
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    /// Movements whose keys are held, in a fixed order.
    pub fn held_movements(&self) -> impl Iterator<Item = Movement> + '_ {
        Movement::ALL
            .into_iter()
            .filter(move |movement| self.is_key_down(movement.key()))
    }

    pub fn exit_requested(&self) -> bool {
        self.is_key_down(KeyCode::Named(NamedKey::Escape))
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}
