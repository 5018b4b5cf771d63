use winit::event::ElementState;
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKey {
    ToggleZones,
    ToggleAutopilot,
    SwitchPage,
    Quit,
}

const KEY_COUNT: usize = 4;

impl ViewerKey {
    fn from_physical(key: PhysicalKey) -> Option<Self> {
        match key {
            PhysicalKey::Code(KeyCode::KeyZ) => Some(ViewerKey::ToggleZones),
            PhysicalKey::Code(KeyCode::KeyP) => Some(ViewerKey::ToggleAutopilot),
            PhysicalKey::Code(KeyCode::Tab) => Some(ViewerKey::SwitchPage),
            PhysicalKey::Code(KeyCode::Escape) => Some(ViewerKey::Quit),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            ViewerKey::ToggleZones => 0,
            ViewerKey::ToggleAutopilot => 1,
            ViewerKey::SwitchPage => 2,
            ViewerKey::Quit => 3,
        }
    }
}

/// Turns raw key events into one action per press; holding a key down does
/// not repeat it.
#[derive(Debug, Default)]
pub struct KeyLatch {
    down: [bool; KEY_COUNT],
}

impl KeyLatch {
    pub fn handle(&mut self, key: PhysicalKey, state: ElementState) -> Option<ViewerKey> {
        let action = ViewerKey::from_physical(key)?;
        let slot = &mut self.down[action.index()];
        match state {
            ElementState::Pressed => {
                let edge = !*slot;
                *slot = true;
                edge.then_some(action)
            }
            ElementState::Released => {
                *slot = false;
                None
            }
        }
    }
}
