use super::InputInjector;
use crate::error::InjectorError;
use crate::models::SimulationKey;
use core_graphics::event::{CGEvent, CGEventTapLocation, CGEventType, CGKeyCode, CGMouseButton};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;

/// Injects input by posting Quartz events at the HID level.
///
/// Posting requires the Accessibility permission; without it events are
/// silently dropped by the system.
pub struct MacOSInjector;

fn event_source() -> Result<CGEventSource, InjectorError> {
    CGEventSource::new(CGEventSourceStateID::HIDSystemState)
        .map_err(|()| InjectorError::Unavailable("cannot create Quartz event source".into()))
}

#[allow(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    reason = "screen coordinates fit in i32"
)]
fn to_pixels(value: f64) -> i32 {
    value.round() as i32
}

impl MacOSInjector {
    pub fn new() -> Result<Self, InjectorError> {
        event_source()?;
        Ok(Self)
    }
}

fn post_key(key: SimulationKey, down: bool) -> Result<(), InjectorError> {
    let code = keycode_for(key).ok_or(InjectorError::UnmappedKey(key.name()))?;
    let event = CGEvent::new_keyboard_event(event_source()?, code, down)
        .map_err(|()| InjectorError::Protocol("cannot create keyboard event".into()))?;
    event.post(CGEventTapLocation::HID);
    Ok(())
}

impl InputInjector for MacOSInjector {
    fn pointer_position(&self) -> Result<(i32, i32), InjectorError> {
        let event = CGEvent::new(event_source()?)
            .map_err(|()| InjectorError::Protocol("cannot read pointer location".into()))?;
        let location = event.location();
        Ok((to_pixels(location.x), to_pixels(location.y)))
    }

    fn move_pointer(&self, dx: i32, dy: i32) -> Result<(), InjectorError> {
        let (x, y) = self.pointer_position()?;
        let target_x = x.checked_add(dx).ok_or(InjectorError::OutOfRange(dx))?;
        let target_y = y.checked_add(dy).ok_or(InjectorError::OutOfRange(dy))?;

        let event = CGEvent::new_mouse_event(
            event_source()?,
            CGEventType::MouseMoved,
            CGPoint::new(f64::from(target_x), f64::from(target_y)),
            CGMouseButton::Left,
        )
        .map_err(|()| InjectorError::Protocol("cannot create mouse event".into()))?;
        event.post(CGEventTapLocation::HID);
        Ok(())
    }

    fn key_down(&self, key: SimulationKey) -> Result<(), InjectorError> {
        post_key(key, true)
    }

    fn key_up(&self, key: SimulationKey) -> Result<(), InjectorError> {
        post_key(key, false)
    }
}

/// Virtual keycodes from the Carbon `Events.h` table. Keys without a Mac
/// equivalent return `None`.
fn keycode_for(key: SimulationKey) -> Option<CGKeyCode> {
    let code = match key {
        SimulationKey::Shift => 0x38,
        SimulationKey::Control => 0x3b,
        SimulationKey::Alt => 0x3a,
        SimulationKey::Meta => 0x37,
        SimulationKey::CapsLock => 0x39,
        SimulationKey::Space => 0x31,
        SimulationKey::Enter => 0x24,
        SimulationKey::Tab => 0x30,
        SimulationKey::Escape => 0x35,
        SimulationKey::Home => 0x73,
        SimulationKey::End => 0x77,
        SimulationKey::Left => 0x7b,
        SimulationKey::Right => 0x7c,
        SimulationKey::Down => 0x7d,
        SimulationKey::Up => 0x7e,
        SimulationKey::F1 => 0x7a,
        SimulationKey::F2 => 0x78,
        SimulationKey::F3 => 0x63,
        SimulationKey::F4 => 0x76,
        SimulationKey::F5 => 0x60,
        SimulationKey::F6 => 0x61,
        SimulationKey::F7 => 0x62,
        SimulationKey::F8 => 0x64,
        SimulationKey::F9 => 0x65,
        SimulationKey::F10 => 0x6d,
        SimulationKey::F11 => 0x67,
        SimulationKey::F12 => 0x6f,
        SimulationKey::F13 => 0x69,
        SimulationKey::F14 => 0x6b,
        SimulationKey::F15 => 0x71,
        SimulationKey::F16 => 0x6a,
        SimulationKey::F17 => 0x40,
        SimulationKey::F18 => 0x4f,
        SimulationKey::F19 => 0x50,
        SimulationKey::F20 => 0x5a,
        SimulationKey::NumLock
        | SimulationKey::ScrollLock
        | SimulationKey::Pause
        | SimulationKey::Insert
        | SimulationKey::F21
        | SimulationKey::F22
        | SimulationKey::F23
        | SimulationKey::F24 => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_without_mac_equivalent() {
        assert!(keycode_for(SimulationKey::ScrollLock).is_none());
        assert!(keycode_for(SimulationKey::F24).is_none());
        assert_eq!(keycode_for(SimulationKey::Shift), Some(0x38));
    }

    #[test]
    #[ignore] // Requires a logged-in session with Accessibility permission
    fn test_pointer_position() {
        let injector = MacOSInjector::new().unwrap();
        assert!(injector.pointer_position().is_ok());
    }
}
