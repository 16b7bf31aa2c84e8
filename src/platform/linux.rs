use super::InputInjector;
use crate::error::InjectorError;
use crate::models::SimulationKey;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    ConnectionExt as _, Keycode, Keysym, Window, KEY_PRESS_EVENT, KEY_RELEASE_EVENT,
    MOTION_NOTIFY_EVENT,
};
use x11rb::protocol::xtest::ConnectionExt as _;
use x11rb::rust_connection::RustConnection;
use x11rb::{CURRENT_TIME, NONE};

/// Injects input through the X11 XTEST extension.
pub struct LinuxInjector {
    conn: RustConnection,
    root: Window,
}

fn protocol_error(e: impl std::fmt::Display) -> InjectorError {
    InjectorError::Protocol(e.to_string())
}

impl LinuxInjector {
    pub fn new() -> Result<Self, InjectorError> {
        let (conn, screen_num) = x11rb::connect(None).map_err(|e| {
            InjectorError::Unavailable(format!("failed to connect to X server: {e}"))
        })?;

        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| {
                InjectorError::Unavailable(format!("invalid screen number {screen_num}"))
            })?;

        // Fails with UnsupportedExtension when the server has no XTEST
        conn.xtest_get_version(2, 2)
            .map_err(|e| InjectorError::Unavailable(format!("XTEST unavailable: {e}")))?
            .reply()
            .map_err(|e| InjectorError::Unavailable(format!("XTEST unavailable: {e}")))?;

        Ok(Self { conn, root })
    }

    fn keycode_for(&self, key: SimulationKey) -> Result<Keycode, InjectorError> {
        let keysym = keysym_for(key);
        let setup = self.conn.setup();
        let first = setup.min_keycode;
        let count = setup
            .max_keycode
            .saturating_sub(first)
            .saturating_add(1);

        let mapping = self
            .conn
            .get_keyboard_mapping(first, count)
            .map_err(protocol_error)?
            .reply()
            .map_err(protocol_error)?;

        let per_keycode = usize::from(mapping.keysyms_per_keycode);
        if per_keycode == 0 {
            return Err(InjectorError::UnmappedKey(key.name()));
        }

        mapping
            .keysyms
            .iter()
            .position(|sym| *sym == keysym)
            .and_then(|idx| u8::try_from(idx / per_keycode).ok())
            .and_then(|offset| first.checked_add(offset))
            .ok_or(InjectorError::UnmappedKey(key.name()))
    }

    fn fake_key(&self, event_type: u8, key: SimulationKey) -> Result<(), InjectorError> {
        let keycode = self.keycode_for(key)?;
        self.conn
            .xtest_fake_input(event_type, keycode, CURRENT_TIME, NONE, 0, 0, 0)
            .map_err(protocol_error)?;
        self.conn.flush().map_err(protocol_error)
    }
}

impl InputInjector for LinuxInjector {
    fn pointer_position(&self) -> Result<(i32, i32), InjectorError> {
        let reply = self
            .conn
            .query_pointer(self.root)
            .map_err(protocol_error)?
            .reply()
            .map_err(protocol_error)?;
        Ok((i32::from(reply.root_x), i32::from(reply.root_y)))
    }

    fn move_pointer(&self, dx: i32, dy: i32) -> Result<(), InjectorError> {
        let dx16 = i16::try_from(dx).map_err(|_| InjectorError::OutOfRange(dx))?;
        let dy16 = i16::try_from(dy).map_err(|_| InjectorError::OutOfRange(dy))?;

        // detail = 1 marks the motion as relative
        self.conn
            .xtest_fake_input(MOTION_NOTIFY_EVENT, 1, CURRENT_TIME, NONE, dx16, dy16, 0)
            .map_err(protocol_error)?;
        self.conn.flush().map_err(protocol_error)
    }

    fn key_down(&self, key: SimulationKey) -> Result<(), InjectorError> {
        self.fake_key(KEY_PRESS_EVENT, key)
    }

    fn key_up(&self, key: SimulationKey) -> Result<(), InjectorError> {
        self.fake_key(KEY_RELEASE_EVENT, key)
    }
}

/// X11 keysym for each supported key (see X11/keysymdef.h).
fn keysym_for(key: SimulationKey) -> Keysym {
    match key {
        SimulationKey::Shift => 0xffe1,
        SimulationKey::Control => 0xffe3,
        SimulationKey::Alt => 0xffe9,
        SimulationKey::Meta => 0xffeb,
        SimulationKey::CapsLock => 0xffe5,
        SimulationKey::NumLock => 0xff7f,
        SimulationKey::ScrollLock => 0xff14,
        SimulationKey::Space => 0x0020,
        SimulationKey::Enter => 0xff0d,
        SimulationKey::Tab => 0xff09,
        SimulationKey::Escape => 0xff1b,
        SimulationKey::Pause => 0xff13,
        SimulationKey::Insert => 0xff63,
        SimulationKey::Home => 0xff50,
        SimulationKey::End => 0xff57,
        SimulationKey::Left => 0xff51,
        SimulationKey::Up => 0xff52,
        SimulationKey::Right => 0xff53,
        SimulationKey::Down => 0xff54,
        SimulationKey::F1 => 0xffbe,
        SimulationKey::F2 => 0xffbf,
        SimulationKey::F3 => 0xffc0,
        SimulationKey::F4 => 0xffc1,
        SimulationKey::F5 => 0xffc2,
        SimulationKey::F6 => 0xffc3,
        SimulationKey::F7 => 0xffc4,
        SimulationKey::F8 => 0xffc5,
        SimulationKey::F9 => 0xffc6,
        SimulationKey::F10 => 0xffc7,
        SimulationKey::F11 => 0xffc8,
        SimulationKey::F12 => 0xffc9,
        SimulationKey::F13 => 0xffca,
        SimulationKey::F14 => 0xffcb,
        SimulationKey::F15 => 0xffcc,
        SimulationKey::F16 => 0xffcd,
        SimulationKey::F17 => 0xffce,
        SimulationKey::F18 => 0xffcf,
        SimulationKey::F19 => 0xffd0,
        SimulationKey::F20 => 0xffd1,
        SimulationKey::F21 => 0xffd2,
        SimulationKey::F22 => 0xffd3,
        SimulationKey::F23 => 0xffd4,
        SimulationKey::F24 => 0xffd5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_keysyms_are_contiguous() {
        for n in 1..=24u8 {
            let key: SimulationKey = format!("F{n}").parse().unwrap();
            assert_eq!(keysym_for(key), 0xffbe + u32::from(n - 1));
        }
    }

    #[test]
    fn test_shift_maps_to_left_shift() {
        assert_eq!(keysym_for(SimulationKey::Shift), 0xffe1);
    }

    #[test]
    #[ignore] // Requires X11 display with XTEST
    fn test_nudge_pointer_and_back() {
        let injector = LinuxInjector::new().unwrap();
        let (x, y) = injector.pointer_position().unwrap();
        injector.move_pointer(1, 0).unwrap();
        injector.move_pointer(-1, 0).unwrap();
        assert_eq!(injector.pointer_position().unwrap(), (x, y));
    }

    #[test]
    #[ignore] // Requires X11 display with XTEST
    fn test_shift_has_keycode() {
        let injector = LinuxInjector::new().unwrap();
        assert!(injector.keycode_for(SimulationKey::Shift).is_ok());
    }
}
