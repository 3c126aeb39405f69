//! USB HID Usage IDs (page 0x07, Keyboard/Keypad page) as [`Keycode`] constants.
//!
//! Basic keycodes are the HID usage itself, so `KC_A` is `0x0004`.
//!
//! # What is a HID Usage ID? (for beginners)
//!
//! The **USB Human Interface Device (HID)** standard assigns a unique number to
//! every key on a keyboard.  HID codes represent **physical key positions**,
//! not characters: the character a key produces depends on the host's layout
//! and the modifiers held down.  Entries stored on the keyboard therefore
//! name positions, and the same configuration works for QWERTY and AZERTY
//! hosts alike.
//!
//! Only the codes used by built-in tests and host diagnostics are named here;
//! any other 16-bit value is still a valid [`Keycode`].

use super::Keycode;

// Letters (HID 0x04–0x1D)
pub const KC_A: Keycode = Keycode(0x04);
pub const KC_B: Keycode = Keycode(0x05);
pub const KC_C: Keycode = Keycode(0x06);
pub const KC_D: Keycode = Keycode(0x07);
pub const KC_E: Keycode = Keycode(0x08);
pub const KC_F: Keycode = Keycode(0x09);
pub const KC_G: Keycode = Keycode(0x0A);
pub const KC_H: Keycode = Keycode(0x0B);
pub const KC_I: Keycode = Keycode(0x0C);
pub const KC_J: Keycode = Keycode(0x0D);
pub const KC_K: Keycode = Keycode(0x0E);
pub const KC_L: Keycode = Keycode(0x0F);
pub const KC_M: Keycode = Keycode(0x10);
pub const KC_N: Keycode = Keycode(0x11);
pub const KC_O: Keycode = Keycode(0x12);
pub const KC_P: Keycode = Keycode(0x13);
pub const KC_Q: Keycode = Keycode(0x14);
pub const KC_R: Keycode = Keycode(0x15);
pub const KC_S: Keycode = Keycode(0x16);
pub const KC_T: Keycode = Keycode(0x17);
pub const KC_U: Keycode = Keycode(0x18);
pub const KC_V: Keycode = Keycode(0x19);
pub const KC_W: Keycode = Keycode(0x1A);
pub const KC_X: Keycode = Keycode(0x1B);
pub const KC_Y: Keycode = Keycode(0x1C);
pub const KC_Z: Keycode = Keycode(0x1D);

// Digits (HID 0x1E–0x27)
pub const KC_1: Keycode = Keycode(0x1E);
pub const KC_2: Keycode = Keycode(0x1F);
pub const KC_3: Keycode = Keycode(0x20);
pub const KC_4: Keycode = Keycode(0x21);
pub const KC_5: Keycode = Keycode(0x22);
pub const KC_6: Keycode = Keycode(0x23);
pub const KC_7: Keycode = Keycode(0x24);
pub const KC_8: Keycode = Keycode(0x25);
pub const KC_9: Keycode = Keycode(0x26);
pub const KC_0: Keycode = Keycode(0x27);

// Control keys (HID 0x28–0x38)
pub const KC_ENTER: Keycode = Keycode(0x28);
pub const KC_ESCAPE: Keycode = Keycode(0x29);
pub const KC_BACKSPACE: Keycode = Keycode(0x2A);
pub const KC_TAB: Keycode = Keycode(0x2B);
pub const KC_SPACE: Keycode = Keycode(0x2C);
pub const KC_MINUS: Keycode = Keycode(0x2D);
pub const KC_EQUAL: Keycode = Keycode(0x2E);
pub const KC_LEFT_BRACKET: Keycode = Keycode(0x2F);
pub const KC_RIGHT_BRACKET: Keycode = Keycode(0x30);
pub const KC_BACKSLASH: Keycode = Keycode(0x31);
pub const KC_SEMICOLON: Keycode = Keycode(0x33);
pub const KC_QUOTE: Keycode = Keycode(0x34);
pub const KC_GRAVE: Keycode = Keycode(0x35);
pub const KC_COMMA: Keycode = Keycode(0x36);
pub const KC_DOT: Keycode = Keycode(0x37);
pub const KC_SLASH: Keycode = Keycode(0x38);
pub const KC_CAPS_LOCK: Keycode = Keycode(0x39);

// Function keys (HID 0x3A–0x45)
pub const KC_F1: Keycode = Keycode(0x3A);
pub const KC_F2: Keycode = Keycode(0x3B);
pub const KC_F3: Keycode = Keycode(0x3C);
pub const KC_F4: Keycode = Keycode(0x3D);
pub const KC_F5: Keycode = Keycode(0x3E);
pub const KC_F6: Keycode = Keycode(0x3F);
pub const KC_F7: Keycode = Keycode(0x40);
pub const KC_F8: Keycode = Keycode(0x41);
pub const KC_F9: Keycode = Keycode(0x42);
pub const KC_F10: Keycode = Keycode(0x43);
pub const KC_F11: Keycode = Keycode(0x44);
pub const KC_F12: Keycode = Keycode(0x45);

// Navigation cluster (HID 0x49–0x52)
pub const KC_INSERT: Keycode = Keycode(0x49);
pub const KC_HOME: Keycode = Keycode(0x4A);
pub const KC_PAGE_UP: Keycode = Keycode(0x4B);
pub const KC_DELETE: Keycode = Keycode(0x4C);
pub const KC_END: Keycode = Keycode(0x4D);
pub const KC_PAGE_DOWN: Keycode = Keycode(0x4E);
pub const KC_RIGHT: Keycode = Keycode(0x4F);
pub const KC_LEFT: Keycode = Keycode(0x50);
pub const KC_DOWN: Keycode = Keycode(0x51);
pub const KC_UP: Keycode = Keycode(0x52);

// Modifier keys (HID 0xE0–0xE7)
pub const KC_LEFT_CTRL: Keycode = Keycode(0xE0);
pub const KC_LEFT_SHIFT: Keycode = Keycode(0xE1);
pub const KC_LEFT_ALT: Keycode = Keycode(0xE2);
pub const KC_LEFT_GUI: Keycode = Keycode(0xE3);
pub const KC_RIGHT_CTRL: Keycode = Keycode(0xE4);
pub const KC_RIGHT_SHIFT: Keycode = Keycode(0xE5);
pub const KC_RIGHT_ALT: Keycode = Keycode(0xE6);
pub const KC_RIGHT_GUI: Keycode = Keycode(0xE7);
