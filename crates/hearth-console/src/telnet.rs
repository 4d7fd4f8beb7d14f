//! Telnet echo-control sequences
//!
//! The wire is a plain byte stream with no secure-input primitive, so the
//! only way to keep a typed password from being reflected back is to
//! negotiate echo suppression with the client before the password prompt.

use std::time::Duration;

/// IAC WILL ECHO: the server announces it will echo (so the client stops)
pub const IAC_WILL_ECHO: [u8; 3] = [0xFF, 0xFB, 0x01];

/// IAC DO ECHO: client acknowledgment of `IAC_WILL_ECHO`
pub const IAC_DO_ECHO: [u8; 3] = [0xFF, 0xFD, 0x01];

/// IAC WONT ECHO: the server stops echoing (so the client resumes)
pub const IAC_WONT_ECHO: [u8; 3] = [0xFF, 0xFC, 0x01];

/// IAC DONT ECHO: client acknowledgment of `IAC_WONT_ECHO`
pub const IAC_DONT_ECHO: [u8; 3] = [0xFF, 0xFE, 0x01];

/// How long to wait for the client's 3-byte acknowledgment
pub const ACK_TIMEOUT: Duration = Duration::from_secs(2);
