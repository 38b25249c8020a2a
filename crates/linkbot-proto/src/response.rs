//! Numeric reply codes the client reacts to.
//!
//! Only the numerics that drive the registration state machine are named;
//! everything else arrives as an opaque [`crate::Command::Response`].

/// `001` - registration completed, server welcome.
pub const RPL_WELCOME: u16 = 1;

/// `433` - the requested nickname is already in use.
pub const ERR_NICKNAMEINUSE: u16 = 433;

/// `436` - nickname collision KILL from another server.
pub const ERR_NICKCOLLISION: u16 = 436;
