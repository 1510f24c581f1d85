// Core modules implementing error modeling, host capabilities, and device state.
pub mod device;
pub mod env;
pub mod error;
