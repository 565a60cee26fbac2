//! Admin request surface
//!
//! # Modules
//!
//! - [`guard`]: anti-forgery token and capability checks
//! - [`ajax`]: `connect`, `disconnect`, `save_settings` and `debug` handlers
//! - [`diagnostics`]: the troubleshooting dump returned by `debug`

pub mod ajax;
pub mod diagnostics;
pub mod guard;

pub use ajax::{AjaxAction, AjaxRequest, AjaxResponse, HandlerError};
pub use guard::{Caller, NonceSigner, RequestGuard, SessionGuard};
