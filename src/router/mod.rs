mod callbacks;
mod errors;
mod guards;
mod navigation;
mod options;
mod service;

pub use callbacks::{Callbacks, RemoveFn};
pub use errors::{
    NavigationError, NavigationFailure, NavigationFailureType, NavigationResult,
    is_navigation_failure,
};
pub use guards::{
    AfterEachHook, EnterCallback, ErrorHandler, GuardFault, GuardOutcome, NavigationGuard, Next,
};
pub use options::{RouterConfigError, RouterOptions, RouterOptionsBuilder};
pub use service::Router;
