mod lifecycle;
mod screen_actor;

pub use lifecycle::{LifecycleCoordinator, LifecycleError, LifecycleEvent};
pub use screen_actor::{ScreenActor, ScreenCommand};
