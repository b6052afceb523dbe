pub mod event;
pub mod remote_config;
pub mod session;

pub use event::{AppInfo, Event, EventContext, EventIdentity, Properties};
pub use remote_config::RemoteConfig;
pub use session::Session;
