mod apps;
mod sync;
mod validate;
mod watch;

pub use apps::Apps;
pub use sync::Sync;
pub use validate::Validate;
pub use watch::Watch;
