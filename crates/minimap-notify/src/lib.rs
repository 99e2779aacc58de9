pub mod category;
pub mod dispatcher;
pub mod error;
pub mod neynar;

pub use category::{NotificationContent, NotifyCategory};
pub use dispatcher::{Delivery, MAX_ATTEMPTS, send_with_retry};
pub use error::NotifyError;
pub use neynar::{NeynarClient, NotificationSink};
