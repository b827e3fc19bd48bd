//! Host-agnostic controller for the crawler control page.
//!
//! The page is written against four small platform seams: [`Dom`], [`Console`],
//! [`Transport`] and [`LogSocket`]. The browser build (`crawler_web`) implements
//! them with `web-sys`; the [`testing`] module implements them in memory so the
//! whole page can be exercised on the host.

pub mod config;
pub mod dom;
pub mod error;
pub mod http;
pub mod page;
pub mod socket;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{BodyEncoding, ClientConfig};
pub use dom::{AttrTarget, AttrValue, Child, Dom, ElementSpec, Handler};
pub use error::ClientError;
pub use http::{
    deliver_on_success, is_success_status, trigger_body, Transport, TriggerRequest, TRIGGER_METHOD,
};
pub use page::{Console, Page};
pub use socket::{LiveLog, LogSocket, SocketEvent, SocketState};
