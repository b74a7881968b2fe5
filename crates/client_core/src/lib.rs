//! Client side of the phonebook: remote service capability, HTTP transport,
//! notification banner and the contact list controller.

pub mod controller;
pub mod error;
pub mod http;
pub mod notification;
pub mod service;

pub use controller::{
    filtered_view, matches_filter, ActionOutcome, Confirmation, ContactListController, DraftEntry,
};
pub use error::ServiceError;
pub use http::HttpPersonService;
pub use notification::{
    ClearPolicy, Notification, NotificationKind, Notifier, DEFAULT_NOTIFICATION_TTL,
};
pub use service::{MissingPersonService, PersonService, ServiceResult};
