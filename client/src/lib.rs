//! Client-side core of the REMEAL reservation flow.
//!
//! [`ReservationClient`] talks to the backend, [`ReservationLifecycleManager`]
//! enforces the reservation state machine on top of it, and the list view and
//! rating prompt are the two surfaces that drive the manager.

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod lifecycle;
pub mod list_view;
pub mod notice;
pub mod rating;


pub use api::{Endpoint, ReservationApi, ReservationClient};
pub use config::{ClientConfig, Session, SessionStore};
pub use context::RequestContext;
pub use error::{ApiError, ConfigError, NetworkError, ReservationError};
pub use lifecycle::{Delivery, ReservationLifecycleManager};
pub use list_view::{ReservationListView, ReservationRow};
pub use rating::{Feedback, RatingPrompt};
