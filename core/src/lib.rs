//! Client core for the cliente registry API.
//!
//! # Overview
//! Lists, creates, edits, and deletes cliente records held by a remote REST
//! backend under `/Clientes`.
//!
//! # Design
//! - `ApiClient` is the transport wrapper: base URL, default headers, bearer
//!   token from an explicit `Session`, and status-class logging. Actual I/O
//!   goes through the `Transport` trait (`UreqTransport` in production).
//! - `ClienteService` validates and normalizes input locally, then maps it to
//!   the wire payload. Lookups without a backend endpoint scan the full list.
//! - `ClienteListView` is a synchronous state machine over the list and a
//!   single edit buffer. It talks to its host through the `Ui` trait and
//!   reloads the list after every successful mutation.
//! - Everything runs on the caller's thread; calls inside one action are
//!   sequential and nothing is retried.

pub mod api;
pub mod error;
pub mod format;
pub mod http;
pub mod sample;
pub mod service;
pub mod session;
pub mod transport;
pub mod types;
pub mod view;

pub use api::ApiClient;
pub use error::{ApiError, StatusClass, ValidationError};
pub use format::{date_for_transport, format_cpf, format_date_display, normalize_cpf, DateInput};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use service::ClienteService;
pub use session::{LogNavigator, Navigator, Session, TokenStore};
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{Cliente, ClienteFilter, ClienteInput, ClienteStatus, LegacyClienteInput};
pub use view::{Alert, ClienteListView, EditBuffer, Ui, ViewState};
