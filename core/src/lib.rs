//! Blocking client for the Raindrop.io bookmark REST API.
//!
//! # Overview
//! `RaindropClient` turns typed resource models into authenticated
//! `HttpRequest` values and sends them through a `Transport`. The outcome of
//! each call comes back as an `OperationResponse` that the caller consumes
//! once, either with a callback over the raw body or as decoded JSON.
//!
//! # Design
//! - `build_*` methods are pure, so routes, headers, and bodies are testable
//!   without a server; the executing methods only add the transport call.
//! - The client never inspects status codes or retries.
//! - Models omit empty fields on the wire and keep the service's exact key
//!   names.

pub mod client;
pub mod error;
pub mod filter;
pub mod http;
pub mod response;
pub mod types;

pub use client::{Credential, RaindropClient, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use filter::Filter;
pub use http::{default_agent, HttpMethod, HttpRequest, HttpResponse, Transport};
pub use response::OperationResponse;
pub use types::{
    BulkUpdate, Collaborator, Collection, CollectionAccess, CollectionRef, Highlight, IdList,
    IdRef, ItemResponse, ItemsResponse, LinkBody, Media, Raindrop, RaindropList, Reminder,
    ResultResponse, Suggestions, UserRef,
};
