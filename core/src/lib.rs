//! Synchronous client for the Agave construction API.
//!
//! # Overview
//! `AgaveClient` is created once from a client id and secret and then used to
//! reach the resource clients:
//!
//! - `project_management()` for projects, RFIs, submittals, specification
//!   sections, drawings, contacts and vendors,
//! - `file_management()` for files and folders,
//! - `link()` for the Link token flow that yields account tokens.
//!
//! # Design
//! - The client is immutable after construction and performs no I/O until a
//!   resource method is called.
//! - All I/O goes through the `Transport` trait. `UreqTransport` is the
//!   default; tests swap in a recording fake.
//! - Every call makes one attempt. Non-2xx statuses become typed `Error`
//!   variants and nothing is retried.
//! - Account tokens are passed per call and validated before any request is
//!   sent.

pub mod client;
pub mod config;
pub mod error;
pub mod file_management;
pub mod http;
pub mod link;
pub mod project_management;
pub mod transport;
pub mod types;

pub use client::{parse_json, AgaveClient, ListOptions};
pub use config::ClientConfig;
pub use error::{Error, Result, TransportError, TransportErrorKind};
pub use file_management::FileManagement;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use link::Link;
pub use project_management::ProjectManagement;
pub use transport::{Transport, UreqTransport};
pub use types::{
    AccountTokenGrant, Contact, Drawing, File, Folder, LinkToken, Page, Pagination, Project, Rfi,
    SpecificationSection, Submittal, Vendor,
};
