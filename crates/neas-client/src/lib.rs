//! # neas-client
//!
//! HTTP implementations of the collaborator traits in `neas-auth`, talking
//! to the hosted database-as-a-service:
//!
//! - [`HostedIdentityClient`]: `/auth/v1` identity endpoints
//! - [`HostedProfileStore`]: `/rest/v1/profiles` joined to `roles`
//! - [`ReportClient`]: the serverless PDF report function

pub mod http;
pub mod identity;
pub mod profile;
pub mod report;

pub use http::BackendHttp;
pub use identity::HostedIdentityClient;
pub use profile::HostedProfileStore;
pub use report::{ReportClient, ReportService};
