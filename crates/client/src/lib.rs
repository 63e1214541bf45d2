//! HTTP clients for the BPM backend endpoints the overlay consumes.
//!
//! - [`DiagramSourceClient`]: `GET {base}/diagram/{processId}`.
//! - [`CaseStatusClient`]: `GET {base}/caseInfo/{instanceId}`.
//!
//! Both wrap a shared [`BpmApi`] so they reuse one [`reqwest::Client`]
//! connection pool.

pub mod api;
pub mod case_status;
pub mod diagram;

pub use api::BpmApi;
pub use case_status::CaseStatusClient;
pub use diagram::DiagramSourceClient;
