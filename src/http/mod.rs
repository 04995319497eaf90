//! HTTP boundary consumed by the workflow engine
//!
//! The engine only talks to the [`HttpClient`] trait. [`ReqwestClient`] is
//! the production implementation; tests substitute scripted fakes.

mod client;
mod types;

pub use client::{HttpClient, ReqwestClient};
pub use types::{HeaderSet, HttpMethod, HttpRequest, HttpResponse};
