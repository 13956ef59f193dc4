#![warn(clippy::all, clippy::pedantic, clippy::cargo, clippy::nursery)]

//! Receives `POST /checkout`, fans out to the Fraud, Transaction, and
//! Suggestions services in parallel, and enqueues accepted orders
//! (`SPEC_FULL.md` §4.1).

mod app;
mod domain;
mod error;
mod http;

pub use app::{App, CheckoutResponse};
pub use domain::{BillingAddressFields, CreditCardFields, ItemFields, OrderRequest, UserFields};
pub use error::Error;
pub use http::serve;
