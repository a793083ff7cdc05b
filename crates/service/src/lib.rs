//! Service layer for account records.
//! - `user_record` reads and creates rows through a repository seam.
//! - `remote` is the pass-through to the hosted data API.
//! - Errors are collapsed into `ServiceError`; store and remote failures carry the raw message.

pub mod errors;
pub mod remote;
pub mod user_record;
#[cfg(test)]
pub mod test_support;
