//! # neas-entity
//!
//! Domain models for the NEAS console. Sessions and auth users mirror what
//! the hosted identity service returns; profile rows mirror the joined
//! `profiles`/`roles` query; report requests mirror the document service's
//! JSON body. Every struct derives `Debug`, `Clone`, `Serialize` and
//! `Deserialize` unless it carries secrets.

pub mod report;
pub mod session;
pub mod user;
