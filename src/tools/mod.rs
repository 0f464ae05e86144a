//! Typed argument structs for the external tools.
//!
//! One module per tool area:
//! - `domain` — samba-tool domain operations (provision, join, keytab export)
//!   and the samba build diagnostic dump
//! - `user` — samba-tool user operations
//! - `auth` — Kerberos ticket acquisition
//! - `service` — systemctl unit control
//! - `host` — hostname and resolver cache plumbing

pub mod auth;
pub mod domain;
pub mod host;
pub mod service;
pub mod user;
