//! `stockroom-api` — the admin action layer over HTTP.
//!
//! Exposes the inventory back-office operations (overview, adjust, bulk
//! adjust, movement history) as an axum router. Authentication/session
//! handling sits in front of this service and is not part of it.

pub mod app;
