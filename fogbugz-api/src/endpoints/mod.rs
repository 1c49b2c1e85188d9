//! # FogBugz API Endpoints
//!
//! Session setup (`logon`, `listPeople`) and the case commands the importer
//! replays.

pub mod cases;
pub mod session;
