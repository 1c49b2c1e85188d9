//! # FogBugz Import CLI Library
//!
//! Command line handling, the CSV row source, the per-file command
//! translator and the concurrent multi-file importer behind the
//! `fogbugz-import` binary.

pub mod cli;
pub mod importer;
pub mod rows;
pub mod translator;
