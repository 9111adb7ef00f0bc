#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the garnet package manager
//!
//! This crate provides the fundamental types shared across the system:
//! package identities, version constraints, plan actions, request kinds
//! and the manifest fields the apply engine consults.

pub mod action;
pub mod manifest;
pub mod package;
pub mod request;
pub mod version;

// Re-export commonly used types
pub use action::{Action, ActionKind};
pub use manifest::{Depext, EnvOp, EnvUpdate, Filter, Manifest, PostMessage};
pub use package::{name_eq_ignore_case, PackageId, PackageSpec};
pub use request::{Request, RequestKind};
pub use semver::Version;
pub use version::{VersionConstraint, VersionSpec};
