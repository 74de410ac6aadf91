//! # structura-domain
//!
//! Pure domain model for the structura field data layer.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps
//! - Define **Locations** (structures such as households, as GeoJSON features)
//! - Define **Settings** (flat and structured server-delivered configuration)
//! - Define the **version rule** deciding whether a client may synchronize
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod location;
pub mod setting;
pub mod version;
