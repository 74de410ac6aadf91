//! # structura-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `StructureRepository` — upsert, lookups, and transactional batch import of structures
//!   - `SettingsRepository` — flat and structured settings lookup
//!   - `VersionCodeProvider` — installed client version from the host platform
//! - Define **driving/inbound ports** as use-case structs:
//!   - `StructureService` — save, import, look up structures
//!   - `SyncVersionGate` — decide whether the client may synchronize
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `structura-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
