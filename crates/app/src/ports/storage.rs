//! Storage port — repository traits for persistence.

use std::future::Future;

use structura_domain::error::StructuraError;
use structura_domain::location::Location;
use structura_domain::setting::Setting;

/// Repository for persisting and querying structures.
///
/// Structures are keyed by their server identifier (`Location::id`) and are
/// never deleted through this port.
pub trait StructureRepository {
    /// Insert the structure, or replace the stored one with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`StructuraError::Validation`] without writing anything when
    /// the identifier is missing, or a storage error from the write.
    fn add_or_update(
        &self,
        location: &Location,
    ) -> impl Future<Output = Result<(), StructuraError>> + Send;

    /// All structures whose parent is `parent_id`.
    fn get_locations_by_parent_id(
        &self,
        parent_id: &str,
    ) -> impl Future<Output = Result<Vec<Location>, StructuraError>> + Send;

    /// All structures with the given parent and structure type.
    fn get_locations_by_parent_and_type(
        &self,
        parent_id: &str,
        location_type: &str,
    ) -> impl Future<Output = Result<Vec<Location>, StructuraError>> + Send;

    /// The structure with the given server identifier.
    fn get_location_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Location>, StructuraError>> + Send;

    /// The structure with the given client UUID.
    fn get_location_by_uuid(
        &self,
        uuid: &str,
    ) -> impl Future<Output = Result<Option<Location>, StructuraError>> + Send;

    /// Structures matching any of `ids`, in storage order.
    fn get_locations_by_ids(
        &self,
        ids: &[String],
    ) -> impl Future<Output = Result<Vec<Location>, StructuraError>> + Send;

    /// Every stored structure.
    fn get_all_locations(
        &self,
    ) -> impl Future<Output = Result<Vec<Location>, StructuraError>> + Send;

    /// Upsert every serialized structure atomically.
    ///
    /// Returns `false` without touching storage when `structures` is `None`
    /// or empty. Otherwise returns `true` only if every element was stored;
    /// on any failure nothing is stored and `false` is returned.
    fn batch_insert_structures(
        &self,
        structures: Option<&[serde_json::Value]>,
    ) -> impl Future<Output = bool> + Send;
}

/// Repository for server-delivered settings.
pub trait SettingsRepository {
    /// The structured setting stored under `identifier`.
    fn get_setting(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<Option<Setting>, StructuraError>> + Send;

    /// The flat value stored under `key`.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StructuraError>> + Send;

    /// Store a flat value under `key`, replacing any previous one.
    fn put(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), StructuraError>> + Send;

    /// Store a structured setting, replacing any previous one with the same identifier.
    fn put_setting(
        &self,
        setting: &Setting,
    ) -> impl Future<Output = Result<(), StructuraError>> + Send;
}
