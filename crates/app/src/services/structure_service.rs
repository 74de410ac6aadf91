//! Structure service — use-cases for saving, importing, and looking up structures.

use structura_domain::error::{NotFoundError, StructuraError};
use structura_domain::location::Location;

use crate::ports::StructureRepository;

/// Application service over a [`StructureRepository`].
pub struct StructureService<R> {
    repo: R,
}

impl<R: StructureRepository> StructureService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Save a structure, replacing any stored one with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`StructuraError::Validation`] if the id is missing, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, location), fields(structure_id = ?location.id))]
    pub async fn save_structure(&self, location: Location) -> Result<Location, StructuraError> {
        location.validate()?;
        self.repo.add_or_update(&location).await?;
        Ok(location)
    }

    /// Import serialized structures in a single all-or-nothing batch.
    ///
    /// Returns whether the batch was stored. `None` and empty input are
    /// rejected without touching storage.
    #[tracing::instrument(skip_all, fields(count = structures.map_or(0, <[_]>::len)))]
    pub async fn import_structures(&self, structures: Option<&[serde_json::Value]>) -> bool {
        let imported = self.repo.batch_insert_structures(structures).await;
        if imported {
            tracing::info!("structures imported");
        } else {
            tracing::warn!("structure import rejected");
        }
        imported
    }

    /// Look up a structure by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`StructuraError::NotFound`] when no structure with `id`
    /// exists, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_structure(&self, id: &str) -> Result<Location, StructuraError> {
        self.repo.get_location_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Structure",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Look up a structure by its client UUID, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`StructuraError::NotFound`] when no structure carries `uuid`,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_uuid(&self, uuid: &str) -> Result<Location, StructuraError> {
        self.repo.get_location_by_uuid(uuid).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Structure",
                id: uuid.to_string(),
            }
            .into()
        })
    }

    /// List the structures under `parent_id`, optionally narrowed to one type.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn children_of(
        &self,
        parent_id: &str,
        location_type: Option<&str>,
    ) -> Result<Vec<Location>, StructuraError> {
        match location_type {
            Some(location_type) => {
                self.repo
                    .get_locations_by_parent_and_type(parent_id, location_type)
                    .await
            }
            None => self.repo.get_locations_by_parent_id(parent_id).await,
        }
    }

    /// Fetch every structure whose id is in `ids`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn get_structures(&self, ids: &[String]) -> Result<Vec<Location>, StructuraError> {
        self.repo.get_locations_by_ids(ids).await
    }

    /// List all structures.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn list_structures(&self) -> Result<Vec<Location>, StructuraError> {
        self.repo.get_all_locations().await
    }
}
