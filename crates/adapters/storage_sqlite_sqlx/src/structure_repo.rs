//! `SQLite` implementation of [`StructureRepository`].

use std::future::Future;

use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

use structura_app::ports::StructureRepository;
use structura_domain::error::StructuraError;
use structura_domain::location::Location;

use crate::error::StorageError;

/// Wrapper for converting database rows into domain types without polluting
/// domain structs with database concerns.
///
/// The `geojson` column carries geometry and the remaining properties; the
/// scalar columns are authoritative for what they index.
struct Wrapper(Location);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Location> {
        value.map(|w| w.0)
    }

    fn all(rows: Vec<Self>) -> Vec<Location> {
        rows.into_iter().map(|w| w.0).collect()
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("_id")?;
        let uuid: Option<String> = row.try_get("uuid")?;
        let parent_id: Option<String> = row.try_get("parent_id")?;
        let location_type: Option<String> = row.try_get("type")?;
        let name: Option<String> = row.try_get("name")?;
        let geojson: String = row.try_get("geojson")?;

        let mut location: Location =
            serde_json::from_str(&geojson).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        location.id = Some(id);
        location.properties.uid = uuid;
        location.properties.parent_id = parent_id;
        location.properties.location_type = location_type;
        location.properties.name = name;

        Ok(Self(location))
    }
}

const UPSERT: &str = r"
    INSERT OR REPLACE INTO structure (_id, uuid, parent_id, type, name, geojson)
    VALUES (?, ?, ?, ?, ?, ?)
";

const SELECT_BY_PARENT_ID: &str = "SELECT * FROM structure WHERE parent_id = ?";
const SELECT_BY_ID: &str = "SELECT * FROM structure WHERE _id = ?";
const SELECT_BY_UUID: &str = "SELECT * FROM structure WHERE uuid = ?";
const SELECT_BY_PARENT_AND_TYPE: &str = "SELECT * FROM structure WHERE parent_id = ? AND type = ?";
const SELECT_ALL: &str = "SELECT * FROM structure";

/// Write one structure through any executor (pool or open transaction).
async fn upsert<'e, E>(executor: E, location: &Location) -> Result<(), StructuraError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let id = location.require_id()?;
    let geojson = serde_json::to_string(location).map_err(StorageError::from)?;

    sqlx::query(UPSERT)
        .bind(id)
        .bind(location.uid())
        .bind(location.parent_id())
        .bind(location.location_type())
        .bind(location.name())
        .bind(&geojson)
        .execute(executor)
        .await
        .map_err(StorageError::from)?;

    Ok(())
}

async fn upsert_all(
    conn: &mut SqliteConnection,
    structures: &[serde_json::Value],
) -> Result<(), StructuraError> {
    for value in structures {
        let location = Location::deserialize(value).map_err(StorageError::from)?;
        upsert(&mut *conn, &location).await?;
    }
    Ok(())
}

/// Run the whole batch inside one transaction, committing only when every
/// element was written.
async fn insert_in_transaction(
    pool: &SqlitePool,
    structures: &[serde_json::Value],
) -> Result<(), StructuraError> {
    let mut tx = pool.begin().await.map_err(StorageError::from)?;

    match upsert_all(&mut tx, structures).await {
        Ok(()) => {
            tx.commit().await.map_err(StorageError::from)?;
            Ok(())
        }
        Err(err) => {
            tx.rollback().await.map_err(StorageError::from)?;
            Err(err)
        }
    }
}

async fn fetch_all(
    pool: &SqlitePool,
    sql: &str,
    key: &str,
) -> Result<Vec<Location>, StructuraError> {
    let rows: Vec<Wrapper> = sqlx::query_as(sql)
        .bind(key)
        .fetch_all(pool)
        .await
        .map_err(StorageError::from)?;

    Ok(Wrapper::all(rows))
}

async fn fetch_optional(
    pool: &SqlitePool,
    sql: &str,
    key: &str,
) -> Result<Option<Location>, StructuraError> {
    let row: Option<Wrapper> = sqlx::query_as(sql)
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(StorageError::from)?;

    Ok(Wrapper::maybe(row))
}

/// `SQLite`-backed structure repository.
pub struct SqliteStructureRepository {
    pool: SqlitePool,
}

impl SqliteStructureRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl StructureRepository for SqliteStructureRepository {
    fn add_or_update(
        &self,
        location: &Location,
    ) -> impl Future<Output = Result<(), StructuraError>> + Send {
        let pool = self.pool.clone();
        async move { upsert(&pool, location).await }
    }

    fn get_locations_by_parent_id(
        &self,
        parent_id: &str,
    ) -> impl Future<Output = Result<Vec<Location>, StructuraError>> + Send {
        let pool = self.pool.clone();
        async move { fetch_all(&pool, SELECT_BY_PARENT_ID, parent_id).await }
    }

    fn get_locations_by_parent_and_type(
        &self,
        parent_id: &str,
        location_type: &str,
    ) -> impl Future<Output = Result<Vec<Location>, StructuraError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_PARENT_AND_TYPE)
                .bind(parent_id)
                .bind(location_type)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::all(rows))
        }
    }

    fn get_location_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Location>, StructuraError>> + Send {
        let pool = self.pool.clone();
        async move { fetch_optional(&pool, SELECT_BY_ID, id).await }
    }

    fn get_location_by_uuid(
        &self,
        uuid: &str,
    ) -> impl Future<Output = Result<Option<Location>, StructuraError>> + Send {
        let pool = self.pool.clone();
        async move { fetch_optional(&pool, SELECT_BY_UUID, uuid).await }
    }

    fn get_locations_by_ids(
        &self,
        ids: &[String],
    ) -> impl Future<Output = Result<Vec<Location>, StructuraError>> + Send {
        let pool = self.pool.clone();
        async move {
            if ids.is_empty() {
                return Ok(Vec::new());
            }

            let mut builder =
                QueryBuilder::<Sqlite>::new("SELECT * FROM structure WHERE _id IN (");
            let mut separated = builder.separated(", ");
            for id in ids {
                separated.push_bind(id.as_str());
            }
            separated.push_unseparated(")");

            let rows: Vec<Wrapper> = builder
                .build_query_as()
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::all(rows))
        }
    }

    fn get_all_locations(
        &self,
    ) -> impl Future<Output = Result<Vec<Location>, StructuraError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::all(rows))
        }
    }

    fn batch_insert_structures(
        &self,
        structures: Option<&[serde_json::Value]>,
    ) -> impl Future<Output = bool> + Send {
        let pool = self.pool.clone();
        async move {
            let Some(structures) = structures.filter(|s| !s.is_empty()) else {
                return false;
            };

            match insert_in_transaction(&pool, structures).await {
                Ok(()) => {
                    tracing::debug!(count = structures.len(), "structure batch committed");
                    true
                }
                Err(err) => {
                    tracing::warn!(
                        error = ?err,
                        count = structures.len(),
                        "structure batch rolled back"
                    );
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::pool::Config;
    use structura_domain::error::ValidationError;

    const STRUCTURE_JSON: &str = r#"{
        "type": "Feature",
        "id": "90397",
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[32.5978597, -14.1699446], [32.5978956, -14.1699086], [32.5978597, -14.1699446]]]
        },
        "properties": {
            "uid": "41587456-b7c8-4c4e-b433-23a786f742fc",
            "type": "Residential Structure",
            "status": "Active",
            "parentId": "3734",
            "name": "Household 12",
            "geographicLevel": 5,
            "effectiveStartDate": "2017-01-10T0000",
            "version": 0
        },
        "serverVersion": 1542970626309
    }"#;

    const FAIL_ON_BOOM: &str = r"
        CREATE TRIGGER fail_on_boom BEFORE INSERT ON structure
        WHEN NEW._id = 'boom'
        BEGIN
            SELECT RAISE(ABORT, 'rejected by trigger');
        END
    ";

    async fn setup() -> (SqliteStructureRepository, SqlitePool) {
        let db = Config::new("sqlite::memory:").build().await.unwrap();
        let pool = db.pool().clone();
        (SqliteStructureRepository::new(pool.clone()), pool)
    }

    fn fixture() -> Location {
        serde_json::from_str(STRUCTURE_JSON).unwrap()
    }

    fn structure(id: &str, parent_id: &str, location_type: &str) -> Location {
        Location::builder()
            .id(id)
            .parent_id(parent_id)
            .location_type(location_type)
            .build()
            .unwrap()
    }

    async fn count(pool: &SqlitePool) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM structure")
            .fetch_one(pool)
            .await
            .unwrap();
        count
    }

    #[test]
    fn should_use_documented_query_text() {
        assert_eq!(SELECT_BY_PARENT_ID, "SELECT * FROM structure WHERE parent_id = ?");
        assert_eq!(SELECT_BY_ID, "SELECT * FROM structure WHERE _id = ?");
        assert_eq!(SELECT_BY_UUID, "SELECT * FROM structure WHERE uuid = ?");
    }

    #[tokio::test]
    async fn should_write_six_columns_when_adding_structure() {
        let (repo, pool) = setup().await;
        let location = fixture();

        repo.add_or_update(&location).await.unwrap();

        let row = sqlx::query("SELECT * FROM structure")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.columns().len(), 6);
        assert_eq!(row.get::<String, _>("_id"), "90397");
        assert_eq!(
            row.get::<String, _>("uuid"),
            "41587456-b7c8-4c4e-b433-23a786f742fc"
        );
        assert_eq!(row.get::<String, _>("parent_id"), "3734");
        assert_eq!(row.get::<String, _>("type"), "Residential Structure");
        assert_eq!(row.get::<String, _>("name"), "Household 12");

        let geojson: String = row.get("geojson");
        let stored: Location = serde_json::from_str(&geojson).unwrap();
        assert_eq!(stored, location);
    }

    #[tokio::test]
    async fn should_reject_structure_without_id_and_write_nothing() {
        let (repo, pool) = setup().await;

        let result = repo.add_or_update(&Location::default()).await;

        assert!(matches!(
            result,
            Err(StructuraError::Validation(ValidationError::MissingIdentifier))
        ));
        assert_eq!(count(&pool).await, 0);
    }

    #[tokio::test]
    async fn should_replace_row_when_id_already_stored() {
        let (repo, pool) = setup().await;
        let mut location = fixture();
        repo.add_or_update(&location).await.unwrap();

        location.properties.name = Some("Renamed".to_string());
        repo.add_or_update(&location).await.unwrap();

        assert_eq!(count(&pool).await, 1);
        let fetched = repo.get_location_by_id("90397").await.unwrap().unwrap();
        assert_eq!(fetched.name(), Some("Renamed"));
    }

    #[tokio::test]
    async fn should_propagate_storage_error_from_single_write() {
        let (repo, pool) = setup().await;
        sqlx::query(FAIL_ON_BOOM).execute(&pool).await.unwrap();

        let result = repo
            .add_or_update(&structure("boom", "p", "Residential Structure"))
            .await;

        assert!(matches!(result, Err(StructuraError::Storage(_))));
    }

    #[tokio::test]
    async fn should_get_locations_by_parent_id() {
        let (repo, _pool) = setup().await;
        let location = fixture();
        repo.add_or_update(&location).await.unwrap();
        repo.add_or_update(&structure("other", "9999", "Residential Structure"))
            .await
            .unwrap();

        let children = repo.get_locations_by_parent_id("3734").await.unwrap();

        assert_eq!(children.len(), 1);
        assert_eq!(children[0], location);
    }

    #[tokio::test]
    async fn should_get_location_by_id() {
        let (repo, _pool) = setup().await;
        let location = fixture();
        repo.add_or_update(&location).await.unwrap();

        let fetched = repo.get_location_by_id("90397").await.unwrap();

        assert_eq!(fetched, Some(location));
    }

    #[tokio::test]
    async fn should_get_location_by_uuid() {
        let (repo, _pool) = setup().await;
        let location = fixture();
        repo.add_or_update(&location).await.unwrap();

        let fetched = repo
            .get_location_by_uuid("41587456-b7c8-4c4e-b433-23a786f742fc")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            serde_json::to_string(&fetched).unwrap(),
            serde_json::to_string(&location).unwrap()
        );
    }

    #[tokio::test]
    async fn should_serve_lookups_from_spawned_tasks() {
        let (repo, _pool) = setup().await;
        repo.add_or_update(&fixture()).await.unwrap();
        let repo = std::sync::Arc::new(repo);

        let by_id = tokio::spawn({
            let repo = repo.clone();
            async move { repo.get_location_by_id("90397").await }
        });
        let batch = tokio::spawn({
            let repo = repo.clone();
            async move {
                let structures =
                    vec![serde_json::to_value(structure("s1", "3734", "Water Point")).unwrap()];
                repo.batch_insert_structures(Some(structures.as_slice())).await
            }
        });

        assert!(by_id.await.unwrap().unwrap().is_some());
        assert!(batch.await.unwrap());
        assert_eq!(repo.get_all_locations().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn should_return_none_when_structure_not_found() {
        let (repo, _pool) = setup().await;
        assert!(repo.get_location_by_id("missing").await.unwrap().is_none());
        assert!(repo.get_location_by_uuid("missing").await.unwrap().is_none());
        assert!(
            repo.get_locations_by_parent_id("missing")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn should_filter_children_by_type() {
        let (repo, _pool) = setup().await;
        repo.add_or_update(&structure("1", "p", "Residential Structure"))
            .await
            .unwrap();
        repo.add_or_update(&structure("2", "p", "Water Point"))
            .await
            .unwrap();
        repo.add_or_update(&structure("3", "q", "Water Point"))
            .await
            .unwrap();

        let found = repo
            .get_locations_by_parent_and_type("p", "Water Point")
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn should_get_locations_by_ids() {
        let (repo, _pool) = setup().await;
        for id in ["1", "2", "3"] {
            repo.add_or_update(&structure(id, "p", "Residential Structure"))
                .await
                .unwrap();
        }

        let mut found = repo
            .get_locations_by_ids(&["1".to_string(), "3".to_string(), "7".to_string()])
            .await
            .unwrap();
        found.sort_by(|a, b| a.id.cmp(&b.id));

        let ids: Vec<_> = found.iter().filter_map(|l| l.id.as_deref()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert!(repo.get_locations_by_ids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_list_all_locations() {
        let (repo, _pool) = setup().await;
        repo.add_or_update(&fixture()).await.unwrap();
        repo.add_or_update(&structure("2", "p", "Residential Structure"))
            .await
            .unwrap();

        assert_eq!(repo.get_all_locations().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn should_reject_missing_or_empty_batch_without_touching_storage() {
        let mut config = Config::new("sqlite::memory:");
        config.max_connections = Some(1);
        let db = config.build().await.unwrap();
        let repo = SqliteStructureRepository::new(db.pool().clone());

        // Hold the only connection: any storage access would block.
        let held = db.pool().acquire().await.unwrap();

        let none = tokio::time::timeout(
            Duration::from_millis(200),
            repo.batch_insert_structures(None),
        )
        .await;
        assert_eq!(none.ok(), Some(false));

        let empty = tokio::time::timeout(
            Duration::from_millis(200),
            repo.batch_insert_structures(Some(&[])),
        )
        .await;
        assert_eq!(empty.ok(), Some(false));

        let batch: Vec<serde_json::Value> = vec![serde_json::from_str(STRUCTURE_JSON).unwrap()];
        let blocked = tokio::time::timeout(
            Duration::from_millis(200),
            repo.batch_insert_structures(Some(batch.as_slice())),
        )
        .await;
        assert!(blocked.is_err(), "a real batch must need a connection");

        drop(held);
    }

    #[tokio::test]
    async fn should_commit_batch_when_every_structure_succeeds() {
        let (repo, pool) = setup().await;
        let batch: Vec<serde_json::Value> = vec![
            serde_json::from_str(STRUCTURE_JSON).unwrap(),
            serde_json::to_value(structure("2", "3734", "Residential Structure")).unwrap(),
        ];

        assert!(repo.batch_insert_structures(Some(batch.as_slice())).await);

        assert_eq!(count(&pool).await, 2);
        let stored = repo.get_location_by_id("90397").await.unwrap().unwrap();
        assert_eq!(stored, fixture());
    }

    #[tokio::test]
    async fn should_roll_back_batch_when_a_structure_has_no_id() {
        let (repo, pool) = setup().await;
        let batch: Vec<serde_json::Value> = vec![
            serde_json::from_str(STRUCTURE_JSON).unwrap(),
            serde_json::to_value(Location::default()).unwrap(),
        ];

        assert!(!repo.batch_insert_structures(Some(batch.as_slice())).await);
        assert_eq!(count(&pool).await, 0);
    }

    #[tokio::test]
    async fn should_roll_back_batch_when_a_structure_is_malformed() {
        let (repo, pool) = setup().await;
        let batch: Vec<serde_json::Value> = vec![
            serde_json::from_str(STRUCTURE_JSON).unwrap(),
            serde_json::json!({ "id": "2", "geometry": "not a geometry" }),
        ];

        assert!(!repo.batch_insert_structures(Some(batch.as_slice())).await);
        assert_eq!(count(&pool).await, 0);
    }

    #[tokio::test]
    async fn should_roll_back_batch_when_storage_fails() {
        let (repo, pool) = setup().await;
        sqlx::query(FAIL_ON_BOOM).execute(&pool).await.unwrap();
        let batch: Vec<serde_json::Value> = vec![
            serde_json::from_str(STRUCTURE_JSON).unwrap(),
            serde_json::to_value(structure("boom", "3734", "Residential Structure")).unwrap(),
        ];

        assert!(!repo.batch_insert_structures(Some(batch.as_slice())).await);
        assert_eq!(count(&pool).await, 0);

        // The transaction was closed, so the pool keeps working.
        repo.add_or_update(&fixture()).await.unwrap();
        assert_eq!(count(&pool).await, 1);
    }
}
