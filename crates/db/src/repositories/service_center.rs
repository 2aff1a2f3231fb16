use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::debug;

use carewise_core::discovery::{CatalogError, CenterQuery, ServiceCenterCatalog};
use carewise_core::domain::location::Coordinates;
use carewise_core::domain::service_center::{CenterType, ServiceCenter, ServiceCenterId};

use super::{RepositoryError, ServiceCenterRepository, IMPORT_BATCH_SIZE};
use crate::DbPool;

const CENTER_COLUMNS: &str = "id, name, center_type, address, city, pincode, lat, lon, phone,
    supported_brands, supported_categories, warranty_supported, amc_supported, rating,
    last_verified_at, active";

pub struct SqlServiceCenterRepository {
    pool: DbPool,
}

impl SqlServiceCenterRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode<T>(result: Result<T, sqlx::Error>) -> Result<T, RepositoryError> {
    result.map_err(|e| RepositoryError::Decode(e.to_string()))
}

fn decode_list(column: &str, raw: &str) -> Result<Vec<String>, RepositoryError> {
    serde_json::from_str(raw).map_err(|e| RepositoryError::Decode(format!("{column}: {e}")))
}

fn encode_list(values: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(values).map_err(|e| RepositoryError::Decode(e.to_string()))
}

fn row_to_center(row: &sqlx::sqlite::SqliteRow) -> Result<ServiceCenter, RepositoryError> {
    let id: String = decode(row.try_get("id"))?;
    let center_type: String = decode(row.try_get("center_type"))?;
    let brands: String = decode(row.try_get("supported_brands"))?;
    let categories: String = decode(row.try_get("supported_categories"))?;
    let last_verified_at: Option<String> = decode(row.try_get("last_verified_at"))?;
    let lat: Option<f64> = decode(row.try_get("lat"))?;
    let lon: Option<f64> = decode(row.try_get("lon"))?;

    let coordinates = Coordinates::from_pair(lat, lon)
        .map_err(|e| RepositoryError::Decode(format!("service center {id}: {e}")))?;
    let last_verified_at = last_verified_at
        .map(|value| {
            DateTime::parse_from_rfc3339(&value)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| RepositoryError::Decode(format!("last_verified_at `{value}`: {e}")))
        })
        .transpose()?;

    Ok(ServiceCenter {
        name: decode(row.try_get("name"))?,
        center_type: CenterType::parse_lenient(&center_type),
        address: decode(row.try_get("address"))?,
        city: decode(row.try_get("city"))?,
        pincode: decode(row.try_get("pincode"))?,
        coordinates,
        phone: decode(row.try_get("phone"))?,
        supported_brands: decode_list("supported_brands", &brands)?,
        supported_categories: decode_list("supported_categories", &categories)?,
        warranty_supported: decode(row.try_get("warranty_supported"))?,
        amc_supported: decode(row.try_get("amc_supported"))?,
        rating: decode(row.try_get("rating"))?,
        last_verified_at,
        active: decode(row.try_get("active"))?,
        id: ServiceCenterId(id),
    })
}

async fn insert_center(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    center: &ServiceCenter,
    imported_at: &str,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO service_center (id, name, center_type, address, city, pincode, lat, lon,
                                     phone, supported_brands, supported_categories,
                                     warranty_supported, amc_supported, rating,
                                     last_verified_at, active, imported_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&center.id.0)
    .bind(&center.name)
    .bind(center.center_type.as_str())
    .bind(&center.address)
    .bind(&center.city)
    .bind(&center.pincode)
    .bind(center.coordinates.map(|c| c.lat))
    .bind(center.coordinates.map(|c| c.lon))
    .bind(&center.phone)
    .bind(encode_list(&center.supported_brands)?)
    .bind(encode_list(&center.supported_categories)?)
    .bind(center.warranty_supported)
    .bind(center.amc_supported)
    .bind(center.rating)
    .bind(center.last_verified_at.map(|dt| dt.to_rfc3339()))
    .bind(center.active)
    .bind(imported_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

impl SqlServiceCenterRepository {
    async fn query_active(&self, query: &CenterQuery) -> Result<Vec<ServiceCenter>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(&format!(
            "SELECT {CENTER_COLUMNS} FROM service_center
             WHERE active = 1
               AND (?1 IS NULL OR pincode = ?1)
               AND (?2 IS NULL OR city = ?2)
               AND (?3 = 0 OR warranty_supported = 1)
             ORDER BY id"
        ))
        .bind(query.pincode.as_deref())
        .bind(query.city.as_deref())
        .bind(query.warranty_supported_only)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_center).collect::<Result<Vec<_>, _>>()
    }
}

#[async_trait::async_trait]
impl ServiceCenterRepository for SqlServiceCenterRepository {
    async fn list_all(&self) -> Result<Vec<ServiceCenter>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> =
            sqlx::query(&format!("SELECT {CENTER_COLUMNS} FROM service_center ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(row_to_center).collect::<Result<Vec<_>, _>>()
    }

    async fn replace_all(&self, centers: Vec<ServiceCenter>) -> Result<usize, RepositoryError> {
        let imported_at = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM service_center").execute(&mut *tx).await?;
        tx.commit().await?;

        for (batch_index, batch) in centers.chunks(IMPORT_BATCH_SIZE).enumerate() {
            let mut tx = self.pool.begin().await?;
            for center in batch {
                insert_center(&mut tx, center, &imported_at).await?;
            }
            tx.commit().await?;
            debug!(
                event_name = "db.service_center.import_batch",
                batch_index,
                rows = batch.len(),
                "service center batch committed"
            );
        }

        Ok(centers.len())
    }
}

#[async_trait::async_trait]
impl ServiceCenterCatalog for SqlServiceCenterRepository {
    async fn find_active(&self, query: &CenterQuery) -> Result<Vec<ServiceCenter>, CatalogError> {
        Ok(self.query_active(query).await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use carewise_core::discovery::{
        CenterQuery, DiscoveryRequest, ServiceCenterCatalog, ServiceCenterDiscovery,
        WARRANTY_FALLBACK_MESSAGE,
    };
    use carewise_core::domain::location::Coordinates;
    use carewise_core::domain::service_center::{CenterType, ServiceCenter, ServiceCenterId};

    use super::SqlServiceCenterRepository;
    use crate::repositories::ServiceCenterRepository;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn sample_center(id: &str, pincode: &str, city: &str, warranty_supported: bool) -> ServiceCenter {
        ServiceCenter {
            id: ServiceCenterId(id.to_string()),
            name: format!("{city} Service Point {id}"),
            center_type: CenterType::Authorized,
            address: Some("12 MG Road".to_string()),
            city: Some(city.to_string()),
            pincode: Some(pincode.to_string()),
            coordinates: Some(Coordinates { lat: 18.94, lon: 72.83 }),
            phone: Some("022-4000-1234".to_string()),
            supported_brands: vec!["LG".to_string(), "Samsung".to_string()],
            supported_categories: vec!["Air Conditioner".to_string()],
            warranty_supported,
            amc_supported: true,
            rating: Some(4.2),
            last_verified_at: Utc.with_ymd_and_hms(2026, 9, 30, 10, 0, 0).single(),
            active: true,
        }
    }

    #[tokio::test]
    async fn replace_and_list_round_trip() {
        let repo = SqlServiceCenterRepository::new(setup().await);
        let center = sample_center("SC-1", "400001", "Mumbai", true);

        repo.replace_all(vec![center.clone()]).await.expect("replace");

        assert_eq!(repo.list_all().await.expect("list"), vec![center]);
    }

    #[tokio::test]
    async fn find_active_applies_exact_filters() {
        let repo = SqlServiceCenterRepository::new(setup().await);
        let mut inactive = sample_center("SC-4", "400001", "Mumbai", true);
        inactive.active = false;
        repo.replace_all(vec![
            sample_center("SC-1", "400001", "Mumbai", true),
            sample_center("SC-2", "400001", "Mumbai", false),
            sample_center("SC-3", "560001", "Bengaluru", true),
            inactive,
        ])
        .await
        .expect("replace");

        let by_pincode = repo
            .find_active(&CenterQuery {
                pincode: Some("400001".to_string()),
                warranty_supported_only: true,
                ..CenterQuery::default()
            })
            .await
            .expect("query");
        assert_eq!(by_pincode.len(), 1);
        assert_eq!(by_pincode[0].id.0, "SC-1");

        let by_city = repo
            .find_active(&CenterQuery { city: Some("bengaluru".to_string()), ..CenterQuery::default() })
            .await
            .expect("query");
        assert!(by_city.is_empty(), "city filter is exact in the catalog");

        let all = repo.find_active(&CenterQuery::all_active()).await.expect("query");
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn discovery_runs_against_sql_catalog() {
        let repo = SqlServiceCenterRepository::new(setup().await);
        repo.replace_all(vec![sample_center("SC-9", "400001", "Mumbai", false)])
            .await
            .expect("replace");

        let discovery = ServiceCenterDiscovery::new(repo);
        let request = DiscoveryRequest {
            pincode: Some("400001".to_string()),
            warranty_active: true,
            ..DiscoveryRequest::default()
        };
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).single().expect("timestamp");

        let result = discovery.discover(&request, now).await.expect("discover");

        assert_eq!(result.service_centers.len(), 1);
        assert_eq!(result.message.as_deref(), Some(WARRANTY_FALLBACK_MESSAGE));
    }
}
