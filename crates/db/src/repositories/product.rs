use chrono::{NaiveDate, Utc};
use sqlx::Row;
use tracing::debug;

use carewise_core::domain::customer::CustomerContact;
use carewise_core::domain::location::{Coordinates, Location};
use carewise_core::domain::product::{AmcWindow, Product, ProductId, WarrantyWindow};

use super::{ProductRepository, RepositoryError, IMPORT_BATCH_SIZE};
use crate::DbPool;

const PRODUCT_COLUMNS: &str = "id, customer_name, customer_mobile, customer_email,
    notification_consent, name, brand, model, serial_number, category, purchase_date,
    warranty_type, warranty_start_date, warranty_end_date, amc_active, amc_end_date,
    next_service_due, city, pincode, lat, lon";

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode<T>(result: Result<T, sqlx::Error>) -> Result<T, RepositoryError> {
    result.map_err(|e| RepositoryError::Decode(e.to_string()))
}

fn parse_date(column: &str, value: &str) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| RepositoryError::Decode(format!("{column} `{value}`: {e}")))
}

fn parse_optional_date(column: &str, value: Option<String>) -> Result<Option<NaiveDate>, RepositoryError> {
    value.map(|value| parse_date(column, &value)).transpose()
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|date| date.format("%Y-%m-%d").to_string())
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    let id: String = decode(row.try_get("id"))?;
    let warranty_end_date: String = decode(row.try_get("warranty_end_date"))?;
    let lat: Option<f64> = decode(row.try_get("lat"))?;
    let lon: Option<f64> = decode(row.try_get("lon"))?;
    let coordinates = Coordinates::from_pair(lat, lon)
        .map_err(|e| RepositoryError::Decode(format!("product {id}: {e}")))?;

    Ok(Product {
        customer: CustomerContact {
            name: decode(row.try_get("customer_name"))?,
            mobile: decode(row.try_get("customer_mobile"))?,
            email: decode(row.try_get("customer_email"))?,
            notification_consent: decode(row.try_get("notification_consent"))?,
        },
        name: decode(row.try_get("name"))?,
        brand: decode(row.try_get("brand"))?,
        model: decode(row.try_get("model"))?,
        serial_number: decode(row.try_get("serial_number"))?,
        category: decode(row.try_get("category"))?,
        purchase_date: parse_optional_date("purchase_date", decode(row.try_get("purchase_date"))?)?,
        warranty: WarrantyWindow {
            warranty_type: decode(row.try_get("warranty_type"))?,
            start_date: parse_optional_date(
                "warranty_start_date",
                decode(row.try_get("warranty_start_date"))?,
            )?,
            end_date: parse_date("warranty_end_date", &warranty_end_date)?,
        },
        amc: AmcWindow {
            active: decode(row.try_get("amc_active"))?,
            end_date: parse_optional_date("amc_end_date", decode(row.try_get("amc_end_date"))?)?,
        },
        next_service_due: parse_optional_date(
            "next_service_due",
            decode(row.try_get("next_service_due"))?,
        )?,
        location: Location {
            city: decode(row.try_get("city"))?,
            pincode: decode(row.try_get("pincode"))?,
            coordinates,
        },
        id: ProductId(id),
    })
}

async fn insert_product(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    product: &Product,
    imported_at: &str,
) -> Result<(), RepositoryError> {
    let coordinates = product.location.coordinates;
    sqlx::query(
        "INSERT INTO product (id, customer_name, customer_mobile, customer_email,
                              notification_consent, name, brand, model, serial_number,
                              category, purchase_date, warranty_type, warranty_start_date,
                              warranty_end_date, amc_active, amc_end_date, next_service_due,
                              city, pincode, lat, lon, imported_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&product.id.0)
    .bind(&product.customer.name)
    .bind(&product.customer.mobile)
    .bind(&product.customer.email)
    .bind(product.customer.notification_consent)
    .bind(&product.name)
    .bind(&product.brand)
    .bind(&product.model)
    .bind(&product.serial_number)
    .bind(&product.category)
    .bind(format_date(product.purchase_date))
    .bind(&product.warranty.warranty_type)
    .bind(format_date(product.warranty.start_date))
    .bind(product.warranty.end_date.format("%Y-%m-%d").to_string())
    .bind(product.amc.active)
    .bind(format_date(product.amc.end_date))
    .bind(format_date(product.next_service_due))
    .bind(&product.location.city)
    .bind(&product.location.pincode)
    .bind(coordinates.map(|c| c.lat))
    .bind(coordinates.map(|c| c.lon))
    .bind(imported_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_product(r)?)),
            None => Ok(None),
        }
    }

    async fn list_for_customer(&self, mobile: &str) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE customer_mobile = ? ORDER BY id"
        ))
        .bind(mobile)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_product).collect::<Result<Vec<_>, _>>()
    }

    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> =
            sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(row_to_product).collect::<Result<Vec<_>, _>>()
    }

    async fn replace_all(&self, products: Vec<Product>) -> Result<usize, RepositoryError> {
        let imported_at = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM product").execute(&mut *tx).await?;
        tx.commit().await?;

        for (batch_index, batch) in products.chunks(IMPORT_BATCH_SIZE).enumerate() {
            let mut tx = self.pool.begin().await?;
            for product in batch {
                insert_product(&mut tx, product, &imported_at).await?;
            }
            tx.commit().await?;
            debug!(
                event_name = "db.product.import_batch",
                batch_index,
                rows = batch.len(),
                "product batch committed"
            );
        }

        Ok(products.len())
    }
}
