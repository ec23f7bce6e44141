use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::database::models::{
    CreateEquipmentInput, Equipment, EquipmentFilter, EquipmentStats, UpdateEquipmentInput,
};
use crate::handlers::shared::DEFAULT_PAGE_LIMIT;

const EQUIPMENT_COLUMNS: &str = r#"
    id,
    name,
    description,
    category,
    brand,
    model,
    serial_number,
    condition,
    is_available,
    location,
    notes,
    owner_id,
    owner_name,
    team_id,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: SqlitePool,
}

impl EquipmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &CreateEquipmentInput) -> Result<Equipment, sqlx::Error> {
        sqlx::query_as::<_, Equipment>(&format!(
            r#"
            INSERT INTO
                equipment (
                    name,
                    description,
                    category,
                    brand,
                    model,
                    serial_number,
                    condition,
                    is_available,
                    location,
                    notes,
                    owner_id,
                    owner_name,
                    team_id,
                    created_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            EQUIPMENT_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.brand)
        .bind(&input.model)
        .bind(&input.serial_number)
        .bind(input.condition)
        .bind(input.is_available.unwrap_or(true))
        .bind(&input.location)
        .bind(&input.notes)
        .bind(&input.owner_id)
        .bind(&input.owner_name)
        .bind(input.team_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Equipment>, sqlx::Error> {
        sqlx::query_as::<_, Equipment>(&format!(
            "SELECT {} FROM equipment WHERE id = ?",
            EQUIPMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_by_serial_number(
        &self,
        serial_number: &str,
    ) -> Result<Option<Equipment>, sqlx::Error> {
        sqlx::query_as::<_, Equipment>(&format!(
            "SELECT {} FROM equipment WHERE serial_number = ?",
            EQUIPMENT_COLUMNS
        ))
        .bind(serial_number)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list(&self, filter: &EquipmentFilter) -> Result<Vec<Equipment>, sqlx::Error> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM equipment WHERE 1 = 1", EQUIPMENT_COLUMNS));

        if let Some(category) = &filter.category {
            query.push(" AND category = ").push_bind(category.clone());
        }
        if filter.available_only {
            query.push(" AND is_available = 1");
        }
        if let Some(owner_id) = &filter.owner_id {
            query.push(" AND owner_id = ").push_bind(owner_id.clone());
        }

        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(filter.limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(0))
            .push(" OFFSET ")
            .push_bind(filter.skip.unwrap_or(0).max(0));

        query
            .build_query_as::<Equipment>()
            .fetch_all(&self.pool)
            .await
    }

    /// Apply a partial update. Returns `None` when the item does not exist.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateEquipmentInput,
    ) -> Result<Option<Equipment>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Equipment>(&format!(
            "SELECT {} FROM equipment WHERE id = ?",
            EQUIPMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut equipment) = existing else {
            return Ok(None);
        };
        input.apply_to(&mut equipment);

        let updated = sqlx::query_as::<_, Equipment>(&format!(
            r#"
            UPDATE
                equipment
            SET
                name = ?,
                description = ?,
                category = ?,
                brand = ?,
                model = ?,
                serial_number = ?,
                condition = ?,
                is_available = ?,
                location = ?,
                notes = ?,
                owner_id = ?,
                owner_name = ?,
                team_id = ?,
                updated_at = ?
            WHERE
                id = ?
            RETURNING {}
            "#,
            EQUIPMENT_COLUMNS
        ))
        .bind(&equipment.name)
        .bind(&equipment.description)
        .bind(&equipment.category)
        .bind(&equipment.brand)
        .bind(&equipment.model)
        .bind(&equipment.serial_number)
        .bind(equipment.condition)
        .bind(equipment.is_available)
        .bind(&equipment.location)
        .bind(&equipment.notes)
        .bind(&equipment.owner_id)
        .bind(&equipment.owner_name)
        .bind(equipment.team_id)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn stats(&self, owner_id: Option<&str>) -> Result<EquipmentStats, sqlx::Error> {
        let (total_items, available_items, categories): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN is_available THEN 1 ELSE 0 END), 0),
                COUNT(DISTINCT category)
            FROM
                equipment
            WHERE
                (? IS NULL OR owner_id = ?)
            "#,
        )
        .bind(owner_id)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(EquipmentStats {
            total_items,
            available_items,
            in_use_items: total_items - available_items,
            categories,
        })
    }

    pub async fn categories(&self) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT category FROM equipment WHERE category <> '' ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await
    }
}
