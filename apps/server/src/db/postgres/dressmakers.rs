use async_trait::async_trait;
use costura_geo::Location;
use sqlx::{postgres::PgRow, PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::map_write_error;
use crate::{
    db::{
        search::{escape_like, SearchParams},
        traits::DressmakerRepository,
    },
    error::{Error, Result},
    models::{Address, Dressmaker},
};

pub(super) const DRESSMAKER_COLUMNS: &str = "id, email, password_hash, name, contact, enabled, \
     grade, services, subscription_id, city, state, neighborhood, street, number, \
     ST_Y(location::geometry) AS latitude, ST_X(location::geometry) AS longitude, \
     created_at, updated_at";

#[derive(Clone)]
pub struct PostgresDressmakerRepository {
    pool: PgPool,
}

impl PostgresDressmakerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(super) fn dressmaker_from_row(row: &PgRow) -> Result<Dressmaker> {
    Ok(Dressmaker {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        name: row.try_get("name")?,
        contact: row.try_get("contact")?,
        enabled: row.try_get("enabled")?,
        grade: row.try_get("grade")?,
        services: row.try_get("services")?,
        subscription_id: row.try_get("subscription_id")?,
        address: Address {
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            neighborhood: row.try_get("neighborhood")?,
            street: row.try_get("street")?,
            number: row.try_get("number")?,
            location: Location::new(row.try_get("latitude")?, row.try_get("longitude")?),
        },
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn push_point<'a>(qb: &mut QueryBuilder<'a, Postgres>, center: &Location) {
    qb.push("ST_SetSRID(ST_MakePoint(")
        .push_bind(center.longitude)
        .push(", ")
        .push_bind(center.latitude)
        .push("), 4326)::geography");
}

fn push_keyword<'a>(qb: &mut QueryBuilder<'a, Postgres>, keyword: &str) {
    qb.push("EXISTS (SELECT 1 FROM unnest(services) AS tag WHERE tag ILIKE ")
        .push_bind(format!("%{}%", escape_like(keyword)))
        .push(" ESCAPE '\\')");
}

fn push_keywords<'a>(qb: &mut QueryBuilder<'a, Postgres>, keywords: &[String], joiner: &str) {
    qb.push("(");
    for (i, keyword) in keywords.iter().enumerate() {
        if i > 0 {
            qb.push(joiner);
        }
        push_keyword(qb, keyword);
    }
    qb.push(")");
}

/// Sphere distances (`use_spheroid = false`) keep results consistent with the
/// haversine filter of the document backends.
fn push_within<'a>(qb: &mut QueryBuilder<'a, Postgres>, center: &Location, radius: f64) {
    qb.push("ST_DWithin(location, ");
    push_point(qb, center);
    qb.push(", ").push_bind(radius).push(", false)");
}

fn push_order_by_distance<'a>(qb: &mut QueryBuilder<'a, Postgres>, center: &Location) {
    qb.push(" ORDER BY ST_Distance(location, ");
    push_point(qb, center);
    qb.push(", false), id");
}

/// Translate discovery parameters into one SQL statement.
pub(crate) fn build_search_query(params: &SearchParams) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {DRESSMAKER_COLUMNS} FROM dressmakers"));

    match params {
        SearchParams::Unfiltered => {
            qb.push(" ORDER BY created_at, id");
        }
        SearchParams::Keyword { keywords } => {
            qb.push(" WHERE ");
            push_keywords(&mut qb, keywords, " OR ");
            qb.push(" ORDER BY created_at, id");
        }
        SearchParams::Proximity {
            center,
            radius_meters,
        } => {
            qb.push(" WHERE ");
            push_within(&mut qb, center, *radius_meters);
            push_order_by_distance(&mut qb, center);
        }
        SearchParams::Combined {
            center,
            radius_meters,
            keywords,
        } => {
            qb.push(" WHERE ");
            push_within(&mut qb, center, *radius_meters);
            qb.push(" AND ");
            push_keywords(&mut qb, keywords, " AND ");
            push_order_by_distance(&mut qb, center);
        }
    }

    qb
}

#[async_trait]
impl DressmakerRepository for PostgresDressmakerRepository {
    async fn create(&self, dressmaker: &Dressmaker) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO dressmakers (
                id, email, password_hash, name, contact, enabled, grade, services,
                subscription_id, city, state, neighborhood, street, number,
                location, created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                ST_SetSRID(ST_MakePoint($15, $16), 4326)::geography, $17, $18
            )
            "#,
        )
        .bind(dressmaker.id)
        .bind(&dressmaker.email)
        .bind(&dressmaker.password_hash)
        .bind(&dressmaker.name)
        .bind(&dressmaker.contact)
        .bind(dressmaker.enabled)
        .bind(dressmaker.grade)
        .bind(&dressmaker.services)
        .bind(dressmaker.subscription_id)
        .bind(&dressmaker.address.city)
        .bind(&dressmaker.address.state)
        .bind(&dressmaker.address.neighborhood)
        .bind(&dressmaker.address.street)
        .bind(&dressmaker.address.number)
        .bind(dressmaker.address.location.longitude)
        .bind(dressmaker.address.location.latitude)
        .bind(dressmaker.created_at)
        .bind(dressmaker.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "dressmaker"))?;

        Ok(())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM dressmakers WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Dressmaker>> {
        let row = sqlx::query(&format!(
            "SELECT {DRESSMAKER_COLUMNS} FROM dressmakers WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(dressmaker_from_row).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Dressmaker>> {
        let row = sqlx::query(&format!(
            "SELECT {DRESSMAKER_COLUMNS} FROM dressmakers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(dressmaker_from_row).transpose()
    }

    async fn update(&self, dressmaker: &Dressmaker) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE dressmakers
            SET email = $2, password_hash = $3, name = $4, contact = $5, enabled = $6,
                grade = $7, services = $8, subscription_id = $9, city = $10, state = $11,
                neighborhood = $12, street = $13, number = $14,
                location = ST_SetSRID(ST_MakePoint($15, $16), 4326)::geography,
                updated_at = $17
            WHERE id = $1
            "#,
        )
        .bind(dressmaker.id)
        .bind(&dressmaker.email)
        .bind(&dressmaker.password_hash)
        .bind(&dressmaker.name)
        .bind(&dressmaker.contact)
        .bind(dressmaker.enabled)
        .bind(dressmaker.grade)
        .bind(&dressmaker.services)
        .bind(dressmaker.subscription_id)
        .bind(&dressmaker.address.city)
        .bind(&dressmaker.address.state)
        .bind(&dressmaker.address.neighborhood)
        .bind(&dressmaker.address.street)
        .bind(&dressmaker.address.number)
        .bind(dressmaker.address.location.longitude)
        .bind(dressmaker.address.location.latitude)
        .bind(dressmaker.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "dressmaker"))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("dressmaker"));
        }
        Ok(())
    }

    async fn search(&self, params: &SearchParams) -> Result<Vec<Dressmaker>> {
        let mut qb = build_search_query(params);
        let rows = qb.build().fetch_all(&self.pool).await?;
        tracing::debug!(mode = params.mode(), matched = rows.len(), "Postgres search");
        rows.iter().map(dressmaker_from_row).collect()
    }

    async fn distinct_services(&self) -> Result<Vec<String>> {
        let services: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT tag FROM (
                SELECT DISTINCT ON (btrim(t.tag)) btrim(t.tag) AS tag, d.created_at, d.id, t.ord
                FROM dressmakers d, unnest(d.services) WITH ORDINALITY AS t(tag, ord)
                WHERE btrim(t.tag) <> ''
                ORDER BY btrim(t.tag), d.created_at, d.id, t.ord
            ) first_seen
            ORDER BY created_at, id, ord
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(services)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfiltered_orders_by_creation() {
        let qb = build_search_query(&SearchParams::Unfiltered);
        assert!(qb.sql().ends_with("FROM dressmakers ORDER BY created_at, id"));
    }

    #[test]
    fn keyword_mode_ors_ilike_clauses() {
        let qb = build_search_query(&SearchParams::Keyword {
            keywords: vec!["costura".to_string(), "bordado".to_string()],
        });
        let sql = qb.sql();
        assert_eq!(sql.matches("ILIKE").count(), 2);
        assert!(sql.contains(") OR EXISTS"));
    }

    #[test]
    fn proximity_uses_lng_lat_point_order() {
        let qb = build_search_query(&SearchParams::Proximity {
            center: Location::new(-23.55, -46.63),
            radius_meters: 5000.0,
        });
        let sql = qb.sql();
        assert!(sql.contains("ST_DWithin(location, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3, false)"));
        assert!(sql.contains("ORDER BY ST_Distance"));
    }

    #[test]
    fn combined_ands_radius_and_every_keyword() {
        let qb = build_search_query(&SearchParams::Combined {
            center: Location::new(-23.55, -46.63),
            radius_meters: 5000.0,
            keywords: vec!["a".to_string(), "b".to_string()],
        });
        let sql = qb.sql();
        assert!(sql.contains("false) AND (EXISTS"));
        assert!(sql.contains(") AND EXISTS"));
    }
}
