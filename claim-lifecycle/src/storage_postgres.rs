use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Connection, FromRow, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    claim::{Claim, ClaimStatus, Lane, OutstandingClaim},
    error::{Result, SimulatorError},
    storage::ClaimStore,
};

const CREATE_QUOTES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS quotes (
        QuoteID UUID PRIMARY KEY,
        ClaimStatus INTEGER NOT NULL,
        ClaimCost INTEGER,
        Source TEXT NOT NULL,
        Name TEXT NOT NULL,
        EMail TEXT NOT NULL,
        Age INTEGER NOT NULL,
        Address TEXT NOT NULL,
        USState TEXT NOT NULL,
        LicensePlate TEXT NOT NULL,
        DescriptionOfDamage TEXT NOT NULL
    )
"#;

const SELECT_MOBILE: &str = r#"
    SELECT QuoteID, ClaimStatus FROM quotes
    WHERE Source = 'Mobile' AND ClaimStatus < 7
    ORDER BY random() LIMIT 1
"#;

const SELECT_NON_MOBILE: &str = r#"
    SELECT QuoteID, ClaimStatus FROM quotes
    WHERE Source != 'Mobile' AND ClaimStatus < 7
    ORDER BY random() LIMIT 1
"#;

#[derive(FromRow)]
struct ClaimRow {
    quote_id: Uuid,
    claim_status: i32,
    claim_cost: Option<i32>,
    source: String,
    name: String,
    email: String,
    age: i32,
    address: String,
    us_state: String,
    license_plate: String,
    description_of_damage: String,
}

impl TryFrom<ClaimRow> for Claim {
    type Error = SimulatorError;

    fn try_from(row: ClaimRow) -> Result<Self> {
        Ok(Claim {
            quote_id: row.quote_id,
            status: ClaimStatus::try_from(row.claim_status)?,
            claim_cost: row.claim_cost,
            source: row.source.parse()?,
            name: row.name,
            email: row.email,
            age: row.age,
            address: row.address,
            us_state: row.us_state,
            license_plate: row.license_plate,
            description_of_damage: row.description_of_damage,
        })
    }
}

/// PostgreSQL implementation of ClaimStore backed by the `quotes` table
pub struct PostgresClaimStore {
    pool: PgPool,
}

impl PostgresClaimStore {
    /// Connect, check the database answers a ping and make sure the
    /// `quotes` table exists.
    pub async fn connect_with(options: PgConnectOptions) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let mut conn = pool.acquire().await?;
        conn.ping().await?;
        drop(conn);
        debug!("Postgres ping succeeded");

        sqlx::query(CREATE_QUOTES_TABLE).execute(&pool).await?;
        info!("quotes table is ready");

        Ok(Self { pool })
    }
}

#[async_trait]
impl ClaimStore for PostgresClaimStore {
    async fn insert(&self, claim: &Claim) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO quotes (
                QuoteID, ClaimStatus, ClaimCost, Source, Name, EMail, Age,
                Address, USState, LicensePlate, DescriptionOfDamage)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING QuoteID
            "#,
        )
        .bind(claim.quote_id)
        .bind(i32::from(claim.status))
        .bind(claim.claim_cost)
        .bind(claim.source.as_str())
        .bind(&claim.name)
        .bind(&claim.email)
        .bind(claim.age)
        .bind(&claim.address)
        .bind(&claim.us_state)
        .bind(&claim.license_plate)
        .bind(&claim.description_of_damage)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                SimulatorError::DuplicateQuote(claim.quote_id)
            }
            other => SimulatorError::Database(other),
        })?;

        Ok(id)
    }

    async fn count_all(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn select_random_eligible(&self, lane: Lane) -> Result<Option<OutstandingClaim>> {
        let sql = match lane {
            Lane::Mobile => SELECT_MOBILE,
            Lane::NonMobile => SELECT_NON_MOBILE,
        };

        let row = sqlx::query_as::<_, (Uuid, i32)>(sql)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some((quote_id, status)) => Ok(Some(OutstandingClaim {
                quote_id,
                status: ClaimStatus::try_from(status)?,
            })),
            None => Ok(None),
        }
    }

    async fn update_status(
        &self,
        quote_id: Uuid,
        status: ClaimStatus,
        claim_cost: Option<i32>,
    ) -> Result<u64> {
        let result = match claim_cost {
            Some(cost) => {
                sqlx::query("UPDATE quotes SET ClaimStatus = $2, ClaimCost = $3 WHERE QuoteID = $1")
                    .bind(quote_id)
                    .bind(i32::from(status))
                    .bind(cost)
                    .execute(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("UPDATE quotes SET ClaimStatus = $2 WHERE QuoteID = $1")
                    .bind(quote_id)
                    .bind(i32::from(status))
                    .execute(&self.pool)
                    .await?
            }
        };

        Ok(result.rows_affected())
    }

    async fn get(&self, quote_id: Uuid) -> Result<Option<Claim>> {
        let row = sqlx::query_as::<_, ClaimRow>(
            r#"
            SELECT QuoteID AS quote_id, ClaimStatus AS claim_status, ClaimCost AS claim_cost,
                   Source AS source, Name AS name, EMail AS email, Age AS age,
                   Address AS address, USState AS us_state, LicensePlate AS license_plate,
                   DescriptionOfDamage AS description_of_damage
            FROM quotes WHERE QuoteID = $1
            "#,
        )
        .bind(quote_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Claim::try_from).transpose()
    }
}
