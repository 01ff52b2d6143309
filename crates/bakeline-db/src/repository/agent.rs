//! # Agent Repository
//!
//! Sales agents credited on orders, numbered AGT0001, AGT0002, ...

use bakeline_core::sequence::CodeSeries;
use bakeline_core::validation::validate_agent_input;
use bakeline_core::{Agent, AgentInput};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::{begin_write, clean, sequence};
use crate::error::DbResult;

const AGENT_COLUMNS: &str =
    "id, tenant_id, code, name, phone, commission_bps, is_active, created_at, updated_at";

/// Repository for sales agents.
#[derive(Debug, Clone)]
pub struct AgentRepository {
    pool: SqlitePool,
}

impl AgentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AgentRepository { pool }
    }

    pub async fn create(&self, tenant_id: &str, input: &AgentInput) -> DbResult<Agent> {
        validate_agent_input(input)?;

        let mut tx = begin_write(&self.pool).await?;
        let code = sequence::allocate(&mut tx, tenant_id, CodeSeries::Agent).await?;
        let now = Utc::now();

        let agent = Agent {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            code,
            name: input.name.trim().to_string(),
            phone: clean(&input.phone),
            commission_bps: input.commission_bps,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO agents (
                id, tenant_id, code, name, phone,
                commission_bps, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&agent.id)
        .bind(&agent.tenant_id)
        .bind(&agent.code)
        .bind(&agent.name)
        .bind(&agent.phone)
        .bind(agent.commission_bps)
        .bind(agent.is_active)
        .bind(agent.created_at)
        .bind(agent.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(tenant_id = %tenant_id, code = %agent.code, "Created agent");
        Ok(agent)
    }

    /// Lists active agents in code order.
    pub async fn list(&self, tenant_id: &str) -> DbResult<Vec<Agent>> {
        let sql = format!(
            "SELECT {} FROM agents WHERE tenant_id = ?1 AND is_active = 1 ORDER BY code",
            AGENT_COLUMNS
        );
        let agents = sqlx::query_as::<_, Agent>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(agents)
    }

    pub async fn get_by_code(&self, tenant_id: &str, code: &str) -> DbResult<Option<Agent>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_code(&mut conn, tenant_id, code).await
    }
}

pub(crate) async fn fetch_by_code(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    code: &str,
) -> DbResult<Option<Agent>> {
    let sql = format!(
        "SELECT {} FROM agents WHERE tenant_id = ?1 AND code = ?2",
        AGENT_COLUMNS
    );
    let agent = sqlx::query_as::<_, Agent>(&sql)
        .bind(tenant_id)
        .bind(code)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(agent)
}
