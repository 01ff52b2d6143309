//! # Product Repository
//!
//! Product lookup for the billing screens. Billing never edits products;
//! `insert` exists for the seed binary and imports.
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  q = "plum", category = "Cakes"                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  WHERE tenant_id = ? AND is_active = 1                                 │
//! │    AND (code LIKE '%plum%' OR description LIKE '%plum%')               │
//! │    AND category = 'Cakes'                                              │
//! │  ORDER BY category, description                                        │
//! │  LIMIT 200                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bakeline_core::validation::{
    validate_code, validate_name, validate_rate, validate_search_query, validate_tax_rate_bps,
};
use bakeline_core::Product;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const PRODUCT_COLUMNS: &str = r#"
    id, tenant_id, code, description, category, hsn_code,
    rate_paise, stock_quantity, tax_rate_bps, food_type, is_active,
    created_at, updated_at
"#;

/// Default and maximum rows returned by a search.
pub const DEFAULT_SEARCH_LIMIT: u32 = 200;

/// Filters for listing products.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    /// Matches anywhere in the code or description.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Repository for product lookups.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists active products matching `query`.
    pub async fn search(&self, tenant_id: &str, query: &ProductQuery) -> DbResult<Vec<Product>> {
        let pattern = match query.q.as_deref() {
            Some(q) => {
                let q = validate_search_query(q)?;
                (!q.is_empty()).then(|| like_pattern(&q))
            }
            None => None,
        };
        let category = query
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let limit = query
            .limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, DEFAULT_SEARCH_LIMIT);

        debug!(
            tenant_id = %tenant_id,
            pattern = ?pattern,
            category = ?category,
            limit,
            "Searching products"
        );

        let sql = format!(
            r#"
            SELECT {} FROM products
            WHERE tenant_id = ?1
              AND is_active = 1
              AND (?2 IS NULL OR code LIKE ?2 ESCAPE '\' OR description LIKE ?2 ESCAPE '\')
              AND (?3 IS NULL OR category = ?3)
            ORDER BY category, description
            LIMIT ?4
            "#,
            PRODUCT_COLUMNS
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(tenant_id)
            .bind(pattern)
            .bind(category)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    pub async fn get_by_code(&self, tenant_id: &str, code: &str) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE tenant_id = ?1 AND code = ?2",
            PRODUCT_COLUMNS
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(tenant_id)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Distinct categories of active products, alphabetically.
    pub async fn categories(&self, tenant_id: &str) -> DbResult<Vec<String>> {
        let categories: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT category FROM products WHERE tenant_id = ?1 AND is_active = 1 ORDER BY category",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    /// Inserts a product (seed and import only).
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        validate_code("code", &product.code)?;
        validate_name("description", &product.description)?;
        validate_rate(product.rate())?;
        validate_tax_rate_bps(product.tax_rate_bps)?;

        debug!(code = %product.code, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, tenant_id, code, description, category, hsn_code,
                rate_paise, stock_quantity, tax_rate_bps, food_type, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&product.id)
        .bind(&product.tenant_id)
        .bind(&product.code)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.hsn_code)
        .bind(product.rate_paise)
        .bind(product.stock_quantity)
        .bind(product.tax_rate_bps)
        .bind(product.food_type)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: product.code.clone(),
            },
            other => other,
        })?;

        Ok(())
    }

    /// Counts active products of a tenant.
    pub async fn count(&self, tenant_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE tenant_id = ?1 AND is_active = 1",
        )
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

/// `%text%` with LIKE wildcards in `text` escaped.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{product, test_db, TENANT};

    async fn seeded() -> crate::Database {
        let db = test_db().await;
        let repo = db.products();
        repo.insert(&product("PLUM-1KG", "Plum Cake 1kg", "Cakes", 60_000, 1_800))
            .await
            .unwrap();
        repo.insert(&product("BF-500", "Black Forest 500g", "Cakes", 45_000, 1_800))
            .await
            .unwrap();
        repo.insert(&product("PAV", "Ladi Pav", "Breads", 4_000, 0))
            .await
            .unwrap();
        repo.insert(&product("PUFF_VEG", "Veg Puff 100%", "Savouries", 2_500, 500))
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_search_by_text_and_category() {
        let db = seeded().await;
        let repo = db.products();

        let all = repo.search(TENANT, &ProductQuery::default()).await.unwrap();
        assert_eq!(all.len(), 4);

        let plum = repo
            .search(
                TENANT,
                &ProductQuery {
                    q: Some("plum".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(plum.len(), 1);
        assert_eq!(plum[0].code, "PLUM-1KG");

        let cakes = repo
            .search(
                TENANT,
                &ProductQuery {
                    category: Some("Cakes".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cakes.len(), 2);
        assert_eq!(cakes[0].description, "Black Forest 500g");
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let db = seeded().await;
        let found = db
            .products()
            .search(
                TENANT,
                &ProductQuery {
                    q: Some("100%".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let underscore = db
            .products()
            .search(
                TENANT,
                &ProductQuery {
                    q: Some("F_".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].code, "PUFF_VEG");
    }

    #[tokio::test]
    async fn test_get_by_code_and_categories() {
        let db = seeded().await;
        let pav = db.products().get_by_code(TENANT, "PAV").await.unwrap().unwrap();
        assert_eq!(pav.rate_paise, 4_000);
        assert_eq!(pav.tax_rate_bps, 0);

        assert!(db.products().get_by_code("tenant-b", "PAV").await.unwrap().is_none());

        let categories = db.products().categories(TENANT).await.unwrap();
        assert_eq!(categories, vec!["Breads", "Cakes", "Savouries"]);
        assert_eq!(db.products().count(TENANT).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_duplicate_code_is_rejected() {
        let db = seeded().await;
        let result = db
            .products()
            .insert(&product("PAV", "Another Pav", "Breads", 4_500, 0))
            .await;
        match result {
            Err(DbError::UniqueViolation { value, .. }) => assert_eq!(value, "PAV"),
            other => panic!("expected unique violation, got {:?}", other),
        }
    }

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern("plum"), "%plum%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
