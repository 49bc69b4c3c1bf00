// ==========================================
// 海运ERP装箱单系统 - 商品仓储
// ==========================================
// 职责: 商品目录的最小访问面（装箱单校验 + 导入补建所需）
// 红线: create_or_fetch 必须依赖 sku 唯一约束实现
//       "插入、冲突则取回"，不得用先查后插（并发导入会重复建档）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::product::Product;
use crate::domain::types::CommodityType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ProductRepository - 商品仓储接口
// ==========================================
/// 自动补建器通过该接口注入，便于用假仓储模拟并发交错
pub trait ProductRepository: Send + Sync {
    /// 按 sku 查询单个商品
    fn find_by_sku(&self, sku: &str) -> RepositoryResult<Option<Product>>;

    /// 按 sku 集合批量查询（查不到的 sku 直接缺席于结果）
    fn find_by_skus(&self, skus: &[String]) -> RepositoryResult<Vec<Product>>;

    /// 插入商品；sku 已存在时取回已有记录（create-or-fetch 语义）
    ///
    /// # 返回
    /// - `Ok((Product, true))`: 本次新建
    /// - `Ok((Product, false))`: 冲突，返回已有记录
    fn create_or_fetch(&self, product: &Product) -> RepositoryResult<(Product, bool)>;
}

// ==========================================
// SqliteProductRepository - SQLite 实现
// ==========================================
pub struct SqliteProductRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteProductRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row) -> rusqlite::Result<Product> {
        let type_str: String = row.get(3)?;
        let created_at: String = row.get(8)?;
        let updated_at: String = row.get(9)?;
        Ok(Product {
            sku: row.get(0)?,
            name: row.get(1)?,
            chinese_name: row.get(2)?,
            commodity_type: CommodityType::parse(&type_str).unwrap_or(CommodityType::General),
            price: row.get(4)?,
            stock: row.get(5)?,
            is_auto_created: row.get(6)?,
            needs_completion: row.get(7)?,
            created_at: parse_timestamp(&created_at),
            updated_at: parse_timestamp(&updated_at),
        })
    }
}

const PRODUCT_COLUMNS: &str = "sku, name, chinese_name, commodity_type, price, stock, \
     is_auto_created, needs_completion, created_at, updated_at";

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl ProductRepository for SqliteProductRepository {
    fn find_by_sku(&self, sku: &str) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM product WHERE sku = ?1", PRODUCT_COLUMNS);
        match conn.query_row(&sql, params![sku], |row| Self::map_row(row)) {
            Ok(product) => Ok(Some(product)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn find_by_skus(&self, skus: &[String]) -> RepositoryResult<Vec<Product>> {
        if skus.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.get_conn()?;
        let placeholders = vec!["?"; skus.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM product WHERE sku IN ({}) ORDER BY sku",
            PRODUCT_COLUMNS, placeholders
        );
        let mut stmt = conn.prepare(&sql)?;
        let products = stmt
            .query_map(rusqlite::params_from_iter(skus.iter()), |row| {
                Self::map_row(row)
            })?
            .collect::<Result<Vec<Product>, _>>()?;
        Ok(products)
    }

    fn create_or_fetch(&self, product: &Product) -> RepositoryResult<(Product, bool)> {
        let inserted = {
            let conn = self.get_conn()?;
            // 冲突即放弃插入；随后统一取回，两个并发导入最终拿到同一条记录
            conn.execute(
                r#"
                INSERT INTO product (
                    sku, name, chinese_name, commodity_type, price, stock,
                    is_auto_created, needs_completion, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ON CONFLICT(sku) DO NOTHING
                "#,
                params![
                    product.sku,
                    product.name,
                    product.chinese_name,
                    product.commodity_type.as_str(),
                    product.price,
                    product.stock,
                    product.is_auto_created,
                    product.needs_completion,
                    product.created_at.to_rfc3339(),
                    product.updated_at.to_rfc3339(),
                ],
            )?
        };

        let stored = self.find_by_sku(&product.sku)?.ok_or_else(|| {
            RepositoryError::InternalError(format!("create_or_fetch 后商品缺失: {}", product.sku))
        })?;
        Ok((stored, inserted > 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn test_repo() -> SqliteProductRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        SqliteProductRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_create_or_fetch_creates_once() {
        let repo = test_repo();
        let p = Product::auto_created("SKU-X", Some("杯子"), CommodityType::General);

        let (first, created) = repo.create_or_fetch(&p).unwrap();
        assert!(created);
        assert_eq!(first.sku, "SKU-X");
        assert!(first.is_auto_created);

        // 二次插入（类型不同）不得覆盖已有记录
        let dup = Product::auto_created("SKU-X", None, CommodityType::Textile);
        let (second, created) = repo.create_or_fetch(&dup).unwrap();
        assert!(!created);
        assert_eq!(second.commodity_type, CommodityType::General);
        assert_eq!(second.chinese_name, "杯子");
    }

    #[test]
    fn test_find_by_skus_partial() {
        let repo = test_repo();
        repo.create_or_fetch(&Product::auto_created("A", None, CommodityType::General))
            .unwrap();
        repo.create_or_fetch(&Product::auto_created("B", None, CommodityType::Textile))
            .unwrap();

        let found = repo
            .find_by_skus(&["A".to_string(), "Z".to_string(), "B".to_string()])
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].sku, "A");
        assert_eq!(found[1].sku, "B");
    }

    #[test]
    fn test_find_by_sku_missing() {
        let repo = test_repo();
        assert!(repo.find_by_sku("NOPE").unwrap().is_none());
    }
}
