// ==========================================
// 海运ERP装箱单系统 - 装箱单仓储
// ==========================================
// 职责: 装箱单聚合的事务性持久化与重组
// 红线: 一单的 packing_list/box_spec/packing_item/box_quantity
//       必须在同一事务内落库——明细插入中途失败不得留下有箱无货的残单
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::packing_list::{
    BoxQuantity, BoxSpecification, PackingList, PackingListItem,
};
use crate::domain::types::{CommodityType, ListStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

// ==========================================
// 查询参数与分页
// ==========================================
/// 装箱单列表查询条件（全部可选，叠加过滤）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackingListQuery {
    pub store_name: Option<String>, // 子串匹配
    pub commodity_type: Option<CommodityType>,
    pub status: Option<ListStatus>,
    pub start_date: Option<DateTime<Utc>>, // created_at >=
    pub end_date: Option<DateTime<Utc>>,   // created_at <=
    pub page: Option<u32>,                 // 1 基，默认 1
    pub page_size: Option<u32>,            // 默认 10
}

/// 分页查询结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackingListPage {
    pub items: Vec<PackingList>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

// ==========================================
// PackingListRepository - 装箱单仓储
// ==========================================
pub struct PackingListRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PackingListRepository {
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

    /// 保存装箱单聚合（整单一个事务）
    ///
    /// # 返回
    /// - `Ok(list_id)`: 成功
    /// - `Err`: 任何一步失败整单回滚
    pub fn save(&self, list: &PackingList) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            r#"INSERT INTO packing_list (
                list_id, store_name, commodity_type, status,
                total_boxes, total_weight, total_volume, total_edge_volume,
                total_pieces, total_value, remarks, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"#,
            params![
                list.list_id,
                list.store_name,
                list.commodity_type.as_str(),
                list.status.as_str(),
                list.total_boxes,
                list.total_weight,
                list.total_volume,
                list.total_edge_volume,
                list.total_pieces,
                list.total_value,
                list.remarks,
                list.created_at.to_rfc3339(),
                list.updated_at.to_rfc3339(),
            ],
        )?;

        for (slot_index, spec) in list.box_specifications.iter().enumerate() {
            tx.execute(
                r#"INSERT INTO box_spec (
                    list_id, slot_index, box_no, length, width, height,
                    weight, volume, edge_volume, piece_capacity
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
                params![
                    list.list_id,
                    slot_index as i64,
                    spec.box_no,
                    spec.length,
                    spec.width,
                    spec.height,
                    spec.weight,
                    spec.volume,
                    spec.edge_volume,
                    spec.piece_capacity,
                ],
            )?;
        }

        for (item_index, item) in list.items.iter().enumerate() {
            tx.execute(
                r#"INSERT INTO packing_item (
                    list_id, item_index, sku, display_name, total_quantity
                ) VALUES (?1, ?2, ?3, ?4, ?5)"#,
                params![
                    list.list_id,
                    item_index as i64,
                    item.sku,
                    item.display_name,
                    item.total_quantity,
                ],
            )?;
            let item_id = tx.last_insert_rowid();

            for bq in &item.box_quantities {
                tx.execute(
                    r#"INSERT INTO box_quantity (
                        item_id, box_no, quantity,
                        snap_length, snap_width, snap_height, snap_weight,
                        snap_volume, snap_edge_volume, snap_piece_capacity
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
                    params![
                        item_id,
                        bq.box_no,
                        bq.quantity,
                        bq.spec.length,
                        bq.spec.width,
                        bq.spec.height,
                        bq.spec.weight,
                        bq.spec.volume,
                        bq.spec.edge_volume,
                        bq.spec.piece_capacity,
                    ],
                )?;
            }
        }

        tx.commit()?;
        tracing::info!(list_id = %list.list_id, store = %list.store_name, "装箱单已保存");
        Ok(list.list_id.clone())
    }

    /// 按 list_id 查询装箱单（含全部子实体）
    pub fn find_by_id(&self, list_id: &str) -> RepositoryResult<Option<PackingList>> {
        let conn = self.get_conn()?;
        Self::load_aggregate(&conn, list_id)
    }

    /// 分页查询装箱单（含子实体），created_at 降序
    pub fn list(&self, query: &PackingListQuery) -> RepositoryResult<PackingListPage> {
        let conn = self.get_conn()?;

        let mut where_clauses: Vec<String> = Vec::new();
        let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(store) = &query.store_name {
            where_clauses.push("store_name LIKE ?".to_string());
            args.push(Box::new(format!("%{}%", store)));
        }
        if let Some(t) = query.commodity_type {
            where_clauses.push("commodity_type = ?".to_string());
            args.push(Box::new(t.as_str().to_string()));
        }
        if let Some(s) = query.status {
            where_clauses.push("status = ?".to_string());
            args.push(Box::new(s.as_str().to_string()));
        }
        if let Some(start) = query.start_date {
            where_clauses.push("created_at >= ?".to_string());
            args.push(Box::new(start.to_rfc3339()));
        }
        if let Some(end) = query.end_date {
            where_clauses.push("created_at <= ?".to_string());
            args.push(Box::new(end.to_rfc3339()));
        }

        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clauses.join(" AND "))
        };

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM packing_list{}", where_sql),
            rusqlite::params_from_iter(args.iter().map(|a| a.as_ref())),
            |row| row.get(0),
        )?;

        let page = query.page.unwrap_or(1).max(1);
        let page_size = query.page_size.unwrap_or(10).max(1);
        let offset = (page - 1) as i64 * page_size as i64;

        let sql = format!(
            "SELECT list_id FROM packing_list{} ORDER BY created_at DESC LIMIT {} OFFSET {}",
            where_sql, page_size, offset
        );
        let mut stmt = conn.prepare(&sql)?;
        let ids = stmt
            .query_map(
                rusqlite::params_from_iter(args.iter().map(|a| a.as_ref())),
                |row| row.get::<_, String>(0),
            )?
            .collect::<Result<Vec<String>, _>>()?;

        let mut items = Vec::with_capacity(ids.len());
        for id in &ids {
            if let Some(list) = Self::load_aggregate(&conn, id)? {
                items.push(list);
            }
        }

        Ok(PackingListPage {
            items,
            total,
            page,
            page_size,
        })
    }

    /// 状态更新（仅允许 pending → approved）
    pub fn update_status(&self, list_id: &str, status: ListStatus) -> RepositoryResult<PackingList> {
        let conn = self.get_conn()?;

        let current: String = conn
            .query_row(
                "SELECT status FROM packing_list WHERE list_id = ?1",
                params![list_id],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                    entity: "PackingList".to_string(),
                    id: list_id.to_string(),
                },
                other => other.into(),
            })?;

        let from = ListStatus::parse(&current).unwrap_or(ListStatus::Pending);
        if !(from == ListStatus::Pending && status == ListStatus::Approved) {
            return Err(RepositoryError::InvalidStateTransition {
                from: from.to_string(),
                to: status.to_string(),
            });
        }

        conn.execute(
            "UPDATE packing_list SET status = ?1, updated_at = ?2 WHERE list_id = ?3",
            params![status.as_str(), Utc::now().to_rfc3339(), list_id],
        )?;

        Self::load_aggregate(&conn, list_id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "PackingList".to_string(),
            id: list_id.to_string(),
        })
    }

    /// 删除装箱单（子实体级联删除）
    ///
    /// # 返回
    /// - `Ok(true)`: 删除成功
    /// - `Ok(false)`: 记录不存在
    pub fn delete(&self, list_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM packing_list WHERE list_id = ?1",
            params![list_id],
        )?;
        if affected > 0 {
            tracing::info!(list_id = %list_id, "装箱单已删除");
        }
        Ok(affected > 0)
    }

    // ==========================================
    // 聚合重组
    // ==========================================
    fn load_aggregate(conn: &Connection, list_id: &str) -> RepositoryResult<Option<PackingList>> {
        let head = conn.query_row(
            r#"SELECT list_id, store_name, commodity_type, status,
                      total_boxes, total_weight, total_volume, total_edge_volume,
                      total_pieces, total_value, remarks, created_at, updated_at
               FROM packing_list WHERE list_id = ?1"#,
            params![list_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, f64>(5)?,
                    row.get::<_, f64>(6)?,
                    row.get::<_, Option<f64>>(7)?,
                    row.get::<_, i64>(8)?,
                    row.get::<_, f64>(9)?,
                    row.get::<_, Option<String>>(10)?,
                    row.get::<_, String>(11)?,
                    row.get::<_, String>(12)?,
                ))
            },
        );

        let head = match head {
            Ok(h) => h,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let box_specifications = Self::load_box_specs(conn, list_id)?;
        let items = Self::load_items(conn, list_id)?;

        Ok(Some(PackingList {
            list_id: head.0,
            store_name: head.1,
            commodity_type: CommodityType::parse(&head.2).unwrap_or(CommodityType::General),
            status: ListStatus::parse(&head.3).unwrap_or(ListStatus::Pending),
            total_boxes: head.4,
            total_weight: head.5,
            total_volume: head.6,
            total_edge_volume: head.7,
            total_pieces: head.8,
            total_value: head.9,
            remarks: head.10,
            created_at: parse_timestamp(&head.11),
            updated_at: parse_timestamp(&head.12),
            items,
            box_specifications,
        }))
    }

    fn load_box_specs(conn: &Connection, list_id: &str) -> RepositoryResult<Vec<BoxSpecification>> {
        let mut stmt = conn.prepare(
            r#"SELECT box_no, length, width, height, weight, volume, edge_volume, piece_capacity
               FROM box_spec WHERE list_id = ?1 ORDER BY slot_index"#,
        )?;
        let specs = stmt
            .query_map(params![list_id], |row| {
                Ok(BoxSpecification {
                    box_no: row.get(0)?,
                    length: row.get(1)?,
                    width: row.get(2)?,
                    height: row.get(3)?,
                    weight: row.get(4)?,
                    volume: row.get(5)?,
                    edge_volume: row.get(6)?,
                    piece_capacity: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(specs)
    }

    fn load_items(conn: &Connection, list_id: &str) -> RepositoryResult<Vec<PackingListItem>> {
        let mut stmt = conn.prepare(
            r#"SELECT item_id, sku, display_name, total_quantity
               FROM packing_item WHERE list_id = ?1 ORDER BY item_index"#,
        )?;
        let heads = stmt
            .query_map(params![list_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut bq_stmt = conn.prepare(
            r#"SELECT box_no, quantity, snap_length, snap_width, snap_height,
                      snap_weight, snap_volume, snap_edge_volume, snap_piece_capacity
               FROM box_quantity WHERE item_id = ?1 ORDER BY rowid"#,
        )?;

        let mut items = Vec::with_capacity(heads.len());
        for (item_id, sku, display_name, total_quantity) in heads {
            let box_quantities = bq_stmt
                .query_map(params![item_id], |row| {
                    let box_no: String = row.get(0)?;
                    Ok(BoxQuantity {
                        box_no: box_no.clone(),
                        quantity: row.get(1)?,
                        spec: BoxSpecification {
                            box_no,
                            length: row.get(2)?,
                            width: row.get(3)?,
                            height: row.get(4)?,
                            weight: row.get(5)?,
                            volume: row.get(6)?,
                            edge_volume: row.get(7)?,
                            piece_capacity: row.get(8)?,
                        },
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            items.push(PackingListItem {
                sku,
                display_name,
                total_quantity,
                box_quantities,
            });
        }
        Ok(items)
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
