// ==========================================
// 海运ERP装箱单系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 集中建表语句，库与测试共用同一份 schema
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明:
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化数据库 schema（幂等，CREATE TABLE IF NOT EXISTS）
///
/// 表结构:
/// - product: 商品目录（sku 唯一约束承载补建并发安全）
/// - packing_list: 装箱单聚合根
/// - box_spec / packing_item / box_quantity: 装箱单独占子表，级联删除
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS product (
            sku              TEXT PRIMARY KEY,
            name             TEXT NOT NULL,
            chinese_name     TEXT NOT NULL,
            commodity_type   TEXT NOT NULL,
            price            REAL NOT NULL DEFAULT 0,
            stock            INTEGER NOT NULL DEFAULT 0,
            is_auto_created  INTEGER NOT NULL DEFAULT 0,
            needs_completion INTEGER NOT NULL DEFAULT 0,
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS packing_list (
            list_id           TEXT PRIMARY KEY,
            store_name        TEXT NOT NULL,
            commodity_type    TEXT NOT NULL,
            status            TEXT NOT NULL DEFAULT 'pending',
            total_boxes       INTEGER NOT NULL,
            total_weight      REAL NOT NULL,
            total_volume      REAL NOT NULL,
            total_edge_volume REAL,
            total_pieces      INTEGER NOT NULL,
            total_value       REAL NOT NULL,
            remarks           TEXT,
            created_at        TEXT NOT NULL,
            updated_at        TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_packing_list_store
            ON packing_list(store_name);
        CREATE INDEX IF NOT EXISTS idx_packing_list_created
            ON packing_list(created_at);

        CREATE TABLE IF NOT EXISTS box_spec (
            list_id        TEXT NOT NULL REFERENCES packing_list(list_id) ON DELETE CASCADE,
            slot_index     INTEGER NOT NULL,
            box_no         TEXT NOT NULL,
            length         REAL NOT NULL,
            width          REAL NOT NULL,
            height         REAL NOT NULL,
            weight         REAL NOT NULL,
            volume         REAL NOT NULL,
            edge_volume    REAL NOT NULL,
            piece_capacity INTEGER NOT NULL,
            PRIMARY KEY (list_id, box_no),
            UNIQUE (list_id, slot_index)
        );

        CREATE TABLE IF NOT EXISTS packing_item (
            item_id        INTEGER PRIMARY KEY AUTOINCREMENT,
            list_id        TEXT NOT NULL REFERENCES packing_list(list_id) ON DELETE CASCADE,
            item_index     INTEGER NOT NULL,
            sku            TEXT NOT NULL,
            display_name   TEXT,
            total_quantity INTEGER NOT NULL,
            UNIQUE (list_id, item_index)
        );

        CREATE TABLE IF NOT EXISTS box_quantity (
            item_id             INTEGER NOT NULL REFERENCES packing_item(item_id) ON DELETE CASCADE,
            box_no              TEXT NOT NULL,
            quantity            INTEGER NOT NULL CHECK (quantity > 0),
            -- 箱规快照（历史完整性：箱规被编辑后导出仍忠实于实际装箱）
            snap_length         REAL NOT NULL,
            snap_width          REAL NOT NULL,
            snap_height         REAL NOT NULL,
            snap_weight         REAL NOT NULL,
            snap_volume         REAL NOT NULL,
            snap_edge_volume    REAL NOT NULL,
            snap_piece_capacity INTEGER NOT NULL,
            PRIMARY KEY (item_id, box_no)
        );
        "#,
    )
}

/// 打开连接并完成 schema 初始化（库入口常用）
pub fn open_and_init(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}
