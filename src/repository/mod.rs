// ==========================================
// 海运ERP装箱单系统 - 数据仓储层
// ==========================================
// 职责: 数据访问，不含业务逻辑
// 约定: 仓储持有 Arc<Mutex<Connection>>，可共享同一数据库连接
// ==========================================

pub mod error;
pub mod packing_list_repo;
pub mod product_repo;

// 重导出核心类型
pub use error::{RepositoryError, RepositoryResult};
pub use packing_list_repo::{PackingListPage, PackingListQuery, PackingListRepository};
pub use product_repo::{ProductRepository, SqliteProductRepository};
