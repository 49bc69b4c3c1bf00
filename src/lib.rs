// ==========================================
// 海运ERP装箱单系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + calamine/rust_xlsxwriter
// 系统定位: 装箱单表格导入/导出引擎 (传输层另行集成)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部表格数据
pub mod importer;

// 导出层 - 工作簿生成与打印分组
pub mod exporter;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CommodityType, ListStatus};

// 领域实体
pub use domain::{
    BoxQuantity, BoxSpecification, ComputedTotals, PackingList, PackingListItem, Product,
};

// 仓储
pub use repository::{
    PackingListPage, PackingListQuery, PackingListRepository, ProductRepository, RepositoryError,
    RepositoryResult, SqliteProductRepository,
};

// 导入/导出
pub use exporter::{export_batch, export_single, group_by_box, ExportError};
pub use importer::{extract_store_name, ImportError, SheetImport, WorkbookImporter};

// API
pub use api::{ApiError, ApiResult, PackingListApi};

/// 应用名称
pub const APP_NAME: &str = "海运ERP装箱单系统";

/// 应用版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
