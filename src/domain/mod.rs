// ==========================================
// 海运ERP装箱单系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、闭集类型、结构不变式
// 红线: 不含数据访问逻辑,不含解析逻辑
// ==========================================

pub mod packing_list;
pub mod product;
pub mod types;

// 重导出核心类型
pub use packing_list::{
    BoxQuantity, BoxSpecification, ComputedTotals, PackingList, PackingListItem,
};
pub use product::Product;
pub use types::{CommodityType, ListStatus};
