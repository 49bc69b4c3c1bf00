// ==========================================
// 海运ERP装箱单系统 - 商品最小视图
// ==========================================
// 职责: 装箱单侧消费的商品字段；完整商品CRUD属于外部协作方
// 红线: sku 为自然键，全局唯一
// ==========================================

use crate::domain::types::CommodityType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Product - 商品目录记录
// ==========================================
// 用途: 类型一致性校验 + 导入自动补建
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    // ===== 主键 =====
    pub sku: String, // 商品唯一标识

    // ===== 基础信息 =====
    pub name: String,                 // 商品名称
    pub chinese_name: String,         // 中文名称
    pub commodity_type: CommodityType, // 货物类型（与装箱单类型校验）

    // ===== 商业字段（自动补建时置零）=====
    pub price: f64, // 单价
    pub stock: i64, // 库存

    // ===== 自动补建标记 =====
    pub is_auto_created: bool,   // 导入时自动创建
    pub needs_completion: bool,  // 信息待补充

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// 自动补建商品的占位名称
    pub fn placeholder_name(sku: &str) -> String {
        format!("待补充({})", sku)
    }

    /// 由导入流程合成占位商品记录
    ///
    /// # 参数
    /// - `sku`: 商品编码
    /// - `display_name`: 导入表中的中文名称（缺失时用占位名）
    /// - `commodity_type`: 所属装箱单的货物类型
    pub fn auto_created(
        sku: &str,
        display_name: Option<&str>,
        commodity_type: CommodityType,
    ) -> Self {
        let now = Utc::now();
        let chinese_name = display_name
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .unwrap_or_else(|| Self::placeholder_name(sku));

        Self {
            sku: sku.to_string(),
            name: Self::placeholder_name(sku),
            chinese_name,
            commodity_type,
            price: 0.0,
            stock: 0,
            is_auto_created: true,
            needs_completion: true,
            created_at: now,
            updated_at: now,
        }
    }
}
