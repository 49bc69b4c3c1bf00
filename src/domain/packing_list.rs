// ==========================================
// 海运ERP装箱单系统 - 装箱单领域模型
// ==========================================
// 聚合根: PackingList
// 子实体: BoxSpecification / PackingListItem / BoxQuantity
// 红线: 子实体由装箱单独占，不跨单共享；商品按 sku 引用不持有
// ==========================================

use crate::domain::types::{CommodityType, ListStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

// ==========================================
// BoxSpecification - 箱规
// ==========================================
// 一种物理箱型的定义；箱号在单内唯一
// 体积/边加一体积按申报值存储，不按长宽高重算（容忍源数据四舍五入）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSpecification {
    pub box_no: String,       // 箱号（单内唯一）
    pub length: f64,          // 长 (cm)
    pub width: f64,           // 宽 (cm)
    pub height: f64,          // 高 (cm)
    pub weight: f64,          // 箱重 (kg)
    pub volume: f64,          // 体积 (m³，申报值)
    pub edge_volume: f64,     // 边加一体积 (m³，计费用申报值)
    pub piece_capacity: i64,  // 该箱总件数
}

// ==========================================
// BoxQuantity - 装箱数量
// ==========================================
// 一个 SKU 在一个箱中的实际数量；spec 为箱规快照
// 快照用途: 箱规事后被编辑时，历史装箱单仍忠实于实际装箱
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxQuantity {
    pub box_no: String,           // 引用同单内的箱号
    pub quantity: i64,            // 数量（> 0，零数量不落库）
    pub spec: BoxSpecification,   // 箱规快照（非活引用）
}

// ==========================================
// PackingListItem - 装箱单商品行
// ==========================================
// 不变式: total_quantity == sum(box_quantities.quantity)，且至少一条装箱数量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingListItem {
    pub sku: String,                      // 商品编码（按自然键引用商品）
    pub display_name: Option<String>,     // 中文名称（可缺）
    pub total_quantity: i64,              // 合计数量
    pub box_quantities: Vec<BoxQuantity>, // 各箱数量
}

// ==========================================
// ComputedTotals - 由明细推导的合计
// ==========================================
// 用途: 与表头申报合计做参考性比对（不强制相等）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedTotals {
    pub box_count: usize,   // 实际引用的去重箱号数
    pub total_pieces: i64,  // 全部装箱数量之和
    pub total_weight: f64,  // 按快照箱重求和
    pub total_volume: f64,  // 按快照体积求和
}

// ==========================================
// PackingList - 装箱单聚合根
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackingList {
    // ===== 主键 =====
    pub list_id: String, // UUID

    // ===== 基础信息 =====
    pub store_name: String,            // 店铺名称（导入时取自文件名）
    pub commodity_type: CommodityType, // 货物类型
    pub status: ListStatus,            // pending → approved 单向

    // ===== 表头申报合计（按申报值存储）=====
    pub total_boxes: i64,
    pub total_weight: f64,
    pub total_volume: f64,
    pub total_edge_volume: Option<f64>, // B4，可缺
    pub total_pieces: i64,
    pub total_value: f64,

    // ===== 子实体 =====
    pub items: Vec<PackingListItem>,
    pub box_specifications: Vec<BoxSpecification>,

    // ===== 其他 =====
    pub remarks: Option<String>,

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PackingList {
    /// 生成新装箱单ID
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// 明细中实际引用的去重箱号（保持首次出现顺序无关，用有序集合）
    pub fn referenced_box_numbers(&self) -> BTreeSet<&str> {
        self.items
            .iter()
            .flat_map(|item| item.box_quantities.iter())
            .map(|bq| bq.box_no.as_str())
            .collect()
    }

    /// 由明细推导合计（按 BoxQuantity 快照求和）
    pub fn computed_totals(&self) -> ComputedTotals {
        let box_numbers = self.referenced_box_numbers();
        let mut total_pieces = 0i64;
        let mut total_weight = 0.0;
        let mut total_volume = 0.0;

        for item in &self.items {
            for bq in &item.box_quantities {
                total_pieces += bq.quantity;
                total_weight += bq.spec.weight;
                total_volume += bq.spec.volume;
            }
        }

        ComputedTotals {
            box_count: box_numbers.len(),
            total_pieces,
            total_weight,
            total_volume,
        }
    }

    /// 结构不变式校验
    ///
    /// 校验内容:
    /// - 箱号在箱规列表内唯一
    /// - 至少一条箱规、至少一条商品行
    /// - 每条商品行至少一条装箱数量，且数量 > 0
    /// - 装箱数量引用的箱号必须在箱规列表中声明
    /// - total_quantity == sum(box_quantities.quantity)
    ///
    /// # 返回
    /// - `Ok(())`: 通过
    /// - `Err(Vec<String>)`: 全部违规项（不在第一条即止）
    pub fn validate_structure(&self) -> Result<(), Vec<String>> {
        let mut violations = Vec::new();

        if self.box_specifications.is_empty() {
            violations.push("装箱单必须至少包含一条箱规".to_string());
        }
        if self.items.is_empty() {
            violations.push("装箱单必须至少包含一条商品明细".to_string());
        }

        let mut declared = BTreeSet::new();
        for spec in &self.box_specifications {
            if !declared.insert(spec.box_no.as_str()) {
                violations.push(format!("箱号重复: {}", spec.box_no));
            }
        }

        for item in &self.items {
            if item.box_quantities.is_empty() {
                violations.push(format!("商品 {} 没有任何装箱数量", item.sku));
                continue;
            }
            let mut sum = 0i64;
            for bq in &item.box_quantities {
                if bq.quantity <= 0 {
                    violations.push(format!(
                        "商品 {} 在箱 {} 的数量必须大于0（实际 {}）",
                        item.sku, bq.box_no, bq.quantity
                    ));
                }
                if !declared.contains(bq.box_no.as_str()) {
                    violations.push(format!(
                        "商品 {} 引用了未声明的箱号: {}",
                        item.sku, bq.box_no
                    ));
                }
                sum += bq.quantity;
            }
            if sum != item.total_quantity {
                violations.push(format!(
                    "商品 {} 合计数量不一致: 声明 {}, 实际 {}",
                    item.sku, item.total_quantity, sum
                ));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// 审批（pending → approved，单向）
    ///
    /// # 返回
    /// - `Ok(())`: 状态已更新
    /// - `Err((from, to))`: 非法状态转换
    pub fn approve(&mut self) -> Result<(), (ListStatus, ListStatus)> {
        match self.status {
            ListStatus::Pending => {
                self.status = ListStatus::Approved;
                self.updated_at = Utc::now();
                Ok(())
            }
            ListStatus::Approved => Err((ListStatus::Approved, ListStatus::Approved)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_spec(box_no: &str) -> BoxSpecification {
        BoxSpecification {
            box_no: box_no.to_string(),
            length: 60.0,
            width: 40.0,
            height: 40.0,
            weight: 15.0,
            volume: 0.096,
            edge_volume: 0.1152,
            piece_capacity: 100,
        }
    }

    fn sample_list() -> PackingList {
        let spec1 = sample_spec("1#");
        let spec2 = sample_spec("2#");
        PackingList {
            list_id: PackingList::new_id(),
            store_name: "测试店铺".to_string(),
            commodity_type: CommodityType::General,
            status: ListStatus::Pending,
            total_boxes: 2,
            total_weight: 30.0,
            total_volume: 0.192,
            total_edge_volume: None,
            total_pieces: 70,
            total_value: 1200.0,
            items: vec![PackingListItem {
                sku: "SKU-A".to_string(),
                display_name: Some("水杯".to_string()),
                total_quantity: 70,
                box_quantities: vec![
                    BoxQuantity {
                        box_no: "1#".to_string(),
                        quantity: 30,
                        spec: spec1.clone(),
                    },
                    BoxQuantity {
                        box_no: "2#".to_string(),
                        quantity: 40,
                        spec: spec2.clone(),
                    },
                ],
            }],
            box_specifications: vec![spec1, spec2],
            remarks: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_computed_totals() {
        let list = sample_list();
        let totals = list.computed_totals();
        assert_eq!(totals.box_count, 2);
        assert_eq!(totals.total_pieces, 70);
        assert!((totals.total_weight - 30.0).abs() < 1e-9);
        assert!((totals.total_volume - 0.192).abs() < 1e-9);
    }

    #[test]
    fn test_validate_structure_ok() {
        assert!(sample_list().validate_structure().is_ok());
    }

    #[test]
    fn test_validate_structure_catches_all_violations() {
        let mut list = sample_list();
        list.box_specifications.push(sample_spec("1#")); // 重复箱号
        list.items[0].total_quantity = 99; // 合计不一致
        list.items[0].box_quantities[0].box_no = "9#".to_string(); // 未声明箱号

        let violations = list.validate_structure().unwrap_err();
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn test_approve_one_way() {
        let mut list = sample_list();
        assert!(list.approve().is_ok());
        assert_eq!(list.status, ListStatus::Approved);
        assert!(list.approve().is_err());
    }
}
