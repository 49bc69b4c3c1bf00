// ==========================================
// 海运ERP装箱单系统 - 打印分组 (Print Grouping)
// ==========================================
// 职责: 按箱号重组商品明细供打印/预览，纯读侧变换，不落库
// 口径: 一个商品在几个箱中出现就在几个分组下出现（每条 BoxQuantity 一次）
//       每箱小计 = 数量合计 + 快照箱重/体积
// ==========================================

use crate::domain::packing_list::{BoxSpecification, PackingList};
use serde::{Deserialize, Serialize};

/// 打印分组内的一条商品记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintEntry {
    pub sku: String,
    pub display_name: Option<String>,
    pub quantity: i64,
}

/// 一个箱号的打印分组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxGroup {
    pub box_no: String,
    pub spec: BoxSpecification, // 快照口径（与导出一致）
    pub entries: Vec<PrintEntry>,
    pub total_quantity: i64, // 该箱数量小计
    pub box_weight: f64,     // 快照箱重
    pub box_volume: f64,     // 快照体积
}

/// 按箱号分组（箱规槽位顺序；无任何装箱数量的箱不出现）
pub fn group_by_box(list: &PackingList) -> Vec<BoxGroup> {
    let mut groups = Vec::new();

    for spec in &list.box_specifications {
        let mut entries = Vec::new();
        let mut snapshot: Option<&BoxSpecification> = None;

        for item in &list.items {
            for bq in &item.box_quantities {
                if bq.box_no == spec.box_no {
                    entries.push(PrintEntry {
                        sku: item.sku.clone(),
                        display_name: item.display_name.clone(),
                        quantity: bq.quantity,
                    });
                    snapshot.get_or_insert(&bq.spec);
                }
            }
        }

        if entries.is_empty() {
            continue;
        }

        let spec_snapshot = snapshot.unwrap_or(spec).clone();
        let total_quantity = entries.iter().map(|e| e.quantity).sum();
        groups.push(BoxGroup {
            box_no: spec.box_no.clone(),
            box_weight: spec_snapshot.weight,
            box_volume: spec_snapshot.volume,
            spec: spec_snapshot,
            entries,
            total_quantity,
        });
    }

    groups
}
