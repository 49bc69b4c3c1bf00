// ==========================================
// 海运ERP装箱单系统 - 商品明细读取器 (Line Item Reader)
// ==========================================
// 扫描: 从行8起逐行读取，B 列 SKU 为空即终止
// 对每行: 按箱规槽位从左到右读槽位首列对应行的数量单元格，
//         正数才计入；全槽位无正数的行整体丢弃
// 快照: 每条装箱数量携带其箱规的完整快照
// ==========================================

use crate::domain::packing_list::{BoxQuantity, BoxSpecification, PackingListItem};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::grid::SheetGrid;
use crate::importer::layout::{self, ITEM_NAME_COL, ITEM_SKU_COL, ITEM_START_ROW};

/// 扫描全部商品明细行
///
/// # 参数
/// - `boxes`: 箱规读取器的输出（槽位顺序与列顺序一致）
///
/// # 返回
/// - `Ok(Vec<PackingListItem>)`: 至少一条商品行
/// - `NoLineItems`: 有效商品行为零
pub fn read_line_items(
    grid: &SheetGrid,
    boxes: &[BoxSpecification],
) -> ImportResult<Vec<PackingListItem>> {
    let mut items = Vec::new();

    for row in ITEM_START_ROW.. {
        // SKU 为空 = 明细区结束
        let Some(sku) = grid.text(row, ITEM_SKU_COL) else {
            break;
        };

        let display_name = grid.text(row, ITEM_NAME_COL);

        let mut box_quantities = Vec::new();
        for (slot, spec) in boxes.iter().enumerate() {
            let col = layout::slot_column(slot as u32);
            // 非数值或非正数的数量单元格按无装箱处理
            let Some(quantity) = grid.number(row, col) else {
                continue;
            };
            if quantity > 0.0 {
                box_quantities.push(BoxQuantity {
                    box_no: spec.box_no.clone(),
                    quantity: quantity as i64,
                    spec: spec.clone(),
                });
            }
        }

        // 全槽位无正数数量的 SKU 行丢弃，不落成零数量明细
        if box_quantities.is_empty() {
            tracing::debug!(row = row + 1, sku = %sku, "商品行无有效装箱数量，跳过");
            continue;
        }

        let total_quantity = box_quantities.iter().map(|bq| bq.quantity).sum();
        items.push(PackingListItem {
            sku,
            display_name,
            total_quantity,
            box_quantities,
        });
    }

    if items.is_empty() {
        return Err(ImportError::NoLineItems);
    }

    tracing::debug!(item_count = items.len(), "商品明细读取完成");
    Ok(items)
}
