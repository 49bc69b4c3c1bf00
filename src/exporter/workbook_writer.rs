// ==========================================
// 海运ERP装箱单系统 - 装箱单导出 (Spreadsheet Exporter)
// ==========================================
// 职责: 规范化聚合 → 同一位置约定的工作簿（导入的逆向）
// 红线: 数量与箱规列按 BoxQuantity 快照写出，不回查在库箱规——
//       导出必须忠实于实际装箱时刻
// 布局: 与 importer::layout 完全一致，导出再导入为不动点
// ==========================================

use crate::domain::packing_list::PackingList;
use crate::importer::layout::{
    self, BOX_DIMENSION_ROW, BOX_EDGE_VOLUME_ROW, BOX_NUMBER_ROW, BOX_PIECE_CAPACITY_ROW,
    BOX_VOLUME_ROW, BOX_WEIGHT_ROW, ITEM_NAME_COL, ITEM_SKU_COL, ITEM_START_ROW,
};
use crate::repository::error::RepositoryError;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use std::collections::HashMap;
use thiserror::Error;

/// 导出模块错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("装箱单不存在: {0}")]
    ListNotFound(String),

    #[error("没有可导出的装箱单")]
    NothingToExport,

    #[error("工作簿生成失败: {0}")]
    WorkbookBuild(String),

    #[error("数据访问失败: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<XlsxError> for ExportError {
    fn from(err: XlsxError) -> Self {
        ExportError::WorkbookBuild(err.to_string())
    }
}

/// Result 类型别名
pub type ExportResult<T> = Result<T, ExportError>;

/// Excel sheet 名长度上限（字符）
const SHEET_NAME_MAX_CHARS: usize = 31;

/// 导出单个装箱单为工作簿字节流（sheet 以店铺名命名）
pub fn export_single(list: &PackingList) -> ExportResult<Vec<u8>> {
    export_batch(std::slice::from_ref(list))
}

/// 批量导出：每个装箱单一个 sheet，sheet 名取店铺名（去重/截断）
pub fn export_batch(lists: &[PackingList]) -> ExportResult<Vec<u8>> {
    if lists.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let mut workbook = Workbook::new();
    let mut used_names: HashMap<String, u32> = HashMap::new();

    for list in lists {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet_name_for(&list.store_name, &mut used_names))?;
        write_sheet(worksheet, list)?;
    }

    let bytes = workbook.save_to_buffer()?;
    tracing::info!(lists = lists.len(), bytes = bytes.len(), "装箱单导出完成");
    Ok(bytes)
}

/// 店铺名 → 合法且唯一的 sheet 名
fn sheet_name_for(store_name: &str, used: &mut HashMap<String, u32>) -> String {
    // Excel 禁用字符替换为下划线
    let mut base: String = store_name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    if base.trim().is_empty() {
        base = "装箱单".to_string();
    }
    base = base.chars().take(SHEET_NAME_MAX_CHARS).collect();

    let seq = used.entry(base.clone()).or_insert(0);
    *seq += 1;
    if *seq == 1 {
        return base;
    }
    // 同店多单：追加序号，必要时再截断
    let suffix = format!("-{}", seq);
    let keep = SHEET_NAME_MAX_CHARS.saturating_sub(suffix.chars().count());
    let truncated: String = base.chars().take(keep).collect();
    format!("{}{}", truncated, suffix)
}

/// 写出一个 sheet 的完整位置布局
fn write_sheet(worksheet: &mut Worksheet, list: &PackingList) -> ExportResult<()> {
    // ===== 表头申报区（标签列 A/C/E，数值列按 layout 常量）=====
    worksheet.write_string(0, 0, "总箱数")?;
    worksheet.write_number(
        layout::TOTAL_BOXES_CELL.0,
        layout::TOTAL_BOXES_CELL.1 as u16,
        list.total_boxes as f64,
    )?;
    worksheet.write_string(1, 0, "总重量(kg)")?;
    worksheet.write_number(
        layout::TOTAL_WEIGHT_CELL.0,
        layout::TOTAL_WEIGHT_CELL.1 as u16,
        list.total_weight,
    )?;
    worksheet.write_string(2, 0, "总体积(m³)")?;
    worksheet.write_number(
        layout::TOTAL_VOLUME_CELL.0,
        layout::TOTAL_VOLUME_CELL.1 as u16,
        list.total_volume,
    )?;
    if let Some(edge) = list.total_edge_volume {
        worksheet.write_string(3, 0, "总边加一体积(m³)")?;
        worksheet.write_number(
            layout::TOTAL_EDGE_VOLUME_CELL.0,
            layout::TOTAL_EDGE_VOLUME_CELL.1 as u16,
            edge,
        )?;
    }
    worksheet.write_string(5, 0, "总件数")?;
    worksheet.write_number(
        layout::TOTAL_PIECES_CELL.0,
        layout::TOTAL_PIECES_CELL.1 as u16,
        list.total_pieces as f64,
    )?;
    worksheet.write_string(0, 2, "类型")?;
    worksheet.write_string(
        layout::COMMODITY_TYPE_CELL.0,
        layout::COMMODITY_TYPE_CELL.1 as u16,
        list.commodity_type.as_str(),
    )?;
    worksheet.write_string(1, 2, "总价值")?;
    worksheet.write_number(
        layout::TOTAL_VALUE_CELL.0,
        layout::TOTAL_VALUE_CELL.1 as u16,
        list.total_value,
    )?;

    // ===== 箱规行标签（E 列）=====
    worksheet.write_string(BOX_DIMENSION_ROW, 4, "箱规(长/宽/高)")?;
    worksheet.write_string(BOX_WEIGHT_ROW, 4, "箱重(kg)")?;
    worksheet.write_string(BOX_VOLUME_ROW, 4, "体积(m³)")?;
    worksheet.write_string(BOX_EDGE_VOLUME_ROW, 4, "边加一体积(m³)")?;
    worksheet.write_string(BOX_PIECE_CAPACITY_ROW, 4, "总件数")?;
    worksheet.write_string(BOX_NUMBER_ROW, 4, "箱号")?;

    // ===== 箱规槽位 =====
    let mut slot_of_box: HashMap<&str, u32> = HashMap::new();
    for (slot, spec) in list.box_specifications.iter().enumerate() {
        let slot = slot as u32;
        let col = layout::slot_column(slot) as u16;
        slot_of_box.insert(spec.box_no.as_str(), slot);

        worksheet.write_number(BOX_DIMENSION_ROW, col, spec.length)?;
        worksheet.write_number(BOX_DIMENSION_ROW, col + 1, spec.width)?;
        worksheet.write_number(BOX_DIMENSION_ROW, col + 2, spec.height)?;
        worksheet.write_number(BOX_WEIGHT_ROW, col, spec.weight)?;
        worksheet.write_number(BOX_VOLUME_ROW, col, spec.volume)?;
        worksheet.write_number(BOX_EDGE_VOLUME_ROW, col, spec.edge_volume)?;
        worksheet.write_number(BOX_PIECE_CAPACITY_ROW, col, spec.piece_capacity as f64)?;
        worksheet.write_string(BOX_NUMBER_ROW, col, &spec.box_no)?;
    }

    // ===== 明细表头（行7，不在读取器扫描列上）=====
    worksheet.write_string(ITEM_START_ROW - 1, ITEM_SKU_COL as u16, "SKU")?;
    worksheet.write_string(ITEM_START_ROW - 1, ITEM_NAME_COL as u16, "中文名称")?;

    // ===== 明细行: 每商品一行，数量写在其箱号对应槽位首列 =====
    for (i, item) in list.items.iter().enumerate() {
        let row = ITEM_START_ROW + i as u32;
        worksheet.write_string(row, ITEM_SKU_COL as u16, &item.sku)?;
        if let Some(name) = &item.display_name {
            worksheet.write_string(row, ITEM_NAME_COL as u16, name)?;
        }
        for bq in &item.box_quantities {
            let Some(slot) = slot_of_box.get(bq.box_no.as_str()) else {
                // 结构校验保证引用箱号已声明；异常数据跳过该数量
                tracing::warn!(sku = %item.sku, box_no = %bq.box_no, "装箱数量引用了未知箱号");
                continue;
            };
            let col = layout::slot_column(*slot) as u16;
            worksheet.write_number(row, col, bq.quantity as f64)?;
        }
    }

    // 列宽：SKU/名称列加宽便于打印预览
    worksheet.set_column_width(ITEM_SKU_COL as u16, 18)?;
    worksheet.set_column_width(ITEM_NAME_COL as u16, 28)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_name_dedupe() {
        let mut used = HashMap::new();
        assert_eq!(sheet_name_for("小米之家", &mut used), "小米之家");
        assert_eq!(sheet_name_for("小米之家", &mut used), "小米之家-2");
        assert_eq!(sheet_name_for("小米之家", &mut used), "小米之家-3");
    }

    #[test]
    fn test_sheet_name_sanitizes_forbidden_chars() {
        let mut used = HashMap::new();
        assert_eq!(sheet_name_for("A/B:C", &mut used), "A_B_C");
    }

    #[test]
    fn test_sheet_name_truncated() {
        let mut used = HashMap::new();
        let long = "x".repeat(40);
        assert_eq!(sheet_name_for(&long, &mut used).chars().count(), 31);
    }

    #[test]
    fn test_export_empty_batch_rejected() {
        assert!(matches!(export_batch(&[]), Err(ExportError::NothingToExport)));
    }
}
