// ==========================================
// 海运ERP装箱单系统 - 表头申报信息读取
// ==========================================
// 单元格: D1 类型 / B1 总箱数 / B2 总重量 / B3 总体积 / B4 总边加一体积(可缺)
//         B6 总件数 / D2 申报总价值
// 红线: 必填表头缺失或为零即 sheet 级硬失败（合计比对本身是参考性的，
//       但申报值必须在场才能组装聚合）
// ==========================================

use crate::domain::types::CommodityType;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::grid::SheetGrid;
use crate::importer::layout;
use serde::{Deserialize, Serialize};

/// 表头申报信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredHeader {
    pub commodity_type: CommodityType,
    pub total_boxes: i64,
    pub total_weight: f64,
    pub total_volume: f64,
    pub total_edge_volume: Option<f64>,
    pub total_pieces: i64,
    pub total_value: f64,
}

/// 读取表头申报信息
///
/// # 失败
/// - `IncompleteHeader`: 任一必填单元格缺失或为零，缺失单元格全部列出
/// - `UnknownCommodityType`: D1 非空但不在闭集内（空缺省为普货）
pub fn read_header(grid: &SheetGrid) -> ImportResult<DeclaredHeader> {
    let commodity_type = match grid
        .cell(layout::COMMODITY_TYPE_CELL.0, layout::COMMODITY_TYPE_CELL.1)
        .text()
    {
        None => CommodityType::General, // 源表偶有漏填，缺省普货
        Some(raw) => CommodityType::parse(&raw)
            .ok_or_else(|| ImportError::UnknownCommodityType(raw.clone()))?,
    };

    let total_boxes = read_positive(grid, layout::TOTAL_BOXES_CELL);
    let total_weight = read_positive(grid, layout::TOTAL_WEIGHT_CELL);
    let total_volume = read_positive(grid, layout::TOTAL_VOLUME_CELL);
    let total_pieces = read_positive(grid, layout::TOTAL_PIECES_CELL);
    let total_value = read_positive(grid, layout::TOTAL_VALUE_CELL);

    let mut missing = Vec::new();
    if total_boxes.is_none() {
        missing.push("B1(总箱数)");
    }
    if total_weight.is_none() {
        missing.push("B2(总重量)");
    }
    if total_volume.is_none() {
        missing.push("B3(总体积)");
    }
    if total_pieces.is_none() {
        missing.push("B6(总件数)");
    }
    if total_value.is_none() {
        missing.push("D2(总价值)");
    }
    if !missing.is_empty() {
        return Err(ImportError::IncompleteHeader {
            missing: missing.join("、"),
        });
    }

    // B4 可缺，缺失不报错
    let total_edge_volume = grid.number(
        layout::TOTAL_EDGE_VOLUME_CELL.0,
        layout::TOTAL_EDGE_VOLUME_CELL.1,
    );

    Ok(DeclaredHeader {
        commodity_type,
        total_boxes: total_boxes.unwrap_or_default() as i64,
        total_weight: total_weight.unwrap_or_default(),
        total_volume: total_volume.unwrap_or_default(),
        total_edge_volume,
        total_pieces: total_pieces.unwrap_or_default() as i64,
        total_value: total_value.unwrap_or_default(),
    })
}

/// 读取必填数值单元格；零值视同缺失（真实装箱单不存在零箱/零重量）
fn read_positive(grid: &SheetGrid, cell: (u32, u32)) -> Option<f64> {
    grid.number(cell.0, cell.1).filter(|n| *n > 0.0)
}
