// ==========================================
// 海运ERP装箱单系统 - 箱规读取器 (Box Specification Reader)
// ==========================================
// 扫描: 从 F 列起按 3 列一槽位横向推进，行1读长宽高，
//       槽位首列的行2/3/4/6/7读箱重/体积/边加一体积/件数/箱号
// 终止: 首个长度单元格为空的槽位
// 红线: 长度在场但其余字段缺失 = 源文件损坏，硬失败而非跳过
// ==========================================

use crate::domain::packing_list::BoxSpecification;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::grid::SheetGrid;
use crate::importer::layout::{
    self, BOX_DIMENSION_ROW, BOX_EDGE_VOLUME_ROW, BOX_NUMBER_ROW, BOX_PIECE_CAPACITY_ROW,
    BOX_VOLUME_ROW, BOX_WEIGHT_ROW,
};

/// 扫描全部箱规槽位
///
/// # 返回
/// - `Ok(Vec<BoxSpecification>)`: 按槽位从左到右的箱规列表（至少一条）
/// - `IncompleteBoxSpec`: 某槽位长度在场但其余字段缺失
/// - `NoBoxSpecifications`: 一个槽位都没有
pub fn read_box_specifications(grid: &SheetGrid) -> ImportResult<Vec<BoxSpecification>> {
    let mut specs = Vec::new();

    for slot in 0.. {
        let col = layout::slot_column(slot);

        // 长度为空 = 槽位耗尽
        let Some(length) = grid.number(BOX_DIMENSION_ROW, col) else {
            break;
        };

        specs.push(read_slot(grid, slot, col, length)?);
    }

    if specs.is_empty() {
        return Err(ImportError::NoBoxSpecifications);
    }

    tracing::debug!(box_count = specs.len(), "箱规读取完成");
    Ok(specs)
}

/// 读取单个槽位；长度已在场，其余字段任何缺失都报 IncompleteBoxSpec
fn read_slot(
    grid: &SheetGrid,
    slot: u32,
    col: u32,
    length: f64,
) -> ImportResult<BoxSpecification> {
    let letter = layout::column_letter(col);

    let (Some(width), Some(height)) = (
        grid.number(BOX_DIMENSION_ROW, col + 1),
        grid.number(BOX_DIMENSION_ROW, col + 2),
    ) else {
        return Err(ImportError::IncompleteBoxSpec {
            column: letter,
            message: "的长宽高数据缺失".to_string(),
        });
    };

    let weight = grid.number(BOX_WEIGHT_ROW, col);
    let volume = grid.number(BOX_VOLUME_ROW, col);
    let edge_volume = grid.number(BOX_EDGE_VOLUME_ROW, col);
    let piece_capacity = grid.number(BOX_PIECE_CAPACITY_ROW, col);
    let box_no = grid.text(BOX_NUMBER_ROW, col);

    let (Some(weight), Some(volume), Some(edge_volume), Some(piece_capacity), Some(box_no)) =
        (weight, volume, edge_volume, piece_capacity, box_no)
    else {
        return Err(ImportError::IncompleteBoxSpec {
            column: letter,
            message: "缺少必要的规格信息".to_string(),
        });
    };

    tracing::trace!(slot, box_no = %box_no, "读取箱规槽位");

    Ok(BoxSpecification {
        box_no,
        length,
        width,
        height,
        weight,
        volume,
        edge_volume,
        piece_capacity: piece_capacity as i64,
    })
}
