// ==========================================
// 海运ERP装箱单系统 - 装箱单表格布局约定
// ==========================================
// 固定按位置寻址（与语言环境无关），所有行列常量集中于此
// 坐标为 0 基；注释标注对应的 1 基表格单元格
// ==========================================

/// 文件名后缀标记: {店铺名}海运ERP.xlsx
pub const FILE_NAME_SUFFIX: &str = "海运ERP";

/// 常用箱规参考表（多 sheet 导入时整体跳过，视为文档非数据）
pub const COMMON_BOX_SPEC_SHEET: &str = "常用箱规";

// ===== 表头申报单元格 =====
pub const COMMODITY_TYPE_CELL: (u32, u32) = (0, 3); // D1 货物类型
pub const TOTAL_BOXES_CELL: (u32, u32) = (0, 1); // B1 总箱数
pub const TOTAL_WEIGHT_CELL: (u32, u32) = (1, 1); // B2 总重量(kg)
pub const TOTAL_VOLUME_CELL: (u32, u32) = (2, 1); // B3 总体积(m³)
pub const TOTAL_EDGE_VOLUME_CELL: (u32, u32) = (3, 1); // B4 总边加一体积(m³)，可缺
pub const TOTAL_PIECES_CELL: (u32, u32) = (5, 1); // B6 总件数
pub const TOTAL_VALUE_CELL: (u32, u32) = (1, 3); // D2 申报总价值

// ===== 箱规槽位 =====
// 从 F 列起，每个箱占 3 列；槽位首列承载除长宽高外的全部箱规字段
pub const BOX_SLOT_START_COL: u32 = 5; // F
pub const BOX_SLOT_STRIDE: u32 = 3;
pub const BOX_DIMENSION_ROW: u32 = 0; // 行1: 长/宽/高（槽位第1/2/3列）
pub const BOX_WEIGHT_ROW: u32 = 1; // 行2: 箱重
pub const BOX_VOLUME_ROW: u32 = 2; // 行3: 体积
pub const BOX_EDGE_VOLUME_ROW: u32 = 3; // 行4: 边加一体积
pub const BOX_PIECE_CAPACITY_ROW: u32 = 5; // 行6: 该箱总件数
pub const BOX_NUMBER_ROW: u32 = 6; // 行7: 箱号

// ===== 商品明细行 =====
pub const ITEM_START_ROW: u32 = 7; // 行8 起
pub const ITEM_SKU_COL: u32 = 1; // B 列
pub const ITEM_NAME_COL: u32 = 2; // C 列

/// 第 slot 个箱规槽位的首列（0 基槽位序号）
pub fn slot_column(slot: u32) -> u32 {
    BOX_SLOT_START_COL + slot * BOX_SLOT_STRIDE
}

/// 列号转表格字母（错误信息用，如 5 → "F"）
pub fn column_letter(mut col: u32) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
