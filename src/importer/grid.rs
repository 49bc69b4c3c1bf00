// ==========================================
// 海运ERP装箱单系统 - 表格随机访问层 (Grid Accessor)
// ==========================================
// 职责: 将已解析的工作表包装为 (行, 列) 寻址的二维类型化网格
// 约定: 越界与类型不符一律返回 Empty，下游读取器以"无数据"作为循环终止信号
// 红线: 纯读视图，无副作用；一次只包装一个 sheet
// ==========================================

use calamine::{Data, Range};
use std::collections::HashMap;

// ==========================================
// CellValue - 类型化单元格值
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 数值读取；数字文本（如 "12"）也可转换（源表中数量列偶有文本格式）
    pub fn number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Empty => None,
        }
    }

    /// 文本读取；数值按整数优先格式化（箱号 1 读作 "1" 而非 "1.0"）
    pub fn text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(format!("{}", n))
                }
            }
            CellValue::Empty => None,
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(trimmed.to_string())
                }
            }
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            // Bool/Error/ISO 时间在装箱单约定中无意义，按空处理
            _ => CellValue::Empty,
        }
    }
}

// ==========================================
// SheetGrid - 单 sheet 只读网格
// ==========================================
// 稀疏存储：只保留非空单元格，坐标为工作表绝对坐标（0 基）
pub struct SheetGrid {
    cells: HashMap<(u32, u32), CellValue>,
}

impl SheetGrid {
    /// 由 calamine Range 构建（保留 Range 自身的起始偏移）
    pub fn from_range(range: &Range<Data>) -> Self {
        let mut cells = HashMap::new();
        if let Some((row0, col0)) = range.start() {
            for (r, row) in range.rows().enumerate() {
                for (c, data) in row.iter().enumerate() {
                    let value = CellValue::from(data);
                    if !value.is_empty() {
                        cells.insert((row0 + r as u32, col0 + c as u32), value);
                    }
                }
            }
        }
        Self { cells }
    }

    /// 由行数据直接构建（单元测试用，0 基坐标从原点起）
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        let mut cells = HashMap::new();
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                if !value.is_empty() {
                    cells.insert((r as u32, c as u32), value);
                }
            }
        }
        Self { cells }
    }

    /// 单元格读取；越界返回 Empty
    pub fn cell(&self, row: u32, col: u32) -> &CellValue {
        self.cells.get(&(row, col)).unwrap_or(&CellValue::Empty)
    }

    pub fn number(&self, row: u32, col: u32) -> Option<f64> {
        self.cell(row, col).number()
    }

    pub fn text(&self, row: u32, col: u32) -> Option<String> {
        self.cell(row, col).text()
    }

    pub fn is_empty_cell(&self, row: u32, col: u32) -> bool {
        self.cell(row, col).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_is_empty() {
        let grid = SheetGrid::from_rows(vec![vec![CellValue::Number(1.0)]]);
        assert!(grid.cell(99, 99).is_empty());
        assert_eq!(grid.number(99, 99), None);
    }

    #[test]
    fn test_number_from_numeric_text() {
        let grid = SheetGrid::from_rows(vec![vec![CellValue::Text("12.5".to_string())]]);
        assert_eq!(grid.number(0, 0), Some(12.5));
    }

    #[test]
    fn test_text_from_integral_number() {
        let v = CellValue::Number(3.0);
        assert_eq!(v.text(), Some("3".to_string()));
        let v = CellValue::Number(3.5);
        assert_eq!(v.text(), Some("3.5".to_string()));
    }

    #[test]
    fn test_blank_text_cell_is_empty() {
        let v = CellValue::from(&Data::String("   ".to_string()));
        assert!(v.is_empty());
    }
}
