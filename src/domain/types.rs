// ==========================================
// 海运ERP装箱单系统 - 领域类型定义
// ==========================================
// 依据: 装箱单数据模型（闭集类型）
// 序列化格式: 与数据库/Excel 单元格中的中文字面量一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 货物类型 (Commodity Type)
// ==========================================
// 红线: 闭集。混装为哨兵值，豁免逐商品类型校验
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommodityType {
    #[serde(rename = "普货")]
    General, // 普货
    #[serde(rename = "纺织")]
    Textile, // 纺织
    #[serde(rename = "混装")]
    Mixed, // 混装（豁免类型校验）
}

impl CommodityType {
    /// 是否为混装哨兵值
    pub fn is_mixed(&self) -> bool {
        matches!(self, CommodityType::Mixed)
    }

    /// 从单元格/数据库字面量解析
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "普货" => Some(CommodityType::General),
            "纺织" => Some(CommodityType::Textile),
            "混装" => Some(CommodityType::Mixed),
            _ => None,
        }
    }

    /// 数据库/Excel 存储字面量
    pub fn as_str(&self) -> &'static str {
        match self {
            CommodityType::General => "普货",
            CommodityType::Textile => "纺织",
            CommodityType::Mixed => "混装",
        }
    }
}

impl fmt::Display for CommodityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 装箱单状态 (List Status)
// ==========================================
// 状态机: pending → approved（单向，审批后不可回退）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStatus {
    Pending,  // 待审核
    Approved, // 已审核
}

impl ListStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "pending" => Some(ListStatus::Pending),
            "approved" => Some(ListStatus::Approved),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ListStatus::Pending => "pending",
            ListStatus::Approved => "approved",
        }
    }
}

impl fmt::Display for ListStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commodity_type_parse() {
        assert_eq!(CommodityType::parse("普货"), Some(CommodityType::General));
        assert_eq!(CommodityType::parse(" 纺织 "), Some(CommodityType::Textile));
        assert_eq!(CommodityType::parse("混装"), Some(CommodityType::Mixed));
        assert_eq!(CommodityType::parse("危险品"), None);
    }

    #[test]
    fn test_mixed_sentinel() {
        assert!(CommodityType::Mixed.is_mixed());
        assert!(!CommodityType::General.is_mixed());
    }

    #[test]
    fn test_status_roundtrip() {
        assert_eq!(ListStatus::parse("pending"), Some(ListStatus::Pending));
        assert_eq!(ListStatus::Approved.as_str(), "approved");
        assert_eq!(ListStatus::parse("rejected"), None);
    }

    #[test]
    fn test_serde_uses_chinese_literals() {
        let json = serde_json::to_string(&CommodityType::Textile).unwrap();
        assert_eq!(json, "\"纺织\"");
        let back: CommodityType = serde_json::from_str("\"混装\"").unwrap();
        assert_eq!(back, CommodityType::Mixed);
    }
}
