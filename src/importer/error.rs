// ==========================================
// 海运ERP装箱单系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分层: 整单级错误（文件名/工作簿）在任何 sheet 处理前失败；
//       sheet 级错误只使当前 sheet 失败，其余 sheet 继续
// ==========================================

use crate::domain::types::CommodityType;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 类型不匹配明细（sku / 期望类型 / 实际类型）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeMismatchEntry {
    pub sku: String,
    pub expected: CommodityType,
    pub actual: CommodityType,
}

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 整单级错误（任何 sheet 处理前）=====
    #[error("文件名格式错误，必须为\"{{店铺名}}海运ERP.xlsx\": {0}")]
    InvalidFileName(String),

    #[error("Excel 解析失败: {0}")]
    WorkbookParse(String),

    #[error("Excel 文件无可导入的工作表")]
    EmptyWorkbook,

    // ===== sheet 级错误 =====
    #[error("装箱单头部信息不完整，请检查 {missing} 等单元格")]
    IncompleteHeader { missing: String },

    #[error("货物类型无法识别: {0}（仅支持 普货/纺织/混装）")]
    UnknownCommodityType(String),

    #[error("箱规数据不完整: {column} 列{message}")]
    IncompleteBoxSpec { column: String, message: String },

    #[error("未找到有效的箱规数据")]
    NoBoxSpecifications,

    #[error("未找到有效的商品数据")]
    NoLineItems,

    #[error("以下商品类型与装箱单类型({expected})不匹配: {}",
        .mismatches.iter().map(|m| format!("SKU: {}, 商品类型: {}", m.sku, m.actual))
            .collect::<Vec<_>>().join("; "))]
    TypeMismatch {
        expected: CommodityType,
        mismatches: Vec<TypeMismatchEntry>,
    },

    #[error("装箱单数据校验失败: {}", .0.join("; "))]
    StructureInvalid(Vec<String>),

    // ===== 数据访问错误 =====
    #[error("数据访问失败: {0}")]
    Repository(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 是否为整单级错误（发生时整个上传失败，不产生任何 sheet 结果）
    pub fn is_workbook_level(&self) -> bool {
        matches!(
            self,
            ImportError::InvalidFileName(_)
                | ImportError::WorkbookParse(_)
                | ImportError::EmptyWorkbook
        )
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
