// ==========================================
// 海运ERP装箱单系统 - 店铺标识提取 (Store Identity Extractor)
// ==========================================
// 约定: 文件名 = {店铺名} + "海运ERP" + .xlsx/.xls
// 红线: 提取失败即整单失败，不进入任何 sheet 处理
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::layout::FILE_NAME_SUFFIX;

/// 从上传文件名提取店铺名称
///
/// # 规则
/// - 先去除 .xlsx/.xls 扩展名（大小写不敏感）
/// - 剩余部分必须以"海运ERP"结尾
/// - 去除后缀并 trim 后必须非空
///
/// # 示例
/// - "NorthStore海运ERP.xlsx" → "NorthStore"
/// - "海运ERP.xlsx" → InvalidFileName（店铺名为空）
/// - "NorthStoreShipping.xlsx" → InvalidFileName（缺少后缀）
pub fn extract_store_name(file_name: &str) -> ImportResult<String> {
    let file_name = file_name.trim();
    if file_name.is_empty() {
        return Err(ImportError::InvalidFileName("文件名不能为空".to_string()));
    }

    let stem = strip_excel_extension(file_name);

    let prefix = stem.strip_suffix(FILE_NAME_SUFFIX).ok_or_else(|| {
        ImportError::InvalidFileName(format!("缺少\"{}\"后缀: {}", FILE_NAME_SUFFIX, file_name))
    })?;

    let store_name = prefix.trim();
    if store_name.is_empty() {
        return Err(ImportError::InvalidFileName(format!(
            "无法从文件名中提取店铺名称: {}",
            file_name
        )));
    }

    Ok(store_name.to_string())
}

/// 去除 .xlsx / .xls 扩展名（大小写不敏感）；其余扩展名原样保留
fn strip_excel_extension(file_name: &str) -> &str {
    for ext in [".xlsx", ".xls"] {
        let Some(cut) = file_name.len().checked_sub(ext.len()) else {
            continue;
        };
        if file_name.is_char_boundary(cut) {
            let (stem, tail) = file_name.split_at(cut);
            if tail.eq_ignore_ascii_case(ext) {
                return stem;
            }
        }
    }
    file_name
}
