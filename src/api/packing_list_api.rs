// ==========================================
// 海运ERP装箱单系统 - 装箱单API
// ==========================================
// 职责: 封装装箱单导入/导出/查询/审批功能
// 输入输出均为已解码的字节流与 DTO；HTTP/multipart 由传输层负责
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::packing_list::PackingList;
use crate::domain::types::ListStatus;
use crate::exporter::print_grouping::{group_by_box, BoxGroup};
use crate::exporter::workbook_writer::{export_batch, ExportError};
use crate::importer::assembler::WorkbookImporter;
use crate::importer::validator::check_commodity_types;
use crate::repository::packing_list_repo::{
    PackingListPage, PackingListQuery, PackingListRepository,
};
use crate::repository::product_repo::ProductRepository;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ==========================================
// DTO
// ==========================================

/// 单 sheet 导入报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetImportReport {
    /// sheet 名
    pub sheet_name: String,
    /// 成功时为新建装箱单ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
    /// 失败时为该 sheet 的错误描述
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 工作簿导入响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkbookImportResponse {
    /// 店铺名称（取自文件名）
    pub store_name: String,
    /// 逐 sheet 结果
    pub sheets: Vec<SheetImportReport>,
    /// 成功 sheet 数
    pub imported: usize,
    /// 失败 sheet 数
    pub failed: usize,
    /// 导入耗时（毫秒）
    pub elapsed_ms: i64,
}

/// 导出响应（bytes 为 xlsx 工作簿）
#[derive(Debug, Clone)]
pub struct ExportedWorkbook {
    pub bytes: Vec<u8>,
    /// 批量导出中未找到、被跳过的ID
    pub missing_ids: Vec<String>,
}

/// 打印视图响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintViewResponse {
    pub list_id: String,
    pub store_name: String,
    pub groups: Vec<BoxGroup>,
}

// ==========================================
// PackingListApi
// ==========================================
pub struct PackingListApi {
    lists: Arc<PackingListRepository>,
    products: Arc<dyn ProductRepository>,
}

impl PackingListApi {
    pub fn new(lists: Arc<PackingListRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self { lists, products }
    }

    /// 导入装箱单工作簿
    ///
    /// # 参数
    /// - `file_name`: 上传文件显示名（须符合 {店铺名}海运ERP.xlsx 约定）
    /// - `bytes`: 工作簿内容
    ///
    /// # 返回
    /// - `Ok`: 逐 sheet 成败报告（坏 sheet 不影响其他 sheet）
    /// - `Err`: 整单级失败（文件名非法/无法解析/无数据 sheet）
    pub async fn import_workbook(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> ApiResult<WorkbookImportResponse> {
        let started = Utc::now();

        let store_name = crate::importer::store_name::extract_store_name(file_name)?;
        let importer = WorkbookImporter::new(self.lists.clone(), self.products.clone());
        let sheet_results = importer.import_workbook(file_name, bytes)?;

        let mut sheets = Vec::with_capacity(sheet_results.len());
        let mut imported = 0usize;
        let mut failed = 0usize;
        for result in sheet_results {
            match result.outcome {
                Ok(list) => {
                    imported += 1;
                    sheets.push(SheetImportReport {
                        sheet_name: result.sheet_name,
                        list_id: Some(list.list_id),
                        error: None,
                    });
                }
                Err(e) => {
                    failed += 1;
                    sheets.push(SheetImportReport {
                        sheet_name: result.sheet_name,
                        list_id: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let elapsed_ms = (Utc::now() - started).num_milliseconds();
        tracing::info!(store = %store_name, imported, failed, elapsed_ms, "工作簿导入完成");

        Ok(WorkbookImportResponse {
            store_name,
            sheets,
            imported,
            failed,
            elapsed_ms,
        })
    }

    /// 导出装箱单（单个或批量；批量时每单一个 sheet）
    ///
    /// 未找到的ID跳过并记入 missing_ids；全部未找到时报 NotFound
    pub async fn export_workbook(&self, ids: &[String]) -> ApiResult<ExportedWorkbook> {
        if ids.is_empty() {
            return Err(ApiError::InvalidInput("导出ID列表不能为空".to_string()));
        }

        let mut lists = Vec::with_capacity(ids.len());
        let mut missing_ids = Vec::new();
        for id in ids {
            match self.lists.find_by_id(id)? {
                Some(list) => lists.push(list),
                None => {
                    tracing::warn!(list_id = %id, "导出跳过不存在的装箱单");
                    missing_ids.push(id.clone());
                }
            }
        }

        if lists.is_empty() {
            return Err(ApiError::from(ExportError::ListNotFound(ids.join(", "))));
        }

        let bytes = export_batch(&lists)?;
        Ok(ExportedWorkbook { bytes, missing_ids })
    }

    /// 手工创建装箱单（与导入同一套结构/类型校验）
    pub async fn create_packing_list(&self, mut list: PackingList) -> ApiResult<String> {
        list.list_id = PackingList::new_id();
        list.status = ListStatus::Pending;
        let now = Utc::now();
        list.created_at = now;
        list.updated_at = now;

        if list.store_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("店铺名称不能为空".to_string()));
        }
        list.validate_structure()
            .map_err(|v| ApiError::InvalidInput(v.join("; ")))?;

        let skus: Vec<String> = list.items.iter().map(|i| i.sku.clone()).collect();
        let existing = self.products.find_by_skus(&skus)?;
        check_commodity_types(list.commodity_type, &list.items, &existing)?;

        Ok(self.lists.save(&list)?)
    }

    /// 分页查询装箱单
    pub async fn list_packing_lists(&self, query: &PackingListQuery) -> ApiResult<PackingListPage> {
        Ok(self.lists.list(query)?)
    }

    /// 装箱单详情
    pub async fn get_packing_list(&self, list_id: &str) -> ApiResult<PackingList> {
        self.lists
            .find_by_id(list_id)?
            .ok_or_else(|| ApiError::NotFound(format!("PackingList (id={})", list_id)))
    }

    /// 审批（pending → approved，单向）
    pub async fn approve(&self, list_id: &str) -> ApiResult<PackingList> {
        let approved = self.lists.update_status(list_id, ListStatus::Approved)?;
        tracing::info!(list_id = %list_id, "装箱单已审批");
        Ok(approved)
    }

    /// 删除装箱单
    pub async fn delete(&self, list_id: &str) -> ApiResult<()> {
        if self.lists.delete(list_id)? {
            Ok(())
        } else {
            Err(ApiError::NotFound(format!("PackingList (id={})", list_id)))
        }
    }

    /// 打印视图（按箱号分组，纯读侧）
    pub async fn print_view(&self, list_id: &str) -> ApiResult<PrintViewResponse> {
        let list = self.get_packing_list(list_id).await?;
        let groups = group_by_box(&list);
        Ok(PrintViewResponse {
            list_id: list.list_id,
            store_name: list.store_name,
            groups,
        })
    }
}
