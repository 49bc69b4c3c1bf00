// ==========================================
// 海运ERP装箱单系统 - 装箱单组装器 (Packing List Assembler)
// ==========================================
// 流程（每 sheet）: 网格 → 表头 → 箱规 → 明细 → 类型校验 → 合计比对
//                  → 商品补建 → 聚合组装 → 事务落库
// 红线: 单 sheet 全有或全无；多 sheet 工作簿按 sheet 独立成败，
//       失败逐 sheet 报告，不因一个坏 sheet 中止整个上传
// ==========================================

use crate::domain::packing_list::PackingList;
use crate::domain::types::ListStatus;
use crate::importer::box_reader::read_box_specifications;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::grid::SheetGrid;
use crate::importer::header::{read_header, DeclaredHeader};
use crate::importer::item_reader::read_line_items;
use crate::importer::layout::COMMON_BOX_SPEC_SHEET;
use crate::importer::provisioner::ProductProvisioner;
use crate::importer::store_name::extract_store_name;
use crate::importer::validator::{check_commodity_types, cross_check_totals};
use crate::repository::packing_list_repo::PackingListRepository;
use crate::repository::product_repo::ProductRepository;
use calamine::Reader;
use chrono::{Local, Utc};
use std::io::Cursor;
use std::sync::Arc;

/// 单个 sheet 的导入结果
#[derive(Debug)]
pub struct SheetImport {
    pub sheet_name: String,
    pub outcome: Result<PackingList, ImportError>,
}

// ==========================================
// WorkbookImporter - 工作簿导入编排
// ==========================================
pub struct WorkbookImporter {
    lists: Arc<PackingListRepository>,
    products: Arc<dyn ProductRepository>,
}

impl WorkbookImporter {
    pub fn new(lists: Arc<PackingListRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self { lists, products }
    }

    /// 导入一份已解码的工作簿字节流
    ///
    /// # 参数
    /// - `file_name`: 上传文件的显示名（店铺名来源）
    /// - `bytes`: 工作簿内容（传输层负责临时文件生命周期）
    ///
    /// # 返回
    /// - `Ok(Vec<SheetImport>)`: 逐 sheet 的成败结果（至少一个数据 sheet）
    /// - `Err`: 整单级失败（文件名非法/无法解析/无数据 sheet），未触碰任何 sheet
    pub fn import_workbook(&self, file_name: &str, bytes: &[u8]) -> ImportResult<Vec<SheetImport>> {
        let store_name = extract_store_name(file_name)?;
        tracing::info!(file = %file_name, store = %store_name, "开始导入装箱单");

        let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| ImportError::WorkbookParse(e.to_string()))?;

        let sheet_names: Vec<String> = workbook
            .sheet_names()
            .iter()
            .filter(|name| name.as_str() != COMMON_BOX_SPEC_SHEET)
            .cloned()
            .collect();
        if sheet_names.is_empty() {
            return Err(ImportError::EmptyWorkbook);
        }

        let mut results = Vec::with_capacity(sheet_names.len());
        for sheet_name in sheet_names {
            let outcome = workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| ImportError::WorkbookParse(e.to_string()))
                .and_then(|range| {
                    let grid = SheetGrid::from_range(&range);
                    self.import_sheet(&store_name, &grid)
                });

            match &outcome {
                Ok(list) => {
                    tracing::info!(sheet = %sheet_name, list_id = %list.list_id, "sheet 导入成功")
                }
                Err(e) => tracing::warn!(sheet = %sheet_name, error = %e, "sheet 导入失败"),
            }
            results.push(SheetImport {
                sheet_name,
                outcome,
            });
        }

        Ok(results)
    }

    /// 导入单个 sheet（解析 → 校验 → 补建 → 组装 → 落库，整体原子）
    fn import_sheet(&self, store_name: &str, grid: &SheetGrid) -> ImportResult<PackingList> {
        let header = read_header(grid)?;
        let boxes = read_box_specifications(grid)?;
        let items = read_line_items(grid, &boxes)?;

        // 类型一致性: 只校验已有商品；缺失 SKU 随后按单类型补建
        let skus: Vec<String> = items.iter().map(|i| i.sku.clone()).collect();
        let existing = self.products.find_by_skus(&skus)?;
        check_commodity_types(header.commodity_type, &items, &existing)?;

        // 申报合计 vs 推导合计（参考性）
        cross_check_totals(&header, &items);

        // 商品补建（幂等，并发安全由仓储保证）
        let provisioner = ProductProvisioner::new(self.products.clone());
        let outcome = provisioner.provision_missing(header.commodity_type, &items)?;
        if outcome.created > 0 {
            tracing::info!(created = outcome.created, "导入补建了缺失商品");
        }

        let list = assemble(store_name, &header, boxes, items)?;
        self.lists.save(&list)?;
        Ok(list)
    }
}

/// 组装装箱单聚合并校验结构不变式
fn assemble(
    store_name: &str,
    header: &DeclaredHeader,
    boxes: Vec<crate::domain::packing_list::BoxSpecification>,
    items: Vec<crate::domain::packing_list::PackingListItem>,
) -> ImportResult<PackingList> {
    let now = Utc::now();
    let list = PackingList {
        list_id: PackingList::new_id(),
        store_name: store_name.to_string(),
        commodity_type: header.commodity_type,
        status: ListStatus::Pending,
        total_boxes: header.total_boxes,
        total_weight: header.total_weight,
        total_volume: header.total_volume,
        total_edge_volume: header.total_edge_volume,
        total_pieces: header.total_pieces,
        total_value: header.total_value,
        items,
        box_specifications: boxes,
        remarks: Some(format!(
            "从Excel导入于 {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        )),
        created_at: now,
        updated_at: now,
    };

    list.validate_structure()
        .map_err(ImportError::StructureInvalid)?;
    Ok(list)
}
