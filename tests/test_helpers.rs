// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试数据库初始化、装箱单工作簿构造、测试数据生成
// ==========================================

use chrono::Utc;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use seafreight_packing::db;
use seafreight_packing::domain::packing_list::{
    BoxQuantity, BoxSpecification, PackingList, PackingListItem,
};
use seafreight_packing::domain::product::Product;
use seafreight_packing::domain::types::{CommodityType, ListStatus};
use seafreight_packing::importer::layout;
use seafreight_packing::repository::product_repo::{ProductRepository, SqliteProductRepository};
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径非UTF-8")?
        .to_string();

    let conn = db::open_and_init(&db_path)?;
    drop(conn);

    Ok((temp_file, db_path))
}

/// 预置一个商品目录记录
pub fn seed_product(
    db_path: &str,
    sku: &str,
    chinese_name: &str,
    commodity_type: CommodityType,
) -> Result<Product, Box<dyn Error>> {
    let repo = SqliteProductRepository::new(db_path)?;
    let now = Utc::now();
    let product = Product {
        sku: sku.to_string(),
        name: sku.to_string(),
        chinese_name: chinese_name.to_string(),
        commodity_type,
        price: 9.9,
        stock: 100,
        is_auto_created: false,
        needs_completion: false,
        created_at: now,
        updated_at: now,
    };
    let (saved, _) = repo.create_or_fetch(&product)?;
    Ok(saved)
}

// ==========================================
// 装箱单 sheet 构造（按位置约定写入）
// ==========================================

/// 箱规测试数据
#[derive(Debug, Clone)]
pub struct FixtureBox {
    pub box_no: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    pub volume: f64,
    pub edge_volume: f64,
    pub piece_capacity: f64,
}

/// 商品明细行测试数据；quantities 与箱规槽位按下标对齐，0 表示该箱不装
#[derive(Debug, Clone)]
pub struct FixtureItem {
    pub sku: String,
    pub name: String,
    pub quantities: Vec<f64>,
}

/// 单个 sheet 的测试数据
#[derive(Debug, Clone)]
pub struct SheetFixture {
    pub commodity_type: Option<String>, // None 则 D1 留空
    pub total_boxes: Option<f64>,
    pub total_weight: Option<f64>,
    pub total_volume: Option<f64>,
    pub total_edge_volume: Option<f64>,
    pub total_pieces: Option<f64>,
    pub total_value: Option<f64>,
    pub boxes: Vec<FixtureBox>,
    pub items: Vec<FixtureItem>,
}

impl SheetFixture {
    /// 标准测试 sheet: 普货，2 箱规，2 商品
    pub fn standard() -> Self {
        Self {
            commodity_type: Some("普货".to_string()),
            total_boxes: Some(2.0),
            total_weight: Some(30.0),
            total_volume: Some(0.216),
            total_edge_volume: Some(0.25),
            total_pieces: Some(70.0),
            total_value: Some(888.0),
            boxes: vec![
                FixtureBox {
                    box_no: "1".to_string(),
                    length: 60.0,
                    width: 40.0,
                    height: 45.0,
                    weight: 18.0,
                    volume: 0.108,
                    edge_volume: 0.125,
                    piece_capacity: 40.0,
                },
                FixtureBox {
                    box_no: "2".to_string(),
                    length: 60.0,
                    width: 40.0,
                    height: 45.0,
                    weight: 12.0,
                    volume: 0.108,
                    edge_volume: 0.125,
                    piece_capacity: 30.0,
                },
            ],
            items: vec![
                FixtureItem {
                    sku: "SKU-001".to_string(),
                    name: "毛绒玩具".to_string(),
                    quantities: vec![40.0, 0.0],
                },
                FixtureItem {
                    sku: "SKU-002".to_string(),
                    name: "塑料水杯".to_string(),
                    quantities: vec![0.0, 30.0],
                },
            ],
        }
    }
}

fn write_fixture_sheet(ws: &mut Worksheet, fixture: &SheetFixture) -> Result<(), XlsxError> {
    // 表头申报值
    if let Some(t) = &fixture.commodity_type {
        let (r, c) = layout::COMMODITY_TYPE_CELL;
        ws.write_string(r, c as u16, t)?;
    }
    let header_cells = [
        (layout::TOTAL_BOXES_CELL, fixture.total_boxes),
        (layout::TOTAL_WEIGHT_CELL, fixture.total_weight),
        (layout::TOTAL_VOLUME_CELL, fixture.total_volume),
        (layout::TOTAL_EDGE_VOLUME_CELL, fixture.total_edge_volume),
        (layout::TOTAL_PIECES_CELL, fixture.total_pieces),
        (layout::TOTAL_VALUE_CELL, fixture.total_value),
    ];
    for ((r, c), value) in header_cells {
        if let Some(v) = value {
            ws.write_number(r, c as u16, v)?;
        }
    }

    // 箱规槽位
    for (slot, bx) in fixture.boxes.iter().enumerate() {
        let col = layout::slot_column(slot as u32) as u16;
        ws.write_number(layout::BOX_DIMENSION_ROW, col, bx.length)?;
        ws.write_number(layout::BOX_DIMENSION_ROW, col + 1, bx.width)?;
        ws.write_number(layout::BOX_DIMENSION_ROW, col + 2, bx.height)?;
        ws.write_number(layout::BOX_WEIGHT_ROW, col, bx.weight)?;
        ws.write_number(layout::BOX_VOLUME_ROW, col, bx.volume)?;
        ws.write_number(layout::BOX_EDGE_VOLUME_ROW, col, bx.edge_volume)?;
        ws.write_number(layout::BOX_PIECE_CAPACITY_ROW, col, bx.piece_capacity)?;
        ws.write_string(layout::BOX_NUMBER_ROW, col, &bx.box_no)?;
    }

    // 商品明细行
    for (i, item) in fixture.items.iter().enumerate() {
        let row = layout::ITEM_START_ROW + i as u32;
        ws.write_string(row, layout::ITEM_SKU_COL as u16, &item.sku)?;
        ws.write_string(row, layout::ITEM_NAME_COL as u16, &item.name)?;
        for (slot, qty) in item.quantities.iter().enumerate() {
            if *qty > 0.0 {
                let col = layout::slot_column(slot as u32) as u16;
                ws.write_number(row, col, *qty)?;
            }
        }
    }

    Ok(())
}

/// 构造一份装箱单工作簿字节流，每个 (sheet名, fixture) 对应一个 sheet
pub fn build_workbook(sheets: &[(&str, &SheetFixture)]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    for (name, fixture) in sheets {
        let ws = workbook.add_worksheet().set_name(*name)?;
        write_fixture_sheet(ws, fixture)?;
    }
    workbook.save_to_buffer()
}

/// 单 sheet 工作簿的便捷构造
pub fn build_single_sheet_workbook(fixture: &SheetFixture) -> Result<Vec<u8>, XlsxError> {
    build_workbook(&[("Sheet1", fixture)])
}

// ==========================================
// 领域聚合构造
// ==========================================

/// 构造一个结构合法的装箱单聚合（1 箱规，1 商品）
pub fn sample_packing_list(store_name: &str) -> PackingList {
    let spec = BoxSpecification {
        box_no: "1".to_string(),
        length: 60.0,
        width: 40.0,
        height: 45.0,
        weight: 18.0,
        volume: 0.108,
        edge_volume: 0.125,
        piece_capacity: 40,
    };
    let now = Utc::now();
    PackingList {
        list_id: PackingList::new_id(),
        store_name: store_name.to_string(),
        commodity_type: CommodityType::General,
        status: ListStatus::Pending,
        total_boxes: 1,
        total_weight: 18.0,
        total_volume: 0.108,
        total_edge_volume: Some(0.125),
        total_pieces: 40,
        total_value: 400.0,
        items: vec![PackingListItem {
            sku: "SKU-001".to_string(),
            display_name: Some("毛绒玩具".to_string()),
            total_quantity: 40,
            box_quantities: vec![BoxQuantity {
                box_no: "1".to_string(),
                quantity: 40,
                spec: spec.clone(),
            }],
        }],
        box_specifications: vec![spec],
        remarks: None,
        created_at: now,
        updated_at: now,
    }
}
