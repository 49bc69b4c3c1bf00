// ==========================================
// 海运ERP装箱单系统 - 一致性校验 (Consistency Validator)
// ==========================================
// 强制规则: 货物类型一致性——非混装单的每个 SKU，若已有商品记录，
//           其商品类型必须等于装箱单类型；违规项全量收集后一次报出
// 参考规则: 申报合计 vs 推导合计——源表普遍四舍五入，只告警不拦截
// ==========================================

use crate::domain::packing_list::{ComputedTotals, PackingListItem};
use crate::domain::product::Product;
use crate::domain::types::CommodityType;
use crate::importer::error::{ImportError, ImportResult, TypeMismatchEntry};
use crate::importer::header::DeclaredHeader;
use std::collections::BTreeSet;

/// 合计比对容差（重量/体积，绝对值）；箱数/件数按整数精确比对
const TOTALS_TOLERANCE: f64 = 0.5;

/// 由明细推导合计（装箱数量快照口径）
pub fn compute_totals(items: &[PackingListItem]) -> ComputedTotals {
    let mut box_numbers = BTreeSet::new();
    let mut total_pieces = 0i64;
    let mut total_weight = 0.0;
    let mut total_volume = 0.0;

    for item in items {
        for bq in &item.box_quantities {
            box_numbers.insert(bq.box_no.as_str());
            total_pieces += bq.quantity;
            total_weight += bq.spec.weight;
            total_volume += bq.spec.volume;
        }
    }

    ComputedTotals {
        box_count: box_numbers.len(),
        total_pieces,
        total_weight,
        total_volume,
    }
}

/// 货物类型一致性校验
///
/// # 参数
/// - `products`: 明细 SKU 能查到的已有商品记录（查不到的 SKU 不在其中，
///   它们随后会按装箱单类型自动补建，天然一致）
///
/// # 返回
/// - `Ok(())`: 通过（混装单直接豁免）
/// - `TypeMismatch`: 携带全部违规 (sku, 期望, 实际) 三元组
pub fn check_commodity_types(
    commodity_type: CommodityType,
    items: &[PackingListItem],
    products: &[Product],
) -> ImportResult<()> {
    if commodity_type.is_mixed() {
        tracing::debug!("装箱单类型为混装，跳过类型校验");
        return Ok(());
    }

    let mut mismatches = Vec::new();
    let mut seen = BTreeSet::new();
    for item in items {
        // 同一 SKU 只报一次
        if !seen.insert(item.sku.as_str()) {
            continue;
        }
        let Some(product) = products.iter().find(|p| p.sku == item.sku) else {
            continue;
        };
        if product.commodity_type != commodity_type {
            mismatches.push(TypeMismatchEntry {
                sku: item.sku.clone(),
                expected: commodity_type,
                actual: product.commodity_type,
            });
        }
    }

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(ImportError::TypeMismatch {
            expected: commodity_type,
            mismatches,
        })
    }
}

/// 申报合计与推导合计比对（参考性，只告警）
///
/// # 返回
/// - 推导合计（随后与申报值一并存入聚合，申报值为准）
pub fn cross_check_totals(header: &DeclaredHeader, items: &[PackingListItem]) -> ComputedTotals {
    let computed = compute_totals(items);

    if computed.box_count as i64 != header.total_boxes {
        tracing::warn!(
            declared = header.total_boxes,
            computed = computed.box_count,
            "申报总箱数与明细引用箱数不一致"
        );
    }
    if computed.total_pieces != header.total_pieces {
        tracing::warn!(
            declared = header.total_pieces,
            computed = computed.total_pieces,
            "申报总件数与明细合计不一致"
        );
    }
    if (computed.total_weight - header.total_weight).abs() > TOTALS_TOLERANCE {
        tracing::warn!(
            declared = header.total_weight,
            computed = computed.total_weight,
            "申报总重量与快照合计偏差超出容差"
        );
    }
    if (computed.total_volume - header.total_volume).abs() > TOTALS_TOLERANCE {
        tracing::warn!(
            declared = header.total_volume,
            computed = computed.total_volume,
            "申报总体积与快照合计偏差超出容差"
        );
    }

    computed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::packing_list::{BoxQuantity, BoxSpecification};

    fn spec(box_no: &str) -> BoxSpecification {
        BoxSpecification {
            box_no: box_no.to_string(),
            length: 60.0,
            width: 40.0,
            height: 40.0,
            weight: 15.0,
            volume: 0.096,
            edge_volume: 0.1152,
            piece_capacity: 100,
        }
    }

    fn item(sku: &str, placements: &[(&str, i64)]) -> PackingListItem {
        let box_quantities: Vec<BoxQuantity> = placements
            .iter()
            .map(|(box_no, q)| BoxQuantity {
                box_no: box_no.to_string(),
                quantity: *q,
                spec: spec(box_no),
            })
            .collect();
        PackingListItem {
            sku: sku.to_string(),
            display_name: None,
            total_quantity: box_quantities.iter().map(|bq| bq.quantity).sum(),
            box_quantities,
        }
    }

    fn product(sku: &str, t: CommodityType) -> Product {
        Product::auto_created(sku, None, t)
    }

    #[test]
    fn test_compute_totals_distinct_boxes() {
        let items = vec![
            item("SKU-A", &[("1#", 30), ("2#", 40)]),
            item("SKU-B", &[("1#", 10)]),
        ];
        let totals = compute_totals(&items);
        assert_eq!(totals.box_count, 2);
        assert_eq!(totals.total_pieces, 80);
        assert!((totals.total_weight - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_type_mismatch_collects_all() {
        let items = vec![
            item("SKU-A", &[("1#", 1)]),
            item("SKU-B", &[("1#", 1)]),
            item("SKU-C", &[("1#", 1)]),
        ];
        let products = vec![
            product("SKU-A", CommodityType::Textile),
            product("SKU-B", CommodityType::General),
            product("SKU-C", CommodityType::Textile),
        ];

        let err =
            check_commodity_types(CommodityType::General, &items, &products).unwrap_err();
        match err {
            ImportError::TypeMismatch { expected, mismatches } => {
                assert_eq!(expected, CommodityType::General);
                assert_eq!(mismatches.len(), 2);
                assert_eq!(mismatches[0].sku, "SKU-A");
                assert_eq!(mismatches[0].actual, CommodityType::Textile);
                assert_eq!(mismatches[1].sku, "SKU-C");
            }
            other => panic!("意外错误: {:?}", other),
        }
    }

    #[test]
    fn test_mixed_type_exempt() {
        let items = vec![item("SKU-A", &[("1#", 1)])];
        let products = vec![product("SKU-A", CommodityType::Textile)];
        assert!(check_commodity_types(CommodityType::Mixed, &items, &products).is_ok());
    }

    #[test]
    fn test_unknown_sku_exempt() {
        // 查不到的 SKU 将按装箱单类型补建，不算违规
        let items = vec![item("SKU-NEW", &[("1#", 1)])];
        assert!(check_commodity_types(CommodityType::General, &items, &[]).is_ok());
    }
}
