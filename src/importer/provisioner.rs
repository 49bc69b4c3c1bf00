// ==========================================
// 海运ERP装箱单系统 - 商品自动补建 (Product Auto-Provisioner)
// ==========================================
// 职责: 为明细中引用但目录缺失的 SKU 合成占位商品
// 红线: 并发安全依赖仓储的 create-or-fetch（插入、冲突则取回），
//       同一 SKU 的两个并发导入最终只产生一条记录
// ==========================================

use crate::domain::packing_list::PackingListItem;
use crate::domain::product::Product;
use crate::domain::types::CommodityType;
use crate::importer::error::ImportResult;
use crate::repository::product_repo::ProductRepository;
use std::collections::BTreeMap;
use std::sync::Arc;

/// 补建结果统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvisionOutcome {
    pub looked_up: usize, // 去重后的 SKU 总数
    pub created: usize,   // 本次实际补建数
}

// ==========================================
// ProductProvisioner
// ==========================================
pub struct ProductProvisioner {
    products: Arc<dyn ProductRepository>,
}

impl ProductProvisioner {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    /// 为缺失 SKU 补建占位商品（幂等）
    ///
    /// # 参数
    /// - `commodity_type`: 装箱单声明类型，补建商品继承该类型
    /// - `items`: 已解析明细（提供 SKU 与导入名称）
    ///
    /// # 返回
    /// - `Ok(ProvisionOutcome)`: 补建统计
    pub fn provision_missing(
        &self,
        commodity_type: CommodityType,
        items: &[PackingListItem],
    ) -> ImportResult<ProvisionOutcome> {
        // 去重并保留首个导入名称
        let mut wanted: BTreeMap<&str, Option<&str>> = BTreeMap::new();
        for item in items {
            wanted
                .entry(item.sku.as_str())
                .or_insert(item.display_name.as_deref());
        }

        let mut outcome = ProvisionOutcome {
            looked_up: wanted.len(),
            created: 0,
        };

        for (sku, display_name) in wanted {
            if self.products.find_by_sku(sku)?.is_some() {
                continue;
            }
            // 查后插之间另一导入可能抢先建档：create_or_fetch 冲突时取回已有记录
            let candidate = Product::auto_created(sku, display_name, commodity_type);
            let (_, created) = self.products.create_or_fetch(&candidate)?;
            if created {
                outcome.created += 1;
                tracing::info!(sku = %sku, "自动补建商品");
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::packing_list::{BoxQuantity, BoxSpecification};
    use crate::repository::error::RepositoryResult;
    use std::sync::Mutex;

    fn item(sku: &str, name: Option<&str>) -> PackingListItem {
        let spec = BoxSpecification {
            box_no: "1#".to_string(),
            length: 60.0,
            width: 40.0,
            height: 40.0,
            weight: 15.0,
            volume: 0.096,
            edge_volume: 0.1152,
            piece_capacity: 100,
        };
        PackingListItem {
            sku: sku.to_string(),
            display_name: name.map(|s| s.to_string()),
            total_quantity: 1,
            box_quantities: vec![BoxQuantity {
                box_no: "1#".to_string(),
                quantity: 1,
                spec,
            }],
        }
    }

    // ==========================================
    // FakeProductRepository - 可注入并发交错的假仓储
    // ==========================================
    #[derive(Default)]
    struct FakeProductRepository {
        store: Mutex<BTreeMap<String, Product>>,
        // 模拟在 find_by_sku 与 create_or_fetch 之间被并发导入抢建的 SKU
        race_skus: Vec<String>,
    }

    impl ProductRepository for FakeProductRepository {
        fn find_by_sku(&self, sku: &str) -> RepositoryResult<Option<Product>> {
            Ok(self.store.lock().unwrap().get(sku).cloned())
        }

        fn find_by_skus(&self, skus: &[String]) -> RepositoryResult<Vec<Product>> {
            let store = self.store.lock().unwrap();
            Ok(skus.iter().filter_map(|s| store.get(s).cloned()).collect())
        }

        fn create_or_fetch(&self, product: &Product) -> RepositoryResult<(Product, bool)> {
            let mut store = self.store.lock().unwrap();
            if self.race_skus.contains(&product.sku) && !store.contains_key(&product.sku) {
                // 对手方抢先插入了一条不同的记录
                let rival = Product::auto_created(&product.sku, Some("对手导入"), product.commodity_type);
                store.insert(product.sku.clone(), rival);
            }
            let created = !store.contains_key(&product.sku);
            let entry = store
                .entry(product.sku.clone())
                .or_insert_with(|| product.clone());
            Ok((entry.clone(), created))
        }
    }

    #[test]
    fn test_provision_creates_missing_only() {
        let repo = Arc::new(FakeProductRepository::default());
        repo.store.lock().unwrap().insert(
            "EXIST".to_string(),
            Product::auto_created("EXIST", None, CommodityType::General),
        );

        let provisioner = ProductProvisioner::new(repo.clone());
        let outcome = provisioner
            .provision_missing(
                CommodityType::General,
                &[item("EXIST", None), item("NEW-1", Some("新品")), item("NEW-1", None)],
            )
            .unwrap();

        assert_eq!(outcome.looked_up, 2);
        assert_eq!(outcome.created, 1);
        let created = repo.find_by_sku("NEW-1").unwrap().unwrap();
        assert_eq!(created.chinese_name, "新品");
        assert!(created.needs_completion);
    }

    #[test]
    fn test_provision_survives_create_race() {
        // 并发导入在查与插之间抢建同一 SKU：不报错，沿用已有记录
        let repo = Arc::new(FakeProductRepository {
            race_skus: vec!["HOT".to_string()],
            ..Default::default()
        });

        let provisioner = ProductProvisioner::new(repo.clone());
        let outcome = provisioner
            .provision_missing(CommodityType::Textile, &[item("HOT", Some("我方名称"))])
            .unwrap();

        assert_eq!(outcome.created, 0); // 拿到的是对手方记录
        let stored = repo.find_by_sku("HOT").unwrap().unwrap();
        assert_eq!(stored.chinese_name, "对手导入");
        assert_eq!(repo.store.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_provision_idempotent_across_reimports() {
        let repo = Arc::new(FakeProductRepository::default());
        let provisioner = ProductProvisioner::new(repo.clone());

        let first = provisioner
            .provision_missing(CommodityType::General, &[item("X", None)])
            .unwrap();
        let second = provisioner
            .provision_missing(CommodityType::General, &[item("X", None)])
            .unwrap();

        assert_eq!(first.created, 1);
        assert_eq!(second.created, 0);
        assert_eq!(repo.store.lock().unwrap().len(), 1);
    }
}
