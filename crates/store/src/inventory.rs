// Inventory operations

use serde::Serialize;
use serde_json::Value;

use jlife_records::{apply_patch, from_payload, InventoryData, InventoryItem};

use crate::error::StoreError;
use crate::page::{fetch_page, Page, PageRequest};
use crate::store::{self, find_one, now, Store};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyWeight {
    /// Two-digit month, `"01"` to `"12"`.
    pub month: String,
    pub total_weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductTotals {
    pub product: Option<String>,
    pub total_weight: Option<f64>,
    pub total_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceAmount {
    pub source: Option<String>,
    pub total_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryYearStats {
    pub year: i32,
    pub monthly: Vec<MonthlyWeight>,
    pub products: Vec<ProductTotals>,
    pub sources: Vec<SourceAmount>,
}

impl Store {
    pub fn create_item(&mut self, payload: &Value) -> Result<InventoryItem, StoreError> {
        let data: InventoryData = from_payload(payload)?;
        let tx = self.conn.transaction()?;
        let id = store::insert(&tx, &data, now())?;
        let item = find_one::<InventoryData, _>(&tx, "id = ?1", [id])?
            .ok_or_else(|| StoreError::not_found("inventory item", id))?;
        tx.commit()?;
        tracing::info!(id, product_code = %item.data.product_code, "inventory item created");
        Ok(item)
    }

    pub fn get_item(&self, id: i64) -> Result<InventoryItem, StoreError> {
        find_one(&self.conn, "id = ?1", [id])?.ok_or_else(|| StoreError::not_found("inventory item", id))
    }

    pub fn list_items(&self, request: PageRequest) -> Result<Page<InventoryItem>, StoreError> {
        fetch_page(&self.conn, request, None)
    }

    pub fn update_item(&mut self, id: i64, patch: &Value) -> Result<InventoryItem, StoreError> {
        let tx = self.conn.transaction()?;
        let current: InventoryItem =
            find_one(&tx, "id = ?1", [id])?.ok_or_else(|| StoreError::not_found("inventory item", id))?;
        let data = apply_patch(&current.data, patch)?;
        store::update(&tx, id, &data, now())?;
        let item = find_one::<InventoryData, _>(&tx, "id = ?1", [id])?
            .ok_or_else(|| StoreError::not_found("inventory item", id))?;
        tx.commit()?;
        tracing::info!(id, "inventory item updated");
        Ok(item)
    }

    pub fn delete_item(&mut self, id: i64) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        if !store::exists::<InventoryData, _>(&tx, "id = ?1", [id])? {
            return Err(StoreError::not_found("inventory item", id));
        }
        store::delete::<InventoryData>(&tx, id)?;
        tx.commit()?;
        tracing::info!(id, "inventory item deleted");
        Ok(())
    }

    /// Totals for one calendar year: weight per month, weight and quantity
    /// per product description, amount per source. Null sums stay null.
    pub fn inventory_yearly_stats(&self, year: i32) -> Result<InventoryYearStats, StoreError> {
        let year_text = format!("{year:04}");

        let mut stmt = self.conn.prepare(
            "SELECT strftime('%m', month) AS m, SUM(total_weight_kg) FROM inventory
             WHERE strftime('%Y', month) = ?1 GROUP BY m ORDER BY m",
        )?;
        let monthly = stmt
            .query_map([&year_text], |row| Ok(MonthlyWeight { month: row.get(0)?, total_weight: row.get(1)? }))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT description, SUM(total_weight_kg), SUM(quantity) FROM inventory
             WHERE strftime('%Y', month) = ?1 GROUP BY description ORDER BY description",
        )?;
        let products = stmt
            .query_map([&year_text], |row| {
                Ok(ProductTotals { product: row.get(0)?, total_weight: row.get(1)?, total_count: row.get(2)? })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT source, SUM(total_amount) FROM inventory
             WHERE strftime('%Y', month) = ?1 GROUP BY source ORDER BY source",
        )?;
        let sources = stmt
            .query_map([&year_text], |row| Ok(SourceAmount { source: row.get(0)?, total_amount: row.get(1)? }))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(InventoryYearStats { year, monthly, products, sources })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn add(store: &mut Store, month: &str, description: &str, weight: f64, qty: i64, source: &str, amount: f64) {
        store
            .create_item(&json!({
                "月份": month,
                "產品編號": "P",
                "產品描述": description,
                "數量": qty,
                "總重量_kg": weight,
                "物資來源": source,
                "總金額": amount,
            }))
            .unwrap();
    }

    #[test]
    fn test_yearly_stats() {
        let mut store = Store::open_in_memory().unwrap();
        add(&mut store, "2024-01-01", "米", 10.0, 2, "捐贈", 100.0);
        add(&mut store, "2024-01-15", "米", 5.0, 1, "採購", 50.0);
        add(&mut store, "2024-03-01", "油", 2.5, 3, "捐贈", 30.0);
        add(&mut store, "2023-12-01", "米", 99.0, 9, "捐贈", 999.0);

        let stats = store.inventory_yearly_stats(2024).unwrap();
        assert_eq!(
            stats.monthly,
            vec![
                MonthlyWeight { month: "01".into(), total_weight: Some(15.0) },
                MonthlyWeight { month: "03".into(), total_weight: Some(2.5) },
            ]
        );
        let rice = stats.products.iter().find(|p| p.product.as_deref() == Some("米")).unwrap();
        assert_eq!(rice.total_weight, Some(15.0));
        assert_eq!(rice.total_count, Some(3));
        let donated = stats.sources.iter().find(|s| s.source.as_deref() == Some("捐贈")).unwrap();
        assert_eq!(donated.total_amount, Some(130.0));
    }

    #[test]
    fn test_item_crud() {
        let mut store = Store::open_in_memory().unwrap();
        let item = store.create_item(&json!({"月份": "2024-02-01", "產品編號": "OIL"})).unwrap();
        let updated = store.update_item(item.id, &json!({"數量": 4})).unwrap();
        assert_eq!(updated.data.quantity, Some(4));
        assert_eq!(updated.data.product_code, "OIL");
        store.delete_item(item.id).unwrap();
        assert!(matches!(store.get_item(item.id), Err(StoreError::NotFound { .. })));
    }
}
