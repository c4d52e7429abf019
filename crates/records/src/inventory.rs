// Inventory / supply items

use chrono::NaiveDate;

use crate::coerce::{date, float, int, required, text};
use crate::entity::Entity;
use crate::error::MappingError;
use crate::mapper::TabularRecord;
use crate::schema::{col, RecordKind};
use crate::table::Row;

pub type InventoryItem = Entity<InventoryData>;

/// One monthly supply line. `(month, product_code)` is not unique and the
/// numeric fields are independent inputs: `total_amount` is whatever was
/// entered, never `quantity * unit_price`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryData {
    pub month: NaiveDate,
    pub product_code: String,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub unit: Option<String>,
    pub total_weight_kg: Option<f64>,
    pub unit_price: Option<f64>,
    pub total_amount: Option<f64>,
    pub source: Option<String>,
    pub supplier: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl TabularRecord for InventoryData {
    const KIND: RecordKind = RecordKind::Inventory;

    fn to_row(&self) -> Row {
        let mut row = Row::with_capacity(RecordKind::Inventory.columns().len());
        row.set(col::MONTH, self.month);
        row.set(col::PRODUCT_CODE, self.product_code.clone());
        row.set(col::PRODUCT_DESCRIPTION, self.description.clone());
        row.set(col::QUANTITY, self.quantity);
        row.set(col::UNIT, self.unit.clone());
        row.set(col::TOTAL_WEIGHT_KG, self.total_weight_kg);
        row.set(col::UNIT_PRICE, self.unit_price);
        row.set(col::TOTAL_AMOUNT, self.total_amount);
        row.set(col::SOURCE, self.source.clone());
        row.set(col::SUPPLIER, self.supplier.clone());
        row.set(col::LOCATION, self.location.clone());
        row.set(col::NOTES, self.notes.clone());
        row
    }

    fn from_row(row: &Row) -> Result<Self, MappingError> {
        Ok(Self {
            month: required(date(row, col::MONTH)?, col::MONTH)?,
            product_code: required(text(row, col::PRODUCT_CODE), col::PRODUCT_CODE)?,
            description: text(row, col::PRODUCT_DESCRIPTION),
            quantity: int(row, col::QUANTITY)?,
            unit: text(row, col::UNIT),
            total_weight_kg: float(row, col::TOTAL_WEIGHT_KG)?,
            unit_price: float(row, col::UNIT_PRICE)?,
            total_amount: float(row, col::TOTAL_AMOUNT)?,
            source: text(row, col::SOURCE),
            supplier: text(row, col::SUPPLIER),
            location: text(row, col::LOCATION),
            notes: text(row, col::NOTES),
        })
    }
}
