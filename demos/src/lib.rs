//! # Dict Serializer Demos
//!
//! Sample entities shared by the demo binaries.
//!
//! ## Available Demos
//!
//! - `roundtrip_demo` - Export, encode, decode and import a small inventory

use dict_serializer::{DictEntity, DictHooks, FieldMap, Value};

/// Demos library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Mapping version written by [`Inventory`]'s export hook.
pub const SCHEMA_VERSION: u64 = 2;

#[derive(Debug, Clone, PartialEq, DictEntity)]
pub struct Item {
    pub sku: String,
    pub quantity: u32,
    pub price_cents: u64,
}

/// An inventory whose mapping carries a schema marker.
///
/// Export stamps `schema`; import strips it and upgrades version 1 items,
/// which used `qty` instead of `quantity`.
#[derive(Debug, Clone, PartialEq, DictEntity)]
#[dict(hooks)]
pub struct Inventory {
    pub warehouse: String,
    #[dict(nested)]
    pub items: Vec<Item>,
    #[dict(default)]
    pub notes: Option<String>,
    _dirty: bool,
}

impl Inventory {
    pub fn new(warehouse: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            warehouse: warehouse.into(),
            items,
            notes: None,
            _dirty: false,
        }
    }

    pub fn total_cents(&self) -> u64 {
        self.items
            .iter()
            .map(|i| u64::from(i.quantity) * i.price_cents)
            .sum()
    }
}

impl DictHooks for Inventory {
    fn pre_serialization(&self, mut mapping: FieldMap) -> FieldMap {
        mapping.insert("schema", SCHEMA_VERSION);
        mapping
    }

    fn pre_deserialization(mut mapping: FieldMap) -> FieldMap {
        let schema = mapping
            .remove("schema")
            .and_then(|v| v.as_u64())
            .unwrap_or(1);
        if schema < 2 {
            log::info!("upgrading inventory mapping from schema {schema}");
            if let Some(Value::List(items)) = mapping.get_mut("items") {
                for item in items.iter_mut().filter_map(Value::as_map_mut) {
                    item.rename("qty", "quantity");
                }
            }
        }
        mapping
    }
}

/// A small inventory used by the demos.
pub fn sample_inventory(count: u32) -> Inventory {
    let items = (0..count)
        .map(|i| Item {
            sku: format!("SKU-{i:04}"),
            quantity: i + 1,
            price_cents: 250 * u64::from(i + 1),
        })
        .collect();
    Inventory::new("north", items)
}
