//! Shop Item Entity

use serde::Serialize;

/// Catalog entry shown in the shop
///
/// The catalog is maintained outside the application; rows are only read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopItem {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
}
