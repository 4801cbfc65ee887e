//! Shop Listing Use Case

use std::sync::Arc;

use crate::domain::entity::shop_item::ShopItem;
use crate::domain::repository::ShopRepository;
use crate::error::ClassroomResult;

/// Shop listing use case
pub struct ShopUseCase<R>
where
    R: ShopRepository,
{
    shop_repo: Arc<R>,
}

impl<R> ShopUseCase<R>
where
    R: ShopRepository,
{
    pub fn new(shop_repo: Arc<R>) -> Self {
        Self { shop_repo }
    }

    /// The whole catalog, unfiltered and unpaginated
    pub async fn list_items(&self) -> ClassroomResult<Vec<ShopItem>> {
        let items = self.shop_repo.list_items().await?;
        tracing::debug!(count = items.len(), "Listed shop items");
        Ok(items)
    }
}
