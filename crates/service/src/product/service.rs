use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::domain::{dedup_ids, NewProduct, Product, ProductChanges, ProductForm, ProductKey, ProductPatch};
use super::repository::ProductRepository;
use crate::errors::ServiceError;
use crate::pagination::{Page, PageMeta, Pagination};
use crate::storage::{FileStore, Upload};

/// Application service owning the product rules: slug derivation,
/// pagination metadata and the image file lifecycle.
///
/// Files are only ever removed once the store has confirmed the write that
/// stops referencing them, so a failed update or create never leaves a
/// record pointing at a deleted image.
pub struct ProductService<R: ProductRepository + ?Sized, F: FileStore + ?Sized> {
    repo: Arc<R>,
    files: Arc<F>,
}

/// Service over trait objects, as held by the HTTP layer.
pub type DynProductService = ProductService<dyn ProductRepository, dyn FileStore>;

impl<R: ProductRepository + ?Sized, F: FileStore + ?Sized> ProductService<R, F> {
    pub fn new(repo: Arc<R>, files: Arc<F>) -> Self { Self { repo, files } }

    /// One page of products, newest first.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::category::repository::memory::InMemoryCategoryRepository;
    /// use service::pagination::Pagination;
    /// use service::product::{repository::memory::InMemoryProductRepository, ProductService};
    /// use service::storage::LocalFileStore;
    ///
    /// let repo = Arc::new(InMemoryProductRepository::new(Arc::new(InMemoryCategoryRepository::default())));
    /// let svc = ProductService::new(repo, Arc::new(LocalFileStore::new("uploads", "products")));
    /// let page = tokio_test::block_on(svc.list(Pagination { page: 1, limit: 10 })).unwrap();
    /// assert!(page.items.is_empty());
    /// assert_eq!(page.meta.total_count, 0);
    /// ```
    #[instrument(skip(self))]
    pub async fn list(&self, p: Pagination) -> Result<Page<Product>, ServiceError> {
        let total = self.repo.count().await?;
        let items = self.repo.find_page(p.skip(), p.take()).await?;
        Ok(Page { items, meta: PageMeta::compute(p, total) })
    }

    /// Look up by numeric id or by slug, see [`ProductKey::parse`].
    #[instrument(skip(self))]
    pub async fn get(&self, id_or_slug: &str) -> Result<Product, ServiceError> {
        let found = match ProductKey::parse(id_or_slug) {
            ProductKey::Id(id) => self.repo.find_by_id(id).await?,
            ProductKey::Slug(slug) => self.repo.find_by_slug(&slug).await?,
            ProductKey::Unmatchable => None,
        };
        found.ok_or_else(|| ServiceError::not_found("product"))
    }

    #[instrument(skip(self, form, image), fields(name = %form.name))]
    pub async fn create(&self, form: ProductForm, category_ids: Vec<i32>, image: Upload) -> Result<Product, ServiceError> {
        let slug = models::product::slug_for_name(&form.name)?;
        if let Some(price) = form.price {
            models::product::validate_price(price)?;
        }

        let stored = self.files.save(image).await?;
        let input = NewProduct {
            name: form.name,
            slug,
            description: form.description,
            price: form.price,
            image: Some(stored.clone()),
            category_ids: dedup_ids(category_ids),
        };
        match self.repo.create(input).await {
            Ok(p) => {
                info!(id = p.id, slug = %p.slug, image = %stored, "product_created");
                Ok(p)
            }
            Err(e) => {
                warn!(error = %e, image = %stored, "create failed; discarding uploaded image");
                self.discard(&stored).await;
                Err(e)
            }
        }
    }

    #[instrument(skip(self, patch, image), fields(id = id))]
    pub async fn update(
        &self,
        id: i32,
        patch: ProductPatch,
        category_ids: Option<Vec<i32>>,
        image: Option<Upload>,
    ) -> Result<Product, ServiceError> {
        let slug = match &patch.name {
            Some(name) => Some(models::product::slug_for_name(name)?),
            None => None,
        };
        if let Some(price) = patch.price {
            models::product::validate_price(price)?;
        }

        // Resolve the current image before touching the file store.
        let previous_image = match &image {
            Some(_) => {
                let current = self.repo.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("product"))?;
                current.image
            }
            None => None,
        };

        let new_image = match image {
            Some(upload) => Some(self.files.save(upload).await?),
            None => None,
        };

        let changes = ProductChanges {
            name: patch.name,
            slug,
            description: patch.description,
            price: patch.price,
            image: new_image.clone(),
            category_ids: category_ids.map(dedup_ids),
        };
        let updated = match self.repo.update(id, changes).await {
            Ok(p) => p,
            Err(e) => {
                if let Some(path) = &new_image {
                    warn!(error = %e, image = %path, "update failed; discarding uploaded image");
                    self.discard(path).await;
                }
                return Err(e);
            }
        };

        if let (Some(old), Some(new)) = (previous_image.as_deref(), new_image.as_deref()) {
            if old != new {
                self.discard(old).await;
            }
        }
        info!(id = updated.id, slug = %updated.slug, image_replaced = new_image.is_some(), "product_updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let removed = self.repo.delete(id).await?;
        if let Some(path) = removed.image.as_deref() {
            self.discard(path).await;
        }
        info!(id = removed.id, slug = %removed.slug, "product_deleted");
        Ok(())
    }

    /// Force-remove a file whose record no longer references it. The
    /// record change already succeeded, so a failure here is only logged.
    async fn discard(&self, path: &str) {
        if let Err(e) = self.files.remove(path).await {
            warn!(error = %e, %path, "could not remove image file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::category::repository::{memory::InMemoryCategoryRepository, CategoryRepository};
    use crate::product::repository::memory::InMemoryProductRepository;
    use crate::storage::LocalFileStore;

    struct Fixture {
        _tmp: tempfile::TempDir,
        svc: ProductService<InMemoryProductRepository, LocalFileStore>,
        repo: Arc<InMemoryProductRepository>,
        files: Arc<LocalFileStore>,
    }

    impl Fixture {
        fn exists(&self, path: &Option<String>) -> bool {
            path.as_deref().and_then(|p| self.files.resolve(p)).map(|p| p.exists()).unwrap_or(false)
        }

        fn stored_files(&self) -> usize {
            std::fs::read_dir(self.files.dir()).map(|d| d.count()).unwrap_or(0)
        }
    }

    async fn fixture() -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let categories = Arc::new(InMemoryCategoryRepository::default());
        categories.create("Mugs").await.unwrap();
        categories.create("Kitchen").await.unwrap();
        let repo = Arc::new(InMemoryProductRepository::new(categories));
        let files = Arc::new(LocalFileStore::new(tmp.path().join("uploads"), "products"));
        let svc = ProductService::new(repo.clone(), files.clone());
        Fixture { _tmp: tmp, svc, repo, files }
    }

    fn form(name: &str) -> ProductForm {
        ProductForm { name: name.into(), ..Default::default() }
    }

    fn png(bytes: &[u8]) -> Upload {
        Upload::new(Some("photo.png".into()), bytes.to_vec())
    }

    #[tokio::test]
    async fn red_mug_lifecycle() {
        let f = fixture().await;

        let created = f.svc.create(form("Red Mug"), vec![1, 2], png(b"f1")).await.unwrap();
        assert_eq!(created.slug, "red-mug");
        assert_eq!(created.categories.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(f.exists(&created.image));
        assert!(created.image.as_deref().is_some_and(|p| p.starts_with("products/")));
        let f1 = created.image.clone();

        let patch = ProductPatch { name: Some("Blue Mug".into()), ..Default::default() };
        let updated = f.svc.update(created.id, patch, None, Some(png(b"f2"))).await.unwrap();
        assert_eq!(updated.slug, "blue-mug");
        assert_ne!(updated.image, f1);
        assert!(f.exists(&updated.image));
        assert!(!f.exists(&f1));

        f.svc.delete(created.id).await.unwrap();
        assert!(!f.exists(&updated.image));
        assert!(matches!(f.svc.get(&created.id.to_string()).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn id_and_slug_lookups_agree() {
        let f = fixture().await;
        let created = f.svc.create(form("Tea Pot"), vec![], png(b"x")).await.unwrap();
        let by_id = f.svc.get(&created.id.to_string()).await.unwrap();
        let by_slug = f.svc.get("tea-pot").await.unwrap();
        assert_eq!(by_id, by_slug);
        assert!(matches!(f.svc.get("1.5").await, Err(ServiceError::NotFound(_))));
        assert!(matches!(f.svc.get("no-such-thing").await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn colliding_slug_fails_and_cleans_up_its_upload() {
        let f = fixture().await;
        let first = f.svc.create(form("Red Mug"), vec![], png(b"a")).await.unwrap();

        let err = f.svc.create(form("red  MUG!"), vec![], png(b"b")).await.unwrap_err();
        assert!(matches!(err, ServiceError::UniqueConstraint { ref fields } if fields == &vec!["slug".to_string()]));

        // only the first upload remains
        assert_eq!(f.stored_files(), 1);
        let still = f.svc.get("red-mug").await.unwrap();
        assert_eq!(still, first);
    }

    #[tokio::test]
    async fn update_without_name_keeps_slug() {
        let f = fixture().await;
        let created = f.svc.create(form("Red Mug"), vec![1], png(b"a")).await.unwrap();
        let patch = ProductPatch { description: Some("glazed".into()), price: Some(4.5), ..Default::default() };
        let updated = f.svc.update(created.id, patch, Some(vec![2, 2]), None).await.unwrap();
        assert_eq!(updated.slug, "red-mug");
        assert_eq!(updated.description.as_deref(), Some("glazed"));
        assert_eq!(updated.categories.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(updated.image, created.image);
        assert!(f.exists(&created.image));
    }

    #[tokio::test]
    async fn update_of_missing_product_touches_no_files() {
        let f = fixture().await;
        let err = f.svc.update(99, ProductPatch::default(), None, Some(png(b"z"))).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(f.repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failed_update_keeps_old_image_and_drops_new_one() {
        let f = fixture().await;
        f.svc.create(form("Red Mug"), vec![], png(b"a")).await.unwrap();
        let blue = f.svc.create(form("Blue Mug"), vec![], png(b"b")).await.unwrap();

        let patch = ProductPatch { name: Some("Red Mug".into()), ..Default::default() };
        let err = f.svc.update(blue.id, patch, None, Some(png(b"c"))).await.unwrap_err();
        assert!(matches!(err, ServiceError::UniqueConstraint { .. }));

        let after = f.svc.get(&blue.id.to_string()).await.unwrap();
        assert_eq!(after.image, blue.image);
        assert!(f.exists(&after.image));
        assert_eq!(f.stored_files(), 2);
    }

    #[tokio::test]
    async fn unknown_category_is_a_validation_error() {
        let f = fixture().await;
        let err = f.svc.create(form("Ghost"), vec![42], png(b"a")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn invalid_names_are_rejected_before_any_write() {
        let f = fixture().await;
        assert!(matches!(f.svc.create(form("  "), vec![], png(b"a")).await, Err(ServiceError::Validation(_))));
        let bad_price = ProductForm { name: "Cup".into(), price: Some(-1.0), ..Default::default() };
        assert!(matches!(f.svc.create(bad_price, vec![], png(b"a")).await, Err(ServiceError::Validation(_))));
        assert_eq!(f.repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let f = fixture().await;
        assert!(matches!(f.svc.delete(5).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_pages_newest_first() {
        let f = fixture().await;
        for name in ["a", "b", "c", "d", "e"] {
            f.svc.create(form(name), vec![], png(b"x")).await.unwrap();
        }
        let first = f.svc.list(Pagination { page: 1, limit: 2 }).await.unwrap();
        assert_eq!(first.items.iter().map(|p| p.slug.as_str()).collect::<Vec<_>>(), vec!["e", "d"]);
        assert_eq!(first.meta.total_count, 5);
        assert_eq!((first.meta.previous_page, first.meta.next_page), (None, Some(2)));

        let last = f.svc.list(Pagination { page: 3, limit: 2 }).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!((last.meta.previous_page, last.meta.next_page), (Some(2), None));
    }
}
