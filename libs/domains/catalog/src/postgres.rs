use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};

use crate::entity::{category, product, product_category, product_image, size, variant};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    Category, NewProduct, NewProductImage, Product, ProductDetail, ProductFilter, Size, Variant,
};
use crate::repository::CatalogRepository;

pub struct PgCatalogRepository {
    db: DatabaseConnection,
}

impl PgCatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn ensure_categories_exist<C: ConnectionTrait>(
        conn: &C,
        category_ids: &[i32],
    ) -> CatalogResult<()> {
        for category_id in category_ids {
            let exists = category::Entity::find_by_id(*category_id)
                .count(conn)
                .await?
                > 0;
            if !exists {
                return Err(CatalogError::CategoryNotFound(*category_id));
            }
        }
        Ok(())
    }

    async fn insert_images<C: ConnectionTrait>(
        conn: &C,
        product_id: i32,
        images: Vec<NewProductImage>,
    ) -> CatalogResult<()> {
        if images.is_empty() {
            return Ok(());
        }
        let models = images.into_iter().map(|i| product_image::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            product_id: Set(product_id),
            image_url: Set(i.image_url),
            is_primary: Set(i.is_primary),
        });
        product_image::Entity::insert_many(models).exec(conn).await?;
        Ok(())
    }

    async fn insert_category_links<C: ConnectionTrait>(
        conn: &C,
        product_id: i32,
        category_ids: Vec<i32>,
    ) -> CatalogResult<()> {
        if category_ids.is_empty() {
            return Ok(());
        }
        let models = category_ids
            .into_iter()
            .map(|category_id| product_category::ActiveModel {
                product_id: Set(product_id),
                category_id: Set(category_id),
            });
        product_category::Entity::insert_many(models).exec(conn).await?;
        Ok(())
    }

    async fn load_detail(&self, model: product::Model) -> CatalogResult<ProductDetail> {
        let models = vec![model];
        let mut details = self.load_details(models).await?;
        // load_details preserves input length
        Ok(details.remove(0))
    }

    async fn load_details(&self, models: Vec<product::Model>) -> CatalogResult<Vec<ProductDetail>> {
        let images = models.load_many(product_image::Entity, &self.db).await?;
        let categories = models
            .load_many_to_many(category::Entity, product_category::Entity, &self.db)
            .await?;

        Ok(models
            .into_iter()
            .zip(images)
            .zip(categories)
            .map(|((product, images), categories)| ProductDetail {
                product: product.into(),
                images: images.into_iter().map(Into::into).collect(),
                categories: categories.into_iter().map(Into::into).collect(),
            })
            .collect())
    }

    fn filter_condition(filter: &ProductFilter) -> Condition {
        let mut condition = Condition::all();
        if let Some(ref search) = filter.search {
            condition = condition.add(product::Column::Name.contains(search));
        }
        if let Some(flash_sale) = filter.flash_sale {
            condition = condition.add(product::Column::IsFlashSale.eq(flash_sale));
        }
        condition
    }

    async fn product_ids_in_category(&self, category_id: i32) -> CatalogResult<Vec<i32>> {
        let links = product_category::Entity::find()
            .filter(product_category::Column::CategoryId.eq(category_id))
            .all(&self.db)
            .await?;
        Ok(links.into_iter().map(|l| l.product_id).collect())
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn create_product(&self, input: NewProduct) -> CatalogResult<ProductDetail> {
        let txn = self.db.begin().await?;

        Self::ensure_categories_exist(&txn, &input.category_ids).await?;

        let now = chrono::Utc::now();
        let active_model = product::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            stock: Set(input.stock),
            is_flash_sale: Set(input.is_flash_sale),
            discount_percent: Set(input.discount_percent),
            created_by: Set(input.created_by),
            updated_by: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let model = product::Entity::insert(active_model)
            .exec_with_returning(&txn)
            .await?;

        Self::insert_images(&txn, model.id, input.image_urls).await?;
        Self::insert_category_links(&txn, model.id, input.category_ids).await?;

        txn.commit().await?;
        tracing::info!(product_id = model.id, "Created product");
        self.load_detail(model).await
    }

    async fn get_product(&self, id: i32) -> CatalogResult<Option<ProductDetail>> {
        let model = product::Entity::find_by_id(id).one(&self.db).await?;
        match model {
            Some(model) => Ok(Some(self.load_detail(model).await?)),
            None => Ok(None),
        }
    }

    async fn list_products(&self, filter: ProductFilter) -> CatalogResult<(Vec<ProductDetail>, u64)> {
        let mut condition = Self::filter_condition(&filter);
        if let Some(category_id) = filter.category_id {
            let ids = self.product_ids_in_category(category_id).await?;
            condition = condition.add(product::Column::Id.is_in(ids));
        }

        let total = product::Entity::find()
            .filter(condition.clone())
            .count(&self.db)
            .await?;

        let models = product::Entity::find()
            .filter(condition)
            .order_by_asc(product::Column::Id)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(&self.db)
            .await?;

        let details = self.load_details(models).await?;
        Ok((details, total))
    }

    async fn update_product(
        &self,
        input: Product,
        images: Option<Vec<NewProductImage>>,
        category_ids: Option<Vec<i32>>,
    ) -> CatalogResult<ProductDetail> {
        let txn = self.db.begin().await?;

        if let Some(ref ids) = category_ids {
            Self::ensure_categories_exist(&txn, ids).await?;
        }

        let id = input.id;
        let active_model: product::ActiveModel = input.into();
        let model = product::Entity::update(active_model)
            .exec(&txn)
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotUpdated => CatalogError::ProductNotFound(id),
                _ => e.into(),
            })?;

        if let Some(images) = images {
            product_image::Entity::delete_many()
                .filter(product_image::Column::ProductId.eq(id))
                .exec(&txn)
                .await?;
            Self::insert_images(&txn, id, images).await?;
        }
        if let Some(ids) = category_ids {
            product_category::Entity::delete_many()
                .filter(product_category::Column::ProductId.eq(id))
                .exec(&txn)
                .await?;
            Self::insert_category_links(&txn, id, ids).await?;
        }

        txn.commit().await?;
        tracing::info!(product_id = id, "Updated product");
        self.load_detail(model).await
    }

    async fn delete_product(&self, id: i32) -> CatalogResult<bool> {
        let result = product::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let models = category::Entity::find()
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn get_category(&self, id: i32) -> CatalogResult<Option<Category>> {
        let model = category::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn create_category(&self, name: String) -> CatalogResult<Category> {
        let active_model = category::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            name: Set(name.clone()),
        };
        let model = category::Entity::insert(active_model)
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => CatalogError::DuplicateName(name),
                _ => e.into(),
            })?;
        Ok(model.into())
    }

    async fn update_category(&self, input: Category) -> CatalogResult<Category> {
        let id = input.id;
        let name = input.name.clone();
        let active_model = category::ActiveModel {
            id: Set(input.id),
            name: Set(input.name),
        };
        let model = category::Entity::update(active_model)
            .exec(&self.db)
            .await
            .map_err(|e| match (e.sql_err(), &e) {
                (Some(SqlErr::UniqueConstraintViolation(_)), _) => CatalogError::DuplicateName(name),
                (_, sea_orm::DbErr::RecordNotUpdated) => CatalogError::CategoryNotFound(id),
                _ => e.into(),
            })?;
        Ok(model.into())
    }

    async fn delete_category(&self, id: i32) -> CatalogResult<bool> {
        let result = category::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_sizes(&self) -> CatalogResult<Vec<Size>> {
        let models = size::Entity::find()
            .order_by_asc(size::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn get_size(&self, id: i32) -> CatalogResult<Option<Size>> {
        let model = size::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn create_size(&self, name: String, size_cost: f64) -> CatalogResult<Size> {
        let now = chrono::Utc::now();
        let active_model = size::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            name: Set(name),
            size_cost: Set(size_cost),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let model = size::Entity::insert(active_model)
            .exec_with_returning(&self.db)
            .await?;
        Ok(model.into())
    }

    async fn update_size(&self, input: Size) -> CatalogResult<Size> {
        let id = input.id;
        let active_model = size::ActiveModel {
            id: Set(input.id),
            name: Set(input.name),
            size_cost: Set(input.size_cost),
            created_at: Set(input.created_at.into()),
            updated_at: Set(input.updated_at.into()),
        };
        let model = size::Entity::update(active_model)
            .exec(&self.db)
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotUpdated => CatalogError::SizeNotFound(id),
                _ => e.into(),
            })?;
        Ok(model.into())
    }

    async fn delete_size(&self, id: i32) -> CatalogResult<bool> {
        let result = size::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_variants(&self) -> CatalogResult<Vec<Variant>> {
        let models = variant::Entity::find()
            .order_by_asc(variant::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn get_variant(&self, id: i32) -> CatalogResult<Option<Variant>> {
        let model = variant::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn create_variant(&self, name: String, variant_cost: f64) -> CatalogResult<Variant> {
        let now = chrono::Utc::now();
        let active_model = variant::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            name: Set(name),
            variant_cost: Set(variant_cost),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let model = variant::Entity::insert(active_model)
            .exec_with_returning(&self.db)
            .await?;
        Ok(model.into())
    }

    async fn update_variant(&self, input: Variant) -> CatalogResult<Variant> {
        let id = input.id;
        let active_model = variant::ActiveModel {
            id: Set(input.id),
            name: Set(input.name),
            variant_cost: Set(input.variant_cost),
            created_at: Set(input.created_at.into()),
            updated_at: Set(input.updated_at.into()),
        };
        let model = variant::Entity::update(active_model)
            .exec(&self.db)
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotUpdated => CatalogError::VariantNotFound(id),
                _ => e.into(),
            })?;
        Ok(model.into())
    }

    async fn delete_variant(&self, id: i32) -> CatalogResult<bool> {
        let result = variant::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::TestDatabase;

    fn new_product(name: &str, category_ids: Vec<i32>) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: Some("test".to_string()),
            price: 20000.0,
            stock: 10,
            is_flash_sale: false,
            discount_percent: None,
            created_by: None,
            image_urls: vec![],
            category_ids,
        }
    }

    #[tokio::test]
    #[ignore] // Requires Docker for the Postgres container
    async fn test_pg_product_with_categories_and_images() {
        let db = TestDatabase::migrated::<migration::Migrator>().await;
        let repo = PgCatalogRepository::new(db.connection());

        let coffee = repo.create_category("Coffee".to_string()).await.unwrap();

        let mut input = new_product("Kopi Susu", vec![coffee.id]);
        input.image_urls = vec![NewProductImage {
            image_url: "https://cdn.example/kopi.jpg".to_string(),
            is_primary: true,
        }];
        let created = repo.create_product(input).await.unwrap();

        let found = repo.get_product(created.product.id).await.unwrap().unwrap();
        assert_eq!(found.categories.len(), 1);
        assert_eq!(found.images.len(), 1);
    }

    #[tokio::test]
    #[ignore] // Requires Docker for the Postgres container
    async fn test_pg_list_filters_by_category() {
        let db = TestDatabase::migrated::<migration::Migrator>().await;
        let repo = PgCatalogRepository::new(db.connection());

        let coffee = repo.create_category("Coffee".to_string()).await.unwrap();
        repo.create_product(new_product("Kopi", vec![coffee.id]))
            .await
            .unwrap();
        repo.create_product(new_product("Teh", vec![])).await.unwrap();

        let (page, total) = repo
            .list_products(ProductFilter {
                category_id: Some(coffee.id),
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(page[0].product.name, "Kopi");
    }

    #[tokio::test]
    #[ignore] // Requires Docker for the Postgres container
    async fn test_pg_duplicate_category_is_conflict() {
        let db = TestDatabase::migrated::<migration::Migrator>().await;
        let repo = PgCatalogRepository::new(db.connection());

        repo.create_category("Snacks".to_string()).await.unwrap();
        let err = repo.create_category("Snacks".to_string()).await.unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateName(_)));
    }
}
