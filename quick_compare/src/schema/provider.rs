//! Object providers
//!
//! A provider lists the qualified names of one object category in one schema
//! source. The model-backed provider reads an already opened dacpac model; the
//! catalog-backed provider queries a live database.

use async_trait::async_trait;

use crate::dacpac::SchemaModel;
use crate::db::catalog;
use crate::db::connection::ConnectionSettings;
use crate::error::Result;
use crate::schema::types::{Category, ObjectSet, QualifiedName};

/// Lists the objects of one category
#[async_trait]
pub trait ObjectProvider: Send + Sync {
    /// Category this provider enumerates
    fn category(&self) -> Category;

    /// Read the complete, de-duplicated set of qualified names
    ///
    /// Every call starts from scratch, so reading twice against an unchanged
    /// source yields the same set in the same order.
    async fn read(&self) -> Result<ObjectSet>;
}

/// Provider backed by a dacpac model shared by every category of a snapshot
pub struct ModelObjectProvider<'a> {
    model: &'a SchemaModel,
    category: Category,
}

impl<'a> ModelObjectProvider<'a> {
    pub fn new(model: &'a SchemaModel, category: Category) -> Self {
        Self { model, category }
    }
}

#[async_trait]
impl<'a> ObjectProvider for ModelObjectProvider<'a> {
    fn category(&self) -> Category {
        self.category
    }

    async fn read(&self) -> Result<ObjectSet> {
        // Model names are already schema-qualified
        Ok(self
            .model
            .names_of_type(self.category.rules().element_type)
            .map(QualifiedName::from)
            .collect())
    }
}

/// Provider backed by the system catalog of a live database
pub struct CatalogObjectProvider<'a> {
    settings: &'a ConnectionSettings,
    category: Category,
}

impl<'a> CatalogObjectProvider<'a> {
    pub fn new(settings: &'a ConnectionSettings, category: Category) -> Self {
        Self { settings, category }
    }
}

#[async_trait]
impl<'a> ObjectProvider for CatalogObjectProvider<'a> {
    fn category(&self) -> Category {
        self.category
    }

    async fn read(&self) -> Result<ObjectSet> {
        catalog::read_catalog(self.settings, self.category).await
    }
}
