//! Schema snapshots
//!
//! A snapshot groups the providers configured for one schema source and holds
//! what they last read, one object set per category.

use indexmap::IndexMap;

use crate::dacpac::SchemaModel;
use crate::error::Result;
use crate::schema::provider::{CatalogObjectProvider, ModelObjectProvider, ObjectProvider};
use crate::schema::types::{Category, ObjectSet, SchemaSource};

/// Object sets of the configured categories for one schema source
#[derive(Debug, Clone)]
pub struct Snapshot {
    source: SchemaSource,
    categories: Vec<Category>,
    objects: IndexMap<Category, ObjectSet>,
}

impl Snapshot {
    /// Create an unread snapshot for the requested categories
    ///
    /// Categories are kept in canonical order (Table, View, Procedure).
    pub fn new(source: SchemaSource, categories: &[Category]) -> Self {
        let categories = Category::canonical(categories);
        let objects = categories
            .iter()
            .map(|category| (*category, ObjectSet::new()))
            .collect();

        Self {
            source,
            categories,
            objects,
        }
    }

    /// Create a snapshot whose object sets are already known
    ///
    /// The categories are configured in the order given. A later
    /// [`read_metadata`](Self::read_metadata) replaces the sets from `source`.
    pub fn from_objects(
        source: SchemaSource,
        objects: impl IntoIterator<Item = (Category, ObjectSet)>,
    ) -> Self {
        let objects: IndexMap<Category, ObjectSet> = objects.into_iter().collect();
        Self {
            source,
            categories: objects.keys().copied().collect(),
            objects,
        }
    }

    pub fn source(&self) -> &SchemaSource {
        &self.source
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Whether `category` is configured on this snapshot
    pub fn has_category(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    /// Objects last read for a configured category, empty before the first read
    pub fn objects(&self, category: Category) -> Option<&ObjectSet> {
        self.objects.get(&category)
    }

    /// Configured categories paired with their objects, in configuration order
    pub fn entries(&self) -> impl Iterator<Item = (Category, &ObjectSet)> + '_ {
        self.categories
            .iter()
            .filter_map(|category| self.objects.get(category).map(|objects| (*category, objects)))
    }

    /// Total number of objects across categories
    pub fn object_count(&self) -> usize {
        self.objects.values().map(|objects| objects.len()).sum()
    }

    /// Refresh every configured category from the schema source
    ///
    /// A dacpac is opened once and shared by all categories; a database gets
    /// one connection per category. On failure the previous sets are kept and
    /// the error is returned.
    pub async fn read_metadata(&mut self) -> Result<()> {
        tracing::info!(source = %self.source.describe(), "Reading schema metadata");

        let objects = match &self.source {
            SchemaSource::Dacpac(path) => {
                let model = SchemaModel::open(path)?;
                let providers: Vec<ModelObjectProvider> = self
                    .categories
                    .iter()
                    .map(|category| ModelObjectProvider::new(&model, *category))
                    .collect();
                read_all(&providers).await?
            }
            SchemaSource::Database(settings) => {
                let providers: Vec<CatalogObjectProvider> = self
                    .categories
                    .iter()
                    .map(|category| CatalogObjectProvider::new(settings, *category))
                    .collect();
                read_all(&providers).await?
            }
        };

        self.objects = objects;
        tracing::info!(
            source = %self.source.describe(),
            objects = self.object_count(),
            "Schema metadata read"
        );

        Ok(())
    }
}

async fn read_all<P: ObjectProvider>(providers: &[P]) -> Result<IndexMap<Category, ObjectSet>> {
    let mut objects = IndexMap::with_capacity(providers.len());

    for provider in providers {
        let set = provider.read().await?;
        tracing::debug!(category = %provider.category(), count = set.len(), "Read objects");
        objects.insert(provider.category(), set);
    }

    Ok(objects)
}
