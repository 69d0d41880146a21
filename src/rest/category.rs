//! Resource categories and endpoint paths.

use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString};

/// The fixed set of resource categories, one sub-client each.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, EnumCount, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Users,
    Projects,
    Studies,
    Files,
    Samples,
    Cohorts,
    Families,
    Jobs,
    Individuals,
    Alignments,
    Variants,
    Clinical,
    Ga4gh,
    Meta,
    Admin,
    DiseasePanels,
    VariantOperations,
}

impl Category {
    /// Path segment(s) the server mounts this category under.
    pub fn base_path(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Projects => "projects",
            Self::Studies => "studies",
            Self::Files => "files",
            Self::Samples => "samples",
            Self::Cohorts => "cohorts",
            Self::Families => "families",
            Self::Jobs => "jobs",
            Self::Individuals => "individuals",
            Self::Alignments => "analysis/alignment",
            Self::Variants => "analysis/variant",
            Self::Clinical => "analysis/clinical",
            Self::Ga4gh => "ga4gh",
            Self::Meta => "meta",
            Self::Admin => "admin",
            Self::DiseasePanels => "panels",
            Self::VariantOperations => "operation",
        }
    }
}

/// Builds `category[/ids][/subcategory][/sub_ids]/action` resource paths.
///
/// # Example
/// ```
/// use opencga::rest::{Category, Endpoint};
///
/// let path = Endpoint::new(Category::Files)
///     .ids("f1,f2")
///     .subcategory("annotationSets")
///     .sub_ids("as1")
///     .action("annotations/update")
///     .path();
/// assert_eq!(path, "files/f1,f2/annotationSets/as1/annotations/update");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    category: Category,
    ids: Option<String>,
    subcategory: Option<String>,
    sub_ids: Option<String>,
    action: Option<String>,
}

impl Endpoint {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            ids: None,
            subcategory: None,
            sub_ids: None,
            action: None,
        }
    }

    pub fn ids(mut self, ids: impl Into<String>) -> Self {
        self.ids = Some(ids.into());
        self
    }

    pub fn subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn sub_ids(mut self, sub_ids: impl Into<String>) -> Self {
        self.sub_ids = Some(sub_ids.into());
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn path(&self) -> String {
        let mut segments = vec![self.category.base_path()];
        for part in [&self.ids, &self.subcategory, &self.sub_ids, &self.action]
            .into_iter()
            .flatten()
        {
            let part = part.trim_matches('/');
            if !part.is_empty() {
                segments.push(part);
            }
        }
        segments.join("/")
    }
}
