//! The fixed set of sub-clients owned by a session.

use std::sync::Arc;

use crate::auth::{Token, TokenCell};

use super::category::Category;
use super::client::*;
use super::http::HttpTransport;
use super::retry::{Reauthenticator, RetryHandler};

/// One sub-client per [`Category`], all wired to the same token cell,
/// transport and retry handler. Members cannot be added or removed.
#[derive(Debug)]
pub struct ClientRegistry {
    token: TokenCell,
    pub(crate) users: UserClient,
    pub(crate) projects: ProjectClient,
    pub(crate) studies: StudyClient,
    pub(crate) files: FileClient,
    pub(crate) samples: SampleClient,
    pub(crate) cohorts: CohortClient,
    pub(crate) families: FamilyClient,
    pub(crate) jobs: JobClient,
    pub(crate) individuals: IndividualClient,
    pub(crate) alignments: AlignmentClient,
    pub(crate) variants: VariantClient,
    pub(crate) clinical: ClinicalClient,
    pub(crate) ga4gh: Ga4ghClient,
    pub(crate) meta: MetaClient,
    pub(crate) admin: AdminClient,
    pub(crate) disease_panels: DiseasePanelClient,
    pub(crate) variant_operations: VariantOperationClient,
}

impl ClientRegistry {
    pub fn build(
        transport: HttpTransport,
        token: TokenCell,
        retry: Arc<dyn RetryHandler>,
        session: Arc<dyn Reauthenticator>,
    ) -> Self {
        let make = |category: Category| {
            ResourceClient::new(
                category,
                transport.clone(),
                token.clone(),
                retry.clone(),
                session.clone(),
            )
        };

        Self {
            users: UserClient::new(make(Category::Users)),
            projects: ProjectClient::new(make(Category::Projects)),
            studies: StudyClient::new(make(Category::Studies)),
            files: FileClient::new(make(Category::Files)),
            samples: SampleClient::new(make(Category::Samples)),
            cohorts: CohortClient::new(make(Category::Cohorts)),
            families: FamilyClient::new(make(Category::Families)),
            jobs: JobClient::new(make(Category::Jobs)),
            individuals: IndividualClient::new(make(Category::Individuals)),
            alignments: AlignmentClient::new(make(Category::Alignments)),
            variants: VariantClient::new(make(Category::Variants)),
            clinical: ClinicalClient::new(make(Category::Clinical)),
            ga4gh: Ga4ghClient::new(make(Category::Ga4gh)),
            meta: MetaClient::new(make(Category::Meta)),
            admin: AdminClient::new(make(Category::Admin)),
            disease_panels: DiseasePanelClient::new(make(Category::DiseasePanels)),
            variant_operations: VariantOperationClient::new(make(Category::VariantOperations)),
            token,
        }
    }

    /// Replace the token every member sends. All members observe the new
    /// value once this returns.
    pub fn propagate(&self, token: Option<Token>) {
        self.token.set(token);
    }

    pub fn get(&self, category: Category) -> &ResourceClient {
        match category {
            Category::Users => &*self.users,
            Category::Projects => &*self.projects,
            Category::Studies => &*self.studies,
            Category::Files => &*self.files,
            Category::Samples => &*self.samples,
            Category::Cohorts => &*self.cohorts,
            Category::Families => &*self.families,
            Category::Jobs => &*self.jobs,
            Category::Individuals => &*self.individuals,
            Category::Alignments => &*self.alignments,
            Category::Variants => &*self.variants,
            Category::Clinical => &*self.clinical,
            Category::Ga4gh => &*self.ga4gh,
            Category::Meta => &*self.meta,
            Category::Admin => &*self.admin,
            Category::DiseasePanels => &*self.disease_panels,
            Category::VariantOperations => &*self.variant_operations,
        }
    }

    /// Every member, in [`Category`] declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceClient> {
        use strum::IntoEnumIterator;
        Category::iter().map(move |category| self.get(category))
    }

    pub fn len(&self) -> usize {
        <Category as strum::EnumCount>::COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    #[cfg(test)]
    pub(crate) fn token_cell(&self) -> &TokenCell {
        &self.token
    }
}
