//! Per-category sub-clients.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::auth::{Token, TokenCell};
use crate::error::Result;

use super::category::{Category, Endpoint};
use super::http::{HttpTransport, RestRequest};
use super::response::RestResponse;
use super::retry::{Reauthenticator, RetryContext, RetryHandler};

/// A request wrapper scoped to one [`Category`].
///
/// Every sub-client of a session reads the same [`TokenCell`] and shares the
/// same [`RetryHandler`], so a login or refresh is seen by all of them.
pub struct ResourceClient {
    category: Category,
    transport: HttpTransport,
    token: TokenCell,
    retry: Arc<dyn RetryHandler>,
    session: Arc<dyn Reauthenticator>,
}

impl fmt::Debug for ResourceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("category", &self.category)
            .field("host", &self.transport.config().host())
            .field("token", &self.token)
            .finish()
    }
}

impl ResourceClient {
    pub(crate) fn new(
        category: Category,
        transport: HttpTransport,
        token: TokenCell,
        retry: Arc<dyn RetryHandler>,
        session: Arc<dyn Reauthenticator>,
    ) -> Self {
        Self {
            category,
            transport,
            token,
            retry,
            session,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// The token this sub-client currently sends.
    pub fn token(&self) -> Option<Token> {
        self.token.get()
    }

    #[cfg(test)]
    pub(crate) fn token_cell(&self) -> &TokenCell {
        &self.token
    }

    /// An endpoint rooted at this sub-client's category.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.category)
    }

    /// Issue `request`, re-issuing it once if the token was rejected (401) and
    /// the retry handler supplies a fresh token. A 403 is returned as is.
    pub async fn execute(&self, request: RestRequest) -> Result<RestResponse> {
        let token = self.token.get();
        let error = match self.transport.send(&request, token.as_ref()).await {
            Err(error) if error.is_expired_session() => error,
            other => return other,
        };

        let context = RetryContext {
            category: self.category,
            error: &error,
            request: &request,
            session: self.session.as_ref(),
        };
        match self.retry.on_auth_failure(context).await? {
            Some(fresh) => {
                tracing::debug!(
                    category = %self.category,
                    path = %request.path,
                    "Re-issuing request with refreshed token"
                );
                self.transport.send(&request, Some(&fresh)).await
            }
            None => Err(error),
        }
    }

    /// `GET {category}/{ids}/info`.
    pub async fn info(&self, ids: &str, query: &[(&str, &str)]) -> Result<RestResponse> {
        let path = self.endpoint().ids(ids).action("info").path();
        let request = with_query(RestRequest::get(path), query);
        self.execute(request).await
    }

    /// `GET {category}/search`.
    pub async fn search(&self, query: &[(&str, &str)]) -> Result<RestResponse> {
        let path = self.endpoint().action("search").path();
        let request = with_query(RestRequest::get(path), query);
        self.execute(request).await
    }
}

fn with_query(request: RestRequest, query: &[(&str, &str)]) -> RestRequest {
    query
        .iter()
        .fold(request, |request, (key, value)| request.query(*key, *value))
}

macro_rules! resource_clients {
    ($($(#[$doc:meta])* $name:ident => $category:ident,)+) => {
        $(
            $(#[$doc])*
            #[derive(Debug)]
            pub struct $name(ResourceClient);

            impl $name {
                pub const CATEGORY: Category = Category::$category;

                pub(crate) fn new(inner: ResourceClient) -> Self {
                    debug_assert_eq!(inner.category(), Category::$category);
                    Self(inner)
                }
            }

            impl Deref for $name {
                type Target = ResourceClient;

                fn deref(&self) -> &ResourceClient {
                    &self.0
                }
            }
        )+
    };
}

resource_clients! {
    /// `users` endpoints.
    UserClient => Users,
    ProjectClient => Projects,
    StudyClient => Studies,
    FileClient => Files,
    SampleClient => Samples,
    CohortClient => Cohorts,
    FamilyClient => Families,
    /// `jobs` endpoints; also the status source for job waiting.
    JobClient => Jobs,
    IndividualClient => Individuals,
    AlignmentClient => Alignments,
    VariantClient => Variants,
    ClinicalClient => Clinical,
    Ga4ghClient => Ga4gh,
    /// Server introspection: version and endpoint catalogue.
    MetaClient => Meta,
    AdminClient => Admin,
    DiseasePanelClient => DiseasePanels,
    VariantOperationClient => VariantOperations,
}
