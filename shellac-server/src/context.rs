use std::{convert::Infallible, sync::Arc};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use shellac_library::PgLibrary;

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub library: Arc<PgLibrary>,
}

// Lets handlers take the context directly, without going through State
#[async_trait]
impl<S> FromRequestParts<S> for ServerContext
where
    Self: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_ref(state))
    }
}
