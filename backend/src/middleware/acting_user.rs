//! Acting user extraction
//!
//! The API has no authentication. Callers name themselves with the
//! `X-Acting-User` header, which is only recorded on the documents they touch.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

pub const ACTING_USER_HEADER: &str = "x-acting-user";
const DEFAULT_ACTING_USER: &str = "system";

/// Opaque identity of the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser(pub String);

impl ActingUser {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(ACTING_USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_ACTING_USER);

        Ok(ActingUser(user.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> ActingUser {
        let (mut parts, _) = request.into_parts();
        match ActingUser::from_request_parts(&mut parts, &()).await {
            Ok(user) => user,
            Err(never) => match never {},
        }
    }

    #[test]
    fn test_header_names_the_user() {
        let request = Request::builder()
            .header(ACTING_USER_HEADER, "amel")
            .body(())
            .unwrap();
        assert_eq!(tokio_test::block_on(extract(request)).as_str(), "amel");
    }

    #[test]
    fn test_blank_or_missing_header_defaults_to_system() {
        let request = Request::builder().body(()).unwrap();
        assert_eq!(tokio_test::block_on(extract(request)).as_str(), "system");

        let request = Request::builder()
            .header(ACTING_USER_HEADER, "  ")
            .body(())
            .unwrap();
        assert_eq!(tokio_test::block_on(extract(request)).as_str(), "system");
    }
}
