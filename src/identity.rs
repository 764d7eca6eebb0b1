//! Turning the per-request `api-key` credential into a user.
use crate::api::State;
use crate::datastore::{User, UserStore};
use crate::twoface::{Cause, Fallible, TfError};
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{FutureExt, LocalBoxFuture};
use std::marker::PhantomData;
use tracing::debug;

/// The header every authenticated request carries.
pub const API_KEY_HEADER: &str = "api-key";

const UNAUTHENTICATED: &str = "No api-key credential supplied";
const INVALID_CREDENTIAL: &str = "Invalid api-key credential";

/// Find the user owning `credential`. A missing or empty credential and an unknown one are both
/// auth failures, but they're described differently.
pub async fn resolve<DS: UserStore>(ds: &DS, credential: Option<&str>) -> Fallible<User> {
    let credential = match credential {
        Some(credential) if !credential.is_empty() => credential,
        _ => return Err(TfError::rejection(Cause::UserBadAuth, UNAUTHENTICATED)),
    };
    let Some(user) = ds.find_user_by_api_key(credential.to_owned()).await? else {
        return Err(TfError::rejection(Cause::UserBadAuth, INVALID_CREDENTIAL));
    };
    debug!(user_id = user.id, "resolved caller");
    Ok(user)
}

/// The authenticated user making the request. Extracting it fails the request with 401 if the
/// `api-key` header is missing or unknown.
pub struct Caller<DS> {
    pub user: User,
    store: PhantomData<DS>,
}

impl<DS: UserStore> FromRequest for Caller<DS> {
    type Error = TfError;
    type Future = LocalBoxFuture<'static, Fallible<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<State<DS>>>().cloned();
        let credential = req
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        async move {
            let Some(state) = state else {
                return Err(anyhow::anyhow!("app state isn't registered").into());
            };
            let user = resolve(&state.ds, credential.as_deref()).await?;
            Ok(Caller {
                user,
                store: PhantomData,
            })
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::mock;

    #[actix_rt::test]
    async fn test_known_credential_resolves_its_owner() {
        let ds = mock::Client::default();
        let oliver = ds.add_user("Oliver", "000");
        ds.add_user("Jenia", "123");

        let user = resolve(&ds, Some("000")).await.unwrap();
        assert_eq!(user, oliver);
    }

    #[actix_rt::test]
    async fn test_missing_and_wrong_credentials_are_told_apart() {
        let ds = mock::Client::default();
        ds.add_user("Oliver", "000");

        let absent = resolve(&ds, None).await.unwrap_err();
        let empty = resolve(&ds, Some("")).await.unwrap_err();
        let wrong = resolve(&ds, Some("999")).await.unwrap_err();

        for err in [&absent, &empty, &wrong] {
            assert_eq!(err.external.cause, Cause::UserBadAuth);
        }
        assert_eq!(absent.external.text, UNAUTHENTICATED);
        assert_eq!(empty.external.text, UNAUTHENTICATED);
        assert_eq!(wrong.external.text, INVALID_CREDENTIAL);
    }
}
