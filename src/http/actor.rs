use actix_web::{http::header, web, FromRequest};
use futures::future::{ready, LocalBoxFuture};

use crate::{config, schema::User, App};

use super::{Error, Jwt};

/// Who is knocking: either a logged-in user or nobody in
/// particular. A missing, malformed or stale session token all
/// quietly mean [`Actor::Anonymous`]; author-only pages turn that
/// into a login redirect through [`Actor::get_user`].
#[derive(Debug)]
pub enum Actor {
    Anonymous,
    User(User),
}

impl Actor {
    pub fn get_user(self, config: &config::Server) -> Result<User, Error> {
        #[derive(Debug, thiserror::Error)]
        #[error("Attempt to access an author-only page")]
        struct Unauthenticated;

        match self {
            Self::User(user) => Ok(user),
            Self::Anonymous => Err(Error::from_context(
                crate::types::Error::AuthRequired {
                    login_url: config.login_url.clone(),
                },
                Unauthenticated,
            )),
        }
    }
}

impl FromRequest for Actor {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_owned);

        let Some(token) = token else {
            return Box::pin(ready(Ok(Actor::Anonymous)));
        };

        let Some(app) = req.app_data::<web::Data<App>>() else {
            #[derive(Debug, thiserror::Error)]
            #[error("The web app has no available configuration")]
            struct NoConfig;
            return Box::pin(ready(Err(Error::from_context(
                crate::types::Error::Internal,
                NoConfig,
            ))));
        };

        let app = app.clone();
        Box::pin(async move {
            let Ok(jwt) = Jwt::decode(&token, app.config.jwt_secret.as_str()) else {
                return Ok(Actor::Anonymous);
            };

            let mut conn = app.db_read_prefer_primary().await?;
            if let Some(user) = User::by_id(&mut conn, jwt.user_id).await? {
                Ok(Actor::User(user))
            } else {
                Ok(Actor::Anonymous)
            }
        })
    }
}
