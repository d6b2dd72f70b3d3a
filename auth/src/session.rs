use async_trait::async_trait;
use axum::response::IntoResponse;
use chrono::{DateTime, Duration, Utc};
use tower_cookies::{cookie::SameSite, Cookie, Cookies, Key};
use tracing::{event, Level};

use crate::Error;

#[async_trait]
pub trait SessionStore: Clone + Send + Sync + 'static {
    type UserId: Send + Sync + 'static;
    /// Information loaded alongside a valid session.
    type SessionFetchData: Send + Sync + 'static;
    type Error: IntoResponse + Send + Sync + 'static;

    async fn create_session(
        &self,
        user_id: Self::UserId,
        expires: DateTime<Utc>,
    ) -> Result<String, Self::Error>;

    /// Look up an unexpired session. Unknown or malformed ids return `Ok(None)`.
    async fn get_session(&self, id: &str) -> Result<Option<Self::SessionFetchData>, Self::Error>;

    async fn delete_session(&self, id: &str) -> Result<(), Self::Error>;

    /// Whether the session should stay alive. Sessions that fail this check are deleted,
    /// but the fetched data is still passed on so handlers can explain the rejection.
    fn session_is_valid(&self, data: &Self::SessionFetchData) -> bool;
}

#[derive(Clone)]
pub struct SessionCookieManager {
    pub signing_key: Key,
    pub cookie_name: String,
}

impl std::fmt::Debug for SessionCookieManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCookieManager")
            .field("cookie_name", &self.cookie_name)
            .finish_non_exhaustive()
    }
}

impl SessionCookieManager {
    /// Build from a base64 key, which must decode to at least 64 bytes.
    pub fn from_base64_key(key: &str, cookie_name: String) -> Result<Self, Error> {
        use base64::Engine;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(key)
            .map_err(|_| Error::InvalidCookieKey)?;
        let signing_key = Key::try_from(bytes.as_slice()).map_err(|_| Error::InvalidCookieKey)?;

        Ok(Self {
            signing_key,
            cookie_name,
        })
    }

    pub fn get(&self, cookies: &Cookies) -> Option<String> {
        cookies
            .signed(&self.signing_key)
            .get(&self.cookie_name)
            .map(|c| c.value().to_string())
    }

    pub fn set(&self, cookies: &Cookies, value: String, expires: DateTime<Utc>) {
        let max_age = (expires - Utc::now()).num_seconds().max(0);
        let cookie = Cookie::build(self.cookie_name.clone(), value)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(tower_cookies::cookie::time::Duration::seconds(max_age))
            .finish();

        cookies.signed(&self.signing_key).add(cookie);
    }

    pub fn clear(&self, cookies: &Cookies) {
        let mut cookie = Cookie::named(self.cookie_name.clone());
        cookie.set_path("/");
        cookies.remove(cookie);
    }
}

#[derive(Clone)]
pub struct SessionManager<STORE: SessionStore> {
    pub store: STORE,
    pub cookies: SessionCookieManager,
    pub expire_days: i64,
}

impl<STORE: SessionStore> SessionManager<STORE> {
    /// Start a session for the user and attach its cookie.
    pub async fn create_session(
        &self,
        cookies: &Cookies,
        user_id: STORE::UserId,
    ) -> Result<(), STORE::Error> {
        let expires = Utc::now() + Duration::days(self.expire_days);
        let session_id = self.store.create_session(user_id, expires).await?;
        self.cookies.set(cookies, session_id, expires);
        Ok(())
    }

    /// Resolve the request's cookie to a session, deleting it if it is no longer valid.
    pub async fn get_session(
        &self,
        cookies: &Cookies,
    ) -> Result<Option<STORE::SessionFetchData>, STORE::Error> {
        let Some(session_id) = self.cookies.get(cookies) else {
            return Ok(None);
        };

        let Some(data) = self.store.get_session(&session_id).await? else {
            event!(Level::DEBUG, "Clearing cookie for unknown or expired session");
            self.cookies.clear(cookies);
            return Ok(None);
        };

        if !self.store.session_is_valid(&data) {
            event!(Level::INFO, "Removing session for inactive user");
            self.store.delete_session(&session_id).await?;
            self.cookies.clear(cookies);
        }

        Ok(Some(data))
    }

    /// End the current session, if there is one.
    pub async fn logout(&self, cookies: &Cookies) -> Result<(), STORE::Error> {
        if let Some(session_id) = self.cookies.get(cookies) {
            self.store.delete_session(&session_id).await?;
        }

        self.cookies.clear(cookies);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const KEY: &str = "QjX+c1Nggom7lrxVTJFxMI7iQ0BRVr1oR9N64orRgdW3pp/SV+lE/1FOwo12UZj9QoBUUuv2rvcO0x+Omq+25Q==";

    #[test]
    fn rejects_short_key() {
        assert_matches!(
            SessionCookieManager::from_base64_key("c2hvcnQ=", "sid".to_string()),
            Err(Error::InvalidCookieKey)
        );
        assert_matches!(
            SessionCookieManager::from_base64_key("not base64!", "sid".to_string()),
            Err(Error::InvalidCookieKey)
        );
    }

    #[test]
    fn signed_round_trip() {
        let manager = SessionCookieManager::from_base64_key(KEY, "sid".to_string()).unwrap();
        let cookies = Cookies::default();
        manager.set(&cookies, "abc".to_string(), Utc::now() + Duration::days(1));
        assert_eq!(manager.get(&cookies).as_deref(), Some("abc"));

        // A cookie that wasn't signed with our key is ignored.
        cookies.add(Cookie::new("sid", "forged"));
        assert_eq!(manager.get(&cookies), None);
    }
}
