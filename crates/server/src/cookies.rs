//! Session cookie handling

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use oidc_rp_domain::constants::SESSION_COOKIE_NAME;

/// Session id carried by the request, if any.
pub fn session_id(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(session_id: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Cookie matching the session cookie's name and path, for `CookieJar::remove`.
pub fn session_cookie_removal() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_http_only_and_lax() {
        let cookie = session_cookie("abc".to_string(), false);

        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn secure_flag_follows_configuration() {
        assert_eq!(session_cookie("abc".to_string(), true).secure(), Some(true));
    }

    #[test]
    fn empty_cookie_is_no_session() {
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE_NAME, ""));
        assert_eq!(session_id(&jar), None);

        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE_NAME, "sid"));
        assert_eq!(session_id(&jar).as_deref(), Some("sid"));
    }
}
