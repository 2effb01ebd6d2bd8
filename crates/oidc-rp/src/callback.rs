//! Redirect URI parsing.

use url::Url;
use url::form_urlencoded;

use crate::grant::GrantValues;

/// Collects the parameters of a redirect back from the provider.
///
/// Query parameters are read first and fragment parameters second, so a
/// value in the fragment (implicit flow) replaces a query value with the
/// same name.
///
/// ```
/// use oidc_rp::callback::values_from_redirect;
/// use url::Url;
///
/// let url = Url::parse("https://app.example.com/callback?state=s#access_token=T&token_type=bearer")
///     .unwrap();
/// let values = values_from_redirect(&url);
///
/// assert_eq!(values["state"], "s");
/// assert_eq!(values["access_token"], "T");
/// ```
#[must_use]
pub fn values_from_redirect(url: &Url) -> GrantValues {
    let mut values: GrantValues = url.query_pairs().into_owned().collect();

    if let Some(fragment) = url.fragment() {
        values.extend(form_urlencoded::parse(fragment.as_bytes()).into_owned());
    }

    values
}

/// Returns `true` if `values` carries the expected `state`.
#[must_use]
pub fn state_matches(values: &GrantValues, expected: &str) -> bool {
    values.get("state").is_some_and(|state| state == expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_redirect() {
        let url = Url::parse("https://app.example.com/callback?code=abc&state=xyz").unwrap();
        let values = values_from_redirect(&url);

        assert_eq!(values.len(), 2);
        assert_eq!(values["code"], "abc");
        assert!(state_matches(&values, "xyz"));
        assert!(!state_matches(&values, "other"));
    }

    #[test]
    fn test_fragment_redirect_decodes_values() {
        let url = Url::parse(
            "https://app.example.com/callback#id_token=a.b.c&scope=openid%20profile&expires_in=3600",
        )
        .unwrap();
        let values = values_from_redirect(&url);

        assert_eq!(values["id_token"], "a.b.c");
        assert_eq!(values["scope"], "openid profile");
        assert_eq!(values["expires_in"], "3600");
    }

    #[test]
    fn test_fragment_wins() {
        let url = Url::parse("https://app.example.com/callback?state=query#state=fragment").unwrap();
        assert_eq!(values_from_redirect(&url)["state"], "fragment");
    }

    #[test]
    fn test_error_redirect() {
        let url = Url::parse(
            "https://app.example.com/callback?error=access_denied&error_description=User+cancelled",
        )
        .unwrap();
        let values = values_from_redirect(&url);

        assert_eq!(values["error"], "access_denied");
        assert_eq!(values["error_description"], "User cancelled");
    }

    #[test]
    fn test_no_parameters() {
        let url = Url::parse("https://app.example.com/callback").unwrap();
        let values = values_from_redirect(&url);

        assert!(values.is_empty());
        assert!(!state_matches(&values, ""));
    }
}
