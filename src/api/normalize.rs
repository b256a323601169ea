//! Normalization of remote response shapes.
//!
//! The catalog service is not consistent: depending on the endpoint an access token
//! arrives as `token` or `accessToken`, and the category list is either bare slugs
//! or `{slug, name, url}` objects. Each union is resolved here, once, so nothing
//! past the API boundary sees it.

use crate::api::AuthTokens;
use crate::domain::error::{CatalogError, Result};
use crate::domain::Category;
use serde::Deserialize;

/// Auth response as sent by the server, before normalization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Folds an auth response into [`AuthTokens`]. `accessToken` wins over `token`.
///
/// # Errors
///
/// Returns [`CatalogError::Unauthorized`] if neither field carries a token.
pub fn auth_tokens(raw: RawAuthResponse) -> Result<AuthTokens> {
    let access_token = raw
        .access_token
        .filter(|t| !t.is_empty())
        .or_else(|| raw.token.filter(|t| !t.is_empty()))
        .ok_or_else(|| CatalogError::Unauthorized("No token in response".to_string()))?;

    Ok(AuthTokens {
        access_token,
        refresh_token: raw.refresh_token.filter(|t| !t.is_empty()),
    })
}

/// One entry of the category list, in either wire shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCategory {
    Slug(String),
    Object {
        slug: String,
        #[serde(default)]
        name: Option<String>,
    },
}

/// Converts the category list, dropping entries without a slug.
#[must_use]
pub fn categories(raw: Vec<RawCategory>) -> Vec<Category> {
    raw.into_iter()
        .filter_map(|entry| match entry {
            RawCategory::Slug(slug) => {
                let slug = slug.trim();
                (!slug.is_empty()).then(|| Category::from_slug(slug))
            }
            RawCategory::Object { slug, name } => {
                let slug = slug.trim();
                if slug.is_empty() {
                    return None;
                }
                Some(match name.filter(|n| !n.trim().is_empty()) {
                    Some(name) => Category::new(slug, name),
                    None => Category::from_slug(slug),
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_auth(json: &str) -> Result<AuthTokens> {
        auth_tokens(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn access_token_under_either_name() {
        let tokens = parse_auth(r#"{"token":"abc"}"#).unwrap();
        assert_eq!(tokens.access_token, "abc");
        assert_eq!(tokens.refresh_token, None);

        let tokens = parse_auth(r#"{"accessToken":"xyz","refreshToken":"r"}"#).unwrap();
        assert_eq!(tokens.access_token, "xyz");
        assert_eq!(tokens.refresh_token.as_deref(), Some("r"));
    }

    #[test]
    fn access_token_preferred_over_token() {
        let tokens = parse_auth(r#"{"accessToken":"a","token":"t"}"#).unwrap();
        assert_eq!(tokens.access_token, "a");
    }

    #[test]
    fn missing_token_is_unauthorized() {
        let err = parse_auth(r#"{"id":1,"token":""}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Unauthorized(_)));
    }

    #[test]
    fn categories_from_both_shapes() {
        let raw: Vec<RawCategory> = serde_json::from_str(
            r#"[
                "smartphones",
                {"slug":"home-decoration","name":"Home Decoration","url":"https://x"},
                {"slug":"skin-care"},
                {"slug":"","name":"Broken"},
                " "
            ]"#,
        )
        .unwrap();

        let categories = categories(raw);
        let slugs: Vec<_> = categories.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, ["smartphones", "home-decoration", "skin-care"]);
        assert_eq!(categories[0].name, "Smartphones");
        assert_eq!(categories[1].name, "Home Decoration");
        assert_eq!(categories[2].name, "Skin Care");
    }
}
