// src/utils/url.rs

//! Identity keys derived from announcement detail URLs.

use regex::Regex;

use crate::error::Result;
use crate::models::StoreConfig;

/// Extracts the numeric identity token carried by a detail URL query parameter.
///
/// # Examples
/// ```
/// use ntis_digest::utils::url::IdentityKey;
///
/// let key = IdentityKey::new("roRndUid").unwrap();
/// assert_eq!(
///     key.extract("https://www.ntis.go.kr/rndgate/eg/un/ra/view.do?roRndUid=1234567&flag=rndList"),
///     Some("1234567".to_string())
/// );
/// ```
#[derive(Debug, Clone)]
pub struct IdentityKey {
    param: String,
    pattern: Regex,
}

impl IdentityKey {
    /// Build an extractor for `param=(\d+)`.
    pub fn new(param: &str) -> Result<Self> {
        let pattern = Regex::new(&format!(r"{}=(\d+)", regex::escape(param)))?;
        Ok(Self {
            param: param.to_string(),
            pattern,
        })
    }

    /// Build the extractor named by the store configuration.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Self::new(&config.identity_param)
    }

    /// Query parameter name.
    pub fn param(&self) -> &str {
        &self.param
    }

    /// Extract the identity key, if the URL carries one.
    pub fn extract(&self, url: &str) -> Option<String> {
        self.pattern
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_query() {
        let key = IdentityKey::new("roRndUid").unwrap();
        assert_eq!(
            key.extract("https://www.ntis.go.kr/view.do?flag=rndList&roRndUid=987"),
            Some("987".to_string())
        );
    }

    #[test]
    fn test_missing_or_non_numeric() {
        let key = IdentityKey::new("roRndUid").unwrap();
        assert_eq!(key.extract("https://www.ntis.go.kr/view.do?id=1"), None);
        assert_eq!(key.extract("https://www.ntis.go.kr/view.do?roRndUid=abc"), None);
        assert_eq!(key.extract(""), None);
    }

    #[test]
    fn test_param_is_escaped() {
        let key = IdentityKey::new("a.b").unwrap();
        assert_eq!(key.extract("x?a.b=12"), Some("12".to_string()));
        assert_eq!(key.extract("x?aXb=12"), None);
    }
}
