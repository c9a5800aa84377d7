//! Upstream URL resolution.
//!
//! Maps an inbound path and query string onto the upstream URL(s) the
//! request should be relayed to. Pure: no I/O, no state.

use url::form_urlencoded;
use url::Url;

use super::error::RelayError;
use super::proxy::path_under_base;
use crate::config::UpstreamConfig;

pub const EXPOSURE_PATH: &str = "/download/exposure";
pub const WORKSPACE_PATH: &str = "/download/workspace";

const DEFAULT_ARCHIVE_FORMAT: &str = "zip";
const OMEX_SEGMENT: &str = "download_generated_omex";

/// Where a request goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamTarget {
    /// COMBINE archive of an exposure: short URL first, long URL as fallback
    ExposureDownload { primary: Url, fallback: Url },
    /// Archive of a workspace at a given commit
    WorkspaceDownload { url: Url },
    /// Generic pass-through; `base` is the proxy base the URL was built from
    Proxy { url: Url, base: Url },
}

/// Query parameters, first occurrence wins and empty values count as absent
struct Params(Vec<(String, String)>);

impl Params {
    fn parse(query: Option<&str>) -> Self {
        Self(
            query
                .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
                .unwrap_or_default(),
        )
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

pub fn resolve(
    path: &str,
    query: Option<&str>,
    cfg: &UpstreamConfig,
) -> Result<UpstreamTarget, RelayError> {
    let params = Params::parse(query);

    if path == EXPOSURE_PATH {
        let alias = params
            .get("alias")
            .or_else(|| params.get("exposureAlias"))
            .ok_or_else(|| RelayError::BadRequest("Missing alias parameter".to_string()))?;
        return exposure(&cfg.models_url, alias);
    }

    if path == WORKSPACE_PATH {
        let alias = params
            .get("alias")
            .or_else(|| params.get("workspaceAlias"))
            .ok_or_else(|| RelayError::BadRequest("Missing alias parameter".to_string()))?;
        let commit = params
            .get("commitId")
            .ok_or_else(|| RelayError::BadRequest("Missing commitId parameter".to_string()))?;
        return workspace(&cfg.models_url, alias, commit, params.get("format"));
    }

    if let Some(sub_path) = strip_proxy_prefix(path, &cfg.proxy_prefix) {
        return proxy(sub_path, query, &params, cfg);
    }

    // Query-driven downloads on any other path
    if let Some(alias) = params.get("exposureAlias") {
        return exposure(&cfg.models_url, alias);
    }
    if let Some(alias) = params.get("workspaceAlias") {
        let commit = params
            .get("commitId")
            .ok_or_else(|| RelayError::BadRequest("Missing commitId parameter".to_string()))?;
        return workspace(&cfg.models_url, alias, commit, params.get("format"));
    }

    if path == "/" {
        return Err(RelayError::BadRequest("Missing parameters!".to_string()));
    }
    Err(RelayError::NotFound)
}

fn strip_proxy_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}

fn exposure(models_url: &str, alias: &str) -> Result<UpstreamTarget, RelayError> {
    Ok(UpstreamTarget::ExposureDownload {
        primary: with_segments(models_url, &["e", alias, OMEX_SEGMENT])?,
        fallback: with_segments(models_url, &["exposure", alias, OMEX_SEGMENT])?,
    })
}

fn workspace(
    models_url: &str,
    alias: &str,
    commit: &str,
    format: Option<&str>,
) -> Result<UpstreamTarget, RelayError> {
    let format = format.unwrap_or(DEFAULT_ARCHIVE_FORMAT);
    Ok(UpstreamTarget::WorkspaceDownload {
        url: with_segments(models_url, &["workspace", alias, "@@archive", commit, format])?,
    })
}

/// Append percent-encoded path segments to a base URL
fn with_segments(base: &str, segments: &[&str]) -> Result<Url, RelayError> {
    let mut url = Url::parse(base).map_err(|_| misconfigured())?;
    url.path_segments_mut()
        .map_err(|()| misconfigured())?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn misconfigured() -> RelayError {
    RelayError::BadRequest("Upstream is misconfigured".to_string())
}

fn proxy(
    sub_path: &str,
    query: Option<&str>,
    params: &Params,
    cfg: &UpstreamConfig,
) -> Result<UpstreamTarget, RelayError> {
    let override_target = if cfg.allow_target_override {
        params.get("target")
    } else {
        None
    };

    let (base, forwarded_query) = match override_target {
        Some(target) => {
            let base = Url::parse(target)
                .ok()
                .filter(|u| matches!(u.scheme(), "http" | "https"))
                .ok_or_else(|| RelayError::BadRequest("Invalid target parameter".to_string()))?;
            (base, query.map(without_target).filter(|q| !q.is_empty()))
        }
        None => {
            let target = cfg.proxy_target.as_deref().ok_or_else(|| {
                RelayError::BadRequest("Proxy target is not configured".to_string())
            })?;
            let base = Url::parse(target).map_err(|_| misconfigured())?;
            (base, query.filter(|q| !q.is_empty()).map(str::to_string))
        }
    };

    let mut joined = format!("{}{sub_path}", base.as_str().trim_end_matches('/'));
    if let Some(q) = forwarded_query {
        joined.push('?');
        joined.push_str(&q);
    }
    let url = Url::parse(&joined)
        .map_err(|_| RelayError::BadRequest("Invalid proxy path".to_string()))?;

    // Dot segments must not climb out of the base path
    if url.origin() != base.origin() || path_under_base(url.path(), &base).is_none() {
        return Err(RelayError::BadRequest("Invalid proxy path".to_string()));
    }

    Ok(UpstreamTarget::Proxy { url, base })
}

fn without_target(query: &str) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());
    for (k, v) in form_urlencoded::parse(query.as_bytes()) {
        if k != "target" {
            out.append_pair(&k, &v);
        }
    }
    out.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream() -> UpstreamConfig {
        UpstreamConfig {
            models_url: "https://models.example.org".to_string(),
            proxy_target: Some("https://api.example.org".to_string()),
            allow_target_override: false,
            proxy_prefix: "/cors-proxy".to_string(),
            user_agent: "test".to_string(),
        }
    }

    #[test]
    fn test_exposure_query_yields_short_then_long() {
        let target = resolve("/", Some("exposureAlias=foo"), &upstream()).unwrap();
        let UpstreamTarget::ExposureDownload { primary, fallback } = target else {
            panic!("expected exposure download");
        };
        assert_eq!(primary.as_str(), "https://models.example.org/e/foo/download_generated_omex");
        assert_eq!(
            fallback.as_str(),
            "https://models.example.org/exposure/foo/download_generated_omex"
        );
    }

    #[test]
    fn test_exposure_path_accepts_alias() {
        let target = resolve(EXPOSURE_PATH, Some("alias=abc"), &upstream()).unwrap();
        assert!(matches!(
            target,
            UpstreamTarget::ExposureDownload { ref primary, .. }
                if primary.path() == "/e/abc/download_generated_omex"
        ));
    }

    #[test]
    fn test_workspace_default_format_is_zip() {
        let target = resolve("/", Some("workspaceAlias=bar&commitId=123"), &upstream()).unwrap();
        let UpstreamTarget::WorkspaceDownload { url } = target else {
            panic!("expected workspace download");
        };
        assert!(url.as_str().ends_with("/bar/@@archive/123/zip"), "{url}");
    }

    #[test]
    fn test_workspace_path_with_format() {
        let target = resolve(
            WORKSPACE_PATH,
            Some("alias=bar&commitId=abc123&format=tgz"),
            &upstream(),
        )
        .unwrap();
        assert_eq!(
            target,
            UpstreamTarget::WorkspaceDownload {
                url: Url::parse("https://models.example.org/workspace/bar/@@archive/abc123/tgz")
                    .unwrap()
            }
        );
    }

    #[test]
    fn test_models_url_trailing_slash_and_subpath() {
        let mut cfg = upstream();
        cfg.models_url = "https://models.example.org/pmr/".to_string();
        let target = resolve("/", Some("exposureAlias=foo"), &cfg).unwrap();
        let UpstreamTarget::ExposureDownload { primary, .. } = target else {
            panic!("expected exposure download");
        };
        assert_eq!(primary.path(), "/pmr/e/foo/download_generated_omex");
    }

    #[test]
    fn test_alias_is_a_single_segment() {
        let target = resolve("/", Some("exposureAlias=..%2F..%2Fadmin"), &upstream()).unwrap();
        let UpstreamTarget::ExposureDownload { primary, .. } = target else {
            panic!("expected exposure download");
        };
        assert_eq!(primary.path(), "/e/..%2F..%2Fadmin/download_generated_omex");
    }

    #[test]
    fn test_missing_parameters_is_bad_request() {
        let cfg = upstream();
        assert_eq!(
            resolve("/", None, &cfg),
            Err(RelayError::BadRequest("Missing parameters!".to_string()))
        );
        assert!(matches!(
            resolve("/", Some("workspaceAlias=bar"), &cfg),
            Err(RelayError::BadRequest(_))
        ));
        assert!(matches!(
            resolve("/", Some("commitId=123"), &cfg),
            Err(RelayError::BadRequest(_))
        ));
        assert!(matches!(
            resolve("/", Some("exposureAlias="), &cfg),
            Err(RelayError::BadRequest(_))
        ));
        assert!(matches!(
            resolve(EXPOSURE_PATH, None, &cfg),
            Err(RelayError::BadRequest(_))
        ));
        assert!(matches!(
            resolve(WORKSPACE_PATH, Some("alias=bar"), &cfg),
            Err(RelayError::BadRequest(_))
        ));
    }

    #[test]
    fn test_unknown_path_is_not_found() {
        assert_eq!(resolve("/nope", None, &upstream()), Err(RelayError::NotFound));
        assert_eq!(
            resolve("/cors-proxyish/v1", None, &upstream()),
            Err(RelayError::NotFound)
        );
    }

    #[test]
    fn test_proxy_path_and_query_are_appended() {
        let target = resolve("/cors-proxy/v1/items", Some("x=1"), &upstream()).unwrap();
        let UpstreamTarget::Proxy { url, base } = target else {
            panic!("expected proxy");
        };
        assert_eq!(url.as_str(), "https://api.example.org/v1/items?x=1");
        assert_eq!(base.as_str(), "https://api.example.org/");
    }

    #[test]
    fn test_proxy_keeps_base_path() {
        let mut cfg = upstream();
        cfg.proxy_target = Some("https://api.example.org/base/".to_string());
        let target = resolve("/cors-proxy/v1/items", None, &cfg).unwrap();
        let UpstreamTarget::Proxy { url, .. } = target else {
            panic!("expected proxy");
        };
        assert_eq!(url.as_str(), "https://api.example.org/base/v1/items");
    }

    #[test]
    fn test_proxy_target_ignored_when_override_disabled() {
        let target = resolve(
            "/cors-proxy/v1/items",
            Some("x=1&target=https://evil.test"),
            &upstream(),
        )
        .unwrap();
        let UpstreamTarget::Proxy { url, .. } = target else {
            panic!("expected proxy");
        };
        assert_eq!(url.host_str(), Some("api.example.org"));
        assert_eq!(url.path(), "/v1/items");
    }

    #[test]
    fn test_proxy_target_override_when_enabled() {
        let mut cfg = upstream();
        cfg.allow_target_override = true;
        let target = resolve(
            "/cors-proxy/v1/items",
            Some("x=1&target=https%3A%2F%2Fother.example.org"),
            &cfg,
        )
        .unwrap();
        let UpstreamTarget::Proxy { url, base } = target else {
            panic!("expected proxy");
        };
        assert_eq!(url.as_str(), "https://other.example.org/v1/items?x=1");
        assert_eq!(base.host_str(), Some("other.example.org"));
    }

    #[test]
    fn test_proxy_override_rejects_non_http_target() {
        let mut cfg = upstream();
        cfg.allow_target_override = true;
        assert!(matches!(
            resolve("/cors-proxy/x", Some("target=file:///etc/passwd"), &cfg),
            Err(RelayError::BadRequest(_))
        ));
    }

    #[test]
    fn test_proxy_without_target_is_bad_request() {
        let mut cfg = upstream();
        cfg.proxy_target = None;
        assert_eq!(
            resolve("/cors-proxy/v1", None, &cfg),
            Err(RelayError::BadRequest("Proxy target is not configured".to_string()))
        );
    }

    #[test]
    fn test_proxy_rejects_escaping_base_path() {
        let mut cfg = upstream();
        cfg.proxy_target = Some("https://api.example.org/base".to_string());
        assert!(matches!(
            resolve("/cors-proxy/../admin", None, &cfg),
            Err(RelayError::BadRequest(_))
        ));
        assert!(matches!(
            resolve("/cors-proxy/../basement/secret", None, &cfg),
            Err(RelayError::BadRequest(_))
        ));
        assert!(resolve("/cors-proxy/v1/../v2", None, &cfg).is_ok());
    }
}
