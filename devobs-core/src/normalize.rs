// URL → observation-key fragments. Pure functions, no I/O.

use reqwest::Url;

/// Hostname of `url` with one leading `www.` removed and every
/// non-alphanumeric character replaced by `_`.
///
/// Port, path, query and fragment are discarded. Input that does not parse
/// as an absolute URL has no hostname and yields an empty string.
pub fn normalize_domain(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };
    let host = parsed.host_str().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);
    underscore_non_alnum(host)
}

/// Last non-empty path segment of `url`, sanitized like [`normalize_domain`].
///
/// Trailing slashes, query and fragment are ignored. Falls back to `root`
/// when the path has no segment.
pub fn normalize_name(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => strip_query_and_fragment(url).to_string(),
    };
    let segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let name = underscore_non_alnum(segment);
    if name.is_empty() {
        "root".to_string()
    } else {
        name
    }
}

/// Observation key prefix for a crawled website: `{domain}/{name}`.
pub fn website_key_prefix(url: &str) -> String {
    format!("{}/{}", normalize_domain(url), normalize_name(url))
}

/// Observation key of a repository's changes report over `days` days.
pub fn repo_changes_key(full_name: &str, days: u32) -> String {
    format!("{full_name}/changes_{days}d")
}

fn underscore_non_alnum(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn strip_query_and_fragment(s: &str) -> &str {
    let end = s.find(['?', '#']).unwrap_or(s.len());
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_drops_port_path_and_query() {
        assert_eq!(
            normalize_domain("https://www.example.com:8080/x?y=1"),
            "example_com"
        );
    }

    #[test]
    fn domain_strips_only_one_www() {
        assert_eq!(normalize_domain("https://www.www.example.com"), "www_example_com");
        assert_eq!(normalize_domain("https://wwwexample.com"), "wwwexample_com");
    }

    #[test]
    fn domain_replaces_each_symbol() {
        assert_eq!(normalize_domain("http://my-site.co.uk/"), "my_site_co_uk");
    }

    #[test]
    fn domain_of_garbage_is_empty() {
        assert_eq!(normalize_domain("not a url"), "");
    }

    #[test]
    fn name_root_when_no_path() {
        assert_eq!(normalize_name("https://example.com"), "root");
        assert_eq!(normalize_name("https://example.com/"), "root");
    }

    #[test]
    fn name_ignores_trailing_slash_query_fragment() {
        for url in [
            "https://example.com/docs/resource",
            "https://example.com/docs/resource/",
            "https://example.com/docs/resource?x=1",
            "https://example.com/docs/resource#y",
        ] {
            assert_eq!(normalize_name(url), "resource", "{url}");
        }
    }

    #[test]
    fn name_sanitizes_segment() {
        assert_eq!(normalize_name("https://example.com/getting-started.html"), "getting_started_html");
    }

    #[test]
    fn key_helpers() {
        assert_eq!(
            website_key_prefix("https://www.devplan.com/blog/"),
            "devplan_com/blog"
        );
        assert_eq!(repo_changes_key("acme/api", 7), "acme/api/changes_7d");
    }

    mod prop {
        use proptest::prelude::*;

        use super::super::*;

        fn arb_host() -> impl Strategy<Value = String> {
            "[a-z][a-z0-9-]{0,10}(\\.[a-z][a-z0-9]{0,6}){1,3}"
        }

        fn arb_path() -> impl Strategy<Value = String> {
            "(/[a-zA-Z0-9_.-]{1,8}){0,4}/?"
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            #[test]
            fn domain_ignores_scheme_port_path_query(
                host in arb_host(),
                path in arb_path(),
                port in 1u16..65535,
                query in "[a-z]{1,5}=[0-9]{1,3}",
            ) {
                let plain = normalize_domain(&format!("https://{host}"));
                let noisy = normalize_domain(&format!("http://{host}:{port}{path}?{query}"));
                prop_assert_eq!(plain, noisy);
            }

            #[test]
            fn domain_is_alphanumeric_or_underscore(host in arb_host()) {
                let d = normalize_domain(&format!("https://{host}/"));
                prop_assert!(d.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
            }

            #[test]
            fn name_stable_under_suffixes(
                host in arb_host(),
                segment in "[a-z][a-z0-9]{0,10}",
            ) {
                let base = format!("https://{host}/a/{segment}");
                let expected = normalize_name(&base);
                prop_assert_eq!(&expected, &segment);
                prop_assert_eq!(normalize_name(&format!("{base}/")), expected.clone());
                prop_assert_eq!(normalize_name(&format!("{base}?q=1")), expected.clone());
                prop_assert_eq!(normalize_name(&format!("{base}#frag")), expected);
            }
        }
    }
}
