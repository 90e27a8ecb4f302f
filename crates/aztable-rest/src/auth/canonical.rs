//! Canonical header block and resource string.

use std::collections::BTreeMap;

use reqwest::header::HeaderMap;
use url::Url;

/// Prefix of headers that take part in the signature.
const SIGNED_HEADER_PREFIX: &str = "x-ms-";

/// Render the `x-ms-*` headers as `name:value,value\n` lines sorted by name.
///
/// Header names are compared lower-cased. Values have CR and LF removed and
/// leading whitespace trimmed, and keep their order within one header.
pub fn canonical_headers(headers: &HeaderMap) -> String {
    let mut signed: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (name, value) in headers {
        let name = name.as_str().to_ascii_lowercase();
        if !name.starts_with(SIGNED_HEADER_PREFIX) {
            continue;
        }
        let value: String = String::from_utf8_lossy(value.as_bytes())
            .chars()
            .filter(|c| *c != '\r' && *c != '\n')
            .collect();
        signed
            .entry(name)
            .or_default()
            .push(value.trim_start().to_string());
    }

    let mut block = String::new();
    for (name, values) in signed {
        block.push_str(&name);
        block.push(':');
        block.push_str(&values.join(","));
        block.push('\n');
    }
    block
}

/// Render `/{account}{path}`, optionally followed by one
/// `\nname:value,value` line per query parameter.
///
/// Parameter names are lower-cased and sorted; the decoded values of a
/// repeated parameter are sorted before joining.
pub fn canonical_resource(account: &str, url: &Url, include_query: bool) -> String {
    let mut resource = format!("/{}{}", account, url.path());
    if !include_query {
        return resource;
    }

    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in url.query_pairs() {
        params
            .entry(name.to_lowercase())
            .or_default()
            .push(value.into_owned());
    }

    for (name, mut values) in params {
        values.sort();
        resource.push('\n');
        resource.push_str(&name);
        resource.push(':');
        resource.push_str(&values.join(","));
    }
    resource
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn headers_sorted_regardless_of_input_order() {
        let a = headers(&[
            ("x-ms-version", "2011-08-18"),
            ("x-ms-date", "Mon, 01 Jan 2024 00:00:00 GMT"),
            ("Content-Type", "application/atom+xml"),
        ]);
        let b = headers(&[
            ("Content-Type", "application/atom+xml"),
            ("X-MS-Date", "Mon, 01 Jan 2024 00:00:00 GMT"),
            ("x-ms-version", "2011-08-18"),
        ]);

        let expected = "x-ms-date:Mon, 01 Jan 2024 00:00:00 GMT\nx-ms-version:2011-08-18\n";
        assert_eq!(canonical_headers(&a), expected);
        assert_eq!(canonical_headers(&b), expected);
    }

    #[test]
    fn repeated_header_values_are_joined() {
        let map = headers(&[("x-ms-meta", "  one"), ("x-ms-meta", "two")]);
        assert_eq!(canonical_headers(&map), "x-ms-meta:one,two\n");
    }

    #[test]
    fn no_signed_headers_gives_empty_block() {
        let map = headers(&[("Accept", "application/atom+xml")]);
        assert_eq!(canonical_headers(&map), "");
    }

    #[test]
    fn resource_without_query() {
        let url = Url::parse("https://acct.table.core.windows.net/Orders()").unwrap();
        assert_eq!(canonical_resource("acct", &url, true), "/acct/Orders()");
    }

    #[test]
    fn resource_with_sorted_lowercased_query() {
        let url = Url::parse(
            "https://acct.table.core.windows.net/Orders()?$top=5&NextRowKey=r%201&$filter=Age%20gt%20'5'",
        )
        .unwrap();
        assert_eq!(
            canonical_resource("acct", &url, true),
            "/acct/Orders()\n$filter:Age gt '5'\n$top:5\nnextrowkey:r 1"
        );
    }

    #[test]
    fn repeated_parameter_values_are_sorted() {
        let url = Url::parse("https://acct.table.core.windows.net/x?b=2&B=1").unwrap();
        assert_eq!(canonical_resource("acct", &url, true), "/acct/x\nb:1,2");
    }

    #[test]
    fn table_profile_ignores_query() {
        let url = Url::parse("https://acct.table.core.windows.net/Tables?NextTableName=t2").unwrap();
        assert_eq!(canonical_resource("acct", &url, false), "/acct/Tables");
    }
}
