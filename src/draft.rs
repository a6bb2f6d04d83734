use std::collections::BTreeMap;

use crate::url;

pub const ALLOWED_METHODS: [&str; 11] = [
    "GET", "POST", "PUT", "PATCH", "HEAD", "DELETE", "OPTIONS", "PROPFIND", "SEARCH", "TRACE",
    "CONNECT",
];

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_METHOD: &str = "GET";

/// Header names in canonical form mapped to their values in insertion order.
/// Iteration is sorted by name.
pub type HeaderSet = BTreeMap<String, Vec<String>>;

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

/// Standard HTTP casing: upper case at the start and after every hyphen, lower
/// case elsewhere. Names holding non-token characters are returned unchanged.
pub fn canonical_header_key(name: &str) -> String {
    if !name.chars().all(is_token_char) {
        return name.to_string();
    }

    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

/// Normalizes what the user typed into a header name slot.
pub fn correct_header_name(raw: &str) -> String {
    canonical_header_key(&raw.trim().replace(' ', "-"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

/// The single in-memory request being built field by field.
#[derive(Debug, Clone)]
pub struct RequestDraft {
    host: String,
    path: String,
    query: String,
    proto_minor: u8,
    method: String,
    headers: HeaderSet,
    cookies: Vec<Cookie>,
    form: BTreeMap<String, String>,
    body: Option<String>,
}

impl Default for RequestDraft {
    fn default() -> Self {
        RequestDraft {
            host: DEFAULT_HOST.to_string(),
            path: String::new(),
            query: String::new(),
            proto_minor: 1,
            method: DEFAULT_METHOD.to_string(),
            headers: HeaderSet::new(),
            cookies: Vec::new(),
            form: BTreeMap::new(),
            body: None,
        }
    }
}

impl RequestDraft {
    #[allow(dead_code)]
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn set_host(&mut self, host: &str) {
        self.host = host.to_string();
    }

    #[allow(dead_code)]
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: &str) {
        self.path = path.to_string();
    }

    #[allow(dead_code)]
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn proto_minor(&self) -> u8 {
        self.proto_minor
    }

    pub fn set_proto_minor(&mut self, minor: u8) {
        self.proto_minor = minor.min(1);
    }

    pub fn protocol(&self) -> String {
        format!("HTTP/1.{}", self.proto_minor)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn set_method(&mut self, method: &str) {
        self.method = method.to_string();
    }

    #[allow(dead_code)]
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// Replaces every value stored under `name`.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers
            .insert(canonical_header_key(name), vec![value.to_string()]);
    }

    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&canonical_header_key(name))
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    #[allow(dead_code)]
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// Appends the cookie unless the exact same name and value is present.
    /// Returns whether it was added.
    pub fn add_cookie(&mut self, name: &str, value: &str) -> bool {
        let exists = self
            .cookies
            .iter()
            .any(|c| c.name == name && c.value == value);
        if !exists {
            self.cookies.push(Cookie {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
        !exists
    }

    /// Sets a query parameter, replacing any previous values of that name, and
    /// re-encodes the query string with keys in sorted order.
    pub fn set_param(&mut self, name: &str, value: &str) {
        let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (k, v) in ::url::form_urlencoded::parse(self.query.as_bytes()) {
            params.entry(k.into_owned()).or_default().push(v.into_owned());
        }
        params.insert(name.to_string(), vec![value.to_string()]);

        let mut serializer = ::url::form_urlencoded::Serializer::new(String::new());
        for (k, values) in &params {
            for v in values {
                serializer.append_pair(k, v);
            }
        }
        self.query = serializer.finish();
    }

    #[allow(dead_code)]
    pub fn form(&self) -> &BTreeMap<String, String> {
        &self.form
    }

    /// Upserts a form field and rebuilds the urlencoded body from the whole
    /// form store.
    pub fn set_form_value(&mut self, name: &str, value: &str) {
        self.form.insert(name.to_string(), value.to_string());
        self.set_header("Content-Type", FORM_CONTENT_TYPE);
        self.body = Some(encode_form(&self.form));
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn url(&self) -> String {
        url::compose(&self.host, &self.path, &self.query)
    }

    /// The `Cookie` request header value, if any cookies are set.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();
        Some(pairs.join("; "))
    }

    /// Headers as they will go out on the wire. Cookies are appended to a
    /// `Cookie` header set by hand, so only one such header is ever sent.
    pub fn effective_headers(&self) -> HeaderSet {
        let mut headers = self.headers.clone();
        if let Some(cookie) = self.cookie_header() {
            let values = headers.entry("Cookie".to_string()).or_default();
            match values.last_mut() {
                Some(existing) => {
                    existing.push_str("; ");
                    existing.push_str(&cookie);
                }
                None => values.push(cookie),
            }
        }
        headers
    }
}

fn encode_form(form: &BTreeMap<String, String>) -> String {
    ::url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form.iter())
        .finish()
}
