//! Integration checks (INT-001 through INT-005).
//!
//! Live HTTP requests against the backend API and the frontend. Each check
//! sends a single request with no retries; a connection error fails only that
//! check.

use super::CheckContext;
use crate::platform::http::{join_url, HttpRequest, HttpResponse, HttpTransport, Method};
use crate::{CheckFailure, Verdict};
use serde_json::{json, Value};

pub const HEALTH_PATH: &str = "/api/";
pub const STATUS_PATH: &str = "/api/status";
pub const HEALTH_FIELD: &str = "message";
pub const ECHO_FIELD: &str = "client_name";
pub const ECHO_VALUE: &str = "test_client";

/// One call in the backend API contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCall<'a> {
    /// GET that must return a JSON array
    List,
    /// POST `{field: value}` that must echo `field` back unchanged
    Echo { field: &'a str, value: &'a str },
}

impl ApiCall<'_> {
    fn method(&self) -> Method {
        match self {
            ApiCall::List => Method::Get,
            ApiCall::Echo { .. } => Method::Post,
        }
    }
}

/// GET `url`; require 200 and a JSON object containing `field`
pub fn service_reachability(
    http: &dyn HttpTransport,
    url: &str,
    field: &str,
) -> Result<String, CheckFailure> {
    let response = http
        .send(&HttpRequest::get(url))
        .map_err(|e| CheckFailure::UnreachableService {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    if response.status != 200 {
        return Err(CheckFailure::UnreachableService {
            url: url.to_string(),
            reason: format!("status {}, expected 200", response.status),
        });
    }

    let body = response
        .json()
        .map_err(|e| CheckFailure::UnexpectedResponseShape {
            url: url.to_string(),
            detail: format!("body is not JSON: {}", e),
        })?;

    match body.as_object() {
        Some(object) if object.contains_key(field) => {
            Ok(format!("{} responded 200 with '{}'", url, field))
        }
        Some(_) => Err(CheckFailure::UnexpectedResponseShape {
            url: url.to_string(),
            detail: format!("JSON body has no '{}' key", field),
        }),
        None => Err(CheckFailure::UnexpectedResponseShape {
            url: url.to_string(),
            detail: format!("expected a JSON object, got {}", json_kind(&body)),
        }),
    }
}

/// Exercise one backend endpoint against its contract
pub fn api_contract(
    http: &dyn HttpTransport,
    base: &str,
    path: &str,
    call: ApiCall<'_>,
) -> Result<String, CheckFailure> {
    let url = join_url(base, path);
    let method = call.method();
    let violation = |detail: String| CheckFailure::ContractViolation {
        method: method.as_str().to_string(),
        url: url.clone(),
        detail,
    };

    let request = match call {
        ApiCall::List => HttpRequest::get(&url),
        ApiCall::Echo { field, value } => HttpRequest::post_json(&url, json!({ field: value })),
    };

    let response = http
        .send(&request)
        .map_err(|e| violation(format!("request failed: {}", e)))?;
    if response.status != 200 {
        return Err(violation(format!("status {}, expected 200", response.status)));
    }
    let body = response
        .json()
        .map_err(|e| violation(format!("body is not JSON: {}", e)))?;

    match call {
        ApiCall::List => match body.as_array() {
            Some(items) => Ok(format!(
                "{} {} returned {} item(s)",
                method.as_str(),
                url,
                items.len()
            )),
            None => Err(violation(format!("expected a JSON array, got {}", json_kind(&body)))),
        },
        ApiCall::Echo { field, value } => match body.get(field) {
            Some(Value::String(echoed)) if echoed == value => {
                Ok(format!("{} {} echoed {} = {:?}", method.as_str(), url, field, value))
            }
            Some(other) => Err(violation(format!(
                "'{}' echoed as {}, expected {:?}",
                field, other, value
            ))),
            None => Err(violation(format!("response has no '{}' field", field))),
        },
    }
}

/// GET `url`; require 200 and an HTML content type
pub fn static_content(http: &dyn HttpTransport, url: &str) -> Result<String, CheckFailure> {
    let mismatch = |actual: String| CheckFailure::ContentTypeMismatch {
        url: url.to_string(),
        expected: "text/html".to_string(),
        actual,
    };

    let response = http
        .send(&HttpRequest::get(url))
        .map_err(|e| mismatch(format!("no response: {}", e)))?;
    if response.status != 200 {
        return Err(mismatch(format!("status {}", response.status)));
    }

    let content_type = response.header("content-type").unwrap_or("");
    if content_type.contains("text/html") {
        Ok(format!("{} served {}", url, content_type))
    } else {
        Err(mismatch(content_type.to_string()))
    }
}

/// OPTIONS preflight from `origin`; require 200 or 204
pub fn cross_origin(
    http: &dyn HttpTransport,
    url: &str,
    origin: &str,
) -> Result<String, CheckFailure> {
    let origin = serialized_origin(origin);
    let request = HttpRequest::options(url)
        .header("Origin", origin)
        .header("Access-Control-Request-Method", "GET")
        .header("Access-Control-Request-Headers", "Content-Type");

    let response: HttpResponse = http
        .send(&request)
        .map_err(|e| CheckFailure::CorsMisconfigured {
            url: url.to_string(),
            detail: format!("preflight failed: {}", e),
        })?;

    match response.status {
        200 | 204 => Ok(format!("preflight from {} answered {}", origin, response.status)),
        status => Err(CheckFailure::CorsMisconfigured {
            url: url.to_string(),
            detail: format!("status {}, expected 200 or 204", status),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Execute INT-001: Backend Health
pub fn run_int001(ctx: &CheckContext) -> Verdict {
    let url = ctx.targets.backend(HEALTH_PATH);
    service_reachability(ctx.http.as_ref(), &url, HEALTH_FIELD).into()
}

/// Execute INT-002: Status Listing
pub fn run_int002(ctx: &CheckContext) -> Verdict {
    api_contract(ctx.http.as_ref(), &ctx.targets.backend_url, STATUS_PATH, ApiCall::List).into()
}

/// Execute INT-003: Status Creation
pub fn run_int003(ctx: &CheckContext) -> Verdict {
    api_contract(
        ctx.http.as_ref(),
        &ctx.targets.backend_url,
        STATUS_PATH,
        ApiCall::Echo {
            field: ECHO_FIELD,
            value: ECHO_VALUE,
        },
    )
    .into()
}

/// Execute INT-004: Frontend Accessibility
pub fn run_int004(ctx: &CheckContext) -> Verdict {
    static_content(ctx.http.as_ref(), &ctx.targets.frontend("/")).into()
}

/// Execute INT-005: CORS Preflight
/// `scheme://host[:port]` of a URL; browsers never send a path or trailing slash
fn serialized_origin(url: &str) -> &str {
    let authority_start = url.find("://").map_or(0, |i| i + 3);
    match url[authority_start..].find('/') {
        Some(i) => &url[..authority_start + i],
        None => url,
    }
}

pub fn run_int005(ctx: &CheckContext) -> Verdict {
    let url = ctx.targets.backend(HEALTH_PATH);
    cross_origin(ctx.http.as_ref(), &url, &ctx.targets.frontend_url).into()
}
