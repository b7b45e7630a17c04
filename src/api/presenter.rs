//! Presentation selector — one snapshot, two encodings.
//!
//! Polling dashboards mark their requests with a fragment header and get an
//! HTML partial to splice into the page. Everyone else gets JSON.

use axum::http::header::{CACHE_CONTROL, VARY};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use super::error::ApiError;
use super::fragment::Fragment;

/// Secondary marker accepted alongside the configured fragment header.
pub const FRAGMENT_REQUEST_HEADER: &str = "x-fragment-request";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Structured,
    Fragment,
}

impl Classification {
    pub fn from_headers(headers: &HeaderMap, fragment_header: &HeaderName) -> Self {
        let marked = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
        };

        if marked(fragment_header.as_str()) || marked(FRAGMENT_REQUEST_HEADER) {
            Classification::Fragment
        } else {
            Classification::Structured
        }
    }
}

#[derive(Debug)]
pub enum Representation {
    Structured(serde_json::Value),
    Fragment(String),
}

/// Encode `value` for the given classification. No further collection
/// happens here, so both encodings describe the same data.
pub fn present<T>(value: &T, classification: Classification) -> Result<Representation, ApiError>
where
    T: Serialize + Fragment,
{
    Ok(match classification {
        Classification::Structured => Representation::Structured(serde_json::to_value(value)?),
        Classification::Fragment => Representation::Fragment(value.render_fragment()),
    })
}

impl IntoResponse for Representation {
    fn into_response(self) -> Response {
        match self {
            Representation::Structured(json) => Json(json).into_response(),
            Representation::Fragment(html) => Html(html).into_response(),
        }
    }
}

/// Headers for a representation that varies on `fragment_header` and must
/// never be served from a cache.
pub fn negotiation_headers(fragment_header: &HeaderName) -> [(HeaderName, HeaderValue); 2] {
    [
        (VARY, HeaderValue::from(fragment_header.clone())),
        (CACHE_CONTROL, HeaderValue::from_static("no-store")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fragment::tests::extract_fields;
    use crate::domain::types::*;

    fn hx() -> HeaderName {
        HeaderName::from_static("hx-request")
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for &(k, v) in pairs {
            map.insert(HeaderName::from_static(k), HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn classification() {
        let c = |pairs: &[(&'static str, &'static str)]| Classification::from_headers(&headers(pairs), &hx());
        assert_eq!(c(&[]), Classification::Structured);
        assert_eq!(c(&[("hx-request", "true")]), Classification::Fragment);
        assert_eq!(c(&[("hx-request", "TRUE")]), Classification::Fragment);
        assert_eq!(c(&[("hx-request", "false")]), Classification::Structured);
        assert_eq!(c(&[("x-fragment-request", "true")]), Classification::Fragment);
        assert_eq!(c(&[("accept", "text/html")]), Classification::Structured);
    }

    fn sample_system() -> SystemSnapshot {
        SystemSnapshot {
            cpu: CpuStats {
                usage_percent: 37.123456,
                core_count: 16,
                model_name: "AMD Ryzen 9 7950X 16-Core Processor".into(),
            },
            memory: MemoryStats {
                total_bytes: 67_108_864_000,
                available_bytes: 50_000_000_000,
                used_bytes: 17_108_864_000,
                used_percent: 25.493,
            },
            disk: DiskStats {
                total_bytes: 1_000_000_000_000,
                free_bytes: 400_000_000_000,
                used_bytes: 600_000_000_000,
                used_percent: 60.0,
            },
            network: NetworkStats {
                bytes_sent: 123_456_789,
                bytes_recv: 987_654_321,
                packets_sent: 1_000_001,
                packets_recv: 2_000_002,
            },
            host: HostStats {
                hostname: "web-01 & co".into(),
                os: "linux".into(),
                platform: "ubuntu".into(),
                platform_version: "24.04".into(),
                kernel_version: "6.8.0-45-generic".into(),
                uptime_seconds: 1_234_567,
            },
        }
    }

    /// Every `data-value` in the fragment equals the JSON value at the same
    /// path, and the fragment carries as many fields as the JSON has leaves.
    fn assert_equivalent(json: &serde_json::Value, html: &str, leaves: usize) {
        let fields = extract_fields(html);
        assert_eq!(fields.len(), leaves);

        for (group, field, raw) in &fields {
            let expected = if let Some(arr) = json.get("processes").and_then(|v| v.as_array()) {
                arr.iter()
                    .find(|p| p["pid"].to_string() == *group)
                    .map(|p| &p[field.as_str()])
                    .unwrap()
            } else {
                &json[group.as_str()][field.as_str()]
            };

            match expected {
                serde_json::Value::String(s) => assert_eq!(s, raw, "{group}.{field}"),
                serde_json::Value::Number(n) => {
                    let parsed: f64 = raw.parse().unwrap();
                    assert_eq!(n.as_f64().unwrap(), parsed, "{group}.{field}");
                }
                other => panic!("unexpected json value {other} at {group}.{field}"),
            }
        }
    }

    #[test]
    fn system_encodings_are_equivalent() {
        let snap = sample_system();
        let Representation::Structured(json) = present(&snap, Classification::Structured).unwrap()
        else {
            panic!("expected structured");
        };
        let Representation::Fragment(html) = present(&snap, Classification::Fragment).unwrap()
        else {
            panic!("expected fragment");
        };

        assert_equivalent(&json, &html, 3 + 4 + 4 + 4 + 6);
    }

    #[test]
    fn process_encodings_are_equivalent() {
        let snap = ProcessSnapshot {
            processes: vec![
                ProcessRecord {
                    pid: 1,
                    name: "systemd".into(),
                    cpu_percent: 0.0123,
                    resident_memory_bytes: 12_582_912,
                    status: "sleeping".into(),
                },
                ProcessRecord {
                    pid: 812,
                    name: "Unknown".into(),
                    cpu_percent: 0.0,
                    resident_memory_bytes: 0,
                    status: "Unknown".into(),
                },
            ],
        };
        let Representation::Structured(json) = present(&snap, Classification::Structured).unwrap()
        else {
            panic!("expected structured");
        };
        let Representation::Fragment(html) = present(&snap, Classification::Fragment).unwrap()
        else {
            panic!("expected fragment");
        };

        assert_equivalent(&json, &html, 2 * 5);
    }

    #[test]
    fn vary_names_the_fragment_header() {
        let [(vary_name, vary), (cc_name, cc)] = negotiation_headers(&hx());
        assert_eq!(vary_name, VARY);
        assert_eq!(vary, "hx-request");
        assert_eq!(cc_name, CACHE_CONTROL);
        assert_eq!(cc, "no-store");

        let [(_, custom), _] = negotiation_headers(&HeaderName::from_static("x-partial"));
        assert_eq!(custom, "x-partial");
    }
}
