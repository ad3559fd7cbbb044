use crate::calc::HumidityCalculator;
use crate::data::{CalculationRequest, CalculationResult, ErrorResponse, HealthResponse, UNIT};
use anyhow::{anyhow, Result};
use chrono::prelude::*;
use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::json;
use std::io::Read;
use tiny_http::{Header, Method, Response, Server};

const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";
const CONTENT_TYPE_JSON: &str = "application/json";

/// Binds the listener and serves requests until the process is stopped.
pub fn run(addr: &str, calculator: HumidityCalculator) -> Result<()> {
    let server = Server::http(addr).map_err(|e| anyhow!("could not listen on {}: {}", addr, e))?;
    info!("listening on http://{}", addr);

    for mut request in server.incoming_requests() {
        let mut body = String::new();
        if let Err(e) = request.as_reader().read_to_string(&mut body) {
            warn!("failed to read request body: {}", e);
            continue;
        }

        let reply = route(&calculator, request.method(), request.url(), &body);
        debug!("{} {} -> {}", request.method(), request.url(), reply.status);

        let response = Response::from_string(reply.body)
            .with_status_code(reply.status)
            .with_header(content_type(reply.content_type));
        if let Err(e) = request.respond(response) {
            warn!("failed to send response: {}", e);
        }
    }

    Ok(())
}

fn content_type(value: &'static str) -> Header {
    Header::from_bytes(&b"Content-Type"[..], value.as_bytes()).unwrap()
}

struct Reply {
    status: u16,
    content_type: &'static str,
    body: String,
}

impl Reply {
    fn html(status: u16, body: String) -> Self {
        Reply {
            status,
            content_type: CONTENT_TYPE_HTML,
            body,
        }
    }

    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Reply {
                status,
                content_type: CONTENT_TYPE_JSON,
                body,
            },
            Err(e) => {
                error!("failed to serialize response: {}", e);
                Reply {
                    status: 500,
                    content_type: CONTENT_TYPE_JSON,
                    body: r#"{"error":"internal server error"}"#.to_owned(),
                }
            }
        }
    }
}

fn route(calculator: &HumidityCalculator, method: &Method, url: &str, body: &str) -> Reply {
    match (method, url) {
        (Method::Get, "/") => Reply::html(200, index_page("")),
        (Method::Post, "/") => Reply::html(200, index_page(&form_result(calculator, body))),
        (Method::Get, "/about") => Reply::html(200, about_page()),
        (Method::Post, "/api/calculate") => api_calculate(calculator, body),
        (Method::Get, "/api/health") | (Method::Get, "/health") => {
            Reply::json(200, &HealthResponse::healthy())
        }
        (Method::Get, "/api/info") => api_info(calculator),
        _ => Reply::json(404, &ErrorResponse::new(format!("no route for {}", url))),
    }
}

fn api_calculate(calculator: &HumidityCalculator, body: &str) -> Reply {
    let request: CalculationRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => {
            return Reply::json(
                422,
                &ErrorResponse::new(format!("invalid request body: {}", e)),
            )
        }
    };

    match calculator.calculate(request.temperature, request.humidity) {
        Ok(value) => Reply::json(200, &CalculationResult::new(value, request)),
        Err(e) => Reply::json(422, &ErrorResponse::new(e.to_string())),
    }
}

fn api_info(calculator: &HumidityCalculator) -> Reply {
    Reply::json(
        200,
        &json!({
            "name": "Absolute Humidity Calculator",
            "version": env!("CARGO_PKG_VERSION"),
            "strategy": calculator.strategy().to_string(),
            "methods": {
                "magnus_formula": "es = 6.112 * exp((17.67 * T) / (T + 243.5))",
                "absolute_humidity": "AH = (e * 18.016) / (8314.5 * (T + 273.15)) * 1000",
            },
            "units": {
                "temperature": "Celsius",
                "humidity": "percentage (0-100)",
                "result": UNIT,
            },
            "limits": {
                "temperature_min": -273.15,
                "humidity_min": 0,
                "humidity_max": 100,
            },
        }),
    )
}

/// Renders the result block of the form page, or the reason there is none.
fn form_result(calculator: &HumidityCalculator, body: &str) -> String {
    let (temperature, humidity) = match parse_form(body) {
        Some(values) => values,
        None => {
            return "<div class=\"error\">\
                Please enter a temperature and a relative humidity.\
                </div>"
                .to_owned()
        }
    };

    match calculator.calculate(temperature, humidity) {
        Ok(value) => format!(
            "<div class=\"result\">\
                {time}<br/>\
                Temperature: {temp:.1} °C<br/>\
                Relative Humidity: {rel_hum:.1} %<br/>\
                Absolute Humidity: {abs_hum:.2} {unit}<br/>\
                </div>",
            time = Local::now().format("%d.%m.%Y %H:%M:%S"),
            temp = temperature,
            rel_hum = humidity,
            abs_hum = value,
            unit = UNIT,
        ),
        Err(e) => format!("<div class=\"error\">{}</div>", e),
    }
}

/// Reads temperature and humidity from an url-encoded form body.
fn parse_form(body: &str) -> Option<(f64, f64)> {
    let mut temperature = None;
    let mut humidity = None;

    for pair in body.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            match key {
                "temperature" => temperature = value.parse().ok(),
                "humidity" => humidity = value.parse().ok(),
                _ => (),
            }
        }
    }

    Some((temperature?, humidity?))
}

fn index_page(result: &str) -> String {
    format!(
        "<!DOCTYPE html>\
        <html>\
        <head>\
            <meta charset=\"utf-8\" />\
            <title>Absolute Humidity Calculator</title>\
        </head>\
        <body>\
            <h1>Absolute Humidity Calculator</h1>\
            <form method=\"post\" action=\"/\">\
                <label for=\"temperature\">Temperature [°C]</label>\
                <input type=\"number\" step=\"any\" id=\"temperature\" name=\"temperature\" required/><br/>\
                <label for=\"humidity\">Relative Humidity [%]</label>\
                <input type=\"number\" step=\"any\" min=\"0\" max=\"100\" id=\"humidity\" name=\"humidity\" required/><br/>\
                <input type=\"submit\" value=\"Calculate\"/>\
            </form>\
            {result}\
            <div><a href=\"/about\">About the calculation</a></div>\
            <footer>v{version}</footer>\
        </body>\
        </html>",
        result = result,
        version = env!("CARGO_PKG_VERSION"),
    )
}

fn about_page() -> String {
    format!(
        "<!DOCTYPE html>\
        <html>\
        <head>\
            <meta charset=\"utf-8\" />\
            <title>About - Absolute Humidity Calculator</title>\
        </head>\
        <body>\
            <h1>About</h1>\
            <p>\
                Absolute humidity is the mass of water vapor per volume of air, \
                given here in {unit}. It is computed from the dry-bulb temperature \
                and the relative humidity, either with the Magnus approximation \
                or with the ASHRAE psychrometric relations.\
            </p>\
            <h2>Formulas</h2>\
            <p>\
                Saturation vapor pressure: es = 6.112 * exp((17.67 * T) / (T + 243.5))<br/>\
                Absolute humidity: AH = (e * 18.016) / (8314.5 * (T + 273.15)) * 1000\
            </p>\
            <h2>Limits</h2>\
            <p>\
                Relative humidity must lie between 0 % and 100 %. The temperature \
                must be finite and above absolute zero (-273.15 °C).\
            </p>\
            <div><a href=\"/\">Back to the calculator</a></div>\
        </body>\
        </html>",
        unit = UNIT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::Strategy;

    fn calculator() -> HumidityCalculator {
        HumidityCalculator::new(Strategy::Magnus)
    }

    fn get(url: &str) -> Reply {
        route(&calculator(), &Method::Get, url, "")
    }

    fn post(url: &str, body: &str) -> Reply {
        route(&calculator(), &Method::Post, url, body)
    }

    #[test]
    fn health_endpoints_report_healthy() {
        for url in ["/api/health", "/health"] {
            let reply = get(url);
            assert_eq!(reply.status, 200);
            assert_eq!(reply.body, r#"{"status":"healthy"}"#);
        }
    }

    #[test]
    fn calculate_returns_result_with_echoed_inputs() {
        let reply = post("/api/calculate", r#"{"temperature": 25.5, "humidity": 60}"#);
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, CONTENT_TYPE_JSON);

        let result: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(result["absolute_humidity"], 14.21);
        assert_eq!(result["temperature"], 25.5);
        assert_eq!(result["humidity"], 60.0);
        assert_eq!(result["unit"], "g/m³");
    }

    #[test]
    fn calculate_rejects_out_of_range_humidity() {
        for hum in ["-1", "101", "150"] {
            let body = format!(r#"{{"temperature": 25.0, "humidity": {}}}"#, hum);
            let reply = post("/api/calculate", &body);
            assert_eq!(reply.status, 422, "humidity {} should be rejected", hum);
            assert!(reply.body.contains("error"));
        }
    }

    #[test]
    fn calculate_rejects_malformed_bodies() {
        for body in [
            "",
            "not json",
            r#"{"humidity": 50}"#,
            r#"{"temperature": 25.0}"#,
            r#"{"temperature": "warm", "humidity": 50}"#,
            r#"{"temperature": 25.0, "humidity": "wet"}"#,
        ] {
            let reply = post("/api/calculate", body);
            assert_eq!(reply.status, 422, "body {:?} should be rejected", body);
            assert!(reply.body.contains("error"));
        }
    }

    #[test]
    fn index_page_contains_the_form() {
        let reply = get("/");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, CONTENT_TYPE_HTML);
        assert!(reply.body.contains("id=\"temperature\""));
        assert!(reply.body.contains("id=\"humidity\""));
        assert!(reply.body.contains("type=\"submit\""));
    }

    #[test]
    fn form_submission_renders_the_result() {
        let reply = post("/", "temperature=25.5&humidity=60");
        assert_eq!(reply.status, 200);
        assert!(reply.body.contains("14.21"));
        assert!(reply.body.contains(UNIT));
    }

    #[test]
    fn form_submission_renders_validation_errors() {
        let reply = post("/", "temperature=25.5&humidity=250");
        assert_eq!(reply.status, 200);
        assert!(reply.body.contains("relative humidity"));
    }

    #[test]
    fn incomplete_form_asks_for_both_values() {
        let reply = post("/", "temperature=25.5");
        assert_eq!(reply.status, 200);
        assert!(reply.body.contains("Please enter"));
    }

    #[test]
    fn info_reports_the_active_strategy() {
        let reply = get("/api/info");
        assert_eq!(reply.status, 200);

        let info: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(info["strategy"], "magnus");
        assert_eq!(info["units"]["result"], UNIT);
    }

    #[test]
    fn unknown_routes_are_not_found() {
        assert_eq!(get("/nope").status, 404);
        assert_eq!(post("/api/nope", "{}").status, 404);
    }

    #[test]
    fn parse_form_handles_missing_and_extra_keys() {
        assert_eq!(
            parse_form("temperature=25.5&humidity=60&extra=1"),
            Some((25.5, 60.0))
        );
        assert_eq!(parse_form("humidity=60"), None);
        assert_eq!(parse_form(""), None);
        assert_eq!(parse_form("temperature=warm&humidity=60"), None);
    }
}
