use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::{
    app::AppState,
    calculator::{calculate, parse_input_within, Calculation},
    http::{
        errors::ServerError,
        handler::{RequestHandlerStrategy, DispatcherBuilder},
        page::{self, PageView, ResultView},
        request::{HttpMethod, HttpRequest},
        response::{Response, OK},
        router::router::{form_value, QueryParam},
    },
    session,
    stats::StatsError,
    utils::time,
};

fn save_warning(err: &StatsError) -> String {
    format!("Statistics could not be saved: {}", err)
}

/// GET|HEAD|POST /  (optionally ?n=NUM or form body n=NUM)
///
/// HEAD renders the same page but never starts a session or touches the
/// statistics.
pub struct PageHandler {
    pub state: Arc<AppState>,
}

impl PageHandler {
    fn input(req: &HttpRequest) -> Option<String> {
        req.query_param("n").or_else(|| {
            let body = String::from_utf8_lossy(&req.body);
            form_value(&body, "n")
        })
    }
}

impl RequestHandlerStrategy for PageHandler {
    fn handle(&self, req: &HttpRequest) -> Result<Response, ServerError> {
        let now = time::now();
        let mut warnings = Vec::new();
        let tracked = req.method != HttpMethod::HEAD;

        let token = tracked.then(|| {
            let cookie = req.header("Cookie").and_then(session::token_from_cookie);
            let (token, _) = self.state.sessions.checkout(cookie);
            token
        });
        if let Some(mut ctx) = token.as_deref().and_then(|t| self.state.sessions.claim_visit(t)) {
            let visit = self.state.stats.record_visit(&mut ctx, &now);
            if let Some(e) = &visit.save_error {
                warnings.push(save_warning(e));
            }
        }

        let input = Self::input(req);
        let result = match input.as_deref() {
            None => ResultView::Idle,
            Some(raw) => match parse_input_within(raw, self.state.max_input) {
                Err(e) => {
                    debug!(input = raw, error = %e, "rejected input");
                    ResultView::Invalid(e)
                }
                Ok(n) => match calculate(n) {
                    Calculation::Degenerate => ResultView::Degenerate,
                    Calculation::Factored(summary) => {
                        if tracked {
                            let recorded = self.state.stats.record_calculation(n);
                            if let Some(e) = &recorded.save_error {
                                warnings.push(save_warning(e));
                            }
                        }
                        ResultView::Factored(summary)
                    }
                },
            },
        };

        let stats = self.state.stats.query();
        let today = time::date_key(&now);
        let body = page::render(&PageView {
            input: input.as_deref().unwrap_or(""),
            result: &result,
            warnings: &warnings,
            stats: &stats,
            today: &today,
        });

        let resp = Response::html(OK, body);
        Ok(match token {
            Some(token) => resp.set_header("Set-Cookie", &session::set_cookie_header(&token)),
            None => resp,
        })
    }
}

/// /factor?n=NUM
pub struct FactorHandler {
    pub state: Arc<AppState>,
}

impl RequestHandlerStrategy for FactorHandler {
    fn handle(&self, req: &HttpRequest) -> Result<Response, ServerError> {
        let n_str = req.query_param("n")
            .ok_or_else(|| ServerError::BadRequest("Missing query parameter 'n'".into()))?;

        let n = parse_input_within(&n_str, self.state.max_input)
            .map_err(|e| ServerError::BadRequest(e.to_string()))?;

        let body = match calculate(n) {
            Calculation::Degenerate => json!({
                "n": n,
                "factors": [],
                "formatted": "1",
                "divisor_count": 1,
                "unique_factor_count": 0,
                "total_factor_count": 0,
                "is_prime": false,
            }),
            Calculation::Factored(summary) => {
                let mut value = serde_json::to_value(&summary)
                    .map_err(|e| ServerError::Internal(e.to_string()))?;
                if req.method != HttpMethod::HEAD {
                    let recorded = self.state.stats.record_calculation(n);
                    if let Some(e) = &recorded.save_error {
                        value["warning"] = json!(save_warning(e));
                    }
                }
                value
            }
        };

        Ok(Response::json(OK, &body))
    }
}

pub fn register(builder: DispatcherBuilder, state: Arc<AppState>) -> DispatcherBuilder {
    let page = Arc::new(PageHandler { state: state.clone() });
    builder
        .get("/", page.clone())
        .post("/", page)
        .get("/factor", Arc::new(FactorHandler { state: state.clone() }))
}
