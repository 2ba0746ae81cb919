//! Enrichment API client

use super::{Enrichment, ValidationResult};
use crate::config::Config;
use crate::cost::{CostSource, ServiceCost};
use crate::parser::{VesselInfo, WeightSummary};
use crate::pdf::PageText;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Pages excerpted into the prompt (1-based).
const EXCERPT_PAGES: [u32; 4] = [1, 2, 19, 20];
/// Per-page and combined excerpt bounds. Cost control: the prompt never
/// carries more than this much document text.
const PAGE_EXCERPT_CHARS: usize = 800;
const SAMPLE_CHARS: usize = 1000;

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.1;

/// Surface area assumed when the weight summary did not report one.
const FALLBACK_SURFACE_AREA: f64 = 158.0;

/// Transport seam for the completion call. The production implementation
/// posts to the OpenAI chat-completions endpoint; tests substitute a mock.
pub trait CompletionApi {
    fn complete(
        &self,
        api_key: &str,
        prompt: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// OpenAI chat-completions transport.
pub struct OpenAiApi {
    model: String,
    http_client: reqwest::Client,
}

impl OpenAiApi {
    pub fn new(model: String, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { model, http_client })
    }
}

impl CompletionApi for OpenAiApi {
    async fn complete(&self, api_key: &str, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .http_client
            .post(OPENAI_API_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .context("completion request failed")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("completion API error: {}", error_text);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("failed to parse completion response")?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("completion response had no choices")
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Requests supplementary vessel metadata and labor/service cost estimates
/// from a completion model. Without a credential it short-circuits to the
/// no-enrichment result; any remote failure degrades to a deterministic
/// fallback estimate. Neither case is an error to the caller.
pub struct EnrichmentClient<A: CompletionApi = OpenAiApi> {
    api: A,
    api_key: Option<String>,
}

impl EnrichmentClient<OpenAiApi> {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            api: OpenAiApi::new(config.model().to_string(), config.request_timeout)?,
            api_key: config.api_key.clone(),
        })
    }
}

impl<A: CompletionApi> EnrichmentClient<A> {
    pub fn new(api: A, api_key: Option<String>) -> Self {
        Self { api, api_key }
    }

    /// Run the enrichment analysis. Always returns a usable result.
    pub async fn analyze(
        &self,
        pages: &PageText,
        vessel_info: &VesselInfo,
        weights: &WeightSummary,
    ) -> Enrichment {
        let Some(api_key) = &self.api_key else {
            return Enrichment::unavailable(vessel_info);
        };

        let prompt = build_prompt(pages, vessel_info, weights);

        match self.request(api_key, &prompt, vessel_info, weights).await {
            Ok(enrichment) => enrichment,
            Err(e) => {
                tracing::warn!(error = %e, "enrichment failed, using fallback estimates");
                fallback(vessel_info, weights, &e.to_string())
            }
        }
    }

    async fn request(
        &self,
        api_key: &str,
        prompt: &str,
        vessel_info: &VesselInfo,
        weights: &WeightSummary,
    ) -> Result<Enrichment> {
        let response_text = self.api.complete(api_key, prompt).await?;
        let payload: serde_json::Value = serde_json::from_str(strip_code_fence(&response_text))
            .context("completion response was not valid JSON")?;

        Ok(interpret_payload(&payload, vessel_info, weights))
    }
}

/// Map the remote JSON onto an enrichment result. Each top-level key is
/// decoded leniently: a key whose value deviates from the requested shape
/// is treated as absent rather than failing the whole response.
fn interpret_payload(
    payload: &serde_json::Value,
    vessel_info: &VesselInfo,
    weights: &WeightSummary,
) -> Enrichment {
    let enhanced: VesselInfo = payload
        .get("enhanced_vessel_info")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();

    let surface_area = weights.surface_area.unwrap_or(FALLBACK_SURFACE_AREA);

    let mut manual_costs = BTreeMap::new();
    if let Some(estimates) = payload
        .get("manual_cost_estimates")
        .and_then(|v| v.as_object())
    {
        for (service, value) in estimates {
            let Ok(estimate) = serde_json::from_value::<ServiceEstimate>(value.clone()) else {
                continue;
            };
            // The model tends to price painting against an assumed surface
            // area; recompute it from the extracted one instead of trusting
            // the remote total.
            let total_cost = if service == "painting" {
                estimate.unit_cost * surface_area
            } else {
                estimate.total_cost
            };
            manual_costs.insert(
                service.clone(),
                ServiceCost {
                    unit_cost: estimate.unit_cost,
                    unit: estimate.unit,
                    total_cost,
                    source: CostSource::AiEstimate,
                },
            );
        }
    }

    let mut validation: ValidationResult = payload
        .get("validation")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or(ValidationResult {
            confidence: 8,
            warnings: Vec::new(),
        });
    validation.confidence = validation.confidence.min(10);

    let analysis = payload
        .get("market_summary")
        .and_then(|v| v.as_str())
        .unwrap_or("Market analysis completed.")
        .to_string();

    Enrichment {
        vessel_info: vessel_info.merge(&enhanced),
        manual_costs,
        validation,
        analysis,
    }
}

#[derive(Deserialize)]
struct ServiceEstimate {
    #[serde(default)]
    unit_cost: f64,
    #[serde(default = "default_unit")]
    unit: String,
    #[serde(default)]
    total_cost: f64,
}

fn default_unit() -> String {
    "each".to_string()
}

/// Deterministic estimate used whenever the remote call fails for any
/// reason. Painting is still priced against the extracted surface area.
fn fallback(vessel_info: &VesselInfo, weights: &WeightSummary, reason: &str) -> Enrichment {
    let surface_area = weights.surface_area.unwrap_or(FALLBACK_SURFACE_AREA);

    let manual_costs: BTreeMap<String, ServiceCost> = [
        (
            "legs_fabrication",
            ServiceCost {
                unit_cost: 1500.0,
                unit: "per leg".to_string(),
                total_cost: 6000.0,
                source: CostSource::Fallback,
            },
        ),
        (
            "painting",
            ServiceCost {
                unit_cost: 12.0,
                unit: "per ft²".to_string(),
                total_cost: 12.0 * surface_area,
                source: CostSource::Fallback,
            },
        ),
        (
            "testing_xray",
            ServiceCost {
                unit_cost: 75.0,
                unit: "per ft".to_string(),
                total_cost: 3000.0,
                source: CostSource::Fallback,
            },
        ),
        (
            "transportation",
            ServiceCost {
                unit_cost: 2500.0,
                unit: "per shipment".to_string(),
                total_cost: 2500.0,
                source: CostSource::Fallback,
            },
        ),
    ]
    .into_iter()
    .map(|(name, cost)| (name.to_string(), cost))
    .collect();

    Enrichment {
        vessel_info: vessel_info.clone(),
        manual_costs,
        validation: ValidationResult {
            confidence: 7,
            warnings: vec!["AI analysis failed, using fallback estimates".to_string()],
        },
        analysis: format!("Using fallback estimates: {}", reason),
    }
}

fn build_prompt(pages: &PageText, vessel_info: &VesselInfo, weights: &WeightSummary) -> String {
    let mut sample = String::new();
    for page_number in EXCERPT_PAGES {
        if let Some(text) = pages.get(&page_number) {
            sample.push_str(excerpt(text, PAGE_EXCERPT_CHARS));
            sample.push('\n');
        }
    }
    let sample = excerpt(&sample, SAMPLE_CHARS);

    let context = serde_json::json!({
        "vessel_number": vessel_info.vessel_number.as_deref().unwrap_or("Unknown"),
        "customer": vessel_info.customer.as_deref().unwrap_or("Unknown"),
        "total_weight": weights.total_operating_weight.unwrap_or(0.0),
        "surface_area": weights.surface_area.unwrap_or(0.0),
    });

    let template = r#"Provide JSON response with exactly this structure:
{
  "enhanced_vessel_info": {
    "design_pressure": "50 psi",
    "material_grade": "SA-240 316",
    "design_temperature": "150°F"
  },
  "manual_cost_estimates": {
    "legs_fabrication": {"unit_cost": 1500, "unit": "per leg", "total_cost": 6000},
    "painting": {"unit_cost": 12, "unit": "per ft²", "total_cost": 1896},
    "testing_xray": {"unit_cost": 75, "unit": "per ft", "total_cost": 3000},
    "testing_ut": {"unit_cost": 150, "unit": "per test", "total_cost": 900},
    "transportation": {"unit_cost": 2500, "unit": "per shipment", "total_cost": 2500},
    "manway": {"unit_cost": 1200, "unit": "each", "total_cost": 1200}
  },
  "validation": {
    "overall_confidence": 8,
    "warnings": ["Check for missing flanges and fasteners"]
  },
  "market_summary": "Current stainless steel 316 costs are stable."
}

Use realistic US market rates. Return only valid JSON."#;

    format!(
        "Analyze pressure vessel data and provide cost estimates.\n\n\
         PDF Sample: {sample}\n\n\
         Current Data: {context}\n\n\
         {template}"
    )
}

/// Truncate to at most `max` characters without splitting a code point.
fn excerpt(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// The model sometimes wraps its JSON in a markdown code fence.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counting transport: records every call, then returns a canned
    /// response or an error.
    struct MockApi {
        calls: Arc<AtomicUsize>,
        response: Option<String>,
    }

    impl MockApi {
        fn ok(response: &str) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: calls.clone(),
                    response: Some(response.to_string()),
                },
                calls,
            )
        }

        fn failing() -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: calls.clone(),
                    response: None,
                },
                calls,
            )
        }
    }

    impl CompletionApi for MockApi {
        async fn complete(&self, _api_key: &str, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Some(text) => Ok(text.clone()),
                None => anyhow::bail!("connection timed out"),
            }
        }
    }

    fn vessel() -> VesselInfo {
        VesselInfo {
            vessel_number: Some("V-100".into()),
            customer: Some("Acme Corp".into()),
            ..VesselInfo::default()
        }
    }

    const GOOD_RESPONSE: &str = r#"{
        "enhanced_vessel_info": {"design_pressure": "50 psi"},
        "manual_cost_estimates": {
            "painting": {"unit_cost": 12, "unit": "per ft²", "total_cost": 99999},
            "transportation": {"unit_cost": 2500, "unit": "per shipment", "total_cost": 2500},
            "manway": "not an object"
        },
        "validation": {"overall_confidence": 9, "warnings": []},
        "market_summary": "Stable."
    }"#;

    #[tokio::test]
    async fn no_credential_short_circuits_without_network_io() {
        let (api, calls) = MockApi::ok(GOOD_RESPONSE);
        let client = EnrichmentClient::new(api, None);

        let result = client
            .analyze(&PageText::new(), &vessel(), &WeightSummary::default())
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(result.manual_costs.is_empty());
        assert_eq!(result.validation.confidence, 7);
        assert!(result.analysis.is_empty());
        assert_eq!(result.vessel_info, vessel());
    }

    #[tokio::test]
    async fn transport_failure_produces_the_fallback_estimate() {
        let (api, calls) = MockApi::failing();
        let client = EnrichmentClient::new(api, Some("sk-test".into()));
        let weights = WeightSummary {
            surface_area: Some(200.0),
            ..WeightSummary::default()
        };

        let result = client.analyze(&PageText::new(), &vessel(), &weights).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.validation.confidence, 7);
        assert!(!result.validation.warnings.is_empty());
        assert!(result.validation.warnings[0].contains("fallback"));

        let painting = &result.manual_costs["painting"];
        assert_eq!(painting.total_cost, 2400.0);
        assert_eq!(painting.source, CostSource::Fallback);
        assert_eq!(result.manual_costs["legs_fabrication"].total_cost, 6000.0);
        assert_eq!(result.manual_costs["testing_xray"].total_cost, 3000.0);
        assert_eq!(result.manual_costs["transportation"].total_cost, 2500.0);
    }

    #[tokio::test]
    async fn fallback_surface_area_defaults_when_unknown() {
        let (api, _) = MockApi::failing();
        let client = EnrichmentClient::new(api, Some("sk-test".into()));

        let result = client
            .analyze(&PageText::new(), &vessel(), &WeightSummary::default())
            .await;

        assert_eq!(result.manual_costs["painting"].total_cost, 12.0 * 158.0);
    }

    #[tokio::test]
    async fn painting_total_is_recomputed_from_extracted_surface_area() {
        let (api, _) = MockApi::ok(GOOD_RESPONSE);
        let client = EnrichmentClient::new(api, Some("sk-test".into()));
        let weights = WeightSummary {
            surface_area: Some(200.0),
            ..WeightSummary::default()
        };

        let result = client.analyze(&PageText::new(), &vessel(), &weights).await;

        // Remote said 99999; the local recomputation must win.
        let painting = &result.manual_costs["painting"];
        assert_eq!(painting.total_cost, 2400.0);
        assert_eq!(painting.source, CostSource::AiEstimate);
        // Other services keep the remote total.
        assert_eq!(result.manual_costs["transportation"].total_cost, 2500.0);
    }

    #[tokio::test]
    async fn malformed_service_entries_are_treated_as_absent() {
        let (api, _) = MockApi::ok(GOOD_RESPONSE);
        let client = EnrichmentClient::new(api, Some("sk-test".into()));

        let result = client
            .analyze(&PageText::new(), &vessel(), &WeightSummary::default())
            .await;

        assert!(!result.manual_costs.contains_key("manway"));
        assert_eq!(result.manual_costs.len(), 2);
    }

    #[tokio::test]
    async fn enriched_fields_merge_over_traditional_ones() {
        let (api, _) = MockApi::ok(GOOD_RESPONSE);
        let client = EnrichmentClient::new(api, Some("sk-test".into()));

        let result = client
            .analyze(&PageText::new(), &vessel(), &WeightSummary::default())
            .await;

        assert_eq!(result.vessel_info.design_pressure.as_deref(), Some("50 psi"));
        assert_eq!(result.vessel_info.vessel_number.as_deref(), Some("V-100"));
        assert_eq!(result.validation.confidence, 9);
        assert_eq!(result.analysis, "Stable.");
    }

    #[tokio::test]
    async fn fenced_json_is_accepted() {
        let fenced = format!("```json\n{}\n```", GOOD_RESPONSE);
        let (api, _) = MockApi::ok(&fenced);
        let client = EnrichmentClient::new(api, Some("sk-test".into()));

        let result = client
            .analyze(&PageText::new(), &vessel(), &WeightSummary::default())
            .await;

        assert_eq!(result.validation.confidence, 9);
    }

    #[tokio::test]
    async fn garbage_response_falls_back() {
        let (api, _) = MockApi::ok("Sorry, I cannot help with that.");
        let client = EnrichmentClient::new(api, Some("sk-test".into()));

        let result = client
            .analyze(&PageText::new(), &vessel(), &WeightSummary::default())
            .await;

        assert_eq!(result.validation.confidence, 7);
        assert!(result.analysis.starts_with("Using fallback estimates"));
    }

    #[test]
    fn prompt_text_excerpt_is_bounded() {
        let mut pages = PageText::new();
        pages.insert(1, "x".repeat(5000));
        pages.insert(2, "y".repeat(5000));

        let prompt = build_prompt(&pages, &vessel(), &WeightSummary::default());
        let sample_start = prompt.find("PDF Sample:").unwrap();
        let sample_end = prompt.find("Current Data:").unwrap();
        assert!(sample_end - sample_start < SAMPLE_CHARS + 50);
        assert!(prompt.contains("enhanced_vessel_info"));
        assert!(prompt.contains("V-100"));
    }

    #[test]
    fn code_fence_stripping_handles_plain_and_labeled_fences() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
    }
}
