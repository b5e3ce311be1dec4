//! Provider response types

use serde::{Deserialize, Serialize};

/// Trailing-twelve-month metrics as returned by the key-metrics endpoint.
///
/// Every field is independently optional. A missing field means the API
/// did not supply it, which is different from a zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TtmMetrics {
    #[serde(rename = "peRatioTTM")]
    pub pe_ratio: Option<f64>,
    #[serde(rename = "roeTTM")]
    pub roe: Option<f64>,
    #[serde(rename = "roicTTM")]
    pub roic: Option<f64>,
    #[serde(rename = "priceToSalesRatioTTM")]
    pub price_to_sales_ratio: Option<f64>,
    #[serde(rename = "returnOnTangibleAssetsTTM")]
    pub return_on_tangible_assets: Option<f64>,
    #[serde(rename = "netProfitMarginTTM")]
    pub net_profit_margin: Option<f64>,
    #[serde(rename = "debtToEquityTTM")]
    pub debt_to_equity: Option<f64>,
    #[serde(rename = "currentRatioTTM")]
    pub current_ratio: Option<f64>,
    #[serde(rename = "freeCashFlowPerShareTTM")]
    pub free_cash_flow_per_share: Option<f64>,
    #[serde(rename = "netIncomePerShareTTM")]
    pub net_income_per_share: Option<f64>,
    #[serde(rename = "marketCapTTM")]
    pub market_cap: Option<f64>,
    #[serde(rename = "dividendYieldTTM")]
    pub dividend_yield: Option<f64>,
    #[serde(rename = "bookValuePerShareTTM")]
    pub book_value_per_share: Option<f64>,
    #[serde(rename = "ebitMarginTTM")]
    pub ebit_margin: Option<f64>,
}

impl TtmMetrics {
    /// Whether the primary response identifies a real, listed company.
    ///
    /// At least one of P/E, ROE or market cap must be present and strictly
    /// positive.
    pub fn is_meaningful(&self) -> bool {
        [self.pe_ratio, self.roe, self.market_cap]
            .iter()
            .any(|value| matches!(value, Some(v) if *v > 0.0))
    }

    /// Overlay margin ratios from the ratios endpoint.
    ///
    /// Present values win; the existing values stay as fallback.
    pub fn overlay_margins(&mut self, ratios: &MarginRatios) {
        if ratios.net_profit_margin.is_some() {
            self.net_profit_margin = ratios.net_profit_margin;
        }
        if ratios.ebit_margin.is_some() {
            self.ebit_margin = ratios.ebit_margin;
        }
    }
}

/// Margin ratios from the ratios endpoint
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MarginRatios {
    #[serde(rename = "netProfitMarginTTM")]
    pub net_profit_margin: Option<f64>,
    #[serde(rename = "ebitMarginTTM")]
    pub ebit_margin: Option<f64>,
}

/// Result of the key-metrics request
#[derive(Debug, Clone, PartialEq)]
pub enum KeyMetricsOutcome {
    Found(TtmMetrics),
    /// The endpoint answered with an empty array
    Empty,
    /// The endpoint rejected the request as premium-only
    PremiumOnly,
}

/// Result of the ratios request
#[derive(Debug, Clone, PartialEq)]
pub enum RatiosOutcome {
    Found(MarginRatios),
    Empty,
    PremiumOnly,
}

/// Result of verifying an API key against the provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiKeyCheck {
    pub valid: bool,
    pub message: String,
}

/// Company profile, only used for key verification
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyProfile {
    #[serde(rename = "companyName")]
    pub company_name: String,
}
