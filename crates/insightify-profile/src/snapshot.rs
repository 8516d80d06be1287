//! Mapping from the market-data field bag to a [`FinancialSnapshot`]

use crate::profile::{FieldValue, FinancialSnapshot, MetricGroup};
use serde_json::{Map, Value};

/// Flat upstream field bag (one key per reported metric)
pub type InfoBag = Map<String, Value>;

/// (response label, upstream field) pairs for each section
const COMPANY_INFO: &[(&str, &str)] = &[
    ("Company Name", "longName"),
    ("Sector", "sector"),
    ("Industry", "industry"),
    ("Country", "country"),
    ("Website", "website"),
    ("Description", "longBusinessSummary"),
    ("Full Time Employees", "fullTimeEmployees"),
];

const MARKET_DATA: &[(&str, &str)] = &[
    ("Market Cap", "marketCap"),
    ("Current Price", "currentPrice"),
    ("52 Week High", "fiftyTwoWeekHigh"),
    ("52 Week Low", "fiftyTwoWeekLow"),
    ("50 Day Average", "fiftyDayAverage"),
    ("200 Day Average", "twoHundredDayAverage"),
    ("Volume", "volume"),
    ("Average Volume", "averageVolume"),
];

const FINANCIAL_METRICS: &[(&str, &str)] = &[
    ("PE Ratio", "trailingPE"),
    ("Forward PE", "forwardPE"),
    ("EPS", "trailingEps"),
    ("Forward EPS", "forwardEps"),
    ("PEG Ratio", "pegRatio"),
    ("Price to Book", "priceToBook"),
    ("Price to Sales", "priceToSalesTrailing12Months"),
    ("Beta", "beta"),
];

const INCOME_STATEMENT: &[(&str, &str)] = &[
    ("Revenue", "totalRevenue"),
    ("Revenue Growth", "revenueGrowth"),
    ("Gross Profits", "grossProfits"),
    ("EBITDA", "ebitda"),
    ("Net Income", "netIncomeToCommon"),
    ("Profit Margin", "profitMargins"),
    ("Operating Margin", "operatingMargins"),
    ("Gross Margin", "grossMargins"),
];

// The quote summary carries no liabilities total; debt stands in for it.
const BALANCE_SHEET: &[(&str, &str)] = &[
    ("Total Cash", "totalCash"),
    ("Total Debt", "totalDebt"),
    ("Current Ratio", "currentRatio"),
    ("Quick Ratio", "quickRatio"),
    ("Total Assets", "totalAssets"),
    ("Total Liabilities", "totalDebt"),
    ("Book Value", "bookValue"),
];

const DIVIDEND_INFO: &[(&str, &str)] = &[
    ("Dividend Rate", "dividendRate"),
    ("Dividend Yield", "dividendYield"),
    ("Payout Ratio", "payoutRatio"),
    ("Ex-Dividend Date", "exDividendDate"),
];

fn group(info: &InfoBag, fields: &[(&'static str, &str)]) -> MetricGroup {
    fields
        .iter()
        .map(|&(label, key)| {
            let value = info.get(key).filter(|v| !v.is_null()).cloned();
            (label, FieldValue::from(value))
        })
        .collect()
}

/// Build every section; fields missing upstream become the marker
pub fn from_info(info: &InfoBag) -> FinancialSnapshot {
    FinancialSnapshot {
        company_info: group(info, COMPANY_INFO),
        market_data: group(info, MARKET_DATA),
        financial_metrics: group(info, FINANCIAL_METRICS),
        income_statement: group(info, INCOME_STATEMENT),
        balance_sheet: group(info, BALANCE_SHEET),
        dividend_info: group(info, DIVIDEND_INFO),
    }
}

/// Names under the `competitors` field, when it is a list of strings
pub fn competitor_hint(info: &InfoBag) -> Vec<String> {
    info.get("competitors")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: Value) -> InfoBag {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_sections_have_every_label() {
        let snapshot = from_info(&InfoBag::new());
        assert_eq!(snapshot.company_info.len(), 7);
        assert_eq!(snapshot.market_data.len(), 8);
        assert_eq!(snapshot.financial_metrics.len(), 8);
        assert_eq!(snapshot.income_statement.len(), 8);
        assert_eq!(snapshot.balance_sheet.len(), 7);
        assert_eq!(snapshot.dividend_info.len(), 4);
        assert!(
            snapshot
                .market_data
                .values()
                .all(|v| *v == FieldValue::NotAvailable)
        );
    }

    #[test]
    fn test_values_keep_their_json_type() {
        let snapshot = from_info(&bag(json!({
            "longName": "Apple Inc.",
            "marketCap": 3_400_000_000_000_i64,
            "trailingPE": 35.2,
            "totalDebt": 101_304_000_000_i64,
            "dividendYield": null
        })));

        assert_eq!(
            snapshot.company_info["Company Name"],
            FieldValue::Available(json!("Apple Inc."))
        );
        assert_eq!(
            snapshot.market_data["Market Cap"],
            FieldValue::Available(json!(3_400_000_000_000_i64))
        );
        assert_eq!(
            snapshot.financial_metrics["PE Ratio"],
            FieldValue::Available(json!(35.2))
        );
        assert_eq!(
            snapshot.balance_sheet["Total Liabilities"],
            snapshot.balance_sheet["Total Debt"]
        );
        assert_eq!(
            snapshot.dividend_info["Dividend Yield"],
            FieldValue::NotAvailable
        );
    }

    #[test]
    fn test_snapshot_serializes_markers() {
        let snapshot = from_info(&bag(json!({"sector": "Technology"})));
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["company_info"]["Sector"], json!("Technology"));
        assert_eq!(value["company_info"]["Website"], json!("N/A"));
        assert_eq!(value["dividend_info"]["Ex-Dividend Date"], json!("N/A"));
    }

    #[test]
    fn test_competitor_hint() {
        let info = bag(json!({"competitors": ["Microsoft", 42, "Alphabet"]}));
        assert_eq!(competitor_hint(&info), vec!["Microsoft", "Alphabet"]);
        assert!(competitor_hint(&bag(json!({"competitors": "Microsoft"}))).is_empty());
        assert!(competitor_hint(&InfoBag::new()).is_empty());
    }
}
