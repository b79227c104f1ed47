use serde::{Deserialize, Serialize};

/// Estimate lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateStatus {
    Draft,
    Sent,
    Approved,
    Rejected,
}

impl EstimateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimateStatus::Draft => "draft",
            EstimateStatus::Sent => "sent",
            EstimateStatus::Approved => "approved",
            EstimateStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(EstimateStatus::Draft),
            "sent" => Some(EstimateStatus::Sent),
            "approved" => Some(EstimateStatus::Approved),
            "rejected" => Some(EstimateStatus::Rejected),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EstimateStatus::Draft => "Черновик",
            EstimateStatus::Sent => "Отправлена",
            EstimateStatus::Approved => "Утверждена",
            EstimateStatus::Rejected => "Отклонена",
        }
    }

    /// Draft and sent estimates still count as work in progress
    pub fn is_open(&self) -> bool {
        matches!(self, EstimateStatus::Draft | EstimateStatus::Sent)
    }
}

pub const DEFAULT_UNIT: &str = "шт";

/// One line of an estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateItem {
    pub id: Option<i64>,
    pub position: i64,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub price: f64,
}

impl EstimateItem {
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>, price: f64) -> Self {
        Self {
            id: None,
            position: 0,
            name: name.into(),
            quantity,
            unit: unit.into(),
            price,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.quantity * self.price
    }

    /// Parse an item spec of the form `name;quantity;unit;price`.
    /// Trailing fields may be omitted: quantity defaults to 1, unit to "шт",
    /// price to 0.
    pub fn parse_spec(spec: &str) -> Result<Self, String> {
        let parts: Vec<&str> = spec.split(';').map(|p| p.trim()).collect();
        if parts.len() > 4 {
            return Err(format!(
                "Invalid item '{}'. Expected name;quantity;unit;price",
                spec
            ));
        }
        let name = parts[0];
        if name.is_empty() {
            return Err(format!("Invalid item '{}'. Item name cannot be empty", spec));
        }

        let number = |idx: usize, field: &str, default: f64| -> Result<f64, String> {
            match parts.get(idx) {
                Some(raw) if !raw.is_empty() => {
                    let value = raw
                        .replace(',', ".")
                        .parse::<f64>()
                        .map_err(|_| format!("Invalid {} '{}' in item '{}'", field, raw, spec))?;
                    if value < 0.0 || !value.is_finite() {
                        return Err(format!("Invalid {} '{}' in item '{}'", field, raw, spec));
                    }
                    Ok(value)
                }
                _ => Ok(default),
            }
        };

        let quantity = number(1, "quantity", 1.0)?;
        let unit = match parts.get(2) {
            Some(u) if !u.is_empty() => u.to_string(),
            _ => DEFAULT_UNIT.to_string(),
        };
        let price = number(3, "price", 0.0)?;

        Ok(Self::new(name, quantity, unit, price))
    }
}

/// Sum of quantity * price over all items
pub fn estimate_total(items: &[EstimateItem]) -> f64 {
    items.iter().map(EstimateItem::line_total).sum()
}

/// Estimate model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Estimate {
    pub id: Option<i64>,
    pub title: String,
    pub client_id: Option<i64>,
    pub client_name: Option<String>,
    pub status: EstimateStatus,
    pub valid_until: Option<String>, // YYYY-MM-DD
    pub items: Vec<EstimateItem>,
    pub created_ts: i64,
    pub modified_ts: i64,
}

impl Estimate {
    pub fn total(&self) -> f64 {
        estimate_total(&self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_status_conversion() {
        assert_eq!(EstimateStatus::from_str("draft"), Some(EstimateStatus::Draft));
        assert_eq!(EstimateStatus::from_str("approved"), Some(EstimateStatus::Approved));
        assert_eq!(EstimateStatus::from_str("paid"), None);
        assert_eq!(EstimateStatus::Sent.label(), "Отправлена");
        assert!(EstimateStatus::Draft.is_open());
        assert!(!EstimateStatus::Rejected.is_open());
    }

    #[test]
    fn test_parse_full_spec() {
        let item = EstimateItem::parse_spec("Рулонный газон;120;м2;350").unwrap();
        assert_eq!(item.name, "Рулонный газон");
        assert_eq!(item.quantity, 120.0);
        assert_eq!(item.unit, "м2");
        assert_eq!(item.price, 350.0);
        assert_eq!(item.line_total(), 42000.0);
    }

    #[test]
    fn test_parse_spec_defaults() {
        let item = EstimateItem::parse_spec("Выезд замерщика").unwrap();
        assert_eq!(item.quantity, 1.0);
        assert_eq!(item.unit, "шт");
        assert_eq!(item.price, 0.0);

        let item = EstimateItem::parse_spec("Щебень;2,5;т").unwrap();
        assert_eq!(item.quantity, 2.5);
        assert_eq!(item.unit, "т");
    }

    #[test]
    fn test_parse_spec_errors() {
        assert!(EstimateItem::parse_spec("").is_err());
        assert!(EstimateItem::parse_spec(";1;шт;10").is_err());
        assert!(EstimateItem::parse_spec("Труба;abc").is_err());
        assert!(EstimateItem::parse_spec("Труба;-1").is_err());
        assert!(EstimateItem::parse_spec("a;1;b;2;extra").is_err());
    }

    #[test]
    fn test_estimate_total() {
        let items = vec![
            EstimateItem::new("Газон", 100.0, "м2", 300.0),
            EstimateItem::new("Доставка", 1.0, "шт", 5000.0),
        ];
        assert_eq!(estimate_total(&items), 35000.0);
        assert_eq!(estimate_total(&[]), 0.0);
    }
}
