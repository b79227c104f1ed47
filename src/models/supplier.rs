use serde::{Deserialize, Serialize};

/// Supplier relationship status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SupplierStatus {
    Active,
    OnHold,
    Inactive,
}

impl SupplierStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplierStatus::Active => "active",
            SupplierStatus::OnHold => "on-hold",
            SupplierStatus::Inactive => "inactive",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SupplierStatus::Active),
            "on-hold" => Some(SupplierStatus::OnHold),
            "inactive" => Some(SupplierStatus::Inactive),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SupplierStatus::Active => "Активен",
            SupplierStatus::OnHold => "Приостановлен",
            SupplierStatus::Inactive => "Неактивен",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneType {
    Mobile,
    Landline,
}

impl PhoneType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhoneType::Mobile => "mobile",
            PhoneType::Landline => "landline",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "mobile" => Some(PhoneType::Mobile),
            "landline" => Some(PhoneType::Landline),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Messenger {
    None,
    WhatsApp,
    Telegram,
    Viber,
}

impl Messenger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Messenger::None => "none",
            Messenger::WhatsApp => "whatsapp",
            Messenger::Telegram => "telegram",
            Messenger::Viber => "viber",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "" | "none" => Some(Messenger::None),
            "whatsapp" => Some(Messenger::WhatsApp),
            "telegram" => Some(Messenger::Telegram),
            "viber" => Some(Messenger::Viber),
            _ => None,
        }
    }
}

/// Contact phone of a supplier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierPhone {
    pub number: String,
    pub phone_type: PhoneType,
    pub messenger: Messenger,
}

impl SupplierPhone {
    /// Parse `number[:type[:messenger]]`, e.g. `+79001234567:mobile:telegram`
    pub fn parse_spec(spec: &str) -> Result<Self, String> {
        let mut parts = spec.split(':').map(|p| p.trim());
        let number = parts.next().unwrap_or("");
        if number.is_empty() {
            return Err("Phone number cannot be empty".to_string());
        }
        let phone_type = match parts.next() {
            Some(t) if !t.is_empty() => PhoneType::from_str(t)
                .ok_or_else(|| format!("Invalid phone type '{}'. Use mobile or landline.", t))?,
            _ => PhoneType::Mobile,
        };
        let messenger = match parts.next() {
            Some(m) => Messenger::from_str(m).ok_or_else(|| {
                format!("Invalid messenger '{}'. Use whatsapp, telegram, viber or none.", m)
            })?,
            None => Messenger::None,
        };
        if parts.next().is_some() {
            return Err(format!("Invalid phone '{}'. Expected number[:type[:messenger]]", spec));
        }
        Ok(Self {
            number: number.to_string(),
            phone_type,
            messenger,
        })
    }
}

/// Supplier tag with its display color
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupplierTag {
    pub name: String,
    pub color: &'static str,
}

impl SupplierTag {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let color = tag_color(&name);
        Self { name, color }
    }
}

/// Fixed colors for the well-known supplier tags
pub fn tag_color(tag: &str) -> &'static str {
    match tag {
        "Собственное производство" => "bg-green-500",
        "Дилерская скидка" => "bg-blue-500",
        "Удобный склад" => "bg-purple-500",
        "Есть отсрочка" => "bg-orange-500",
        "Быстрая доставка" => "bg-red-500",
        "Эксклюзивный поставщик" => "bg-indigo-500",
        _ => "bg-gray-500",
    }
}

/// Purchase order placed with a supplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "in_progress" => Some(OrderStatus::InProgress),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierOrder {
    pub id: Option<i64>,
    pub supplier_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: OrderStatus,
    pub amount: f64,
    pub created_ts: i64,
}

/// Supplier model with its relations and aggregates loaded
#[derive(Debug, Clone, Serialize)]
pub struct Supplier {
    pub id: Option<i64>,
    pub name: String,
    pub entity_type: String,
    pub location: Option<String>,
    pub email: Option<String>,
    pub contact_person: Option<String>,
    pub status: SupplierStatus,
    pub categories: Vec<String>,
    pub tags: Vec<SupplierTag>,
    pub phones: Vec<SupplierPhone>,
    pub orders_count: i64, // completed orders only
    pub rating: Option<f64>,
    pub created_ts: i64,
    pub modified_ts: i64,
}

/// Input for creating or editing a supplier (`None` = unchanged on edit)
#[derive(Debug, Clone, Default)]
pub struct SupplierFields {
    pub name: Option<String>,
    pub entity_type: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub contact_person: Option<String>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub phones: Option<Vec<SupplierPhone>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supplier_status_conversion() {
        assert_eq!(SupplierStatus::from_str("on-hold"), Some(SupplierStatus::OnHold));
        assert_eq!(SupplierStatus::OnHold.as_str(), "on-hold");
        assert_eq!(SupplierStatus::from_str("on_hold"), None);
        assert_eq!(SupplierStatus::Active.label(), "Активен");
    }

    #[test]
    fn test_parse_phone_spec() {
        let phone = SupplierPhone::parse_spec("+79001234567").unwrap();
        assert_eq!(phone.phone_type, PhoneType::Mobile);
        assert_eq!(phone.messenger, Messenger::None);

        let phone = SupplierPhone::parse_spec("+74951234567:landline").unwrap();
        assert_eq!(phone.phone_type, PhoneType::Landline);

        let phone = SupplierPhone::parse_spec("+79001234567:mobile:telegram").unwrap();
        assert_eq!(phone.messenger, Messenger::Telegram);

        assert!(SupplierPhone::parse_spec("").is_err());
        assert!(SupplierPhone::parse_spec("123:fax").is_err());
        assert!(SupplierPhone::parse_spec("123:mobile:icq").is_err());
    }

    #[test]
    fn test_tag_colors() {
        assert_eq!(SupplierTag::new("Быстрая доставка").color, "bg-red-500");
        assert_eq!(SupplierTag::new("Рядом с МКАД").color, "bg-gray-500");
    }

    #[test]
    fn test_order_status_conversion() {
        assert_eq!(OrderStatus::from_str("in_progress"), Some(OrderStatus::InProgress));
        assert_eq!(OrderStatus::Completed.as_str(), "completed");
        assert_eq!(OrderStatus::from_str("done"), None);
    }
}
