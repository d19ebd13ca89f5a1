use serde::{Deserialize, Serialize};

/// Row of the salesperson master table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Salesperson {
    pub salesman_no: i64,
    pub salesman_name: String,
    pub role: Option<String>,
}

impl Salesperson {
    pub fn is_hospitality(&self) -> bool {
        is_hospitality_role(self.role.as_deref().unwrap_or(""))
    }

    pub fn info(&self) -> SalespersonInfo {
        SalespersonInfo {
            salesperson_id: self.salesman_no,
            salesperson_name: self.salesman_name.clone(),
            role: self.role.clone().unwrap_or_else(|| "Unknown".to_string()),
            is_hospitality: self.is_hospitality(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalespersonInfo {
    pub salesperson_id: i64,
    pub salesperson_name: String,
    pub role: String,
    pub is_hospitality: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalespersonInfoResponse {
    pub success: bool,
    pub data: SalespersonInfo,
}

/// Hospitality salespeople sell per flag/brand instead of per customer
pub fn is_hospitality_role(role: &str) -> bool {
    role.to_lowercase().starts_with("hospitality")
}

/// Canonical customer class: every `Hospitality*` class collapses to `Hospitality`
pub fn normalize_customer_class(class: &str) -> String {
    if class.starts_with("Hospitality") {
        "Hospitality".to_string()
    } else {
        class.to_string()
    }
}
