use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainSearchResult {
    pub domain: String,
    pub available: bool,
    pub price: f64,
    pub currency: String,
    #[serde(default)]
    pub premium: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResellerDomainInfo {
    pub domain: String,
    pub registrar: String,
    pub created_date: String,
    pub expiry_date: String,
    pub status: String,
    pub nameservers: Vec<String>,
    pub whois_privacy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationContacts {
    pub registrant: ContactInfo,
    pub admin: ContactInfo,
    pub tech: ContactInfo,
    pub billing: ContactInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRegistrationData {
    pub domain: String,
    pub years: u32,
    pub contacts: RegistrationContacts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nameservers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whois_privacy: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResellerDnsRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub value: String,
    pub ttl: u32,
}
