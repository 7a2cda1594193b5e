//! Static company directory for deterministic industry / size enrichment.

use lazy_static::lazy_static;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanyInfo {
    pub industry: &'static str,
    pub size: &'static str,
}

/// Fallback bucket applied when a company is not in the directory.
pub const DEFAULT_COMPANY_INFO: CompanyInfo = CompanyInfo {
    industry: "Technology",
    size: "unknown",
};

lazy_static! {
    static ref COMPANY_DIRECTORY: HashMap<&'static str, CompanyInfo> = {
        let mut m = HashMap::new();
        let mut add = |name: &'static str, industry: &'static str, size: &'static str| {
            m.insert(name, CompanyInfo { industry, size });
        };

        add("google", "Technology", "enterprise");
        add("meta", "Technology", "enterprise");
        add("amazon", "Technology", "enterprise");
        add("microsoft", "Technology", "enterprise");
        add("apple", "Technology", "enterprise");
        add("netflix", "Media", "large");
        add("stripe", "Fintech", "large");
        add("databricks", "Technology", "large");
        add("airbnb", "Travel", "large");
        add("goldman sachs", "Finance", "enterprise");
        add("jane street", "Finance", "mid-size");
        add("two sigma", "Finance", "mid-size");
        add("mckinsey", "Consulting", "enterprise");
        add("bain", "Consulting", "large");
        add("pfizer", "Healthcare", "enterprise");
        add("moderna", "Healthcare", "large");
        add("spacex", "Aerospace", "large");
        add("anduril", "Aerospace", "mid-size");

        m
    };
}

/// Look up industry and size for a company name. Matching is case-insensitive
/// and tolerates suffixes ("Google LLC" matches "google"); unrecognized names
/// land in the default bucket rather than returning nothing.
pub fn lookup_company(name: &str) -> CompanyInfo {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return DEFAULT_COMPANY_INFO;
    }

    if let Some(info) = COMPANY_DIRECTORY.get(needle.as_str()) {
        return *info;
    }

    COMPANY_DIRECTORY
        .iter()
        .find(|(key, _)| needle.contains(*key))
        .map(|(_, info)| *info)
        .unwrap_or(DEFAULT_COMPANY_INFO)
}
