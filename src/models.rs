use crate::codes::{
    bic_country_code, headquarters_code_for, is_headquarters_code, is_valid_swift_code,
    normalize_code, normalize_country_code,
};
use crate::error::RecordError;
use serde::Deserialize;

/// One row of the directory, keyed by `swift_code`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankCodeRecord {
    pub country_iso2: String,
    pub swift_code: String,
    pub code_type: String,
    pub name: String,
    pub address: String,
    pub town_name: String,
    pub country_name: String,
    pub time_zone: String,
    pub is_headquarters: bool,
    /// Empty for head offices. May name a head office that was never loaded.
    pub headquarters_code: String,
}

/// Raw attributes of a record, as supplied by a spreadsheet row or a
/// create request. Nothing here is normalized yet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBankCode {
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    #[serde(rename = "swiftCode")]
    pub swift_code: String,
    #[serde(rename = "codeType", default)]
    pub code_type: String,
    #[serde(rename = "bankName", alias = "name", alias = "Name", default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(rename = "townName", default)]
    pub town_name: String,
    #[serde(rename = "countryName", default)]
    pub country_name: String,
    #[serde(rename = "timeZone", default)]
    pub time_zone: String,
}

impl NewBankCode {
    /// Builds from positional spreadsheet columns: country ISO-2, swift code,
    /// code type, name, address, town, country name, time zone.
    pub fn from_fields(fields: &[String]) -> Option<Self> {
        match fields {
            [country_iso2, swift_code, code_type, name, address, town_name, country_name, time_zone, ..] => Some(Self {
                country_iso2: country_iso2.clone(),
                swift_code: swift_code.clone(),
                code_type: code_type.clone(),
                name: name.clone(),
                address: address.clone(),
                town_name: town_name.clone(),
                country_name: country_name.clone(),
                time_zone: time_zone.clone(),
            }),
            _ => None,
        }
    }
}

impl TryFrom<NewBankCode> for BankCodeRecord {
    type Error = RecordError;

    fn try_from(raw: NewBankCode) -> Result<Self, Self::Error> {
        let swift_code = normalize_code(&raw.swift_code);
        if !is_valid_swift_code(&swift_code) {
            return Err(RecordError::InvalidSwiftCode(raw.swift_code));
        }
        let country_iso2 = normalize_country_code(&raw.country_iso2)
            .ok_or_else(|| RecordError::InvalidCountryCode(raw.country_iso2.clone()))?;

        if let Some(embedded) = bic_country_code(&swift_code) {
            if embedded != country_iso2 {
                log::warn!(
                    "swift code {} embeds country {} but is listed under {}",
                    swift_code,
                    embedded,
                    country_iso2
                );
            }
        }

        Ok(Self {
            is_headquarters: is_headquarters_code(&swift_code),
            headquarters_code: headquarters_code_for(&swift_code),
            country_iso2,
            swift_code,
            code_type: raw.code_type.trim().to_string(),
            name: raw.name.trim().to_string(),
            address: raw.address.trim().to_string(),
            town_name: raw.town_name.trim().to_string(),
            country_name: raw.country_name.trim().to_uppercase(),
            time_zone: raw.time_zone.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(iso2: &str, code: &str, country: &str) -> NewBankCode {
        NewBankCode {
            country_iso2: iso2.to_string(),
            swift_code: code.to_string(),
            code_type: "BIC11".to_string(),
            name: " ZELAND NATIONAL BANK ".to_string(),
            address: "1 MAIN PLAZA".to_string(),
            town_name: "CAPITAL".to_string(),
            country_name: country.to_string(),
            time_zone: "Europe/Warsaw".to_string(),
        }
    }

    #[test]
    fn head_office_has_no_parent() {
        let record = BankCodeRecord::try_from(raw("zz", "ZZBANKZZXXX", "Zeland")).unwrap();
        assert!(record.is_headquarters);
        assert_eq!(record.headquarters_code, "");
        assert_eq!(record.country_iso2, "ZZ");
        assert_eq!(record.country_name, "ZELAND");
        assert_eq!(record.name, "ZELAND NATIONAL BANK");
    }

    #[test]
    fn branch_derives_parent_from_prefix() {
        let record = BankCodeRecord::try_from(raw("ZZ", "zzbankzz123", "ZELAND")).unwrap();
        assert_eq!(record.swift_code, "ZZBANKZZ123");
        assert!(!record.is_headquarters);
        assert_eq!(record.headquarters_code, "ZZBANKZZXXX");
    }

    #[test]
    fn rejects_malformed_codes() {
        assert!(matches!(
            BankCodeRecord::try_from(raw("ZZ", "SHORT", "ZELAND")),
            Err(RecordError::InvalidSwiftCode(_))
        ));
        assert!(matches!(
            BankCodeRecord::try_from(raw("ZZZ", "ZZBANKZZXXX", "ZELAND")),
            Err(RecordError::InvalidCountryCode(_))
        ));
    }

    #[test]
    fn positional_fields_need_all_eight_columns() {
        let fields: Vec<String> = [
            "PL",
            "BREXPLPWXXX",
            "BIC11",
            "MBANK",
            "ADDR",
            "WARSZAWA",
            "POLAND",
            "Europe/Warsaw",
            "extra",
        ]
        .iter()
        .map(|value| value.to_string())
        .collect();
        let parsed = NewBankCode::from_fields(&fields).unwrap();
        assert_eq!(parsed.swift_code, "BREXPLPWXXX");
        assert_eq!(parsed.time_zone, "Europe/Warsaw");
        assert!(NewBankCode::from_fields(&fields[..7]).is_none());
    }

    #[test]
    fn create_body_accepts_camel_case_shape() {
        let body = r#"{
            "address": "123 Test Ave",
            "bankName": "Test Bank",
            "countryISO2": "zz",
            "countryName": "zeland",
            "isHeadquarter": true,
            "swiftCode": "ZZTEST001"
        }"#;
        let parsed: NewBankCode = serde_json::from_str(body).unwrap();
        let record = BankCodeRecord::try_from(parsed).unwrap();
        assert_eq!(record.name, "Test Bank");
        assert!(!record.is_headquarters);
        assert_eq!(record.headquarters_code, "ZZTEST00XXX");
    }
}
