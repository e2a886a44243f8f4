use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use backoffice_core::{DomainError, DomainResult, Entity, EntityKey, new_row_key};

/// Partition used when a surname has no leading ASCII letter.
pub const FALLBACK_PARTITION: &str = "_";

const UNNAMED: &str = "(Unnamed customer)";

/// Longest accepted first name or surname.
pub const MAX_NAME_LEN: usize = 50;

/// Postal address lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

/// Create/edit form payload for a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    pub first_name: String,
    pub surname: String,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub company_name: Option<String>,
    #[serde(default)]
    pub address: PostalAddress,
}

impl CustomerInput {
    pub fn validate(&self) -> DomainResult<()> {
        for (field, value) in [("first name", &self.first_name), ("surname", &self.surname)] {
            let value = value.trim();
            if value.is_empty() {
                return Err(DomainError::validation(format!("{field} is required")));
            }
            if value.chars().count() > MAX_NAME_LEN {
                return Err(DomainError::validation(format!(
                    "{field} must be at most {MAX_NAME_LEN} characters"
                )));
            }
        }
        Ok(())
    }
}

/// Stored customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub key: EntityKey,
    pub first_name: String,
    pub surname: String,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub company_name: Option<String>,
    #[serde(default)]
    pub address: PostalAddress,
    pub created_at: DateTime<Utc>,
}

impl Entity for Customer {
    fn key(&self) -> &EntityKey {
        &self.key
    }
}

impl Customer {
    /// Customers are bucketed by the upper-cased initial of their surname.
    pub fn partition_for(surname: &str) -> String {
        match surname.trim().chars().next() {
            Some(c) if c.is_ascii_alphabetic() => c.to_ascii_uppercase().to_string(),
            _ => FALLBACK_PARTITION.to_string(),
        }
    }

    /// Build a new record with a fresh row key.
    pub fn new_from(input: &CustomerInput, created_at: DateTime<Utc>) -> DomainResult<Self> {
        input.validate()?;

        let key = EntityKey::new(Self::partition_for(&input.surname), new_row_key());
        let mut customer = Self {
            key,
            first_name: String::new(),
            surname: String::new(),
            date_of_birth: None,
            phone_number: None,
            email: None,
            company_name: None,
            address: PostalAddress::default(),
            created_at,
        };
        customer.apply_input(input);
        Ok(customer)
    }

    /// Replace every editable field. The key never changes, even if the
    /// surname now belongs to another partition.
    pub fn update_from(&mut self, input: &CustomerInput) -> DomainResult<()> {
        input.validate()?;
        self.apply_input(input);
        Ok(())
    }

    fn apply_input(&mut self, input: &CustomerInput) {
        self.first_name = input.first_name.trim().to_string();
        self.surname = input.surname.trim().to_string();
        self.date_of_birth = input.date_of_birth;
        self.phone_number = trimmed(&input.phone_number);
        self.email = trimmed(&input.email);
        self.company_name = non_blank(&input.company_name);
        self.address = PostalAddress {
            line1: trimmed(&input.address.line1),
            line2: trimmed(&input.address.line2),
            city: trimmed(&input.address.city),
            state: trimmed(&input.address.state),
            zip_code: trimmed(&input.address.zip_code),
            country: trimmed(&input.address.country),
        };
    }

    /// Name shown on orders and pick lists.
    pub fn display_name(&self) -> String {
        let full = [self.first_name.trim(), self.surname.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if !full.is_empty() {
            return full;
        }

        self.company_name
            .as_deref()
            .or(self.email.as_deref())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(UNNAMED)
            .to_string()
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|s| s.trim().to_string())
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(first: &str, surname: &str) -> CustomerInput {
        CustomerInput {
            first_name: first.to_string(),
            surname: surname.to_string(),
            ..CustomerInput::default()
        }
    }

    #[test]
    fn partition_is_surname_initial() {
        assert_eq!(Customer::partition_for("  nkosi"), "N");
        assert_eq!(Customer::partition_for("Zulu"), "Z");
        assert_eq!(Customer::partition_for("  "), "_");
        assert_eq!(Customer::partition_for("Ødegaard"), "_");
        assert_eq!(Customer::partition_for("3M"), "_");
    }

    #[test]
    fn new_from_trims_and_blanks_company() {
        let mut form = input("  Thandi ", " Nkosi ");
        form.company_name = Some("   ".to_string());
        form.email = Some(" thandi@example.com ".to_string());

        let customer = Customer::new_from(&form, Utc::now()).unwrap();
        assert_eq!(customer.key.partition(), "N");
        assert_eq!(customer.first_name, "Thandi");
        assert_eq!(customer.surname, "Nkosi");
        assert_eq!(customer.company_name, None);
        assert_eq!(customer.email.as_deref(), Some("thandi@example.com"));
    }

    #[test]
    fn update_keeps_key_when_surname_changes() {
        let mut customer = Customer::new_from(&input("Thandi", "Nkosi"), Utc::now()).unwrap();
        let key = customer.key.clone();

        customer.update_from(&input("Thandi", "Mokoena")).unwrap();
        assert_eq!(customer.key, key);
        assert_eq!(customer.surname, "Mokoena");
    }

    #[test]
    fn blank_or_long_names_are_rejected() {
        assert!(matches!(
            Customer::new_from(&input("  ", "Nkosi"), Utc::now()),
            Err(DomainError::Validation(msg)) if msg.contains("first name")
        ));
        assert!(matches!(
            Customer::new_from(&input("Thandi", &"x".repeat(51)), Utc::now()),
            Err(DomainError::Validation(msg)) if msg.contains("surname")
        ));
    }

    #[test]
    fn display_name_falls_back() {
        let mut customer = Customer::new_from(&input("Thandi", "Nkosi"), Utc::now()).unwrap();
        assert_eq!(customer.display_name(), "Thandi Nkosi");

        customer.first_name.clear();
        assert_eq!(customer.display_name(), "Nkosi");

        customer.surname.clear();
        customer.company_name = Some("Acme Ltd".to_string());
        assert_eq!(customer.display_name(), "Acme Ltd");

        customer.company_name = None;
        customer.email = Some("x@example.com".to_string());
        assert_eq!(customer.display_name(), "x@example.com");

        customer.email = None;
        assert_eq!(customer.display_name(), "(Unnamed customer)");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: every surname maps to `A`..`Z` or the fallback bucket.
            #[test]
            fn partition_is_single_bucket(surname in "\\PC{0,20}") {
                let partition = Customer::partition_for(&surname);
                prop_assert!(
                    partition == FALLBACK_PARTITION
                        || (partition.len() == 1
                            && partition.chars().all(|c| c.is_ascii_uppercase()))
                );
            }
        }
    }
}
