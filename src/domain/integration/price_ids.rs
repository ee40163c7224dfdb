//! The ordered set of Stripe price ids a tenant sells.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Price ids as entered by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PriceIdsInput {
    /// Comma and/or newline separated.
    Text(String),
    List(Vec<String>),
}

/// Trimmed, blank-free, de-duplicated price ids in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceIds(Vec<String>);

impl PriceIds {
    pub fn normalize(input: PriceIdsInput) -> Self {
        let raw: Vec<String> = match input {
            PriceIdsInput::Text(text) => text
                .split(|c| c == ',' || c == '\n' || c == '\r')
                .map(str::to_string)
                .collect(),
            PriceIdsInput::List(list) => list,
        };

        let mut ids: Vec<String> = Vec::with_capacity(raw.len());
        for id in raw {
            let id = id.trim();
            if !id.is_empty() && !ids.iter().any(|existing| existing == id) {
                ids.push(id.to_string());
            }
        }
        Self(ids)
    }

    /// Normalizes and requires at least one id.
    pub fn parse(input: PriceIdsInput) -> Result<Self, ValidationError> {
        let ids = Self::normalize(input);
        if ids.0.is_empty() {
            return Err(ValidationError::empty_field("price_ids"));
        }
        Ok(ids)
    }

    pub fn contains(&self, price_id: &str) -> bool {
        self.0.iter().any(|id| id == price_id)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for PriceIds {
    fn from(ids: Vec<String>) -> Self {
        Self::normalize(PriceIdsInput::List(ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn text_with_commas_and_newlines() {
        let ids = PriceIds::normalize(PriceIdsInput::Text(
            " price_a, price_b\nprice_a\r\n\n,price_c ".to_string(),
        ));
        assert_eq!(ids.as_slice(), ["price_a", "price_b", "price_c"]);
    }

    #[test]
    fn list_strips_blanks_and_duplicates() {
        let ids = PriceIds::normalize(PriceIdsInput::List(vec![
            "price_b".to_string(),
            " ".to_string(),
            "price_a".to_string(),
            "price_b ".to_string(),
        ]));
        assert_eq!(ids.as_slice(), ["price_b", "price_a"]);
    }

    #[test]
    fn parse_rejects_all_blank() {
        let result = PriceIds::parse(PriceIdsInput::Text(" , \n ".to_string()));
        assert_eq!(result, Err(ValidationError::empty_field("price_ids")));
    }

    #[test]
    fn input_deserializes_from_string_or_array() {
        let text: PriceIdsInput = serde_json::from_str(r#""a,b""#).unwrap();
        let list: PriceIdsInput = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(PriceIds::normalize(text), PriceIds::normalize(list));
    }

    #[test]
    fn contains_exact_match_only() {
        let ids = PriceIds::from(vec!["price_a".to_string()]);
        assert!(ids.contains("price_a"));
        assert!(!ids.contains("price_"));
    }

    fn arb_id() -> impl Strategy<Value = String> {
        prop_oneof![
            "price_[a-z0-9]{1,6}",
            Just(String::new()),
            "[ ]{1,3}",
            " price_[a-z]{1,3} ",
        ]
    }

    proptest! {
        #[test]
        fn text_and_list_forms_normalize_identically(
            ids in prop::collection::vec(arb_id(), 0..12),
            use_newlines in any::<bool>(),
        ) {
            let separator = if use_newlines { "\n" } else { "," };
            let from_text = PriceIds::normalize(PriceIdsInput::Text(ids.join(separator)));
            let from_list = PriceIds::normalize(PriceIdsInput::List(ids.clone()));

            prop_assert_eq!(&from_text, &from_list);
        }

        #[test]
        fn normalized_ids_are_trimmed_unique_and_non_blank(
            ids in prop::collection::vec(arb_id(), 0..12),
        ) {
            let normalized = PriceIds::normalize(PriceIdsInput::List(ids));
            let slice = normalized.as_slice();

            for (i, id) in slice.iter().enumerate() {
                prop_assert!(!id.is_empty());
                prop_assert_eq!(id.trim(), id.as_str());
                prop_assert!(!slice[..i].contains(id));
            }
        }
    }
}
