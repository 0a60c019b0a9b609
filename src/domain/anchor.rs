use crate::domain::taxonomy::TabType;
use crate::utils::error::Result;
use sha1::{Digest, Sha1};

const EMAIL_DIGEST_PREFIX: usize = 10;

/// Anchor text for placing a tab of `tab_type` for the recipient with `email`.
///
/// First 10 hex chars of SHA-1(email), then the tab type abbreviation, then
/// `disambiguator` (empty unless one person has several tabs of the same type
/// on a document).
pub fn generate_anchor(tab_type: &str, email: &str, disambiguator: &str) -> Result<String> {
    let tab_type = TabType::lookup(tab_type)?;
    Ok(anchor_for(tab_type, email, disambiguator))
}

pub fn anchor_for(tab_type: TabType, email: &str, disambiguator: &str) -> String {
    let digest = hex::encode(Sha1::digest(email.as_bytes()));
    format!(
        "{}{}{}",
        &digest[..EMAIL_DIGEST_PREFIX],
        tab_type.abbreviation(),
        disambiguator
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::DocuSignError;

    #[test]
    fn test_known_anchor() {
        let anchor = generate_anchor("signHere", "a@b.com", "").unwrap();
        assert_eq!(anchor, "1022b0c3a1signh");
    }

    #[test]
    fn test_anchor_is_deterministic() {
        let first = generate_anchor("signHere", "a@b.com", "").unwrap();
        let second = generate_anchor("signHere", "a@b.com", "").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_email_changes_digest_prefix() {
        let a = generate_anchor("signHere", "a@b.com", "").unwrap();
        let c = generate_anchor("signHere", "c@d.com", "").unwrap();
        assert_eq!(c, "0c5541dd11signh");
        assert_ne!(a[..10], c[..10]);
        assert_eq!(a[10..], c[10..]);
    }

    #[test]
    fn test_tab_type_changes_suffix() {
        let sign = generate_anchor("signHere", "a@b.com", "").unwrap();
        let date = generate_anchor("dateSigned", "a@b.com", "").unwrap();
        assert_eq!(sign[..10], date[..10]);
        assert!(date.ends_with("dates"));
        assert_ne!(sign, date);
    }

    #[test]
    fn test_disambiguator_is_appended() {
        let anchor = generate_anchor("initialHere", "a@b.com", "2").unwrap();
        assert_eq!(anchor, "1022b0c3a1initi2");
        assert_eq!(anchor_for(TabType::InitialHere, "a@b.com", "2"), anchor);
    }

    #[test]
    fn test_unknown_tab_type() {
        assert!(matches!(
            generate_anchor("stamp", "a@b.com", ""),
            Err(DocuSignError::UnknownTabType { .. })
        ));
    }
}
