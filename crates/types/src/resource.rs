use crate::error::TypeError;

/// A backend collection name, validated as a safe URL path segment.
///
/// Names are lowercase ASCII letters, digits, `-` and `_`; anything else
/// (slashes especially) is rejected so a collection name can never escape
/// its path position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionName(String);

impl CollectionName {
    pub fn new(input: impl AsRef<str>) -> Result<Self, TypeError> {
        let name = input.as_ref().trim();
        if name.is_empty() {
            return Err(TypeError::EmptyCollectionName);
        }
        for ch in name.chars() {
            if !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_') {
                return Err(TypeError::InvalidCollectionName(ch));
            }
        }
        Ok(Self(name.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_name_accepts_plain_segments() {
        assert_eq!(CollectionName::new("patients").unwrap().as_str(), "patients");
        assert_eq!(CollectionName::new(" audit-log ").unwrap().as_str(), "audit-log");
        assert_eq!(CollectionName::new("exam_results").unwrap().as_str(), "exam_results");
    }

    #[test]
    fn test_collection_name_rejects_path_tricks() {
        assert!(matches!(
            CollectionName::new(""),
            Err(TypeError::EmptyCollectionName)
        ));
        assert!(matches!(
            CollectionName::new("patients/1"),
            Err(TypeError::InvalidCollectionName('/'))
        ));
        assert!(matches!(
            CollectionName::new("Patients"),
            Err(TypeError::InvalidCollectionName('P'))
        ));
        assert!(CollectionName::new("..").is_err());
    }
}
