use crate::error::TypeError;
use std::collections::BTreeMap;

/// Current search/filter parameters of one list view.
///
/// Storing an empty value removes the entry, so the effective query sent
/// to the backend never carries an empty-string filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    entries: BTreeMap<String, String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one filter. An empty (or whitespace-only) value means
    /// "no constraint" and clears the entry instead.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if value.trim().is_empty() {
            self.entries.remove(&name);
        } else {
            self.entries.insert(name, value);
        }
    }

    pub fn clear(&mut self, name: &str) {
        self.entries.remove(name);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Merges a patch into this set; empty values clear their entry.
    pub fn merge(&mut self, patch: impl IntoIterator<Item = (String, String)>) {
        for (name, value) in patch {
            self.set(name, value);
        }
    }

    /// Query pairs in deterministic order. Never contains empty values.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl FromIterator<(String, String)> for FilterSet {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut set = Self::new();
        set.merge(iter);
        set
    }
}

/// Server-side ordering key: `field` ascending, `-field` descending.
///
/// The client never re-sorts a page locally; sorting is always requested
/// from the backend so it stays consistent with pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingKey(String);

impl OrderingKey {
    pub fn ascending(field: impl AsRef<str>) -> Result<Self, TypeError> {
        let field = field.as_ref().trim();
        if field.is_empty() {
            return Err(TypeError::EmptyOrderingKey);
        }
        Ok(Self(field.to_owned()))
    }

    pub fn descending(field: impl AsRef<str>) -> Result<Self, TypeError> {
        let field = field.as_ref().trim();
        if field.is_empty() {
            return Err(TypeError::EmptyOrderingKey);
        }
        Ok(Self(format!("-{field}")))
    }

    /// Parses the wire form directly (`name` or `-name`).
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, TypeError> {
        let raw = raw.as_ref().trim();
        if raw.is_empty() || raw == "-" {
            return Err(TypeError::EmptyOrderingKey);
        }
        Ok(Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The complete effective query of one list fetch.
///
/// Equality over the whole struct is the "signature" used to recognise a
/// stale in-flight response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub filters: FilterSet,
    pub search: Option<String>,
    pub page_index: u32,
    pub page_size: u32,
    pub ordering: Option<OrderingKey>,
}

impl ListQuery {
    pub fn new(page_size: u32) -> Self {
        Self {
            filters: FilterSet::new(),
            search: None,
            page_index: 1,
            page_size,
            ordering: None,
        }
    }

    /// Sets the free-text search term; empty clears it.
    pub fn set_search(&mut self, term: impl Into<String>) {
        let term = term.into();
        self.search = if term.trim().is_empty() {
            None
        } else {
            Some(term)
        };
    }

    /// All query pairs for the paginated list request.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page_index.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if let Some(ordering) = &self.ordering {
            pairs.push(("ordering".to_string(), ordering.as_str().to_string()));
        }
        pairs.extend(self.filters.to_query_pairs());
        pairs
    }

    /// Query pairs for the unpaginated fetch backing exports: same filter
    /// set, search and ordering, but no page window.
    pub fn to_unpaginated_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if let Some(ordering) = &self.ordering {
            pairs.push(("ordering".to_string(), ordering.as_str().to_string()));
        }
        pairs.extend(self.filters.to_query_pairs());
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_values_are_never_sent() {
        let mut filters = FilterSet::new();
        filters.set("status", "scheduled");
        filters.set("doctor", "");
        filters.set("room", "   ");
        assert_eq!(
            filters.to_query_pairs(),
            vec![("status".to_string(), "scheduled".to_string())]
        );
    }

    #[test]
    fn test_setting_empty_value_clears_existing_entry() {
        let mut filters = FilterSet::new();
        filters.set("status", "scheduled");
        filters.set("status", "");
        assert!(filters.is_empty());
    }

    #[test]
    fn test_merge_applies_patch_with_clears() {
        let mut filters = FilterSet::new();
        filters.set("status", "scheduled");
        filters.set("doctor", "3");
        filters.merge(vec![
            ("status".to_string(), String::new()),
            ("room".to_string(), "12".to_string()),
        ]);
        assert_eq!(filters.get("status"), None);
        assert_eq!(filters.get("doctor"), Some("3"));
        assert_eq!(filters.get("room"), Some("12"));
    }

    #[test]
    fn test_ordering_key_forms() {
        assert_eq!(OrderingKey::ascending("date").unwrap().as_str(), "date");
        assert_eq!(OrderingKey::descending("date").unwrap().as_str(), "-date");
        assert!(OrderingKey::ascending("  ").is_err());
        assert!(OrderingKey::parse("-").is_err());
        assert_eq!(OrderingKey::parse("-created_at").unwrap().as_str(), "-created_at");
    }

    #[test]
    fn test_list_query_pairs_include_page_window() {
        let mut query = ListQuery::new(10);
        query.page_index = 3;
        query.set_search("silva");
        query.ordering = Some(OrderingKey::descending("date").unwrap());
        query.filters.set("status", "scheduled");

        let pairs = query.to_query_pairs();
        assert!(pairs.contains(&("page".to_string(), "3".to_string())));
        assert!(pairs.contains(&("page_size".to_string(), "10".to_string())));
        assert!(pairs.contains(&("search".to_string(), "silva".to_string())));
        assert!(pairs.contains(&("ordering".to_string(), "-date".to_string())));
        assert!(pairs.contains(&("status".to_string(), "scheduled".to_string())));

        let unpaginated = query.to_unpaginated_pairs();
        assert!(unpaginated.iter().all(|(k, _)| k != "page" && k != "page_size"));
        assert!(unpaginated.contains(&("search".to_string(), "silva".to_string())));
    }

    #[test]
    fn test_query_signature_changes_with_filters() {
        let a = ListQuery::new(10);
        let mut b = a.clone();
        assert_eq!(a, b);
        b.filters.set("status", "completed");
        assert_ne!(a, b);
    }
}
