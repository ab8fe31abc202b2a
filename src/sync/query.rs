//! Page descriptors and list filters.
//!
//! Filters are a fixed struct with named fields rather than a string-keyed
//! map, so a misspelled filter is a compile error instead of a silently
//! ignored query parameter.

/// Sort key accepted by every collection endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    CreatedAt,
    UpdatedAt,
    Name,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::CreatedAt => "createdAt",
            SortKey::UpdatedAt => "updatedAt",
            SortKey::Name => "name",
        }
    }
}

/// One fetch's slice of a collection: {limit, offset, sort}.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub take: i64,
    pub skip: i64,
    pub order_by: SortKey,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            take: 9,
            skip: 0,
            order_by: SortKey::CreatedAt,
        }
    }
}

impl PageQuery {
    pub fn with_take(take: i64) -> Self {
        Self {
            take,
            ..Self::default()
        }
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("take", self.take.to_string()),
            ("skip", self.skip.to_string()),
            ("orderBy", self.order_by.as_str().to_string()),
        ]
    }
}

/// Scoping filters for a list view. Unset fields are omitted from the
/// query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub search: Option<String>,
    pub community_id: Option<String>,
    pub created_by_id: Option<String>,
    pub question_id: Option<String>,
    pub user_id: Option<String>,
}

impl ListFilter {
    pub fn for_community(community_id: impl Into<String>) -> Self {
        Self {
            community_id: Some(community_id.into()),
            ..Self::default()
        }
    }

    pub fn for_question(question_id: impl Into<String>) -> Self {
        Self {
            question_id: Some(question_id.into()),
            ..Self::default()
        }
    }

    pub fn for_search(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Self::default()
        }
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref search) = self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(ref id) = self.community_id {
            pairs.push(("communityId", id.clone()));
        }
        if let Some(ref id) = self.created_by_id {
            pairs.push(("createdById", id.clone()));
        }
        if let Some(ref id) = self.question_id {
            pairs.push(("questionId", id.clone()));
        }
        if let Some(ref id) = self.user_id {
            pairs.push(("userId", id.clone()));
        }
        pairs
    }
}
