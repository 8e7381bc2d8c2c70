//! Search request body building

use inv_common::{Pagination, SortOrder};
use serde_json::{Value, json};

/// Maps a sort property to the field Elasticsearch can sort on
///
/// Text fields under dynamic mapping are only sortable through their
/// `.keyword` sub-field.
pub fn sort_field(property: &str, keyword_fields: &[&str]) -> String {
    if keyword_fields.contains(&property) {
        format!("{}.keyword", property)
    } else {
        property.to_string()
    }
}

fn sort_clause(sort: &[SortOrder], keyword_fields: &[&str]) -> Vec<Value> {
    if sort.is_empty() {
        // Relevance first; id keeps pages stable between equal scores.
        // A fresh index has no mapping for id until the first document lands.
        return vec![
            json!({ "_score": "desc" }),
            json!({ "id": { "order": "asc", "unmapped_type": "long" } }),
        ];
    }
    sort.iter()
        .map(|order| {
            json!({
                sort_field(&order.property, keyword_fields): {
                    "order": order.direction.as_str(),
                    "unmapped_type": "keyword",
                }
            })
        })
        .collect()
}

/// Build a `_search` body for a free-text query
///
/// A blank query matches every document.
pub fn build_search_body(query: &str, pagination: &Pagination, keyword_fields: &[&str]) -> Value {
    let query = query.trim();
    let query_clause = if query.is_empty() || query == "*" {
        json!({ "match_all": {} })
    } else {
        json!({
            "query_string": {
                "query": query,
                "default_operator": "OR",
                // Text terms against numeric fields are ignored instead of failing
                "lenient": true,
            }
        })
    };

    json!({
        "query": query_clause,
        "from": pagination.offset(),
        "size": pagination.limit(),
        "sort": sort_clause(&pagination.sort, keyword_fields),
        "track_total_hits": true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_body() {
        let pagination = Pagination::new(3, 10);
        let body = build_search_body("units:kg", &pagination, &[]);

        assert_eq!(body["query"]["query_string"]["query"], "units:kg");
        assert_eq!(body["query"]["query_string"]["lenient"], true);
        assert_eq!(body["from"], 20);
        assert_eq!(body["size"], 10);
        assert_eq!(body["track_total_hits"], true);
    }

    #[test]
    fn test_blank_query_matches_all() {
        let pagination = Pagination::default();
        for query in ["", "   ", "*"] {
            let body = build_search_body(query, &pagination, &[]);
            assert!(body["query"]["match_all"].is_object(), "query {:?}", query);
        }
    }

    #[test]
    fn test_default_sort() {
        let body = build_search_body("kg", &Pagination::default(), &[]);
        assert_eq!(body["sort"][0]["_score"], "desc");
        assert_eq!(body["sort"][1]["id"]["order"], "asc");
    }

    #[test]
    fn test_default_sort_tolerates_unmapped_id() {
        let body = build_search_body("", &Pagination::default(), &[]);
        assert_eq!(body["sort"][1]["id"]["unmapped_type"], "long");
    }

    #[test]
    fn test_explicit_sort_uses_keyword_fields() {
        let pagination = Pagination::new(1, 20)
            .with_sort(SortOrder::desc("units"))
            .with_sort(SortOrder::asc("quantity"));
        let body = build_search_body("kg", &pagination, &["units"]);

        assert_eq!(body["sort"][0]["units.keyword"]["order"], "desc");
        assert_eq!(body["sort"][1]["quantity"]["order"], "asc");
    }
}
