//! 进程内搜索索引
//!
//! 文档按 JSON 叶子节点分词。查询按空白切分为若干项，项之间默认为 OR；
//! `AND` 和 `+term` 要求必须命中，`NOT` 和 `-term` 排除命中的文档，
//! `field:value` 形式只匹配对应字段。结果按命中项数降序、ID 升序排列。

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Display;

use async_trait::async_trait;
use inv_common::{PagedResult, Pagination, SortDirection};
use inv_errors::{AppError, AppResult};
use inv_ports::{Document, SearchRepository};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

struct Entry<T> {
    document: T,
    source: Value,
    /// (字段路径, 词)
    terms: Vec<(String, String)>,
}

pub struct InMemorySearchIndex<T> {
    entries: RwLock<BTreeMap<String, Entry<T>>>,
}

impl<T> InMemorySearchIndex<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl<T> Default for InMemorySearchIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// 小写后按非字母数字字符切分
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn collect_terms(path: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                collect_terms(&child_path, child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_terms(path, item, out);
            }
        }
        Value::String(s) => {
            out.extend(tokenize(s).into_iter().map(|t| (path.to_string(), t)));
        }
        Value::Number(n) => {
            out.extend(tokenize(&n.to_string()).into_iter().map(|t| (path.to_string(), t)));
        }
        Value::Bool(b) => out.push((path.to_string(), b.to_string())),
        Value::Null => {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Occur {
    Should,
    Must,
    MustNot,
}

struct QueryTerm {
    occur: Occur,
    field: Option<String>,
    tokens: Vec<String>,
}

fn parse_query(query: &str) -> Vec<QueryTerm> {
    let mut terms: Vec<QueryTerm> = Vec::new();
    // 前一个运算符对下一项的要求
    let mut next = Occur::Should;

    for part in query.split_whitespace() {
        match part {
            "AND" => {
                if let Some(last) = terms.last_mut().filter(|t| t.occur == Occur::Should) {
                    last.occur = Occur::Must;
                }
                next = Occur::Must;
                continue;
            }
            "OR" => {
                next = Occur::Should;
                continue;
            }
            "NOT" => {
                next = Occur::MustNot;
                continue;
            }
            _ => {}
        }

        let (occur, part) = if let Some(rest) = part.strip_prefix('-') {
            (Occur::MustNot, rest)
        } else if let Some(rest) = part.strip_prefix('+') {
            (Occur::Must, rest)
        } else {
            (next, part)
        };
        next = Occur::Should;

        let (field, text) = match part.split_once(':') {
            Some((field, text)) if !field.is_empty() => (Some(field.to_string()), text),
            _ => (None, part),
        };
        let tokens = tokenize(text);
        if !tokens.is_empty() {
            terms.push(QueryTerm {
                occur,
                field,
                tokens,
            });
        }
    }
    terms
}

fn matches<T>(entry: &Entry<T>, term: &QueryTerm) -> bool {
    entry.terms.iter().any(|(path, token)| {
        term.field.as_deref().is_none_or(|f| f == path) && term.tokens.contains(token)
    })
}

/// 命中的正向项数；0 表示不匹配
fn score<T>(entry: &Entry<T>, query: &[QueryTerm]) -> usize {
    if query.is_empty() {
        return 0;
    }
    let rejected = query.iter().any(|term| match term.occur {
        Occur::MustNot => matches(entry, term),
        Occur::Must => !matches(entry, term),
        Occur::Should => false,
    });
    if rejected {
        return 0;
    }

    let positive: Vec<&QueryTerm> = query.iter().filter(|t| t.occur != Occur::MustNot).collect();
    if positive.is_empty() {
        // 只有排除项时匹配其余全部文档
        return 1;
    }
    positive.iter().filter(|term| matches(entry, term)).count()
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// 数字 ID 按数值比较
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

#[async_trait]
impl<T, ID> SearchRepository<T, ID> for InMemorySearchIndex<T>
where
    T: Document + Serialize + Clone + 'static,
    ID: Display + Send + Sync,
{
    async fn index(&self, document: &T) -> AppResult<()> {
        let id = document
            .document_id()
            .ok_or_else(|| AppError::validation("Cannot index a document without an id"))?;
        let source = serde_json::to_value(document)
            .map_err(|e| AppError::internal(format!("Failed to serialize document: {}", e)))?;

        let mut terms = Vec::new();
        collect_terms("", &source, &mut terms);

        self.entries.write().await.insert(
            id,
            Entry {
                document: document.clone(),
                source,
                terms,
            },
        );
        Ok(())
    }

    async fn delete(&self, id: &ID) -> AppResult<()> {
        self.entries.write().await.remove(&id.to_string());
        Ok(())
    }

    async fn delete_all(&self) -> AppResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn search(&self, query: &str, pagination: &Pagination) -> AppResult<PagedResult<T>> {
        let trimmed = query.trim();
        let match_all = trimmed.is_empty() || trimmed == "*";
        let terms = parse_query(trimmed);

        let entries = self.entries.read().await;
        let mut hits: Vec<(usize, &String, &Entry<T>)> = entries
            .iter()
            .filter_map(|(id, entry)| {
                let score = if match_all { 1 } else { score(entry, &terms) };
                (score > 0).then_some((score, id, entry))
            })
            .collect();

        hits.sort_by(|(score_a, id_a, a), (score_b, id_b, b)| {
            for order in &pagination.sort {
                let ordering = compare_values(
                    a.source.get(&order.property),
                    b.source.get(&order.property),
                );
                let ordering = match order.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            score_b.cmp(score_a).then_with(|| compare_ids(id_a, id_b))
        });

        let total = hits.len() as u64;
        let items = hits
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .map(|(_, _, entry)| entry.document.clone())
            .collect();
        Ok(PagedResult::new(items, total, pagination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inv_common::SortOrder;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Doc {
        id: i64,
        units: Option<String>,
        quantity: Option<f64>,
    }

    impl Document for Doc {
        fn document_id(&self) -> Option<String> {
            Some(self.id.to_string())
        }
    }

    fn doc(id: i64, units: &str, quantity: f64) -> Doc {
        Doc {
            id,
            units: Some(units.to_string()),
            quantity: Some(quantity),
        }
    }

    async fn index_with(docs: &[Doc]) -> InMemorySearchIndex<Doc> {
        let index = InMemorySearchIndex::new();
        for d in docs {
            SearchRepository::<Doc, i64>::index(&index, d).await.unwrap();
        }
        index
    }

    async fn search(index: &InMemorySearchIndex<Doc>, query: &str, p: &Pagination) -> Vec<i64> {
        SearchRepository::<Doc, i64>::search(index, query, p)
            .await
            .unwrap()
            .items
            .iter()
            .map(|d| d.id)
            .collect()
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Boxes, 12-pack"), vec!["boxes", "12", "pack"]);
        assert!(tokenize("  --  ").is_empty());
    }

    #[tokio::test]
    async fn test_free_text_matches_any_field() {
        let index = index_with(&[doc(1, "kg", 2.0), doc(2, "litre", 7.0), doc(3, "kg", 7.0)]).await;
        let p = Pagination::default();

        assert_eq!(search(&index, "kg", &p).await, vec![1, 3]);
        assert_eq!(search(&index, "7", &p).await, vec![2, 3]);
        assert!(search(&index, "tonnes", &p).await.is_empty());
    }

    #[tokio::test]
    async fn test_field_query_and_scoring() {
        let index = index_with(&[doc(1, "kg", 2.0), doc(2, "litre", 7.0), doc(3, "kg", 7.0)]).await;
        let p = Pagination::default();

        assert_eq!(search(&index, "units:litre", &p).await, vec![2]);
        // 同时命中两项的文档排在前面
        assert_eq!(search(&index, "kg OR 7", &p).await, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_boolean_operators() {
        let index = index_with(&[doc(1, "kg", 2.0), doc(2, "litre", 7.0), doc(3, "kg", 7.0)]).await;
        let p = Pagination::default();

        assert_eq!(search(&index, "kg NOT litre", &p).await, vec![1, 3]);
        assert_eq!(search(&index, "kg NOT 7", &p).await, vec![1]);
        assert_eq!(search(&index, "kg AND 7", &p).await, vec![3]);
        assert_eq!(search(&index, "+litre 2", &p).await, vec![2]);
        assert_eq!(search(&index, "-kg", &p).await, vec![2]);
        assert_eq!(search(&index, "7 -units:kg", &p).await, vec![2]);
        assert_eq!(search(&index, "kg AND NOT 2", &p).await, vec![3]);
    }

    #[tokio::test]
    async fn test_blank_query_matches_all_with_sort_and_paging() {
        let index = index_with(&[doc(10, "kg", 2.0), doc(2, "kg", 9.0), doc(7, "kg", 5.0)]).await;

        assert_eq!(search(&index, "", &Pagination::default()).await, vec![2, 7, 10]);

        let p = Pagination::new(1, 2).with_sort(SortOrder::desc("quantity"));
        assert_eq!(search(&index, "*", &p).await, vec![2, 7]);

        let p = Pagination::new(2, 2).with_sort(SortOrder::desc("quantity"));
        let page = SearchRepository::<Doc, i64>::search(&index, "*", &p).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_and_delete() {
        let index = index_with(&[doc(1, "kg", 2.0)]).await;
        SearchRepository::<Doc, i64>::index(&index, &doc(1, "box", 2.0))
            .await
            .unwrap();
        assert_eq!(index.len().await, 1);
        assert!(search(&index, "kg", &Pagination::default()).await.is_empty());

        SearchRepository::<Doc, i64>::delete(&index, &1).await.unwrap();
        SearchRepository::<Doc, i64>::delete(&index, &1).await.unwrap();
        assert!(index.is_empty().await);
    }
}
