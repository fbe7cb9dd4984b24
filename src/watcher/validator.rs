use crate::mongo::QueryResult;
use futures::future::BoxFuture;
use std::{fmt, sync::Arc};

pub type SyncPredicate = Arc<dyn Fn(&QueryResult) -> bool + Send + Sync>;
pub type AsyncPredicate = Arc<dyn Fn(Arc<QueryResult>) -> BoxFuture<'static, bool> + Send + Sync>;

/// Caller supplied predicate over a query result
#[derive(Clone)]
pub enum Validator {
    Sync(SyncPredicate),
    Async(AsyncPredicate),
}

impl Validator {
    pub async fn validate(&self, result: Arc<QueryResult>) -> bool {
        match self {
            Self::Sync(predicate) => predicate(&result),
            Self::Async(predicate) => predicate(result).await,
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Validator::Sync"),
            Self::Async(_) => f.write_str("Validator::Async"),
        }
    }
}

/// A result is valid when every validator accepts it, an empty list accepts
/// anything. Every validator runs, even after one rejected the result.
pub async fn validate_all(validators: &[Validator], result: Arc<QueryResult>) -> bool {
    let mut valid = true;
    for validator in validators {
        valid &= validator.validate(Arc::clone(&result)).await;
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use mongodb::bson::doc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn orders() -> Arc<QueryResult> {
        Arc::new(vec![
            doc! { "_id": 1, "status": "shipped" },
            doc! { "_id": 2, "status": "pending" },
        ])
    }

    fn sync(f: impl Fn(&QueryResult) -> bool + Send + Sync + 'static) -> Validator {
        Validator::Sync(Arc::new(f))
    }

    fn constant_async(value: bool) -> Validator {
        Validator::Async(Arc::new(move |_: Arc<QueryResult>| {
            async move { value }.boxed()
        }))
    }

    #[tokio::test]
    async fn test_empty_list_is_valid() {
        assert!(validate_all(&[], orders()).await);
    }

    #[tokio::test]
    async fn test_sync_validator_sees_documents() {
        let validators = [sync(|docs| docs.len() == 2)];
        assert!(validate_all(&validators, orders()).await);

        let validators = [sync(|docs| {
            docs.iter()
                .all(|d| d.get_str("status").is_ok_and(|s| s == "shipped"))
        })];
        assert!(!validate_all(&validators, orders()).await);
    }

    #[tokio::test]
    async fn test_async_and_sync_are_combined() {
        for (a, s) in [(true, true), (true, false), (false, true), (false, false)] {
            let validators = [constant_async(a), sync(move |_| s)];
            assert_eq!(validate_all(&validators, orders()).await, a && s);
        }
    }

    #[tokio::test]
    async fn test_every_validator_runs() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = |calls: Arc<AtomicUsize>, value: bool| {
            sync(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                value
            })
        };

        let validators = [
            counter(calls.clone(), false),
            counter(calls.clone(), true),
            counter(calls.clone(), true),
        ];

        assert!(!validate_all(&validators, orders()).await);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_validator_debug() {
        assert_eq!(format!("{:?}", sync(|_| true)), "Validator::Sync");
        assert_eq!(format!("{:?}", constant_async(true)), "Validator::Async");
    }
}
