use std::future::Future;

/// Apply `mutate` to local state right away, then await the remote write.
/// If the write fails the state is restored to its prior snapshot.
pub async fn apply_optimistic<S, T, E, M, W, Fut>(state: &mut S, mutate: M, write: W) -> Result<T, E>
where
    S: Clone,
    M: FnOnce(&mut S),
    W: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let snapshot = state.clone();
    mutate(state);

    match write().await {
        Ok(value) => Ok(value),
        Err(e) => {
            *state = snapshot;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn success_keeps_mutation() {
        let mut items = vec!["AAPL".to_string()];
        let result: Result<(), String> =
            apply_optimistic(&mut items, |s| s.push("MSFT".into()), || async { Ok(()) }).await;

        assert!(result.is_ok());
        assert_eq!(items, vec!["AAPL", "MSFT"]);
    }

    #[tokio::test]
    async fn failure_restores_snapshot() {
        let mut items = vec!["AAPL".to_string(), "MSFT".to_string()];
        let result: Result<(), String> = apply_optimistic(
            &mut items,
            |s| s.retain(|x| x != "AAPL"),
            || async { Err("network down".to_string()) },
        )
        .await;

        assert_eq!(result, Err("network down".to_string()));
        assert_eq!(items, vec!["AAPL", "MSFT"]);
    }
}
