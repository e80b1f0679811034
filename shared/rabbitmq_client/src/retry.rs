use std::{fmt::Display, future::Future, time::Duration};

///
/// Runs `operation` until it returns Ok, sleeping `retry_interval` between attempts.
///
/// Every attempt is logged together with `operation_name`,
/// so callers don't have to log failures themselves.
///
pub async fn retry<F, Fut, T, E>(
    retry_interval: Duration,
    operation_name: &'static str,
    operation: F,
) -> T
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        tracing::info!(attempt, operation = operation_name, "attempting");
        match operation().await {
            Ok(output) => {
                tracing::info!(attempt, operation = operation_name, "succeeded");
                return output;
            }
            Err(err) => tracing::warn!(attempt, operation = operation_name, %err, "failed"),
        }

        tokio::time::sleep(retry_interval).await;
    }
}
