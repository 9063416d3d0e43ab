use anyhow::Result;

/// Everything in wipwatch runs on one cooperative timeline, so a current-thread runtime is all
/// that is ever built.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
