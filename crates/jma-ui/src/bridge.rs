use std::sync::OnceLock;

use anyhow::{Context, Result};

// Static tokio runtime that lives for the duration of the application
static RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();

/// Initialize the tokio runtime (call once at application startup)
pub fn get_or_init_runtime() -> Result<tokio::runtime::Handle> {
    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime.handle().clone());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("jma-tokio")
        .build()
        .context("Failed to create tokio runtime")?;

    // Another thread may have initialized it first; the spare runtime is dropped
    Ok(RUNTIME.get_or_init(|| runtime).handle().clone())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_is_reused() {
        let first = get_or_init_runtime().unwrap();
        let second = get_or_init_runtime().unwrap();
        assert_eq!(first.block_on(async { 40 + 2 }), 42);
        let joined = second.block_on(first.spawn(async { "jma" })).unwrap();
        assert_eq!(joined, "jma");
    }
}
