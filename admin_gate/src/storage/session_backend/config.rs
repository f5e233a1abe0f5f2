use std::{env, sync::LazyLock};
use tokio::sync::Mutex;

use super::SessionBackend;
use super::memory::MemorySessionBackend;
use super::redis::RedisSessionBackend;

static GENERIC_CACHE_STORE_TYPE: LazyLock<String> = LazyLock::new(|| {
    env::var("GENERIC_CACHE_STORE_TYPE").expect("GENERIC_CACHE_STORE_TYPE must be set")
});

static GENERIC_CACHE_STORE_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("GENERIC_CACHE_STORE_URL").expect("GENERIC_CACHE_STORE_URL must be set")
});

fn open_backend(store_type: &str, url: &str) -> Result<Box<dyn SessionBackend>, String> {
    match store_type {
        "memory" => Ok(Box::new(MemorySessionBackend::new())),
        "redis" => redis::Client::open(url)
            .map(|client| Box::new(RedisSessionBackend::new(client)) as Box<dyn SessionBackend>)
            .map_err(|e| format!("Failed to create Redis client: {e}")),
        t => Err(format!(
            "Unsupported cache store type: {t}. Supported types are 'memory' and 'redis'"
        )),
    }
}

/// Process-wide session backend, selected by `GENERIC_CACHE_STORE_TYPE`.
pub(crate) static SESSION_BACKEND: LazyLock<Mutex<Box<dyn SessionBackend>>> = LazyLock::new(|| {
    let store_type = GENERIC_CACHE_STORE_TYPE.as_str();
    tracing::info!("Initializing {} session backend", store_type);

    match open_backend(store_type, GENERIC_CACHE_STORE_URL.as_str()) {
        Ok(backend) => Mutex::new(backend),
        Err(e) => {
            tracing::error!("{}", e);
            panic!("{e}");
        }
    }
});

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_ignores_url() {
        let backend = open_backend("memory", "anything").unwrap();
        assert!(backend.check().await.is_ok());
    }

    #[test]
    fn test_redis_url_is_parsed_without_connecting() {
        assert!(open_backend("redis", "redis://localhost:6379").is_ok());
        assert!(open_backend("redis", "not a url").is_err());
    }

    #[test]
    fn test_unsupported_type_is_named() {
        let err = open_backend("memcached", "").err().unwrap();
        assert!(err.contains("memcached"));
    }
}
