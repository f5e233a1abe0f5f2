//! Crate-wide settings

use std::sync::LazyLock;

/// Mount point of the gate's own routes (login, logout). Default: "/admin"
pub static ADMIN_ROUTE_PREFIX: LazyLock<String> = LazyLock::new(|| {
    std::env::var("ADMIN_ROUTE_PREFIX").unwrap_or_else(|_| "/admin".to_string())
});

#[cfg(test)]
mod tests {
    use std::env;

    #[test]
    fn test_admin_route_prefix_logic() {
        // The static may already be initialized, so check the fallback it uses
        let prefix = env::var("ADMIN_ROUTE_PREFIX_UNSET_FOR_TEST")
            .unwrap_or_else(|_| "/admin".to_string());
        assert_eq!(prefix, "/admin");
    }
}
