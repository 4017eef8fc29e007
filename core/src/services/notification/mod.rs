//! Out-of-band notification collaborator
//!
//! The engine only needs two messages: the security alert sent after
//! compromise containment and the password reset link. Delivery is always
//! best-effort and runs detached from the request that triggered it.

mod traits;

pub use traits::NotificationService;

/// Appends a token to a page URL as the `token` query parameter
pub fn link_with_token(base: &str, token: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}token={}", base, separator, token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_with_token() {
        assert_eq!(
            link_with_token("https://app.test/recover", "rcv_abc"),
            "https://app.test/recover?token=rcv_abc"
        );
        assert_eq!(
            link_with_token("https://app.test/recover?lang=en", "rcv_abc"),
            "https://app.test/recover?lang=en&token=rcv_abc"
        );
    }
}
