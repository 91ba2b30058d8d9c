pub mod health;
pub use self::health::health;

pub mod login;
pub use self::login::login;

pub mod token;
pub use self::token::token;

/// Service banner for `GET /`.
pub async fn root() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn root_banner_names_the_service() {
        let banner = root().await;
        assert!(banner.starts_with(env!("CARGO_PKG_NAME")));
        assert!(banner.ends_with(env!("CARGO_PKG_VERSION")));
    }
}
