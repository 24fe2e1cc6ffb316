//! Pricing page checkout flow.

use crate::integration::{CheckoutProvider, IntegrationError};
use crate::model::user::User;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
pub enum BillingError {
    /// Signed-out visitors must log in before subscribing.
    LoginRequired,
    /// The provider answered without a checkout URL.
    MissingCheckoutUrl,
    Integration(IntegrationError),
}

impl BillingError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::LoginRequired => "login_required",
            Self::MissingCheckoutUrl => "missing_checkout_url",
            Self::Integration(err) => err.code(),
        }
    }
}

impl Display for BillingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoginRequired => write!(f, "sign in to subscribe"),
            Self::MissingCheckoutUrl => write!(f, "checkout provider returned no URL"),
            Self::Integration(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BillingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Integration(err) => Some(err),
            Self::LoginRequired | Self::MissingCheckoutUrl => None,
        }
    }
}

impl From<IntegrationError> for BillingError {
    fn from(value: IntegrationError) -> Self {
        Self::Integration(value)
    }
}

/// Starts a checkout for `user` and returns the URL to navigate to.
pub fn subscribe(
    user: Option<&User>,
    checkout: &dyn CheckoutProvider,
    origin_url: &str,
) -> Result<String, BillingError> {
    if user.is_none() {
        return Err(BillingError::LoginRequired);
    }

    let result = checkout
        .initiate_checkout(origin_url)
        .map_err(BillingError::from)
        .and_then(|session| session.checkout_url.ok_or(BillingError::MissingCheckoutUrl));
    match &result {
        Ok(_) => info!("event=checkout_start module=service status=ok"),
        Err(err) => error!(
            "event=checkout_start module=service status=error error_code={}",
            err.code()
        ),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::{subscribe, BillingError};
    use crate::integration::{
        CheckoutProvider, CheckoutSession, IntegrationResult, LocalCheckout,
    };
    use crate::integration::mock::LOCAL_CHECKOUT_URL;
    use crate::model::user::User;

    struct EmptyCheckout;

    impl CheckoutProvider for EmptyCheckout {
        fn initiate_checkout(&self, _origin_url: &str) -> IntegrationResult<CheckoutSession> {
            Ok(CheckoutSession { checkout_url: None })
        }
    }

    #[test]
    fn signed_out_visitor_must_log_in() {
        assert_eq!(
            subscribe(None, &LocalCheckout, "https://app.local"),
            Err(BillingError::LoginRequired)
        );
    }

    #[test]
    fn signed_in_user_gets_checkout_url() {
        let user = User::new("tester@example.com");
        assert_eq!(
            subscribe(Some(&user), &LocalCheckout, "https://app.local").unwrap(),
            LOCAL_CHECKOUT_URL
        );
        assert_eq!(
            subscribe(Some(&user), &EmptyCheckout, "https://app.local"),
            Err(BillingError::MissingCheckoutUrl)
        );
    }
}
