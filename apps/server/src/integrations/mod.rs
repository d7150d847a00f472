//! Outbound HTTP integrations

pub mod payment;
pub mod sms;

pub use payment::{
    build_gateway, sign_webhook_payload, verify_webhook_signature, CheckoutRequest,
    DevPaymentGateway, PaymentGateway, StripeCheckout, WebhookEvent,
};
pub use sms::{build_provider, DevOtpProvider, OtpProvider, TwilioVerify};
