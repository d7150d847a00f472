use anyhow::Context as _;
use costura::{
    config::{PaymentProviderKind, SmsProviderKind, StorageBackend},
    Config,
};
use std::sync::Arc;
use tokio::sync::OnceCell;

static SHARED: OnceCell<Arc<SharedTestResources>> = OnceCell::const_new();

pub struct SharedTestResources {
    pub base_config: Config,
}

pub async fn shared() -> anyhow::Result<Arc<SharedTestResources>> {
    SHARED
        .get_or_try_init(|| async {
            init_tracing();

            let mut config = Config::load_from(None).context("load Config for tests")?;

            // Hermetic: in-process storage, no outbound HTTP, fast hashing.
            config.database.backend = StorageBackend::Memory;
            config.database.url = None;
            config.auth.jwt_secret = "test-secret".to_string();
            config.auth.bcrypt_cost = 4;
            config.sms.provider = SmsProviderKind::Disabled;
            config.sms.dev_code = super::TEST_OTP_CODE.to_string();
            config.payment.provider = PaymentProviderKind::Disabled;
            config.payment.webhook_secret = super::TEST_WEBHOOK_SECRET.to_string();
            config.payment.success_url = "https://costura.test/checkout/success".to_string();
            config.payment.cancel_url = "https://costura.test/checkout/cancel".to_string();

            Ok(Arc::new(SharedTestResources {
                base_config: config,
            }))
        })
        .await
        .cloned()
}

fn init_tracing() {
    use std::sync::OnceLock;
    use tracing_subscriber::prelude::*;
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "costura=info,sqlx=warn".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}
